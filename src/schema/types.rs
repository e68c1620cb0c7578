// Schema type system for avrolite
//
// Every node of one schema build lives in a `SchemaArena`. Nodes refer to each
// other by `SchemaId`, so recursive types (a record whose field links back to
// the record) never form ownership cycles. A `Schema` is a cheap, clonable
// handle onto one node of a shared arena.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::internal::error::{Error, Result};

/// Index of a node inside its `SchemaArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the node in its arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The category of a schema node (and of any value built from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed,
    Enum,
    Array,
    Map,
    Record,
    Union,
    Link,
}

impl TypeTag {
    /// Returns the canonical lowercase name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Bytes => "bytes",
            TypeTag::String => "string",
            TypeTag::Fixed => "fixed",
            TypeTag::Enum => "enum",
            TypeTag::Array => "array",
            TypeTag::Map => "map",
            TypeTag::Record => "record",
            TypeTag::Union => "union",
            TypeTag::Link => "link",
        }
    }

    /// Looks up a primitive type by name (`"int"`, `"string"`, ...).
    pub fn primitive_from_name(name: &str) -> Option<TypeTag> {
        match name {
            "null" => Some(TypeTag::Null),
            "boolean" => Some(TypeTag::Boolean),
            "int" => Some(TypeTag::Int),
            "long" => Some(TypeTag::Long),
            "float" => Some(TypeTag::Float),
            "double" => Some(TypeTag::Double),
            "bytes" => Some(TypeTag::Bytes),
            "string" => Some(TypeTag::String),
            _ => None,
        }
    }

    /// Returns true for the eight primitive types.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeTag::Null
                | TypeTag::Boolean
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::Bytes
                | TypeTag::String
        )
    }

    /// Returns true for types whose values are read with `get_scalar`.
    pub fn is_scalar(&self) -> bool {
        self.is_primitive() || matches!(self, TypeTag::Fixed | TypeTag::Enum)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Field name, unique within its record
    pub name: String,
    /// Field type
    pub schema: SchemaId,
    /// Default value as a JSON literal (see `schema::defaults`)
    pub default: Option<serde_json::Value>,
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    /// Fixed-size byte block
    Fixed { name: String, size: usize },
    /// Enumeration with ordered, unique symbols
    Enum {
        name: String,
        symbols: Vec<String>,
        default: Option<String>,
    },
    Array { items: SchemaId },
    Map { values: SchemaId },
    Record { name: String, fields: Vec<RecordField> },
    /// Tagged union; branches are distinguished by type name
    Union { branches: Vec<SchemaId> },
    /// Non-owning reference to a named type declared in the same arena
    Link { name: String, target: SchemaId },
}

impl SchemaKind {
    /// Tag of this node.
    pub fn tag(&self) -> TypeTag {
        match self {
            SchemaKind::Null => TypeTag::Null,
            SchemaKind::Boolean => TypeTag::Boolean,
            SchemaKind::Int => TypeTag::Int,
            SchemaKind::Long => TypeTag::Long,
            SchemaKind::Float => TypeTag::Float,
            SchemaKind::Double => TypeTag::Double,
            SchemaKind::Bytes => TypeTag::Bytes,
            SchemaKind::String => TypeTag::String,
            SchemaKind::Fixed { .. } => TypeTag::Fixed,
            SchemaKind::Enum { .. } => TypeTag::Enum,
            SchemaKind::Array { .. } => TypeTag::Array,
            SchemaKind::Map { .. } => TypeTag::Map,
            SchemaKind::Record { .. } => TypeTag::Record,
            SchemaKind::Union { .. } => TypeTag::Union,
            SchemaKind::Link { .. } => TypeTag::Link,
        }
    }

    /// Declared name of a named type (fixed, enum, record, link).
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaKind::Fixed { name, .. }
            | SchemaKind::Enum { name, .. }
            | SchemaKind::Record { name, .. }
            | SchemaKind::Link { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn primitive(tag: TypeTag) -> Option<SchemaKind> {
        match tag {
            TypeTag::Null => Some(SchemaKind::Null),
            TypeTag::Boolean => Some(SchemaKind::Boolean),
            TypeTag::Int => Some(SchemaKind::Int),
            TypeTag::Long => Some(SchemaKind::Long),
            TypeTag::Float => Some(SchemaKind::Float),
            TypeTag::Double => Some(SchemaKind::Double),
            TypeTag::Bytes => Some(SchemaKind::Bytes),
            TypeTag::String => Some(SchemaKind::String),
            _ => None,
        }
    }
}

/// Storage for every node of one schema build.
#[derive(Debug, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaKind>,
}

impl SchemaArena {
    pub(crate) fn from_nodes(nodes: Vec<SchemaKind>) -> Self {
        Self { nodes }
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: SchemaId) -> &SchemaKind {
        &self.nodes[id.0]
    }

    /// Follows links until a non-link node is reached.
    pub(crate) fn deref(&self, mut id: SchemaId) -> SchemaId {
        // links always target a named node, never another link, but stay bounded anyway
        for _ in 0..self.nodes.len() {
            match self.node(id) {
                SchemaKind::Link { target, .. } => id = *target,
                _ => return id,
            }
        }
        id
    }

    /// Name used to pick this node out of a union.
    pub(crate) fn type_name(&self, id: SchemaId) -> &str {
        let kind = self.node(id);
        match kind.name() {
            Some(name) => name,
            None => kind.tag().name(),
        }
    }
}

/// Shared, immutable handle onto one node of a schema arena.
///
/// Cloning is an atomic reference count increment, so schemas can be shared
/// read-only across threads.
#[derive(Clone)]
pub struct Schema {
    arena: Arc<SchemaArena>,
    id: SchemaId,
}

impl Schema {
    pub(crate) fn new(arena: Arc<SchemaArena>, id: SchemaId) -> Self {
        Self { arena, id }
    }

    /// Builds a single-node schema for a primitive type.
    pub fn primitive(tag: TypeTag) -> Result<Schema> {
        let kind = SchemaKind::primitive(tag).ok_or_else(|| {
            Error::InvalidSchema(format!("{} is not a primitive type", tag))
        })?;
        Ok(Schema::new(
            Arc::new(SchemaArena::from_nodes(vec![kind])),
            SchemaId(0),
        ))
    }

    fn primitive_unchecked(kind: SchemaKind) -> Schema {
        Schema::new(Arc::new(SchemaArena::from_nodes(vec![kind])), SchemaId(0))
    }

    pub fn null() -> Schema {
        Self::primitive_unchecked(SchemaKind::Null)
    }

    pub fn boolean() -> Schema {
        Self::primitive_unchecked(SchemaKind::Boolean)
    }

    pub fn int() -> Schema {
        Self::primitive_unchecked(SchemaKind::Int)
    }

    pub fn long() -> Schema {
        Self::primitive_unchecked(SchemaKind::Long)
    }

    pub fn float() -> Schema {
        Self::primitive_unchecked(SchemaKind::Float)
    }

    pub fn double() -> Schema {
        Self::primitive_unchecked(SchemaKind::Double)
    }

    pub fn bytes() -> Schema {
        Self::primitive_unchecked(SchemaKind::Bytes)
    }

    pub fn string() -> Schema {
        Self::primitive_unchecked(SchemaKind::String)
    }

    /// Node this handle points at.
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub(crate) fn arena(&self) -> &Arc<SchemaArena> {
        &self.arena
    }

    /// Returns a handle to another node of the same arena, with links followed.
    pub(crate) fn at(&self, id: SchemaId) -> Schema {
        Schema::new(self.arena.clone(), self.arena.deref(id))
    }

    /// The node itself; may be a link.
    pub fn kind(&self) -> &SchemaKind {
        self.arena.node(self.id)
    }

    /// Tag of the node.
    pub fn type_tag(&self) -> TypeTag {
        self.kind().tag()
    }

    /// Returns this schema with any link followed to its target.
    pub fn dereference(&self) -> Schema {
        self.at(self.id)
    }

    /// Declared name of a named type.
    pub fn name(&self) -> Option<&str> {
        self.kind().name()
    }

    /// The name a union uses for this type: the declared name of named types,
    /// otherwise the type tag name.
    pub fn type_name(&self) -> &str {
        self.arena.type_name(self.id)
    }

    /// Item schema of an array.
    pub fn items(&self) -> Option<Schema> {
        match self.kind() {
            SchemaKind::Array { items } => Some(self.at(*items)),
            _ => None,
        }
    }

    /// Value schema of a map.
    pub fn values(&self) -> Option<Schema> {
        match self.kind() {
            SchemaKind::Map { values } => Some(self.at(*values)),
            _ => None,
        }
    }

    /// Byte size of a fixed.
    pub fn fixed_size(&self) -> Option<usize> {
        match self.kind() {
            SchemaKind::Fixed { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Symbols of an enum, in index order.
    pub fn symbols(&self) -> Option<&[String]> {
        match self.kind() {
            SchemaKind::Enum { symbols, .. } => Some(symbols),
            _ => None,
        }
    }

    /// Declared default symbol of an enum.
    pub fn enum_default(&self) -> Option<&str> {
        match self.kind() {
            SchemaKind::Enum { default, .. } => default.as_deref(),
            _ => None,
        }
    }

    /// 0-based index of an enum symbol.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols()?.iter().position(|s| s == symbol)
    }

    /// Fields of a record, in declaration order.
    pub fn fields(&self) -> Option<&[RecordField]> {
        match self.kind() {
            SchemaKind::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// 0-based index of a record field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Schema of the record field at a 0-based index.
    pub fn field_schema(&self, index: usize) -> Option<Schema> {
        self.fields()?.get(index).map(|f| self.at(f.schema))
    }

    /// Number of branches of a union.
    pub fn branch_count(&self) -> Option<usize> {
        match self.kind() {
            SchemaKind::Union { branches } => Some(branches.len()),
            _ => None,
        }
    }

    /// Schema of the union branch at a 0-based discriminant.
    pub fn branch(&self, discriminant: usize) -> Option<Schema> {
        match self.kind() {
            SchemaKind::Union { branches } => branches.get(discriminant).map(|b| self.at(*b)),
            _ => None,
        }
    }

    /// Finds a union branch by type name, returning its discriminant.
    pub fn branch_by_name(&self, name: &str) -> Option<(usize, Schema)> {
        match self.kind() {
            SchemaKind::Union { branches } => branches
                .iter()
                .position(|b| self.arena.type_name(*b) == name)
                .map(|i| (i, self.at(branches[i]))),
            _ => None,
        }
    }

    /// Checks whether two schemas describe the same shape: same tags, same
    /// names for named types and fields, same sizes and symbols. Defaults are
    /// not compared. Safe on recursive schemas.
    pub fn structurally_equal(&self, other: &Schema) -> bool {
        let mut visited = HashSet::new();
        structurally_equal(&self.arena, self.id, &other.arena, other.id, &mut visited)
    }
}

fn structurally_equal(
    a_arena: &SchemaArena,
    a: SchemaId,
    b_arena: &SchemaArena,
    b: SchemaId,
    visited: &mut HashSet<(SchemaId, SchemaId)>,
) -> bool {
    let a = a_arena.deref(a);
    let b = b_arena.deref(b);
    // assume equal while the pair is being compared; this terminates recursion
    if !visited.insert((a, b)) {
        return true;
    }

    match (a_arena.node(a), b_arena.node(b)) {
        (SchemaKind::Fixed { name: an, size: asz }, SchemaKind::Fixed { name: bn, size: bsz }) => {
            an == bn && asz == bsz
        }
        (
            SchemaKind::Enum { name: an, symbols: asy, .. },
            SchemaKind::Enum { name: bn, symbols: bsy, .. },
        ) => an == bn && asy == bsy,
        (SchemaKind::Array { items: ai }, SchemaKind::Array { items: bi }) => {
            structurally_equal(a_arena, *ai, b_arena, *bi, visited)
        }
        (SchemaKind::Map { values: av }, SchemaKind::Map { values: bv }) => {
            structurally_equal(a_arena, *av, b_arena, *bv, visited)
        }
        (
            SchemaKind::Record { name: an, fields: af },
            SchemaKind::Record { name: bn, fields: bf },
        ) => {
            an == bn
                && af.len() == bf.len()
                && af.iter().zip(bf.iter()).all(|(x, y)| {
                    x.name == y.name
                        && structurally_equal(a_arena, x.schema, b_arena, y.schema, visited)
                })
        }
        (SchemaKind::Union { branches: ab }, SchemaKind::Union { branches: bb }) => {
            ab.len() == bb.len()
                && ab
                    .iter()
                    .zip(bb.iter())
                    .all(|(x, y)| structurally_equal(a_arena, *x, b_arena, *y, visited))
        }
        (x, y) => x.tag().is_primitive() && x.tag() == y.tag(),
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equal(other)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id.0)
            .field("type", &self.type_tag())
            .field("name", &self.type_name())
            .finish()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    #[test]
    fn test_primitive_constructors() {
        assert_eq!(Schema::int().type_tag(), TypeTag::Int);
        assert_eq!(Schema::string().type_name(), "string");
        assert!(Schema::primitive(TypeTag::Record).is_err());
        assert_eq!(TypeTag::primitive_from_name("double"), Some(TypeTag::Double));
        assert_eq!(TypeTag::primitive_from_name("record"), None);
    }

    #[test]
    fn test_branch_lookup_by_type_name() {
        let mut b = SchemaBuilder::new();
        let null = b.primitive(TypeTag::Null).unwrap();
        let point = b.record("Point").unwrap();
        let int = b.primitive(TypeTag::Int).unwrap();
        b.field(point, "x", int, None).unwrap();
        let u = b.union(vec![null, point]).unwrap();
        let schema = b.build(u).unwrap();

        let (idx, branch) = schema.branch_by_name("Point").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(branch.type_tag(), TypeTag::Record);
        assert!(schema.branch_by_name("int").is_none());
    }

    #[test]
    fn test_structural_equality_on_recursive_schemas() {
        let build = || {
            let mut b = SchemaBuilder::new();
            let node = b.record("Node").unwrap();
            let long = b.primitive(TypeTag::Long).unwrap();
            let null = b.primitive(TypeTag::Null).unwrap();
            let link = b.link("Node").unwrap();
            let next = b.union(vec![null, link]).unwrap();
            b.field(node, "value", long, None).unwrap();
            b.field(node, "next", next, None).unwrap();
            b.build(node).unwrap()
        };
        assert!(build().structurally_equal(&build()));
        assert!(!build().structurally_equal(&Schema::long()));
    }
}
