// Generic values
//
// A `Value` owns a datum built for one schema. `ValueRef` and `ValueMut` are
// borrowed views into a value or any of its children; they carry the schema
// node they were reached through, so every operation can dispatch on it.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec;
use crate::internal::error::{Error, Result};
use crate::schema::types::{Schema, SchemaArena, SchemaId, SchemaKind, TypeTag};
use crate::value::datum::Datum;
use crate::value::iter::Entries;
use crate::value::scalar::Scalar;
use crate::value::{ast, compare};

/// Converts a 1-based position into a 0-based slot.
fn slot(position: usize, size: usize) -> Result<usize> {
    if position == 0 || position > size {
        return Err(Error::IndexOutOfBounds { position, size });
    }
    Ok(position - 1)
}

fn setter_name(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Null => "set_null",
        TypeTag::Boolean => "set_boolean",
        TypeTag::Int => "set_int",
        TypeTag::Long => "set_long",
        TypeTag::Float => "set_float",
        TypeTag::Double => "set_double",
        TypeTag::Bytes => "set_bytes",
        TypeTag::String => "set_string",
        TypeTag::Fixed => "set_fixed",
        TypeTag::Enum => "set_enum",
        _ => "set_scalar",
    }
}

/// An owned value conforming to a schema.
#[derive(Clone)]
pub struct Value {
    schema: Schema,
    datum: Datum,
}

impl Value {
    /// Creates an empty value for `schema` (links are followed).
    pub fn new(schema: &Schema) -> Value {
        let schema = schema.dereference();
        let datum = Datum::empty(schema.arena(), schema.id());
        Value { schema, datum }
    }

    /// Creates a value and fills it from a literal (see `populate`).
    pub fn from_literal(schema: &Schema, literal: &serde_json::Value) -> Result<Value> {
        let mut value = Value::new(schema);
        value.populate(literal)?;
        Ok(value)
    }

    pub(crate) fn into_datum(self) -> Datum {
        self.datum
    }

    /// Borrowed read view of the whole value.
    pub fn view(&self) -> ValueRef<'_> {
        ValueRef::new(self.schema.arena(), self.schema.id(), &self.datum)
    }

    /// Borrowed write view of the whole value.
    pub fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::new(self.schema.arena(), self.schema.id(), &mut self.datum)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("schema", &self.schema)
            .field("datum", &self.datum)
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

/// Shared view of a value or one of its children.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    arena: &'a Arc<SchemaArena>,
    id: SchemaId,
    datum: &'a Datum,
}

impl<'a> ValueRef<'a> {
    pub(crate) fn new(arena: &'a Arc<SchemaArena>, id: SchemaId, datum: &'a Datum) -> Self {
        ValueRef {
            arena,
            id: arena.deref(id),
            datum,
        }
    }

    pub(crate) fn datum(&self) -> &'a Datum {
        self.datum
    }

    pub(crate) fn arena(&self) -> &'a Arc<SchemaArena> {
        self.arena
    }

    pub(crate) fn schema_id(&self) -> SchemaId {
        self.id
    }

    fn node(&self) -> &'a SchemaKind {
        self.arena.node(self.id)
    }

    fn child(&self, id: SchemaId, datum: &'a Datum) -> ValueRef<'a> {
        ValueRef::new(self.arena, id, datum)
    }

    fn mismatch(&self, operation: &'static str) -> Error {
        Error::type_mismatch(operation, self.type_tag())
    }

    /// Handle on the schema this value was built from.
    pub fn schema(&self) -> Schema {
        Schema::new(self.arena.clone(), self.id)
    }

    /// Type tag of the value.
    pub fn type_tag(&self) -> TypeTag {
        self.node().tag()
    }

    /// Name a union would use for this value's type.
    pub fn type_name(&self) -> &'a str {
        self.arena.type_name(self.id)
    }

    /// Reads any scalar type.
    pub fn get_scalar(&self) -> Result<Scalar<'a>> {
        match self.datum {
            Datum::Null => Ok(Scalar::Null),
            Datum::Boolean(v) => Ok(Scalar::Boolean(*v)),
            Datum::Int(v) => Ok(Scalar::Int(*v)),
            Datum::Long(v) => Ok(Scalar::Long(*v)),
            Datum::Float(v) => Ok(Scalar::Float(*v)),
            Datum::Double(v) => Ok(Scalar::Double(*v)),
            Datum::Bytes(v) => Ok(Scalar::Bytes(v.as_ref())),
            Datum::String(v) => Ok(Scalar::String(v.as_str())),
            Datum::Fixed(v) => Ok(Scalar::Fixed(v.as_ref())),
            Datum::Enum(v) => Ok(Scalar::Enum(*v)),
            _ => Err(self.mismatch("get_scalar")),
        }
    }

    /// Boolean payload; `TypeMismatch` for other types.
    pub fn get_boolean(&self) -> Result<bool> {
        match self.datum {
            Datum::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch("get_boolean")),
        }
    }

    /// Int payload; `TypeMismatch` for other types.
    pub fn get_int(&self) -> Result<i32> {
        match self.datum {
            Datum::Int(v) => Ok(*v),
            _ => Err(self.mismatch("get_int")),
        }
    }

    /// Long payload; `TypeMismatch` for other types.
    pub fn get_long(&self) -> Result<i64> {
        match self.datum {
            Datum::Long(v) => Ok(*v),
            _ => Err(self.mismatch("get_long")),
        }
    }

    /// Float payload; `TypeMismatch` for other types.
    pub fn get_float(&self) -> Result<f32> {
        match self.datum {
            Datum::Float(v) => Ok(*v),
            _ => Err(self.mismatch("get_float")),
        }
    }

    /// Double payload; `TypeMismatch` for other types.
    pub fn get_double(&self) -> Result<f64> {
        match self.datum {
            Datum::Double(v) => Ok(*v),
            _ => Err(self.mismatch("get_double")),
        }
    }

    /// Bytes payload; `TypeMismatch` for other types.
    pub fn get_bytes(&self) -> Result<&'a [u8]> {
        match self.datum {
            Datum::Bytes(v) => Ok(v.as_ref()),
            _ => Err(self.mismatch("get_bytes")),
        }
    }

    /// String payload; `TypeMismatch` for other types.
    pub fn get_string(&self) -> Result<&'a str> {
        match self.datum {
            Datum::String(v) => Ok(v.as_str()),
            _ => Err(self.mismatch("get_string")),
        }
    }

    /// Fixed payload, always exactly the schema's size.
    pub fn get_fixed(&self) -> Result<&'a [u8]> {
        match self.datum {
            Datum::Fixed(v) => Ok(v.as_ref()),
            _ => Err(self.mismatch("get_fixed")),
        }
    }

    /// 0-based index of the current enum symbol.
    pub fn get_enum(&self) -> Result<usize> {
        match self.datum {
            Datum::Enum(v) => Ok(*v),
            _ => Err(self.mismatch("get_enum")),
        }
    }

    /// Name of the current enum symbol.
    pub fn enum_symbol(&self) -> Result<&'a str> {
        match (self.node(), self.datum) {
            (SchemaKind::Enum { symbols, .. }, Datum::Enum(i)) => Ok(symbols[*i].as_str()),
            _ => Err(self.mismatch("enum_symbol")),
        }
    }

    /// Number of elements of an array or entries of a map.
    pub fn size(&self) -> Result<usize> {
        match self.datum {
            Datum::Array(items) => Ok(items.len()),
            Datum::Map(map) => Ok(map.len()),
            _ => Err(self.mismatch("size")),
        }
    }

    /// Child at a 1-based position of an array, map or record. Maps also
    /// return the entry key.
    pub fn get_by_index(&self, position: usize) -> Result<(ValueRef<'a>, Option<&'a str>)> {
        match (self.node(), self.datum) {
            (SchemaKind::Array { items }, Datum::Array(elements)) => {
                let i = slot(position, elements.len())?;
                Ok((self.child(*items, &elements[i]), None))
            }
            (SchemaKind::Map { values }, Datum::Map(map)) => {
                let i = slot(position, map.len())?;
                match map.entry(i) {
                    Some((key, datum)) => Ok((self.child(*values, datum), Some(key))),
                    None => Err(Error::IndexOutOfBounds { position, size: map.len() }),
                }
            }
            (SchemaKind::Record { fields, .. }, Datum::Record(slots)) => {
                let i = slot(position, slots.len())?;
                Ok((self.child(fields[i].schema, &slots[i]), None))
            }
            _ => Err(self.mismatch("get_by_index")),
        }
    }

    /// Child of a map or record by key / field name, with its 1-based position.
    pub fn get_by_name(&self, name: &str) -> Result<(ValueRef<'a>, usize)> {
        match (self.node(), self.datum) {
            (SchemaKind::Map { values }, Datum::Map(map)) => match map.position(name) {
                Some(i) => match map.entry(i) {
                    Some((_, datum)) => Ok((self.child(*values, datum), i + 1)),
                    None => Err(Error::NoSuchField(name.to_string())),
                },
                None => Err(Error::NoSuchField(name.to_string())),
            },
            (SchemaKind::Record { fields, .. }, Datum::Record(slots)) => {
                match fields.iter().position(|f| f.name == name) {
                    Some(i) => Ok((self.child(fields[i].schema, &slots[i]), i + 1)),
                    None => Err(Error::NoSuchField(name.to_string())),
                }
            }
            _ => Err(self.mismatch("get_by_name")),
        }
    }

    /// Active 0-based branch of a union, `None` when unset.
    pub fn discriminant(&self) -> Result<Option<usize>> {
        match self.datum {
            Datum::Union(active) => Ok(active.as_ref().map(|(d, _)| *d)),
            _ => Err(self.mismatch("discriminant")),
        }
    }

    /// The active branch of a union.
    pub fn current_branch(&self) -> Result<ValueRef<'a>> {
        match (self.node(), self.datum) {
            (SchemaKind::Union { branches }, Datum::Union(Some((d, branch)))) => {
                Ok(self.child(branches[*d], branch))
            }
            (SchemaKind::Union { .. }, Datum::Union(None)) => Err(Error::EmptyUnion),
            _ => Err(self.mismatch("current_branch")),
        }
    }

    /// Iterates the elements of an array or the entries of a map.
    pub fn iter(&self) -> Result<Entries<'a>> {
        Entries::new(*self)
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueRef")
            .field("type", &self.type_name())
            .field("datum", self.datum)
            .finish()
    }
}

/// Exclusive view of a value or one of its children.
///
/// Methods prefixed with `into_` consume the view and return a child view
/// with the same lifetime; use `reborrow` to keep the parent view usable.
pub struct ValueMut<'a> {
    arena: &'a Arc<SchemaArena>,
    id: SchemaId,
    datum: &'a mut Datum,
}

impl<'a> ValueMut<'a> {
    pub(crate) fn new(arena: &'a Arc<SchemaArena>, id: SchemaId, datum: &'a mut Datum) -> Self {
        ValueMut {
            arena,
            id: arena.deref(id),
            datum,
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&Arc<SchemaArena>, SchemaId, &mut Datum) {
        (self.arena, self.id, &mut *self.datum)
    }

    fn node(&self) -> &'a SchemaKind {
        self.arena.node(self.id)
    }

    fn mismatch(&self, operation: &'static str) -> Error {
        Error::type_mismatch(operation, self.node().tag())
    }

    /// Shared view of the same value.
    pub fn view(&self) -> ValueRef<'_> {
        ValueRef::new(self.arena, self.id, &*self.datum)
    }

    /// Shorter-lived exclusive view of the same value.
    pub fn reborrow(&mut self) -> ValueMut<'_> {
        ValueMut::new(self.arena, self.id, &mut *self.datum)
    }

    /// Handle on the schema this value was built from.
    pub fn schema(&self) -> Schema {
        Schema::new(self.arena.clone(), self.id)
    }

    /// Type tag of the value.
    pub fn type_tag(&self) -> TypeTag {
        self.node().tag()
    }

    /// Overwrites a scalar. The scalar's type must match the value's type
    /// exactly; fixed payloads must have the declared size and enum indices
    /// must name a symbol.
    pub fn set_scalar(&mut self, scalar: Scalar<'_>) -> Result<()> {
        let node = self.node();
        match (&mut *self.datum, scalar) {
            (Datum::Null, Scalar::Null) => {}
            (Datum::Boolean(slot), Scalar::Boolean(v)) => *slot = v,
            (Datum::Int(slot), Scalar::Int(v)) => *slot = v,
            (Datum::Long(slot), Scalar::Long(v)) => *slot = v,
            (Datum::Float(slot), Scalar::Float(v)) => *slot = v,
            (Datum::Double(slot), Scalar::Double(v)) => *slot = v,
            (Datum::Bytes(slot), Scalar::Bytes(v)) => *slot = Bytes::copy_from_slice(v),
            (Datum::String(slot), Scalar::String(v)) => {
                slot.clear();
                slot.push_str(v);
            }
            (Datum::Fixed(slot), Scalar::Fixed(v)) => {
                if v.len() != slot.len() {
                    return Err(Error::OutOfRange(format!(
                        "fixed '{}' holds {} bytes, got {}",
                        node.name().unwrap_or_default(),
                        slot.len(),
                        v.len()
                    )));
                }
                *slot = Bytes::copy_from_slice(v);
            }
            (Datum::Enum(slot), Scalar::Enum(v)) => {
                let count = match node {
                    SchemaKind::Enum { symbols, .. } => symbols.len(),
                    _ => 0,
                };
                if v >= count {
                    return Err(Error::OutOfRange(format!(
                        "enum '{}' has {} symbols, got index {}",
                        node.name().unwrap_or_default(),
                        count,
                        v
                    )));
                }
                *slot = v;
            }
            (_, scalar) => {
                return Err(Error::type_mismatch(setter_name(scalar.type_tag()), node.tag()))
            }
        }
        Ok(())
    }

    /// Selects an enum symbol by name.
    pub fn set_enum_symbol(&mut self, symbol: &str) -> Result<()> {
        match self.node() {
            SchemaKind::Enum { name, symbols, .. } => {
                let index = symbols.iter().position(|s| s == symbol).ok_or_else(|| {
                    Error::OutOfRange(format!("enum '{}' has no symbol '{}'", name, symbol))
                })?;
                self.set_scalar(Scalar::Enum(index))
            }
            _ => Err(self.mismatch("set_enum")),
        }
    }

    /// Returns the value to the empty state of its type.
    pub fn reset(&mut self) {
        match &mut *self.datum {
            // keep container allocations
            Datum::Array(items) => items.clear(),
            Datum::Map(map) => map.clear(),
            datum => *datum = Datum::empty(self.arena, self.id),
        }
    }

    /// Deep-copies `src` into this value. The schemas must be structurally
    /// equal.
    pub fn copy_from(&mut self, src: ValueRef<'_>) -> Result<()> {
        let same_node = Arc::ptr_eq(self.arena, src.arena()) && self.id == src.schema_id();
        if !same_node && !self.schema().structurally_equal(&src.schema()) {
            return Err(Error::SchemaMismatch(format!(
                "cannot copy a {} value into a {} value",
                src.type_name(),
                self.arena.type_name(self.id)
            )));
        }
        *self.datum = src.datum().clone();
        Ok(())
    }

    /// Child at a 1-based position of an array, map or record.
    pub fn into_by_index(self, position: usize) -> Result<(ValueMut<'a>, Option<&'a str>)> {
        let ValueMut { arena, id, datum } = self;
        match (arena.node(id), datum) {
            (SchemaKind::Array { items }, Datum::Array(elements)) => {
                let i = slot(position, elements.len())?;
                Ok((ValueMut::new(arena, *items, &mut elements[i]), None))
            }
            (SchemaKind::Map { values }, Datum::Map(map)) => {
                let size = map.len();
                let i = slot(position, size)?;
                match map.entry_mut(i) {
                    Some((key, datum)) => Ok((ValueMut::new(arena, *values, datum), Some(key))),
                    None => Err(Error::IndexOutOfBounds { position, size }),
                }
            }
            (SchemaKind::Record { fields, .. }, Datum::Record(slots)) => {
                let i = slot(position, slots.len())?;
                Ok((ValueMut::new(arena, fields[i].schema, &mut slots[i]), None))
            }
            (node, _) => Err(Error::type_mismatch("get_by_index", node.tag())),
        }
    }

    /// Child of a map or record by key / field name, with its 1-based position.
    pub fn into_by_name(self, name: &str) -> Result<(ValueMut<'a>, usize)> {
        let ValueMut { arena, id, datum } = self;
        match (arena.node(id), datum) {
            (SchemaKind::Map { values }, Datum::Map(map)) => {
                let i = map
                    .position(name)
                    .ok_or_else(|| Error::NoSuchField(name.to_string()))?;
                match map.entry_mut(i) {
                    Some((_, datum)) => Ok((ValueMut::new(arena, *values, datum), i + 1)),
                    None => Err(Error::NoSuchField(name.to_string())),
                }
            }
            (SchemaKind::Record { fields, .. }, Datum::Record(slots)) => {
                let i = fields
                    .iter()
                    .position(|f| f.name == name)
                    .ok_or_else(|| Error::NoSuchField(name.to_string()))?;
                Ok((ValueMut::new(arena, fields[i].schema, &mut slots[i]), i + 1))
            }
            (node, _) => Err(Error::type_mismatch("get_by_name", node.tag())),
        }
    }

    /// Adds an empty map entry under `key`; an existing entry is reset in
    /// place and returned.
    pub fn into_add(self, key: &str) -> Result<ValueMut<'a>> {
        let ValueMut { arena, id, datum } = self;
        match (arena.node(id), datum) {
            (SchemaKind::Map { values }, Datum::Map(map)) => {
                let i = map.insert(key, Datum::empty(arena, *values));
                match map.entry_mut(i) {
                    Some((_, datum)) => Ok(ValueMut::new(arena, *values, datum)),
                    None => Err(Error::NoSuchField(key.to_string())),
                }
            }
            (node, _) => Err(Error::type_mismatch("add", node.tag())),
        }
    }

    /// Appends one empty element to an array.
    pub fn into_append(self) -> Result<ValueMut<'a>> {
        let ValueMut { arena, id, datum } = self;
        match (arena.node(id), datum) {
            (SchemaKind::Array { items }, Datum::Array(elements)) => {
                elements.try_reserve(1)?;
                elements.push(Datum::empty(arena, *items));
                let last = elements.len() - 1;
                Ok(ValueMut::new(arena, *items, &mut elements[last]))
            }
            (node, _) => Err(Error::type_mismatch("append", node.tag())),
        }
    }

    /// Selects a union branch by 0-based discriminant, resetting the value
    /// to that branch's empty state.
    pub fn into_set_discriminant(self, discriminant: usize) -> Result<ValueMut<'a>> {
        let ValueMut { arena, id, datum } = self;
        match arena.node(id) {
            SchemaKind::Union { branches } => {
                let branch = *branches.get(discriminant).ok_or_else(|| {
                    Error::NoSuchBranch(format!(
                        "discriminant {} (union has {} branches)",
                        discriminant,
                        branches.len()
                    ))
                })?;
                *datum = Datum::Union(Some((discriminant, Box::new(Datum::empty(arena, branch)))));
                match datum {
                    Datum::Union(Some((_, slot))) => Ok(ValueMut::new(arena, branch, slot.as_mut())),
                    _ => Err(Error::EmptyUnion),
                }
            }
            node => Err(Error::type_mismatch("set_discriminant", node.tag())),
        }
    }

    /// Selects a union branch by type name.
    pub fn into_set_branch(self, name: &str) -> Result<ValueMut<'a>> {
        match self.node() {
            SchemaKind::Union { branches } => {
                let discriminant = branches
                    .iter()
                    .position(|b| self.arena.type_name(*b) == name)
                    .ok_or_else(|| Error::NoSuchBranch(name.to_string()))?;
                self.into_set_discriminant(discriminant)
            }
            node => Err(Error::type_mismatch("set_branch", node.tag())),
        }
    }

    /// The active branch of a union.
    pub fn into_current_branch(self) -> Result<ValueMut<'a>> {
        let ValueMut { arena, id, datum } = self;
        match (arena.node(id), datum) {
            (SchemaKind::Union { branches }, Datum::Union(Some((d, branch)))) => {
                Ok(ValueMut::new(arena, branches[*d], branch.as_mut()))
            }
            (SchemaKind::Union { .. }, Datum::Union(None)) => Err(Error::EmptyUnion),
            (node, _) => Err(Error::type_mismatch("current_branch", node.tag())),
        }
    }
}

impl fmt::Debug for ValueMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueMut")
            .field("type", &self.arena.type_name(self.id))
            .field("datum", &*self.datum)
            .finish()
    }
}

/// Read operations shared by owned values and views.
pub trait ValueInterface {
    /// Shared view used by every provided method.
    fn as_value_ref(&self) -> ValueRef<'_>;

    fn schema(&self) -> Schema {
        self.as_value_ref().schema()
    }

    fn type_tag(&self) -> TypeTag {
        self.as_value_ref().type_tag()
    }

    /// Name a union would use for this value's type.
    fn type_name(&self) -> &str {
        self.as_value_ref().type_name()
    }

    fn get_scalar(&self) -> Result<Scalar<'_>> {
        self.as_value_ref().get_scalar()
    }

    fn get_boolean(&self) -> Result<bool> {
        self.as_value_ref().get_boolean()
    }

    fn get_int(&self) -> Result<i32> {
        self.as_value_ref().get_int()
    }

    fn get_long(&self) -> Result<i64> {
        self.as_value_ref().get_long()
    }

    fn get_float(&self) -> Result<f32> {
        self.as_value_ref().get_float()
    }

    fn get_double(&self) -> Result<f64> {
        self.as_value_ref().get_double()
    }

    fn get_bytes(&self) -> Result<&[u8]> {
        self.as_value_ref().get_bytes()
    }

    fn get_string(&self) -> Result<&str> {
        self.as_value_ref().get_string()
    }

    fn get_fixed(&self) -> Result<&[u8]> {
        self.as_value_ref().get_fixed()
    }

    fn get_enum(&self) -> Result<usize> {
        self.as_value_ref().get_enum()
    }

    fn enum_symbol(&self) -> Result<&str> {
        self.as_value_ref().enum_symbol()
    }

    fn size(&self) -> Result<usize> {
        self.as_value_ref().size()
    }

    fn get_by_index(&self, position: usize) -> Result<(ValueRef<'_>, Option<&str>)> {
        self.as_value_ref().get_by_index(position)
    }

    fn get_by_name(&self, name: &str) -> Result<(ValueRef<'_>, usize)> {
        self.as_value_ref().get_by_name(name)
    }

    fn discriminant(&self) -> Result<Option<usize>> {
        self.as_value_ref().discriminant()
    }

    fn current_branch(&self) -> Result<ValueRef<'_>> {
        self.as_value_ref().current_branch()
    }

    fn iter(&self) -> Result<Entries<'_>> {
        self.as_value_ref().iter()
    }

    fn equal<V: ValueInterface + ?Sized>(&self, other: &V) -> bool
    where
        Self: Sized,
    {
        compare::equal(self.as_value_ref(), other.as_value_ref())
    }

    fn compare<V: ValueInterface + ?Sized>(&self, other: &V) -> Ordering
    where
        Self: Sized,
    {
        compare::compare(self.as_value_ref(), other.as_value_ref())
    }

    /// Stable structural hash; equal values hash equal.
    fn hash(&self) -> u32 {
        compare::hash(self.as_value_ref())
    }

    /// Renders the value in the literal format accepted by `populate`.
    fn to_json(&self) -> serde_json::Value {
        ast::to_json(self.as_value_ref())
    }

    fn encoded_size(&self) -> Result<usize> {
        codec::encoded_size_of(self.as_value_ref())
    }

    fn encode_to_vec(&self) -> Result<Vec<u8>> {
        codec::encode_to_vec_of(self.as_value_ref())
    }
}

/// Write operations shared by owned values and exclusive views.
pub trait ValueInterfaceMut: ValueInterface {
    /// Exclusive view used by every provided method.
    fn as_value_mut(&mut self) -> ValueMut<'_>;

    fn set_scalar(&mut self, scalar: Scalar<'_>) -> Result<()> {
        self.as_value_mut().set_scalar(scalar)
    }

    fn set_null(&mut self) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Null)
    }

    fn set_boolean(&mut self, v: bool) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Boolean(v))
    }

    fn set_int(&mut self, v: i32) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Int(v))
    }

    fn set_long(&mut self, v: i64) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Long(v))
    }

    fn set_float(&mut self, v: f32) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Float(v))
    }

    fn set_double(&mut self, v: f64) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Double(v))
    }

    fn set_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Bytes(v))
    }

    fn set_string(&mut self, v: &str) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::String(v))
    }

    fn set_fixed(&mut self, v: &[u8]) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Fixed(v))
    }

    /// Selects an enum symbol by 0-based index.
    fn set_enum(&mut self, index: usize) -> Result<()> {
        self.as_value_mut().set_scalar(Scalar::Enum(index))
    }

    fn set_enum_symbol(&mut self, symbol: &str) -> Result<()> {
        self.as_value_mut().set_enum_symbol(symbol)
    }

    fn reset(&mut self) {
        self.as_value_mut().reset()
    }

    fn copy_from<V: ValueInterface + ?Sized>(&mut self, src: &V) -> Result<()>
    where
        Self: Sized,
    {
        self.as_value_mut().copy_from(src.as_value_ref())
    }

    fn get_by_index_mut(&mut self, position: usize) -> Result<(ValueMut<'_>, Option<&str>)> {
        self.as_value_mut().into_by_index(position)
    }

    fn get_by_name_mut(&mut self, name: &str) -> Result<(ValueMut<'_>, usize)> {
        self.as_value_mut().into_by_name(name)
    }

    fn add(&mut self, key: &str) -> Result<ValueMut<'_>> {
        self.as_value_mut().into_add(key)
    }

    fn append(&mut self) -> Result<ValueMut<'_>> {
        self.as_value_mut().into_append()
    }

    fn set_discriminant(&mut self, discriminant: usize) -> Result<ValueMut<'_>> {
        self.as_value_mut().into_set_discriminant(discriminant)
    }

    fn set_branch(&mut self, name: &str) -> Result<ValueMut<'_>> {
        self.as_value_mut().into_set_branch(name)
    }

    fn current_branch_mut(&mut self) -> Result<ValueMut<'_>> {
        self.as_value_mut().into_current_branch()
    }

    /// Fills the value from a tree literal whose shape matches the schema.
    fn populate(&mut self, literal: &serde_json::Value) -> Result<()> {
        ast::populate(self.as_value_mut(), literal)
    }
}

impl ValueInterface for Value {
    fn as_value_ref(&self) -> ValueRef<'_> {
        self.view()
    }
}

impl ValueInterfaceMut for Value {
    fn as_value_mut(&mut self) -> ValueMut<'_> {
        self.view_mut()
    }
}

impl ValueInterface for ValueRef<'_> {
    fn as_value_ref(&self) -> ValueRef<'_> {
        *self
    }
}

impl ValueInterface for ValueMut<'_> {
    fn as_value_ref(&self) -> ValueRef<'_> {
        self.view()
    }
}

impl ValueInterfaceMut for ValueMut<'_> {
    fn as_value_mut(&mut self) -> ValueMut<'_> {
        self.reborrow()
    }
}
