// Programmatic schema construction
//
// The builder owns a growing list of nodes and hands out `SchemaId`s. Named
// types are registered on declaration, so a record can be declared first and
// referenced through `link` by its own fields before they are added.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::internal::error::{Error, Result};
use crate::schema::defaults;
use crate::schema::types::{RecordField, Schema, SchemaArena, SchemaId, SchemaKind, TypeTag};

/// Incrementally builds a schema arena.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<SchemaKind>,
    names: HashMap<String, SchemaId>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: SchemaKind) -> SchemaId {
        self.nodes.push(kind);
        SchemaId(self.nodes.len() - 1)
    }

    fn check_id(&self, id: SchemaId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::InvalidSchema(format!("unknown schema node #{}", id.0)))
        }
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSchema("named types need a non-empty name".to_string()));
        }
        if TypeTag::primitive_from_name(name).is_some() || matches!(name, "array" | "map" | "union") {
            return Err(Error::InvalidSchema(format!("'{}' is a reserved type name", name)));
        }
        if self.names.contains_key(name) {
            return Err(Error::InvalidSchema(format!("type '{}' is already defined", name)));
        }
        Ok(())
    }

    fn deref(&self, mut id: SchemaId) -> SchemaId {
        while let SchemaKind::Link { target, .. } = &self.nodes[id.0] {
            id = *target;
        }
        id
    }

    /// Looks up a named type declared so far.
    pub fn lookup(&self, name: &str) -> Option<SchemaId> {
        self.names.get(name).copied()
    }

    /// Adds a primitive node.
    pub fn primitive(&mut self, tag: TypeTag) -> Result<SchemaId> {
        let kind = SchemaKind::primitive(tag).ok_or_else(|| {
            Error::InvalidSchema(format!("{} is not a primitive type", tag))
        })?;
        Ok(self.push(kind))
    }

    pub fn fixed(&mut self, name: impl Into<String>, size: usize) -> Result<SchemaId> {
        let name = name.into();
        self.check_name(&name)?;
        let id = self.push(SchemaKind::Fixed { name: name.clone(), size });
        self.names.insert(name, id);
        Ok(id)
    }

    /// Adds an enum. Symbols must be non-empty and unique; a default symbol,
    /// when given, must be one of them.
    pub fn enumeration(
        &mut self,
        name: impl Into<String>,
        symbols: Vec<String>,
        default: Option<String>,
    ) -> Result<SchemaId> {
        let name = name.into();
        self.check_name(&name)?;
        if symbols.is_empty() {
            return Err(Error::InvalidSchema(format!("enum '{}' has no symbols", name)));
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "enum '{}' repeats symbol '{}'",
                    name, symbol
                )));
            }
        }
        if let Some(default) = &default {
            if !seen.contains(default.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "enum '{}' default '{}' is not a symbol",
                    name, default
                )));
            }
        }
        let id = self.push(SchemaKind::Enum {
            name: name.clone(),
            symbols,
            default,
        });
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn array(&mut self, items: SchemaId) -> Result<SchemaId> {
        self.check_id(items)?;
        Ok(self.push(SchemaKind::Array { items }))
    }

    pub fn map(&mut self, values: SchemaId) -> Result<SchemaId> {
        self.check_id(values)?;
        Ok(self.push(SchemaKind::Map { values }))
    }

    /// Declares a record with no fields yet; add them with `field`.
    pub fn record(&mut self, name: impl Into<String>) -> Result<SchemaId> {
        let name = name.into();
        self.check_name(&name)?;
        let id = self.push(SchemaKind::Record {
            name: name.clone(),
            fields: Vec::new(),
        });
        self.names.insert(name, id);
        Ok(id)
    }

    /// Appends a field to a declared record.
    pub fn field(
        &mut self,
        record: SchemaId,
        name: impl Into<String>,
        schema: SchemaId,
        default: Option<serde_json::Value>,
    ) -> Result<()> {
        self.check_id(record)?;
        self.check_id(schema)?;
        let name = name.into();
        match &mut self.nodes[record.0] {
            SchemaKind::Record { name: record_name, fields } => {
                if fields.iter().any(|f| f.name == name) {
                    return Err(Error::InvalidSchema(format!(
                        "record '{}' repeats field '{}'",
                        record_name, name
                    )));
                }
                fields.push(RecordField { name, schema, default });
                Ok(())
            }
            other => Err(Error::InvalidSchema(format!(
                "cannot add field '{}' to a {} schema",
                name,
                other.tag()
            ))),
        }
    }

    /// Adds a union. Branch type names must be unique and no branch may
    /// itself be a union.
    pub fn union(&mut self, branches: Vec<SchemaId>) -> Result<SchemaId> {
        if branches.is_empty() {
            return Err(Error::InvalidSchema("union needs at least one branch".to_string()));
        }
        let mut seen = HashSet::new();
        for branch in &branches {
            self.check_id(*branch)?;
            let target = &self.nodes[self.deref(*branch).0];
            if target.tag() == TypeTag::Union {
                return Err(Error::InvalidSchema("unions may not contain unions".to_string()));
            }
            let type_name = target.name().unwrap_or_else(|| target.tag().name()).to_string();
            if !seen.insert(type_name.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "union has more than one '{}' branch",
                    type_name
                )));
            }
        }
        Ok(self.push(SchemaKind::Union { branches }))
    }

    /// Adds a non-owning reference to an already declared named type.
    pub fn link(&mut self, name: &str) -> Result<SchemaId> {
        let target = self
            .lookup(name)
            .ok_or_else(|| Error::InvalidSchema(format!("unknown type '{}'", name)))?;
        Ok(self.push(SchemaKind::Link {
            name: name.to_string(),
            target,
        }))
    }

    /// Freezes the arena and returns a handle on `root`. Every field default
    /// is checked against its field schema.
    pub fn build(self, root: SchemaId) -> Result<Schema> {
        self.check_id(root)?;
        let arena = Arc::new(SchemaArena::from_nodes(self.nodes));
        let root = Schema::new(arena.clone(), root);

        for index in 0..arena.len() {
            if let SchemaKind::Record { name, .. } = arena.node(SchemaId(index)) {
                if contains_itself(&arena, SchemaId(index)) {
                    return Err(Error::InvalidSchema(format!(
                        "record '{}' contains itself without an array, map or union in between",
                        name
                    )));
                }
            }
        }

        // every record has a finite empty value from here on
        for index in 0..arena.len() {
            if let SchemaKind::Record { name, fields } = arena.node(SchemaId(index)) {
                for field in fields {
                    if let Some(literal) = &field.default {
                        defaults::materialize(&root.at(field.schema), literal).map_err(|e| {
                            Error::InvalidSchema(format!(
                                "default for {}.{} is invalid: {}",
                                name, field.name, e
                            ))
                        })?;
                    }
                }
            }
        }
        Ok(root)
    }
}

/// True when a record reaches itself through record fields alone. Such a
/// record has no finite value.
fn contains_itself(arena: &SchemaArena, record: SchemaId) -> bool {
    let mut stack = vec![record];
    let mut visited = HashSet::new();
    while let Some(id) = stack.pop() {
        if let SchemaKind::Record { fields, .. } = arena.node(id) {
            for field in fields {
                let target = arena.deref(field.schema);
                if target == record {
                    return true;
                }
                if visited.insert(target) {
                    stack.push(target);
                }
            }
        }
    }
    false
}
