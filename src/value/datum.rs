// In-memory state of a generic value
//
// A `Datum` only makes sense next to the schema node it was built from; the
// pairing is maintained by `Value`, `ValueRef` and `ValueMut`.

use std::collections::HashMap;

use bytes::Bytes;

use crate::schema::types::{SchemaArena, SchemaId, SchemaKind};

#[derive(Debug, Clone)]
pub(crate) enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
    Fixed(Bytes),
    Enum(usize),
    Array(Vec<Datum>),
    Map(MapDatum),
    /// Field values in declaration order
    Record(Vec<Datum>),
    /// Active discriminant and branch, `None` while unset
    Union(Option<(usize, Box<Datum>)>),
}

impl Datum {
    /// Builds the empty state for a schema node: zero scalars, empty
    /// containers, field-wise empty records and unset unions.
    pub(crate) fn empty(arena: &SchemaArena, id: SchemaId) -> Datum {
        let id = arena.deref(id);
        match arena.node(id) {
            SchemaKind::Null => Datum::Null,
            SchemaKind::Boolean => Datum::Boolean(false),
            SchemaKind::Int => Datum::Int(0),
            SchemaKind::Long => Datum::Long(0),
            SchemaKind::Float => Datum::Float(0.0),
            SchemaKind::Double => Datum::Double(0.0),
            SchemaKind::Bytes => Datum::Bytes(Bytes::new()),
            SchemaKind::String => Datum::String(String::new()),
            SchemaKind::Fixed { size, .. } => Datum::Fixed(Bytes::from(vec![0u8; *size])),
            SchemaKind::Enum { .. } => Datum::Enum(0),
            SchemaKind::Array { .. } => Datum::Array(Vec::new()),
            SchemaKind::Map { .. } => Datum::Map(MapDatum::default()),
            SchemaKind::Record { fields, .. } => {
                Datum::Record(fields.iter().map(|f| Datum::empty(arena, f.schema)).collect())
            }
            SchemaKind::Union { .. } => Datum::Union(None),
            SchemaKind::Link { .. } => unreachable!("links are dereferenced above"),
        }
    }
}

/// Map storage: entries in insertion order plus a key index.
#[derive(Debug, Clone, Default)]
pub(crate) struct MapDatum {
    entries: Vec<(String, Datum)>,
    index: HashMap<String, usize>,
}

impl MapDatum {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// 0-based storage position of a key.
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Datum> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub(crate) fn entry(&self, index: usize) -> Option<(&str, &Datum)> {
        self.entries.get(index).map(|(k, d)| (k.as_str(), d))
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<(&str, &mut Datum)> {
        self.entries.get_mut(index).map(|(k, d)| (k.as_str(), d))
    }

    /// Inserts `fresh` under `key`, or replaces the existing entry in place.
    /// Returns the 0-based storage position.
    pub(crate) fn insert(&mut self, key: &str, fresh: Datum) -> usize {
        match self.index.get(key) {
            Some(&i) => {
                self.entries[i].1 = fresh;
                i
            }
            None => {
                self.entries.push((key.to_string(), fresh));
                let i = self.entries.len() - 1;
                self.index.insert(key.to_string(), i);
                i
            }
        }
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), std::collections::TryReserveError> {
        self.entries.try_reserve(additional)?;
        self.index.try_reserve(additional)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }
}
