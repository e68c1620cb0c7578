// Resolution plans
//
// A plan pairs every reachable (writer node, reader node) combination with a
// step describing how writer data becomes reader data. Steps live in a flat
// arena and refer to each other by `PlanId`; pairs are memoised so recursive
// schemas produce finite plans.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::internal::error::{Error, Result};
use crate::schema::defaults;
use crate::schema::types::{Schema, SchemaArena, SchemaId, SchemaKind, TypeTag};
use crate::value::datum::Datum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PlanId(usize);

#[derive(Debug, Clone)]
pub(crate) enum FieldStep {
    /// Writer field feeding the reader field at `reader_index`
    Read { reader_index: usize, plan: PlanId },
    /// Writer-only field, consumed and dropped
    Skip { writer: SchemaId, name: String },
}

#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Placeholder while a pair is being resolved
    Pending,
    /// Identity, numeric widening or string/bytes reinterpretation
    Primitive { writer: TypeTag, reader: TypeTag },
    Fixed { size: usize },
    /// Reader symbol for each writer symbol; `None` has no reader match
    Enum { mapping: Vec<Option<usize>>, writer: SchemaId },
    Array { items: PlanId, reader_items: SchemaId },
    Map { values: PlanId, reader_values: SchemaId },
    Record {
        fields: Vec<FieldStep>,
        /// Reader-only fields and their materialised defaults
        defaults: Vec<(usize, Datum)>,
    },
    /// Writer union: one plan per writer branch, `None` when the branch has
    /// no reader counterpart
    WriterUnion { branches: Vec<Option<PlanId>>, writer: SchemaId },
    /// Non-union writer stored into one branch of a reader union
    ReaderUnion {
        discriminant: usize,
        reader_branch: SchemaId,
        branch: PlanId,
    },
}

/// Whether writer primitive data can be read as the reader primitive.
pub(crate) fn promotable(writer: TypeTag, reader: TypeTag) -> bool {
    use TypeTag::*;
    writer == reader
        || matches!(
            (writer, reader),
            (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
                | (String, Bytes)
                | (Bytes, String)
        )
}

/// Converts a writer primitive datum into the reader's primitive type.
pub(crate) fn promote(datum: Datum, reader: TypeTag) -> Result<Datum> {
    Ok(match (datum, reader) {
        (Datum::Int(v), TypeTag::Long) => Datum::Long(i64::from(v)),
        (Datum::Int(v), TypeTag::Float) => Datum::Float(v as f32),
        (Datum::Int(v), TypeTag::Double) => Datum::Double(f64::from(v)),
        (Datum::Long(v), TypeTag::Float) => Datum::Float(v as f32),
        (Datum::Long(v), TypeTag::Double) => Datum::Double(v as f64),
        (Datum::Float(v), TypeTag::Double) => Datum::Double(f64::from(v)),
        (Datum::String(v), TypeTag::Bytes) => Datum::Bytes(Bytes::from(v.into_bytes())),
        (Datum::Bytes(v), TypeTag::String) => Datum::String(
            String::from_utf8(v.to_vec())
                .map_err(|e| Error::InvalidEncoding(format!("bytes are not UTF-8: {}", e)))?,
        ),
        (datum, _) => datum,
    })
}

/// A complete plan for one writer/reader schema pair.
#[derive(Debug)]
pub(crate) struct ResolutionPlan {
    writer: Schema,
    reader: Schema,
    steps: Vec<Step>,
    root: PlanId,
}

impl ResolutionPlan {
    /// Builds the plan, failing with `SchemaIncompatible` when the writer
    /// can never be read as the reader.
    pub(crate) fn build(writer: &Schema, reader: &Schema) -> Result<Self> {
        let writer = writer.dereference();
        let reader = reader.dereference();
        let mut builder = PlanBuilder {
            writer: writer.arena(),
            reader: &reader,
            steps: Vec::new(),
            memo: HashMap::new(),
        };
        let root = builder.resolve(writer.id(), reader.id())?;
        let steps = builder.steps;
        debug!(
            writer = %writer.type_name(),
            reader = %reader.type_name(),
            steps = steps.len(),
            "built resolution plan"
        );
        Ok(ResolutionPlan {
            writer,
            reader,
            steps,
            root,
        })
    }

    pub(crate) fn writer(&self) -> &Schema {
        &self.writer
    }

    pub(crate) fn reader(&self) -> &Schema {
        &self.reader
    }

    pub(crate) fn writer_arena(&self) -> &Arc<SchemaArena> {
        self.writer.arena()
    }

    pub(crate) fn reader_arena(&self) -> &Arc<SchemaArena> {
        self.reader.arena()
    }

    pub(crate) fn root(&self) -> PlanId {
        self.root
    }

    pub(crate) fn step(&self, id: PlanId) -> &Step {
        &self.steps[id.0]
    }

    /// Error for a writer enum symbol with no reader counterpart.
    pub(crate) fn missing_symbol(&self, writer: SchemaId, index: usize) -> Error {
        let symbol = match self.writer_arena().node(writer) {
            SchemaKind::Enum { symbols, .. } => symbols.get(index).map(String::as_str),
            _ => None,
        };
        Error::SchemaIncompatible(format!(
            "writer symbol '{}' has no match in the reader enum",
            symbol.unwrap_or("?")
        ))
    }

    /// Error for a writer union branch with no reader counterpart.
    pub(crate) fn missing_branch(&self, writer: SchemaId, discriminant: usize) -> Error {
        let name = match self.writer_arena().node(writer) {
            SchemaKind::Union { branches } => branches
                .get(discriminant)
                .map(|b| self.writer_arena().type_name(*b)),
            _ => None,
        };
        Error::SchemaIncompatible(format!(
            "writer union branch '{}' has no match in the reader schema",
            name.unwrap_or("?")
        ))
    }
}

struct PlanBuilder<'s> {
    writer: &'s SchemaArena,
    reader: &'s Schema,
    steps: Vec<Step>,
    memo: HashMap<(SchemaId, SchemaId), PlanId>,
}

impl<'s> PlanBuilder<'s> {
    fn reader_arena(&self) -> &'s SchemaArena {
        self.reader.arena()
    }

    fn resolve(&mut self, writer: SchemaId, reader: SchemaId) -> Result<PlanId> {
        let writer = self.writer.deref(writer);
        let reader = self.reader_arena().deref(reader);
        if let Some(id) = self.memo.get(&(writer, reader)) {
            return Ok(*id);
        }
        let id = PlanId(self.steps.len());
        self.steps.push(Step::Pending);
        self.memo.insert((writer, reader), id);
        let step = self.resolve_step(writer, reader)?;
        self.steps[id.0] = step;
        Ok(id)
    }

    /// Resolves a pair, undoing every step it added if it fails.
    fn try_resolve(&mut self, writer: SchemaId, reader: SchemaId) -> Result<PlanId> {
        let mark = self.steps.len();
        match self.resolve(writer, reader) {
            Ok(id) => Ok(id),
            Err(e) => {
                self.steps.truncate(mark);
                self.memo.retain(|_, id| id.0 < mark);
                Err(e)
            }
        }
    }

    fn incompatible(&self, writer: SchemaId, reader: SchemaId) -> Error {
        Error::SchemaIncompatible(format!(
            "writer type {} cannot be read as {}",
            self.writer.type_name(writer),
            self.reader_arena().type_name(reader)
        ))
    }

    fn resolve_step(&mut self, writer: SchemaId, reader: SchemaId) -> Result<Step> {
        let w = self.writer.node(writer);
        let r = self.reader_arena().node(reader);

        if let SchemaKind::Union { branches } = w {
            let mut plans = Vec::with_capacity(branches.len());
            for branch in branches {
                match self.try_resolve(*branch, reader) {
                    Ok(plan) => plans.push(Some(plan)),
                    Err(e) => {
                        trace!(branch = %self.writer.type_name(*branch), error = %e, "writer branch unresolvable");
                        plans.push(None);
                    }
                }
            }
            if plans.iter().all(Option::is_none) {
                return Err(Error::SchemaIncompatible(format!(
                    "no branch of the writer union can be read as {}",
                    self.reader_arena().type_name(reader)
                )));
            }
            return Ok(Step::WriterUnion { branches: plans, writer });
        }

        if let SchemaKind::Union { branches } = r {
            for (discriminant, branch) in branches.iter().enumerate() {
                if let Ok(plan) = self.try_resolve(writer, *branch) {
                    return Ok(Step::ReaderUnion {
                        discriminant,
                        reader_branch: self.reader_arena().deref(*branch),
                        branch: plan,
                    });
                }
            }
            return Err(Error::SchemaIncompatible(format!(
                "writer type {} matches no branch of the reader union",
                self.writer.type_name(writer)
            )));
        }

        match (w, r) {
            (SchemaKind::Fixed { name: wn, size: ws }, SchemaKind::Fixed { name: rn, size: rs }) => {
                if wn == rn && ws == rs {
                    Ok(Step::Fixed { size: *ws })
                } else {
                    Err(self.incompatible(writer, reader))
                }
            }
            (SchemaKind::Enum { symbols: ws, .. }, SchemaKind::Enum { symbols: rs, default, .. }) => {
                let fallback = default
                    .as_ref()
                    .and_then(|d| rs.iter().position(|s| s == d));
                let mapping = ws
                    .iter()
                    .map(|symbol| rs.iter().position(|s| s == symbol).or(fallback))
                    .collect();
                Ok(Step::Enum { mapping, writer })
            }
            (SchemaKind::Array { items: wi }, SchemaKind::Array { items: ri }) => {
                let (wi, ri) = (*wi, *ri);
                let items = self.resolve(wi, ri)?;
                Ok(Step::Array {
                    items,
                    reader_items: self.reader_arena().deref(ri),
                })
            }
            (SchemaKind::Map { values: wv }, SchemaKind::Map { values: rv }) => {
                let (wv, rv) = (*wv, *rv);
                let values = self.resolve(wv, rv)?;
                Ok(Step::Map {
                    values,
                    reader_values: self.reader_arena().deref(rv),
                })
            }
            (SchemaKind::Record { fields: wf, .. }, SchemaKind::Record { name: rname, fields: rf }) => {
                let mut matched = vec![false; rf.len()];
                let mut fields = Vec::with_capacity(wf.len());
                for field in wf {
                    match rf.iter().position(|f| f.name == field.name) {
                        Some(reader_index) => {
                            matched[reader_index] = true;
                            let plan = self.resolve(field.schema, rf[reader_index].schema)?;
                            fields.push(FieldStep::Read { reader_index, plan });
                        }
                        None => fields.push(FieldStep::Skip {
                            writer: field.schema,
                            name: field.name.clone(),
                        }),
                    }
                }
                let mut defaults = Vec::new();
                for (index, field) in rf.iter().enumerate() {
                    if matched[index] {
                        continue;
                    }
                    let literal = field.default.as_ref().ok_or_else(|| {
                        Error::SchemaIncompatible(format!(
                            "reader field {}.{} is missing from the writer and has no default",
                            rname, field.name
                        ))
                    })?;
                    let value = defaults::materialize(&self.reader.at(field.schema), literal)
                        .map_err(|e| {
                            Error::SchemaIncompatible(format!(
                                "default for {}.{} does not fit: {}",
                                rname, field.name, e
                            ))
                        })?;
                    defaults.push((index, value.into_datum()));
                }
                Ok(Step::Record { fields, defaults })
            }
            (w, r) if w.tag().is_primitive() && r.tag().is_primitive() && promotable(w.tag(), r.tag()) => {
                Ok(Step::Primitive {
                    writer: w.tag(),
                    reader: r.tag(),
                })
            }
            _ => Err(self.incompatible(writer, reader)),
        }
    }
}
