// Resolved reader: projects writer-shaped values into reader-shaped values

use std::sync::Arc;

use tracing::debug;

use crate::internal::error::{Error, Result};
use crate::resolve::plan::{promote, FieldStep, PlanId, ResolutionPlan, Step};
use crate::resolve::writer::{check_schema, shape_error};
use crate::schema::types::{Schema, TypeTag};
use crate::value::datum::Datum;
use crate::value::{Value, ValueInterface, ValueInterfaceMut};

/// Converts in-memory values of the writer schema into the reader schema,
/// applying the same rules as `ResolvedWriter` without an encode/decode
/// round trip.
#[derive(Debug, Clone)]
pub struct ResolvedReader {
    plan: Arc<ResolutionPlan>,
}

impl ResolvedReader {
    /// Builds the shared plan; `SchemaIncompatible` when the pair cannot resolve.
    pub fn new(writer: &Schema, reader: &Schema) -> Result<Self> {
        Ok(ResolvedReader {
            plan: Arc::new(ResolutionPlan::build(writer, reader)?),
        })
    }

    pub fn writer_schema(&self) -> &Schema {
        self.plan.writer()
    }

    pub fn reader_schema(&self) -> &Schema {
        self.plan.reader()
    }

    /// Empty value of the reader schema.
    pub fn new_value(&self) -> Value {
        Value::new(self.plan.reader())
    }

    /// Overwrites `dest` (a reader value) with the projection of `source`
    /// (a writer value).
    pub fn read<S, D>(&self, source: &S, dest: &mut D) -> Result<()>
    where
        S: ValueInterface + ?Sized,
        D: ValueInterfaceMut + ?Sized,
    {
        check_schema(self.plan.writer(), &source.schema(), "writer")?;
        check_schema(self.plan.reader(), &dest.schema(), "reader")?;
        let source = source.as_value_ref();
        let mut dest = dest.as_value_mut();
        dest.reset();
        let (_, _, datum) = dest.parts_mut();
        project(&self.plan, self.plan.root(), source.datum(), datum).map_err(|e| {
            debug!(
                writer = %self.plan.writer().type_name(),
                reader = %self.plan.reader().type_name(),
                error = %e,
                "resolved read failed"
            );
            e
        })
    }
}

fn project(plan: &ResolutionPlan, id: PlanId, src: &Datum, dest: &mut Datum) -> Result<()> {
    match (plan.step(id), src) {
        (Step::Pending, _) => Err(Error::SchemaIncompatible("incomplete resolution plan".to_string())),
        (Step::Primitive { reader, .. }, src) => {
            *dest = promote(src.clone(), *reader)?;
            Ok(())
        }
        (Step::Fixed { .. }, src @ Datum::Fixed(_)) => {
            *dest = src.clone();
            Ok(())
        }
        (Step::Enum { mapping, writer }, Datum::Enum(index)) => match mapping.get(*index).copied().flatten() {
            Some(symbol) => {
                *dest = Datum::Enum(symbol);
                Ok(())
            }
            None => Err(plan.missing_symbol(*writer, *index)),
        },
        (Step::Array { items, reader_items }, Datum::Array(source_items)) => {
            let elements = match dest {
                Datum::Array(elements) => elements,
                _ => return Err(shape_error(TypeTag::Array)),
            };
            elements.try_reserve(source_items.len())?;
            for item in source_items {
                let mut child = Datum::empty(plan.reader_arena(), *reader_items);
                project(plan, *items, item, &mut child)?;
                elements.push(child);
            }
            Ok(())
        }
        (Step::Map { values, reader_values }, Datum::Map(source_map)) => {
            let map = match dest {
                Datum::Map(map) => map,
                _ => return Err(shape_error(TypeTag::Map)),
            };
            map.try_reserve(source_map.len())?;
            for (key, value) in source_map.iter() {
                let mut child = Datum::empty(plan.reader_arena(), *reader_values);
                project(plan, *values, value, &mut child)?;
                map.insert(key, child);
            }
            Ok(())
        }
        (Step::Record { fields, defaults }, Datum::Record(source_fields)) => {
            let slots = match dest {
                Datum::Record(slots) => slots,
                _ => return Err(shape_error(TypeTag::Record)),
            };
            for (step, value) in fields.iter().zip(source_fields) {
                if let FieldStep::Read { reader_index, plan: field_plan } = step {
                    project(plan, *field_plan, value, &mut slots[*reader_index])?;
                }
            }
            for (index, default) in defaults {
                slots[*index] = default.clone();
            }
            Ok(())
        }
        (Step::WriterUnion { branches, writer }, Datum::Union(active)) => match active {
            Some((d, branch)) => match branches.get(*d).copied().flatten() {
                Some(plan_id) => project(plan, plan_id, branch, dest),
                None => Err(plan.missing_branch(*writer, *d)),
            },
            None => Err(Error::EmptyUnion),
        },
        (
            Step::ReaderUnion {
                discriminant,
                reader_branch,
                branch,
            },
            src,
        ) => {
            let mut child = Datum::empty(plan.reader_arena(), *reader_branch);
            project(plan, *branch, src, &mut child)?;
            *dest = Datum::Union(Some((*discriminant, Box::new(child))));
            Ok(())
        }
        _ => Err(Error::SchemaMismatch(
            "source value does not match the writer schema".to_string(),
        )),
    }
}
