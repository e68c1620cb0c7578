// Resolved writer: decodes writer-encoded bytes straight into reader values

use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::config::DecodeLimits;
use crate::codec::decode::{skip, Decoder};
use crate::internal::error::{Error, Result};
use crate::resolve::plan::{promote, FieldStep, PlanId, ResolutionPlan, Step};
use crate::schema::types::{Schema, TypeTag};
use crate::value::datum::Datum;
use crate::value::{Value, ValueInterfaceMut};

/// Decoder for data written with one schema and read with another.
///
/// Building it checks compatibility once; every later `decode` follows the
/// precomputed plan. Cloning shares the plan.
#[derive(Debug, Clone)]
pub struct ResolvedWriter {
    plan: Arc<ResolutionPlan>,
    limits: DecodeLimits,
}

impl ResolvedWriter {
    /// Fails with `SchemaIncompatible` when no writer data could ever be read
    /// as the reader schema.
    pub fn new(writer: &Schema, reader: &Schema) -> Result<Self> {
        Ok(ResolvedWriter {
            plan: Arc::new(ResolutionPlan::build(writer, reader)?),
            limits: DecodeLimits::default(),
        })
    }

    /// Replaces the default decode limits.
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn writer_schema(&self) -> &Schema {
        self.plan.writer()
    }

    pub fn reader_schema(&self) -> &Schema {
        self.plan.reader()
    }

    /// Empty value of the reader schema, ready to decode into.
    pub fn new_value(&self) -> Value {
        Value::new(self.plan.reader())
    }

    /// Decodes one writer-encoded value into `dest`, which must be built
    /// from the reader schema. Returns the number of bytes consumed.
    pub fn decode<V: ValueInterfaceMut + ?Sized>(&self, input: &[u8], dest: &mut V) -> Result<usize> {
        check_schema(self.plan.reader(), &dest.schema(), "reader")?;
        let mut dest = dest.as_value_mut();
        dest.reset();
        let (_, _, datum) = dest.parts_mut();
        let mut decoder = Decoder::new(input, self.limits);
        match apply(&self.plan, self.plan.root(), &mut decoder, datum) {
            Ok(()) => Ok(decoder.position()),
            Err(e) => {
                debug!(
                    writer = %self.plan.writer().type_name(),
                    reader = %self.plan.reader().type_name(),
                    offset = decoder.position(),
                    error = %e,
                    "resolved decode failed"
                );
                Err(e)
            }
        }
    }
}

/// Checks that a value handed to a resolver was built from the expected side.
pub(crate) fn check_schema(expected: &Schema, actual: &Schema, side: &str) -> Result<()> {
    if expected.structurally_equal(actual) {
        Ok(())
    } else {
        Err(Error::SchemaMismatch(format!(
            "value of type {} does not match the {} schema {}",
            actual.type_name(),
            side,
            expected.type_name()
        )))
    }
}

pub(crate) fn shape_error(expected: TypeTag) -> Error {
    Error::SchemaMismatch(format!("destination does not hold a {} value", expected))
}

fn read_primitive(dec: &mut Decoder<'_>, tag: TypeTag) -> Result<Datum> {
    Ok(match tag {
        TypeTag::Null => Datum::Null,
        TypeTag::Boolean => Datum::Boolean(dec.read_boolean()?),
        TypeTag::Int => Datum::Int(dec.read_int()?),
        TypeTag::Long => Datum::Long(dec.read_long()?),
        TypeTag::Float => Datum::Float(dec.read_float()?),
        TypeTag::Double => Datum::Double(dec.read_double()?),
        TypeTag::Bytes => Datum::Bytes(dec.read_bytes()?),
        TypeTag::String => Datum::String(dec.read_string()?),
        other => return Err(shape_error(other)),
    })
}

fn apply(plan: &ResolutionPlan, id: PlanId, dec: &mut Decoder<'_>, dest: &mut Datum) -> Result<()> {
    match plan.step(id) {
        Step::Pending => Err(Error::SchemaIncompatible("incomplete resolution plan".to_string())),
        Step::Primitive { writer, reader } => {
            *dest = promote(read_primitive(dec, *writer)?, *reader)?;
            Ok(())
        }
        Step::Fixed { size } => {
            *dest = Datum::Fixed(bytes::Bytes::copy_from_slice(dec.read_raw(*size)?));
            Ok(())
        }
        Step::Enum { mapping, writer } => {
            let index = dec.read_index(mapping.len(), "enum")?;
            match mapping[index] {
                Some(symbol) => {
                    *dest = Datum::Enum(symbol);
                    Ok(())
                }
                None => Err(plan.missing_symbol(*writer, index)),
            }
        }
        Step::Array { items, reader_items } => {
            let elements = match dest {
                Datum::Array(elements) => elements,
                _ => return Err(shape_error(TypeTag::Array)),
            };
            dec.descend()?;
            while let Some(block) = dec.read_block(elements.len())? {
                elements.try_reserve(block.count.min(dec.remaining()))?;
                for _ in 0..block.count {
                    let mut child = Datum::empty(plan.reader_arena(), *reader_items);
                    apply(plan, *items, dec, &mut child)?;
                    elements.push(child);
                }
            }
            dec.ascend();
            Ok(())
        }
        Step::Map { values, reader_values } => {
            let map = match dest {
                Datum::Map(map) => map,
                _ => return Err(shape_error(TypeTag::Map)),
            };
            dec.descend()?;
            while let Some(block) = dec.read_block(map.len())? {
                map.try_reserve(block.count.min(dec.remaining()))?;
                for _ in 0..block.count {
                    let key = dec.read_string()?;
                    let mut child = Datum::empty(plan.reader_arena(), *reader_values);
                    apply(plan, *values, dec, &mut child)?;
                    map.insert(&key, child);
                }
            }
            dec.ascend();
            Ok(())
        }
        Step::Record { fields, defaults } => {
            let slots = match dest {
                Datum::Record(slots) => slots,
                _ => return Err(shape_error(TypeTag::Record)),
            };
            dec.descend()?;
            for field in fields {
                match field {
                    FieldStep::Read { reader_index, plan: field_plan } => {
                        apply(plan, *field_plan, dec, &mut slots[*reader_index])?;
                    }
                    FieldStep::Skip { writer, name } => {
                        trace!(field = %name, "skipping writer-only field");
                        skip(dec, plan.writer_arena(), *writer)?;
                    }
                }
            }
            for (index, default) in defaults {
                trace!(field = index, "applying reader default");
                slots[*index] = default.clone();
            }
            dec.ascend();
            Ok(())
        }
        Step::WriterUnion { branches, writer } => {
            let d = dec.read_index(branches.len(), "union")?;
            match branches[d] {
                Some(branch) => apply(plan, branch, dec, dest),
                None => Err(plan.missing_branch(*writer, d)),
            }
        }
        Step::ReaderUnion {
            discriminant,
            reader_branch,
            branch,
        } => {
            let mut child = Datum::empty(plan.reader_arena(), *reader_branch);
            apply(plan, *branch, dec, &mut child)?;
            *dest = Datum::Union(Some((*discriminant, Box::new(child))));
            Ok(())
        }
    }
}
