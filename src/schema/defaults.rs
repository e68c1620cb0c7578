// Default values for schema fields
//
// Field defaults are stored as JSON literals and follow the Avro conventions:
// bytes and fixed are strings of code points 0..=255, enums are symbol names,
// records are objects whose missing fields fall back to their own declared
// default, and a union default always selects the first branch.

use serde_json::Value as JsonValue;

use crate::internal::error::{Error, Result};
use crate::schema::types::{Schema, TypeTag};
use crate::value::ast::set_scalar_literal;
use crate::value::{Value, ValueInterfaceMut, ValueMut};

/// Nesting bound for default literals.
const MAX_DEFAULT_DEPTH: usize = 128;

/// Builds the value described by a default literal.
pub fn default_value(schema: &Schema, literal: &JsonValue) -> Result<Value> {
    let mut value = Value::new(schema);
    apply_default(&mut value, literal)?;
    Ok(value)
}

/// Overwrites `dest` with the value described by a default literal.
pub fn apply_default<V: ValueInterfaceMut + ?Sized>(dest: &mut V, literal: &JsonValue) -> Result<()> {
    let mut dest = dest.as_value_mut();
    dest.reset();
    apply(dest, literal, 0)
}

pub(crate) fn materialize(schema: &Schema, literal: &JsonValue) -> Result<Value> {
    default_value(schema, literal)
}

fn apply(mut dest: ValueMut<'_>, literal: &JsonValue, depth: usize) -> Result<()> {
    if depth > MAX_DEFAULT_DEPTH {
        return Err(Error::MalformedLiteral("default literal nests too deeply".to_string()));
    }
    match dest.type_tag() {
        TypeTag::Union => {
            let branch = dest.into_set_discriminant(0)?;
            apply(branch, literal, depth + 1)
        }
        TypeTag::Array => {
            let items = literal.as_array().ok_or_else(|| {
                Error::MalformedLiteral(format!("array default must be a JSON array, got {}", literal))
            })?;
            for item in items {
                apply(dest.reborrow().into_append()?, item, depth + 1)?;
            }
            Ok(())
        }
        TypeTag::Map => {
            let entries = literal.as_object().ok_or_else(|| {
                Error::MalformedLiteral(format!("map default must be a JSON object, got {}", literal))
            })?;
            for (key, item) in entries {
                apply(dest.reborrow().into_add(key)?, item, depth + 1)?;
            }
            Ok(())
        }
        TypeTag::Record => {
            let entries = literal.as_object().ok_or_else(|| {
                Error::MalformedLiteral(format!("record default must be a JSON object, got {}", literal))
            })?;
            let schema = dest.schema();
            let fields = schema.fields().unwrap_or_default();
            if let Some(unknown) = entries.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                return Err(Error::NoSuchField(unknown.clone()));
            }
            for field in fields {
                let item = match (entries.get(&field.name), &field.default) {
                    (Some(item), _) => item,
                    (None, Some(fallback)) => fallback,
                    (None, None) => {
                        return Err(Error::MalformedLiteral(format!(
                            "default for record '{}' lacks field '{}'",
                            schema.type_name(),
                            field.name
                        )))
                    }
                };
                let (child, _) = dest.reborrow().into_by_name(&field.name)?;
                apply(child, item, depth + 1)?;
            }
            Ok(())
        }
        _ => set_scalar_literal(&mut dest, literal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use crate::value::ValueInterface;
    use serde_json::json;

    #[test]
    fn test_union_default_uses_first_branch() {
        let mut b = SchemaBuilder::new();
        let int = b.primitive(TypeTag::Int).unwrap();
        let null = b.primitive(TypeTag::Null).unwrap();
        let u = b.union(vec![int, null]).unwrap();
        let schema = b.build(u).unwrap();

        let v = default_value(&schema, &json!(5)).unwrap();
        assert_eq!(v.discriminant().unwrap(), Some(0));
        assert_eq!(v.current_branch().unwrap().get_int().unwrap(), 5);
        assert!(default_value(&schema, &JsonValue::Null).is_err());
    }

    #[test]
    fn test_record_default_falls_back_per_field() {
        let mut b = SchemaBuilder::new();
        let rec = b.record("Pair").unwrap();
        let string = b.primitive(TypeTag::String).unwrap();
        let long = b.primitive(TypeTag::Long).unwrap();
        b.field(rec, "label", string, None).unwrap();
        b.field(rec, "weight", long, Some(json!(3))).unwrap();
        let schema = b.build(rec).unwrap();

        let v = default_value(&schema, &json!({"label": "x"})).unwrap();
        assert_eq!(v.get_by_name("weight").unwrap().0.get_long().unwrap(), 3);
        assert!(matches!(
            default_value(&schema, &json!({"weight": 1})),
            Err(Error::MalformedLiteral(_))
        ));
        assert!(matches!(
            default_value(&schema, &json!({"label": "x", "extra": 1})),
            Err(Error::NoSuchField(_))
        ));
    }

    #[test]
    fn test_bytes_and_enum_defaults() {
        let mut b = SchemaBuilder::new();
        let e = b
            .enumeration("Color", vec!["RED".into(), "GREEN".into()], None)
            .unwrap();
        let schema = b.build(e).unwrap();
        let v = default_value(&schema, &json!("GREEN")).unwrap();
        assert_eq!(v.get_enum().unwrap(), 1);

        let v = default_value(&Schema::bytes(), &json!("\u{00ff}a")).unwrap();
        assert_eq!(v.get_bytes().unwrap(), &[0xff, b'a']);
    }
}
