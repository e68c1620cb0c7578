// Tree literals: populating values from JSON and rendering them back
//
// Literal shapes:
//   null / boolean / number / string   for the matching scalar
//   string of code points 0..=255      bytes and fixed (arrays of ints work too)
//   symbol string or 0-based index     enum
//   array                              array
//   object                             map entries or record fields
//   null                               the "null" branch of a union
//   object with exactly one key        any other union branch, keyed by type name

use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::internal::error::{Error, Result};
use crate::schema::TypeTag;
use crate::value::generic::{ValueMut, ValueRef};
use crate::value::scalar::Scalar;

/// Nesting bound for populate literals.
const MAX_LITERAL_DEPTH: usize = 128;

fn literal_kind(literal: &JsonValue) -> &'static str {
    match literal {
        JsonValue::Null => "populate from null",
        JsonValue::Bool(_) => "populate from boolean",
        JsonValue::Number(_) => "populate from number",
        JsonValue::String(_) => "populate from string",
        JsonValue::Array(_) => "populate from array",
        JsonValue::Object(_) => "populate from object",
    }
}

fn mismatch(literal: &JsonValue, tag: TypeTag) -> Error {
    Error::type_mismatch(literal_kind(literal), tag)
}

/// Decodes a byte literal: a string whose code points are all below 256, or
/// an array of integers in `0..=255`.
pub(crate) fn literal_bytes(literal: &JsonValue, tag: TypeTag) -> Result<Vec<u8>> {
    match literal {
        JsonValue::String(s) => s
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    Error::OutOfRange(format!("code point U+{:04X} does not fit in a byte", u32::from(c)))
                })
            })
            .collect(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item.as_u64() {
                Some(n) => u8::try_from(n)
                    .map_err(|_| Error::OutOfRange(format!("byte value {} exceeds 255", n))),
                None => Err(mismatch(item, TypeTag::Int)),
            })
            .collect(),
        other => Err(mismatch(other, tag)),
    }
}

/// Renders bytes as a string of code points 0..=255.
pub(crate) fn bytes_literal(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

fn integral(literal: &JsonValue) -> Option<Result<i64>> {
    let number = match literal {
        JsonValue::Number(n) => n,
        _ => return None,
    };
    if let Some(n) = number.as_i64() {
        return Some(Ok(n));
    }
    if number.is_u64() {
        return Some(Err(Error::OutOfRange(format!("{} does not fit in a long", number))));
    }
    let f = number.as_f64()?;
    if f.fract() != 0.0 {
        return None;
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Some(Err(Error::OutOfRange(format!("{} does not fit in a long", number))));
    }
    Some(Ok(f as i64))
}

/// Sets a scalar from a literal. Shared by `populate` and schema defaults.
pub(crate) fn set_scalar_literal(dest: &mut ValueMut<'_>, literal: &JsonValue) -> Result<()> {
    let tag = dest.type_tag();
    match tag {
        TypeTag::Null => match literal {
            JsonValue::Null => dest.set_scalar(Scalar::Null),
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Boolean => match literal {
            JsonValue::Bool(v) => dest.set_scalar(Scalar::Boolean(*v)),
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Int => {
            let n = integral(literal).ok_or_else(|| mismatch(literal, tag))??;
            let v = i32::try_from(n)
                .map_err(|_| Error::OutOfRange(format!("{} does not fit in an int", n)))?;
            dest.set_scalar(Scalar::Int(v))
        }
        TypeTag::Long => {
            let n = integral(literal).ok_or_else(|| mismatch(literal, tag))??;
            dest.set_scalar(Scalar::Long(n))
        }
        TypeTag::Float => {
            let v = literal.as_f64().ok_or_else(|| mismatch(literal, tag))?;
            dest.set_scalar(Scalar::Float(v as f32))
        }
        TypeTag::Double => {
            let v = literal.as_f64().ok_or_else(|| mismatch(literal, tag))?;
            dest.set_scalar(Scalar::Double(v))
        }
        TypeTag::String => match literal {
            JsonValue::String(s) => dest.set_scalar(Scalar::String(s)),
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Bytes => {
            let bytes = literal_bytes(literal, tag)?;
            dest.set_scalar(Scalar::Bytes(&bytes))
        }
        TypeTag::Fixed => {
            let bytes = literal_bytes(literal, tag)?;
            dest.set_scalar(Scalar::Fixed(&bytes))
        }
        TypeTag::Enum => match literal {
            JsonValue::String(symbol) => dest.set_enum_symbol(symbol),
            JsonValue::Number(n) => match n.as_u64().and_then(|i| usize::try_from(i).ok()) {
                Some(index) => dest.set_scalar(Scalar::Enum(index)),
                None => Err(Error::OutOfRange(format!("{} is not a symbol index", n))),
            },
            other => Err(mismatch(other, tag)),
        },
        _ => Err(mismatch(literal, tag)),
    }
}

/// Fills `dest` from a literal. Arrays replace existing elements, map and
/// record literals only touch the keys they name.
pub(crate) fn populate(dest: ValueMut<'_>, literal: &JsonValue) -> Result<()> {
    fill(dest, literal, 0)
}

fn fill(mut dest: ValueMut<'_>, literal: &JsonValue, depth: usize) -> Result<()> {
    if depth > MAX_LITERAL_DEPTH {
        return Err(Error::MalformedLiteral(format!(
            "literal nests deeper than {} levels",
            MAX_LITERAL_DEPTH
        )));
    }
    let tag = dest.type_tag();
    match tag {
        TypeTag::Array => match literal {
            JsonValue::Array(items) => {
                dest.reset();
                for item in items {
                    fill(dest.reborrow().into_append()?, item, depth + 1)?;
                }
                Ok(())
            }
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Map => match literal {
            JsonValue::Object(entries) => {
                for (key, item) in entries {
                    fill(dest.reborrow().into_add(key)?, item, depth + 1)?;
                }
                Ok(())
            }
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Record => match literal {
            JsonValue::Object(entries) => {
                for (name, item) in entries {
                    let (field, _) = dest.reborrow().into_by_name(name)?;
                    fill(field, item, depth + 1)?;
                }
                Ok(())
            }
            other => Err(mismatch(other, tag)),
        },
        TypeTag::Union => match literal {
            JsonValue::Null => {
                let branch = dest.into_set_branch(TypeTag::Null.name())?;
                fill(branch, literal, depth + 1)
            }
            JsonValue::Object(entries) if entries.len() == 1 => {
                let (name, item) = entries
                    .iter()
                    .next()
                    .ok_or_else(|| Error::MalformedLiteral("empty union literal".to_string()))?;
                let branch = dest.into_set_branch(name)?;
                fill(branch, item, depth + 1)
            }
            JsonValue::Object(entries) => Err(Error::MalformedLiteral(format!(
                "union literal needs exactly one key, got {}",
                entries.len()
            ))),
            other => Err(Error::MalformedLiteral(format!(
                "union literal must be null or a single-key object, got {}",
                other
            ))),
        },
        _ => set_scalar_literal(&mut dest, literal),
    }
}

fn number(v: f64) -> JsonValue {
    Number::from_f64(v).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

/// Renders a value as a literal that `populate` accepts.
pub(crate) fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value.type_tag() {
        TypeTag::Null => JsonValue::Null,
        TypeTag::Boolean => value.get_boolean().map(JsonValue::Bool).unwrap_or_default(),
        TypeTag::Int => value.get_int().map(JsonValue::from).unwrap_or_default(),
        TypeTag::Long => value.get_long().map(JsonValue::from).unwrap_or_default(),
        TypeTag::Float => value.get_float().map(|v| number(f64::from(v))).unwrap_or_default(),
        TypeTag::Double => value.get_double().map(number).unwrap_or_default(),
        TypeTag::Bytes => value
            .get_bytes()
            .map(|b| JsonValue::String(bytes_literal(b)))
            .unwrap_or_default(),
        TypeTag::Fixed => value
            .get_fixed()
            .map(|b| JsonValue::String(bytes_literal(b)))
            .unwrap_or_default(),
        TypeTag::String => value
            .get_string()
            .map(|s| JsonValue::String(s.to_string()))
            .unwrap_or_default(),
        TypeTag::Enum => value
            .enum_symbol()
            .map(|s| JsonValue::String(s.to_string()))
            .unwrap_or_default(),
        TypeTag::Array => {
            let items = match value.iter() {
                Ok(entries) => entries.map(|entry| to_json(entry.value)).collect(),
                Err(_) => Vec::new(),
            };
            JsonValue::Array(items)
        }
        TypeTag::Map => {
            let mut object = JsonMap::new();
            if let Ok(entries) = value.iter() {
                for entry in entries {
                    if let Some(key) = entry.key {
                        object.insert(key.to_string(), to_json(entry.value));
                    }
                }
            }
            JsonValue::Object(object)
        }
        TypeTag::Record => {
            let mut object = JsonMap::new();
            let schema = value.schema();
            for (i, field) in schema.fields().unwrap_or_default().iter().enumerate() {
                if let Ok((child, _)) = value.get_by_index(i + 1) {
                    object.insert(field.name.clone(), to_json(child));
                }
            }
            JsonValue::Object(object)
        }
        TypeTag::Union => match value.current_branch() {
            Ok(branch) if branch.type_tag() == TypeTag::Null => JsonValue::Null,
            Ok(branch) => {
                let mut object = JsonMap::new();
                object.insert(branch.type_name().to_string(), to_json(branch));
                JsonValue::Object(object)
            }
            // an unset union has no literal of its own
            Err(_) => JsonValue::Null,
        },
        TypeTag::Link => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaBuilder};
    use crate::value::{Value, ValueInterface, ValueInterfaceMut};
    use serde_json::json;

    fn event_schema() -> Schema {
        let mut b = SchemaBuilder::new();
        let rec = b.record("Event").unwrap();
        let long = b.primitive(TypeTag::Long).unwrap();
        let null = b.primitive(TypeTag::Null).unwrap();
        let string = b.primitive(TypeTag::String).unwrap();
        let opt = b.union(vec![null, string]).unwrap();
        let md5 = b.fixed("Md5", 2).unwrap();
        let int = b.primitive(TypeTag::Int).unwrap();
        let counts = b.map(int).unwrap();
        b.field(rec, "id", long, None).unwrap();
        b.field(rec, "note", opt, None).unwrap();
        b.field(rec, "digest", md5, None).unwrap();
        b.field(rec, "counts", counts, None).unwrap();
        b.build(rec).unwrap()
    }

    #[test]
    fn test_populate_and_render() {
        let literal = json!({
            "id": 7,
            "note": {"string": "hi"},
            "digest": "\u{00ff}\u{0001}",
            "counts": {"a": 1}
        });
        let v = Value::from_literal(&event_schema(), &literal).unwrap();
        assert_eq!(v.get_by_name("digest").unwrap().0.get_fixed().unwrap(), &[0xff, 0x01]);
        assert_eq!(v.to_json(), literal);

        // rendering is accepted back by populate
        let again = Value::from_literal(&event_schema(), &v.to_json()).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_union_literals() {
        let mut v = Value::new(&event_schema());
        v.populate(&json!({"note": null})).unwrap();
        assert_eq!(v.get_by_name("note").unwrap().0.discriminant().unwrap(), Some(0));

        let err = v.populate(&json!({"note": {}})).unwrap_err();
        assert!(matches!(err, Error::MalformedLiteral(_)));
        let err = v.populate(&json!({"note": {"string": "a", "null": null}})).unwrap_err();
        assert!(matches!(err, Error::MalformedLiteral(_)));
        let err = v.populate(&json!({"note": {"int": 1}})).unwrap_err();
        assert!(matches!(err, Error::NoSuchBranch(_)));
    }

    #[test]
    fn test_literal_errors() {
        let mut v = Value::new(&event_schema());
        assert!(matches!(
            v.populate(&json!({"id": "seven"})),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(v.populate(&json!({"nope": 1})), Err(Error::NoSuchField(_))));
        assert!(matches!(
            v.populate(&json!({"digest": "\u{0100}\u{0000}"})),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(v.populate(&json!({"digest": [1]})), Err(Error::OutOfRange(_))));

        let mut i = Value::new(&Schema::int());
        assert!(matches!(i.populate(&json!(1u64 << 40)), Err(Error::OutOfRange(_))));
        i.populate(&json!(12.0)).unwrap();
        assert_eq!(i.get_int().unwrap(), 12);
    }

    #[test]
    fn test_bytes_literal_forms() {
        assert_eq!(literal_bytes(&json!("ab"), TypeTag::Bytes).unwrap(), b"ab".to_vec());
        assert_eq!(literal_bytes(&json!([0, 255]), TypeTag::Bytes).unwrap(), vec![0, 255]);
        assert!(literal_bytes(&json!([256]), TypeTag::Bytes).is_err());
        assert_eq!(bytes_literal(&[0x41, 0xe9]), "A\u{e9}");
    }

    #[test]
    fn test_deep_literal_rejected() {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "Node", "fields": [{"name": "next", "type": ["null", "Node"]}]}"#,
        )
        .unwrap();
        let nested = |levels: usize| {
            let mut literal = json!(null);
            for _ in 0..levels {
                literal = json!({"Node": {"next": literal}});
            }
            json!({"next": literal})
        };

        let mut v = Value::new(&schema);
        v.populate(&nested(10)).unwrap();
        assert_eq!(v.to_json(), nested(10));

        assert!(matches!(
            v.populate(&nested(200)),
            Err(Error::MalformedLiteral(_))
        ));
    }
}
