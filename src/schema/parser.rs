// JSON schema parser for avrolite
//
// Accepts the Avro JSON schema notation: bare primitive names, JSON strings
// naming a primitive or an already defined named type, JSON arrays for unions
// and objects for records, enums, fixed, arrays and maps. Parse errors carry
// a JSON path to the offending node.

use serde_json::{Map, Value};

use crate::internal::error::{Error, Result};
use crate::schema::builder::SchemaBuilder;
use crate::schema::types::{Schema, SchemaId, TypeTag};

/// Parser for JSON schema definitions
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Creates a new schema parser
    pub fn new() -> Self {
        Self
    }

    /// Parses schema text. A bare primitive name such as `int` is accepted
    /// without JSON quoting.
    pub fn parse_str(&self, text: &str) -> Result<Schema> {
        let trimmed = text.trim();
        if let Some(tag) = TypeTag::primitive_from_name(trimmed) {
            return Schema::primitive(tag);
        }
        let json: Value = serde_json::from_str(trimmed).map_err(|e| Error::ParseError {
            path: format!("line {} column {}", e.line(), e.column()),
            message: e.to_string(),
        })?;
        self.parse_value(&json)
    }

    /// Parses an already decoded JSON document.
    pub fn parse_value(&self, json: &Value) -> Result<Schema> {
        let mut builder = SchemaBuilder::new();
        let root = self.parse_type(&mut builder, json, "$")?;
        builder.build(root).map_err(|e| at("$", e))
    }

    /// Parses one type definition
    fn parse_type(&self, b: &mut SchemaBuilder, json: &Value, path: &str) -> Result<SchemaId> {
        match json {
            Value::String(name) => self.named_or_primitive(b, name, path),
            Value::Array(branches) => {
                let mut ids = Vec::with_capacity(branches.len());
                for (i, branch) in branches.iter().enumerate() {
                    ids.push(self.parse_type(b, branch, &format!("{}[{}]", path, i))?);
                }
                b.union(ids).map_err(|e| at(path, e))
            }
            Value::Object(obj) => self.parse_complex(b, obj, path),
            other => Err(parse_error(path, format!("invalid type definition: {}", other))),
        }
    }

    fn named_or_primitive(&self, b: &mut SchemaBuilder, name: &str, path: &str) -> Result<SchemaId> {
        if let Some(tag) = TypeTag::primitive_from_name(name) {
            return b.primitive(tag).map_err(|e| at(path, e));
        }
        if b.lookup(name).is_some() {
            return b.link(name).map_err(|e| at(path, e));
        }
        Err(parse_error(path, format!("unknown type '{}'", name)))
    }

    /// Parses an object definition (record, enum, fixed, array, map, or a
    /// wrapped type name)
    fn parse_complex(&self, b: &mut SchemaBuilder, obj: &Map<String, Value>, path: &str) -> Result<SchemaId> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| parse_error(path, "object schema must specify 'type'".to_string()))?;
        let type_name = match type_value {
            Value::String(name) => name.as_str(),
            nested => return self.parse_type(b, nested, &format!("{}.type", path)),
        };

        match type_name {
            "record" | "error" => {
                let name = self.get_string_field(obj, "name", path)?;
                let record = b.record(name).map_err(|e| at(path, e))?;
                let fields = match obj.get("fields") {
                    Some(Value::Array(fields)) => fields,
                    Some(_) => return Err(parse_error(path, "'fields' must be an array".to_string())),
                    None => return Err(parse_error(path, "record must specify 'fields'".to_string())),
                };
                for (i, field) in fields.iter().enumerate() {
                    let field_path = format!("{}.fields[{}]", path, i);
                    let field_obj = match field {
                        Value::Object(f) => f,
                        _ => return Err(parse_error(&field_path, "field must be an object".to_string())),
                    };
                    let field_name = self.get_string_field(field_obj, "name", &field_path)?;
                    let field_type = field_obj.get("type").ok_or_else(|| {
                        parse_error(&field_path, "field must specify 'type'".to_string())
                    })?;
                    let schema = self.parse_type(b, field_type, &format!("{}.type", field_path))?;
                    let default = field_obj.get("default").cloned();
                    b.field(record, field_name, schema, default)
                        .map_err(|e| at(&field_path, e))?;
                }
                Ok(record)
            }
            "enum" => {
                let name = self.get_string_field(obj, "name", path)?;
                let symbols = match obj.get("symbols") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|s| match s {
                            Value::String(s) => Ok(s.clone()),
                            _ => Err(parse_error(path, "enum symbols must be strings".to_string())),
                        })
                        .collect::<Result<Vec<_>>>()?,
                    _ => return Err(parse_error(path, "enum must specify 'symbols'".to_string())),
                };
                let default = match obj.get("default") {
                    Some(Value::String(d)) => Some(d.clone()),
                    Some(_) => return Err(parse_error(path, "enum default must be a string".to_string())),
                    None => None,
                };
                b.enumeration(name, symbols, default).map_err(|e| at(path, e))
            }
            "fixed" => {
                let name = self.get_string_field(obj, "name", path)?;
                let size = self.get_usize_field(obj, "size", path)?;
                b.fixed(name, size).map_err(|e| at(path, e))
            }
            "array" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| parse_error(path, "array schema must specify 'items'".to_string()))?;
                let items = self.parse_type(b, items, &format!("{}.items", path))?;
                b.array(items).map_err(|e| at(path, e))
            }
            "map" => {
                let values = obj
                    .get("values")
                    .ok_or_else(|| parse_error(path, "map schema must specify 'values'".to_string()))?;
                let values = self.parse_type(b, values, &format!("{}.values", path))?;
                b.map(values).map_err(|e| at(path, e))
            }
            other => self.named_or_primitive(b, other, path),
        }
    }

    /// Helper to get a string field from a JSON object
    fn get_string_field(&self, obj: &Map<String, Value>, field: &str, path: &str) -> Result<String> {
        match obj.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(parse_error(path, format!("'{}' must be a string", field))),
            None => Err(parse_error(path, format!("required field '{}' is missing", field))),
        }
    }

    /// Helper to get a non-negative integer field from a JSON object
    fn get_usize_field(&self, obj: &Map<String, Value>, field: &str, path: &str) -> Result<usize> {
        match obj.get(field) {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|u| usize::try_from(u).ok())
                .ok_or_else(|| parse_error(path, format!("'{}' must be a non-negative integer", field))),
            Some(_) => Err(parse_error(path, format!("'{}' must be a number", field))),
            None => Err(parse_error(path, format!("required field '{}' is missing", field))),
        }
    }
}

impl Schema {
    /// Parses schema text with a default `SchemaParser`.
    pub fn parse_str(text: &str) -> Result<Schema> {
        SchemaParser::new().parse_str(text)
    }
}

fn parse_error(path: &str, message: String) -> Error {
    Error::ParseError {
        path: path.to_string(),
        message,
    }
}

/// Relocates builder errors to the JSON path being parsed.
fn at(path: &str, err: Error) -> Error {
    match err {
        Error::InvalidSchema(message) => parse_error(path, message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(Schema::parse_str("int").unwrap().type_tag(), TypeTag::Int);
        assert_eq!(Schema::parse_str("\"string\"").unwrap().type_tag(), TypeTag::String);
        assert_eq!(
            Schema::parse_str(r#"{"type": "double"}"#).unwrap().type_tag(),
            TypeTag::Double
        );
    }

    #[test]
    fn test_parse_recursive_record() {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "LongList",
                "fields": [
                    {"name": "value", "type": "long"},
                    {"name": "next", "type": ["null", "LongList"], "default": null}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.type_name(), "LongList");
        let next = schema.field_schema(1).unwrap();
        assert_eq!(next.branch_count(), Some(2));
        let (_, branch) = next.branch_by_name("LongList").unwrap();
        assert!(branch.structurally_equal(&schema));
    }

    #[test]
    fn test_parse_enum_fixed_map_array() {
        let schema = Schema::parse_str(
            r#"{
                "type": "record", "name": "Mixed", "fields": [
                    {"name": "suit", "type": {"type": "enum", "name": "Suit", "symbols": ["A", "B"]}},
                    {"name": "hash", "type": {"type": "fixed", "name": "H", "size": 16}},
                    {"name": "tags", "type": {"type": "array", "items": "string"}},
                    {"name": "attrs", "type": {"type": "map", "values": "Suit"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.field_schema(1).unwrap().fixed_size(), Some(16));
        let attrs = schema.field_schema(3).unwrap();
        assert!(matches!(attrs.kind(), SchemaKind::Map { .. }));
        assert_eq!(attrs.values().unwrap().symbols().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let err = Schema::parse_str(r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "Nope"}]}"#)
            .unwrap_err();
        match err {
            Error::ParseError { path, .. } => assert_eq!(path, "$.fields[0].type"),
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(Schema::parse_str("{not json"), Err(Error::ParseError { .. })));
        assert!(matches!(Schema::parse_str(r#"["int", "int"]"#), Err(Error::ParseError { .. })));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let err = Schema::parse_str(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int", "default": "x"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_default_of_self_containing_record_rejected() {
        let err = Schema::parse_str(
            r#"{"type": "record", "name": "A", "fields": [
                {"name": "b", "default": {}, "type": {
                    "type": "record", "name": "B", "fields": [{"name": "me", "type": "B"}]
                }}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }
}
