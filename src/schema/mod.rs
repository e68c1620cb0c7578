// Schema module for avrolite
//
// This module provides the schema model that every value is built against:
//
// 1. Arena-backed schema type system with links for recursive types
// 2. Programmatic builder with validation
// 3. JSON schema parser
// 4. Default value materialisation for record fields

// Re-export public types and functions
pub use self::builder::SchemaBuilder;
pub use self::defaults::{apply_default, default_value};
pub use self::parser::SchemaParser;
pub use self::types::{RecordField, Schema, SchemaArena, SchemaId, SchemaKind, TypeTag};

// Sub-modules
pub mod builder;
pub mod defaults;
pub mod parser;
pub mod types;
