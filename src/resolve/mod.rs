// Schema resolution
//
// Reads data written with one schema as values of another, following the Avro
// resolution rules: numeric widening, string/bytes interchange, record fields
// matched by name with reader defaults for missing fields, enum symbols
// matched by name, and union branches matched by first compatible branch.

pub(crate) mod plan;
pub mod reader;
pub mod writer;

pub use reader::ResolvedReader;
pub use writer::ResolvedWriter;
