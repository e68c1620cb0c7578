// avrolite library entry point
//
// Schema-driven generic values: build or parse a schema, create values of it,
// encode and decode them in the Avro binary format, and read data written
// with one schema as values of another.

pub mod codec;
pub mod internal;
pub mod resolve;
pub mod schema;
pub mod value;

pub use codec::{decode, decode_with, encode, encode_into, encode_to_vec, encoded_size, DecodeLimits};
pub use internal::error::{Error, Result};
pub use resolve::{ResolvedReader, ResolvedWriter};
pub use schema::{RecordField, Schema, SchemaBuilder, SchemaId, SchemaKind, SchemaParser, TypeTag};
pub use value::{Entry, EntryMut, Scalar, Value, ValueCursor, ValueInterface, ValueInterfaceMut, ValueMut, ValueRef};

/// Traits needed to call value methods.
pub mod prelude {
    pub use crate::value::{ValueInterface, ValueInterfaceMut};
}
