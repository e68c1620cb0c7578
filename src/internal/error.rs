use std::io;

use thiserror::Error;

use crate::schema::TypeTag;

/// Unified error type for the avrolite library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The operation is not valid for the value's type.
    #[error("Type Mismatch: {operation} is not valid for {actual} values")]
    TypeMismatch {
        operation: &'static str,
        actual: TypeTag,
    },

    /// A scalar was well-typed but outside what the schema accepts.
    #[error("Out Of Range: {0}")]
    OutOfRange(String),

    /// Positional access outside `1..=size`.
    #[error("Index Out Of Bounds: position {position} (size {size})")]
    IndexOutOfBounds { position: usize, size: usize },

    #[error("No Such Field: {0}")]
    NoSuchField(String),

    #[error("No Such Branch: {0}")]
    NoSuchBranch(String),

    /// A union was encoded or read before any branch was selected.
    #[error("Empty Union: no branch has been selected")]
    EmptyUnion,

    /// Two values (or a value and a resolver) disagree on their schema.
    #[error("Schema Mismatch: {0}")]
    SchemaMismatch(String),

    /// Writer data cannot be resolved into the reader schema.
    #[error("Schema Incompatible: {0}")]
    SchemaIncompatible(String),

    #[error("Buffer Too Small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Truncated: need {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid Encoding: {0}")]
    InvalidEncoding(String),

    #[error("Out Of Memory")]
    OutOfMemory,

    /// Schema text could not be parsed. `path` locates the offending node.
    #[error("Parse Error at {path}: {message}")]
    ParseError { path: String, message: String },

    /// A programmatically built schema violates a schema invariant.
    #[error("Invalid Schema: {0}")]
    InvalidSchema(String),

    /// A populate/default literal has the wrong shape for its schema.
    #[error("Malformed Literal: {0}")]
    MalformedLiteral(String),
}

/// A specialized `Result` type for avrolite operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn type_mismatch(operation: &'static str, actual: TypeTag) -> Self {
        Error::TypeMismatch { operation, actual }
    }

    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        Error::Truncated { needed, remaining }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // byteorder reads only fail on short input
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated {
                needed: 1,
                remaining: 0,
            },
            _ => Error::InvalidEncoding(format!("IO error during codec operation: {}", err)),
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/*
Panic policy:

Recoverable failures (malformed input, wrong-typed access, incompatible
schemas) are always returned as `Result<T, Error>`. Panics are reserved for
broken internal invariants such as a datum whose shape disagrees with its
schema, which the public API cannot construct.
*/
