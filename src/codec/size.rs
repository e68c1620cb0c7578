// Encoded size computation
//
// Mirrors the writer in `encode` byte for byte so callers can size a buffer
// before encoding into it.

use crate::codec::varint::long_len;
use crate::internal::error::{Error, Result};
use crate::value::datum::Datum;

fn add(total: usize, more: usize) -> Result<usize> {
    total.checked_add(more).ok_or(Error::OutOfMemory)
}

/// Size of a length-prefixed byte run.
fn prefixed(len: usize) -> Result<usize> {
    add(long_len(len as i64), len)
}

/// Number of bytes the binary encoding of `datum` occupies.
pub(crate) fn datum_size(datum: &Datum) -> Result<usize> {
    match datum {
        Datum::Null => Ok(0),
        Datum::Boolean(_) => Ok(1),
        Datum::Int(v) => Ok(long_len(i64::from(*v))),
        Datum::Long(v) => Ok(long_len(*v)),
        Datum::Float(_) => Ok(4),
        Datum::Double(_) => Ok(8),
        Datum::Bytes(v) => prefixed(v.len()),
        Datum::String(v) => prefixed(v.len()),
        Datum::Fixed(v) => Ok(v.len()),
        Datum::Enum(i) => Ok(long_len(*i as i64)),
        Datum::Array(items) => {
            let mut total = 1; // terminating zero block
            if !items.is_empty() {
                total = add(total, long_len(items.len() as i64))?;
                for item in items {
                    total = add(total, datum_size(item)?)?;
                }
            }
            Ok(total)
        }
        Datum::Map(map) => {
            let mut total = 1;
            if !map.is_empty() {
                total = add(total, long_len(map.len() as i64))?;
                for (key, value) in map.iter() {
                    total = add(total, prefixed(key.len())?)?;
                    total = add(total, datum_size(value)?)?;
                }
            }
            Ok(total)
        }
        Datum::Record(fields) => {
            let mut total = 0;
            for field in fields {
                total = add(total, datum_size(field)?)?;
            }
            Ok(total)
        }
        Datum::Union(None) => Err(Error::EmptyUnion),
        Datum::Union(Some((d, branch))) => add(long_len(*d as i64), datum_size(branch)?),
    }
}
