// Codec module for the Avro binary format
//
// Values are written without framing: the reader needs the writer's schema
// (or a `ResolvedWriter` built from it) to decode them.

pub mod config;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod size;
pub mod varint;

pub use config::DecodeLimits;

use bytes::BufMut;

use crate::internal::error::{Error, Result};
use crate::value::{ValueInterface, ValueInterfaceMut, ValueRef};

pub(crate) fn encoded_size_of(value: ValueRef<'_>) -> Result<usize> {
    size::datum_size(value.datum())
}

pub(crate) fn encode_to_vec_of(value: ValueRef<'_>) -> Result<Vec<u8>> {
    let needed = size::datum_size(value.datum())?;
    let mut out = Vec::new();
    out.try_reserve_exact(needed)?;
    encode::write_datum(&mut out, value.datum())?;
    Ok(out)
}

/// Number of bytes `encode` will write for `value`.
pub fn encoded_size<V: ValueInterface + ?Sized>(value: &V) -> Result<usize> {
    encoded_size_of(value.as_value_ref())
}

/// Encodes `value` into the front of `buf` and returns the number of bytes
/// written. Nothing is written when `buf` is too small.
pub fn encode<V: ValueInterface + ?Sized>(value: &V, buf: &mut [u8]) -> Result<usize> {
    let value = value.as_value_ref();
    let needed = size::datum_size(value.datum())?;
    if needed > buf.len() {
        return Err(Error::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    let mut window = &mut buf[..needed];
    encode::write_datum(&mut window, value.datum())?;
    Ok(needed)
}

/// Appends the encoding of `value` to any growable buffer, such as a
/// `BytesMut`. Returns the number of bytes appended.
pub fn encode_into<V: ValueInterface + ?Sized, B: BufMut>(value: &V, buf: &mut B) -> Result<usize> {
    let value = value.as_value_ref();
    let needed = size::datum_size(value.datum())?;
    if needed > buf.remaining_mut() {
        return Err(Error::BufferTooSmall {
            needed,
            available: buf.remaining_mut(),
        });
    }
    encode::write_datum(buf, value.datum())?;
    Ok(needed)
}

/// Encodes `value` into a new exactly-sized vector.
pub fn encode_to_vec<V: ValueInterface + ?Sized>(value: &V) -> Result<Vec<u8>> {
    encode_to_vec_of(value.as_value_ref())
}

/// Decodes one value written with `dest`'s schema, replacing its previous
/// content. Returns the number of input bytes consumed; trailing input is
/// left alone.
pub fn decode<V: ValueInterfaceMut + ?Sized>(input: &[u8], dest: &mut V) -> Result<usize> {
    decode_with(input, dest, &DecodeLimits::default())
}

/// `decode` with explicit limits.
pub fn decode_with<V: ValueInterfaceMut + ?Sized>(
    input: &[u8],
    dest: &mut V,
    limits: &DecodeLimits,
) -> Result<usize> {
    let mut dest = dest.as_value_mut();
    dest.reset();
    let mut decoder = decode::Decoder::new(input, *limits);
    let (arena, id, datum) = dest.parts_mut();
    decode::read_datum(&mut decoder, arena, id, datum)?;
    Ok(decoder.position())
}
