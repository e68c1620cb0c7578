// Binary decoder
//
// `Decoder` is a cursor over an input slice with primitive readers for the
// Avro binary layout. `read_datum` decodes a value against the schema it was
// written with; `skip` consumes a value without materialising it.

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;

use crate::codec::config::DecodeLimits;
use crate::codec::varint::decode_long;
use crate::internal::error::{Error, Result};
use crate::schema::types::{SchemaArena, SchemaId, SchemaKind};
use crate::value::datum::Datum;

/// One block header of an array or map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) count: usize,
    /// Byte size announced by a negative-count header
    pub(crate) byte_size: Option<usize>,
}

/// Cursor over encoded input.
#[derive(Debug)]
pub(crate) struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    limits: DecodeLimits,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(input: &'a [u8], limits: DecodeLimits) -> Self {
        Decoder {
            input,
            pos: 0,
            depth: 0,
            limits,
        }
    }

    /// Bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Enters one nesting level of a container.
    pub(crate) fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(Error::InvalidEncoding(format!(
                "nesting deeper than {} levels",
                self.limits.max_depth
            )));
        }
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::truncated(len, self.remaining()));
        }
        let input: &'a [u8] = self.input;
        let raw = &input[self.pos..self.pos + len];
        self.pos += len;
        Ok(raw)
    }

    pub(crate) fn read_boolean(&mut self) -> Result<bool> {
        match self.read_raw(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::InvalidEncoding(format!("boolean byte {:#04x}", other))),
        }
    }

    pub(crate) fn read_long(&mut self) -> Result<i64> {
        let (value, read) = decode_long(&self.input[self.pos..])?;
        self.pos += read;
        Ok(value)
    }

    pub(crate) fn read_int(&mut self) -> Result<i32> {
        let value = self.read_long()?;
        i32::try_from(value).map_err(|_| Error::InvalidEncoding(format!("{} overflows an int", value)))
    }

    pub(crate) fn read_float(&mut self) -> Result<f32> {
        let mut raw = self.read_raw(4)?;
        Ok(raw.read_f32::<LittleEndian>()?)
    }

    pub(crate) fn read_double(&mut self) -> Result<f64> {
        let mut raw = self.read_raw(8)?;
        Ok(raw.read_f64::<LittleEndian>()?)
    }

    /// Reads a length prefix and checks it against the limits and the input.
    fn read_len(&mut self) -> Result<usize> {
        let len = self.read_long()?;
        let len = usize::try_from(len)
            .map_err(|_| Error::InvalidEncoding(format!("negative length {}", len)))?;
        if len > self.limits.max_bytes_len {
            return Err(Error::InvalidEncoding(format!(
                "length {} exceeds the limit of {}",
                len, self.limits.max_bytes_len
            )));
        }
        if len > self.remaining() {
            return Err(Error::truncated(len, self.remaining()));
        }
        Ok(len)
    }

    pub(crate) fn read_bytes(&mut self) -> Result<Bytes> {
        let len = self.read_len()?;
        Ok(Bytes::copy_from_slice(self.read_raw(len)?))
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let raw = self.read_raw(len)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| Error::InvalidEncoding(format!("string is not UTF-8: {}", e)))
    }

    pub(crate) fn skip_bytes(&mut self) -> Result<()> {
        let len = self.read_len()?;
        self.read_raw(len).map(|_| ())
    }

    /// Reads a 0-based index (enum symbol or union branch) below `count`.
    pub(crate) fn read_index(&mut self, count: usize, what: &str) -> Result<usize> {
        let raw = self.read_long()?;
        match usize::try_from(raw) {
            Ok(index) if index < count => Ok(index),
            _ => Err(Error::InvalidEncoding(format!(
                "{} index {} out of range 0..{}",
                what, raw, count
            ))),
        }
    }

    /// Reads the next block header; `None` marks the end of the container.
    /// `seen` is the number of items already read from earlier blocks.
    pub(crate) fn read_block(&mut self, seen: usize) -> Result<Option<Block>> {
        let raw = self.read_long()?;
        if raw == 0 {
            return Ok(None);
        }
        let (count, byte_size) = if raw < 0 {
            let count = raw
                .checked_neg()
                .ok_or_else(|| Error::InvalidEncoding("block count overflows".to_string()))?;
            let size = self.read_long()?;
            let size = usize::try_from(size)
                .map_err(|_| Error::InvalidEncoding(format!("negative block size {}", size)))?;
            (count, Some(size))
        } else {
            (raw, None)
        };
        let count = usize::try_from(count)
            .map_err(|_| Error::InvalidEncoding(format!("block count {} does not fit", count)))?;
        if seen.saturating_add(count) > self.limits.max_block_items {
            return Err(Error::InvalidEncoding(format!(
                "container holds more than {} items",
                self.limits.max_block_items
            )));
        }
        Ok(Some(Block { count, byte_size }))
    }
}

/// Decodes a value written with schema node `id` into `dest`, which must be
/// the empty datum of that node.
pub(crate) fn read_datum(dec: &mut Decoder<'_>, arena: &SchemaArena, id: SchemaId, dest: &mut Datum) -> Result<()> {
    let id = arena.deref(id);
    match (arena.node(id), dest) {
        (SchemaKind::Null, Datum::Null) => Ok(()),
        (SchemaKind::Boolean, Datum::Boolean(slot)) => {
            *slot = dec.read_boolean()?;
            Ok(())
        }
        (SchemaKind::Int, Datum::Int(slot)) => {
            *slot = dec.read_int()?;
            Ok(())
        }
        (SchemaKind::Long, Datum::Long(slot)) => {
            *slot = dec.read_long()?;
            Ok(())
        }
        (SchemaKind::Float, Datum::Float(slot)) => {
            *slot = dec.read_float()?;
            Ok(())
        }
        (SchemaKind::Double, Datum::Double(slot)) => {
            *slot = dec.read_double()?;
            Ok(())
        }
        (SchemaKind::Bytes, Datum::Bytes(slot)) => {
            *slot = dec.read_bytes()?;
            Ok(())
        }
        (SchemaKind::String, Datum::String(slot)) => {
            *slot = dec.read_string()?;
            Ok(())
        }
        (SchemaKind::Fixed { size, .. }, Datum::Fixed(slot)) => {
            *slot = Bytes::copy_from_slice(dec.read_raw(*size)?);
            Ok(())
        }
        (SchemaKind::Enum { symbols, .. }, Datum::Enum(slot)) => {
            *slot = dec.read_index(symbols.len(), "enum")?;
            Ok(())
        }
        (SchemaKind::Array { items }, Datum::Array(elements)) => {
            dec.descend()?;
            while let Some(block) = dec.read_block(elements.len())? {
                elements.try_reserve(block.count.min(dec.remaining()))?;
                for _ in 0..block.count {
                    let mut child = Datum::empty(arena, *items);
                    read_datum(dec, arena, *items, &mut child)?;
                    elements.push(child);
                }
            }
            dec.ascend();
            Ok(())
        }
        (SchemaKind::Map { values }, Datum::Map(map)) => {
            dec.descend()?;
            while let Some(block) = dec.read_block(map.len())? {
                map.try_reserve(block.count.min(dec.remaining()))?;
                for _ in 0..block.count {
                    let key = dec.read_string()?;
                    let mut child = Datum::empty(arena, *values);
                    read_datum(dec, arena, *values, &mut child)?;
                    map.insert(&key, child);
                }
            }
            dec.ascend();
            Ok(())
        }
        (SchemaKind::Record { fields, .. }, Datum::Record(slots)) => {
            dec.descend()?;
            for (field, slot) in fields.iter().zip(slots.iter_mut()) {
                read_datum(dec, arena, field.schema, slot)?;
            }
            dec.ascend();
            Ok(())
        }
        (SchemaKind::Union { branches }, dest) if matches!(dest, Datum::Union(_)) => {
            dec.descend()?;
            let d = dec.read_index(branches.len(), "union")?;
            let mut branch = Datum::empty(arena, branches[d]);
            read_datum(dec, arena, branches[d], &mut branch)?;
            *dest = Datum::Union(Some((d, Box::new(branch))));
            dec.ascend();
            Ok(())
        }
        (kind, _) => Err(Error::SchemaMismatch(format!(
            "destination does not hold a {} value",
            kind.tag()
        ))),
    }
}

/// Consumes a value written with schema node `id` without keeping it.
pub(crate) fn skip(dec: &mut Decoder<'_>, arena: &SchemaArena, id: SchemaId) -> Result<()> {
    let id = arena.deref(id);
    match arena.node(id) {
        SchemaKind::Null => Ok(()),
        SchemaKind::Boolean => dec.read_boolean().map(|_| ()),
        SchemaKind::Int | SchemaKind::Long | SchemaKind::Enum { .. } => dec.read_long().map(|_| ()),
        SchemaKind::Float => dec.read_raw(4).map(|_| ()),
        SchemaKind::Double => dec.read_raw(8).map(|_| ()),
        SchemaKind::Bytes | SchemaKind::String => dec.skip_bytes(),
        SchemaKind::Fixed { size, .. } => dec.read_raw(*size).map(|_| ()),
        SchemaKind::Array { items } => skip_blocks(dec, |dec| skip(dec, arena, *items)),
        SchemaKind::Map { values } => skip_blocks(dec, |dec| {
            dec.skip_bytes()?;
            skip(dec, arena, *values)
        }),
        SchemaKind::Record { fields, .. } => {
            dec.descend()?;
            for field in fields {
                skip(dec, arena, field.schema)?;
            }
            dec.ascend();
            Ok(())
        }
        SchemaKind::Union { branches } => {
            dec.descend()?;
            let d = dec.read_index(branches.len(), "union")?;
            skip(dec, arena, branches[d])?;
            dec.ascend();
            Ok(())
        }
        SchemaKind::Link { .. } => Err(Error::InvalidSchema("dangling link".to_string())),
    }
}

fn skip_blocks<F>(dec: &mut Decoder<'_>, mut skip_item: F) -> Result<()>
where
    F: FnMut(&mut Decoder<'_>) -> Result<()>,
{
    dec.descend()?;
    let mut seen = 0usize;
    while let Some(block) = dec.read_block(seen)? {
        match block.byte_size {
            // sized blocks can be jumped over whole
            Some(size) => {
                dec.read_raw(size)?;
            }
            None => {
                for _ in 0..block.count {
                    skip_item(dec)?;
                }
            }
        }
        seen += block.count;
    }
    dec.ascend();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_readers() {
        let mut dec = Decoder::new(&[0x01, 0x80, 0x01, 0x06, b'f', b'o', b'o'], DecodeLimits::default());
        assert!(dec.read_boolean().unwrap());
        assert_eq!(dec.read_long().unwrap(), 64);
        assert_eq!(dec.read_string().unwrap(), "foo");
        assert_eq!(dec.position(), 7);
        assert!(matches!(dec.read_long(), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut dec = Decoder::new(&[0x02], DecodeLimits::default());
        assert!(matches!(dec.read_boolean(), Err(Error::InvalidEncoding(_))));

        let mut dec = Decoder::new(&[0x01], DecodeLimits::default());
        assert!(matches!(dec.read_bytes(), Err(Error::InvalidEncoding(_))));

        let mut dec = Decoder::new(&[0x0A, b'a'], DecodeLimits::default());
        assert!(matches!(dec.read_bytes(), Err(Error::Truncated { needed: 5, remaining: 1 })));

        let mut dec = Decoder::new(&[0x04, 0xff, 0xfe], DecodeLimits::default());
        assert!(matches!(dec.read_string(), Err(Error::InvalidEncoding(_))));

        let mut dec = Decoder::new(&[0x00, 0x00], DecodeLimits::default());
        assert!(matches!(dec.read_float(), Err(Error::Truncated { needed: 4, remaining: 2 })));

        // 2^31 does not fit an int
        let mut dec = Decoder::new(&[0x80, 0x80, 0x80, 0x80, 0x10], DecodeLimits::default());
        assert!(matches!(dec.read_int(), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_negative_block_count() {
        // -2 items announced with a byte size of 2
        let mut dec = Decoder::new(&[0x03, 0x04, 0x02, 0x04, 0x00], DecodeLimits::default());
        let block = dec.read_block(0).unwrap().unwrap();
        assert_eq!(block, Block { count: 2, byte_size: Some(2) });
        assert_eq!(dec.read_long().unwrap(), 1);
        assert_eq!(dec.read_long().unwrap(), 2);
        assert_eq!(dec.read_block(2).unwrap(), None);
    }

    #[test]
    fn test_block_limit() {
        let limits = DecodeLimits::default().with_max_block_items(3);
        let mut dec = Decoder::new(&[0x08], limits);
        assert!(matches!(dec.read_block(0), Err(Error::InvalidEncoding(_))));
    }
}
