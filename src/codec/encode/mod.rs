// Binary encoder
//
// Writes a datum in the Avro binary layout. Callers size the destination with
// `codec::size` first; the writer itself never checks capacity.

use bytes::BufMut;

use crate::codec::varint::put_long;
use crate::internal::error::{Error, Result};
use crate::value::datum::Datum;

fn put_prefixed<B: BufMut>(buf: &mut B, bytes: &[u8]) {
    put_long(buf, bytes.len() as i64);
    buf.put_slice(bytes);
}

/// Encodes `datum` into `buf`.
pub(crate) fn write_datum<B: BufMut>(buf: &mut B, datum: &Datum) -> Result<()> {
    match datum {
        Datum::Null => {}
        Datum::Boolean(v) => buf.put_u8(u8::from(*v)),
        Datum::Int(v) => put_long(buf, i64::from(*v)),
        Datum::Long(v) => put_long(buf, *v),
        Datum::Float(v) => buf.put_f32_le(*v),
        Datum::Double(v) => buf.put_f64_le(*v),
        Datum::Bytes(v) => put_prefixed(buf, v),
        Datum::String(v) => put_prefixed(buf, v.as_bytes()),
        Datum::Fixed(v) => buf.put_slice(v),
        Datum::Enum(i) => put_long(buf, *i as i64),
        Datum::Array(items) => {
            // a single block followed by the zero terminator
            if !items.is_empty() {
                put_long(buf, items.len() as i64);
                for item in items {
                    write_datum(buf, item)?;
                }
            }
            put_long(buf, 0);
        }
        Datum::Map(map) => {
            if !map.is_empty() {
                put_long(buf, map.len() as i64);
                for (key, value) in map.iter() {
                    put_prefixed(buf, key.as_bytes());
                    write_datum(buf, value)?;
                }
            }
            put_long(buf, 0);
        }
        Datum::Record(fields) => {
            for field in fields {
                write_datum(buf, field)?;
            }
        }
        Datum::Union(None) => return Err(Error::EmptyUnion),
        Datum::Union(Some((d, branch))) => {
            put_long(buf, *d as i64);
            write_datum(buf, branch)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::datum::MapDatum;

    fn encode(datum: &Datum) -> Vec<u8> {
        let mut out = Vec::new();
        write_datum(&mut out, datum).unwrap();
        out
    }

    #[test]
    fn test_scalar_layouts() {
        assert_eq!(encode(&Datum::Boolean(true)), vec![0x01]);
        assert_eq!(encode(&Datum::Int(-1)), vec![0x01]);
        assert_eq!(encode(&Datum::Long(64)), vec![0x80, 0x01]);
        assert_eq!(encode(&Datum::Float(1.0)), 1.0f32.to_le_bytes().to_vec());
        assert_eq!(encode(&Datum::String("foo".into())), vec![0x06, b'f', b'o', b'o']);
        assert_eq!(encode(&Datum::Enum(2)), vec![0x04]);
    }

    #[test]
    fn test_container_layouts() {
        let items = Datum::Array(vec![Datum::Int(3), Datum::Int(27)]);
        assert_eq!(encode(&items), vec![0x04, 0x06, 0x36, 0x00]);
        assert_eq!(encode(&Datum::Array(Vec::new())), vec![0x00]);

        let mut map = MapDatum::default();
        map.insert("a", Datum::Boolean(false));
        assert_eq!(encode(&Datum::Map(map)), vec![0x02, 0x02, b'a', 0x00, 0x00]);

        let union = Datum::Union(Some((1, Box::new(Datum::String("a".into())))));
        assert_eq!(encode(&union), vec![0x02, 0x02, b'a']);
    }

    #[test]
    fn test_unset_union_fails() {
        let mut out = Vec::new();
        let record = Datum::Record(vec![Datum::Int(1), Datum::Union(None)]);
        assert!(matches!(write_datum(&mut out, &record), Err(Error::EmptyUnion)));
    }
}
