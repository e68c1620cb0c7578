use bytes::BufMut;

use crate::internal::error::{Error, Result};

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Maps signed integers onto unsigned ones so that small magnitudes stay
/// small: 0, -1, 1, -2, 2 ... become 0, 1, 2, 3, 4 ...
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Encodes an unsigned 64-bit integer as a base-128 varint, low group first.
/// Returns the encoded bytes.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_len(value));
    put_varint(&mut buf, value);
    buf
}

/// Writes a varint into any `BufMut`.
pub fn put_varint<B: BufMut>(buf: &mut B, value: u64) {
    let mut value = value;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Number of bytes `encode_varint(value)` produces.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Writes a zig-zag encoded long.
pub fn put_long<B: BufMut>(buf: &mut B, value: i64) {
    put_varint(buf, zigzag_encode(value));
}

pub fn long_len(value: i64) -> usize {
    varint_len(zigzag_encode(value))
}

/// Decodes an unsigned 64-bit integer from a varint encoded byte slice.
/// Returns the decoded value and the number of bytes read.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0;

    for (i, byte) in data.iter().enumerate() {
        let low_seven_bits = (byte & 0x7F) as u64;
        if i == MAX_VARINT_LEN - 1 && low_seven_bits > 1 {
            return Err(Error::InvalidEncoding("varint overflows 64 bits".to_string()));
        }
        value |= low_seven_bits << shift;
        if (byte & 0x80) == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
        if i + 1 == MAX_VARINT_LEN {
            return Err(Error::InvalidEncoding(format!(
                "varint longer than {} bytes",
                MAX_VARINT_LEN
            )));
        }
    }

    // Incomplete varint
    Err(Error::truncated(1, 0))
}

/// Decodes a zig-zag encoded long.
pub fn decode_long(data: &[u8]) -> Result<(i64, usize)> {
    let (raw, read) = decode_varint(data)?;
    Ok((zigzag_decode(raw), read))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(127), vec![0x7F]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(encode_varint(u64::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
    }

    #[test]
    fn test_decode_varint() {
        assert_eq!(decode_varint(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_varint(&[0x7F]).unwrap(), (127, 1));
        assert_eq!(decode_varint(&[0x80, 0x01]).unwrap(), (128, 2));
        assert_eq!(decode_varint(&[0xAC, 0x02, 0xFF]).unwrap(), (300, 2));
        assert_eq!(decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_decode_varint_incomplete() {
        assert!(matches!(decode_varint(&[]), Err(Error::Truncated { .. })));
        assert!(matches!(decode_varint(&[0x80]), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_decode_varint_too_large() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(decode_varint(&data), Err(Error::InvalidEncoding(_))));
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x81, 0x01];
        assert!(matches!(decode_varint(&data), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-64), 127);
        assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
        for v in [0, 1, -1, 63, -64, 64, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
            assert_eq!(long_len(v), encode_varint(zigzag_encode(v)).len());
        }
        assert_eq!(long_len(-64), 1);
        assert_eq!(long_len(64), 2);
    }

    #[test]
    fn test_decode_long() {
        assert_eq!(decode_long(&[0x36, 0xFF]).unwrap(), (27, 1));
        assert_eq!(decode_long(&[0x7F]).unwrap(), (-64, 1));
        assert_eq!(decode_long(&[0x80, 0x01]).unwrap(), (64, 2));
        assert!(matches!(decode_long(&[0x80]), Err(Error::Truncated { .. })));
    }
}
