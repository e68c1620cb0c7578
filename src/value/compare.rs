// Structural equality, ordering and hashing of generic values

use std::cmp::Ordering;

use crate::value::datum::Datum;
use crate::value::generic::ValueRef;

/// Position of each datum kind in the cross-type order.
fn rank(datum: &Datum) -> u8 {
    match datum {
        Datum::Null => 0,
        Datum::Boolean(_) => 1,
        Datum::Int(_) => 2,
        Datum::Long(_) => 3,
        Datum::Float(_) => 4,
        Datum::Double(_) => 5,
        Datum::Bytes(_) => 6,
        Datum::String(_) => 7,
        Datum::Fixed(_) => 8,
        Datum::Enum(_) => 9,
        Datum::Array(_) => 10,
        Datum::Map(_) => 11,
        Datum::Record(_) => 12,
        Datum::Union(_) => 13,
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    // 0.0 and -0.0 are equal; NaN sorts after every number and equals itself
    if a == b {
        Ordering::Equal
    } else {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

fn compare_seq(a: &[Datum], b: &[Datum]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match compare_datum(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

pub(crate) fn compare_datum(a: &Datum, b: &Datum) -> Ordering {
    match (a, b) {
        (Datum::Null, Datum::Null) => Ordering::Equal,
        (Datum::Boolean(x), Datum::Boolean(y)) => x.cmp(y),
        (Datum::Int(x), Datum::Int(y)) => x.cmp(y),
        (Datum::Long(x), Datum::Long(y)) => x.cmp(y),
        (Datum::Float(x), Datum::Float(y)) => compare_f64(f64::from(*x), f64::from(*y)),
        (Datum::Double(x), Datum::Double(y)) => compare_f64(*x, *y),
        (Datum::Bytes(x), Datum::Bytes(y)) | (Datum::Fixed(x), Datum::Fixed(y)) => {
            x.as_ref().cmp(y.as_ref())
        }
        (Datum::String(x), Datum::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Datum::Enum(x), Datum::Enum(y)) => x.cmp(y),
        (Datum::Array(x), Datum::Array(y)) => {
            x.len().cmp(&y.len()).then_with(|| compare_seq(x, y))
        }
        (Datum::Map(x), Datum::Map(y)) => {
            x.len().cmp(&y.len()).then_with(|| {
                // insertion order does not matter
                let mut xk: Vec<&str> = x.iter().map(|(k, _)| k).collect();
                let mut yk: Vec<&str> = y.iter().map(|(k, _)| k).collect();
                xk.sort_unstable();
                yk.sort_unstable();
                xk.cmp(&yk).then_with(|| {
                    for key in &xk {
                        if let (Some(xv), Some(yv)) = (x.get(key), y.get(key)) {
                            match compare_datum(xv, yv) {
                                Ordering::Equal => continue,
                                other => return other,
                            }
                        }
                    }
                    Ordering::Equal
                })
            })
        }
        (Datum::Record(x), Datum::Record(y)) => compare_seq(x, y),
        (Datum::Union(x), Datum::Union(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some((dx, bx)), Some((dy, by))) => {
                dx.cmp(dy).then_with(|| compare_datum(bx, by))
            }
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

pub(crate) fn compare(a: ValueRef<'_>, b: ValueRef<'_>) -> Ordering {
    compare_datum(a.datum(), b.datum())
}

pub(crate) fn equal(a: ValueRef<'_>, b: ValueRef<'_>) -> bool {
    a.type_tag() == b.type_tag() && compare(a, b) == Ordering::Equal
}

fn feed(hasher: &mut blake3::Hasher, datum: &Datum) {
    hasher.update(&[rank(datum)]);
    match datum {
        Datum::Null => {}
        Datum::Boolean(v) => {
            hasher.update(&[*v as u8]);
        }
        Datum::Int(v) => {
            hasher.update(&v.to_le_bytes());
        }
        Datum::Long(v) => {
            hasher.update(&v.to_le_bytes());
        }
        Datum::Float(v) => {
            hasher.update(&canonical_f64(f64::from(*v)).to_le_bytes());
        }
        Datum::Double(v) => {
            hasher.update(&canonical_f64(*v).to_le_bytes());
        }
        Datum::Bytes(v) | Datum::Fixed(v) => {
            hasher.update(&(v.len() as u64).to_le_bytes());
            hasher.update(v);
        }
        Datum::String(v) => {
            hasher.update(&(v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        Datum::Enum(v) => {
            hasher.update(&(*v as u64).to_le_bytes());
        }
        Datum::Array(items) => {
            hasher.update(&(items.len() as u64).to_le_bytes());
            for item in items {
                feed(hasher, item);
            }
        }
        Datum::Map(map) => {
            // xor of per-entry digests keeps the hash independent of insertion order
            let mut combined = [0u8; 32];
            for (key, value) in map.iter() {
                let mut entry = blake3::Hasher::new();
                entry.update(&(key.len() as u64).to_le_bytes());
                entry.update(key.as_bytes());
                feed(&mut entry, value);
                for (c, b) in combined.iter_mut().zip(entry.finalize().as_bytes()) {
                    *c ^= b;
                }
            }
            hasher.update(&(map.len() as u64).to_le_bytes());
            hasher.update(&combined);
        }
        Datum::Record(fields) => {
            for field in fields {
                feed(hasher, field);
            }
        }
        Datum::Union(active) => match active {
            None => {
                hasher.update(&[0]);
            }
            Some((d, branch)) => {
                hasher.update(&[1]);
                hasher.update(&(*d as u64).to_le_bytes());
                feed(hasher, branch);
            }
        },
    }
}

fn canonical_f64(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// 32-bit structural hash, stable across runs and platforms.
pub(crate) fn hash(value: ValueRef<'_>) -> u32 {
    let mut hasher = blake3::Hasher::new();
    feed(&mut hasher, value.datum());
    let digest = hasher.finalize();
    let bytes = digest.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
