use std::fmt;

use crate::schema::TypeTag;

/// Borrowed view of a scalar value, also used as the input of `set_scalar`.
///
/// Enum values are carried by their 0-based symbol index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(&'a [u8]),
    String(&'a str),
    Fixed(&'a [u8]),
    Enum(usize),
}

impl Scalar<'_> {
    /// Returns the type this scalar belongs to.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Scalar::Null => TypeTag::Null,
            Scalar::Boolean(_) => TypeTag::Boolean,
            Scalar::Int(_) => TypeTag::Int,
            Scalar::Long(_) => TypeTag::Long,
            Scalar::Float(_) => TypeTag::Float,
            Scalar::Double(_) => TypeTag::Double,
            Scalar::Bytes(_) => TypeTag::Bytes,
            Scalar::String(_) => TypeTag::String,
            Scalar::Fixed(_) => TypeTag::Fixed,
            Scalar::Enum(_) => TypeTag::Enum,
        }
    }

    /// Numeric view used by callers that do not care about width.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::Int(v) => Some(v as f64),
            Scalar::Long(v) => Some(v as f64),
            Scalar::Float(v) => Some(v as f64),
            Scalar::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::String(v) => write!(f, "{:?}", v),
            Scalar::Bytes(v) | Scalar::Fixed(v) => write!(f, "{:02x?}", v),
            Scalar::Enum(v) => write!(f, "#{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_tags() {
        assert_eq!(Scalar::Int(1).type_tag(), TypeTag::Int);
        assert_eq!(Scalar::Fixed(&[0, 1]).type_tag(), TypeTag::Fixed);
        assert_eq!(Scalar::Long(-3).as_f64(), Some(-3.0));
        assert_eq!(Scalar::String("x").as_f64(), None);
    }
}
