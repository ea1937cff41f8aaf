//! Single-element values lifted out of a typed array.
//!
//! `Scalar` is the dynamically-typed view of one element: what `Vector::get`
//! returns and what category and value-label tables store. Bulk data never
//! goes through it.

use super::data_kind::ElementKind;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime64(i64);

impl DateTime64 {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    /// `None` when the instant is outside chrono's representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for DateTime64 {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

impl fmt::Display for DateTime64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! define_scalar {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// One element of any kind, or a missing element of a not-available kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Scalar {
            $($variant($ty),)+
            Na,
        }

        impl Scalar {
            /// The element kind, or `None` for a missing element.
            pub fn kind(&self) -> Option<ElementKind> {
                match self {
                    $(Scalar::$variant(_) => Some(ElementKind::$variant),)+
                    Scalar::Na => None,
                }
            }
        }

        impl fmt::Display for Scalar {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Scalar::$variant(v) => write!(f, "{}", v),)+
                    Scalar::Na => f.write_str("NA"),
                }
            }
        }

        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )+
    };
}

element_kinds!(define_scalar);

impl Scalar {
    pub fn is_na(&self) -> bool {
        matches!(self, Scalar::Na)
    }

    /// The two's-complement bit pattern of a binary integer, widened to 128
    /// bits. Used as the identity of category codes.
    pub fn integer_bits(&self) -> Option<u128> {
        Some(match *self {
            Scalar::Int8(v) => v as i128 as u128,
            Scalar::UInt8(v) => v as u128,
            Scalar::Int16(v) => v as i128 as u128,
            Scalar::UInt16(v) => v as u128,
            Scalar::Int32(v) => v as i128 as u128,
            Scalar::UInt32(v) => v as u128,
            Scalar::Int64(v) => v as i128 as u128,
            Scalar::UInt64(v) => v as u128,
            Scalar::Int128(v) => v as u128,
            Scalar::UInt128(v) => v,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<NaiveDateTime> for DateTime64 {
    fn from(value: NaiveDateTime) -> Self {
        Self(value.and_utc().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_na() {
        assert_eq!(Scalar::from(5i32).kind(), Some(ElementKind::Int32));
        assert_eq!(Scalar::from("x").kind(), Some(ElementKind::String));
        assert_eq!(Scalar::Na.kind(), None);
        assert!(Scalar::Na.is_na());
        assert_eq!(Scalar::Na.to_string(), "NA");
    }

    #[test]
    fn test_integer_bits_identity() {
        assert_eq!(Scalar::Int8(-1).integer_bits(), Some(u128::MAX));
        assert_eq!(Scalar::UInt64(7).integer_bits(), Some(7));
        assert_ne!(Scalar::Int16(-1).integer_bits(), Scalar::UInt16(u16::MAX).integer_bits());
        assert_eq!(Scalar::Float64(1.0).integer_bits(), None);
    }

    #[test]
    fn test_datetime64_conversions() {
        let instant = DateTime64::from_millis(1_700_000_000_123);
        let dt = instant.to_datetime().unwrap();
        assert_eq!(DateTime64::from(dt), instant);
        assert_eq!(DateTime64::from(dt.naive_utc()).millis(), 1_700_000_000_123);
        assert!(DateTime64::from_millis(i64::MAX).to_datetime().is_none());
    }
}
