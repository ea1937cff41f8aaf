//! This module defines the canonical, type-safe representation of element kinds
//! and the tag registry that maps them to and from their wire strings.

use crate::error::VecframeError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The scalar kind stored in every element of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    Float32,
    Float64,
    Decimal,
    /// Milliseconds since the Unix epoch, stored as a 64-bit integer.
    DateTime64,
    /// A calendar date and time without an offset.
    DateTime,
    /// A calendar date and time with a fixed UTC offset.
    DateTimeOffset,
    Uuid,
    Bool,
    Char,
    String,
}

/// The full data kind of a vector: an element kind and whether elements may
/// be "not available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataKind {
    element: ElementKind,
    nullable: bool,
}

// The registry. These strings are part of the wire contract: they are
// case-exact and must never be changed once released.
macro_rules! tag_registry {
    ($($variant:ident => $tag:literal, $na_tag:literal;)+) => {
        impl ElementKind {
            /// Every element kind, in registry order.
            pub const ALL: &'static [ElementKind] = &[$(ElementKind::$variant),+];

            fn tags(self) -> (&'static str, &'static str) {
                match self {
                    $(ElementKind::$variant => ($tag, $na_tag),)+
                }
            }
        }

        fn lookup(tag: &str) -> Option<DataKind> {
            match tag {
                $(
                    $tag => Some(DataKind::required(ElementKind::$variant)),
                    $na_tag => Some(DataKind::na(ElementKind::$variant)),
                )+
                _ => None,
            }
        }
    };
}

tag_registry! {
    Int8 => "i8", "na_i8";
    UInt8 => "u8", "na_u8";
    Int16 => "i16", "na_i16";
    UInt16 => "u16", "na_u16";
    Int32 => "i32", "na_i32";
    UInt32 => "u32", "na_u32";
    Int64 => "i64", "na_i64";
    UInt64 => "u64", "na_u64";
    Int128 => "i128", "na_i128";
    UInt128 => "u128", "na_u128";
    Float32 => "f32", "na_f32";
    Float64 => "f64", "na_f64";
    Decimal => "decimal", "na_decimal";
    DateTime64 => "datetime64", "na_datetime64";
    DateTime => "datetime", "na_datetime";
    DateTimeOffset => "datetimeoffset", "na_datetimeoffset";
    Uuid => "uuid", "na_uuid";
    Bool => "bool", "na_bool";
    Char => "char", "na_char";
    String => "string", "na_string";
}

impl ElementKind {
    /// The tag of the non-nullable kind for this element.
    pub fn tag(self) -> &'static str {
        self.tags().0
    }

    /// Returns `true` for the ten fixed-width signed and unsigned integer kinds.
    /// `DateTime64` is an integer on the wire but not a binary integer kind.
    pub fn is_binary_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Int128
                | Self::UInt128
        )
    }

    /// Returns `true` if the element kind is a floating-point number.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns `true` for kinds whose wire token is a JSON number.
    pub fn is_numeric(self) -> bool {
        self.is_binary_integer() || self.is_float() || matches!(self, Self::Decimal | Self::DateTime64)
    }

    /// Returns `true` for kinds written as exact integer tokens.
    pub fn is_integer_token(self) -> bool {
        self.is_binary_integer() || self == Self::DateTime64
    }
}

impl DataKind {
    pub const fn new(element: ElementKind, nullable: bool) -> Self {
        Self { element, nullable }
    }

    /// The kind whose elements are always present.
    pub const fn required(element: ElementKind) -> Self {
        Self::new(element, false)
    }

    /// The "not available" counterpart, whose elements may be missing.
    pub const fn na(element: ElementKind) -> Self {
        Self::new(element, true)
    }

    pub fn element(self) -> ElementKind {
        self.element
    }

    pub fn is_nullable(self) -> bool {
        self.nullable
    }

    /// Resolves a wire tag. Matching is case-exact and there is no fallback kind.
    pub fn from_tag(tag: &str) -> Result<Self, VecframeError> {
        lookup(tag).ok_or_else(|| VecframeError::UnknownTag(tag.to_string()))
    }

    /// The canonical wire tag for this kind.
    pub fn tag(self) -> &'static str {
        let (tag, na_tag) = self.element.tags();
        if self.nullable {
            na_tag
        } else {
            tag
        }
    }

    /// Iterates over every registered kind, non-nullable kinds first.
    pub fn all() -> impl Iterator<Item = DataKind> {
        ElementKind::ALL
            .iter()
            .map(|&e| DataKind::required(e))
            .chain(ElementKind::ALL.iter().map(|&e| DataKind::na(e)))
    }
}

impl From<ElementKind> for DataKind {
    fn from(element: ElementKind) -> Self {
        DataKind::required(element)
    }
}

/// Provides the canonical string representation for a `DataKind`.
impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for DataKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for DataKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        DataKind::from_tag(&tag).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_roundtrips() {
        let mut seen = std::collections::HashSet::new();
        for kind in DataKind::all() {
            assert!(seen.insert(kind.tag()), "duplicate tag {}", kind.tag());
            assert_eq!(DataKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert_eq!(seen.len(), 40);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        for tag in ["", "int32", "I32", "na_", "na_na_i32", " i32"] {
            assert!(matches!(
                DataKind::from_tag(tag),
                Err(VecframeError::UnknownTag(t)) if t == tag
            ));
        }
    }

    #[test]
    fn test_classification() {
        assert!(ElementKind::UInt128.is_binary_integer());
        assert!(!ElementKind::DateTime64.is_binary_integer());
        assert!(ElementKind::DateTime64.is_integer_token());
        assert!(ElementKind::Decimal.is_numeric());
        assert!(!ElementKind::Decimal.is_integer_token());
        assert!(ElementKind::Float32.is_float());
        assert!(!ElementKind::Uuid.is_numeric());
    }

    #[test]
    fn test_nullable_tags() {
        let kind = DataKind::na(ElementKind::String);
        assert_eq!(kind.tag(), "na_string");
        assert!(kind.is_nullable());
        assert_eq!(kind.element(), ElementKind::String);
        assert_eq!(kind.to_string(), "na_string");
    }

    #[test]
    fn test_serde_uses_tag_strings() {
        let json = serde_json::to_string(&DataKind::required(ElementKind::Int32)).unwrap();
        assert_eq!(json, "\"i32\"");
        let kind: DataKind = serde_json::from_str("\"na_u64\"").unwrap();
        assert_eq!(kind, DataKind::na(ElementKind::UInt64));
        assert!(serde_json::from_str::<DataKind>("\"int\"").is_err());
    }
}
