// In: src/codec/element.rs

//! Per-kind conversion between one wire token and one element.
//!
//! `Element` is implemented once for each Rust element type; `Cell` lifts it
//! to the storage type of a vector slot (`T` for required kinds, `Option<T>`
//! for not-available kinds). The seeds and writers at the bottom attach the
//! tag and index to any failure and route it through the call context.

use super::token::{ElementError, Token};
use super::{DecodeContext, EncodeContext};
use crate::types::{DateTime64, Decimal, DecimalParseError, ElementKind, Scalar};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use num_traits::FromPrimitive;
use serde::de::{DeserializeSeed, Deserializer};
use serde::ser::{self, Serialize, Serializer};
use serde_json::value::RawValue;
use std::marker::PhantomData;
use std::num::IntErrorKind;
use uuid::Uuid;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) trait Element: Sized + Send + 'static {
    const KIND: ElementKind;
    /// Number literals for this kind are read verbatim, never through `f64`.
    const RAW_LITERAL: bool = false;

    fn from_token(token: Token) -> Result<Self, ElementError>;

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;

    /// Rejects values that have no wire representation.
    fn check(&self) -> Result<(), ElementError> {
        Ok(())
    }
}

//==================================================================================
// I. Integer kinds
//==================================================================================

fn integral_float<T: FromPrimitive>(v: f64) -> Result<T, ElementError> {
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(ElementError::Malformed(format!("{} is not an integer", v)));
    }
    T::from_f64(v).ok_or_else(|| ElementError::Overflow(v.to_string()))
}

/// Exact signed reading first, then exact unsigned, then float.
fn integer_from_token<T: FromPrimitive>(token: Token) -> Result<T, ElementError> {
    match token {
        Token::Int(v) => T::from_i64(v).ok_or_else(|| ElementError::Overflow(v.to_string())),
        Token::UInt(v) => T::from_u64(v).ok_or_else(|| ElementError::Overflow(v.to_string())),
        Token::Float(v) => integral_float(v),
        Token::Literal(raw) => {
            let text = raw.get();
            match text.parse::<i64>() {
                Ok(v) => T::from_i64(v).ok_or_else(|| ElementError::Overflow(text.to_string())),
                Err(_) => match text.parse::<u64>() {
                    Ok(v) => T::from_u64(v).ok_or_else(|| ElementError::Overflow(text.to_string())),
                    Err(_) => literal_float(text).and_then(integral_float),
                },
            }
        }
        other => Err(other.mismatch("an integer")),
    }
}

/// 128-bit kinds parse the literal text directly so no digit is lost.
fn wide_integer_from_token<T>(token: Token) -> Result<T, ElementError>
where
    T: FromPrimitive + std::str::FromStr<Err = std::num::ParseIntError>,
{
    match token {
        Token::Literal(raw) => {
            let text = raw.get();
            match text.parse::<T>() {
                Ok(v) => Ok(v),
                Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                    Err(ElementError::Overflow(text.to_string()))
                }
                Err(_) => literal_float(text).and_then(integral_float),
            }
        }
        other => integer_from_token(other),
    }
}

fn literal_float(text: &str) -> Result<f64, ElementError> {
    text.parse::<f64>()
        .map_err(|_| ElementError::Malformed(format!("'{}' is not a number", text)))
}

macro_rules! impl_integer_element {
    ($($kind:ident => $ty:ty),+ $(,)?) => {$(
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;

            fn from_token(token: Token) -> Result<Self, ElementError> {
                integer_from_token(token)
            }

            fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.serialize(serializer)
            }
        }
    )+};
}

impl_integer_element!(
    Int8 => i8,
    UInt8 => u8,
    Int16 => i16,
    UInt16 => u16,
    Int32 => i32,
    UInt32 => u32,
    Int64 => i64,
    UInt64 => u64,
);

impl Element for i128 {
    const KIND: ElementKind = ElementKind::Int128;
    const RAW_LITERAL: bool = true;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        wide_integer_from_token(token)
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i128(*self)
    }
}

impl Element for u128 {
    const KIND: ElementKind = ElementKind::UInt128;
    const RAW_LITERAL: bool = true;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        wide_integer_from_token(token)
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(*self)
    }
}

impl Element for DateTime64 {
    const KIND: ElementKind = ElementKind::DateTime64;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        integer_from_token::<i64>(token).map(DateTime64::from_millis)
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.millis())
    }
}

//==================================================================================
// II. Floating-point and decimal kinds
//==================================================================================

fn float_from_token(token: Token) -> Result<f64, ElementError> {
    match token {
        Token::Int(v) => Ok(v as f64),
        Token::UInt(v) => Ok(v as f64),
        Token::Float(v) => Ok(v),
        Token::Literal(raw) => literal_float(raw.get()),
        other => Err(other.mismatch("a number")),
    }
}

fn finite(v: f64) -> Result<(), ElementError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ElementError::Malformed(format!("{} has no JSON representation", v)))
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        float_from_token(token)
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*self)
    }

    fn check(&self) -> Result<(), ElementError> {
        finite(*self)
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let v = float_from_token(token)?;
        if v.is_finite() && v.abs() > f32::MAX as f64 {
            return Err(ElementError::Overflow(v.to_string()));
        }
        Ok(v as f32)
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(*self)
    }

    fn check(&self) -> Result<(), ElementError> {
        finite(*self as f64)
    }
}

impl Element for Decimal {
    const KIND: ElementKind = ElementKind::Decimal;
    const RAW_LITERAL: bool = true;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let text = match &token {
            Token::Literal(raw) => raw.get().to_string(),
            Token::Int(v) => v.to_string(),
            Token::UInt(v) => v.to_string(),
            other => return Err(other.mismatch("a number")),
        };
        text.parse::<Decimal>().map_err(|e| match e {
            DecimalParseError::Overflow => ElementError::Overflow(text),
            DecimalParseError::Malformed => ElementError::Malformed(format!("'{}' is not a decimal", text)),
        })
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Written as a raw number literal so every digit and the scale survive.
        match RawValue::from_string(self.to_string()) {
            Ok(literal) => literal.serialize(serializer),
            Err(e) => Err(<S::Error as ser::Error>::custom(e)),
        }
    }
}

//==================================================================================
// III. Textual kinds
//==================================================================================

fn text_from_token(token: Token, expected: &str) -> Result<String, ElementError> {
    match token {
        Token::Str(s) => Ok(s),
        other => Err(other.mismatch(expected)),
    }
}

impl Element for NaiveDateTime {
    const KIND: ElementKind = ElementKind::DateTime;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let text = text_from_token(token, "a date-time string")?;
        NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
            .map_err(|e| ElementError::Malformed(format!("'{}': {}", text, e)))
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.format(DATETIME_FORMAT))
    }
}

impl Element for DateTime<FixedOffset> {
    const KIND: ElementKind = ElementKind::DateTimeOffset;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let text = text_from_token(token, "an RFC 3339 string")?;
        DateTime::parse_from_rfc3339(&text).map_err(|e| ElementError::Malformed(format!("'{}': {}", text, e)))
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

impl Element for Uuid {
    const KIND: ElementKind = ElementKind::Uuid;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let text = text_from_token(token, "a UUID string")?;
        Uuid::parse_str(&text).map_err(|e| ElementError::Malformed(format!("'{}': {}", text, e)))
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.hyphenated())
    }
}

impl Element for bool {
    const KIND: ElementKind = ElementKind::Bool;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        match token {
            Token::Bool(v) => Ok(v),
            other => Err(other.mismatch("a boolean")),
        }
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*self)
    }
}

impl Element for char {
    const KIND: ElementKind = ElementKind::Char;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        let text = text_from_token(token, "a one-character string")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ElementError::Malformed(format!("'{}' is not a single character", text))),
        }
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(*self)
    }
}

impl Element for String {
    const KIND: ElementKind = ElementKind::String;

    fn from_token(token: Token) -> Result<Self, ElementError> {
        text_from_token(token, "a string")
    }

    fn write<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self)
    }
}

//==================================================================================
// IV. Cells: required and not-available slots
//==================================================================================

pub(crate) trait Cell: Sized + Send + 'static {
    type Elem: Element;

    fn from_token(token: Token) -> Result<Self, ElementError>;

    fn write_cell<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;

    fn check(&self) -> Result<(), ElementError>;
}

macro_rules! impl_cells {
    ($($variant:ident => $ty:ty),+ $(,)?) => {$(
        impl Cell for $ty {
            type Elem = $ty;

            fn from_token(token: Token) -> Result<Self, ElementError> {
                match token {
                    Token::Null => Err(ElementError::Malformed(
                        "null is only allowed in not-available kinds".to_string(),
                    )),
                    other => <$ty as Element>::from_token(other),
                }
            }

            fn write_cell<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                Element::write(self, serializer)
            }

            fn check(&self) -> Result<(), ElementError> {
                Element::check(self)
            }
        }

        impl Cell for Option<$ty> {
            type Elem = $ty;

            fn from_token(token: Token) -> Result<Self, ElementError> {
                match token {
                    Token::Null => Ok(None),
                    other => <$ty as Element>::from_token(other).map(Some),
                }
            }

            fn write_cell<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    Some(value) => Element::write(value, serializer),
                    None => serializer.serialize_none(),
                }
            }

            fn check(&self) -> Result<(), ElementError> {
                self.as_ref().map_or(Ok(()), Element::check)
            }
        }
    )+};
}

element_kinds!(impl_cells);

//==================================================================================
// V. Seeds and writers
//==================================================================================

/// Reads one cell at a known position.
pub(crate) struct CellSeed<'c, T> {
    ctx: &'c DecodeContext,
    tag: &'static str,
    index: usize,
    _cell: PhantomData<T>,
}

impl<'c, T: Cell> CellSeed<'c, T> {
    pub(crate) fn new(ctx: &'c DecodeContext, tag: &'static str, index: usize) -> Self {
        Self {
            ctx,
            tag,
            index,
            _cell: PhantomData,
        }
    }
}

impl<'de, T: Cell> DeserializeSeed<'de> for CellSeed<'_, T> {
    type Value = T;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        let token = Token::read(deserializer, T::Elem::RAW_LITERAL)?;
        T::from_token(token).map_err(|e| self.ctx.fail(e.at(self.tag, self.index)))
    }
}

/// Writes one cell, checking it first.
pub(crate) struct CellOut<'a, T> {
    pub cell: &'a T,
    pub tag: &'static str,
    pub index: usize,
    pub ctx: &'a EncodeContext,
}

impl<T: Cell> Serialize for CellOut<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Err(e) = self.cell.check() {
            return Err(self.ctx.fail(e.at(self.tag, self.index)));
        }
        self.cell.write_cell(serializer)
    }
}

/// Writes a slice of cells as a JSON array.
pub(crate) struct CellsOut<'a, T> {
    pub cells: &'a [T],
    pub tag: &'static str,
    pub ctx: &'a EncodeContext,
}

impl<T: Cell> Serialize for CellsOut<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.cells.len()))?;
        for (index, cell) in self.cells.iter().enumerate() {
            seq.serialize_element(&CellOut {
                cell,
                tag: self.tag,
                index,
                ctx: self.ctx,
            })?;
        }
        seq.end()
    }
}

/// Reads one required element of a kind only known at runtime, as a `Scalar`.
pub(crate) struct ScalarSeed<'c> {
    pub ctx: &'c DecodeContext,
    pub kind: ElementKind,
    pub tag: &'static str,
    pub index: usize,
}

macro_rules! scalar_dispatch {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        impl<'de> DeserializeSeed<'de> for ScalarSeed<'_> {
            type Value = Scalar;

            fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Scalar, D::Error> {
                match self.kind {
                    $(ElementKind::$variant => CellSeed::<$ty>::new(self.ctx, self.tag, self.index)
                        .deserialize(deserializer)
                        .map(Scalar::$variant),)+
                }
            }
        }

        impl Serialize for ScalarOut<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.scalar {
                    $(Scalar::$variant(value) => CellOut {
                        cell: value,
                        tag: self.tag,
                        index: self.index,
                        ctx: self.ctx,
                    }
                    .serialize(serializer),)+
                    Scalar::Na => serializer.serialize_none(),
                }
            }
        }
    };
}

/// Writes one `Scalar` with the same rules as a vector cell.
pub(crate) struct ScalarOut<'a> {
    pub scalar: &'a Scalar,
    pub tag: &'static str,
    pub index: usize,
    pub ctx: &'a EncodeContext,
}

element_kinds!(scalar_dispatch);

#[cfg(test)]
mod tests {
    use super::*;

    fn token(json: &str, raw: bool) -> Token {
        let mut de = serde_json::Deserializer::from_str(json);
        Token::read(&mut de, raw).unwrap()
    }

    fn cell<T: Cell>(json: &str) -> Result<T, ElementError> {
        T::from_token(token(json, T::Elem::RAW_LITERAL))
    }

    #[test]
    fn test_integer_conversions_are_checked() {
        assert_eq!(cell::<i8>("-128"), Ok(-128));
        assert!(matches!(cell::<i8>("128"), Err(ElementError::Overflow(_))));
        assert!(matches!(cell::<u8>("-1"), Err(ElementError::Overflow(_))));
        assert_eq!(cell::<u64>("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(cell::<i32>("4.0"), Ok(4));
        assert!(matches!(cell::<i32>("4.5"), Err(ElementError::Malformed(_))));
        assert!(matches!(cell::<i64>("1e30"), Err(ElementError::Overflow(_))));
        assert!(matches!(cell::<i32>("\"4\""), Err(ElementError::Malformed(_))));
    }

    #[test]
    fn test_wide_integers_are_exact() {
        assert_eq!(cell::<i128>("-170141183460469231731687303715884105728"), Ok(i128::MIN));
        assert_eq!(cell::<u128>("340282366920938463463374607431768211455"), Ok(u128::MAX));
        assert!(matches!(
            cell::<u128>("340282366920938463463374607431768211456"),
            Err(ElementError::Overflow(_))
        ));
        assert!(matches!(cell::<u128>("-1"), Err(ElementError::Overflow(_))));
        assert_eq!(cell::<i128>("12e2"), Ok(1200));
    }

    #[test]
    fn test_floats() {
        assert_eq!(cell::<f64>("3"), Ok(3.0));
        assert_eq!(cell::<f32>("0.5"), Ok(0.5));
        assert!(matches!(cell::<f32>("1e39"), Err(ElementError::Overflow(_))));
        assert!(Cell::check(&f64::NAN).is_err());
        assert!(Cell::check(&Some(f32::INFINITY)).is_err());
        assert!(Cell::check(&None::<f64>).is_ok());
    }

    #[test]
    fn test_decimal_literal_keeps_digits() {
        let d: Decimal = cell("12345678901234567890.125").unwrap();
        assert_eq!(d.to_string(), "12345678901234567890.125");
        assert!(matches!(cell::<Decimal>("\"1\""), Err(ElementError::Malformed(_))));
    }

    #[test]
    fn test_textual_kinds() {
        let dt: NaiveDateTime = cell("\"2024-02-29T13:45:00.250\"").unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "2024-02-29T13:45:00.250");
        let offset: DateTime<FixedOffset> = cell("\"2024-02-29T13:45:00+02:00\"").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 7200);
        assert!(cell::<Uuid>("\"67e55044-10b1-426f-9247-bb680e5fe0c8\"").is_ok());
        assert!(matches!(cell::<Uuid>("\"nope\""), Err(ElementError::Malformed(_))));
        assert_eq!(cell::<char>("\"x\""), Ok('x'));
        assert!(cell::<char>("\"xy\"").is_err());
        assert!(cell::<bool>("1").is_err());
    }

    #[test]
    fn test_null_handling() {
        assert!(matches!(cell::<String>("null"), Err(ElementError::Malformed(_))));
        assert_eq!(cell::<Option<String>>("null"), Ok(None));
        assert_eq!(cell::<Option<i128>>("null"), Ok(None));
        assert_eq!(cell::<Option<i16>>("7"), Ok(Some(7)));
    }
}
