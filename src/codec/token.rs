// In: src/codec/token.rs

//! A single scalar token pulled off the stream, before it is converted into
//! an element of the target kind.

use crate::error::VecframeError;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;

#[derive(Debug)]
pub(crate) enum Token {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// The verbatim text of a number literal, for kinds wider than 64 bits.
    Literal(Box<RawValue>),
    /// A structural value (array or object) or other token where a scalar was expected.
    Unexpected(&'static str),
}

impl Token {
    /// Reads one token. With `raw` set, number literals are captured verbatim
    /// instead of being narrowed to `i64`/`u64`/`f64`.
    pub(crate) fn read<'de, D: Deserializer<'de>>(deserializer: D, raw: bool) -> Result<Self, D::Error> {
        if raw {
            let raw = Box::<RawValue>::deserialize(deserializer)?;
            Ok(Token::from_raw(raw))
        } else {
            deserializer.deserialize_any(TokenVisitor)
        }
    }

    fn from_raw(raw: Box<RawValue>) -> Self {
        let text = raw.get();
        match text.as_bytes().first() {
            Some(b'-' | b'0'..=b'9') => Token::Literal(raw),
            Some(b'"') => match serde_json::from_str::<String>(text) {
                Ok(s) => Token::Str(s),
                Err(_) => Token::Unexpected("string"),
            },
            Some(b'[') => Token::Unexpected("array"),
            Some(b'{') => Token::Unexpected("object"),
            _ => match text {
                "null" => Token::Null,
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                _ => Token::Unexpected("token"),
            },
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Token::Null => "null",
            Token::Bool(_) => "boolean",
            Token::Int(_) | Token::UInt(_) => "integer",
            Token::Float(_) => "number",
            Token::Str(_) => "string",
            Token::Literal(_) => "number",
            Token::Unexpected(what) => what,
        }
    }

    /// The error for a token of the wrong shape.
    pub(crate) fn mismatch(&self, expected: &str) -> ElementError {
        ElementError::Malformed(format!("expected {}, found {}", expected, self.describe()))
    }
}

/// The failure of converting one token into one element. It has no position
/// yet; `at` attaches the tag and index once the caller knows them.
#[derive(Debug, PartialEq)]
pub(crate) enum ElementError {
    Overflow(String),
    Malformed(String),
}

impl ElementError {
    pub(crate) fn at(self, tag: &'static str, index: usize) -> VecframeError {
        match self {
            ElementError::Overflow(literal) => VecframeError::NumericOverflow { tag, index, literal },
            ElementError::Malformed(reason) => VecframeError::MalformedElement { tag, index, reason },
        }
    }
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Token, E> {
        Ok(Token::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Token, E> {
        Ok(Token::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Token, E> {
        Ok(Token::UInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Token, E> {
        Ok(Token::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Token, E> {
        Ok(Token::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Token, E> {
        Ok(Token::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Token, E> {
        Ok(Token::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Token, E> {
        Ok(Token::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Token, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Token::Unexpected("array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Token, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Token::Unexpected("object"))
    }
}

/// Seed form of `Token::read`, for use with `next_value_seed`.
pub(crate) struct TokenSeed {
    pub raw: bool,
}

impl<'de> DeserializeSeed<'de> for TokenSeed {
    type Value = Token;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Token, D::Error> {
        Token::read(deserializer, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(json: &str, raw: bool) -> Token {
        let mut de = serde_json::Deserializer::from_str(json);
        Token::read(&mut de, raw).unwrap()
    }

    #[test]
    fn test_plain_tokens() {
        assert!(matches!(read("-3", false), Token::Int(-3)));
        assert!(matches!(read("18446744073709551615", false), Token::UInt(u64::MAX)));
        assert!(matches!(read("1.5", false), Token::Float(v) if v == 1.5));
        assert!(matches!(read("\"a\"", false), Token::Str(s) if s == "a"));
        assert!(matches!(read("null", false), Token::Null));
        assert!(matches!(read("[1, [2]]", false), Token::Unexpected("array")));
        assert!(matches!(read("{\"a\": {}}", false), Token::Unexpected("object")));
    }

    #[test]
    fn test_raw_tokens_keep_literal_text() {
        match read("170141183460469231731687303715884105727", true) {
            Token::Literal(raw) => assert_eq!(raw.get(), "170141183460469231731687303715884105727"),
            other => panic!("unexpected token {:?}", other),
        }
        assert!(matches!(read("null", true), Token::Null));
        assert!(matches!(read("true", true), Token::Bool(true)));
        assert!(matches!(read("\"x\"", true), Token::Str(s) if s == "x"));
        assert!(matches!(read("[1]", true), Token::Unexpected("array")));
    }

    #[test]
    fn test_element_error_positions() {
        let err = ElementError::Overflow("300".into()).at("u8", 4);
        assert!(matches!(err, VecframeError::NumericOverflow { tag: "u8", index: 4, .. }));
    }
}
