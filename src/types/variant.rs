//! Loosely-typed annotation values attached to a series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single annotation value. Untagged: it is written as the bare JSON value.
///
/// Variant order matters for deserialization: integer tokens become
/// `Integer` when they fit in `i64`, every other number becomes `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variant {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

/// Annotation keys are kept sorted so encoded output is deterministic.
pub type Annotations = BTreeMap<String, Variant>;

impl Variant {
    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::Integer(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Text(v) => f.write_str(v),
            Variant::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Boolean(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Integer(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Text(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shapes() {
        let annotations: Annotations =
            serde_json::from_str(r#"{"a": 1, "b": 2.5, "c": "x", "d": true, "e": null}"#).unwrap();
        assert_eq!(annotations["a"], Variant::Integer(1));
        assert_eq!(annotations["b"], Variant::Float(2.5));
        assert_eq!(annotations["c"], Variant::from("x"));
        assert_eq!(annotations["d"], Variant::Boolean(true));
        assert!(annotations["e"].is_null());

        let json = serde_json::to_string(&annotations).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2.5,"c":"x","d":true,"e":null}"#);
    }

    #[test]
    fn test_nested_values_are_rejected() {
        assert!(serde_json::from_str::<Variant>("[1]").is_err());
        assert!(serde_json::from_str::<Variant>(r#"{"k": 1}"#).is_err());
    }
}
