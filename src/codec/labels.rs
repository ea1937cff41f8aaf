// In: src/codec/labels.rs

//! The label-map sub-codec shared by vector categories and value/label
//! tables. Both travel as a JSON object keyed by label.

use super::element::{ScalarOut, ScalarSeed};
use super::token::TokenSeed;
use super::vector::parse_length;
use super::{DecodeContext, EncodeContext};
use crate::error::VecframeError;
use crate::model::{ValueLabel, ValueLabels};
use crate::traits::Codable;
use crate::types::{DataKind, ElementKind, Scalar};
use serde::de::{DeserializeSeed, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

const CONTEXT: &str = "value labels";

//==================================================================================
// I. The Label Map
//==================================================================================

/// Reads `{label: value, ...}` with every value of one kind, in stream order.
pub(crate) struct LabelMapSeed<'c> {
    pub ctx: &'c DecodeContext,
    pub kind: ElementKind,
    pub tag: &'static str,
}

impl<'de> DeserializeSeed<'de> for LabelMapSeed<'_> {
    type Value = Vec<(String, Scalar)>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for LabelMapSeed<'_> {
    type Value = Vec<(String, Scalar)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an object of '{}' values keyed by label", self.tag)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::new();
        while let Some(label) = map.next_key::<String>()? {
            let value = map.next_value_seed(ScalarSeed {
                ctx: self.ctx,
                kind: self.kind,
                tag: self.tag,
                index: pairs.len(),
            })?;
            pairs.push((label, value));
        }
        Ok(pairs)
    }
}

/// Writes `{label: value, ...}` in the given order.
pub(crate) struct LabelMapOut<'a> {
    pub pairs: Vec<(&'a str, &'a Scalar)>,
    pub tag: &'static str,
    pub ctx: &'a EncodeContext,
}

impl Serialize for LabelMapOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (index, (label, scalar)) in self.pairs.iter().enumerate() {
            map.serialize_entry(
                *label,
                &ScalarOut {
                    scalar,
                    tag: self.tag,
                    index,
                    ctx: self.ctx,
                },
            )?;
        }
        map.end()
    }
}

//==================================================================================
// II. Value/Label Tables: {"dtype": tag, "length"?: n, "labels"?: {...}}
//==================================================================================

struct ValueLabelsVisitor<'c> {
    ctx: &'c DecodeContext,
}

impl<'de> Visitor<'de> for ValueLabelsVisitor<'_> {
    type Value = ValueLabels;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a value labels object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ValueLabels, A::Error> {
        let ctx = self.ctx;
        let mut kind: Option<DataKind> = None;
        let mut length: Option<usize> = None;
        let mut pairs: Option<Vec<(String, Scalar)>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "dtype" if kind.is_none() => {
                    let tag: String = map.next_value()?;
                    let parsed = DataKind::from_tag(&tag).map_err(|e| ctx.fail::<A::Error>(e))?;
                    if !ValueLabels::supports(parsed) {
                        return Err(ctx.fail(VecframeError::UnsupportedLabelKind(parsed.tag())));
                    }
                    kind = Some(parsed);
                }
                "length" if length.is_none() => {
                    let token = map.next_value_seed(TokenSeed { raw: true })?;
                    length = Some(parse_length(ctx, token).map_err(|e| ctx.fail::<A::Error>(e))?);
                }
                // `values` is accepted as a read alias for `labels`.
                "labels" | "values" if pairs.is_none() => {
                    let Some(kind) = kind else {
                        return Err(ctx.fail(VecframeError::MissingDataType {
                            field: if key == "labels" { "labels" } else { "values" },
                            context: CONTEXT,
                        }));
                    };
                    pairs = Some(map.next_value_seed(LabelMapSeed {
                        ctx,
                        kind: kind.element(),
                        tag: kind.tag(),
                    })?);
                }
                _ => {
                    return Err(ctx.fail(VecframeError::UnexpectedField {
                        field: key.clone(),
                        context: CONTEXT,
                    }))
                }
            }
        }

        let Some(kind) = kind else {
            return Err(ctx.fail(VecframeError::MissingField {
                field: "dtype",
                context: CONTEXT,
            }));
        };
        let pairs = pairs.unwrap_or_default();
        if let Some(declared) = length {
            if declared != pairs.len() {
                return Err(ctx.fail(VecframeError::LengthMismatch {
                    declared,
                    actual: pairs.len(),
                }));
            }
        }
        let entries = pairs.into_iter().map(|(label, value)| ValueLabel { value, label });
        ValueLabels::from_entries(kind.element(), entries).map_err(|e| ctx.fail(e))
    }
}

impl Codable for ValueLabels {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ValueLabelsVisitor { ctx })
    }

    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tag = DataKind::required(self.kind()).tag();
        let length = self.len();
        let max = ctx.config().max_serialized_length;
        if length > max {
            return Err(ctx.fail(VecframeError::LengthTooLarge {
                length: length as u64,
                max,
            }));
        }

        let mut map = serializer.serialize_map(Some(if self.is_empty() { 2 } else { 3 }))?;
        map.serialize_entry("dtype", tag)?;
        map.serialize_entry("length", &length)?;
        if !self.is_empty() {
            map.serialize_entry(
                "labels",
                &LabelMapOut {
                    pairs: self
                        .entries()
                        .iter()
                        .map(|e| (e.label.as_str(), &e.value))
                        .collect(),
                    tag,
                    ctx,
                },
            )?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn test_value_labels_roundtrip() {
        let json = r#"{"dtype":"i32","length":2,"labels":{"Male":1,"Female":2}}"#;
        let table: ValueLabels = decode(json).unwrap();
        assert_eq!(table.kind(), ElementKind::Int32);
        assert_eq!(table.label_of(&Scalar::Int32(2)), Some("Female"));
        assert_eq!(encode(&table).unwrap(), json);
    }

    #[test]
    fn test_values_alias_for_labels() {
        let table: ValueLabels = decode(r#"{"dtype":"i32","length":2,"values":{"Male":1,"Female":2}}"#).unwrap();
        assert_eq!(table.value_of("Female"), Some(&Scalar::Int32(2)));
        // Written back under the canonical key.
        assert_eq!(
            encode(&table).unwrap(),
            r#"{"dtype":"i32","length":2,"labels":{"Male":1,"Female":2}}"#
        );
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"i32","labels":{"a":1},"values":{"b":2}}"#),
            Err(VecframeError::UnexpectedField { .. })
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"values":{"a":1},"dtype":"i32"}"#),
            Err(VecframeError::MissingDataType { field: "values", .. })
        ));
    }

    #[test]
    fn test_value_labels_of_strings_and_dates() {
        let table: ValueLabels =
            decode(r#"{"dtype":"datetime","labels":{"launch":"2020-01-01T00:00:00"}}"#).unwrap();
        assert_eq!(table.len(), 1);
        let table: ValueLabels = decode(r#"{"dtype":"string","labels":{"NL":"Netherlands"}}"#).unwrap();
        assert_eq!(table.value_of("NL"), Some(&Scalar::from("Netherlands")));
    }

    #[test]
    fn test_empty_table_omits_labels() {
        let table = ValueLabels::new(ElementKind::Bool).unwrap();
        assert_eq!(encode(&table).unwrap(), r#"{"dtype":"bool","length":0}"#);
        let back: ValueLabels = decode(r#"{"dtype":"bool"}"#).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_value_labels_errors() {
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"char","labels":{}}"#),
            Err(VecframeError::UnsupportedLabelKind("char"))
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"na_i32"}"#),
            Err(VecframeError::UnsupportedLabelKind("na_i32"))
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"labels":{"a":1},"dtype":"i32"}"#),
            Err(VecframeError::MissingDataType { field: "labels", .. })
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"i32","length":3,"labels":{"a":1}}"#),
            Err(VecframeError::LengthMismatch { declared: 3, actual: 1 })
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"u8","labels":{"a":256}}"#),
            Err(VecframeError::NumericOverflow { tag: "u8", index: 0, .. })
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"dtype":"u8","labels":{"":1}}"#),
            Err(VecframeError::MalformedElement { index: 0, .. })
        ));
        assert!(matches!(
            decode::<ValueLabels>(r#"{"length":0}"#),
            Err(VecframeError::MissingField { field: "dtype", .. })
        ));
    }
}
