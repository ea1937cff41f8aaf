// In: src/codec/series.rs

//! Series documents:
//! `{"name"?: s, "annotations"?: {...}, "categories"?: <category set>, "data": <vector>}`.
//!
//! A bare vector object is also accepted where a series is expected; it is
//! recognised by its first key and read as an unnamed series.

use super::vector::{VectorFields, VectorMode};
use super::{Decoded, DecodeContext, EncodeContext, Encoded};
use crate::error::VecframeError;
use crate::model::series::check_codes;
use crate::model::{CategorySet, Series, Vector};
use crate::traits::Codable;
use crate::types::Annotations;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use std::fmt;

const CONTEXT: &str = "series";

struct SeriesFields<'c> {
    ctx: &'c DecodeContext,
    name: Option<Option<String>>,
    annotations: Option<Annotations>,
    categories: Option<CategorySet>,
    values: Option<Vector>,
}

impl<'c> SeriesFields<'c> {
    fn new(ctx: &'c DecodeContext) -> Self {
        Self {
            ctx,
            name: None,
            annotations: None,
            categories: None,
            values: None,
        }
    }

    fn unexpected<E: de::Error>(&self, key: &str) -> E {
        self.ctx.fail(VecframeError::UnexpectedField {
            field: key.to_string(),
            context: CONTEXT,
        })
    }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: &str, map: &mut A) -> Result<(), A::Error> {
        match key {
            "name" if self.name.is_none() => {
                self.name = Some(map.next_value()?);
            }
            "annotations" if self.annotations.is_none() => {
                self.annotations = Some(map.next_value()?);
            }
            "categories" if self.categories.is_none() => {
                if self.values.is_some() {
                    return Err(self.ctx.fail(VecframeError::MisorderedField {
                        field: "categories",
                        before: "data",
                    }));
                }
                self.categories = Some(map.next_value_seed(Decoded::<CategorySet>::new(self.ctx))?);
            }
            "data" | "values" if self.values.is_none() => {
                let values = if key == "data" {
                    map.next_value_seed(Decoded::<Vector>::new(self.ctx))?
                } else {
                    map.next_value_seed(AliasSeed { ctx: self.ctx })?
                };
                if let Some(categories) = &self.categories {
                    if self.ctx.config().validate_category_codes {
                        check_codes(&values, categories).map_err(|e| self.ctx.fail::<A::Error>(e))?;
                    }
                }
                self.values = Some(values);
            }
            _ => return Err(self.unexpected(key)),
        }
        Ok(())
    }

    fn into_series(self) -> Result<Series, VecframeError> {
        let values = self.values.ok_or(VecframeError::MissingValues { context: CONTEXT })?;
        Ok(Series::from_parts(
            self.name.flatten(),
            self.annotations.unwrap_or_default(),
            self.categories,
            values,
        ))
    }
}

/// Reads the value under the `values` alias. A bare array there is the
/// payload of a vector whose `dtype` has not arrived yet.
struct AliasSeed<'c> {
    ctx: &'c DecodeContext,
}

impl<'de> DeserializeSeed<'de> for AliasSeed<'_> {
    type Value = Vector;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Vector, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for AliasSeed<'_> {
    type Value = Vector;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a vector object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vector, A::Error> {
        let ctx = self.ctx;
        let mut fields = VectorFields::new(ctx, VectorMode::Vector);
        while let Some(key) = map.next_key::<String>()? {
            fields.accept(&key, &mut map)?;
        }
        fields.into_vector().map_err(|e| ctx.fail(e))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<Vector, A::Error> {
        Err(self.ctx.fail(VecframeError::MissingDataType {
            field: "values",
            context: "vector",
        }))
    }
}

struct SeriesVisitor<'c> {
    ctx: &'c DecodeContext,
}

impl<'de> Visitor<'de> for SeriesVisitor<'_> {
    type Value = Series;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a series or vector object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Series, A::Error> {
        let ctx = self.ctx;
        let Some(first) = map.next_key::<String>()? else {
            return Err(ctx.fail(VecframeError::MissingValues { context: CONTEXT }));
        };

        if VectorFields::opens_vector(&first) {
            let mut fields = VectorFields::new(ctx, VectorMode::Vector);
            fields.accept(&first, &mut map)?;
            while let Some(key) = map.next_key::<String>()? {
                fields.accept(&key, &mut map)?;
            }
            return fields.into_vector().map(Series::new).map_err(|e| ctx.fail(e));
        }

        let mut fields = SeriesFields::new(ctx);
        fields.accept(&first, &mut map)?;
        while let Some(key) = map.next_key::<String>()? {
            fields.accept(&key, &mut map)?;
        }
        fields.into_series().map_err(|e| ctx.fail(e))
    }
}

impl Codable for Series {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SeriesVisitor { ctx })
    }

    /// `name`, `annotations` and `categories` are written only when present.
    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = self.name() {
            map.serialize_entry("name", name)?;
        }
        if !self.annotations().is_empty() {
            map.serialize_entry("annotations", self.annotations())?;
        }
        if let Some(categories) = self.category_set() {
            map.serialize_entry("categories", &Encoded { value: categories, ctx })?;
        }
        map.serialize_entry("data", &Encoded { value: self.values(), ctx })?;
        map.end()
    }
}
