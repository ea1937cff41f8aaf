// In: src/codec/vector.rs

//! Vector and category-set documents:
//! `{"dtype": tag, "length": n, "values": [...], "categories"?: {label: code}}`.
//!
//! Fields are consumed in stream order. `values` and `categories` are decoded
//! on the spot with the kind from an earlier `dtype`; nothing is buffered to
//! wait for a later one.

use super::element::{Cell, CellSeed, CellsOut};
use super::labels::{LabelMapOut, LabelMapSeed};
use super::token::{Token, TokenSeed};
use super::{DecodeContext, EncodeContext};
use crate::buffer::ElementBuffer;
use crate::error::VecframeError;
use crate::model::{Categories, CategorySet, Values, Vector, VectorData};
use crate::traits::Codable;
use crate::types::{DataKind, ElementKind};
use log::trace;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::num::IntErrorKind;

//==================================================================================
// I. Field Assembly
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VectorMode {
    Vector,
    CategorySet,
}

/// Collects the fields of one vector object as they arrive.
pub(crate) struct VectorFields<'c> {
    ctx: &'c DecodeContext,
    mode: VectorMode,
    kind: Option<DataKind>,
    length: Option<usize>,
    data: Option<VectorData>,
    categories: Option<Categories>,
}

impl<'c> VectorFields<'c> {
    pub(crate) fn new(ctx: &'c DecodeContext, mode: VectorMode) -> Self {
        Self {
            ctx,
            mode,
            kind: None,
            length: None,
            data: None,
            categories: None,
        }
    }

    /// Keys that can only open a bare vector object.
    pub(crate) fn opens_vector(key: &str) -> bool {
        matches!(key, "dtype" | "length")
    }

    fn context(&self) -> &'static str {
        match self.mode {
            VectorMode::Vector => "vector",
            VectorMode::CategorySet => "category set",
        }
    }

    fn fail<E: de::Error>(&self, err: VecframeError) -> E {
        self.ctx.fail(err)
    }

    fn unexpected<E: de::Error>(&self, key: &str) -> E {
        self.fail(VecframeError::UnexpectedField {
            field: key.to_string(),
            context: self.context(),
        })
    }

    pub(crate) fn accept<'de, A: MapAccess<'de>>(&mut self, key: &str, map: &mut A) -> Result<(), A::Error> {
        match key {
            "dtype" => {
                if self.kind.is_some() {
                    return Err(self.unexpected(key));
                }
                let tag: String = map.next_value()?;
                let kind = DataKind::from_tag(&tag).map_err(|e| self.fail::<A::Error>(e))?;
                if self.mode == VectorMode::CategorySet && !is_code_kind(kind) {
                    return Err(self.fail(VecframeError::UnsupportedCategoryKind(kind.tag())));
                }
                self.kind = Some(kind);
            }
            "length" => {
                if self.length.is_some() {
                    return Err(self.unexpected(key));
                }
                let token = map.next_value_seed(TokenSeed { raw: true })?;
                let length = parse_length(self.ctx, token).map_err(|e| self.fail::<A::Error>(e))?;
                if let Some(data) = &self.data {
                    if data.len() != length {
                        return Err(self.fail(VecframeError::LengthMismatch {
                            declared: length,
                            actual: data.len(),
                        }));
                    }
                }
                self.length = Some(length);
            }
            "values" => {
                if self.data.is_some() {
                    return Err(self.unexpected(key));
                }
                let kind = self.require_kind::<A::Error>("values")?;
                let data = map.next_value_seed(ValuesSeed {
                    ctx: self.ctx,
                    kind,
                    expected: self.length,
                })?;
                self.data = Some(data);
            }
            "categories" if self.mode == VectorMode::Vector => {
                if self.categories.is_some() {
                    return Err(self.unexpected(key));
                }
                let kind = self.require_kind::<A::Error>("categories")?;
                if !is_code_kind(kind) {
                    return Err(self.fail(VecframeError::UnsupportedCategoryKind(kind.tag())));
                }
                let pairs = map.next_value_seed(LabelMapSeed {
                    ctx: self.ctx,
                    kind: kind.element(),
                    tag: kind.tag(),
                })?;
                let categories = Categories::from_pairs(pairs).map_err(|e| self.fail::<A::Error>(e))?;
                self.categories = Some(categories);
            }
            _ => return Err(self.unexpected(key)),
        }
        Ok(())
    }

    fn require_kind<E: de::Error>(&self, field: &'static str) -> Result<DataKind, E> {
        self.kind.ok_or_else(|| {
            self.fail(VecframeError::MissingDataType {
                field,
                context: self.context(),
            })
        })
    }

    fn take_data(&mut self) -> Result<VectorData, VecframeError> {
        self.data.take().ok_or(VecframeError::MissingValues {
            context: self.context(),
        })
    }

    pub(crate) fn into_vector(mut self) -> Result<Vector, VecframeError> {
        let data = self.take_data()?;
        Ok(Vector::from_parts(data, self.categories.take().unwrap_or_default()))
    }

    pub(crate) fn into_category_set(mut self) -> Result<CategorySet, VecframeError> {
        CategorySet::new(self.take_data()?)
    }
}

/// Category codes are required binary integers.
fn is_code_kind(kind: DataKind) -> bool {
    kind.element().is_binary_integer() && !kind.is_nullable()
}

/// Validates a `length` header against the configured ceiling. Runs before
/// any element storage exists.
pub(crate) fn parse_length(ctx: &DecodeContext, token: Token) -> Result<usize, VecframeError> {
    let max = ctx.config().max_serialized_length;
    let length = match token {
        Token::Literal(raw) => {
            let text = raw.get();
            if text.starts_with('-') {
                return Err(VecframeError::InvalidLength(format!("{} is negative", text)));
            }
            match text.parse::<u64>() {
                Ok(n) => n,
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
                Err(_) => return Err(VecframeError::InvalidLength(format!("{} is not an integer", text))),
            }
        }
        other => {
            return Err(VecframeError::InvalidLength(format!(
                "expected a non-negative integer, found {}",
                other.describe()
            )))
        }
    };
    if length > max as u64 {
        return Err(VecframeError::LengthTooLarge { length, max });
    }
    Ok(length as usize)
}

struct VectorVisitor<'c> {
    ctx: &'c DecodeContext,
    mode: VectorMode,
}

impl<'de, 'c> Visitor<'de> for VectorVisitor<'c> {
    type Value = VectorFields<'c>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mode {
            VectorMode::Vector => f.write_str("a vector object"),
            VectorMode::CategorySet => f.write_str("a category set object"),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut fields = VectorFields::new(self.ctx, self.mode);
        while let Some(key) = map.next_key::<String>()? {
            fields.accept(&key, &mut map)?;
        }
        Ok(fields)
    }
}

//==================================================================================
// II. Value Arrays
//==================================================================================

/// Reads a `values` array of one kind into an element buffer.
struct ArraySeed<'c, T> {
    ctx: &'c DecodeContext,
    tag: &'static str,
    expected: Option<usize>,
    _cell: PhantomData<T>,
}

impl<'c, T: Cell> ArraySeed<'c, T> {
    fn new(ctx: &'c DecodeContext, tag: &'static str, expected: Option<usize>) -> Self {
        Self {
            ctx,
            tag,
            expected,
            _cell: PhantomData,
        }
    }
}

impl<'de, T: Cell> DeserializeSeed<'de> for ArraySeed<'_, T> {
    type Value = Vec<T>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Vec<T>, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, T: Cell> Visitor<'de> for ArraySeed<'_, T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an array of '{}' values", self.tag)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
        let config = self.ctx.config();
        let mut buffer = match ElementBuffer::<T>::acquire_with(self.expected, config.pooled_initial_capacity) {
            Ok(buffer) => buffer,
            Err(e) => return Err(self.ctx.fail(e)),
        };

        let mut index = 0;
        while let Some(cell) = seq.next_element_seed(CellSeed::<T>::new(self.ctx, self.tag, index))? {
            if self.expected.is_none() && index == config.max_serialized_length {
                return Err(self.ctx.fail(VecframeError::LengthTooLarge {
                    length: index as u64 + 1,
                    max: config.max_serialized_length,
                }));
            }
            if let Err(err) = buffer.append(cell) {
                let declared = match (self.expected, err) {
                    (Some(declared), VecframeError::CapacityExceeded { .. }) => declared,
                    (_, err) => return Err(self.ctx.fail(err)),
                };
                // Count the rest without storing it, to report the real length.
                let mut actual = index + 1;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    actual += 1;
                }
                return Err(self.ctx.fail(VecframeError::LengthMismatch { declared, actual }));
            }
            index += 1;
        }

        if let Some(declared) = self.expected {
            if declared != index {
                return Err(self.ctx.fail(VecframeError::LengthMismatch {
                    declared,
                    actual: index,
                }));
            }
        }
        trace!("decoded {} '{}' values (pooled: {})", index, self.tag, buffer.is_pooled());
        Ok(buffer.finalize())
    }
}

/// Dispatches a `values` array to the reader for its kind.
struct ValuesSeed<'c> {
    ctx: &'c DecodeContext,
    kind: DataKind,
    expected: Option<usize>,
}

macro_rules! values_dispatch {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        impl<'de> DeserializeSeed<'de> for ValuesSeed<'_> {
            type Value = VectorData;

            fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<VectorData, D::Error> {
                let tag = self.kind.tag();
                match (self.kind.element(), self.kind.is_nullable()) {
                    $(
                        (ElementKind::$variant, false) => ArraySeed::<$ty>::new(self.ctx, tag, self.expected)
                            .deserialize(deserializer)
                            .map(|cells| VectorData::$variant(Values::Dense(cells))),
                        (ElementKind::$variant, true) => ArraySeed::<Option<$ty>>::new(self.ctx, tag, self.expected)
                            .deserialize(deserializer)
                            .map(|cells| VectorData::$variant(Values::Nullable(cells))),
                    )+
                }
            }
        }

        fn write_values<M: SerializeMap>(map: &mut M, data: &VectorData, ctx: &EncodeContext) -> Result<(), M::Error> {
            let tag = data.kind().tag();
            match data {
                $(
                    VectorData::$variant(Values::Dense(cells)) => map.serialize_entry(
                        "values",
                        &CellsOut { cells: cells.as_slice(), tag, ctx },
                    ),
                    VectorData::$variant(Values::Nullable(cells)) => map.serialize_entry(
                        "values",
                        &CellsOut { cells: cells.as_slice(), tag, ctx },
                    ),
                )+
            }
        }
    };
}

element_kinds!(values_dispatch);

//==================================================================================
// III. Codable Impls
//==================================================================================

/// Writes the shared vector shape. `categories` is omitted when empty.
fn write_vector<S: Serializer>(
    serializer: S,
    data: &VectorData,
    categories: Option<&Categories>,
    ctx: &EncodeContext,
) -> Result<S::Ok, S::Error> {
    let length = data.len();
    let max = ctx.config().max_serialized_length;
    if length > max {
        return Err(ctx.fail(VecframeError::LengthTooLarge {
            length: length as u64,
            max,
        }));
    }

    let kind = data.kind();
    let categories = categories.filter(|c| !c.is_empty());
    let mut map = serializer.serialize_map(Some(3 + usize::from(categories.is_some())))?;
    map.serialize_entry("dtype", kind.tag())?;
    map.serialize_entry("length", &length)?;
    write_values(&mut map, data, ctx)?;
    if let Some(categories) = categories {
        map.serialize_entry(
            "categories",
            &LabelMapOut {
                pairs: categories.iter().collect(),
                tag: kind.tag(),
                ctx,
            },
        )?;
    }
    map.end()
}

impl Codable for Vector {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = deserializer.deserialize_map(VectorVisitor {
            ctx,
            mode: VectorMode::Vector,
        })?;
        fields.into_vector().map_err(|e| ctx.fail(e))
    }

    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        write_vector(serializer, self.data(), Some(self.categories()), ctx)
    }
}

impl Codable for CategorySet {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = deserializer.deserialize_map(VectorVisitor {
            ctx,
            mode: VectorMode::CategorySet,
        })?;
        fields.into_category_set().map_err(|e| ctx.fail(e))
    }

    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        write_vector(serializer, self.values(), None, ctx)
    }
}
