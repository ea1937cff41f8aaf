// In: src/codec/frame.rs

//! Data frame and data set documents. Both are an optional name plus a
//! required ordered array of children.

use super::{DecodeContext, EncodeContext, ListOut, ListSeed};
use crate::error::VecframeError;
use crate::model::{DataFrame, DataSet, Series};
use crate::traits::Codable;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// The shape shared by frames and sets: `{"name"?: s, <children>: [...]}`.
trait Container: Sized {
    type Child: Codable;
    const CONTEXT: &'static str;
    const CHILDREN: &'static str;

    fn assemble(name: Option<String>, children: Vec<Self::Child>) -> Self;
    fn name(&self) -> Option<&str>;
    fn children(&self) -> &[Self::Child];
}

impl Container for DataFrame {
    type Child = Series;
    const CONTEXT: &'static str = "data frame";
    const CHILDREN: &'static str = "columns";

    fn assemble(name: Option<String>, children: Vec<Series>) -> Self {
        DataFrame::from_parts(name, children)
    }

    fn name(&self) -> Option<&str> {
        DataFrame::name(self)
    }

    fn children(&self) -> &[Series] {
        self.columns()
    }
}

impl Container for DataSet {
    type Child = DataFrame;
    const CONTEXT: &'static str = "data set";
    const CHILDREN: &'static str = "frames";

    fn assemble(name: Option<String>, children: Vec<DataFrame>) -> Self {
        DataSet::from_parts(name, children)
    }

    fn name(&self) -> Option<&str> {
        DataSet::name(self)
    }

    fn children(&self) -> &[DataFrame] {
        self.frames()
    }
}

struct ContainerVisitor<'c, T> {
    ctx: &'c DecodeContext,
    _container: PhantomData<T>,
}

impl<'de, T: Container> Visitor<'de> for ContainerVisitor<'_, T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a {} object", T::CONTEXT)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<T, A::Error> {
        let ctx = self.ctx;
        let mut name: Option<Option<String>> = None;
        let mut children: Option<Vec<T::Child>> = None;

        while let Some(key) = map.next_key::<String>()? {
            if key == "name" && name.is_none() {
                name = Some(map.next_value()?);
            } else if key == T::CHILDREN && children.is_none() {
                children = Some(map.next_value_seed(ListSeed::<T::Child>::new(ctx, T::CHILDREN))?);
            } else {
                return Err(ctx.fail(VecframeError::UnexpectedField {
                    field: key,
                    context: T::CONTEXT,
                }));
            }
        }

        let Some(children) = children else {
            return Err(ctx.fail(VecframeError::MissingField {
                field: T::CHILDREN,
                context: T::CONTEXT,
            }));
        };
        Ok(T::assemble(name.flatten(), children))
    }
}

fn decode_container<'de, T: Container, D: Deserializer<'de>>(
    deserializer: D,
    ctx: &DecodeContext,
) -> Result<T, D::Error> {
    deserializer.deserialize_map(ContainerVisitor {
        ctx,
        _container: PhantomData,
    })
}

fn encode_container<T: Container, S: Serializer>(
    value: &T,
    serializer: S,
    ctx: &EncodeContext,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1 + usize::from(value.name().is_some())))?;
    if let Some(name) = value.name() {
        map.serialize_entry("name", name)?;
    }
    map.serialize_entry(
        T::CHILDREN,
        &ListOut {
            items: value.children(),
            ctx,
        },
    )?;
    map.end()
}

impl Codable for DataFrame {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        decode_container(deserializer, ctx)
    }

    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        encode_container(self, serializer, ctx)
    }
}

impl Codable for DataSet {
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        decode_container(deserializer, ctx)
    }

    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        encode_container(self, serializer, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::model::Vector;

    #[test]
    fn test_frame_preserves_column_order() {
        let json = r#"{"name":"f","columns":[{"name":"b","data":{"dtype":"i8","length":1,"values":[1]}},{"name":"a","data":{"dtype":"i8","length":1,"values":[2]}}]}"#;
        let frame: DataFrame = decode(json).unwrap();
        assert_eq!(frame.column_names(), vec![Some("b"), Some("a")]);
        assert_eq!(encode(&frame).unwrap(), json);
    }

    #[test]
    fn test_frame_accepts_bare_vector_columns() {
        let frame: DataFrame =
            decode(r#"{"columns":[{"dtype":"f64","length":2,"values":[0.5,1.5]}]}"#).unwrap();
        assert_eq!(frame.name(), None);
        assert_eq!(frame.row_count(), 2);
        // Columns are always written back as series objects.
        assert_eq!(
            encode(&frame).unwrap(),
            r#"{"columns":[{"data":{"dtype":"f64","length":2,"values":[0.5,1.5]}}]}"#
        );
    }

    #[test]
    fn test_bare_vector_column_field_order() {
        assert!(matches!(
            decode::<DataFrame>(r#"{"columns":[{"values":[7,8],"dtype":"u16","length":2}]}"#),
            Err(VecframeError::MissingDataType { field: "values", context: "vector" })
        ));
        let frame: DataFrame = decode(r#"{"columns":[{"dtype":"u16","length":2,"values":[7,8]}]}"#).unwrap();
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_missing_children() {
        assert!(matches!(
            decode::<DataFrame>(r#"{"name":"f"}"#),
            Err(VecframeError::MissingField { field: "columns", context: "data frame" })
        ));
        assert!(matches!(
            decode::<DataSet>(r#"{"name":"s"}"#),
            Err(VecframeError::MissingField { field: "frames", context: "data set" })
        ));
        assert!(matches!(
            decode::<DataSet>(r#"{"frames":[],"columns":[]}"#),
            Err(VecframeError::UnexpectedField { .. })
        ));
    }

    #[test]
    fn test_child_errors_propagate_unchanged() {
        let json = r#"{"frames":[{"columns":[{"data":{"dtype":"i32","length":2,"values":[1,2,3]}}]}]}"#;
        assert!(matches!(
            decode::<DataSet>(json),
            Err(VecframeError::LengthMismatch { declared: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_empty_set() {
        let set = DataSet::new(vec![DataFrame::new(vec![Series::new(Vector::new(Vec::<u8>::new()))])]);
        let json = encode(&set).unwrap();
        assert_eq!(json, r#"{"frames":[{"columns":[{"data":{"dtype":"u8","length":0,"values":[]}}]}]}"#);
        assert_eq!(decode::<DataSet>(&json).unwrap(), set);
    }
}
