// In: src/model/vector.rs

//! The homogeneous typed array and its per-kind storage.

use super::categories::Categories;
use crate::error::VecframeError;
use crate::types::{DataKind, ElementKind, Scalar};

/// Storage for one element kind: dense for required kinds, `Option` slots for
/// not-available kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Values<T> {
    Dense(Vec<T>),
    Nullable(Vec<Option<T>>),
}

impl<T> Values<T> {
    pub fn len(&self) -> usize {
        match self {
            Values::Dense(v) => v.len(),
            Values::Nullable(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Values::Nullable(_))
    }

    /// `None` when out of bounds; `Some(None)` for a missing element.
    pub fn get(&self, index: usize) -> Option<Option<&T>> {
        match self {
            Values::Dense(v) => v.get(index).map(Some),
            Values::Nullable(v) => v.get(index).map(Option::as_ref),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Option<&T>> + '_> {
        match self {
            Values::Dense(v) => Box::new(v.iter().map(Some)),
            Values::Nullable(v) => Box::new(v.iter().map(Option::as_ref)),
        }
    }

    pub fn as_dense(&self) -> Option<&[T]> {
        match self {
            Values::Dense(v) => Some(v),
            Values::Nullable(_) => None,
        }
    }

    pub fn as_nullable(&self) -> Option<&[Option<T>]> {
        match self {
            Values::Dense(_) => None,
            Values::Nullable(v) => Some(v),
        }
    }
}

macro_rules! define_vector_data {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// A typed array of any supported kind. Callers pattern-match to
        /// recover the concrete element type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum VectorData {
            $($variant(Values<$ty>),)+
        }

        impl VectorData {
            pub fn kind(&self) -> DataKind {
                match self {
                    $(VectorData::$variant(v) => DataKind::new(ElementKind::$variant, v.is_nullable()),)+
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(VectorData::$variant(v) => v.len(),)+
                }
            }

            /// The element at `index` as a `Scalar`; `Scalar::Na` for a missing element.
            pub fn get(&self, index: usize) -> Option<Scalar> {
                match self {
                    $(VectorData::$variant(v) => v
                        .get(index)
                        .map(|cell| cell.map_or(Scalar::Na, |x| Scalar::$variant(x.clone()))),)+
                }
            }

            /// An empty array of the given kind.
            pub fn empty(kind: DataKind) -> Self {
                match (kind.element(), kind.is_nullable()) {
                    $(
                        (ElementKind::$variant, false) => VectorData::$variant(Values::Dense(Vec::new())),
                        (ElementKind::$variant, true) => VectorData::$variant(Values::Nullable(Vec::new())),
                    )+
                }
            }
        }

        $(
            impl From<Vec<$ty>> for VectorData {
                fn from(values: Vec<$ty>) -> Self {
                    VectorData::$variant(Values::Dense(values))
                }
            }

            impl From<Vec<Option<$ty>>> for VectorData {
                fn from(values: Vec<Option<$ty>>) -> Self {
                    VectorData::$variant(Values::Nullable(values))
                }
            }
        )+
    };
}

element_kinds!(define_vector_data);

impl VectorData {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// An immutable homogeneous array, optionally carrying a label mapping for
/// its integer codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    data: VectorData,
    categories: Categories,
}

impl Vector {
    pub fn new(data: impl Into<VectorData>) -> Self {
        Self {
            data: data.into(),
            categories: Categories::default(),
        }
    }

    /// A categorical vector. The codes must be a required binary-integer kind
    /// and every category code must be of that same kind.
    pub fn categorical(data: impl Into<VectorData>, categories: Categories) -> Result<Self, VecframeError> {
        let data = data.into();
        let kind = data.kind();
        if !kind.element().is_binary_integer() || kind.is_nullable() {
            return Err(VecframeError::UnsupportedCategoryKind(kind.tag()));
        }
        if let Some(found) = categories.kinds().find(|k| *k != kind.element()) {
            return Err(VecframeError::KindMismatch {
                expected: kind.tag(),
                found: found.tag(),
            });
        }
        Ok(Self { data, categories })
    }

    /// Assembles a decoded vector whose categories were already validated.
    pub(crate) fn from_parts(data: VectorData, categories: Categories) -> Self {
        Self { data, categories }
    }

    pub fn kind(&self) -> DataKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn into_data(self) -> VectorData {
        self.data
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn is_categorical(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Scalar> {
        self.data.get(index)
    }

    /// The category label of the code at `index`, if it has one.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        let code = self.data.get(index)?;
        self.categories.label_of(&code)
    }
}

impl From<VectorData> for Vector {
    fn from(data: VectorData) -> Self {
        Vector::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_storage() {
        let dense = Vector::new(vec![1i32, 2, 3]);
        assert_eq!(dense.kind().tag(), "i32");
        assert_eq!(dense.len(), 3);

        let nullable = Vector::new(vec![Some("a".to_string()), None]);
        assert_eq!(nullable.kind().tag(), "na_string");
        assert_eq!(nullable.get(1), Some(Scalar::Na));
        assert_eq!(nullable.get(2), None);
    }

    #[test]
    fn test_empty_of_every_kind() {
        for kind in DataKind::all() {
            let data = VectorData::empty(kind);
            assert_eq!(data.kind(), kind);
            assert!(data.is_empty());
        }
    }

    #[test]
    fn test_categorical_requires_integer_codes() {
        let categories = Categories::from_pairs(vec![("low".to_string(), Scalar::UInt8(0))]).unwrap();
        let v = Vector::categorical(vec![0u8, 0, 1], categories.clone()).unwrap();
        assert_eq!(v.label_of(0), Some("low"));
        assert_eq!(v.label_of(2), None);
        assert!(v.is_categorical());

        assert!(matches!(
            Vector::categorical(vec![1.0f64], Categories::default()),
            Err(VecframeError::UnsupportedCategoryKind("f64"))
        ));
        assert!(matches!(
            Vector::categorical(vec![0i32], categories),
            Err(VecframeError::KindMismatch { expected: "i32", found: "u8" })
        ));
    }

    #[test]
    fn test_values_accessors() {
        let values = Values::Nullable(vec![Some(1u16), None]);
        assert_eq!(values.get(0), Some(Some(&1)));
        assert_eq!(values.get(1), Some(None));
        assert!(values.as_dense().is_none());
        assert_eq!(values.iter().filter(Option::is_some).count(), 1);
    }
}
