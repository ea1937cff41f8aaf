// In: src/model/series.rs

use super::categories::CategorySet;
use super::vector::Vector;
use crate::error::VecframeError;
use crate::types::{Annotations, DataKind, Variant};

/// A vector of values plus optional name, annotations and category set.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: Option<String>,
    annotations: Annotations,
    categories: Option<CategorySet>,
    values: Vector,
}

impl Series {
    pub fn new(values: impl Into<Vector>) -> Self {
        Self {
            name: None,
            annotations: Annotations::new(),
            categories: None,
            values: values.into(),
        }
    }

    /// A categorical series. The set must be of the value kind and every
    /// present code must be a member.
    pub fn categorical(values: impl Into<Vector>, categories: CategorySet) -> Result<Self, VecframeError> {
        let values = values.into();
        check_codes(&values, &categories)?;
        Ok(Self {
            categories: Some(categories),
            ..Self::new(values)
        })
    }

    pub(crate) fn from_parts(
        name: Option<String>,
        annotations: Annotations,
        categories: Option<CategorySet>,
        values: Vector,
    ) -> Self {
        Self {
            name,
            annotations,
            categories,
            values,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn annotation(&self, key: &str) -> Option<&Variant> {
        self.annotations.get(key)
    }

    pub fn category_set(&self) -> Option<&CategorySet> {
        self.categories.as_ref()
    }

    pub fn values(&self) -> &Vector {
        &self.values
    }

    pub fn into_values(self) -> Vector {
        self.values
    }

    pub fn kind(&self) -> DataKind {
        self.values.kind()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vector> for Series {
    fn from(values: Vector) -> Self {
        Series::new(values)
    }
}

/// Checks a vector of codes against a category set. Missing elements of a
/// not-available kind are never checked.
pub(crate) fn check_codes(values: &Vector, categories: &CategorySet) -> Result<(), VecframeError> {
    let kind = values.kind();
    if kind.element() != categories.kind() {
        return Err(VecframeError::CategoryKindMismatch {
            categories: categories.data_kind().tag(),
            data: kind.tag(),
        });
    }
    for (index, code) in values.data().iter().enumerate() {
        if !code.is_na() && !categories.contains(&code) {
            return Err(VecframeError::UnknownCategory {
                index,
                code: code.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let series = Series::new(Vector::new(vec![1.5f64, 2.5]))
            .with_name("weight")
            .with_annotation("unit", "kg")
            .with_annotation("precision", 1i64);
        assert_eq!(series.name(), Some("weight"));
        assert_eq!(series.annotation("unit"), Some(&Variant::from("kg")));
        assert_eq!(series.len(), 2);
        assert!(series.category_set().is_none());
    }

    #[test]
    fn test_categorical_series_checks_codes() {
        let set = CategorySet::new(vec![1u8, 2]).unwrap();
        let ok = Series::categorical(Vector::new(vec![Some(1u8), None, Some(2)]), set.clone());
        assert!(ok.is_ok());

        let unknown = Series::categorical(Vector::new(vec![1u8, 3]), set.clone());
        assert!(matches!(
            unknown,
            Err(VecframeError::UnknownCategory { index: 1, code }) if code == "3"
        ));

        let mismatch = Series::categorical(Vector::new(vec![1i32]), set);
        assert!(matches!(
            mismatch,
            Err(VecframeError::CategoryKindMismatch { categories: "u8", data: "i32" })
        ));
    }
}
