// In: src/model/categories.rs

//! Label tables: the label mapping of a categorical vector, the category set
//! of a series, and the value/label table.
//!
//! Categories and category sets only ever hold binary-integer codes. Value
//! labels accept a wider range of kinds but share the same wire shape.

use crate::error::VecframeError;
use crate::model::VectorData;
use crate::types::{DataKind, ElementKind, Scalar};
use hashbrown::HashSet;

//==================================================================================
// I. Categories (label -> code on a categorical vector)
//==================================================================================

/// An ordered label to code mapping. Labels are unique; several labels may
/// share one code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Categories {
    entries: Vec<(String, Scalar)>,
}

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping, rejecting duplicate labels and non-integer codes.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Scalar)>) -> Result<Self, VecframeError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (label, code) in pairs {
            match code.kind() {
                Some(kind) if kind.is_binary_integer() => {}
                Some(kind) => return Err(VecframeError::UnsupportedCategoryKind(kind.tag())),
                None => return Err(VecframeError::UnsupportedCategoryKind("na")),
            }
            if !seen.insert(label.clone()) {
                return Err(VecframeError::DuplicateLabel(label));
            }
            entries.push((label, code));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(label, code)| (label.as_str(), code))
    }

    pub fn code_of(&self, label: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, code)| code)
    }

    /// The first label mapped to `code`.
    pub fn label_of(&self, code: &Scalar) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| c == code)
            .map(|(label, _)| label.as_str())
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.entries.iter().filter_map(|(_, code)| code.kind())
    }
}

//==================================================================================
// II. Category Set (the allowed codes of a categorical series)
//==================================================================================

#[derive(Debug, Clone)]
pub struct CategorySet {
    values: VectorData,
    members: HashSet<u128>,
}

impl CategorySet {
    /// Values must be a required binary-integer kind, without duplicates.
    pub fn new(values: impl Into<VectorData>) -> Result<Self, VecframeError> {
        let values = values.into();
        let kind = values.kind();
        if !kind.element().is_binary_integer() || kind.is_nullable() {
            return Err(VecframeError::UnsupportedCategoryKind(kind.tag()));
        }

        let mut members = HashSet::with_capacity(values.len());
        for value in values.iter() {
            // Every element of a required binary-integer kind has integer bits.
            if let Some(bits) = value.integer_bits() {
                if !members.insert(bits) {
                    return Err(VecframeError::DuplicateLabel(value.to_string()));
                }
            }
        }
        Ok(Self { values, members })
    }

    pub fn kind(&self) -> ElementKind {
        self.values.kind().element()
    }

    pub fn data_kind(&self) -> DataKind {
        self.values.kind()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &VectorData {
        &self.values
    }

    /// Membership is exact: the code must be of the set's kind.
    pub fn contains(&self, code: &Scalar) -> bool {
        code.kind() == Some(self.kind())
            && code.integer_bits().is_some_and(|bits| self.members.contains(&bits))
    }

    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        self.values.iter()
    }
}

impl PartialEq for CategorySet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

//==================================================================================
// III. Value/Label Table
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValueLabel {
    pub value: Scalar,
    pub label: String,
}

/// An ordered table of `(value, label)` pairs of one value kind. Duplicate
/// labels are kept; lookups return the first match.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueLabels {
    kind: ElementKind,
    entries: Vec<ValueLabel>,
}

impl ValueLabels {
    /// Whether `kind` can be the value kind of a table.
    pub fn supports(kind: DataKind) -> bool {
        !kind.is_nullable()
            && (kind.element().is_numeric()
                || matches!(
                    kind.element(),
                    ElementKind::String
                        | ElementKind::Bool
                        | ElementKind::Uuid
                        | ElementKind::DateTime
                        | ElementKind::DateTimeOffset
                ))
    }

    pub fn new(kind: ElementKind) -> Result<Self, VecframeError> {
        Self::from_entries(kind, Vec::new())
    }

    pub fn from_entries(
        kind: ElementKind,
        entries: impl IntoIterator<Item = ValueLabel>,
    ) -> Result<Self, VecframeError> {
        if !Self::supports(DataKind::required(kind)) {
            return Err(VecframeError::UnsupportedLabelKind(DataKind::required(kind).tag()));
        }
        let entries: Vec<ValueLabel> = entries.into_iter().collect();
        for (index, entry) in entries.iter().enumerate() {
            if entry.value.kind() != Some(kind) {
                return Err(VecframeError::KindMismatch {
                    expected: kind.tag(),
                    found: entry.value.kind().map_or("na", |k| k.tag()),
                });
            }
            if entry.label.is_empty() {
                return Err(VecframeError::MalformedElement {
                    tag: kind.tag(),
                    index,
                    reason: "labels must not be empty".to_string(),
                });
            }
        }
        Ok(Self { kind, entries })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ValueLabel] {
        &self.entries
    }

    pub fn label_of(&self, value: &Scalar) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| &e.value == value)
            .map(|e| e.label.as_str())
    }

    pub fn value_of(&self, label: &str) -> Option<&Scalar> {
        self.entries.iter().find(|e| e.label == label).map(|e| &e.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_reject_duplicates_and_floats() {
        let dup = Categories::from_pairs(vec![
            ("a".to_string(), Scalar::Int32(1)),
            ("a".to_string(), Scalar::Int32(2)),
        ]);
        assert!(matches!(dup, Err(VecframeError::DuplicateLabel(l)) if l == "a"));

        let float = Categories::from_pairs(vec![("a".to_string(), Scalar::Float64(1.0))]);
        assert!(matches!(float, Err(VecframeError::UnsupportedCategoryKind("f64"))));
    }

    #[test]
    fn test_categories_lookup_both_ways() {
        let cats = Categories::from_pairs(vec![
            ("no".to_string(), Scalar::Int8(0)),
            ("yes".to_string(), Scalar::Int8(1)),
            ("y".to_string(), Scalar::Int8(1)),
        ])
        .unwrap();
        assert_eq!(cats.code_of("y"), Some(&Scalar::Int8(1)));
        assert_eq!(cats.label_of(&Scalar::Int8(1)), Some("yes"));
        assert_eq!(cats.label_of(&Scalar::Int16(1)), None);
    }

    #[test]
    fn test_category_set_membership() {
        let set = CategorySet::new(vec![1i16, 2, 3]).unwrap();
        assert!(set.contains(&Scalar::Int16(2)));
        assert!(!set.contains(&Scalar::Int16(4)));
        assert!(!set.contains(&Scalar::Int32(2)));
        assert_eq!(set.kind(), ElementKind::Int16);

        assert!(matches!(
            CategorySet::new(vec![1i16, 1]),
            Err(VecframeError::DuplicateLabel(v)) if v == "1"
        ));
        assert!(matches!(
            CategorySet::new(vec!["a".to_string()]),
            Err(VecframeError::UnsupportedCategoryKind("string"))
        ));
        assert!(matches!(
            CategorySet::new(vec![Some(1u8)]),
            Err(VecframeError::UnsupportedCategoryKind("na_u8"))
        ));
    }

    #[test]
    fn test_value_labels_kinds() {
        assert!(ValueLabels::new(ElementKind::Uuid).is_ok());
        assert!(ValueLabels::new(ElementKind::DateTime64).is_ok());
        assert!(matches!(
            ValueLabels::new(ElementKind::Char),
            Err(VecframeError::UnsupportedLabelKind("char"))
        ));

        let table = ValueLabels::from_entries(
            ElementKind::Bool,
            vec![
                ValueLabel { value: Scalar::Bool(true), label: "Yes".into() },
                ValueLabel { value: Scalar::Bool(false), label: "No".into() },
            ],
        )
        .unwrap();
        assert_eq!(table.label_of(&Scalar::Bool(false)), Some("No"));
        assert_eq!(table.value_of("Yes"), Some(&Scalar::Bool(true)));

        let mismatch = ValueLabels::from_entries(
            ElementKind::Int32,
            vec![ValueLabel { value: Scalar::Int64(1), label: "x".into() }],
        );
        assert!(matches!(mismatch, Err(VecframeError::KindMismatch { .. })));
    }
}
