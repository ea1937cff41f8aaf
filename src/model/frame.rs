// In: src/model/frame.rs

use super::series::Series;

/// An ordered sequence of columns. Column order is significant; names are
/// optional and need not be unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    name: Option<String>,
    columns: Vec<Series>,
}

impl DataFrame {
    pub fn new(columns: Vec<Series>) -> Self {
        Self { name: None, columns }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn from_parts(name: Option<String>, columns: Vec<Series>) -> Self {
        Self { name, columns }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// The first column with the given name.
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name() == Some(name))
    }

    pub fn column_names(&self) -> Vec<Option<&str>> {
        self.columns.iter().map(Series::name).collect()
    }

    /// The length of the longest column. Columns are not required to agree.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Series::len).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An ordered sequence of data frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    name: Option<String>,
    frames: Vec<DataFrame>,
}

impl DataSet {
    pub fn new(frames: Vec<DataFrame>) -> Self {
        Self { name: None, frames }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn from_parts(name: Option<String>, frames: Vec<DataFrame>) -> Self {
        Self { name, frames }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn frames(&self) -> &[DataFrame] {
        &self.frames
    }

    pub fn frame(&self, name: &str) -> Option<&DataFrame> {
        self.frames.iter().find(|f| f.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vector;

    #[test]
    fn test_frame_lookup_and_rows() {
        let frame = DataFrame::new(vec![
            Series::new(Vector::new(vec![1i64, 2, 3])).with_name("id"),
            Series::new(Vector::new(vec![true])),
        ])
        .with_name("people");

        assert_eq!(frame.column_names(), vec![Some("id"), None]);
        assert_eq!(frame.column("id").map(Series::len), Some(3));
        assert!(frame.column("missing").is_none());
        assert_eq!(frame.row_count(), 3);

        let set = DataSet::new(vec![frame]).with_name("survey");
        assert_eq!(set.frame("people").map(DataFrame::len), Some(2));
        assert_eq!(set.name(), Some("survey"));
        assert_eq!(DataFrame::default().row_count(), 0);
    }
}
