//! The in-memory data model: vectors, series, data frames, data sets and the
//! label tables that go with them.
//!
//! Everything here is immutable once built. Values are created either by
//! decoding (see `codec`) or through the constructors, which enforce the same
//! invariants the decoder does.

pub mod categories;
pub mod frame;
pub mod series;
pub mod vector;

pub use crate::types::Annotations;
pub use categories::{Categories, CategorySet, ValueLabel, ValueLabels};
pub use frame::{DataFrame, DataSet};
pub use series::Series;
pub use vector::{Values, Vector, VectorData};
