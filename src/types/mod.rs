//! This module defines the core, strongly-typed value representations used
//! throughout vecframe.
//!
//! It includes the canonical `DataKind` registry which maps the short wire tags
//! (`"i32"`, `"na_string"`, ...) to a closed set of element kinds, plus the
//! scalar types the codec moves in and out of typed arrays.

/// Invokes `$callback!` with every element kind as `Variant => RustType`.
///
/// All per-kind dispatch in the crate (the vector enum, the codec readers and
/// writers, scalar conversions) is generated from this one list, so adding a
/// kind here forces every exhaustive `match` to be updated.
macro_rules! element_kinds {
    ($callback:ident) => {
        $callback! {
            Int8 => i8,
            UInt8 => u8,
            Int16 => i16,
            UInt16 => u16,
            Int32 => i32,
            UInt32 => u32,
            Int64 => i64,
            UInt64 => u64,
            Int128 => i128,
            UInt128 => u128,
            Float32 => f32,
            Float64 => f64,
            Decimal => $crate::types::Decimal,
            DateTime64 => $crate::types::DateTime64,
            DateTime => chrono::NaiveDateTime,
            DateTimeOffset => chrono::DateTime<chrono::FixedOffset>,
            Uuid => uuid::Uuid,
            Bool => bool,
            Char => char,
            String => String,
        }
    };
}

pub mod data_kind;
pub mod decimal;
pub mod scalar;
pub mod variant;

// Re-export the main type(s) for easier access.
pub use data_kind::{DataKind, ElementKind};
pub use decimal::{Decimal, DecimalParseError, MAX_DECIMAL_SCALE};
pub use scalar::{DateTime64, Scalar};
pub use variant::{Annotations, Variant};
