//! This file is the root of the `vecframe` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`types`, `model`,
//!     `codec`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface, so callers can write
//!     `vecframe::decode::<DataSet>(json)` without knowing the module layout.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate
#[macro_use]
pub mod types; // `element_kinds!` must be in scope before `model` and `codec`

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod traits;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use codec::{decode, encode, Codec};
pub use config::CodecConfig;
pub use error::VecframeError;
pub use model::{
    Annotations, Categories, CategorySet, DataFrame, DataSet, Series, ValueLabel, ValueLabels, Values, Vector,
    VectorData,
};
pub use observability::enable_verbose_logging;
pub use traits::Codable;
pub use types::{DataKind, DateTime64, Decimal, ElementKind, Scalar, Variant};
