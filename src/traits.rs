// In: src/traits.rs

//! This module defines the shared trait implemented by every wire structure.
//!
//! A `Codable` type knows how to read itself from a forward-only serde token
//! stream and how to write itself to a serde sink. Both directions receive the
//! per-call context, which carries the configuration and the slot that keeps
//! the first typed error alive across serde's stringly error boundary.

use crate::codec::{DecodeContext, EncodeContext};
use serde::{Deserializer, Serializer};

pub trait Codable: Sized {
    /// Reads one value. Errors are raised through `ctx.fail` so the caller can
    /// recover the typed `VecframeError`.
    fn decode_with<'de, D>(deserializer: D, ctx: &DecodeContext) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;

    /// Writes one value, mirroring `decode_with`.
    fn encode_with<S>(&self, serializer: S, ctx: &EncodeContext) -> Result<S::Ok, S::Error>
    where
        S: Serializer;
}
