// In: src/config.rs

//! The single source of truth for codec configuration.
//!
//! `CodecConfig` is created once at the application boundary (e.g., from a JSON
//! settings file) and then handed to a `Codec`, which shares it read-only with
//! every nested decode/encode step.

use serde::{Deserialize, Serialize};

/// Upper bound on any serialized length header: the largest array length the
/// format has ever promised to consumers.
pub const MAX_SERIALIZED_LENGTH: usize = 0x7FFF_FFC7;

/// Default starting capacity of a buffer rented for an array of unknown length.
pub const DEFAULT_POOLED_CAPACITY: usize = 1024;

/// The unified configuration for every decode and encode call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Declared or actual lengths above this fail with `LengthTooLarge`, before
    /// any element buffer is allocated.
    #[serde(default = "default_max_serialized_length")]
    pub max_serialized_length: usize,

    /// Initial capacity of pooled buffers used when a `length` header is absent.
    #[serde(default = "default_pooled_initial_capacity")]
    pub pooled_initial_capacity: usize,

    /// If true, Series codes are checked against their category set.
    #[serde(default = "default_true")]
    pub validate_category_codes: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_serialized_length: default_max_serialized_length(),
            pooled_initial_capacity: default_pooled_initial_capacity(),
            validate_category_codes: true,
        }
    }
}

impl CodecConfig {
    /// Returns a config with a different length ceiling.
    pub fn with_max_serialized_length(mut self, max: usize) -> Self {
        self.max_serialized_length = max;
        self
    }
}

fn default_max_serialized_length() -> usize {
    MAX_SERIALIZED_LENGTH
}

fn default_pooled_initial_capacity() -> usize {
    DEFAULT_POOLED_CAPACITY
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.max_serialized_length, MAX_SERIALIZED_LENGTH);
        assert!(config.validate_category_codes);
    }

    #[test]
    fn test_partial_settings_override() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"max_serialized_length": 16, "validate_category_codes": false}"#)
                .unwrap();
        assert_eq!(config.max_serialized_length, 16);
        assert_eq!(config.pooled_initial_capacity, DEFAULT_POOLED_CAPACITY);
        assert!(!config.validate_category_codes);
    }
}
