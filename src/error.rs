// In: src/error.rs

//! This module defines the single, unified error type for the entire vecframe library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant is raised at the point of detection and aborts the enclosing
//! decode/encode call. Nested decodes propagate child errors unchanged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VecframeError {
    // =========================================================================
    // === Structural Errors (token stream shape, field presence and order)
    // =========================================================================
    #[error("Malformed structure: expected {expected}")]
    MalformedStructure { expected: String },

    #[error("Unexpected field '{field}' in {context}")]
    UnexpectedField { field: String, context: &'static str },

    #[error("Field '{field}' appeared before 'dtype' in {context}")]
    MissingDataType { field: &'static str, context: &'static str },

    #[error("Missing values in {context}")]
    MissingValues { context: &'static str },

    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: &'static str, context: &'static str },

    #[error("Field '{field}' must precede '{before}'")]
    MisorderedField { field: &'static str, before: &'static str },

    #[error("Unknown data type tag: '{0}'")]
    UnknownTag(String),

    // =========================================================================
    // === Length Header Errors
    // =========================================================================
    #[error("Invalid length: {0}")]
    InvalidLength(String),

    #[error("Length {length} exceeds the maximum serialized length of {max}")]
    LengthTooLarge { length: u64, max: usize },

    #[error("Length mismatch: declared {declared}, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    // =========================================================================
    // === Element Errors
    // =========================================================================
    #[error("Numeric overflow at index {index}: {literal} does not fit in '{tag}'")]
    NumericOverflow {
        tag: &'static str,
        index: usize,
        literal: String,
    },

    #[error("Malformed element at index {index} for '{tag}': {reason}")]
    MalformedElement {
        tag: &'static str,
        index: usize,
        reason: String,
    },

    #[error("Element buffer capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("Kind mismatch: expected '{expected}', found '{found}'")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // =========================================================================
    // === Category / Label Errors
    // =========================================================================
    #[error("Unsupported category kind '{0}': only binary integer kinds are allowed")]
    UnsupportedCategoryKind(&'static str),

    #[error("Unsupported value label kind '{0}'")]
    UnsupportedLabelKind(&'static str),

    #[error("Category set kind '{categories}' does not match data kind '{data}'")]
    CategoryKindMismatch {
        categories: &'static str,
        data: &'static str,
    },

    #[error("Code {code} at index {index} is not a member of the category set")]
    UnknownCategory { index: usize, code: String },

    #[error("Duplicate label or category: '{0}'")]
    DuplicateLabel(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// A syntax or I/O failure of the underlying token stream.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VecframeError {
    pub(crate) fn malformed(expected: impl Into<String>) -> Self {
        VecframeError::MalformedStructure {
            expected: expected.into(),
        }
    }
}
