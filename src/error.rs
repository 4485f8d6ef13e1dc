//! Error types for conversion operations.
//!
//! This module provides the [`ConvertError`] type for all conversion
//! operations and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all conversion operations.
///
/// Every failure is raised synchronously at the point of detection and is
/// attributable to a specific input item, identified by its batch index or
/// citation key.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A required part of a CSL item (citation key, entry type, or a
    /// structured field) is absent or has the wrong shape.
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord {
        /// Zero-based position of the offending item in the input batch.
        index: usize,
        /// Description of what was missing or malformed.
        reason: String,
    },

    /// Two items in the same batch share a citation key.
    #[error("Duplicate citation key '{key}' at indices {first} and {second}")]
    DuplicateKey {
        /// The colliding citation key.
        key: String,
        /// Index of the first occurrence.
        first: usize,
        /// Index of the second occurrence.
        second: usize,
    },

    /// An entry type outside the closed set reached the exporter.
    ///
    /// Unreachable through the parser, which maps unknown CSL types to
    /// `Misc`.
    #[error("Unsupported entry type: {name}")]
    UnsupportedEntryType {
        /// The offending entry type name.
        name: String,
    },

    /// Malformed BibTeX source text encountered by the reader.
    #[error("BibTeX syntax error: {0}")]
    Syntax(String),

    /// The input text was not well-formed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;
