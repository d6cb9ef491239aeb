//! Error types for the filter codec.

use thiserror::Error;

use crate::filter::FilterKind;

/// A specialized Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or encoding a filter map.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not a valid filter document.
    #[error("invalid filter document: {0}")]
    Json(#[from] serde_json::Error),

    /// A filter carried a `FilterType` tag that names no variant.
    #[error("unknown filter type tag: {tag}")]
    UnknownKind {
        /// The tag that was read.
        tag: u64,
    },

    /// A filter was missing the member its variant requires.
    #[error("{kind} filter is missing its '{member}' member")]
    MissingPayload {
        /// The variant that was being decoded.
        kind: FilterKind,
        /// The wire name of the missing member.
        member: &'static str,
    },
}

impl CodecError {
    /// Creates a missing payload error.
    pub fn missing_payload(kind: FilterKind, member: &'static str) -> Self {
        CodecError::MissingPayload { kind, member }
    }

    /// Returns true if the input could not be read as a filter document at all.
    pub fn is_syntax(&self) -> bool {
        matches!(self, CodecError::Json(e) if e.is_syntax() || e.is_eof())
    }
}
