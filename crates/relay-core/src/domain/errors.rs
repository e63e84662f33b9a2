//! # Domain Errors
//!
//! Error types for the pure verification logic. Port-level errors
//! (secret store, sink) live with their traits in `ports::outbound`.

use thiserror::Error;

/// Errors that can occur while parsing the signature header.
///
/// All variants map to the same externally visible rejection; the detail
/// exists for logs and tests only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderParseError {
    /// No `t` field was present
    #[error("missing timestamp field")]
    MissingTimestamp,

    /// The `t` field was present but not an integer
    #[error("non-numeric timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// No `v1` signature entries were present
    #[error("no v1 signature entries")]
    MissingSignature,
}
