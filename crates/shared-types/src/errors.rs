//! Wire codec error types.

use thiserror::Error;

/// Errors from encoding or decoding channel frames and payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Serialization failed.
    #[error("Frame encoding failed: {0}")]
    Encode(String),

    /// A frame or payload could not be decoded.
    #[error("Frame decoding failed: {0}")]
    Decode(String),
}
