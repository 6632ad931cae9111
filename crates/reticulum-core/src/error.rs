//! Error types for the reticulum-core crate.

/// Failure to decode a structured app-data payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("malformed msgpack: {0}")]
    Malformed(String),
}
