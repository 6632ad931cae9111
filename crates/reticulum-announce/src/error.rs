//! Error types for announce ingestion.
//!
//! Only [`AnnounceError`] ever reaches a caller, and only from configuration
//! and startup paths. [`CapabilityError`] and [`NotifyError`] describe
//! failures that are absorbed inside `received_announce`.

use reticulum_core::DecodeError;

/// Errors from configuring or wiring the announce subsystem.
#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown announce aspect: {0}")]
    UnknownAspect(String),
}

/// Why peering costs could not be recovered from propagation app_data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("decoder panicked")]
    DecoderPanicked,
    #[error("{0} is not an array")]
    NotAnArray(&'static str),
    #[error("{what} has no slot {index} (len {len})")]
    MissingSlot {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{0} is not an integer")]
    NotAnInteger(&'static str),
}

/// Failure reported by the outer notification callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel full")]
    ChannelFull,
    #[error("notification channel closed")]
    ChannelClosed,
    #[error("notification rejected: {0}")]
    Rejected(String),
}
