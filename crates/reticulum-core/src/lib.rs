//! Core types and app-data decoding for the Reticulum announce pipeline.
//!
//! This crate defines the addressing newtypes shared with the transport layer
//! and the structured [`Value`] tree that untrusted announce app_data is
//! decoded into.

pub mod error;
pub mod types;
pub mod value;

pub use error::DecodeError;
pub use types::{DestinationHash, InvalidLength, TRUNCATED_HASH_LEN};
pub use value::{MAX_DEPTH, Value, unpack};
