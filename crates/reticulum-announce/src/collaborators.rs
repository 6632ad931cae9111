//! Seams to the transport layer and the other services announce ingestion
//! consults.

use std::sync::Arc;

use reticulum_core::{DecodeError, DestinationHash, Value};

use crate::handler::AnnounceHandler;
use crate::lxmf_app_data::LxmfAppData;

/// The identity that signed an announce.
pub trait AnnouncedIdentity: Send + Sync {
    /// The identity's public key bytes.
    fn public_key(&self) -> Vec<u8>;
}

/// Answers "how many hops away is this destination".
pub trait HopEstimator: Send + Sync {
    /// Hop count to `destination`, or `None` when no path is known.
    fn hops_to(&self, destination: &DestinationHash) -> Option<u8>;
}

/// Decodes app_data into a structured value.
pub trait AppDataDecoder: Send + Sync {
    fn unpack(&self, data: &[u8]) -> Result<Value, DecodeError>;
}

/// Structural knowledge about propagation-node announce app_data.
pub trait CapabilityDescriptor: Send + Sync {
    /// Cheap validity check run before any richer decoding.
    fn pn_announce_data_is_valid(&self, app_data: &[u8]) -> bool;

    /// The advertised propagation stamp cost, if it can be read.
    fn pn_stamp_cost_from_app_data(&self, app_data: &[u8]) -> Option<u64>;
}

/// The transport-provided announce handler registration entry point.
pub trait AnnounceTransport {
    fn register_announce_handler(&self, handler: Arc<dyn AnnounceHandler>);
}

/// The msgpack decoder used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackDecoder;

impl AppDataDecoder for MsgpackDecoder {
    fn unpack(&self, data: &[u8]) -> Result<Value, DecodeError> {
        reticulum_core::unpack(data)
    }
}

/// The set of services every aspect handler consults.
#[derive(Clone)]
pub struct Collaborators {
    pub hops: Arc<dyn HopEstimator>,
    pub decoder: Arc<dyn AppDataDecoder>,
    pub descriptor: Arc<dyn CapabilityDescriptor>,
}

impl Collaborators {
    /// Production decoder and LXMF descriptor around the given hop estimator.
    pub fn new(hops: Arc<dyn HopEstimator>) -> Self {
        Self {
            hops,
            decoder: Arc::new(MsgpackDecoder),
            descriptor: Arc::new(LxmfAppData),
        }
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn AppDataDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn with_descriptor(mut self, descriptor: Arc<dyn CapabilityDescriptor>) -> Self {
        self.descriptor = descriptor;
        self
    }
}

impl core::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
