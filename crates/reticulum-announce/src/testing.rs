//! Test doubles for the announce collaborators.
//!
//! These stand in for the transport layer, the hop estimator, the decoder, and
//! the capability descriptor so handler behaviour can be exercised without a
//! running node.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reticulum_announce::testing::{FixedHops, ScriptedDecoder, StubDescriptor};
//!
//! let collaborators = Collaborators::new(Arc::new(FixedHops::known(1)))
//!     .with_decoder(Arc::new(ScriptedDecoder::returning(pn_value(costs))))
//!     .with_descriptor(Arc::new(StubDescriptor::valid(Some(16))));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reticulum_core::{DecodeError, DestinationHash, Value};

use crate::collaborators::{
    AnnounceTransport, AnnouncedIdentity, AppDataDecoder, CapabilityDescriptor, HopEstimator,
};
use crate::handler::AnnounceHandler;

/// An identity with a fixed public key.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub Vec<u8>);

impl AnnouncedIdentity for StaticIdentity {
    fn public_key(&self) -> Vec<u8> {
        self.0.clone()
    }
}

/// A hop estimator that always gives the same answer, or panics.
#[derive(Debug, Clone, Copy)]
pub enum FixedHops {
    Known(u8),
    Unknown,
    Panics,
}

impl FixedHops {
    pub fn known(hops: u8) -> Self {
        FixedHops::Known(hops)
    }
}

impl HopEstimator for FixedHops {
    fn hops_to(&self, _destination: &DestinationHash) -> Option<u8> {
        match self {
            FixedHops::Known(hops) => Some(*hops),
            FixedHops::Unknown => None,
            FixedHops::Panics => panic!("path table unavailable"),
        }
    }
}

#[derive(Debug)]
enum DecoderScript {
    Return(Value),
    Fail(DecodeError),
    Panic,
}

/// A decoder that ignores its input, returns a scripted outcome, and counts
/// how often it was called.
#[derive(Debug)]
pub struct ScriptedDecoder {
    script: DecoderScript,
    calls: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn returning(value: Value) -> Self {
        Self::with(DecoderScript::Return(value))
    }

    pub fn failing(error: DecodeError) -> Self {
        Self::with(DecoderScript::Fail(error))
    }

    pub fn panicking() -> Self {
        Self::with(DecoderScript::Panic)
    }

    fn with(script: DecoderScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `unpack` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AppDataDecoder for ScriptedDecoder {
    fn unpack(&self, _data: &[u8]) -> Result<Value, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            DecoderScript::Return(value) => Ok(value.clone()),
            DecoderScript::Fail(error) => Err(error.clone()),
            DecoderScript::Panic => panic!("decoder exploded"),
        }
    }
}

/// A capability descriptor with a fixed verdict and stamp cost.
#[derive(Debug)]
pub struct StubDescriptor {
    valid: bool,
    stamp_cost: Option<u64>,
    panics: bool,
    calls: AtomicUsize,
}

impl StubDescriptor {
    pub fn valid(stamp_cost: Option<u64>) -> Self {
        Self::with(true, stamp_cost, false)
    }

    pub fn invalid(stamp_cost: Option<u64>) -> Self {
        Self::with(false, stamp_cost, false)
    }

    pub fn panicking() -> Self {
        Self::with(false, None, true)
    }

    fn with(valid: bool, stamp_cost: Option<u64>, panics: bool) -> Self {
        Self {
            valid,
            stamp_cost,
            panics,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of descriptor calls of either kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("descriptor exploded");
        }
    }
}

impl CapabilityDescriptor for StubDescriptor {
    fn pn_announce_data_is_valid(&self, _app_data: &[u8]) -> bool {
        self.touch();
        self.valid
    }

    fn pn_stamp_cost_from_app_data(&self, _app_data: &[u8]) -> Option<u64> {
        self.touch();
        self.stamp_cost
    }
}

/// A transport that records every registered handler.
#[derive(Default)]
pub struct RecordingTransport {
    handlers: Mutex<Vec<Arc<dyn AnnounceHandler>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter strings of registered handlers, in registration order.
    pub fn filters(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|h| h.aspect_filter().to_string())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn AnnounceHandler>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registered handlers, in registration order.
    pub fn handlers(&self) -> Vec<Arc<dyn AnnounceHandler>> {
        self.lock().clone()
    }
}

impl AnnounceTransport for RecordingTransport {
    fn register_announce_handler(&self, handler: Arc<dyn AnnounceHandler>) {
        self.lock().push(handler);
    }
}

/// A decoded propagation announce with `costs` in the stamp-cost slot and nil
/// everywhere before it.
pub fn pn_value(costs: Vec<Value>) -> Value {
    let mut slots = vec![Value::Nil; 5];
    slots.push(Value::Array(costs));
    Value::Array(slots)
}
