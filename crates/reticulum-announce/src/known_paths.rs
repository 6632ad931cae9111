//! Hop counts to known destinations.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use reticulum_core::DestinationHash;

use crate::collaborators::HopEstimator;

/// Hop count the transport reports for destinations it has no path to.
pub const PATHFINDER_M: u8 = 128;

#[derive(Debug, Clone, Copy)]
struct PathHops {
    hops: u8,
    expires: Instant,
}

/// Thread-safe table of hop counts learned from the path table.
#[derive(Debug, Default)]
#[must_use]
pub struct KnownPaths {
    entries: RwLock<HashMap<DestinationHash, PathHops>>,
}

impl KnownPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hop count to `dest`, valid until `expires`.
    pub fn update(&self, dest: DestinationHash, hops: u8, expires: Instant) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dest, PathHops { hops, expires });
    }

    /// Hop count to `dest` as of `now`.
    #[must_use]
    pub fn hops_at(&self, dest: &DestinationHash, now: Instant) -> Option<u8> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dest)
            .filter(|e| now < e.expires)
            .map(|e| e.hops)
            .filter(|&hops| hops != PATHFINDER_M)
    }

    /// Remove entries expired as of `now`. Returns the number removed.
    pub fn cull(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| now < e.expires);
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HopEstimator for KnownPaths {
    fn hops_to(&self, destination: &DestinationHash) -> Option<u8> {
        self.hops_at(destination, Instant::now())
    }
}
