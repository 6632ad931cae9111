//! The pending announce queue.
//!
//! Aspect handlers append from whatever thread the transport calls them on;
//! node logic drains from the front. A single mutex makes every append and
//! every drain linearizable, so a record is drained exactly once.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::record::AnnouncementRecord;

/// FIFO of announce records awaiting consumption.
#[derive(Debug, Default)]
pub struct PendingAnnounceQueue {
    records: Mutex<VecDeque<AnnouncementRecord>>,
}

impl PendingAnnounceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Records are never mutated in place, so a poisoned lock still guards a
    // consistent queue.
    fn lock(&self) -> MutexGuard<'_, VecDeque<AnnouncementRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record at the back.
    pub fn push(&self, record: AnnouncementRecord) {
        self.lock().push_back(record);
    }

    /// Remove and return the oldest record.
    pub fn pop_front(&self) -> Option<AnnouncementRecord> {
        self.lock().pop_front()
    }

    /// Remove and return every queued record, oldest first.
    pub fn drain(&self) -> Vec<AnnouncementRecord> {
        let taken = std::mem::take(&mut *self.lock());
        Vec::from(taken)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
