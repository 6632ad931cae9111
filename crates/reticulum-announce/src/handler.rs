//! Per-aspect announce handlers registered with the transport.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use reticulum_core::DestinationHash;

use crate::aspect::Aspect;
use crate::capability::{PropagationCosts, extract_propagation_costs};
use crate::collaborators::{AnnouncedIdentity, Collaborators};
use crate::guard::contain;
use crate::lxmf_app_data::display_name;
use crate::notify::{AnnounceCallback, AnnounceNotification};
use crate::queue::PendingAnnounceQueue;
use crate::record::AnnouncementRecord;

/// The contract the transport layer dispatches announces through.
///
/// `received_announce` must not fail: the transport treats anything escaping
/// it as fatal to its dispatch loop.
pub trait AnnounceHandler: Send + Sync {
    /// The aspect filter the transport matches incoming announces against.
    fn aspect_filter(&self) -> &str;

    /// Called once per matching announce.
    fn received_announce(
        &self,
        destination_hash: DestinationHash,
        announced_identity: &dyn AnnouncedIdentity,
        app_data: Option<&[u8]>,
    );
}

/// Handler for one [`Aspect`], appending every announce it sees to the shared
/// queue.
pub struct AspectHandler {
    aspect: Aspect,
    collaborators: Collaborators,
    queue: Arc<PendingAnnounceQueue>,
    callback: RwLock<Option<AnnounceCallback>>,
}

impl AspectHandler {
    pub fn new(
        aspect: Aspect,
        collaborators: Collaborators,
        queue: Arc<PendingAnnounceQueue>,
    ) -> Self {
        Self {
            aspect,
            collaborators,
            queue,
            callback: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn aspect(&self) -> Aspect {
        self.aspect
    }

    /// Install the callback invoked after each announce is queued.
    pub fn set_callback(&self, callback: AnnounceCallback) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    pub fn clear_callback(&self) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn build_record(
        &self,
        destination_hash: DestinationHash,
        announced_identity: &dyn AnnouncedIdentity,
        app_data: &[u8],
    ) -> AnnouncementRecord {
        let hop_distance = contain("hops_to", || {
            self.collaborators.hops.hops_to(&destination_hash)
        })
        .flatten();

        let identity_public_key =
            contain("public_key", || announced_identity.public_key()).unwrap_or_default();

        let costs = match self.aspect {
            Aspect::Propagation => extract_propagation_costs(
                app_data,
                self.collaborators.descriptor.as_ref(),
                self.collaborators.decoder.as_ref(),
            ),
            _ => PropagationCosts::default(),
        };

        AnnouncementRecord {
            destination_hash,
            identity_public_key,
            aspect: self.aspect,
            hop_distance,
            app_data: app_data.to_vec(),
            stamp_cost: costs.stamp_cost,
            peering: costs.peering,
            display_name: display_name(self.aspect, app_data),
            received_at: Instant::now(),
        }
    }

    fn notify(&self, notification: &AnnounceNotification) {
        // Clone out of the lock so the callback may rewire handlers.
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(callback) = callback else {
            return;
        };

        if let Some(Err(e)) = contain("announce callback", || callback(notification)) {
            tracing::warn!(
                dest = %notification.destination_hash,
                aspect = %self.aspect,
                "announce notification failed: {e}"
            );
        }
    }
}

impl AnnounceHandler for AspectHandler {
    fn aspect_filter(&self) -> &str {
        self.aspect.as_str()
    }

    fn received_announce(
        &self,
        destination_hash: DestinationHash,
        announced_identity: &dyn AnnouncedIdentity,
        app_data: Option<&[u8]>,
    ) {
        let app_data = app_data.unwrap_or_default();
        let record = self.build_record(destination_hash, announced_identity, app_data);

        tracing::debug!(
            dest = %destination_hash,
            aspect = %self.aspect,
            hops = ?record.hop_distance,
            app_data_len = app_data.len(),
            stamp_cost = ?record.stamp_cost,
            "announce queued"
        );

        let notification = AnnounceNotification::from(&record);
        self.queue.push(record);
        self.notify(&notification);
    }
}

impl core::fmt::Debug for AspectHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AspectHandler")
            .field("aspect", &self.aspect)
            .field("has_callback", &self.has_callback())
            .finish_non_exhaustive()
    }
}
