//! Ownership of the aspect handlers and the pending announce queue.

use std::sync::Arc;

use crate::aspect::Aspect;
use crate::collaborators::{AnnounceTransport, Collaborators};
use crate::config::AnnounceConfig;
use crate::handler::{AnnounceHandler, AspectHandler};
use crate::notify::AnnounceCallback;
use crate::queue::PendingAnnounceQueue;
use crate::record::AnnouncementRecord;

/// Process-wide announce state: one handler per aspect and the queue they all
/// append to.
///
/// Built once at node startup. [`register`](Self::register) must also be
/// called exactly once; a second call registers every handler again.
#[derive(Debug)]
pub struct AnnounceRegistry {
    handlers: Vec<Arc<AspectHandler>>,
    queue: Arc<PendingAnnounceQueue>,
}

impl AnnounceRegistry {
    /// A registry with handlers for every aspect.
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_aspects(collaborators, &Aspect::ALL)
    }

    /// A registry with handlers for the given aspects, duplicates ignored.
    pub fn with_aspects(collaborators: Collaborators, aspects: &[Aspect]) -> Self {
        let queue = Arc::new(PendingAnnounceQueue::new());
        let mut handlers: Vec<Arc<AspectHandler>> = Vec::with_capacity(aspects.len());
        for &aspect in aspects {
            if handlers.iter().any(|h| h.aspect() == aspect) {
                continue;
            }
            handlers.push(Arc::new(AspectHandler::new(
                aspect,
                collaborators.clone(),
                Arc::clone(&queue),
            )));
        }
        Self { handlers, queue }
    }

    /// A registry with handlers for the aspects listed in `config`.
    pub fn from_config(config: &AnnounceConfig, collaborators: Collaborators) -> Self {
        Self::with_aspects(collaborators, &config.announce.unique_aspects())
    }

    /// Register every handler with the transport.
    pub fn register(&self, transport: &dyn AnnounceTransport) {
        for handler in &self.handlers {
            transport.register_announce_handler(Arc::clone(handler) as Arc<dyn AnnounceHandler>);
            tracing::info!(aspect = %handler.aspect(), "announce handler registered");
        }
    }

    /// Install the outer notification callback on every handler.
    pub fn set_callback(&self, callback: AnnounceCallback) {
        for handler in &self.handlers {
            handler.set_callback(Arc::clone(&callback));
        }
    }

    pub fn clear_callback(&self) {
        for handler in &self.handlers {
            handler.clear_callback();
        }
    }

    /// Remove and return every queued record, oldest first.
    pub fn drain_pending(&self) -> Vec<AnnouncementRecord> {
        self.queue.drain()
    }

    /// Remove and return the oldest queued record.
    pub fn pop_pending(&self) -> Option<AnnouncementRecord> {
        self.queue.pop_front()
    }

    /// Number of queued records.
    #[must_use]
    pub fn peek_count(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn handler(&self, aspect: Aspect) -> Option<&Arc<AspectHandler>> {
        self.handlers.iter().find(|h| h.aspect() == aspect)
    }

    #[must_use]
    pub fn handler_for_filter(&self, filter: &str) -> Option<&Arc<AspectHandler>> {
        self.handlers.iter().find(|h| h.aspect_filter() == filter)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Arc<AspectHandler>> {
        self.handlers.iter()
    }

    /// The shared queue, for consumers that outlive the registry borrow.
    #[must_use]
    pub fn queue(&self) -> Arc<PendingAnnounceQueue> {
        Arc::clone(&self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reticulum_core::DestinationHash;

    use crate::error::NotifyError;
    use crate::notify::AnnounceNotification;
    use crate::testing::{FixedHops, RecordingTransport, StaticIdentity};

    fn make_registry() -> AnnounceRegistry {
        AnnounceRegistry::new(Collaborators::new(Arc::new(FixedHops::known(1))))
    }

    fn identity() -> StaticIdentity {
        StaticIdentity(b"test_pubkey".to_vec())
    }

    #[test]
    fn builds_all_four_handlers() {
        let registry = make_registry();
        let filters: Vec<&str> = registry.handlers().map(|h| h.aspect_filter()).collect();
        assert_eq!(
            filters,
            vec![
                "lxmf.delivery",
                "lxmf.propagation",
                "call.audio",
                "nomadnetwork.node"
            ]
        );
    }

    #[test]
    fn lookup_by_aspect_and_filter() {
        let registry = make_registry();
        for aspect in Aspect::ALL {
            assert_eq!(registry.handler(aspect).unwrap().aspect(), aspect);
            assert_eq!(
                registry
                    .handler_for_filter(aspect.as_str())
                    .unwrap()
                    .aspect_filter(),
                aspect.as_str()
            );
        }
        assert!(registry.handler_for_filter("lxmf.bogus").is_none());
    }

    #[test]
    fn register_hands_every_handler_to_transport() {
        let registry = make_registry();
        let transport = RecordingTransport::new();
        registry.register(&transport);

        assert_eq!(
            transport.filters(),
            vec![
                "lxmf.delivery",
                "lxmf.propagation",
                "call.audio",
                "nomadnetwork.node"
            ]
        );
    }

    #[test]
    fn double_register_double_registers() {
        let registry = make_registry();
        let transport = RecordingTransport::new();
        registry.register(&transport);
        registry.register(&transport);
        assert_eq!(transport.filters().len(), 8);
    }

    #[test]
    fn transport_dispatch_lands_in_registry_queue() {
        let registry = make_registry();
        let transport = RecordingTransport::new();
        registry.register(&transport);

        for handler in transport.handlers() {
            handler.received_announce(DestinationHash::new([1; 16]), &identity(), None);
        }
        assert_eq!(registry.peek_count(), 4);

        let aspects: Vec<Aspect> = registry.drain_pending().iter().map(|r| r.aspect).collect();
        assert_eq!(aspects, Aspect::ALL.to_vec());
    }

    #[test]
    fn each_announce_increments_count_by_one() {
        let registry = make_registry();
        let mut expected = 0;
        for aspect in Aspect::ALL {
            let handler = registry.handler(aspect).unwrap();
            handler.received_announce(
                DestinationHash::new([2; 16]),
                &identity(),
                Some(&[0xc1, 0xff][..]),
            );
            expected += 1;
            assert_eq!(registry.peek_count(), expected);
        }
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let registry = make_registry();
        let handler = registry.handler(Aspect::Delivery).unwrap();
        for seed in 1..=5u8 {
            handler.received_announce(DestinationHash::new([seed; 16]), &identity(), None);
        }

        let drained = registry.drain_pending();
        let seeds: Vec<u8> = drained
            .iter()
            .map(|r| r.destination_hash.to_bytes()[0])
            .collect();
        assert_eq!(seeds, vec![1, 2, 3, 4, 5]);
        assert_eq!(registry.peek_count(), 0);
        assert!(registry.drain_pending().is_empty());
    }

    #[test]
    fn pop_pending_takes_oldest() {
        let registry = make_registry();
        let handler = registry.handler(Aspect::Audio).unwrap();
        handler.received_announce(DestinationHash::new([9; 16]), &identity(), None);
        handler.received_announce(DestinationHash::new([8; 16]), &identity(), None);

        assert_eq!(
            registry.pop_pending().unwrap().destination_hash,
            DestinationHash::new([9; 16])
        );
        assert_eq!(registry.peek_count(), 1);
    }

    #[test]
    fn from_config_builds_configured_aspects() {
        let config = AnnounceConfig::parse(
            r#"
            [announce]
            aspects = ["lxmf.propagation", "lxmf.propagation", "call.audio"]
            "#,
        )
        .unwrap();
        let registry = AnnounceRegistry::from_config(
            &config,
            Collaborators::new(Arc::new(FixedHops::Unknown)),
        );

        let aspects: Vec<Aspect> = registry.handlers().map(|h| h.aspect()).collect();
        assert_eq!(aspects, vec![Aspect::Propagation, Aspect::Audio]);
        assert!(registry.handler(Aspect::Delivery).is_none());
    }

    #[test]
    fn set_callback_wires_every_handler() {
        let registry = make_registry();
        registry.set_callback(Arc::new(
            |_: &AnnounceNotification| -> Result<(), NotifyError> { Ok(()) },
        ));
        assert!(registry.handlers().all(|h| h.has_callback()));

        registry.clear_callback();
        assert!(registry.handlers().all(|h| !h.has_callback()));
    }

    #[test]
    fn queue_handle_is_shared() {
        let registry = make_registry();
        let queue = registry.queue();
        registry
            .handler(Aspect::NomadNode)
            .unwrap()
            .received_announce(DestinationHash::new([3; 16]), &identity(), Some(b"node".as_slice()));
        assert_eq!(queue.len(), 1);
        assert_eq!(registry.peek_count(), 1);
    }
}
