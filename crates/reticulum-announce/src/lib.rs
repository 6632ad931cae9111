//! Announce ingestion for a Reticulum/LXMF node.
//!
//! The transport layer dispatches announces to one [`AspectHandler`] per
//! aspect of interest. Each handler normalizes the announce into an
//! [`AnnouncementRecord`], recovering propagation node costs from untrusted
//! app_data where it can, and appends it to a [`PendingAnnounceQueue`] owned
//! by the [`AnnounceRegistry`]. Nothing a peer sends can make a handler fail;
//! malformed app_data only leaves record fields empty.

pub mod aspect;
pub mod capability;
pub mod collaborators;
pub mod config;
pub mod error;
mod guard;
pub mod handler;
pub mod known_paths;
pub mod logging;
pub mod lxmf_app_data;
pub mod notify;
pub mod queue;
pub mod record;
pub mod registry;
pub mod testing;

pub use aspect::Aspect;
pub use capability::{PropagationCosts, extract_propagation_costs};
pub use collaborators::{
    AnnounceTransport, AnnouncedIdentity, AppDataDecoder, CapabilityDescriptor, Collaborators,
    HopEstimator, MsgpackDecoder,
};
pub use config::AnnounceConfig;
pub use error::{AnnounceError, CapabilityError, NotifyError};
pub use handler::{AnnounceHandler, AspectHandler};
pub use known_paths::KnownPaths;
pub use lxmf_app_data::LxmfAppData;
pub use notify::{AnnounceCallback, AnnounceNotification, channel_callback, notification_channel};
pub use queue::PendingAnnounceQueue;
pub use record::{AnnouncementRecord, PeeringCosts};
pub use registry::AnnounceRegistry;
