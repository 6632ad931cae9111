//! Outer notification after an announce has been queued.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use reticulum_core::DestinationHash;

use crate::aspect::Aspect;
use crate::error::NotifyError;
use crate::record::AnnouncementRecord;

/// What the outer layer is told about each queued announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceNotification {
    pub destination_hash: DestinationHash,
    pub public_key: Vec<u8>,
    pub hop_distance: Option<u8>,
    pub aspect: Aspect,
    pub app_data: Vec<u8>,
}

impl From<&AnnouncementRecord> for AnnounceNotification {
    fn from(record: &AnnouncementRecord) -> Self {
        Self {
            destination_hash: record.destination_hash,
            public_key: record.identity_public_key.clone(),
            hop_distance: record.hop_distance,
            aspect: record.aspect,
            app_data: record.app_data.clone(),
        }
    }
}

/// Callback invoked after each announce is queued.
pub type AnnounceCallback =
    Arc<dyn Fn(&AnnounceNotification) -> Result<(), NotifyError> + Send + Sync>;

/// Adapt a bounded tokio channel into an [`AnnounceCallback`].
///
/// Never blocks: a full channel drops the notification with
/// [`NotifyError::ChannelFull`].
pub fn channel_callback(tx: mpsc::Sender<AnnounceNotification>) -> AnnounceCallback {
    Arc::new(move |notification: &AnnounceNotification| {
        tx.try_send(notification.clone()).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::ChannelFull,
            TrySendError::Closed(_) => NotifyError::ChannelClosed,
        })
    })
}

/// Create a notification channel with the given capacity.
pub fn notification_channel(
    capacity: usize,
) -> (AnnounceCallback, mpsc::Receiver<AnnounceNotification>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (channel_callback(tx), rx)
}
