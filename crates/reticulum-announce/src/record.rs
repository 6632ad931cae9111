//! Normalized announce records handed to higher-level node logic.

use std::time::Instant;

use serde::{Serialize, Serializer};

use reticulum_core::DestinationHash;

use crate::aspect::Aspect;

/// Stamp cost flexibility and peering cost advertised by a propagation node.
///
/// Both values come from the same peer-supplied sub-record, so they are
/// recovered together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeeringCosts {
    pub stamp_cost_flexibility: i128,
    pub peering_cost: i128,
}

/// One received announce, as queued for the node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementRecord {
    pub destination_hash: DestinationHash,
    pub identity_public_key: Vec<u8>,
    pub aspect: Aspect,
    /// `None` when the hop estimator had no answer.
    pub hop_distance: Option<u8>,
    /// Raw attached payload; empty when the announce carried none.
    pub app_data: Vec<u8>,
    pub stamp_cost: Option<u64>,
    pub peering: Option<PeeringCosts>,
    /// Human-readable name recovered from app_data, where the aspect has one.
    pub display_name: Option<String>,
    pub received_at: Instant,
}

impl AnnouncementRecord {
    #[must_use]
    pub fn stamp_cost_flexibility(&self) -> Option<i128> {
        self.peering.map(|p| p.stamp_cost_flexibility)
    }

    #[must_use]
    pub fn peering_cost(&self) -> Option<i128> {
        self.peering.map(|p| p.peering_cost)
    }

    /// JSON view for the application layer.
    ///
    /// Byte fields are lowercase hex. Costs beyond the 64-bit range are
    /// decimal strings. `received_at` is omitted.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Serialize)]
struct RecordView<'a> {
    destination_hash: String,
    identity_public_key: String,
    aspect: Aspect,
    hop_distance: Option<u8>,
    app_data: String,
    stamp_cost: Option<u64>,
    stamp_cost_flexibility: Option<CostView>,
    peering_cost: Option<CostView>,
    display_name: Option<&'a str>,
}

/// A peer-advertised cost as a JSON number where one fits, otherwise as a
/// decimal string.
#[derive(Serialize)]
#[serde(untagged)]
enum CostView {
    Signed(i64),
    Unsigned(u64),
    Decimal(String),
}

impl From<i128> for CostView {
    fn from(n: i128) -> Self {
        if let Ok(n) = i64::try_from(n) {
            CostView::Signed(n)
        } else if let Ok(n) = u64::try_from(n) {
            CostView::Unsigned(n)
        } else {
            CostView::Decimal(n.to_string())
        }
    }
}

impl Serialize for AnnouncementRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordView {
            destination_hash: hex::encode(self.destination_hash),
            identity_public_key: hex::encode(&self.identity_public_key),
            aspect: self.aspect,
            hop_distance: self.hop_distance,
            app_data: hex::encode(&self.app_data),
            stamp_cost: self.stamp_cost,
            stamp_cost_flexibility: self.stamp_cost_flexibility().map(CostView::from),
            peering_cost: self.peering_cost().map(CostView::from),
            display_name: self.display_name.as_deref(),
        }
        .serialize(serializer)
    }
}
