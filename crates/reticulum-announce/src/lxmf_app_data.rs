//! LXMF announce app_data layouts.
//!
//! Propagation nodes announce a msgpack array:
//!
//! ```text
//! [legacy_flag, timebase, node_enabled, transfer_limit_kb, sync_limit_kb,
//!  [stamp_cost, stamp_cost_flexibility, peering_cost], metadata]
//! ```
//!
//! Delivery destinations announce either `[display_name, stamp_cost, ...]`
//! (LXMF 0.5.0+) or a bare UTF-8 display name (legacy). Nomad Network nodes
//! announce a bare UTF-8 node name.

use reticulum_core::{Value, unpack};

use crate::aspect::Aspect;
use crate::collaborators::CapabilityDescriptor;

/// Slot holding the `[stamp_cost, flexibility, peering_cost]` triple.
pub const PN_STAMP_COSTS_SLOT: usize = 5;
/// Slot holding the node metadata map.
pub const PN_METADATA_SLOT: usize = 6;
/// Minimum number of slots in a valid propagation node announce.
pub const PN_ANNOUNCE_MIN_LEN: usize = 7;

/// [`CapabilityDescriptor`] for LXMF propagation node announces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LxmfAppData;

impl CapabilityDescriptor for LxmfAppData {
    fn pn_announce_data_is_valid(&self, app_data: &[u8]) -> bool {
        let Ok(data) = unpack(app_data) else {
            return false;
        };
        let Some(slots) = data.as_array() else {
            return false;
        };
        if slots.len() < PN_ANNOUNCE_MIN_LEN {
            tracing::trace!(len = slots.len(), "propagation announce data too short");
            return false;
        }

        let is_int = |v: &Value| v.to_integer().is_some();
        let costs_ok = slots[PN_STAMP_COSTS_SLOT]
            .as_array()
            .is_some_and(|costs| costs.len() >= 3 && costs[..3].iter().all(is_int));

        is_int(&slots[1])
            && slots[2].as_bool().is_some()
            && is_int(&slots[3])
            && is_int(&slots[4])
            && costs_ok
            && slots[PN_METADATA_SLOT].as_map().is_some()
    }

    fn pn_stamp_cost_from_app_data(&self, app_data: &[u8]) -> Option<u64> {
        let data = unpack(app_data).ok()?;
        let cost = data.get(PN_STAMP_COSTS_SLOT)?.get(0)?.to_integer()?;
        u64::try_from(cost).ok()
    }
}

/// Whether `app_data` starts with a msgpack fixarray or array16 marker.
fn is_msgpack_array(app_data: &[u8]) -> bool {
    matches!(app_data.first(), Some(0x90..=0x9f | 0xdc))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.clone()),
        Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

/// Display name from an `lxmf.delivery` announce.
#[must_use]
pub fn delivery_display_name(app_data: &[u8]) -> Option<String> {
    if app_data.is_empty() {
        return None;
    }
    if is_msgpack_array(app_data) {
        let data = unpack(app_data).ok()?;
        text(data.get(0)?)
    } else {
        String::from_utf8(app_data.to_vec()).ok()
    }
}

/// Display name for an announce of the given aspect, where one exists.
#[must_use]
pub fn display_name(aspect: Aspect, app_data: &[u8]) -> Option<String> {
    let name = match aspect {
        Aspect::Delivery => delivery_display_name(app_data),
        Aspect::NomadNode => String::from_utf8(app_data.to_vec()).ok(),
        Aspect::Propagation | Aspect::Audio => None,
    }?;
    (!name.is_empty()).then_some(name)
}
