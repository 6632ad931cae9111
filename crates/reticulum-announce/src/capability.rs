//! Capability extraction from propagation node announces.
//!
//! The payload is peer-supplied and may be anything. Extraction never fails
//! outward: every problem collapses into absent fields. The stamp cost is read
//! independently of the flexibility/peering pair, and the pair is recovered
//! atomically.

use reticulum_core::Value;

use crate::collaborators::{AppDataDecoder, CapabilityDescriptor};
use crate::error::CapabilityError;
use crate::guard::contain;
use crate::lxmf_app_data::PN_STAMP_COSTS_SLOT;
use crate::record::PeeringCosts;

/// Position of the flexibility value inside the stamp-cost triple.
const FLEXIBILITY_INDEX: usize = 1;
/// Position of the peering cost inside the stamp-cost triple.
const PEERING_COST_INDEX: usize = 2;

/// Costs recovered from a propagation node announce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationCosts {
    pub stamp_cost: Option<u64>,
    pub peering: Option<PeeringCosts>,
}

/// Recover whatever costs `app_data` yields.
///
/// The decoder is only consulted for non-empty data the descriptor accepts.
pub fn extract_propagation_costs(
    app_data: &[u8],
    descriptor: &dyn CapabilityDescriptor,
    decoder: &dyn AppDataDecoder,
) -> PropagationCosts {
    if app_data.is_empty() {
        return PropagationCosts::default();
    }

    let valid = contain("pn_announce_data_is_valid", || {
        descriptor.pn_announce_data_is_valid(app_data)
    })
    .unwrap_or(false);

    let stamp_cost = contain("pn_stamp_cost_from_app_data", || {
        descriptor.pn_stamp_cost_from_app_data(app_data)
    })
    .flatten();

    if !valid {
        tracing::trace!(?stamp_cost, "propagation app_data rejected, skipping decode");
        return PropagationCosts {
            stamp_cost,
            peering: None,
        };
    }

    let peering = match peering_costs(app_data, decoder) {
        Ok(costs) => Some(costs),
        Err(e) => {
            tracing::trace!("peering costs unavailable: {e}");
            None
        }
    };

    PropagationCosts {
        stamp_cost,
        peering,
    }
}

/// Decode `app_data` and read the flexibility/peering pair from it.
pub fn peering_costs(
    app_data: &[u8],
    decoder: &dyn AppDataDecoder,
) -> Result<PeeringCosts, CapabilityError> {
    let value = contain("unpack", || decoder.unpack(app_data))
        .ok_or(CapabilityError::DecoderPanicked)??;
    peering_costs_from_value(&value)
}

/// Read the flexibility/peering pair from a decoded announce.
///
/// Any shape problem anywhere along the path fails the whole pair.
pub fn peering_costs_from_value(value: &Value) -> Result<PeeringCosts, CapabilityError> {
    let slots = value
        .as_array()
        .ok_or(CapabilityError::NotAnArray("announce data"))?;
    let costs = slots
        .get(PN_STAMP_COSTS_SLOT)
        .ok_or(CapabilityError::MissingSlot {
            what: "announce data",
            index: PN_STAMP_COSTS_SLOT,
            len: slots.len(),
        })?
        .as_array()
        .ok_or(CapabilityError::NotAnArray("stamp costs"))?;

    let slot = |index: usize, what: &'static str| -> Result<i128, CapabilityError> {
        costs
            .get(index)
            .ok_or(CapabilityError::MissingSlot {
                what: "stamp costs",
                index,
                len: costs.len(),
            })?
            .to_integer()
            .ok_or(CapabilityError::NotAnInteger(what))
    };

    Ok(PeeringCosts {
        stamp_cost_flexibility: slot(FLEXIBILITY_INDEX, "stamp cost flexibility")?,
        peering_cost: slot(PEERING_COST_INDEX, "peering cost")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lxmf_app_data::LxmfAppData;
    use crate::testing::{ScriptedDecoder, StubDescriptor, pn_value};
    use reticulum_core::DecodeError;

    fn int(n: i128) -> Value {
        Value::Int(n)
    }

    #[test]
    fn empty_app_data_skips_everything() {
        let descriptor = StubDescriptor::valid(Some(16));
        let decoder = ScriptedDecoder::returning(pn_value(vec![int(16), int(2), int(4)]));

        let costs = extract_propagation_costs(&[], &descriptor, &decoder);
        assert_eq!(costs, PropagationCosts::default());
        assert_eq!(decoder.calls(), 0);
        assert_eq!(descriptor.calls(), 0);
    }

    #[test]
    fn invalid_data_never_reaches_decoder() {
        let descriptor = StubDescriptor::invalid(Some(16));
        let decoder = ScriptedDecoder::returning(pn_value(vec![int(16), int(2), int(4)]));

        let costs = extract_propagation_costs(b"invalid_pn_data", &descriptor, &decoder);
        assert_eq!(costs.stamp_cost, Some(16));
        assert_eq!(costs.peering, None);
        assert_eq!(decoder.calls(), 0);
    }

    #[test]
    fn invalid_data_without_stamp_cost() {
        let descriptor = StubDescriptor::invalid(None);
        let decoder = ScriptedDecoder::failing(DecodeError::Empty);

        let costs = extract_propagation_costs(b"x", &descriptor, &decoder);
        assert_eq!(costs, PropagationCosts::default());
        assert_eq!(decoder.calls(), 0);
    }

    #[test]
    fn full_extraction() {
        let descriptor = StubDescriptor::valid(Some(16));
        let decoder = ScriptedDecoder::returning(pn_value(vec![int(16), int(2), int(4)]));

        let costs = extract_propagation_costs(b"pn", &descriptor, &decoder);
        assert_eq!(costs.stamp_cost, Some(16));
        assert_eq!(
            costs.peering,
            Some(PeeringCosts {
                stamp_cost_flexibility: 2,
                peering_cost: 4,
            })
        );
        assert_eq!(decoder.calls(), 1);
    }

    #[test]
    fn decode_failure_keeps_stamp_cost() {
        let descriptor = StubDescriptor::valid(Some(16));
        let decoder = ScriptedDecoder::failing(DecodeError::Malformed("bad marker".into()));

        let costs = extract_propagation_costs(b"malformed_msgpack_data", &descriptor, &decoder);
        assert_eq!(costs.stamp_cost, Some(16));
        assert_eq!(costs.peering, None);
    }

    #[test]
    fn stamp_cost_failure_does_not_block_pair() {
        let descriptor = StubDescriptor::valid(None);
        let decoder = ScriptedDecoder::returning(pn_value(vec![int(16), int(2), int(4)]));

        let costs = extract_propagation_costs(b"pn", &descriptor, &decoder);
        assert_eq!(costs.stamp_cost, None);
        assert!(costs.peering.is_some());
    }

    #[test]
    fn panicking_decoder_is_contained() {
        let descriptor = StubDescriptor::valid(Some(16));
        let decoder = ScriptedDecoder::panicking();

        let costs = extract_propagation_costs(b"pn", &descriptor, &decoder);
        assert_eq!(costs.stamp_cost, Some(16));
        assert_eq!(costs.peering, None);
    }

    #[test]
    fn panicking_descriptor_treated_as_invalid() {
        let descriptor = StubDescriptor::panicking();
        let decoder = ScriptedDecoder::returning(pn_value(vec![int(16), int(2), int(4)]));

        let costs = extract_propagation_costs(b"pn", &descriptor, &decoder);
        assert_eq!(costs, PropagationCosts::default());
        assert_eq!(decoder.calls(), 0);
    }

    #[test]
    fn short_top_level_array() {
        let value = Value::Array(vec![int(1), int(2), int(3)]);
        assert_eq!(
            peering_costs_from_value(&value),
            Err(CapabilityError::MissingSlot {
                what: "announce data",
                index: 5,
                len: 3,
            })
        );
    }

    #[test]
    fn short_nested_array() {
        let value = pn_value(vec![int(16)]);
        assert!(matches!(
            peering_costs_from_value(&value),
            Err(CapabilityError::MissingSlot { what: "stamp costs", .. })
        ));
    }

    #[test]
    fn nested_array_missing_only_peering_cost() {
        // Flexibility is readable but the pair still fails together
        let value = pn_value(vec![int(16), int(2)]);
        assert!(peering_costs_from_value(&value).is_err());
    }

    #[test]
    fn wrong_types_in_pair() {
        let value = pn_value(vec![int(16), Value::Str("x".into()), Value::Map(vec![])]);
        assert_eq!(
            peering_costs_from_value(&value),
            Err(CapabilityError::NotAnInteger("stamp cost flexibility"))
        );

        let value = pn_value(vec![int(16), int(2), Value::Map(vec![])]);
        assert_eq!(
            peering_costs_from_value(&value),
            Err(CapabilityError::NotAnInteger("peering cost"))
        );
    }

    #[test]
    fn boolean_costs_fail_the_pair() {
        let value = pn_value(vec![int(16), Value::Bool(true), int(4)]);
        assert_eq!(
            peering_costs_from_value(&value),
            Err(CapabilityError::NotAnInteger("stamp cost flexibility"))
        );

        let value = pn_value(vec![int(16), int(2), Value::Bool(false)]);
        assert_eq!(
            peering_costs_from_value(&value),
            Err(CapabilityError::NotAnInteger("peering cost"))
        );
    }

    #[test]
    fn slot_five_not_an_array() {
        let mut slots = vec![Value::Nil; 5];
        slots.push(int(16));
        assert_eq!(
            peering_costs_from_value(&Value::Array(slots)),
            Err(CapabilityError::NotAnArray("stamp costs"))
        );
    }

    #[test]
    fn top_level_not_an_array() {
        assert_eq!(
            peering_costs_from_value(&Value::Map(vec![])),
            Err(CapabilityError::NotAnArray("announce data"))
        );
    }

    #[test]
    fn large_values_are_kept() {
        let flex = i128::from(i32::MAX);
        let peer = 1 << 16;
        let value = pn_value(vec![int(999_999), int(flex), int(peer)]);
        let costs = peering_costs_from_value(&value).unwrap();
        assert_eq!(costs.stamp_cost_flexibility, flex);
        assert_eq!(costs.peering_cost, peer);

        let value = pn_value(vec![int(0), int(i128::from(u64::MAX)), int(-7)]);
        let costs = peering_costs_from_value(&value).unwrap();
        assert_eq!(costs.stamp_cost_flexibility, i128::from(u64::MAX));
        assert_eq!(costs.peering_cost, -7);
    }

    #[test]
    fn float_pair_truncates() {
        let value = pn_value(vec![int(16), Value::Float(2.0), Value::Float(4.9)]);
        let costs = peering_costs_from_value(&value).unwrap();
        assert_eq!(costs.stamp_cost_flexibility, 2);
        assert_eq!(costs.peering_cost, 4);
    }

    #[test]
    fn real_lxmf_payload_end_to_end() {
        let mut buf = Vec::new();
        rmpv::encode::write_value(
            &mut buf,
            &rmpv::Value::Array(vec![
                false.into(),
                1_700_000_000u64.into(),
                true.into(),
                256.into(),
                10240.into(),
                rmpv::Value::Array(vec![16.into(), 3.into(), 18.into()]),
                rmpv::Value::Map(vec![]),
            ]),
        )
        .unwrap();

        let costs =
            extract_propagation_costs(&buf, &LxmfAppData, &crate::collaborators::MsgpackDecoder);
        assert_eq!(costs.stamp_cost, Some(16));
        assert_eq!(
            costs.peering,
            Some(PeeringCosts {
                stamp_cost_flexibility: 3,
                peering_cost: 18,
            })
        );
    }
}
