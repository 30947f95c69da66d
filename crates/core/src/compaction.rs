//! Canonical slot ordering.
//!
//! After compaction a chain satisfies:
//! - occupied slots are contiguous from position 1;
//! - pre-combine slots come before system-core slots, which come before
//!   post-SMS slots (stable within each tier);
//! - the SMS slot, if any, sits right after the last non-SMS slot.

use crate::chain::Chain;

/// Compact `chain` in place. Returns `true` when anything moved.
pub fn compact(chain: &mut Chain) -> bool {
    let before = chain.clone();
    let (mut ordered, sms) = chain.take_partitioned();
    // `sort_by_key` is stable, so user ordering inside a tier survives.
    ordered.sort_by_key(|slot| slot.tier());
    ordered.extend(sms);
    chain.rebuild(ordered);
    *chain != before
}

/// Compacted copy of `chain`.
pub fn compacted(chain: &Chain) -> Chain {
    let mut copy = chain.clone();
    compact(&mut copy);
    copy
}

/// Returns `true` if `chain` is already in canonical form.
pub fn is_canonical(chain: &Chain) -> bool {
    compacted(chain) == *chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainKind;
    use crate::slot::EquipmentSlot;

    fn slot(equipment_type: &str, trigger: Option<&str>) -> EquipmentSlot {
        EquipmentSlot {
            equipment_type: equipment_type.into(),
            trigger: trigger.map(str::to_string),
            active: true,
            ..EquipmentSlot::default()
        }
    }

    fn types(chain: &Chain) -> Vec<String> {
        chain
            .iter()
            .map(|(_, s)| s.equipment_type.clone())
            .collect()
    }

    #[test]
    fn test_closes_gaps() {
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(2, slot("A", Some("sys1_inverter"))).unwrap();
        chain.put_slot(5, slot("B", Some("sys1_inverter"))).unwrap();
        assert!(compact(&mut chain));
        assert_eq!(types(&chain), vec!["A", "B", "", "", "", ""]);
        assert!(chain.is_contiguous());
    }

    #[test]
    fn test_orders_by_tier_and_keeps_order_within_tier() {
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(1, slot("Post", Some("sys1_postSMS"))).unwrap();
        chain.put_slot(2, slot("Core", None)).unwrap();
        chain.put_slot(3, slot("Pre2", Some("sys1_inverter"))).unwrap();
        chain.put_slot(4, slot("Pre1", Some("sys1_stringCombiner"))).unwrap();
        compact(&mut chain);
        assert_eq!(types(&chain), vec!["Pre2", "Pre1", "Core", "Post", "", ""]);
    }

    #[test]
    fn test_sms_goes_last() {
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(1, slot("SMS", Some("sys1_sms"))).unwrap();
        chain.put_slot(2, slot("Post", Some("sys1_postSMS"))).unwrap();
        chain.put_slot(3, slot("Pre", Some("sys1_inverter"))).unwrap();
        compact(&mut chain);
        assert_eq!(types(&chain), vec!["Pre", "Post", "SMS", "", "", ""]);
    }

    #[test]
    fn test_reserved_slot_is_kept() {
        let mut chain = Chain::new(ChainKind::Battery1);
        chain
            .put_slot(3, EquipmentSlot::reserved(Some("sys1_battery1".into())))
            .unwrap();
        compact(&mut chain);
        assert!(chain.slot(1).unwrap().active);
        assert!(chain.slot(3).unwrap().is_vacant());
    }

    #[test]
    fn test_canonical_chain_is_untouched() {
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(1, slot("Pre", Some("sys1_inverter"))).unwrap();
        chain.put_slot(2, slot("SMS", Some("sys1_sms"))).unwrap();
        assert!(is_canonical(&chain));
        assert!(!compact(&mut chain));
    }
}
