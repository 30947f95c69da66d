//! Chain mutations: insert-with-shift, remove-with-compaction and reorder.
//!
//! All operations are pure over an in-memory [`Chain`]; persistence is the
//! caller's concern (see [`crate::manager`]). Every operation leaves the SMS
//! pinned directly after the non-SMS slots.

use serde::{Deserialize, Serialize};

use crate::chain::{Chain, ChainKind};
use crate::compaction;
use crate::error::CoreError;
use crate::slot::{EquipmentSlot, Tier, TriggerSource};
use crate::sms;
use crate::system::SystemNumber;

/// Where an "add equipment" request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum InsertOrigin {
    /// An upstream component with no anchor slot.
    Upstream { trigger: TriggerSource },
    /// "Add next" on the slot at `position`.
    After { position: usize },
}

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Chain {
    /// Open a new slot, shifting occupied slots toward the end to make room.
    ///
    /// Pre-combine sources (string combiner, inverters) insert at the front
    /// of the main chain; other upstream sources, and every upstream add on
    /// an auxiliary chain, take the first free position. "Add next" inserts
    /// directly after the anchor and inherits its trigger.
    ///
    /// Fails with [`CoreError::ChainFull`] without touching the chain when
    /// every position is occupied. Returns the new slot's position.
    pub fn insert(&mut self, system: SystemNumber, origin: InsertOrigin) -> Result<usize, CoreError> {
        if self.is_full() {
            return Err(CoreError::ChainFull {
                chain: self.kind().as_str(),
                capacity: self.capacity(),
            });
        }

        let (target, trigger) = match origin {
            InsertOrigin::Upstream { trigger } => {
                let front = self.kind() == ChainKind::Main && trigger.tier() == Tier::PreCombine;
                let target = if front {
                    1
                } else {
                    // Not full, so a vacancy exists.
                    self.first_vacant().unwrap_or(self.capacity())
                };
                (target, Some(trigger.trigger_id(system)))
            }
            InsertOrigin::After { position } => {
                let anchor = self.slot(position)?;
                if anchor.is_vacant() {
                    return Err(CoreError::Validation(format!(
                        "Cannot add after position {position} of the {} chain: slot is empty",
                        self.kind()
                    )));
                }
                if self.holds_sms(anchor) {
                    return Err(CoreError::Validation(
                        "Cannot add after the SMS slot; it stays at the end of the chain"
                            .to_string(),
                    ));
                }
                let trigger = anchor.trigger.clone().or_else(|| {
                    self.kind()
                        .default_trigger()
                        .map(|source| source.trigger_id(system))
                });
                (position + 1, trigger)
            }
        };

        let inserted_idx = self.open_at(target - 1, EquipmentSlot::reserved(trigger));
        // Pinning closes gaps but keeps non-SMS order, so the new slot lands
        // right after the non-SMS slots that precede it now.
        let ahead = self
            .iter()
            .take(inserted_idx)
            .filter(|(_, s)| s.is_occupied() && !self.holds_sms(s))
            .count();
        sms::pin_to_end(self);
        Ok(ahead + 1)
    }

    /// Put `slot` at index `target_idx`, consuming the nearest vacancy at or
    /// after it (slots in between move one step toward the end). Without such
    /// a vacancy the nearest one before it is consumed instead and the slot
    /// lands one index earlier, still directly after its predecessor.
    ///
    /// Returns the index the slot ended up at. Caller guarantees a vacancy.
    fn open_at(&mut self, target_idx: usize, slot: EquipmentSlot) -> usize {
        let slots = self.slots_mut();
        let after = (target_idx..slots.len()).find(|&i| slots[i].is_vacant());
        match after {
            Some(vacant_idx) => {
                slots.remove(vacant_idx);
                slots.insert(target_idx, slot);
                target_idx
            }
            None => {
                let before = (0..target_idx.min(slots.len()))
                    .rev()
                    .find(|&i| slots[i].is_vacant());
                // The chain is not full, so one side has a vacancy.
                let vacant_idx = before.unwrap_or(0);
                slots.remove(vacant_idx);
                let idx = target_idx - 1;
                slots.insert(idx, slot);
                idx
            }
        }
    }

    /// Clear the slot at `position` and compact the chain.
    ///
    /// Returns the removed slot.
    pub fn remove(&mut self, position: usize) -> Result<EquipmentSlot, CoreError> {
        if self.slot(position)?.is_vacant() {
            return Err(CoreError::Validation(format!(
                "Nothing to remove at position {position} of the {} chain",
                self.kind()
            )));
        }
        let removed = self.clear_slot(position)?;
        compaction::compact(self);
        Ok(removed)
    }

    /// Reorder the occupied non-SMS slots.
    ///
    /// `order` lists current positions in their new order and must be a
    /// permutation of [`Chain::reorderable_positions`]. The SMS slot is not
    /// part of the reorderable set and is re-pinned after the others.
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), CoreError> {
        let mut expected = self.reorderable_positions();
        let mut given = order.to_vec();
        given.sort_unstable();
        expected.sort_unstable();
        if given != expected {
            return Err(CoreError::Validation(format!(
                "Reorder of the {} chain must list each of positions {:?} exactly once, got {:?}",
                self.kind(),
                self.reorderable_positions(),
                order
            )));
        }

        let mut ordered = Vec::with_capacity(self.capacity());
        for &position in order {
            ordered.push(self.slot(position)?.clone());
        }
        let (_, sms_slots) = self.take_partitioned();
        ordered.extend(sms_slots);
        self.rebuild(ordered);
        Ok(())
    }

    /// Swap the slot at `position` with its neighbour. Returns the slot's new
    /// position.
    pub fn move_slot(&mut self, position: usize, direction: Direction) -> Result<usize, CoreError> {
        self.slot(position)?;
        let mut order = self.reorderable_positions();
        let idx = order.iter().position(|&p| p == position).ok_or_else(|| {
            CoreError::Validation(format!(
                "Position {position} of the {} chain cannot be moved (empty or SMS)",
                self.kind()
            ))
        })?;

        let new_idx = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < order.len() => idx + 1,
            _ => {
                return Err(CoreError::Validation(format!(
                    "Cannot move position {position} {direction:?}: end of the {} chain reached",
                    self.kind()
                )))
            }
        };

        order.swap(idx, new_idx);
        self.reorder(&order)?;
        Ok(new_idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sys1() -> SystemNumber {
        SystemNumber::new(1).unwrap()
    }

    fn slot(equipment_type: &str, trigger: &str) -> EquipmentSlot {
        EquipmentSlot {
            equipment_type: equipment_type.into(),
            make: format!("{equipment_type} make"),
            model: format!("{equipment_type} model"),
            amp_rating: "60A".into(),
            trigger: Some(trigger.into()),
            block_name: Some("PRE COMBINE".into()),
            active: true,
            is_new: false,
        }
    }

    fn main_with(types: &[&str]) -> Chain {
        let slots = types.iter().map(|t| slot(t, "sys1_inverter")).collect();
        Chain::from_slots(ChainKind::Main, slots).unwrap()
    }

    fn types(chain: &Chain) -> Vec<String> {
        chain
            .iter()
            .map(|(_, s)| {
                if s.is_occupied() && s.equipment_type.is_empty() {
                    "<new>".to_string()
                } else {
                    s.equipment_type.clone()
                }
            })
            .collect()
    }

    // -- insert -------------------------------------------------------------

    #[test]
    fn test_upstream_pre_combine_inserts_at_front() {
        let mut chain = main_with(&["A", "B"]);
        let position = chain
            .insert(sys1(), InsertOrigin::Upstream { trigger: TriggerSource::StringCombiner })
            .unwrap();
        assert_eq!(position, 1);
        assert_eq!(types(&chain), vec!["<new>", "A", "B", "", "", ""]);
        assert_eq!(
            chain.slot(1).unwrap().trigger.as_deref(),
            Some("sys1_stringCombiner")
        );
    }

    #[test]
    fn test_upstream_into_empty_chain_opens_first_slot() {
        let mut chain = Chain::new(ChainKind::Main);
        let position = chain
            .insert(sys1(), InsertOrigin::Upstream { trigger: TriggerSource::Inverter })
            .unwrap();
        assert_eq!(position, 1);
        assert!(chain.slot(1).unwrap().active);
        assert_eq!(chain.occupied_count(), 1);
    }

    #[test]
    fn test_upstream_on_aux_chain_appends() {
        let mut chain = Chain::new(ChainKind::Battery1);
        chain.put_slot(1, slot("Fuse", "sys1_battery1")).unwrap();
        let position = chain
            .insert(sys1(), InsertOrigin::Upstream { trigger: TriggerSource::Battery1 })
            .unwrap();
        assert_eq!(position, 2);
        assert_eq!(chain.slot(1).unwrap().equipment_type, "Fuse");
    }

    #[test]
    fn test_upstream_post_sms_lands_before_sms() {
        let mut chain = main_with(&["A", "SMS"]);
        let position = chain
            .insert(sys1(), InsertOrigin::Upstream { trigger: TriggerSource::PostSms })
            .unwrap();
        assert_eq!(position, 2);
        assert_eq!(types(&chain), vec!["A", "<new>", "SMS", "", "", ""]);
    }

    #[test]
    fn test_insert_into_full_chain_is_rejected_without_mutation() {
        let mut chain = main_with(&["A", "B", "C", "D", "E", "F"]);
        let before = chain.clone();
        let err = chain
            .insert(sys1(), InsertOrigin::After { position: 2 })
            .unwrap_err();
        assert_matches!(err, CoreError::ChainFull { chain: "main", capacity: 6 });
        assert_eq!(chain, before);

        let err = chain
            .insert(sys1(), InsertOrigin::Upstream { trigger: TriggerSource::Inverter })
            .unwrap_err();
        assert_matches!(err, CoreError::ChainFull { .. });
        assert_eq!(chain, before);
    }

    #[test]
    fn test_insert_shifts_following_slots_with_all_fields() {
        let mut chain = main_with(&["A", "B", "C", "D", "E"]);
        let original = chain.clone();
        let position = chain.insert(sys1(), InsertOrigin::After { position: 2 }).unwrap();
        assert_eq!(position, 3);
        assert_eq!(types(&chain), vec!["A", "B", "<new>", "C", "D", "E"]);
        for p in 3..=5 {
            assert_eq!(chain.slot(p + 1).unwrap(), original.slot(p).unwrap());
        }
        let opened = chain.slot(3).unwrap();
        assert_eq!(opened.trigger.as_deref(), Some("sys1_inverter"));
        assert!(opened.equipment_type.is_empty() && opened.make.is_empty());
        assert!(opened.is_new);
    }

    #[test]
    fn test_insert_after_last_occupied_uses_empty_slot() {
        let mut chain = main_with(&["A", "B"]);
        let position = chain.insert(sys1(), InsertOrigin::After { position: 2 }).unwrap();
        assert_eq!(position, 3);
        assert_eq!(types(&chain), vec!["A", "B", "<new>", "", "", ""]);
    }

    #[test]
    fn test_insert_before_sms_moves_sms_back() {
        // Slot 1 Rapid Shutdown, slot 2 SMS, add from slot 1.
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(1, slot("Rapid Shutdown", "sys1_stringCombiner")).unwrap();
        chain.put_slot(2, slot("SMS", "sys1_sms")).unwrap();
        let sms_before = chain.slot(2).unwrap().clone();

        let position = chain.insert(sys1(), InsertOrigin::After { position: 1 }).unwrap();
        assert_eq!(position, 2);
        assert_eq!(chain.slot(1).unwrap().equipment_type, "Rapid Shutdown");
        let opened = chain.slot(2).unwrap();
        assert!(opened.active && opened.equipment_type.is_empty());
        assert_eq!(opened.trigger.as_deref(), Some("sys1_stringCombiner"));
        assert_eq!(chain.slot(3).unwrap(), &sms_before);
        assert_eq!(chain.sms_position(), Some(3));
        assert!(chain.slot(4).unwrap().is_vacant());
    }

    #[test]
    fn test_insert_after_vacant_or_sms_anchor_is_rejected() {
        let mut chain = main_with(&["A", "SMS"]);
        assert_matches!(
            chain.insert(sys1(), InsertOrigin::After { position: 4 }),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            chain.insert(sys1(), InsertOrigin::After { position: 2 }),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            chain.insert(sys1(), InsertOrigin::After { position: 9 }),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_insert_after_last_position_with_gap_before() {
        // Hydrated documents can have holes; the new slot still follows its anchor.
        let mut chain = Chain::new(ChainKind::Battery2);
        chain.put_slot(2, slot("B", "sys1_battery2")).unwrap();
        chain.put_slot(3, slot("C", "sys1_battery2")).unwrap();
        let position = chain.insert(sys1(), InsertOrigin::After { position: 3 }).unwrap();
        assert_eq!(position, 3);
        assert_eq!(types(&chain), vec!["B", "C", "<new>"]);
    }

    #[test]
    fn test_insert_with_leading_hole_reports_final_position() {
        let mut chain = Chain::new(ChainKind::Main);
        chain.put_slot(2, slot("A", "sys1_inverter")).unwrap();
        chain.put_slot(3, slot("B", "sys1_inverter")).unwrap();
        chain.put_slot(4, slot("C", "sys1_inverter")).unwrap();

        let position = chain.insert(sys1(), InsertOrigin::After { position: 2 }).unwrap();
        assert_eq!(types(&chain), vec!["A", "<new>", "B", "C", "", ""]);
        assert_eq!(position, 2);
        let opened = chain.slot(position).unwrap();
        assert!(opened.active && opened.equipment_type.is_empty());
    }

    #[test]
    fn test_gateway_on_backup_chain_is_not_pinned() {
        let mut chain = Chain::new(ChainKind::Backup);
        chain.put_slot(1, slot("Backup Gateway", "sys1_backup")).unwrap();
        chain.put_slot(2, slot("Fuse", "sys1_backup")).unwrap();

        let position = chain.insert(sys1(), InsertOrigin::After { position: 1 }).unwrap();
        assert_eq!(position, 2);
        assert_eq!(types(&chain), vec!["Backup Gateway", "<new>", "Fuse"]);

        chain.reorder(&[3, 2, 1]).unwrap();
        assert_eq!(types(&chain), vec!["Fuse", "<new>", "Backup Gateway"]);
    }

    #[test]
    fn test_aux_add_next_inherits_default_trigger_when_anchor_has_none() {
        let mut chain = Chain::new(ChainKind::Backup);
        chain
            .put_slot(
                1,
                EquipmentSlot {
                    equipment_type: "Disconnect".into(),
                    active: true,
                    ..EquipmentSlot::default()
                },
            )
            .unwrap();
        chain.insert(sys1(), InsertOrigin::After { position: 1 }).unwrap();
        assert_eq!(chain.slot(2).unwrap().trigger.as_deref(), Some("sys1_backup"));
    }

    // -- remove -------------------------------------------------------------

    #[test]
    fn test_remove_compacts_remaining_slots() {
        let mut chain = main_with(&["A", "B", "C", "SMS"]);
        let removed = chain.remove(2).unwrap();
        assert_eq!(removed.equipment_type, "B");
        assert_eq!(types(&chain), vec!["A", "C", "SMS", "", "", ""]);
        assert!(chain.is_contiguous());
        assert_eq!(chain.sms_position(), Some(3));
    }

    #[test]
    fn test_remove_vacant_slot_is_rejected() {
        let mut chain = main_with(&["A"]);
        assert_matches!(chain.remove(3), Err(CoreError::Validation(_)));
        assert_matches!(chain.remove(7), Err(CoreError::Validation(_)));
    }

    // -- reorder ------------------------------------------------------------

    #[test]
    fn test_reorder_rewrites_positions_and_keeps_sms_last() {
        let mut chain = main_with(&["A", "B", "C", "SMS"]);
        chain.reorder(&[3, 1, 2]).unwrap();
        assert_eq!(types(&chain), vec!["C", "A", "B", "SMS", "", ""]);
    }

    #[test]
    fn test_reorder_rejects_non_permutations() {
        let mut chain = main_with(&["A", "B", "SMS"]);
        let before = chain.clone();
        assert_matches!(chain.reorder(&[1]), Err(CoreError::Validation(_)));
        assert_matches!(chain.reorder(&[1, 1]), Err(CoreError::Validation(_)));
        assert_matches!(chain.reorder(&[2, 1, 3]), Err(CoreError::Validation(_)));
        assert_eq!(chain, before);
    }

    #[test]
    fn test_move_swaps_neighbours() {
        let mut chain = main_with(&["A", "B", "C"]);
        assert_eq!(chain.move_slot(2, Direction::Up).unwrap(), 1);
        assert_eq!(types(&chain)[..3], ["B", "A", "C"]);
        assert_eq!(chain.move_slot(2, Direction::Down).unwrap(), 3);
        assert_eq!(types(&chain)[..3], ["B", "C", "A"]);
    }

    #[test]
    fn test_swap_twice_restores_chain() {
        let mut chain = main_with(&["A", "B", "C", "D", "SMS"]);
        let original = chain.clone();
        chain.move_slot(2, Direction::Down).unwrap();
        assert_ne!(chain, original);
        chain.move_slot(2, Direction::Down).unwrap();
        assert_eq!(chain, original);
    }

    #[test]
    fn test_move_rejects_sms_and_boundaries() {
        let mut chain = main_with(&["A", "B", "SMS"]);
        assert_matches!(chain.move_slot(3, Direction::Up), Err(CoreError::Validation(_)));
        assert_matches!(chain.move_slot(1, Direction::Up), Err(CoreError::Validation(_)));
        assert_matches!(chain.move_slot(2, Direction::Down), Err(CoreError::Validation(_)));
        assert_matches!(chain.move_slot(5, Direction::Up), Err(CoreError::Validation(_)));
    }
}
