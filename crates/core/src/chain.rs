//! Chain model and slot accessor.
//!
//! A [`Chain`] is the fixed-capacity, position-indexed list of BOS slots for
//! one (system, chain kind) pair. Positions are 1-based. The chain operations
//! (insert, remove, reorder) live in [`crate::operations`]; compaction and SMS
//! pinning in [`crate::compaction`] and [`crate::sms`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::slot::{EquipmentSlot, SlotPatch, TriggerSource};
use crate::system::SystemNumber;

/// Capacity of the main chain.
pub const MAIN_CHAIN_CAPACITY: usize = 6;

/// Capacity of each auxiliary (battery1, battery2, backup) chain.
pub const AUX_CHAIN_CAPACITY: usize = 3;

// ---------------------------------------------------------------------------
// ChainKind
// ---------------------------------------------------------------------------

/// The four chain families every system owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    Main,
    Battery1,
    Battery2,
    Backup,
}

impl ChainKind {
    pub const ALL: [ChainKind; 4] = [Self::Main, Self::Battery1, Self::Battery2, Self::Backup];

    pub fn capacity(self) -> usize {
        match self {
            Self::Main => MAIN_CHAIN_CAPACITY,
            Self::Battery1 | Self::Battery2 | Self::Backup => AUX_CHAIN_CAPACITY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Battery1 => "battery1",
            Self::Battery2 => "battery2",
            Self::Backup => "backup",
        }
    }

    /// Trigger given to slots opened without an anchor on this chain.
    /// The main chain has no single owner; callers name the source.
    pub fn default_trigger(self) -> Option<TriggerSource> {
        match self {
            Self::Main => None,
            Self::Battery1 => Some(TriggerSource::Battery1),
            Self::Battery2 => Some(TriggerSource::Battery2),
            Self::Backup => Some(TriggerSource::Backup),
        }
    }

    /// Document key prefix of one slot, e.g. `bos_sys1_type3` or
    /// `bos_sys2_battery1_type1`.
    pub fn slot_key_prefix(self, system: SystemNumber, position: usize) -> String {
        match self {
            Self::Main => format!("bos_{}_type{position}", system.prefix()),
            other => format!("bos_{}_{}_type{position}", system.prefix(), other.as_str()),
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown chain '{s}'. Must be one of: main, battery1, battery2, backup"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered, bounded sequence of slots. Always holds exactly `capacity` slots;
/// vacant positions hold [`EquipmentSlot::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    kind: ChainKind,
    slots: Vec<EquipmentSlot>,
}

/// Serialized view of a slot with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedSlot {
    pub position: usize,
    #[serde(flatten)]
    pub slot: EquipmentSlot,
}

impl Chain {
    /// An empty chain.
    pub fn new(kind: ChainKind) -> Self {
        Self {
            kind,
            slots: vec![EquipmentSlot::default(); kind.capacity()],
        }
    }

    /// Build a chain from slots in position order. Missing trailing slots are
    /// vacant; more slots than the capacity is rejected.
    pub fn from_slots(kind: ChainKind, mut slots: Vec<EquipmentSlot>) -> Result<Self, CoreError> {
        if slots.len() > kind.capacity() {
            return Err(CoreError::Validation(format!(
                "{} slots given for the {kind} chain (capacity {})",
                slots.len(),
                kind.capacity()
            )));
        }
        slots.resize(kind.capacity(), EquipmentSlot::default());
        Ok(Self { kind, slots })
    }

    pub fn kind(&self) -> ChainKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index into `slots` for a 1-based position.
    fn index(&self, position: usize) -> Result<usize, CoreError> {
        if (1..=self.capacity()).contains(&position) {
            Ok(position - 1)
        } else {
            Err(CoreError::Validation(format!(
                "Position {position} out of range for the {} chain (1-{})",
                self.kind,
                self.capacity()
            )))
        }
    }

    pub fn slot(&self, position: usize) -> Result<&EquipmentSlot, CoreError> {
        let idx = self.index(position)?;
        Ok(&self.slots[idx])
    }

    pub fn slot_mut(&mut self, position: usize) -> Result<&mut EquipmentSlot, CoreError> {
        let idx = self.index(position)?;
        Ok(&mut self.slots[idx])
    }

    /// Merge a partial update into one slot. No persistence side effect.
    ///
    /// Returns `true` when the equipment type changed.
    pub fn set_slot(&mut self, position: usize, patch: &SlotPatch) -> Result<bool, CoreError> {
        Ok(patch.apply_to(self.slot_mut(position)?))
    }

    /// Replace one slot wholesale.
    pub fn put_slot(&mut self, position: usize, slot: EquipmentSlot) -> Result<(), CoreError> {
        *self.slot_mut(position)? = slot;
        Ok(())
    }

    /// Reset one slot to vacant, returning what it held.
    pub fn clear_slot(&mut self, position: usize) -> Result<EquipmentSlot, CoreError> {
        Ok(std::mem::take(self.slot_mut(position)?))
    }

    /// `(position, slot)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &EquipmentSlot)> {
        self.slots.iter().enumerate().map(|(idx, slot)| (idx + 1, slot))
    }

    pub fn positioned(&self) -> Vec<PositionedSlot> {
        self.iter()
            .map(|(position, slot)| PositionedSlot {
                position,
                slot: slot.clone(),
            })
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(EquipmentSlot::is_occupied)
    }

    pub fn first_vacant(&self) -> Option<usize> {
        self.iter().find(|(_, s)| s.is_vacant()).map(|(p, _)| p)
    }

    /// Occupied positions form a run starting at 1.
    pub fn is_contiguous(&self) -> bool {
        let occupied = self.occupied_count();
        self.slots[..occupied].iter().all(EquipmentSlot::is_occupied)
    }

    /// Whether `slot` is treated as this chain's SMS. Only the main chain
    /// carries one; gateway-like equipment on auxiliary chains is ordinary.
    pub fn holds_sms(&self, slot: &EquipmentSlot) -> bool {
        self.kind == ChainKind::Main && slot.is_sms()
    }

    /// Position of the SMS slot, if any. An exact `SMS` type match wins over
    /// the gateway / storage-management heuristic. Always `None` off the
    /// main chain.
    pub fn sms_position(&self) -> Option<usize> {
        if self.kind != ChainKind::Main {
            return None;
        }
        self.iter()
            .find(|(_, s)| s.equipment_type == crate::sms::SMS_EQUIPMENT_TYPE)
            .or_else(|| self.iter().find(|(_, s)| s.is_sms()))
            .map(|(p, _)| p)
    }

    /// Occupied, non-SMS positions in order. This is the only set a user may
    /// reorder; the SMS slot stays pinned after it.
    pub fn reorderable_positions(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, s)| s.is_occupied() && !self.holds_sms(s))
            .map(|(p, _)| p)
            .collect()
    }

    /// Rewrite the chain so `occupied` fills positions 1.. in order and every
    /// later position is vacant.
    pub(crate) fn rebuild(&mut self, mut occupied: Vec<EquipmentSlot>) {
        debug_assert!(occupied.len() <= self.capacity());
        occupied.resize(self.capacity(), EquipmentSlot::default());
        self.slots = occupied;
    }

    /// Occupied slots split into (non-SMS, SMS), each in position order.
    pub(crate) fn take_partitioned(&self) -> (Vec<EquipmentSlot>, Vec<EquipmentSlot>) {
        self.slots
            .iter()
            .filter(|s| s.is_occupied())
            .cloned()
            .partition(|s| !self.holds_sms(s))
    }

    pub(crate) fn slots_mut(&mut self) -> &mut Vec<EquipmentSlot> {
        &mut self.slots
    }
}
