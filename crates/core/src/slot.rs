//! A single BOS equipment slot, its partial-update patch, and the trigger
//! identifiers that tag where a slot came from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sms;
use crate::system::SystemNumber;

// ---------------------------------------------------------------------------
// EquipmentSlot
// ---------------------------------------------------------------------------

/// One BOS item. Position is implied by the slot's index within its chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSlot {
    /// Empty means no equipment has been picked yet.
    pub equipment_type: String,
    pub make: String,
    pub model: String,
    pub amp_rating: String,
    /// New vs existing equipment.
    pub is_new: bool,
    /// Upstream component that created the slot, e.g. `sys1_stringCombiner`.
    pub trigger: Option<String>,
    pub block_name: Option<String>,
    /// Slot is opened in the form, possibly before any equipment is picked.
    pub active: bool,
}

impl Default for EquipmentSlot {
    fn default() -> Self {
        Self {
            equipment_type: String::new(),
            make: String::new(),
            model: String::new(),
            amp_rating: String::new(),
            is_new: true,
            trigger: None,
            block_name: None,
            active: false,
        }
    }
}

impl EquipmentSlot {
    /// An opened but not yet filled slot tagged with `trigger`.
    pub fn reserved(trigger: Option<String>) -> Self {
        Self {
            trigger,
            active: true,
            ..Self::default()
        }
    }

    /// A slot holds something when it is opened or has equipment picked.
    pub fn is_occupied(&self) -> bool {
        self.active || !self.equipment_type.is_empty()
    }

    pub fn is_vacant(&self) -> bool {
        !self.is_occupied()
    }

    pub fn is_sms(&self) -> bool {
        sms::is_sms_equipment(&self.equipment_type, &self.make, &self.model)
    }

    /// Every picker field is filled.
    pub fn is_complete(&self) -> bool {
        !self.equipment_type.is_empty()
            && !self.make.is_empty()
            && !self.model.is_empty()
            && !self.amp_rating.is_empty()
    }

    pub fn tier(&self) -> Tier {
        Tier::of(self.trigger.as_deref())
    }
}

// ---------------------------------------------------------------------------
// SlotPatch
// ---------------------------------------------------------------------------

/// Field-by-field edit from the equipment picker. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPatch {
    pub equipment_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub amp_rating: Option<String>,
    pub is_new: Option<bool>,
}

impl SlotPatch {
    pub fn is_empty(&self) -> bool {
        self.equipment_type.is_none()
            && self.make.is_none()
            && self.model.is_none()
            && self.amp_rating.is_none()
            && self.is_new.is_none()
    }

    /// Merge into `slot`. Returns `true` when the equipment type changed.
    pub fn apply_to(&self, slot: &mut EquipmentSlot) -> bool {
        let mut type_changed = false;
        if let Some(equipment_type) = &self.equipment_type {
            type_changed = slot.equipment_type != *equipment_type;
            slot.equipment_type.clone_from(equipment_type);
        }
        if let Some(make) = &self.make {
            slot.make.clone_from(make);
        }
        if let Some(model) = &self.model {
            slot.model.clone_from(model);
        }
        if let Some(amp_rating) = &self.amp_rating {
            slot.amp_rating.clone_from(amp_rating);
        }
        if let Some(is_new) = self.is_new {
            slot.is_new = is_new;
        }
        type_changed
    }
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Upstream components that can open a BOS slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerSource {
    #[serde(rename = "stringCombiner")]
    StringCombiner,
    #[serde(rename = "inverter")]
    Inverter,
    #[serde(rename = "microInverter")]
    MicroInverter,
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "battery1")]
    Battery1,
    #[serde(rename = "battery2")]
    Battery2,
    #[serde(rename = "backup")]
    Backup,
    #[serde(rename = "postSMS")]
    PostSms,
}

impl TriggerSource {
    pub const ALL: [TriggerSource; 8] = [
        Self::StringCombiner,
        Self::Inverter,
        Self::MicroInverter,
        Self::Sms,
        Self::Battery1,
        Self::Battery2,
        Self::Backup,
        Self::PostSms,
    ];

    /// Suffix used in stored trigger ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StringCombiner => "stringCombiner",
            Self::Inverter => "inverter",
            Self::MicroInverter => "microInverter",
            Self::Sms => "sms",
            Self::Battery1 => "battery1",
            Self::Battery2 => "battery2",
            Self::Backup => "backup",
            Self::PostSms => "postSMS",
        }
    }

    /// Full trigger id for a system, e.g. `sys2_inverter`.
    pub fn trigger_id(self, system: SystemNumber) -> String {
        format!("{}_{}", system.prefix(), self.as_str())
    }

    /// Ordering tier of slots opened by this source.
    pub fn tier(self) -> Tier {
        match self {
            Self::StringCombiner | Self::Inverter | Self::MicroInverter => Tier::PreCombine,
            Self::PostSms => Tier::PostSms,
            Self::Sms | Self::Battery1 | Self::Battery2 | Self::Backup => Tier::SystemCore,
        }
    }

    /// Recover the source from a stored trigger id such as `sys1_postSMS`.
    pub fn from_trigger_id(trigger: &str) -> Option<Self> {
        let suffix = trigger.split_once('_').map_or(trigger, |(_, rest)| rest);
        suffix.parse().ok()
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("Unknown trigger source '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Ordering tiers
// ---------------------------------------------------------------------------

/// Canonical ordering bucket of a main-chain slot. Compaction sorts by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Inserted from a string combiner or inverter, ahead of the system core.
    PreCombine,
    SystemCore,
    /// Inserted after the storage management system.
    PostSms,
}

impl Tier {
    pub fn of(trigger: Option<&str>) -> Self {
        trigger
            .and_then(TriggerSource::from_trigger_id)
            .map_or(Self::SystemCore, TriggerSource::tier)
    }
}
