//! Storage Management System (SMS) detection and positioning.
//!
//! At most one main-chain slot holds the SMS, and it always sits directly
//! after the last occupied non-SMS slot. Its position is derived from the
//! chain on every read; the `bos_{sys}_lastslot` document field is only a
//! mirror written for older readers.

use serde::{Deserialize, Serialize};

use crate::block_name::block_name;
use crate::chain::Chain;
use crate::error::CoreError;
use crate::slot::{EquipmentSlot, TriggerSource};
use crate::system::SystemNumber;

/// Equipment type written for the SMS slot.
pub const SMS_EQUIPMENT_TYPE: &str = "SMS";

/// Returns `true` for SMS-like equipment: an exact `SMS` type, a type
/// mentioning storage management or a gateway, or a Tesla gateway model.
pub fn is_sms_equipment(equipment_type: &str, make: &str, model: &str) -> bool {
    if equipment_type.is_empty() {
        return false;
    }
    if equipment_type == SMS_EQUIPMENT_TYPE {
        return true;
    }
    let lower = equipment_type.to_lowercase();
    lower == "sms"
        || lower.contains("storage management")
        || lower.contains("gateway")
        || (make.eq_ignore_ascii_case("tesla") && model.to_lowercase().contains("gateway"))
}

/// Where the SMS is now and where it belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmsPlacement {
    /// Position currently holding SMS equipment.
    pub current: Option<usize>,
    /// Position right after the occupied non-SMS slots; `None` when that
    /// would fall past the end of the chain.
    pub target: Option<usize>,
}

/// Make/model picked for the SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsEquipment {
    pub make: String,
    pub model: String,
    #[serde(default = "default_true")]
    pub is_new: bool,
}

fn default_true() -> bool {
    true
}

/// Locate the SMS slot and compute its target position.
pub fn resolve(chain: &Chain) -> SmsPlacement {
    let non_sms = chain.reorderable_positions().len();
    let target = non_sms + 1;
    SmsPlacement {
        current: chain.sms_position(),
        target: (target <= chain.capacity()).then_some(target),
    }
}

/// Move SMS slots after the non-SMS slots, closing any gaps. Relative order
/// within each group is kept.
///
/// Returns `true` when the chain changed.
pub fn pin_to_end(chain: &mut Chain) -> bool {
    let before = chain.clone();
    let (mut ordered, sms) = chain.take_partitioned();
    ordered.extend(sms);
    chain.rebuild(ordered);
    *chain != before
}

/// Write SMS equipment into the chain.
///
/// An existing SMS slot is updated in place; otherwise the SMS takes the
/// derived target position. Either way the SMS ends up pinned to the end.
/// Returns the SMS position.
pub fn place(
    chain: &mut Chain,
    system: SystemNumber,
    equipment: &SmsEquipment,
) -> Result<usize, CoreError> {
    let placement = resolve(chain);
    let position = match (placement.current, placement.target) {
        (Some(current), _) => current,
        (None, Some(target)) => target,
        (None, None) => {
            return Err(CoreError::ChainFull {
                chain: chain.kind().as_str(),
                capacity: chain.capacity(),
            })
        }
    };

    let trigger = TriggerSource::Sms.trigger_id(system);
    chain.put_slot(
        position,
        EquipmentSlot {
            equipment_type: SMS_EQUIPMENT_TYPE.to_string(),
            make: equipment.make.clone(),
            model: equipment.model.clone(),
            amp_rating: String::new(),
            is_new: equipment.is_new,
            block_name: Some(block_name(Some(trigger.as_str()), SMS_EQUIPMENT_TYPE).to_string()),
            trigger: Some(trigger),
            active: true,
        },
    )?;
    pin_to_end(chain);

    chain.sms_position().ok_or_else(|| {
        CoreError::Internal("SMS slot missing right after it was written".to_string())
    })
}

/// Remove the SMS from the chain. Returns the position it occupied, or
/// `None` if there was no SMS.
pub fn clear(chain: &mut Chain) -> Result<Option<usize>, CoreError> {
    let Some(position) = chain.sms_position() else {
        return Ok(None);
    };
    chain.clear_slot(position)?;
    pin_to_end(chain);
    Ok(Some(position))
}
