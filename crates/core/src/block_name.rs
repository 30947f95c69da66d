//! Block names: the diagram label a BOS slot is grouped under.

use crate::slot::TriggerSource;
use crate::sms;

pub const PRE_COMBINE: &str = "PRE COMBINE";
pub const POST_COMBINE: &str = "POST COMBINE";
pub const BATTERY_CHAIN: &str = "BATTERY CHAIN";
pub const BACKUP: &str = "BACKUP";

/// Derive the block name for a slot from its trigger id and equipment type.
///
/// SMS-type equipment always lands in the post-combine block. Unknown or
/// missing triggers fall back to the pre-combine block.
pub fn block_name(trigger: Option<&str>, equipment_type: &str) -> &'static str {
    if sms::is_sms_equipment(equipment_type, "", "") {
        return POST_COMBINE;
    }
    match trigger.and_then(TriggerSource::from_trigger_id) {
        Some(TriggerSource::Battery1 | TriggerSource::Battery2) => BATTERY_CHAIN,
        Some(TriggerSource::Backup) => BACKUP,
        Some(TriggerSource::Sms | TriggerSource::PostSms) => POST_COMBINE,
        Some(
            TriggerSource::StringCombiner | TriggerSource::Inverter | TriggerSource::MicroInverter,
        )
        | None => PRE_COMBINE,
    }
}
