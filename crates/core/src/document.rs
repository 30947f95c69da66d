//! Flat key-value document codec for BOS chains.
//!
//! Every slot attribute is stored under its own key:
//! `bos_{sys}_type{N}_{attr}` for the main chain and
//! `bos_{sys}_{battery1|battery2|backup}_type{N}_{attr}` for the auxiliary
//! chains. A vacant slot encodes to all-null fields so that a partial write
//! clears it.

use serde_json::Value;

use crate::chain::{Chain, ChainKind};
use crate::slot::EquipmentSlot;
use crate::system::SystemNumber;
use crate::types::Document;

pub const ATTR_EQUIPMENT_TYPE: &str = "equipment_type";
pub const ATTR_MAKE: &str = "make";
pub const ATTR_MODEL: &str = "model";
pub const ATTR_AMP_RATING: &str = "amp_rating";
pub const ATTR_IS_NEW: &str = "is_new";
pub const ATTR_ACTIVE: &str = "active";
pub const ATTR_TRIGGER: &str = "trigger";
pub const ATTR_BLOCK_NAME: &str = "block_name";

/// Every attribute persisted per slot.
pub const SLOT_ATTRIBUTES: [&str; 8] = [
    ATTR_EQUIPMENT_TYPE,
    ATTR_MAKE,
    ATTR_MODEL,
    ATTR_AMP_RATING,
    ATTR_IS_NEW,
    ATTR_ACTIVE,
    ATTR_TRIGGER,
    ATTR_BLOCK_NAME,
];

/// Full key of one slot attribute.
pub fn slot_field(kind: ChainKind, system: SystemNumber, position: usize, attr: &str) -> String {
    format!("{}_{attr}", kind.slot_key_prefix(system, position))
}

/// Legacy mirror of the SMS position, e.g. `bos_sys1_lastslot`.
pub fn lastslot_key(system: SystemNumber) -> String {
    format!("bos_{}_lastslot", system.prefix())
}

// ---------------------------------------------------------------------------
// Value readers
// ---------------------------------------------------------------------------

/// Strings as-is, numbers rendered (amp ratings are sometimes stored as
/// numbers), everything else empty.
fn read_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    Some(read_string(value)).filter(|s| !s.is_empty())
}

fn read_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(Value::Number(n)) => n.as_i64().map_or(default, |n| n != 0),
        _ => default,
    }
}

fn string_or_null(s: &str) -> Value {
    if s.is_empty() {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Read one slot. Vacant slots come back as [`EquipmentSlot::default`] no
/// matter what leftover fields the document holds.
pub fn decode_slot(
    doc: &Document,
    system: SystemNumber,
    kind: ChainKind,
    position: usize,
) -> EquipmentSlot {
    let field = |attr: &str| doc.get(&slot_field(kind, system, position, attr));
    let slot = EquipmentSlot {
        equipment_type: read_string(field(ATTR_EQUIPMENT_TYPE)),
        make: read_string(field(ATTR_MAKE)),
        model: read_string(field(ATTR_MODEL)),
        amp_rating: read_string(field(ATTR_AMP_RATING)),
        is_new: read_bool(field(ATTR_IS_NEW), true),
        trigger: read_optional_string(field(ATTR_TRIGGER)),
        block_name: read_optional_string(field(ATTR_BLOCK_NAME)),
        active: read_bool(field(ATTR_ACTIVE), false),
    };
    if slot.is_vacant() {
        EquipmentSlot::default()
    } else {
        slot
    }
}

/// Write one slot's fields into `out`.
pub fn encode_slot(
    out: &mut Document,
    slot: &EquipmentSlot,
    system: SystemNumber,
    kind: ChainKind,
    position: usize,
) {
    let mut put = |attr: &str, value: Value| {
        out.insert(slot_field(kind, system, position, attr), value);
    };
    if slot.is_vacant() {
        for attr in SLOT_ATTRIBUTES {
            put(attr, Value::Null);
        }
        return;
    }
    put(ATTR_EQUIPMENT_TYPE, string_or_null(&slot.equipment_type));
    put(ATTR_MAKE, string_or_null(&slot.make));
    put(ATTR_MODEL, string_or_null(&slot.model));
    put(ATTR_AMP_RATING, string_or_null(&slot.amp_rating));
    put(ATTR_IS_NEW, Value::Bool(slot.is_new));
    put(ATTR_ACTIVE, Value::Bool(slot.active));
    put(
        ATTR_TRIGGER,
        slot.trigger.as_deref().map_or(Value::Null, string_or_null),
    );
    put(
        ATTR_BLOCK_NAME,
        slot.block_name.as_deref().map_or(Value::Null, string_or_null),
    );
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

pub fn decode_chain(doc: &Document, system: SystemNumber, kind: ChainKind) -> Chain {
    let mut chain = Chain::new(kind);
    for (idx, slot) in chain.slots_mut().iter_mut().enumerate() {
        *slot = decode_slot(doc, system, kind, idx + 1);
    }
    chain
}

/// Every field of `chain`, plus the SMS position mirror for the main chain.
pub fn encode_chain(chain: &Chain, system: SystemNumber) -> Document {
    let mut out = Document::new();
    for (position, slot) in chain.iter() {
        encode_slot(&mut out, slot, system, chain.kind(), position);
    }
    if chain.kind() == ChainKind::Main {
        let lastslot = chain
            .sms_position()
            .map_or(Value::Null, |position| Value::from(position as u64));
        out.insert(lastslot_key(system), lastslot);
    }
    out
}

/// Entries of `encoded` whose value differs from what `doc` holds. A
/// missing key in `doc` reads as null.
pub fn diff_patch(doc: &Document, encoded: &Document) -> Document {
    encoded
        .iter()
        .filter(|(key, value)| doc.get(*key).unwrap_or(&Value::Null) != *value)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Apply a partial exact write: null removes the key, anything else sets it.
pub fn merge_patch(doc: &mut Document, patch: &Document) {
    for (key, value) in patch {
        if value.is_null() {
            doc.remove(key);
        } else {
            doc.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sys1() -> SystemNumber {
        SystemNumber::new(1).unwrap()
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_field_names() {
        assert_eq!(
            slot_field(ChainKind::Main, sys1(), 2, ATTR_AMP_RATING),
            "bos_sys1_type2_amp_rating"
        );
        assert_eq!(
            slot_field(ChainKind::Battery2, sys1(), 3, ATTR_TRIGGER),
            "bos_sys1_battery2_type3_trigger"
        );
        assert_eq!(lastslot_key(sys1()), "bos_sys1_lastslot");
    }

    #[test]
    fn test_decode_tolerates_loose_types() {
        let doc = doc(json!({
            "bos_sys1_type1_equipment_type": "AC Disconnect",
            "bos_sys1_type1_amp_rating": 60,
            "bos_sys1_type1_is_new": "false",
            "bos_sys1_type1_trigger": "sys1_inverter",
        }));
        let slot = decode_slot(&doc, sys1(), ChainKind::Main, 1);
        assert_eq!(slot.amp_rating, "60");
        assert!(!slot.is_new);
        assert!(!slot.active);
        assert!(slot.is_occupied());
        assert_eq!(slot.trigger.as_deref(), Some("sys1_inverter"));
    }

    #[test]
    fn test_leftover_fields_on_vacant_slot_are_dropped() {
        let doc = doc(json!({
            "bos_sys1_battery1_type2_make": "EATON",
            "bos_sys1_battery1_type2_active": false,
        }));
        let slot = decode_slot(&doc, sys1(), ChainKind::Battery1, 2);
        assert_eq!(slot, EquipmentSlot::default());
    }

    #[test]
    fn test_vacant_slot_encodes_to_nulls() {
        let mut out = Document::new();
        encode_slot(&mut out, &EquipmentSlot::default(), sys1(), ChainKind::Backup, 1);
        assert_eq!(out.len(), SLOT_ATTRIBUTES.len());
        assert!(out.values().all(Value::is_null));
    }

    #[test]
    fn test_main_chain_encoding_mirrors_sms_position() {
        let mut chain = Chain::new(ChainKind::Main);
        chain
            .put_slot(
                1,
                EquipmentSlot {
                    equipment_type: "SMS".into(),
                    active: true,
                    ..EquipmentSlot::default()
                },
            )
            .unwrap();
        let encoded = encode_chain(&chain, sys1());
        assert_eq!(encoded["bos_sys1_lastslot"], json!(1));
        assert_eq!(encoded.len(), 6 * SLOT_ATTRIBUTES.len() + 1);

        let aux = encode_chain(&Chain::new(ChainKind::Battery1), sys1());
        assert!(!aux.contains_key("bos_sys1_lastslot"));
    }

    #[test]
    fn test_chain_round_trip() {
        let mut chain = Chain::new(ChainKind::Main);
        chain
            .put_slot(
                1,
                EquipmentSlot {
                    equipment_type: "Fused AC Disconnect".into(),
                    make: "EATON".into(),
                    model: "DG222NRB".into(),
                    amp_rating: "60".into(),
                    is_new: false,
                    trigger: Some("sys1_inverter".into()),
                    block_name: Some("PRE COMBINE".into()),
                    active: true,
                },
            )
            .unwrap();
        chain
            .put_slot(2, EquipmentSlot::reserved(Some("sys1_inverter".into())))
            .unwrap();

        let mut stored = Document::new();
        merge_patch(&mut stored, &encode_chain(&chain, sys1()));
        assert_eq!(decode_chain(&stored, sys1(), ChainKind::Main), chain);
    }

    #[test]
    fn test_diff_only_reports_changes() {
        let stored = doc(json!({
            "bos_sys1_type1_equipment_type": "Meter",
            "bos_sys1_type1_active": true,
        }));
        let chain = decode_chain(&stored, sys1(), ChainKind::Main);
        let patch = diff_patch(&stored, &encode_chain(&chain, sys1()));
        // Only the newly written defaults show up; nulls for absent keys do not.
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["bos_sys1_type1_is_new"], json!(true));
    }

    #[test]
    fn test_merge_patch_clears_nulls() {
        let mut stored = doc(json!({ "a": 1, "b": 2 }));
        merge_patch(&mut stored, &doc(json!({ "a": null, "c": 3 })));
        assert_eq!(Value::Object(stored), json!({ "b": 2, "c": 3 }));
    }
}
