//! Which BOS chains apply to a system, based on its configured equipment.

use serde_json::Value;

use crate::chain::ChainKind;
use crate::system::SystemNumber;
use crate::types::Document;

const BACKUP_OPTIONS: [&str; 2] = ["Whole Home", "Partial Home"];

fn has_text(doc: &Document, key: &str) -> bool {
    match doc.get(key) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

fn quantity(doc: &Document, key: &str) -> u64 {
    match doc.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.ceil() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn has_make_and_model(doc: &Document, prefix: &str, component: &str) -> bool {
    has_text(doc, &format!("{prefix}_{component}_make"))
        && has_text(doc, &format!("{prefix}_{component}_model"))
}

fn has_battery(doc: &Document, prefix: &str, index: u8) -> bool {
    [
        format!("{prefix}_battery_{index}_qty"),
        format!("{prefix}_battery{index}_qty"),
        format!("{prefix}_battery_type{index}_quantity"),
    ]
    .iter()
    .any(|key| quantity(doc, key) > 0)
}

/// Chains shown for `system`, in [`ChainKind::ALL`] order.
pub fn visible_chains(doc: &Document, system: SystemNumber) -> Vec<ChainKind> {
    let prefix = system.prefix();
    ChainKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            ChainKind::Main => ["combiner_panel", "inverter", "micro_inverter"]
                .iter()
                .any(|component| has_make_and_model(doc, &prefix, component)),
            ChainKind::Battery1 => has_battery(doc, &prefix, 1),
            ChainKind::Battery2 => has_battery(doc, &prefix, 2),
            ChainKind::Backup => matches!(
                doc.get(&format!("{prefix}_backup_option")),
                Some(Value::String(option)) if BACKUP_OPTIONS.contains(&option.as_str())
            ),
        })
        .collect()
}
