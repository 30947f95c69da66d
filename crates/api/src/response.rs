//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use serde::Serialize;
use solarbos_core::{EquipmentSlot, SystemChains};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Result of a chain mutation that lands on a position, with the refreshed
/// chains of the system.
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub position: Option<usize>,
    pub bos: SystemChains,
}

/// Result of a slot removal.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: EquipmentSlot,
    pub bos: SystemChains,
}
