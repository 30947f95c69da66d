//! Handlers for BOS slot chains.
//!
//! Read endpoints hydrate a [`ChainManager`] and return its snapshot.
//! Mutations hold the project lock for the whole read-modify-write cycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use solarbos_core::{
    ChainKind, ChainManager, Direction, EquipmentSlot, InsertOrigin, ProjectId, SlotPatch,
    SmsEquipment, SmsPlacement, SystemNumber,
};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PositionResponse, RemovedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Path and body types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SystemPath {
    pub project_id: ProjectId,
    pub system: String,
}

#[derive(Debug, Deserialize)]
pub struct ChainPath {
    pub project_id: ProjectId,
    pub system: String,
    pub chain: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotPath {
    pub project_id: ProjectId,
    pub system: String,
    pub chain: String,
    pub position: usize,
}

/// Body of `POST .../slots/{position}/move`.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

/// Body of `PUT .../order`: current positions listed in their new order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<usize>,
}

/// Payload of `GET .../bos/sms`.
#[derive(Debug, Serialize)]
pub struct SmsStatus {
    #[serde(flatten)]
    pub placement: SmsPlacement,
    pub slot: Option<EquipmentSlot>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_system(system: &str) -> AppResult<SystemNumber> {
    Ok(system.parse::<SystemNumber>()?)
}

fn parse_chain(chain: &str) -> AppResult<ChainKind> {
    Ok(chain.parse::<ChainKind>()?)
}

async fn load_manager(
    state: &AppState,
    project_id: ProjectId,
    system: SystemNumber,
) -> AppResult<ChainManager> {
    Ok(ChainManager::load(state.store.clone(), project_id, system).await?)
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/systems/{system}/bos
// ---------------------------------------------------------------------------

/// All chains of one system, with SMS placement and chain visibility.
pub async fn get_chains(
    State(state): State<AppState>,
    Path(path): Path<SystemPath>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let manager = load_manager(&state, path.project_id, system).await?;
    Ok(Json(DataResponse {
        data: manager.snapshot(),
    }))
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/systems/{system}/bos/{chain}/slots
// ---------------------------------------------------------------------------

/// Open a new slot from an upstream component or after an existing slot.
pub async fn insert_slot(
    State(state): State<AppState>,
    Path(path): Path<ChainPath>,
    Json(origin): Json<InsertOrigin>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let chain = parse_chain(&path.chain)?;

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    let position = manager.insert(chain, origin).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PositionResponse {
                position: Some(position),
                bos: manager.snapshot(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// PATCH /projects/{project_id}/systems/{system}/bos/{chain}/slots/{position}
// ---------------------------------------------------------------------------

/// Edit the picker fields of an occupied slot.
pub async fn update_slot(
    State(state): State<AppState>,
    Path(path): Path<SlotPath>,
    Json(patch): Json<SlotPatch>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let chain = parse_chain(&path.chain)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "At least one slot field must be provided".to_string(),
        ));
    }

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    manager.update_slot(chain, path.position, &patch).await?;

    Ok(Json(DataResponse {
        data: manager.snapshot(),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{project_id}/systems/{system}/bos/{chain}/slots/{position}
// ---------------------------------------------------------------------------

/// Remove a slot and compact the chain.
pub async fn remove_slot(
    State(state): State<AppState>,
    Path(path): Path<SlotPath>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let chain = parse_chain(&path.chain)?;

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    let removed = manager.remove(chain, path.position).await?;

    Ok(Json(DataResponse {
        data: RemovedResponse {
            removed,
            bos: manager.snapshot(),
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/systems/{system}/bos/{chain}/slots/{position}/move
// ---------------------------------------------------------------------------

/// Swap a slot with its neighbour.
pub async fn move_slot(
    State(state): State<AppState>,
    Path(path): Path<SlotPath>,
    Json(body): Json<MoveRequest>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let chain = parse_chain(&path.chain)?;

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    let position = manager
        .move_slot(chain, path.position, body.direction)
        .await?;

    Ok(Json(DataResponse {
        data: PositionResponse {
            position: Some(position),
            bos: manager.snapshot(),
        },
    }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{project_id}/systems/{system}/bos/{chain}/order
// ---------------------------------------------------------------------------

/// Set the full order of the occupied non-SMS slots.
pub async fn reorder(
    State(state): State<AppState>,
    Path(path): Path<ChainPath>,
    Json(body): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let chain = parse_chain(&path.chain)?;

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    manager.reorder(chain, &body.order).await?;

    Ok(Json(DataResponse {
        data: manager.snapshot(),
    }))
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/systems/{system}/bos/sms
// ---------------------------------------------------------------------------

/// Where the SMS sits and where it belongs.
pub async fn get_sms(
    State(state): State<AppState>,
    Path(path): Path<SystemPath>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    let manager = load_manager(&state, path.project_id, system).await?;
    let placement = manager.sms_placement();
    let slot = placement
        .current
        .map(|position| manager.slot(ChainKind::Main, position).cloned())
        .transpose()?;

    Ok(Json(DataResponse {
        data: SmsStatus { placement, slot },
    }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{project_id}/systems/{system}/bos/sms
// ---------------------------------------------------------------------------

/// Write the SMS into the main chain.
pub async fn place_sms(
    State(state): State<AppState>,
    Path(path): Path<SystemPath>,
    Json(equipment): Json<SmsEquipment>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;
    if equipment.make.trim().is_empty() || equipment.model.trim().is_empty() {
        return Err(AppError::BadRequest(
            "SMS make and model are required".to_string(),
        ));
    }

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    let position = manager.place_sms(&equipment).await?;

    Ok(Json(DataResponse {
        data: PositionResponse {
            position: Some(position),
            bos: manager.snapshot(),
        },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{project_id}/systems/{system}/bos/sms
// ---------------------------------------------------------------------------

/// Remove the SMS from the main chain.
pub async fn clear_sms(
    State(state): State<AppState>,
    Path(path): Path<SystemPath>,
) -> AppResult<impl IntoResponse> {
    let system = parse_system(&path.system)?;

    let _guard = state.locks.lock(path.project_id).await;
    let mut manager = load_manager(&state, path.project_id, system).await?;
    let position = manager.clear_sms().await?;

    Ok(Json(DataResponse {
        data: PositionResponse {
            position,
            bos: manager.snapshot(),
        },
    }))
}
