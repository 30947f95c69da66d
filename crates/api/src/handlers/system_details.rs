//! Handlers for the raw system details document.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use solarbos_core::{Document, ProjectId};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/system-details
// ---------------------------------------------------------------------------

/// Every field of the project's document. Unknown projects read as empty.
pub async fn get_document(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<impl IntoResponse> {
    let document = state.store.fetch_system_details(project_id).await?;

    tracing::debug!(project_id, count = document.len(), "Fetched system details");

    Ok(Json(DataResponse { data: document }))
}

// ---------------------------------------------------------------------------
// PATCH /projects/{project_id}/system-details
// ---------------------------------------------------------------------------

/// Partial exact write: listed fields are set, fields set to null are
/// cleared, everything else is left alone. Returns the updated document.
pub async fn patch_document(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(patch): Json<Document>,
) -> AppResult<impl IntoResponse> {
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "Patch must contain at least one field".to_string(),
        ));
    }

    let _guard = state.locks.lock(project_id).await;
    state
        .store
        .save_system_details_partial_exact(project_id, &patch)
        .await?;
    let document = state.store.fetch_system_details(project_id).await?;

    tracing::info!(project_id, count = patch.len(), "System details patched");

    Ok(Json(DataResponse { data: document }))
}
