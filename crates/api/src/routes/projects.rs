//! Route definitions for the `/projects` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{bos, system_details};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /{project_id}/system-details                               -> system_details::get_document
/// PATCH  /{project_id}/system-details                               -> system_details::patch_document
///
/// GET    /{project_id}/systems/{system}/bos                         -> bos::get_chains
/// GET    /{project_id}/systems/{system}/bos/sms                     -> bos::get_sms
/// PUT    /{project_id}/systems/{system}/bos/sms                     -> bos::place_sms
/// DELETE /{project_id}/systems/{system}/bos/sms                     -> bos::clear_sms
/// POST   /{project_id}/systems/{system}/bos/{chain}/slots           -> bos::insert_slot
/// PATCH  /{project_id}/systems/{system}/bos/{chain}/slots/{position}      -> bos::update_slot
/// DELETE /{project_id}/systems/{system}/bos/{chain}/slots/{position}      -> bos::remove_slot
/// POST   /{project_id}/systems/{system}/bos/{chain}/slots/{position}/move -> bos::move_slot
/// PUT    /{project_id}/systems/{system}/bos/{chain}/order           -> bos::reorder
/// ```
pub fn router() -> Router<AppState> {
    let bos_routes = Router::new()
        .route("/", get(bos::get_chains))
        .route(
            "/sms",
            get(bos::get_sms).put(bos::place_sms).delete(bos::clear_sms),
        )
        .route("/{chain}/slots", post(bos::insert_slot))
        .route(
            "/{chain}/slots/{position}",
            patch(bos::update_slot).delete(bos::remove_slot),
        )
        .route("/{chain}/slots/{position}/move", post(bos::move_slot))
        .route("/{chain}/order", put(bos::reorder));

    Router::new()
        .route(
            "/{project_id}/system-details",
            get(system_details::get_document).patch(system_details::patch_document),
        )
        .nest("/{project_id}/systems/{system}/bos", bos_routes)
}
