pub mod health;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects/{project_id}/system-details                         get, patch
/// /projects/{project_id}/systems/{system}/bos                   get
/// /projects/{project_id}/systems/{system}/bos/sms               get, put, delete
/// /projects/{project_id}/systems/{system}/bos/{chain}/slots     post
/// /projects/{project_id}/systems/{system}/bos/{chain}/slots/{position}
///                                                               patch, delete
/// /projects/{project_id}/systems/{system}/bos/{chain}/slots/{position}/move
///                                                               post
/// /projects/{project_id}/systems/{system}/bos/{chain}/order     put
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", projects::router())
}
