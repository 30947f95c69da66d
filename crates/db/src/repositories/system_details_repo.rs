//! Repository for the `system_details` table.

use solarbos_core::types::{Document, ProjectId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::system_details::SystemDetails;

/// Column list for system_details queries.
const COLUMNS: &str = "project_id, details, created_at, updated_at";

/// Reads and partially writes a project's system details document.
pub struct SystemDetailsRepo;

impl SystemDetailsRepo {
    /// Find the row for a project.
    pub async fn find_by_project(
        pool: &PgPool,
        project_id: ProjectId,
    ) -> Result<Option<SystemDetails>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_details WHERE project_id = $1");
        sqlx::query_as::<_, SystemDetails>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// The project's document, empty when no row exists yet.
    pub async fn fetch_document(
        pool: &PgPool,
        project_id: ProjectId,
    ) -> Result<Document, sqlx::Error> {
        Ok(Self::find_by_project(pool, project_id)
            .await?
            .map(SystemDetails::into_document)
            .unwrap_or_default())
    }

    /// Merge `patch` into the document, dropping keys set to null. Creates
    /// the row on first write.
    pub async fn save_partial_exact(
        pool: &PgPool,
        project_id: ProjectId,
        patch: &Document,
    ) -> Result<SystemDetails, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_details (project_id, details) \
             VALUES ($1, jsonb_strip_nulls($2::jsonb)) \
             ON CONFLICT (project_id) DO UPDATE SET \
                details    = jsonb_strip_nulls(system_details.details || $2::jsonb), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemDetails>(&query)
            .bind(project_id)
            .bind(Json(patch))
            .fetch_one(pool)
            .await
    }

    /// Delete a project's document. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, project_id: ProjectId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM system_details WHERE project_id = $1")
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
