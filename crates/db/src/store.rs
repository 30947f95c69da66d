//! [`DocumentStore`] backed by PostgreSQL.

use async_trait::async_trait;
use solarbos_core::error::CoreError;
use solarbos_core::store::DocumentStore;
use solarbos_core::types::{Document, ProjectId};

use crate::repositories::SystemDetailsRepo;
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn store_error(project_id: ProjectId, operation: &str, e: sqlx::Error) -> CoreError {
    tracing::error!(project_id, operation, error = %e, "System details query failed");
    CoreError::Store(format!("{operation} failed: {e}"))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch_system_details(&self, project_id: ProjectId) -> Result<Document, CoreError> {
        SystemDetailsRepo::fetch_document(&self.pool, project_id)
            .await
            .map_err(|e| store_error(project_id, "fetch", e))
    }

    async fn save_system_details_partial_exact(
        &self,
        project_id: ProjectId,
        patch: &Document,
    ) -> Result<(), CoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        SystemDetailsRepo::save_partial_exact(&self.pool, project_id, patch)
            .await
            .map_err(|e| store_error(project_id, "save", e))?;
        tracing::debug!(project_id, count = patch.len(), "Saved system details fields");
        Ok(())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| CoreError::Store(e.to_string()))
    }
}
