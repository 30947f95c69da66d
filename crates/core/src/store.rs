//! Persistence seam for the flat "system details" document.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::merge_patch;
use crate::error::CoreError;
use crate::types::{Document, ProjectId};

/// Authoritative store of one flat key-value document per project.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read every field of a project's document. An unknown project yields
    /// an empty document.
    async fn fetch_system_details(&self, project_id: ProjectId) -> Result<Document, CoreError>;

    /// Write a partial set of fields. A null value clears the field.
    async fn save_system_details_partial_exact(
        &self,
        project_id: ProjectId,
        patch: &Document,
    ) -> Result<(), CoreError>;

    /// Reachability check for health reporting.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<ProjectId, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project's document, replacing anything stored.
    pub async fn insert(&self, project_id: ProjectId, document: Document) {
        self.documents.write().await.insert(project_id, document);
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn fetch_system_details(&self, project_id: ProjectId) -> Result<Document, CoreError> {
        Ok(self
            .documents
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_system_details_partial_exact(
        &self,
        project_id: ProjectId,
        patch: &Document,
    ) -> Result<(), CoreError> {
        let mut documents = self.documents.write().await;
        merge_patch(documents.entry(project_id).or_default(), patch);
        Ok(())
    }
}
