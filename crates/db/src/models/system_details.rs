//! Row struct for the `system_details` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use solarbos_core::types::{Document, ProjectId};
use sqlx::FromRow;

/// A system_details row from the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemDetails {
    pub project_id: ProjectId,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SystemDetails {
    /// The stored document. The table constrains `details` to an object, so
    /// anything else reads as empty.
    pub fn into_document(self) -> Document {
        match self.details {
            serde_json::Value::Object(map) => map,
            _ => Document::new(),
        }
    }
}
