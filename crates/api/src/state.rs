use std::sync::Arc;

use solarbos_core::DocumentStore;

use crate::config::ServerConfig;
use crate::locks::ProjectLocks;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Authoritative system details documents (PostgreSQL or in-memory).
    pub store: Arc<dyn DocumentStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Serializes document mutations per project.
    pub locks: Arc<ProjectLocks>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            locks: Arc::new(ProjectLocks::default()),
        }
    }
}
