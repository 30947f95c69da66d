//! Per-project mutation locks.
//!
//! Every chain mutation reads the project document, computes a patch and
//! writes it back. Two such cycles on the same project must not interleave,
//! or the later write is computed from a stale read.

use std::collections::HashMap;
use std::sync::Arc;

use solarbos_core::ProjectId;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    /// Wait for exclusive access to `project_id`. Released when the guard
    /// drops.
    pub async fn lock(&self, project_id: ProjectId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(project_id).or_default())
        };
        lock.lock_owned().await
    }
}
