#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Chain full: all {capacity} slots of the {chain} chain are occupied")]
    ChainFull { chain: &'static str, capacity: usize },

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
