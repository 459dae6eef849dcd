//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Requested rank falls outside the group's valid range.
    #[error("order {order} is out of range (0..={max})")]
    InvalidOrder { order: u32, max: u32 },

    /// Durable write failed after the in-memory state was already mutated.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Filesystem error while reading a collection file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Collection file could not be parsed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
