//! Error taxonomy for board operations.
//!
//! Unknown task ids are deliberately absent: update/delete on a missing id is
//! a silent no-op, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    /// Required fields missing on add. Nothing was mutated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A guarded mutation was attempted inside the lockout window.
    #[error("board is locked for another {remaining_secs}s")]
    LockedOut { remaining_secs: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid board id: {0:?}")]
    InvalidId(String),

    #[error("board storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed board document: {0}")]
    Json(#[from] serde_json::Error),
}
