// Error taxonomy for store operations

use thiserror::Error;

/// Errors surfaced by [`crate::TaskStore`] operations.
///
/// `Validation` and `NotFound` are recoverable: the operation aborts
/// before any write, so the store and the backup slot are untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input, e.g. an empty title or an unknown enum value.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No task with the given id exists in the store.
    #[error("no task with id {0}")]
    NotFound(i64),

    /// SQLite failure reading or writing the durable store.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure (backup slot, CSV destination).
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
