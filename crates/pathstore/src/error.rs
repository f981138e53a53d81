//! Error types for store operations.

use pathstore_path::PathError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A store was requested from a scope that was never given one.
    #[error("no active store: the scope was used before a store was provided")]
    NoActiveStore,

    /// `set` and `delete` address a key, so they need at least one segment.
    #[error("{op} requires a non-empty path")]
    EmptyPath { op: &'static str },

    /// A snapshot root or merge payload was not a map.
    #[error("expected a map, found {found}")]
    RootNotMap { found: &'static str },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
