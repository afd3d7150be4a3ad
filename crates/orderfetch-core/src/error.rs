//! Core error types.

use thiserror::Error;

use crate::query::Strategy;

/// Core fetch errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A lazy reference was resolved with a scope other than the one that produced it.
    ///
    /// This is a usage fault and is never retried.
    #[error("stale reference: {entity} #{key} belongs to read scope {origin}, resolved in scope {current}")]
    StaleReference {
        /// Entity kind of the reference.
        entity: &'static str,
        /// Key of the referenced row.
        key: i64,
        /// Scope the reference was loaded in.
        origin: u64,
        /// Scope it was resolved with.
        current: u64,
    },

    /// Offset/limit requested with a strategy whose rows do not map 1:1 to roots.
    #[error("pagination is not supported by the {strategy} strategy: {reason}")]
    PaginationUnsupported {
        /// Offending strategy.
        strategy: Strategy,
        /// Explanation returned to the caller.
        reason: &'static str,
    },

    /// No connection became free within the acquire timeout.
    #[error("connection pool exhausted after {0:?}")]
    PoolExhausted(std::time::Duration),

    /// Record not found.
    #[error("record not found")]
    NotFound,

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
