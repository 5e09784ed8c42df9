//! Error types for in-memory store operations.

use thiserror::Error;

/// Errors that can occur during `MemStore` operations.
#[derive(Error, Debug)]
pub enum MemStoreError {
    /// No row with the given id in the given table (for this user).
    #[error("no {table} row with id {id}")]
    RowNotFound {
        /// Table the lookup ran against.
        table: &'static str,
        /// Stringified record id.
        id: String,
    },

    /// A column constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(&'static str),

    /// A failure queued by [`MemStore::fail_once`](crate::MemStore::fail_once).
    #[error("injected failure for {0}")]
    Injected(String),
}
