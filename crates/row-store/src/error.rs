//! # Store Errors
//!
//! Error type shared by every table actor and client. Each variant carries the table
//! name and, where relevant, the offending key, column and value.

/// Errors that can occur within the row store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Table closed")]
    Closed,
    #[error("Table dropped response channel")]
    Dropped,
    /// Connectivity to the backing store was lost. Clients retry this one.
    #[error("Store unavailable")]
    Unavailable,
    #[error("Duplicate key {key} in table {table}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("Key {key} not found in table {table}")]
    MissingKey { table: &'static str, key: String },
    #[error("Row {key} in table {table} rejected {column} = {value}: {reason}")]
    Rejected {
        table: &'static str,
        key: String,
        column: &'static str,
        value: String,
        reason: String,
    },
}

impl StoreError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable)
    }
}
