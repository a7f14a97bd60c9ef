//! Error types for the seating desk.

use row_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeatingError {
    #[error("Table {table} is outside 1..={max}")]
    OutOfRange { table: u32, max: u32 },

    /// The waiter roster could not be read.
    #[error("Roster unavailable: {0}")]
    Roster(String),

    #[error("Table store error: {0}")]
    StoreFailure(#[from] StoreError),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
