//! # Row Trait
//!
//! The `Row` trait defines the contract every record type (orders, order items, menu
//! entries, tables, waiters) must implement to be held by a generic [`TableActor`](crate::TableActor).
//! It names the key type, the patch type used by batched updates, and the table name
//! used in error context and log lines.
//!
//! # Architecture Note
//! Writing the table loop once against this trait means every record type gets the
//! same batched insert/update/delete and filtered-read semantics. Associated types keep
//! it type safe: an `OrderRow` table only accepts `OrderPatch` updates.
//!
//! # Provided Methods
//! - [`Row::stamp`] returns `None` unless the row carries a last-modified time.

use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display};

/// Reason a row refused a patch.
///
/// Carries enough context (column and offending value) for a caller to render a
/// specific message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub column: &'static str,
    pub value: String,
    pub reason: String,
}

impl Violation {
    pub fn new(column: &'static str, value: impl Display, reason: impl Into<String>) -> Self {
        Self {
            column,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Trait that any record must implement to be stored in a [`TableActor`](crate::TableActor).
pub trait Row: Clone + Send + Sync + Debug + 'static {
    /// Primary key. Rows are kept in key order, so `select` results are ordered by it.
    type Key: Ord + Clone + Send + Sync + Display + Debug + 'static;

    /// A change to one row, applied by `update` batches.
    type Patch: Clone + Send + Sync + Debug + 'static;

    /// Table name used in errors and traces.
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;

    /// Apply a patch in place. Returning an error rejects the whole batch.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), Violation>;

    /// Last-modified time of the row, if it tracks one.
    ///
    /// Used by [`summarize`](crate::TableClient::summarize) to report the newest stamp
    /// among matching rows.
    fn stamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}
