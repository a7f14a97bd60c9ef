//! # Generic Table Server
//!
//! This module defines the `TableActor`, the component that owns the rows of one table.
//! It implements the "Server" side of the Actor Model, processing requests sequentially
//! and ensuring exclusive access to its rows.

use crate::client::{RetryPolicy, TableClient};
use crate::error::StoreError;
use crate::message::{Summary, TableRequest};
use crate::row::Row;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that owns the rows of one table.
///
/// # Architecture Note
/// This struct is the "Server" half of a table. It owns the rows and the receiver end
/// of the channel. Requests are handled one at a time, so the rows need no `Mutex`.
///
/// Rows are kept in a `BTreeMap`, which makes `select` results come back in key order
/// and makes `max_key` cheap.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `TableActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Run**: Spawn the actor's run loop in a background task.
/// 3.  **Use**: Clone the client into whoever needs the table.
///
/// ```rust
/// use row_store::{Row, TableActor, Violation};
///
/// #[derive(Clone, Debug)]
/// struct Counter { id: u32, hits: u32 }
///
/// impl Row for Counter {
///     type Key = u32;
///     type Patch = u32;
///     const TABLE: &'static str = "counters";
///     fn key(&self) -> u32 { self.id }
///     fn apply(&mut self, add: u32) -> Result<(), Violation> { self.hits += add; Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = TableActor::<Counter>::new(10);
///     tokio::spawn(actor.run());
///
///     client.insert(vec![Counter { id: 1, hits: 0 }]).await.unwrap();
///     client.update(vec![(1, 5)]).await.unwrap();
///     assert_eq!(client.get(1).await.unwrap().unwrap().hits, 5);
/// }
/// ```
///
/// # Operations
///
/// * **Insert**: rejects the whole batch with `DuplicateKey` if any key is already
///   present or repeats inside the batch.
/// * **Update**: stages patched copies of every touched row; a missing key or a
///   rejected patch discards the staging area, otherwise all copies are committed.
/// * **Delete / DeleteWhere**: remove what is present and report how many rows went.
/// * **Get / Select / Summarize / MaxKey**: reads.
pub struct TableActor<R: Row> {
    receiver: mpsc::Receiver<TableRequest<R>>,
    rows: BTreeMap<R::Key, R>,
}

impl<R: Row> TableActor<R> {
    /// Creates a new `TableActor` and its associated `TableClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, TableClient<R>) {
        Self::with_retry(buffer_size, RetryPolicy::default())
    }

    /// Same as [`TableActor::new`] but hands out a client using the given retry policy.
    pub fn with_retry(buffer_size: usize, retry: RetryPolicy) -> (Self, TableClient<R>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            rows: BTreeMap::new(),
        };
        (actor, TableClient::new(sender).with_retry(retry))
    }

    /// Runs the table's event loop, processing requests until every client is dropped.
    pub async fn run(mut self) {
        let table = R::TABLE;
        info!(table, "Table started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TableRequest::Insert { rows, respond_to } => {
                    debug!(table, ?rows, "Insert");
                    let result = self.insert(rows);
                    match &result {
                        Ok(n) => info!(table, inserted = n, size = self.rows.len(), "Inserted"),
                        Err(e) => warn!(table, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                TableRequest::Update {
                    patches,
                    respond_to,
                } => {
                    debug!(table, ?patches, "Update");
                    let result = self.update(patches);
                    match &result {
                        Ok(rows) => info!(table, updated = rows.len(), "Updated"),
                        Err(e) => warn!(table, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                TableRequest::Delete { keys, respond_to } => {
                    debug!(table, ?keys, "Delete");
                    let removed = keys
                        .iter()
                        .filter(|key| self.rows.remove(*key).is_some())
                        .count();
                    info!(table, removed, size = self.rows.len(), "Deleted");
                    let _ = respond_to.send(Ok(removed));
                }
                TableRequest::DeleteWhere { filter, respond_to } => {
                    let before = self.rows.len();
                    self.rows.retain(|_, row| !filter(row));
                    let removed = before - self.rows.len();
                    info!(table, removed, size = self.rows.len(), "Deleted where");
                    let _ = respond_to.send(Ok(removed));
                }
                TableRequest::Get { key, respond_to } => {
                    let row = self.rows.get(&key).cloned();
                    debug!(table, %key, found = row.is_some(), "Get");
                    let _ = respond_to.send(Ok(row));
                }
                TableRequest::Select { filter, respond_to } => {
                    let rows: Vec<R> = self.rows.values().filter(|row| filter(row)).cloned().collect();
                    debug!(table, matched = rows.len(), "Select");
                    let _ = respond_to.send(Ok(rows));
                }
                TableRequest::Summarize { filter, respond_to } => {
                    let summary = self
                        .rows
                        .values()
                        .filter(|row| filter(row))
                        .fold(Summary::default(), |acc, row| Summary {
                            count: acc.count + 1,
                            latest: acc.latest.max(row.stamp()),
                        });
                    debug!(table, count = summary.count, "Summarize");
                    let _ = respond_to.send(Ok(summary));
                }
                TableRequest::MaxKey { respond_to } => {
                    let key = self.rows.keys().next_back().cloned();
                    let _ = respond_to.send(Ok(key));
                }
            }
        }

        info!(table, size = self.rows.len(), "Shutdown");
    }

    fn insert(&mut self, rows: Vec<R>) -> Result<usize, StoreError> {
        let mut staged: BTreeMap<R::Key, R> = BTreeMap::new();
        for row in rows {
            let key = row.key();
            if self.rows.contains_key(&key) || staged.contains_key(&key) {
                return Err(StoreError::DuplicateKey {
                    table: R::TABLE,
                    key: key.to_string(),
                });
            }
            staged.insert(key, row);
        }
        let inserted = staged.len();
        self.rows.append(&mut staged);
        Ok(inserted)
    }

    fn update(&mut self, patches: Vec<(R::Key, R::Patch)>) -> Result<Vec<R>, StoreError> {
        let mut staged: BTreeMap<R::Key, R> = BTreeMap::new();
        for (key, patch) in patches {
            let row = match staged.entry(key.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let current = self.rows.get(&key).ok_or_else(|| StoreError::MissingKey {
                        table: R::TABLE,
                        key: key.to_string(),
                    })?;
                    entry.insert(current.clone())
                }
            };
            row.apply(patch).map_err(|v| StoreError::Rejected {
                table: R::TABLE,
                key: key.to_string(),
                column: v.column,
                value: v.value,
                reason: v.reason,
            })?;
        }
        let updated: Vec<R> = staged.values().cloned().collect();
        self.rows.append(&mut staged);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Violation;

    #[derive(Clone, Debug, PartialEq)]
    struct Shelf {
        id: u32,
        stock: u32,
    }

    impl Row for Shelf {
        type Key = u32;
        type Patch = u32;
        const TABLE: &'static str = "shelves";

        fn key(&self) -> u32 {
            self.id
        }

        fn apply(&mut self, take: u32) -> Result<(), Violation> {
            if take > self.stock {
                return Err(Violation::new("stock", self.stock, "not enough stock"));
            }
            self.stock -= take;
            Ok(())
        }
    }

    fn shelf(id: u32, stock: u32) -> Shelf {
        Shelf { id, stock }
    }

    fn spawn() -> TableClient<Shelf> {
        let (actor, client) = TableActor::<Shelf>::new(8);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_insert_batch_is_all_or_nothing() {
        let client = spawn();
        client.insert(vec![shelf(1, 5)]).await.unwrap();

        let err = client
            .insert(vec![shelf(2, 1), shelf(1, 9)])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                table: "shelves",
                key: "1".to_string()
            }
        );
        assert!(client.get(2).await.unwrap().is_none());
        assert_eq!(client.get(1).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_update_batch_rejects_without_partial_commit() {
        let client = spawn();
        client.insert(vec![shelf(1, 5), shelf(2, 1)]).await.unwrap();

        let err = client.update(vec![(1, 2), (2, 3)]).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { column: "stock", .. }));
        assert_eq!(client.get(1).await.unwrap().unwrap().stock, 5);

        let err = client.update(vec![(1, 1), (7, 1)]).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
        assert_eq!(client.get(1).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_update_same_key_twice_accumulates() {
        let client = spawn();
        client.insert(vec![shelf(1, 5)]).await.unwrap();

        let updated = client.update(vec![(1, 2), (1, 2)]).await.unwrap();
        assert_eq!(updated, vec![shelf(1, 1)]);

        assert!(client.update(vec![(1, 1), (1, 1)]).await.is_err());
        assert_eq!(client.get(1).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_reads_and_deletes() {
        let client = spawn();
        client
            .insert(vec![shelf(3, 0), shelf(1, 4), shelf(2, 7)])
            .await
            .unwrap();

        let stocked = client.select(|s: &Shelf| s.stock > 0).await.unwrap();
        assert_eq!(stocked, vec![shelf(1, 4), shelf(2, 7)]);
        assert_eq!(client.max_key().await.unwrap(), Some(3));

        let summary = client.summarize(|s: &Shelf| s.stock > 0).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.latest, None);

        assert_eq!(client.delete(vec![1, 9]).await.unwrap(), 1);
        assert_eq!(client.delete_where(|s: &Shelf| s.stock == 0).await.unwrap(), 1);
        assert_eq!(client.select(|_: &Shelf| true).await.unwrap(), vec![shelf(2, 7)]);
    }
}
