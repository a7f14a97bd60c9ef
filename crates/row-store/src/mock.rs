//! # Mock Tables & Testing Guide
//!
//! The `MockTable<R>` type hands out a real [`TableClient<R>`] whose requests are answered
//! from a queue of scripted expectations instead of a running table. It lets tests inject
//! store failures (lost connectivity, rejected rows) that are hard to provoke on a real
//! table, without changing the code under test.
//!
//! ## When to use Mocks vs Real Tables
//!
//! | Feature | MockTable | Real TableActor |
//! |---------|-----------|-----------------|
//! | **State** | None (scripted answers) | Real rows |
//! | **Error Injection** | Easy (`return_err`) | Only constraint errors |
//! | **Use Case** | Failure paths, retry behaviour | Everything else |
//!
//! ## Example
//!
//! ```rust
//! use row_store::mock::MockTable;
//! use row_store::{Row, StoreError, Violation};
//!
//! #[derive(Clone, Debug)] struct Seat { id: u32 }
//! impl Row for Seat {
//!     type Key = u32; type Patch = ();
//!     const TABLE: &'static str = "seats";
//!     fn key(&self) -> u32 { self.id }
//!     fn apply(&mut self, _: ()) -> Result<(), Violation> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockTable::<Seat>::new();
//!     mock.expect_get().return_err(StoreError::Unavailable);
//!     mock.expect_get().return_ok(Some(Seat { id: 4 }));
//!
//!     // The client retries the transient failure and sees the second answer.
//!     let seat = mock.client().get(4).await.unwrap();
//!     assert_eq!(seat.unwrap().id, 4);
//!     mock.verify();
//! }
//! ```
//!
//! ## Raw Channel Helpers
//!
//! Use [`create_mock_table`] to get a client and the receiving end of its channel when a
//! test needs to inspect the request payload itself (for example the patches of an
//! update batch).

use crate::client::{RetryPolicy, TableClient};
use crate::error::StoreError;
use crate::message::{Summary, TableRequest};
use crate::row::Row;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted answer to the next request of the matching kind.
enum Expectation<R: Row> {
    Insert(Result<usize, StoreError>),
    Update(Result<Vec<R>, StoreError>),
    Delete(Result<usize, StoreError>),
    DeleteWhere(Result<usize, StoreError>),
    Get(Result<Option<R>, StoreError>),
    Select(Result<Vec<R>, StoreError>),
    Summarize(Result<Summary, StoreError>),
    MaxKey(Result<Option<R::Key>, StoreError>),
}

type Queue<R> = Arc<Mutex<VecDeque<Expectation<R>>>>;

/// A mock table with expectation tracking for fluent testing.
///
/// Expectations are consumed in order; a request that does not match the kind of the
/// next expectation panics the mock task, which surfaces in the test as
/// [`StoreError::Dropped`].
pub struct MockTable<R: Row> {
    client: TableClient<R>,
    expectations: Queue<R>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<R: Row> Default for MockTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> MockTable<R> {
    /// Creates a new mock table with no expectations.
    ///
    /// The handed-out client retries transient errors three times with no backoff.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<TableRequest<R>>(100);
        let expectations: Queue<R> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (TableRequest::Insert { respond_to, .. }, Some(Expectation::Insert(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (TableRequest::Update { respond_to, .. }, Some(Expectation::Update(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (TableRequest::Delete { respond_to, .. }, Some(Expectation::Delete(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        TableRequest::DeleteWhere { respond_to, .. },
                        Some(Expectation::DeleteWhere(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (TableRequest::Get { respond_to, .. }, Some(Expectation::Get(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (TableRequest::Select { respond_to, .. }, Some(Expectation::Select(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        TableRequest::Summarize { respond_to, .. },
                        Some(Expectation::Summarize(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (TableRequest::MaxKey { respond_to }, Some(Expectation::MaxKey(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (request, _) => {
                        panic!("Unexpected request on {}: {:?}", R::TABLE, request);
                    }
                }
            }
        });

        let retry = RetryPolicy {
            attempts: 3,
            backoff: Duration::ZERO,
        };
        Self {
            client: TableClient::new(sender).with_retry(retry),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> TableClient<R> {
        self.client.clone()
    }

    fn builder<T>(&self, wrap: fn(Result<T, StoreError>) -> Expectation<R>) -> ExpectationBuilder<R, T> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap,
        }
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<R, usize> {
        self.builder(Expectation::Insert)
    }

    pub fn expect_update(&mut self) -> ExpectationBuilder<R, Vec<R>> {
        self.builder(Expectation::Update)
    }

    pub fn expect_delete(&mut self) -> ExpectationBuilder<R, usize> {
        self.builder(Expectation::Delete)
    }

    pub fn expect_delete_where(&mut self) -> ExpectationBuilder<R, usize> {
        self.builder(Expectation::DeleteWhere)
    }

    pub fn expect_get(&mut self) -> ExpectationBuilder<R, Option<R>> {
        self.builder(Expectation::Get)
    }

    pub fn expect_select(&mut self) -> ExpectationBuilder<R, Vec<R>> {
        self.builder(Expectation::Select)
    }

    pub fn expect_summarize(&mut self) -> ExpectationBuilder<R, Summary> {
        self.builder(Expectation::Summarize)
    }

    pub fn expect_max_key(&mut self) -> ExpectationBuilder<R, Option<R::Key>> {
        self.builder(Expectation::MaxKey)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder<R: Row, T> {
    expectations: Queue<R>,
    wrap: fn(Result<T, StoreError>) -> Expectation<R>,
}

impl<R: Row, T> ExpectationBuilder<R, T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.expectations.lock().unwrap().push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.expectations.lock().unwrap().push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The client does not retry, so every request shows up on the receiver exactly once.
pub fn create_mock_table<R: Row>(
    buffer_size: usize,
) -> (TableClient<R>, mpsc::Receiver<TableRequest<R>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let retry = RetryPolicy {
        attempts: 1,
        backoff: Duration::ZERO,
    };
    (TableClient::new(sender).with_retry(retry), receiver)
}

/// Helper to take the next message if it is an Update request.
pub async fn expect_update<R: Row>(
    receiver: &mut mpsc::Receiver<TableRequest<R>>,
) -> Option<(
    Vec<(R::Key, R::Patch)>,
    oneshot::Sender<Result<Vec<R>, StoreError>>,
)> {
    match receiver.recv().await {
        Some(TableRequest::Update {
            patches,
            respond_to,
        }) => Some((patches, respond_to)),
        _ => None,
    }
}

/// Helper to take the next message if it is a Get request.
pub async fn expect_get<R: Row>(
    receiver: &mut mpsc::Receiver<TableRequest<R>>,
) -> Option<(R::Key, oneshot::Sender<Result<Option<R>, StoreError>>)> {
    match receiver.recv().await {
        Some(TableRequest::Get { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Violation;

    #[derive(Clone, Debug, PartialEq)]
    struct Seat {
        id: u32,
        taken: bool,
    }

    impl Row for Seat {
        type Key = u32;
        type Patch = bool;
        const TABLE: &'static str = "seats";

        fn key(&self) -> u32 {
            self.id
        }

        fn apply(&mut self, taken: bool) -> Result<(), Violation> {
            self.taken = taken;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_channel_sees_update_payload() {
        let (client, mut receiver) = create_mock_table::<Seat>(10);

        let task = tokio::spawn(async move { client.update(vec![(3, true)]).await });

        let (patches, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(patches, vec![(3, true)]);
        responder
            .send(Ok(vec![Seat { id: 3, taken: true }]))
            .unwrap();

        let rows = task.await.unwrap().unwrap();
        assert!(rows[0].taken);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried_until_exhausted() {
        let mut mock = MockTable::<Seat>::new();
        mock.expect_max_key().return_err(StoreError::Unavailable);
        mock.expect_max_key().return_ok(Some(9));
        for _ in 0..3 {
            mock.expect_insert().return_err(StoreError::Unavailable);
        }

        let client = mock.client();
        assert_eq!(client.max_key().await.unwrap(), Some(9));
        assert_eq!(
            client.insert(vec![Seat { id: 1, taken: false }]).await,
            Err(StoreError::Unavailable)
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let mut mock = MockTable::<Seat>::new();
        mock.expect_insert().return_err(StoreError::DuplicateKey {
            table: "seats",
            key: "1".to_string(),
        });

        let result = mock.client().insert(vec![Seat { id: 1, taken: false }]).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        mock.verify();
    }
}
