//! # Generic Table Client
//!
//! This module defines the client used to talk to a [`TableActor`](crate::TableActor).

use crate::error::StoreError;
use crate::message::{Filter, Response, Summary, TableRequest};
use crate::row::Row;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// How many times a client tries a request that failed with a transient error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Values below 1 behave as 1.
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// ## TableClient
///
/// The `TableClient<R>` provides a type-safe, async API for a `TableActor<R>`. It
/// forwards requests over a Tokio mpsc channel and returns results via oneshot channels.
/// The client is cheap to clone and can be shared across tasks.
///
/// * **Cloneable** – holds only a sender and a retry policy.
/// * **Retrying** – requests failing with [`StoreError::Unavailable`] are resent up to
///   [`RetryPolicy::attempts`] times before the error is surfaced.
/// * **Generic** – works with any row type that implements `Row`.
pub struct TableClient<R: Row> {
    sender: mpsc::Sender<TableRequest<R>>,
    retry: RetryPolicy,
}

impl<R: Row> Clone for TableClient<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            retry: self.retry,
        }
    }
}

impl<R: Row> TableClient<R> {
    pub fn new(sender: mpsc::Sender<TableRequest<R>>) -> Self {
        Self {
            sender,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn call<T>(
        &self,
        make: impl Fn(Response<T>) -> TableRequest<R>,
    ) -> Result<T, StoreError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            let (respond_to, response) = oneshot::channel();
            self.sender
                .send(make(respond_to))
                .await
                .map_err(|_| StoreError::Closed)?;
            match response.await.map_err(|_| StoreError::Dropped)? {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(table = R::TABLE, attempt, error = %e, "Retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry.backoff).await;
                }
                result => return result,
            }
        }
    }

    pub async fn insert(&self, rows: Vec<R>) -> Result<usize, StoreError> {
        self.call(|respond_to| TableRequest::Insert {
            rows: rows.clone(),
            respond_to,
        })
        .await
    }

    /// Applies a batch of patches. Returns the rows as they are after the batch.
    pub async fn update(&self, patches: Vec<(R::Key, R::Patch)>) -> Result<Vec<R>, StoreError> {
        self.call(|respond_to| TableRequest::Update {
            patches: patches.clone(),
            respond_to,
        })
        .await
    }

    /// Deletes the given keys. Absent keys are skipped; returns how many rows went.
    pub async fn delete(&self, keys: Vec<R::Key>) -> Result<usize, StoreError> {
        self.call(|respond_to| TableRequest::Delete {
            keys: keys.clone(),
            respond_to,
        })
        .await
    }

    pub async fn delete_where<F>(&self, filter: F) -> Result<usize, StoreError>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        let filter: Filter<R> = Arc::new(filter);
        self.call(|respond_to| TableRequest::DeleteWhere {
            filter: filter.clone(),
            respond_to,
        })
        .await
    }

    pub async fn get(&self, key: R::Key) -> Result<Option<R>, StoreError> {
        self.call(|respond_to| TableRequest::Get {
            key: key.clone(),
            respond_to,
        })
        .await
    }

    /// Returns every row matching `filter`, in key order.
    pub async fn select<F>(&self, filter: F) -> Result<Vec<R>, StoreError>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        let filter: Filter<R> = Arc::new(filter);
        self.call(|respond_to| TableRequest::Select {
            filter: filter.clone(),
            respond_to,
        })
        .await
    }

    /// Counts the rows matching `filter` and reports the newest [`Row::stamp`] among them.
    pub async fn summarize<F>(&self, filter: F) -> Result<Summary, StoreError>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        let filter: Filter<R> = Arc::new(filter);
        self.call(|respond_to| TableRequest::Summarize {
            filter: filter.clone(),
            respond_to,
        })
        .await
    }

    pub async fn max_key(&self) -> Result<Option<R::Key>, StoreError> {
        self.call(|respond_to| TableRequest::MaxKey { respond_to }).await
    }
}
