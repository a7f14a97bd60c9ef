//! # Table Messages
//!
//! Request types sent from a [`TableClient`](crate::TableClient) to a
//! [`TableActor`](crate::TableActor).

use crate::error::StoreError;
use crate::row::Row;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by tables.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Row predicate used by filtered reads and deletes.
pub type Filter<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Count and newest stamp of the rows matching a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub count: usize,
    pub latest: Option<DateTime<Utc>>,
}

/// Internal message type sent to a table actor.
///
/// # Batched Writes
/// `Insert` and `Update` carry whole batches. The actor validates a batch in full
/// before touching its rows, so each batch either lands completely or not at all.
/// There is no transaction spanning two requests.
pub enum TableRequest<R: Row> {
    Insert {
        rows: Vec<R>,
        respond_to: Response<usize>,
    },
    Update {
        patches: Vec<(R::Key, R::Patch)>,
        respond_to: Response<Vec<R>>,
    },
    Delete {
        keys: Vec<R::Key>,
        respond_to: Response<usize>,
    },
    DeleteWhere {
        filter: Filter<R>,
        respond_to: Response<usize>,
    },
    Get {
        key: R::Key,
        respond_to: Response<Option<R>>,
    },
    Select {
        filter: Filter<R>,
        respond_to: Response<Vec<R>>,
    },
    Summarize {
        filter: Filter<R>,
        respond_to: Response<Summary>,
    },
    MaxKey {
        respond_to: Response<Option<R::Key>>,
    },
}

impl<R: Row> std::fmt::Debug for TableRequest<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRequest::Insert { rows, .. } => f.debug_struct("Insert").field("rows", rows).finish(),
            TableRequest::Update { patches, .. } => {
                f.debug_struct("Update").field("patches", patches).finish()
            }
            TableRequest::Delete { keys, .. } => f.debug_struct("Delete").field("keys", keys).finish(),
            TableRequest::DeleteWhere { .. } => f.write_str("DeleteWhere"),
            TableRequest::Get { key, .. } => f.debug_struct("Get").field("key", key).finish(),
            TableRequest::Select { .. } => f.write_str("Select"),
            TableRequest::Summarize { .. } => f.write_str("Summarize"),
            TableRequest::MaxKey { .. } => f.write_str("MaxKey"),
        }
    }
}
