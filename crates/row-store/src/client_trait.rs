//! # RowClient Trait
//!
//! Provides a common interface for table-specific wrappers, adding default `fetch` and
//! `fetch_all` methods built on top of a generic `TableClient`.
use crate::{Row, StoreError, TableClient};
use async_trait::async_trait;

/// Trait for table-specific wrappers to inherit standard reads.
///
/// # Example
///
/// ```rust
/// use row_store::{Row, RowClient, StoreError, TableClient, Violation};
///
/// #[derive(Clone, Debug)]
/// struct Note { id: u32, text: String }
///
/// impl Row for Note {
///     type Key = u32;
///     type Patch = String;
///     const TABLE: &'static str = "notes";
///     fn key(&self) -> u32 { self.id }
///     fn apply(&mut self, text: String) -> Result<(), Violation> { self.text = text; Ok(()) }
/// }
///
/// #[derive(Debug)]
/// struct NoteError(String);
///
/// struct Notebook { inner: TableClient<Note> }
///
/// impl RowClient<Note> for Notebook {
///     type Error = NoteError;
///     fn table(&self) -> &TableClient<Note> { &self.inner }
///     fn map_error(e: StoreError) -> NoteError { NoteError(e.to_string()) }
/// }
///
/// async fn usage(notebook: Notebook) {
///     // fetch() and fetch_all() are provided automatically
///     let _ = notebook.fetch(1).await;
///     let _ = notebook.fetch_all().await;
/// }
/// ```
#[async_trait]
pub trait RowClient<R: Row>: Send + Sync {
    /// The wrapper-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic TableClient.
    fn table(&self) -> &TableClient<R>;

    /// Map store errors to the wrapper's error type.
    fn map_error(e: StoreError) -> Self::Error;

    /// Fetch one row by key.
    #[tracing::instrument(skip(self), fields(table = R::TABLE))]
    async fn fetch(&self, key: R::Key) -> Result<Option<R>, Self::Error> {
        tracing::debug!("Sending request");
        self.table().get(key).await.map_err(Self::map_error)
    }

    /// Fetch every row in key order.
    #[tracing::instrument(skip(self), fields(table = R::TABLE))]
    async fn fetch_all(&self) -> Result<Vec<R>, Self::Error> {
        tracing::debug!("Sending request");
        self.table().select(|_| true).await.map_err(Self::map_error)
    }
}
