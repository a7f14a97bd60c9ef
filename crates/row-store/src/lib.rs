//! # Row Store
//!
//! In-memory relational storage built from actors. Each table is a [`TableActor`] that
//! owns its rows and serves a [`TableClient`] over a Tokio channel, so a table is only
//! ever touched by one task and needs no locks.
//!
//! ## Layers
//!
//! 1. **Record Layer** ([`Row`]) - what a table holds: key, patch type and table name
//! 2. **Runtime Layer** ([`TableActor`]) - sequential request processing
//! 3. **Interface Layer** ([`TableClient`], [`RowClient`]) - typed, retrying access
//!
//! ## Batches
//!
//! `insert` and `update` take whole batches and apply them atomically: either every row
//! of the batch lands or the table is left untouched. Nothing spans two batches, so a
//! caller that writes to several tables (or to one table twice) sees each write succeed
//! or fail on its own.
//!
//! ## Failures
//!
//! Every call returns `Result<_, StoreError>`. [`StoreError::Unavailable`] is the one
//! transient failure; a client resends the request according to its [`RetryPolicy`]
//! and only surfaces the error once the attempts are spent. Constraint failures
//! ([`StoreError::DuplicateKey`], [`StoreError::MissingKey`], [`StoreError::Rejected`])
//! are returned immediately.
//!
//! ## Example
//!
//! ```rust
//! use row_store::{Row, TableActor, Violation};
//!
//! #[derive(Clone, Debug)]
//! struct Dish { id: u32, stock: u32 }
//!
//! impl Row for Dish {
//!     type Key = u32;
//!     type Patch = u32;
//!     const TABLE: &'static str = "dishes";
//!     fn key(&self) -> u32 { self.id }
//!     fn apply(&mut self, take: u32) -> Result<(), Violation> {
//!         self.stock = self.stock.checked_sub(take)
//!             .ok_or_else(|| Violation::new("stock", self.stock, "not enough stock"))?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, dishes) = TableActor::<Dish>::new(16);
//!     tokio::spawn(actor.run());
//!
//!     dishes.insert(vec![Dish { id: 1, stock: 2 }, Dish { id: 2, stock: 0 }]).await.unwrap();
//!
//!     // Taking from dish 2 fails, so dish 1 keeps its stock too.
//!     assert!(dishes.update(vec![(1, 1), (2, 1)]).await.is_err());
//!     assert_eq!(dishes.get(1).await.unwrap().unwrap().stock, 2);
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module scripts answers for a client, including transient failures,
//! without running a table.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod message;
pub mod mock;
pub mod row;
pub mod tracing;

pub use actor::TableActor;
pub use client::{RetryPolicy, TableClient};
pub use client_trait::RowClient;
pub use error::StoreError;
pub use message::{Filter, Response, Summary, TableRequest};
pub use row::{Row, Violation};
