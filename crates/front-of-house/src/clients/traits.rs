//! # Collaborator Seams
//!
//! The order desk needs a menu to rebuild orders and take stock, and the seating desk
//! needs to know who is on duty. Both are reached through these traits so the desks
//! can be driven by in-process tables ([`MenuCatalog`](crate::clients::MenuCatalog),
//! [`StaffRoster`](crate::clients::StaffRoster)) or by fakes in tests.

use crate::model::{ItemId, MenuItem, Order, WaiterId};
use async_trait::async_trait;
use row_store::StoreError;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown menu item: {0}")]
    UnknownItem(ItemId),

    #[error("Insufficient stock of {item}: requested {requested}, available {available}")]
    OutOfStock {
        item: ItemId,
        requested: u32,
        available: u32,
    },

    #[error("Menu store error: {0}")]
    StoreFailure(#[from] StoreError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RosterError {
    #[error("Unknown waiter: {0}")]
    UnknownWaiter(WaiterId),

    #[error("Staff store error: {0}")]
    StoreFailure(#[from] StoreError),
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up every id; fails with `UnknownItem` on the first one missing.
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<MenuItem>, CatalogError>;

    /// Current stock of each distinct item on `order`.
    async fn occurrence_stock(&self, order: &Order) -> Result<BTreeMap<ItemId, u32>, CatalogError>;

    /// Takes one unit of stock per item occurrence. Either every item is taken or none.
    async fn decrement_stock(&self, order: &Order) -> Result<(), CatalogError>;
}

#[async_trait]
pub trait WaiterRoster: Send + Sync {
    /// Ids of waiters currently on duty, sorted by id.
    async fn logged_in_waiter_ids(&self) -> Result<Vec<WaiterId>, RosterError>;
}
