//! Error types for the order desk.

use crate::clients::CatalogError;
use crate::model::{ItemId, OrderId, OrderState};
use row_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The order has no id, so it cannot have been stored yet.
    #[error("Order has not been created")]
    Unsaved,

    /// An order with this id is already stored. Retry as a modification.
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// The highest stored id is the largest possible one; pass an explicit id instead.
    #[error("No order id left after {0}")]
    IdsExhausted(OrderId),

    #[error("Order has no items")]
    MissingItems,

    #[error("Table {table} is outside 1..={max}")]
    OutOfRange { table: u32, max: u32 },

    #[error("Unknown menu item: {0}")]
    UnknownItem(ItemId),

    #[error("Insufficient stock of {item}: requested {requested}, available {available}")]
    OutOfStock {
        item: ItemId,
        requested: u32,
        available: u32,
    },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderState, to: OrderState },

    /// A read or write against the backing tables failed.
    #[error("Order store error: {0}")]
    StoreFailure(#[from] StoreError),

    /// An error occurred while communicating with the order desk.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<CatalogError> for OrderError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownItem(item) => OrderError::UnknownItem(item),
            CatalogError::OutOfStock {
                item,
                requested,
                available,
            } => OrderError::OutOfStock {
                item,
                requested,
                available,
            },
            CatalogError::StoreFailure(e) => OrderError::StoreFailure(e),
        }
    }
}
