//! Stored shape of an order.
//!
//! An order is split across two tables: one [`OrderRow`] header and one
//! [`OrderItemRow`] per distinct item carrying its count.

use crate::model::{ItemId, OrderId, OrderState};
use chrono::{DateTime, Utc};
use row_store::{Row, Violation};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub table: u32,
    pub ordered_at: DateTime<Utc>,
    /// Status code, see [`OrderState::code`].
    pub status: String,
    pub status_changed_at: DateTime<Utc>,
    pub paid: bool,
}

impl OrderRow {
    pub fn state(&self) -> OrderState {
        OrderState::from_code(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPatch {
    Table(u32),
    Status { state: OrderState, at: DateTime<Utc> },
    Paid(bool),
}

impl Row for OrderRow {
    type Key = OrderId;
    type Patch = OrderPatch;
    const TABLE: &'static str = "orders";

    fn key(&self) -> OrderId {
        self.id
    }

    fn apply(&mut self, patch: OrderPatch) -> Result<(), Violation> {
        match patch {
            OrderPatch::Table(table) => self.table = table,
            OrderPatch::Status { state, at } => {
                self.status = state.code().to_string();
                self.status_changed_at = at;
            }
            OrderPatch::Paid(paid) => self.paid = paid,
        }
        Ok(())
    }

    fn stamp(&self) -> Option<DateTime<Utc>> {
        Some(self.status_changed_at)
    }
}

/// Key of an `order_items` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub order: OrderId,
    pub item: ItemId,
}

impl Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.order, self.item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRow {
    pub key: LineKey,
    pub count: u32,
}

impl OrderItemRow {
    pub fn new(order: OrderId, item: ItemId, count: u32) -> Self {
        Self {
            key: LineKey { order, item },
            count,
        }
    }
}

impl Row for OrderItemRow {
    type Key = LineKey;
    /// New count.
    type Patch = u32;
    const TABLE: &'static str = "order_items";

    fn key(&self) -> LineKey {
        self.key
    }

    fn apply(&mut self, count: u32) -> Result<(), Violation> {
        if count == 0 {
            return Err(Violation::new("count", count, "delete the row instead"));
        }
        self.count = count;
        Ok(())
    }
}
