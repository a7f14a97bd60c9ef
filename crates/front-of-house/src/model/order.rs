/// Represents a customer order.
///
/// An order is built in memory by the table-side screen (items added and removed one
/// at a time) and handed to the order desk to be persisted. Its id stays `None` until
/// the desk assigns one on creation.
use crate::model::{ItemId, MenuItem, OrderState, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Item to number of times it appears on an order.
pub type OccurrenceMap = BTreeMap<MenuItem, u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<OrderId>,
    table: u32,
    pub ordered_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
    pub state: OrderState,
    items: Vec<MenuItem>,
}

impl Order {
    /// Creates an unsaved order for `table`.
    ///
    /// # Notes
    /// `state` is the state the order should be in once created; the desk always writes
    /// it as `Unconfirmed` first and then moves it, so confirming on creation takes
    /// stock like any other confirm.
    pub fn new(table: u32, items: Vec<MenuItem>, state: OrderState) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            table,
            ordered_at: now,
            status_changed_at: now,
            state,
            items,
        }
    }

    /// Rebuilds an order from stored parts.
    pub(crate) fn restore(
        id: OrderId,
        table: u32,
        ordered_at: DateTime<Utc>,
        state: OrderState,
        status_changed_at: DateTime<Utc>,
        items: Vec<MenuItem>,
    ) -> Self {
        Self {
            id: Some(id),
            table,
            ordered_at,
            status_changed_at,
            state,
            items,
        }
    }

    pub fn with_id(mut self, id: impl Into<OrderId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Copy of this order placed at another table.
    pub fn moved_to(&self, table: u32) -> Self {
        Self {
            table,
            ..self.clone()
        }
    }

    pub fn table(&self) -> u32 {
        self.table
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn add_item(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Removes one occurrence of `item`. Returns false if the order did not contain it.
    pub fn remove_item(&mut self, item: &MenuItem) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn occurrences(&self) -> OccurrenceMap {
        let mut map = OccurrenceMap::new();
        for item in &self.items {
            *map.entry(item.clone()).or_insert(0) += 1;
        }
        map
    }

    /// Occurrence counts keyed by item id, the shape stored in `order_items`.
    pub fn item_counts(&self) -> BTreeMap<ItemId, u32> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.id).or_insert(0) += 1;
        }
        counts
    }

    pub fn price(&self) -> Price {
        self.occurrences()
            .iter()
            .map(|(item, count)| item.price.times(*count))
            .sum()
    }
}
