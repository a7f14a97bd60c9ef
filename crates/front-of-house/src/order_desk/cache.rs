//! # Staleness Cache
//!
//! Waiter screens poll "orders in state X" every few seconds. Instead of rebuilding the
//! list on every poll, the desk keeps the last list per state and only rebuilds it when
//! a cheap summary of the stored rows says it may have changed:
//!
//! 1. some order in that state had its status changed at or after the last fetch, or
//! 2. the number of stored orders in that state differs from the cached list.
//!
//! Check (1) is what catches two orders swapping in and out of the same state between
//! polls, which leaves the count unchanged. Every state change rewrites the status
//! timestamp, so the check relies on that.
//!
//! Changes that touch neither the status nor the count (editing the items of an order
//! already in the list) are not seen until something else triggers a refresh. Table
//! moves are the exception: the desk joins waiter ownership on the stored headers, not
//! on the cached orders.

use crate::model::{Order, OrderState};
use chrono::{DateTime, Utc};
use row_store::Summary;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CacheEntry {
    orders: Vec<Order>,
    fetched_at: DateTime<Utc>,
}

/// Last fetched order list per state, owned by one order desk.
#[derive(Debug, Default)]
pub struct StalenessCache {
    entries: HashMap<OrderState, CacheEntry>,
}

impl StalenessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `state` must be fetched again, given a summary of the stored orders in it.
    pub fn is_stale(&self, state: OrderState, summary: &Summary) -> bool {
        match self.entries.get(&state) {
            None => true,
            Some(entry) => {
                summary.count != entry.orders.len()
                    || summary.latest.is_some_and(|latest| latest >= entry.fetched_at)
            }
        }
    }

    /// Replaces the entry for `state`. `fetched_at` must be taken before the fetch.
    pub fn store(&mut self, state: OrderState, orders: Vec<Order>, fetched_at: DateTime<Utc>) {
        self.entries.insert(state, CacheEntry { orders, fetched_at });
    }

    pub fn get(&self, state: OrderState) -> Option<&[Order]> {
        self.entries.get(&state).map(|entry| entry.orders.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, MenuItem, Price};
    use chrono::{Duration, TimeZone};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 18, minute, 0).unwrap()
    }

    fn order(id: u32) -> Order {
        let item = MenuItem::new(1, "Elote", Price(400), Category::Sides);
        Order::new(1, vec![item], OrderState::Confirmed).with_id(id)
    }

    fn summary(count: usize, latest: Option<DateTime<Utc>>) -> Summary {
        Summary { count, latest }
    }

    #[test]
    fn test_missing_entry_is_stale() {
        let cache = StalenessCache::new();
        assert!(cache.is_stale(OrderState::Confirmed, &summary(0, None)));
    }

    #[test]
    fn test_count_change_triggers_refresh() {
        let mut cache = StalenessCache::new();
        cache.store(OrderState::Confirmed, vec![order(1), order(2)], at(10));

        assert!(!cache.is_stale(OrderState::Confirmed, &summary(2, Some(at(5)))));
        assert!(cache.is_stale(OrderState::Confirmed, &summary(3, Some(at(5)))));
        assert!(cache.is_stale(OrderState::Confirmed, &summary(1, Some(at(5)))));
    }

    #[test]
    fn test_newer_stamp_triggers_refresh_with_same_count() {
        let mut cache = StalenessCache::new();
        cache.store(OrderState::Ready, vec![order(1)], at(10));

        assert!(cache.is_stale(OrderState::Ready, &summary(1, Some(at(10)))));
        assert!(cache.is_stale(OrderState::Ready, &summary(1, Some(at(10) + Duration::seconds(1)))));
        assert!(!cache.is_stale(OrderState::Ready, &summary(1, Some(at(9)))));
    }

    #[test]
    fn test_empty_fetch_replaces_entry() {
        let mut cache = StalenessCache::new();
        cache.store(OrderState::Served, vec![order(1)], at(10));
        assert!(cache.is_stale(OrderState::Served, &summary(0, None)));

        cache.store(OrderState::Served, Vec::new(), at(11));
        assert_eq!(cache.get(OrderState::Served).map(<[Order]>::len), Some(0));
        assert!(!cache.is_stale(OrderState::Served, &summary(0, None)));
    }
}
