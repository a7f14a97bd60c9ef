//! # Order Diffs
//!
//! A modified order is written back by comparing it with what is stored and touching
//! only the rows that differ. [`OrderDiff::between`] computes the comparison; the desk
//! applies it one category at a time in field order (table, inserts, updates, deletes).
//!
//! Each category goes out as a single batch, and each batch is atomic on its own, but
//! nothing ties the batches together: if the updates fail after the inserts landed,
//! the inserts stay and the error is returned as-is.

use crate::model::ItemId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDiff {
    /// New table number, when it changed.
    pub table: Option<u32>,
    /// Items only in the new version, with their count.
    pub inserts: Vec<(ItemId, u32)>,
    /// Items in both versions whose count changed, with the new count.
    pub updates: Vec<(ItemId, u32)>,
    /// Items only in the old version.
    pub deletes: Vec<ItemId>,
}

impl OrderDiff {
    pub fn between(
        old_table: u32,
        old: &BTreeMap<ItemId, u32>,
        new_table: u32,
        new: &BTreeMap<ItemId, u32>,
    ) -> Self {
        let mut diff = OrderDiff {
            table: (old_table != new_table).then_some(new_table),
            ..Default::default()
        };

        for (item, &count) in new {
            match old.get(item) {
                None => diff.inserts.push((*item, count)),
                Some(&previous) if previous != count => diff.updates.push((*item, count)),
                Some(_) => {}
            }
        }
        diff.deletes = old
            .keys()
            .filter(|item| !new.contains_key(item))
            .copied()
            .collect();

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_none()
            && self.inserts.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
    }
}
