//! Block partition of tables across waiters.
//!
//! Tables `1..=max_tables` are cut into as many contiguous blocks as there are
//! waiters on duty, in table order, and block `i` goes to the `i`-th waiter of the
//! roster. With a block size of `max_tables / waiters` (a real number), table `t`
//! falls in block `ceil(t / block_size)`, which equals `ceil(t * waiters / max_tables)`
//! and is computed in integers to stay exact.

use crate::model::WaiterId;

/// Owner of `table` under the block partition of `roster`.
///
/// `roster` must already be filtered to real waiters. An empty roster, or a table
/// count of zero, leaves the table unassigned.
pub fn block_owner(table: u32, max_tables: u32, roster: &[WaiterId]) -> WaiterId {
    if roster.is_empty() || max_tables == 0 {
        return WaiterId::UNASSIGNED;
    }
    let waiters = roster.len() as u64;
    let block = (u64::from(table) * waiters).div_ceil(u64::from(max_tables));
    let index = (block.max(1) - 1).min(waiters - 1) as usize;
    roster[index]
}
