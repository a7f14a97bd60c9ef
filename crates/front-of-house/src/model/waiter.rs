use row_store::{Row, Violation};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for staff accounts.
///
/// Ids of zero or below are not waiters: `-1` marks a table nobody owns, and other
/// non-positive ids belong to management or shared accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WaiterId(pub i32);

impl WaiterId {
    pub const UNASSIGNED: WaiterId = WaiterId(-1);

    /// Whether this id can own tables.
    pub fn is_waiter(self) -> bool {
        self.0 > 0
    }
}

impl From<i32> for WaiterId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl Display for WaiterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "waiter_{}", self.0)
    }
}

/// A staff member with service statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waiter {
    pub id: WaiterId,
    pub name: String,
    pub logged_in: bool,
    pub orders_confirmed: u32,
    pub minutes_unconfirmed: u64,
    pub orders_served: u32,
    pub minutes_unserved: u64,
}

impl Waiter {
    pub fn new(id: impl Into<WaiterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logged_in: false,
            orders_confirmed: 0,
            minutes_unconfirmed: 0,
            orders_served: 0,
            minutes_unserved: 0,
        }
    }

    /// Mean minutes an order waited for this waiter to confirm it.
    pub fn average_confirm_time(&self) -> Option<f64> {
        average(self.minutes_unconfirmed, self.orders_confirmed)
    }

    /// Mean minutes a ready order waited for this waiter to serve it.
    pub fn average_serve_time(&self) -> Option<f64> {
        average(self.minutes_unserved, self.orders_served)
    }
}

fn average(total: u64, count: u32) -> Option<f64> {
    (count > 0).then(|| total as f64 / f64::from(count))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaiterPatch {
    LogIn,
    LogOut,
    /// One more order confirmed after waiting this many minutes.
    Confirmed(u64),
    /// One more order served after waiting this many minutes.
    Served(u64),
}

impl Row for Waiter {
    type Key = WaiterId;
    type Patch = WaiterPatch;
    const TABLE: &'static str = "waiters";

    fn key(&self) -> WaiterId {
        self.id
    }

    fn apply(&mut self, patch: WaiterPatch) -> Result<(), Violation> {
        match patch {
            WaiterPatch::LogIn if !self.id.is_waiter() => {
                return Err(Violation::new("logged_in", self.id, "not a waiter account"));
            }
            WaiterPatch::LogIn => self.logged_in = true,
            WaiterPatch::LogOut => self.logged_in = false,
            WaiterPatch::Confirmed(minutes) => {
                self.orders_confirmed += 1;
                self.minutes_unconfirmed += minutes;
            }
            WaiterPatch::Served(minutes) => {
                self.orders_served += 1;
                self.minutes_unserved += minutes;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages() {
        let mut waiter = Waiter::new(1, "Ana");
        assert_eq!(waiter.average_confirm_time(), None);

        waiter.apply(WaiterPatch::Confirmed(10)).unwrap();
        waiter.apply(WaiterPatch::Confirmed(8)).unwrap();
        waiter.apply(WaiterPatch::Served(5)).unwrap();
        assert_eq!(waiter.average_confirm_time(), Some(9.0));
        assert_eq!(waiter.average_serve_time(), Some(5.0));
    }

    #[test]
    fn test_non_waiter_accounts_cannot_log_in() {
        let mut manager = Waiter::new(0, "Manager");
        assert!(manager.apply(WaiterPatch::LogIn).is_err());
        assert!(!manager.logged_in);
    }
}
