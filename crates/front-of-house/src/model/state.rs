//! Order lifecycle states.
//!
//! ```text
//! Unconfirmed -> Confirmed -> Preparing -> Ready -> Served
//!       \____________\____________\__________\________\____> Cancelled
//! ```
//!
//! Orders only move forward. Skipping ahead is allowed, staying put is allowed (it
//! refreshes the status timestamp), and any state but `Cancelled` itself may cancel.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Unconfirmed,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderState {
    pub const ALL: [OrderState; 6] = [
        OrderState::Unconfirmed,
        OrderState::Confirmed,
        OrderState::Preparing,
        OrderState::Ready,
        OrderState::Served,
        OrderState::Cancelled,
    ];

    /// Four-letter status code stored in the `orders` table.
    pub fn code(self) -> &'static str {
        match self {
            OrderState::Unconfirmed => "ucnf",
            OrderState::Confirmed => "conf",
            OrderState::Preparing => "prep",
            OrderState::Ready => "redy",
            OrderState::Served => "srvd",
            OrderState::Cancelled => "canc",
        }
    }

    /// Parses a status code. Unknown codes read as `Unconfirmed`.
    pub fn from_code(code: &str) -> OrderState {
        OrderState::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .unwrap_or(OrderState::Unconfirmed)
    }

    /// Whether the kitchen has accepted the order.
    pub fn is_confirmed(self) -> bool {
        matches!(
            self,
            OrderState::Confirmed | OrderState::Preparing | OrderState::Ready | OrderState::Served
        )
    }

    pub fn can_transition(self, to: OrderState) -> bool {
        match (self, to) {
            (OrderState::Cancelled, _) => false,
            (_, OrderState::Cancelled) => true,
            (from, to) => to >= from,
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderState::Unconfirmed => "Unconfirmed",
            OrderState::Confirmed => "Confirmed",
            OrderState::Preparing => "Preparing",
            OrderState::Ready => "Ready",
            OrderState::Served => "Served",
            OrderState::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_and_unknown_defaults() {
        for state in OrderState::ALL {
            assert_eq!(OrderState::from_code(state.code()), state);
        }
        assert_eq!(OrderState::from_code("late"), OrderState::Unconfirmed);
    }

    #[test]
    fn test_forward_moves_and_skips_are_allowed() {
        assert!(OrderState::Unconfirmed.can_transition(OrderState::Confirmed));
        assert!(OrderState::Confirmed.can_transition(OrderState::Ready));
        assert!(OrderState::Ready.can_transition(OrderState::Ready));
        assert!(OrderState::Served.can_transition(OrderState::Cancelled));
    }

    #[test]
    fn test_backward_moves_are_rejected() {
        assert!(!OrderState::Confirmed.can_transition(OrderState::Unconfirmed));
        assert!(!OrderState::Served.can_transition(OrderState::Preparing));
        assert!(!OrderState::Cancelled.can_transition(OrderState::Cancelled));
        assert!(!OrderState::Cancelled.can_transition(OrderState::Served));
    }
}
