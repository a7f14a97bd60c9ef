//! What a state change has to do to the stored order.

use crate::model::OrderState;
use crate::order_desk::OrderError;
use chrono::{DateTime, Utc};

/// Elapsed-minutes value reported for a cancellation.
pub const CANCELLED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Remove the header and item rows.
    Delete,
    /// Take stock for every item, then write the status.
    TakeStockAndWrite,
    /// Write the status and a fresh timestamp.
    Write,
}

pub fn plan(from: OrderState, to: OrderState) -> Result<Effect, OrderError> {
    if !from.can_transition(to) {
        return Err(OrderError::InvalidTransition { from, to });
    }
    Ok(match to {
        OrderState::Cancelled => Effect::Delete,
        to if from == OrderState::Unconfirmed && to.is_confirmed() => Effect::TakeStockAndWrite,
        _ => Effect::Write,
    })
}

/// Outcome of a state change, handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub state: OrderState,
    pub changed_at: DateTime<Utc>,
    /// Whole minutes since the previous status change, or [`CANCELLED`].
    pub elapsed_minutes: i64,
}

pub fn elapsed_minutes(previous: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - previous).num_minutes().abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_confirming_takes_stock_once() {
        assert_eq!(
            plan(OrderState::Unconfirmed, OrderState::Confirmed),
            Ok(Effect::TakeStockAndWrite)
        );
        assert_eq!(
            plan(OrderState::Unconfirmed, OrderState::Served),
            Ok(Effect::TakeStockAndWrite)
        );
        assert_eq!(plan(OrderState::Confirmed, OrderState::Ready), Ok(Effect::Write));
        assert_eq!(plan(OrderState::Unconfirmed, OrderState::Unconfirmed), Ok(Effect::Write));
    }

    #[test]
    fn test_cancel_deletes_and_backwards_fails() {
        assert_eq!(plan(OrderState::Preparing, OrderState::Cancelled), Ok(Effect::Delete));
        assert_eq!(
            plan(OrderState::Ready, OrderState::Confirmed),
            Err(OrderError::InvalidTransition {
                from: OrderState::Ready,
                to: OrderState::Confirmed
            })
        );
    }

    #[test]
    fn test_elapsed_is_whole_non_negative_minutes() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(150)), 2);
        assert_eq!(elapsed_minutes(start + Duration::minutes(3), start), 3);
    }
}
