//! Requests sent from a [`SeatingClient`](crate::clients::SeatingClient) to the seating desk.

use crate::model::{TableFlag, TableRow, WaiterId};
use crate::seating::SeatingError;
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, SeatingError>>;

/// A table that changed hands during a reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub table: u32,
    pub from: WaiterId,
    pub to: WaiterId,
}

#[derive(Debug)]
pub enum SeatingRequest {
    /// Creates rows for tables 1..=max when none exist yet.
    Populate { respond_to: Reply<usize> },
    Assign {
        table: u32,
        respond_to: Reply<WaiterId>,
    },
    ReassignFrom {
        waiter: WaiterId,
        respond_to: Reply<Vec<Move>>,
    },
    Table {
        table: u32,
        respond_to: Reply<TableRow>,
    },
    SeatedTables {
        waiter: WaiterId,
        respond_to: Reply<Vec<u32>>,
    },
    HelpNeeded {
        waiter: WaiterId,
        respond_to: Reply<Vec<u32>>,
    },
    SetFlag {
        table: u32,
        flag: TableFlag,
        value: bool,
        respond_to: Reply<()>,
    },
}
