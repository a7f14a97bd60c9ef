use crate::model::WaiterId;
use row_store::{Row, Violation};
use serde::{Deserialize, Serialize};

/// A restaurant table, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub number: u32,
    pub waiter: WaiterId,
    pub seated: bool,
    pub clean: bool,
    pub help_requested: bool,
}

impl TableRow {
    /// An empty, clean table nobody owns.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            waiter: WaiterId::UNASSIGNED,
            seated: false,
            clean: true,
            help_requested: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFlag {
    Seated,
    Clean,
    HelpRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePatch {
    Owner(WaiterId),
    Set(TableFlag, bool),
}

impl Row for TableRow {
    type Key = u32;
    type Patch = TablePatch;
    const TABLE: &'static str = "tables";

    fn key(&self) -> u32 {
        self.number
    }

    fn apply(&mut self, patch: TablePatch) -> Result<(), Violation> {
        match patch {
            TablePatch::Owner(waiter) if waiter != WaiterId::UNASSIGNED && !waiter.is_waiter() => {
                return Err(Violation::new("waiter", waiter, "cannot own a table"));
            }
            TablePatch::Owner(waiter) => self.waiter = waiter,
            TablePatch::Set(TableFlag::Seated, value) => self.seated = value,
            TablePatch::Set(TableFlag::Clean, value) => self.clean = value,
            TablePatch::Set(TableFlag::HelpRequested, value) => self.help_requested = value,
        }
        Ok(())
    }
}
