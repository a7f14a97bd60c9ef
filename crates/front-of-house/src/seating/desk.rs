//! # Seating Desk
//!
//! The single writer for the `tables` table. It decides which waiter owns each table
//! using [`block_owner`] over the waiters currently on duty, and hands tables on
//! when a waiter leaves.
//!
//! The deferred start-up sweep is just another [`SeatingClient`] caller, so it is
//! queued behind any assignment already in flight rather than racing it.

use crate::clients::{SeatingClient, WaiterRoster};
use crate::model::{TableFlag, TablePatch, TableRow, WaiterId};
use crate::seating::{block_owner, Move, Reply, SeatingError, SeatingRequest};
use row_store::{Row, StoreError, TableClient};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct SeatingDesk {
    receiver: mpsc::Receiver<SeatingRequest>,
    tables: TableClient<TableRow>,
    max_tables: u32,
}

fn reply<T>(operation: &'static str, respond_to: Reply<T>, result: Result<T, SeatingError>) {
    if let Err(e) = &result {
        warn!(operation, error = %e, "Request failed");
    }
    let _ = respond_to.send(result);
}

impl SeatingDesk {
    pub fn new(
        buffer_size: usize,
        tables: TableClient<TableRow>,
        max_tables: u32,
    ) -> (Self, SeatingClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let desk = Self {
            receiver,
            tables,
            max_tables,
        };
        (desk, SeatingClient::new(sender))
    }

    /// Runs the desk until every client is dropped. The roster is read afresh for
    /// every assignment.
    pub async fn run(mut self, roster: Arc<dyn WaiterRoster>) {
        info!(max_tables = self.max_tables, "Seating desk started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SeatingRequest::Populate { respond_to } => {
                    let result = self.populate().await;
                    reply("populate", respond_to, result);
                }
                SeatingRequest::Assign { table, respond_to } => {
                    debug!(table, "Assign");
                    let result = self.assign(table, roster.as_ref()).await;
                    reply("assign", respond_to, result);
                }
                SeatingRequest::ReassignFrom { waiter, respond_to } => {
                    debug!(%waiter, "ReassignFrom");
                    let result = self.reassign_from(waiter, roster.as_ref()).await;
                    reply("reassign_from", respond_to, result);
                }
                SeatingRequest::Table { table, respond_to } => {
                    let result = self.table(table).await;
                    reply("table", respond_to, result);
                }
                SeatingRequest::SeatedTables { waiter, respond_to } => {
                    let result = self
                        .numbers(move |t| t.waiter == waiter && t.seated)
                        .await;
                    reply("seated_tables", respond_to, result);
                }
                SeatingRequest::HelpNeeded { waiter, respond_to } => {
                    let result = self
                        .numbers(move |t| t.waiter == waiter && t.help_requested)
                        .await;
                    reply("help_needed", respond_to, result);
                }
                SeatingRequest::SetFlag {
                    table,
                    flag,
                    value,
                    respond_to,
                } => {
                    debug!(table, ?flag, value, "SetFlag");
                    let result = self.set_flag(table, flag, value).await;
                    reply("set_flag", respond_to, result);
                }
            }
        }

        info!("Seating desk stopped");
    }

    fn check_range(&self, table: u32) -> Result<(), SeatingError> {
        if (1..=self.max_tables).contains(&table) {
            Ok(())
        } else {
            Err(SeatingError::OutOfRange {
                table,
                max: self.max_tables,
            })
        }
    }

    async fn populate(&mut self) -> Result<usize, SeatingError> {
        let existing = self.tables.summarize(|_: &TableRow| true).await?;
        if existing.count > 0 {
            debug!(existing = existing.count, "Tables already present");
            return Ok(0);
        }
        let rows: Vec<TableRow> = (1..=self.max_tables).map(TableRow::new).collect();
        let created = self.tables.insert(rows).await?;
        info!(created, "Tables populated");
        Ok(created)
    }

    async fn assign(&mut self, table: u32, roster: &dyn WaiterRoster) -> Result<WaiterId, SeatingError> {
        self.check_range(table)?;
        let on_duty: Vec<WaiterId> = roster
            .logged_in_waiter_ids()
            .await
            .map_err(|e| SeatingError::Roster(e.to_string()))?
            .into_iter()
            .filter(|waiter| waiter.is_waiter())
            .collect();

        let owner = block_owner(table, self.max_tables, &on_duty);
        self.tables
            .update(vec![
                (table, TablePatch::Owner(owner)),
                (table, TablePatch::Set(TableFlag::Seated, true)),
            ])
            .await?;
        info!(table, waiter = %owner, on_duty = on_duty.len(), "Table assigned");
        Ok(owner)
    }

    /// Re-runs the assignment for each seated table `waiter` owns. Other waiters'
    /// tables are left alone even if the partition for the new roster would move them.
    async fn reassign_from(
        &mut self,
        waiter: WaiterId,
        roster: &dyn WaiterRoster,
    ) -> Result<Vec<Move>, SeatingError> {
        let owned = self
            .numbers(move |t| t.waiter == waiter && t.seated)
            .await?;

        let mut moves = Vec::with_capacity(owned.len());
        for table in owned {
            self.tables
                .update(vec![(table, TablePatch::Owner(WaiterId::UNASSIGNED))])
                .await?;
            let to = self.assign(table, roster).await?;
            moves.push(Move {
                table,
                from: waiter,
                to,
            });
        }
        info!(%waiter, moved = moves.len(), "Tables reassigned");
        Ok(moves)
    }

    async fn table(&self, table: u32) -> Result<TableRow, SeatingError> {
        self.check_range(table)?;
        self.tables.get(table).await?.ok_or_else(|| {
            SeatingError::StoreFailure(StoreError::MissingKey {
                table: TableRow::TABLE,
                key: table.to_string(),
            })
        })
    }

    async fn numbers<F>(&self, filter: F) -> Result<Vec<u32>, SeatingError>
    where
        F: Fn(&TableRow) -> bool + Send + Sync + 'static,
    {
        let rows = self.tables.select(filter).await?;
        Ok(rows.into_iter().map(|row| row.number).collect())
    }

    async fn set_flag(&mut self, table: u32, flag: TableFlag, value: bool) -> Result<(), SeatingError> {
        self.check_range(table)?;
        self.tables
            .update(vec![(table, TablePatch::Set(flag, value))])
            .await?;
        Ok(())
    }
}
