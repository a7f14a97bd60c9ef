//! # Seating Client
//!
//! High‑level API for the seating desk.
use crate::model::{TableFlag, TableRow, WaiterId};
use crate::seating::{Move, Reply, SeatingError, SeatingRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SeatingClient {
    sender: mpsc::Sender<SeatingRequest>,
}

impl SeatingClient {
    pub fn new(sender: mpsc::Sender<SeatingRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> SeatingRequest,
    ) -> Result<T, SeatingError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(make(respond_to)).await.map_err(|_| {
            SeatingError::ActorCommunicationError("Seating desk closed".to_string())
        })?;
        response.await.map_err(|_| {
            SeatingError::ActorCommunicationError("Seating desk dropped request".to_string())
        })?
    }

    /// Creates the table rows if there are none yet. Returns how many were created.
    #[instrument(skip(self))]
    pub async fn populate(&self) -> Result<usize, SeatingError> {
        self.call(|respond_to| SeatingRequest::Populate { respond_to })
            .await
    }

    /// Gives `table` to a waiter on duty and marks it seated. Returns the new owner,
    /// which is [`WaiterId::UNASSIGNED`] when nobody is on duty.
    #[instrument(skip(self))]
    pub async fn assign(&self, table: u32) -> Result<WaiterId, SeatingError> {
        debug!("Sending request");
        self.call(|respond_to| SeatingRequest::Assign { table, respond_to })
            .await
    }

    /// Re-assigns every seated table owned by `waiter`. Passing
    /// [`WaiterId::UNASSIGNED`] picks up seated tables nobody owns.
    #[instrument(skip(self))]
    pub async fn reassign_from(&self, waiter: WaiterId) -> Result<Vec<Move>, SeatingError> {
        debug!("Sending request");
        self.call(|respond_to| SeatingRequest::ReassignFrom { waiter, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn table(&self, table: u32) -> Result<TableRow, SeatingError> {
        self.call(|respond_to| SeatingRequest::Table { table, respond_to })
            .await
    }

    pub async fn owner(&self, table: u32) -> Result<WaiterId, SeatingError> {
        Ok(self.table(table).await?.waiter)
    }

    #[instrument(skip(self))]
    pub async fn seated_tables(&self, waiter: WaiterId) -> Result<Vec<u32>, SeatingError> {
        self.call(|respond_to| SeatingRequest::SeatedTables { waiter, respond_to })
            .await
    }

    /// Tables owned by `waiter` whose guests asked for help.
    #[instrument(skip(self))]
    pub async fn help_needed(&self, waiter: WaiterId) -> Result<Vec<u32>, SeatingError> {
        self.call(|respond_to| SeatingRequest::HelpNeeded { waiter, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_flag(&self, table: u32, flag: TableFlag, value: bool) -> Result<(), SeatingError> {
        self.call(|respond_to| SeatingRequest::SetFlag {
            table,
            flag,
            value,
            respond_to,
        })
        .await
    }

    pub async fn is_clean(&self, table: u32) -> Result<bool, SeatingError> {
        Ok(self.table(table).await?.clean)
    }

    pub async fn set_clean(&self, table: u32, clean: bool) -> Result<(), SeatingError> {
        self.set_flag(table, TableFlag::Clean, clean).await
    }

    pub async fn is_seated(&self, table: u32) -> Result<bool, SeatingError> {
        Ok(self.table(table).await?.seated)
    }

    pub async fn set_seated(&self, table: u32, seated: bool) -> Result<(), SeatingError> {
        self.set_flag(table, TableFlag::Seated, seated).await
    }

    pub async fn needs_help(&self, table: u32) -> Result<bool, SeatingError> {
        Ok(self.table(table).await?.help_requested)
    }

    pub async fn set_help(&self, table: u32, requested: bool) -> Result<(), SeatingError> {
        self.set_flag(table, TableFlag::HelpRequested, requested)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_reads_the_table_row() {
        let (sender, mut receiver) = mpsc::channel(4);
        let client = SeatingClient::new(sender);

        tokio::spawn(async move {
            if let Some(SeatingRequest::Table { table, respond_to }) = receiver.recv().await {
                let mut row = TableRow::new(table);
                row.waiter = WaiterId(3);
                let _ = respond_to.send(Ok(row));
            }
        });

        assert_eq!(client.owner(5).await, Ok(WaiterId(3)));
    }

    #[tokio::test]
    async fn test_flag_setters_send_the_right_flag() {
        let (sender, mut receiver) = mpsc::channel(4);
        let client = SeatingClient::new(sender);

        let desk = tokio::spawn(async move {
            match receiver.recv().await {
                Some(SeatingRequest::SetFlag {
                    table,
                    flag,
                    value,
                    respond_to,
                }) => {
                    assert_eq!((table, flag, value), (2, TableFlag::HelpRequested, true));
                    respond_to.send(Ok(())).unwrap();
                }
                other => panic!("Expected SetFlag, got {other:?}"),
            }
        });

        client.set_help(2, true).await.unwrap();
        desk.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_desk_is_a_communication_error() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let client = SeatingClient::new(sender);

        assert!(matches!(
            client.assign(1).await,
            Err(SeatingError::ActorCommunicationError(_))
        ));
    }
}
