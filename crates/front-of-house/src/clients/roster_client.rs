//! # Staff Roster
//!
//! [`WaiterRoster`] over a `waiters` row table. Also records the per-waiter
//! service statistics the order lifecycle feeds.
use crate::clients::{RosterError, WaiterRoster};
use crate::model::{Waiter, WaiterId, WaiterPatch};
use async_trait::async_trait;
use row_store::{RowClient, StoreError, TableClient};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct StaffRoster {
    inner: TableClient<Waiter>,
}

impl StaffRoster {
    pub fn new(inner: TableClient<Waiter>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, name))]
    pub async fn enroll(&self, id: WaiterId, name: &str) -> Result<(), RosterError> {
        self.inner.insert(vec![Waiter::new(id, name)]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn log_in(&self, id: WaiterId) -> Result<(), RosterError> {
        self.patch(id, WaiterPatch::LogIn).await?;
        info!(waiter = %id, "Logged in");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn log_out(&self, id: WaiterId) -> Result<(), RosterError> {
        self.patch(id, WaiterPatch::LogOut).await?;
        info!(waiter = %id, "Logged out");
        Ok(())
    }

    pub async fn record_confirm_time(&self, id: WaiterId, minutes: u64) -> Result<(), RosterError> {
        self.patch(id, WaiterPatch::Confirmed(minutes)).await?;
        Ok(())
    }

    pub async fn record_serve_time(&self, id: WaiterId, minutes: u64) -> Result<(), RosterError> {
        self.patch(id, WaiterPatch::Served(minutes)).await?;
        Ok(())
    }

    /// Mean minutes `id`'s orders waited to be confirmed; `None` before the first one.
    pub async fn average_confirm_time(&self, id: WaiterId) -> Result<Option<f64>, RosterError> {
        Ok(self.waiter(id).await?.average_confirm_time())
    }

    pub async fn average_serve_time(&self, id: WaiterId) -> Result<Option<f64>, RosterError> {
        Ok(self.waiter(id).await?.average_serve_time())
    }

    pub async fn waiter(&self, id: WaiterId) -> Result<Waiter, RosterError> {
        self.fetch(id).await?.ok_or(RosterError::UnknownWaiter(id))
    }

    async fn patch(&self, id: WaiterId, patch: WaiterPatch) -> Result<Vec<Waiter>, RosterError> {
        self.inner
            .update(vec![(id, patch)])
            .await
            .map_err(|e| match e {
                StoreError::MissingKey { .. } => RosterError::UnknownWaiter(id),
                e => RosterError::StoreFailure(e),
            })
    }
}

impl RowClient<Waiter> for StaffRoster {
    type Error = RosterError;

    fn table(&self) -> &TableClient<Waiter> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        RosterError::StoreFailure(e)
    }
}

#[async_trait]
impl WaiterRoster for StaffRoster {
    async fn logged_in_waiter_ids(&self) -> Result<Vec<WaiterId>, RosterError> {
        let on_duty = self.inner.select(|w: &Waiter| w.logged_in).await?;
        Ok(on_duty.into_iter().map(|w| w.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use row_store::mock::MockTable;
    use row_store::TableActor;

    async fn roster() -> StaffRoster {
        let (actor, client) = TableActor::<Waiter>::new(8);
        tokio::spawn(actor.run());
        let roster = StaffRoster::new(client);
        roster.enroll(WaiterId(2), "Bea").await.unwrap();
        roster.enroll(WaiterId(1), "Ana").await.unwrap();
        roster.enroll(WaiterId(0), "Manager").await.unwrap();
        roster
    }

    #[tokio::test]
    async fn test_on_duty_ids_are_sorted() {
        let roster = roster().await;
        roster.log_in(WaiterId(2)).await.unwrap();
        roster.log_in(WaiterId(1)).await.unwrap();
        assert_eq!(
            roster.logged_in_waiter_ids().await.unwrap(),
            vec![WaiterId(1), WaiterId(2)]
        );

        roster.log_out(WaiterId(1)).await.unwrap();
        assert_eq!(roster.logged_in_waiter_ids().await.unwrap(), vec![WaiterId(2)]);
    }

    #[tokio::test]
    async fn test_manager_account_cannot_go_on_duty() {
        let roster = roster().await;
        let err = roster.log_in(WaiterId(0)).await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::StoreFailure(StoreError::Rejected { .. })
        ));
        assert!(roster.logged_in_waiter_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_averages() {
        let roster = roster().await;
        roster.record_confirm_time(WaiterId(1), 3).await.unwrap();
        roster.record_confirm_time(WaiterId(1), 6).await.unwrap();
        roster.record_serve_time(WaiterId(1), 12).await.unwrap();

        assert_eq!(roster.average_confirm_time(WaiterId(1)).await, Ok(Some(4.5)));
        assert_eq!(roster.average_serve_time(WaiterId(1)).await, Ok(Some(12.0)));
        assert_eq!(roster.average_serve_time(WaiterId(2)).await, Ok(None));
        assert_eq!(
            roster.record_serve_time(WaiterId(9), 1).await,
            Err(RosterError::UnknownWaiter(WaiterId(9)))
        );
    }

    #[tokio::test]
    async fn test_transient_store_error_is_retried() {
        let mut mock = MockTable::<Waiter>::new();
        mock.expect_select().return_err(StoreError::Unavailable);
        mock.expect_select().return_ok(vec![]);
        let roster = StaffRoster::new(mock.client());

        assert_eq!(roster.logged_in_waiter_ids().await, Ok(vec![]));
        mock.verify();
    }
}
