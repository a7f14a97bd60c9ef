//! # Order Client
//!
//! Provides a high‑level API for interacting with the order desk.
//! Every method is one request to the desk; nothing is cached on this side.
use crate::model::{Order, OrderId, OrderState, WaiterId};
use crate::order_desk::{OrderDiff, OrderError, OrderRequest, Reply};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the order desk.
#[derive(Clone)]
pub struct OrderClient {
    sender: mpsc::Sender<OrderRequest>,
}

impl OrderClient {
    pub fn new(sender: mpsc::Sender<OrderRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> OrderRequest) -> Result<T, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| OrderError::ActorCommunicationError("Order desk closed".to_string()))?;
        response.await.map_err(|_| {
            OrderError::ActorCommunicationError("Order desk dropped request".to_string())
        })?
    }

    /// Stores a new order and returns it as stored, with its id and timestamps.
    ///
    /// The order's `state` is the state it should end up in; confirming here takes
    /// stock exactly like [`set_state`](Self::set_state) would.
    #[instrument(skip(self, order), fields(table = order.table()))]
    pub async fn create(&self, order: Order) -> Result<Order, OrderError> {
        debug!(?order, "create called");
        self.call(|respond_to| OrderRequest::Create { order, respond_to })
            .await
    }

    /// Writes the differences between `order` and its stored version.
    #[instrument(skip(self, order), fields(order_id = ?order.id))]
    pub async fn modify(&self, order: &Order) -> Result<OrderDiff, OrderError> {
        let order = order.clone();
        self.call(|respond_to| OrderRequest::Modify { order, respond_to })
            .await
    }

    /// Moves `order` to `state` and updates it in place.
    ///
    /// Returns the whole minutes since its previous status change, or
    /// [`CANCELLED`](crate::order_desk::CANCELLED) when the order was cancelled and
    /// deleted.
    #[instrument(skip(self, order), fields(order_id = ?order.id))]
    pub async fn set_state(&self, order: &mut Order, state: OrderState) -> Result<i64, OrderError> {
        let id = order.id.ok_or(OrderError::Unsaved)?;
        let change = self
            .call(|respond_to| OrderRequest::SetState {
                id,
                state,
                respond_to,
            })
            .await?;
        order.state = change.state;
        order.status_changed_at = change.changed_at;
        Ok(change.elapsed_minutes)
    }

    #[instrument(skip(self))]
    pub async fn state(&self, id: OrderId) -> Result<OrderState, OrderError> {
        self.call(|respond_to| OrderRequest::State { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.call(|respond_to| OrderRequest::Get { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn by_table(&self, table: u32) -> Result<Vec<Order>, OrderError> {
        self.call(|respond_to| OrderRequest::ByTable { table, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<Order>, OrderError> {
        self.call(|respond_to| OrderRequest::All { respond_to }).await
    }

    /// Orders on tables `waiter` owns. A non-waiter id returns every order.
    #[instrument(skip(self))]
    pub async fn assigned_to(&self, waiter: WaiterId) -> Result<Vec<Order>, OrderError> {
        self.call(|respond_to| OrderRequest::AssignedTo { waiter, respond_to })
            .await
    }

    /// Orders in `state` on tables `waiter` owns, served from the desk's cache when
    /// nothing in that state has changed. A non-waiter id returns every order in
    /// `state`.
    #[instrument(skip(self))]
    pub async fn assigned_in_state(
        &self,
        waiter: WaiterId,
        state: OrderState,
    ) -> Result<Vec<Order>, OrderError> {
        self.call(|respond_to| OrderRequest::AssignedInState {
            waiter,
            state,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn is_paid(&self, id: OrderId) -> Result<bool, OrderError> {
        self.call(|respond_to| OrderRequest::IsPaid { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_paid(&self, id: OrderId, paid: bool) -> Result<(), OrderError> {
        self.call(|respond_to| OrderRequest::SetPaid {
            id,
            paid,
            respond_to,
        })
        .await
    }

    /// Deletes `order`. Returns false if it was never stored or is already gone.
    #[instrument(skip(self, order), fields(order_id = ?order.id))]
    pub async fn remove(&self, order: &Order) -> Result<bool, OrderError> {
        let Some(id) = order.id else {
            return Ok(false);
        };
        self.call(|respond_to| OrderRequest::Remove { id, respond_to })
            .await
    }

    /// Deletes every order. Returns how many there were.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize, OrderError> {
        self.call(|respond_to| OrderRequest::Clear { respond_to }).await
    }
}
