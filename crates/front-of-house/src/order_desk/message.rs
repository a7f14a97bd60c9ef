//! Requests sent from an [`OrderClient`](crate::clients::OrderClient) to the order desk.

use crate::model::{Order, OrderId, OrderState, WaiterId};
use crate::order_desk::{OrderDiff, OrderError, StateChange};
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, OrderError>>;

#[derive(Debug)]
pub enum OrderRequest {
    Create {
        order: Order,
        respond_to: Reply<Order>,
    },
    Modify {
        order: Order,
        respond_to: Reply<OrderDiff>,
    },
    SetState {
        id: OrderId,
        state: OrderState,
        respond_to: Reply<StateChange>,
    },
    State {
        id: OrderId,
        respond_to: Reply<OrderState>,
    },
    Get {
        id: OrderId,
        respond_to: Reply<Option<Order>>,
    },
    ByTable {
        table: u32,
        respond_to: Reply<Vec<Order>>,
    },
    All {
        respond_to: Reply<Vec<Order>>,
    },
    AssignedTo {
        waiter: WaiterId,
        respond_to: Reply<Vec<Order>>,
    },
    AssignedInState {
        waiter: WaiterId,
        state: OrderState,
        respond_to: Reply<Vec<Order>>,
    },
    IsPaid {
        id: OrderId,
        respond_to: Reply<bool>,
    },
    SetPaid {
        id: OrderId,
        paid: bool,
        respond_to: Reply<()>,
    },
    Remove {
        id: OrderId,
        respond_to: Reply<bool>,
    },
    Clear {
        respond_to: Reply<usize>,
    },
}
