use crate::clients::{MenuCatalog, OrderClient, SeatingClient, StaffRoster, WaiterRoster};
use crate::config::FrontOfHouseConfig;
use crate::lifecycle::FrontOfHouseError;
use crate::model::{MenuItem, Order, OrderItemRow, OrderRow, OrderState, TableRow, Waiter, WaiterId};
use crate::order_desk::{DeskContext, OrderDesk, OrderTables, CANCELLED};
use crate::seating::{Move, SeatingDesk};
use row_store::{RetryPolicy, Row, TableActor, TableClient};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// The running front of house: every table actor, both desks and the start-up sweep.
///
/// # Example
///
/// ```ignore
/// let foh = FrontOfHouse::start(FrontOfHouseConfig::default()).await?;
/// foh.roster.enroll(WaiterId(1), "Ana").await?;
/// foh.roster.log_in(WaiterId(1)).await?;
///
/// let mut order = foh.orders.create(Order::new(3, items, OrderState::Unconfirmed)).await?;
/// foh.advance(&mut order, OrderState::Confirmed).await?;
///
/// foh.shutdown().await?;
/// ```
pub struct FrontOfHouse {
    pub orders: OrderClient,
    pub seating: SeatingClient,
    pub catalog: MenuCatalog,
    pub roster: StaffRoster,
    config: FrontOfHouseConfig,
    handles: Vec<JoinHandle<()>>,
    sweep: JoinHandle<()>,
}

fn spawn_table<R: Row>(
    config: &FrontOfHouseConfig,
    retry: RetryPolicy,
    handles: &mut Vec<JoinHandle<()>>,
) -> TableClient<R> {
    let (actor, client) = TableActor::<R>::with_retry(config.channel_capacity, retry);
    handles.push(tokio::spawn(actor.run()));
    client
}

impl FrontOfHouse {
    /// Starts every actor, creates the table rows on first start, and schedules the
    /// sweep that hands out seated tables nobody owns once `sweep_delay` has passed.
    #[instrument(skip(config), fields(max_tables = config.max_tables))]
    pub async fn start(config: FrontOfHouseConfig) -> Result<Self, FrontOfHouseError> {
        let retry = config.retry_policy();
        let mut handles = Vec::new();

        // =====================================================================
        // 1. Row tables
        // =====================================================================
        let menu = spawn_table::<MenuItem>(&config, retry, &mut handles);
        let waiters = spawn_table::<Waiter>(&config, retry, &mut handles);
        let tables = spawn_table::<TableRow>(&config, retry, &mut handles);
        let orders = spawn_table::<OrderRow>(&config, retry, &mut handles);
        let lines = spawn_table::<OrderItemRow>(&config, retry, &mut handles);

        let catalog = MenuCatalog::new(menu);
        let roster = StaffRoster::new(waiters);

        // =====================================================================
        // 2. Desks, with their collaborators injected at run time
        // =====================================================================
        let (seating_desk, seating) =
            SeatingDesk::new(config.channel_capacity, tables.clone(), config.max_tables);
        let on_duty: Arc<dyn WaiterRoster> = Arc::new(roster.clone());
        handles.push(tokio::spawn(seating_desk.run(on_duty)));

        let (order_desk, orders) = OrderDesk::new(
            config.channel_capacity,
            OrderTables {
                orders,
                lines,
                tables,
            },
            config.max_tables,
        );
        let context = DeskContext {
            catalog: Arc::new(catalog.clone()),
            seating: Some(seating.clone()),
        };
        handles.push(tokio::spawn(order_desk.run(context)));

        // =====================================================================
        // 3. Seed tables and schedule the sweep
        // =====================================================================
        seating.populate().await?;
        let sweep = tokio::spawn(sweep(seating.clone(), config.sweep_delay()));

        info!("Front of house started");
        Ok(Self {
            orders,
            seating,
            catalog,
            roster,
            config,
            handles,
            sweep,
        })
    }

    pub fn config(&self) -> &FrontOfHouseConfig {
        &self.config
    }

    /// Takes `waiter` off duty and hands their seated tables to whoever is left.
    #[instrument(skip(self))]
    pub async fn log_out(&self, waiter: WaiterId) -> Result<Vec<Move>, FrontOfHouseError> {
        self.roster.log_out(waiter).await?;
        Ok(self.seating.reassign_from(waiter).await?)
    }

    /// Moves `order` to `state` and credits the table's waiter with the wait when
    /// the order is confirmed or served.
    ///
    /// Returns what [`OrderClient::set_state`] returns.
    #[instrument(skip(self, order), fields(order_id = ?order.id))]
    pub async fn advance(&self, order: &mut Order, state: OrderState) -> Result<i64, FrontOfHouseError> {
        let elapsed = self.orders.set_state(order, state).await?;
        if elapsed == CANCELLED || !matches!(state, OrderState::Confirmed | OrderState::Served) {
            return Ok(elapsed);
        }

        // Read after the change so a confirm that assigned the table credits the new owner.
        let waiter = self.seating.owner(order.table()).await?;
        if !waiter.is_waiter() {
            return Ok(elapsed);
        }
        let minutes = u64::try_from(elapsed).unwrap_or(0);
        let recorded = match state {
            OrderState::Confirmed => self.roster.record_confirm_time(waiter, minutes).await,
            _ => self.roster.record_serve_time(waiter, minutes).await,
        };
        if let Err(e) = recorded {
            warn!(%waiter, error = %e, "Could not record service time");
        }
        Ok(elapsed)
    }

    /// Stops the sweep, closes every client and waits for all actors to stop.
    pub async fn shutdown(self) -> Result<(), FrontOfHouseError> {
        info!("Shutting down front of house...");

        self.sweep.abort();
        let _ = self.sweep.await;

        drop(self.orders);
        drop(self.seating);
        drop(self.catalog);
        drop(self.roster);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(FrontOfHouseError::TaskFailed(e.to_string()));
            }
        }

        info!("Front of house shutdown complete.");
        Ok(())
    }
}

/// Picks up tables that were seated while nobody was on duty.
async fn sweep(seating: SeatingClient, delay: std::time::Duration) {
    tokio::time::sleep(delay).await;
    match seating.reassign_from(WaiterId::UNASSIGNED).await {
        Ok(moves) => info!(assigned = moves.len(), "Start-up sweep finished"),
        Err(e) => warn!(error = %e, "Start-up sweep failed"),
    }
}
