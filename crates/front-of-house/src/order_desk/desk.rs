//! # Order Desk
//!
//! The single writer for the `orders` and `order_items` tables. Requests from every
//! [`OrderClient`] clone are handled one at a time, so a modification can read the
//! stored order, diff it and write the difference without another request slipping
//! in between.

use crate::clients::{Catalog, OrderClient, SeatingClient};
use crate::model::{
    ItemId, LineKey, MenuItem, Order, OrderId, OrderItemRow, OrderPatch, OrderRow, OrderState,
    TableRow, WaiterId,
};
use crate::order_desk::transition::{self, Effect, StateChange, CANCELLED};
use crate::order_desk::{OrderDiff, OrderError, OrderRequest, Reply, StalenessCache};
use chrono::Utc;
use row_store::{StoreError, TableClient};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Row tables the desk reads and writes.
#[derive(Clone)]
pub struct OrderTables {
    pub orders: TableClient<OrderRow>,
    pub lines: TableClient<OrderItemRow>,
    /// Read only, to find which tables a waiter owns.
    pub tables: TableClient<TableRow>,
}

/// Collaborators injected when the desk starts running.
#[derive(Clone)]
pub struct DeskContext {
    pub catalog: Arc<dyn Catalog>,
    /// Asked to assign a table when an order on an unowned table is confirmed.
    pub seating: Option<SeatingClient>,
}

/// The order desk actor.
///
/// # Usage Pattern
///
/// 1.  **Create**: `OrderDesk::new()` returns the desk and its client.
/// 2.  **Wire**: pass the catalog (and optionally the seating client) to `run`.
/// 3.  **Run**: spawn `run` in a background task.
///
/// # Operations
///
/// * **Create**: validates, writes the header as `Unconfirmed` and the item rows, then
///   moves the order to the requested state. Any failure after the header is written
///   removes the rows written so far.
/// * **Modify**: diffs against the stored order and writes only what changed.
/// * **SetState**: see [`transition::plan`].
/// * **AssignedInState**: served through the [`StalenessCache`].
/// * Everything else is a direct read or write.
pub struct OrderDesk {
    receiver: mpsc::Receiver<OrderRequest>,
    orders: TableClient<OrderRow>,
    lines: TableClient<OrderItemRow>,
    tables: TableClient<TableRow>,
    cache: StalenessCache,
    max_tables: u32,
}

fn reply<T>(operation: &'static str, respond_to: Reply<T>, result: Result<T, OrderError>) {
    if let Err(e) = &result {
        warn!(operation, error = %e, "Request failed");
    }
    let _ = respond_to.send(result);
}

impl OrderDesk {
    /// Creates the desk and its client.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - capacity of the request channel.
    /// * `max_tables` - highest valid table number; orders must sit at 1..=max_tables.
    pub fn new(buffer_size: usize, tables: OrderTables, max_tables: u32) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let desk = Self {
            receiver,
            orders: tables.orders,
            lines: tables.lines,
            tables: tables.tables,
            cache: StalenessCache::new(),
            max_tables,
        };
        (desk, OrderClient::new(sender))
    }

    /// Runs the desk until every client is dropped.
    pub async fn run(mut self, context: DeskContext) {
        info!(max_tables = self.max_tables, "Order desk started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrderRequest::Create { order, respond_to } => {
                    debug!(?order, "Create");
                    let result = self.create(order, &context).await;
                    reply("create", respond_to, result);
                }
                OrderRequest::Modify { order, respond_to } => {
                    debug!(?order, "Modify");
                    let result = self.modify(order, &context).await;
                    reply("modify", respond_to, result);
                }
                OrderRequest::SetState {
                    id,
                    state,
                    respond_to,
                } => {
                    debug!(order_id = %id, %state, "SetState");
                    let result = self.set_state(id, state, &context).await;
                    reply("set_state", respond_to, result);
                }
                OrderRequest::State { id, respond_to } => {
                    let result = self.stored(id).await.map(|row| row.state());
                    reply("state", respond_to, result);
                }
                OrderRequest::Get { id, respond_to } => {
                    let result = self.get(id, &context).await;
                    reply("get", respond_to, result);
                }
                OrderRequest::ByTable { table, respond_to } => {
                    let result = self.select(move |row| row.table == table, &context).await;
                    reply("by_table", respond_to, result);
                }
                OrderRequest::All { respond_to } => {
                    let result = self.select(|_| true, &context).await;
                    reply("all", respond_to, result);
                }
                OrderRequest::AssignedTo { waiter, respond_to } => {
                    let result = self.assigned_to(waiter, &context).await;
                    reply("assigned_to", respond_to, result);
                }
                OrderRequest::AssignedInState {
                    waiter,
                    state,
                    respond_to,
                } => {
                    let result = self.assigned_in_state(waiter, state, &context).await;
                    reply("assigned_in_state", respond_to, result);
                }
                OrderRequest::IsPaid { id, respond_to } => {
                    let result = self.stored(id).await.map(|row| row.paid);
                    reply("is_paid", respond_to, result);
                }
                OrderRequest::SetPaid {
                    id,
                    paid,
                    respond_to,
                } => {
                    let result = self.set_paid(id, paid).await;
                    reply("set_paid", respond_to, result);
                }
                OrderRequest::Remove { id, respond_to } => {
                    let result = self.delete_rows(id).await.map_err(OrderError::from);
                    if let Ok(true) = result {
                        info!(order_id = %id, "Removed");
                    }
                    reply("remove", respond_to, result);
                }
                OrderRequest::Clear { respond_to } => {
                    let result = self.clear().await;
                    reply("clear", respond_to, result);
                }
            }
        }

        info!("Order desk stopped");
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    async fn create(&mut self, order: Order, ctx: &DeskContext) -> Result<Order, OrderError> {
        if order.items().is_empty() {
            return Err(OrderError::MissingItems);
        }
        let table = order.table();
        if !(1..=self.max_tables).contains(&table) {
            return Err(OrderError::OutOfRange {
                table,
                max: self.max_tables,
            });
        }
        if order.state == OrderState::Cancelled {
            return Err(OrderError::InvalidTransition {
                from: OrderState::Unconfirmed,
                to: OrderState::Cancelled,
            });
        }
        let ids: Vec<ItemId> = order.item_counts().into_keys().collect();
        ctx.catalog.items(&ids).await?;

        let id = match order.id {
            Some(id) => {
                if self.orders.get(id).await?.is_some() {
                    return Err(OrderError::AlreadyExists(id));
                }
                id
            }
            None => match self.orders.max_key().await? {
                None => OrderId(1),
                Some(max) => max
                    .0
                    .checked_add(1)
                    .map(OrderId)
                    .ok_or(OrderError::IdsExhausted(max))?,
            },
        };

        let now = Utc::now();
        let header = OrderRow {
            id,
            table,
            ordered_at: now,
            status: OrderState::Unconfirmed.code().to_string(),
            status_changed_at: now,
            paid: false,
        };
        self.orders
            .insert(vec![header])
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey { .. } => OrderError::AlreadyExists(id),
                e => OrderError::StoreFailure(e),
            })?;

        let created = Order::restore(
            id,
            table,
            now,
            OrderState::Unconfirmed,
            now,
            order.items().to_vec(),
        );
        match self.finish_create(id, created, order.state, ctx).await {
            Ok(created) => {
                info!(order_id = %id, table, state = %created.state, "Created");
                Ok(created)
            }
            Err(e) => {
                if let Err(rollback) = self.delete_rows(id).await {
                    warn!(order_id = %id, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn finish_create(
        &mut self,
        id: OrderId,
        mut created: Order,
        requested: OrderState,
        ctx: &DeskContext,
    ) -> Result<Order, OrderError> {
        let lines: Vec<OrderItemRow> = created
            .item_counts()
            .into_iter()
            .map(|(item, count)| OrderItemRow::new(id, item, count))
            .collect();
        self.lines.insert(lines).await?;

        if requested != OrderState::Unconfirmed {
            let change = self.transition(id, &created, requested, ctx).await?;
            created.state = change.state;
            created.status_changed_at = change.changed_at;
        }
        Ok(created)
    }

    async fn modify(&mut self, order: Order, ctx: &DeskContext) -> Result<OrderDiff, OrderError> {
        let id = order.id.ok_or(OrderError::Unsaved)?;
        let row = self.stored(id).await?;
        if order.items().is_empty() {
            return Err(OrderError::MissingItems);
        }
        let stored = self.item_counts(id).await?;
        let diff = OrderDiff::between(row.table, &stored, order.table(), &order.item_counts());
        if diff.is_empty() {
            debug!(order_id = %id, "Nothing to modify");
            return Ok(diff);
        }

        if !diff.inserts.is_empty() {
            let added: Vec<ItemId> = diff.inserts.iter().map(|(item, _)| *item).collect();
            ctx.catalog.items(&added).await?;
        }
        if let Some(table) = diff.table {
            self.orders.update(vec![(id, OrderPatch::Table(table))]).await?;
        }
        if !diff.inserts.is_empty() {
            let rows = diff
                .inserts
                .iter()
                .map(|&(item, count)| OrderItemRow::new(id, item, count))
                .collect();
            self.lines.insert(rows).await?;
        }
        if !diff.updates.is_empty() {
            let patches = diff
                .updates
                .iter()
                .map(|&(item, count)| (LineKey { order: id, item }, count))
                .collect();
            self.lines.update(patches).await?;
        }
        if !diff.deletes.is_empty() {
            let keys = diff
                .deletes
                .iter()
                .map(|&item| LineKey { order: id, item })
                .collect();
            self.lines.delete(keys).await?;
        }

        info!(
            order_id = %id,
            table = ?diff.table,
            inserts = diff.inserts.len(),
            updates = diff.updates.len(),
            deletes = diff.deletes.len(),
            "Modified"
        );
        Ok(diff)
    }

    async fn set_state(
        &mut self,
        id: OrderId,
        to: OrderState,
        ctx: &DeskContext,
    ) -> Result<StateChange, OrderError> {
        let row = self.stored(id).await?;
        let order = self
            .hydrate(vec![row], ctx.catalog.as_ref())
            .await?
            .pop()
            .ok_or(OrderError::NotFound(id))?;
        self.transition(id, &order, to, ctx).await
    }

    async fn transition(
        &mut self,
        id: OrderId,
        order: &Order,
        to: OrderState,
        ctx: &DeskContext,
    ) -> Result<StateChange, OrderError> {
        let from = order.state;
        let effect = transition::plan(from, to)?;

        if effect == Effect::Delete {
            self.delete_rows(id).await?;
            info!(order_id = %id, %from, "Cancelled");
            return Ok(StateChange {
                state: OrderState::Cancelled,
                changed_at: Utc::now(),
                elapsed_minutes: CANCELLED,
            });
        }

        if effect == Effect::TakeStockAndWrite {
            ctx.catalog.decrement_stock(order).await?;
        }
        let now = Utc::now();
        self.orders
            .update(vec![(id, OrderPatch::Status { state: to, at: now })])
            .await?;
        info!(order_id = %id, %from, %to, "State changed");

        if effect == Effect::TakeStockAndWrite {
            self.seat_if_unowned(order.table(), ctx).await;
        }
        Ok(StateChange {
            state: to,
            changed_at: now,
            elapsed_minutes: transition::elapsed_minutes(order.status_changed_at, now),
        })
    }

    /// Hands an unowned table to the seating desk. The confirm is already written, so
    /// failures are only logged.
    async fn seat_if_unowned(&self, table: u32, ctx: &DeskContext) {
        let Some(seating) = &ctx.seating else {
            return;
        };
        match self.tables.get(table).await {
            Ok(Some(row)) if row.waiter == WaiterId::UNASSIGNED => {
                match seating.assign(table).await {
                    Ok(waiter) => info!(table, %waiter, "Table assigned on confirm"),
                    Err(e) => warn!(table, error = %e, "Could not assign table on confirm"),
                }
            }
            Ok(_) => {}
            Err(e) => warn!(table, error = %e, "Could not read table owner"),
        }
    }

    async fn set_paid(&mut self, id: OrderId, paid: bool) -> Result<(), OrderError> {
        self.stored(id).await?;
        self.orders.update(vec![(id, OrderPatch::Paid(paid))]).await?;
        info!(order_id = %id, paid, "Paid flag set");
        Ok(())
    }

    async fn delete_rows(&self, id: OrderId) -> Result<bool, StoreError> {
        self.lines
            .delete_where(move |line: &OrderItemRow| line.key.order == id)
            .await?;
        Ok(self.orders.delete(vec![id]).await? > 0)
    }

    async fn clear(&mut self) -> Result<usize, OrderError> {
        self.lines.delete_where(|_: &OrderItemRow| true).await?;
        let removed = self.orders.delete_where(|_: &OrderRow| true).await?;
        info!(removed, "Cleared");
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    async fn stored(&self, id: OrderId) -> Result<OrderRow, OrderError> {
        self.orders.get(id).await?.ok_or(OrderError::NotFound(id))
    }

    async fn item_counts(&self, id: OrderId) -> Result<BTreeMap<ItemId, u32>, OrderError> {
        let lines = self
            .lines
            .select(move |line: &OrderItemRow| line.key.order == id)
            .await?;
        Ok(lines
            .into_iter()
            .map(|line| (line.key.item, line.count))
            .collect())
    }

    async fn get(&self, id: OrderId, ctx: &DeskContext) -> Result<Option<Order>, OrderError> {
        match self.orders.get(id).await? {
            Some(row) => Ok(self.hydrate(vec![row], ctx.catalog.as_ref()).await?.pop()),
            None => Ok(None),
        }
    }

    async fn select<F>(&self, filter: F, ctx: &DeskContext) -> Result<Vec<Order>, OrderError>
    where
        F: Fn(&OrderRow) -> bool + Send + Sync + 'static,
    {
        let rows = self.orders.select(filter).await?;
        self.hydrate(rows, ctx.catalog.as_ref()).await
    }

    async fn owned_tables(&self, waiter: WaiterId) -> Result<BTreeSet<u32>, OrderError> {
        let tables = self
            .tables
            .select(move |table: &TableRow| table.waiter == waiter)
            .await?;
        Ok(tables.into_iter().map(|table| table.number).collect())
    }

    async fn assigned_to(
        &self,
        waiter: WaiterId,
        ctx: &DeskContext,
    ) -> Result<Vec<Order>, OrderError> {
        if !waiter.is_waiter() {
            return self.select(|_| true, ctx).await;
        }
        let owned = self.owned_tables(waiter).await?;
        self.select(move |row| owned.contains(&row.table), ctx).await
    }

    async fn assigned_in_state(
        &mut self,
        waiter: WaiterId,
        state: OrderState,
        ctx: &DeskContext,
    ) -> Result<Vec<Order>, OrderError> {
        let summary = self
            .orders
            .summarize(move |row: &OrderRow| row.state() == state)
            .await?;
        if self.cache.is_stale(state, &summary) {
            let fetched_at = Utc::now();
            let fresh = self
                .select(move |row| row.state() == state, ctx)
                .await?;
            debug!(%state, count = fresh.len(), "Cache refreshed");
            self.cache.store(state, fresh, fetched_at);
        } else {
            debug!(%state, count = summary.count, "Cache hit");
        }

        let cached = self.cache.get(state).unwrap_or_default().to_vec();
        if !waiter.is_waiter() {
            return Ok(cached);
        }

        // A table move changes neither the count nor the status stamp, so the cached
        // table numbers can be stale; join on the headers as stored now.
        let tables: BTreeMap<OrderId, u32> = self
            .orders
            .select(move |row: &OrderRow| row.state() == state)
            .await?
            .into_iter()
            .map(|row| (row.id, row.table))
            .collect();
        let owned = self.owned_tables(waiter).await?;
        Ok(cached
            .into_iter()
            .filter_map(|order| {
                let table = order.id.and_then(|id| tables.get(&id)).copied()?;
                owned.contains(&table).then(|| order.moved_to(table))
            })
            .collect())
    }

    /// Rebuilds full orders from header rows, ordered by time of order then id.
    async fn hydrate(
        &self,
        rows: Vec<OrderRow>,
        catalog: &dyn Catalog,
    ) -> Result<Vec<Order>, OrderError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: BTreeSet<OrderId> = rows.iter().map(|row| row.id).collect();
        let lines = self
            .lines
            .select(move |line: &OrderItemRow| ids.contains(&line.key.order))
            .await?;

        let item_ids: Vec<ItemId> = lines
            .iter()
            .map(|line| line.key.item)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let menu: BTreeMap<ItemId, MenuItem> = catalog
            .items(&item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let mut items: BTreeMap<OrderId, Vec<MenuItem>> = BTreeMap::new();
        for line in lines {
            let item = menu
                .get(&line.key.item)
                .ok_or(OrderError::UnknownItem(line.key.item))?;
            items
                .entry(line.key.order)
                .or_default()
                .extend(std::iter::repeat(item.clone()).take(line.count as usize));
        }

        let mut orders: Vec<Order> = rows
            .into_iter()
            .map(|row| {
                let state = row.state();
                Order::restore(
                    row.id,
                    row.table,
                    row.ordered_at,
                    state,
                    row.status_changed_at,
                    items.remove(&row.id).unwrap_or_default(),
                )
            })
            .collect();
        orders.sort_by_key(|order| (order.ordered_at, order.id));
        Ok(orders)
    }
}
