//! # Menu Catalog
//!
//! [`Catalog`] over a `menu` row table, plus the write operations the manager
//! screens use.
use crate::clients::{Catalog, CatalogError};
use crate::model::{ItemId, MenuItem, MenuPatch, Order, Price};
use async_trait::async_trait;
use row_store::{RowClient, StoreError, TableClient};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct MenuCatalog {
    inner: TableClient<MenuItem>,
}

impl MenuCatalog {
    pub fn new(inner: TableClient<MenuItem>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn add_item(&self, item: MenuItem) -> Result<(), CatalogError> {
        debug!(?item, "add_item called");
        self.inner.insert(vec![item]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, id: ItemId, units: u32) -> Result<u32, CatalogError> {
        let updated = self.patch(id, MenuPatch::Restock(units)).await?;
        info!(item_id = %id, stock = updated.stock, "Restocked");
        Ok(updated.stock)
    }

    #[instrument(skip(self))]
    pub async fn set_price(&self, id: ItemId, price: Price) -> Result<(), CatalogError> {
        self.patch(id, MenuPatch::SetPrice(price)).await?;
        Ok(())
    }

    async fn patch(&self, id: ItemId, patch: MenuPatch) -> Result<MenuItem, CatalogError> {
        let mut updated = self
            .inner
            .update(vec![(id, patch)])
            .await
            .map_err(|e| match e {
                StoreError::MissingKey { .. } => CatalogError::UnknownItem(id),
                e => CatalogError::StoreFailure(e),
            })?;
        updated.pop().ok_or(CatalogError::UnknownItem(id))
    }

    async fn stock_of(&self, ids: BTreeSet<ItemId>) -> Result<BTreeMap<ItemId, u32>, CatalogError> {
        let wanted = ids.clone();
        let found: BTreeMap<ItemId, u32> = self
            .inner
            .select(move |item: &MenuItem| wanted.contains(&item.id))
            .await?
            .into_iter()
            .map(|item| (item.id, item.stock))
            .collect();
        match ids.into_iter().find(|id| !found.contains_key(id)) {
            Some(missing) => Err(CatalogError::UnknownItem(missing)),
            None => Ok(found),
        }
    }
}

impl RowClient<MenuItem> for MenuCatalog {
    type Error = CatalogError;

    fn table(&self) -> &TableClient<MenuItem> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        CatalogError::StoreFailure(e)
    }
}

#[async_trait]
impl Catalog for MenuCatalog {
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<MenuItem>, CatalogError> {
        let wanted: BTreeSet<ItemId> = ids.iter().copied().collect();
        let lookup = wanted.clone();
        let items = self
            .inner
            .select(move |item: &MenuItem| lookup.contains(&item.id))
            .await?;
        if items.len() < wanted.len() {
            let found: BTreeSet<ItemId> = items.iter().map(|item| item.id).collect();
            if let Some(missing) = wanted.difference(&found).next() {
                return Err(CatalogError::UnknownItem(*missing));
            }
        }
        Ok(items)
    }

    async fn occurrence_stock(&self, order: &Order) -> Result<BTreeMap<ItemId, u32>, CatalogError> {
        self.stock_of(order.item_counts().into_keys().collect()).await
    }

    #[instrument(skip(self, order), fields(order_id = ?order.id))]
    async fn decrement_stock(&self, order: &Order) -> Result<(), CatalogError> {
        let wanted = order.item_counts();
        let stock = self.stock_of(wanted.keys().copied().collect()).await?;
        for (item, &requested) in &wanted {
            let available = stock.get(item).copied().unwrap_or(0);
            if requested > available {
                return Err(CatalogError::OutOfStock {
                    item: *item,
                    requested,
                    available,
                });
            }
        }

        // The batch is atomic, so a concurrent decrement that got there first fails
        // the whole order rather than part of it.
        let patches = wanted
            .into_iter()
            .map(|(item, count)| (item, MenuPatch::TakeStock(count)))
            .collect();
        self.inner.update(patches).await?;
        info!("Stock taken");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, OrderState};
    use row_store::mock::{create_mock_table, expect_update, MockTable};
    use row_store::TableActor;

    fn menu() -> Vec<MenuItem> {
        vec![
            MenuItem::new(1, "Carnitas", Price(425), Category::Tacos).with_stock(4),
            MenuItem::new(2, "Agua Fresca", Price(300), Category::SoftDrinks).with_stock(1),
        ]
    }

    async fn catalog() -> MenuCatalog {
        let (actor, client) = TableActor::<MenuItem>::new(8);
        tokio::spawn(actor.run());
        let catalog = MenuCatalog::new(client);
        for item in menu() {
            catalog.add_item(item).await.unwrap();
        }
        catalog
    }

    fn order(items: &[usize]) -> Order {
        let menu = menu();
        let items = items.iter().map(|&i| menu[i].clone()).collect();
        Order::new(1, items, OrderState::Unconfirmed)
    }

    #[tokio::test]
    async fn test_decrement_takes_one_unit_per_occurrence() {
        let catalog = catalog().await;
        catalog.decrement_stock(&order(&[0, 0, 1])).await.unwrap();

        let stock = catalog.occurrence_stock(&order(&[0, 1])).await.unwrap();
        assert_eq!(stock, BTreeMap::from([(ItemId(1), 2), (ItemId(2), 0)]));
    }

    #[tokio::test]
    async fn test_short_item_leaves_every_item_untouched() {
        let catalog = catalog().await;
        let err = catalog
            .decrement_stock(&order(&[0, 1, 1]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::OutOfStock {
                item: ItemId(2),
                requested: 2,
                available: 1
            }
        );

        let carnitas = catalog.fetch(ItemId(1)).await.unwrap().unwrap();
        assert_eq!(carnitas.stock, 4);
    }

    #[tokio::test]
    async fn test_unknown_items_are_reported() {
        let catalog = catalog().await;
        assert_eq!(
            catalog.items(&[ItemId(1), ItemId(9)]).await,
            Err(CatalogError::UnknownItem(ItemId(9)))
        );
        assert_eq!(
            catalog.restock(ItemId(9), 1).await,
            Err(CatalogError::UnknownItem(ItemId(9)))
        );
        assert_eq!(catalog.restock(ItemId(2), 5).await, Ok(6));
    }

    #[tokio::test]
    async fn test_decrement_sends_one_batch() {
        let (client, mut receiver) = create_mock_table::<MenuItem>(4);
        let catalog = MenuCatalog::new(client);
        let order = order(&[0, 0]);

        let task = tokio::spawn(async move { catalog.decrement_stock(&order).await });

        match receiver.recv().await {
            Some(row_store::TableRequest::Select { respond_to, .. }) => {
                respond_to.send(Ok(vec![menu()[0].clone()])).unwrap();
            }
            other => panic!("Expected Select, got {other:?}"),
        }
        let (patches, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(patches, vec![(ItemId(1), MenuPatch::TakeStock(2))]);
        responder.send(Ok(Vec::new())).unwrap();

        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_lost_connection_surfaces_after_retries() {
        let mut mock = MockTable::<MenuItem>::new();
        for _ in 0..3 {
            mock.expect_select().return_err(StoreError::Unavailable);
        }
        let catalog = MenuCatalog::new(mock.client());

        assert_eq!(
            catalog.items(&[ItemId(1)]).await,
            Err(CatalogError::StoreFailure(StoreError::Unavailable))
        );
        mock.verify();
    }
}
