use front_of_house::config::ConfigLoader;
use front_of_house::lifecycle::{FrontOfHouse, FrontOfHouseError};
use front_of_house::model::{Category, MenuItem, Order, OrderState, Price, WaiterId};
use row_store::tracing::setup_tracing;
use std::path::PathBuf;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), FrontOfHouseError> {
    setup_tracing();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = ConfigLoader::load(path.as_deref())?;
    info!(?config, "Starting front of house");

    let foh = FrontOfHouse::start(config).await?;

    let span = tracing::info_span!("setup");
    async {
        for item in [
            MenuItem::new(1, "Carnitas Taco", Price(425), Category::Tacos).with_stock(20),
            MenuItem::new(2, "Nachos", Price(650), Category::Sides)
                .with_stock(10)
                .vegetarian(),
            MenuItem::new(3, "Horchata", Price(300), Category::SoftDrinks)
                .with_stock(15)
                .vegan()
                .gluten_free(),
        ] {
            foh.catalog.add_item(item).await?;
        }
        foh.roster.enroll(WaiterId(1), "Ana").await?;
        foh.roster.enroll(WaiterId(2), "Bea").await?;
        foh.roster.log_in(WaiterId(1)).await?;
        foh.roster.log_in(WaiterId(2)).await?;
        Ok::<_, FrontOfHouseError>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("service", table = 9);
    let service = async {
        let taco = MenuItem::new(1, "Carnitas Taco", Price(425), Category::Tacos);
        let drink = MenuItem::new(3, "Horchata", Price(300), Category::SoftDrinks);
        let mut order = foh
            .orders
            .create(Order::new(9, vec![taco.clone(), taco, drink], OrderState::Unconfirmed))
            .await?;
        info!(order_id = ?order.id, price = %order.price(), "Order placed");

        for state in [OrderState::Confirmed, OrderState::Ready, OrderState::Served] {
            let minutes = foh.advance(&mut order, state).await?;
            info!(%state, minutes, "Order advanced");
        }

        let owner = foh.seating.owner(9).await?;
        let moves = foh.log_out(owner).await?;
        info!(%owner, ?moves, "Waiter went off duty");
        Ok::<_, FrontOfHouseError>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = service {
        error!(error = %e, "Service failed");
    }

    foh.shutdown().await?;
    info!("Front of house stopped");
    Ok(())
}
