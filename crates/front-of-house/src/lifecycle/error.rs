use crate::clients::{CatalogError, RosterError};
use crate::config::ConfigError;
use crate::order_desk::OrderError;
use crate::seating::SeatingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontOfHouseError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Seating(#[from] SeatingError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}
