//! # Lifecycle
//!
//! Starting, wiring and stopping the front of house.
//!
//! Every desk is created first and handed its collaborators when it starts
//! running, so the order desk can hold a [`SeatingClient`](crate::clients::SeatingClient)
//! without the seating desk knowing about orders. Clients only point "down":
//!
//! ```text
//! FrontOfHouse ─┬─> OrderDesk ──> orders, order_items, tables, MenuCatalog, SeatingDesk
//!               └─> SeatingDesk ─> tables, StaffRoster
//! ```
//!
//! The graph is acyclic, so [`FrontOfHouse::shutdown`] only has to drop its own
//! clients: each desk stops when its channel closes, which drops the clients it
//! holds, which stops the tables behind them.
//!
//! Logging is set up once by the binary with [`row_store::tracing::setup_tracing`].

pub mod error;
pub mod front_of_house;

pub use error::*;
pub use front_of_house::*;
