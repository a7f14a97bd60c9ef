//! # Order Desk
//!
//! Everything that reads or writes stored orders goes through the order desk actor.
//!
//! ## Structure
//!
//! - [`desk`] - the [`OrderDesk`] actor and its wiring types
//! - [`transition`] - what each state change does to the stored rows
//! - [`diff`] - [`OrderDiff`], the row changes a modification needs
//! - [`cache`] - [`StalenessCache`] behind the per-state waiter queries
//! - [`error`] - [`OrderError`]
//! - [`message`] - [`OrderRequest`], the desk's wire format
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (desk, orders) = OrderDesk::new(32, tables, config.max_tables);
//! tokio::spawn(desk.run(DeskContext { catalog, seating: Some(seating) }));
//!
//! let mut order = orders.create(Order::new(4, items, OrderState::Unconfirmed)).await?;
//! orders.set_state(&mut order, OrderState::Confirmed).await?;
//! ```

pub mod cache;
pub mod desk;
pub mod diff;
pub mod error;
pub mod message;
pub mod transition;

pub use cache::StalenessCache;
pub use desk::{DeskContext, OrderDesk, OrderTables};
pub use diff::OrderDiff;
pub use error::*;
pub use message::*;
pub use transition::{StateChange, CANCELLED};
