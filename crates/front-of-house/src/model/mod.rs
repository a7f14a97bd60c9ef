//! Plain data types: what an order, a menu item, a table and a waiter look like, and
//! the rows they are stored as.

pub mod item;
pub mod order;
pub mod rows;
pub mod state;
pub mod table;
pub mod waiter;

pub use item::*;
pub use order::*;
pub use rows::*;
pub use state::*;
pub use table::*;
pub use waiter::*;
