//! # Seating
//!
//! Table ownership: which waiter looks after which table, and the table flags
//! (seated, clean, help requested) the floor staff toggle.
//!
//! - [`desk`] - the [`SeatingDesk`] actor
//! - [`partition`] - [`block_owner`], the table-to-waiter partition
//! - [`error`] - [`SeatingError`]
//! - [`message`] - [`SeatingRequest`] and [`Move`]

pub mod desk;
pub mod error;
pub mod message;
pub mod partition;

pub use desk::SeatingDesk;
pub use error::*;
pub use message::*;
pub use partition::block_owner;
