//! Clients for the two desks, and the menu and staff tables they lean on.
pub mod catalog_client;
pub mod order_client;
pub mod roster_client;
pub mod seating_client;
pub mod traits;

pub use catalog_client::MenuCatalog;
pub use order_client::OrderClient;
pub use roster_client::StaffRoster;
pub use seating_client::SeatingClient;
pub use traits::*;
