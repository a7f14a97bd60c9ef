//! # Front of House
//!
//! The order lifecycle of a restaurant floor: orders move from unconfirmed to served,
//! stock is taken when the kitchen accepts them, and every table belongs to a waiter
//! on duty.
//!
//! ## Core Components
//!
//! - **[model]**: orders, menu items, tables, waiters and their stored rows.
//! - **[order_desk]**: the single writer for orders; creation, modification diffs,
//!   the state machine and the cached per-waiter queries.
//! - **[seating]**: table ownership and the block partition over waiters on duty.
//! - **[clients]**: typed handles for both desks, plus the menu and staff tables.
//! - **[lifecycle]**: [`FrontOfHouse`](lifecycle::FrontOfHouse), which starts and stops
//!   everything.
//! - **[config]**: [`FrontOfHouseConfig`](config::FrontOfHouseConfig) and its loader.
//!
//! ## Testing
//!
//! See [`row_store::mock`] for scripting store failures without running a table.

pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod order_desk;
pub mod seating;
