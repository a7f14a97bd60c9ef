//! # Tracing Setup
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by the
//! `RUST_LOG` environment variable. Call it once, at the top of `main`.
//!
//! ## Levels
//!
//! ```bash
//! # Lifecycle events: tables starting, rows written, state changes
//! RUST_LOG=info cargo run
//!
//! # Full request payloads and cache decisions
//! RUST_LOG=debug cargo run
//!
//! # Only the order desk
//! RUST_LOG=front_of_house::order_desk=debug cargo run
//! ```
//!
//! ## What Gets Logged
//!
//! - **Tables**: start and shutdown with their final size, every batch written
//! - **Retries**: each transient failure a client retries, at `warn`
//! - **Errors**: rejected batches with the table, key and offending column
//!
//! With `RUST_LOG=info` a table write looks like:
//!
//! ```text
//! INFO Inserted table="orders" inserted=1 size=4
//! WARN Retrying table="menu" attempt=1 error=Store unavailable
//! INFO Updated table="menu" updated=2
//! ```
//!
//! Targets are hidden; the `table` field names the table instead.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
