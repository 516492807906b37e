//! Use-case layer for the product catalog write side.
//!
//! [`CatalogService`] exposes one method per use case. Each mutating call
//! follows the same shape: load the aggregate, invoke a business method,
//! derive a commit plan from the dirty fields, append an outbox insert per
//! drained domain event, and hand the plan to the commit executor as one
//! atomic transaction.

pub mod clock;
pub mod config;
pub mod error;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::CatalogError;
pub use service::{CatalogService, CreateProduct};
