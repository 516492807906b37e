//! Persistence layer for the product catalog write side.
//!
//! A use case builds a [`CommitPlan`] — unconditional inserts plus
//! version-guarded conditional updates — and hands it to a
//! [`CommitExecutor`], which applies it as a single atomic transaction.
//! Every conditional update must affect exactly one row; otherwise the
//! whole plan is rolled back with [`StoreError::ConcurrentModification`].

pub mod error;
pub mod executor;
pub mod memory;
pub mod plan;
pub mod postgres;

pub use error::{Result, StoreError};
pub use executor::{CommitExecutor, ProductStore};
pub use memory::InMemoryCatalog;
pub use plan::{
    CommitPlan, ConditionalUpdate, DiscountColumns, FieldUpdates, InsertOp, OutboxRow, ProductRow,
};
pub use postgres::PostgresCatalog;
