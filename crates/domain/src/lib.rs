//! Domain layer for the product catalog write side.
//!
//! This crate provides the core domain model:
//! - Product aggregate with status lifecycle and dirty-field tracking
//! - Money and Discount value objects (exact rational arithmetic)
//! - ProductEvent domain events collected for the transactional outbox
//! - Effective-price calculation

pub mod error;
pub mod product;

pub use error::ProductError;
pub use product::{
    ChangeTracker, Discount, Money, Product, ProductEvent, ProductField, ProductStatus,
    effective_price,
};
