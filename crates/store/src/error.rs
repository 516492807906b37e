use common::{ProductId, Version};
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional update affected a row count other than one: the row was
    /// concurrently modified or no longer exists. This is the one retryable
    /// failure; callers may reload, reapply intent, and recommit.
    ///
    /// A creation race (two inserts for the same id) reports expected
    /// version 0, meaning the row was expected absent.
    #[error("concurrent modification of product {product_id}: expected version {expected_version}")]
    ConcurrentModification {
        product_id: ProductId,
        expected_version: Version,
    },

    /// No product row exists for the id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// A persisted row could not be mapped back into the domain model.
    #[error("invalid row data: {0}")]
    InvalidRow(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization error occurred building an outbox payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
