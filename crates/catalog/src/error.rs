//! Use-case error types.

use domain::ProductError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by catalog use cases.
///
/// A transport layer maps these to wire status codes by matching variants;
/// nothing here is meant to be string-matched.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A business rule rejected the request.
    #[error("product error: {0}")]
    Product(#[from] ProductError),

    /// The persistence layer rejected or failed the request.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Returns true for the one condition worth retrying: the commit lost an
    /// optimistic-concurrency race. Retrying means reloading the aggregate
    /// and reapplying the business intent; the core never retries itself.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Store(StoreError::ConcurrentModification { .. })
        )
    }
}
