use async_trait::async_trait;
use common::ProductId;
use domain::Product;

use crate::{CommitPlan, Result};

/// Snapshot reads of product aggregates.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Reads the current state of a product.
    ///
    /// Returns `StoreError::NotFound` if no row exists for the id.
    async fn get(&self, id: &ProductId) -> Result<Product>;
}

/// Applies commit plans atomically.
///
/// Implementations must guarantee all-or-nothing semantics: every
/// conditional update affects exactly one row and every insert applies, or
/// the store is left untouched. A row-count mismatch on any conditional
/// update aborts with `StoreError::ConcurrentModification`.
#[async_trait]
pub trait CommitExecutor: Send + Sync {
    /// Executes the plan as one atomic transaction.
    async fn execute(&self, plan: CommitPlan) -> Result<()>;
}
