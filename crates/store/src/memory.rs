use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, Version};
use domain::Product;
use tokio::sync::RwLock;

use crate::{
    CommitPlan, InsertOp, OutboxRow, ProductRow, Result, StoreError,
    executor::{CommitExecutor, ProductStore},
};

#[derive(Default)]
struct State {
    products: HashMap<String, ProductRow>,
    outbox: Vec<OutboxRow>,
}

/// In-memory catalog store for testing.
///
/// Provides the same contract as the PostgreSQL implementation: plans apply
/// all-or-nothing, and a stale conditional update rejects the whole plan.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<State>>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored row image for a product, if any.
    pub async fn product_row(&self, id: &ProductId) -> Option<ProductRow> {
        self.inner.read().await.products.get(id.as_str()).cloned()
    }

    /// Returns all outbox rows in insertion order.
    pub async fn outbox_rows(&self) -> Vec<OutboxRow> {
        self.inner.read().await.outbox.clone()
    }

    /// Returns the number of stored outbox rows.
    pub async fn outbox_count(&self) -> usize {
        self.inner.read().await.outbox.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalog {
    async fn get(&self, id: &ProductId) -> Result<Product> {
        let state = self.inner.read().await;
        match state.products.get(id.as_str()) {
            Some(row) => row.clone().into_product(),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}

#[async_trait]
impl CommitExecutor for InMemoryCatalog {
    async fn execute(&self, plan: CommitPlan) -> Result<()> {
        let mut state = self.inner.write().await;

        // Stage every conditional update before touching the store, so a
        // rejected plan leaves no trace.
        let mut staged: Vec<(String, ProductRow)> = Vec::new();
        for update in plan.updates() {
            let current = state.products.get(update.product_id.as_str());
            let matched = current.filter(|row| row.version == update.expected_version.as_i64());
            let Some(row) = matched else {
                return Err(StoreError::ConcurrentModification {
                    product_id: update.product_id.clone(),
                    expected_version: update.expected_version,
                });
            };
            let mut next = row.clone();
            update.set.apply_to(&mut next);
            next.version += 1;
            staged.push((update.product_id.as_str().to_string(), next));
        }

        // A duplicate primary-row insert is a concurrent creation race, the
        // same condition the unique key reports in PostgreSQL.
        for op in plan.inserts() {
            if let InsertOp::Product(row) = op
                && state.products.contains_key(row.product_id.as_str())
            {
                return Err(StoreError::ConcurrentModification {
                    product_id: row.product_id.clone(),
                    expected_version: Version::new(0),
                });
            }
        }

        for (id, row) in staged {
            state.products.insert(id, row);
        }
        for op in plan.inserts() {
            match op {
                InsertOp::Product(row) => {
                    state
                        .products
                        .insert(row.product_id.as_str().to_string(), row.clone());
                }
                InsertOp::Outbox(row) => state.outbox.push(row.clone()),
            }
        }
        Ok(())
    }
}
