//! Catalog service providing one method per write use case.

use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{Discount, Money, Product, ProductError};
use store::{
    CommitExecutor, CommitPlan, ConditionalUpdate, InsertOp, OutboxRow, ProductRow, ProductStore,
};

use crate::clock::Clock;
use crate::error::CatalogError;

/// Request to create a product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    /// Caller-supplied id; a random one is generated when absent.
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
}

impl CreateProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price_numerator: i64,
        base_price_denominator: i64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            base_price_numerator,
            base_price_denominator,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Service for catalog writes.
///
/// Every mutating method runs one load → business method → commit-plan →
/// execute cycle. Concurrency safety comes entirely from the executor's
/// version check; on [`CatalogError::is_retryable`] the caller may rerun
/// the whole call.
pub struct CatalogService<S, C> {
    store: S,
    clock: C,
}

impl<S, C> CatalogService<S, C>
where
    S: ProductStore + CommitExecutor,
    C: Clock,
{
    /// Creates a service over a store and a time source.
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Creates a product and its Created outbox row in one transaction.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, CatalogError> {
        let id = cmd.id.unwrap_or_else(ProductId::generate);
        let base_price = Money::new(cmd.base_price_numerator, cmd.base_price_denominator)
            .ok_or(ProductError::InvalidProduct)?;

        let mut product = Product::create(
            id,
            cmd.name,
            cmd.description,
            cmd.category,
            base_price,
            self.clock.now(),
        );

        let mut plan = CommitPlan::new();
        plan.add_insert(InsertOp::Product(ProductRow::from_product(&product)));
        for event in product.take_events() {
            plan.add_insert(InsertOp::Outbox(OutboxRow::for_event(&event)?));
        }
        self.store.execute(plan).await?;
        Ok(product)
    }

    /// Overwrites name, description, and category.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        name: String,
        description: String,
        category: String,
    ) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| {
            product.update_details(name, description, category, now)
        })
        .await
    }

    /// Sets the product active.
    #[tracing::instrument(skip(self))]
    pub async fn activate_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| product.activate(now))
            .await
    }

    /// Sets the product inactive.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| product.deactivate(now))
            .await
    }

    /// Archives the product.
    #[tracing::instrument(skip(self))]
    pub async fn archive_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| product.archive(now))
            .await
    }

    /// Applies a discount valid at the current instant.
    #[tracing::instrument(skip(self))]
    pub async fn apply_discount(
        &self,
        id: &ProductId,
        percent: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| {
            // An unconstructible discount is the same failure as an
            // out-of-period one.
            let discount = Discount::new(percent, start_date, end_date);
            product.apply_discount(discount, now)
        })
        .await
    }

    /// Removes the current discount, if any.
    #[tracing::instrument(skip(self))]
    pub async fn remove_discount(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.commit_mutation(id, |product, now| product.remove_discount(now))
            .await
    }

    /// Snapshot read of a product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        Ok(self.store.get(id).await?)
    }

    /// Shared load → mutate → plan → execute cycle.
    ///
    /// A business call that dirtied nothing and emitted nothing produces an
    /// empty plan, and the store is not touched at all.
    async fn commit_mutation<F>(&self, id: &ProductId, mutate: F) -> Result<Product, CatalogError>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> Result<(), ProductError>,
    {
        let mut product = self.store.get(id).await?;
        mutate(&mut product, self.clock.now())?;

        let mut plan = CommitPlan::new();
        let update = ConditionalUpdate::for_product(&product);
        let committed_update = update.is_some();
        if let Some(update) = update {
            plan.add_update(update);
        }
        for event in product.take_events() {
            plan.add_insert(InsertOp::Outbox(OutboxRow::for_event(&event)?));
        }
        if !plan.is_empty() {
            self.store.execute(plan).await?;
            if committed_update {
                product.record_commit();
            }
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use domain::{ProductStatus, effective_price};
    use store::{InMemoryCatalog, StoreError};

    use crate::clock::FixedClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn service() -> CatalogService<InMemoryCatalog, FixedClock> {
        CatalogService::new(InMemoryCatalog::new(), FixedClock(now()))
    }

    fn create_cmd() -> CreateProduct {
        CreateProduct::new("Lamp", "A desk lamp", "home", 100, 1).with_id(ProductId::new("p-1"))
    }

    #[tokio::test]
    async fn create_persists_row_and_outbox_together() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();

        assert_eq!(product.status(), ProductStatus::Active);
        assert_eq!(product.version().as_i64(), 1);

        let catalog = &service.store;
        let row = catalog.product_row(&ProductId::new("p-1")).await.unwrap();
        assert_eq!(row.version, 1);
        assert_eq!(catalog.outbox_count().await, 1);
        assert_eq!(catalog.outbox_rows().await[0].event_type, "ProductCreated");
    }

    #[tokio::test]
    async fn create_generates_id_when_absent() {
        let service = service();
        let product = service
            .create_product(CreateProduct::new("Lamp", "", "home", 100, 1))
            .await
            .unwrap();
        assert!(!product.id().as_str().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_zero_denominator_price() {
        let service = service();
        let cmd = CreateProduct::new("Lamp", "", "home", 100, 0);
        let result = service.create_product(cmd).await;
        assert!(matches!(
            result,
            Err(CatalogError::Product(ProductError::InvalidProduct))
        ));
        assert_eq!(service.store.outbox_count().await, 0);
    }

    #[tokio::test]
    async fn update_bumps_version_and_appends_outbox() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();

        let id = ProductId::new("p-1");
        let updated = service
            .update_product(&id, "Lamp v2".into(), "Brighter".into(), "office".into())
            .await
            .unwrap();

        let reloaded = service.get_product(&id).await.unwrap();
        assert_eq!(reloaded.name(), "Lamp v2");
        assert_eq!(reloaded.version().as_i64(), 2);
        // The returned aggregate matches the committed row.
        assert_eq!(updated.version(), reloaded.version());
        assert_eq!(service.store.outbox_count().await, 2);
    }

    #[tokio::test]
    async fn duplicate_create_is_a_retryable_conflict() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();

        let err = service.create_product(create_cmd()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Store(StoreError::ConcurrentModification { .. })
        ));
        assert!(err.is_retryable());

        // The losing create left neither row nor outbox entry.
        assert_eq!(service.store.outbox_count().await, 1);
        let row = service
            .store
            .product_row(&ProductId::new("p-1"))
            .await
            .unwrap();
        assert_eq!(row.version, 1);
    }

    #[tokio::test]
    async fn noop_mutation_touches_nothing() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");

        service.deactivate_product(&id).await.unwrap();
        let outbox_before = service.store.outbox_count().await;
        let version_before = service.get_product(&id).await.unwrap().version();

        // Already inactive: success, but no event, no version bump.
        service.deactivate_product(&id).await.unwrap();
        assert_eq!(service.store.outbox_count().await, outbox_before);
        assert_eq!(
            service.get_product(&id).await.unwrap().version(),
            version_before
        );
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");

        service.deactivate_product(&id).await.unwrap();
        service.activate_product(&id).await.unwrap();
        service
            .apply_discount(&id, 20, now() - Duration::days(1), now() + Duration::days(7))
            .await
            .unwrap();
        service.remove_discount(&id).await.unwrap();
        service.archive_product(&id).await.unwrap();

        let product = service.get_product(&id).await.unwrap();
        assert_eq!(product.status(), ProductStatus::Archived);
        assert_eq!(product.archived_at(), Some(now()));
        assert_eq!(product.version().as_i64(), 6);

        let types: Vec<_> = service
            .store
            .outbox_rows()
            .await
            .iter()
            .map(|r| r.event_type.clone())
            .collect();
        assert_eq!(
            types,
            vec![
                "ProductCreated",
                "ProductDeactivated",
                "ProductActivated",
                "DiscountApplied",
                "DiscountRemoved",
                "ProductArchived",
            ]
        );
    }

    #[tokio::test]
    async fn archived_product_rejects_updates() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");
        service.archive_product(&id).await.unwrap();

        let result = service
            .update_product(&id, "X".into(), "Y".into(), "Z".into())
            .await;
        assert!(matches!(
            result,
            Err(CatalogError::Product(ProductError::Archived))
        ));
    }

    #[tokio::test]
    async fn apply_discount_requires_active_product() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");
        service.deactivate_product(&id).await.unwrap();

        let result = service
            .apply_discount(&id, 20, now() - Duration::days(1), now() + Duration::days(7))
            .await;
        assert!(matches!(
            result,
            Err(CatalogError::Product(ProductError::NotActive))
        ));
    }

    #[tokio::test]
    async fn apply_discount_rejects_period_not_containing_now() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");

        let result = service
            .apply_discount(&id, 20, now() + Duration::days(1), now() + Duration::days(7))
            .await;
        assert!(matches!(
            result,
            Err(CatalogError::Product(ProductError::InvalidDiscountPeriod))
        ));

        // Inverted period fails discount construction, same error.
        let result = service
            .apply_discount(&id, 20, now() + Duration::days(7), now() - Duration::days(1))
            .await;
        assert!(matches!(
            result,
            Err(CatalogError::Product(ProductError::InvalidDiscountPeriod))
        ));
    }

    #[tokio::test]
    async fn discounted_price_is_exact() {
        let service = service();
        service.create_product(create_cmd()).await.unwrap();
        let id = ProductId::new("p-1");
        service
            .apply_discount(&id, 20, now() - Duration::days(1), now() + Duration::days(7))
            .await
            .unwrap();

        let product = service.get_product(&id).await.unwrap();
        let price = effective_price(product.base_price(), product.discount(), now());
        assert_eq!(price, Money::new(80, 1).unwrap());

        // After the period lapses the stored discount stays but stops
        // affecting the price.
        let later = now() + Duration::days(30);
        assert!(product.discount().is_some());
        assert_eq!(
            effective_price(product.base_price(), product.discount(), later),
            product.base_price()
        );
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let service = service();
        let result = service.get_product(&ProductId::new("nope")).await;
        assert!(matches!(
            result,
            Err(CatalogError::Store(StoreError::NotFound(_)))
        ));
        assert!(!result.unwrap_err().is_retryable());
    }
}
