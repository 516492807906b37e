//! Commit plans: the write-only description of one transaction.

use chrono::{DateTime, Utc};
use common::{EventId, ProductId, Version};
use domain::{Discount, Money, Product, ProductEvent, ProductField, ProductStatus};

use crate::error::StoreError;

/// Delivery status a fresh outbox row starts in, for later asynchronous relay.
pub const OUTBOX_STATUS_PENDING: &str = "pending";

/// Full column image of a product row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    pub discount_percent: Option<i64>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    /// Builds the insert image of a product aggregate.
    pub fn from_product(product: &Product) -> Self {
        let (discount_percent, discount_start_date, discount_end_date) = match product.discount() {
            Some(d) => (
                Some(d.percentage()),
                Some(d.start_date()),
                Some(d.end_date()),
            ),
            None => (None, None, None),
        };
        Self {
            product_id: product.id().clone(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            base_price_numerator: product.base_price().numerator(),
            base_price_denominator: product.base_price().denominator(),
            discount_percent,
            discount_start_date,
            discount_end_date,
            status: product.status().as_str().to_string(),
            version: product.version().as_i64(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
            archived_at: product.archived_at(),
        }
    }

    /// Reconstructs the domain aggregate from a persisted row.
    ///
    /// A stored discount that no longer passes construction (out-of-range
    /// percent, inverted period) is dropped rather than failing the read; an
    /// unknown status or impossible price means a corrupt row and fails.
    pub fn into_product(self) -> Result<Product, StoreError> {
        let status = ProductStatus::parse(&self.status).ok_or_else(|| {
            StoreError::InvalidRow(format!(
                "product {}: unknown status {:?}",
                self.product_id, self.status
            ))
        })?;
        let base_price = Money::new(self.base_price_numerator, self.base_price_denominator)
            .ok_or_else(|| {
                StoreError::InvalidRow(format!(
                    "product {}: zero base price denominator",
                    self.product_id
                ))
            })?;
        let discount = match (
            self.discount_percent,
            self.discount_start_date,
            self.discount_end_date,
        ) {
            (Some(percent), Some(start), Some(end)) => Discount::new(percent, start, end),
            _ => None,
        };
        Ok(Product::restore(
            self.product_id,
            self.name,
            self.description,
            self.category,
            base_price,
            discount,
            status,
            Version::new(self.version),
            self.created_at,
            self.updated_at,
            self.archived_at,
        ))
    }
}

/// One outbox row per drained domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRow {
    pub event_id: EventId,
    pub event_type: String,
    pub aggregate_id: ProductId,
    pub payload: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl OutboxRow {
    /// Builds a pending outbox row for a drained domain event.
    pub fn for_event(event: &ProductEvent) -> Result<Self, StoreError> {
        Ok(Self {
            event_id: EventId::new(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.product_id().clone(),
            payload: event.payload()?,
            status: OUTBOX_STATUS_PENDING.to_string(),
            created_at: event.occurred_at(),
            processed_at: None,
        })
    }
}

/// Discount columns written together when the discount slot changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountColumns {
    pub percent: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&Discount> for DiscountColumns {
    fn from(d: &Discount) -> Self {
        Self {
            percent: d.percentage(),
            start_date: d.start_date(),
            end_date: d.end_date(),
        }
    }
}

/// Typed set-clauses for a partial update, one slot per dirty field.
///
/// `discount` distinguishes "untouched" (`None`) from "dirty and set"
/// (`Some(Some(..))`) and "dirty and cleared" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub base_price: Option<(i64, i64)>,
    pub discount: Option<Option<DiscountColumns>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl FieldUpdates {
    /// Returns true if no column would be written.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.base_price.is_none()
            && self.discount.is_none()
            && self.status.is_none()
            && self.updated_at.is_none()
            && self.archived_at.is_none()
    }

    /// Applies the set-clauses to a row image. Used by the in-memory
    /// executor; the version bump is the executor's responsibility.
    pub fn apply_to(&self, row: &mut ProductRow) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(description) = &self.description {
            row.description = description.clone();
        }
        if let Some(category) = &self.category {
            row.category = category.clone();
        }
        if let Some((numerator, denominator)) = self.base_price {
            row.base_price_numerator = numerator;
            row.base_price_denominator = denominator;
        }
        match self.discount {
            Some(Some(d)) => {
                row.discount_percent = Some(d.percent);
                row.discount_start_date = Some(d.start_date);
                row.discount_end_date = Some(d.end_date);
            }
            Some(None) => {
                row.discount_percent = None;
                row.discount_start_date = None;
                row.discount_end_date = None;
            }
            None => {}
        }
        if let Some(status) = &self.status {
            row.status = status.clone();
        }
        if let Some(updated_at) = self.updated_at {
            row.updated_at = updated_at;
        }
        if let Some(archived_at) = self.archived_at {
            row.archived_at = Some(archived_at);
        }
    }
}

/// A version-guarded partial update of one product row.
///
/// Carries the implicit requirement "affects exactly one row" and the
/// implicit `version = version + 1` bump.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalUpdate {
    pub product_id: ProductId,
    pub expected_version: Version,
    pub set: FieldUpdates,
}

impl ConditionalUpdate {
    /// Derives the minimal update from the aggregate's change tracker.
    ///
    /// Returns `None` when nothing relevant is dirty, so no-op business
    /// calls produce no-op persistence.
    pub fn for_product(product: &Product) -> Option<Self> {
        let changes = product.changes();
        let mut set = FieldUpdates::default();

        if changes.dirty(ProductField::Name) {
            set.name = Some(product.name().to_string());
        }
        if changes.dirty(ProductField::Description) {
            set.description = Some(product.description().to_string());
        }
        if changes.dirty(ProductField::Category) {
            set.category = Some(product.category().to_string());
        }
        if changes.dirty(ProductField::BasePrice) {
            set.base_price = Some((
                product.base_price().numerator(),
                product.base_price().denominator(),
            ));
        }
        if changes.dirty(ProductField::Discount) {
            set.discount = Some(product.discount().map(DiscountColumns::from));
        }
        if changes.dirty(ProductField::Status) {
            set.status = Some(product.status().as_str().to_string());
        }
        if changes.dirty(ProductField::UpdatedAt) {
            set.updated_at = Some(product.updated_at());
        }
        if changes.dirty(ProductField::ArchivedAt) {
            set.archived_at = product.archived_at();
        }

        if set.is_empty() {
            return None;
        }
        Some(Self {
            product_id: product.id().clone(),
            expected_version: product.version(),
            set,
        })
    }
}

/// An unconditional insert operation.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOp {
    Product(ProductRow),
    Outbox(OutboxRow),
}

/// Transaction-scoped collection of write operations.
///
/// Built fresh per use-case invocation and consumed by the executor.
#[derive(Debug, Clone, Default)]
pub struct CommitPlan {
    inserts: Vec<InsertOp>,
    updates: Vec<ConditionalUpdate>,
}

impl CommitPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unconditional insert.
    pub fn add_insert(&mut self, op: InsertOp) {
        self.inserts.push(op);
    }

    /// Appends a conditional update.
    pub fn add_update(&mut self, update: ConditionalUpdate) {
        self.updates.push(update);
    }

    /// Ordered unconditional inserts.
    pub fn inserts(&self) -> &[InsertOp] {
        &self.inserts
    }

    /// Ordered conditional updates.
    pub fn updates(&self) -> &[ConditionalUpdate] {
        &self.updates
    }

    /// Returns true if the plan carries no operations at all.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}
