//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::{ProductId, Version};

use crate::error::ProductError;

use super::{ChangeTracker, Discount, Money, ProductEvent, ProductField, ProductStatus};

/// Product aggregate root.
///
/// All mutation goes through business methods that enforce the status state
/// machine, mark the touched fields dirty, and append a domain event for the
/// transactional outbox. Reconstruction from storage (`restore`) marks
/// nothing dirty and emits nothing: it represents already-committed history.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    changes: ChangeTracker,
    events: Vec<ProductEvent>,
}

impl Product {
    /// Creates a new active product at version 1.
    ///
    /// Every initial field is marked dirty so the first persistence pass
    /// writes the whole row, and a single Created event is emitted.
    pub fn create(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        let category = category.into();

        let mut changes = ChangeTracker::new();
        changes.mark_dirty(ProductField::Name);
        changes.mark_dirty(ProductField::Description);
        changes.mark_dirty(ProductField::Category);
        changes.mark_dirty(ProductField::BasePrice);
        changes.mark_dirty(ProductField::Status);
        changes.mark_dirty(ProductField::UpdatedAt);

        let event = ProductEvent::created(
            id.clone(),
            name.clone(),
            description.clone(),
            category.clone(),
            base_price,
            now,
        );

        Self {
            id,
            name,
            description,
            category,
            base_price,
            discount: None,
            status: ProductStatus::Active,
            version: Version::first(),
            created_at: now,
            updated_at: now,
            archived_at: None,
            changes,
            events: vec![event],
        }
    }

    /// Reconstructs a product from its persisted state.
    ///
    /// The tracker starts empty and no events are emitted.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ProductId,
        name: String,
        description: String,
        category: String,
        base_price: Money,
        discount: Option<Discount>,
        status: ProductStatus,
        version: Version,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        archived_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            base_price,
            discount,
            status,
            version,
            created_at,
            updated_at,
            archived_at,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }
}

// Query methods
impl Product {
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns the dirty-field tracker for this instance.
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Returns the events pending since creation or the last drain.
    pub fn pending_events(&self) -> &[ProductEvent] {
        &self.events
    }

    /// Drains the pending events. Called once per transaction by the
    /// use-case layer when building outbox inserts.
    pub fn take_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }
}

// Business methods
impl Product {
    /// Overwrites name, description, and category.
    ///
    /// Fails with `Archived` if the product is archived.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::Archived);
        }
        self.name = name.into();
        self.description = description.into();
        self.category = category.into();
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Name);
        self.changes.mark_dirty(ProductField::Description);
        self.changes.mark_dirty(ProductField::Category);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events.push(ProductEvent::updated(
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.category.clone(),
            now,
        ));
        Ok(())
    }

    /// Sets status to active. No-op if already active; fails if archived.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::Archived);
        }
        if self.status == ProductStatus::Active {
            return Ok(());
        }
        self.status = ProductStatus::Active;
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Status);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events
            .push(ProductEvent::activated(self.id.clone(), now));
        Ok(())
    }

    /// Sets status to inactive. No-op if already inactive; fails if archived.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::Archived);
        }
        if self.status == ProductStatus::Inactive {
            return Ok(());
        }
        self.status = ProductStatus::Inactive;
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Status);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events
            .push(ProductEvent::deactivated(self.id.clone(), now));
        Ok(())
    }

    /// Archives the product (soft lifecycle end). No-op if already archived.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Ok(());
        }
        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Status);
        self.changes.mark_dirty(ProductField::ArchivedAt);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events.push(ProductEvent::archived(self.id.clone(), now));
        Ok(())
    }

    /// Replaces the current discount (single slot, no stacking).
    ///
    /// Requires the product to be active and the discount to be valid at
    /// `now`. Validity may lapse afterwards without being cleared; the
    /// pricing calculator re-evaluates it lazily at read time.
    pub fn apply_discount(
        &mut self,
        discount: Option<Discount>,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        if self.status != ProductStatus::Active {
            return Err(ProductError::NotActive);
        }
        let discount = match discount {
            Some(d) if d.is_valid_at(now) => d,
            _ => return Err(ProductError::InvalidDiscountPeriod),
        };
        self.discount = Some(discount);
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Discount);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events.push(ProductEvent::discount_applied(
            self.id.clone(),
            &discount,
            now,
        ));
        Ok(())
    }

    /// Advances the version after the executor has applied this instance's
    /// conditional update. The persisted row already carries the bumped
    /// version; this keeps the returned aggregate in step with it.
    pub fn record_commit(&mut self) {
        self.version = self.version.next();
    }

    /// Clears the current discount. Fails if archived; no-op without one.
    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::Archived);
        }
        if self.discount.is_none() {
            return Ok(());
        }
        self.discount = None;
        self.updated_at = now;
        self.changes.mark_dirty(ProductField::Discount);
        self.changes.mark_dirty(ProductField::UpdatedAt);
        self.events
            .push(ProductEvent::discount_removed(self.id.clone(), now));
        Ok(())
    }
}
