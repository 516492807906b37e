//! Product domain events.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

use super::{Discount, Money};

/// Events emitted by the product aggregate.
///
/// Events are owned by the aggregate until the use-case layer drains them
/// into outbox inserts; they are never reused across transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was created.
    Created(ProductCreatedData),

    /// Name, description, or category were overwritten.
    Updated(ProductUpdatedData),

    /// Product became active.
    Activated(ProductActivatedData),

    /// Product became inactive.
    Deactivated(ProductDeactivatedData),

    /// Product was archived (terminal).
    Archived(ProductArchivedData),

    /// A discount was applied, replacing any current one.
    DiscountApplied(DiscountAppliedData),

    /// The current discount was removed.
    DiscountRemoved(DiscountRemovedData),
}

/// Data for the Created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Updated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdatedData {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Activated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductActivatedData {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Deactivated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDeactivatedData {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Archived event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductArchivedData {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the DiscountApplied event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountAppliedData {
    pub product_id: ProductId,
    pub percent: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the DiscountRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRemovedData {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

impl ProductEvent {
    /// Returns the event-kind tag persisted with each outbox row.
    pub fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "ProductCreated",
            ProductEvent::Updated(_) => "ProductUpdated",
            ProductEvent::Activated(_) => "ProductActivated",
            ProductEvent::Deactivated(_) => "ProductDeactivated",
            ProductEvent::Archived(_) => "ProductArchived",
            ProductEvent::DiscountApplied(_) => "DiscountApplied",
            ProductEvent::DiscountRemoved(_) => "DiscountRemoved",
        }
    }

    /// Returns the id of the aggregate the event belongs to.
    pub fn product_id(&self) -> &ProductId {
        match self {
            ProductEvent::Created(d) => &d.product_id,
            ProductEvent::Updated(d) => &d.product_id,
            ProductEvent::Activated(d) => &d.product_id,
            ProductEvent::Deactivated(d) => &d.product_id,
            ProductEvent::Archived(d) => &d.product_id,
            ProductEvent::DiscountApplied(d) => &d.product_id,
            ProductEvent::DiscountRemoved(d) => &d.product_id,
        }
    }

    /// Returns the instant the transition occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::Created(d) => d.occurred_at,
            ProductEvent::Updated(d) => d.occurred_at,
            ProductEvent::Activated(d) => d.occurred_at,
            ProductEvent::Deactivated(d) => d.occurred_at,
            ProductEvent::Archived(d) => d.occurred_at,
            ProductEvent::DiscountApplied(d) => d.occurred_at,
            ProductEvent::DiscountRemoved(d) => d.occurred_at,
        }
    }

    /// Serializes the kind-specific payload for the outbox row.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ProductEvent::Created(d) => serde_json::to_value(d),
            ProductEvent::Updated(d) => serde_json::to_value(d),
            ProductEvent::Activated(d) => serde_json::to_value(d),
            ProductEvent::Deactivated(d) => serde_json::to_value(d),
            ProductEvent::Archived(d) => serde_json::to_value(d),
            ProductEvent::DiscountApplied(d) => serde_json::to_value(d),
            ProductEvent::DiscountRemoved(d) => serde_json::to_value(d),
        }
    }
}

// Convenience constructors, all taking the occurrence instant explicitly so
// results are reproducible under test.
impl ProductEvent {
    pub fn created(
        product_id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        at: DateTime<Utc>,
    ) -> Self {
        ProductEvent::Created(ProductCreatedData {
            product_id,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            base_price,
            occurred_at: at,
        })
    }

    pub fn updated(
        product_id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        ProductEvent::Updated(ProductUpdatedData {
            product_id,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            occurred_at: at,
        })
    }

    pub fn activated(product_id: ProductId, at: DateTime<Utc>) -> Self {
        ProductEvent::Activated(ProductActivatedData {
            product_id,
            occurred_at: at,
        })
    }

    pub fn deactivated(product_id: ProductId, at: DateTime<Utc>) -> Self {
        ProductEvent::Deactivated(ProductDeactivatedData {
            product_id,
            occurred_at: at,
        })
    }

    pub fn archived(product_id: ProductId, at: DateTime<Utc>) -> Self {
        ProductEvent::Archived(ProductArchivedData {
            product_id,
            occurred_at: at,
        })
    }

    pub fn discount_applied(product_id: ProductId, discount: &Discount, at: DateTime<Utc>) -> Self {
        ProductEvent::DiscountApplied(DiscountAppliedData {
            product_id,
            percent: discount.percentage(),
            start_date: discount.start_date(),
            end_date: discount.end_date(),
            occurred_at: at,
        })
    }

    pub fn discount_removed(product_id: ProductId, at: DateTime<Utc>) -> Self {
        ProductEvent::DiscountRemoved(DiscountRemovedData {
            product_id,
            occurred_at: at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn event_type_tags() {
        let id = ProductId::new("p-1");
        let price = Money::new(100, 1).unwrap();
        let discount = Discount::new(20, now(), now()).unwrap();

        let cases: Vec<(ProductEvent, &str)> = vec![
            (
                ProductEvent::created(id.clone(), "Lamp", "desc", "home", price, now()),
                "ProductCreated",
            ),
            (
                ProductEvent::updated(id.clone(), "Lamp", "desc", "home", now()),
                "ProductUpdated",
            ),
            (
                ProductEvent::activated(id.clone(), now()),
                "ProductActivated",
            ),
            (
                ProductEvent::deactivated(id.clone(), now()),
                "ProductDeactivated",
            ),
            (ProductEvent::archived(id.clone(), now()), "ProductArchived"),
            (
                ProductEvent::discount_applied(id.clone(), &discount, now()),
                "DiscountApplied",
            ),
            (
                ProductEvent::discount_removed(id.clone(), now()),
                "DiscountRemoved",
            ),
        ];

        for (event, tag) in cases {
            assert_eq!(event.event_type(), tag);
            assert_eq!(event.product_id(), &id);
            assert_eq!(event.occurred_at(), now());
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let id = ProductId::new("p-1");
        let price = Money::new(999, 100).unwrap();
        let event = ProductEvent::created(id.clone(), "Lamp", "A lamp", "home", price, now());

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Created"));

        let back: ProductEvent = serde_json::from_str(&json).unwrap();
        if let ProductEvent::Created(data) = back {
            assert_eq!(data.product_id, id);
            assert_eq!(data.base_price, price);
        } else {
            panic!("expected Created event");
        }
    }

    #[test]
    fn payload_contains_kind_specific_fields() {
        let id = ProductId::new("p-1");
        let discount = Discount::new(25, now(), now()).unwrap();
        let event = ProductEvent::discount_applied(id, &discount, now());

        let payload = event.payload().unwrap();
        assert_eq!(payload["percent"], 25);
        assert_eq!(payload["product_id"], "p-1");
    }
}
