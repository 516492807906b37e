//! Product aggregate and related types.

mod aggregate;
mod changes;
mod discount;
mod events;
mod money;
mod pricing;
mod status;

pub use aggregate::Product;
pub use changes::{ChangeTracker, ProductField};
pub use discount::Discount;
pub use events::{
    DiscountAppliedData, DiscountRemovedData, ProductActivatedData, ProductArchivedData,
    ProductCreatedData, ProductDeactivatedData, ProductEvent, ProductUpdatedData,
};
pub use money::Money;
pub use pricing::effective_price;
pub use status::ProductStatus;
