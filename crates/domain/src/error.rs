//! Domain error types.

use thiserror::Error;

/// Business-rule violations raised by the product aggregate.
///
/// Every variant is a specific, named condition; callers and transport
/// layers match on the variant, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProductError {
    /// A discount operation requires the product to be active.
    #[error("product not active")]
    NotActive,

    /// The product is archived; archived is terminal for all mutations.
    #[error("product is archived")]
    Archived,

    /// The discount is absent, out of range, or not valid at the given instant.
    #[error("invalid discount period")]
    InvalidDiscountPeriod,

    /// The product could not be constructed from the given input.
    #[error("invalid product")]
    InvalidProduct,
}
