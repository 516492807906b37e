pub mod types;

pub use types::{EventId, ProductId, Version};
