use serde::{Deserialize, Serialize};

/// Lifecycle status of a product.
///
/// `Active` and `Inactive` flip freely in both directions; `Archived` is a
/// terminal state reached from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
    Archived,
}

impl ProductStatus {
    /// Returns the persisted string form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Archived => "archived",
        }
    }

    /// Parses a persisted status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }

    /// Returns true if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Archived)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for status in [
            ProductStatus::Active,
            ProductStatus::Inactive,
            ProductStatus::Archived,
        ] {
            assert_eq!(ProductStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProductStatus::parse("deleted"), None);
    }

    #[test]
    fn only_archived_is_terminal() {
        assert!(ProductStatus::Archived.is_terminal());
        assert!(!ProductStatus::Active.is_terminal());
        assert!(!ProductStatus::Inactive.is_terminal());
    }
}
