use num_rational::Rational64;
use serde::{Deserialize, Serialize};

/// Exact monetary amount stored as a rational number.
///
/// No floating point anywhere in the price path: amounts are kept as a
/// numerator/denominator pair and every arithmetic result is a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Rational64);

impl Money {
    /// Creates a money amount from a numerator/denominator pair.
    ///
    /// Returns `None` if the denominator is zero.
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Self(Rational64::new(numerator, denominator)))
    }

    /// Creates a money amount from a rational value.
    pub fn from_ratio(ratio: Rational64) -> Self {
        Self(ratio)
    }

    /// Returns the reduced numerator.
    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    /// Returns the reduced denominator (always positive, never zero).
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// Returns the underlying rational value.
    pub fn ratio(&self) -> Rational64 {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_denominator() {
        assert!(Money::new(100, 0).is_none());
    }

    #[test]
    fn round_trips_exact_value() {
        let m = Money::new(1, 3).unwrap();
        assert_eq!(m.numerator(), 1);
        assert_eq!(m.denominator(), 3);
        assert_eq!(Money::new(m.numerator(), m.denominator()), Some(m));
    }

    #[test]
    fn reduces_to_lowest_terms() {
        let m = Money::new(50, 100).unwrap();
        assert_eq!(m.numerator(), 1);
        assert_eq!(m.denominator(), 2);
        assert_eq!(m, Money::new(1, 2).unwrap());
    }

    #[test]
    fn negative_denominator_normalizes_sign() {
        let m = Money::new(3, -4).unwrap();
        assert_eq!(m.numerator(), -3);
        assert_eq!(m.denominator(), 4);
    }

    #[test]
    fn serialization_roundtrip() {
        let m = Money::new(999, 7).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
