//! Effective-price calculation.

use chrono::{DateTime, Utc};
use num_rational::Rational64;

use super::{Discount, Money};

/// Computes the price in effect at `at`.
///
/// If the discount is absent or not valid at `at`, the result is the base
/// price unchanged. Otherwise the result is
/// `base * (100 - percent) / 100`, computed in exact rational arithmetic;
/// rounding is left to whatever presentation layer renders the value.
///
/// Discount expiry is evaluated here, lazily, against the caller-supplied
/// instant: a product may carry an expired discount in storage indefinitely
/// and this function simply stops honoring it.
pub fn effective_price(base: Money, discount: Option<&Discount>, at: DateTime<Utc>) -> Money {
    match discount {
        Some(d) if d.is_valid_at(at) => {
            let factor = Rational64::new(100 - d.percentage(), 100);
            Money::from_ratio(base.ratio() * factor)
        }
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn current_discount(percent: i64) -> Discount {
        Discount::new(percent, at() - Duration::days(1), at() + Duration::days(1)).unwrap()
    }

    #[test]
    fn no_discount_returns_base_exactly() {
        let base = Money::new(100, 1).unwrap();
        assert_eq!(effective_price(base, None, at()), base);
    }

    #[test]
    fn twenty_percent_off_hundred_is_exactly_eighty() {
        let base = Money::new(100, 1).unwrap();
        let d = current_discount(20);
        assert_eq!(
            effective_price(base, Some(&d), at()),
            Money::new(80, 1).unwrap()
        );
    }

    #[test]
    fn fifty_percent_off_hundred_is_exactly_fifty() {
        let base = Money::new(100, 1).unwrap();
        let d = current_discount(50);
        assert_eq!(
            effective_price(base, Some(&d), at()),
            Money::new(50, 1).unwrap()
        );
    }

    #[test]
    fn fractional_base_stays_exact() {
        // 1/3 with 25% off = 1/4, no precision loss.
        let base = Money::new(1, 3).unwrap();
        let d = current_discount(25);
        assert_eq!(
            effective_price(base, Some(&d), at()),
            Money::new(1, 4).unwrap()
        );
    }

    #[test]
    fn expired_discount_is_ignored() {
        let base = Money::new(100, 1).unwrap();
        let expired =
            Discount::new(20, at() - Duration::days(9), at() - Duration::days(2)).unwrap();
        assert_eq!(effective_price(base, Some(&expired), at()), base);
    }

    #[test]
    fn discount_honored_at_boundaries() {
        let base = Money::new(100, 1).unwrap();
        let d = current_discount(20);
        let eighty = Money::new(80, 1).unwrap();

        assert_eq!(effective_price(base, Some(&d), d.start_date()), eighty);
        assert_eq!(effective_price(base, Some(&d), d.end_date()), eighty);
        assert_eq!(
            effective_price(base, Some(&d), d.end_date() + Duration::seconds(1)),
            base
        );
    }

    #[test]
    fn hundred_percent_discount_is_free() {
        let base = Money::new(100, 1).unwrap();
        let d = current_discount(100);
        assert_eq!(
            effective_price(base, Some(&d), at()),
            Money::new(0, 1).unwrap()
        );
    }
}
