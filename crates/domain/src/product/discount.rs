use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percentage discount with an inclusive validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    percent: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl Discount {
    /// Creates a discount.
    ///
    /// Returns `None` if the percentage is outside `[0, 100]` or the period
    /// ends before it starts.
    pub fn new(percent: i64, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Option<Self> {
        if !(0..=100).contains(&percent) {
            return None;
        }
        if end_date < start_date {
            return None;
        }
        Some(Self {
            percent,
            start_date,
            end_date,
        })
    }

    /// Returns the discount percentage.
    pub fn percentage(&self) -> i64 {
        self.percent
    }

    /// Returns the start of the validity period.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Returns the end of the validity period.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Returns true if `at` falls within `[start_date, end_date]`, both ends
    /// inclusive.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}
