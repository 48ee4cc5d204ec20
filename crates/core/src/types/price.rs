//! Decimal price type.
//!
//! All catalog prices are in USD, so a price is a bare decimal amount.
//! Serialized as a string (`"24.99"`) to avoid float rounding in clients.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative USD amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of cents.
    ///
    /// ```
    /// use lucid_core::Price;
    ///
    /// assert_eq!(Price::from_cents(2499).to_string(), "24.99");
    /// ```
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(2499).amount(), Decimal::new(2499, 2));
        assert_eq!(Price::from_cents(0), Price::ZERO);
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::from_cents(2499);
        let total: Price = [unit.times(2), Price::from_cents(2999)].into_iter().sum();
        assert_eq!(total.to_string(), "79.97");
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(3999).to_string(), "39.99");
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(2499)).unwrap();
        assert_eq!(json, "\"24.99\"");
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Price::from_cents(2499));
    }
}
