use crate::error::MarketError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Smallest listable unit price.
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// An accumulated monetary value (order totals, revenue, invoice amounts).
///
/// Wraps `rust_decimal::Decimal` so totals never pass through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

/// A unit price listed by a supplier.
///
/// Always at least [`MIN_PRICE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Result<Self, MarketError> {
        if value >= MIN_PRICE {
            Ok(Self(value))
        } else {
            Err(MarketError::validation("Price must be greater than 0"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Price times quantity, refused once it no longer fits a `Decimal`.
    pub fn line_total(&self, quantity: u32) -> Result<Money, MarketError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Money)
            .ok_or_else(amount_too_large)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = MarketError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl From<Price> for Money {
    fn from(price: Price) -> Self {
        Self(price.0)
    }
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Converts to the gateway's minor unit (kobo), rounding half away from zero.
    pub fn to_minor_units(&self) -> i64 {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|minor| {
                minor
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .unwrap_or(i64::MAX)
    }

    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, MarketError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(amount_too_large)
    }

    /// Sums amounts that will be billed; overflow is an error, not a cap.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Result<Self, MarketError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

fn amount_too_large() -> MarketError {
    MarketError::validation("Amount is too large")
}

// The operators below feed reports and saturate at the Decimal bounds.

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.50));
        let b = Money::new(dec!(0.25));
        assert_eq!(a + b, Money::new(dec!(10.75)));
        assert_eq!(a - b, Money::new(dec!(10.25)));
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::new(dec!(11.00)));
    }

    #[test]
    fn test_price_validation() {
        assert!(Price::new(dec!(0.01)).is_ok());
        assert!(matches!(
            Price::new(dec!(0.009)),
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            Price::new(dec!(-5)),
            Err(MarketError::Validation(_))
        ));
    }

    #[test]
    fn test_price_times_quantity() {
        let price = Price::new(dec!(19.99)).unwrap();
        assert_eq!(price.line_total(3).unwrap(), Money::new(dec!(59.97)));
    }

    #[test]
    fn test_oversized_amounts_are_refused() {
        let price = Price::new(dec!(10000000000000000000000000000)).unwrap();
        assert!(matches!(
            price.line_total(10),
            Err(MarketError::Validation(_))
        ));
        assert!(price.line_total(2).is_ok());

        let big = Money::new(dec!(30000000000000000000000000000));
        assert!(matches!(
            Money::checked_sum(vec![big, big, big]),
            Err(MarketError::Validation(_))
        ));
        assert_eq!(
            Money::checked_sum(vec![Money::new(dec!(1.25)), Money::new(dec!(2))]).unwrap(),
            Money::new(dec!(3.25))
        );

        let report: Money = vec![big, big, big].into_iter().sum();
        assert_eq!(report, Money::new(Decimal::MAX));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::new(dec!(1500)).to_minor_units(), 150_000);
        assert_eq!(Money::new(dec!(12.345)).to_minor_units(), 1235);
        assert_eq!(Money::new(dec!(0.01)).to_minor_units(), 1);
        assert_eq!(Money::from_minor_units(1235), Money::new(dec!(12.35)));
        assert_eq!(Money::new(Decimal::MAX).to_minor_units(), i64::MAX);
    }

    #[test]
    fn test_price_rejects_zero_when_deserialized() {
        let parsed: Result<Price, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
        let parsed: Price = serde_json::from_str("2.5").unwrap();
        assert_eq!(parsed.value(), dec!(2.5));
    }
}
