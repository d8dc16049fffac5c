//! Exact-decimal monetary values with a currency tag.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Account currency. A single currency per adapter; the core never converts
/// between them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// The currency's conventional prefix symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "\u{20ac}",
            Currency::Gbp => "\u{a3}",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "$" => Some(Currency::Usd),
            "\u{20ac}" => Some(Currency::Eur),
            "\u{a3}" => Some(Currency::Gbp),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An exact decimal monetary value tagged with a currency.
///
/// ```
/// use rebalance_core::Money;
/// use rust_decimal_macros::dec;
///
/// let a = Money::usd(dec!(12.34));
/// let b = Money::parse("$12.34").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(format!("{a}"), "$12.34");
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::str")]
    value: Decimal,
    currency: Currency,
}

impl Money {
    /// Construct from a `Decimal` and an explicit currency.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Construct a USD value — the common case in tests and examples.
    pub fn usd(value: Decimal) -> Self {
        Self::new(value, Currency::Usd)
    }

    /// The zero value of a given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Parse a decimal string, with an optional leading currency symbol
    /// (`"$12.34"`, `"12.34"`). Defaults to USD when no symbol is present.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (currency, rest) = match trimmed.chars().next() {
            Some(c) if !c.is_ascii_digit() && c != '-' && c != '+' => {
                let sym_len = c.len_utf8();
                let currency = Currency::from_symbol(&trimmed[..sym_len])
                    .ok_or_else(|| CoreError::MoneyParse(input.to_string()))?;
                (currency, trimmed[sym_len..].trim())
            }
            _ => (Currency::Usd, trimmed),
        };
        let cleaned: String = rest.chars().filter(|c| *c != ',').collect();
        let value = cleaned
            .parse::<Decimal>()
            .map_err(|_| CoreError::MoneyParse(input.to_string()))?;
        Ok(Self::new(value, currency))
    }

    /// The underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The currency tag.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// True iff the underlying value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Absolute value, same currency.
    pub fn abs(&self) -> Self {
        Self::new(self.value.abs(), self.currency)
    }

    /// Round to `n` decimal places (banker's rounding, matching
    /// `rust_decimal`'s default `round_dp`).
    pub fn round(&self, n: u32) -> Self {
        Self::new(self.value.round_dp(n), self.currency)
    }

    fn check_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(CoreError::CurrencyMismatch {
                lhs: self.currency,
                rhs: other.currency,
            });
        }
        Ok(())
    }

    /// Fallible addition across potentially mismatched currencies.
    pub fn checked_add(&self, other: &Money) -> Result<Money> {
        self.check_currency(other)?;
        Ok(Money::new(self.value + other.value, self.currency))
    }

    /// Fallible subtraction across potentially mismatched currencies.
    pub fn checked_sub(&self, other: &Money) -> Result<Money> {
        self.check_currency(other)?;
        Ok(Money::new(self.value - other.value, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency.symbol(), self.value.round_dp(2))
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.currency == other.currency && self.value == other.value
    }
}
impl Eq for Money {}

impl PartialEq<i32> for Money {
    fn eq(&self, other: &i32) -> bool {
        self.value == Decimal::from(*other)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.value.partial_cmp(&other.value)
    }
}

/// Panics on currency mismatch — use [`Money::checked_add`] when the
/// currencies aren't known to match statically.
impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Self) -> Money {
        self.checked_add(&rhs)
            .expect("Money addition requires matching currencies")
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Self) -> Money {
        self.checked_sub(&rhs)
            .expect("Money subtraction requires matching currencies")
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money::new(-self.value, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;
    fn mul(self, rhs: Decimal) -> Money {
        Money::new(self.value * rhs, self.currency)
    }
}

impl Div<Decimal> for Money {
    type Output = Money;
    fn div(self, rhs: Decimal) -> Money {
        Money::new(self.value / rhs, self.currency)
    }
}

/// Dividing Money by Money yields a bare ratio (shares, weight fraction)
/// when both sides share a currency. Panics on mismatch, as with `+`/`-`.
impl Div<Money> for Money {
    type Output = Decimal;
    fn div(self, rhs: Money) -> Decimal {
        assert_eq!(self.currency, rhs.currency, "Money division requires matching currencies");
        self.value / rhs.value
    }
}

/// `sum(...)` begins at an untagged zero and upgrades to the first addend's
/// currency, matching the Python source's `__radd__(0)` identity.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        let mut acc: Option<Money> = None;
        for m in iter {
            acc = Some(match acc {
                None => m,
                Some(a) => a + m,
            });
        }
        acc.unwrap_or_else(|| Money::zero(Currency::Usd))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_with_symbol() {
        let m = Money::parse("$12.34").unwrap();
        assert_eq!(m.value(), dec!(12.34));
        assert_eq!(m.currency(), Currency::Usd);
    }

    #[test]
    fn parse_without_symbol_defaults_usd() {
        let m = Money::parse("12.34").unwrap();
        assert_eq!(m.currency(), Currency::Usd);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::parse("not a number").is_err());
    }

    #[test]
    fn display_rounds_to_cents() {
        let m = Money::usd(dec!(12.345));
        assert_eq!(format!("{m}"), "$12.35");
    }

    #[test]
    fn currency_mismatch_on_add() {
        let a = Money::usd(dec!(1));
        let b = Money::new(dec!(1), Currency::Eur);
        assert!(a.checked_add(&b).is_err());
    }

    #[test]
    #[should_panic]
    fn add_operator_panics_on_mismatch() {
        let a = Money::usd(dec!(1));
        let b = Money::new(dec!(1), Currency::Eur);
        let _ = a + b;
    }

    #[test]
    fn sum_identity_preserves_currency() {
        let values = vec![Money::usd(dec!(1)), Money::usd(dec!(2)), Money::usd(dec!(3))];
        let total: Money = values.into_iter().sum();
        assert_eq!(total, Money::usd(dec!(6)));
    }

    #[test]
    fn sum_of_empty_is_zero_usd() {
        let values: Vec<Money> = vec![];
        let total: Money = values.into_iter().sum();
        assert!(total.is_zero());
        assert_eq!(total.currency(), Currency::Usd);
    }

    #[test]
    fn is_zero_exact() {
        assert!(Money::usd(dec!(0)).is_zero());
        assert!(!Money::usd(dec!(0.0001)).is_zero());
    }

    #[test]
    fn abs_and_round() {
        let m = Money::usd(dec!(-12.345));
        assert_eq!(m.abs().value(), dec!(12.345));
        assert_eq!(m.round(2).value(), dec!(-12.35));
    }

    #[test]
    fn json_roundtrip() {
        let m = Money::usd(dec!(12.34));
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn division_by_money_yields_ratio() {
        let a = Money::usd(dec!(50));
        let b = Money::usd(dec!(100));
        assert_eq!(a / b, dec!(0.5));
    }

    #[test]
    fn ordering_same_currency() {
        assert!(Money::usd(dec!(1)) < Money::usd(dec!(2)));
    }

    #[test]
    fn ordering_cross_currency_is_none() {
        let a = Money::usd(dec!(1));
        let b = Money::new(dec!(1), Currency::Eur);
        assert_eq!(a.partial_cmp(&b), None);
    }
}
