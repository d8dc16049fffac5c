//! Per-ticker profit/loss accounting.

use serde::{Deserialize, Serialize};

use crate::Money;

/// Appreciation and dividend income for a holding, added componentwise.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProfitModel {
    pub appreciation: Money,
    pub dividends: Money,
}

impl ProfitModel {
    pub fn new(appreciation: Money, dividends: Money) -> Self {
        Self {
            appreciation,
            dividends,
        }
    }

    /// Componentwise addition. Panics on currency mismatch, same as `Money`.
    pub fn combine(&self, other: &ProfitModel) -> ProfitModel {
        ProfitModel {
            appreciation: self.appreciation + other.appreciation,
            dividends: self.dividends + other.dividends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn combine_adds_componentwise() {
        let a = ProfitModel::new(Money::usd(dec!(10)), Money::usd(dec!(1)));
        let b = ProfitModel::new(Money::usd(dec!(5)), Money::usd(dec!(2)));
        let c = a.combine(&b);
        assert_eq!(c.appreciation, Money::usd(dec!(15)));
        assert_eq!(c.dividends, Money::usd(dec!(3)));
    }
}
