//! A single broker account's snapshot: holdings, cash, unsettled state.

use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use serde::{Deserialize, Serialize};

use super::PortfolioLike;
use crate::error::{CoreError, Result};
use crate::provider::ProviderId;
use crate::{Money, Ticker};

use super::profit::ProfitModel;

/// One ticker's holding within a [`RealPortfolio`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealPortfolioElement {
    pub ticker: Ticker,
    pub units: Decimal,
    pub value: Money,
    pub weight: Decimal,
    pub unsettled: bool,
    pub dividends: Money,
    pub appreciation: Money,
}

impl RealPortfolioElement {
    pub fn new(ticker: Ticker, units: Decimal, value: Money) -> Self {
        Self {
            ticker,
            units,
            value,
            weight: Decimal::ZERO,
            unsettled: false,
            dividends: Money::zero(value.currency()),
            appreciation: Money::zero(value.currency()),
        }
    }

    /// Merge another element of the same ticker, summing units/value/
    /// dividends/appreciation. Errors if tickers differ.
    pub fn merge(&self, other: &RealPortfolioElement) -> Result<RealPortfolioElement> {
        if self.ticker != other.ticker {
            return Err(CoreError::Configuration(format!(
                "cannot merge holdings for different tickers: {} vs {}",
                self.ticker, other.ticker
            )));
        }
        Ok(RealPortfolioElement {
            ticker: self.ticker,
            units: self.units + other.units,
            value: self.value.checked_add(&other.value)?,
            weight: Decimal::ZERO,
            unsettled: self.unsettled || other.unsettled,
            dividends: self.dividends.checked_add(&other.dividends)?,
            appreciation: self.appreciation.checked_add(&other.appreciation)?,
        })
    }
}

/// A broker account snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealPortfolio {
    pub holdings: Vec<RealPortfolioElement>,
    pub cash: Money,
    pub provider: Option<ProviderId>,
    pub profit_and_loss: Option<ProfitModel>,
}

impl RealPortfolio {
    pub fn new(cash: Money) -> Self {
        Self {
            holdings: Vec::new(),
            cash,
            provider: None,
            profit_and_loss: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Total value: sum of holding values plus cash.
    pub fn total_value(&self) -> Money {
        let mut total = self.cash;
        for h in &self.holdings {
            total = total.checked_add(&h.value).unwrap_or(total);
        }
        total
    }

    /// Look up a holding by ticker.
    pub fn get_holding(&self, ticker: Ticker) -> Option<&RealPortfolioElement> {
        self.holdings.iter().find(|h| h.ticker == ticker)
    }

    /// Recompute each holding's weight as `value / total_value`. No-op
    /// (weights left at their prior values) when total value is zero.
    pub fn reweight(&mut self) {
        let total = self.total_value();
        if total.is_zero() {
            return;
        }
        for h in &mut self.holdings {
            h.weight = h.value / total;
        }
    }

    /// Merge a holding into the portfolio by ticker, then reweight.
    pub fn add_holding(&mut self, holding: RealPortfolioElement) -> Result<()> {
        if let Some(existing) = self.holdings.iter().position(|h| h.ticker == holding.ticker) {
            let merged = self.holdings[existing].merge(&holding)?;
            self.holdings[existing] = merged;
        } else {
            self.holdings.push(holding);
        }
        self.reweight();
        Ok(())
    }

    /// Merge another portfolio's holdings and cash into this one, with a
    /// single reweight at the end.
    pub fn merge(&mut self, other: &RealPortfolio) -> Result<()> {
        self.cash = self.cash.checked_add(&other.cash)?;
        for h in &other.holdings {
            if let Some(existing) = self.holdings.iter().position(|e| e.ticker == h.ticker) {
                let merged = self.holdings[existing].merge(h)?;
                self.holdings[existing] = merged;
            } else {
                self.holdings.push(h.clone());
            }
        }
        self.reweight();
        Ok(())
    }
}

impl PortfolioLike for RealPortfolio {
    fn value(&self) -> Money {
        self.total_value()
    }

    fn holding_value(&self, ticker: Ticker) -> Option<Money> {
        self.get_holding(ticker).map(|h| h.value)
    }
}
