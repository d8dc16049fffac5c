//! The target allocation and its algebra: exclude, reweight, normalize,
//! and historical reweight-to-present.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::{Money, Ticker};

/// One ticker's target weight.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IdealPortfolioElement {
    pub ticker: Ticker,
    pub weight: Decimal,
}

/// A target allocation: weighted tickers that should sum to 1.
///
/// Mutated only through `exclude`, `reweight`, `add_stock`, `normalize`,
/// and `reweight_to_present` — construct from an index file or
/// programmatically, then shape with these methods.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdealPortfolio {
    pub holdings: Vec<IdealPortfolioElement>,
    pub source_date: NaiveDate,
}

/// Per-ticker result of [`IdealPortfolio::reweight_to_present`].
#[derive(Clone, Copy, Debug)]
pub struct ReweightEntry {
    pub ticker: Ticker,
    pub original_weight: Decimal,
    pub new_weight: Decimal,
    pub original_price: Option<Money>,
    pub new_price: Option<Money>,
    pub ratio: Option<Decimal>,
}

impl IdealPortfolio {
    pub fn new(holdings: Vec<IdealPortfolioElement>, source_date: NaiveDate) -> Self {
        Self {
            holdings,
            source_date,
        }
    }

    pub fn contains(&self, ticker: Ticker) -> bool {
        self.holdings.iter().any(|h| h.ticker == ticker)
    }

    /// Multiply each weight by `1/Σweight` and sort descending.
    pub fn normalize(&mut self) {
        let total: Decimal = self.holdings.iter().map(|h| h.weight).sum();
        if !total.is_zero() {
            let scale = Decimal::ONE / total;
            for h in &mut self.holdings {
                h.weight *= scale;
            }
        }
        self.holdings
            .sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());
    }

    /// Remove elements whose ticker is in `tickers`, then normalize.
    /// Logs the total weight excluded.
    pub fn exclude(&mut self, tickers: &[Ticker]) {
        let set: FxHashSet<Ticker> = tickers.iter().copied().collect();
        let removed: Decimal = self
            .holdings
            .iter()
            .filter(|h| set.contains(&h.ticker))
            .map(|h| h.weight)
            .sum();
        self.holdings.retain(|h| !set.contains(&h.ticker));
        log::info!("excluded {} tickers, {removed} weight removed", set.len());
        self.normalize();
    }

    /// For each ticker in `tickers`: if present, multiply its weight by
    /// `factor`; if absent, insert at `min_weight`. Then normalize.
    pub fn reweight(&mut self, tickers: &[Ticker], factor: Decimal, min_weight: Decimal) {
        for &ticker in tickers {
            if let Some(h) = self.holdings.iter_mut().find(|h| h.ticker == ticker) {
                h.weight *= factor;
                log::info!("reweighted {ticker} by factor {factor}");
            } else {
                self.holdings.push(IdealPortfolioElement {
                    ticker,
                    weight: min_weight,
                });
                log::info!("inserted {ticker} at min_weight {min_weight}");
            }
        }
        self.normalize();
    }

    /// Insert or bump a single ticker's weight, then normalize.
    pub fn add_stock(&mut self, ticker: Ticker, weight: Decimal) {
        if let Some(h) = self.holdings.iter_mut().find(|h| h.ticker == ticker) {
            h.weight = weight;
        } else {
            self.holdings.push(IdealPortfolioElement { ticker, weight });
        }
        self.normalize();
    }

    /// Re-anchor weights from `source_date` to today.
    ///
    /// Uses a synthetic base of 1,000,000: `shares_i = base * w_i /
    /// price_hist_i`, `value_today_i = shares_i * price_now_i`. The new
    /// weight is `value_today_i / Σ value_today` summed once over every
    /// ticker's resolved value (this is the corrected form: the source
    /// implementation recomputes the denominator inside its loop against a
    /// variable that shadows the running total, which silently changes the
    /// normalization basis per-iteration — here the sum is accumulated
    /// once, over all tickers, before any weight is finalized).
    /// If either price is missing for a ticker, that ticker's value is
    /// held at `base * w_i` rather than dropped. Updates `source_date` to
    /// `today` and normalizes.
    pub fn reweight_to_present(
        &mut self,
        today: NaiveDate,
        mut historical_price: impl FnMut(Ticker, NaiveDate) -> Option<Money>,
        mut current_price: impl FnMut(Ticker) -> Option<Money>,
    ) -> Result<Vec<ReweightEntry>> {
        const BASE: i64 = 1_000_000;
        let base = Decimal::from(BASE);

        let mut today_values: Vec<Decimal> = Vec::with_capacity(self.holdings.len());
        let mut reports: Vec<ReweightEntry> = Vec::with_capacity(self.holdings.len());

        for h in &self.holdings {
            let hist = historical_price(h.ticker, self.source_date);
            let now = current_price(h.ticker);

            let (value_today, ratio) = match (hist, now) {
                (Some(p_hist), Some(p_now)) if !p_hist.is_zero() => {
                    let shares = base * h.weight / p_hist.value();
                    let value = shares * p_now.value();
                    (value, Some(p_now.value() / p_hist.value()))
                }
                _ => (base * h.weight, None),
            };

            today_values.push(value_today);
            reports.push(ReweightEntry {
                ticker: h.ticker,
                original_weight: h.weight,
                new_weight: Decimal::ZERO, // filled in below
                original_price: hist,
                new_price: now,
                ratio,
            });
        }

        let total: Decimal = today_values.iter().sum();
        if total.is_zero() {
            return Err(CoreError::Configuration(
                "reweight_to_present: total value across all tickers is zero".into(),
            ));
        }

        for ((h, value), report) in self
            .holdings
            .iter_mut()
            .zip(today_values.iter())
            .zip(reports.iter_mut())
        {
            h.weight = value / total;
            report.new_weight = h.weight;
        }

        self.source_date = today;
        self.normalize();

        Ok(reports)
    }
}
