//! A read-through aggregate over multiple broker accounts.

use crate::error::Result;
use crate::provider::ProviderId;
use crate::{Money, Ticker};

use super::real::RealPortfolio;
use super::PortfolioLike;

/// Union view over N [`RealPortfolio`]s: same-ticker holdings merged for
/// comparison purposes, total cash, total value, and lookup by provider
/// identity.
///
/// Rebuilding the merged cache is idempotent and required after any
/// constituent portfolio changes — call [`CompositePortfolio::rebuild_cache`]
/// after mutating a portfolio obtained via [`CompositePortfolio::portfolio_mut`].
pub struct CompositePortfolio {
    portfolios: Vec<RealPortfolio>,
    merged: RealPortfolio,
}

impl CompositePortfolio {
    pub fn new(portfolios: Vec<RealPortfolio>) -> Result<Self> {
        let currency = portfolios
            .first()
            .map(|p| p.cash.currency())
            .unwrap_or_default();
        let mut composite = Self {
            portfolios,
            merged: RealPortfolio::new(Money::zero(currency)),
        };
        composite.rebuild_cache()?;
        Ok(composite)
    }

    /// Recompute the merged view from the current constituent portfolios.
    pub fn rebuild_cache(&mut self) -> Result<()> {
        let currency = self
            .portfolios
            .first()
            .map(|p| p.cash.currency())
            .unwrap_or_default();
        let mut merged = RealPortfolio::new(Money::zero(currency));
        for p in &self.portfolios {
            merged.merge(p)?;
        }
        self.merged = merged;
        Ok(())
    }

    /// The constituent portfolios, in the order supplied to `new`.
    pub fn portfolios(&self) -> &[RealPortfolio] {
        &self.portfolios
    }

    /// Mutable access to the constituents, for callers that refresh
    /// holdings in place before calling [`CompositePortfolio::rebuild_cache`].
    pub fn portfolios_mut(&mut self) -> &mut Vec<RealPortfolio> {
        &mut self.portfolios
    }

    /// Look up a constituent by provider identity.
    pub fn by_provider(&self, id: ProviderId) -> Option<&RealPortfolio> {
        self.portfolios.iter().find(|p| p.provider == Some(id))
    }

    /// Total cash across all constituents.
    pub fn total_cash(&self) -> Money {
        self.merged.cash
    }

    /// The merged, union-of-holdings view.
    pub fn merged(&self) -> &RealPortfolio {
        &self.merged
    }
}

impl PortfolioLike for CompositePortfolio {
    fn value(&self) -> Money {
        self.merged.total_value()
    }

    fn holding_value(&self, ticker: Ticker) -> Option<Money> {
        self.merged.holding_value(ticker)
    }
}
