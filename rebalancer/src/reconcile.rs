//! Post-execution reconciliation: how far the composite portfolio still
//! sits from the ideal allocation after a run.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;

use rebalance_core::{CompositePortfolio, IdealPortfolio, Money, PortfolioLike, Ticker};

/// One ticker's post-run gap against the ideal allocation.
#[derive(Debug, Clone)]
pub struct ReconcileEntry {
    pub ticker: Ticker,
    pub target_weight: rust_decimal::Decimal,
    pub actual_value: Money,
    /// Positive: still under target (a buy remains). Negative: over
    /// target (a sell would close the gap).
    pub gap_value: Money,
}

/// A full reconciliation pass over every ideal holding.
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub target_size: Money,
    pub entries: Vec<ReconcileEntry>,
    /// RMS of per-ticker weight deviation (actual weight vs. target
    /// weight), expressed as a percentage — a single-number summary of
    /// how far the composite has drifted from the ideal allocation.
    pub tracking_error_pct: f64,
}

impl ReconcileReport {
    /// Entries whose gap exceeds `threshold` in absolute notional — the
    /// ones worth a human's attention.
    pub fn material_gaps(&self, threshold: Money) -> impl Iterator<Item = &ReconcileEntry> {
        self.entries
            .iter()
            .filter(move |e| e.gap_value.abs().value() > threshold.value())
    }

    pub fn is_fully_reconciled(&self, threshold: Money) -> bool {
        self.material_gaps(threshold).next().is_none()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reconciliation against target size {}:", self.target_size)?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:<10} target={:>6.2}%  actual={}  gap={}",
                e.ticker,
                e.target_weight * rust_decimal::Decimal::from(100),
                e.actual_value,
                e.gap_value
            )?;
        }
        writeln!(f, "\n  Tracking error: {:.3}%", self.tracking_error_pct)?;
        Ok(())
    }
}

/// Compare the composite's merged holdings against `ideal`, using
/// `target_size` (typically the value computed for the run that just
/// executed).
pub fn reconcile(composite: &CompositePortfolio, ideal: &IdealPortfolio, target_size: Money) -> ReconcileReport {
    let (to_buy, to_sell) = rebalance_core::compare_portfolios(composite, ideal, Some(target_size));

    let mut entries = Vec::with_capacity(ideal.holdings.len());
    let mut sum_sq_diff = 0f64;
    for h in &ideal.holdings {
        let actual = composite
            .holding_value(h.ticker)
            .unwrap_or_else(|| Money::zero(target_size.currency()));
        let gap_value = if let Some(buy) = to_buy.get(&h.ticker) {
            *buy
        } else if let Some(sell) = to_sell.get(&h.ticker) {
            -*sell
        } else {
            Money::zero(target_size.currency())
        };

        if !target_size.is_zero() {
            let actual_weight = (actual.value() / target_size.value()).to_f64().unwrap_or(0.0);
            let target_weight = h.weight.to_f64().unwrap_or(0.0);
            sum_sq_diff += (actual_weight - target_weight).powi(2);
        }

        entries.push(ReconcileEntry {
            ticker: h.ticker,
            target_weight: h.weight,
            actual_value: actual,
            gap_value,
        });
    }
    let tracking_error_pct = (sum_sq_diff / entries.len().max(1) as f64).sqrt() * 100.0;

    ReconcileReport { target_size, entries, tracking_error_pct }
}
