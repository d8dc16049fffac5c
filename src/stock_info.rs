//! Descriptive metadata about a tradable instrument.

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Canonical per-ticker descriptive attributes. Everything but `ticker` is
/// optional — adapters populate what their backing API exposes. Fetched
/// through an adapter's object cache (see `rebalance_broker::cache`) since
/// this data changes rarely.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StockInfo {
    pub ticker: Ticker,
    pub name: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub cusip: Option<String>,
    pub cik: Option<String>,
    pub sic_num: Option<String>,
    pub sic_description: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub tradable: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl StockInfo {
    /// A bare `StockInfo` with only the ticker populated — the minimum
    /// useful value when a lookup fails but callers still need a shaped
    /// value to cache.
    pub fn bare(ticker: Ticker) -> Self {
        Self {
            ticker,
            ..Default::default()
        }
    }
}
