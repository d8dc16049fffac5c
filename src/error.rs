//! Error taxonomy for the rebalancing core.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::Ticker;

/// Errors raised by money arithmetic, the planner, and the price cache.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A money string could not be parsed (see `Money::parse`).
    #[error("could not parse money value: {0}")]
    MoneyParse(String),

    /// An operation mixed two different currencies.
    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch {
        lhs: crate::money::Currency,
        rhs: crate::money::Currency,
    },

    /// Some ticker's price could not be obtained from the underlying fetcher.
    #[error("price fetch failed for {tickers:?}: {cause}")]
    PriceFetch {
        tickers: FxHashSet<Ticker>,
        cause: String,
    },

    /// Adapter or planner configuration is invalid (bad credentials, empty
    /// endpoint, malformed index file, etc). Fatal to the caller.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result alias used throughout `rebalance_core`.
pub type Result<T> = std::result::Result<T, CoreError>;
