//! The broker adapter contract every brokerage integration implements.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_core::{Money, ProfitModel, ProviderId, RealPortfolio, StockInfo, Ticker};

use crate::error::Result;

/// A brokerage integration: holdings, prices, and order submission.
///
/// Implementors declare their capability envelope as associated constants
/// rather than runtime fields — callers (the planner, the composite
/// orchestrator) branch on these without an extra round trip. Real-money
/// adapters (Alpaca, Robinhood, Schwab, ...) are out of scope here; only
/// [`crate::local_dict::LocalDictAdapter`],
/// [`crate::local_dict::LocalDictNoPartialAdapter`], and
/// [`crate::dummy::DummyAdapter`] ship concrete implementations.
pub trait BrokerAdapter {
    /// This adapter's routing identity.
    const PROVIDER: ProviderId;

    /// Whether this broker accepts fractional-share (`value`) orders.
    const SUPPORTS_FRACTIONAL_SHARES: bool;

    /// Max tickers accepted per historical-price batch call. `0` means no
    /// batch history endpoint — callers must fall back to per-ticker calls.
    const SUPPORTS_BATCH_HISTORY: u32;

    /// Minimum notional accepted for any order.
    fn min_order_value(&self) -> Money;

    /// Fractional-share precision (decimal places) this adapter accepts.
    const MAX_ORDER_DECIMALS: u32;

    /// Current holdings and cash.
    fn get_holdings(&mut self) -> Result<RealPortfolio>;

    /// Spot or as-of price for one ticker.
    fn get_instrument_price(&mut self, ticker: Ticker, date: Option<chrono::NaiveDate>) -> Result<Option<Money>>;

    /// Spot or as-of prices for many tickers.
    fn get_instrument_prices(
        &mut self,
        tickers: &[Ticker],
        date: Option<chrono::NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>>;

    /// Submit a buy. Exactly one of `qty`/`value` is `Some`. Returns whether
    /// the broker accepted the order.
    fn buy_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool>;

    /// Submit a sell. Exactly one of `qty`/`value` is `Some`.
    fn sell_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool>;

    /// Tickers with pending settlement — must not be touched by a plan.
    fn get_unsettled_instruments(&mut self) -> Result<FxHashSet<Ticker>>;

    /// Per-ticker realized/unrealized profit and dividend income.
    fn get_per_ticker_profit_or_loss(&mut self) -> Result<FxHashMap<Ticker, ProfitModel>>;

    /// Per-ticker total dividends received.
    fn get_dividend_history(&mut self) -> Result<FxHashMap<Ticker, Money>>;

    /// Descriptive metadata, normally served through the object cache
    /// (see [`crate::cache::ObjectCache`]) since it changes rarely.
    fn get_stock_info(&mut self, ticker: Ticker) -> Result<StockInfo>;
}

/// Build a [`rebalance_core::ProviderContext`] price-fetcher closure bound
/// to an adapter's batch endpoint — the seam where `rebalance_broker`
/// hands the pure planner a price source without the planner knowing
/// anything about brokers.
pub fn price_fetcher_for<'a, A: BrokerAdapter>(
    adapter: &'a mut A,
) -> impl FnMut(&[Ticker]) -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> + 'a {
    move |tickers: &[Ticker]| {
        adapter
            .get_instrument_prices(tickers, None)
            .map_err(|e| e.to_string())
    }
}
