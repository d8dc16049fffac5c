//! A configurable mock adapter for integration tests — records submitted
//! orders and returns canned positions/quotes without network calls.
//!
//! ```ignore
//! use rebalance_broker::mock::{MockAdapter, FillMode};
//! use rebalance_core::{Money, Ticker};
//! use rust_decimal_macros::dec;
//!
//! let adapter = MockAdapter::builder()
//!     .fill_mode(FillMode::Accept)
//!     .with_position(Ticker::new("AAPL"), dec!(100), Money::usd(dec!(15000)))
//!     .with_price(Ticker::new("AAPL"), Money::usd(dec!(150)))
//!     .with_cash(Money::usd(dec!(5000)))
//!     .build();
//! ```

use std::sync::Mutex;

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_core::{Money, OrderType, ProfitModel, ProviderId, RealPortfolio, RealPortfolioElement, StockInfo, Ticker};

use crate::adapter::BrokerAdapter;
use crate::error::{BrokerError, Result};

/// How the mock handles submitted orders.
#[derive(Clone, Copy, Debug)]
pub enum FillMode {
    /// Every order is accepted.
    Accept,
    /// Every order is rejected with `BrokerError::Order`.
    Reject,
    /// The first `n` orders are throttled, then orders are accepted.
    ThrottleThen(u32),
}

/// A recorded order submission for assertion in tests.
#[derive(Clone, Debug)]
pub struct RecordedOrder {
    pub ticker: Ticker,
    pub order_type: OrderType,
    pub qty: Option<Decimal>,
    pub value: Option<Money>,
}

pub struct MockAdapterBuilder {
    fill_mode: FillMode,
    holdings: FxHashMap<Ticker, RealPortfolioElement>,
    prices: FxHashMap<Ticker, Money>,
    unsettled: FxHashSet<Ticker>,
    cash: Money,
}

impl MockAdapterBuilder {
    pub fn fill_mode(mut self, mode: FillMode) -> Self {
        self.fill_mode = mode;
        self
    }

    pub fn with_position(mut self, ticker: Ticker, units: Decimal, value: Money) -> Self {
        self.holdings
            .insert(ticker, RealPortfolioElement::new(ticker, units, value));
        self
    }

    pub fn with_price(mut self, ticker: Ticker, price: Money) -> Self {
        self.prices.insert(ticker, price);
        self
    }

    pub fn with_unsettled(mut self, ticker: Ticker) -> Self {
        self.unsettled.insert(ticker);
        self
    }

    pub fn with_cash(mut self, cash: Money) -> Self {
        self.cash = cash;
        self
    }

    pub fn build(self) -> MockAdapter {
        MockAdapter {
            fill_mode: self.fill_mode,
            holdings: self.holdings,
            prices: self.prices,
            unsettled: self.unsettled,
            cash: self.cash,
            submitted: Mutex::new(Vec::new()),
            throttle_count: Mutex::new(0),
        }
    }
}

/// A mock broker adapter: records every submitted order and answers
/// according to a configurable [`FillMode`].
pub struct MockAdapter {
    fill_mode: FillMode,
    holdings: FxHashMap<Ticker, RealPortfolioElement>,
    prices: FxHashMap<Ticker, Money>,
    unsettled: FxHashSet<Ticker>,
    cash: Money,
    submitted: Mutex<Vec<RecordedOrder>>,
    throttle_count: Mutex<u32>,
}

impl MockAdapter {
    pub fn builder() -> MockAdapterBuilder {
        MockAdapterBuilder {
            fill_mode: FillMode::Accept,
            holdings: FxHashMap::default(),
            prices: FxHashMap::default(),
            unsettled: FxHashSet::default(),
            cash: Money::usd(Decimal::ZERO),
        }
    }

    pub fn submitted_orders(&self) -> Vec<RecordedOrder> {
        self.submitted.lock().unwrap().clone()
    }

    fn record(&self, ticker: Ticker, order_type: OrderType, qty: Option<Decimal>, value: Option<Money>) {
        self.submitted.lock().unwrap().push(RecordedOrder {
            ticker,
            order_type,
            qty,
            value,
        });
    }

    fn resolve(&self) -> Result<bool> {
        match self.fill_mode {
            FillMode::Accept => Ok(true),
            FillMode::Reject => Err(BrokerError::Order("mock: order rejected".into())),
            FillMode::ThrottleThen(n) => {
                let mut count = self.throttle_count.lock().unwrap();
                if *count < n {
                    *count += 1;
                    Err(BrokerError::Throttled { retry_after_secs: Some(0) })
                } else {
                    Ok(true)
                }
            }
        }
    }
}

impl BrokerAdapter for MockAdapter {
    const PROVIDER: ProviderId = ProviderId::Dummy;
    const SUPPORTS_FRACTIONAL_SHARES: bool = true;
    const SUPPORTS_BATCH_HISTORY: u32 = 0;
    const MAX_ORDER_DECIMALS: u32 = 6;

    fn min_order_value(&self) -> Money {
        Money::new(Decimal::from(2), self.cash.currency())
    }

    fn get_holdings(&mut self) -> Result<RealPortfolio> {
        let mut portfolio = RealPortfolio::new(self.cash).with_provider(Self::PROVIDER);
        for h in self.holdings.values() {
            portfolio
                .add_holding(h.clone())
                .map_err(|e| BrokerError::Configuration(e.to_string()))?;
        }
        Ok(portfolio)
    }

    fn get_instrument_price(&mut self, ticker: Ticker, _date: Option<chrono::NaiveDate>) -> Result<Option<Money>> {
        Ok(self.prices.get(&ticker).copied())
    }

    fn get_instrument_prices(
        &mut self,
        tickers: &[Ticker],
        _date: Option<chrono::NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>> {
        Ok(tickers.iter().map(|t| (*t, self.prices.get(t).copied())).collect())
    }

    fn buy_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        self.record(ticker, OrderType::Buy, qty, value);
        self.resolve()
    }

    fn sell_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        self.record(ticker, OrderType::Sell, qty, value);
        self.resolve()
    }

    fn get_unsettled_instruments(&mut self) -> Result<FxHashSet<Ticker>> {
        Ok(self.unsettled.clone())
    }

    fn get_per_ticker_profit_or_loss(&mut self) -> Result<FxHashMap<Ticker, ProfitModel>> {
        Ok(FxHashMap::default())
    }

    fn get_dividend_history(&mut self) -> Result<FxHashMap<Ticker, Money>> {
        Ok(FxHashMap::default())
    }

    fn get_stock_info(&mut self, ticker: Ticker) -> Result<StockInfo> {
        Ok(StockInfo::bare(ticker))
    }
}
