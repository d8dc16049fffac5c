//! In-memory, dictionary-backed adapters. No network I/O — holdings, cash,
//! and prices all live in a plain map, making these the reference
//! implementation for tests and local dry runs. `LocalDictAdapter` accepts
//! fractional-share orders; `LocalDictNoPartialAdapter` is its
//! integer-quantity-only twin, exercising the planner's non-fractional
//! branch without a real non-fractional broker.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_core::{Money, ProfitModel, ProviderId, RealPortfolio, RealPortfolioElement, StockInfo, Ticker};

use crate::adapter::BrokerAdapter;
use crate::error::{BrokerError, Result};

fn settle_order(
    holdings: &mut FxHashMap<Ticker, RealPortfolioElement>,
    cash: &mut Money,
    prices: &FxHashMap<Ticker, Money>,
    ticker: Ticker,
    qty: Option<Decimal>,
    value: Option<Money>,
    is_buy: bool,
) -> Result<bool> {
    let price = prices.get(&ticker).copied();
    let notional = match (value, qty, price) {
        (Some(v), _, _) => v,
        (None, Some(q), Some(p)) => p * q,
        _ => {
            return Err(BrokerError::Order(format!(
                "no price available to size order for {ticker}"
            )))
        }
    };

    if is_buy && notional.value() > cash.value() {
        return Err(BrokerError::Order(format!(
            "insufficient cash for {ticker}: have {cash}, need {notional}"
        )));
    }

    let units = qty.unwrap_or_else(|| {
        price
            .map(|p| notional.value() / p.value())
            .unwrap_or(Decimal::ZERO)
    });
    let signed_units = if is_buy { units } else { -units };
    let signed_value = if is_buy { notional } else { -notional };

    *cash = if is_buy {
        cash.checked_sub(&notional)
    } else {
        cash.checked_add(&notional)
    }
    .map_err(|e| BrokerError::Order(e.to_string()))?;

    holdings
        .entry(ticker)
        .and_modify(|h| {
            h.units += signed_units;
            h.value = h.value.checked_add(&signed_value).unwrap_or(h.value);
        })
        .or_insert_with(|| RealPortfolioElement::new(ticker, signed_units, signed_value));

    Ok(true)
}

fn build_portfolio(
    provider: ProviderId,
    holdings: &FxHashMap<Ticker, RealPortfolioElement>,
    cash: Money,
) -> Result<RealPortfolio> {
    let mut portfolio = RealPortfolio::new(cash).with_provider(provider);
    for h in holdings.values() {
        portfolio
            .add_holding(h.clone())
            .map_err(|e| BrokerError::Configuration(e.to_string()))?;
    }
    Ok(portfolio)
}

/// Fractional-share in-memory adapter.
pub struct LocalDictAdapter {
    holdings: FxHashMap<Ticker, RealPortfolioElement>,
    cash: Money,
    prices: FxHashMap<Ticker, Money>,
    unsettled: FxHashSet<Ticker>,
}

impl LocalDictAdapter {
    pub fn new(cash: Money) -> Self {
        Self {
            holdings: FxHashMap::default(),
            cash,
            prices: FxHashMap::default(),
            unsettled: FxHashSet::default(),
        }
    }

    pub fn with_holding(mut self, ticker: Ticker, units: Decimal, value: Money) -> Self {
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
}

impl BrokerAdapter for LocalDictAdapter {
    const PROVIDER: ProviderId = ProviderId::LocalDict;
    const SUPPORTS_FRACTIONAL_SHARES: bool = true;
    const SUPPORTS_BATCH_HISTORY: u32 = 0;
    const MAX_ORDER_DECIMALS: u32 = 6;

    fn min_order_value(&self) -> Money {
        Money::new(Decimal::from(2), self.cash.currency())
    }

    fn get_holdings(&mut self) -> Result<RealPortfolio> {
        build_portfolio(Self::PROVIDER, &self.holdings, self.cash)
    }

    fn get_instrument_price(&mut self, ticker: Ticker, _date: Option<chrono::NaiveDate>) -> Result<Option<Money>> {
        Ok(self.prices.get(&ticker).copied())
    }

    fn get_instrument_prices(
        &mut self,
        tickers: &[Ticker],
        _date: Option<chrono::NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>> {
        Ok(tickers
            .iter()
            .map(|t| (*t, self.prices.get(t).copied()))
            .collect())
    }

    fn buy_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        settle_order(&mut self.holdings, &mut self.cash, &self.prices, ticker, qty, value, true)
    }

    fn sell_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        settle_order(&mut self.holdings, &mut self.cash, &self.prices, ticker, qty, value, false)
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

/// Integer-quantity-only in-memory adapter — otherwise identical to
/// [`LocalDictAdapter`].
pub struct LocalDictNoPartialAdapter {
    holdings: FxHashMap<Ticker, RealPortfolioElement>,
    cash: Money,
    prices: FxHashMap<Ticker, Money>,
    unsettled: FxHashSet<Ticker>,
}

impl LocalDictNoPartialAdapter {
    pub fn new(cash: Money) -> Self {
        Self {
            holdings: FxHashMap::default(),
            cash,
            prices: FxHashMap::default(),
            unsettled: FxHashSet::default(),
        }
    }

    pub fn with_holding(mut self, ticker: Ticker, units: Decimal, value: Money) -> Self {
        self.holdings
            .insert(ticker, RealPortfolioElement::new(ticker, units, value));
        self
    }

    pub fn with_price(mut self, ticker: Ticker, price: Money) -> Self {
        self.prices.insert(ticker, price);
        self
    }
}

impl BrokerAdapter for LocalDictNoPartialAdapter {
    const PROVIDER: ProviderId = ProviderId::LocalDictNoPartial;
    const SUPPORTS_FRACTIONAL_SHARES: bool = false;
    const SUPPORTS_BATCH_HISTORY: u32 = 0;
    const MAX_ORDER_DECIMALS: u32 = 0;

    fn min_order_value(&self) -> Money {
        Money::new(Decimal::from(2), self.cash.currency())
    }

    fn get_holdings(&mut self) -> Result<RealPortfolio> {
        build_portfolio(Self::PROVIDER, &self.holdings, self.cash)
    }

    fn get_instrument_price(&mut self, ticker: Ticker, _date: Option<chrono::NaiveDate>) -> Result<Option<Money>> {
        Ok(self.prices.get(&ticker).copied())
    }

    fn get_instrument_prices(
        &mut self,
        tickers: &[Ticker],
        _date: Option<chrono::NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>> {
        Ok(tickers
            .iter()
            .map(|t| (*t, self.prices.get(t).copied()))
            .collect())
    }

    fn buy_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        if value.is_some() {
            return Err(BrokerError::Order(
                "this adapter does not support fractional-share orders".into(),
            ));
        }
        settle_order(&mut self.holdings, &mut self.cash, &self.prices, ticker, qty, value, true)
    }

    fn sell_instrument(&mut self, ticker: Ticker, qty: Option<Decimal>, value: Option<Money>) -> Result<bool> {
        if value.is_some() {
            return Err(BrokerError::Order(
                "this adapter does not support fractional-share orders".into(),
            ));
        }
        settle_order(&mut self.holdings, &mut self.cash, &self.prices, ticker, qty, value, false)
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
