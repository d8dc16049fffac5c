//! A no-op adapter: empty holdings, accepts every order without changing
//! any state. Useful for exercising the composite orchestrator's provider
//! loop and the executor's control flow without a priced backing store.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_core::{Money, ProfitModel, ProviderId, RealPortfolio, StockInfo, Ticker};

use crate::adapter::BrokerAdapter;
use crate::error::Result;

pub struct DummyAdapter {
    cash: Money,
}

impl DummyAdapter {
    pub fn new(cash: Money) -> Self {
        Self { cash }
    }
}

impl BrokerAdapter for DummyAdapter {
    const PROVIDER: ProviderId = ProviderId::Dummy;
    const SUPPORTS_FRACTIONAL_SHARES: bool = true;
    const SUPPORTS_BATCH_HISTORY: u32 = 0;
    const MAX_ORDER_DECIMALS: u32 = 6;

    fn min_order_value(&self) -> Money {
        Money::new(Decimal::from(2), self.cash.currency())
    }

    fn get_holdings(&mut self) -> Result<RealPortfolio> {
        Ok(RealPortfolio::new(self.cash).with_provider(Self::PROVIDER))
    }

    fn get_instrument_price(&mut self, _ticker: Ticker, _date: Option<chrono::NaiveDate>) -> Result<Option<Money>> {
        Ok(None)
    }

    fn get_instrument_prices(
        &mut self,
        tickers: &[Ticker],
        _date: Option<chrono::NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>> {
        Ok(tickers.iter().map(|t| (*t, None)).collect())
    }

    fn buy_instrument(&mut self, _ticker: Ticker, _qty: Option<Decimal>, _value: Option<Money>) -> Result<bool> {
        Ok(true)
    }

    fn sell_instrument(&mut self, _ticker: Ticker, _qty: Option<Decimal>, _value: Option<Money>) -> Result<bool> {
        Ok(true)
    }

    fn get_unsettled_instruments(&mut self) -> Result<FxHashSet<Ticker>> {
        Ok(FxHashSet::default())
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
