//! Wraps the concrete in-core broker adapters behind one enum.
//!
//! `BrokerAdapter` carries associated constants (`PROVIDER`,
//! `SUPPORTS_FRACTIONAL_SHARES`, ...), so it isn't object-safe — there's no
//! `Box<dyn BrokerAdapter>`. The CLI is the one place that needs to hold a
//! heterogeneous collection of adapters side by side (one per configured
//! account), so it owns this small enum and dispatches by hand instead.

use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_broker::{
    price_fetcher_for, purchase_composite_order_plan, BrokerAdapter, DummyAdapter,
    ExecutionReport, ExecutorParams, LocalDictAdapter, LocalDictNoPartialAdapter,
};
use rebalance_core::{Money, OrderPlan, ProviderId, RealPortfolio, Ticker};

use crate::config::{AccountConfig, AdapterKind};
use crate::error::Result;

/// One configured brokerage account, backed by one of the in-core
/// adapters.
pub enum Account {
    LocalDict(LocalDictAdapter),
    LocalDictNoPartial(LocalDictNoPartialAdapter),
    Dummy(DummyAdapter),
}

impl Account {
    /// Build an account from its configuration: seed cash, holdings,
    /// prices, and unsettled tickers into a fresh adapter instance.
    pub fn from_config(cfg: &AccountConfig) -> Result<Self> {
        let cash = Money::parse(&cfg.cash)?;

        let account = match cfg.adapter {
            AdapterKind::LocalDict => {
                let mut adapter = LocalDictAdapter::new(cash);
                for h in &cfg.holdings {
                    let ticker = parse_ticker(&h.ticker)?;
                    let value = Money::parse(&h.value)?;
                    adapter = adapter.with_holding(ticker, h.units, value);
                }
                for p in &cfg.prices {
                    let ticker = parse_ticker(&p.ticker)?;
                    let price = Money::parse(&p.price)?;
                    adapter = adapter.with_price(ticker, price);
                }
                for u in &cfg.unsettled {
                    adapter = adapter.with_unsettled(parse_ticker(u)?);
                }
                Account::LocalDict(adapter)
            }
            AdapterKind::LocalDictNoPartial => {
                let mut adapter = LocalDictNoPartialAdapter::new(cash);
                for h in &cfg.holdings {
                    let ticker = parse_ticker(&h.ticker)?;
                    let value = Money::parse(&h.value)?;
                    adapter = adapter.with_holding(ticker, h.units, value);
                }
                for p in &cfg.prices {
                    let ticker = parse_ticker(&p.ticker)?;
                    let price = Money::parse(&p.price)?;
                    adapter = adapter.with_price(ticker, price);
                }
                Account::LocalDictNoPartial(adapter)
            }
            AdapterKind::Dummy => Account::Dummy(DummyAdapter::new(cash)),
        };
        Ok(account)
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            Account::LocalDict(_) => LocalDictAdapter::PROVIDER,
            Account::LocalDictNoPartial(_) => LocalDictNoPartialAdapter::PROVIDER,
            Account::Dummy(_) => DummyAdapter::PROVIDER,
        }
    }

    pub fn supports_fractional(&self) -> bool {
        match self {
            Account::LocalDict(_) => LocalDictAdapter::SUPPORTS_FRACTIONAL_SHARES,
            Account::LocalDictNoPartial(_) => LocalDictNoPartialAdapter::SUPPORTS_FRACTIONAL_SHARES,
            Account::Dummy(_) => DummyAdapter::SUPPORTS_FRACTIONAL_SHARES,
        }
    }

    pub fn get_holdings(&mut self) -> Result<RealPortfolio> {
        let portfolio = match self {
            Account::LocalDict(a) => a.get_holdings(),
            Account::LocalDictNoPartial(a) => a.get_holdings(),
            Account::Dummy(a) => a.get_holdings(),
        }?;
        Ok(portfolio)
    }

    pub fn get_unsettled_instruments(&mut self) -> Result<FxHashSet<Ticker>> {
        let unsettled = match self {
            Account::LocalDict(a) => a.get_unsettled_instruments(),
            Account::LocalDictNoPartial(a) => a.get_unsettled_instruments(),
            Account::Dummy(a) => a.get_unsettled_instruments(),
        }?;
        Ok(unsettled)
    }

    /// A price-fetcher closure bound to this account's adapter, suitable
    /// for [`rebalance_core::ProviderContext::price_fetcher`].
    pub fn price_fetcher(
        &mut self,
    ) -> Box<dyn FnMut(&[Ticker]) -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> + '_> {
        match self {
            Account::LocalDict(a) => Box::new(price_fetcher_for(a)),
            Account::LocalDictNoPartial(a) => Box::new(price_fetcher_for(a)),
            Account::Dummy(a) => Box::new(price_fetcher_for(a)),
        }
    }

    /// Submit every order in `plan` to this account's adapter.
    pub fn execute(
        &mut self,
        plan: &OrderPlan,
        unsettled: &FxHashSet<Ticker>,
        params: ExecutorParams,
    ) -> Result<ExecutionReport> {
        let report = match self {
            Account::LocalDict(a) => purchase_composite_order_plan(a, plan, unsettled, params),
            Account::LocalDictNoPartial(a) => purchase_composite_order_plan(a, plan, unsettled, params),
            Account::Dummy(a) => purchase_composite_order_plan(a, plan, unsettled, params),
        }?;
        Ok(report)
    }
}

fn parse_ticker(s: &str) -> Result<Ticker> {
    Ticker::try_new(s).ok_or_else(|| crate::error::Error::Config(format!("invalid ticker {s:?}")))
}
