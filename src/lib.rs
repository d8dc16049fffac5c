//! # rebalance_core
//!
//! Pure, deterministic portfolio-rebalancing logic for retail brokerage
//! accounts: exact-decimal money, ideal/real/composite portfolio algebra,
//! a TTL-bounded price cache, and the order-plan generator that turns an
//! ideal allocation into buy/sell orders against one or many providers.
//!
//! Everything in this crate is pure — no network I/O, no broker
//! authentication, no order submission. Those concerns live in
//! `rebalance_broker` and `rebalance_cli`, which depend on this crate.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use rustc_hash::FxHashMap;
//! use rebalance_core::{
//!     generate_order_plan, IdealPortfolio, IdealPortfolioElement, Money,
//!     OrderPlanParams, RealPortfolio, RealPortfolioElement, Ticker,
//! };
//!
//! let ideal = IdealPortfolio::new(
//!     vec![
//!         IdealPortfolioElement { ticker: Ticker::new("AAPL"), weight: dec!(0.5) },
//!         IdealPortfolioElement { ticker: Ticker::new("MSFT"), weight: dec!(0.5) },
//!     ],
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! );
//!
//! let mut real = RealPortfolio::new(Money::usd(dec!(0)));
//! real.add_holding(RealPortfolioElement::new(Ticker::new("AAPL"), dec!(1), Money::usd(dec!(100))))
//!     .unwrap();
//!
//! let mut prices = FxHashMap::default();
//! prices.insert(Ticker::new("AAPL"), Some(Money::usd(dec!(100))));
//! prices.insert(Ticker::new("MSFT"), Some(Money::usd(dec!(100))));
//! let mut fetcher = move |tickers: &[Ticker]| {
//!     Ok(tickers.iter().map(|t| (*t, prices.get(t).copied().flatten())).collect())
//! };
//!
//! let params = OrderPlanParams {
//!     target_size: Some(Money::usd(dec!(1000))),
//!     purchase_power: Some(Money::usd(dec!(1000))),
//!     ..Default::default()
//! };
//!
//! let plan = generate_order_plan(&real, &ideal, &mut fetcher, params).unwrap();
//! assert_eq!(plan.to_buy.len(), 2);
//! ```
//!
//! ## Composite allocation across providers
//!
//! When an ideal allocation spans more than one brokerage account, the
//! composite orchestrator fans a single target out across providers,
//! ordered by capability and cash so integer-share accounts settle first:
//!
//! ```ignore
//! use rebalance_core::{generate_composite_order_plan, CompositeOrderPlanParams, ProviderContext};
//!
//! let plans = generate_composite_order_plan(&composite, &ideal, providers, CompositeOrderPlanParams::default())?;
//! ```

mod composite_orchestrator;
pub mod error;
mod money;
mod planner;
pub mod portfolio;
mod price_cache;
mod provider;
mod stock_info;
mod ticker;

pub use composite_orchestrator::{
    generate_composite_order_plan, CompositeOrderPlanParams, ProviderContext, PurchaseOrderMaps,
};
pub use error::{CoreError, Result};
pub use money::{Currency, Money};
pub use planner::{
    compare_portfolios, generate_auto_target_size, generate_order_plan, OrderPlanParams,
    PurchaseStrategy,
};
pub use portfolio::{
    CompositePortfolio, IdealPortfolio, IdealPortfolioElement, OrderElement, OrderPlan, OrderType,
    PortfolioLike, ProfitModel, RealPortfolio, RealPortfolioElement,
};
pub use price_cache::{PriceCache, PriceFetcher};
pub use provider::ProviderId;
pub use stock_info::StockInfo;
pub use ticker::Ticker;
