//! Deterministic invariant tests for the portfolio algebra and planner,
//! exercised through the crate's public API only.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use rustc_hash::FxHashMap;

use rebalance_core::{
    compare_portfolios, generate_order_plan, CompositePortfolio, IdealPortfolio,
    IdealPortfolioElement, Money, OrderPlanParams, PortfolioLike, ProviderId, RealPortfolio,
    RealPortfolioElement, Ticker,
};

fn t(s: &str) -> Ticker {
    Ticker::new(s)
}

fn ideal(pairs: &[(&str, &str)]) -> IdealPortfolio {
    IdealPortfolio::new(
        pairs
            .iter()
            .map(|(tk, w)| IdealPortfolioElement {
                ticker: t(tk),
                weight: w.parse().unwrap(),
            })
            .collect(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
}

fn fetcher(prices: &[(&str, &str)]) -> impl FnMut(&[Ticker]) -> Result<FxHashMap<Ticker, Option<Money>>, String> {
    let table: FxHashMap<Ticker, Money> = prices
        .iter()
        .map(|(tk, p)| (t(tk), Money::parse(p).unwrap()))
        .collect();
    move |tickers: &[Ticker]| Ok(tickers.iter().map(|tk| (*tk, table.get(tk).copied())).collect())
}

#[test]
fn order_plan_spends_full_purchase_power_on_an_empty_account() {
    let target = ideal(&[("AAPL", "0.5"), ("MSFT", "0.5")]);
    let real = RealPortfolio::new(Money::usd(dec!(0)));
    let mut f = fetcher(&[("AAPL", "$100.00"), ("MSFT", "$100.00")]);

    let params = OrderPlanParams {
        target_size: Some(Money::usd(dec!(1000))),
        purchase_power: Some(Money::usd(dec!(1000))),
        ..Default::default()
    };
    let plan = generate_order_plan(&real, &target, &mut f, params).unwrap();

    let spent: Money = plan
        .to_buy
        .iter()
        .map(|o| o.inferred_value().unwrap())
        .sum();
    assert!(spent.value() <= dec!(1000));
    assert!(spent.value() > dec!(900));
}

#[test]
fn order_plan_never_exceeds_purchase_power() {
    let target = ideal(&[("AAPL", "1.0")]);
    let real = RealPortfolio::new(Money::usd(dec!(0)));
    let mut f = fetcher(&[("AAPL", "$37.00")]);

    let params = OrderPlanParams {
        target_size: Some(Money::usd(dec!(100))),
        purchase_power: Some(Money::usd(dec!(100))),
        fractional_shares: false,
        ..Default::default()
    };
    let plan = generate_order_plan(&real, &target, &mut f, params).unwrap();
    let spent: Money = plan.to_buy.iter().map(|o| o.inferred_value().unwrap()).sum();
    assert!(spent.value() <= dec!(100));
}

#[test]
fn order_plan_is_additive_by_default_no_sells_emitted() {
    let target = ideal(&[("AAPL", "1.0")]);
    let mut real = RealPortfolio::new(Money::usd(dec!(0)));
    real.add_holding(RealPortfolioElement::new(t("MSFT"), dec!(10), Money::usd(dec!(1000))))
        .unwrap();
    let mut f = fetcher(&[("AAPL", "$100.00"), ("MSFT", "$100.00")]);

    let params = OrderPlanParams {
        target_size: Some(Money::usd(dec!(2000))),
        purchase_power: Some(Money::usd(dec!(1000))),
        include_sell_orders: false,
        ..Default::default()
    };
    let plan = generate_order_plan(&real, &target, &mut f, params).unwrap();
    assert!(plan.to_sell.is_empty(), "additive planning must never emit sells by default");
}

#[test]
fn composite_portfolio_total_value_is_sum_of_constituents() {
    let mut a = RealPortfolio::new(Money::usd(dec!(100))).with_provider(ProviderId::LocalDict);
    a.add_holding(RealPortfolioElement::new(t("AAPL"), dec!(5), Money::usd(dec!(500))))
        .unwrap();
    let mut b = RealPortfolio::new(Money::usd(dec!(50))).with_provider(ProviderId::LocalDictNoPartial);
    b.add_holding(RealPortfolioElement::new(t("MSFT"), dec!(2), Money::usd(dec!(200))))
        .unwrap();

    let composite = CompositePortfolio::new(vec![a, b]).unwrap();
    assert_eq!(composite.value(), Money::usd(dec!(850)));
}

#[test]
fn compare_portfolios_reports_zero_gap_for_perfectly_matched_allocation() {
    let target = ideal(&[("AAPL", "0.5"), ("MSFT", "0.5")]);
    let mut p = RealPortfolio::new(Money::usd(dec!(0)));
    p.add_holding(RealPortfolioElement::new(t("AAPL"), dec!(5), Money::usd(dec!(500))))
        .unwrap();
    p.add_holding(RealPortfolioElement::new(t("MSFT"), dec!(5), Money::usd(dec!(500))))
        .unwrap();

    let (to_buy, to_sell) = compare_portfolios(&p, &target, Some(Money::usd(dec!(1000))));
    assert!(to_buy.values().all(|v| v.value().abs() < dec!(0.01)));
    assert!(to_sell.values().all(|v| v.value().abs() < dec!(0.01)));
}

#[test]
fn ideal_portfolio_normalize_makes_weights_sum_to_one() {
    let mut target = ideal(&[("AAPL", "1"), ("MSFT", "3")]);
    target.normalize();
    let total: rust_decimal::Decimal = target.holdings.iter().map(|h| h.weight).sum();
    assert!((total - dec!(1)).abs() < dec!(0.0001));
}

#[test]
fn real_portfolio_reweight_keeps_cash_and_holdings_consistent_with_value() {
    let mut p = RealPortfolio::new(Money::usd(dec!(100)));
    p.add_holding(RealPortfolioElement::new(t("AAPL"), dec!(3), Money::usd(dec!(300))))
        .unwrap();
    p.reweight();
    let h = p.get_holding(t("AAPL")).unwrap();
    assert!((h.weight - dec!(0.75)).abs() < dec!(0.0001));
}
