//! Property-based tests for the portfolio algebra's arithmetic invariants.
//!
//! These use proptest to check that key properties hold across randomly
//! generated scenarios rather than a handful of hand-picked cases.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rustc_hash::FxHashMap;

use rebalance_core::{
    generate_order_plan, IdealPortfolio, IdealPortfolioElement, Money, OrderPlanParams,
    RealPortfolio, Ticker,
};
use chrono::NaiveDate;
use proptest::prelude::*;

fn weight_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1000i64).prop_map(|n| Decimal::new(n, 3))
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn target_size_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Normalizing an ideal portfolio always leaves its weights summing to 1,
    /// regardless of the input weights' scale.
    #[test]
    fn normalize_weights_sum_to_one(
        w1 in weight_strategy(),
        w2 in weight_strategy(),
        w3 in weight_strategy(),
    ) {
        let mut portfolio = IdealPortfolio::new(
            vec![
                IdealPortfolioElement { ticker: Ticker::new("AAPL"), weight: w1 },
                IdealPortfolioElement { ticker: Ticker::new("MSFT"), weight: w2 },
                IdealPortfolioElement { ticker: Ticker::new("GOOG"), weight: w3 },
            ],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        portfolio.normalize();
        let total: Decimal = portfolio.holdings.iter().map(|h| h.weight).sum();
        prop_assert!((total - dec!(1)).abs() < dec!(0.0001));
    }

    /// A freshly generated order plan never spends more than the purchase
    /// power it was given, whatever the target weights and prices are.
    #[test]
    fn order_plan_respects_purchase_power(
        w1 in weight_strategy(),
        w2 in weight_strategy(),
        p1 in price_strategy(),
        p2 in price_strategy(),
        power in target_size_strategy(),
    ) {
        let mut target = IdealPortfolio::new(
            vec![
                IdealPortfolioElement { ticker: Ticker::new("AAPL"), weight: w1 },
                IdealPortfolioElement { ticker: Ticker::new("MSFT"), weight: w2 },
            ],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        target.normalize();

        let real = RealPortfolio::new(Money::usd(dec!(0)));
        let prices: FxHashMap<Ticker, Money> = [
            (Ticker::new("AAPL"), Money::usd(p1)),
            (Ticker::new("MSFT"), Money::usd(p2)),
        ]
        .into_iter()
        .collect();
        let mut fetcher = move |tickers: &[Ticker]| {
            Ok::<_, String>(tickers.iter().map(|t| (*t, prices.get(t).copied())).collect())
        };

        let params = OrderPlanParams {
            target_size: Some(Money::usd(power)),
            purchase_power: Some(Money::usd(power)),
            ..Default::default()
        };
        let plan = generate_order_plan(&real, &target, &mut fetcher, params).unwrap();

        let spent: Decimal = plan
            .to_buy
            .iter()
            .filter_map(|o| o.inferred_value())
            .map(|m| m.value())
            .sum();
        prop_assert!(spent <= power, "spent {spent} exceeds purchase power {power}");
    }

    /// Money addition is commutative for same-currency values.
    #[test]
    fn money_addition_is_commutative(a in price_strategy(), b in price_strategy()) {
        let x = Money::usd(a);
        let y = Money::usd(b);
        prop_assert_eq!((x + y).value(), (y + x).value());
    }

    /// Rounding money to 2 decimal places is idempotent.
    #[test]
    fn money_round_is_idempotent(a in price_strategy()) {
        let m = Money::usd(a).round(2);
        prop_assert_eq!(m.round(2).value(), m.value());
    }
}
