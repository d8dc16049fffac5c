//! The composite orchestrator: `generate_composite_order_plan` distributes
//! a target allocation across providers of differing capability and cash.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::planner::{generate_order_plan, OrderPlanParams, PurchaseStrategy};
use crate::portfolio::composite::CompositePortfolio;
use crate::portfolio::ideal::IdealPortfolio;
use crate::portfolio::order::OrderPlan;
use crate::provider::ProviderId;
use crate::{Money, Ticker};

/// Either one strategy for every provider, or a per-provider assignment.
#[derive(Clone, Debug)]
pub enum PurchaseOrderMaps {
    Single(PurchaseStrategy),
    PerProvider(FxHashMap<ProviderId, PurchaseStrategy>),
}

impl PurchaseOrderMaps {
    fn strategy_for(&self, provider: ProviderId) -> PurchaseStrategy {
        match self {
            PurchaseOrderMaps::Single(s) => *s,
            PurchaseOrderMaps::PerProvider(map) => map
                .get(&provider)
                .copied()
                .unwrap_or(PurchaseStrategy::LargestDiffFirst),
        }
    }
}

/// One provider's planning context: identity, fractional-share capability,
/// and a price fetcher bound to that provider's adapter. The caller (the
/// CLI/executor layer, which owns the broker adapters) builds one of these
/// per constituent portfolio.
pub struct ProviderContext<'a> {
    pub provider: ProviderId,
    pub supports_fractional: bool,
    pub price_fetcher:
        &'a mut dyn FnMut(&[Ticker]) -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String>,
}

/// Parameters for [`generate_composite_order_plan`].
pub struct CompositeOrderPlanParams {
    pub purchase_order_maps: PurchaseOrderMaps,
    pub target_size: Option<Money>,
    pub min_order_value: Option<Money>,
    /// Fraction of each provider's cash usable this invocation. Default
    /// 0.95 — a 5% buffer against spot quotes ticking up between planning
    /// and execution.
    pub safety_threshold: Decimal,
    pub target_order_size: Option<Money>,
    pub include_sell_orders: bool,
}

impl Default for CompositeOrderPlanParams {
    fn default() -> Self {
        Self {
            purchase_order_maps: PurchaseOrderMaps::Single(PurchaseStrategy::LargestDiffFirst),
            target_size: None,
            min_order_value: None,
            safety_threshold: Decimal::new(95, 2), // 0.95
            target_order_size: None,
            include_sell_orders: false,
        }
    }
}

/// Distribute `ideal` across the composite's constituent providers.
///
/// Providers are processed serially, ordered `(supports_fractional ASC,
/// cash ASC)`: non-fractional providers commit first so their integer
/// quantities consume from the larger ideal-weight buys, and cheaper
/// accounts empty before richer ones. `existing_orders` threads forward
/// across providers so later ones see earlier ones' in-flight buys and
/// never double-buy the same target.
pub fn generate_composite_order_plan(
    composite: &CompositePortfolio,
    ideal: &IdealPortfolio,
    mut providers: Vec<ProviderContext<'_>>,
    params: CompositeOrderPlanParams,
) -> Result<FxHashMap<ProviderId, OrderPlan>> {
    let target_size = params
        .target_size
        .unwrap_or_else(|| crate::planner::generate_auto_target_size(composite, ideal));

    // Step 2: per-provider purchase power.
    let mut purchase_power: FxHashMap<ProviderId, Money> = FxHashMap::default();
    if let Some(mut remaining) = params.target_order_size {
        for ctx in &providers {
            let cash = composite
                .by_provider(ctx.provider)
                .map(|p| p.cash)
                .unwrap_or_else(|| Money::zero(remaining.currency()));
            let assign = if cash.value() < remaining.value() { cash } else { remaining };
            purchase_power.insert(ctx.provider, assign);
            remaining = remaining.checked_sub(&assign).unwrap_or(Money::zero(remaining.currency()));
        }
    } else {
        for ctx in &providers {
            let cash = composite
                .by_provider(ctx.provider)
                .map(|p| p.cash)
                .unwrap_or_else(|| Money::zero(target_size.currency()));
            purchase_power.insert(ctx.provider, cash);
        }
    }

    // Step 3: union of unsettled instruments across all providers.
    let mut skip_tickers: FxHashSet<Ticker> = FxHashSet::default();
    for ctx in &providers {
        if let Some(port) = composite.by_provider(ctx.provider) {
            skip_tickers.extend(
                port.holdings
                    .iter()
                    .filter(|h| h.unsettled)
                    .map(|h| h.ticker),
            );
        }
    }

    // Step 4: order providers by (supports_fractional ASC, cash ASC).
    providers.sort_by(|a, b| {
        let cash_a = composite.by_provider(a.provider).map(|p| p.cash.value()).unwrap_or(Decimal::ZERO);
        let cash_b = composite.by_provider(b.provider).map(|p| p.cash.value()).unwrap_or(Decimal::ZERO);
        a.supports_fractional
            .cmp(&b.supports_fractional)
            .then(cash_a.partial_cmp(&cash_b).unwrap())
    });

    let mut existing_orders = Vec::new();
    let mut output: FxHashMap<ProviderId, OrderPlan> = FxHashMap::default();

    for ctx in &mut providers {
        let Some(real) = composite.by_provider(ctx.provider) else {
            continue;
        };
        let cash = real.cash;
        if cash.is_zero() {
            continue;
        }
        let assigned = purchase_power.get(&ctx.provider).copied().unwrap_or(cash);
        let local_max_spend = cash * params.safety_threshold;
        let local_power = if assigned.value() < local_max_spend.value() {
            assigned
        } else {
            local_max_spend
        };

        let plan_params = OrderPlanParams {
            strategy: params.purchase_order_maps.strategy_for(ctx.provider),
            target_size: Some(target_size),
            purchase_power: Some(local_power),
            min_order_value: params.min_order_value,
            skip_tickers: skip_tickers.clone(),
            fractional_shares: ctx.supports_fractional,
            provider: Some(ctx.provider),
            existing_orders: existing_orders.clone(),
            skip_invalid: true,
            include_sell_orders: params.include_sell_orders,
        };

        let plan = generate_order_plan(real, ideal, ctx.price_fetcher, plan_params)?;

        existing_orders.extend(plan.to_buy.iter().cloned());
        existing_orders.extend(plan.to_sell.iter().cloned());
        skip_tickers.extend(plan.to_buy.iter().map(|o| o.ticker));

        output.entry(ctx.provider).or_default().extend(&plan);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::ideal::IdealPortfolioElement;
    use crate::portfolio::real::{RealPortfolio, RealPortfolioElement};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

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

    // S2 — composite, one non-fractional provider.
    #[test]
    fn s2_non_fractional_provider_gets_integer_qty() {
        let mut p1 = RealPortfolio::new(Money::usd(dec!(800))).with_provider(ProviderId::LocalDict);
        p1.add_holding(RealPortfolioElement::new(t("AAPL"), dec!(1), Money::usd(dec!(100))))
            .unwrap();
        p1.add_holding(RealPortfolioElement::new(t("UNIL"), dec!(1), Money::usd(dec!(1000))))
            .unwrap();

        let mut p2 = RealPortfolio::new(Money::usd(dec!(200))).with_provider(ProviderId::LocalDictNoPartial);
        p2.add_holding(RealPortfolioElement::new(t("AAPL"), dec!(1), Money::usd(dec!(100))))
            .unwrap();

        let composite = CompositePortfolio::new(vec![p1, p2]).unwrap();
        let ideal = ideal(&[("AAPL", "0.5"), ("MSFT", "0.5")]);

        let mut prices = FxHashMap::default();
        prices.insert(t("AAPL"), Some(Money::usd(dec!(100))));
        prices.insert(t("UNIL"), Some(Money::usd(dec!(1000))));
        prices.insert(t("MSFT"), Some(Money::usd(dec!(33))));
        let prices_clone_1 = prices.clone();
        let prices_clone_2 = prices.clone();

        let mut fetcher1 = move |tickers: &[Ticker]| -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> {
            Ok(tickers.iter().map(|t| (*t, prices_clone_1.get(t).copied().flatten())).collect())
        };
        let mut fetcher2 = move |tickers: &[Ticker]| -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> {
            Ok(tickers.iter().map(|t| (*t, prices_clone_2.get(t).copied().flatten())).collect())
        };

        let providers = vec![
            ProviderContext {
                provider: ProviderId::LocalDict,
                supports_fractional: true,
                price_fetcher: &mut fetcher1,
            },
            ProviderContext {
                provider: ProviderId::LocalDictNoPartial,
                supports_fractional: false,
                price_fetcher: &mut fetcher2,
            },
        ];

        let params = CompositeOrderPlanParams {
            safety_threshold: Decimal::ONE,
            ..Default::default()
        };

        let plans = generate_composite_order_plan(&composite, &ideal, providers, params).unwrap();

        let p2_plan = plans.get(&ProviderId::LocalDictNoPartial).unwrap();
        let msft_order = p2_plan.to_buy.iter().find(|o| o.ticker == t("MSFT"));
        assert!(msft_order.is_some());
        assert!(msft_order.unwrap().qty.is_some());
        assert!(msft_order.unwrap().value.is_none());

        let total_spent: Decimal = plans
            .values()
            .flat_map(|p| p.to_buy.iter())
            .filter_map(|o| o.inferred_value())
            .map(|m| m.value())
            .sum();
        assert!(total_spent <= dec!(1000));
    }

    #[test]
    fn no_ticker_double_bought_across_providers() {
        let p1 = RealPortfolio::new(Money::usd(dec!(500))).with_provider(ProviderId::LocalDict);
        let p2 = RealPortfolio::new(Money::usd(dec!(500))).with_provider(ProviderId::Dummy);
        let composite = CompositePortfolio::new(vec![p1, p2]).unwrap();
        let ideal = ideal(&[("AAPL", "1.0")]);

        let mut prices = FxHashMap::default();
        prices.insert(t("AAPL"), Some(Money::usd(dec!(100))));
        let prices_clone_1 = prices.clone();
        let prices_clone_2 = prices.clone();
        let mut fetcher1 = move |tickers: &[Ticker]| -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> {
            Ok(tickers.iter().map(|t| (*t, prices_clone_1.get(t).copied().flatten())).collect())
        };
        let mut fetcher2 = move |tickers: &[Ticker]| -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String> {
            Ok(tickers.iter().map(|t| (*t, prices_clone_2.get(t).copied().flatten())).collect())
        };
        let providers = vec![
            ProviderContext { provider: ProviderId::LocalDict, supports_fractional: true, price_fetcher: &mut fetcher1 },
            ProviderContext { provider: ProviderId::Dummy, supports_fractional: true, price_fetcher: &mut fetcher2 },
        ];
        let plans = generate_composite_order_plan(&composite, &ideal, providers, CompositeOrderPlanParams::default()).unwrap();
        let total: Decimal = plans.values().flat_map(|p| p.to_buy.iter()).filter_map(|o| o.inferred_value()).map(|m| m.value()).sum();
        assert!(total <= dec!(1000) * dec!(0.95) + dec!(1));
    }
}
