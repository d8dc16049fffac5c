//! The single-broker planner: `generate_order_plan` and its informational
//! siblings `compare_portfolios` and `generate_auto_target_size`.

use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::portfolio::composite::CompositePortfolio;
use crate::portfolio::ideal::IdealPortfolio;
use crate::portfolio::order::{OrderElement, OrderPlan};
use crate::portfolio::PortfolioLike;
use crate::provider::ProviderId;
use crate::{Money, Ticker};

/// Which order tickers are purchased in, and how the buy amount scales.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PurchaseStrategy {
    /// Sort by largest absolute weight difference first.
    LargestDiffFirst,
    /// Sort by smallest absolute weight difference first.
    CheapestFirst,
    /// Smallest-diff-first, additionally rescaling each buy so the plan
    /// consumes exactly the available purchase power.
    PeanutButter,
}

/// Parameters for [`generate_order_plan`]. Fields default the same way the
/// planner's source does: additive-only (`include_sell_orders = false`),
/// tolerant of missing prices (`skip_invalid = true`), fractional shares
/// assumed available.
#[derive(Clone, Debug)]
pub struct OrderPlanParams {
    pub strategy: PurchaseStrategy,
    pub target_size: Option<Money>,
    pub purchase_power: Option<Money>,
    pub min_order_value: Option<Money>,
    pub skip_tickers: FxHashSet<Ticker>,
    pub fractional_shares: bool,
    pub provider: Option<ProviderId>,
    pub existing_orders: Vec<OrderElement>,
    pub skip_invalid: bool,
    pub include_sell_orders: bool,
}

impl Default for OrderPlanParams {
    fn default() -> Self {
        Self {
            strategy: PurchaseStrategy::LargestDiffFirst,
            target_size: None,
            purchase_power: None,
            min_order_value: None,
            skip_tickers: FxHashSet::default(),
            fractional_shares: true,
            provider: None,
            existing_orders: Vec::new(),
            skip_invalid: true,
            include_sell_orders: false,
        }
    }
}

struct Comparison {
    ticker: Ticker,
    weight: Decimal,
    diff: Decimal,
    actual: Money,
}

fn existing_value_for(existing_orders: &[OrderElement], ticker: Ticker) -> Option<Money> {
    existing_orders
        .iter()
        .filter(|o| o.ticker == ticker)
        .filter_map(|o| o.inferred_value())
        .fold(None, |acc, v| {
            Some(match acc {
                None => v,
                Some(a) => a + v,
            })
        })
}

fn build_comparisons(
    real: &dyn PortfolioLike,
    ideal: &IdealPortfolio,
    skip_tickers: &FxHashSet<Ticker>,
    target_size: Money,
    existing_orders: &[OrderElement],
) -> (Vec<Comparison>, Money) {
    let mut comparisons = Vec::new();
    let mut currently_held = Money::zero(target_size.currency());

    for h in &ideal.holdings {
        if skip_tickers.contains(&h.ticker) {
            continue;
        }
        let mut actual = real
            .holding_value(h.ticker)
            .unwrap_or_else(|| Money::zero(target_size.currency()));
        if let Some(extra) = existing_value_for(existing_orders, h.ticker) {
            actual = actual.checked_add(&extra).unwrap_or(actual);
        }
        let pct = if actual.is_zero() {
            Decimal::ZERO
        } else {
            actual / target_size
        };
        let diff = h.weight - pct;
        currently_held = currently_held.checked_add(&actual).unwrap_or(currently_held);
        comparisons.push(Comparison {
            ticker: h.ticker,
            weight: h.weight,
            diff,
            actual,
        });
    }

    (comparisons, currently_held)
}

fn order_comparisons(comparisons: &mut [Comparison], strategy: PurchaseStrategy) {
    match strategy {
        PurchaseStrategy::LargestDiffFirst => {
            comparisons.sort_by(|a, b| b.diff.abs().partial_cmp(&a.diff.abs()).unwrap())
        }
        PurchaseStrategy::CheapestFirst | PurchaseStrategy::PeanutButter => {
            comparisons.sort_by(|a, b| a.diff.abs().partial_cmp(&b.diff.abs()).unwrap())
        }
    }
}

fn is_positive(m: Money) -> bool {
    m.value() > Decimal::ZERO
}

/// Generate a per-broker order plan moving `real` toward `ideal`.
///
/// Pure — no orders are submitted. A missing price for a single ticker
/// only removes that ticker from the plan (`params.skip_invalid = true`,
/// the default); set it to `false` to propagate the fetch failure instead.
///
/// Real holdings with no counterpart in `ideal` are never sold here —
/// this planner is additive by construction. Callers wanting full
/// liquidation of non-ideal holdings must include them in `ideal`, or use
/// [`compare_portfolios`] and act on its `to_sell` map directly.
pub fn generate_order_plan(
    real: &dyn PortfolioLike,
    ideal: &IdealPortfolio,
    price_fetcher: &mut dyn FnMut(
        &[Ticker],
    ) -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String>,
    params: OrderPlanParams,
) -> Result<OrderPlan> {
    let target_size = params.target_size.unwrap_or_else(|| real.value());
    let currency = target_size.currency();
    let min_order_value = params
        .min_order_value
        .unwrap_or_else(|| Money::new(Decimal::from(2), currency));
    let mut purchase_power = params.purchase_power.unwrap_or(target_size);
    let mut skip_tickers = params.skip_tickers.clone();

    let (mut comparisons, currently_held, prices) = loop {
        let (comparisons, currently_held) = build_comparisons(
            real,
            ideal,
            &skip_tickers,
            target_size,
            &params.existing_orders,
        );
        let keys: Vec<Ticker> = comparisons.iter().map(|c| c.ticker).collect();
        match price_fetcher(&keys) {
            Ok(prices) => break (comparisons, currently_held, prices),
            Err(cause) => {
                if params.skip_invalid {
                    log::warn!("price fetch failed, skipping affected tickers: {cause}");
                    skip_tickers.extend(keys);
                    continue;
                }
                return Err(CoreError::PriceFetch {
                    tickers: keys.into_iter().collect(),
                    cause,
                });
            }
        }
    };

    order_comparisons(&mut comparisons, params.strategy);

    let scaling = if params.strategy == PurchaseStrategy::PeanutButter {
        let denom = target_size.checked_sub(&currently_held).unwrap_or(target_size);
        if denom.is_zero() {
            Decimal::ZERO
        } else {
            purchase_power / denom
        }
    } else {
        Decimal::ONE
    };

    let mut plan = OrderPlan::new();

    if params.include_sell_orders {
        for c in comparisons.iter().filter(|c| c.diff < Decimal::ZERO) {
            let Some(Some(price)) = prices.get(&c.ticker).copied() else {
                continue;
            };
            let pct = if c.actual.is_zero() {
                Decimal::ZERO
            } else {
                c.actual / target_size
            };
            let mut sell_value = target_size * (pct - c.weight);
            if params.strategy == PurchaseStrategy::PeanutButter {
                sell_value = sell_value * scaling;
            }
            if sell_value.value() < min_order_value.value() {
                sell_value = min_order_value;
            }
            let qty = (sell_value / price).floor();
            if qty <= Decimal::ZERO {
                continue;
            }
            plan.to_sell.push(
                OrderElement::sell_qty(c.ticker, qty, price)
                    .with_provider(params.provider.unwrap_or(ProviderId::LocalDict)),
            );
        }
    }

    for c in comparisons.iter().filter(|c| c.diff > Decimal::ZERO) {
        if !is_positive(purchase_power) {
            break;
        }
        let Some(Some(price)) = prices.get(&c.ticker).copied() else {
            continue;
        };

        let mut raw = target_size * (c.weight - {
            if c.actual.is_zero() {
                Decimal::ZERO
            } else {
                c.actual / target_size
            }
        });
        if raw.value() > purchase_power.value() {
            raw = purchase_power;
        }
        if params.strategy == PurchaseStrategy::PeanutButter && is_positive(raw) {
            let scaled = raw * scaling;
            let floor = Money::new(Decimal::ONE, currency);
            raw = if scaled.value() > floor.value() { scaled } else { floor };
        }
        if raw.value() < min_order_value.value() {
            raw = min_order_value;
        }

        if params.fractional_shares {
            plan.to_buy.push(
                OrderElement::buy_value(c.ticker, raw)
                    .with_provider(params.provider.unwrap_or(ProviderId::LocalDict)),
            );
            purchase_power = purchase_power.checked_sub(&raw).unwrap_or(purchase_power);
        } else {
            let qty = (raw / price).floor();
            if qty <= Decimal::ZERO {
                continue;
            }
            plan.to_buy.push(
                OrderElement::buy_qty(c.ticker, qty, price)
                    .with_provider(params.provider.unwrap_or(ProviderId::LocalDict)),
            );
            let spent = price * qty;
            purchase_power = purchase_power.checked_sub(&spent).unwrap_or(purchase_power);
        }
    }

    Ok(plan)
}

/// Pure, informational comparison of `real` against `ideal`: two maps of
/// `{ticker → Money}` notional for buy/sell, no price fetching, no plan
/// generation. Target defaults to `real.value()`.
pub fn compare_portfolios(
    real: &dyn PortfolioLike,
    ideal: &IdealPortfolio,
    target_size: Option<Money>,
) -> (FxHashMap<Ticker, Money>, FxHashMap<Ticker, Money>) {
    let target = target_size.unwrap_or_else(|| real.value());
    let mut to_purchase = FxHashMap::default();
    let mut to_sell = FxHashMap::default();

    for h in &ideal.holdings {
        let actual = real
            .holding_value(h.ticker)
            .unwrap_or_else(|| Money::zero(target.currency()));
        let pct = if actual.is_zero() {
            Decimal::ZERO
        } else {
            actual / target
        };
        let diff = h.weight - pct;
        if diff > Decimal::ZERO {
            to_purchase.insert(h.ticker, target * diff);
        } else if diff < Decimal::ZERO {
            to_sell.insert(h.ticker, target * (-diff));
        }
    }

    (to_purchase, to_sell)
}

/// Auto-compute a target size: total cash across the composite's
/// constituent portfolios, plus the value of every holding whose ticker
/// appears in `ideal`.
pub fn generate_auto_target_size(composite: &CompositePortfolio, ideal: &IdealPortfolio) -> Money {
    let mut total = composite.total_cash();
    for h in &ideal.holdings {
        if let Some(v) = composite.holding_value(h.ticker) {
            total = total.checked_add(&v).unwrap_or(total);
        }
    }
    total
}
