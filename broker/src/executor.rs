//! Walks a planner-produced [`OrderPlan`] and dispatches each element to a
//! [`BrokerAdapter`], handling throttling and per-order error tolerance.

use std::time::Duration;

use rustc_hash::FxHashSet;

use rebalance_core::{OrderElement, OrderPlan, OrderType, Ticker};

use crate::adapter::BrokerAdapter;
use crate::error::{BrokerError, Result};

const DEFAULT_THROTTLE_RETRY_SECS: u64 = 60;
const MAX_THROTTLE_RETRIES: u32 = 5;

/// Controls for [`purchase_composite_order_plan`].
#[derive(Clone, Copy, Debug)]
pub struct ExecutorParams {
    /// Whether SELL elements are dispatched at all.
    pub include_sell_orders: bool,
    /// Skip tickers that are in the provider's unsettled set.
    pub ignore_unsettled: bool,
    /// On an `Order` error, log and continue rather than propagate.
    pub skip_errored_stocks: bool,
}

impl Default for ExecutorParams {
    fn default() -> Self {
        Self {
            include_sell_orders: false,
            ignore_unsettled: true,
            skip_errored_stocks: true,
        }
    }
}

/// Outcome of walking one [`OrderPlan`].
#[derive(Clone, Debug, Default)]
pub struct ExecutionReport {
    pub executed: Vec<(Ticker, OrderType)>,
    pub skipped: Vec<(Ticker, String)>,
}

/// Retry `op` while it returns [`BrokerError::Throttled`], sleeping via
/// `sleep` for the hinted duration (or [`DEFAULT_THROTTLE_RETRY_SECS`] when
/// no hint is given) between attempts. Bounded at
/// [`MAX_THROTTLE_RETRIES`] so a broker that throttles forever doesn't
/// hang the executor indefinitely.
fn retry_on_throttle<T>(
    mut op: impl FnMut() -> Result<T>,
    mut sleep: impl FnMut(Duration),
) -> Result<T> {
    let mut attempts = 0;
    loop {
        match op() {
            Err(BrokerError::Throttled { retry_after_secs }) if attempts < MAX_THROTTLE_RETRIES => {
                attempts += 1;
                sleep(Duration::from_secs(
                    retry_after_secs.unwrap_or(DEFAULT_THROTTLE_RETRY_SECS),
                ));
            }
            other => return other,
        }
    }
}

fn dispatch<A: BrokerAdapter>(adapter: &mut A, order: &OrderElement) -> Result<bool> {
    match order.order_type {
        OrderType::Buy => retry_on_throttle(
            || adapter.buy_instrument(order.ticker, order.qty, order.value),
            |d| std::thread::sleep(d),
        ),
        OrderType::Sell => retry_on_throttle(
            || adapter.sell_instrument(order.ticker, order.qty, order.value),
            |d| std::thread::sleep(d),
        ),
    }
}

/// Submit every order in `plan` to `adapter`, honoring `params`.
///
/// Per element: skip SELLs when `include_sell_orders=false`; skip tickers
/// in `unsettled` when `ignore_unsettled=true`; dispatch, retrying through
/// throttling internally; on an `Order` error either propagate (default)
/// or log-and-continue when `skip_errored_stocks=true`.
pub fn purchase_composite_order_plan<A: BrokerAdapter>(
    adapter: &mut A,
    plan: &OrderPlan,
    unsettled: &FxHashSet<Ticker>,
    params: ExecutorParams,
) -> Result<ExecutionReport> {
    let mut report = ExecutionReport::default();

    let mut elements: Vec<&OrderElement> = plan.to_buy.iter().collect();
    if params.include_sell_orders {
        elements.extend(plan.to_sell.iter());
    }

    for order in elements {
        if params.ignore_unsettled && unsettled.contains(&order.ticker) {
            report
                .skipped
                .push((order.ticker, "unsettled".to_string()));
            continue;
        }

        match dispatch(adapter, order) {
            Ok(_) => report.executed.push((order.ticker, order.order_type)),
            Err(BrokerError::Order(msg)) if params.skip_errored_stocks => {
                log::warn!("order rejected for {}: {msg}", order.ticker);
                report.skipped.push((order.ticker, msg));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
