//! Execution orchestrator: load → plan → confirm → execute → reconcile.
//!
//! This is the workflow that ties the config, the index, the composite
//! orchestrator, and the broker executor together into one CLI run.

use log::{info, warn};
use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use rebalance_broker::ExecutorParams;
use rebalance_core::{
    generate_composite_order_plan, CompositeOrderPlanParams, CompositePortfolio, IdealPortfolio,
    OrderPlan, ProviderContext, ProviderId, PurchaseOrderMaps, PurchaseStrategy, Ticker,
};

use crate::account::Account;
use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::reconcile;

/// Options for a rebalance run.
pub struct RunOptions {
    pub dry_run: bool,
    pub force: bool,
    pub index_file: String,
}

fn strategy_from_str(s: &str) -> PurchaseStrategy {
    match s {
        "cheapest_first" => PurchaseStrategy::CheapestFirst,
        "peanut_butter" => PurchaseStrategy::PeanutButter,
        _ => PurchaseStrategy::LargestDiffFirst,
    }
}

/// Build one [`Account`] per configured account.
fn build_accounts(config: &Config) -> Result<Vec<Account>> {
    config.accounts.iter().map(Account::from_config).collect()
}

/// Display the per-provider plan that will be submitted.
fn display_plan(plans: &FxHashMap<ProviderId, OrderPlan>) {
    for (provider, plan) in plans {
        println!("== {provider} ==");
        for o in &plan.to_buy {
            let notional = o.inferred_value().map(|m| m.to_string()).unwrap_or_else(|| "?".into());
            println!("  BUY  {:<10} {}", o.ticker, notional);
        }
        for o in &plan.to_sell {
            let notional = o.inferred_value().map(|m| m.to_string()).unwrap_or_else(|| "?".into());
            println!("  SELL {:<10} {}", o.ticker, notional);
        }
        if plan.to_buy.is_empty() && plan.to_sell.is_empty() {
            println!("  (no orders)");
        }
    }
}

/// Execute a full rebalance run against `config`, using `opts.index_file`
/// as the ideal allocation.
pub fn run(config: &Config, ideal: &IdealPortfolio, opts: &RunOptions) -> Result<()> {
    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, &opts.index_file)?;

    let mut accounts = build_accounts(config)?;

    let portfolios = accounts
        .iter_mut()
        .map(Account::get_holdings)
        .collect::<Result<Vec<_>>>()?;
    let composite = CompositePortfolio::new(portfolios)?;

    let min_order_value = rebalance_core::Money::parse(&config.planner.min_order_value)?;
    let target_order_size = config
        .planner
        .target_order_size
        .as_ref()
        .map(|s| rebalance_core::Money::parse(s))
        .transpose()?;
    let safety_threshold =
        Decimal::try_from(config.planner.safety_threshold).unwrap_or(Decimal::new(95, 2));
    let strategy = strategy_from_str(&config.planner.strategy);

    let provider_meta: Vec<(ProviderId, bool)> = accounts
        .iter()
        .map(|a| (a.provider(), a.supports_fractional()))
        .collect();
    let mut fetchers: Vec<_> = accounts.iter_mut().map(Account::price_fetcher).collect();
    let providers: Vec<ProviderContext<'_>> = provider_meta
        .into_iter()
        .zip(fetchers.iter_mut())
        .map(|((provider, supports_fractional), fetcher)| ProviderContext {
            provider,
            supports_fractional,
            price_fetcher: fetcher.as_mut(),
        })
        .collect();

    let params = CompositeOrderPlanParams {
        purchase_order_maps: PurchaseOrderMaps::Single(strategy),
        target_size: None,
        min_order_value: Some(min_order_value),
        safety_threshold,
        target_order_size,
        include_sell_orders: config.planner.include_sell_orders,
    };

    let plans = generate_composite_order_plan(&composite, ideal, providers, params)?;

    println!("Planned orders:");
    display_plan(&plans);

    for (provider, plan) in &plans {
        audit::log_provider_plan(&mut audit, *provider, plan)?;
    }

    if plans.values().all(|p| p.to_buy.is_empty() && p.to_sell.is_empty()) {
        println!("Portfolio already matches target; nothing to do.");
        audit::log_run_completed(&mut audit, 0)?;
        return Ok(());
    }

    if opts.dry_run {
        println!("Dry run — no orders submitted.");
        audit::log_run_completed(&mut audit, 0)?;
        return Ok(());
    }

    if !opts.force && !confirm_execution() {
        return Err(Error::Aborted("user declined to proceed".into()));
    }

    let executor_params = ExecutorParams {
        include_sell_orders: config.planner.include_sell_orders,
        ignore_unsettled: true,
        skip_errored_stocks: true,
    };

    let mut executed_count = 0;
    for account in &mut accounts {
        let Some(plan) = plans.get(&account.provider()) else {
            continue;
        };
        if plan.to_buy.is_empty() && plan.to_sell.is_empty() {
            continue;
        }
        let unsettled = account.get_unsettled_instruments()?;
        let report = account.execute(plan, &unsettled, executor_params)?;
        info!(
            "{}: executed {} orders, skipped {}",
            account.provider(),
            report.executed.len(),
            report.skipped.len()
        );
        for (ticker, reason) in &report.skipped {
            warn!("{}: skipped {ticker}: {reason}", account.provider());
        }
        audit::log_execution_report(&mut audit, account.provider(), &report)?;
        executed_count += report.executed.len();
    }

    audit::log_run_completed(&mut audit, executed_count)?;

    let portfolios = accounts
        .iter_mut()
        .map(Account::get_holdings)
        .collect::<Result<Vec<_>>>()?;
    let post_composite = CompositePortfolio::new(portfolios)?;
    let target_size = rebalance_core::generate_auto_target_size(&post_composite, ideal);
    let report = reconcile::reconcile(&post_composite, ideal, target_size);
    println!("{report}");

    Ok(())
}

fn confirm_execution() -> bool {
    dialoguer::Confirm::new()
        .with_prompt("Submit the orders above?")
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Display current holdings across every configured account.
pub fn show_positions(config: &Config) -> Result<()> {
    let mut accounts = build_accounts(config)?;
    for account in &mut accounts {
        let portfolio = account.get_holdings()?;
        println!("== {} ==", account.provider());
        println!("  cash: {}", portfolio.cash);
        for h in &portfolio.holdings {
            println!("  {:<10} units={} value={}", h.ticker, h.units, h.value);
        }
    }
    Ok(())
}

/// Compare current holdings to an ideal allocation without executing.
pub fn check_status(config: &Config, ideal: &IdealPortfolio) -> Result<()> {
    let mut accounts = build_accounts(config)?;
    let portfolios = accounts
        .iter_mut()
        .map(Account::get_holdings)
        .collect::<Result<Vec<_>>>()?;
    let composite = CompositePortfolio::new(portfolios)?;
    let target_size = rebalance_core::generate_auto_target_size(&composite, ideal);
    let report = reconcile::reconcile(&composite, ideal, target_size);
    println!("{report}");
    Ok(())
}

/// Re-run reconciliation against the current on-disk state, for the
/// `reconcile` subcommand.
pub fn run_reconcile(config: &Config, ideal: &IdealPortfolio) -> Result<()> {
    check_status(config, ideal)
}

/// Load the union of every known ticker across configured accounts' held
/// instruments — used to size historical/spot price-fetch batches ahead of
/// planning.
pub fn collect_all_symbols(config: &Config) -> FxHashSet<Ticker> {
    config
        .accounts
        .iter()
        .flat_map(|a| a.holdings.iter().filter_map(|h| Ticker::try_new(&h.ticker)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_from_str_defaults_largest_diff() {
        assert_eq!(strategy_from_str("unknown"), PurchaseStrategy::LargestDiffFirst);
        assert_eq!(strategy_from_str("cheapest_first"), PurchaseStrategy::CheapestFirst);
        assert_eq!(strategy_from_str("peanut_butter"), PurchaseStrategy::PeanutButter);
    }
}
