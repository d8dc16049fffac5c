//! End-to-end tests for the execution orchestrator: config + index in,
//! a planned/executed/reconciled run out, against the in-core adapters
//! only (no network I/O anywhere in this crate).

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use rebalance_cli::account::Account;
use rebalance_cli::config::{AccountConfig, AdapterKind, CacheConfig, Config, HoldingConfig, LoggingConfig, PlannerConfig, PriceConfig};
use rebalance_cli::execution::{self, RunOptions};
use rebalance_cli::index;
use rebalance_core::{IdealPortfolio, IdealPortfolioElement, Ticker};

fn ideal(pairs: &[(&str, &str)]) -> IdealPortfolio {
    IdealPortfolio::new(
        pairs
            .iter()
            .map(|(tk, w)| IdealPortfolioElement {
                ticker: Ticker::new(tk),
                weight: w.parse().unwrap(),
            })
            .collect(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
}

fn config_with_tmp_dirs(tmp: &std::path::Path, accounts: Vec<AccountConfig>) -> Config {
    Config {
        accounts,
        planner: PlannerConfig::default(),
        logging: LoggingConfig {
            dir: tmp.join("logs").display().to_string(),
            audit_file: "audit.jsonl".into(),
        },
        cache: CacheConfig {
            dir: tmp.join("cache").display().to_string(),
        },
    }
}

#[test]
fn force_run_executes_and_reconciles_a_single_account() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::LocalDict,
            cash: "$1000.00".into(),
            holdings: vec![],
            prices: vec![
                PriceConfig { ticker: "AAPL".into(), price: "$100.00".into() },
                PriceConfig { ticker: "MSFT".into(), price: "$100.00".into() },
            ],
            unsettled: vec![],
        }],
    );

    let target = ideal(&[("AAPL", "0.5"), ("MSFT", "0.5")]);
    let opts = RunOptions {
        dry_run: false,
        force: true,
        index_file: "test.csv".into(),
    };

    execution::run(&config, &target, &opts).unwrap();

    let audit_contents = std::fs::read_to_string(config.audit_path()).unwrap();
    assert!(audit_contents.contains("run_started"));
    assert!(audit_contents.contains("provider_plan_computed"));
    assert!(audit_contents.contains("provider_executed"));
    assert!(audit_contents.contains("run_completed"));
}

#[test]
fn dry_run_does_not_execute_orders() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::LocalDict,
            cash: "$1000.00".into(),
            holdings: vec![],
            prices: vec![PriceConfig { ticker: "AAPL".into(), price: "$100.00".into() }],
            unsettled: vec![],
        }],
    );

    let target = ideal(&[("AAPL", "1.0")]);
    let opts = RunOptions {
        dry_run: true,
        force: false,
        index_file: "test.csv".into(),
    };

    execution::run(&config, &target, &opts).unwrap();

    let audit_contents = std::fs::read_to_string(config.audit_path()).unwrap();
    assert!(!audit_contents.contains("provider_executed"));
}

#[test]
fn run_aborts_without_force_when_not_dry_run_and_not_confirmed() {
    // dialoguer::Confirm::interact() fails (no TTY) in the test harness,
    // which confirm_execution() treats as a decline — exercising the
    // abort path without needing an interactive terminal.
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::LocalDict,
            cash: "$1000.00".into(),
            holdings: vec![],
            prices: vec![PriceConfig { ticker: "AAPL".into(), price: "$100.00".into() }],
            unsettled: vec![],
        }],
    );

    let target = ideal(&[("AAPL", "1.0")]);
    let opts = RunOptions {
        dry_run: false,
        force: false,
        index_file: "test.csv".into(),
    };

    let result = execution::run(&config, &target, &opts);
    assert!(result.is_err());
}

#[test]
fn composite_run_splits_across_fractional_and_integer_accounts() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![
            AccountConfig {
                adapter: AdapterKind::LocalDict,
                cash: "$800.00".into(),
                holdings: vec![HoldingConfig {
                    ticker: "AAPL".into(),
                    units: dec!(1),
                    value: "$100.00".into(),
                }],
                prices: vec![PriceConfig { ticker: "AAPL".into(), price: "$100.00".into() }],
                unsettled: vec![],
            },
            AccountConfig {
                adapter: AdapterKind::LocalDictNoPartial,
                cash: "$200.00".into(),
                holdings: vec![],
                prices: vec![PriceConfig { ticker: "MSFT".into(), price: "$33.00".into() }],
                unsettled: vec![],
            },
        ],
    );

    let target = ideal(&[("AAPL", "0.5"), ("MSFT", "0.5")]);
    let opts = RunOptions {
        dry_run: false,
        force: true,
        index_file: "test.csv".into(),
    };

    execution::run(&config, &target, &opts).unwrap();
}

#[test]
fn show_positions_reports_every_account() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::Dummy,
            cash: "$500.00".into(),
            holdings: vec![],
            prices: vec![],
            unsettled: vec![],
        }],
    );
    execution::show_positions(&config).unwrap();
}

#[test]
fn check_status_reports_gap_against_empty_portfolio() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::LocalDict,
            cash: "$100.00".into(),
            holdings: vec![],
            prices: vec![],
            unsettled: vec![],
        }],
    );
    let target = ideal(&[("AAPL", "1.0")]);
    execution::check_status(&config, &target).unwrap();
}

#[test]
fn collect_all_symbols_unions_configured_holdings() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with_tmp_dirs(
        tmp.path(),
        vec![AccountConfig {
            adapter: AdapterKind::LocalDict,
            cash: "$0".into(),
            holdings: vec![
                HoldingConfig { ticker: "AAPL".into(), units: dec!(1), value: "$1".into() },
                HoldingConfig { ticker: "MSFT".into(), units: dec!(1), value: "$1".into() },
            ],
            prices: vec![],
            unsettled: vec![],
        }],
    );
    let symbols = execution::collect_all_symbols(&config);
    assert!(symbols.contains(&Ticker::new("AAPL")));
    assert!(symbols.contains(&Ticker::new("MSFT")));
}

#[test]
fn account_from_config_rejects_bad_ticker() {
    let cfg = AccountConfig {
        adapter: AdapterKind::LocalDict,
        cash: "$100".into(),
        holdings: vec![HoldingConfig {
            ticker: "THISISNOTATICKERATALLTOOLONG".into(),
            units: dec!(1),
            value: "$1".into(),
        }],
        prices: vec![],
        unsettled: vec![],
    };
    assert!(Account::from_config(&cfg).is_err());
}

#[test]
fn load_index_end_to_end_from_csv_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("my_idx.csv");
    std::fs::write(&path, "AAPL,0.6\nMSFT,0.4\n").unwrap();
    let loaded = index::load_index(&path).unwrap();
    assert_eq!(loaded.holdings.len(), 2);
}
