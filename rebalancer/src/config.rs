//! TOML configuration loading and validation.
//!
//! Describes the constituent broker accounts the CLI plans and executes
//! against, plus the planner's default parameters. Only the in-core
//! adapters (`local_dict`, `local_dict_no_partial`, `dummy`) are
//! configurable here — real brokerage SDKs and their auth flows are out of
//! scope for this crate (see `rebalance_broker::adapter::BrokerAdapter`).

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Which in-core adapter backs an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    LocalDict,
    LocalDictNoPartial,
    Dummy,
}

/// One constituent broker account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub adapter: AdapterKind,
    pub cash: String,
    #[serde(default)]
    pub holdings: Vec<HoldingConfig>,
    #[serde(default)]
    pub prices: Vec<PriceConfig>,
    #[serde(default)]
    pub unsettled: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoldingConfig {
    pub ticker: String,
    pub units: Decimal,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceConfig {
    pub ticker: String,
    pub price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_min_order_value")]
    pub min_order_value: String,
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: f64,
    #[serde(default)]
    pub target_order_size: Option<String>,
    #[serde(default)]
    pub include_sell_orders: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            min_order_value: default_min_order_value(),
            safety_threshold: default_safety_threshold(),
            target_order_size: None,
            include_sell_orders: false,
        }
    }
}

fn default_strategy() -> String {
    "largest_diff_first".into()
}
fn default_min_order_value() -> String {
    "$2.00".into()
}
fn default_safety_threshold() -> f64 {
    0.95
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "./cache".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(Error::Config("accounts list is empty".into()));
        }
        for account in &self.accounts {
            rebalance_core::Money::parse(&account.cash)
                .map_err(|e| Error::Config(format!("account cash {:?}: {e}", account.cash)))?;
        }
        if !matches!(
            self.planner.strategy.as_str(),
            "largest_diff_first" | "cheapest_first" | "peanut_butter"
        ) {
            return Err(Error::Config(format!(
                "unknown planner strategy: {}",
                self.planner.strategy
            )));
        }
        if self.planner.safety_threshold <= 0.0 || self.planner.safety_threshold > 1.0 {
            return Err(Error::Config(
                "planner.safety_threshold must be in (0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> std::path::PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[[accounts]]
adapter = "local_dict"
cash = "$800.00"

[[accounts.holdings]]
ticker = "AAPL"
units = "1"
value = "$100.00"

[[accounts.prices]]
ticker = "AAPL"
price = "$100.00"

[[accounts]]
adapter = "local_dict_no_partial"
cash = "$200.00"
unsettled = ["TSLA"]

[planner]
strategy = "peanut_butter"
min_order_value = "$5.00"
safety_threshold = 0.9

[logging]
dir = "./logs"
audit_file = "audit.jsonl"

[cache]
dir = "./cache"
"#
    }

    #[test]
    fn parse_example_config() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].adapter, AdapterKind::LocalDict);
        assert_eq!(config.accounts[1].unsettled, vec!["TSLA".to_string()]);
        assert_eq!(config.planner.strategy, "peanut_butter");
    }

    #[test]
    fn validate_accepts_example() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_catches_empty_accounts() {
        let config = Config {
            accounts: vec![],
            planner: PlannerConfig::default(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_bad_strategy() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.strategy = "moon_shot".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_bad_safety_threshold() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.safety_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn audit_path_joins_dir_and_file() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(
            config.audit_path(),
            std::path::PathBuf::from("./logs/audit.jsonl")
        );
    }

    #[test]
    fn validate_catches_bad_cash() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.accounts[0].cash = "not money".into();
        assert!(config.validate().is_err());
    }
}
