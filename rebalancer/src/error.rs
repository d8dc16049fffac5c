//! Error types for the rebalance-cli crate.

use std::path::PathBuf;

/// All errors that can occur while the CLI loads configuration, builds
/// adapters, plans, or executes a rebalance run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("index file error: {0}")]
    Index(String),

    #[error("failed to read index file {path}: {source}")]
    IndexRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse index JSON: {0}")]
    IndexParse(#[from] serde_json::Error),

    #[error("planner error: {0}")]
    Planner(#[from] rebalance_core::CoreError),

    #[error("broker error: {0}")]
    Broker(#[from] rebalance_broker::BrokerError),

    #[error("execution aborted: {0}")]
    Aborted(String),

    #[error("local adapter cache error: {0}")]
    LocalCache(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
