//! Broker-adapter error taxonomy.

use thiserror::Error;

/// Errors raised by [`crate::adapter::BrokerAdapter`] implementations and
/// the order executor.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Bad/expired credentials, missing endpoint. Fatal to the adapter.
    #[error("broker configuration error: {0}")]
    Configuration(String),

    /// The broker rejected an order — insufficient funds, not tradable,
    /// session expired.
    #[error("order error: {0}")]
    Order(String),

    /// The broker asked us to slow down. Adapters handle this internally
    /// with sleep+retry (see `executor::retry_on_throttle`); it is never
    /// expected to escape an adapter method.
    #[error("throttled, retry after {retry_after_secs:?}s")]
    Throttled { retry_after_secs: Option<u64> },

    /// MFA/challenge demanded. Raised only during adapter construction;
    /// carries the response data required to continue the handshake
    /// out-of-band.
    #[error("extra authentication step required: {0}")]
    ExtraAuthenticationStep(String),

    /// No active session.
    #[error("not connected")]
    NotConnected,

    /// Transport-level failure reaching the broker.
    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
