//! Broker provider identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of brokers the planner can route orders to.
///
/// Only `LOCAL_DICT`, `LOCAL_DICT_NO_PARTIAL`, and `DUMMY` have concrete
/// in-core adapter implementations (see `rebalance_broker`); the named real
/// brokers exist here for routing and map-key purposes only — their
/// authentication flows and wire protocols are out of scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    Alpaca,
    AlpacaPaper,
    Robinhood,
    Webull,
    WebullPaper,
    Moomoo,
    Schwab,
    LocalDict,
    LocalDictNoPartial,
    Dummy,
}

impl ProviderId {
    /// Whether this identity is one of the in-core adapters, as opposed to
    /// a real-broker routing tag with no local implementation.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            ProviderId::LocalDict | ProviderId::LocalDictNoPartial | ProviderId::Dummy
        )
    }

    fn label(self) -> &'static str {
        match self {
            ProviderId::Alpaca => "ALPACA",
            ProviderId::AlpacaPaper => "ALPACA_PAPER",
            ProviderId::Robinhood => "ROBINHOOD",
            ProviderId::Webull => "WEBULL",
            ProviderId::WebullPaper => "WEBULL_PAPER",
            ProviderId::Moomoo => "MOOMOO",
            ProviderId::Schwab => "SCHWAB",
            ProviderId::LocalDict => "LOCAL_DICT",
            ProviderId::LocalDictNoPartial => "LOCAL_DICT_NO_PARTIAL",
            ProviderId::Dummy => "DUMMY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
