//! Persisted, per-adapter key→string mapping caches.
//!
//! Real brokerage adapters (Robinhood, Webull, Schwab, MooMoo, ...) keep a
//! small on-disk dictionary mapping their own instrument identifiers to
//! tickers — `robinhood_instruments.json`, `webull_tickers.json`,
//! `schwab_tickers.json`, `schwab_desc_to_ticker.json`,
//! `moo_moo_tickers.json`. The format is adapter-private (an opaque
//! string→string dictionary); this module is the one shared
//! load/corrupt-reset/save implementation every adapter's cache file uses.
//!
//! Real adapters are out of scope for this crate (see
//! `rebalance_broker::adapter::BrokerAdapter`), so nothing here is wired to
//! a live fetch path — this is the documented persistence contract, ready
//! for whichever adapter crate needs it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The canonical per-adapter cache file names from the documented
/// interface.
pub const ROBINHOOD_INSTRUMENTS: &str = "robinhood_instruments.json";
pub const WEBULL_TICKERS: &str = "webull_tickers.json";
pub const SCHWAB_TICKERS: &str = "schwab_tickers.json";
pub const SCHWAB_DESC_TO_TICKER: &str = "schwab_desc_to_ticker.json";
pub const MOOMOO_TICKERS: &str = "moo_moo_tickers.json";

/// A single adapter's persisted key→string dictionary.
///
/// On load, a corrupted (unparseable) file resets to an empty map rather
/// than failing the whole adapter — the cache is a pure optimization, and
/// an adapter can always refresh it from its own upstream lookup.
pub struct PersistedMappingCache {
    path: PathBuf,
    map: BTreeMap<String, String>,
    dirty: bool,
}

impl PersistedMappingCache {
    /// Load `dir/file_name`, resetting to empty on a missing or corrupt
    /// file.
    pub fn load(dir: &Path, file_name: &str) -> Self {
        let path = dir.join(file_name);
        let map = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self {
            path,
            map,
            dirty: false,
        }
    }

    /// Look up a cached value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Insert or overwrite a mapping. Marks the cache dirty for the next
    /// [`PersistedMappingCache::save`].
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
        self.dirty = true;
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Persist the current map if it has pending changes.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.map)?;
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        Ok(())
    }
}
