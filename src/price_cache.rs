//! Memoising, TTL-bounded price cache sitting between the planner and a
//! broker's quote endpoint.

use chrono::{DateTime, NaiveDate, Utc};
use rustc_hash::FxHashMap;

use crate::error::{CoreError, Result};
use crate::{Money, Ticker};

const INSTANT_LABEL: &str = "INSTANT";
const DEFAULT_TTL_SECS: i64 = 3600;

/// Pluggable price source an adapter hands to the cache. Only `fetch_batch`
/// is required; `fetch_single` defaults to a batch call of one.
pub trait PriceFetcher {
    /// Fetch prices for a set of tickers as of `date` (`None` = spot quote).
    /// `None` in the result map is a valid answer — "no price available" —
    /// and is cached as such.
    fn fetch_batch(
        &mut self,
        tickers: &[Ticker],
        date: Option<NaiveDate>,
    ) -> std::result::Result<FxHashMap<Ticker, Option<Money>>, String>;

    /// Fetch a single ticker's price. Default falls back to a batch call.
    fn fetch_single(
        &mut self,
        ticker: Ticker,
        date: Option<NaiveDate>,
    ) -> std::result::Result<Option<Money>, String> {
        Ok(self
            .fetch_batch(&[ticker], date)?
            .remove(&ticker)
            .flatten())
    }
}

/// Per-label, TTL-bounded price cache. A date of `None` represents the
/// spot quote (label `"INSTANT"`); any other date is keyed by its ISO
/// string and never expires (historical prices don't change).
pub struct PriceCache<F: PriceFetcher> {
    fetcher: F,
    store: FxHashMap<String, FxHashMap<Ticker, Option<Money>>>,
    instant_refresh_times: FxHashMap<Ticker, DateTime<Utc>>,
    ttl_secs: i64,
}

fn label_for(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| INSTANT_LABEL.to_string())
}

impl<F: PriceFetcher> PriceCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            store: FxHashMap::default(),
            instant_refresh_times: FxHashMap::default(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    fn is_stale(&self, ticker: Ticker, now: DateTime<Utc>) -> bool {
        match self.instant_refresh_times.get(&ticker) {
            Some(ts) => (now - *ts).num_seconds() > self.ttl_secs,
            None => true,
        }
    }

    fn evict_if_stale(&mut self, ticker: Ticker, label: &str, now: DateTime<Utc>) {
        if label == INSTANT_LABEL && self.is_stale(ticker, now) {
            if let Some(m) = self.store.get_mut(label) {
                m.remove(&ticker);
            }
            self.instant_refresh_times.remove(&ticker);
        }
    }

    /// Fetch one ticker's price, using the cache when fresh.
    pub fn get_price(&mut self, ticker: Ticker, date: Option<NaiveDate>) -> Result<Option<Money>> {
        let label = label_for(date);
        let now = Utc::now();
        self.evict_if_stale(ticker, &label, now);

        if let Some(cached) = self.store.get(&label).and_then(|m| m.get(&ticker)) {
            return Ok(*cached);
        }

        let price = self.fetcher.fetch_single(ticker, date).map_err(|cause| {
            let mut tickers = rustc_hash::FxHashSet::default();
            tickers.insert(ticker);
            CoreError::PriceFetch { tickers, cause }
        })?;

        self.store
            .entry(label.clone())
            .or_default()
            .insert(ticker, price);
        if label == INSTANT_LABEL {
            self.instant_refresh_times.insert(ticker, now);
        }
        Ok(price)
    }

    /// Fetch prices for many tickers, hitting the cache where possible and
    /// calling the batch fetcher exactly once for the misses.
    pub fn get_prices(
        &mut self,
        tickers: &[Ticker],
        date: Option<NaiveDate>,
    ) -> Result<FxHashMap<Ticker, Option<Money>>> {
        let label = label_for(date);
        let now = Utc::now();
        for &ticker in tickers {
            self.evict_if_stale(ticker, &label, now);
        }

        let mut found = FxHashMap::default();
        let mut missing = Vec::new();
        for &ticker in tickers {
            match self.store.get(&label).and_then(|m| m.get(&ticker)) {
                Some(cached) => {
                    found.insert(ticker, *cached);
                }
                None => missing.push(ticker),
            }
        }

        if !missing.is_empty() {
            let fetched = self.fetcher.fetch_batch(&missing, date).map_err(|cause| {
                CoreError::PriceFetch {
                    tickers: missing.iter().copied().collect(),
                    cause,
                }
            })?;
            let entry = self.store.entry(label.clone()).or_default();
            for &ticker in &missing {
                let price = fetched.get(&ticker).copied().flatten();
                entry.insert(ticker, price);
                found.insert(ticker, price);
                if label == INSTANT_LABEL {
                    self.instant_refresh_times.insert(ticker, now);
                }
            }
        }

        Ok(found)
    }
}
