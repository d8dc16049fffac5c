//! Loading an [`IdealPortfolio`] from an index file, and plain ticker
//! lists from stock-list files.
//!
//! Two index formats, per the documented interface:
//!
//! * CSV — one `ticker,weight` pair per line. The file stem names the
//!   index; an optional `_YYYY_qN` suffix (e.g. `sp500_2024_q1.csv`)
//!   encodes the source quarter and is used to derive `source_date` (the
//!   first day of that quarter) when the caller doesn't supply one.
//! * JSON — `{"name": ..., "as_of": "YYYY-MM-DD", "components": [{"ticker",
//!   "weight"}, ...]}`.
//!
//! Stock-list files are plain CSV, one ticker per line, used by callers
//! that want to pass a ticker universe to [`rebalance_core::IdealPortfolio::exclude`]
//! or similar bulk operations.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use rebalance_core::{IdealPortfolio, IdealPortfolioElement, Ticker};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct JsonIndex {
    #[allow(dead_code)]
    name: String,
    as_of: NaiveDate,
    components: Vec<JsonComponent>,
}

#[derive(Debug, Deserialize)]
struct JsonComponent {
    ticker: String,
    weight: Decimal,
}

/// Load an ideal portfolio from either a `.csv` or `.json` index file,
/// dispatching on extension.
pub fn load_index(path: &Path) -> Result<IdealPortfolio> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json_index(path),
        Some("csv") | None => load_csv_index(path),
        Some(other) => Err(Error::Index(format!(
            "unrecognized index file extension: {other}"
        ))),
    }
}

/// Load a CSV index: one `ticker,weight` per line. `source_date` is
/// derived from a `_YYYY_qN` filename suffix when present, else today.
fn load_csv_index(path: &Path) -> Result<IdealPortfolio> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::IndexRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut holdings = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ',');
        let ticker = parts
            .next()
            .ok_or_else(|| Error::Index(format!("{}:{}: missing ticker", path.display(), lineno + 1)))?
            .trim();
        let weight = parts
            .next()
            .ok_or_else(|| Error::Index(format!("{}:{}: missing weight", path.display(), lineno + 1)))?
            .trim();
        let ticker = Ticker::try_new(ticker)
            .ok_or_else(|| Error::Index(format!("{}:{}: invalid ticker {ticker:?}", path.display(), lineno + 1)))?;
        let weight: Decimal = weight
            .parse()
            .map_err(|_| Error::Index(format!("{}:{}: invalid weight {weight:?}", path.display(), lineno + 1)))?;
        holdings.push(IdealPortfolioElement { ticker, weight });
    }

    if holdings.is_empty() {
        return Err(Error::Index(format!("{}: no holdings parsed", path.display())));
    }

    let source_date = quarter_suffix_date(path).unwrap_or_else(today);
    let mut ideal = IdealPortfolio::new(holdings, source_date);
    ideal.normalize();
    Ok(ideal)
}

/// Load a JSON index: `{name, as_of, components: [{ticker, weight}]}`.
fn load_json_index(path: &Path) -> Result<IdealPortfolio> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::IndexRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed: JsonIndex = serde_json::from_str(&contents)?;

    let mut holdings = Vec::with_capacity(parsed.components.len());
    for c in parsed.components {
        let ticker = Ticker::try_new(&c.ticker)
            .ok_or_else(|| Error::Index(format!("invalid ticker {:?} in {}", c.ticker, path.display())))?;
        holdings.push(IdealPortfolioElement {
            ticker,
            weight: c.weight,
        });
    }

    let mut ideal = IdealPortfolio::new(holdings, parsed.as_of);
    ideal.normalize();
    Ok(ideal)
}

/// Load a plain ticker-list CSV: one ticker per line, no header.
pub fn load_stock_list(path: &Path) -> Result<Vec<Ticker>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::IndexRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            Ticker::try_new(l).ok_or_else(|| Error::Index(format!("invalid ticker {l:?} in {}", path.display())))
        })
        .collect()
}

/// Parse a `_YYYY_qN` suffix off a file stem into the quarter's first day.
fn quarter_suffix_date(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let (_, suffix) = stem.rsplit_once('_')?;
    let quarter: u32 = suffix.strip_prefix('q')?.parse().ok()?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let (_, year_part) = stem[..stem.len() - suffix.len() - 1].rsplit_once('_')?;
    let year: i32 = year_part.parse().ok()?;
    let month = (quarter - 1) * 3 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn t(s: &str) -> Ticker {
        Ticker::new(s)
    }

    #[test]
    fn parses_plain_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_index.csv");
        std::fs::write(&path, "AAPL,0.6\nMSFT,0.4\n").unwrap();
        let ideal = load_csv_index(&path).unwrap();
        assert_eq!(ideal.holdings.len(), 2);
        assert!(ideal.contains(t("AAPL")));
        let total: Decimal = ideal.holdings.iter().map(|h| h.weight).sum();
        assert_eq!(total, dec!(1));
    }

    #[test]
    fn parses_quarter_suffix_into_source_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp500_2024_q1.csv");
        std::fs::write(&path, "AAPL,1.0\n").unwrap();
        let ideal = load_csv_index(&path).unwrap();
        assert_eq!(ideal.source_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn parses_json_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(
            &path,
            r#"{"name":"Test Index","as_of":"2024-03-01","components":[{"ticker":"AAPL","weight":0.7},{"ticker":"MSFT","weight":0.3}]}"#,
        )
        .unwrap();
        let ideal = load_json_index(&path).unwrap();
        assert_eq!(ideal.source_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(ideal.holdings.len(), 2);
    }

    #[test]
    fn load_index_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("idx.csv");
        std::fs::write(&csv_path, "AAPL,1.0\n").unwrap();
        assert!(load_index(&csv_path).is_ok());

        let json_path = dir.path().join("idx.json");
        std::fs::write(
            &json_path,
            r#"{"name":"x","as_of":"2024-01-01","components":[{"ticker":"AAPL","weight":1.0}]}"#,
        )
        .unwrap();
        assert!(load_index(&json_path).is_ok());
    }

    #[test]
    fn rejects_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(load_csv_index(&path).is_err());
    }

    #[test]
    fn stock_list_parses_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.csv");
        std::fs::write(&path, "AAPL\nmsft\n\nTSLA\n").unwrap();
        let tickers = load_stock_list(&path).unwrap();
        assert_eq!(tickers, vec![t("AAPL"), t("MSFT"), t("TSLA")]);
    }
}
