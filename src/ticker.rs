//! Opaque broker ticker symbols.

use std::fmt;

/// An uppercase alphanumeric ticker symbol.
///
/// Tickers are treated as bare identifiers by the core — validity beyond
/// "fits in 16 bytes" is a broker concern. Stored inline so `Ticker` stays
/// `Copy` and is cheap to use as a hash-map key across the planner.
#[derive(Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Ticker {
    len: u8,
    bytes: [u8; Self::MAX_LEN],
}

impl Ticker {
    /// Maximum ticker length the inline representation can hold.
    pub const MAX_LEN: usize = 16;

    /// Build a ticker, uppercasing the input. Panics if longer than
    /// [`Ticker::MAX_LEN`] bytes — use [`Ticker::try_new`] at untrusted
    /// boundaries (index files, adapter responses).
    pub fn new(symbol: &str) -> Self {
        Self::try_new(symbol).unwrap_or_else(|| {
            panic!(
                "ticker {symbol:?} exceeds {} bytes",
                Self::MAX_LEN
            )
        })
    }

    /// Build a ticker, returning `None` if it doesn't fit inline or is empty.
    pub fn try_new(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_ascii_uppercase();
        if upper.is_empty() || upper.len() > Self::MAX_LEN {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..upper.len()].copy_from_slice(upper.as_bytes());
        Some(Self {
            len: upper.len() as u8,
            bytes,
        })
    }

    /// The ticker text.
    pub fn as_str(&self) -> &str {
        // SAFETY: constructed only from valid UTF-8 (ASCII uppercased).
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", self.as_str())
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Ticker::new(s)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::new("UNKNOWN")
    }
}

impl PartialEq<str> for Ticker {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Ticker {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl serde::Serialize for Ticker {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Ticker {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ticker::try_new(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "ticker {s:?} exceeds {} bytes or is empty",
                Ticker::MAX_LEN
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases() {
        assert_eq!(Ticker::new("aapl").as_str(), "AAPL");
    }

    #[test]
    fn rejects_too_long() {
        assert!(Ticker::try_new("THISTICKERISWAYTOOLONG").is_none());
    }

    #[test]
    fn rejects_empty() {
        assert!(Ticker::try_new("").is_none());
        assert!(Ticker::try_new("   ").is_none());
    }

    #[test]
    fn copy_and_hash() {
        let a = Ticker::new("MSFT");
        let b = a;
        assert_eq!(a, b);
        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn ord_is_lexicographic() {
        let mut v = vec![Ticker::new("MSFT"), Ticker::new("AAPL"), Ticker::new("TSLA")];
        v.sort();
        assert_eq!(v[0].as_str(), "AAPL");
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Ticker::new("aapl")), "AAPL");
    }

    #[test]
    fn json_roundtrip() {
        let t = Ticker::new("AAPL");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"AAPL\"");
        let back: Ticker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
