//! Quote and raw feed reading types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteSource {
    /// On-chain FTSOv2 feed.
    Primary,
    /// Off-chain market-data feed.
    Secondary,
}

/// Canonical resolved price for one symbol. `price` is always > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub source: QuoteSource,
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "change24h")]
    pub change_24h: Option<f64>,
}

/// Outcome of one upstream fetch, already settled (success, failure or timeout).
#[derive(Debug, Clone, PartialEq)]
pub enum FeedResult<T> {
    Available(T),
    Unavailable,
}

impl<T> From<Option<T>> for FeedResult<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FeedResult::Available(v),
            None => FeedResult::Unavailable,
        }
    }
}

/// Reading from the on-chain feed, carrying the chain's own timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryReading {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Reading from the market-data feed. No observation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryReading {
    pub price: f64,
    pub volume_24h: Option<f64>,
    pub change_24h: Option<f64>,
}

pub(crate) fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
