//! Merge policy for the primary (on-chain) and secondary (market-data) feeds.
//!
//! Pure and synchronous: both inputs are already-settled fetch results.
//! Precedence is primary, then secondary, then `Unavailable`. A reading whose
//! price is not finite and positive counts as that feed being unavailable;
//! zero is never used as an "absent" marker.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::asset::normalize_symbol;
use super::error::PricefuseError;
use super::quote::{
    FeedResult, PrimaryReading, Quote, QuoteSource, SecondaryReading, is_valid_price,
};

/// Resolve a quote using the current time for secondary-sourced timestamps.
pub fn resolve(
    symbol: &str,
    primary: FeedResult<PrimaryReading>,
    secondary: FeedResult<SecondaryReading>,
) -> Result<Quote, PricefuseError> {
    resolve_at(symbol, primary, secondary, Utc::now())
}

pub fn resolve_at(
    symbol: &str,
    primary: FeedResult<PrimaryReading>,
    secondary: FeedResult<SecondaryReading>,
    now: DateTime<Utc>,
) -> Result<Quote, PricefuseError> {
    let symbol = normalize_symbol(symbol);
    let primary = sanitize_primary(&symbol, primary);
    let secondary = sanitize_secondary(&symbol, secondary);

    let (volume_24h, change_24h) = match &secondary {
        Some(s) => (s.volume_24h, s.change_24h),
        None => (None, None),
    };

    match (primary, secondary) {
        (Some(p), _) => {
            debug!(symbol = %symbol, price = p.price, "resolved from primary feed");
            Ok(Quote {
                symbol,
                price: p.price,
                timestamp: p.timestamp,
                source: QuoteSource::Primary,
                volume_24h,
                change_24h,
            })
        }
        (None, Some(s)) => {
            debug!(symbol = %symbol, price = s.price, "primary missing, resolved from secondary feed");
            Ok(Quote {
                symbol,
                price: s.price,
                timestamp: now,
                source: QuoteSource::Secondary,
                volume_24h,
                change_24h,
            })
        }
        (None, None) => Err(PricefuseError::Unavailable { symbol }),
    }
}

fn sanitize_primary(symbol: &str, result: FeedResult<PrimaryReading>) -> Option<PrimaryReading> {
    match result {
        FeedResult::Available(r) if is_valid_price(r.price) => Some(r),
        FeedResult::Available(r) => {
            warn!(symbol, price = r.price, "discarding primary reading with non-positive price");
            None
        }
        FeedResult::Unavailable => None,
    }
}

fn sanitize_secondary(
    symbol: &str,
    result: FeedResult<SecondaryReading>,
) -> Option<SecondaryReading> {
    match result {
        FeedResult::Available(r) if is_valid_price(r.price) => Some(r),
        FeedResult::Available(r) => {
            warn!(symbol, price = r.price, "discarding secondary reading with non-positive price");
            None
        }
        FeedResult::Unavailable => None,
    }
}
