//! Concurrent quote fetching.
//!
//! Both feeds are queried at once, each under its own timeout. A failure or
//! timeout on one feed never delays or cancels the other; both outcomes are
//! settled into `FeedResult`s before the resolver runs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::asset::normalize_symbol;
use crate::domain::error::{FeedError, PricefuseError};
use crate::domain::price_resolver;
use crate::domain::quote::{FeedResult, Quote};
use crate::ports::feed_port::{PrimaryFeedPort, SecondaryFeedPort};

pub struct QuoteService {
    primary: Arc<dyn PrimaryFeedPort>,
    secondary: Arc<dyn SecondaryFeedPort>,
    primary_timeout: Duration,
    secondary_timeout: Duration,
}

impl QuoteService {
    pub fn new(
        primary: Arc<dyn PrimaryFeedPort>,
        secondary: Arc<dyn SecondaryFeedPort>,
        primary_timeout: Duration,
        secondary_timeout: Duration,
    ) -> Self {
        QuoteService {
            primary,
            secondary,
            primary_timeout,
            secondary_timeout,
        }
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, PricefuseError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(PricefuseError::invalid_input("symbol must not be empty"));
        }

        let (primary, secondary) = tokio::join!(
            settle(
                self.primary.name(),
                &symbol,
                self.primary_timeout,
                self.primary.fetch(&symbol),
            ),
            settle(
                self.secondary.name(),
                &symbol,
                self.secondary_timeout,
                self.secondary.fetch(&symbol),
            ),
        );

        price_resolver::resolve(&symbol, primary, secondary)
    }
}

async fn settle<T, F>(feed: &str, symbol: &str, limit: Duration, fetch: F) -> FeedResult<T>
where
    F: Future<Output = Result<T, FeedError>>,
{
    match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(reading)) => FeedResult::Available(reading),
        Ok(Err(e)) => {
            warn!(feed, symbol, error = %e, "feed fetch failed");
            FeedResult::Unavailable
        }
        Err(_) => {
            warn!(feed, symbol, timeout_ms = limit.as_millis() as u64, "feed fetch timed out");
            FeedResult::Unavailable
        }
    }
}
