#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pricefuse::domain::error::FeedError;
use pricefuse::domain::quote::{PrimaryReading, SecondaryReading};
use pricefuse::domain::trade::{Side, TradeIntent};
use pricefuse::ports::feed_port::{PrimaryFeedPort, SecondaryFeedPort};
use pricefuse::quote_service::QuoteService;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub fn chain_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_717_000_000, 0).unwrap()
}

/// Primary feed answering from a fixed table; unknown symbols fail.
pub struct MockPrimary {
    pub prices: HashMap<String, f64>,
    pub delay: Duration,
}

impl MockPrimary {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PrimaryFeedPort for MockPrimary {
    fn name(&self) -> &str {
        "mock-primary"
    }

    async fn fetch(&self, symbol: &str) -> Result<PrimaryReading, FeedError> {
        tokio::time::sleep(self.delay).await;
        match self.prices.get(symbol) {
            Some(price) => Ok(PrimaryReading {
                price: *price,
                timestamp: chain_time(),
            }),
            None => Err(FeedError::Rpc("execution reverted".into())),
        }
    }
}

pub struct MockSecondary {
    pub prices: HashMap<String, f64>,
}

impl MockSecondary {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl SecondaryFeedPort for MockSecondary {
    fn name(&self) -> &str {
        "mock-secondary"
    }

    async fn fetch(&self, symbol: &str) -> Result<SecondaryReading, FeedError> {
        match self.prices.get(symbol) {
            Some(price) => Ok(SecondaryReading {
                price: *price,
                volume_24h: Some(25_000_000.0),
                change_24h: Some(-1.5),
            }),
            None => Err(FeedError::Status(429)),
        }
    }
}

pub fn quote_service(primary: MockPrimary, secondary: MockSecondary) -> QuoteService {
    QuoteService::new(
        Arc::new(primary),
        Arc::new(secondary),
        Duration::from_millis(250),
        Duration::from_millis(250),
    )
}

pub fn buy(symbol: &str, quantity: f64, price: f64) -> TradeIntent {
    TradeIntent::new(symbol, Side::Buy, quantity, price)
}

pub fn sell(symbol: &str, quantity: f64, price: f64) -> TradeIntent {
    TradeIntent::new(symbol, Side::Sell, quantity, price)
}
