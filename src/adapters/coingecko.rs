//! CoinGecko secondary feed: spot price plus 24h volume and change.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::asset;
use crate::domain::error::FeedError;
use crate::domain::quote::SecondaryReading;
use crate::ports::feed_port::SecondaryFeedPort;

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_vol: Option<f64>,
    usd_24h_change: Option<f64>,
}

pub struct CoinGeckoAdapter {
    client: Client,
    base_url: String,
}

impl CoinGeckoAdapter {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(concat!("pricefuse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Extract the reading for `coin_id` from a `/simple/price` body.
pub fn parse_simple_price(body: &str, coin_id: &str) -> Result<SecondaryReading, FeedError> {
    let mut parsed: HashMap<String, SimplePrice> =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;
    let entry = parsed
        .remove(coin_id)
        .ok_or_else(|| FeedError::Malformed(format!("no entry for {coin_id}")))?;
    let price = entry
        .usd
        .ok_or_else(|| FeedError::Malformed(format!("no usd price for {coin_id}")))?;
    Ok(SecondaryReading {
        price,
        volume_24h: entry.usd_24h_vol,
        change_24h: entry.usd_24h_change,
    })
}

#[async_trait]
impl SecondaryFeedPort for CoinGeckoAdapter {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch(&self, symbol: &str) -> Result<SecondaryReading, FeedError> {
        let asset =
            asset::lookup(symbol).ok_or_else(|| FeedError::UnknownSymbol(symbol.to_string()))?;
        let url = format!("{}/simple/price", self.base_url);

        debug!(symbol = asset.symbol, coin = asset.coingecko_id, "requesting CoinGecko price");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", asset.coingecko_id),
                ("vs_currencies", "usd"),
                ("include_24hr_vol", "true"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_simple_price(&body, asset.coingecko_id)
    }
}
