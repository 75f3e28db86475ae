//! FTSOv2 on-chain primary feed over JSON-RPC.
//!
//! Calls `getFeedById(bytes21)` on the FTSOv2 contract with a raw `eth_call`
//! and decodes `(uint256 value, int8 decimals, uint64 timestamp)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::domain::asset;
use crate::domain::error::FeedError;
use crate::domain::quote::PrimaryReading;
use crate::ports::feed_port::PrimaryFeedPort;

pub const DEFAULT_RPC_URL: &str = "https://coston2-api.flare.network/ext/C/rpc";
pub const DEFAULT_FTSO_ADDRESS: &str = "0x3d893C53D9e8056135C26C8c638B76C8b60Df726";

const GET_FEED_BY_ID: &str = "getFeedById(bytes21)";
const FEED_ID_LEN: usize = 21;
const WORD: usize = 32;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<serde_json::Value>,
}

pub struct FtsoAdapter {
    client: Client,
    rpc_url: String,
    contract: String,
}

impl FtsoAdapter {
    pub fn new(rpc_url: impl Into<String>, contract: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(concat!("pricefuse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            contract: contract.into(),
        })
    }
}

/// First four bytes of the Keccak-256 hash of a Solidity signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `getFeedById(feed_id)`; `bytes21` is left-aligned in its word.
pub fn encode_get_feed_by_id(feed_id: &str) -> Result<String, FeedError> {
    let id = hex::decode(feed_id.trim_start_matches("0x"))
        .map_err(|e| FeedError::Malformed(format!("feed id {feed_id}: {e}")))?;
    if id.len() != FEED_ID_LEN {
        return Err(FeedError::Malformed(format!(
            "feed id {feed_id} is {} bytes, expected {FEED_ID_LEN}",
            id.len()
        )));
    }

    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&function_selector(GET_FEED_BY_ID));
    let mut word = [0u8; WORD];
    word[..FEED_ID_LEN].copy_from_slice(&id);
    data.extend_from_slice(&word);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Decode the three return words into a price and chain timestamp.
pub fn decode_feed_result(result: &str) -> Result<PrimaryReading, FeedError> {
    let bytes = hex::decode(result.trim_start_matches("0x"))
        .map_err(|e| FeedError::Malformed(format!("result is not hex: {e}")))?;
    if bytes.len() < 3 * WORD {
        return Err(FeedError::Malformed(format!(
            "result too short: {} bytes",
            bytes.len()
        )));
    }

    if bytes[..16].iter().any(|b| *b != 0) {
        return Err(FeedError::Malformed("feed value exceeds 128 bits".into()));
    }
    let value = u128::from_be_bytes(
        bytes[16..WORD]
            .try_into()
            .map_err(|_| FeedError::Malformed("value word".into()))?,
    );
    // int8 is sign-extended; the low byte carries it.
    let decimals = bytes[2 * WORD - 1] as i8;
    let timestamp = u64::from_be_bytes(
        bytes[3 * WORD - 8..3 * WORD]
            .try_into()
            .map_err(|_| FeedError::Malformed("timestamp word".into()))?,
    );

    let price = value as f64 / 10f64.powi(decimals as i32);
    let timestamp = i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| FeedError::Malformed(format!("timestamp {timestamp} out of range")))?;

    Ok(PrimaryReading { price, timestamp })
}

#[async_trait]
impl PrimaryFeedPort for FtsoAdapter {
    fn name(&self) -> &str {
        "FTSOv2"
    }

    async fn fetch(&self, symbol: &str) -> Result<PrimaryReading, FeedError> {
        let asset =
            asset::lookup(symbol).ok_or_else(|| FeedError::UnknownSymbol(symbol.to_string()))?;
        let call_data = encode_get_feed_by_id(asset.ftso_feed_id)?;

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [{
                "to": self.contract,
                "data": call_data,
            }, "latest"],
            "id": 1
        });

        debug!(symbol = asset.symbol, "requesting FTSOv2 feed");
        let response = self.client.post(&self.rpc_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body: JsonRpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(FeedError::Rpc(err.to_string()));
        }
        let result = body
            .result
            .ok_or_else(|| FeedError::Malformed("no result in RPC response".into()))?;
        decode_feed_result(&result)
    }
}
