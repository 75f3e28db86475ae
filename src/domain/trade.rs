//! Trade intents and immutable trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::asset::normalize_symbol;
use super::error::PricefuseError;
use super::quote::is_valid_price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for Buy, -1 for Sell.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = PricefuseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(PricefuseError::invalid_input(format!(
                "side must be BUY or SELL, got {other:?}"
            ))),
        }
    }
}

/// A trade as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
}

impl TradeIntent {
    pub fn new(symbol: impl Into<String>, side: Side, quantity: f64, price: f64) -> Self {
        TradeIntent {
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    /// Check field domains and return the intent with its symbol normalized.
    pub fn validate(&self) -> Result<TradeIntent, PricefuseError> {
        let symbol = normalize_symbol(&self.symbol);
        if symbol.is_empty() {
            return Err(PricefuseError::invalid_input("symbol must not be empty"));
        }
        if !is_valid_price(self.quantity) {
            return Err(PricefuseError::invalid_input(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if !is_valid_price(self.price) {
            return Err(PricefuseError::invalid_input(format!(
                "price must be positive, got {}",
                self.price
            )));
        }
        Ok(TradeIntent {
            symbol,
            side: self.side,
            quantity: self.quantity,
            price: self.price,
        })
    }

    pub fn value_usd(&self) -> f64 {
        self.quantity * self.price
    }
}

/// An accepted trade. Never modified after creation.
///
/// Serializes as `{id, symbol, side, quantity, price, valueUSD, timestamp}`,
/// both over HTTP and as the trade log's CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    #[serde(rename = "valueUSD")]
    pub value_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    pub fn signed_quantity(&self) -> f64 {
        self.side.sign() * self.quantity
    }

    /// Cash effect of the trade: negative for buys, positive for sells.
    pub fn cash_flow(&self) -> f64 {
        -self.side.sign() * self.value_usd
    }
}
