//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, Uri},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

use crate::domain::account::AccountSummary;
use crate::domain::quote::Quote;
use crate::domain::signal_fusion::{self, Recommendation};
use crate::domain::signals::RiskSignals;
use crate::domain::trade::{Side, TradeIntent, TradeRecord};

use super::{AppState, WebError};

pub async fn health() -> &'static str {
    "pricefuse backend is running"
}

pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, WebError> {
    let quote = state.quotes.quote(&symbol).await?;
    Ok(Json(quote))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub signals: Option<RiskSignals>,
}

#[derive(Debug, Serialize)]
pub struct MarketView {
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub market: MarketView,
    pub signals: RiskSignals,
    pub recommendation: Recommendation,
    pub explanation: String,
}

pub async fn suggestion(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<SuggestionResponse>, WebError> {
    let Json(req) = payload?;
    let price = req
        .price
        .ok_or_else(|| WebError::bad_request("price is required"))?;
    let signals = req.signals.unwrap_or_default();
    let recommendation = signal_fusion::recommend(price, &signals, &state.thresholds)?;
    Ok(Json(SuggestionResponse {
        market: MarketView { price },
        signals,
        explanation: recommendation.explanation.clone(),
        recommendation,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TradeRequest {
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

impl TradeRequest {
    fn into_intent(self) -> Result<TradeIntent, WebError> {
        let (Some(symbol), Some(side), Some(quantity), Some(price)) =
            (self.symbol, self.side, self.quantity, self.price)
        else {
            return Err(WebError::bad_request(
                "missing trade fields: symbol, side, quantity and price are required",
            ));
        };
        let side: Side = side.parse()?;
        Ok(TradeIntent::new(symbol, side, quantity, price))
    }
}

/// The ledger may append to its log under the write lock, so the submit
/// runs on the blocking pool.
pub async fn submit_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeRecord>, WebError> {
    let Json(req) = payload?;
    let intent = req.into_intent()?;
    let record = tokio::task::spawn_blocking(move || {
        state.ledger.submit_checked(&intent, &state.account)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "trade submission task failed");
        WebError::new(StatusCode::INTERNAL_SERVER_ERROR, "trade submission failed")
    })??;
    Ok(Json(record))
}

pub async fn list_trades(State(state): State<Arc<AppState>>) -> Json<Vec<TradeRecord>> {
    Json(state.ledger.history())
}

pub async fn holdings(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, f64>> {
    Json(state.ledger.holdings())
}

pub async fn account(State(state): State<Arc<AppState>>) -> Json<AccountSummary> {
    Json(state.account.summary(&state.ledger.snapshot()))
}

pub async fn not_found(uri: Uri) -> WebError {
    WebError::not_found(format!("no route for {}", uri.path()))
}
