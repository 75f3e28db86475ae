//! JSON HTTP API.
//!
//! Exposes quotes, signal-fusion suggestions and the paper-trading ledger to
//! a browser frontend. CORS is open to any origin.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::account::PaperAccount;
use crate::domain::ledger::Ledger;
use crate::domain::signal_fusion::FusionThresholds;
use crate::quote_service::QuoteService;

pub struct AppState {
    pub quotes: Arc<QuoteService>,
    pub ledger: Arc<Ledger>,
    pub thresholds: FusionThresholds,
    pub account: PaperAccount,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/price/{symbol}", get(handlers::get_price))
        .route("/ai/suggestion", post(handlers::suggestion))
        .route("/trade", post(handlers::submit_trade))
        .route("/trades", get(handlers::list_trades))
        .route("/holdings", get(handlers::holdings))
        .route("/account", get(handlers::account))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(Arc::new(state))
}
