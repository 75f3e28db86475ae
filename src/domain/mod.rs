//! Core domain types and logic.

pub mod account;
pub mod asset;
pub mod config_validation;
pub mod error;
pub mod ledger;
pub mod price_resolver;
pub mod quote;
pub mod signal_fusion;
pub mod signals;
pub mod trade;
