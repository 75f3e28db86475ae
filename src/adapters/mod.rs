//! Concrete adapter implementations for ports.

pub mod coingecko;
pub mod csv_trade_log;
pub mod file_config_adapter;
pub mod ftso;
#[cfg(feature = "web")]
pub mod web;
