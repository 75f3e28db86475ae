//! Configuration validation.
//!
//! Checks every configurable value before any feed, ledger or server is built.

use crate::domain::error::PricefuseError;
use crate::ports::config_port::ConfigPort;

use super::account::DEFAULT_INITIAL_BALANCE;
use super::signal_fusion::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};

pub const DEFAULT_PRIMARY_TIMEOUT_MS: i64 = 3_000;
pub const DEFAULT_SECONDARY_TIMEOUT_MS: i64 = 1_500;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    validate_thresholds(config)?;
    validate_timeouts(config)?;
    validate_initial_balance(config)?;
    validate_urls(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> PricefuseError {
    PricefuseError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    let low = config.get_double("fusion", "low_threshold", DEFAULT_LOW_THRESHOLD);
    let high = config.get_double("fusion", "high_threshold", DEFAULT_HIGH_THRESHOLD);
    if !(low.is_finite() && low > 0.0) {
        return Err(invalid("fusion", "low_threshold", "low_threshold must be positive"));
    }
    if !(high.is_finite() && high > 0.0) {
        return Err(invalid("fusion", "high_threshold", "high_threshold must be positive"));
    }
    if low >= high {
        return Err(invalid(
            "fusion",
            "low_threshold",
            "low_threshold must be below high_threshold",
        ));
    }
    Ok(())
}

fn validate_timeouts(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    for (key, default) in [
        ("primary_timeout_ms", DEFAULT_PRIMARY_TIMEOUT_MS),
        ("secondary_timeout_ms", DEFAULT_SECONDARY_TIMEOUT_MS),
    ] {
        if config.get_int("feeds", key, default) <= 0 {
            return Err(invalid("feeds", key, "timeout must be a positive number of milliseconds"));
        }
    }
    Ok(())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    let value = config.get_double("account", "initial_balance", DEFAULT_INITIAL_BALANCE);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "account",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_urls(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    for key in ["rpc_url", "coingecko_url"] {
        if let Some(url) = config.get_non_empty("feeds", key) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("feeds", key, "url must start with http:// or https://"));
            }
        }
    }
    if let Some(address) = config.get_non_empty("feeds", "ftso_address") {
        let raw = address.trim_start_matches("0x");
        if raw.len() != 40 || hex::decode(raw).is_err() {
            return Err(invalid(
                "feeds",
                "ftso_address",
                "ftso_address must be a 20-byte hex address",
            ));
        }
    }
    Ok(())
}
