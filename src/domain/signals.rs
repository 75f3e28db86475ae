//! Auxiliary risk signals supplied with each fusion request.

use serde::{Deserialize, Serialize};

pub const SIGNAL_MIN: u8 = 0;
pub const SIGNAL_MAX: u8 = 100;

/// Risk indicators on a 0–100 scale.
///
/// Producers are loosely validated, so out-of-range inputs are clamped rather
/// than rejected. Deserialization goes through [`RawRiskSignals`] and clamps too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawRiskSignals", rename_all = "camelCase")]
pub struct RiskSignals {
    pub whale_inflow: u8,
    pub network_stress: u8,
    pub sentiment_score: u8,
    pub fud_level: u8,
}

/// Unchecked wire form of [`RiskSignals`]. Missing fields default to 0;
/// unknown fields are rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RawRiskSignals {
    pub whale_inflow: i64,
    pub network_stress: i64,
    pub sentiment_score: i64,
    pub fud_level: i64,
}

impl RiskSignals {
    pub fn new(whale_inflow: i64, network_stress: i64, sentiment_score: i64, fud_level: i64) -> Self {
        RiskSignals {
            whale_inflow: clamp_signal(whale_inflow),
            network_stress: clamp_signal(network_stress),
            sentiment_score: clamp_signal(sentiment_score),
            fud_level: clamp_signal(fud_level),
        }
    }
}

impl From<RawRiskSignals> for RiskSignals {
    fn from(raw: RawRiskSignals) -> Self {
        RiskSignals::new(
            raw.whale_inflow,
            raw.network_stress,
            raw.sentiment_score,
            raw.fud_level,
        )
    }
}

fn clamp_signal(value: i64) -> u8 {
    value.clamp(SIGNAL_MIN as i64, SIGNAL_MAX as i64) as u8
}
