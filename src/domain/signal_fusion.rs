//! Signal fusion: price classification plus rule-based explanation.
//!
//! Classification is a threshold function over the price. The explanation is
//! assembled from an ordered rule list; the order reasons are appended in is
//! part of the output contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::PricefuseError;
use super::quote::is_valid_price;
use super::signals::RiskSignals;

pub const DEFAULT_LOW_THRESHOLD: f64 = 50_000.0;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 70_000.0;

pub const WHALE_INFLOW_ALERT: u8 = 80;
pub const FUD_LEVEL_ALERT: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Medium => write!(f, "MEDIUM"),
            RiskTier::High => write!(f, "HIGH"),
        }
    }
}

/// Price bounds driving classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionThresholds {
    /// Below this price a Buy is recommended.
    pub low_threshold: f64,
    /// Above this price a Sell is recommended.
    pub high_threshold: f64,
}

impl Default for FusionThresholds {
    fn default() -> Self {
        FusionThresholds {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl FusionThresholds {
    pub fn new(low_threshold: f64, high_threshold: f64) -> Result<Self, PricefuseError> {
        if !is_valid_price(low_threshold) || !is_valid_price(high_threshold) {
            return Err(PricefuseError::invalid_input("thresholds must be positive"));
        }
        if low_threshold >= high_threshold {
            return Err(PricefuseError::invalid_input(
                "low_threshold must be below high_threshold",
            ));
        }
        Ok(FusionThresholds {
            low_threshold,
            high_threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub action: Action,
    pub risk_tier: RiskTier,
    pub base_reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: Action,
    pub risk_tier: RiskTier,
    pub reasons: Vec<String>,
    pub explanation: String,
}

pub fn classify(price: f64, thresholds: &FusionThresholds) -> Result<Classification, PricefuseError> {
    if !is_valid_price(price) {
        return Err(PricefuseError::invalid_input(format!(
            "price must be a positive number, got {price}"
        )));
    }

    let classification = if price > thresholds.high_threshold {
        Classification {
            action: Action::Sell,
            risk_tier: RiskTier::High,
            base_reason: "Price is extremely high. Profit-taking recommended.",
        }
    } else if price < thresholds.low_threshold {
        Classification {
            action: Action::Buy,
            risk_tier: RiskTier::Medium,
            base_reason: "Price is below average range. Could be a good entry point.",
        }
    } else {
        Classification {
            action: Action::Hold,
            risk_tier: RiskTier::Low,
            base_reason: "Price is stable. Market not showing strong movement.",
        }
    };
    Ok(classification)
}

/// Collect reasons in rule order: action, whale activity, FUD.
pub fn collect_reasons(action: Action, signals: &RiskSignals) -> Vec<String> {
    let mut reasons = Vec::new();
    if action == Action::Sell {
        reasons.push("Price is in high-risk zone".to_string());
    }
    if action == Action::Buy {
        reasons.push("Price is in attractive entry zone".to_string());
    }
    if signals.whale_inflow > WHALE_INFLOW_ALERT {
        reasons.push("High whale activity detected".to_string());
    }
    if signals.fud_level > FUD_LEVEL_ALERT {
        reasons.push("Market FUD is unusually high".to_string());
    }
    reasons
}

/// Render reasons as one sentence, or fall back to the base reason.
pub fn explain(action: Action, signals: &RiskSignals, base_reason: &str) -> String {
    render(&collect_reasons(action, signals), base_reason)
}

fn render(reasons: &[String], base_reason: &str) -> String {
    if reasons.is_empty() {
        base_reason.to_string()
    } else {
        format!("{}.", reasons.join(". "))
    }
}

pub fn recommend(
    price: f64,
    signals: &RiskSignals,
    thresholds: &FusionThresholds,
) -> Result<Recommendation, PricefuseError> {
    let classification = classify(price, thresholds)?;
    let reasons = collect_reasons(classification.action, signals);
    let explanation = render(&reasons, classification.base_reason);
    Ok(Recommendation {
        action: classification.action,
        risk_tier: classification.risk_tier,
        reasons,
        explanation,
    })
}
