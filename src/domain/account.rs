//! Demo account: balance derived from trade history plus pre-trade checks.

use serde::Serialize;
use std::collections::BTreeMap;

use super::error::PricefuseError;
use super::ledger::{LedgerSnapshot, holdings_of, net_cash_flow};
use super::trade::{Side, TradeIntent, TradeRecord};

pub const DEFAULT_INITIAL_BALANCE: f64 = 100_000.0;

/// Absorbs float drift when selling an entire position or spending the
/// entire balance.
const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperAccount {
    pub initial_balance: f64,
}

impl Default for PaperAccount {
    fn default() -> Self {
        PaperAccount::new(DEFAULT_INITIAL_BALANCE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub initial_balance: f64,
    pub balance: f64,
    pub net_cash_flow: f64,
    pub holdings: BTreeMap<String, f64>,
}

impl PaperAccount {
    pub fn new(initial_balance: f64) -> Self {
        PaperAccount { initial_balance }
    }

    pub fn balance(&self, trades: &[TradeRecord]) -> f64 {
        self.initial_balance + net_cash_flow(trades)
    }

    /// Buys need enough balance for quantity × price; sells need enough
    /// held quantity. `intent` is expected to be validated already.
    pub fn check(&self, trades: &[TradeRecord], intent: &TradeIntent) -> Result<(), PricefuseError> {
        match intent.side {
            Side::Buy => {
                let required = intent.value_usd();
                let available = self.balance(trades);
                if required > available + TOLERANCE {
                    return Err(PricefuseError::InsufficientBalance {
                        required,
                        available,
                    });
                }
            }
            Side::Sell => {
                let held = holdings_of(trades, &intent.symbol);
                if intent.quantity > held + TOLERANCE {
                    return Err(PricefuseError::InsufficientHoldings {
                        symbol: intent.symbol.clone(),
                        requested: intent.quantity,
                        held,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn summary(&self, snapshot: &LedgerSnapshot) -> AccountSummary {
        let net = snapshot.net_cash_flow();
        AccountSummary {
            initial_balance: self.initial_balance,
            balance: self.initial_balance + net,
            net_cash_flow: net,
            holdings: snapshot.holdings(),
        }
    }
}
