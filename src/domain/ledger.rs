//! Append-only trade ledger.
//!
//! All state sits behind one `RwLock`: id assignment, timestamping, the
//! optional log append and the insertion form a single write critical
//! section, and readers fold over whole records under the read lock.
//! Records are stored in chronological order; `history` presents them most
//! recent first.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use super::account::PaperAccount;
use super::asset::normalize_symbol;
use super::error::PricefuseError;
use super::trade::{TradeIntent, TradeRecord};
use crate::ports::trade_log_port::TradeLogPort;

pub const FIRST_TRADE_ID: u64 = 1;

/// Relative slack allowed between a replayed `value_usd` and quantity × price.
const VALUE_TOLERANCE: f64 = 1e-9;

#[derive(Debug)]
struct LedgerState {
    trades: Vec<TradeRecord>,
    next_id: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        LedgerState {
            trades: Vec::new(),
            next_id: FIRST_TRADE_ID,
        }
    }
}

pub struct Ledger {
    state: RwLock<LedgerState>,
    trade_log: Option<Arc<dyn TradeLogPort>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Empty in-memory ledger; the first trade gets id 1.
    pub fn new() -> Self {
        Ledger {
            state: RwLock::new(LedgerState::default()),
            trade_log: None,
        }
    }

    /// Ledger backed by a durable log: existing entries are replayed and every
    /// later submission is appended to the log before it becomes visible.
    pub fn with_trade_log(trade_log: Arc<dyn TradeLogPort>) -> Result<Self, PricefuseError> {
        let records = trade_log.load()?;
        let count = records.len();
        let state = rebuild_state(records)?;
        info!(trades = count, next_id = state.next_id, "replayed trade log");
        Ok(Ledger {
            state: RwLock::new(state),
            trade_log: Some(trade_log),
        })
    }

    /// Validate and record a trade. Sufficiency of balance or position is the
    /// caller's concern; see [`Ledger::submit_checked`].
    pub fn submit(&self, intent: &TradeIntent) -> Result<TradeRecord, PricefuseError> {
        let intent = intent.validate()?;
        let mut state = self.state.write();
        self.append_locked(&mut state, intent)
    }

    /// Like [`Ledger::submit`], with the paper-account check evaluated inside
    /// the same critical section as the append.
    pub fn submit_checked(
        &self,
        intent: &TradeIntent,
        account: &PaperAccount,
    ) -> Result<TradeRecord, PricefuseError> {
        let intent = intent.validate()?;
        let mut state = self.state.write();
        account.check(&state.trades, &intent)?;
        self.append_locked(&mut state, intent)
    }

    fn append_locked(
        &self,
        state: &mut LedgerState,
        intent: TradeIntent,
    ) -> Result<TradeRecord, PricefuseError> {
        let id = state.next_id;
        if let Some(last) = state.trades.last() {
            if last.id >= id {
                let reason = format!("next id {id} does not follow last id {}", last.id);
                error!(%reason, "ledger invariant broken");
                return Err(PricefuseError::ConcurrencyViolation { reason });
            }
        }

        let record = TradeRecord {
            id,
            value_usd: intent.value_usd(),
            symbol: intent.symbol,
            side: intent.side,
            quantity: intent.quantity,
            price: intent.price,
            timestamp: Utc::now(),
        };

        if let Some(log) = &self.trade_log {
            log.append(&record)?;
        }

        state.trades.push(record.clone());
        state.next_id = id + 1;

        info!(
            id = record.id,
            symbol = %record.symbol,
            side = %record.side,
            quantity = record.quantity,
            price = record.price,
            "trade recorded"
        );
        Ok(record)
    }

    /// All trades, most recent first.
    pub fn history(&self) -> Vec<TradeRecord> {
        let state = self.state.read();
        state.trades.iter().rev().cloned().collect()
    }

    /// Consistent copy of the full chronological history.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            trades: state.trades.clone(),
        }
    }

    pub fn holdings_for(&self, symbol: &str) -> f64 {
        let state = self.state.read();
        holdings_of(&state.trades, symbol)
    }

    pub fn holdings(&self) -> BTreeMap<String, f64> {
        let state = self.state.read();
        fold_holdings(&state.trades)
    }

    pub fn net_cash_flow(&self) -> f64 {
        let state = self.state.read();
        net_cash_flow(&state.trades)
    }

    pub fn len(&self) -> usize {
        self.state.read().trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Point-in-time view of the ledger, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    trades: Vec<TradeRecord>,
}

impl LedgerSnapshot {
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn holdings(&self) -> BTreeMap<String, f64> {
        fold_holdings(&self.trades)
    }

    pub fn net_cash_flow(&self) -> f64 {
        net_cash_flow(&self.trades)
    }
}

/// Net signed quantity of `symbol` across `trades`.
pub fn holdings_of(trades: &[TradeRecord], symbol: &str) -> f64 {
    let symbol = normalize_symbol(symbol);
    trades
        .iter()
        .filter(|t| t.symbol == symbol)
        .map(TradeRecord::signed_quantity)
        .sum()
}

pub fn fold_holdings(trades: &[TradeRecord]) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    for t in trades {
        *map.entry(t.symbol.clone()).or_insert(0.0) += t.signed_quantity();
    }
    map
}

/// Realized cash: sell proceeds minus buy costs.
pub fn net_cash_flow(trades: &[TradeRecord]) -> f64 {
    trades.iter().map(TradeRecord::cash_flow).sum()
}

/// Check replayed records and store them as `submit` would have: ids strictly
/// increasing, fields valid, symbols normalized, value matching quantity × price.
fn rebuild_state(records: Vec<TradeRecord>) -> Result<LedgerState, PricefuseError> {
    let mut last_id = 0;
    let mut trades = Vec::with_capacity(records.len());
    for record in records {
        if record.id < FIRST_TRADE_ID || record.id <= last_id {
            return Err(PricefuseError::TradeLog {
                reason: format!("trade id {} out of order after {}", record.id, last_id),
            });
        }
        let intent = TradeIntent::new(record.symbol, record.side, record.quantity, record.price)
            .validate()
            .map_err(|e| PricefuseError::TradeLog {
                reason: format!("trade {}: {}", record.id, e),
            })?;
        let expected = intent.value_usd();
        if (record.value_usd - expected).abs() > VALUE_TOLERANCE * expected.abs().max(1.0) {
            return Err(PricefuseError::TradeLog {
                reason: format!(
                    "trade {}: value {} does not match quantity x price {}",
                    record.id, record.value_usd, expected
                ),
            });
        }
        last_id = record.id;
        trades.push(TradeRecord {
            id: record.id,
            symbol: intent.symbol,
            side: intent.side,
            quantity: intent.quantity,
            price: intent.price,
            value_usd: record.value_usd,
            timestamp: record.timestamp,
        });
    }
    Ok(LedgerState {
        trades,
        next_id: last_id + 1,
    })
}
