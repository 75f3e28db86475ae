//! Durable trade log port.

use crate::domain::error::PricefuseError;
use crate::domain::trade::TradeRecord;

/// Append-only storage for accepted trades, replayed at startup.
pub trait TradeLogPort: Send + Sync {
    fn append(&self, record: &TradeRecord) -> Result<(), PricefuseError>;

    /// All records in the order they were appended.
    fn load(&self) -> Result<Vec<TradeRecord>, PricefuseError>;
}
