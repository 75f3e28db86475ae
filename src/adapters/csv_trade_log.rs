//! CSV-backed append-only trade log.
//!
//! One row per accepted trade, header
//! `id,symbol,side,quantity,price,valueUSD,timestamp`, timestamps in RFC 3339.
//!
//! Each append is encoded in memory and written with a single call. A failed
//! write is rolled back to the previous length. A torn final row left by a
//! crash has no trailing newline; `load` drops it and truncates the file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;

use crate::domain::error::PricefuseError;
use crate::domain::trade::TradeRecord;
use crate::ports::trade_log_port::TradeLogPort;

pub struct CsvTradeLog {
    path: PathBuf,
}

impl CsvTradeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn log_error(&self, reason: impl std::fmt::Display) -> PricefuseError {
        PricefuseError::TradeLog {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }

    fn encode(&self, record: &TradeRecord, with_header: bool) -> Result<Vec<u8>, PricefuseError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(with_header)
            .from_writer(Vec::new());
        writer.serialize(record).map_err(|e| self.log_error(e))?;
        writer.into_inner().map_err(|e| self.log_error(e))
    }

    fn write_row(file: &mut File, row: &[u8]) -> io::Result<()> {
        file.write_all(row)?;
        file.sync_data()
    }

    /// Cut an unterminated trailing row off `content` and off the file.
    fn drop_torn_row<'a>(&self, content: &'a [u8]) -> Result<&'a [u8], PricefuseError> {
        let complete = content
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        if complete < content.len() {
            warn!(
                path = %self.path.display(),
                dropped_bytes = content.len() - complete,
                "dropping unterminated trailing row from trade log"
            );
            OpenOptions::new()
                .write(true)
                .open(&self.path)?
                .set_len(complete as u64)?;
        }
        Ok(&content[..complete])
    }
}

impl TradeLogPort for CsvTradeLog {
    fn append(&self, record: &TradeRecord) -> Result<(), PricefuseError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();
        let row = self.encode(record, start == 0)?;

        if let Err(e) = Self::write_row(&mut file, &row) {
            if let Err(rollback) = file.set_len(start) {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "could not roll back partial trade log row"
                );
            }
            return Err(self.log_error(e));
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<TradeRecord>, PricefuseError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let complete = self.drop_torn_row(&content)?;

        let mut reader = csv::Reader::from_reader(complete);
        let mut records = Vec::new();
        for row in reader.deserialize::<TradeRecord>() {
            records.push(row.map_err(|e| self.log_error(e))?);
        }
        Ok(records)
    }
}
