//! Upstream price feed ports.
//!
//! Implementations perform network I/O and report failures as [`FeedError`];
//! time-boxing and conversion to `FeedResult` happen in the quote service.

use async_trait::async_trait;

use crate::domain::error::FeedError;
use crate::domain::quote::{PrimaryReading, SecondaryReading};

#[async_trait]
pub trait PrimaryFeedPort: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, symbol: &str) -> Result<PrimaryReading, FeedError>;
}

#[async_trait]
pub trait SecondaryFeedPort: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, symbol: &str) -> Result<SecondaryReading, FeedError>;
}
