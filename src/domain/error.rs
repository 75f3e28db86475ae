//! Domain error types.

/// Top-level error type for pricefuse.
#[derive(Debug, thiserror::Error)]
pub enum PricefuseError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("price unavailable from all sources for {symbol}")]
    Unavailable { symbol: String },

    #[error("ledger invariant broken: {reason}")]
    ConcurrencyViolation { reason: String },

    #[error("insufficient demo balance: need {required:.2}, have {available:.2}")]
    InsufficientBalance { required: f64, available: f64 },

    #[error("insufficient holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("trade log error: {reason}")]
    TradeLog { reason: String },

    #[error("could not set up {feed} feed: {source}")]
    FeedSetup { feed: String, source: FeedError },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PricefuseError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        PricefuseError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&PricefuseError> for std::process::ExitCode {
    fn from(err: &PricefuseError) -> Self {
        let code: u8 = match err {
            PricefuseError::Io(_)
            | PricefuseError::TradeLog { .. }
            | PricefuseError::FeedSetup { .. } => 1,
            PricefuseError::ConfigParse { .. }
            | PricefuseError::ConfigMissing { .. }
            | PricefuseError::ConfigInvalid { .. } => 2,
            PricefuseError::Unavailable { .. } => 3,
            PricefuseError::InvalidInput { .. }
            | PricefuseError::InsufficientBalance { .. }
            | PricefuseError::InsufficientHoldings { .. } => 4,
            PricefuseError::ConcurrencyViolation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Failure of a single upstream price feed.
///
/// Never crosses into the resolver: the quote service logs it and marks the
/// feed unavailable for that request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("no feed mapping for symbol {0}")]
    UnknownSymbol(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Transport(err.to_string())
    }
}
