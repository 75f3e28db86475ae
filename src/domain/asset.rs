//! Supported asset registry.
//!
//! Maps each tradable symbol to its FTSOv2 block-latency feed id (21 bytes,
//! hex) and its CoinGecko coin id.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub symbol: &'static str,
    pub ftso_feed_id: &'static str,
    pub coingecko_id: &'static str,
}

pub const SUPPORTED_ASSETS: &[Asset] = &[
    Asset {
        symbol: "FLR",
        ftso_feed_id: "0x01464c522f55534400000000000000000000000000",
        coingecko_id: "flare-networks",
    },
    Asset {
        symbol: "BTC",
        ftso_feed_id: "0x014254432f55534400000000000000000000000000",
        coingecko_id: "bitcoin",
    },
    Asset {
        symbol: "ETH",
        ftso_feed_id: "0x014554482f55534400000000000000000000000000",
        coingecko_id: "ethereum",
    },
    Asset {
        symbol: "XRP",
        ftso_feed_id: "0x015852502f55534400000000000000000000000000",
        coingecko_id: "ripple",
    },
    Asset {
        symbol: "SOL",
        ftso_feed_id: "0x01534f4c2f55534400000000000000000000000000",
        coingecko_id: "solana",
    },
    Asset {
        symbol: "SGB",
        ftso_feed_id: "0x015347422f55534400000000000000000000000000",
        coingecko_id: "songbird",
    },
    Asset {
        symbol: "DOGE",
        ftso_feed_id: "0x01444f47452f555344000000000000000000000000",
        coingecko_id: "dogecoin",
    },
];

/// Trim and uppercase a user-supplied symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

pub fn lookup(symbol: &str) -> Option<&'static Asset> {
    let symbol = normalize_symbol(symbol);
    SUPPORTED_ASSETS.iter().find(|a| a.symbol == symbol)
}
