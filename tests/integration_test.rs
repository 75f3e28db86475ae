//! Integration tests across the resolver, fusion engine, ledger and quote
//! service.
//!
//! Tests cover:
//! - Submit / history / holdings round trip
//! - Primary-only and both-absent resolution
//! - Classification boundaries and explanation ordering
//! - Concurrent submissions producing contiguous distinct ids
//! - Mixed buy/sell holdings and sell valuation
//! - Trade-log durability across ledger instances
//! - Quote service fallback and timeouts against mock feeds

mod common;

use approx::assert_relative_eq;
use common::*;
use pricefuse::domain::account::PaperAccount;
use pricefuse::domain::error::PricefuseError;
use pricefuse::domain::ledger::Ledger;
use pricefuse::domain::price_resolver::resolve;
use pricefuse::domain::quote::{FeedResult, PrimaryReading, QuoteSource, SecondaryReading};
use pricefuse::domain::signal_fusion::{Action, FusionThresholds, RiskTier, classify, recommend};
use pricefuse::domain::signals::RiskSignals;
use pricefuse::domain::trade::Side;
use std::collections::HashSet;
use std::sync::Arc;

mod ledger_round_trip {
    use super::*;

    #[test]
    fn submit_then_history_contains_exact_values() {
        let ledger = Ledger::new();
        ledger.submit(&buy("ETH", 1.5, 3_200.0)).unwrap();
        let before = ledger.holdings_for("ETH");

        let record = ledger.submit(&sell("ETH", 0.5, 3_300.25)).unwrap();
        let history = ledger.history();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0], record);
        assert_eq!(record.symbol, "ETH");
        assert_eq!(record.side, Side::Sell);
        assert_eq!(record.quantity, 0.5);
        assert_eq!(record.price, 3_300.25);
        assert_relative_eq!(ledger.holdings_for("ETH"), before - 0.5);
    }

    #[test]
    fn buy_then_partial_sell() {
        let ledger = Ledger::new();
        ledger.submit(&buy("BTC", 10.0, 100.0)).unwrap();
        let sell_record = ledger.submit(&sell("BTC", 3.0, 110.0)).unwrap();

        assert_relative_eq!(ledger.holdings_for("BTC"), 7.0);
        assert_relative_eq!(sell_record.value_usd, 330.0);
        assert_relative_eq!(ledger.net_cash_flow(), 330.0 - 1_000.0);
    }

    #[test]
    fn separate_ledgers_do_not_share_state() {
        let a = Ledger::new();
        let b = Ledger::new();
        a.submit(&buy("XRP", 100.0, 0.5)).unwrap();
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(b.submit(&buy("XRP", 1.0, 0.5)).unwrap().id, 1);
    }

    #[test]
    fn invalid_intents_leave_ledger_untouched() {
        let ledger = Ledger::new();
        for intent in [
            buy("", 1.0, 1.0),
            buy("BTC", 0.0, 1.0),
            buy("BTC", 1.0, -5.0),
            buy("BTC", f64::NAN, 1.0),
        ] {
            assert!(matches!(
                ledger.submit(&intent),
                Err(PricefuseError::InvalidInput { .. })
            ));
        }
        assert!(ledger.is_empty());
        assert_eq!(ledger.submit(&buy("BTC", 1.0, 1.0)).unwrap().id, 1);
    }
}

mod resolution {
    use super::*;

    #[test]
    fn primary_only_is_passed_through() {
        let quote = resolve(
            "flr",
            FeedResult::Available(PrimaryReading {
                price: 0.0234,
                timestamp: chain_time(),
            }),
            FeedResult::Unavailable,
        )
        .unwrap();

        assert_eq!(quote.source, QuoteSource::Primary);
        assert_eq!(quote.price, 0.0234);
        assert_eq!(quote.timestamp, chain_time());
        assert_eq!(quote.volume_24h, None);
    }

    #[test]
    fn both_absent_is_unavailable_not_zero() {
        let result = resolve("BTC", FeedResult::Unavailable, FeedResult::Unavailable);
        assert!(matches!(result, Err(PricefuseError::Unavailable { .. })));
    }

    #[test]
    fn tiny_secondary_price_is_a_real_quote() {
        let quote = resolve(
            "SGB",
            FeedResult::Unavailable,
            FeedResult::Available(SecondaryReading {
                price: 1e-9,
                volume_24h: None,
                change_24h: None,
            }),
        )
        .unwrap();
        assert_eq!(quote.source, QuoteSource::Secondary);
        assert_eq!(quote.price, 1e-9);
    }
}

mod fusion {
    use super::*;

    #[test]
    fn classification_boundaries() {
        let t = FusionThresholds::default();
        let cases = [
            (70_001.0, Action::Sell, RiskTier::High),
            (49_999.0, Action::Buy, RiskTier::Medium),
            (60_000.0, Action::Hold, RiskTier::Low),
            (70_000.0, Action::Hold, RiskTier::Low),
            (50_000.0, Action::Hold, RiskTier::Low),
        ];
        for (price, action, tier) in cases {
            let c = classify(price, &t).unwrap();
            assert_eq!((c.action, c.risk_tier), (action, tier), "price {price}");
        }
    }

    #[test]
    fn explanation_order_sell_then_whale() {
        let signals = RiskSignals::new(90, 0, 50, 20);
        let rec = recommend(75_000.0, &signals, &FusionThresholds::default()).unwrap();
        assert_eq!(
            rec.explanation,
            "Price is in high-risk zone. High whale activity detected."
        );
    }

    #[test]
    fn hold_without_alerts_uses_base_reason() {
        let rec = recommend(
            60_000.0,
            &RiskSignals::default(),
            &FusionThresholds::default(),
        )
        .unwrap();
        assert_eq!(rec.action, Action::Hold);
        assert!(rec.reasons.is_empty());
        assert_eq!(
            rec.explanation,
            "Price is stable. Market not showing strong movement."
        );
    }

    #[test]
    fn all_alerts_on_buy() {
        let signals = RiskSignals::new(81, 0, 0, 71);
        let rec = recommend(10.0, &signals, &FusionThresholds::default()).unwrap();
        assert_eq!(
            rec.explanation,
            "Price is in attractive entry zone. High whale activity detected. Market FUD is unusually high."
        );
    }
}

mod concurrency {
    use super::*;

    #[test]
    fn concurrent_submits_get_contiguous_distinct_ids() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;
        let ledger = Ledger::new();

        std::thread::scope(|s| {
            for t in 0..THREADS {
                let ledger = &ledger;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        let side = if (t + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                        let intent =
                            pricefuse::domain::trade::TradeIntent::new("BTC", side, 1.0, 100.0);
                        ledger.submit(&intent).unwrap();
                    }
                });
            }
        });

        let n = THREADS * PER_THREAD;
        let history = ledger.history();
        assert_eq!(history.len(), n);

        let ids: HashSet<u64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), n);
        assert_eq!(*ids.iter().min().unwrap(), 1);
        assert_eq!(*ids.iter().max().unwrap(), n as u64);

        let mut previous = u64::MAX;
        for record in &history {
            assert!(record.id < previous, "history not most-recent-first");
            previous = record.id;
        }
    }

    #[test]
    fn concurrent_checked_sells_never_oversell() {
        let ledger = Ledger::new();
        let account = PaperAccount::new(1_000_000.0);
        ledger.submit_checked(&buy("ETH", 10.0, 1.0), &account).unwrap();

        let accepted = std::sync::atomic::AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..20 {
                s.spawn(|| {
                    if ledger.submit_checked(&sell("ETH", 1.0, 1.0), &account).is_ok() {
                        accepted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 10);
        assert_relative_eq!(ledger.holdings_for("ETH"), 0.0);
    }
}

mod durability {
    use super::*;
    use pricefuse::adapters::csv_trade_log::CsvTradeLog;
    use tempfile::TempDir;

    #[test]
    fn reopened_ledger_continues_numbering() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");

        {
            let ledger = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path))).unwrap();
            ledger.submit(&buy("BTC", 10.0, 100.0)).unwrap();
            ledger.submit(&sell("BTC", 3.0, 110.0)).unwrap();
        }

        let ledger = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path))).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_relative_eq!(ledger.holdings_for("BTC"), 7.0);
        assert_eq!(ledger.submit(&buy("ETH", 1.0, 1.0)).unwrap().id, 3);
    }

    #[test]
    fn torn_final_row_does_not_block_startup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        {
            let ledger = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path))).unwrap();
            ledger.submit(&buy("BTC", 2.0, 100.0)).unwrap();
        }
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("2,BTC,SELL,1.0,1");
        std::fs::write(&path, content).unwrap();

        let ledger = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path))).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_relative_eq!(ledger.holdings_for("BTC"), 2.0);
        assert_eq!(ledger.submit(&sell("BTC", 1.0, 100.0)).unwrap().id, 2);

        let reopened = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path))).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn out_of_order_log_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        std::fs::write(
            &path,
            "id,symbol,side,quantity,price,valueUSD,timestamp\n\
             2,BTC,BUY,1.0,10.0,10.0,2024-05-29T16:26:40Z\n\
             1,BTC,BUY,1.0,10.0,10.0,2024-05-29T16:26:41Z\n",
        )
        .unwrap();

        let result = Ledger::with_trade_log(Arc::new(CsvTradeLog::new(&path)));
        assert!(matches!(result, Err(PricefuseError::TradeLog { .. })));
    }
}

mod quote_fetching {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn primary_preferred_and_secondary_backfills() {
        let svc = quote_service(
            MockPrimary::new().with_price("BTC", 64_000.0),
            MockSecondary::new().with_price("BTC", 63_950.0),
        );
        let quote = svc.quote("btc").await.unwrap();
        assert_eq!(quote.source, QuoteSource::Primary);
        assert_eq!(quote.price, 64_000.0);
        assert_eq!(quote.timestamp, chain_time());
        assert_eq!(quote.volume_24h, Some(25_000_000.0));
        assert_eq!(quote.change_24h, Some(-1.5));
    }

    #[tokio::test]
    async fn secondary_used_when_primary_times_out() {
        let svc = quote_service(
            MockPrimary::new()
                .with_price("ETH", 3_200.0)
                .with_delay(Duration::from_secs(3)),
            MockSecondary::new().with_price("ETH", 3_190.0),
        );
        let quote = svc.quote("ETH").await.unwrap();
        assert_eq!(quote.source, QuoteSource::Secondary);
        assert_eq!(quote.price, 3_190.0);
    }

    #[tokio::test]
    async fn unknown_everywhere_is_unavailable() {
        let svc = quote_service(MockPrimary::new(), MockSecondary::new());
        assert!(matches!(
            svc.quote("DOGE").await,
            Err(PricefuseError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn zero_from_primary_falls_back_to_secondary() {
        let svc = quote_service(
            MockPrimary::new().with_price("XRP", 0.0),
            MockSecondary::new().with_price("XRP", 0.52),
        );
        let quote = svc.quote("XRP").await.unwrap();
        assert_eq!(quote.source, QuoteSource::Secondary);
        assert_eq!(quote.price, 0.52);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn trade_strategy() -> impl Strategy<Value = (usize, bool, f64, f64)> {
        (0usize..3, any::<bool>(), 0.001f64..1_000.0, 0.001f64..100_000.0)
    }

    const SYMBOLS: [&str; 3] = ["BTC", "ETH", "FLR"];

    proptest! {
        #[test]
        fn holdings_equal_signed_quantity_sum(trades in prop::collection::vec(trade_strategy(), 0..40)) {
            let ledger = Ledger::new();
            let mut expected = [0.0f64; 3];
            let mut cash = 0.0f64;

            for (sym, is_buy, qty, price) in &trades {
                let intent = if *is_buy {
                    expected[*sym] += qty;
                    cash -= qty * price;
                    buy(SYMBOLS[*sym], *qty, *price)
                } else {
                    expected[*sym] -= qty;
                    cash += qty * price;
                    sell(SYMBOLS[*sym], *qty, *price)
                };
                let record = ledger.submit(&intent).unwrap();
                prop_assert_eq!(record.value_usd, qty * price);
            }

            prop_assert_eq!(ledger.len(), trades.len());
            for (i, sym) in SYMBOLS.iter().enumerate() {
                prop_assert!((ledger.holdings_for(sym) - expected[i]).abs() < 1e-6);
            }
            prop_assert!((ledger.net_cash_flow() - cash).abs() < 1e-3 * (1.0 + cash.abs()));
        }
    }
}
