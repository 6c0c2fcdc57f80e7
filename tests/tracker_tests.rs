mod common;

use std::sync::Arc;

use common::{seed_user, ticker, ScriptedSource};
use price_tracker_bot::db::models::Category;
use price_tracker_bot::db::{MemoryDatabase, UserRepository};
use price_tracker_bot::engine::{TrackOutcome, TrackerService};
use price_tracker_bot::errors::BotError;
use price_tracker_bot::sources::{PriceResolver, PriceSource};

struct Harness {
    db: Arc<MemoryDatabase>,
    crypto: Arc<ScriptedSource>,
    equity: Arc<ScriptedSource>,
    tracker: TrackerService,
}

fn harness() -> Harness {
    let db = Arc::new(MemoryDatabase::new());
    let crypto = ScriptedSource::new("crypto-venue");
    let equity = ScriptedSource::new("equity-venue");
    let resolver = Arc::new(PriceResolver::new(
        vec![crypto.clone() as Arc<dyn PriceSource>],
        vec![equity.clone() as Arc<dyn PriceSource>],
        vec!["USDT".into(), "BTC".into(), "ETH".into()],
    ));
    let tracker = TrackerService::new(
        db.clone(),
        resolver,
        vec![crypto.clone() as Arc<dyn PriceSource>],
        vec![equity.clone() as Arc<dyn PriceSource>],
        5.0,
    );
    Harness {
        db,
        crypto,
        equity,
        tracker,
    }
}

#[tokio::test]
async fn track_adds_with_default_threshold_and_seed_price() {
    let h = harness();
    let mut user = seed_user(&h.db, 1, None).await;
    h.crypto.always("BTCUSDT", 50_000.0);

    let outcome = h.tracker.track(&mut user, "btcusdt", None).await.unwrap();
    assert_eq!(
        outcome,
        TrackOutcome::Added {
            symbol: "BTCUSDT".to_string(),
            price: 50_000.0,
            threshold: 5.0,
        }
    );

    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert_eq!(stored.tracked_tickers.len(), 1);
    assert_eq!(stored.tracked_tickers[0].symbol, "BTCUSDT");
    assert_eq!(stored.tracked_tickers[0].last_price, Some(50_000.0));
}

#[tokio::test]
async fn tracking_twice_updates_in_place() {
    let h = harness();
    let mut user = seed_user(&h.db, 1, None).await;
    h.crypto.always("BTCUSDT", 50_000.0);

    h.tracker.track(&mut user, "BTCUSDT", Some("5")).await.unwrap();
    let outcome = h.tracker.track(&mut user, "BTCUSDT", Some("2.5")).await.unwrap();

    assert!(matches!(outcome, TrackOutcome::Updated { threshold, .. } if threshold == 2.5));
    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert_eq!(stored.tracked_tickers.len(), 1);
    assert_eq!(stored.tracked_tickers[0].threshold_percent, 2.5);
}

#[tokio::test]
async fn remove_deletes_and_is_a_noop_when_absent() {
    let h = harness();
    let mut user = seed_user(&h.db, 1, Some(ticker("SBER", 5.0, Some(285.0)))).await;

    let outcome = h.tracker.track(&mut user, "SBER", Some("remove")).await.unwrap();
    assert_eq!(
        outcome,
        TrackOutcome::Removed {
            symbol: "SBER".to_string()
        }
    );
    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert!(stored.tracked_tickers.is_empty());

    let outcome = h.tracker.track(&mut user, "SBER", Some("remove")).await.unwrap();
    assert_eq!(
        outcome,
        TrackOutcome::NotTracked {
            symbol: "SBER".to_string()
        }
    );
}

#[tokio::test]
async fn unresolvable_symbol_is_rejected() {
    let h = harness();
    let mut user = seed_user(&h.db, 1, None).await;

    let err = h.tracker.track(&mut user, "NOPE", None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::ResolutionExhausted(_))
    ));
    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert!(stored.tracked_tickers.is_empty());
}

#[tokio::test]
async fn bad_threshold_is_rejected_before_any_lookup() {
    let h = harness();
    let mut user = seed_user(&h.db, 1, None).await;

    let err = h.tracker.track(&mut user, "BTCUSDT", Some("-5")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::Validation(_))
    ));
    assert_eq!(h.crypto.call_count(), 0);
}

#[tokio::test]
async fn quote_lists_every_venue_without_touching_state() {
    let h = harness();
    seed_user(&h.db, 1, None).await;
    h.equity.always("SBER", 285.5);

    let text = h.tracker.quote("sber").await.unwrap();
    assert!(text.contains("SBER"));
    assert!(text.contains("equity-venue"));
    assert!(text.contains("285.50"));

    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert!(stored.tracked_tickers.is_empty());
}

#[tokio::test]
async fn quote_with_no_usable_venue_errors() {
    let h = harness();

    let err = h.tracker.quote("SBER").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::ResolutionExhausted(_))
    ));
}

#[tokio::test]
async fn toggle_subscription_flips_and_persists() {
    let h = harness();
    seed_user(&h.db, 1, None).await;

    assert!(h.tracker.toggle_subscription(1, Category::Crypto).await.unwrap());
    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert!(stored.subscriptions.crypto);

    assert!(!h.tracker.toggle_subscription(1, Category::Crypto).await.unwrap());
    let stored = h.db.find_user_by_telegram_id(1).await.unwrap().unwrap();
    assert!(!stored.subscriptions.any());
}

#[tokio::test]
async fn toggle_for_unknown_chat_errors() {
    let h = harness();
    let err = h
        .tracker
        .toggle_subscription(99, Category::Crypto)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::NotFound(_))
    ));
}

#[tokio::test]
async fn news_subscription_deduplicates_case_insensitively() {
    let h = harness();
    seed_user(&h.db, 1, None).await;

    assert!(h.tracker.subscribe_news(1, "Bitcoin").await.unwrap());
    assert!(!h.tracker.subscribe_news(1, "bitcoin").await.unwrap());
}
