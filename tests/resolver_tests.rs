mod common;

use std::sync::Arc;

use common::ScriptedSource;
use price_tracker_bot::sources::{PriceResolver, PriceSource};

fn suffixes() -> Vec<String> {
    vec!["USDT".into(), "BTC".into(), "ETH".into()]
}

fn resolver(
    crypto: Vec<Arc<ScriptedSource>>,
    equity: Vec<Arc<ScriptedSource>>,
) -> PriceResolver {
    let crypto_chain = crypto
        .into_iter()
        .map(|s| s as Arc<dyn PriceSource>)
        .collect();
    let equity_chain = equity
        .into_iter()
        .map(|s| s as Arc<dyn PriceSource>)
        .collect();
    PriceResolver::new(crypto_chain, equity_chain, suffixes())
}

#[tokio::test]
async fn crypto_suffix_routes_to_the_crypto_chain_only() {
    let crypto = ScriptedSource::new("crypto-primary");
    crypto.always("BTCUSDT", 50_000.0);
    let equity = ScriptedSource::new("equity-primary");
    equity.always("BTCUSDT", 1.0);

    let resolver = resolver(vec![crypto.clone()], vec![equity.clone()]);
    let quote = resolver.resolve("BTCUSDT").await;

    assert!(quote.is_usable());
    assert_eq!(quote.price, 50_000.0);
    assert_eq!(quote.source_name, "crypto-primary");
    assert_eq!(equity.call_count(), 0);
}

#[tokio::test]
async fn plain_symbol_routes_to_the_equity_chain() {
    let crypto = ScriptedSource::new("crypto-primary");
    crypto.always("SBER", 1.0);
    let equity = ScriptedSource::new("equity-primary");
    equity.always("SBER", 285.5);

    let resolver = resolver(vec![crypto.clone()], vec![equity.clone()]);
    let quote = resolver.resolve("SBER").await;

    assert_eq!(quote.price, 285.5);
    assert_eq!(crypto.call_count(), 0);
}

#[tokio::test]
async fn equity_fallback_answers_when_primary_fails() {
    let primary = ScriptedSource::new("equity-primary");
    primary.push("SBER", None);
    let fallback = ScriptedSource::new("equity-fallback");
    fallback.always("SBER", 285.5);

    let resolver = resolver(vec![], vec![primary.clone(), fallback.clone()]);
    let quote = resolver.resolve("SBER").await;

    assert!(quote.is_usable());
    assert_eq!(quote.price, 285.5);
    assert_eq!(quote.source_name, "equity-fallback");
}

#[tokio::test]
async fn zero_priced_primary_quote_still_falls_back() {
    // A provider answering "0" carries no data; the fallback's result is
    // the final answer.
    let primary = ScriptedSource::new("equity-primary");
    primary.push("SBER", Some(0.0));
    let fallback = ScriptedSource::new("equity-fallback");
    fallback.always("SBER", 285.5);

    let resolver = resolver(vec![], vec![primary.clone(), fallback.clone()]);
    let quote = resolver.resolve("SBER").await;

    assert_eq!(quote.price, 285.5);
    assert_eq!(quote.source_name, "equity-fallback");
}

#[tokio::test]
async fn primary_wins_when_usable() {
    let primary = ScriptedSource::new("equity-primary");
    primary.always("SBER", 290.0);
    let fallback = ScriptedSource::new("equity-fallback");
    fallback.always("SBER", 285.5);

    let resolver = resolver(vec![], vec![primary.clone(), fallback.clone()]);
    let quote = resolver.resolve("SBER").await;

    assert_eq!(quote.price, 290.0);
    assert_eq!(fallback.call_count(), 0);
}

#[tokio::test]
async fn exhausted_chain_yields_a_failure_quote() {
    let primary = ScriptedSource::new("equity-primary");
    primary.push("SBER", None);
    let fallback = ScriptedSource::new("equity-fallback");
    fallback.push("SBER", None);

    let resolver = resolver(vec![], vec![primary, fallback]);
    let quote = resolver.resolve("SBER").await;

    assert!(!quote.is_usable());
    assert!(!quote.success);
    assert_eq!(quote.price, 0.0);
}
