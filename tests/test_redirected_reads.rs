//! Integration tests for resolution and redirected aggregator reads.
//!
//! Run with: `cargo test --test test_redirected_reads`

mod common;

use alloy::primitives::{address, aliases::U80, Address, I256, U256};
use chainlink_feed_registry::{
    AppError, FeedInput, LegacyMethod, OracleAnswer, OracleMethod, OracleQuery, RegistryMethod,
    SimulatedAggregator,
};
use common::*;

fn answer(v: i64) -> I256 {
    I256::try_from(v).unwrap()
}

/// LINK/USD assigned through a proxy in front of `AGG_A`.
async fn link_usd_fixture() -> Fixture {
    let fx = Fixture::new().await;
    fx.registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, PROXY)]).await.unwrap();
    fx
}

#[tokio::test]
async fn test_link_usd_reads() {
    let fx = link_usd_fixture().await;
    let registry = &fx.registry;

    assert_eq!(registry.decimals(LINK, USD).await.unwrap(), 8);
    assert_eq!(registry.description(LINK, USD).await.unwrap(), "LINK / USD");
    assert_eq!(registry.version(LINK, USD).await.unwrap(), U256::from(4));

    let round = registry.latest_round_data(LINK, USD).await.unwrap();
    assert_eq!(round.round_id, U80::from(1));
    assert_eq!(round.answer, answer(1_500_000_000));
    assert_eq!(round.updated_at, U256::from(1_700_000_000u64));
    assert_eq!(round.answered_in_round, U80::from(1));

    assert_eq!(registry.get_round_data(LINK, USD, U80::from(1)).await.unwrap(), round);
    assert_eq!(registry.latest_answer(LINK, USD).await.unwrap(), answer(1_500_000_000));
    assert_eq!(registry.latest_timestamp(LINK, USD).await.unwrap(), U256::from(1_700_000_000u64));
    assert_eq!(registry.latest_round(LINK, USD).await.unwrap(), U256::from(1));
    assert_eq!(
        registry.get_answer(LINK, USD, U256::from(1)).await.unwrap(),
        answer(1_500_000_000)
    );
    assert_eq!(
        registry.get_timestamp(LINK, USD, U256::from(1)).await.unwrap(),
        U256::from(1_700_000_000u64)
    );
}

#[tokio::test]
async fn test_reads_are_forwarded_unmodified() {
    let fx = link_usd_fixture().await;

    fx.oracle.push_answer(AGG_A, -42, 1_700_000_100).await.unwrap();

    let round = fx.registry.latest_round_data(LINK, USD).await.unwrap();
    assert_eq!(round.round_id, U80::from(2));
    assert_eq!(round.answer, answer(-42));
    assert_eq!(
        fx.registry.get_answer(LINK, USD, U256::from(1)).await.unwrap(),
        answer(1_500_000_000)
    );
}

#[tokio::test]
async fn test_unknown_round_passes_aggregator_result_through() {
    let fx = link_usd_fixture().await;

    assert_eq!(fx.registry.get_answer(LINK, USD, U256::from(99)).await.unwrap(), I256::ZERO);
    assert!(matches!(
        fx.registry.get_round_data(LINK, USD, U80::from(99)).await,
        Err(AppError::Rpc(_))
    ));
}

#[tokio::test]
async fn test_unassigned_pair_fails_every_read() {
    let fx = Fixture::new().await;

    for method in OracleMethod::ALL {
        let round_id = method.takes_round_id().then(|| U256::from(1));
        let err = fx
            .registry
            .call_method(LINK, USD, RegistryMethod::Redirect(method), round_id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::FeedNotFound { .. }),
            "{method} should fail with FeedNotFound, got {err:?}"
        );
    }
    assert!(matches!(fx.registry.latest_price(LINK, USD).await, Err(AppError::FeedNotFound { .. })));
}

#[tokio::test]
async fn test_legacy_methods_unsupported_for_assigned_pair() {
    let fx = link_usd_fixture().await;

    for method in LegacyMethod::ALL {
        let err = fx
            .registry
            .call_method(LINK, USD, RegistryMethod::Unsupported(method), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FunctionNotSupported(ref name) if name == method.name()));
    }
}

#[tokio::test]
async fn test_dispatch_by_name() {
    let fx = link_usd_fixture().await;

    let method = RegistryMethod::from_name("latestAnswer").unwrap();
    let result = fx.registry.call_method(LINK, USD, method, None).await.unwrap();
    assert_eq!(result, OracleAnswer::Answer(answer(1_500_000_000)));

    let method = RegistryMethod::from_name("getPhaseFeed").unwrap();
    assert!(matches!(
        fx.registry.call_method(LINK, USD, method, None).await,
        Err(AppError::FunctionNotSupported(_))
    ));
    assert!(RegistryMethod::from_name("latestPrice").is_none());
}

#[tokio::test]
async fn test_query_matches_typed_reads() {
    let fx = link_usd_fixture().await;

    let result = fx.registry.query(LINK, USD, OracleQuery::LatestRoundData).await.unwrap();
    let round = fx.registry.latest_round_data(LINK, USD).await.unwrap();
    assert_eq!(result, OracleAnswer::Round(round));
}

#[tokio::test]
async fn test_proxy_repoint_is_followed() {
    let fx = link_usd_fixture().await;

    fx.oracle.insert_proxy(PROXY, AGG_B).await;

    assert_eq!(fx.registry.get_feed(LINK, USD).await.unwrap(), AGG_B);
    assert_eq!(fx.registry.latest_answer(LINK, USD).await.unwrap(), answer(1_600_000_000));
    // The stored record does not change.
    assert_eq!(fx.registry.get_assigned_feed(LINK, USD).await.feed, PROXY);
}

#[tokio::test]
async fn test_classification_is_not_refreshed() {
    let fx = Fixture::new().await;
    fx.registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG_A)]).await.unwrap();

    // AGG_A starts forwarding to AGG_B after assignment.
    fx.oracle.insert_proxy(AGG_A, AGG_B).await;

    let assignment = fx.registry.get_assigned_feed(LINK, USD).await;
    assert!(!assignment.is_proxy);
    assert_eq!(fx.registry.get_feed(LINK, USD).await.unwrap(), AGG_A);

    // Reassigning re-probes.
    fx.registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG_A)]).await.unwrap();
    assert!(fx.registry.get_assigned_feed(LINK, USD).await.is_proxy);
    assert_eq!(fx.registry.get_feed(LINK, USD).await.unwrap(), AGG_B);
}

#[tokio::test]
async fn test_round_id_argument_checks() {
    let fx = link_usd_fixture().await;
    let method = RegistryMethod::Redirect(OracleMethod::GetRoundData);

    assert!(matches!(
        fx.registry.call_method(LINK, USD, method, None).await,
        Err(AppError::Parse(_))
    ));

    let too_big = U256::from(U80::MAX) + U256::from(1);
    assert!(matches!(
        fx.registry.call_method(LINK, USD, method, Some(too_big)).await,
        Err(AppError::NumericOverflow(_))
    ));
}

#[tokio::test]
async fn test_latest_price() {
    let fx = link_usd_fixture().await;

    let quote = fx.registry.latest_price(LINK, USD).await.unwrap();
    assert_eq!(quote.price, "15");
    assert_eq!(quote.decimals, 8);
    assert_eq!(quote.answer_raw, "1500000000");
    assert_eq!(quote.aggregator, format!("{AGG_A:?}"));
}

#[tokio::test]
async fn test_transport_failure_on_read_propagates() {
    let fx = link_usd_fixture().await;
    fx.oracle.set_transport_down(true).await;

    assert!(matches!(fx.registry.decimals(LINK, USD).await, Err(AppError::Transport(_))));
    assert!(matches!(fx.registry.get_feed(LINK, USD).await, Err(AppError::Transport(_))));

    // Unresolvable pairs still fail fast without touching the oracle.
    assert!(matches!(
        fx.registry.decimals(USD, LINK).await,
        Err(AppError::FeedNotFound { base, .. }) if base == USD
    ));
}

#[tokio::test]
async fn test_proxy_reads_target_resolved_aggregator() {
    let fx = link_usd_fixture().await;
    fx.reader.clear();

    for method in OracleMethod::ALL {
        let round_id = method.takes_round_id().then(|| U256::from(1));
        fx.registry
            .call_method(LINK, USD, RegistryMethod::Redirect(method), round_id)
            .await
            .unwrap();
    }

    let calls = fx.reader.calls();
    let reads: Vec<_> = calls.iter().filter(|(name, _)| *name != "aggregator").collect();
    assert_eq!(reads.len(), OracleMethod::ALL.len());
    assert!(reads.iter().all(|(_, target)| *target == AGG_A), "{calls:?}");
    // The proxy is only asked for its current aggregator.
    assert!(calls.iter().filter(|(_, target)| *target == PROXY).all(|(name, _)| *name == "aggregator"));
}

#[tokio::test]
async fn test_direct_feed_reads_skip_resolution() {
    let fx = Fixture::new().await;
    let agg_c = address!("00000000000000000000000000000000000a0003");
    fx.oracle
        .insert_aggregator(agg_c, SimulatedAggregator::new("ETH / USD", 6).with_answer(3_000_000, 1))
        .await;
    fx.registry.assign_feeds(ADMIN, vec![FeedInput::new(ETH, USD, agg_c)]).await.unwrap();
    fx.reader.clear();

    assert_eq!(fx.registry.decimals(ETH, USD).await.unwrap(), 6);
    assert_eq!(fx.registry.get_feed(ETH, USD).await.unwrap(), agg_c);
    assert_eq!(fx.reader.calls(), vec![("decimals", agg_c)]);

    // Non-admins cannot move the pair.
    let err = fx
        .registry
        .assign_feeds(STRANGER, vec![FeedInput::new(ETH, USD, AGG_A)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized { .. }));
    assert_eq!(fx.registry.decimals(ETH, USD).await.unwrap(), 6);

    // Assigning the zero feed removes the pair.
    fx.registry
        .assign_feeds(ADMIN, vec![FeedInput::new(ETH, USD, Address::ZERO)])
        .await
        .unwrap();
    assert!(matches!(fx.registry.decimals(ETH, USD).await, Err(AppError::FeedNotFound { .. })));
}
