//! Common utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{address, aliases::U80, Address, I256, U256};
use async_trait::async_trait;
use chainlink_feed_registry::{
    AggregatorReader, Config, FeedRegistry, FeedRegistryServer, InMemoryAggregators, Result,
    RoundData, SimulatedAggregator,
};

pub const SUPER_ADMIN: Address = address!("00000000000000000000000000000000000000a0");
pub const ADMIN: Address = address!("00000000000000000000000000000000000000a1");
pub const STRANGER: Address = address!("00000000000000000000000000000000000000f1");

pub const LINK: Address = chainlink_feed_registry::LINK_ADDRESS;
pub const USD: Address = chainlink_feed_registry::DENOMINATION_USD;
pub const ETH: Address = chainlink_feed_registry::DENOMINATION_ETH;

/// A plain aggregator.
pub const AGG_A: Address = address!("00000000000000000000000000000000000a0001");
/// A second plain aggregator, used as a proxy's next phase.
pub const AGG_B: Address = address!("00000000000000000000000000000000000a0002");
/// A proxy in front of `AGG_A`.
pub const PROXY: Address = address!("00000000000000000000000000000000000b0001");

/// Aggregator reader that logs every call before delegating to the in-memory set.
pub struct RecordingReader {
    inner: Arc<InMemoryAggregators>,
    calls: Mutex<Vec<(&'static str, Address)>>,
}

impl RecordingReader {
    pub fn new(inner: Arc<InMemoryAggregators>) -> Self {
        Self { inner, calls: Mutex::new(Vec::new()) }
    }

    /// Calls seen so far, as (method, contract address).
    pub fn calls(&self) -> Vec<(&'static str, Address)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str, address: Address) {
        self.calls.lock().unwrap().push((method, address));
    }
}

#[async_trait]
impl AggregatorReader for RecordingReader {
    async fn probe_aggregator(&self, feed: Address) -> Result<Option<Address>> {
        self.record("probe_aggregator", feed);
        self.inner.probe_aggregator(feed).await
    }

    async fn aggregator(&self, proxy: Address) -> Result<Address> {
        self.record("aggregator", proxy);
        self.inner.aggregator(proxy).await
    }

    async fn decimals(&self, aggregator: Address) -> Result<u8> {
        self.record("decimals", aggregator);
        self.inner.decimals(aggregator).await
    }

    async fn description(&self, aggregator: Address) -> Result<String> {
        self.record("description", aggregator);
        self.inner.description(aggregator).await
    }

    async fn version(&self, aggregator: Address) -> Result<U256> {
        self.record("version", aggregator);
        self.inner.version(aggregator).await
    }

    async fn latest_round_data(&self, aggregator: Address) -> Result<RoundData> {
        self.record("latest_round_data", aggregator);
        self.inner.latest_round_data(aggregator).await
    }

    async fn get_round_data(&self, aggregator: Address, round_id: U80) -> Result<RoundData> {
        self.record("get_round_data", aggregator);
        self.inner.get_round_data(aggregator, round_id).await
    }

    async fn latest_answer(&self, aggregator: Address) -> Result<I256> {
        self.record("latest_answer", aggregator);
        self.inner.latest_answer(aggregator).await
    }

    async fn latest_timestamp(&self, aggregator: Address) -> Result<U256> {
        self.record("latest_timestamp", aggregator);
        self.inner.latest_timestamp(aggregator).await
    }

    async fn latest_round(&self, aggregator: Address) -> Result<U256> {
        self.record("latest_round", aggregator);
        self.inner.latest_round(aggregator).await
    }

    async fn get_answer(&self, aggregator: Address, round_id: U256) -> Result<I256> {
        self.record("get_answer", aggregator);
        self.inner.get_answer(aggregator, round_id).await
    }

    async fn get_timestamp(&self, aggregator: Address, round_id: U256) -> Result<U256> {
        self.record("get_timestamp", aggregator);
        self.inner.get_timestamp(aggregator, round_id).await
    }
}

/// Registry over in-memory aggregators, with `ADMIN` holding the admin role.
///
/// Every aggregator call the registry makes goes through `reader`.
pub struct Fixture {
    pub oracle: Arc<InMemoryAggregators>,
    pub reader: Arc<RecordingReader>,
    pub registry: Arc<FeedRegistry>,
}

impl Fixture {
    pub async fn new() -> Self {
        let oracle = Arc::new(InMemoryAggregators::new());
        oracle
            .insert_aggregator(
                AGG_A,
                SimulatedAggregator::new("LINK / USD", 8).with_answer(1_500_000_000, 1_700_000_000),
            )
            .await;
        oracle
            .insert_aggregator(
                AGG_B,
                SimulatedAggregator::new("LINK / USD", 8).with_answer(1_600_000_000, 1_700_000_600),
            )
            .await;
        oracle.insert_proxy(PROXY, AGG_A).await;

        let reader = Arc::new(RecordingReader::new(oracle.clone()));
        let registry = FeedRegistry::new(reader.clone(), SUPER_ADMIN, &[ADMIN])
            .expect("registry should be created");

        Self { oracle, reader, registry: Arc::new(registry) }
    }

    /// MCP server acting as `operator`.
    pub fn server(&self, operator: Address) -> FeedRegistryServer {
        FeedRegistryServer::with_registry(self.registry.clone(), operator)
    }
}

/// Helper to create a test server from environment variables.
pub fn create_test_server() -> Option<FeedRegistryServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let rpc_url = std::env::var("ETHEREUM_RPC_URL").ok()?;
    if rpc_url.is_empty() {
        return None;
    }

    let config = Config {
        rpc_url,
        super_admin: SUPER_ADMIN,
        admins: vec![ADMIN],
        operator: ADMIN,
        log_level: "warn".to_string(),
    };

    FeedRegistryServer::new(config).ok()
}

/// Skip test if server cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_test_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: ETHEREUM_RPC_URL not set");
                return;
            }
        }
    };
}
