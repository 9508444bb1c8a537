//! In-memory aggregator set.
//!
//! Behaves like a handful of deployed Chainlink contracts: aggregators
//! revert on `aggregator()`, proxies forward every read to the aggregator
//! they currently point at, and unknown addresses revert on everything.

use std::collections::HashMap;

use alloy::primitives::{aliases::U80, Address, I256, U256};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    ethereum::aggregator::AggregatorReader,
    types::RoundData,
};

/// A simulated aggregator contract.
#[derive(Debug, Clone)]
pub struct SimulatedAggregator {
    pub decimals: u8,
    pub description: String,
    pub version: U256,
    /// Rounds in ascending id order; the last one is the latest.
    pub rounds: Vec<RoundData>,
}

impl SimulatedAggregator {
    /// Create an aggregator without rounds.
    pub fn new(description: impl Into<String>, decimals: u8) -> Self {
        Self { decimals, description: description.into(), version: U256::from(4), rounds: Vec::new() }
    }

    /// Append a round with the given answer and timestamp.
    pub fn with_answer(mut self, answer: i64, updated_at: u64) -> Self {
        self.push_answer(answer, updated_at);
        self
    }

    /// Append a round; its id is one past the latest.
    pub fn push_answer(&mut self, answer: i64, updated_at: u64) {
        let next_id = self.rounds.last().map(|r| r.round_id + U80::from(1)).unwrap_or(U80::from(1));
        self.rounds.push(RoundData {
            round_id: next_id,
            answer: I256::try_from(answer).unwrap_or_default(),
            started_at: U256::from(updated_at),
            updated_at: U256::from(updated_at),
            answered_in_round: next_id,
        });
    }

    fn latest(&self) -> Result<&RoundData> {
        self.rounds.last().ok_or_else(|| AppError::Rpc("execution reverted: No data present".into()))
    }

    fn round(&self, round_id: U256) -> Option<&RoundData> {
        self.rounds.iter().find(|r| U256::from(r.round_id) == round_id)
    }
}

#[derive(Debug, Default)]
struct Contracts {
    aggregators: HashMap<Address, SimulatedAggregator>,
    proxies: HashMap<Address, Address>,
    transport_down: bool,
}

impl Contracts {
    fn ensure_reachable(&self) -> Result<()> {
        if self.transport_down {
            return Err(AppError::Transport("connection refused".into()));
        }
        Ok(())
    }

    /// Follow a proxy to its aggregator, as a proxy forwards reads.
    fn target(&self, address: Address) -> Result<&SimulatedAggregator> {
        self.ensure_reachable()?;
        let resolved = self.proxies.get(&address).copied().unwrap_or(address);
        self.aggregators
            .get(&resolved)
            .ok_or_else(|| AppError::Rpc(format!("execution reverted: no contract at {resolved}")))
    }
}

/// Aggregator reader over in-memory contracts.
#[derive(Debug, Default)]
pub struct InMemoryAggregators {
    contracts: RwLock<Contracts>,
}

impl InMemoryAggregators {
    /// Create an empty contract set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an aggregator at `address`, replacing any previous one.
    pub async fn insert_aggregator(&self, address: Address, aggregator: SimulatedAggregator) {
        self.contracts.write().await.aggregators.insert(address, aggregator);
    }

    /// Deploy a proxy at `proxy` pointing at `aggregator`, or re-point it.
    pub async fn insert_proxy(&self, proxy: Address, aggregator: Address) {
        self.contracts.write().await.proxies.insert(proxy, aggregator);
    }

    /// Append a round to a deployed aggregator.
    pub async fn push_answer(&self, address: Address, answer: i64, updated_at: u64) -> Result<()> {
        let mut contracts = self.contracts.write().await;
        let aggregator = contracts
            .aggregators
            .get_mut(&address)
            .ok_or_else(|| AppError::Rpc(format!("execution reverted: no contract at {address}")))?;
        aggregator.push_answer(answer, updated_at);
        Ok(())
    }

    /// Make every subsequent read fail as if the node were unreachable.
    pub async fn set_transport_down(&self, down: bool) {
        self.contracts.write().await.transport_down = down;
    }
}

#[async_trait]
impl AggregatorReader for InMemoryAggregators {
    async fn probe_aggregator(&self, feed: Address) -> Result<Option<Address>> {
        let contracts = self.contracts.read().await;
        contracts.ensure_reachable()?;
        Ok(contracts.proxies.get(&feed).copied())
    }

    async fn aggregator(&self, proxy: Address) -> Result<Address> {
        let contracts = self.contracts.read().await;
        contracts.ensure_reachable()?;
        contracts
            .proxies
            .get(&proxy)
            .copied()
            .ok_or_else(|| AppError::Rpc(format!("execution reverted: {proxy} has no aggregator()")))
    }

    async fn decimals(&self, aggregator: Address) -> Result<u8> {
        Ok(self.contracts.read().await.target(aggregator)?.decimals)
    }

    async fn description(&self, aggregator: Address) -> Result<String> {
        Ok(self.contracts.read().await.target(aggregator)?.description.clone())
    }

    async fn version(&self, aggregator: Address) -> Result<U256> {
        Ok(self.contracts.read().await.target(aggregator)?.version)
    }

    async fn latest_round_data(&self, aggregator: Address) -> Result<RoundData> {
        Ok(*self.contracts.read().await.target(aggregator)?.latest()?)
    }

    async fn get_round_data(&self, aggregator: Address, round_id: U80) -> Result<RoundData> {
        let contracts = self.contracts.read().await;
        contracts
            .target(aggregator)?
            .round(U256::from(round_id))
            .copied()
            .ok_or_else(|| AppError::Rpc("execution reverted: No data present".into()))
    }

    async fn latest_answer(&self, aggregator: Address) -> Result<I256> {
        Ok(self.contracts.read().await.target(aggregator)?.latest()?.answer)
    }

    async fn latest_timestamp(&self, aggregator: Address) -> Result<U256> {
        Ok(self.contracts.read().await.target(aggregator)?.latest()?.updated_at)
    }

    async fn latest_round(&self, aggregator: Address) -> Result<U256> {
        Ok(U256::from(self.contracts.read().await.target(aggregator)?.latest()?.round_id))
    }

    // V2 reads answer zero for unknown rounds instead of reverting.
    async fn get_answer(&self, aggregator: Address, round_id: U256) -> Result<I256> {
        let contracts = self.contracts.read().await;
        Ok(contracts.target(aggregator)?.round(round_id).map(|r| r.answer).unwrap_or_default())
    }

    async fn get_timestamp(&self, aggregator: Address, round_id: U256) -> Result<U256> {
        let contracts = self.contracts.read().await;
        Ok(contracts.target(aggregator)?.round(round_id).map(|r| r.updated_at).unwrap_or_default())
    }
}
