//! Aggregator read access.
//!
//! The registry never talks to a provider directly; it reads aggregators
//! through [`AggregatorReader`] so the same routing logic runs against a
//! live node or an in-memory aggregator set.

use std::sync::Arc;

use alloy::primitives::{aliases::U80, Address, I256, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::Result,
    ethereum::{
        contracts::{IAggregatorProxy, IAggregatorV2V3},
        EthereumClient,
    },
    types::{OracleAnswer, OracleQuery, RoundData},
};

/// Read-only view of Chainlink aggregator contracts.
#[async_trait]
pub trait AggregatorReader: Send + Sync {
    /// Probe `feed` for an `aggregator()` accessor.
    ///
    /// Returns `Ok(None)` when the call reverts (the feed is not a proxy)
    /// and `Err` only when the probe itself could not be carried out.
    async fn probe_aggregator(&self, feed: Address) -> Result<Option<Address>>;

    /// Underlying aggregator currently reported by a proxy.
    async fn aggregator(&self, proxy: Address) -> Result<Address>;

    async fn decimals(&self, aggregator: Address) -> Result<u8>;
    async fn description(&self, aggregator: Address) -> Result<String>;
    async fn version(&self, aggregator: Address) -> Result<U256>;
    async fn latest_round_data(&self, aggregator: Address) -> Result<RoundData>;
    async fn get_round_data(&self, aggregator: Address, round_id: U80) -> Result<RoundData>;
    async fn latest_answer(&self, aggregator: Address) -> Result<I256>;
    async fn latest_timestamp(&self, aggregator: Address) -> Result<U256>;
    async fn latest_round(&self, aggregator: Address) -> Result<U256>;
    async fn get_answer(&self, aggregator: Address, round_id: U256) -> Result<I256>;
    async fn get_timestamp(&self, aggregator: Address, round_id: U256) -> Result<U256>;

    /// Run `query` against `aggregator`, returning the answer unmodified.
    async fn query(&self, aggregator: Address, query: OracleQuery) -> Result<OracleAnswer> {
        let answer = match query {
            OracleQuery::Decimals => OracleAnswer::Decimals(self.decimals(aggregator).await?),
            OracleQuery::Description => {
                OracleAnswer::Description(self.description(aggregator).await?)
            }
            OracleQuery::Version => OracleAnswer::Version(self.version(aggregator).await?),
            OracleQuery::LatestRoundData => {
                OracleAnswer::Round(self.latest_round_data(aggregator).await?)
            }
            OracleQuery::GetRoundData { round_id } => {
                OracleAnswer::Round(self.get_round_data(aggregator, round_id).await?)
            }
            OracleQuery::LatestAnswer => OracleAnswer::Answer(self.latest_answer(aggregator).await?),
            OracleQuery::LatestTimestamp => {
                OracleAnswer::Timestamp(self.latest_timestamp(aggregator).await?)
            }
            OracleQuery::LatestRound => OracleAnswer::RoundId(self.latest_round(aggregator).await?),
            OracleQuery::GetAnswer { round_id } => {
                OracleAnswer::Answer(self.get_answer(aggregator, round_id).await?)
            }
            OracleQuery::GetTimestamp { round_id } => {
                OracleAnswer::Timestamp(self.get_timestamp(aggregator, round_id).await?)
            }
        };
        Ok(answer)
    }
}

/// Aggregator reader backed by JSON-RPC `eth_call`s.
#[derive(Debug, Clone)]
pub struct RpcAggregatorReader {
    client: Arc<EthereumClient>,
}

impl RpcAggregatorReader {
    /// Create a reader over an Ethereum client.
    pub fn new(client: Arc<EthereumClient>) -> Self {
        Self { client }
    }

    fn aggregator_contract(
        &self,
        address: Address,
    ) -> IAggregatorV2V3::IAggregatorV2V3Instance<crate::ethereum::HttpProvider> {
        IAggregatorV2V3::new(address, self.client.provider().clone())
    }
}

#[async_trait]
impl AggregatorReader for RpcAggregatorReader {
    async fn probe_aggregator(&self, feed: Address) -> Result<Option<Address>> {
        let proxy = IAggregatorProxy::new(feed, self.client.provider().clone());

        match proxy.aggregator().call().await {
            Ok(aggregator) => {
                debug!(feed = %feed, aggregator = %aggregator, "Feed classified as proxy");
                Ok(Some(aggregator))
            }
            // Network failures must not be mistaken for a revert.
            Err(alloy::contract::Error::TransportError(err)) if err.as_error_resp().is_none() => {
                Err(err.into())
            }
            Err(err) => {
                debug!(feed = %feed, error = %err, "Feed classified as direct");
                Ok(None)
            }
        }
    }

    async fn aggregator(&self, proxy: Address) -> Result<Address> {
        let contract = IAggregatorProxy::new(proxy, self.client.provider().clone());
        Ok(contract.aggregator().call().await?)
    }

    async fn decimals(&self, aggregator: Address) -> Result<u8> {
        Ok(self.aggregator_contract(aggregator).decimals().call().await?)
    }

    async fn description(&self, aggregator: Address) -> Result<String> {
        Ok(self.aggregator_contract(aggregator).description().call().await?)
    }

    async fn version(&self, aggregator: Address) -> Result<U256> {
        Ok(self.aggregator_contract(aggregator).version().call().await?)
    }

    async fn latest_round_data(&self, aggregator: Address) -> Result<RoundData> {
        let round = self.aggregator_contract(aggregator).latestRoundData().call().await?;
        Ok(RoundData {
            round_id: round.roundId,
            answer: round.answer,
            started_at: round.startedAt,
            updated_at: round.updatedAt,
            answered_in_round: round.answeredInRound,
        })
    }

    async fn get_round_data(&self, aggregator: Address, round_id: U80) -> Result<RoundData> {
        let round = self.aggregator_contract(aggregator).getRoundData(round_id).call().await?;
        Ok(RoundData {
            round_id: round.roundId,
            answer: round.answer,
            started_at: round.startedAt,
            updated_at: round.updatedAt,
            answered_in_round: round.answeredInRound,
        })
    }

    async fn latest_answer(&self, aggregator: Address) -> Result<I256> {
        Ok(self.aggregator_contract(aggregator).latestAnswer().call().await?)
    }

    async fn latest_timestamp(&self, aggregator: Address) -> Result<U256> {
        Ok(self.aggregator_contract(aggregator).latestTimestamp().call().await?)
    }

    async fn latest_round(&self, aggregator: Address) -> Result<U256> {
        Ok(self.aggregator_contract(aggregator).latestRound().call().await?)
    }

    async fn get_answer(&self, aggregator: Address, round_id: U256) -> Result<I256> {
        Ok(self.aggregator_contract(aggregator).getAnswer(round_id).call().await?)
    }

    async fn get_timestamp(&self, aggregator: Address, round_id: U256) -> Result<U256> {
        Ok(self.aggregator_contract(aggregator).getTimestamp(round_id).call().await?)
    }
}
