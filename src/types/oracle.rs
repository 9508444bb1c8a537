//! Oracle query and answer types for redirected reads.

use alloy::primitives::{aliases::U80, Address, I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One round as reported by an aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: U80,
    pub answer: I256,
    pub started_at: U256,
    pub updated_at: U256,
    pub answered_in_round: U80,
}

impl RoundData {
    fn to_json(self) -> Value {
        json!({
            "round_id": self.round_id.to_string(),
            "answer": self.answer.to_string(),
            "started_at": self.started_at.to_string(),
            "updated_at": self.updated_at.to_string(),
            "answered_in_round": self.answered_in_round.to_string(),
        })
    }
}

/// Aggregator read methods the registry forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleMethod {
    Decimals,
    Description,
    Version,
    LatestRoundData,
    GetRoundData,
    LatestAnswer,
    LatestTimestamp,
    LatestRound,
    GetAnswer,
    GetTimestamp,
}

impl OracleMethod {
    /// Every forwarded method.
    pub const ALL: [OracleMethod; 10] = [
        OracleMethod::Decimals,
        OracleMethod::Description,
        OracleMethod::Version,
        OracleMethod::LatestRoundData,
        OracleMethod::GetRoundData,
        OracleMethod::LatestAnswer,
        OracleMethod::LatestTimestamp,
        OracleMethod::LatestRound,
        OracleMethod::GetAnswer,
        OracleMethod::GetTimestamp,
    ];

    /// Solidity method name.
    pub fn name(&self) -> &'static str {
        match self {
            OracleMethod::Decimals => "decimals",
            OracleMethod::Description => "description",
            OracleMethod::Version => "version",
            OracleMethod::LatestRoundData => "latestRoundData",
            OracleMethod::GetRoundData => "getRoundData",
            OracleMethod::LatestAnswer => "latestAnswer",
            OracleMethod::LatestTimestamp => "latestTimestamp",
            OracleMethod::LatestRound => "latestRound",
            OracleMethod::GetAnswer => "getAnswer",
            OracleMethod::GetTimestamp => "getTimestamp",
        }
    }

    /// Whether the method takes a round id argument.
    pub fn takes_round_id(&self) -> bool {
        matches!(
            self,
            OracleMethod::GetRoundData | OracleMethod::GetAnswer | OracleMethod::GetTimestamp
        )
    }
}

impl std::fmt::Display for OracleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A forwarded read together with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleQuery {
    Decimals,
    Description,
    Version,
    LatestRoundData,
    GetRoundData { round_id: U80 },
    LatestAnswer,
    LatestTimestamp,
    LatestRound,
    GetAnswer { round_id: U256 },
    GetTimestamp { round_id: U256 },
}

impl OracleQuery {
    /// The method this query invokes.
    pub fn method(&self) -> OracleMethod {
        match self {
            OracleQuery::Decimals => OracleMethod::Decimals,
            OracleQuery::Description => OracleMethod::Description,
            OracleQuery::Version => OracleMethod::Version,
            OracleQuery::LatestRoundData => OracleMethod::LatestRoundData,
            OracleQuery::GetRoundData { .. } => OracleMethod::GetRoundData,
            OracleQuery::LatestAnswer => OracleMethod::LatestAnswer,
            OracleQuery::LatestTimestamp => OracleMethod::LatestTimestamp,
            OracleQuery::LatestRound => OracleMethod::LatestRound,
            OracleQuery::GetAnswer { .. } => OracleMethod::GetAnswer,
            OracleQuery::GetTimestamp { .. } => OracleMethod::GetTimestamp,
        }
    }
}

/// Result of a forwarded read, shaped like the aggregator's return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleAnswer {
    Decimals(u8),
    Description(String),
    Version(U256),
    Round(RoundData),
    Answer(I256),
    Timestamp(U256),
    RoundId(U256),
}

impl OracleAnswer {
    /// JSON rendering with all integers as decimal strings.
    pub fn to_json(&self) -> Value {
        match self {
            OracleAnswer::Decimals(d) => json!(d),
            OracleAnswer::Description(s) => json!(s),
            OracleAnswer::Round(round) => round.to_json(),
            OracleAnswer::Answer(a) => json!(a.to_string()),
            OracleAnswer::Version(v) | OracleAnswer::Timestamp(v) | OracleAnswer::RoundId(v) => {
                json!(v.to_string())
            }
        }
    }
}

/// Latest price of a pair scaled by the aggregator's decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Base asset.
    pub base: String,
    /// Quote asset.
    pub quote: String,
    /// Aggregator that answered.
    pub aggregator: String,
    /// Human-readable price.
    pub price: String,
    /// Raw answer.
    pub answer_raw: String,
    /// Aggregator decimals.
    pub decimals: u8,
    /// Round that produced the answer.
    pub round_id: String,
    /// Unix timestamp of the last update.
    pub updated_at: String,
}

impl PriceQuote {
    /// Scale a raw answer by `decimals`.
    pub fn scale_answer(answer: I256, decimals: u8) -> Result<Decimal, String> {
        let raw: i128 = answer
            .to_string()
            .parse()
            .map_err(|_| format!("answer {} exceeds i128 range", answer))?;
        Decimal::try_from_i128_with_scale(raw, decimals as u32)
            .map(|d| d.normalize())
            .map_err(|e| format!("answer {} with {} decimals: {}", answer, decimals, e))
    }

    /// Build a quote from a round and the aggregator's decimals.
    pub fn from_round(
        base: Address,
        quote: Address,
        aggregator: Address,
        round: RoundData,
        decimals: u8,
    ) -> Result<Self, String> {
        let price = Self::scale_answer(round.answer, decimals)?;
        Ok(Self {
            base: format!("{base:?}"),
            quote: format!("{quote:?}"),
            aggregator: format!("{aggregator:?}"),
            price: price.to_string(),
            answer_raw: round.answer.to_string(),
            decimals,
            round_id: round.round_id.to_string(),
            updated_at: round.updated_at.to_string(),
        })
    }
}
