//! Dispatch table for the registry's oracle-facing methods.
//!
//! Every method the registry answers for a (base, quote) pair is either
//! forwarded to the resolved aggregator or rejected outright. Lookup is by
//! Solidity name or by 4-byte ABI selector.

use alloy::sol_types::SolCall;

use crate::{ethereum::contracts::IFeedRegistry, types::OracleMethod};

/// Phase/proposal methods of the legacy registry interface.
///
/// A flat (base, quote) mapping cannot reconstruct phase history, so each
/// of these fails with `FunctionNotSupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyMethod {
    GetPhaseFeed,
    IsFeedEnabled,
    GetPhase,
    GetRoundFeed,
    GetPhaseRange,
    GetPreviousRoundId,
    GetNextRoundId,
    ProposeFeed,
    ConfirmFeed,
    GetProposedFeed,
    ProposedGetRoundData,
    ProposedLatestRoundData,
    GetCurrentPhaseId,
}

impl LegacyMethod {
    pub const ALL: [LegacyMethod; 13] = [
        LegacyMethod::GetPhaseFeed,
        LegacyMethod::IsFeedEnabled,
        LegacyMethod::GetPhase,
        LegacyMethod::GetRoundFeed,
        LegacyMethod::GetPhaseRange,
        LegacyMethod::GetPreviousRoundId,
        LegacyMethod::GetNextRoundId,
        LegacyMethod::ProposeFeed,
        LegacyMethod::ConfirmFeed,
        LegacyMethod::GetProposedFeed,
        LegacyMethod::ProposedGetRoundData,
        LegacyMethod::ProposedLatestRoundData,
        LegacyMethod::GetCurrentPhaseId,
    ];

    /// Solidity method name.
    pub fn name(&self) -> &'static str {
        match self {
            LegacyMethod::GetPhaseFeed => "getPhaseFeed",
            LegacyMethod::IsFeedEnabled => "isFeedEnabled",
            LegacyMethod::GetPhase => "getPhase",
            LegacyMethod::GetRoundFeed => "getRoundFeed",
            LegacyMethod::GetPhaseRange => "getPhaseRange",
            LegacyMethod::GetPreviousRoundId => "getPreviousRoundId",
            LegacyMethod::GetNextRoundId => "getNextRoundId",
            LegacyMethod::ProposeFeed => "proposeFeed",
            LegacyMethod::ConfirmFeed => "confirmFeed",
            LegacyMethod::GetProposedFeed => "getProposedFeed",
            LegacyMethod::ProposedGetRoundData => "proposedGetRoundData",
            LegacyMethod::ProposedLatestRoundData => "proposedLatestRoundData",
            LegacyMethod::GetCurrentPhaseId => "getCurrentPhaseId",
        }
    }

    /// ABI selector in the registry interface.
    pub fn selector(&self) -> [u8; 4] {
        use IFeedRegistry::*;
        match self {
            LegacyMethod::GetPhaseFeed => getPhaseFeedCall::SELECTOR,
            LegacyMethod::IsFeedEnabled => isFeedEnabledCall::SELECTOR,
            LegacyMethod::GetPhase => getPhaseCall::SELECTOR,
            LegacyMethod::GetRoundFeed => getRoundFeedCall::SELECTOR,
            LegacyMethod::GetPhaseRange => getPhaseRangeCall::SELECTOR,
            LegacyMethod::GetPreviousRoundId => getPreviousRoundIdCall::SELECTOR,
            LegacyMethod::GetNextRoundId => getNextRoundIdCall::SELECTOR,
            LegacyMethod::ProposeFeed => proposeFeedCall::SELECTOR,
            LegacyMethod::ConfirmFeed => confirmFeedCall::SELECTOR,
            LegacyMethod::GetProposedFeed => getProposedFeedCall::SELECTOR,
            LegacyMethod::ProposedGetRoundData => proposedGetRoundDataCall::SELECTOR,
            LegacyMethod::ProposedLatestRoundData => proposedLatestRoundDataCall::SELECTOR,
            LegacyMethod::GetCurrentPhaseId => getCurrentPhaseIdCall::SELECTOR,
        }
    }
}

impl std::fmt::Display for LegacyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// ABI selector of a forwarded method in the registry interface.
pub fn oracle_selector(method: OracleMethod) -> [u8; 4] {
    use IFeedRegistry::*;
    match method {
        OracleMethod::Decimals => decimalsCall::SELECTOR,
        OracleMethod::Description => descriptionCall::SELECTOR,
        OracleMethod::Version => versionCall::SELECTOR,
        OracleMethod::LatestRoundData => latestRoundDataCall::SELECTOR,
        OracleMethod::GetRoundData => getRoundDataCall::SELECTOR,
        OracleMethod::LatestAnswer => latestAnswerCall::SELECTOR,
        OracleMethod::LatestTimestamp => latestTimestampCall::SELECTOR,
        OracleMethod::LatestRound => latestRoundCall::SELECTOR,
        OracleMethod::GetAnswer => getAnswerCall::SELECTOR,
        OracleMethod::GetTimestamp => getTimestampCall::SELECTOR,
    }
}

/// What the registry does with a pair-scoped method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryMethod {
    /// Forward to the resolved aggregator.
    Redirect(OracleMethod),
    /// Always fail with `FunctionNotSupported`.
    Unsupported(LegacyMethod),
}

impl RegistryMethod {
    /// Every entry of the dispatch table.
    pub fn all() -> impl Iterator<Item = RegistryMethod> {
        OracleMethod::ALL
            .into_iter()
            .map(RegistryMethod::Redirect)
            .chain(LegacyMethod::ALL.into_iter().map(RegistryMethod::Unsupported))
    }

    /// Solidity method name.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryMethod::Redirect(method) => method.name(),
            RegistryMethod::Unsupported(method) => method.name(),
        }
    }

    /// ABI selector in the registry interface.
    pub fn selector(&self) -> [u8; 4] {
        match self {
            RegistryMethod::Redirect(method) => oracle_selector(*method),
            RegistryMethod::Unsupported(method) => method.selector(),
        }
    }

    /// Look up by exact Solidity name.
    pub fn from_name(name: &str) -> Option<RegistryMethod> {
        Self::all().find(|method| method.name() == name)
    }

    /// Look up by ABI selector.
    pub fn from_selector(selector: [u8; 4]) -> Option<RegistryMethod> {
        Self::all().find(|method| method.selector() == selector)
    }
}
