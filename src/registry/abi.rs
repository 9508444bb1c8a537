//! ABI entry point.
//!
//! Decodes calldata against `IFeedRegistry`, runs the matching registry
//! operation and ABI-encodes its return value, so callers holding raw
//! transaction input get the same contract as the typed API.

use alloy::{
    primitives::{Address, Bytes, B256},
    sol_types::{SolCall, SolInterface},
};
use tracing::debug;

use super::{FeedRegistry, RegistryMethod, Role};
use crate::{
    error::{AppError, Result},
    ethereum::contracts::IFeedRegistry::{self, IFeedRegistryCalls as C},
    types::{FeedInput, RoundData},
};

fn role_from_id(id: B256) -> Result<Role> {
    Role::from_id(id).ok_or_else(|| AppError::InvalidCalldata(format!("unknown role {id}")))
}

impl FeedRegistry {
    /// Execute ABI-encoded `calldata` on behalf of `caller`.
    ///
    /// Legacy phase methods are rejected by selector before their arguments
    /// are decoded.
    pub async fn execute(&self, caller: Address, calldata: &[u8]) -> Result<Bytes> {
        let selector: [u8; 4] = calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| AppError::InvalidCalldata("calldata shorter than a selector".into()))?;

        if let Some(RegistryMethod::Unsupported(legacy)) = RegistryMethod::from_selector(selector) {
            return self.call_legacy(legacy).map(|_| Bytes::new());
        }

        let call = C::abi_decode(calldata)?;
        debug!(caller = %caller, selector = %alloy::hex::encode_prefixed(selector), "Executing calldata");

        use IFeedRegistry::*;

        let output = match call {
            C::assignFeeds(c) => {
                let feeds = c.feeds.into_iter().map(FeedInput::from).collect();
                self.assign_feeds(caller, feeds).await?;
                Vec::new()
            }
            C::sendDust(c) => {
                self.send_dust(caller, c.recipient, c.token, c.amount).await?;
                Vec::new()
            }
            C::getAssignedFeed(c) => {
                let assignment = self.get_assigned_feed(c.base, c.quote).await;
                getAssignedFeedCall::abi_encode_returns(&getAssignedFeedReturn {
                    feed: assignment.feed,
                    isProxy: assignment.is_proxy,
                })
            }
            C::getFeed(c) => getFeedCall::abi_encode_returns(&self.get_feed(c.base, c.quote).await?),
            C::SUPER_ADMIN_ROLE(_) => SUPER_ADMIN_ROLECall::abi_encode_returns(&Role::SuperAdmin.id()),
            C::ADMIN_ROLE(_) => ADMIN_ROLECall::abi_encode_returns(&Role::Admin.id()),
            C::hasRole(c) => {
                let held = match Role::from_id(c.role) {
                    Some(role) => self.has_role(role, c.account).await,
                    None => false,
                };
                hasRoleCall::abi_encode_returns(&held)
            }
            C::getRoleAdmin(c) => {
                // Unknown ids are administered by SUPER_ADMIN as well.
                let admin = match Role::from_id(c.role) {
                    Some(role) => self.get_role_admin(role).await,
                    None => Role::SuperAdmin,
                };
                getRoleAdminCall::abi_encode_returns(&admin.id())
            }
            C::grantRole(c) => {
                let role = self.role_for_update(caller, c.role).await?;
                self.grant_role(caller, role, c.account).await?;
                Vec::new()
            }
            C::revokeRole(c) => {
                let role = self.role_for_update(caller, c.role).await?;
                self.revoke_role(caller, role, c.account).await?;
                Vec::new()
            }
            C::decimals(c) => decimalsCall::abi_encode_returns(&self.decimals(c.base, c.quote).await?),
            C::description(c) => {
                descriptionCall::abi_encode_returns(&self.description(c.base, c.quote).await?)
            }
            C::version(c) => versionCall::abi_encode_returns(&self.version(c.base, c.quote).await?),
            C::latestRoundData(c) => {
                let round = self.latest_round_data(c.base, c.quote).await?;
                latestRoundDataCall::abi_encode_returns(&latest_round_return(round))
            }
            C::getRoundData(c) => {
                let round = self.get_round_data(c.base, c.quote, c._roundId).await?;
                getRoundDataCall::abi_encode_returns(&round_return(round))
            }
            C::latestAnswer(c) => {
                latestAnswerCall::abi_encode_returns(&self.latest_answer(c.base, c.quote).await?)
            }
            C::latestTimestamp(c) => latestTimestampCall::abi_encode_returns(
                &self.latest_timestamp(c.base, c.quote).await?,
            ),
            C::latestRound(c) => {
                latestRoundCall::abi_encode_returns(&self.latest_round(c.base, c.quote).await?)
            }
            C::getAnswer(c) => getAnswerCall::abi_encode_returns(
                &self.get_answer(c.base, c.quote, c.roundId).await?,
            ),
            C::getTimestamp(c) => getTimestampCall::abi_encode_returns(
                &self.get_timestamp(c.base, c.quote, c.roundId).await?,
            ),
            other => {
                return Err(AppError::FunctionNotSupported(alloy::hex::encode_prefixed(
                    other.selector(),
                )))
            }
        };

        Ok(Bytes::from(output))
    }

    /// Role targeted by `grantRole`/`revokeRole`.
    ///
    /// Every role id, known or not, is administered by `SUPER_ADMIN`, so the
    /// caller check comes before the id lookup.
    async fn role_for_update(&self, caller: Address, id: B256) -> Result<Role> {
        match Role::from_id(id) {
            Some(role) => Ok(role),
            None if !self.has_role(Role::SuperAdmin, caller).await => {
                Err(AppError::Unauthorized { account: caller, role: Role::SuperAdmin })
            }
            None => role_from_id(id),
        }
    }
}

fn latest_round_return(round: RoundData) -> IFeedRegistry::latestRoundDataReturn {
    IFeedRegistry::latestRoundDataReturn {
        roundId: round.round_id,
        answer: round.answer,
        startedAt: round.started_at,
        updatedAt: round.updated_at,
        answeredInRound: round.answered_in_round,
    }
}

fn round_return(round: RoundData) -> IFeedRegistry::getRoundDataReturn {
    IFeedRegistry::getRoundDataReturn {
        roundId: round.round_id,
        answer: round.answer,
        startedAt: round.started_at,
        updatedAt: round.updated_at,
        answeredInRound: round.answered_in_round,
    }
}
