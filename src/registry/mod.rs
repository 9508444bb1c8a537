//! Feed registry.
//!
//! Resolves (base, quote) pairs to Chainlink aggregators, forwards oracle
//! reads to them, and gates feed management behind registry roles.
//!
//! Every public operation runs atomically: the whole registry state sits
//! behind one lock, writes hold the write guard for their full duration
//! (including aggregator probes) and stage their changes until every check
//! has passed. A failed call leaves no trace.

pub mod abi;
pub mod access;
pub mod events;
pub mod methods;
pub mod store;

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::{aliases::U80, Address, I256, U256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use access::{AccessControl, Role, RoleTable};
pub use events::RegistryEvent;
pub use methods::{LegacyMethod, RegistryMethod};
pub use store::{FeedStore, FeedTransaction};

use crate::{
    error::{AppError, Result},
    ethereum::AggregatorReader,
    types::{
        FeedAssignment, FeedInput, FeedRecord, OracleAnswer, OracleMethod, OracleQuery, PriceQuote,
        RoundData,
    },
};

/// Everything a registry call can read or write.
#[derive(Debug)]
struct RegistryState {
    feeds: FeedStore,
    access: Box<dyn AccessControl>,
    /// Token balances held by the registry itself.
    balances: HashMap<Address, U256>,
    events: Vec<RegistryEvent>,
}

impl RegistryState {
    fn require_role(&self, role: Role, account: Address) -> Result<()> {
        if self.access.has_role(role, account) {
            Ok(())
        } else {
            warn!(account = %account, role = %role, "Rejected call from account without role");
            Err(AppError::Unauthorized { account, role })
        }
    }
}

/// Registry mapping (base, quote) pairs to price-feed aggregators.
pub struct FeedRegistry {
    oracle: Arc<dyn AggregatorReader>,
    state: RwLock<RegistryState>,
}

impl FeedRegistry {
    /// Create a registry with one super admin and a set of initial admins.
    ///
    /// Fails with [`AppError::ZeroAddress`] if `super_admin` is zero.
    pub fn new(
        oracle: Arc<dyn AggregatorReader>,
        super_admin: Address,
        admins: &[Address],
    ) -> Result<Self> {
        if super_admin == Address::ZERO {
            return Err(AppError::ZeroAddress);
        }

        info!(super_admin = %super_admin, admins = admins.len(), "Feed registry created");

        Ok(Self::with_access_control(oracle, Box::new(RoleTable::new(super_admin, admins))))
    }

    /// Create a registry over an already populated access control.
    pub fn with_access_control(
        oracle: Arc<dyn AggregatorReader>,
        access: Box<dyn AccessControl>,
    ) -> Self {
        Self {
            oracle,
            state: RwLock::new(RegistryState {
                feeds: FeedStore::new(),
                access,
                balances: HashMap::new(),
                events: Vec::new(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Feed management
    // ------------------------------------------------------------------

    /// Assign, overwrite or remove (`feed == 0`) feeds for a batch of pairs.
    ///
    /// Each non-zero feed is probed for `aggregator()` to decide whether it
    /// is stored as a proxy. Emits a single `FeedsModified` for the batch and
    /// returns the assignment written for each entry, in batch order.
    pub async fn assign_feeds(
        &self,
        caller: Address,
        feeds: Vec<FeedInput>,
    ) -> Result<Vec<FeedAssignment>> {
        let mut state = self.state.write().await;
        state.require_role(Role::Admin, caller)?;

        if let Some(bad) = feeds.iter().find(|f| f.base == Address::ZERO || f.quote == Address::ZERO)
        {
            warn!(base = %bad.base, quote = %bad.quote, "Rejected feed assignment with zero asset");
            return Err(AppError::ZeroAddress);
        }

        let mut written = Vec::with_capacity(feeds.len());
        let mut txn = state.feeds.begin();
        for input in &feeds {
            let record = if input.is_removal() {
                None
            } else {
                Some(self.classify(input.feed).await?)
            };
            written.push(FeedAssignment::from_record(input.base, input.quote, record.as_ref()));
            txn.stage(input.base, input.quote, record);
        }
        let applied = txn.commit();

        info!(caller = %caller, entries = applied, "Feeds modified");
        state.events.push(RegistryEvent::FeedsModified { feeds });
        Ok(written)
    }

    /// Probe a feed once and record how it will be resolved.
    ///
    /// The result is cached in the store: a feed that later starts or stops
    /// being a proxy keeps its classification until reassigned.
    async fn classify(&self, feed: Address) -> Result<FeedRecord> {
        match self.oracle.probe_aggregator(feed).await? {
            Some(aggregator) => {
                debug!(feed = %feed, aggregator = %aggregator, "Assigning proxy feed");
                Ok(FeedRecord::Proxy(feed))
            }
            None => {
                debug!(feed = %feed, "Assigning direct feed");
                Ok(FeedRecord::Direct(feed))
            }
        }
    }

    /// Stored record for a pair, without resolution. Never fails.
    pub async fn get_assigned_feed(&self, base: Address, quote: Address) -> FeedAssignment {
        self.state.read().await.feeds.assignment(base, quote)
    }

    /// Number of pairs with an assigned feed.
    pub async fn feed_count(&self) -> usize {
        self.state.read().await.feeds.len()
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// The aggregator answering for a pair.
    ///
    /// For proxy feeds this is the proxy's current `aggregator()`.
    pub async fn get_feed(&self, base: Address, quote: Address) -> Result<Address> {
        let state = self.state.read().await;
        self.resolve(&state, base, quote).await
    }

    async fn resolve(&self, state: &RegistryState, base: Address, quote: Address) -> Result<Address> {
        match state.feeds.get(base, quote) {
            None => {
                debug!(base = %base, quote = %quote, "No feed assigned");
                Err(AppError::FeedNotFound { base, quote })
            }
            Some(FeedRecord::Direct(feed)) => Ok(*feed),
            Some(FeedRecord::Proxy(proxy)) => self.oracle.aggregator(*proxy).await,
        }
    }

    // ------------------------------------------------------------------
    // Redirected reads
    // ------------------------------------------------------------------

    /// Forward `query` to the aggregator answering for a pair.
    pub async fn query(&self, base: Address, quote: Address, query: OracleQuery) -> Result<OracleAnswer> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        debug!(base = %base, quote = %quote, target = %target, method = %query.method(), "Redirecting read");
        self.oracle.query(target, query).await
    }

    /// Dispatch a pair-scoped method through the dispatch table.
    pub async fn call_method(
        &self,
        base: Address,
        quote: Address,
        method: RegistryMethod,
        round_id: Option<U256>,
    ) -> Result<OracleAnswer> {
        let oracle_method = match method {
            RegistryMethod::Unsupported(legacy) => return self.call_legacy(legacy),
            RegistryMethod::Redirect(oracle_method) => oracle_method,
        };

        if round_id.is_some() && !oracle_method.takes_round_id() {
            return Err(AppError::Parse(format!("{oracle_method} takes no round id")));
        }

        let round = || {
            round_id.ok_or_else(|| AppError::Parse(format!("{oracle_method} requires a round id")))
        };
        let query = match oracle_method {
            OracleMethod::Decimals => OracleQuery::Decimals,
            OracleMethod::Description => OracleQuery::Description,
            OracleMethod::Version => OracleQuery::Version,
            OracleMethod::LatestRoundData => OracleQuery::LatestRoundData,
            OracleMethod::GetRoundData => {
                let round_id = round()?;
                if round_id > U256::from(U80::MAX) {
                    return Err(AppError::NumericOverflow(format!(
                        "round id {round_id} exceeds uint80"
                    )));
                }
                OracleQuery::GetRoundData { round_id: U80::from(round_id) }
            }
            OracleMethod::LatestAnswer => OracleQuery::LatestAnswer,
            OracleMethod::LatestTimestamp => OracleQuery::LatestTimestamp,
            OracleMethod::LatestRound => OracleQuery::LatestRound,
            OracleMethod::GetAnswer => OracleQuery::GetAnswer { round_id: round()? },
            OracleMethod::GetTimestamp => {
                OracleQuery::GetTimestamp { round_id: round()? }
            }
        };
        self.query(base, quote, query).await
    }

    /// Reject a legacy phase/proposal method.
    pub fn call_legacy(&self, method: LegacyMethod) -> Result<OracleAnswer> {
        debug!(method = %method, "Rejected unsupported legacy method");
        Err(AppError::FunctionNotSupported(method.name().to_string()))
    }

    /// `decimals()` of the pair's aggregator.
    pub async fn decimals(&self, base: Address, quote: Address) -> Result<u8> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.decimals(target).await
    }

    /// `description()` of the pair's aggregator.
    pub async fn description(&self, base: Address, quote: Address) -> Result<String> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.description(target).await
    }

    /// `version()` of the pair's aggregator.
    pub async fn version(&self, base: Address, quote: Address) -> Result<U256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.version(target).await
    }

    /// Latest round of the pair's aggregator.
    pub async fn latest_round_data(&self, base: Address, quote: Address) -> Result<RoundData> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.latest_round_data(target).await
    }

    /// Round `round_id` of the pair's aggregator.
    pub async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: U80,
    ) -> Result<RoundData> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.get_round_data(target, round_id).await
    }

    /// `latestAnswer()` of the pair's aggregator.
    pub async fn latest_answer(&self, base: Address, quote: Address) -> Result<I256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.latest_answer(target).await
    }

    /// `latestTimestamp()` of the pair's aggregator.
    pub async fn latest_timestamp(&self, base: Address, quote: Address) -> Result<U256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.latest_timestamp(target).await
    }

    /// `latestRound()` of the pair's aggregator.
    pub async fn latest_round(&self, base: Address, quote: Address) -> Result<U256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.latest_round(target).await
    }

    /// Answer of round `round_id`; aggregators report zero for unknown rounds.
    pub async fn get_answer(&self, base: Address, quote: Address, round_id: U256) -> Result<I256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.get_answer(target, round_id).await
    }

    /// Timestamp of round `round_id`.
    pub async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> Result<U256> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;
        self.oracle.get_timestamp(target, round_id).await
    }

    /// Latest answer of a pair scaled by the aggregator's decimals.
    pub async fn latest_price(&self, base: Address, quote: Address) -> Result<PriceQuote> {
        let state = self.state.read().await;
        let target = self.resolve(&state, base, quote).await?;

        let round = self.oracle.latest_round_data(target).await?;
        let decimals = self.oracle.decimals(target).await?;

        if round.answer <= I256::ZERO {
            return Err(AppError::PriceOracle(format!(
                "non-positive answer {} in round {}",
                round.answer, round.round_id
            )));
        }

        PriceQuote::from_round(base, quote, target, round, decimals).map_err(AppError::NumericOverflow)
    }

    // ------------------------------------------------------------------
    // Dust
    // ------------------------------------------------------------------

    /// Credit tokens sent to the registry.
    pub async fn deposit_dust(&self, token: Address, amount: U256) -> Result<U256> {
        let mut state = self.state.write().await;
        let balance = state.balances.entry(token).or_default();
        *balance = balance.checked_add(amount).ok_or_else(|| {
            AppError::NumericOverflow(format!("balance of {token} overflows uint256"))
        })?;
        debug!(token = %token, amount = %amount, balance = %balance, "Dust received");
        Ok(*balance)
    }

    /// Registry's balance of `token`.
    pub async fn dust_balance(&self, token: Address) -> U256 {
        self.state.read().await.balances.get(&token).copied().unwrap_or_default()
    }

    /// Transfer stray tokens held by the registry to `recipient`.
    ///
    /// Returns the registry's remaining balance of `token`.
    pub async fn send_dust(
        &self,
        caller: Address,
        recipient: Address,
        token: Address,
        amount: U256,
    ) -> Result<U256> {
        let mut state = self.state.write().await;
        state.require_role(Role::Admin, caller)?;

        if recipient == Address::ZERO {
            return Err(AppError::ZeroAddress);
        }

        let available = state.balances.get(&token).copied().unwrap_or_default();
        if available < amount {
            return Err(AppError::InsufficientBalance { token, requested: amount, available });
        }

        let remaining = available - amount;
        if remaining.is_zero() {
            state.balances.remove(&token);
        } else {
            state.balances.insert(token, remaining);
        }

        info!(caller = %caller, recipient = %recipient, token = %token, amount = %amount, "Dust sent");
        state.events.push(RegistryEvent::DustSent { recipient, token, amount });
        Ok(remaining)
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    pub async fn has_role(&self, role: Role, account: Address) -> bool {
        self.state.read().await.access.has_role(role, account)
    }

    pub async fn get_role_admin(&self, role: Role) -> Role {
        self.state.read().await.access.get_role_admin(role)
    }

    /// Grant `role` to `account`; caller must hold the role's admin role.
    pub async fn grant_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let mut state = self.state.write().await;
        let admin_role = state.access.get_role_admin(role);
        state.require_role(admin_role, caller)?;

        if state.access.grant_role(role, account) {
            info!(role = %role, account = %account, sender = %caller, "Role granted");
            state.events.push(RegistryEvent::RoleGranted { role, account, sender: caller });
        }
        Ok(())
    }

    /// Revoke `role` from `account`; caller must hold the role's admin role.
    pub async fn revoke_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let mut state = self.state.write().await;
        let admin_role = state.access.get_role_admin(role);
        state.require_role(admin_role, caller)?;

        if state.access.revoke_role(role, account) {
            info!(role = %role, account = %account, sender = %caller, "Role revoked");
            state.events.push(RegistryEvent::RoleRevoked { role, account, sender: caller });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Every event emitted so far, oldest first.
    pub async fn events(&self) -> Vec<RegistryEvent> {
        self.state.read().await.events.clone()
    }
}

impl std::fmt::Debug for FeedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::{InMemoryAggregators, SimulatedAggregator};
    use alloy::primitives::address;

    const SUPER: Address = address!("00000000000000000000000000000000000000a1");
    const ADMIN: Address = address!("00000000000000000000000000000000000000b2");
    const LINK: Address = address!("514910771AF9Ca656af840dff83E8264EcF986CA");
    const USD: Address = address!("0000000000000000000000000000000000000348");
    const AGG: Address = address!("00000000000000000000000000000000000a0001");
    const PROXY: Address = address!("00000000000000000000000000000000000b0001");

    async fn setup() -> (Arc<InMemoryAggregators>, FeedRegistry) {
        let oracle = Arc::new(InMemoryAggregators::new());
        oracle
            .insert_aggregator(AGG, SimulatedAggregator::new("LINK / USD", 8).with_answer(1_500_000_000, 100))
            .await;
        oracle.insert_proxy(PROXY, AGG).await;
        let registry = FeedRegistry::new(oracle.clone(), SUPER, &[ADMIN]).unwrap();
        (oracle, registry)
    }

    #[tokio::test]
    async fn test_new_rejects_zero_super_admin() {
        let oracle = Arc::new(InMemoryAggregators::new());
        let err = FeedRegistry::new(oracle, Address::ZERO, &[ADMIN]).unwrap_err();
        assert!(matches!(err, AppError::ZeroAddress));
    }

    #[tokio::test]
    async fn test_classification_happens_at_assignment() {
        let (_, registry) = setup().await;
        registry
            .assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, PROXY), FeedInput::new(USD, LINK, AGG)])
            .await
            .unwrap();

        assert!(registry.get_assigned_feed(LINK, USD).await.is_proxy);
        assert!(!registry.get_assigned_feed(USD, LINK).await.is_proxy);
        assert_eq!(registry.feed_count().await, 2);
    }

    #[tokio::test]
    async fn test_failed_probe_writes_nothing() {
        let (oracle, registry) = setup().await;
        oracle.set_transport_down(true).await;

        let result = registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG)]).await;
        assert!(matches!(result, Err(AppError::Transport(_))));
        assert_eq!(registry.feed_count().await, 0);
        assert!(registry.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_call_method_requires_round_id() {
        let (_, registry) = setup().await;
        registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG)]).await.unwrap();

        let method = RegistryMethod::from_name("getRoundData").unwrap();
        let err = registry.call_method(LINK, USD, method, None).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));

        let answer = registry.call_method(LINK, USD, method, Some(U256::from(1))).await.unwrap();
        assert!(matches!(answer, OracleAnswer::Round(r) if r.round_id == U80::from(1)));
    }

    #[tokio::test]
    async fn test_call_method_rejects_round_id_for_plain_reads() {
        let (_, registry) = setup().await;
        registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG)]).await.unwrap();

        let method = RegistryMethod::from_name("decimals").unwrap();
        let err = registry.call_method(LINK, USD, method, Some(U256::from(1))).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(msg) if msg.contains("takes no round id")));

        let answer = registry.call_method(LINK, USD, method, None).await.unwrap();
        assert_eq!(answer, OracleAnswer::Decimals(8));
    }

    #[tokio::test]
    async fn test_assign_feeds_returns_written_assignments() {
        let (_, registry) = setup().await;
        let written = registry
            .assign_feeds(
                ADMIN,
                vec![FeedInput::new(LINK, USD, PROXY), FeedInput::new(USD, LINK, Address::ZERO)],
            )
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0].feed, PROXY);
        assert!(written[0].is_proxy);
        assert_eq!(written[1], FeedAssignment::unset(USD, LINK));
    }

    #[tokio::test]
    async fn test_call_method_rejects_oversized_round_id() {
        let (_, registry) = setup().await;
        registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG)]).await.unwrap();

        let method = RegistryMethod::from_name("getRoundData").unwrap();
        let err = registry.call_method(LINK, USD, method, Some(U256::MAX)).await.unwrap_err();
        assert!(matches!(err, AppError::NumericOverflow(_)));
    }

    #[tokio::test]
    async fn test_latest_price() {
        let (_, registry) = setup().await;
        registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, PROXY)]).await.unwrap();

        let quote = registry.latest_price(LINK, USD).await.unwrap();
        assert_eq!(quote.price, "15");
        assert_eq!(quote.decimals, 8);
        assert_eq!(quote.aggregator, format!("{AGG:?}"));
    }

    #[tokio::test]
    async fn test_latest_price_rejects_negative_answer() {
        let (oracle, registry) = setup().await;
        oracle.push_answer(AGG, -1, 200).await.unwrap();
        registry.assign_feeds(ADMIN, vec![FeedInput::new(LINK, USD, AGG)]).await.unwrap();

        let err = registry.latest_price(LINK, USD).await.unwrap_err();
        assert!(matches!(err, AppError::PriceOracle(_)));
    }
}
