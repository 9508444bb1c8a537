//! MCP server implementation.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde_json::json;
use std::str::FromStr;

use crate::{
    config::Config,
    error::AppError,
    ethereum::{constants::denomination, EthereumClient, RpcAggregatorReader},
    registry::{FeedRegistry, RegistryMethod, Role},
    types::FeedInput,
};

/// Chainlink Feed Registry MCP Server.
///
/// Serves feed lookups and redirected aggregator reads, and feed
/// management on behalf of the configured operator account.
#[derive(Clone)]
pub struct FeedRegistryServer {
    registry: Arc<FeedRegistry>,
    operator: Address,
    tool_router: ToolRouter<Self>,
}

impl FeedRegistryServer {
    /// Create a server reading aggregators over the configured RPC endpoint.
    ///
    /// Note: This uses lazy initialization - no network calls are made during
    /// server startup.
    pub fn new(config: Config) -> Result<Self, AppError> {
        tracing::info!("Initializing Chainlink Feed Registry MCP Server");

        let client = Arc::new(EthereumClient::new(&config.rpc_url)?);
        let oracle = Arc::new(RpcAggregatorReader::new(client));
        let registry = FeedRegistry::new(oracle, config.super_admin, &config.admins)?;

        tracing::info!(operator = %config.operator, "Chainlink Feed Registry MCP Server initialized");

        Ok(Self::with_registry(Arc::new(registry), config.operator))
    }

    /// Create a server over an existing registry.
    pub fn with_registry(registry: Arc<FeedRegistry>, operator: Address) -> Self {
        Self { registry, operator, tool_router: Self::tool_router() }
    }

    /// The served registry.
    pub fn registry(&self) -> &Arc<FeedRegistry> {
        &self.registry
    }
}

/// A (base, quote) pair.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct PairInput {
    /// Base asset: address (0x...) or denomination symbol (ETH, BTC, USD, EUR, GBP, JPY).
    pub base: String,
    /// Quote asset: address (0x...) or denomination symbol.
    pub quote: String,
}

/// Input parameters for the query_feed tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct QueryFeedInput {
    /// Base asset: address or denomination symbol.
    pub base: String,
    /// Quote asset: address or denomination symbol.
    pub quote: String,
    /// Aggregator method name (e.g., "latestRoundData", "decimals", "getAnswer").
    pub method: String,
    /// Round id for getRoundData, getAnswer and getTimestamp.
    #[serde(default)]
    pub round_id: Option<String>,
}

/// One entry of an assign_feeds batch.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct FeedEntryInput {
    /// Base asset: address or denomination symbol.
    pub base: String,
    /// Quote asset: address or denomination symbol.
    pub quote: String,
    /// Feed address; the zero address removes the pair.
    pub feed: String,
}

/// Input parameters for the assign_feeds tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct AssignFeedsInput {
    /// Batch of assignments applied atomically.
    pub feeds: Vec<FeedEntryInput>,
}

/// Input parameters for the send_dust tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SendDustInput {
    /// Recipient address.
    pub recipient: String,
    /// Token contract address.
    pub token: String,
    /// Amount in the token's smallest unit.
    pub amount: String,
}

/// Input parameters for the deposit_dust tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct DepositDustInput {
    /// Token contract address.
    pub token: String,
    /// Amount in the token's smallest unit.
    pub amount: String,
}

/// Input parameters for the has_role tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct HasRoleInput {
    /// Role name: "ADMIN" or "SUPER_ADMIN".
    pub role: String,
    /// Account address.
    pub account: String,
}

/// Parse and validate an Ethereum address from a string.
///
/// Validates:
/// - Address format (0x + 40 hex characters)
/// - Basic format checks
fn parse_address(s: &str) -> Result<Address, McpError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(McpError::invalid_params("Address cannot be empty", None));
    }

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(McpError::invalid_params(format!("Address must start with '0x': {}", s), None));
    }

    // 0x + 40 hex chars = 42 total
    if trimmed.len() != 42 {
        return Err(McpError::invalid_params(
            format!(
                "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
                trimmed.len(),
                s
            ),
            None,
        ));
    }

    trimmed.parse::<Address>().map_err(|e| {
        McpError::invalid_params(format!("Invalid address format '{}': {}", s, e), None)
    })
}

/// Parse an asset given either as a denomination symbol or an address.
fn parse_asset(s: &str) -> Result<Address, McpError> {
    match denomination(s.trim()) {
        Some(addr) => Ok(addr),
        None => parse_address(s),
    }
}

fn parse_amount(s: &str, field: &str) -> Result<U256, McpError> {
    U256::from_str(s.trim())
        .map_err(|e| McpError::invalid_params(format!("Invalid {}: '{}': {}", field, s, e), None))
}

fn to_json_string(value: &serde_json::Value) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

#[tool_router]
impl FeedRegistryServer {
    /// Resolve the aggregator answering for a pair.
    #[tool(
        description = "Resolve the aggregator answering for a base/quote pair. For proxy feeds this is the proxy's underlying aggregator."
    )]
    pub async fn get_feed(
        &self,
        Parameters(input): Parameters<PairInput>,
    ) -> Result<String, McpError> {
        tracing::info!(base = %input.base, quote = %input.quote, "get_feed called");

        let base = parse_asset(&input.base)?;
        let quote = parse_asset(&input.quote)?;

        let aggregator = self.registry.get_feed(base, quote).await.map_err(McpError::from)?;

        to_json_string(&json!({
            "base": format!("{base:?}"),
            "quote": format!("{quote:?}"),
            "aggregator": format!("{aggregator:?}"),
        }))
    }

    /// Show the stored assignment for a pair without resolving it.
    #[tool(
        description = "Show the stored feed for a base/quote pair and whether it was classified as a proxy. Unset pairs report the zero address."
    )]
    pub async fn get_assigned_feed(
        &self,
        Parameters(input): Parameters<PairInput>,
    ) -> Result<String, McpError> {
        tracing::info!(base = %input.base, quote = %input.quote, "get_assigned_feed called");

        let base = parse_asset(&input.base)?;
        let quote = parse_asset(&input.quote)?;

        let assignment = self.registry.get_assigned_feed(base, quote).await;

        to_json_string(&json!({
            "base": format!("{:?}", assignment.base),
            "quote": format!("{:?}", assignment.quote),
            "feed": format!("{:?}", assignment.feed),
            "is_proxy": assignment.is_proxy,
        }))
    }

    /// Forward an aggregator read for a pair.
    #[tool(
        description = "Call an aggregator read method (decimals, description, version, latestRoundData, getRoundData, latestAnswer, latestTimestamp, latestRound, getAnswer, getTimestamp) on the feed resolved for a base/quote pair."
    )]
    pub async fn query_feed(
        &self,
        Parameters(input): Parameters<QueryFeedInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            base = %input.base,
            quote = %input.quote,
            method = %input.method,
            round_id = ?input.round_id,
            "query_feed called"
        );

        let method = RegistryMethod::from_name(input.method.trim()).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown method: '{}'", input.method), None)
        })?;
        let base = parse_asset(&input.base)?;
        let quote = parse_asset(&input.quote)?;
        let round_id =
            input.round_id.as_deref().map(|s| parse_amount(s, "round_id")).transpose()?;

        let answer = self
            .registry
            .call_method(base, quote, method, round_id)
            .await
            .map_err(McpError::from)?;

        to_json_string(&json!({
            "method": method.name(),
            "result": answer.to_json(),
        }))
    }

    /// Latest price of a pair scaled by the feed's decimals.
    #[tool(
        description = "Get the latest price for a base/quote pair from its Chainlink feed, scaled by the feed's decimals."
    )]
    pub async fn get_price(
        &self,
        Parameters(input): Parameters<PairInput>,
    ) -> Result<String, McpError> {
        tracing::info!(base = %input.base, quote = %input.quote, "get_price called");

        let base = parse_asset(&input.base)?;
        let quote = parse_asset(&input.quote)?;

        let quote_info = self.registry.latest_price(base, quote).await.map_err(McpError::from)?;

        serde_json::to_string_pretty(&quote_info)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// Assign or remove feeds as the operator.
    #[tool(
        description = "Assign feeds to base/quote pairs as the configured operator (requires ADMIN). Use the zero address as feed to remove a pair. The batch is applied atomically."
    )]
    pub async fn assign_feeds(
        &self,
        Parameters(input): Parameters<AssignFeedsInput>,
    ) -> Result<String, McpError> {
        tracing::info!(entries = input.feeds.len(), operator = %self.operator, "assign_feeds called");

        let feeds = input
            .feeds
            .iter()
            .map(|entry| -> Result<FeedInput, McpError> {
                Ok(FeedInput::new(
                    parse_asset(&entry.base)?,
                    parse_asset(&entry.quote)?,
                    parse_address(&entry.feed)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let written =
            self.registry.assign_feeds(self.operator, feeds).await.map_err(McpError::from)?;

        let assigned: Vec<_> = written
            .iter()
            .map(|assignment| {
                json!({
                    "base": format!("{:?}", assignment.base),
                    "quote": format!("{:?}", assignment.quote),
                    "feed": format!("{:?}", assignment.feed),
                    "is_proxy": assignment.is_proxy,
                })
            })
            .collect();

        to_json_string(&json!({ "event": "FeedsModified", "feeds": assigned }))
    }

    /// Sweep stray tokens held by the registry.
    #[tool(
        description = "Transfer stray tokens held by the registry to a recipient as the configured operator (requires ADMIN)."
    )]
    pub async fn send_dust(
        &self,
        Parameters(input): Parameters<SendDustInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            recipient = %input.recipient,
            token = %input.token,
            amount = %input.amount,
            "send_dust called"
        );

        let recipient = parse_address(&input.recipient)?;
        let token = parse_address(&input.token)?;
        let amount = parse_amount(&input.amount, "amount")?;

        let remaining = self
            .registry
            .send_dust(self.operator, recipient, token, amount)
            .await
            .map_err(McpError::from)?;

        to_json_string(&json!({
            "recipient": format!("{recipient:?}"),
            "token": format!("{token:?}"),
            "amount": amount.to_string(),
            "remaining": remaining.to_string(),
        }))
    }

    /// Record tokens sent to the registry.
    #[tool(
        description = "Record an amount of a token received by the registry, making it available to send_dust."
    )]
    pub async fn deposit_dust(
        &self,
        Parameters(input): Parameters<DepositDustInput>,
    ) -> Result<String, McpError> {
        tracing::info!(token = %input.token, amount = %input.amount, "deposit_dust called");

        let token = parse_address(&input.token)?;
        let amount = parse_amount(&input.amount, "amount")?;

        let balance = self.registry.deposit_dust(token, amount).await.map_err(McpError::from)?;

        to_json_string(&json!({
            "token": format!("{token:?}"),
            "amount": amount.to_string(),
            "balance": balance.to_string(),
        }))
    }

    /// Check role membership.
    #[tool(description = "Check whether an account holds a registry role (ADMIN or SUPER_ADMIN).")]
    pub async fn has_role(
        &self,
        Parameters(input): Parameters<HasRoleInput>,
    ) -> Result<String, McpError> {
        tracing::info!(role = %input.role, account = %input.account, "has_role called");

        let role = input.role.parse::<Role>().map_err(|e| McpError::invalid_params(e, None))?;
        let account = parse_address(&input.account)?;

        to_json_string(&json!({
            "role": role.name(),
            "account": format!("{account:?}"),
            "has_role": self.registry.has_role(role, account).await,
        }))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for FeedRegistryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "chainlink-feed-registry".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Chainlink Feed Registry MCP Server. Resolves base/quote pairs to Chainlink \
                 aggregators, forwards aggregator reads and manages feed assignments."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::constants::{DENOMINATION_ETH, DENOMINATION_USD};

    #[test]
    fn test_parse_address_validation() {
        assert!(parse_address("").is_err());
        assert!(parse_address("1234").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0x514910771AF9Ca656af840dff83E8264EcF986CA").is_ok());
    }

    #[test]
    fn test_parse_asset_accepts_symbols_and_addresses() {
        assert_eq!(parse_asset("usd").unwrap(), DENOMINATION_USD);
        assert_eq!(parse_asset(" ETH ").unwrap(), DENOMINATION_ETH);
        assert!(parse_asset("0x514910771AF9Ca656af840dff83E8264EcF986CA").is_ok());
        assert!(parse_asset("LINK").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000", "amount").unwrap(), U256::from(1000));
        assert!(parse_amount("-1", "amount").is_err());
    }
}
