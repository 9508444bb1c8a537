//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;

use alloy::primitives::Address;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Account holding the super admin role at construction.
    pub super_admin: Address,
    /// Accounts holding the admin role at construction.
    pub admins: Vec<Address>,
    /// Caller identity used for write tools.
    pub operator: Address,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ETHEREUM_RPC_URL`: Ethereum JSON-RPC endpoint
    /// - `REGISTRY_SUPER_ADMIN`: super admin address
    ///
    /// Optional environment variables:
    /// - `REGISTRY_ADMINS`: comma-separated admin addresses
    /// - `REGISTRY_OPERATOR`: caller for write tools (default: first admin, else super admin)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let rpc_url = env::var("ETHEREUM_RPC_URL").map_err(|_| {
            AppError::Config("ETHEREUM_RPC_URL environment variable not set".into())
        })?;

        let super_admin = env::var("REGISTRY_SUPER_ADMIN").map_err(|_| {
            AppError::Config("REGISTRY_SUPER_ADMIN environment variable not set".into())
        })?;
        let super_admin = parse_config_address("REGISTRY_SUPER_ADMIN", &super_admin)?;

        let admins = match env::var("REGISTRY_ADMINS") {
            Ok(raw) => parse_address_list(&raw)?,
            Err(_) => Vec::new(),
        };

        let operator = match env::var("REGISTRY_OPERATOR") {
            Ok(raw) => parse_config_address("REGISTRY_OPERATOR", &raw)?,
            Err(_) => default_operator(super_admin, &admins),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self { rpc_url, super_admin, admins, operator, log_level })
    }
}

/// First configured admin, falling back to the super admin.
fn default_operator(super_admin: Address, admins: &[Address]) -> Address {
    admins.first().copied().unwrap_or(super_admin)
}

fn parse_config_address(name: &str, raw: &str) -> Result<Address, AppError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| AppError::Config(format!("{name} is not a valid address '{raw}': {e}")))
}

/// Parse a comma-separated address list, ignoring empty segments.
pub fn parse_address_list(raw: &str) -> Result<Vec<Address>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_config_address("REGISTRY_ADMINS", s))
        .collect()
}
