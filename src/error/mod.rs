//! Error types and handling module.
//!
//! Defines the registry's failure taxonomy alongside the ambient
//! configuration, RPC and parsing errors.

use alloy::primitives::{Address, U256};
use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::registry::Role;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A real address or asset was required but the zero address was supplied.
    #[error("Zero address supplied where an address is required")]
    ZeroAddress,

    /// Caller lacks the role required by the operation.
    #[error("Unauthorized: {account} is missing role {role}")]
    Unauthorized { account: Address, role: Role },

    /// Resolution attempted against an unset assignment.
    #[error("Feed not found for pair {base}/{quote}")]
    FeedNotFound { base: Address, quote: Address },

    /// Legacy phase/proposal method that the registry does not emulate.
    #[error("Function not supported: {0}")]
    FunctionNotSupported(String),

    /// Registry holds less of a token than requested.
    #[error("Insufficient balance of {token}: requested {requested}, available {available}")]
    InsufficientBalance { token: Address, requested: U256, available: U256 },

    /// Calldata did not match the registry interface.
    #[error("Invalid calldata: {0}")]
    InvalidCalldata(String),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ethereum RPC errors.
    #[error("Ethereum RPC error: {0}")]
    Rpc(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Price oracle failure (e.g., negative or missing answer).
    #[error("Price oracle error: {0}")]
    PriceOracle(String),

    /// Numeric overflow during conversion.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<alloy::sol_types::Error> for AppError {
    fn from(err: alloy::sol_types::Error) -> Self {
        AppError::InvalidCalldata(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ZeroAddress
            | AppError::FeedNotFound { .. }
            | AppError::FunctionNotSupported(_)
            | AppError::InvalidCalldata(_)
            | AppError::Parse(_)
            | AppError::NumericOverflow(_) => McpError::invalid_params(err.to_string(), None),
            AppError::Unauthorized { .. } | AppError::Config(_) => {
                McpError::invalid_request(err.to_string(), None)
            }
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
