//! Chainlink Feed Registry Library
//!
//! A registry resolving (base, quote) asset pairs to Chainlink price-feed
//! aggregators, served as a Model Context Protocol server.
//!
//! # Features
//!
//! - **Feed assignment**: Admin-managed (base, quote) → feed mapping with
//!   proxy detection at assignment time
//! - **Resolution**: Proxy feeds resolve to their underlying aggregator
//! - **Redirected reads**: Aggregator reads forwarded per pair; legacy
//!   phase/proposal methods are rejected
//! - **Dust**: Admins can sweep stray tokens held by the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chainlink_feed_registry::{FeedRegistry, InMemoryAggregators, SimulatedAggregator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let oracle = Arc::new(InMemoryAggregators::new());
//!     oracle.insert_aggregator(feed, SimulatedAggregator::new("LINK / USD", 8)).await;
//!     let registry = FeedRegistry::new(oracle, super_admin, &[admin])?;
//!     registry.assign_feeds(admin, vec![FeedInput::new(link, usd, feed)]).await?;
//!     let decimals = registry.decimals(link, usd).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod mcp;
pub mod registry;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use ethereum::{AggregatorReader, InMemoryAggregators, RpcAggregatorReader, SimulatedAggregator};
pub use mcp::FeedRegistryServer;
pub use registry::{FeedRegistry, LegacyMethod, RegistryEvent, RegistryMethod, Role};
pub use types::{FeedAssignment, FeedInput, OracleAnswer, OracleMethod, OracleQuery, RoundData};
