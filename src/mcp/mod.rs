//! MCP server module.
//!
//! Exposes the feed registry as MCP tools.

pub mod server;

pub use server::FeedRegistryServer;
pub use server::{
    AssignFeedsInput, DepositDustInput, FeedEntryInput, HasRoleInput, PairInput, QueryFeedInput,
    SendDustInput,
};
