//! Ethereum interaction module.
//!
//! Contains the Ethereum client, contract bindings and aggregator readers.

pub mod aggregator;
pub mod client;
pub mod constants;
pub mod contracts;
pub mod memory;

pub use aggregator::{AggregatorReader, RpcAggregatorReader};
pub use client::{EthereumClient, HttpProvider};
pub use memory::{InMemoryAggregators, SimulatedAggregator};
