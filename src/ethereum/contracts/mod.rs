//! Smart contract bindings.

pub mod chainlink;

pub use chainlink::{IAggregatorProxy, IAggregatorV2V3, IFeedRegistry};
