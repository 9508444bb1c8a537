//! Events emitted by registry writes.

use alloy::{
    primitives::{Address, LogData, U256},
    sol_types::SolEvent,
};

use crate::{ethereum::contracts::IFeedRegistry, registry::Role, types::FeedInput};

/// A state change recorded by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// One per `assign_feeds` call, carrying every entry of the batch.
    FeedsModified { feeds: Vec<FeedInput> },
    DustSent { recipient: Address, token: Address, amount: U256 },
    RoleGranted { role: Role, account: Address, sender: Address },
    RoleRevoked { role: Role, account: Address, sender: Address },
}

impl RegistryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::FeedsModified { .. } => "FeedsModified",
            RegistryEvent::DustSent { .. } => "DustSent",
            RegistryEvent::RoleGranted { .. } => "RoleGranted",
            RegistryEvent::RoleRevoked { .. } => "RoleRevoked",
        }
    }

    /// ABI-encoded log for events declared in the registry interface.
    pub fn log_data(&self) -> Option<LogData> {
        match self {
            RegistryEvent::FeedsModified { feeds } => {
                let event = IFeedRegistry::FeedsModified {
                    feeds: feeds.iter().copied().map(Into::into).collect(),
                };
                Some(event.encode_log_data())
            }
            _ => None,
        }
    }
}
