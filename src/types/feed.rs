//! Feed assignment types.

use alloy::primitives::Address;

use crate::ethereum::contracts::IFeedRegistry::FeedParams;

/// A requested change to one (base, quote) pair.
///
/// `feed == Address::ZERO` removes the pair's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedInput {
    /// Base asset.
    pub base: Address,
    /// Quote asset.
    pub quote: Address,
    /// Oracle contract to assign, or zero to remove.
    pub feed: Address,
}

impl FeedInput {
    /// Create a new feed input.
    pub fn new(base: Address, quote: Address, feed: Address) -> Self {
        Self { base, quote, feed }
    }

    /// Whether this entry clears the pair instead of assigning a feed.
    pub fn is_removal(&self) -> bool {
        self.feed == Address::ZERO
    }
}

impl From<FeedParams> for FeedInput {
    fn from(params: FeedParams) -> Self {
        Self { base: params.base, quote: params.quote, feed: params.feed }
    }
}

impl From<FeedInput> for FeedParams {
    fn from(input: FeedInput) -> Self {
        FeedParams { base: input.base, quote: input.quote, feed: input.feed }
    }
}

/// Stored classification of an assigned feed.
///
/// Computed once at assignment time by probing the feed for `aggregator()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRecord {
    /// Feed answers queries itself.
    Direct(Address),
    /// Feed forwards to an underlying aggregator it reports via `aggregator()`.
    Proxy(Address),
}

impl FeedRecord {
    /// The stored feed address.
    pub fn address(&self) -> Address {
        match self {
            FeedRecord::Direct(addr) | FeedRecord::Proxy(addr) => *addr,
        }
    }

    /// Whether the feed was classified as a proxy.
    pub fn is_proxy(&self) -> bool {
        matches!(self, FeedRecord::Proxy(_))
    }
}

/// Read view of the stored record for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedAssignment {
    /// Base asset.
    pub base: Address,
    /// Quote asset.
    pub quote: Address,
    /// Stored feed, zero if unset.
    pub feed: Address,
    /// Stored proxy classification.
    pub is_proxy: bool,
}

impl FeedAssignment {
    /// Zero-valued record returned for unset pairs.
    pub fn unset(base: Address, quote: Address) -> Self {
        Self { base, quote, feed: Address::ZERO, is_proxy: false }
    }

    /// Build the view from an optional stored record.
    pub fn from_record(base: Address, quote: Address, record: Option<&FeedRecord>) -> Self {
        match record {
            Some(record) => {
                Self { base, quote, feed: record.address(), is_proxy: record.is_proxy() }
            }
            None => Self::unset(base, quote),
        }
    }

    /// Whether a feed is assigned.
    pub fn is_set(&self) -> bool {
        self.feed != Address::ZERO
    }
}
