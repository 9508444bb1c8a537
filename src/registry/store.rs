//! Feed assignment storage.

use std::collections::HashMap;

use alloy::primitives::Address;

use crate::types::{FeedAssignment, FeedRecord};

type PairKey = (Address, Address);

/// Mapping from (base, quote) to the assigned feed record.
///
/// `(base, quote)` and `(quote, base)` are distinct keys.
#[derive(Debug, Clone, Default)]
pub struct FeedStore {
    records: HashMap<PairKey, FeedRecord>,
}

impl FeedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record for a pair.
    pub fn get(&self, base: Address, quote: Address) -> Option<&FeedRecord> {
        self.records.get(&(base, quote))
    }

    /// Read view for a pair; the zero record when unset.
    pub fn assignment(&self, base: Address, quote: Address) -> FeedAssignment {
        FeedAssignment::from_record(base, quote, self.get(base, quote))
    }

    /// Number of assigned pairs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start staging changes. Nothing is written until [`FeedTransaction::commit`].
    pub fn begin(&mut self) -> FeedTransaction<'_> {
        FeedTransaction { store: self, staged: Vec::new() }
    }
}

/// Staged writes against a [`FeedStore`]; dropping it discards them.
#[must_use = "staged feed changes are discarded unless committed"]
pub struct FeedTransaction<'a> {
    store: &'a mut FeedStore,
    staged: Vec<(PairKey, Option<FeedRecord>)>,
}

impl FeedTransaction<'_> {
    /// Stage an overwrite, or a removal when `record` is `None`.
    pub fn stage(&mut self, base: Address, quote: Address, record: Option<FeedRecord>) {
        self.staged.push(((base, quote), record));
    }

    /// Number of staged changes.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Apply staged changes in order; later entries for a pair win.
    pub fn commit(self) -> usize {
        let applied = self.staged.len();
        for (key, record) in self.staged {
            match record {
                Some(record) => {
                    self.store.records.insert(key, record);
                }
                None => {
                    self.store.records.remove(&key);
                }
            }
        }
        applied
    }
}
