//! One batch of dependency changes for one target.
//!
//! Produced by the external evaluation/subscription component; the engine
//! only consumes these. A batch carries an ordered list of added-or-updated
//! raw records and an ordered list of removal keys. Adds and removes are
//! applied sequentially in the order supplied, which is what makes filter
//! side effects deterministic.

use serde::{Deserialize, Serialize};

use crate::model::DependencyRecord;

/// Key identifying a dependency to remove: the provider type plus the
/// original (unnormalized) item specifier it was added under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalKey {
    /// Provider type tag of the dependency to remove.
    pub provider_type: String,
    /// Original item specifier of the dependency to remove.
    pub item_specifier: String,
}

/// An ordered batch of additions/updates and removals for one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyChanges {
    added: Vec<DependencyRecord>,
    removed: Vec<RemovalKey>,
}

impl DependencyChanges {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an added-or-updated record.
    #[must_use]
    pub fn add(mut self, record: DependencyRecord) -> Self {
        self.added.push(record);
        self
    }

    /// Append a removal key.
    #[must_use]
    pub fn remove(
        mut self,
        provider_type: impl Into<String>,
        item_specifier: impl Into<String>,
    ) -> Self {
        self.removed.push(RemovalKey {
            provider_type: provider_type.into(),
            item_specifier: item_specifier.into(),
        });
        self
    }

    /// The added-or-updated records, in order.
    #[must_use]
    pub fn added(&self) -> &[DependencyRecord] {
        &self.added
    }

    /// The removal keys, in order.
    #[must_use]
    pub fn removed(&self) -> &[RemovalKey] {
        &self.removed
    }

    /// Whether the batch carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
