//! Semantic tags carried by dependencies.
//!
//! Tags are a small bitset unioned and excepted by filters as a dependency
//! moves between states. The engine maintains one hard invariant: a published
//! dependency carries exactly one of [`DependencyTags::RESOLVED`] and
//! [`DependencyTags::UNRESOLVED`], never both. State transitions therefore go
//! through [`DependencyTags::with_resolution`], which swaps the whole generic
//! set atomically instead of toggling individual bits.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Semantic flags governing tree shape and resolution behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DependencyTags: u16 {
        /// The reference was matched to an actual artifact at evaluation time.
        const RESOLVED = 1 << 0;
        /// The reference could not be matched to an artifact.
        const UNRESOLVED = 1 << 1;
        /// A plain dependency node, eligible for generic filter policies.
        const GENERIC_DEPENDENCY = 1 << 2;
        /// The user may remove this dependency from the project.
        const SUPPORTS_REMOVE = 1 << 3;
        /// The host may surface rule-based property pages for this node.
        const SUPPORTS_RULE_PROPERTIES = 1 << 4;
        /// The node represents a diagnostic rather than a real reference.
        const DIAGNOSTIC = 1 << 5;
        /// The node references a shared project, exempt from implicit marking.
        const SHARED_PROJECT = 1 << 6;
    }
}

impl DependencyTags {
    /// Tag set every resolved generic dependency carries.
    pub const GENERIC_RESOLVED: Self = Self::RESOLVED
        .union(Self::GENERIC_DEPENDENCY)
        .union(Self::SUPPORTS_RULE_PROPERTIES);

    /// Tag set every unresolved generic dependency carries.
    pub const GENERIC_UNRESOLVED: Self = Self::UNRESOLVED.union(Self::GENERIC_DEPENDENCY);

    /// Swap the resolution-state tag set, preserving all unrelated tags.
    ///
    /// Removes both generic sets and unions in the one matching `resolved`,
    /// which keeps the resolved/unresolved exclusivity invariant regardless
    /// of the starting state.
    #[must_use]
    pub fn with_resolution(self, resolved: bool) -> Self {
        let cleared = self
            .difference(Self::GENERIC_RESOLVED)
            .difference(Self::GENERIC_UNRESOLVED);
        if resolved {
            cleared | Self::GENERIC_RESOLVED
        } else {
            cleared | Self::GENERIC_UNRESOLVED
        }
    }

    /// Whether exactly one of the resolved/unresolved tags is present.
    #[must_use]
    pub fn has_consistent_resolution(self) -> bool {
        self.contains(Self::RESOLVED) != self.contains(Self::UNRESOLVED)
    }
}
