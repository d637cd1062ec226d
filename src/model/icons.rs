//! Icon monikers and the interned icon-set cache.
//!
//! A dependency tree typically shows thousands of nodes drawn from a handful
//! of icon combinations. [`IconSet::interned`] memoizes every structurally
//! distinct combination in a process-wide cache so all dependencies sharing a
//! combination share one allocation, instead of each carrying four owned
//! strings.

use std::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Process-wide cache of interned icon sets, keyed by value.
static ICON_SET_CACHE: LazyLock<DashMap<IconSet, Arc<IconSet>>> = LazyLock::new(DashMap::new);

/// Name of an icon known to the host's image catalog.
///
/// The engine never renders icons; monikers are opaque identifiers handed
/// back to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconMoniker(Arc<str>);

impl IconMoniker {
    /// Create a moniker from an icon name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The icon name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconMoniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IconMoniker {
    fn from(name: &str) -> Self {
        Self::new(name.to_string())
    }
}

/// The four icons a dependency node can display: its regular and expanded
/// forms, and the pair shown while the dependency is unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconSet {
    /// Icon for the collapsed, resolved node.
    pub icon: IconMoniker,
    /// Icon for the expanded, resolved node.
    pub expanded_icon: IconMoniker,
    /// Icon for the collapsed, unresolved node.
    pub unresolved_icon: IconMoniker,
    /// Icon for the expanded, unresolved node.
    pub unresolved_expanded_icon: IconMoniker,
}

impl IconSet {
    /// Construct an icon set without interning it.
    pub fn new(
        icon: IconMoniker,
        expanded_icon: IconMoniker,
        unresolved_icon: IconMoniker,
        unresolved_expanded_icon: IconMoniker,
    ) -> Self {
        Self {
            icon,
            expanded_icon,
            unresolved_icon,
            unresolved_expanded_icon,
        }
    }

    /// Return the shared instance for this combination, interning it on
    /// first use. Structurally identical sets always come back as the same
    /// `Arc`, so equality checks between dependencies can short-circuit on
    /// pointer identity.
    pub fn interned(
        icon: IconMoniker,
        expanded_icon: IconMoniker,
        unresolved_icon: IconMoniker,
        unresolved_expanded_icon: IconMoniker,
    ) -> Arc<Self> {
        let set = Self::new(icon, expanded_icon, unresolved_icon, unresolved_expanded_icon);
        ICON_SET_CACHE
            .entry(set.clone())
            .or_insert_with(|| Arc::new(set))
            .clone()
    }

    /// The default pairing for a generic reference node.
    pub fn generic() -> Arc<Self> {
        Self::interned(
            IconMoniker::from("reference"),
            IconMoniker::from("reference"),
            IconMoniker::from("reference-warning"),
            IconMoniker::from("reference-warning"),
        )
    }

    /// Number of distinct icon sets currently interned.
    #[must_use]
    pub fn cached_count() -> usize {
        ICON_SET_CACHE.len()
    }
}
