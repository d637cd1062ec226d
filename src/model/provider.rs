//! Provider descriptors and the catalog the filter pipeline consults.
//!
//! Each dependency originates from a provider subsystem identified by a
//! string tag ("package", "project", "sdk", ...). The engine itself treats
//! provider types as opaque, case-insensitive strings; the catalog supplies
//! the small amount of per-provider metadata the filters need, chiefly the
//! icon pairing applied when a dependency is marked implicit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::icons::IconMoniker;

/// Well-known provider type tags.
pub mod provider_types {
    /// NuGet package references.
    pub const PACKAGE: &str = "package";
    /// Project-to-project references.
    pub const PROJECT: &str = "project";
    /// SDK references.
    pub const SDK: &str = "sdk";
    /// Raw assembly references.
    pub const ASSEMBLY: &str = "assembly";
    /// Analyzer references.
    pub const ANALYZER: &str = "analyzer";
    /// COM component references.
    pub const COM: &str = "com";
}

/// Metadata registered for one provider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// The provider's type tag.
    pub provider_type: String,
    /// Caption of the provider's generic root node (rendering is handled
    /// elsewhere; the engine only carries the text).
    pub root_caption: String,
    /// Collapsed icon applied when a dependency of this provider is
    /// marked implicit.
    pub implicit_icon: IconMoniker,
    /// Expanded icon applied when a dependency of this provider is
    /// marked implicit.
    pub implicit_expanded_icon: IconMoniker,
}

impl ProviderDescriptor {
    /// Create a descriptor with the conventional `{type}-private` implicit
    /// icon pairing.
    pub fn new(provider_type: impl Into<String>, root_caption: impl Into<String>) -> Self {
        let provider_type = provider_type.into();
        let implicit = IconMoniker::new(format!("{provider_type}-private"));
        Self {
            provider_type,
            root_caption: root_caption.into(),
            implicit_icon: implicit.clone(),
            implicit_expanded_icon: implicit,
        }
    }

    /// Override the implicit icon pairing.
    #[must_use]
    pub fn with_implicit_icons(mut self, icon: IconMoniker, expanded_icon: IconMoniker) -> Self {
        self.implicit_icon = icon;
        self.implicit_expanded_icon = expanded_icon;
        self
    }
}

/// Lookup from provider type tag to its registered descriptor.
///
/// Injected into [`from_changes`](crate::snapshot::TargetedDependenciesSnapshot::from_changes)
/// and exposed to filters through the add context. Lookups are
/// case-insensitive.
pub trait ProviderCatalog {
    /// The descriptor registered for `provider_type`, if any.
    fn descriptor(&self, provider_type: &str) -> Option<&ProviderDescriptor>;
}

/// Map-backed [`ProviderCatalog`].
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    by_type: HashMap<String, ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous registration for the
    /// same type tag.
    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        self.by_type
            .insert(descriptor.provider_type.to_ascii_lowercase(), descriptor);
    }

    /// Fluent form of [`register`](Self::register).
    #[must_use]
    pub fn with_provider(mut self, descriptor: ProviderDescriptor) -> Self {
        self.register(descriptor);
        self
    }
}

impl ProviderCatalog for ProviderRegistry {
    fn descriptor(&self, provider_type: &str) -> Option<&ProviderDescriptor> {
        self.by_type.get(&provider_type.to_ascii_lowercase())
    }
}
