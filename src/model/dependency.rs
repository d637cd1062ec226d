//! Raw dependency records and the normalized dependency entity.
//!
//! Providers hand the engine [`DependencyRecord`] values describing what
//! project evaluation produced. [`Dependency::from_record`] normalizes a
//! record into the immutable [`Dependency`] entity the world map stores:
//! computing the canonical id, settling the resolved/unresolved tag set,
//! stripping removability from implicit references, and defaulting display
//! strings.
//!
//! Dependencies are never mutated after construction. Filters derive
//! modified copies through the `to_*`/`with_*` helpers, which keep the tag
//! exclusivity invariant intact.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::SnapshotError;

use super::icons::{IconMoniker, IconSet};
use super::identifier::{DependencyId, Target};
use super::tags::DependencyTags;

/// Raw dependency description supplied by an upstream provider.
///
/// Immutable once constructed; carries no identity beyond its fields. Use
/// the fluent setters to fill in the optional pieces:
///
/// ```
/// use depsnap::model::{DependencyRecord, DependencyTags};
///
/// let record = DependencyRecord::new("package", "Newtonsoft.Json")
///     .resolved(true)
///     .with_caption("Newtonsoft.Json")
///     .with_tags(DependencyTags::SUPPORTS_REMOVE);
/// assert!(record.resolved);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Tag identifying the originating provider subsystem.
    pub provider_type: String,
    /// Provider-relative item specifier (unescaped path or name).
    pub item_specifier: String,
    /// Path the reference resolved to, when evaluation matched an artifact.
    pub resolved_path: Option<String>,
    /// Whether the reference was matched to an actual artifact.
    pub resolved: bool,
    /// Whether tooling inferred this reference rather than the user
    /// declaring it.
    pub implicit: bool,
    /// Whether the dependency is declared directly by the project.
    pub top_level: bool,
    /// Whether the dependency participates in tree rendering.
    pub visible: bool,
    /// Display caption; defaults to the item specifier.
    pub caption: Option<String>,
    /// Logical name; defaults to the item specifier.
    pub name: Option<String>,
    /// Sort-ordering hint among siblings.
    pub priority: i32,
    /// Additional semantic tags beyond the generic resolved/unresolved set.
    pub tags: DependencyTags,
    /// Explicit icon set; defaults to [`IconSet::generic`].
    pub icon_set: Option<Arc<IconSet>>,
    /// Fully qualified child dependency ids.
    pub dependency_ids: Vec<DependencyId>,
    /// String-keyed property bag forwarded to the host.
    pub properties: BTreeMap<String, String>,
}

impl DependencyRecord {
    /// Create a record with the required fields; everything else defaults
    /// to an unresolved, visible, top-level dependency with no extra tags.
    pub fn new(provider_type: impl Into<String>, item_specifier: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            item_specifier: item_specifier.into(),
            resolved_path: None,
            resolved: false,
            implicit: false,
            top_level: true,
            visible: true,
            caption: None,
            name: None,
            priority: 0,
            tags: DependencyTags::empty(),
            icon_set: None,
            dependency_ids: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the resolved flag.
    #[must_use]
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    /// Set the implicit flag.
    #[must_use]
    pub fn implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    /// Set whether the dependency is directly declared by the project.
    #[must_use]
    pub fn top_level(mut self, top_level: bool) -> Self {
        self.top_level = top_level;
        self
    }

    /// Set tree visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the resolved artifact path.
    #[must_use]
    pub fn with_resolved_path(mut self, path: impl Into<String>) -> Self {
        self.resolved_path = Some(path.into());
        self
    }

    /// Set the display caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the logical name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the sibling sort priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Union in additional semantic tags.
    #[must_use]
    pub fn with_tags(mut self, tags: DependencyTags) -> Self {
        self.tags |= tags;
        self
    }

    /// Set an explicit icon set.
    #[must_use]
    pub fn with_icon_set(mut self, icon_set: Arc<IconSet>) -> Self {
        self.icon_set = Some(icon_set);
        self
    }

    /// Set the child dependency ids.
    #[must_use]
    pub fn with_dependency_ids(mut self, ids: Vec<DependencyId>) -> Self {
        self.dependency_ids = ids;
        self
    }

    /// Add one property-bag entry.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// The normalized unit of the dependency graph.
///
/// Identity-equal to another dependency iff `provider_type` and `id` match
/// case-insensitively; the id stays stable across updates of the same
/// logical dependency and is the diffing key for incremental snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Canonical identifier, `target\provider\normalized(item_specifier)`.
    pub id: DependencyId,
    /// Originating provider subsystem.
    pub provider_type: String,
    /// Display caption.
    pub caption: String,
    /// Logical name, used for cross-provider correlation (e.g. SDK/package).
    pub name: String,
    /// Item specifier exactly as the provider supplied it.
    pub original_item_specifier: String,
    /// Resolved path when available, otherwise the item specifier.
    pub path: String,
    /// Absolute artifact path, when the reference resolved.
    pub full_path: Option<String>,
    /// Whether the reference was matched to an artifact.
    pub resolved: bool,
    /// Whether the dependency is declared directly by the project.
    pub top_level: bool,
    /// Whether tooling inferred this reference.
    pub implicit: bool,
    /// Whether the dependency participates in tree rendering.
    pub visible: bool,
    /// Sort-ordering hint among siblings.
    pub priority: i32,
    /// Semantic tag bitset; carries exactly one of the resolved/unresolved
    /// generic sets.
    pub tags: DependencyTags,
    /// Interned icon set.
    pub icon_set: Arc<IconSet>,
    /// Fully qualified child dependency ids, defining the graph's edges.
    /// Dangling entries are tolerated and skipped during traversal.
    pub dependency_ids: Vec<DependencyId>,
    /// The build target this dependency belongs to.
    pub target: Target,
    /// String-keyed property bag forwarded to the host.
    pub properties: BTreeMap<String, String>,
}

impl Dependency {
    /// Normalize a raw record into a dependency for `target`.
    ///
    /// Pure construction; the only failure paths are the empty provider
    /// type / empty item specifier preconditions.
    pub fn from_record(record: DependencyRecord, target: &Target) -> Result<Self, SnapshotError> {
        if record.provider_type.trim().is_empty() {
            return Err(SnapshotError::EmptyProviderType);
        }
        if record.item_specifier.trim().is_empty() {
            return Err(SnapshotError::EmptyItemSpecifier {
                provider_type: record.provider_type,
            });
        }

        let id = DependencyId::new(target, &record.provider_type, &record.item_specifier);
        let mut tags = record.tags.with_resolution(record.resolved);
        if record.implicit {
            // Implicit references are tool-owned; the user cannot remove them.
            tags -= DependencyTags::SUPPORTS_REMOVE;
        }

        let caption = record
            .caption
            .unwrap_or_else(|| record.item_specifier.clone());
        let name = record.name.unwrap_or_else(|| record.item_specifier.clone());
        let path = record
            .resolved_path
            .clone()
            .unwrap_or_else(|| record.item_specifier.clone());

        Ok(Self {
            id,
            provider_type: record.provider_type,
            caption,
            name,
            original_item_specifier: record.item_specifier,
            path,
            full_path: record.resolved_path,
            resolved: record.resolved,
            top_level: record.top_level,
            implicit: record.implicit,
            visible: record.visible,
            priority: record.priority,
            tags,
            icon_set: record.icon_set.unwrap_or_else(IconSet::generic),
            dependency_ids: record.dependency_ids,
            target: target.clone(),
            properties: record.properties,
        })
    }

    /// Whether this dependency is the entity identified by
    /// `(provider_type, id)`, compared case-insensitively.
    #[must_use]
    pub fn matches(&self, provider_type: &str, id: &DependencyId) -> bool {
        self.provider_type.eq_ignore_ascii_case(provider_type) && self.id == *id
    }

    /// Whether this dependency originates from the given provider type.
    #[must_use]
    pub fn is_provider(&self, provider_type: &str) -> bool {
        self.provider_type.eq_ignore_ascii_case(provider_type)
    }

    /// Derive a resolved copy carrying the given children.
    #[must_use]
    pub fn to_resolved(&self, dependency_ids: Vec<DependencyId>) -> Self {
        let mut next = self.clone();
        next.resolved = true;
        next.tags = next.tags.with_resolution(true);
        next.dependency_ids = dependency_ids;
        next
    }

    /// Derive an unresolved copy carrying the given children.
    #[must_use]
    pub fn to_unresolved(&self, dependency_ids: Vec<DependencyId>) -> Self {
        let mut next = self.clone();
        next.resolved = false;
        next.tags = next.tags.with_resolution(false);
        next.dependency_ids = dependency_ids;
        next
    }

    /// Derive a copy with a different caption.
    #[must_use]
    pub fn with_caption(&self, caption: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.caption = caption.into();
        next
    }

    /// Derive an implicit copy: marked implicit, no longer removable, with
    /// the provider's implicit icon pairing while the unresolved pairing is
    /// preserved unchanged.
    #[must_use]
    pub fn to_implicit(&self, icon: IconMoniker, expanded_icon: IconMoniker) -> Self {
        let mut next = self.clone();
        next.implicit = true;
        next.tags -= DependencyTags::SUPPORTS_REMOVE;
        next.icon_set = IconSet::interned(
            icon,
            expanded_icon,
            self.icon_set.unresolved_icon.clone(),
            self.icon_set.unresolved_expanded_icon.clone(),
        );
        next
    }

    /// The caption alias applied when two siblings collide:
    /// `"{caption} ({item_specifier})"`.
    #[must_use]
    pub fn alias(caption: &str, original_item_specifier: &str) -> String {
        format!("{caption} ({original_item_specifier})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("net8.0")
    }

    #[test]
    fn test_from_record_defaults() {
        let dep = Dependency::from_record(DependencyRecord::new("package", "Foo.Bar"), &target())
            .unwrap();

        assert_eq!(dep.id.as_str(), "net8.0\\package\\Foo.Bar");
        assert_eq!(dep.caption, "Foo.Bar");
        assert_eq!(dep.name, "Foo.Bar");
        assert_eq!(dep.path, "Foo.Bar");
        assert_eq!(dep.full_path, None);
        assert!(!dep.resolved);
        assert!(dep.top_level);
        assert!(dep.visible);
        assert!(dep.tags.contains(DependencyTags::GENERIC_UNRESOLVED));
        assert!(dep.tags.has_consistent_resolution());
    }

    #[test]
    fn test_from_record_resolved_tags() {
        let record = DependencyRecord::new("package", "Foo")
            .resolved(true)
            .with_resolved_path("/nuget/foo/1.0/foo.dll");
        let dep = Dependency::from_record(record, &target()).unwrap();

        assert!(dep.resolved);
        assert!(dep.tags.contains(DependencyTags::GENERIC_RESOLVED));
        assert!(!dep.tags.contains(DependencyTags::UNRESOLVED));
        assert_eq!(dep.path, "/nuget/foo/1.0/foo.dll");
        assert_eq!(dep.full_path.as_deref(), Some("/nuget/foo/1.0/foo.dll"));
    }

    #[test]
    fn test_implicit_strips_supports_remove() {
        let record = DependencyRecord::new("package", "Foo")
            .resolved(true)
            .implicit(true)
            .with_tags(DependencyTags::SUPPORTS_REMOVE);
        let dep = Dependency::from_record(record, &target()).unwrap();

        assert!(dep.implicit);
        assert!(!dep.tags.contains(DependencyTags::SUPPORTS_REMOVE));
    }

    #[test]
    fn test_empty_provider_type_rejected() {
        let err =
            Dependency::from_record(DependencyRecord::new("  ", "Foo"), &target()).unwrap_err();
        assert_eq!(err, SnapshotError::EmptyProviderType);
    }

    #[test]
    fn test_empty_item_specifier_rejected() {
        let err =
            Dependency::from_record(DependencyRecord::new("package", ""), &target()).unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyItemSpecifier { .. }));
    }

    #[test]
    fn test_resolution_transitions_preserve_unrelated_tags() {
        let record = DependencyRecord::new("sdk", "My.Sdk")
            .resolved(true)
            .with_tags(DependencyTags::SUPPORTS_REMOVE);
        let dep = Dependency::from_record(record, &target()).unwrap();

        let down = dep.to_unresolved(Vec::new());
        assert!(!down.resolved);
        assert!(down.tags.contains(DependencyTags::UNRESOLVED));
        assert!(down.tags.contains(DependencyTags::SUPPORTS_REMOVE));
        assert!(down.dependency_ids.is_empty());

        let children = vec![DependencyId::from("net8.0\\package\\Child")];
        let up = down.to_resolved(children.clone());
        assert!(up.resolved);
        assert_eq!(up.dependency_ids, children);
        assert!(up.tags.has_consistent_resolution());
    }

    #[test]
    fn test_to_implicit_preserves_unresolved_icons() {
        let dep = Dependency::from_record(
            DependencyRecord::new("package", "Foo").resolved(true),
            &target(),
        )
        .unwrap();
        let before = dep.icon_set.clone();

        let implicit = dep.to_implicit(
            IconMoniker::from("package-private"),
            IconMoniker::from("package-private"),
        );

        assert!(implicit.implicit);
        assert_eq!(implicit.icon_set.icon.name(), "package-private");
        assert_eq!(implicit.icon_set.unresolved_icon, before.unresolved_icon);
        assert_eq!(
            implicit.icon_set.unresolved_expanded_icon,
            before.unresolved_expanded_icon
        );
    }

    #[test]
    fn test_alias_format() {
        assert_eq!(
            Dependency::alias("Helpers", "lib/helpers.csproj"),
            "Helpers (lib/helpers.csproj)"
        );
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let dep =
            Dependency::from_record(DependencyRecord::new("Package", "Foo"), &target()).unwrap();
        let id = DependencyId::new(&Target::new("NET8.0"), "package", "foo");
        assert!(dep.matches("PACKAGE", &id));
        assert!(!dep.matches("project", &id));
    }
}
