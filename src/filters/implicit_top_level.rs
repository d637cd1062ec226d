//! Implicit-dependency detection policy.
//!
//! A resolved, top-level dependency whose original item specifier is absent
//! from the project's own item list was synthesized by tooling (an SDK, a
//! props import) rather than declared by the user. Such dependencies are
//! marked implicit: they lose the remove-support tag and take the
//! provider's registered implicit icon pairing, while the unresolved icon
//! pairing stays untouched. Shared-project references are exempt.
//!
//! When the caller supplies no project item specifier set the filter has no
//! basis for a verdict and passes everything through unchanged.

use std::sync::Arc;

use crate::model::{Dependency, DependencyTags};

use super::context::AddDependencyContext;
use super::DependenciesSnapshotFilter;

/// Marks tool-synthesized top-level dependencies implicit.
pub struct ImplicitTopLevelFilter;

fn should_mark(dependency: &Dependency, context: &AddDependencyContext<'_>) -> bool {
    let Some(item_specs) = context.project_item_specifiers() else {
        return false;
    };
    dependency.top_level
        && dependency.resolved
        && !dependency.implicit
        && dependency.tags.contains(DependencyTags::GENERIC_DEPENDENCY)
        && !dependency.tags.contains(DependencyTags::SHARED_PROJECT)
        && !item_specs.contains(&dependency.original_item_specifier)
}

impl DependenciesSnapshotFilter for ImplicitTopLevelFilter {
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        if should_mark(dependency, context) {
            let icons = context
                .catalog()
                .descriptor(&dependency.provider_type)
                .map(|d| (d.implicit_icon.clone(), d.implicit_expanded_icon.clone()));
            if let Some((icon, expanded_icon)) = icons {
                tracing::debug!(
                    id = %dependency.id,
                    "marking dependency implicit; not declared in project items"
                );
                context.accept(Arc::new(dependency.to_implicit(icon, expanded_icon)));
                return;
            }
        }
        context.accept(Arc::clone(dependency));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::filters::default_filters;
    use crate::model::{
        DependencyId, DependencyRecord, ProviderDescriptor, ProviderRegistry, Target,
    };
    use crate::snapshot::{DependencyChanges, TargetedDependenciesSnapshot};

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new().with_provider(ProviderDescriptor::new("package", "Packages"))
    }

    fn apply(
        record: DependencyRecord,
        item_specs: &HashSet<String>,
    ) -> Arc<TargetedDependenciesSnapshot> {
        let target = Target::new("net8.0");
        let filters = default_filters(None);
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target);
        TargetedDependenciesSnapshot::from_changes(
            &empty,
            &DependencyChanges::new().add(record),
            &filters,
            &registry(),
            Some(item_specs),
        )
        .unwrap()
    }

    fn find(snapshot: &TargetedDependenciesSnapshot, spec: &str) -> Arc<Dependency> {
        let id = DependencyId::new(&Target::new("net8.0"), "package", spec);
        Arc::clone(snapshot.find(&id).unwrap())
    }

    #[test]
    fn test_undeclared_dependency_becomes_implicit() {
        let record = DependencyRecord::new("package", "Synthesized")
            .resolved(true)
            .with_tags(DependencyTags::SUPPORTS_REMOVE);
        let before =
            Dependency::from_record(record.clone(), &Target::new("net8.0")).unwrap();

        let item_specs: HashSet<String> = ["Declared".to_string()].into();
        let snapshot = apply(record, &item_specs);
        let dep = find(&snapshot, "Synthesized");

        assert!(dep.implicit);
        assert!(!dep.tags.contains(DependencyTags::SUPPORTS_REMOVE));
        assert_eq!(dep.icon_set.icon.name(), "package-private");
        assert_eq!(dep.icon_set.expanded_icon.name(), "package-private");
        // The unresolved pairing is preserved from before filtering.
        assert_eq!(dep.icon_set.unresolved_icon, before.icon_set.unresolved_icon);
        assert_eq!(
            dep.icon_set.unresolved_expanded_icon,
            before.icon_set.unresolved_expanded_icon
        );
    }

    #[test]
    fn test_declared_dependency_stays_explicit() {
        let item_specs: HashSet<String> = ["Declared".to_string()].into();
        let snapshot = apply(
            DependencyRecord::new("package", "Declared")
                .resolved(true)
                .with_tags(DependencyTags::SUPPORTS_REMOVE),
            &item_specs,
        );
        let dep = find(&snapshot, "Declared");

        assert!(!dep.implicit);
        assert!(dep.tags.contains(DependencyTags::SUPPORTS_REMOVE));
    }

    #[test]
    fn test_shared_project_reference_is_exempt() {
        let item_specs: HashSet<String> = HashSet::new();
        let snapshot = apply(
            DependencyRecord::new("package", "Shared")
                .resolved(true)
                .with_tags(DependencyTags::SHARED_PROJECT),
            &item_specs,
        );
        assert!(!find(&snapshot, "Shared").implicit);
    }

    #[test]
    fn test_unresolved_dependency_is_not_marked() {
        let item_specs: HashSet<String> = HashSet::new();
        let snapshot = apply(DependencyRecord::new("package", "Broken"), &item_specs);
        assert!(!find(&snapshot, "Broken").implicit);
    }

    #[test]
    fn test_no_item_spec_set_means_no_marking() {
        let target = Target::new("net8.0");
        let filters = default_filters(None);
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target);
        let snapshot = TargetedDependenciesSnapshot::from_changes(
            &empty,
            &DependencyChanges::new()
                .add(DependencyRecord::new("package", "Synthesized").resolved(true)),
            &filters,
            &registry(),
            None,
        )
        .unwrap();
        assert!(!find(&snapshot, "Synthesized").implicit);
    }
}
