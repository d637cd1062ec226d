//! Resolution-state precedence policy.
//!
//! Project evaluation and design-time builds race: a stale evaluation pass
//! can report a dependency as unresolved after a later pass already resolved
//! it. Resolved state wins and is never downgraded by a stale unresolved
//! record; the incoming record is simply dropped.

use std::sync::Arc;

use crate::model::Dependency;

use super::context::AddDependencyContext;
use super::DependenciesSnapshotFilter;

/// Rejects unresolved records whose id is already resolved in the world.
pub struct UnresolvedPrecedenceFilter;

impl DependenciesSnapshotFilter for UnresolvedPrecedenceFilter {
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        let shadowed_by_resolved = !dependency.resolved
            && context.get(&dependency.id).is_some_and(|existing| {
                existing.resolved && existing.is_provider(&dependency.provider_type)
            });
        if shadowed_by_resolved {
            tracing::debug!(
                id = %dependency.id,
                "dropping stale unresolved record; resolved state wins"
            );
            context.reject();
            return;
        }
        context.accept(Arc::clone(dependency));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::default_filters;
    use crate::model::{DependencyId, DependencyRecord, ProviderRegistry, Target};
    use crate::snapshot::{DependencyChanges, TargetedDependenciesSnapshot};

    #[test]
    fn test_unresolved_record_does_not_downgrade_resolved_entry() {
        let target = Target::new("net8.0");
        let filters = default_filters(None);
        let registry = ProviderRegistry::new();
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target.clone());

        let resolved = TargetedDependenciesSnapshot::from_changes(
            &empty,
            &DependencyChanges::new()
                .add(DependencyRecord::new("package", "Foo").resolved(true)),
            &filters,
            &registry,
            None,
        )
        .unwrap();

        let after = TargetedDependenciesSnapshot::from_changes(
            &resolved,
            &DependencyChanges::new().add(DependencyRecord::new("package", "Foo")),
            &filters,
            &registry,
            None,
        )
        .unwrap();

        // The stale unresolved record was rejected; nothing changed.
        assert!(Arc::ptr_eq(&resolved, &after));
        let id = DependencyId::new(&target, "package", "Foo");
        assert!(after.find(&id).unwrap().resolved);
    }

    #[test]
    fn test_resolved_record_still_overwrites_unresolved_entry() {
        let target = Target::new("net8.0");
        let filters = default_filters(None);
        let registry = ProviderRegistry::new();
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target.clone());

        let unresolved = TargetedDependenciesSnapshot::from_changes(
            &empty,
            &DependencyChanges::new().add(DependencyRecord::new("package", "Foo")),
            &filters,
            &registry,
            None,
        )
        .unwrap();

        let after = TargetedDependenciesSnapshot::from_changes(
            &unresolved,
            &DependencyChanges::new()
                .add(DependencyRecord::new("package", "Foo").resolved(true)),
            &filters,
            &registry,
            None,
        )
        .unwrap();

        let id = DependencyId::new(&target, "package", "Foo");
        assert!(after.find(&id).unwrap().resolved);
    }
}
