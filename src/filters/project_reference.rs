//! Cross-project unresolved propagation policy.
//!
//! A project reference cannot honestly appear resolved when the referenced
//! project's own dependency graph is broken. On add of a resolved,
//! top-level project reference this filter consults an injected
//! [`ProjectSnapshotProvider`] for the referenced project's snapshot on the
//! matching target; if that snapshot reports any reachable, visible,
//! unresolved dependency the reference is downgraded to unresolved.
//!
//! The provider is an injected capability rather than a direct reference
//! between snapshot objects, so independent project snapshots never own
//! each other. A missing provider or an unavailable snapshot means no
//! mutation.

use std::sync::Arc;

use crate::model::{provider_types, Dependency, Target};
use crate::snapshot::TargetedDependenciesSnapshot;

use super::context::AddDependencyContext;
use super::DependenciesSnapshotFilter;

/// Lookup from a referenced project's path to that project's own targeted
/// snapshot for a matching target.
pub trait ProjectSnapshotProvider: Send + Sync {
    /// The referenced project's snapshot, or `None` when unavailable.
    fn targeted_snapshot(
        &self,
        project_path: &str,
        target: &Target,
    ) -> Option<Arc<TargetedDependenciesSnapshot>>;
}

/// Downgrades project references whose referenced project has unresolved
/// dependencies of its own.
pub struct ProjectReferenceFilter {
    snapshot_provider: Option<Arc<dyn ProjectSnapshotProvider>>,
}

impl ProjectReferenceFilter {
    /// Create the filter with its injected cross-project lookup.
    pub fn new(snapshot_provider: Option<Arc<dyn ProjectSnapshotProvider>>) -> Self {
        Self { snapshot_provider }
    }
}

impl DependenciesSnapshotFilter for ProjectReferenceFilter {
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        if dependency.resolved
            && dependency.top_level
            && dependency.is_provider(provider_types::PROJECT)
            && let Some(provider) = &self.snapshot_provider
        {
            let referenced_path = dependency
                .full_path
                .as_deref()
                .unwrap_or(&dependency.path);
            if let Some(snapshot) = provider.targeted_snapshot(referenced_path, context.target())
                && snapshot.has_unresolved_reachable_visible_dependency()
            {
                tracing::debug!(
                    id = %dependency.id,
                    referenced = referenced_path,
                    "downgrading project reference; referenced project has unresolved dependencies"
                );
                context.accept(Arc::new(
                    dependency.to_unresolved(dependency.dependency_ids.clone()),
                ));
                return;
            }
        }
        context.accept(Arc::clone(dependency));
    }
}
