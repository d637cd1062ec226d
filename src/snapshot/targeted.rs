//! Immutable per-target dependency snapshot and its incremental update.
//!
//! A [`TargetedDependenciesSnapshot`] owns the complete "world" map of
//! dependency id → dependency for one build target, plus the derived,
//! stably-sorted top-level subset. Snapshots are never mutated after
//! publication; [`from_changes`](TargetedDependenciesSnapshot::from_changes)
//! applies one change batch against a private copy-on-write builder and
//! either publishes a new snapshot or hands back the previous instance by
//! reference when nothing net-changed, letting consumers skip redundant work
//! with a pointer comparison.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;

use crate::core::SnapshotError;
use crate::filters::context::{
    AddDecision, AddDependencyContext, RemoveDecision, RemoveDependencyContext,
};
use crate::filters::DependenciesSnapshotFilter;
use crate::model::{Dependency, DependencyId, ProviderCatalog, Target};

use super::changes::DependencyChanges;

/// The immutable dependency graph for a single build target.
#[derive(Debug)]
pub struct TargetedDependenciesSnapshot {
    project_path: Arc<str>,
    target: Target,
    world: HashMap<DependencyId, Arc<Dependency>>,
    top_level: Vec<Arc<Dependency>>,
}

impl TargetedDependenciesSnapshot {
    /// Create the empty snapshot a target starts from.
    pub fn empty(project_path: impl Into<Arc<str>>, target: Target) -> Arc<Self> {
        Arc::new(Self {
            project_path: project_path.into(),
            target,
            world: HashMap::new(),
            top_level: Vec::new(),
        })
    }

    /// Path of the project this snapshot belongs to.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// The build target this snapshot describes.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The complete id → dependency world map.
    #[must_use]
    pub fn world(&self) -> &HashMap<DependencyId, Arc<Dependency>> {
        &self.world
    }

    /// Top-level dependencies, sorted by provider type, then priority
    /// (descending), then caption (case-insensitive), then id.
    #[must_use]
    pub fn top_level(&self) -> &[Arc<Dependency>] {
        &self.top_level
    }

    /// Look up a dependency by id.
    #[must_use]
    pub fn find(&self, id: &DependencyId) -> Option<&Arc<Dependency>> {
        self.world.get(id)
    }

    /// Resolve a dependency's children, skipping dangling edges.
    #[must_use]
    pub fn children_of(&self, dependency: &Dependency) -> Vec<Arc<Dependency>> {
        dependency
            .dependency_ids
            .iter()
            .filter_map(|id| self.world.get(id).cloned())
            .collect()
    }

    /// Whether the dependency should be rendered as unresolved: it is
    /// unresolved itself, or some reachable visible descendant is.
    ///
    /// The traversal follows `dependency_ids` edges depth-first, tolerates
    /// edges to absent nodes, guards against cycles with a visited set, and
    /// walks *through* non-visible nodes without counting them — a hidden
    /// intermediate never masks a broken child, but is never itself reported
    /// as the cause.
    ///
    /// Asking about a dependency absent from this snapshot is answered from
    /// the dependency's own resolved flag (no edges can be followed) and
    /// logged at `warn`; the behavior is identical in all build profiles.
    #[must_use]
    pub fn should_appear_unresolved(&self, dependency: &Dependency) -> bool {
        if !dependency.resolved {
            return true;
        }
        if !self.world.contains_key(&dependency.id) {
            tracing::warn!(
                id = %dependency.id,
                "dependency is not part of this snapshot; answering from its own state"
            );
            return false;
        }

        let mut visited: HashSet<DependencyId> = HashSet::new();
        visited.insert(dependency.id.clone());
        let mut stack: Vec<&DependencyId> = dependency.dependency_ids.iter().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            // Dangling edges are "child not found", not an error.
            let Some(child) = self.world.get(id) else {
                continue;
            };
            if child.visible && !child.resolved {
                return true;
            }
            stack.extend(child.dependency_ids.iter());
        }
        false
    }

    /// Whether any visible top-level dependency is unresolved or has a
    /// reachable visible unresolved descendant. This is the cross-project
    /// signal the project-reference filter consumes.
    #[must_use]
    pub fn has_unresolved_reachable_visible_dependency(&self) -> bool {
        self.top_level
            .iter()
            .any(|d| d.visible && self.should_appear_unresolved(d))
    }

    /// Apply one change batch through the ordered filter chain.
    ///
    /// Every added-or-updated record is normalized and offered to each
    /// filter in order; a filter may pass the candidate through, substitute
    /// a replacement (which later filters then see), or reject it, which
    /// short-circuits the rest of the chain for that candidate. Side-effect
    /// mutations filters make to *other* entries always apply, whether or
    /// not the candidate survives. Removals run the chain the same way:
    /// the first filter to reject keeps the entry.
    ///
    /// Returns `previous` itself (by reference) when the batch produced no
    /// net change to the world map.
    ///
    /// # Panics
    ///
    /// Panics if a filter neither accepts nor rejects a candidate; that is
    /// a defect in the filter implementation, not a runtime condition.
    pub fn from_changes(
        previous: &Arc<Self>,
        changes: &DependencyChanges,
        filters: &[Box<dyn DependenciesSnapshotFilter>],
        catalog: &dyn ProviderCatalog,
        project_item_specifiers: Option<&HashSet<String>>,
    ) -> Result<Arc<Self>> {
        let mut world = previous.world.clone();

        let add_changed = {
            let mut ctx = AddDependencyContext::new(
                &mut world,
                &previous.target,
                catalog,
                project_item_specifiers,
            );
            for record in changes.added() {
                let mut current =
                    Arc::new(Dependency::from_record(record.clone(), &previous.target)?);
                let mut accepted = true;
                for filter in filters {
                    ctx.begin();
                    filter.before_add_or_update(&current, &mut ctx);
                    match ctx.take_decision() {
                        Some(AddDecision::Accepted(next)) => current = next,
                        Some(AddDecision::Rejected) => {
                            accepted = false;
                            break;
                        }
                        None => panic!(
                            "snapshot filter neither accepted nor rejected '{}'",
                            current.id
                        ),
                    }
                }
                if accepted {
                    tracing::trace!(id = %current.id, "accepted into world map");
                    ctx.commit(current);
                }
            }
            ctx.changed()
        };

        let remove_changed = {
            let mut ctx = RemoveDependencyContext::new(&mut world, &previous.target);
            for key in changes.removed() {
                if key.provider_type.trim().is_empty() {
                    return Err(SnapshotError::EmptyProviderType.into());
                }
                if key.item_specifier.trim().is_empty() {
                    return Err(SnapshotError::EmptyItemSpecifier {
                        provider_type: key.provider_type.clone(),
                    }
                    .into());
                }

                let id = DependencyId::new(&previous.target, &key.provider_type, &key.item_specifier);
                let existing = ctx
                    .get(&id)
                    .filter(|d| d.is_provider(&key.provider_type))
                    .cloned();
                let Some(existing) = existing else {
                    tracing::trace!(id = %id, "removal of absent id is a no-op");
                    continue;
                };

                let mut accepted = true;
                for filter in filters {
                    ctx.begin();
                    filter.before_remove(&existing, &mut ctx);
                    match ctx.take_decision() {
                        Some(RemoveDecision::Accepted) => {}
                        Some(RemoveDecision::Rejected) => {
                            // First rejection wins and keeps the entry.
                            accepted = false;
                            break;
                        }
                        None => panic!(
                            "snapshot filter neither accepted nor rejected removal of '{}'",
                            existing.id
                        ),
                    }
                }
                if accepted {
                    ctx.commit_removal(&id);
                }
            }
            ctx.changed()
        };

        if !add_changed && !remove_changed {
            return Ok(Arc::clone(previous));
        }
        // Mutations can cancel out within one batch (an entry added and
        // then removed); only a net value difference publishes a snapshot.
        if world == previous.world {
            return Ok(Arc::clone(previous));
        }

        let top_level = build_top_level(&world);
        tracing::debug!(
            target = %previous.target,
            world = world.len(),
            top_level = top_level.len(),
            "published new targeted snapshot"
        );
        Ok(Arc::new(Self {
            project_path: Arc::clone(&previous.project_path),
            target: previous.target.clone(),
            world,
            top_level,
        }))
    }
}

/// Derive the sorted top-level subset of a world map.
fn build_top_level(world: &HashMap<DependencyId, Arc<Dependency>>) -> Vec<Arc<Dependency>> {
    let mut top: Vec<Arc<Dependency>> =
        world.values().filter(|d| d.top_level).cloned().collect();
    top.sort_by(|a, b| {
        cmp_ignore_case(&a.provider_type, &b.provider_type)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| cmp_ignore_case(&a.caption, &b.caption))
            .then_with(|| a.id.cmp(&b.id))
    });
    top
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|b| b.to_ascii_lowercase());
    let b = b.bytes().map(|b| b.to_ascii_lowercase());
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::default_filters;
    use crate::model::{DependencyRecord, ProviderRegistry};

    fn target() -> Target {
        Target::new("net8.0")
    }

    fn apply(
        previous: &Arc<TargetedDependenciesSnapshot>,
        changes: DependencyChanges,
    ) -> Arc<TargetedDependenciesSnapshot> {
        let filters = default_filters(None);
        let registry = ProviderRegistry::new();
        TargetedDependenciesSnapshot::from_changes(previous, &changes, &filters, &registry, None)
            .unwrap()
    }

    fn id(spec: &str) -> DependencyId {
        DependencyId::new(&target(), "package", spec)
    }

    #[test]
    fn test_empty_changes_return_same_instance() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let next = apply(&empty, DependencyChanges::new());
        assert!(Arc::ptr_eq(&empty, &next));
    }

    #[test]
    fn test_re_adding_identical_record_returns_same_instance() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let record = DependencyRecord::new("package", "Foo").resolved(true);

        let first = apply(&empty, DependencyChanges::new().add(record.clone()));
        assert!(!Arc::ptr_eq(&empty, &first));

        let second = apply(&first, DependencyChanges::new().add(record));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_add_then_remove_in_one_batch_is_a_net_noop() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(DependencyRecord::new("package", "Transient"))
            .remove("package", "Transient");
        let next = apply(&empty, changes);
        assert!(Arc::ptr_eq(&empty, &next));
    }

    #[test]
    fn test_removal_of_absent_id_is_noop() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let next = apply(&empty, DependencyChanges::new().remove("package", "Ghost"));
        assert!(Arc::ptr_eq(&empty, &next));
    }

    #[test]
    fn test_removal_key_requires_provider_type() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let filters = default_filters(None);
        let registry = ProviderRegistry::new();
        let err = TargetedDependenciesSnapshot::from_changes(
            &empty,
            &DependencyChanges::new().remove("", "Foo"),
            &filters,
            &registry,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::EmptyProviderType)
        ));
    }

    #[test]
    fn test_top_level_sort_order() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(DependencyRecord::new("package", "beta").resolved(true))
            .add(DependencyRecord::new("package", "Alpha").resolved(true))
            .add(
                DependencyRecord::new("package", "zeta")
                    .resolved(true)
                    .with_priority(10),
            )
            .add(DependencyRecord::new("assembly", "Sys").resolved(true))
            .add(
                DependencyRecord::new("package", "hidden-child")
                    .resolved(true)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let captions: Vec<&str> = snapshot
            .top_level()
            .iter()
            .map(|d| d.caption.as_str())
            .collect();
        // assembly sorts before package; within package, priority 10 first,
        // then captions case-insensitively.
        assert_eq!(captions, vec!["Sys", "zeta", "Alpha", "beta"]);
    }

    #[test]
    fn test_should_appear_unresolved_direct_child() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "Parent")
                    .resolved(true)
                    .with_dependency_ids(vec![id("Child")]),
            )
            .add(
                DependencyRecord::new("package", "Child")
                    .resolved(false)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let parent = snapshot.find(&id("Parent")).unwrap().clone();
        assert!(snapshot.should_appear_unresolved(&parent));
        assert!(snapshot.has_unresolved_reachable_visible_dependency());
    }

    #[test]
    fn test_should_appear_unresolved_all_children_resolved() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "Parent")
                    .resolved(true)
                    .with_dependency_ids(vec![id("Child"), id("Dangling")]),
            )
            .add(
                DependencyRecord::new("package", "Child")
                    .resolved(true)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let parent = snapshot.find(&id("Parent")).unwrap().clone();
        assert!(!snapshot.should_appear_unresolved(&parent));
        assert!(!snapshot.has_unresolved_reachable_visible_dependency());
    }

    #[test]
    fn test_cycle_terminates() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "A")
                    .resolved(true)
                    .with_dependency_ids(vec![id("B")]),
            )
            .add(
                DependencyRecord::new("package", "B")
                    .resolved(true)
                    .with_dependency_ids(vec![id("A")]),
            );
        let snapshot = apply(&empty, changes);

        for spec in ["A", "B"] {
            let dep = snapshot.find(&id(spec)).unwrap().clone();
            assert!(!snapshot.should_appear_unresolved(&dep));
        }
    }

    #[test]
    fn test_unresolved_behind_invisible_intermediate_propagates() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "Root")
                    .resolved(true)
                    .with_dependency_ids(vec![id("Hidden")]),
            )
            .add(
                DependencyRecord::new("package", "Hidden")
                    .resolved(false)
                    .visible(false)
                    .top_level(false)
                    .with_dependency_ids(vec![id("Broken")]),
            )
            .add(
                DependencyRecord::new("package", "Broken")
                    .resolved(false)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let root = snapshot.find(&id("Root")).unwrap().clone();
        // The hidden node itself does not count, but the visible unresolved
        // node behind it does.
        assert!(snapshot.should_appear_unresolved(&root));
    }

    #[test]
    fn test_unresolved_only_behind_invisible_leaf_does_not_count() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "Root")
                    .resolved(true)
                    .with_dependency_ids(vec![id("Hidden")]),
            )
            .add(
                DependencyRecord::new("package", "Hidden")
                    .resolved(false)
                    .visible(false)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let root = snapshot.find(&id("Root")).unwrap().clone();
        assert!(!snapshot.should_appear_unresolved(&root));
    }

    #[test]
    fn test_query_about_foreign_dependency_answers_from_itself() {
        let snapshot = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let foreign = Dependency::from_record(
            DependencyRecord::new("package", "Elsewhere").resolved(true),
            &target(),
        )
        .unwrap();
        assert!(!snapshot.should_appear_unresolved(&foreign));

        let unresolved = foreign.to_unresolved(Vec::new());
        assert!(snapshot.should_appear_unresolved(&unresolved));
    }

    #[test]
    fn test_children_of_skips_dangling_edges() {
        let empty = TargetedDependenciesSnapshot::empty("/proj/a.csproj", target());
        let changes = DependencyChanges::new()
            .add(
                DependencyRecord::new("package", "Parent")
                    .resolved(true)
                    .with_dependency_ids(vec![id("Child"), id("Missing")]),
            )
            .add(
                DependencyRecord::new("package", "Child")
                    .resolved(true)
                    .top_level(false),
            );
        let snapshot = apply(&empty, changes);

        let parent = snapshot.find(&id("Parent")).unwrap().clone();
        let children = snapshot.children_of(&parent);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Child");
    }
}
