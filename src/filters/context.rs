//! Mutation contexts handed to snapshot filters.
//!
//! One context wraps the world-map builder for an entire change batch.
//! Before each filter sees a candidate the per-candidate decision slot is
//! reset; the filter must then either accept (unchanged or with a
//! replacement) or reject exactly once. Failing to decide, or deciding
//! twice, is a defect in the filter and panics rather than letting a
//! corrupt chain result reach a published snapshot.
//!
//! Side-effect mutations — a filter touching entries *other than* the one it
//! was asked about — go through [`add_or_update`](AddDependencyContext::add_or_update)
//! and flip the context's `changed` flag, which is tracked separately from
//! the candidate's own decision so the driver can tell "nothing else in the
//! world moved" apart from "this candidate was rejected or replaced".

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::model::{Dependency, DependencyId, ProviderCatalog, Target};

/// Outcome a filter chose for an added-or-updated candidate.
#[derive(Debug, Clone)]
pub(crate) enum AddDecision {
    /// Continue the chain with this (possibly replaced) dependency.
    Accepted(Arc<Dependency>),
    /// Drop the candidate; remaining filters are skipped.
    Rejected,
}

/// Outcome a filter chose for a removal candidate.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RemoveDecision {
    /// Allow the removal to proceed to the next filter.
    Accepted,
    /// Keep the entry; remaining filters are skipped.
    Rejected,
}

/// Applies `dependency` to the builder, returning whether the world
/// actually changed. Overwriting an entry with an equal value keeps the
/// existing allocation and does not count as a change.
fn apply_to_world(
    world: &mut HashMap<DependencyId, Arc<Dependency>>,
    dependency: Arc<Dependency>,
) -> bool {
    match world.get(&dependency.id) {
        Some(existing) if Arc::ptr_eq(existing, &dependency) || **existing == *dependency => false,
        _ => {
            world.insert(dependency.id.clone(), dependency);
            true
        }
    }
}

/// Filter-visible view over the world-map builder while processing one
/// batch of added-or-updated dependencies.
pub struct AddDependencyContext<'a> {
    world: &'a mut HashMap<DependencyId, Arc<Dependency>>,
    target: &'a Target,
    catalog: &'a dyn ProviderCatalog,
    project_item_specifiers: Option<&'a HashSet<String>>,
    changed: bool,
    decision: Option<AddDecision>,
}

impl<'a> AddDependencyContext<'a> {
    pub(crate) fn new(
        world: &'a mut HashMap<DependencyId, Arc<Dependency>>,
        target: &'a Target,
        catalog: &'a dyn ProviderCatalog,
        project_item_specifiers: Option<&'a HashSet<String>>,
    ) -> Self {
        Self {
            world,
            target,
            catalog,
            project_item_specifiers,
            changed: false,
            decision: None,
        }
    }

    /// Reset the decision slot before handing a candidate to the next filter.
    pub(crate) fn begin(&mut self) {
        self.decision = None;
    }

    pub(crate) fn take_decision(&mut self) -> Option<AddDecision> {
        self.decision.take()
    }

    /// Commit the chain's accepted result for the candidate itself.
    pub(crate) fn commit(&mut self, dependency: Arc<Dependency>) {
        if apply_to_world(self.world, dependency) {
            self.changed = true;
        }
    }

    pub(crate) fn changed(&self) -> bool {
        self.changed
    }

    /// The target this batch applies to.
    #[must_use]
    pub fn target(&self) -> &Target {
        self.target
    }

    /// The provider catalog supplied by the caller.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProviderCatalog {
        self.catalog
    }

    /// The current project item specifier set, when the caller supplied one.
    #[must_use]
    pub fn project_item_specifiers(&self) -> Option<&HashSet<String>> {
        self.project_item_specifiers
    }

    /// Look up an entry in the builder by id.
    #[must_use]
    pub fn get(&self, id: &DependencyId) -> Option<&Arc<Dependency>> {
        self.world.get(id)
    }

    /// Iterate over all entries currently in the builder.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Dependency>> {
        self.world.values()
    }

    /// Accept the candidate, passing `dependency` (the same instance or a
    /// replacement) on to the next filter.
    ///
    /// # Panics
    ///
    /// Panics if the filter already decided for this candidate.
    pub fn accept(&mut self, dependency: Arc<Dependency>) {
        assert!(
            self.decision.is_none(),
            "snapshot filter decided twice for one candidate"
        );
        self.decision = Some(AddDecision::Accepted(dependency));
    }

    /// Reject the candidate; it will not be inserted and remaining filters
    /// are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the filter already decided for this candidate.
    pub fn reject(&mut self) {
        assert!(
            self.decision.is_none(),
            "snapshot filter decided twice for one candidate"
        );
        self.decision = Some(AddDecision::Rejected);
    }

    /// Insert or overwrite an entry *other than* the candidate as a side
    /// effect. Overwriting with an equal value is a no-op and does not mark
    /// the batch changed.
    pub fn add_or_update(&mut self, dependency: Arc<Dependency>) {
        tracing::debug!(
            id = %dependency.id,
            resolved = dependency.resolved,
            "filter side-effect update"
        );
        if apply_to_world(self.world, dependency) {
            self.changed = true;
        }
    }
}

/// Filter-visible view over the world-map builder while processing one
/// batch of removals.
pub struct RemoveDependencyContext<'a> {
    world: &'a mut HashMap<DependencyId, Arc<Dependency>>,
    target: &'a Target,
    changed: bool,
    decision: Option<RemoveDecision>,
}

impl<'a> RemoveDependencyContext<'a> {
    pub(crate) fn new(
        world: &'a mut HashMap<DependencyId, Arc<Dependency>>,
        target: &'a Target,
    ) -> Self {
        Self {
            world,
            target,
            changed: false,
            decision: None,
        }
    }

    pub(crate) fn begin(&mut self) {
        self.decision = None;
    }

    pub(crate) fn take_decision(&mut self) -> Option<RemoveDecision> {
        self.decision.take()
    }

    /// Remove the entry once every filter accepted the removal.
    pub(crate) fn commit_removal(&mut self, id: &DependencyId) {
        if self.world.remove(id).is_some() {
            self.changed = true;
        }
    }

    pub(crate) fn changed(&self) -> bool {
        self.changed
    }

    /// The target this batch applies to.
    #[must_use]
    pub fn target(&self) -> &Target {
        self.target
    }

    /// Look up an entry in the builder by id.
    #[must_use]
    pub fn get(&self, id: &DependencyId) -> Option<&Arc<Dependency>> {
        self.world.get(id)
    }

    /// Accept the removal, letting the next filter weigh in.
    ///
    /// # Panics
    ///
    /// Panics if the filter already decided for this candidate.
    pub fn accept(&mut self) {
        assert!(
            self.decision.is_none(),
            "snapshot filter decided twice for one removal"
        );
        self.decision = Some(RemoveDecision::Accepted);
    }

    /// Reject the removal; the entry is kept and remaining filters are
    /// skipped. A filter may pair this with [`add_or_update`](Self::add_or_update)
    /// to keep a replacement instead of the original.
    ///
    /// # Panics
    ///
    /// Panics if the filter already decided for this candidate.
    pub fn reject(&mut self) {
        assert!(
            self.decision.is_none(),
            "snapshot filter decided twice for one removal"
        );
        self.decision = Some(RemoveDecision::Rejected);
    }

    /// Insert or overwrite an entry as a side effect (e.g. cascading
    /// un-resolution of a correlated entry).
    pub fn add_or_update(&mut self, dependency: Arc<Dependency>) {
        tracing::debug!(
            id = %dependency.id,
            resolved = dependency.resolved,
            "filter side-effect update during removal"
        );
        if apply_to_world(self.world, dependency) {
            self.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DependencyRecord, ProviderRegistry};

    fn dep(name: &str, target: &Target) -> Arc<Dependency> {
        Arc::new(
            Dependency::from_record(DependencyRecord::new("package", name), target).unwrap(),
        )
    }

    #[test]
    fn test_equal_overwrite_does_not_mark_changed() {
        let target = Target::new("net8.0");
        let registry = ProviderRegistry::new();
        let a = dep("A", &target);
        let mut world = HashMap::new();
        world.insert(a.id.clone(), a.clone());

        let mut ctx = AddDependencyContext::new(&mut world, &target, &registry, None);
        ctx.add_or_update(dep("A", &target));
        assert!(!ctx.changed());

        ctx.add_or_update(Arc::new(a.to_unresolved(Vec::new()).to_resolved(vec![
            DependencyId::from("net8.0\\package\\B"),
        ])));
        assert!(ctx.changed());
    }

    #[test]
    #[should_panic(expected = "decided twice")]
    fn test_double_decision_panics() {
        let target = Target::new("net8.0");
        let registry = ProviderRegistry::new();
        let mut world = HashMap::new();
        let mut ctx = AddDependencyContext::new(&mut world, &target, &registry, None);
        let d = dep("A", &target);
        ctx.begin();
        ctx.accept(d.clone());
        ctx.reject();
    }

    #[test]
    fn test_remove_commit_tracks_change() {
        let target = Target::new("net8.0");
        let a = dep("A", &target);
        let id = a.id.clone();
        let mut world = HashMap::new();
        world.insert(id.clone(), a);

        let mut ctx = RemoveDependencyContext::new(&mut world, &target);
        ctx.commit_removal(&DependencyId::from("net8.0\\package\\Missing"));
        assert!(!ctx.changed());
        ctx.commit_removal(&id);
        assert!(ctx.changed());
        assert!(world.is_empty());
    }
}
