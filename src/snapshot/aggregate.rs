//! Aggregate snapshot composing all targets of one project.
//!
//! Wraps one [`TargetedDependenciesSnapshot`] per build target plus the
//! active target selection. Updates share structure aggressively: a target
//! whose membership is unchanged is carried over by reference, and an update
//! that changes nothing hands back the same aggregate instance, so consumers
//! can detect "no work to do" with a pointer comparison.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::model::{Dependency, DependencyId, Target};

use super::targeted::TargetedDependenciesSnapshot;

/// Immutable composition of the targeted snapshots across all build targets
/// for one project.
#[derive(Debug)]
pub struct AggregateDependenciesSnapshot {
    project_path: Arc<str>,
    active_target: Target,
    by_target: HashMap<Target, Arc<TargetedDependenciesSnapshot>>,
}

impl AggregateDependenciesSnapshot {
    /// Create the initial aggregate for a project with a single empty
    /// target.
    pub fn empty(project_path: impl Into<Arc<str>>, active_target: Target) -> Arc<Self> {
        let project_path = project_path.into();
        let mut by_target = HashMap::with_capacity(1);
        by_target.insert(
            active_target.clone(),
            TargetedDependenciesSnapshot::empty(Arc::clone(&project_path), active_target.clone()),
        );
        Arc::new(Self {
            project_path,
            active_target,
            by_target,
        })
    }

    /// Path of the owning project.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// The currently active target.
    #[must_use]
    pub fn active_target(&self) -> &Target {
        &self.active_target
    }

    /// All targeted snapshots, keyed by target.
    #[must_use]
    pub fn by_target(&self) -> &HashMap<Target, Arc<TargetedDependenciesSnapshot>> {
        &self.by_target
    }

    /// The targeted snapshot for one target, if it is a member.
    #[must_use]
    pub fn targeted(&self, target: &Target) -> Option<&Arc<TargetedDependenciesSnapshot>> {
        self.by_target.get(target)
    }

    /// The targeted snapshot for the active target. The active target is
    /// always a member, so this cannot miss.
    #[must_use]
    pub fn active_snapshot(&self) -> &Arc<TargetedDependenciesSnapshot> {
        self.by_target
            .get(&self.active_target)
            .expect("active target is always a member of the aggregate")
    }

    /// Produce an aggregate for a new target membership set and active
    /// target.
    ///
    /// Unaffected targets are carried over by reference, new targets get an
    /// empty targeted snapshot, and removed targets are dropped. The active
    /// target is always kept as a member even when absent from `targets`.
    /// Returns `self` (by reference) when the member set and active target
    /// are both unchanged.
    #[must_use]
    pub fn set_targets(self: &Arc<Self>, targets: &[Target], active_target: &Target) -> Arc<Self> {
        let mut members: HashSet<&Target> = targets.iter().collect();
        members.insert(active_target);

        let unchanged = *active_target == self.active_target
            && members.len() == self.by_target.len()
            && members.iter().all(|t| self.by_target.contains_key(*t));
        if unchanged {
            return Arc::clone(self);
        }

        let mut by_target = HashMap::with_capacity(members.len());
        for target in members {
            let snapshot = self.by_target.get(target).cloned().unwrap_or_else(|| {
                TargetedDependenciesSnapshot::empty(Arc::clone(&self.project_path), target.clone())
            });
            by_target.insert(target.clone(), snapshot);
        }

        tracing::debug!(
            project = %self.project_path,
            targets = by_target.len(),
            active = %active_target,
            "aggregate target set updated"
        );
        Arc::new(Self {
            project_path: Arc::clone(&self.project_path),
            active_target: active_target.clone(),
            by_target,
        })
    }

    /// Swap in an updated targeted snapshot for its target.
    ///
    /// Returns `self` when the snapshot is pointer-identical to the current
    /// member, which is exactly what
    /// [`from_changes`](TargetedDependenciesSnapshot::from_changes) returns
    /// for a no-op batch.
    #[must_use]
    pub fn set_target_snapshot(
        self: &Arc<Self>,
        snapshot: Arc<TargetedDependenciesSnapshot>,
    ) -> Arc<Self> {
        if let Some(existing) = self.by_target.get(snapshot.target())
            && Arc::ptr_eq(existing, &snapshot)
        {
            return Arc::clone(self);
        }

        let mut by_target = self.by_target.clone();
        by_target.insert(snapshot.target().clone(), snapshot);
        Arc::new(Self {
            project_path: Arc::clone(&self.project_path),
            active_target: self.active_target.clone(),
            by_target,
        })
    }

    /// Find a dependency by id across all targets, preferring the active
    /// target, then the remaining targets in stable order.
    #[must_use]
    pub fn find_dependency(&self, id: &DependencyId) -> Option<Arc<Dependency>> {
        if let Some(found) = self.active_snapshot().find(id) {
            return Some(Arc::clone(found));
        }

        let mut rest: Vec<_> = self
            .by_target
            .iter()
            .filter(|(target, _)| **target != self.active_target)
            .collect();
        rest.sort_by(|(a, _), (b, _)| a.cmp(b));
        rest.iter()
            .find_map(|(_, snapshot)| snapshot.find(id).cloned())
    }
}
