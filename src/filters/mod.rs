//! The snapshot filter pipeline.
//!
//! Filters are independent mutation policies arranged in a fixed,
//! caller-supplied order. For every added-or-updated dependency and every
//! removal, each filter in turn sees the *current* candidate (which an
//! earlier filter may have replaced) and the batch's mutation context, and
//! must accept or reject exactly once. Rejection short-circuits the rest of
//! the chain for that candidate; side-effect mutations a filter makes to
//! other entries always apply.
//!
//! The policies cooperate on a single mutation without knowing about each
//! other: resolution-state precedence, implicit-dependency detection,
//! SDK/package correlation, cross-project unresolved propagation, and
//! caption de-duplication each live in their own filter.

pub mod caption_dedup;
pub mod context;
pub mod implicit_top_level;
pub mod project_reference;
pub mod sdk_package;
pub mod unresolved_precedence;

use std::sync::Arc;

use crate::model::Dependency;

pub use caption_dedup::CaptionDeduplicationFilter;
pub use context::{AddDependencyContext, RemoveDependencyContext};
pub use implicit_top_level::ImplicitTopLevelFilter;
pub use project_reference::{ProjectReferenceFilter, ProjectSnapshotProvider};
pub use sdk_package::SdkPackageCorrelationFilter;
pub use unresolved_precedence::UnresolvedPrecedenceFilter;

/// One mutation policy in the snapshot filter chain.
///
/// Implementations must call exactly one of the context's `accept`/`reject`
/// operations per invocation; both defaults accept the candidate unchanged,
/// so a filter only overrides the hook it cares about.
pub trait DependenciesSnapshotFilter: Send + Sync {
    /// Consulted for every added-or-updated dependency. `dependency` is the
    /// current candidate, possibly already replaced by an earlier filter.
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        context.accept(Arc::clone(dependency));
    }

    /// Consulted for every removal. `dependency` is the existing entry the
    /// batch asks to remove.
    fn before_remove(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut RemoveDependencyContext<'_>,
    ) {
        let _ = dependency;
        context.accept();
    }
}

/// The standard filter chain, in its fixed order.
///
/// Precedence runs first so stale unresolved records never reach the other
/// policies; caption de-duplication runs last so it sees the candidate's
/// final shape.
#[must_use]
pub fn default_filters(
    snapshot_provider: Option<Arc<dyn ProjectSnapshotProvider>>,
) -> Vec<Box<dyn DependenciesSnapshotFilter>> {
    vec![
        Box::new(UnresolvedPrecedenceFilter),
        Box::new(ImplicitTopLevelFilter),
        Box::new(SdkPackageCorrelationFilter),
        Box::new(ProjectReferenceFilter::new(snapshot_provider)),
        Box::new(CaptionDeduplicationFilter),
    ]
}
