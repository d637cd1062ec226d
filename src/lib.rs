//! depsnap - incremental dependency snapshots
//!
//! A library that maintains, per build target, an immutable versioned graph
//! of a project's external dependencies (packages, project references, SDKs,
//! assemblies, analyzers, COM components) and keeps that graph consistent as
//! project evaluation changes over time.
//!
//! # Architecture Overview
//!
//! Change batches flow through a chain-of-responsibility filter pipeline
//! into copy-on-write snapshot builders:
//!
//! - raw [`DependencyRecord`](model::DependencyRecord)s are normalized into
//!   immutable [`Dependency`](model::Dependency) entities with a canonical
//!   hierarchical id;
//! - every add and remove is offered to an ordered list of
//!   [`DependenciesSnapshotFilter`](filters::DependenciesSnapshotFilter)s,
//!   independent policies that may accept, replace, or reject the mutation
//!   and side-effect other entries;
//! - the result is published as a new
//!   [`TargetedDependenciesSnapshot`](snapshot::TargetedDependenciesSnapshot),
//!   or the previous instance is returned by reference when nothing changed;
//! - [`AggregateDependenciesSnapshot`](snapshot::AggregateDependenciesSnapshot)
//!   composes the per-target snapshots with structural sharing.
//!
//! Everything published is immutable and `Arc`-shared: snapshots can be read
//! from any number of threads without synchronization, and consumers detect
//! "nothing changed" with a pointer comparison.
//!
//! # Core Modules
//!
//! - [`core`] - error types shared across the engine
//! - [`model`] - dependency identity, tags, icons, and the normalized model
//! - [`snapshot`] - targeted and aggregate snapshots, change batches
//! - [`filters`] - the filter pipeline and the standard policy filters
//!
//! # Example
//!
//! ```
//! use depsnap::model::{DependencyRecord, ProviderRegistry, Target};
//! use depsnap::snapshot::{DependencyChanges, TargetedDependenciesSnapshot};
//! use depsnap::filters::default_filters;
//!
//! let filters = default_filters(None);
//! let registry = ProviderRegistry::new();
//! let empty = TargetedDependenciesSnapshot::empty("/proj/app.csproj", Target::new("net8.0"));
//!
//! let changes = DependencyChanges::new()
//!     .add(DependencyRecord::new("package", "Newtonsoft.Json").resolved(true));
//! let snapshot =
//!     TargetedDependenciesSnapshot::from_changes(&empty, &changes, &filters, &registry, None)
//!         .unwrap();
//! assert_eq!(snapshot.top_level().len(), 1);
//!
//! // Re-applying the same batch changes nothing and reuses the instance.
//! let again =
//!     TargetedDependenciesSnapshot::from_changes(&snapshot, &changes, &filters, &registry, None)
//!         .unwrap();
//! assert!(std::sync::Arc::ptr_eq(&snapshot, &again));
//! ```

pub mod core;
pub mod filters;
pub mod model;
pub mod snapshot;

pub use crate::core::SnapshotError;
pub use filters::{DependenciesSnapshotFilter, ProjectSnapshotProvider, default_filters};
pub use model::{Dependency, DependencyId, DependencyRecord, DependencyTags, Target};
pub use snapshot::{
    AggregateDependenciesSnapshot, DependencyChanges, TargetedDependenciesSnapshot,
};
