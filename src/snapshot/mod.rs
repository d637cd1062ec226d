//! Immutable dependency snapshots and their incremental construction.

pub mod aggregate;
pub mod changes;
pub mod targeted;

pub use aggregate::AggregateDependenciesSnapshot;
pub use changes::{DependencyChanges, RemovalKey};
pub use targeted::TargetedDependenciesSnapshot;
