//! Error handling for depsnap
//!
//! The snapshot engine distinguishes two kinds of failure:
//!
//! 1. **Precondition violations** — a collaborator handed the engine an
//!    invalid value (empty provider type, empty item specifier, empty removal
//!    key). These are programming errors in the caller and are reported as
//!    [`SnapshotError`] values; the engine makes no attempt to recover.
//! 2. **Filter contract violations** — a filter that neither accepts nor
//!    rejects a candidate, or decides twice for the same candidate. These are
//!    defects in a filter implementation and surface as panics rather than
//!    errors, since silently continuing with a corrupt chain result would
//!    publish an inconsistent snapshot.
//!
//! Everything else the engine encounters at runtime — an edge to a node that
//! is not in the world map, removal of an identifier that does not exist, a
//! cross-project snapshot lookup that comes back empty, a cycle in the
//! dependency graph — is an expected, silently tolerated state, not an error.
//!
//! Public entry points return [`anyhow::Result`], so callers can attach
//! context with [`anyhow::Context`] while still matching on the typed
//! [`SnapshotError`] via [`anyhow::Error::downcast_ref`].

use thiserror::Error;

/// Errors reported by the snapshot engine for caller precondition violations.
///
/// Each variant identifies which required value was missing or empty. These
/// never occur for well-formed input; they exist to fail fast when an
/// upstream provider constructs a malformed record or removal key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A dependency record or removal key carried an empty provider type.
    #[error("dependency record has an empty provider type")]
    EmptyProviderType,

    /// A dependency record or removal key carried an empty item specifier.
    #[error("dependency record for provider '{provider_type}' has an empty item specifier")]
    EmptyItemSpecifier {
        /// Provider type of the offending record.
        provider_type: String,
    },
}
