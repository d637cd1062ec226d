//! SDK/package correlation policy.
//!
//! An SDK reference and a NuGet package reference sharing the same target
//! and name are two views of one logical dependency: the SDK declares it,
//! the package restore resolves it. Whichever side arrives first, the SDK
//! side must end up reflecting the package side's resolution state:
//!
//! - an unresolved SDK arriving while its package is already resolved is
//!   promoted in place (same-entry transformation);
//! - a resolved package arriving while its SDK is unresolved promotes the
//!   SDK as a side-effect update;
//! - removing the package downgrades the SDK back to unresolved with no
//!   children, again as a side effect.

use std::sync::Arc;

use crate::model::{provider_types, Dependency, DependencyId};

use super::context::{AddDependencyContext, RemoveDependencyContext};
use super::DependenciesSnapshotFilter;

/// Keeps SDK references in sync with their package counterparts.
pub struct SdkPackageCorrelationFilter;

/// Id of the counterpart entry under the other provider type.
fn counterpart_id(
    context_target: &crate::model::Target,
    provider_type: &str,
    name: &str,
) -> DependencyId {
    DependencyId::new(context_target, provider_type, name)
}

impl DependenciesSnapshotFilter for SdkPackageCorrelationFilter {
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        // SDK side arriving unresolved: adopt the already-resolved package's
        // state if its counterpart is present.
        if dependency.is_provider(provider_types::SDK) && !dependency.resolved {
            let package_id =
                counterpart_id(context.target(), provider_types::PACKAGE, &dependency.name);
            let package = context
                .get(&package_id)
                .filter(|p| p.is_provider(provider_types::PACKAGE) && p.resolved)
                .cloned();
            if let Some(package) = package {
                tracing::debug!(
                    id = %dependency.id,
                    package = %package.id,
                    "promoting SDK reference from resolved package counterpart"
                );
                context.accept(Arc::new(
                    dependency.to_resolved(package.dependency_ids.clone()),
                ));
                return;
            }
        }

        // Package side arriving resolved: promote an unresolved SDK
        // counterpart as a side effect.
        if dependency.is_provider(provider_types::PACKAGE) && dependency.resolved {
            let sdk_id = counterpart_id(context.target(), provider_types::SDK, &dependency.name);
            let sdk = context
                .get(&sdk_id)
                .filter(|s| s.is_provider(provider_types::SDK) && !s.resolved)
                .cloned();
            if let Some(sdk) = sdk {
                tracing::debug!(
                    id = %dependency.id,
                    sdk = %sdk.id,
                    "promoting SDK counterpart of resolved package"
                );
                context.add_or_update(Arc::new(sdk.to_resolved(dependency.dependency_ids.clone())));
            }
        }

        context.accept(Arc::clone(dependency));
    }

    fn before_remove(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut RemoveDependencyContext<'_>,
    ) {
        if dependency.is_provider(provider_types::PACKAGE) {
            let sdk_id = counterpart_id(context.target(), provider_types::SDK, &dependency.name);
            let sdk = context
                .get(&sdk_id)
                .filter(|s| s.is_provider(provider_types::SDK) && s.resolved)
                .cloned();
            if let Some(sdk) = sdk {
                tracing::debug!(
                    id = %dependency.id,
                    sdk = %sdk.id,
                    "downgrading SDK counterpart of removed package"
                );
                context.add_or_update(Arc::new(sdk.to_unresolved(Vec::new())));
            }
        }
        context.accept();
    }
}
