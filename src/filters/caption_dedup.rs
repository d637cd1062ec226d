//! Caption de-duplication policy.
//!
//! Two top-level dependencies of the same provider type can legitimately
//! share a caption (two project references both named `Helpers`, say). To
//! keep siblings distinguishable both sides are given the alias
//! `"{caption} ({original_item_specifier})"` — the incoming dependency as
//! its accepted replacement, the pre-existing collider as a side-effect
//! update — using the same suffixing rule so the outcome is deterministic
//! regardless of arrival order.
//!
//! Only exact token matches collide. A caption that merely shares a prefix
//! with a sibling's (`caption` vs `captionX`) is left alone. A match is
//! also recognized against the unsuffixed prefix of an alias applied in an
//! earlier batch, so re-adding one half of a pair does not un-alias it.

use std::sync::Arc;

use crate::model::Dependency;

use super::context::AddDependencyContext;
use super::DependenciesSnapshotFilter;

/// Aliases caption collisions among top-level siblings.
pub struct CaptionDeduplicationFilter;

impl DependenciesSnapshotFilter for CaptionDeduplicationFilter {
    fn before_add_or_update(
        &self,
        dependency: &Arc<Dependency>,
        context: &mut AddDependencyContext<'_>,
    ) {
        if !dependency.top_level {
            context.accept(Arc::clone(dependency));
            return;
        }

        let collisions: Vec<Arc<Dependency>> = context
            .iter()
            .filter(|other| {
                other.top_level
                    && other.is_provider(&dependency.provider_type)
                    && other.id != dependency.id
                    && (other.caption == dependency.caption
                        || other.caption
                            == Dependency::alias(
                                &dependency.caption,
                                &other.original_item_specifier,
                            ))
            })
            .cloned()
            .collect();

        if collisions.is_empty() {
            context.accept(Arc::clone(dependency));
            return;
        }

        for other in collisions {
            let alias = Dependency::alias(&dependency.caption, &other.original_item_specifier);
            if other.caption != alias {
                tracing::debug!(
                    id = %other.id,
                    alias = %alias,
                    "aliasing pre-existing caption collider"
                );
                context.add_or_update(Arc::new(other.with_caption(alias)));
            }
        }

        let alias =
            Dependency::alias(&dependency.caption, &dependency.original_item_specifier);
        context.accept(Arc::new(dependency.with_caption(alias)));
    }
}
