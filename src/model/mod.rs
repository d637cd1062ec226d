//! Dependency identity and the normalized dependency model.
//!
//! Leaf layer of the engine: value types with no knowledge of snapshots or
//! filters. [`DependencyRecord`] is what providers produce;
//! [`Dependency`] is what the world map stores.

pub mod dependency;
pub mod icons;
pub mod identifier;
pub mod provider;
pub mod tags;

pub use dependency::{Dependency, DependencyRecord};
pub use icons::{IconMoniker, IconSet};
pub use identifier::{DependencyId, Target};
pub use provider::{ProviderCatalog, ProviderDescriptor, ProviderRegistry, provider_types};
pub use tags::DependencyTags;
