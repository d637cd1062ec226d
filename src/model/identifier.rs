//! Canonical dependency identity.
//!
//! Every dependency in a target's world map is keyed by a [`DependencyId`]:
//! the target moniker, provider type, and normalized item specifier joined by
//! backslashes, e.g. `net8.0\package\Newtonsoft.Json`. Normalization replaces
//! path-traversal segments (`..`) with `__` so identifiers never climb out of
//! their provider namespace, and unifies `/` and `\` separators.
//!
//! Identifiers and target monikers preserve their original display text but
//! compare, order, and hash ASCII case-insensitively. Two dependencies are
//! the same logical entity iff their provider type and id match under that
//! comparison; the id is the stable diffing key across updates.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Separator between the target, provider, and specifier parts of an id.
pub const ID_SEPARATOR: char = '\\';

/// Placeholder substituted for `..` path segments during normalization.
const TRAVERSAL_PLACEHOLDER: &str = "__";

/// One build configuration axis value (e.g. one target framework moniker).
///
/// A project can have a distinct dependency graph per target. Display text is
/// preserved as supplied; equality, ordering, and hashing are ASCII
/// case-insensitive, so `net8.0` and `NET8.0` are the same target.
#[derive(Debug, Clone)]
pub struct Target {
    moniker: Arc<str>,
}

impl Target {
    /// Create a target from its framework moniker.
    pub fn new(moniker: impl Into<Arc<str>>) -> Self {
        Self {
            moniker: moniker.into(),
        }
    }

    /// The moniker as originally supplied.
    #[must_use]
    pub fn moniker(&self) -> &str {
        &self.moniker
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.moniker.eq_ignore_ascii_case(&other.moniker)
    }
}

impl Eq for Target {}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_ascii_case(&self.moniker, &other.moniker)
    }
}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.moniker, state);
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.moniker)
    }
}

impl From<&str> for Target {
    fn from(moniker: &str) -> Self {
        Self::new(moniker.to_string())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.moniker)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// Canonical, hierarchical identifier of one dependency within one target.
///
/// Built as `target\provider\normalized(item_specifier)`. The id is stable
/// for the lifetime of one logical dependency across updates and is the key
/// of the per-target world map. Comparison is ASCII case-insensitive while
/// the display string keeps the original casing.
#[derive(Debug, Clone)]
pub struct DependencyId {
    id: Arc<str>,
}

impl DependencyId {
    /// Compute the canonical id for a dependency.
    pub fn new(target: &Target, provider_type: &str, item_specifier: &str) -> Self {
        let normalized = normalize_item_specifier(item_specifier);
        let mut id = String::with_capacity(
            target.moniker().len() + provider_type.len() + normalized.len() + 2,
        );
        id.push_str(target.moniker());
        id.push(ID_SEPARATOR);
        id.push_str(provider_type);
        id.push(ID_SEPARATOR);
        id.push_str(&normalized);
        Self { id: id.into() }
    }

    /// Wrap an already-qualified id string, e.g. one read back from a
    /// dependency's child list.
    pub fn from_raw(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }

    /// The id as a display string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl PartialEq for DependencyId {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for DependencyId {}

impl PartialOrd for DependencyId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyId {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_ascii_case(&self.id, &other.id)
    }
}

impl Hash for DependencyId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.id, state);
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for DependencyId {
    fn from(id: &str) -> Self {
        Self::from_raw(id.to_string())
    }
}

impl Serialize for DependencyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl<'de> Deserialize<'de> for DependencyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_raw(String::deserialize(deserializer)?))
    }
}

/// Normalize a provider-relative item specifier for use inside an id.
///
/// Splits on both `/` and `\`, replaces `..` segments with `__`, and joins
/// with the canonical backslash separator. `../../x` becomes `__\__\x`.
#[must_use]
pub fn normalize_item_specifier(item_specifier: &str) -> String {
    let mut normalized = String::with_capacity(item_specifier.len());
    for (i, segment) in item_specifier.split(['/', '\\']).enumerate() {
        if i > 0 {
            normalized.push(ID_SEPARATOR);
        }
        if segment == ".." {
            normalized.push_str(TRAVERSAL_PLACEHOLDER);
        } else {
            normalized.push_str(segment);
        }
    }
    normalized
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|b| b.to_ascii_lowercase());
    let b = b.bytes().map(|b| b.to_ascii_lowercase());
    a.cmp(b)
}

fn hash_ignore_ascii_case<H: Hasher>(s: &str, state: &mut H) {
    for b in s.bytes() {
        state.write_u8(b.to_ascii_lowercase());
    }
    // Length terminator, mirroring how str hashes with a suffix so that
    // ("ab", "c") and ("a", "bc") cannot collide when hashed in sequence.
    state.write_u8(0xff);
}
