//! Worker version ranges and selection (spec.md §4.1).
//!
//! A "worker" is a backend capable of handling a range of Groovy language
//! versions with a declared feature set. The selector is a pure function:
//! same descriptor list + same request always yields the same answer.

use std::cmp::Ordering;

/// A dotted Groovy version identifier (`major.minor.patch`), zero-padded
/// the way the teacher's `normalize_and_parse_version` pads Cargo
/// versions (`"8"` -> `8.0.0`, `"2.5"` -> `2.5.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroovyVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GroovyVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Parses `"3"`, `"3.0"`, or `"3.0.9"`, zero-padding missing components.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map(str::parse).transpose().ok()?.unwrap_or(0);
        let patch = parts.next().map(str::parse).transpose().ok()?.unwrap_or(0);
        Some(Self { major, minor, patch })
    }
}

impl std::fmt::Display for GroovyVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// An inclusive version range, unbounded above when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: GroovyVersion,
    pub max: Option<GroovyVersion>,
}

impl VersionRange {
    pub const fn new(min: GroovyVersion, max: Option<GroovyVersion>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, version: GroovyVersion) -> bool {
        version >= self.min && self.max.is_none_or(|max| version <= max)
    }
}

/// Capabilities a worker may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Ast,
    Symbols,
}

/// A registered worker: an id, the version range it covers, and the
/// features it implements.
#[derive(Debug, Clone)]
pub struct WorkerDescriptor {
    pub id: String,
    pub range: VersionRange,
    pub features: Vec<Feature>,
}

impl WorkerDescriptor {
    fn supports(&self, required: &[Feature]) -> bool {
        required.iter().all(|f| self.features.contains(f))
    }
}

/// Selects the best-matching worker for `(requested_version, required_features)`.
///
/// Among descriptors whose range contains `requested_version` and whose
/// features are a superset of `required_features`, the candidate with the
/// highest lower bound wins; ties break on the widest upper bound, then on
/// `id` ascending. Pure function of its inputs.
pub fn select_worker<'a>(
    descriptors: &'a [WorkerDescriptor],
    requested_version: GroovyVersion,
    required_features: &[Feature],
) -> Option<&'a WorkerDescriptor> {
    descriptors
        .iter()
        .filter(|d| d.range.contains(requested_version) && d.supports(required_features))
        .max_by(|a, b| {
            a.range
                .min
                .cmp(&b.range.min)
                .then_with(|| cmp_upper_bound(a.range.max, b.range.max))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Unbounded (`None`) compares as greater than any bound.
fn cmp_upper_bound(a: Option<GroovyVersion>, b: Option<GroovyVersion>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

/// Validates that every descriptor id is unique. Registration against a
/// list with a duplicate id is rejected by the caller (the workspace's
/// worker registry), not by `select_worker` itself, which stays a pure
/// query over whatever list it is given.
pub fn has_duplicate_ids(descriptors: &[WorkerDescriptor]) -> bool {
    let mut seen = std::collections::HashSet::new();
    !descriptors.iter().all(|d| seen.insert(d.id.as_str()))
}
