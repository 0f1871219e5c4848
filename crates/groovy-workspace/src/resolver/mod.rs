//! The Dependency Resolver Registry (spec.md §4.3).
//!
//! A resolver extracts classpath information from an external build tool
//! without blocking the editor: resolution runs on a background task,
//! polls a cancellation flag at every suspension point, and reports coarse
//! progress. Exactly one resolver runs per workspace, picked by which
//! build-system marker file is present; registration order is the
//! priority when more than one marker would match.

mod gradle;
mod maven;

pub use gradle::GradleResolver;
pub use maven::MavenResolver;

use crate::error::{Result, WorkspaceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The classpath + source directories extracted from a build tool, plus
/// the tool's own name for diagnostics and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyResolution {
    pub dependencies: Vec<PathBuf>,
    pub source_directories: Vec<PathBuf>,
    pub tool_name: String,
}

impl DependencyResolution {
    /// Set-equality ignoring order, used by `updateDependencies` to decide
    /// whether a classpath refresh is a genuine change (spec.md §4.6).
    pub fn dependencies_set_eq(&self, other: &Self) -> bool {
        let a: std::collections::HashSet<_> = self.dependencies.iter().collect();
        let b: std::collections::HashSet<_> = other.dependencies.iter().collect();
        a == b
    }
}

/// Cooperative cancellation: checked at every suspension point inside a
/// resolver's `resolve`. Cheap to clone and share across the task that
/// owns resolution and the task that requests cancellation (spec.md §5).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A build-tool-specific resolver. Implementors spawn the external tool
/// and parse its output; `resolve` must check `cancel` before and after
/// every suspension point.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Human-readable tool name, stored on the produced `DependencyResolution`.
    fn name(&self) -> &'static str;

    /// Whether `root` looks like a workspace this resolver can handle
    /// (presence of a characteristic marker file).
    fn matches(&self, root: &Path) -> bool;

    async fn resolve(&self, root: &Path, cancel: &CancellationToken) -> Result<DependencyResolution>;

    /// The build tool's shared local dependency cache/repository, if this
    /// resolver's ecosystem has a conventional one (`~/.gradle/caches`,
    /// `~/.m2/repository`). Used by the Definition Resolver's classpath
    /// fallback to look for extracted sources.
    fn local_repository(&self) -> Option<PathBuf> {
        None
    }
}

/// Holds resolvers in registration-order priority; the first whose
/// `matches` succeeds wins.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn DependencyResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default resolver set in the teacher-style priority
    /// order (Gradle before Maven — Groovy's own primary build tool is
    /// more often Gradle).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GradleResolver::new()));
        registry.register(Arc::new(MavenResolver::new()));
        registry
    }

    pub fn register(&mut self, resolver: Arc<dyn DependencyResolver>) {
        self.resolvers.push(resolver);
    }

    fn pick(&self, root: &Path) -> Option<&Arc<dyn DependencyResolver>> {
        self.resolvers.iter().find(|r| r.matches(root))
    }

    pub async fn resolve(&self, root: &Path) -> Result<DependencyResolution> {
        self.resolve_cancellable(root, &CancellationToken::new()).await
    }

    pub async fn resolve_cancellable(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<DependencyResolution> {
        let Some(resolver) = self.pick(root) else {
            return Ok(DependencyResolution::default());
        };
        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled);
        }
        resolver.resolve(root, cancel).await
    }

    pub fn resolve_local_repository(&self, root: &Path) -> Option<PathBuf> {
        self.pick(root).and_then(|r| r.local_repository())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn registry_picks_first_matching_resolver_in_registration_order() {
        let registry = ResolverRegistry::with_defaults();
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("build.gradle"), "").unwrap();
        std::fs::write(dir.path().join("pom.xml"), "").unwrap();

        let picked = registry.pick(dir.path()).unwrap();
        assert_eq!(picked.name(), "gradle");
    }

    #[test]
    fn registry_yields_empty_resolution_when_no_resolver_matches() {
        let registry = ResolverRegistry::with_defaults();
        let dir = tempdir().unwrap();
        assert!(registry.pick(dir.path()).is_none());
    }

    #[tokio::test]
    async fn cancellation_is_observed_before_resolution_starts() {
        let registry = ResolverRegistry::with_defaults();
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("build.gradle"), "").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = registry.resolve_cancellable(dir.path(), &cancel).await;
        assert!(matches!(result, Err(WorkspaceError::Cancelled)));
    }
}
