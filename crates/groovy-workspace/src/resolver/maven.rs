//! Maven classpath resolution (spec.md §4.3).
//!
//! Shells out to `mvn dependency:build-classpath`, writing the result to a
//! temp file (Maven's plugin only supports file output, not stdout) and
//! reading it back. Source directories follow Maven's fixed convention
//! rather than requiring a query, since `pom.xml` rarely overrides them
//! for Groovy projects built with `gmavenplus`.

use super::{CancellationToken, DependencyResolution, DependencyResolver};
use crate::error::{Result, WorkspaceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub struct MavenResolver;

impl MavenResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for MavenResolver {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn matches(&self, root: &Path) -> bool {
        root.join("pom.xml").exists()
    }

    async fn resolve(&self, root: &Path, cancel: &CancellationToken) -> Result<DependencyResolution> {
        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled);
        }

        let classpath_file = root.join("target").join(".groovy-lsp-classpath.txt");
        if let Some(parent) = classpath_file.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }

        let output = Command::new("mvn")
            .args([
                "-q",
                "dependency:build-classpath",
                &format!("-Dmdep.outputFile={}", classpath_file.display()),
            ])
            .current_dir(root)
            .kill_on_drop(true)
            .output()
            .await;

        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled);
        }

        match output {
            Ok(o) if o.status.success() => {}
            Ok(o) => {
                return Err(WorkspaceError::DependencyResolution(format!(
                    "mvn exited with {}: {}",
                    o.status,
                    String::from_utf8_lossy(&o.stderr)
                )));
            }
            Err(e) => {
                return Err(WorkspaceError::DependencyResolution(format!("failed to launch mvn: {e}")));
            }
        }

        let dependencies = match tokio::fs::read_to_string(&classpath_file).await {
            Ok(contents) => contents
                .trim()
                .split(if cfg!(windows) { ';' } else { ':' })
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(_) => Vec::new(),
        };

        let source_directories = vec![root.join("src/main/groovy"), root.join("src/test/groovy")];

        Ok(DependencyResolution { dependencies, source_directories, tool_name: "maven".into() })
    }

    fn local_repository(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".m2").join("repository"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn matches_pom_xml() {
        let dir = tempdir().unwrap();
        assert!(!MavenResolver::new().matches(dir.path()));
        std::fs::write(dir.path().join("pom.xml"), "").unwrap();
        assert!(MavenResolver::new().matches(dir.path()));
    }

    #[test]
    fn local_repository_defaults_to_dot_m2() {
        let repo = MavenResolver::new().local_repository();
        assert!(repo.is_some());
        assert!(repo.unwrap().ends_with(".m2/repository"));
    }
}
