//! Gradle classpath resolution (spec.md §4.3).
//!
//! Shells out to the project's Gradle wrapper (falling back to `gradle`
//! on `PATH`) with a small init script that prints every source set's
//! Groovy source directories and compile classpath as simple prefixed
//! lines. Real classpath extraction is inherently tool- and
//! project-specific; this resolver covers the common case of a
//! `compileClasspath`-style configuration per source set.

use super::{CancellationToken, DependencyResolution, DependencyResolver};
use crate::error::{Result, WorkspaceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const INIT_SCRIPT: &str = r#"
allprojects {
    tasks.register("groovyLspClasspath") {
        doLast {
            sourceSets.all { ss ->
                println "SRC:" + ss.groovy.srcDirs.join(",")
                println "CP:" + ss.compileClasspath.files.join(",")
            }
        }
    }
}
"#;

pub struct GradleResolver;

impl GradleResolver {
    pub fn new() -> Self {
        Self
    }

    fn wrapper(root: &Path) -> PathBuf {
        let name = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
        let candidate = root.join(name);
        if candidate.exists() { candidate } else { PathBuf::from("gradle") }
    }
}

impl Default for GradleResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for GradleResolver {
    fn name(&self) -> &'static str {
        "gradle"
    }

    fn matches(&self, root: &Path) -> bool {
        ["build.gradle", "build.gradle.kts", "settings.gradle", "settings.gradle.kts"]
            .iter()
            .any(|f| root.join(f).exists())
    }

    async fn resolve(&self, root: &Path, cancel: &CancellationToken) -> Result<DependencyResolution> {
        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled);
        }

        let init_script = root.join(".groovy-lsp-init.gradle");
        tokio::fs::write(&init_script, INIT_SCRIPT)
            .await
            .map_err(|e| WorkspaceError::Io { path: init_script.display().to_string(), source: e })?;

        let output = Command::new(Self::wrapper(root))
            .args(["--init-script", &init_script.to_string_lossy(), "-q", "groovyLspClasspath"])
            .current_dir(root)
            .kill_on_drop(true)
            .output()
            .await;

        let _ = tokio::fs::remove_file(&init_script).await;

        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled);
        }

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                return Err(WorkspaceError::DependencyResolution(format!(
                    "gradle exited with {}: {}",
                    o.status,
                    String::from_utf8_lossy(&o.stderr)
                )));
            }
            Err(e) => {
                return Err(WorkspaceError::DependencyResolution(format!("failed to launch gradle: {e}")));
            }
        };

        Ok(parse_output(root, &String::from_utf8_lossy(&output.stdout)))
    }

    fn local_repository(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gradle").join("caches"))
    }
}

/// Parses the `SRC:`/`CP:` lines the init script prints. Falls back to
/// the conventional `src/main/groovy` + `src/test/groovy` directories if
/// the task produced no `SRC:` lines at all (e.g. an empty project with
/// no source sets yet).
fn parse_output(root: &Path, stdout: &str) -> DependencyResolution {
    let mut dependencies = Vec::new();
    let mut source_directories = Vec::new();

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("SRC:") {
            source_directories.extend(rest.split(',').filter(|s| !s.is_empty()).map(PathBuf::from));
        } else if let Some(rest) = line.strip_prefix("CP:") {
            dependencies.extend(rest.split(',').filter(|s| !s.is_empty()).map(PathBuf::from));
        }
    }

    if source_directories.is_empty() {
        source_directories.push(root.join("src/main/groovy"));
        source_directories.push(root.join("src/test/groovy"));
    }

    DependencyResolution { dependencies, source_directories, tool_name: "gradle".into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn matches_any_gradle_marker_file() {
        let dir = tempdir().unwrap();
        assert!(!GradleResolver::new().matches(dir.path()));
        std::fs::write(dir.path().join("settings.gradle.kts"), "").unwrap();
        assert!(GradleResolver::new().matches(dir.path()));
    }

    #[test]
    fn parse_output_falls_back_to_conventional_dirs_when_empty() {
        let resolution = parse_output(Path::new("/root"), "");
        assert_eq!(resolution.source_directories, vec![
            PathBuf::from("/root/src/main/groovy"),
            PathBuf::from("/root/src/test/groovy"),
        ]);
    }

    #[test]
    fn parse_output_reads_src_and_cp_lines() {
        let stdout = "SRC:/p/src/main/groovy\nCP:/p/libs/a.jar,/p/libs/b.jar\n";
        let resolution = parse_output(Path::new("/p"), stdout);
        assert_eq!(resolution.source_directories, vec![PathBuf::from("/p/src/main/groovy")]);
        assert_eq!(resolution.dependencies.len(), 2);
    }
}
