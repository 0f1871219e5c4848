//! Server configuration (SPEC_FULL.md §4.13).
//!
//! Parsed once from `initialize`'s `initializationOptions`, and again on
//! `workspace/didChangeConfiguration`. Every field has a default, so a
//! client that sends nothing — or sends a value that fails to parse —
//! still gets a working server: deserialization failures fall back to
//! `GroovyConfig::default()` and log a warning rather than rejecting the
//! request, matching spec.md §9's "validate at the boundary".

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilationMode {
    #[default]
    Workspace,
    SingleFile,
}

/// Jenkinsfile/Gradle-DSL catalog flags, accepted and passed through to
/// the external DSL catalog collaborator (not interpreted here).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DslOptions {
    pub jenkins_pipeline: bool,
    pub gradle_dsl: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroovyConfig {
    pub compilation_mode: CompilationMode,
    /// Accepted, not acted upon — the REPL is out of scope for this engine.
    pub repl_enabled: bool,
    pub dsl: DslOptions,
}

impl GroovyConfig {
    /// Parses `value` into a `GroovyConfig`, falling back to the default
    /// and logging a warning on any deserialization failure. Never fails.
    pub fn from_json(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse configuration, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_workspace_mode_with_repl_disabled() {
        let config = GroovyConfig::default();
        assert_eq!(config.compilation_mode, CompilationMode::Workspace);
        assert!(!config.repl_enabled);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let value = serde_json::json!({
            "compilationMode": "single-file",
            "someFutureOption": true,
        });
        let config = GroovyConfig::from_json(value);
        assert_eq!(config.compilation_mode, CompilationMode::SingleFile);
    }

    #[test]
    fn a_value_of_the_wrong_shape_falls_back_to_default() {
        let config = GroovyConfig::from_json(serde_json::json!("not an object"));
        assert_eq!(config, GroovyConfig::default());
    }

    #[test]
    fn dsl_options_pass_through_unchanged() {
        let value = serde_json::json!({
            "dsl": { "jenkinsPipeline": true, "gradleDsl": false },
        });
        let config = GroovyConfig::from_json(value);
        assert!(config.dsl.jenkins_pipeline);
        assert!(!config.dsl.gradle_dsl);
    }
}
