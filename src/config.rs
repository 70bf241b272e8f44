//! Configuration loader.
//!
//! `defaults/westerly.default.toml` is embedded into the binary so the documented defaults
//! and runtime behavior stay in sync. [Loader] layers project files, environment
//! variables and command-line overrides on top before deserializing into
//! [WesterlyConfig].

use crate::options::RewriteOptions;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, Map, ValueKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub use ::config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/westerly.default.toml");

/// Project-level file picked up from the working directory.
pub const PROJECT_FILE: &str = ".westerly.toml";

const ENV_PREFIX: &str = "WESTERLY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WesterlyConfig {
    pub rewrite: RewriteOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    pub diagnostics: DiagnosticFormat,
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for DiagnosticFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticFormat::Text => write!(f, "text"),
            DiagnosticFormat::Json => write!(f, "json"),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `WESTERLY__SECTION__KEY` variables from the process environment.
    pub fn with_environment(self) -> Self {
        self.with_environment_source(None)
    }

    fn with_environment_source(mut self, vars: Option<Map<String, String>>) -> Self {
        let source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("rewrite.decl_macros")
            .source(vars);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<WesterlyConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<WesterlyConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Spacing;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.rewrite, RewriteOptions::default());
        assert_eq!(config.output.diagnostics, DiagnosticFormat::Text);
        assert!(!config.output.strict);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("rewrite.spacing", "padded")
            .expect("override to apply")
            .set_override("rewrite.decl_macros", vec!["API".to_string()])
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.rewrite.spacing, Spacing::Padded);
        assert_eq!(config.rewrite.decl_macros, vec!["API".to_string()]);
    }

    #[test]
    fn layers_files_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[output]\nstrict = true\n\n[rewrite]\nrelocate_volatile = false")
            .expect("write config");

        let config = Loader::new().with_file(file.path()).build().expect("config to build");
        assert!(config.output.strict);
        assert!(!config.rewrite.relocate_volatile);
        assert_eq!(config.rewrite.spacing, Spacing::Compact);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/.westerly.toml")
            .build()
            .expect("config to build");
        assert_eq!(config, load_defaults().unwrap());
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/definitely/not/here/westerly.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn reads_environment_variables() {
        let vars = Map::from([
            ("WESTERLY__OUTPUT__DIAGNOSTICS".to_string(), "json".to_string()),
            ("WESTERLY__REWRITE__DECL_MACROS".to_string(), "A,B".to_string()),
        ]);
        let config = Loader::new()
            .with_environment_source(Some(vars))
            .build()
            .expect("config to build");
        assert_eq!(config.output.diagnostics, DiagnosticFormat::Json);
        assert_eq!(config.rewrite.decl_macros, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn rejects_unknown_spacing() {
        let result = Loader::new()
            .set_override("rewrite.spacing", "sideways")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
