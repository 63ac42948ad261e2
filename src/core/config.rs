//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::aggregate::{SkipMarker, DOC_GEN_ANNOTATION, DO_NOT_DOCUMENT};
use crate::schema::DEFAULT_COLUMN_BUDGET;

/// Project-local config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".docgen.yaml";

/// docgen configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default file for `docgen generate` instead of stdout
    pub output: Option<PathBuf>,

    /// Total width available to schema comments
    pub column_budget: Option<usize>,

    /// Constraint annotation marking tests to leave undocumented
    pub skip_annotation: Option<String>,

    /// Value of `skip_annotation` that suppresses documentation
    pub skip_value: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let global = Self::global_config_path();
        Self::load_layers(
            global.as_deref(),
            Path::new(PROJECT_CONFIG_FILE),
            |key| std::env::var(key).ok(),
        )
    }

    /// Merge the global file, the project file and environment overrides
    pub fn load_layers(
        global: Option<&Path>,
        project: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/docgen/config.yaml)
        if let Some(global) = global.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Project config (./.docgen.yaml)
        if let Some(project) = Self::read_file(project) {
            config.merge(project);
        }

        // 4. Environment variables
        if let Some(output) = env("DOCGEN_OUTPUT").filter(|o| !o.is_empty()) {
            config.output = Some(PathBuf::from(output));
        }
        if let Some(columns) = env("DOCGEN_COLUMNS") {
            match columns.trim().parse() {
                Ok(columns) => config.column_budget = Some(columns),
                Err(_) => warn!(value = %columns, "ignoring non-numeric DOCGEN_COLUMNS"),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| warn!(path = %path.display(), error = %e, "cannot read config"))
            .ok()?;
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| warn!(path = %path.display(), error = %e, "ignoring invalid config"))
            .ok()
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docgen")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.column_budget.is_some() {
            self.column_budget = other.column_budget;
        }
        if other.skip_annotation.is_some() {
            self.skip_annotation = other.skip_annotation;
        }
        if other.skip_value.is_some() {
            self.skip_value = other.skip_value;
        }
    }

    pub fn column_budget(&self) -> usize {
        self.column_budget.unwrap_or(DEFAULT_COLUMN_BUDGET)
    }

    pub fn skip_marker(&self) -> SkipMarker {
        SkipMarker {
            annotation: self
                .skip_annotation
                .clone()
                .unwrap_or_else(|| DOC_GEN_ANNOTATION.to_string()),
            value: self
                .skip_value
                .clone()
                .unwrap_or_else(|| DO_NOT_DOCUMENT.to_string()),
        }
    }
}
