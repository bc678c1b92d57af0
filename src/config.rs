//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/edgebundle/edgebundle.toml`
//! 3. Local config: `./.edgebundle.toml`, or the file given with `--config`
//! 4. Environment variables: `EDGEBUNDLE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{DEFAULT_BETA, DEFAULT_DELIMITER, MAX_SPLIT_DEPTH};

pub const LOCAL_CONFIG_FILE: &str = ".edgebundle.toml";

/// Unified configuration for edgebundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Separator between name segments (default: ".")
    pub delimiter: String,
    /// Each edge is cut into 2^split_depth colored fragments (default: 6)
    pub split_depth: u32,
    /// Bundling strength in [0, 1] (default: 0.85)
    pub beta: f64,
    /// Diagram width; the leaf ring radius is width / 2 - label_margin
    pub width: f64,
    /// Room left outside the leaf ring for labels
    pub label_margin: f64,
    /// Segment of a synthesized root holding all top-level records
    pub implicit_root: Option<String>,
    /// Order children by height, then name
    pub sort: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            split_depth: 6,
            beta: DEFAULT_BETA,
            width: 1000.0,
            label_margin: 150.0,
            implicit_root: None,
            sort: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub delimiter: Option<String>,
    pub split_depth: Option<u32>,
    pub beta: Option<f64>,
    pub width: Option<f64>,
    pub label_margin: Option<f64>,
    pub implicit_root: Option<String>,
    pub sort: Option<bool>,
}

/// Get the XDG config directory for edgebundle.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "edgebundle").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("edgebundle.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Radius of the leaf ring.
    pub fn outer_radius(&self) -> f64 {
        (self.width / 2.0 - self.label_margin).max(0.0)
    }

    /// Merge overlay config onto self: overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            delimiter: overlay
                .delimiter
                .clone()
                .unwrap_or_else(|| self.delimiter.clone()),
            split_depth: overlay.split_depth.unwrap_or(self.split_depth),
            beta: overlay.beta.unwrap_or(self.beta),
            width: overlay.width.unwrap_or(self.width),
            label_margin: overlay.label_margin.unwrap_or(self.label_margin),
            implicit_root: overlay
                .implicit_root
                .clone()
                .or_else(|| self.implicit_root.clone()),
            sort: overlay.sort.unwrap_or(self.sort),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; when None, `./.edgebundle.toml`
    ///   is used if present. An explicit file must exist.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        match local {
            Some(path) => {
                debug!("local config: {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let path = local_config_path(Path::new("."));
                if path.exists() {
                    debug!("local config: {}", path.display());
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply EDGEBUNDLE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("EDGEBUNDLE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("delimiter") {
            settings.delimiter = val;
        }
        if let Ok(val) = config.get::<u32>("split_depth") {
            settings.split_depth = val;
        }
        if let Ok(val) = config.get_float("beta") {
            settings.beta = val;
        }
        if let Ok(val) = config.get_float("width") {
            settings.width = val;
        }
        if let Ok(val) = config.get_float("label_margin") {
            settings.label_margin = val;
        }
        if let Ok(val) = config.get_string("implicit_root") {
            settings.implicit_root = Some(val);
        }
        if let Ok(val) = config.get_bool("sort") {
            settings.sort = val;
        }

        Ok(settings)
    }

    /// Reject values no bundling run can use.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let fail = |message: String| Err(ApplicationError::Config { message });
        if self.delimiter.is_empty() {
            return fail("delimiter must not be empty".into());
        }
        if self.split_depth > MAX_SPLIT_DEPTH {
            return fail(format!(
                "split_depth must be at most {}, got {}",
                MAX_SPLIT_DEPTH, self.split_depth
            ));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return fail(format!("beta must be within [0, 1], got {}", self.beta));
        }
        if self.width <= 0.0 {
            return fail(format!("width must be positive, got {}", self.width));
        }
        Ok(())
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
