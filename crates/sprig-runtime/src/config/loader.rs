//! Layered configuration loading.
//!
//! Sources, lowest priority first:
//!
//! 1. [`SprigConfig::default`]
//! 2. the main file, `sprig.toml` or `sprig.yaml` / `sprig.yml`
//! 3. its profile variant in the same directory, e.g. `sprig.production.toml`
//! 4. `SPRIG_*` environment variables, `__` between nested keys
//!    (`SPRIG_LOGGING__LEVEL=debug`, `SPRIG_SERVICES__ROOT=[greeter]`)
//! 5. values given to [`ConfigLoader::merge`] or [`ConfigLoader::set`]
//!
//! Only formats whose feature is enabled (`toml-config`, `yaml-config`) are
//! searched or accepted. The first search directory holding a main file wins;
//! a profile variant without a main file next to it is ignored.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .with_current_dir()
//!     .profile("production")
//!     .set("services.root", ["greeter"])
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SprigConfig;
use super::validation::validate_config;

/// File stem of every configuration file.
const STEM: &str = "sprig";

/// Which profile variant of the configuration file to layer on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Case-insensitive; `dev` and `prod` are accepted.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            other => Self::Custom(other.to_string()),
        }
    }

    /// `SPRIG_PROFILE`, or [`Profile::Development`] when unset.
    pub fn from_env() -> Self {
        std::env::var("SPRIG_PROFILE")
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a [`SprigConfig`] from files, the environment and overrides.
pub struct ConfigLoader {
    profile: Profile,
    search_dirs: Vec<PathBuf>,
    file: Option<PathBuf>,
    env: bool,
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Profile from `SPRIG_PROFILE`, environment variables on, no search
    /// directories (the current and user config directories are used then).
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_dirs: Vec::new(),
            file: None,
            env: true,
            overrides: Figment::new(),
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Appends a directory to search for `sprig.*`.
    pub fn search_path(mut self, dir: impl AsRef<Path>) -> Self {
        self.search_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(e) => {
                warn!(error = %e, "Current directory unavailable, not searching it");
                self
            }
        }
    }

    /// Loads exactly this file (and its profile variant) instead of searching.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env = false;
        self
    }

    /// Overrides every field with the values in `config`, defaults included.
    pub fn merge(mut self, config: SprigConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Overrides the single dotted `key`, e.g. `"logging.level"`.
    pub fn set<V: Serialize>(mut self, key: &str, value: V) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Merges every source, then validates the result.
    pub fn load(self) -> ConfigResult<SprigConfig> {
        let files = self.discover()?;
        if files.is_empty() {
            warn!(profile = %self.profile, "No configuration file found, using defaults");
        }

        let mut figment = Figment::from(Serialized::defaults(SprigConfig::default()));
        for path in &files {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, path)?;
        }
        if self.env {
            figment = figment.merge(Env::prefixed("SPRIG_").split("__"));
        }
        figment = figment.merge(self.overrides);

        let config: SprigConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate_config(&config)?;

        debug!(
            profile = %self.profile,
            files = files.len(),
            root_services = config.services.root.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Files to merge, lowest priority first.
    fn discover(&self) -> ConfigResult<Vec<PathBuf>> {
        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            return Ok(self.with_variant(path));
        }

        let dirs = if self.search_dirs.is_empty() {
            default_dirs()
        } else {
            self.search_dirs.clone()
        };
        for dir in dirs {
            for ext in extensions() {
                let main = dir.join(format!("{STEM}.{ext}"));
                if main.exists() {
                    return Ok(self.with_variant(&main));
                }
            }
        }
        Ok(Vec::new())
    }

    fn with_variant(&self, main: &Path) -> Vec<PathBuf> {
        let mut files = vec![main.to_path_buf()];
        files.extend(profile_variant(main, &self.profile).filter(|path| path.exists()));
        files
    }
}

/// `dir/sprig.toml` → `dir/sprig.<profile>.toml`.
fn profile_variant(main: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = main.file_stem()?.to_str()?;
    let ext = main.extension()?.to_str()?;
    Some(main.with_file_name(format!("{stem}.{profile}.{ext}")))
}

fn default_dirs() -> Vec<PathBuf> {
    std::env::current_dir()
        .ok()
        .into_iter()
        .chain(dirs::config_dir().map(|dir| dir.join(STEM)))
        .collect()
}

/// Extensions searched for, in order.
#[allow(unused_mut)]
fn extensions() -> Vec<&'static str> {
    let mut exts = Vec::new();
    #[cfg(feature = "toml-config")]
    exts.push("toml");
    #[cfg(feature = "yaml-config")]
    exts.extend(["yaml", "yml"]);
    exts
}

fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    match path.extension().and_then(|ext| ext.to_str()) {
        #[cfg(feature = "toml-config")]
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        Some("yaml" | "yml") => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "{} is not in an enabled configuration format",
            path.display()
        ))),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SprigConfig> {
    ConfigLoader::new().load()
}
