//! Config persistence and path resolution for `Config`.
//!
//! Covers:
//! - `load_from` / `save_to` (YAML file I/O with atomic write)
//! - XDG-style path helpers (`config_path`, `config_dir`)
//! - The [`ConfigStore`] interface and its file-backed implementation

use super::Config;
use crate::error::ConfigError;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "KROKI_BLOCKS_CONFIG";

/// Load/save boundary for settings.
///
/// Everything that needs settings receives a `&Config`; only the settings
/// surface goes through a store.
pub trait ConfigStore {
    /// Load the persisted settings merged over the defaults.
    fn load(&self) -> Result<Config>;

    /// Persist the settings.
    fn save(&self, config: &Config) -> Result<()>;
}

/// YAML file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the explicit path if given, otherwise at
    /// `$KROKI_BLOCKS_CONFIG`, otherwise at [`Config::config_path`].
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(Config::config_path()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileStore {
    fn load(&self) -> Result<Config> {
        Config::load_from(&self.path)
    }

    fn save(&self, config: &Config) -> Result<()> {
        config.save_to(&self.path)
    }
}

impl Config {
    /// Load configuration from the default path or create it.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or write and return defaults if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        log::info!("Config path: {:?}", path);

        if path.exists() {
            log::info!("Loading existing config from {:?}", path);
            let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

            let mut config = if contents.trim().is_empty() {
                log::warn!("Config file {:?} is empty, using defaults", path);
                Self::default()
            } else {
                serde_yaml_ng::from_str::<Config>(&contents).map_err(ConfigError::Parse)?
            };

            config.normalize();

            // Merge in any new default diagram types that don't exist in user's config
            config.merge_default_diagram_types();

            Ok(config)
        } else {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            log::info!("Default config created successfully");
            Ok(config)
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::Serialize)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(|e| ConfigError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| ConfigError::io(path, e))?;

        log::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("kroki-blocks")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // ~/.config/kroki-blocks on all unix platforms, macOS included
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("kroki-blocks")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
