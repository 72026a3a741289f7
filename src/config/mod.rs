//! Configuration System
//!
//! Loads configuration from YAML files with a cascading priority system:
//! 1. `./meshaddr.yaml` (current directory - highest priority)
//! 2. `~/.config/meshaddr/meshaddr.yaml` (user config directory)
//! 3. `/etc/meshaddr/meshaddr.yaml` (system - lowest priority)
//!
//! Values from higher priority files override those from lower priority files.
//!
//! # YAML Structure
//!
//! ```yaml
//! overlay:
//!   broadcast_slots: 1024
//!   explain_mtu: 1024
//!   unicast_ttl: 64
//!   max_subscribers: 65536
//! hosts:
//!   - sid: "7f3a...e1"
//!     interface: eth0
//!     address: 192.168.1.20
//!     port: 4110
//! ```

mod host;
mod overlay;

use crate::{IdentityError, Sid};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use host::{DEFAULT_HOST_PORT, HostConfig};
pub use overlay::OverlayConfig;

/// Default config filename.
const CONFIG_FILENAME: &str = "meshaddr.yaml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("host {sid}: {source}")]
    InvalidHost { sid: String, source: IdentityError },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity layer tuning (`overlay.*`).
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Statically known unicast hosts (`hosts`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<HostConfig>,
}

impl Config {
    /// Create a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the standard search paths.
    ///
    /// Returns a tuple of (config, paths_loaded) where paths_loaded contains
    /// the paths that were successfully loaded.
    pub fn load() -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let search_paths = Self::search_paths();
        Self::load_from_paths(&search_paths)
    }

    /// Load configuration from specific paths.
    ///
    /// Paths are processed in order, with later paths overriding earlier ones.
    pub fn load_from_paths(paths: &[PathBuf]) -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let mut config = Config::default();
        let mut loaded_paths = Vec::new();

        for path in paths {
            if path.exists() {
                let file_config = Self::load_file(path)?;
                config.merge(file_config);
                loaded_paths.push(path.clone());
            }
        }

        config.validate()?;
        Ok((config, loaded_paths))
    }

    /// Load configuration from a single file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the standard search paths in priority order (lowest to highest).
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System config (lowest priority)
        paths.push(PathBuf::from("/etc/meshaddr").join(CONFIG_FILENAME));

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("meshaddr").join(CONFIG_FILENAME));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".meshaddr.yaml"));
        }

        // Current directory (highest priority)
        paths.push(PathBuf::from(".").join(CONFIG_FILENAME));

        paths
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Config) {
        self.overlay.merge(other.overlay);
        // Hosts replace wholesale if non-empty
        if !other.hosts.is_empty() {
            self.hosts = other.hosts;
        }
    }

    /// Check that every configured host names a valid SID.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for host in &self.hosts {
            host.sid().map_err(|source| ConfigError::InvalidHost {
                sid: host.sid.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Get the configured hosts.
    pub fn hosts(&self) -> &[HostConfig] {
        &self.hosts
    }

    /// Find the static host entry for `sid`.
    pub fn host_for(&self, sid: &Sid) -> Option<&HostConfig> {
        self.hosts
            .iter()
            .find(|h| h.sid().is_ok_and(|parsed| parsed == *sid))
    }

    /// Serialize this configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
