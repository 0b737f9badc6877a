//! Configuration management
//!
//! Configuration is stored as TOML in `$MFS_CONFIG_DIR/config.toml`, or
//! `<platform config dir>/mfs/config.toml` when the variable is unset.
//! A missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alias::Alias;
use crate::error::{Error, Result};
use crate::resource::Classpath;
use crate::resource_fs::{COMPILED_CLASS_SUFFIX, Scope};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "MFS_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";
const CONFIG_VERSION: &str = "1";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Alias>,

    #[serde(default)]
    pub resources: ResourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: Defaults::default(),
            aliases: Vec::new(),
            resources: ResourceConfig::default(),
        }
    }
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

/// Output defaults applied when no flag overrides them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// `human` or `json`
    #[serde(default = "default_output")]
    pub output: String,

    /// `auto`, `always` or `never`
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "human".to_string()
}

fn default_color() -> String {
    "auto".to_string()
}

/// Resource search path and scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Directories and `.jar`/`.zip` archives, searched in order
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Allowed path prefixes; unrestricted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    /// Entry suffixes hidden from archive-aware listings
    #[serde(default = "default_exclude_suffixes")]
    pub exclude_suffixes: Vec<String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            allow: None,
            exclude_suffixes: default_exclude_suffixes(),
        }
    }
}

fn default_exclude_suffixes() -> Vec<String> {
    vec![COMPILED_CLASS_SUFFIX.to_string()]
}

impl ResourceConfig {
    /// Search path built from `roots`
    pub fn classpath(&self) -> Classpath {
        Classpath::from_roots(self.roots.iter().cloned())
    }

    /// Allow-list built from `allow`
    pub fn scope(&self) -> Scope {
        match &self.allow {
            Some(prefixes) => Scope::allow(prefixes.iter().cloned()),
            None => Scope::unrestricted(),
        }
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Locate the configuration file from the environment
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?
                .join("mfs"),
        };
        Ok(Self::with_path(dir.join(CONFIG_FILE)))
    }

    /// Use an explicit configuration file path
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, defaulting when the file is missing
    pub fn load(&self) -> Result<Config> {
        let content = match std::fs::read_to_string(&self.config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.config_path.display(),
                    "no config file, using defaults"
                );
                return Ok(Config::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let config: Config = toml::from_str(&content)?;
        if config.version != CONFIG_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version '{}'",
                config.version
            )));
        }
        Ok(config)
    }

    /// Write the configuration, creating the directory if needed
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }
}
