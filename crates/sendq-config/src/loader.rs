//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Prefix of environment variable overrides, e.g. `SENDQ__SERVER__HOST`
pub const ENV_PREFIX: &str = "SENDQ";

const FILE_STEMS: [&str; 2] = ["sendq", ".sendq"];
const EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the first file found in the default locations
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();

        if let Some(path) = Self::config_exists() {
            builder = builder.add_source_file(path);
        }

        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Save configuration to a file, format chosen by extension (YAML by default)
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to TOML: {}", e))
            })?,
            Some("json") => serde_json::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to JSON: {}", e))
            })?,
            _ => serde_yaml::to_string(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to YAML: {}", e))
            })?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write a default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(ConfigError::other(format!(
                "Refusing to overwrite existing file '{}'",
                path.display()
            )));
        }
        Self::save_to_file(&Config::default(), path)
    }

    /// First existing configuration file in the default locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    /// Candidate configuration files in order of preference
    ///
    /// The working directory comes first, then the user configuration directory.
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for stem in FILE_STEMS {
            for extension in EXTENSIONS {
                paths.push(PathBuf::from(format!("{}.{}", stem, extension)));
            }
        }

        if let Some(config_dir) = user_config_dir() {
            let sendq_dir = config_dir.join("sendq");
            for extension in EXTENSIONS {
                paths.push(sendq_dir.join(format!("config.{}", extension)));
            }
        }

        paths
    }
}

fn user_config_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    }
}
