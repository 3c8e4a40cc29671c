//! Configuration management for sendq
//!
//! This crate provides the configuration of the `sendq` tool: server credentials,
//! transfer behavior and logging, loaded from YAML, TOML or JSON files with
//! environment variable overrides.
//!
//! # Features
//!
//! - **Multiple formats**: YAML, TOML and JSON configuration files
//! - **Validation**: ranges and enumerations are checked after loading
//! - **Environment overrides**: `SENDQ__SECTION__KEY` variables win over files
//! - **Defaults**: every field has a sensible default
//!
//! # Examples
//!
//! ```rust
//! use sendq_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("sendq.yaml")
//!     .add_env_prefix("SENDQ")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Uploading to {}", config.credentials().endpoint());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use sendq_types::{Behavior, Credentials};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for sendq
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote server configuration
    pub server: ServerConfig,
    /// Transfer configuration
    pub transfer: TransferConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Credentials for the configured server
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.server.host.clone(),
            self.server.port,
            self.server.user.clone(),
            self.server.password.clone(),
        )
    }
}

/// Remote server configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
    /// Local directory served as the remote file system
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 21,
            user: "anonymous".to_string(),
            password: String::new(),
            root: PathBuf::from("."),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("root", &self.root)
            .finish()
    }
}

/// Transfer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Collision policy for existing remote objects
    pub behavior: Behavior,
    /// Progress polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Number of speed samples averaged
    pub speed_window: usize,
}

impl TransferConfig {
    /// Progress polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            behavior: Behavior::Verify,
            poll_interval_ms: 500,
            speed_window: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Log file path; logs go to stderr when unset
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            log_file: None,
        }
    }
}
