//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::validation::{validate_config, ValidationError};

/// Root configuration for the cluster controller.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// HTTP bind address (e.g., "127.0.0.1:9379").
    pub addr: String,

    /// Name reported by this controller in logs and API responses.
    pub cluster_name: String,

    /// Settings handed to the embedded consensus engine.
    pub raft: RaftConfig,

    /// Optional logging overrides. `None` keeps the startup logger as-is.
    pub log: Option<LogConfig>,

    /// Metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9379".to_string(),
            cluster_name: "default".to_string(),
            raft: RaftConfig::default(),
            log: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Run every semantic check against this configuration.
    ///
    /// Returns all violations rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_config(self)
    }
}

/// Consensus peer configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RaftConfig {
    /// Raft node id of this controller (must be non-zero).
    pub id: u64,

    /// Directory holding the raft log and snapshots.
    pub data_dir: String,

    /// Peer addresses (`host:port`), including this node.
    pub peers: Vec<String>,

    /// Heartbeat interval in milliseconds.
    pub heartbeat_ms: u64,

    /// Election timeout in milliseconds. Must exceed the heartbeat interval.
    pub election_ms: u64,
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            id: 1,
            data_dir: "data/raft".to_string(),
            peers: vec!["127.0.0.1:6699".to_string()],
            heartbeat_ms: 1000,
            election_ms: 10_000,
        }
    }
}

/// Rotation policy for file logging.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Logging configuration.
///
/// With `max_size` set the file rolls over by size and `max_age`/`compress`
/// apply to the backups; otherwise it rolls over on `rotation`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log file path. Empty keeps logs on stdout.
    pub filename: String,

    /// How often the log file rolls over.
    pub rotation: LogRotation,

    /// Number of rotated files kept on disk.
    pub max_backups: usize,

    /// Size in megabytes at which the file rolls over. 0 disables size rotation.
    pub max_size: u64,

    /// Days to keep backups. 0 keeps them regardless of age.
    pub max_age: u64,

    /// Gzip backups once they are rolled over.
    pub compress: bool,

    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filename: String::new(),
            rotation: LogRotation::Daily,
            max_backups: 10,
            max_size: 0,
            max_age: 0,
            compress: false,
            json: false,
        }
    }
}

impl LogConfig {
    /// Whether logs should be written to a rotating file.
    pub fn writes_to_file(&self) -> bool {
        !self.filename.is_empty()
    }

    /// Whether the file rolls over by size rather than by time.
    pub fn rotates_by_size(&self) -> bool {
        self.max_size > 0
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
