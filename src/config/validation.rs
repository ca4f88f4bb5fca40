//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0, ids non-zero)
//! - Check raft peer list consistency
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ControllerConfig, LogConfig, ObservabilityConfig, RaftConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required string field is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// An address field is not of the form `host:port`.
    #[error("{field} is not a valid host:port address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    /// A numeric field is outside its allowed range.
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    /// A raft peer appears more than once.
    #[error("raft.peers contains duplicate address {0}")]
    DuplicatePeer(String),

    /// The log level cannot be turned into a filter.
    #[error("log.level {0:?} is not a valid level")]
    InvalidLogLevel(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cluster_name.trim().is_empty() {
        errors.push(ValidationError::Empty("cluster_name"));
    }
    check_addr("addr", &config.addr, &mut errors);
    check_raft(&config.raft, &mut errors);
    if let Some(log) = &config.log {
        check_log(log, &mut errors);
    }
    check_observability(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::Empty(field));
    } else if !is_host_port(value) {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Like [`check_addr`] but the host must be a literal IP.
fn check_socket_addr(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// `ip:port`, `[ipv6]:port` or `hostname:port`. Names are resolved at bind
/// or dial time, not here.
fn is_host_port(value: &str) -> bool {
    if value.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match value.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(':')
                && !host.chars().any(char::is_whitespace)
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

fn check_raft(raft: &RaftConfig, errors: &mut Vec<ValidationError>) {
    if raft.id == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "raft.id",
            reason: "must be greater than 0".to_string(),
        });
    }
    if raft.data_dir.trim().is_empty() {
        errors.push(ValidationError::Empty("raft.data_dir"));
    }
    if raft.peers.is_empty() {
        errors.push(ValidationError::Empty("raft.peers"));
    }

    let mut seen = HashSet::new();
    for peer in &raft.peers {
        check_addr("raft.peers", peer, errors);
        if !seen.insert(peer.as_str()) {
            errors.push(ValidationError::DuplicatePeer(peer.clone()));
        }
    }

    if raft.heartbeat_ms == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "raft.heartbeat_ms",
            reason: "must be greater than 0".to_string(),
        });
    }
    if raft.election_ms <= raft.heartbeat_ms {
        errors.push(ValidationError::OutOfRange {
            field: "raft.election_ms",
            reason: format!(
                "{} must exceed heartbeat interval {}",
                raft.election_ms, raft.heartbeat_ms
            ),
        });
    }
}

fn check_log(log: &LogConfig, errors: &mut Vec<ValidationError>) {
    if !is_known_level(&log.level) {
        errors.push(ValidationError::InvalidLogLevel(log.level.clone()));
    }
    if log.writes_to_file() && log.max_backups == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "log.max_backups",
            reason: "must keep at least one file".to_string(),
        });
    }
    // Age and compression only apply to size-rotated backups.
    if !log.rotates_by_size() {
        if log.max_age > 0 {
            errors.push(ValidationError::OutOfRange {
                field: "log.max_age",
                reason: "requires log.max_size".to_string(),
            });
        }
        if log.compress {
            errors.push(ValidationError::OutOfRange {
                field: "log.compress",
                reason: "requires log.max_size".to_string(),
            });
        }
    }
}

fn check_observability(obs: &ObservabilityConfig, errors: &mut Vec<ValidationError>) {
    if obs.metrics_enabled {
        // The exporter binds a SocketAddr directly.
        check_socket_addr("observability.metrics_address", &obs.metrics_address, errors);
    }
}

fn is_known_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
