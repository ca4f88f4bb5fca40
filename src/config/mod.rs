//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//!     → handed to the server constructor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Every load error is terminal; there is no retry

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, resolve_path, resolve_path_with, ConfigError, DEFAULT_CONFIG_PATH};
pub use schema::{ControllerConfig, LogConfig, LogRotation, ObservabilityConfig, RaftConfig};
pub use validation::ValidationError;
