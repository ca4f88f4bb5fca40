//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ControllerConfig;
use crate::config::validation::ValidationError;

/// Path used when no `-c` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Syntactic failure of a config document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed document.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The document parsed but violates semantic rules.
    #[error("invalid config: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// `None` or an empty path yields the built-in defaults, which are still
/// validated. Files ending in `.toml` are read as TOML, everything else as YAML.
pub fn load(path: Option<&Path>) -> Result<ControllerConfig, ConfigError> {
    let config = match path.filter(|p| !p.as_os_str().is_empty()) {
        None => ControllerConfig::default(),
        Some(path) => read_file(path)?,
    };

    config.validate().map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse(path, &content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(path: &Path, content: &str) -> Result<ControllerConfig, ParseError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(content)?)
    } else if content.trim().is_empty() {
        // serde_yaml rejects an empty document; treat it as "all defaults".
        Ok(ControllerConfig::default())
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Decide which file (if any) to load for the given `-c` value.
///
/// An explicit path is always honoured, so a missing file surfaces as a read
/// error. Without one, [`DEFAULT_CONFIG_PATH`] is used only if it exists.
pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    resolve_path_with(explicit, Path::new(DEFAULT_CONFIG_PATH))
}

/// [`resolve_path`] with a caller-chosen fallback file.
pub fn resolve_path_with(explicit: Option<PathBuf>, default: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.as_os_str().is_empty() => None,
        Some(path) => Some(path),
        None => default.is_file().then(|| default.to_path_buf()),
    }
}
