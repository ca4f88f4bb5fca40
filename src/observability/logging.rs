//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide `tracing` subscriber
//! - Switch output to a rotating log file once configuration is known
//! - Apply the configured log level at runtime
//!
//! # Design Decisions
//! - The subscriber is installed once; later changes go through reload
//!   handles held by [`LoggingHandle`], never by installing a second one
//! - Only the startup sequence reloads, before any other task logs
//! - `RUST_LOG` takes precedence over the configured level
//! - File output is written synchronously so nothing is lost on a fatal exit

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::ParseError,
    fmt,
    layer::{Layer, Layered, SubscriberExt},
    reload,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Registry,
};

use crate::config::{LogConfig, LogRotation};
use crate::observability::rotate::{Retention, SizeRotatingFile};

type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type OutputLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// The subscriber built by [`LoggingHandle::build`].
pub type ControllerSubscriber = Layered<reload::Layer<OutputLayer, Filtered>, Filtered>;

/// Error type for logger setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level {level:?}: {source}")]
    Filter {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error("log filename {0:?} does not name a file")]
    Filename(String),

    #[error("failed to create log directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open rotating log file: {0}")]
    Appender(#[from] InitError),

    #[error("failed to open log file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install global subscriber: {0}")]
    Install(#[from] TryInitError),

    #[error("failed to reload logger: {0}")]
    Reload(#[from] reload::Error),
}

/// Control over the process-wide subscriber.
///
/// Holds the reload handles for the level filter and the output layer. The
/// handles only reach the subscriber while it is alive; once it is dropped
/// every call returns [`LoggingError::Reload`].
#[derive(Clone)]
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    output: reload::Handle<OutputLayer, Filtered>,
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingHandle").finish_non_exhaustive()
    }
}

impl LoggingHandle {
    /// Build a stdout subscriber at `level` without installing it.
    pub fn build(level: &str) -> Result<(Self, ControllerSubscriber), LoggingError> {
        let (filter_layer, filter) = reload::Layer::new(build_filter(level)?);
        let (output_layer, output) = reload::Layer::new(stdout_layer(false));

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(output_layer);

        Ok((Self { filter, output }, subscriber))
    }

    /// Build a stdout subscriber at `level` and install it globally.
    pub fn init(level: &str) -> Result<Self, LoggingError> {
        let (handle, subscriber) = Self::build(level)?;
        subscriber.try_init()?;
        Ok(handle)
    }

    /// Reconfigure level, format and destination from `config`.
    ///
    /// Everything is prepared before anything is swapped, so a failure leaves
    /// the current logger untouched.
    pub fn apply(&self, config: &LogConfig) -> Result<(), LoggingError> {
        let filter = build_filter(&config.level)?;
        let output = if config.writes_to_file() {
            file_layer(config)?
        } else {
            stdout_layer(config.json)
        };

        self.output.reload(output)?;
        self.filter.reload(filter)?;
        Ok(())
    }

    /// Change only the level filter.
    pub fn set_level(&self, level: &str) -> Result<(), LoggingError> {
        self.filter.reload(build_filter(level)?)?;
        Ok(())
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| LoggingError::Filter {
            level: level.to_string(),
            source,
        })
}

fn stdout_layer(json: bool) -> OutputLayer {
    let layer = fmt::layer().with_target(true);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn file_layer(config: &LogConfig) -> Result<OutputLayer, LoggingError> {
    let path = Path::new(&config.filename);
    let prefix = path
        .file_name()
        .ok_or_else(|| LoggingError::Filename(config.filename.clone()))?
        .to_string_lossy()
        .into_owned();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&dir).map_err(|source| LoggingError::Directory {
        path: dir.clone(),
        source,
    })?;

    if config.rotates_by_size() {
        let file = SizeRotatingFile::open(path, Retention::from(config)).map_err(|source| {
            LoggingError::File {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true);

        return Ok(if config.json {
            layer.json().boxed()
        } else {
            layer.boxed()
        });
    }

    let appender = RollingFileAppender::builder()
        .rotation(rotation(config.rotation))
        .filename_prefix(prefix)
        .max_log_files(config.max_backups)
        .build(&dir)?;

    let layer = fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true);

    Ok(if config.json {
        layer.json().boxed()
    } else {
        layer.boxed()
    })
}

fn rotation(policy: LogRotation) -> Rotation {
    match policy {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}
