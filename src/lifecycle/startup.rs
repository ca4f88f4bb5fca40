//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the signal listener before anything else
//! - Load and validate configuration
//! - Switch logging to its configured destination
//! - Construct and start the server, then wait for shutdown and stop it
//!
//! # Design Decisions
//! - Fail fast: every error before the server is running is fatal
//! - Steps run in order on one task; only the shutdown wait suspends
//! - A server that failed to start is never stopped
//! - A failed stop is logged, not escalated

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{self, ConfigError, ControllerConfig};
use crate::lifecycle::server::{Server, ServerError};
use crate::lifecycle::shutdown::{Shutdown, ShutdownListener};
use crate::lifecycle::signals::{SignalCoordinator, SignalSource};
use crate::observability::{metrics, LoggingError, LoggingHandle};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Terminal failures of the startup sequence.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logger: {0}")]
    LoggerInit(#[source] LoggingError),

    #[error("failed to create the server: {0}")]
    ServerConstruct(#[source] ServerError),

    #[error("failed to start the server: {0}")]
    ServerStart(#[source] ServerError),
}

/// Aborts the listener task when the sequence returns.
struct ListenerGuard(JoinHandle<()>);

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The controller's process lifecycle.
#[derive(Debug, Default)]
pub struct Lifecycle {
    config_path: Option<PathBuf>,
    logging: Option<LoggingHandle>,
    shutdown: Shutdown,
}

impl Lifecycle {
    /// `config_path` of `None` selects the built-in defaults.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            ..Self::default()
        }
    }

    /// Let the sequence reconfigure the process-wide logger.
    pub fn with_logging(mut self, handle: LoggingHandle) -> Self {
        self.logging = Some(handle);
        self
    }

    /// Observe the shutdown this lifecycle waits on.
    ///
    /// Read-only: only the signal coordinator can trigger it.
    pub fn subscribe(&self) -> ShutdownListener {
        self.shutdown.signal().subscribe()
    }

    /// Run the whole sequence.
    ///
    /// Returns `Ok` after a signal-driven shutdown (whether or not `stop`
    /// succeeded) and `Err` for any failure before the server was running.
    /// Every error is logged before it is returned.
    pub async fn run<S, F, Src>(self, signals: Src, build: F) -> Result<(), StartupError>
    where
        S: Server,
        F: FnOnce(&ControllerConfig) -> Result<S, ServerError>,
        Src: SignalSource + Send + 'static,
    {
        // 1. Signals first, so an early Ctrl-C is never lost.
        let coordinator = Arc::new(SignalCoordinator::new({
            let shutdown = self.shutdown.clone();
            move || {
                shutdown.trigger();
            }
        }));
        let _listener = ListenerGuard(coordinator.spawn(signals));

        tracing::info!("Cluster controller is running with version {}", VERSION);

        // 2. Configuration.
        let config = match config::load(self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                let what = match &e {
                    ConfigError::Read { .. } => "Failed to read the config file",
                    ConfigError::Parse { .. } => "Failed to parse the config file",
                    ConfigError::Validation(_) => "Failed to validate the config file",
                };
                tracing::error!(error = %e, "{}", what);
                return Err(e.into());
            }
        };
        tracing::info!(
            addr = %config.addr,
            cluster = %config.cluster_name,
            raft_id = config.raft.id,
            "Configuration loaded"
        );

        // 3. Logging.
        if let Err(e) = self.apply_logging(&config) {
            tracing::error!(error = %e, "Failed to init the log rotate");
            return Err(StartupError::LoggerInit(e));
        }

        if config.observability.metrics_enabled {
            init_metrics(&config.observability.metrics_address);
        }

        // 4. Construction.
        let mut server = match build(&config) {
            Ok(server) => server,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create the server");
                return Err(StartupError::ServerConstruct(e));
            }
        };

        // 5. Start.
        if let Err(e) = server.start(self.shutdown.context()).await {
            tracing::error!(error = %e, "Failed to start the server");
            return Err(StartupError::ServerStart(e));
        }
        match server.local_addr() {
            Some(addr) => tracing::info!(address = %addr, "Server started"),
            None => tracing::info!("Server started"),
        }

        // 6. Wait for the term signal.
        self.shutdown.wait().await;

        // 7. Stop.
        match server.stop().await {
            Ok(()) => tracing::info!("Bye bye, cluster controller exited"),
            Err(e) => tracing::error!(error = %e, "Failed to close the server"),
        }
        coordinator.mark_stopped();

        Ok(())
    }

    fn apply_logging(&self, config: &ControllerConfig) -> Result<(), LoggingError> {
        let Some(log) = &config.log else {
            return Ok(());
        };
        let Some(handle) = &self.logging else {
            tracing::debug!("No logging handle, keeping current logger");
            return Ok(());
        };

        if log.writes_to_file() {
            tracing::info!(file = %log.filename, "Logs will be saved to {}", log.filename);
        }
        handle.apply(log)
    }
}

fn init_metrics(address: &str) {
    match address.parse() {
        Ok(addr) => {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics endpoint");
            }
        }
        Err(e) => tracing::error!(
            metrics_address = %address,
            error = %e,
            "Failed to parse metrics address"
        ),
    }
}
