use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cluster_controller::config;
use cluster_controller::lifecycle::{Lifecycle, OsSignals};
use cluster_controller::observability::LoggingHandle;
use cluster_controller::HttpServer;

/// Controller for a raft-backed storage cluster.
#[derive(Parser, Debug)]
#[command(name = "cluster-controller", version, about)]
struct Cli {
    /// Path of the config file (YAML or TOML).
    ///
    /// Defaults to `config/config.yaml` when that file exists; pass an
    /// empty string to force the built-in defaults.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Console logging until the config says otherwise.
    let logging = match LoggingHandle::init("info") {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let signals = match OsSignals::new() {
        Ok(signals) => signals,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let lifecycle = Lifecycle::new(config::resolve_path(cli.config)).with_logging(logging);
    match lifecycle
        .run(signals, |config| HttpServer::new(config.clone()))
        .await
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
