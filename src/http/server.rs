//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the liveness and version handlers
//! - Wire up middleware (tracing, request ID)
//! - Prepare the raft data directory and hand the engine its logger
//! - Bind on start, drain on stop or context cancellation

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ControllerConfig, RaftConfig};
use crate::consensus::{ConsensusLogger, RaftLogger};
use crate::lifecycle::{Server, ServerError, VERSION};
use crate::observability::TracingLogger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cluster_name: Arc<str>,
    pub raft_id: u64,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    cluster: String,
    raft_id: u64,
}

#[derive(Debug, Serialize)]
struct Version {
    version: &'static str,
}

struct Running {
    addr: SocketAddr,
    stop: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

/// HTTP front of the controller.
pub struct HttpServer {
    router: Router,
    config: ControllerConfig,
    raft_logger: RaftLogger<TracingLogger>,
    running: Option<Running>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the raft data directory cannot be created.
    pub fn new(config: ControllerConfig) -> Result<Self, ServerError> {
        prepare_data_dir(&config.raft)?;

        let state = AppState {
            cluster_name: Arc::from(config.cluster_name.as_str()),
            raft_id: config.raft.id,
        };

        Ok(Self {
            router: Self::build_router(state),
            raft_logger: RaftLogger::new(Arc::new(TracingLogger::default())),
            config,
            running: None,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/version", get(version))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Logger to hand to the embedded consensus engine.
    pub fn consensus_logger(&self) -> RaftLogger<TracingLogger> {
        self.raft_logger.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl Server for HttpServer {
    async fn start(&mut self, ctx: CancellationToken) -> Result<(), ServerError> {
        if self.running.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(&self.config.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.addr.clone(),
                source,
            })?;
        let addr = listener.local_addr()?;

        // Stops on our own stop() or when the shared context is cancelled.
        let stop = ctx.child_token();
        let router = self.router.clone();
        let graceful = stop.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
        });

        let raft = &self.config.raft;
        self.raft_logger.infof(format_args!(
            "raft node {} using {} with {} peer(s), heartbeat {}ms, election {}ms",
            raft.id,
            raft.data_dir,
            raft.peers.len(),
            raft.heartbeat_ms,
            raft.election_ms
        ));
        tracing::info!(address = %addr, "HTTP server starting");

        self.running = Some(Running { addr, stop, task });
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        let running = self.running.take().ok_or(ServerError::NotRunning)?;

        running.stop.cancel();
        running.task.await??;

        tracing::info!(address = %running.addr, "HTTP server stopped");
        Ok(())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }
}

fn prepare_data_dir(raft: &RaftConfig) -> Result<(), ServerError> {
    let path = Path::new(&raft.data_dir);
    std::fs::create_dir_all(path).map_err(|source| ServerError::DataDir {
        path: path.to_path_buf(),
        source,
    })
}

async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        cluster: state.cluster_name.to_string(),
        raft_id: state.raft_id,
    })
}

async fn version() -> Json<Version> {
    Json(Version { version: VERSION })
}
