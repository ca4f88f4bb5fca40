//! The service contract driven by the startup sequence.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised while building, starting or stopping a server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to prepare data directory {}: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server is not running")]
    NotRunning,

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ServerError {
    pub fn other(message: impl Into<String>) -> Self {
        ServerError::Other(message.into())
    }
}

/// A long-running service with an explicit start/stop lifecycle.
///
/// `start` must return once the service is up; the work itself keeps running
/// on tasks that observe `ctx`. `stop` is only called after a successful
/// `start`.
pub trait Server: Send {
    fn start(
        &mut self,
        ctx: CancellationToken,
    ) -> impl Future<Output = Result<(), ServerError>> + Send;

    fn stop(&mut self) -> impl Future<Output = Result<(), ServerError>> + Send;

    /// Address the server accepts connections on, once started.
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}
