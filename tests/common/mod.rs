//! Shared utilities for lifecycle integration tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cluster_controller::{ControllerConfig, Server, ServerError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// How often each lifecycle step reached the server.
#[derive(Debug, Default)]
pub struct Calls {
    pub constructed: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    /// Fired every time `start` succeeds.
    pub up: Notify,
}

impl Calls {
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Server double that records calls and fails on request.
#[derive(Debug)]
pub struct FakeServer {
    calls: Arc<Calls>,
    fail_start: bool,
    fail_stop: bool,
}

impl FakeServer {
    pub fn new(calls: Arc<Calls>) -> Self {
        calls.constructed.fetch_add(1, Ordering::SeqCst);
        Self {
            calls,
            fail_start: false,
            fail_stop: false,
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }
}

impl Server for FakeServer {
    async fn start(&mut self, _ctx: CancellationToken) -> Result<(), ServerError> {
        self.calls.started.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(ServerError::other("address already in use"));
        }
        self.calls.up.notify_one();
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        self.calls.stopped.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(ServerError::other("raft log flush failed"));
        }
        Ok(())
    }
}

/// Builder closure for [`cluster_controller::Lifecycle::run`].
pub fn fake(calls: &Arc<Calls>) -> impl FnOnce(&ControllerConfig) -> Result<FakeServer, ServerError> {
    let calls = calls.clone();
    move |_| Ok(FakeServer::new(calls))
}

/// Write `content` to a temp file with the given suffix.
pub fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
