//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGHUP, SIGINT, SIGTERM, SIGUSR1)
//! - Classify signals into exit and non-exit
//! - Drive the one-time `Running → ShuttingDown` transition
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Only SIGINT/SIGTERM exit; the first one wins, later ones are logged only
//! - SIGHUP and SIGUSR1 are observed and ignored (reserved)
//! - The listener task is the single writer of the shutdown transition

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::observability::metrics;

/// Signals the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// SIGHUP: reload request, currently a no-op.
    Hangup,
    /// SIGINT.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGUSR1: reserved.
    User1,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::Hangup => "SIGHUP",
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::User1 => "SIGUSR1",
        }
    }

    /// Whether this signal asks the process to exit.
    pub fn is_exit(self) -> bool {
        matches!(self, Signal::Interrupt | Signal::Terminate)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoordinatorState {
    Running = 0,
    ShuttingDown = 1,
    Stopped = 2,
}

impl CoordinatorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CoordinatorState::Running,
            1 => CoordinatorState::ShuttingDown,
            _ => CoordinatorState::Stopped,
        }
    }
}

/// Something that yields signals until it is exhausted.
pub trait SignalSource {
    /// Next signal, or `None` once no more can arrive.
    fn recv(&mut self) -> impl Future<Output = Option<Signal>> + Send;
}

impl SignalSource for mpsc::Receiver<Signal> {
    async fn recv(&mut self) -> Option<Signal> {
        mpsc::Receiver::recv(self).await
    }
}

impl SignalSource for mpsc::UnboundedReceiver<Signal> {
    async fn recv(&mut self) -> Option<Signal> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Signals delivered by the operating system.
#[cfg(unix)]
pub struct OsSignals {
    hangup: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    user1: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Register the handlers. Must run inside a Tokio runtime.
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            user1: signal(SignalKind::user_defined1())?,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.hangup.recv() => Some(Signal::Hangup),
            Some(()) = self.interrupt.recv() => Some(Signal::Interrupt),
            Some(()) = self.terminate.recv() => Some(Signal::Terminate),
            Some(()) = self.user1.recv() => Some(Signal::User1),
            else => None,
        }
    }
}

/// Ctrl-C only, on platforms without Unix signals.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(Signal::Interrupt),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                None
            }
        }
    }
}

/// Classifies signals and fires the shutdown callback exactly once.
pub struct SignalCoordinator {
    state: AtomicU8,
    on_shutdown: Box<dyn Fn() + Send + Sync>,
}

impl fmt::Debug for SignalCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalCoordinator")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SignalCoordinator {
    /// Create a coordinator in the `Running` state.
    pub fn new(on_shutdown: impl Fn() + Send + Sync + 'static) -> Self {
        metrics::record_lifecycle_state(CoordinatorState::Running as u8);
        Self {
            state: AtomicU8::new(CoordinatorState::Running as u8),
            on_shutdown: Box::new(on_shutdown),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        CoordinatorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Process one signal.
    ///
    /// Returns `true` if this call moved the coordinator to `ShuttingDown`
    /// (and therefore ran the callback).
    pub fn handle(&self, signal: Signal) -> bool {
        metrics::record_signal(signal.name());

        if !signal.is_exit() {
            tracing::info!(signal = %signal, "Ignoring signal");
            return false;
        }

        let transitioned = self
            .state
            .compare_exchange(
                CoordinatorState::Running as u8,
                CoordinatorState::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if transitioned {
            tracing::info!(signal = %signal, "Got signal to exit");
            metrics::record_shutdown();
            metrics::record_lifecycle_state(CoordinatorState::ShuttingDown as u8);
            (self.on_shutdown)();
        } else {
            tracing::warn!(
                signal = %signal,
                state = ?self.state(),
                "Shutdown already in progress, ignoring signal"
            );
        }
        transitioned
    }

    /// Record that the server has been stopped.
    ///
    /// Only valid from `ShuttingDown`; returns whether the move happened.
    pub fn mark_stopped(&self) -> bool {
        let moved = self
            .state
            .compare_exchange(
                CoordinatorState::ShuttingDown as u8,
                CoordinatorState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if moved {
            metrics::record_lifecycle_state(CoordinatorState::Stopped as u8);
        }
        moved
    }

    /// Feed every signal from `source` through [`Self::handle`].
    ///
    /// Keeps listening after shutdown so repeated signals are still observed.
    pub async fn listen<S: SignalSource>(&self, mut source: S) {
        while let Some(signal) = source.recv().await {
            self.handle(signal);
        }
        tracing::debug!("Signal source closed, listener exiting");
    }

    /// Run [`Self::listen`] on a dedicated task.
    pub fn spawn<S>(self: &Arc<Self>, source: S) -> JoinHandle<()>
    where
        S: SignalSource + Send + 'static,
    {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.listen(source).await })
    }
}
