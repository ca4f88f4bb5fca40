//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Install signals → Load config → Validate → Reinit logging
//!     → Construct server → Start → Wait for shutdown → Stop
//!
//! Shutdown (shutdown.rs):
//!     First exit signal → close ShutdownSignal + cancel context
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown (once)
//!     SIGHUP/SIGUSR1 → Logged, no action
//! ```
//!
//! # Design Decisions
//! - Ordered startup: signals, config, logging, server
//! - Shutdown is a one-way, one-time transition
//! - No timeouts here; the server owns its own stop policy

pub mod server;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use server::{Server, ServerError};
pub use shutdown::{Shutdown, ShutdownListener, ShutdownSignal};
pub use signals::{CoordinatorState, OsSignals, Signal, SignalCoordinator, SignalSource};
pub use startup::{Lifecycle, StartupError, VERSION};
