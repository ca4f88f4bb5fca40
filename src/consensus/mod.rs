//! Consensus engine integration.
//!
//! # Data Flow
//! ```text
//! raft engine diagnostics (elections, compaction, leadership)
//!     → ConsensusLogger (the engine's logging interface)
//!     → logger.rs (RaftLogger adapter)
//!     → LeveledLogger (host logger)
//!     → process-wide subscriber
//! ```
//!
//! # Design Decisions
//! - The engine's vocabulary (`warning`) differs from the host's (`warn`);
//!   the adapter only translates names, it never filters or remaps levels
//! - `fatal*` and `panic*` keep their process-terminating semantics
//! - The engine itself is external; only its logging seam lives here

use std::fmt::{self, Display};

pub mod logger;

pub use logger::RaftLogger;

/// Logging interface required by the embedded consensus engine.
///
/// Each severity has a variadic form (operands rendered by the logger) and a
/// format form (`format_args!`). `fatal*` must not return and ends the
/// process; `panic*` must not return and unwinds.
pub trait ConsensusLogger: Send + Sync {
    fn debug(&self, v: &[&dyn Display]);
    fn debugf(&self, args: fmt::Arguments<'_>);

    fn info(&self, v: &[&dyn Display]);
    fn infof(&self, args: fmt::Arguments<'_>);

    fn warning(&self, v: &[&dyn Display]);
    fn warningf(&self, args: fmt::Arguments<'_>);

    fn error(&self, v: &[&dyn Display]);
    fn errorf(&self, args: fmt::Arguments<'_>);

    fn fatal(&self, v: &[&dyn Display]) -> !;
    fn fatalf(&self, args: fmt::Arguments<'_>) -> !;

    fn panic(&self, v: &[&dyn Display]) -> !;
    fn panicf(&self, args: fmt::Arguments<'_>) -> !;
}
