//! Adapter from the host leveled logger to the consensus engine's logger.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::consensus::ConsensusLogger;
use crate::observability::LeveledLogger;

/// Wraps a [`LeveledLogger`] so it satisfies [`ConsensusLogger`].
///
/// Every call is forwarded as-is to the host method of the same severity;
/// `warning`/`warningf` land on `warn`/`warnf`. Nothing is buffered, filtered
/// or remapped.
pub struct RaftLogger<L: ?Sized> {
    inner: Arc<L>,
}

impl<L: ?Sized> RaftLogger<L> {
    pub fn new(inner: Arc<L>) -> Self {
        Self { inner }
    }

    /// The wrapped host logger.
    pub fn inner(&self) -> &Arc<L> {
        &self.inner
    }
}

impl<L: ?Sized> Clone for RaftLogger<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ?Sized> fmt::Debug for RaftLogger<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaftLogger").finish_non_exhaustive()
    }
}

impl<L: LeveledLogger + ?Sized> ConsensusLogger for RaftLogger<L> {
    fn debug(&self, v: &[&dyn Display]) {
        self.inner.debug(v)
    }

    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.inner.debugf(args)
    }

    fn info(&self, v: &[&dyn Display]) {
        self.inner.info(v)
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        self.inner.infof(args)
    }

    fn warning(&self, v: &[&dyn Display]) {
        self.inner.warn(v)
    }

    fn warningf(&self, args: fmt::Arguments<'_>) {
        self.inner.warnf(args)
    }

    fn error(&self, v: &[&dyn Display]) {
        self.inner.error(v)
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.inner.errorf(args)
    }

    fn fatal(&self, v: &[&dyn Display]) -> ! {
        self.inner.fatal(v)
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.inner.fatalf(args)
    }

    fn panic(&self, v: &[&dyn Display]) -> ! {
        self.inner.panic(v)
    }

    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.inner.panicf(args)
    }
}
