//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (process-wide subscriber: stdout or rotating file)
//!     → rotate.rs (size-bounded file with pruned, optionally gzipped backups)
//!     → leveled.rs (leveled logger values for components that need one)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, file)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (key=value or JSON) for machine parsing
//! - Consensus engine diagnostics share the same subscriber as everything else
//! - Metrics are cheap (atomic increments)

pub mod leveled;
pub mod logging;
pub mod metrics;
pub mod rotate;

pub use leveled::{sprint, LeveledLogger, TracingLogger};
pub use logging::{LoggingError, LoggingHandle};
pub use rotate::{Retention, SizeRotatingFile};
