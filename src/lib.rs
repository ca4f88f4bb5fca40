//! Cluster controller process lifecycle.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv ──▶ config ──▶ observability ──▶ http::HttpServer
//!                                              │
//!   OS signals ──▶ lifecycle::SignalCoordinator │
//!                        │                      │
//!                        ▼                      ▼
//!                  lifecycle::Shutdown ──▶ stop ──▶ exit
//!
//!   raft engine ──▶ consensus::RaftLogger ──▶ observability::TracingLogger
//! ```

pub mod config;
pub mod consensus;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ControllerConfig;
pub use consensus::{ConsensusLogger, RaftLogger};
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, Server, ServerError, Shutdown};
