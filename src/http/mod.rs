//! HTTP front of the controller.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → /healthz, /version handlers
//!     → Send to client
//! ```
//!
//! The server also owns the consensus engine's logger and data directory.

pub mod server;

pub use server::{AppState, HttpServer};
