//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! signals.rs:  SIGTERM/SIGINT → Shutdown::trigger
//! shutdown.rs: broadcast → HttpServer stops accepting, drains in-flight requests
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
