//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (shared-secret Basic auth, every route)
//!     → headers.rs (strip edge-reserved and transport headers)
//!     → Pass to the proxy pipeline
//! ```
//!
//! # Design Decisions
//! - Fail closed: no secret configured means no request is served
//! - Credentials consumed here are never forwarded upstream

pub mod auth;
pub mod headers;

pub use auth::{auth_middleware, check, AuthGate, AuthOutcome};
pub use headers::HeaderFilter;
