//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound path "/<encoded target>"
//!     → target.rs (decode, default scheme, reattach query, parse)
//!     → security::headers (reserved-prefix filter)
//!     → forwarder.rs (single outbound attempt, redirects not followed)
//!     → pipeline.rs (choose rewrite, finish response)
//! ```

pub mod encoding;
pub mod forwarder;
pub mod pipeline;
pub mod target;

pub use forwarder::Forwarder;
pub use pipeline::{ClientOrigin, Outcome, ProxyPipeline};
pub use target::{resolve, Scheme, Target};
