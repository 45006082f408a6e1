//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security::auth (shared-secret gate, every route)
//!     → "/"         landing.rs (static form)
//!     → "/{*target}" request.rs (request ID, client origin)
//!                   → proxy pipeline
//!                   → response.rs (no-cache + CORS)
//!     → Send to client
//! ```

pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
