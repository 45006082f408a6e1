//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! upstream response
//!     → 3xx?        redirect.rs (Location → proxy-relative path)
//!     → text/html?  html.rs (root-relative href/src/action → proxy URL)
//!     → otherwise   passthrough, body streamed
//! ```
//!
//! # Design Decisions
//! - Both transforms are best-effort: if one cannot apply, the original
//!   response goes out unchanged
//! - HTML rewriting needs the whole body; nothing else buffers

pub mod html;
pub mod redirect;

pub use html::{is_html, rewrite_html, BodyRewriter, RewriteContext, RootRelativeRewriter};
pub use redirect::{is_redirect, rewrite_location, rewrite_redirect};
