//! Forwarding proxy module
//!
//! Validates the caller's target URL, rewrites Google Drive/Docs view links
//! to their direct-download form, fetches the target and relays it back with
//! permissive CORS headers.

pub mod drive;
pub mod error;
pub mod forward;

pub use forward::{forward, UpstreamTarget};
