//! Request handler module
//!
//! Responsible for request routing dispatch: the proxy endpoint goes to the
//! forwarder, every other path to the static file responder.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
