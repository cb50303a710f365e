//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.
//! Shared between the static file responder and the forwarding proxy.

pub mod cache;
pub mod mime;
pub mod response;

use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full};
use hyper::body::Bytes;

/// Body type of every response the server emits.
///
/// Static and error responses are buffered (`Full`), proxied responses are
/// streamed from upstream, so both are erased behind one boxed body.
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Wrap a buffered payload as a [`ResponseBody`]
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty [`ResponseBody`]
pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

// Re-export commonly used builders
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response,
    build_options_response, build_text_response,
};
