//! Forwarder error taxonomy
//!
//! Every failure is recovered here and turned into a plain-text HTTP response.

use hyper::{Response, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

use crate::http::{self, ResponseBody};

#[derive(Debug, Error)]
pub enum ProxyError {
    /// No usable `url` query parameter
    #[error("Missing url parameter")]
    MissingParameter,

    /// Target does not parse as an absolute URL
    #[error("Invalid url")]
    InvalidUrl,

    /// Scheme other than http/https
    #[error("Only http/https are supported")]
    UnsupportedScheme,

    /// Host rejected by `proxy.allowed_hosts`
    #[error("Host not allowed")]
    HostNotAllowed,

    /// DNS, connect, TLS or timeout failure reaching the upstream
    #[error("Proxy fetch failed: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// Build an upstream failure carrying the whole `source()` chain
    pub fn upstream(err: &(dyn StdError + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::Upstream(message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Upstream(format!(
            "upstream did not respond within {}s",
            after.as_secs()
        ))
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter
            | Self::InvalidUrl
            | Self::UnsupportedScheme
            | Self::HostNotAllowed => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn into_response(self) -> Response<ResponseBody> {
        http::build_text_response(self.status(), &self.to_string(), true)
    }
}
