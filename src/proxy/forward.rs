//! Fetch & relay
//!
//! Turns the `url` query parameter into a validated upstream URL, issues one
//! GET and streams the upstream body back without buffering it.

use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use std::borrow::Cow;
use std::io;
use url::{form_urlencoded, Url};

use super::drive::normalize_drive_url;
use super::error::ProxyError;
use crate::config::{AppState, ProxyConfig};
use crate::http::mime::DEFAULT_CONTENT_TYPE;
use crate::http::ResponseBody;
use crate::logger;

/// Upstream URL attached to proxied responses (read back by the access log)
#[derive(Debug, Clone)]
pub struct UpstreamTarget(pub String);

/// A validated proxy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Trimmed `url` parameter as sent by the caller
    pub raw: String,
    /// Target after Drive normalization and validation
    pub target: Url,
    /// Whether Drive normalization changed the target
    pub rewritten: bool,
}

impl ProxyRequest {
    /// Parse and validate the inbound query string
    pub fn from_query(query: Option<&str>, proxy: &ProxyConfig) -> Result<Self, ProxyError> {
        let raw = query
            .and_then(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .find(|(key, value)| key == "url" && !value.is_empty())
                    .map(|(_, value)| value.trim().to_string())
            })
            .filter(|value| !value.is_empty())
            .ok_or(ProxyError::MissingParameter)?;

        let normalized = normalize_drive_url(&raw);
        let rewritten = matches!(normalized, Cow::Owned(_));
        let target = Url::parse(&normalized).map_err(|_| ProxyError::InvalidUrl)?;

        // Url lowercases the scheme while parsing
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ProxyError::UnsupportedScheme);
        }

        let host = target.host_str().ok_or(ProxyError::InvalidUrl)?;
        if !proxy.is_host_allowed(host) {
            return Err(ProxyError::HostNotAllowed);
        }

        Ok(Self {
            raw,
            target,
            rewritten,
        })
    }
}

/// Upstream status and headers relayed to the caller, plus the live body
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub content_length: Option<HeaderValue>,
    body: reqwest::Response,
}

impl UpstreamResponse {
    fn new(resp: reqwest::Response) -> Self {
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        let content_length = resp.headers().get(CONTENT_LENGTH).cloned();

        Self {
            status: resp.status(),
            content_type,
            content_length,
            body: resp,
        }
    }

    /// Build the caller-facing response; the body streams the upstream bytes.
    ///
    /// Dropping the returned body (caller gone, or response finished) drops
    /// the upstream stream and releases its connection. An error mid-copy
    /// aborts the caller's connection since the headers are already sent.
    fn into_response(self, target: String) -> Response<ResponseBody> {
        let failed_target = target.clone();
        let stream = self
            .body
            .bytes_stream()
            .inspect_err(move |e| {
                logger::log_upstream_failure(&failed_target, &format!("body interrupted: {e}"));
            })
            .map_ok(Frame::data)
            .map_err(io::Error::other);

        let mut builder = Response::builder()
            .status(self.status)
            .header(CONTENT_TYPE, self.content_type);
        if let Some(length) = self.content_length {
            builder = builder.header(CONTENT_LENGTH, length);
        }

        let result = builder
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(CACHE_CONTROL, "no-store")
            .extension(UpstreamTarget(target))
            .body(StreamBody::new(stream).boxed_unsync());

        result.unwrap_or_else(|e| {
            ProxyError::Upstream(format!("invalid upstream response: {e}")).into_response()
        })
    }
}

/// Handle one `/proxy` request end to end
pub async fn forward(query: Option<&str>, state: &AppState) -> Response<ResponseBody> {
    let request = match ProxyRequest::from_query(query, &state.config.proxy) {
        Ok(r) => r,
        Err(e) => {
            logger::log_warning(&format!("Rejected proxy request: {e}"));
            return e.into_response();
        }
    };

    if request.rewritten {
        logger::log_rewrite(&request.raw, request.target.as_str());
    }

    let target = request.target.to_string();
    match fetch(request.target, state).await {
        Ok(upstream) => upstream.into_response(target),
        Err(e) => {
            logger::log_upstream_failure(&target, &e.to_string());
            let mut resp = e.into_response();
            resp.extensions_mut().insert(UpstreamTarget(target));
            resp
        }
    }
}

/// Issue the upstream GET; the timeout covers connect and response headers only
async fn fetch(target: Url, state: &AppState) -> Result<UpstreamResponse, ProxyError> {
    let timeout = state.upstream_timeout();
    let send = state.client.get(target).send();

    match tokio::time::timeout(timeout, send).await {
        Ok(Ok(resp)) => Ok(UpstreamResponse::new(resp)),
        Ok(Err(e)) => Err(ProxyError::upstream(&e)),
        Err(_) => Err(ProxyError::timeout(timeout)),
    }
}
