//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::proxy::{self, UpstreamTarget};
use hyper::header::{CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Owned request information needed for routing, extracted before any await
pub struct RequestContext {
    pub method: Method,
    /// Path as received (still percent-encoded)
    pub raw_path: String,
    /// Percent-decoded path used for routing and file lookup
    pub path: String,
    pub query: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub access: AccessLogEntry,
    started: Instant,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let uri = req.uri();
        let headers = req.headers();

        let mut access = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            req.method().to_string(),
            uri.path().to_string(),
        );
        access.query = uri.query().map(ToString::to_string);
        access.http_version = version_label(req.version()).to_string();
        access.referer = header_string(headers, REFERER);
        access.user_agent = header_string(headers, USER_AGENT);

        Self {
            method: req.method().clone(),
            raw_path: uri.path().to_string(),
            path: percent_decode_str(uri.path())
                .decode_utf8_lossy()
                .into_owned(),
            query: uri.query().map(ToString::to_string),
            if_none_match: header_string(headers, IF_NONE_MATCH),
            if_modified_since: header_string(headers, IF_MODIFIED_SINCE),
            access,
            started: Instant::now(),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    ctx: RequestContext,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let response = route_request(&ctx, &state).await;

    if state.config.logging.access_log {
        log_access(ctx, &response, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Which handler a request is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Proxy,
    Static,
    MethodNotAllowed,
}

/// Classify a request by method and decoded path
pub fn classify(method: &Method, path: &str, proxy_path: &str) -> Route {
    let is_proxy = path == proxy_path;
    match *method {
        Method::OPTIONS => Route::Preflight,
        Method::GET if is_proxy => Route::Proxy,
        Method::GET | Method::HEAD if !is_proxy => Route::Static,
        _ => Route::MethodNotAllowed,
    }
}

async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<ResponseBody> {
    match classify(&ctx.method, &ctx.path, &state.config.proxy.path) {
        Route::Preflight => http::build_options_response(),
        Route::Proxy => proxy::forward(ctx.query.as_deref(), state).await,
        Route::Static => static_files::serve(ctx, &state.config.static_files).await,
        Route::MethodNotAllowed => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                ctx.method, ctx.path
            ));
            http::build_405_response()
        }
    }
}

fn log_access(ctx: RequestContext, response: &Response<ResponseBody>, format: &str) {
    let mut entry = ctx.access;
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.upstream = response
        .extensions()
        .get::<UpstreamTarget>()
        .map(|t| t.0.clone());
    entry.request_time_us = u64::try_from(ctx.started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn state_with_root(root: &std::path::Path) -> Arc<AppState> {
        let mut cfg = Config::default();
        cfg.logging.access_log = false;
        cfg.static_files.root = root.to_string_lossy().into_owned();
        Arc::new(AppState::new(&cfg).unwrap())
    }

    fn context(method: Method, uri: &str) -> RequestContext {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        RequestContext::from_request(&req, peer())
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&Method::GET, "/proxy", "/proxy"), Route::Proxy);
        assert_eq!(classify(&Method::GET, "/", "/proxy"), Route::Static);
        assert_eq!(classify(&Method::GET, "/proxy/", "/proxy"), Route::Static);
        assert_eq!(classify(&Method::GET, "/proxyx", "/proxy"), Route::Static);
        assert_eq!(classify(&Method::HEAD, "/index.html", "/proxy"), Route::Static);
        assert_eq!(classify(&Method::HEAD, "/proxy", "/proxy"), Route::MethodNotAllowed);
        assert_eq!(classify(&Method::OPTIONS, "/proxy", "/proxy"), Route::Preflight);
        assert_eq!(classify(&Method::POST, "/proxy", "/proxy"), Route::MethodNotAllowed);
        assert_eq!(classify(&Method::PUT, "/a.txt", "/proxy"), Route::MethodNotAllowed);
    }

    #[test]
    fn test_context_decodes_path() {
        let ctx = context(Method::GET, "/%70roxy?url=x");
        assert_eq!(ctx.path, "/proxy");
        assert_eq!(ctx.raw_path, "/%70roxy");
        assert_eq!(ctx.query.as_deref(), Some("url=x"));
        assert_eq!(ctx.access.remote_addr, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_proxy_path_goes_to_forwarder() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_root(dir.path());

        let resp = handle_request(context(Method::GET, "/proxy"), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Missing url parameter");
    }

    #[tokio::test]
    async fn test_other_paths_go_to_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("proxy.txt"), "static").unwrap();
        let state = state_with_root(dir.path());

        let resp = handle_request(context(Method::GET, "/proxy.txt?url=x"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"static");

        let resp = handle_request(context(Method::GET, "/nope.txt"), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_root(dir.path());

        let resp = handle_request(context(Method::POST, "/proxy?url=http://x"), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
