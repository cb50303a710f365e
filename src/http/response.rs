//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from
//! specific business logic.

use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::{empty, full, ResponseBody};

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(empty())
        })
}

/// Build 301 redirect, used to add the trailing slash to directory paths
pub fn build_301_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(301)
        .header("Location", location)
        .header("Content-Length", 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", false)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut resp = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        false,
    );
    resp.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static("GET, HEAD, OPTIONS"),
    );
    resp
}

/// Build OPTIONS response (CORS preflight request)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", "86400")
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty())
        })
}

/// Build plain-text response with the given status
///
/// `cors` adds `Access-Control-Allow-Origin: *` for browser callers.
pub fn build_text_response(
    status: StatusCode,
    message: &str,
    cors: bool,
) -> Response<ResponseBody> {
    let body = Bytes::from(message.to_owned());
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len());

    if cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Cache-Control", "no-store");
    }

    builder.body(full(body.clone())).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        let mut resp = Response::new(full(body));
        *resp.status_mut() = status;
        resp
    })
}

/// Build success response for a static file
///
/// `data` is `None` for HEAD requests; `len` is always the full file size.
pub fn build_file_response(
    data: Option<Bytes>,
    len: u64,
    content_type: &str,
    etag: &str,
) -> Response<ResponseBody> {
    let body = data.map_or_else(empty, full);

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", len)
        .header("ETag", etag)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_text_response_with_cors() {
        let resp = build_text_response(StatusCode::BAD_REQUEST, "Invalid url", true);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["content-length"], "11");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Invalid url");
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_options_response_is_preflight() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            resp.headers()["access-control-allow-methods"],
            "GET, HEAD, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_head_file_response_has_length_but_no_body() {
        let resp = build_file_response(None, 3, "text/plain", "\"1\"");
        assert_eq!(resp.headers()["content-length"], "3");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
