//! Static file serving module
//!
//! Serves every non-proxy path from the configured root directory, with
//! index file lookup, MIME type detection and conditional requests.

use crate::config::StaticConfig;
use crate::handler::router::RequestContext;
use crate::http::cache::Validators;
use crate::http::{self, mime, ResponseBody};
use crate::logger;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, LAST_MODIFIED};
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Result of mapping a request path onto the filesystem
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// Directory requested without trailing slash
    Redirect,
    NotFound,
}

/// Serve a request from the static root
pub async fn serve(ctx: &RequestContext, cfg: &StaticConfig) -> Response<ResponseBody> {
    match resolve(&cfg.root, &ctx.path, &cfg.index_files).await {
        Resolved::File(path) => serve_file(ctx, &path).await,
        Resolved::Redirect => {
            let mut location = format!("{}/", ctx.raw_path);
            if let Some(q) = &ctx.query {
                location.push('?');
                location.push_str(q);
            }
            http::build_301_response(&location)
        }
        Resolved::NotFound => http::build_404_response(),
    }
}

/// Map a decoded request path to a file under `root`
pub async fn resolve(root: &str, path: &str, index_files: &[String]) -> Resolved {
    let relative = path.trim_start_matches('/');
    if Path::new(relative)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return Resolved::NotFound;
    }

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{root}': {e}"
            ));
            return Resolved::NotFound;
        }
    };

    let mut file_path = root_canonical.join(relative);
    let Ok(meta) = fs::metadata(&file_path).await else {
        return Resolved::NotFound;
    };

    if meta.is_dir() {
        if !path.ends_with('/') && !relative.is_empty() {
            return Resolved::Redirect;
        }
        let mut index = None;
        for name in index_files {
            let candidate = file_path.join(name);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                index = Some(candidate);
                break;
            }
        }
        match index {
            Some(candidate) => file_path = candidate,
            None => return Resolved::NotFound,
        }
    }

    // Symlinks may still point outside the root
    let Ok(file_canonical) = fs::canonicalize(&file_path).await else {
        return Resolved::NotFound;
    };
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return Resolved::NotFound;
    }

    Resolved::File(file_canonical)
}

async fn serve_file(ctx: &RequestContext, path: &Path) -> Response<ResponseBody> {
    let meta = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => {
            logger::log_error(&format!("Failed to stat '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    let validators = Validators::new(meta.len(), meta.modified().ok());
    if validators.is_fresh(ctx.if_none_match.as_deref(), ctx.if_modified_since.as_deref()) {
        return http::build_304_response(&validators.etag);
    }

    let content_type = mime::content_type_for(path);
    let data = if ctx.is_head() {
        None
    } else {
        match fs::read(path).await {
            Ok(c) => Some(Bytes::from(c)),
            Err(e) => {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                return http::build_404_response();
            }
        }
    };

    let len = data.as_ref().map_or(meta.len(), |d| d.len() as u64);
    let mut resp =
        http::response::build_file_response(data, len, content_type, &validators.etag);
    if let Some(value) = validators
        .last_modified
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        resp.headers_mut().insert(LAST_MODIFIED, value);
    }
    resp
}
