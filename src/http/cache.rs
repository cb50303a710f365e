//! Conditional request module
//!
//! Validators for static files: a weak `ETag` derived from size and
//! modification time, and an HTTP-date `Last-Modified` header.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// HTTP-date layout (RFC 7231 IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Validators computed from file metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    pub last_modified: Option<String>,
    modified: Option<DateTime<Utc>>,
}

impl Validators {
    pub fn new(len: u64, modified: Option<SystemTime>) -> Self {
        let modified = modified.map(DateTime::<Utc>::from);
        let stamp = modified.map_or(0, |m| m.timestamp());
        Self {
            etag: format!("W/\"{len:x}-{stamp:x}\""),
            last_modified: modified.map(|m| m.format(HTTP_DATE_FORMAT).to_string()),
            modified,
        }
    }

    /// Whether the client's cached copy is still fresh (should return 304).
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only
    /// consulted when no entity tag was sent.
    pub fn is_fresh(&self, if_none_match: Option<&str>, if_modified_since: Option<&str>) -> bool {
        if let Some(tags) = if_none_match {
            return tags
                .split(',')
                .map(str::trim)
                .any(|tag| tag == "*" || strip_weak(tag) == strip_weak(&self.etag));
        }

        match (if_modified_since.and_then(parse_http_date), self.modified) {
            (Some(since), Some(modified)) => modified.timestamp() <= since.timestamp(),
            _ => false,
        }
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_etag_depends_on_size_and_mtime() {
        let a = Validators::new(10, at(1_000));
        assert_eq!(a, Validators::new(10, at(1_000)));
        assert_ne!(a.etag, Validators::new(11, at(1_000)).etag);
        assert_ne!(a.etag, Validators::new(10, at(2_000)).etag);
        assert!(a.etag.starts_with("W/\""));
    }

    #[test]
    fn test_last_modified_format() {
        let v = Validators::new(1, at(784_111_777));
        assert_eq!(
            v.last_modified.as_deref(),
            Some("Sun, 06 Nov 1994 08:49:37 GMT")
        );
    }

    #[test]
    fn test_if_none_match() {
        let v = Validators::new(5, at(1_000));
        let strong = v.etag.trim_start_matches("W/").to_string();
        assert!(v.is_fresh(Some(&v.etag), None));
        assert!(v.is_fresh(Some(&format!("\"other\", {strong}")), None));
        assert!(v.is_fresh(Some("*"), None));
        assert!(!v.is_fresh(Some("\"other\""), None));
        assert!(!v.is_fresh(None, None));
    }

    #[test]
    fn test_if_modified_since() {
        let v = Validators::new(5, at(784_111_777));
        assert!(v.is_fresh(None, Some("Sun, 06 Nov 1994 08:49:37 GMT")));
        assert!(v.is_fresh(None, Some("Mon, 07 Nov 1994 08:49:37 GMT")));
        assert!(!v.is_fresh(None, Some("Sat, 05 Nov 1994 08:49:37 GMT")));
        assert!(!v.is_fresh(None, Some("not a date")));
        // entity tag wins over date
        assert!(!v.is_fresh(Some("\"other\""), Some("Mon, 07 Nov 1994 08:49:37 GMT")));
    }
}
