//! Google Drive/Docs link normalization
//!
//! Share links such as `https://drive.google.com/file/d/<ID>/view` or
//! `https://docs.google.com/uc?id=<ID>` point at an HTML viewer page. They are
//! rewritten to the direct-download endpoint so the proxy fetches file bytes.

use percent_encoding::{percent_decode, percent_decode_str};
use std::borrow::Cow;
use url::{form_urlencoded, Url};

/// Direct-download endpoint (query is appended)
pub const DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc";

/// Host suffixes that trigger rewriting
const DRIVE_HOST_SUFFIXES: [&str; 2] = ["drive.google.com", "docs.google.com"];

/// Rewrite a Drive/Docs link to `https://drive.google.com/uc?export=download&id=<ID>`.
///
/// Returns the input unchanged when it is empty, unparseable, on another
/// host, or when no file id can be found. Applying it to its own output
/// yields the same string.
pub fn normalize_drive_url(raw: &str) -> Cow<'_, str> {
    if raw.is_empty() {
        return Cow::Borrowed(raw);
    }
    let Ok(url) = Url::parse(raw) else {
        return Cow::Borrowed(raw);
    };
    if !is_drive_host(&url) {
        return Cow::Borrowed(raw);
    }

    match extract_file_id(&url) {
        Some(id) => Cow::Owned(download_url(&id)),
        None => Cow::Borrowed(raw),
    }
}

fn is_drive_host(url: &Url) -> bool {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    DRIVE_HOST_SUFFIXES
        .iter()
        .any(|suffix| host.ends_with(suffix))
}

/// Locate the file id: the segment after `d` in the path, else the `id` query parameter.
///
/// The id is kept as raw bytes so ids that are not valid UTF-8 survive the
/// decode/encode cycle unchanged.
fn extract_file_id(url: &Url) -> Option<Vec<u8>> {
    let from_path = url.path_segments().and_then(|mut segments| {
        segments.by_ref().find(|s| *s == "d")?;
        segments
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).collect())
    });

    from_path.or_else(|| url.query().and_then(query_file_id))
}

fn query_file_id(query: &str) -> Option<Vec<u8>> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "id" && !value.is_empty())
            .then(|| percent_decode(value.replace('+', " ").as_bytes()).collect())
    })
}

fn download_url(file_id: &[u8]) -> String {
    let id: String = form_urlencoded::byte_serialize(file_id).collect();
    format!("{DOWNLOAD_ENDPOINT}?export=download&id={id}")
}
