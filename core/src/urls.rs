//! URL string helpers.
//!
//! `join_url` and `base_url` are pure string manipulation and never fail.
//! `parse_url` accepts absolute URLs and relative references; input it
//! cannot parse is reported as `RequestError::InvalidUrl` rather than
//! aborting.

use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

use crate::error::RequestError;

/// Join `segments` onto `base` with exactly one `/` between them.
///
/// Segments are joined with `/` and cleaned lexically: empty and `.`
/// elements are dropped, `..` removes the element before it, and repeated
/// slashes collapse.
pub fn join_url<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let path = clean_path(segments);
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Everything before the last `/`, or the input unchanged when it has none.
pub fn base_url(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Describe the parts of a URL on separate, right-aligned lines.
///
/// The path is printed percent-decoded. A relative reference prints an
/// empty scheme and host; a URL with nothing after its authority prints an
/// empty path.
pub fn parse_url(raw: &str) -> Result<String, RequestError> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => return Ok(describe_relative(raw)),
        Err(e) => return Err(RequestError::InvalidUrl(format!("{raw}: {e}"))),
    };
    let host = url
        .host_str()
        .unwrap_or("")
        .trim_start_matches('[')
        .trim_end_matches(']');
    let path = if url.cannot_be_a_base() || !has_path(raw) {
        String::new()
    } else {
        percent_decode_str(url.path()).decode_utf8_lossy().into_owned()
    };
    Ok(describe(url.scheme(), host, &path, url.query().unwrap_or("")))
}

fn describe_relative(raw: &str) -> String {
    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
    let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
    describe("", "", &percent_decode_str(path).decode_utf8_lossy(), query)
}

fn describe(scheme: &str, host: &str, path: &str, query: &str) -> String {
    format!("\nScheme: {scheme}\n  Host: {host}\n  Path: {path}\n Query: {query}\n")
}

/// Whether anything follows the authority as a path, e.g. `http://x/` but
/// not `http://x` or `http://x?q`.
fn has_path(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((_, rest)) => rest
            .find(['/', '?', '#'])
            .is_some_and(|idx| rest[idx..].starts_with('/')),
        None => true,
    }
}

fn clean_path<S: AsRef<str>>(segments: &[S]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return String::new();
    }

    let rooted = joined.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `..` above the root stays at the root
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let cleaned = parts.join("/");
    match (rooted, cleaned.is_empty()) {
        (true, _) => format!("/{cleaned}"),
        (false, true) => ".".to_string(),
        (false, false) => cleaned,
    }
}
