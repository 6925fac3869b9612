//! URL assembly for portal endpoints.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped inside a single path segment. Unreserved characters
/// from RFC 3986 pass through untouched.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encode a caller-supplied value for use as one path segment.
///
/// # Example
/// ```rust
/// use burwood_util::http::encode_path_segment;
///
/// assert_eq!(encode_path_segment("my-project-123"), "my-project-123");
/// assert_eq!(encode_path_segment("a/b c"), "a%2Fb%20c");
/// ```
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Join a base URL and an API-relative endpoint with exactly one `/`.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}
