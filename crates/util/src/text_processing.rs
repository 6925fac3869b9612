//! # Text Processing Utilities
//!
//! Redaction of credentials before text reaches logs, dry-run output or
//! error messages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement inserted in place of a redacted value.
pub const REDACTED: &str = "[REDACTED]";

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

/// Redacts values that look like secrets in a string.
///
/// Header lines keep their name, environment-style assignments keep their
/// key and JSON members keep their quotes, so the output stays readable.
///
/// # Example
/// ```rust
/// use burwood_util::redact_sensitive;
///
/// let redacted = redact_sensitive("x-access-token: eyJhbGciOi.payload");
/// assert_eq!(redacted, "x-access-token: [REDACTED]");
///
/// let redacted = redact_sensitive("PORTAL_PASSWORD=hunter2 PORTAL_USERNAME=ops");
/// assert_eq!(redacted, "PORTAL_PASSWORD=[REDACTED] PORTAL_USERNAME=ops");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, REDACTED)
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}{suffix}")
            })
            .to_string();
    }

    redacted
}

/// Ordered list of patterns. Group 1 is kept, group 2 replaced, group 3 kept.
fn build_redact_patterns() -> Vec<Regex> {
    [
        r"(?i)(x-access-token:\s*)(\S+)",
        r"(?i)(authorization:[ \t]*)(\S+(?:[ \t]+\S+)?)",
        r"(?i)(\bBasic\s+)([A-Za-z0-9+/]+=*)",
        r"(?i)(\b[A-Z0-9_]*(?:TOKEN|SECRET|PASSWORD)=)(\S+)",
        r#"(?i)("(?:token|password|x-access-token)"\s*:\s*")([^"]*)(")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}
