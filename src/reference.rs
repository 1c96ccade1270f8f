//! Reference string parsing.
//!
//! Linters locate findings with free-form reference strings such as
//! `specification/network/resource-manager/network.json:120:7`. This module
//! pulls the document path and line number out of them and strips the
//! position suffix for position-insensitive comparison.
//!
//! None of these functions fail: a reference that does not carry a
//! parseable position yields `None` and the caller substitutes a default.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Marker ending the document path inside a reference.
pub const DOCUMENT_EXTENSION: &str = ".json";

/// Marker introducing the `line:column` suffix.
pub const POSITION_MARKER: &str = ".json:";

/// Marker starting the repository-relative document path.
pub const PATH_START_MARKER: &str = "specification";

fn position_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*\.json:\d+:\d+").expect("position regex compiles"))
}

/// Line number following the first position marker.
///
/// Returns `None` when the marker is missing, no digits follow it, the
/// number does not fit, or the line is `0`.
pub fn extract_line(reference: &str) -> Option<u32> {
    let start = reference.find(POSITION_MARKER)? + POSITION_MARKER.len();
    let rest = &reference[start..];
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    match rest[..digits_end].parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(line) => Some(line),
    }
}

/// Document path: from the start-of-path marker through the extension.
pub fn extract_file(reference: &str) -> Option<&str> {
    let start = reference.find(PATH_START_MARKER)?;
    let end = reference.find(DOCUMENT_EXTENSION)? + DOCUMENT_EXTENSION.len();

    if end <= start {
        return None;
    }

    Some(&reference[start..end])
}

/// Remove everything up to and including the `.json:<line>:<column>` suffix.
///
/// Two references to the same JSON node at different positions compare
/// equal after stripping.
pub fn strip_position(reference: &str) -> Cow<'_, str> {
    position_pattern().replace(reference, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_plain_reference() {
        let reference = "specification/foo/service.json:12:3";
        assert_eq!(extract_file(reference), Some("specification/foo/service.json"));
        assert_eq!(extract_line(reference), Some(12));
    }

    #[test]
    fn test_extract_from_prefixed_reference() {
        let reference =
            "file:///tmp/repo/specification/network/network.json:120:7#/paths/~1vnets";
        assert_eq!(
            extract_file(reference),
            Some("specification/network/network.json")
        );
        assert_eq!(extract_line(reference), Some(120));
    }

    #[test]
    fn test_extract_line_absent() {
        assert_eq!(extract_line("specification/foo/service.json"), None);
        assert_eq!(extract_line("specification/foo/service.json:abc:3"), None);
        assert_eq!(extract_line(""), None);
    }

    #[test]
    fn test_extract_line_zero_is_absent() {
        assert_eq!(extract_line("specification/a.json:0:4"), None);
    }

    #[test]
    fn test_extract_line_overflow_is_absent() {
        assert_eq!(extract_line("specification/a.json:99999999999:1"), None);
    }

    #[test]
    fn test_extract_file_absent() {
        assert_eq!(extract_file("other/foo/service.json:1:1"), None);
        assert_eq!(extract_file("specification/foo/service.yaml:1:1"), None);
        assert_eq!(extract_file(""), None);
    }

    #[test]
    fn test_extract_file_extension_before_marker() {
        assert_eq!(extract_file("a.json/specification/b"), None);
    }

    #[test]
    fn test_strip_position() {
        assert_eq!(
            strip_position("specification/a.json:12:3#/definitions/Foo"),
            "#/definitions/Foo"
        );
        assert_eq!(
            strip_position("specification/a.json:40:9#/definitions/Foo"),
            strip_position("specification/a.json:12:3#/definitions/Foo")
        );
        assert_eq!(strip_position("no position here"), "no position here");
    }

    #[test]
    fn test_strip_position_is_greedy() {
        assert_eq!(
            strip_position("x.json:1:1 -> specification/b.json:2:2/tail"),
            "/tail"
        );
    }
}
