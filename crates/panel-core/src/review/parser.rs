//! Parsing of free-text reviewer output.
//!
//! Generated text is ungoverned: the parser never fails, it only keeps what
//! it can recognize.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single bullet marker (`-`, `*`, `+`, `•`) followed by whitespace or the
/// end of the line.
static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+•](?:\s+|$)").expect("valid bullet regex"));

/// The first double-quoted run of at least five characters.
static QUOTED_EXCERPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]{5,})""#).expect("valid quote regex"));

/// One candidate feedback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The line without its bullet marker, quote included.
    pub text: String,
    /// Inner content of the first quoted run, not yet matched against the document.
    pub raw_excerpt: Option<String>,
}

/// Splits `raw_text` into candidate feedback lines, in their original order.
pub fn parse(raw_text: &str) -> Vec<ParsedLine> {
    raw_text.lines().filter_map(parse_line).collect()
}

/// Parses one line; `None` when nothing is left after stripping the marker.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let text = strip_bullet(line.trim());
    if text.is_empty() {
        return None;
    }

    Some(ParsedLine {
        text: text.to_string(),
        raw_excerpt: extract_excerpt(text),
    })
}

/// Whether a trimmed line starts with a bullet marker.
pub fn is_bullet(line: &str) -> bool {
    BULLET_MARKER.is_match(line.trim())
}

fn strip_bullet(line: &str) -> &str {
    match BULLET_MARKER.find(line) {
        Some(marker) => &line[marker.end()..],
        None => line,
    }
}

fn extract_excerpt(text: &str) -> Option<String> {
    QUOTED_EXCERPT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_each_kind_of_marker() {
        let parsed = parse("- dash\n* star\n+ plus\n• dot\nplain");
        let texts: Vec<_> = parsed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["dash", "star", "plus", "dot", "plain"]);
    }

    #[test]
    fn test_strips_only_one_marker() {
        let parsed = parse("- - nested");
        assert_eq!(parsed[0].text, "- nested");
    }

    #[test]
    fn test_marker_without_space_is_text() {
        let parsed = parse("-3 degrees is cold");
        assert_eq!(parsed[0].text, "-3 degrees is cold");
    }

    #[test]
    fn test_skips_blank_and_marker_only_lines() {
        let raw = "\n  \n-\n*   \n- real point\n\n";
        let parsed = parse(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "real point");
    }

    #[test]
    fn test_count_matches_non_empty_lines() {
        let raw = "- one \"quoted text\"\n\n* two\n   + three\n-\nfour";
        // five non-empty lines, one of them marker-only
        assert_eq!(parse(raw).len(), 4);
    }

    #[test]
    fn test_excerpt_requires_five_characters() {
        assert_eq!(parse("- see \"tiny\"")[0].raw_excerpt, None);
        assert_eq!(
            parse("- see \"short\"")[0].raw_excerpt.as_deref(),
            Some("short")
        );
    }

    #[test]
    fn test_first_qualifying_quote_wins() {
        let parsed = parse("- Compare \"first quote\" with \"second quote\"");
        assert_eq!(parsed[0].raw_excerpt.as_deref(), Some("first quote"));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }

    #[test]
    fn test_handles_crlf_lines() {
        let parsed = parse("- a point \"with quote\"\r\n- another\r\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].raw_excerpt.as_deref(), Some("with quote"));
        assert_eq!(parsed[1].text, "another");
    }

    #[test]
    fn test_is_bullet() {
        assert!(is_bullet("  - point"));
        assert!(is_bullet("* point"));
        assert!(!is_bullet("## Reviewer: Critic"));
    }
}
