//! Review artifact codec.
//!
//! The artifact is a markdown note with a front-matter block, one summary
//! section and one section per persona:
//!
//! ```text
//! ---
//! tags: [review]
//! original_note: "[[notes/plan.md]]"
//! date: 2024-05-20T10:00:00+00:00
//! ---
//!
//! # Review for plan
//!
//! ## Meta-Review Summary
//! <synthesis>
//!
//! ## Reviewer: Logic Critic
//! - Unsupported claim in "we will double revenue"
//! ```
//!
//! The section markers are the wire format: [`deserialize_review`] only
//! understands what [`serialize_review`] writes. Offsets are not persisted.

use super::model::{Comment, ReviewResult};
use super::parser::{is_bullet, parse_line};
use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;

pub const SUMMARY_HEADER: &str = "## Meta-Review Summary";
pub const PERSONA_HEADER_PREFIX: &str = "## Reviewer:";
const FRONT_MATTER_DELIMITER: &str = "---";
const ARTIFACT_SUFFIX: &str = " - Review.md";

/// Identity of the reviewed document, written into the artifact header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewArtifactHeader {
    /// Vault-relative path of the reviewed document
    pub source_path: String,
    /// File name of the reviewed document without extension
    pub source_basename: String,
    pub generated_at: DateTime<Utc>,
}

impl ReviewArtifactHeader {
    pub fn for_document(source_path: &str, generated_at: DateTime<Utc>) -> Self {
        Self {
            source_path: source_path.to_string(),
            source_basename: document_basename(source_path),
            generated_at,
        }
    }
}

/// The base name of a document path: last segment without its extension.
pub fn document_basename(path: &str) -> String {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name[..dot].to_string(),
        _ => file_name.to_string(),
    }
}

/// Deterministic artifact file name for a document base name.
pub fn artifact_file_name(source_basename: &str) -> String {
    format!("{source_basename}{ARTIFACT_SUFFIX}")
}

/// Renders a review result as an artifact document.
pub fn serialize_review(result: &ReviewResult, header: &ReviewArtifactHeader) -> String {
    let mut out = String::new();

    out.push_str(FRONT_MATTER_DELIMITER);
    out.push('\n');
    out.push_str("tags: [review]\n");
    out.push_str(&format!("original_note: \"[[{}]]\"\n", header.source_path));
    out.push_str(&format!(
        "date: {}\n",
        header
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(FRONT_MATTER_DELIMITER);
    out.push_str("\n\n");

    out.push_str(&format!("# Review for {}\n\n", header.source_basename));

    out.push_str(SUMMARY_HEADER);
    out.push('\n');
    for line in result.synthesis.lines() {
        out.push_str(&escape_summary_line(line));
        out.push('\n');
    }
    out.push('\n');

    for persona in result.persona_names() {
        out.push_str(&format!("{PERSONA_HEADER_PREFIX} {persona}\n"));
        for comment in result.comments_by(persona) {
            out.push_str(&format!("- {}\n", comment.text));
        }
        out.push('\n');
    }

    out
}

/// Whether `line` would read as a persona header once leading backslashes
/// are removed.
fn is_header_like(line: &str) -> bool {
    line.trim_start()
        .trim_start_matches('\\')
        .starts_with(PERSONA_HEADER_PREFIX)
}

/// Prefixes a summary line that looks like a persona header with `\`.
fn escape_summary_line(line: &str) -> Cow<'_, str> {
    if is_header_like(line) {
        let indent = line.len() - line.trim_start().len();
        Cow::Owned(format!("{}\\{}", &line[..indent], &line[indent..]))
    } else {
        Cow::Borrowed(line)
    }
}

fn unescape_summary_line(line: &str) -> Cow<'_, str> {
    let indent = line.len() - line.trim_start().len();
    if is_header_like(line) && line[indent..].starts_with('\\') {
        Cow::Owned(format!("{}{}", &line[..indent], &line[indent + 1..]))
    } else {
        Cow::Borrowed(line)
    }
}

enum Section<'a> {
    Preamble,
    Summary,
    Persona(&'a str),
}

/// Reads an artifact document back into a review result.
///
/// The synthesis is the trimmed body between the summary header and the
/// first persona header (empty when there is no summary). Summary lines that
/// were escaped on write lose one leading `\`. Bulleted lines of
/// each persona section are re-parsed like generation output. The result
/// never carries offsets because the source document is not consulted.
pub fn deserialize_review(content: &str) -> ReviewResult {
    let mut section = Section::Preamble;
    let mut summary_lines: Vec<Cow<'_, str>> = Vec::new();
    let mut comments = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(name) = trimmed.strip_prefix(PERSONA_HEADER_PREFIX) {
            section = Section::Persona(name.trim());
            continue;
        }

        match section {
            Section::Preamble => {
                if trimmed == SUMMARY_HEADER {
                    section = Section::Summary;
                }
            }
            Section::Summary => summary_lines.push(unescape_summary_line(line)),
            Section::Persona(persona_name) => {
                if !is_bullet(trimmed) {
                    continue;
                }
                if let Some(parsed) = parse_line(trimmed) {
                    comments.push(Comment {
                        persona_name: persona_name.to_string(),
                        text: parsed.text,
                        excerpt: parsed.raw_excerpt,
                        start: None,
                        end: None,
                    });
                }
            }
        }
    }

    ReviewResult {
        comments,
        synthesis: summary_lines.join("\n").trim().to_string(),
    }
}
