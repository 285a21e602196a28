//! Minimal front-matter editing for markdown documents.
//!
//! Only top-level `key: value` lines are understood. Everything else inside
//! the block is preserved byte for byte.

const DELIMITER: &str = "---";

/// Sets `key` to the double-quoted `value` in the document's front matter.
///
/// An existing top-level entry for `key` is replaced in place (including any
/// indented continuation lines). A document without front matter gets a new
/// block at the top.
pub fn set_field(content: &str, key: &str, value: &str) -> String {
    let entry = format!("{key}: {}", quote(value));

    let Some((block, body)) = split_front_matter(content) else {
        return format!("{DELIMITER}\n{entry}\n{DELIMITER}\n{content}");
    };

    let mut lines: Vec<&str> = Vec::new();
    let mut replaced = false;
    let mut skipping_continuation = false;

    for line in block.lines() {
        if skipping_continuation {
            if line.starts_with([' ', '\t']) {
                continue;
            }
            skipping_continuation = false;
        }
        if is_entry_for(line, key) {
            if !replaced {
                lines.push(&entry);
                replaced = true;
            }
            skipping_continuation = true;
            continue;
        }
        lines.push(line);
    }
    if !replaced {
        lines.push(&entry);
    }

    let mut out = String::with_capacity(content.len() + entry.len() + 1);
    out.push_str(DELIMITER);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push_str(body);
    out
}

/// Splits `content` into the front-matter block (without delimiters) and the
/// remainder starting right after the closing delimiter.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let after = &rest[offset + DELIMITER.len()..];
            return Some((block, after));
        }
        offset += line.len();
    }
    None
}

fn is_entry_for(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with(':'))
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
