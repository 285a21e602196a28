//! Anchoring of quoted excerpts in the reviewed document.
//!
//! Offsets are counted in characters (Unicode scalar values), not bytes.

/// An excerpt after lookup in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedExcerpt {
    /// Source casing when located, the raw excerpt otherwise.
    pub excerpt: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl LocatedExcerpt {
    fn unlocated(raw_excerpt: &str) -> Self {
        Self {
            excerpt: raw_excerpt.to_string(),
            start: None,
            end: None,
        }
    }
}

/// Finds the first case-insensitive occurrence of `raw_excerpt` in `document`.
///
/// Characters are compared by their lowercase expansion, so a match always
/// spans exactly as many document characters as the excerpt has.
pub fn locate(raw_excerpt: &str, document: &str) -> LocatedExcerpt {
    let needle: Vec<char> = raw_excerpt.chars().collect();
    if needle.is_empty() {
        return LocatedExcerpt::unlocated(raw_excerpt);
    }

    let haystack: Vec<char> = document.chars().collect();
    if needle.len() > haystack.len() {
        return LocatedExcerpt::unlocated(raw_excerpt);
    }

    let found = (0..=haystack.len() - needle.len()).find(|&start| {
        needle
            .iter()
            .zip(&haystack[start..start + needle.len()])
            .all(|(a, b)| chars_match(*a, *b))
    });

    match found {
        Some(start) => {
            let end = start + needle.len();
            LocatedExcerpt {
                excerpt: haystack[start..end].iter().collect(),
                start: Some(start),
                end: Some(end),
            }
        }
        None => LocatedExcerpt::unlocated(raw_excerpt),
    }
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Converts a character offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end clamp to the position just after the last character.
pub fn offset_to_position(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
