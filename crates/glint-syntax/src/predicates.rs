//! Stateless escape and context predicates.
//!
//! These look only at the bytes of the current line. The containment predicates that
//! need to know about comments and strings live on [`LineContext`](crate::LineContext),
//! since they depend on the region scan of the line.

/// Whether the byte at `pos` is escaped by an odd run of backslashes.
pub fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    let run = bytes[..pos.min(bytes.len())]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count();
    run % 2 == 1
}

/// Whether `pos` sits inside a `[...]` character class of a regex that starts at `start`.
///
/// `start` is the offset of the first byte after the opening delimiter.
pub fn in_bracket_class(bytes: &[u8], start: usize, pos: usize) -> bool {
    let mut in_class = false;
    let mut i = start;
    while i < pos.min(bytes.len()) {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' if !in_class => {
                in_class = true;
                // `[]...]` and `[^]...]` treat the first `]` as a literal
                if bytes.get(i + 1) == Some(&b'^') {
                    i += 1;
                }
                if bytes.get(i + 1) == Some(&b']') {
                    i += 1;
                }
            }
            b']' if in_class => in_class = false,
            _ => {}
        }
        i += 1;
    }
    in_class
}

pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Offset of the last non-blank byte before `pos`.
pub fn prev_non_space(bytes: &[u8], pos: usize) -> Option<usize> {
    bytes[..pos.min(bytes.len())]
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
}

/// Offset of the first non-blank byte at or after `pos`.
pub fn next_non_space(bytes: &[u8], pos: usize) -> Option<usize> {
    bytes
        .get(pos..)?
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|offset| pos + offset)
}

/// The identifier that ends at `end` (exclusive).
pub fn word_before(text: &str, end: usize) -> &str {
    let bytes = text.as_bytes();
    let start = bytes[..end]
        .iter()
        .rposition(|b| !is_word_byte(*b))
        .map_or(0, |p| p + 1);
    text.get(start..end).unwrap_or("")
}

/// The identifier that starts at `start`.
pub fn word_at(text: &str, start: usize) -> &str {
    let bytes = text.as_bytes();
    let end = bytes[start.min(bytes.len())..]
        .iter()
        .position(|b| !is_word_byte(*b))
        .map_or(bytes.len(), |p| start + p);
    text.get(start..end).unwrap_or("")
}

/// Number of leading spaces and tabs.
pub fn indentation(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The last token of `text`: a trailing identifier or a single punctuation character.
pub fn trailing_token(text: &str) -> &str {
    let trimmed = text.trim_end();
    let bytes = trimmed.as_bytes();
    match bytes.last() {
        None => "",
        Some(b) if is_word_byte(*b) => word_before(trimmed, trimmed.len()),
        Some(_) => {
            let start = trimmed
                .char_indices()
                .last()
                .map_or(0, |(i, _)| i);
            &trimmed[start..]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_parity() {
        let text = br#"a\"b\\"c\\\"d"#;
        assert!(is_escaped(text, 2));
        assert!(!is_escaped(text, 6));
        assert!(is_escaped(text, 11));
        assert!(!is_escaped(text, 0));
    }

    #[test]
    fn test_bracket_class() {
        let text = b"/[/]x/";
        assert!(in_bracket_class(text, 1, 2));
        assert!(!in_bracket_class(text, 1, 5));
        let text = b"/[]/]/";
        assert!(in_bracket_class(text, 1, 3));
        let text = b"/\\[/";
        assert!(!in_bracket_class(text, 1, 3));
    }

    #[test]
    fn test_words() {
        assert_eq!(word_before("return x", 6), "return");
        assert_eq!(word_at("foo(bar)", 4), "bar");
        assert_eq!(trailing_token("  x = y  "), "y");
        assert_eq!(trailing_token("call(a)"), ")");
        assert_eq!(trailing_token("   "), "");
        assert_eq!(indentation("\t  x"), 3);
    }

    #[test]
    fn test_neighbours() {
        let text = b"a  b";
        assert_eq!(prev_non_space(text, 3), Some(0));
        assert_eq!(next_non_space(text, 1), Some(3));
        assert_eq!(next_non_space(text, 4), None);
    }
}
