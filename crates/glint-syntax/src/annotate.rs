//! Links and notes inside comments and strings.
//!
//! Runs over a range that a comment or quote matcher has already formatted and paints
//! URLs, e-mail addresses and attention words on top of it.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::format::{LineFormats, TokenKind};

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:(?:https?|ftp|file)://|www\.)[^\s<>"'`]+|\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+\b"#,
    )
    .expect("URL pattern is valid")
});

static NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:NOTE|TODO|FIXME|WARNING|XXX|HACK)\b").expect("note pattern is valid")
});

/// Paints links in `range` of `text`; in comments also attention words.
pub fn apply(formats: &mut LineFormats, text: &str, range: Range<usize>, in_comment: bool) {
    let Some(slice) = text.get(range.clone()) else {
        return;
    };
    let link = if in_comment {
        TokenKind::CommentUrl
    } else {
        TokenKind::StringUrl
    };

    for found in URL.find_iter(slice) {
        let trimmed = found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        if trimmed.is_empty() {
            continue;
        }
        let start = range.start + found.start();
        formats.set(start..start + trimmed.len(), link);
    }

    if in_comment {
        for found in NOTE.find_iter(slice) {
            let start = range.start + found.start();
            formats.set(start..start + found.len(), TokenKind::Note);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, in_comment: bool) -> LineFormats {
        let fill = if in_comment {
            TokenKind::Comment
        } else {
            TokenKind::String
        };
        let mut formats = LineFormats::new(text.len(), fill);
        apply(&mut formats, text, 0..text.len(), in_comment);
        formats
    }

    #[test]
    fn test_comment_url_strips_punctuation() {
        let text = "// see https://example.com/a.";
        let formats = run(text, true);
        let start = text.find("https").unwrap();
        assert_eq!(formats.at(start), TokenKind::CommentUrl);
        assert_eq!(formats.at(text.len() - 2), TokenKind::CommentUrl);
        assert_eq!(formats.at(text.len() - 1), TokenKind::Comment);
    }

    #[test]
    fn test_string_url_and_email() {
        let text = "\"mail bob@example.org now\"";
        let formats = run(text, false);
        assert_eq!(formats.at(6), TokenKind::StringUrl);
        assert_eq!(formats.at(1), TokenKind::String);
    }

    #[test]
    fn test_notes_only_in_comments() {
        let text = "# TODO: fix, TODOS stay";
        let formats = run(text, true);
        assert_eq!(formats.at(2), TokenKind::Note);
        assert_eq!(formats.at(13), TokenKind::Comment);

        let formats = run("\"TODO\"", false);
        assert_eq!(formats.at(1), TokenKind::String);
    }
}
