//! Line and block comments.

use super::{Matcher, paint_regions};
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::scan::{End, Region};
use crate::state::BlockState;

#[derive(Debug)]
pub struct CommentMatcher;

impl Matcher for CommentMatcher {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        paint_regions(ctx, |region| {
            matches!(region, Region::LineComment | Region::BlockComment { .. })
        });
    }

    fn accepts(&self, state: &BlockState, lex: &LexRules) -> bool {
        matches!(state, BlockState::Comment { pair } if (*pair as usize) < lex.block_pairs.len())
    }
}

/// Length of the line-comment marker at `i`, if one starts there.
pub(crate) fn line_start(bytes: &[u8], i: usize, lex: &LexRules) -> Option<usize> {
    lex.line_comments
        .iter()
        .find(|marker| {
            bytes[i..].starts_with(marker.as_bytes())
                && lex.line_comment_guard.is_none_or(|guard| guard(bytes, i))
        })
        .map(|marker| marker.len())
}

/// The block pair whose opener matches at `i`, with the opener's length.
pub(crate) fn block_start(bytes: &[u8], i: usize, lex: &LexRules) -> Option<(u8, usize)> {
    lex.block_pairs.iter().enumerate().find_map(|(idx, pair)| {
        let len = pair.open.match_at(bytes, i)?;
        Some((u8::try_from(idx).ok()?, len))
    })
}

pub(crate) fn find_end(bytes: &[u8], from: usize, pair: u8, lex: &LexRules) -> End {
    let region = Region::BlockComment { pair };
    let close = lex
        .block_pairs
        .get(pair as usize)
        .and_then(|p| p.close.find(bytes, from));
    match close {
        Some((at, len)) => End {
            at: at + len,
            closed: true,
            region,
        },
        None => End {
            at: bytes.len(),
            closed: false,
            region,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Language;
    use crate::testing::{Lines, all_kind};
    use crate::{BlockState, HighlightOptions, Highlighter, TokenKind};

    fn run(language: Language, text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(language, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let (lines, results) = run(Language::C, "int a; /* one\ntwo\nthree */ int b;");
        assert_eq!(results[0].state, BlockState::Comment { pair: 0 });
        assert_eq!(results[1].state, BlockState::Comment { pair: 0 });
        assert_eq!(results[2].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 1, "two", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 2, "three */", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 2, "int", TokenKind::Type));
    }

    #[test]
    fn test_line_comment_does_not_carry() {
        let (lines, results) = run(Language::Python, "x = 1  # note \"quoted\nprint(x)");
        assert!(all_kind(&results, &lines, 0, "# note", TokenKind::Comment));
        assert_eq!(results[0].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 1, "print", TokenKind::BuiltIn));
    }

    #[test]
    fn test_pod_block() {
        let (lines, results) = run(Language::Perl, "my $x;\n=head1 NAME\nstuff \"here\n=cut\nprint 1;");
        assert_eq!(results[1].state, BlockState::Comment { pair: 0 });
        assert!(all_kind(&results, &lines, 2, "stuff", TokenKind::Comment));
        assert_eq!(results[3].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 3, "=cut", TokenKind::Comment));
        assert!(!all_kind(&results, &lines, 4, "print", TokenKind::Comment));
    }

    #[test]
    fn test_cdata_is_raw_literal() {
        let (lines, results) = run(Language::Xml, "<a><![CDATA[ x < y ]]></a>");
        assert!(all_kind(&results, &lines, 0, "x < y", TokenKind::RawLiteral));
    }

    #[test]
    fn test_shebang_only_on_first_line() {
        let (lines, results) = run(Language::Python, "#!/usr/bin/env python\nx = 1");
        assert!(all_kind(&results, &lines, 0, "#!/usr/bin/env", TokenKind::Comment));
    }

    #[test]
    fn test_comment_url_and_note() {
        let (lines, results) = run(Language::Rust, "// FIXME see https://example.com");
        assert!(all_kind(&results, &lines, 0, "FIXME", TokenKind::Note));
        assert!(all_kind(&results, &lines, 0, "https://example.com", TokenKind::CommentUrl));
    }
}
