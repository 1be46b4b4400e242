//! Strings, docstrings and quote-like literals.

use super::{Matcher, paint_regions};
use crate::context::LineContext;
use crate::dialect::{Escapes, LexRules, LiteralSyntax, Multiline, QuoteRule};
use crate::predicates::is_escaped;
use crate::scan::{Region, ScanEnv};
use crate::state::{BlockState, QuoteKind};

#[derive(Debug)]
pub struct QuoteMatcher;

impl Matcher for QuoteMatcher {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        paint_regions(ctx, |region| {
            matches!(
                region,
                Region::Quote(_) | Region::DocString(_) | Region::QuoteLike { .. }
            )
        });
    }

    fn accepts(&self, state: &BlockState, lex: &LexRules) -> bool {
        match state {
            BlockState::Quote(kind) => lex
                .quote_rule(*kind)
                .is_some_and(|rule| rule.multiline != Multiline::Never),
            BlockState::DocString(kind) => lex.docstrings && kind.is_triple(),
            BlockState::QuoteLike { .. } => lex.literals != LiteralSyntax::None,
            _ => false,
        }
    }
}

/// Tokens after which a triple quote at line start continues an expression instead of
/// opening a docstring.
const CONTINUES_EXPRESSION: &[&str] = &["(", "[", "{", ",", "=", "\\"];

/// The quote starting at `i`, with the length of its opening delimiter.
pub(crate) fn start_at(env: &ScanEnv<'_>, i: usize) -> Option<(Region, usize)> {
    let bytes = env.bytes();
    let lex = env.lex;
    for rule in lex.quotes {
        let delimiter = rule.kind.delimiter();
        if !bytes[i..].starts_with(delimiter.as_bytes()) {
            continue;
        }
        if is_escaped(bytes, i) {
            return None;
        }
        if lex.quote_guard.is_some_and(|guard| !guard(bytes, i, rule.kind)) {
            continue;
        }
        let region = if lex.docstrings && rule.kind.is_triple() && opens_statement(env, i) {
            Region::DocString(rule.kind)
        } else {
            Region::Quote(rule.kind)
        };
        return Some((region, delimiter.len()));
    }
    None
}

fn opens_statement(env: &ScanEnv<'_>, i: usize) -> bool {
    env.bytes()[..i].iter().all(u8::is_ascii_whitespace)
        && env
            .prev
            .is_none_or(|data| !CONTINUES_EXPRESSION.contains(&data.tail.as_str()))
}

/// Searches for the end of a quote of `kind` from `from`. Returns the offset just past
/// the closing delimiter and whether the quote closed on this line.
pub(crate) fn find_end(bytes: &[u8], from: usize, kind: QuoteKind, lex: &LexRules) -> (usize, bool) {
    let rule = lex
        .quote_rule(kind)
        .copied()
        .unwrap_or(QuoteRule::new(kind, Escapes::Backslash, Multiline::Never));
    let delimiter = kind.delimiter().as_bytes();

    let mut i = from;
    while i < bytes.len() {
        if rule.escapes == Escapes::Backslash && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(delimiter) {
            let after = i + delimiter.len();
            if rule.escapes == Escapes::Doubled && bytes[after..].starts_with(delimiter) {
                i = after + delimiter.len();
                continue;
            }
            return (after, true);
        }
        i += 1;
    }

    let carried = match rule.multiline {
        Multiline::Never => false,
        Multiline::Always => true,
        Multiline::Continuation => is_escaped(bytes, bytes.len()),
    };
    (bytes.len(), !carried)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, Language};
    use crate::testing::{Lines, all_kind};
    use crate::{HighlightOptions, Highlighter, TokenKind};

    fn run(language: Language, text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(language, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_escapes() {
        let lex = *Dialect::new(Language::C).lex();
        assert_eq!(find_end(br#"a\"b" x"#, 0, QuoteKind::Double, &lex), (5, true));
        assert_eq!(find_end(br#"a\\" x"#, 0, QuoteKind::Double, &lex), (4, true));

        let sql = *Dialect::new(Language::Sql).lex();
        assert_eq!(find_end(b"it''s' x", 0, QuoteKind::Single, &sql), (6, true));
    }

    #[test]
    fn test_continuation() {
        let (lines, results) = run(Language::C, "s = \"abc\\\ndef\"; int x;");
        assert_eq!(results[0].state, BlockState::Quote(QuoteKind::Double));
        assert!(all_kind(&results, &lines, 1, "def\"", TokenKind::String));
        assert_eq!(results[1].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 1, "int", TokenKind::Type));

        let (_, results) = run(Language::C, "s = \"abc\nint x;");
        assert_eq!(results[0].state, BlockState::Neutral);
    }

    #[test]
    fn test_docstring_vs_triple_string() {
        let (lines, results) = run(
            Language::Python,
            "def f():\n    \"\"\"Doc\n    more\"\"\"\n    x = \"\"\"data\n    \"\"\"",
        );
        assert_eq!(results[1].state, BlockState::DocString(QuoteKind::TripleDouble));
        assert!(all_kind(&results, &lines, 2, "more", TokenKind::Comment));
        assert_eq!(results[2].state, BlockState::Neutral);
        assert_eq!(results[3].state, BlockState::Quote(QuoteKind::TripleDouble));
        assert!(all_kind(&results, &lines, 3, "data", TokenKind::String));
    }

    #[test]
    fn test_single_quotes_are_alt_strings() {
        let (lines, results) = run(Language::JavaScript, "let a = 'x', b = \"y\";");
        assert!(all_kind(&results, &lines, 0, "'x'", TokenKind::AltString));
        assert!(all_kind(&results, &lines, 0, "\"y\"", TokenKind::String));
    }

    #[test]
    fn test_perl_quote_like() {
        let (lines, results) = run(Language::Perl, "my @w = qw{a {b} c};\nmy $s = q(open\nstill) . 1;");
        assert!(all_kind(&results, &lines, 0, "qw{a {b} c}", TokenKind::String));
        assert!(matches!(results[1].state, BlockState::QuoteLike { open: '(', .. }));
        assert!(all_kind(&results, &lines, 2, "still)", TokenKind::String));
        assert_eq!(results[2].state, BlockState::Neutral);
    }
}
