//! The generic pattern-table pass.
//!
//! After the matchers have painted comments, strings and the other multi-line constructs,
//! the pattern table fills in keywords, numbers, calls and similar single-line tokens.
//!
//! ## Learning: Snapshot Before Overwrite
//!
//! Rules may overwrite each other, but never the matchers' output. The pass takes a copy
//! of the formats before the first rule runs and skips any match that touches a byte the
//! copy marks as already classified. Checking the live formats instead would let an early
//! rule's output block a later, more specific one.

use regex::Regex;

use crate::dialect::Language;
use crate::dialect::rules;
use crate::format::{LineFormats, TokenKind};
use crate::{SyntaxError, SyntaxResult};

#[derive(Debug, Clone)]
struct Rule {
    regex: Regex,
    kind: TokenKind,
    group: usize,
}

/// A language's compiled, ordered (pattern, token kind) rules.
#[derive(Debug, Clone)]
pub struct PatternTable {
    rules: Vec<Rule>,
}

impl PatternTable {
    pub fn new(language: Language) -> SyntaxResult<Self> {
        let rules = rules::specs(language)
            .into_iter()
            .map(|spec| {
                let regex = Regex::new(&spec.pattern).map_err(|source| SyntaxError::Pattern {
                    language: language.name(),
                    source,
                })?;
                Ok(Rule {
                    regex,
                    kind: spec.kind,
                    group: spec.group,
                })
            })
            .collect::<SyntaxResult<Vec<_>>>()?;

        tracing::debug!("Compiled {} pattern rules for {}", rules.len(), language);
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule to `text`. Matches touching a byte that `snapshot` doesn't mark
    /// as `Main` are skipped.
    pub fn apply(&self, formats: &mut LineFormats, text: &str, snapshot: &LineFormats) {
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                if whole.range().is_empty()
                    || snapshot.any_in(whole.range(), |kind| kind != TokenKind::Main)
                {
                    continue;
                }
                if let Some(target) = caps.get(rule.group) {
                    formats.set(target.range(), rule.kind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(language: Language, text: &str, shielded: Option<std::ops::Range<usize>>) -> LineFormats {
        let table = PatternTable::new(language).unwrap();
        let mut formats = LineFormats::new(text.len(), TokenKind::Main);
        if let Some(range) = shielded {
            formats.set(range, TokenKind::Comment);
        }
        let snapshot = formats.clone();
        table.apply(&mut formats, text, &snapshot);
        formats
    }

    #[test]
    fn test_every_language_builds() {
        for lang in Language::all() {
            assert!(PatternTable::new(*lang).is_ok(), "{lang}");
        }
        assert!(PatternTable::new(Language::Plain).unwrap().is_empty());
    }

    #[test]
    fn test_keyword_beats_call() {
        let formats = paint(Language::C, "if (x) foo(1);", None);
        assert_eq!(formats.at(0), TokenKind::Keyword);
        assert_eq!(formats.at(7), TokenKind::Function);
        assert_eq!(formats.at(11), TokenKind::Number);
        assert_eq!(formats.at(4), TokenKind::Main);
    }

    #[test]
    fn test_never_paints_inside_shielded_span() {
        let text = "x = 1; // return 2";
        let formats = paint(Language::C, text, Some(7..text.len()));
        assert_eq!(formats.at(4), TokenKind::Number);
        assert!(formats.kinds()[7..].iter().all(|k| *k == TokenKind::Comment));
    }

    #[test]
    fn test_partial_overlap_is_skipped() {
        // `return` straddles the shielded range, so it stays untouched
        let formats = paint(Language::C, "return", Some(3..4));
        assert_eq!(formats.at(0), TokenKind::Main);
        assert_eq!(formats.at(3), TokenKind::Comment);
    }

    #[test]
    fn test_case_insensitive_language() {
        let formats = paint(Language::Sql, "select * from t", None);
        assert_eq!(formats.at(0), TokenKind::Keyword);
        assert_eq!(formats.at(9), TokenKind::Keyword);
    }

    #[test]
    fn test_invalid_octal_is_error() {
        let formats = paint(Language::C, "int x = 089;", None);
        assert_eq!(formats.at(8), TokenKind::Error);
        assert_eq!(formats.at(0), TokenKind::Type);
    }
}
