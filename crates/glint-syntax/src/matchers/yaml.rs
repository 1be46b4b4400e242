//! YAML block scalars (`key: |`, `- >-`).
//!
//! The body is every following line that is blank or indented deeper than the line that
//! carried the indicator.

use super::Matcher;
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::predicates::{indentation, is_blank};
use crate::scan::Region;
use crate::state::BlockState;

#[derive(Debug)]
pub struct YamlBlockMatcher;

/// Offset of a block scalar indicator ending the significant part of the line.
fn indicator_at(bytes: &[u8], end: usize) -> Option<usize> {
    let content = &bytes[..end];
    let trimmed = content.len() - content.iter().rev().take_while(|b| b.is_ascii_whitespace()).count();
    // up to two trailing modifiers: chomping (+/-) and an indentation digit
    let modifiers = content[..trimmed]
        .iter()
        .rev()
        .take(2)
        .take_while(|b| matches!(b, b'+' | b'-' | b'1'..=b'9'))
        .count();
    let at = trimmed.checked_sub(modifiers + 1)?;
    if !matches!(content[at], b'|' | b'>') {
        return None;
    }
    let before_ok = at == 0 || matches!(content[at - 1], b' ' | b'\t');
    before_ok.then_some(at)
}

impl Matcher for YamlBlockMatcher {
    fn name(&self) -> &'static str {
        "yaml-block"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        if let BlockState::YamlBlock { indent } = ctx.entry {
            if is_blank(ctx.text) || indentation(ctx.text) > usize::from(indent) {
                ctx.claim(0..ctx.text.len(), TokenKind::String);
                ctx.body_only = true;
                ctx.exit = ctx.entry;
                return;
            }
            ctx.resume(BlockState::Neutral);
        }

        let bytes = ctx.bytes();
        let end = ctx
            .segments()
            .iter()
            .find(|segment| segment.region == Region::LineComment)
            .map_or(bytes.len(), |segment| segment.range.start);
        let Some(at) = indicator_at(bytes, end) else {
            return;
        };
        if ctx.is_contained(at) {
            return;
        }
        // `|` after a key or a sequence dash, or alone on the line
        let head = bytes[..at].iter().rev().find(|b| !b.is_ascii_whitespace());
        if !matches!(head, None | Some(b':' | b'-' | b'?')) {
            return;
        }

        let indent = u16::try_from(indentation(ctx.text)).unwrap_or(u16::MAX);
        ctx.format(at..at + 1, TokenKind::Operator);
        ctx.pending_exit = Some(BlockState::YamlBlock { indent });
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(state, BlockState::YamlBlock { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Language;
    use crate::testing::{Lines, all_kind};
    use crate::{HighlightOptions, Highlighter};

    fn run(text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(Language::Yaml, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_indicators() {
        assert_eq!(indicator_at(b"key: |", 6), Some(5));
        assert_eq!(indicator_at(b"key: >-  ", 9), Some(5));
        assert_eq!(indicator_at(b"key: |2+", 8), Some(5));
        assert_eq!(indicator_at(b"key: a|b", 8), None);
        assert_eq!(indicator_at(b"key: value", 10), None);
    }

    #[test]
    fn test_block_follows_indentation() {
        let (lines, results) = run("script: |\n  echo \"hi # no\n\n  key: x\nafter: 1");
        assert_eq!(results[0].state, BlockState::YamlBlock { indent: 0 });
        assert!(all_kind(&results, &lines, 1, "echo \"hi # no", TokenKind::String));
        assert_eq!(results[2].state, BlockState::YamlBlock { indent: 0 });
        assert!(all_kind(&results, &lines, 3, "key: x", TokenKind::String));
        assert_eq!(results[4].state, BlockState::Neutral);
        assert!(!all_kind(&results, &lines, 4, "after", TokenKind::String));
    }

    #[test]
    fn test_nested_block_and_comment() {
        let (_, results) = run("a:\n  b: >- # folded\n    text\n  c: 1");
        assert_eq!(results[1].state, BlockState::YamlBlock { indent: 2 });
        assert_eq!(results[2].state, BlockState::YamlBlock { indent: 2 });
        assert_eq!(results[3].state, BlockState::Neutral);
    }

    #[test]
    fn test_quoted_pipe_is_not_indicator() {
        let (_, results) = run("k: \"a |\"\nx: 1");
        assert_eq!(results[0].state, BlockState::Neutral);
    }
}
