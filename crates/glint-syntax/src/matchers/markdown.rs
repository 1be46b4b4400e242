//! Markdown fenced code blocks and headings.
//!
//! A setext heading is a line of text followed by a `===` or `---` underline, so whether
//! a line is a heading depends on the line *below* it. The underline line records that it
//! is one in `BlockData::property`; when that flag flips, it asks for the previous line to
//! be classified again.

use super::Matcher;
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::predicates::{indentation, is_blank};
use crate::state::BlockState;

/// Markdown allows up to three spaces before a fence or heading marker.
const MAX_MARKER_INDENT: usize = 3;

#[derive(Debug)]
pub struct FenceMatcher;

/// The fence marker (three or more backticks or tildes) opening `text`, if any.
fn fence_marker(text: &str) -> Option<&str> {
    let indent = indentation(text);
    if indent > MAX_MARKER_INDENT {
        return None;
    }
    let rest = &text[indent..];
    let first = *rest.as_bytes().first()?;
    if first != b'`' && first != b'~' {
        return None;
    }
    let run = rest.bytes().take_while(|b| *b == first).count();
    if run < 3 {
        return None;
    }
    // a backtick fence's info string can't contain backticks
    if first == b'`' && rest[run..].contains('`') {
        return None;
    }
    Some(&rest[..run])
}

/// Whether `text` closes a fence opened with `marker`.
fn closes_fence(text: &str, marker: &str) -> bool {
    let Some(&fence_char) = marker.as_bytes().first() else {
        return false;
    };
    let Some(found) = fence_marker(text) else {
        return false;
    };
    if !found.starts_with(char::from(fence_char)) || found.len() < marker.len() {
        return false;
    }
    let rest = text.trim_start();
    is_blank(&rest[found.len()..])
}

impl Matcher for FenceMatcher {
    fn name(&self) -> &'static str {
        "fence"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        let len = ctx.text.len();

        if let BlockState::Fence(id) = ctx.entry {
            let marker = ctx.delimiters.resolve(id).unwrap_or("```").to_string();
            ctx.claim(0..len, TokenKind::Code);
            ctx.body_only = true;
            if closes_fence(ctx.text, &marker) {
                ctx.exit = BlockState::Neutral;
            } else {
                ctx.exit = ctx.entry;
                ctx.data.label = marker;
            }
            return;
        }

        if let Some(marker) = fence_marker(ctx.text) {
            let id = ctx.delimiters.intern(marker);
            ctx.claim(0..len, TokenKind::Code);
            ctx.body_only = true;
            ctx.exit = BlockState::Fence(id);
            ctx.data.label = marker.to_string();
        }
    }

    fn runs_in_body(&self) -> bool {
        true
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(state, BlockState::Fence(_))
    }
}

#[derive(Debug)]
pub struct HeadingMatcher;

fn is_atx_heading(text: &str) -> bool {
    let indent = indentation(text);
    if indent > MAX_MARKER_INDENT {
        return false;
    }
    let rest = &text[indent..];
    let hashes = rest.bytes().take_while(|b| *b == b'#').count();
    (1..=6).contains(&hashes)
        && rest
            .as_bytes()
            .get(hashes)
            .is_none_or(|b| b.is_ascii_whitespace())
}

fn is_underline(text: &str) -> bool {
    let indent = indentation(text);
    if indent > MAX_MARKER_INDENT {
        return false;
    }
    let rest = text[indent..].trim_end();
    let Some(first) = rest.bytes().next() else {
        return false;
    };
    (first == b'=' || first == b'-') && rest.bytes().all(|b| b == first)
}

/// `- x`, `* x`, `+ x`, `1. x` or `1) x`.
fn is_list_item(text: &str) -> bool {
    let indent = indentation(text);
    if indent > MAX_MARKER_INDENT {
        return false;
    }
    let rest = text[indent..].as_bytes();
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let marker = match rest.get(digits) {
        Some(b'-' | b'*' | b'+') if digits == 0 => 1,
        Some(b'.' | b')') if (1..=9).contains(&digits) => digits + 1,
        _ => return false,
    };
    rest.get(marker).is_none_or(|b| b.is_ascii_whitespace())
}

/// A line that can carry a setext underline: has text and isn't itself a block marker.
fn is_paragraph_text(text: &str) -> bool {
    !is_blank(text)
        && !is_atx_heading(text)
        && fence_marker(text).is_none()
        && !is_underline(text)
        && !is_list_item(text)
}

impl Matcher for HeadingMatcher {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        let len = ctx.text.len();

        let previous_is_text = ctx.line > 0
            && ctx
                .doc
                .line_text(ctx.line - 1)
                .is_some_and(|text| is_paragraph_text(&text))
            && !matches!(ctx.entry, BlockState::Fence(_));
        let underline = is_underline(ctx.text) && previous_is_text;

        let was_underline = ctx
            .doc
            .block_data(ctx.line)
            .is_some_and(|data| data.property);
        if underline != was_underline {
            ctx.request_previous = true;
        }
        ctx.data.property = underline;

        if underline || is_atx_heading(ctx.text) {
            ctx.claim(0..len, TokenKind::Heading);
            return;
        }

        let next_is_underline = ctx
            .doc
            .line_text(ctx.line + 1)
            .is_some_and(|text| is_underline(&text));
        if next_is_underline && is_paragraph_text(ctx.text) {
            ctx.claim(0..len, TokenKind::Heading);
        }
    }
}
