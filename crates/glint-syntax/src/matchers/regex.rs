//! Regex literals: `/.../` in JavaScript-like languages, Perl's `m//`, `s{}{}`, `tr///`
//! and friends, and Ruby's `%r{}` family.
//!
//! ## Learning: Telling a Regex From Division
//!
//! `a / b / c` and `x = /b/` look the same to a lexer that only sees one character. What
//! decides it is the token before the slash: after a value (identifier, number, closing
//! bracket, string) it's division; after an operator or at the start of an expression it
//! opens a regex. When the slash is the first thing on its line, the answer depends on how
//! the previous line ended, so the lines we looked at are reported back to the host as
//! watched.

use std::borrow::Cow;

use super::{Matcher, paint_regions};
use crate::context::LineContext;
use crate::dialect::{LexRules, LiteralSyntax};
use crate::predicates::{is_word_byte, prev_non_space, trailing_token, word_at, word_before};
use crate::scan::{End, Region, ScanEnv, Segment};
use crate::state::BlockState;

/// How far back the slash heuristic searches for a non-blank line.
const LOOKBACK_LINES: usize = 64;

#[derive(Debug)]
pub struct RegexMatcher;

impl Matcher for RegexMatcher {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        paint_regions(ctx, |region| matches!(region, Region::Regex { .. }));
    }

    fn accepts(&self, state: &BlockState, lex: &LexRules) -> bool {
        matches!(state, BlockState::Regex { .. })
            && (lex.literals != LiteralSyntax::None || (lex.slash_regex && lex.regex_multiline))
    }
}

// ==================== Starts ====================

/// A delimited literal starting at `i`: Perl `q{}`/`m//`/`s///`, Ruby `%w[]`/`%r{}`.
pub(crate) fn literal_start(
    env: &mut ScanEnv<'_>,
    segments: &[Segment],
    i: usize,
) -> Option<(Region, usize)> {
    match env.lex.literals {
        LiteralSyntax::Perl => perl_literal(env.text, i),
        LiteralSyntax::Ruby => ruby_literal(env, segments, i),
        LiteralSyntax::None => None,
    }
}

fn perl_literal(text: &str, i: usize) -> Option<(Region, usize)> {
    let bytes = text.as_bytes();
    if i > 0 && (is_word_byte(bytes[i - 1]) || b"$@%&->".contains(&bytes[i - 1])) {
        return None;
    }
    let word = word_at(text, i);
    let parts = match word {
        "q" | "qq" | "qw" | "qx" => 0,
        "m" | "qr" => 1,
        "s" | "tr" | "y" => 2,
        _ => return None,
    };

    let after = i + word.len();
    let gap = bytes[after..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    let d = *bytes.get(after + gap)?;
    if gap > 0 && d == b'#' {
        return None;
    }
    if !d.is_ascii_punctuation() || b"=,;)]}>".contains(&d) {
        return None;
    }

    let open = char::from(d);
    let close = closer(open);
    let region = if parts == 0 {
        Region::QuoteLike {
            open,
            close,
            depth: 1,
        }
    } else {
        Region::Regex {
            open,
            close,
            parts,
            depth: 1,
        }
    };
    Some((region, after + gap + 1 - i))
}

fn ruby_literal(env: &mut ScanEnv<'_>, segments: &[Segment], i: usize) -> Option<(Region, usize)> {
    let bytes = env.text.as_bytes();
    if bytes[i] != b'%' {
        return None;
    }
    let mut j = i + 1;
    let letter = bytes.get(j).copied().filter(|b| b"qQwWiIrsx".contains(b));
    if letter.is_some() {
        j += 1;
    }
    let d = *bytes.get(j)?;
    if !d.is_ascii_punctuation() || d == b'=' {
        return None;
    }
    // `puts %w[a b]`: an identifier, a space, then no space after the delimiter
    let spaced_argument = i > 0
        && bytes[i - 1] == b' '
        && bytes.get(j + 1).is_some_and(|b| !b.is_ascii_whitespace());
    if !spaced_argument && !slash_allowed(env, segments, i) {
        return None;
    }

    let open = char::from(d);
    let close = closer(open);
    let region = if letter == Some(b'r') {
        Region::Regex {
            open,
            close,
            parts: 1,
            depth: 1,
        }
    } else {
        Region::QuoteLike {
            open,
            close,
            depth: 1,
        }
    };
    Some((region, j + 1 - i))
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

/// Whether a `/` at `i` opens a regex rather than dividing.
pub(crate) fn slash_allowed(env: &mut ScanEnv<'_>, segments: &[Segment], i: usize) -> bool {
    let text = env.text;
    let bytes = text.as_bytes();
    // `//` that isn't a comment is an operator (Perl's defined-or)
    if i > 0 && bytes[i - 1] == b'/' {
        return false;
    }

    let mut end = i;
    loop {
        let Some(p) = prev_non_space(bytes, end) else {
            return lookback(env);
        };
        if let Some(segment) = segments.iter().find(|s| s.range.contains(&p)) {
            if segment.region.kind(env.lex).is_comment() {
                end = segment.range.start;
                continue;
            }
            return false;
        }
        if env.claim_at(p).is_some() {
            return false;
        }
        return token_allows_regex(&text[..p + 1], env.lex.regex_keywords);
    }
}

/// Nothing precedes the slash on this line: decide from the last earlier line that has
/// a token.
fn lookback(env: &mut ScanEnv<'_>) -> bool {
    let mut line = env.line;
    for _ in 0..LOOKBACK_LINES {
        if line == 0 {
            return true;
        }
        line -= 1;
        env.watch.push(line);
        let tail: Cow<'_, str> = match env.doc.block_data(line) {
            Some(data) => Cow::Borrowed(data.tail.as_str()),
            None => Cow::Owned(
                env.doc
                    .line_text(line)
                    .map(|text| trailing_token(&text).to_string())
                    .unwrap_or_default(),
            ),
        };
        if tail.is_empty() {
            continue;
        }
        return token_allows_regex(&tail, env.lex.regex_keywords);
    }
    true
}

/// Whether a regex may follow the token that `text` ends with.
fn token_allows_regex(text: &str, keywords: &[&str]) -> bool {
    let Some(&last) = text.as_bytes().last() else {
        return true;
    };
    if is_word_byte(last) {
        let word = word_before(text, text.len());
        if word.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            return false;
        }
        return keywords.contains(&word);
    }
    !matches!(last, b')' | b']' | b'"' | b'\'' | b'`')
}

// ==================== Ends ====================

/// Finds where a regex or quote-like literal ends, tracking bracket depth for paired
/// delimiters and the remaining parts of `s{..}{..}`.
pub(crate) fn find_end(bytes: &[u8], from: usize, region: Region, multiline: bool) -> End {
    let (open, close, mut parts, mut depth, is_regex) = match region {
        Region::Regex {
            open,
            close,
            parts,
            depth,
        } => (open, close, parts, depth, true),
        Region::QuoteLike { open, close, depth } => (open, close, 1, depth, false),
        other => {
            return End {
                at: from,
                closed: true,
                region: other,
            };
        }
    };
    let rebuild = |parts: u8, depth: u8| {
        if is_regex {
            Region::Regex {
                open,
                close,
                parts,
                depth,
            }
        } else {
            Region::QuoteLike { open, close, depth }
        }
    };
    let paired = open != close;
    let (open_byte, close_byte) = (open as u8, close as u8);
    let mut in_class = false;

    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if depth == 0 {
            // between the parts of `s{a} {b}`
            if b.is_ascii_whitespace() {
                i += 1;
                continue;
            }
            if b == open_byte {
                depth = 1;
                i += 1;
                continue;
            }
            return End {
                at: i,
                closed: true,
                region: rebuild(parts, 0),
            };
        }
        if is_regex && open == '/' {
            if in_class {
                in_class = b != b']';
                i += 1;
                continue;
            }
            if b == b'[' {
                in_class = true;
                i += 1;
                continue;
            }
        }
        if paired && b == open_byte {
            depth = depth.saturating_add(1);
        } else if b == close_byte {
            depth -= 1;
            if depth == 0 {
                i += 1;
                if parts > 1 {
                    parts -= 1;
                    if !paired {
                        depth = 1;
                    }
                    continue;
                }
                if is_regex {
                    i += bytes[i..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
                }
                return End {
                    at: i,
                    closed: true,
                    region: rebuild(parts, 0),
                };
            }
        }
        i += 1;
    }

    let carried = !is_regex || multiline;
    End {
        at: bytes.len(),
        closed: !carried,
        region: rebuild(parts, depth),
    }
}
