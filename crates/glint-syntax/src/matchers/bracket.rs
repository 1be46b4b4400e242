//! Lua long brackets (`[==[ ... ]==]`, `--[[ ... ]]`) and CMake bracket arguments and
//! comments (`[=[ ... ]=]`, `#[[ ... ]]`).

use super::Matcher;
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::scan::Region;
use crate::state::BlockState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketFlavor {
    Lua,
    CMake,
}

impl BracketFlavor {
    fn comment_marker(self) -> &'static str {
        match self {
            BracketFlavor::Lua => "--",
            BracketFlavor::CMake => "#",
        }
    }
}

#[derive(Debug)]
pub struct LongBracketMatcher {
    flavor: BracketFlavor,
}

impl LongBracketMatcher {
    pub fn new(flavor: BracketFlavor) -> Self {
        Self { flavor }
    }
}

/// The level of a `[=*[` opener at `pos`, with its length.
fn opener_at(bytes: &[u8], pos: usize) -> Option<(u16, usize)> {
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let equals = bytes[pos + 1..].iter().take_while(|b| **b == b'=').count();
    if bytes.get(pos + 1 + equals) != Some(&b'[') {
        return None;
    }
    Some((u16::try_from(equals).ok()?, equals + 2))
}

/// Offset just past the `]=*]` closing a bracket of `level`, searching from `from`.
fn closer_end(bytes: &[u8], from: usize, level: u16) -> Option<usize> {
    let needle: Vec<u8> = std::iter::once(b']')
        .chain(std::iter::repeat_n(b'=', usize::from(level)))
        .chain(std::iter::once(b']'))
        .collect();
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
        .map(|offset| from + offset + needle.len())
}

fn kind_for(comment: bool) -> TokenKind {
    if comment {
        TokenKind::Comment
    } else {
        TokenKind::String
    }
}

impl Matcher for LongBracketMatcher {
    fn name(&self) -> &'static str {
        "long-bracket"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        let bytes = ctx.bytes();
        let mut from = 0;

        if let BlockState::LongBracket { level, comment } = ctx.entry {
            match closer_end(bytes, 0, level) {
                Some(end) => {
                    ctx.claim(0..end, kind_for(comment));
                    ctx.resume(BlockState::Neutral);
                    from = end;
                }
                None => {
                    ctx.claim(0..bytes.len(), kind_for(comment));
                    ctx.exit = ctx.entry;
                    return;
                }
            }
        }

        let marker = self.flavor.comment_marker();
        let mut pos = from;
        while let Some(offset) = bytes[pos.min(bytes.len())..].iter().position(|b| *b == b'[') {
            let p = pos + offset;
            pos = p + 1;
            let Some((level, len)) = opener_at(bytes, p) else {
                continue;
            };

            let comment_start = p.checked_sub(marker.len()).filter(|start| {
                bytes[*start..].starts_with(marker.as_bytes())
                    && matches!(
                        ctx.region_at(*start),
                        Some(segment) if segment.region == Region::LineComment && segment.range.start == *start
                    )
            });
            let start = match comment_start {
                Some(start) => start,
                None => {
                    if ctx.is_contained(p) {
                        continue;
                    }
                    if self.flavor == BracketFlavor::CMake
                        && p > 0
                        && !(bytes[p - 1].is_ascii_whitespace() || bytes[p - 1] == b'(')
                    {
                        continue;
                    }
                    p
                }
            };
            let comment = comment_start.is_some();

            match closer_end(bytes, p + len, level) {
                Some(end) => {
                    ctx.claim(start..end, kind_for(comment));
                    if comment {
                        ctx.annotate(start..end, true);
                    }
                    pos = end;
                }
                None => {
                    ctx.claim(start..bytes.len(), kind_for(comment));
                    ctx.exit = BlockState::LongBracket { level, comment };
                    tracing::trace!("line {}: long bracket level {} opens", ctx.line, level);
                    return;
                }
            }
        }
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(state, BlockState::LongBracket { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Language;
    use crate::testing::{Lines, all_kind};
    use crate::{HighlightOptions, Highlighter};

    fn run(language: Language, text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(language, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_levels() {
        assert_eq!(opener_at(b"[==[", 0), Some((2, 4)));
        assert_eq!(opener_at(b"[=x", 0), None);
        assert_eq!(closer_end(b"a ]=] ]==] b", 0, 2), Some(10));
        assert_eq!(closer_end(b"a ]=]", 0, 2), None);
    }

    #[test]
    fn test_lua_long_comment() {
        let (lines, results) = run(Language::Lua, "x = 1 --[==[ start\n]] still \"\n]==] print(x)");
        assert_eq!(results[0].state, BlockState::LongBracket { level: 2, comment: true });
        assert!(all_kind(&results, &lines, 1, "]] still \"", TokenKind::Comment));
        assert_eq!(results[2].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 2, "print", TokenKind::BuiltIn));
    }

    #[test]
    fn test_lua_long_string() {
        let (lines, results) = run(Language::Lua, "s = [[one -- two]] .. 'x'\nt = [[\nbody]]");
        assert!(all_kind(&results, &lines, 0, "[[one -- two]]", TokenKind::String));
        assert!(all_kind(&results, &lines, 0, "'x'", TokenKind::AltString));
        assert_eq!(results[1].state, BlockState::LongBracket { level: 0, comment: false });
        assert_eq!(results[2].state, BlockState::Neutral);
    }

    #[test]
    fn test_lua_plain_comment_and_index() {
        let (_, results) = run(Language::Lua, "-- [[ not long\nt[a[1]] = 2");
        assert_eq!(results[0].state, BlockState::Neutral);
        assert_eq!(results[1].state, BlockState::Neutral);
    }

    #[test]
    fn test_cmake_bracket_comment_and_argument() {
        let (lines, results) = run(
            Language::CMake,
            "#[[ block\ncomment ]] set(X [=[raw ${Y}]=])",
        );
        assert_eq!(results[0].state, BlockState::LongBracket { level: 0, comment: true });
        assert!(all_kind(&results, &lines, 1, "comment ]]", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 1, "[=[raw ${Y}]=]", TokenKind::String));
    }
}
