//! LaTeX: comments, math, `\verb` and verbatim-like environments.

use super::Matcher;
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::state::{BlockState, MathKind};

/// Environments whose body is not LaTeX.
const VERBATIM_ENVIRONMENTS: &[&str] = &["verbatim", "Verbatim", "lstlisting", "minted", "comment"];

#[derive(Debug)]
pub struct LatexMatcher;

enum MathEnd {
    /// Offset just past the closing delimiter
    Closed(usize),
    /// An unescaped `%` at this offset comments out the rest of the line
    Comment(usize),
    Open,
}

fn math_end(bytes: &[u8], from: usize, kind: MathKind) -> MathEnd {
    let closer = kind.closer().as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i..].starts_with(closer) {
            return MathEnd::Closed(i + closer.len());
        }
        match bytes[i] {
            b'\\' => i += 2,
            b'%' => return MathEnd::Comment(i),
            _ => i += 1,
        }
    }
    MathEnd::Open
}

/// The math opener at `i`, with its length.
fn math_start(bytes: &[u8], i: usize) -> Option<(MathKind, usize)> {
    let rest = &bytes[i..];
    if rest.starts_with(b"$$") {
        Some((MathKind::DoubleDollar, 2))
    } else if rest.starts_with(b"$") {
        Some((MathKind::Dollar, 1))
    } else if rest.starts_with(b"\\(") {
        Some((MathKind::Paren, 2))
    } else if rest.starts_with(b"\\[") {
        Some((MathKind::Bracket, 2))
    } else {
        None
    }
}

fn environment_kind(name: &str) -> TokenKind {
    if name == "comment" {
        TokenKind::Comment
    } else {
        TokenKind::Code
    }
}

/// `\begin{name}` at `i`: the environment name and the offset after the closing brace.
fn begin_at(text: &str, i: usize) -> Option<(&str, usize)> {
    let rest = text.get(i..)?.strip_prefix("\\begin{")?;
    let close = rest.find('}')?;
    let name = &rest[..close];
    Some((name, i + "\\begin{".len() + close + 1))
}

impl LatexMatcher {
    /// Formats a verbatim body from `from`; returns the offset after `\end{name}` if the
    /// environment closes on this line.
    fn verbatim_body(ctx: &mut LineContext<'_>, from: usize, name: &str) -> Option<usize> {
        let end_tag = format!("\\end{{{name}}}");
        let kind = environment_kind(name);
        match ctx.text[from..].find(&end_tag) {
            Some(offset) => {
                ctx.claim(from..from + offset, kind);
                Some(from + offset + end_tag.len())
            }
            None => {
                ctx.claim(from..ctx.text.len(), kind);
                None
            }
        }
    }

    /// Formats math from `from` (the first byte after the opener).
    fn math_body(ctx: &mut LineContext<'_>, start: usize, from: usize, kind: MathKind) -> Option<usize> {
        let bytes = ctx.bytes();
        match math_end(bytes, from, kind) {
            MathEnd::Closed(end) => {
                ctx.format(start..end, TokenKind::Math);
                Some(end)
            }
            MathEnd::Comment(at) => {
                ctx.format(start..at, TokenKind::Math);
                ctx.format(at..bytes.len(), TokenKind::Comment);
                ctx.annotate(at..bytes.len(), true);
                ctx.exit = BlockState::Math(kind);
                None
            }
            MathEnd::Open => {
                ctx.format(start..bytes.len(), TokenKind::Math);
                ctx.exit = BlockState::Math(kind);
                None
            }
        }
    }
}

impl Matcher for LatexMatcher {
    fn name(&self) -> &'static str {
        "latex"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        let text = ctx.text;
        let bytes = text.as_bytes();
        let mut i = 0;

        match ctx.entry {
            BlockState::Verbatim(id) => {
                let name = ctx.delimiters.resolve(id).unwrap_or_default().to_string();
                match Self::verbatim_body(ctx, 0, &name) {
                    Some(end) => i = end,
                    None => {
                        ctx.body_only = true;
                        ctx.exit = ctx.entry;
                        ctx.data.label = name;
                        return;
                    }
                }
            }
            BlockState::Math(kind) => match Self::math_body(ctx, 0, 0, kind) {
                Some(end) => i = end,
                None => return,
            },
            _ => {}
        }

        while i < bytes.len() {
            if let Some((kind, len)) = math_start(bytes, i) {
                match Self::math_body(ctx, i, i + len, kind) {
                    Some(end) => {
                        i = end;
                        continue;
                    }
                    None => return,
                }
            }

            match bytes[i] {
                b'%' => {
                    ctx.format(i..bytes.len(), TokenKind::Comment);
                    ctx.annotate(i..bytes.len(), true);
                    return;
                }
                b'\\' if bytes[i..].starts_with(b"\\verb") => {
                    let mut d = i + 5;
                    if bytes.get(d) == Some(&b'*') {
                        d += 1;
                    }
                    match bytes.get(d) {
                        Some(delim) if !delim.is_ascii_alphabetic() && !delim.is_ascii_whitespace() => {
                            let end = bytes[d + 1..]
                                .iter()
                                .position(|b| b == delim)
                                .map_or(bytes.len(), |p| d + 1 + p + 1);
                            ctx.claim(i..end, TokenKind::Code);
                            i = end;
                        }
                        _ => i += 5,
                    }
                }
                b'\\' => {
                    if let Some((name, after)) = begin_at(text, i) {
                        if VERBATIM_ENVIRONMENTS.contains(&name) {
                            let id = ctx.delimiters.intern(name);
                            match Self::verbatim_body(ctx, after, name) {
                                Some(end) => i = end,
                                None => {
                                    ctx.exit = BlockState::Verbatim(id);
                                    ctx.data.label = name.to_string();
                                    return;
                                }
                            }
                            continue;
                        }
                    }
                    // `\%`, `\$`, `\\`
                    i += 2;
                }
                _ => i += 1,
            }
        }
    }

    fn runs_in_body(&self) -> bool {
        true
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(state, BlockState::Math(_) | BlockState::Verbatim(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Language;
    use crate::testing::{Lines, all_kind};
    use crate::{HighlightOptions, Highlighter};

    fn run(text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(Language::Latex, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_inline_math_and_comment() {
        let (lines, results) = run("Cost is \\$5, area $a^2$ % note $x");
        assert!(!all_kind(&results, &lines, 0, "$5", TokenKind::Math));
        assert!(all_kind(&results, &lines, 0, "$a^2$", TokenKind::Math));
        assert!(all_kind(&results, &lines, 0, "% note $x", TokenKind::Comment));
        assert_eq!(results[0].state, BlockState::Neutral);
    }

    #[test]
    fn test_display_math_across_lines() {
        let (lines, results) = run("\\[ a + b % why\n = c \\]\ntext");
        assert_eq!(results[0].state, BlockState::Math(MathKind::Bracket));
        assert!(all_kind(&results, &lines, 0, "% why", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 1, " = c \\]", TokenKind::Math));
        assert_eq!(results[1].state, BlockState::Neutral);
    }

    #[test]
    fn test_verbatim_environment() {
        let (lines, results) = run("\\begin{verbatim}\n$ % not math\n\\end{verbatim} $x$");
        assert!(matches!(results[0].state, BlockState::Verbatim(_)));
        assert!(all_kind(&results, &lines, 1, "$ % not math", TokenKind::Code));
        assert_eq!(results[1].data.label, "verbatim");
        assert_eq!(results[2].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 2, "$x$", TokenKind::Math));
    }

    #[test]
    fn test_comment_environment_and_verb() {
        let (lines, results) = run("\\begin{comment}skip\\end{comment} \\verb|%$| done");
        assert!(all_kind(&results, &lines, 0, "skip", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 0, "\\verb|%$|", TokenKind::Code));
        assert_eq!(results[0].state, BlockState::Neutral);
    }
}
