//! Shell: quotes, command substitutions, variables and heredoc openers.
//!
//! Shell quoting nests: `"a $(cmd "b" 'c') d"` is a double-quoted string containing a
//! command substitution containing more strings. The region scanner can't express that, so
//! this matcher walks the line itself and keeps a stack with one entry per open
//! substitution level. Level 0 is the top level.
//!
//! ## Learning: Carrying a Stack Across Lines
//!
//! Only two numbers survive the end of a line: the substitution depth (in the exit state)
//! and which levels were inside double quotes (in [`BlockData::open_quotes`]). That is
//! enough to rebuild the stack on the next line.
//!
//! Expanding heredoc bodies go through the same walker. Level 0 is then the body text,
//! where only `$` expansions, backquotes and backslashes mean anything, and the levels
//! above it are ordinary shell. Their depth and quote flags travel in
//! [`BlockData::body_nests`] and [`BlockData::body_quotes`], because `open_nests` still
//! holds the depth the heredoc was opened at.
//!
//! [`BlockData::open_quotes`]: crate::BlockData::open_quotes
//! [`BlockData::body_nests`]: crate::BlockData::body_nests
//! [`BlockData::body_quotes`]: crate::BlockData::body_quotes

use super::Matcher;
use super::heredoc::{HeredocFlavor, parse_opener, queue_heredoc};
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::predicates::is_word_byte;
use crate::state::{BlockState, QuoteKind};

#[derive(Debug)]
pub struct ShellMatcher;

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    /// Plain parentheses open inside this level, so `)` doesn't close the substitution
    parens: u16,
    dq: bool,
}

impl Matcher for ShellMatcher {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        if ctx.body_only {
            if let BlockState::Heredoc { expand: true, .. } = ctx.entry {
                Walker::for_body(ctx).walk(ctx);
            }
            return;
        }
        Walker::new(ctx).walk(ctx);
    }

    fn runs_in_body(&self) -> bool {
        true
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(
            state,
            BlockState::Quote(QuoteKind::Single | QuoteKind::Double) | BlockState::CommandSub { .. }
        )
    }
}

struct Walker {
    stack: Vec<Level>,
    in_single: bool,
    in_backquote: bool,
    /// Walking an expanding heredoc body rather than code
    body: bool,
}

impl Walker {
    fn new(ctx: &LineContext<'_>) -> Self {
        let mut walker = Walker {
            stack: vec![Level::default()],
            in_single: false,
            in_backquote: false,
            body: false,
        };
        match ctx.entry {
            BlockState::Quote(QuoteKind::Single) => walker.in_single = true,
            BlockState::Quote(QuoteKind::Double) => walker.stack[0].dq = true,
            BlockState::CommandSub { depth } => {
                let prev = ctx.prev;
                walker.stack = (0..=depth)
                    .map(|level| Level {
                        parens: 0,
                        dq: prev.is_some_and(|data| data.open_quotes.contains(&level)),
                    })
                    .collect();
                // `property` means "inside backquotes" only after a substitution line;
                // heredoc bodies reuse it for their own flag
                let after_substitution = ctx.line > 0
                    && matches!(
                        ctx.doc.exit_state(ctx.line - 1),
                        Some(BlockState::CommandSub { .. })
                    );
                walker.in_backquote = after_substitution && prev.is_some_and(|data| data.property);
            }
            _ => {}
        }
        walker
    }

    /// A walker for a heredoc body line, resuming the substitutions the previous body
    /// line left open.
    fn for_body(ctx: &LineContext<'_>) -> Self {
        // zero on the opener line, whose own nesting lives in `open_nests`
        let depth = ctx.prev.map_or(0, |data| data.body_nests);
        let quotes = ctx.prev.map(|data| &data.body_quotes);
        Walker {
            stack: (0..=depth)
                .map(|level| Level {
                    parens: 0,
                    dq: level > 0 && quotes.is_some_and(|quotes| quotes.contains(&level)),
                })
                .collect(),
            in_single: false,
            in_backquote: false,
            body: true,
        }
    }

    fn depth(&self) -> u16 {
        u16::try_from(self.stack.len() - 1).unwrap_or(u16::MAX)
    }

    fn top(&mut self) -> &mut Level {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn walk(mut self, ctx: &mut LineContext<'_>) {
        let text = ctx.text;
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if !self.body && ctx.claimed(i) {
                i += 1;
                continue;
            }
            let start = i;
            let body_text = self.body && self.stack.len() == 1;

            if self.in_single {
                match bytes[i..].iter().position(|b| *b == b'\'') {
                    Some(p) => {
                        i += p + 1;
                        self.in_single = false;
                    }
                    None => i = bytes.len(),
                }
                ctx.format(start..i, TokenKind::AltString);
                continue;
            }

            if self.in_backquote {
                i = closing_backquote(bytes, i).map_or(bytes.len(), |p| {
                    self.in_backquote = false;
                    p + 1
                });
                ctx.format(start..i, TokenKind::CommandSub);
                continue;
            }

            let b = bytes[i];
            let in_dq = self.top().dq;
            if self.body && !body_text {
                ctx.format(i..i + 1, TokenKind::CommandSub);
            }

            // shared by quoted and unquoted text
            match b {
                b'\\' => {
                    i = (i + 2).min(bytes.len());
                    if in_dq {
                        ctx.format(start..i, TokenKind::String);
                    } else if self.body && !body_text {
                        ctx.format(start..i, TokenKind::CommandSub);
                    }
                    continue;
                }
                b'$' if bytes.get(i + 1) == Some(&b'(') => {
                    self.stack.push(Level::default());
                    i += 2;
                    ctx.format(start..i, TokenKind::CommandSub);
                    continue;
                }
                b'$' => {
                    if let Some(end) = variable_end(bytes, i) {
                        ctx.format(start..end, TokenKind::Variable);
                        i = end;
                        continue;
                    }
                }
                b'`' => {
                    self.in_backquote = true;
                    i += 1;
                    ctx.format(start..i, TokenKind::CommandSub);
                    continue;
                }
                _ => {}
            }

            if body_text {
                i += 1;
                continue;
            }

            if in_dq {
                if b == b'"' {
                    self.top().dq = false;
                }
                i += 1;
                ctx.format(start..i, TokenKind::String);
                continue;
            }

            match b {
                b'\'' => {
                    self.in_single = true;
                    i += 1;
                    ctx.format(start..i, TokenKind::AltString);
                }
                b'"' => {
                    self.top().dq = true;
                    i += 1;
                    ctx.format(start..i, TokenKind::String);
                }
                b'#' if i == 0 || bytes[i - 1].is_ascii_whitespace() || b";|&(".contains(&bytes[i - 1]) => {
                    ctx.format(i..bytes.len(), TokenKind::Comment);
                    ctx.annotate(i..bytes.len(), true);
                    i = bytes.len();
                }
                b'(' => {
                    self.top().parens += 1;
                    i += 1;
                }
                b')' => {
                    i += 1;
                    if self.top().parens > 0 {
                        self.top().parens -= 1;
                    } else if self.stack.len() > 1 {
                        self.stack.pop();
                        ctx.format(start..i, TokenKind::CommandSub);
                    }
                }
                b'<' if !self.body => {
                    match parse_opener(text, i, HeredocFlavor::Shell) {
                        Some(opener) => {
                            ctx.format(i..i + opener.len, TokenKind::HeredocDelimiter);
                            let depth = self.stack.len() - 1;
                            let dquote_before = self.stack[..depth].iter().any(|level| level.dq);
                            tracing::trace!(
                                "line {}: heredoc {:?} opens at depth {}",
                                ctx.line,
                                opener.word,
                                depth
                            );
                            queue_heredoc(ctx, opener, dquote_before);
                            i += opener.len;
                        }
                        None => {
                            // skip the whole `<<<` so its tail isn't read as an opener
                            i += bytes[i..].iter().take_while(|b| **b == b'<').count();
                        }
                    }
                }
                _ => i += 1,
            }
        }

        self.finish(ctx);
    }

    fn finish(self, ctx: &mut LineContext<'_>) {
        let depth = self.depth();
        if self.body {
            // quotes and backquotes on a body line close with it
            ctx.data.body_nests = depth;
            ctx.data.body_quotes = (1..=depth)
                .filter(|level| self.stack[usize::from(*level)].dq)
                .collect();
            return;
        }

        ctx.data.set_nests(depth);
        for (level, entry) in self.stack.iter().enumerate() {
            let level = u16::try_from(level).unwrap_or(u16::MAX);
            ctx.data.set_quote_open(level, entry.dq);
        }
        ctx.data.property = self.in_backquote;

        ctx.exit = if self.in_single {
            BlockState::Quote(QuoteKind::Single)
        } else if depth > 0 || self.in_backquote {
            BlockState::CommandSub { depth }
        } else if self.stack[0].dq {
            BlockState::Quote(QuoteKind::Double)
        } else {
            BlockState::Neutral
        };
    }
}

/// Offset of the next unescaped backquote at or after `from`.
fn closing_backquote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// End of a `$NAME`, `${...}` or special parameter starting at `i`.
fn variable_end(bytes: &[u8], i: usize) -> Option<usize> {
    match *bytes.get(i + 1)? {
        b'{' => Some(
            bytes[i..]
                .iter()
                .position(|b| *b == b'}')
                .map_or(bytes.len(), |p| i + p + 1),
        ),
        b if is_word_byte(b) => {
            Some(i + 1 + bytes[i + 1..].iter().take_while(|b| is_word_byte(**b)).count())
        }
        b'@' | b'*' | b'#' | b'?' | b'$' | b'!' | b'-' => Some(i + 2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Language;
    use crate::testing::{Lines, all_kind};
    use crate::{HighlightOptions, Highlighter};

    fn run(text: &str) -> (Lines, Vec<crate::ClassifiedLine>) {
        let mut hl = Highlighter::new(Language::Shell, HighlightOptions::default()).unwrap();
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_nested_quotes_in_substitution() {
        let (lines, results) = run("echo \"a $(ls 'x y' | wc) b\" # done");
        assert!(all_kind(&results, &lines, 0, "\"a ", TokenKind::String));
        assert!(all_kind(&results, &lines, 0, "$(", TokenKind::CommandSub));
        assert!(all_kind(&results, &lines, 0, "'x y'", TokenKind::AltString));
        assert!(all_kind(&results, &lines, 0, " b\"", TokenKind::String));
        assert!(all_kind(&results, &lines, 0, "# done", TokenKind::Comment));
        assert_eq!(results[0].state, BlockState::Neutral);
    }

    #[test]
    fn test_quotes_carry_across_lines() {
        let (lines, results) = run("x=\"abc\ndef\" y='p\nq'\necho ok");
        assert_eq!(results[0].state, BlockState::Quote(QuoteKind::Double));
        assert!(all_kind(&results, &lines, 1, "def\"", TokenKind::String));
        assert_eq!(results[1].state, BlockState::Quote(QuoteKind::Single));
        assert!(all_kind(&results, &lines, 2, "q'", TokenKind::AltString));
        assert_eq!(results[2].state, BlockState::Neutral);
    }

    #[test]
    fn test_substitution_depth_and_quote_flags() {
        let (lines, results) = run("v=\"$(echo $(date\n) x\n)\"");
        assert_eq!(results[0].state, BlockState::CommandSub { depth: 2 });
        assert!(results[0].data.open_quotes.contains(&0));
        assert!(!results[0].data.open_quotes.contains(&1));
        assert_eq!(results[1].state, BlockState::CommandSub { depth: 1 });
        assert_eq!(results[2].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 2, "\"", TokenKind::String));
    }

    #[test]
    fn test_heredoc_inside_quoted_substitution() {
        let (lines, results) = run("x=\"$(cat <<EOF\nbody 'open \"q\nEOF\n)\"\necho done");
        assert!(matches!(
            results[0].state,
            BlockState::Heredoc {
                dquote_before: true,
                expand: true,
                ..
            }
        ));
        assert_eq!(results[0].data.open_nests, 1);
        assert!(all_kind(&results, &lines, 1, "body 'open", TokenKind::Heredoc));
        assert!(results[1].data.property);
        assert_eq!(results[2].state, BlockState::CommandSub { depth: 1 });
        assert!(all_kind(&results, &lines, 2, "EOF", TokenKind::HeredocDelimiter));
        assert_eq!(results[3].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 3, ")", TokenKind::CommandSub));
        assert!(all_kind(&results, &lines, 4, "echo", TokenKind::BuiltIn));
    }

    #[test]
    fn test_quoted_heredoc_does_not_expand() {
        let (lines, results) = run("cat <<'END'\n$HOME\nEND\ncat <<END\n$HOME $(pwd)\nEND");
        assert!(all_kind(&results, &lines, 1, "$HOME", TokenKind::Heredoc));
        assert!(all_kind(&results, &lines, 4, "$HOME", TokenKind::Variable));
        assert!(all_kind(&results, &lines, 4, "$(", TokenKind::CommandSub));
        assert_eq!(results[5].state, BlockState::Neutral);
    }

    #[test]
    fn test_two_openers_on_one_line() {
        let (lines, results) = run("cat <<A <<'B'\na $x\nA\nb body; rm $x\nB\nrm done");
        assert!(all_kind(&results, &lines, 0, "<<A", TokenKind::HeredocDelimiter));
        assert!(all_kind(&results, &lines, 0, "<<'B'", TokenKind::HeredocDelimiter));
        assert_eq!(results[0].data.queued_heredocs.len(), 1);
        assert!(all_kind(&results, &lines, 1, "$x", TokenKind::Variable));
        assert_eq!(results[1].data.queued_heredocs.len(), 1);

        assert!(all_kind(&results, &lines, 2, "A", TokenKind::HeredocDelimiter));
        assert!(matches!(results[2].state, BlockState::Heredoc { expand: false, .. }));
        assert!(results[2].data.queued_heredocs.is_empty());
        assert_eq!(results[2].data.label, "B");

        assert!(all_kind(&results, &lines, 3, "b body; rm $x", TokenKind::Heredoc));
        assert!(all_kind(&results, &lines, 4, "B", TokenKind::HeredocDelimiter));
        assert_eq!(results[4].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 5, "rm", TokenKind::BuiltIn));
    }

    #[test]
    fn test_body_substitution_inside_outer_substitution() {
        let (lines, results) = run("x=$(cat <<EOF\na $(date\n)\nEOF\n)");
        assert_eq!(results[1].data.open_nests, 1);
        assert_eq!(results[1].data.body_nests, 1);
        assert!(all_kind(&results, &lines, 1, "date", TokenKind::CommandSub));
        assert!(all_kind(&results, &lines, 2, ")", TokenKind::CommandSub));
        assert_eq!(results[2].data.open_nests, 1);
        assert_eq!(results[2].data.body_nests, 0);
        assert_eq!(results[3].state, BlockState::CommandSub { depth: 1 });
        assert_eq!(results[3].data.body_nests, 0);
        assert_eq!(results[4].state, BlockState::Neutral);
    }

    #[test]
    fn test_indented_terminator() {
        let (_, results) = run("cat <<-EOF\n\tbody\n\tEOF\necho");
        assert!(matches!(results[1].state, BlockState::Heredoc { indented: true, .. }));
        assert_eq!(results[2].state, BlockState::Neutral);
    }

    #[test]
    fn test_hash_inside_word_is_not_comment() {
        let (lines, results) = run("echo a#b ${#arr} $# # real");
        assert!(!all_kind(&results, &lines, 0, "#b", TokenKind::Comment));
        assert!(all_kind(&results, &lines, 0, "${#arr}", TokenKind::Variable));
        assert!(all_kind(&results, &lines, 0, "# real", TokenKind::Comment));
    }

    #[test]
    fn test_backquote_across_lines() {
        let (lines, results) = run("x=`ls\n-l`\necho");
        assert_eq!(results[0].state, BlockState::CommandSub { depth: 0 });
        assert!(results[0].data.property);
        assert!(all_kind(&results, &lines, 1, "-l`", TokenKind::CommandSub));
        assert_eq!(results[1].state, BlockState::Neutral);
    }
}
