//! Here-documents for shell, Perl and Ruby.
//!
//! The opener line only records where the body starts: the delimiter word goes into the
//! session's [`DelimiterTable`](crate::DelimiterTable) and the line exits in
//! `BlockState::Heredoc`. Every following line is body until one matches the terminator.
//! Body lines are claimed whole, so nothing inside a heredoc (an unbalanced quote, a stray
//! `/*`) can leak into the code after it.
//!
//! A line may open several heredocs (`cat <<A <<B`). The first one becomes the exit state,
//! the rest wait in [`BlockData::queued_heredocs`](crate::BlockData::queued_heredocs) and
//! each terminator opens the next body.

use super::Matcher;
use crate::block::QueuedHeredoc;
use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::format::TokenKind;
use crate::predicates::is_word_byte;
use crate::state::BlockState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeredocFlavor {
    Shell,
    Perl,
    Ruby,
}

#[derive(Debug)]
pub struct HeredocMatcher {
    flavor: HeredocFlavor,
}

/// A parsed `<<WORD` opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Opener<'t> {
    /// Length of the whole opener, quotes included
    pub len: usize,
    pub word: &'t str,
    /// Variables are expanded in the body (unquoted word or double quotes).
    pub expand: bool,
    /// The terminator may be indented (`<<-`, `<<~`).
    pub indented: bool,
}

/// Parses a heredoc opener at `i`, which must point at `<<`.
pub(crate) fn parse_opener(text: &str, i: usize, flavor: HeredocFlavor) -> Option<Opener<'_>> {
    let bytes = text.as_bytes();
    if !bytes[i..].starts_with(b"<<") || bytes.get(i + 2) == Some(&b'<') {
        return None;
    }
    let mut j = i + 2;
    let indented = match (flavor, bytes.get(j)) {
        (HeredocFlavor::Shell, Some(b'-')) => true,
        (HeredocFlavor::Perl, Some(b'~')) => true,
        (HeredocFlavor::Ruby, Some(b'~' | b'-')) => true,
        _ => false,
    };
    if indented {
        j += 1;
    }
    // Perl only allows the gap before a quoted word; `$x << 2` is a shift
    let gap = bytes[j..].iter().take_while(|b| **b == b' ' || **b == b'\t').count();
    match flavor {
        HeredocFlavor::Shell => j += gap,
        HeredocFlavor::Perl if matches!(bytes.get(j + gap), Some(b'\'' | b'"')) => j += gap,
        _ => {}
    }

    match bytes.get(j)? {
        quote @ (b'\'' | b'"') => {
            let close = bytes[j + 1..].iter().position(|b| b == quote)? + j + 1;
            let word = text.get(j + 1..close)?;
            if word.is_empty() {
                return None;
            }
            Some(Opener {
                len: close + 1 - i,
                word,
                expand: *quote == b'"',
                indented,
            })
        }
        b'\\' if flavor == HeredocFlavor::Shell => {
            let word = bare_word(text, j + 1, flavor)?;
            Some(Opener {
                len: j + 1 + word.len() - i,
                word,
                expand: false,
                indented,
            })
        }
        _ => {
            let word = bare_word(text, j, flavor)?;
            Some(Opener {
                len: j + word.len() - i,
                word,
                expand: true,
                indented,
            })
        }
    }
}

fn bare_word(text: &str, start: usize, flavor: HeredocFlavor) -> Option<&str> {
    let bytes = text.as_bytes();
    let first = *bytes.get(start)?;
    let len = match flavor {
        HeredocFlavor::Shell => bytes[start..]
            .iter()
            .take_while(|b| !b.is_ascii_whitespace() && !b";|&<>()`'\"".contains(b))
            .count(),
        // Perl and Ruby need an identifier; `1 <<2` is a shift
        HeredocFlavor::Perl | HeredocFlavor::Ruby => {
            if !(first.is_ascii_alphabetic() || first == b'_') {
                return None;
            }
            bytes[start..].iter().take_while(|b| is_word_byte(**b)).count()
        }
    };
    (len > 0).then(|| &text[start..start + len])
}

impl HeredocMatcher {
    pub fn new(flavor: HeredocFlavor) -> Self {
        Self { flavor }
    }

    /// The byte range of the terminator word, if `text` terminates the body.
    fn terminator(&self, text: &str, word: &str, indented: bool) -> Option<std::ops::Range<usize>> {
        let (start, candidate) = match self.flavor {
            HeredocFlavor::Shell => {
                let start = if indented {
                    text.bytes().take_while(|b| *b == b'\t').count()
                } else {
                    0
                };
                let rest = &text[start..];
                let end = rest
                    .bytes()
                    .rposition(is_word_byte)
                    .map_or(0, |p| p + 1)
                    .max(word.len().min(rest.len()));
                (start, rest.get(..end)?)
            }
            HeredocFlavor::Perl | HeredocFlavor::Ruby => {
                let start = if indented {
                    text.bytes().take_while(u8::is_ascii_whitespace).count()
                } else {
                    0
                };
                (start, text[start..].trim_end())
            }
        };
        (candidate == word).then(|| start..start + word.len())
    }
}

impl Matcher for HeredocMatcher {
    fn name(&self) -> &'static str {
        "heredoc"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        if let BlockState::Heredoc {
            delimiter,
            expand,
            indented,
            dquote_before,
        } = ctx.entry
        {
            let word = ctx
                .delimiters
                .resolve(delimiter)
                .unwrap_or_default()
                .to_string();

            if let Some(range) = self.terminator(ctx.text, &word, indented) {
                ctx.claim(range, TokenKind::HeredocDelimiter);
                ctx.inherit_nesting();
                ctx.data.label.clear();
                ctx.data.property = false;
                ctx.data.body_nests = 0;
                ctx.data.body_quotes.clear();
                let nests = ctx.prev.map_or(0, |prev| prev.open_nests);
                let next = if nests > 0 && self.flavor == HeredocFlavor::Shell {
                    BlockState::CommandSub { depth: nests }
                } else {
                    BlockState::Neutral
                };
                tracing::trace!("line {}: heredoc {:?} ends", ctx.line, word);

                if !ctx.data.queued_heredocs.is_empty() {
                    let queued = ctx.data.queued_heredocs.remove(0);
                    ctx.data.label = ctx
                        .delimiters
                        .resolve(queued.delimiter)
                        .unwrap_or_default()
                        .to_string();
                    ctx.pending_exit = Some(BlockState::Heredoc {
                        delimiter: queued.delimiter,
                        expand: queued.expand,
                        indented: queued.indented,
                        dquote_before,
                    });
                }
                ctx.resume(next);
                return;
            }

            ctx.claim(0..ctx.text.len(), TokenKind::Heredoc);
            ctx.body_only = true;
            ctx.exit = ctx.entry;
            ctx.inherit_nesting();
            ctx.data.label = word;
            ctx.data.property = dquote_before;
            if expand && self.flavor != HeredocFlavor::Shell {
                paint_interpolation(ctx);
            }
            return;
        }

        // the shell walker finds its own openers
        if self.flavor == HeredocFlavor::Shell {
            return;
        }

        let bytes = ctx.bytes();
        let mut from = 0;
        while let Some(offset) = bytes[from..].windows(2).position(|w| w == b"<<") {
            let pos = from + offset;
            from = pos + 2;
            if ctx.is_contained(pos) {
                continue;
            }
            let Some(opener) = parse_opener(ctx.text, pos, self.flavor) else {
                continue;
            };
            from = pos + opener.len;
            ctx.claim(pos..pos + opener.len, TokenKind::HeredocDelimiter);
            queue_heredoc(ctx, opener, false);
        }
    }

    fn runs_in_body(&self) -> bool {
        true
    }

    fn accepts(&self, state: &BlockState, _lex: &LexRules) -> bool {
        matches!(state, BlockState::Heredoc { .. })
    }
}

/// Makes `opener`'s body follow the line, or follow the bodies already opened on it.
pub(crate) fn queue_heredoc(ctx: &mut LineContext<'_>, opener: Opener<'_>, dquote_before: bool) {
    let delimiter = ctx.delimiters.intern(opener.word);
    if ctx.pending_exit.is_some() {
        ctx.data.queued_heredocs.push(QueuedHeredoc {
            delimiter,
            expand: opener.expand,
            indented: opener.indented,
        });
        return;
    }
    ctx.pending_exit = Some(BlockState::Heredoc {
        delimiter,
        expand: opener.expand,
        indented: opener.indented,
        dquote_before,
    });
    ctx.data.label = opener.word.to_string();
}

/// `$name`, `@name`, `${...}` and Ruby's `#{...}` inside an expanding body.
fn paint_interpolation(ctx: &mut LineContext<'_>) {
    let bytes = ctx.bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'$' | b'@' if bytes.get(i + 1).is_some_and(|b| is_word_byte(*b)) => {
                i += 1;
                i += bytes[i..].iter().take_while(|b| is_word_byte(**b)).count();
            }
            b'$' | b'#' if bytes.get(i + 1) == Some(&b'{') => {
                i = bytes[i..]
                    .iter()
                    .position(|b| *b == b'}')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            _ => {
                i += 1;
                continue;
            }
        }
        ctx.format(start..i, TokenKind::Variable);
    }
}
