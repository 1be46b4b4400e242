//! Per-language dialect descriptors.
//!
//! A [`Dialect`] is built once when a session starts and never changes afterwards. It
//! holds the lexical rules the shared region scanner needs ([`LexRules`]) and the ordered
//! matcher pipeline the orchestrator runs over every line.
//!
//! ## Learning: `const` Data Plus Function Pointers
//!
//! Most of what distinguishes one language from another is data: which strings open a
//! comment, which quotes exist, how they escape. That data lives in `const` tables. The
//! handful of rules that need code (is this `'` a Rust lifetime?) are plain `fn` pointers,
//! so the whole descriptor stays `Copy` and free of allocation.

mod keywords;
mod language;
mod lex;
pub(crate) mod rules;

pub use language::Language;

use crate::format::TokenKind;
use crate::matchers::{
    BracketFlavor, CommentMatcher, FenceMatcher, HeadingMatcher, HeredocFlavor,
    HeredocMatcher, LatexMatcher, LongBracketMatcher, Matcher, QuoteMatcher, RawMatcher,
    RegexMatcher, ShellMatcher, YamlBlockMatcher,
};
use crate::state::{BlockState, DelimiterTable, QuoteKind};

/// Decides whether a candidate at a byte offset may start a construct.
pub type Guard = fn(&[u8], usize) -> bool;

/// Decides whether a quote of the given kind may start at a byte offset.
pub type QuoteGuard = fn(&[u8], usize, QuoteKind) -> bool;

/// One side of a block comment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// Matches anywhere on the line.
    Literal(&'static str),
    /// Matches only at column 0 and covers the whole line. A prefix ending in a word
    /// character must be followed by a non-word character; one ending in punctuation
    /// must be followed by a letter.
    LineStart(&'static str),
    /// Never matches; the region runs to the end of the document.
    Never,
}

impl Delim {
    /// Length of the match at `pos`, if the delimiter matches there.
    pub fn match_at(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        match *self {
            Delim::Literal(text) => bytes[pos..].starts_with(text.as_bytes()).then_some(text.len()),
            Delim::LineStart(prefix) => {
                if pos != 0 || !bytes.starts_with(prefix.as_bytes()) {
                    return None;
                }
                let last = *prefix.as_bytes().last()?;
                let next = bytes.get(prefix.len()).copied();
                let ok = if crate::predicates::is_word_byte(last) {
                    next.is_none_or(|b| !crate::predicates::is_word_byte(b))
                } else {
                    next.is_some_and(|b| b.is_ascii_alphabetic())
                };
                ok.then_some(bytes.len())
            }
            Delim::Never => None,
        }
    }

    /// Finds the first match at or after `from`, returning its start and length.
    pub fn find(&self, bytes: &[u8], from: usize) -> Option<(usize, usize)> {
        match *self {
            Delim::Literal(text) => {
                let needle = text.as_bytes();
                bytes
                    .get(from..)?
                    .windows(needle.len())
                    .position(|w| w == needle)
                    .map(|offset| (from + offset, needle.len()))
            }
            Delim::LineStart(_) => (from == 0)
                .then(|| self.match_at(bytes, 0))
                .flatten()
                .map(|len| (0, len)),
            Delim::Never => None,
        }
    }
}

/// A block comment (or comment-like literal) delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPair {
    pub open: Delim,
    pub close: Delim,
    /// Format applied to the region; `Comment` except for CDATA-like literals.
    pub kind: TokenKind,
}

/// How a quote escapes its own delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escapes {
    Backslash,
    /// Two delimiters in a row stand for one (`'it''s'`).
    Doubled,
    None,
}

/// Whether an unterminated quote carries to the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiline {
    /// Closes at the end of the line.
    Never,
    /// Carries only when the line ends with a backslash.
    Continuation,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRule {
    pub kind: QuoteKind,
    pub escapes: Escapes,
    pub multiline: Multiline,
}

impl QuoteRule {
    pub const fn new(kind: QuoteKind, escapes: Escapes, multiline: Multiline) -> Self {
        Self {
            kind,
            escapes,
            multiline,
        }
    }
}

/// Raw string literal syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSyntax {
    None,
    /// `r#"..."#`, `br"..."`
    Rust,
    /// `R"delim(...)delim"`
    Cpp,
}

/// Delimited quote-like and regex literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralSyntax {
    None,
    /// `q{}`, `qw()`, `m//`, `s{}{}`, `tr///`
    Perl,
    /// `%w[]`, `%q()`, `%r{}`
    Ruby,
}

/// Lexical rules consumed by the shared region scanner.
#[derive(Debug, Clone, Copy)]
pub struct LexRules {
    pub line_comments: &'static [&'static str],
    pub line_comment_guard: Option<Guard>,
    pub block_pairs: &'static [BlockPair],
    /// Checked in order; triple quotes come before their single forms.
    pub quotes: &'static [QuoteRule],
    pub quote_guard: Option<QuoteGuard>,
    pub raw: RawSyntax,
    pub literals: LiteralSyntax,
    /// `/.../` regex literals, told apart from division by context.
    pub slash_regex: bool,
    /// Whether regex literals may span lines.
    pub regex_multiline: bool,
    /// Triple-quoted strings that open a statement are docstrings.
    pub docstrings: bool,
    /// Identifiers after which a `/` starts a regex rather than dividing.
    pub regex_keywords: &'static [&'static str],
}

impl LexRules {
    pub const EMPTY: LexRules = LexRules {
        line_comments: &[],
        line_comment_guard: None,
        block_pairs: &[],
        quotes: &[],
        quote_guard: None,
        raw: RawSyntax::None,
        literals: LiteralSyntax::None,
        slash_regex: false,
        regex_multiline: false,
        docstrings: false,
        regex_keywords: &[],
    };

    pub fn quote_rule(&self, kind: QuoteKind) -> Option<&QuoteRule> {
        self.quotes.iter().find(|rule| rule.kind == kind)
    }
}

/// Everything that makes one language behave differently from another.
#[derive(Debug)]
pub struct Dialect {
    language: Language,
    lex: LexRules,
    matchers: Vec<Box<dyn Matcher>>,
}

impl Dialect {
    pub fn new(language: Language) -> Self {
        let lex = lex::rules_for(language);
        let matchers = pipeline(language, &lex);
        tracing::debug!(
            "Built {} dialect: {}",
            language,
            matchers
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(" → ")
        );
        Self {
            language,
            lex,
            matchers,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn lex(&self) -> &LexRules {
        &self.lex
    }

    pub fn matchers(&self) -> &[Box<dyn Matcher>] {
        &self.matchers
    }

    /// Whether `state` is one this dialect can produce, with a known delimiter id.
    pub fn accepts(&self, state: &BlockState, delimiters: &DelimiterTable) -> bool {
        if let Some(id) = state.delimiter() {
            if !delimiters.contains(id) {
                return false;
            }
        }
        match state {
            BlockState::Start | BlockState::Neutral => true,
            other => self.matchers.iter().any(|m| m.accepts(other, &self.lex)),
        }
    }
}

/// The ordered matcher pipeline for a language.
fn pipeline(language: Language, lex: &LexRules) -> Vec<Box<dyn Matcher>> {
    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();

    match language {
        Language::Shell => {
            matchers.push(Box::new(HeredocMatcher::new(HeredocFlavor::Shell)));
            matchers.push(Box::new(ShellMatcher));
            return matchers;
        }
        Language::Latex => {
            matchers.push(Box::new(LatexMatcher));
            return matchers;
        }
        Language::Markdown => {
            matchers.push(Box::new(FenceMatcher));
            matchers.push(Box::new(HeadingMatcher));
        }
        Language::Perl => matchers.push(Box::new(HeredocMatcher::new(HeredocFlavor::Perl))),
        Language::Ruby => matchers.push(Box::new(HeredocMatcher::new(HeredocFlavor::Ruby))),
        Language::Lua => matchers.push(Box::new(LongBracketMatcher::new(BracketFlavor::Lua))),
        Language::CMake => matchers.push(Box::new(LongBracketMatcher::new(BracketFlavor::CMake))),
        Language::Yaml => matchers.push(Box::new(YamlBlockMatcher)),
        _ => {}
    }

    if !lex.line_comments.is_empty() || !lex.block_pairs.is_empty() {
        matchers.push(Box::new(CommentMatcher));
    }
    if !lex.quotes.is_empty() || lex.literals != LiteralSyntax::None {
        matchers.push(Box::new(QuoteMatcher));
    }
    if lex.raw != RawSyntax::None {
        matchers.push(Box::new(RawMatcher));
    }
    if lex.slash_regex || lex.literals != LiteralSyntax::None {
        matchers.push(Box::new(RegexMatcher));
    }
    matchers
}
