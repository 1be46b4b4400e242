//! Per-line persisted state.
//!
//! Every line leaves exactly one [`BlockState`] behind. The next line reads it as its
//! entry state. The host compares old and new exit states to decide whether the following
//! line has to be classified again, so two states compare equal exactly when a downstream
//! line would resume in the same way.
//!
//! ## Learning: Enums Instead of Magic Numbers
//!
//! A line's state could be squeezed into a single integer, with heredoc delimiters hashed
//! into the upper bits. A tagged enum makes every variant carry exactly the data it needs.
//! Delimiter text lives in a side table, so the enum stays `Copy`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which quote opened a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteKind {
    /// `"..."`
    Double,
    /// `'...'`
    Single,
    /// `` `...` `` (Go raw strings, JS template literals, shell command substitution)
    Backquote,
    /// `"""..."""`
    TripleDouble,
    /// `'''...'''`
    TripleSingle,
}

impl QuoteKind {
    /// The text that opens and closes a string of this kind.
    pub fn delimiter(self) -> &'static str {
        match self {
            QuoteKind::Double => "\"",
            QuoteKind::Single => "'",
            QuoteKind::Backquote => "`",
            QuoteKind::TripleDouble => "\"\"\"",
            QuoteKind::TripleSingle => "'''",
        }
    }

    /// The single quote character this kind is made of.
    pub fn mark(self) -> u8 {
        match self {
            QuoteKind::Double | QuoteKind::TripleDouble => b'"',
            QuoteKind::Single | QuoteKind::TripleSingle => b'\'',
            QuoteKind::Backquote => b'`',
        }
    }

    pub fn is_triple(self) -> bool {
        matches!(self, QuoteKind::TripleDouble | QuoteKind::TripleSingle)
    }
}

/// The four ways LaTeX enters math mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathKind {
    /// `$ ... $`
    Dollar,
    /// `$$ ... $$`
    DoubleDollar,
    /// `\( ... \)`
    Paren,
    /// `\[ ... \]`
    Bracket,
}

impl MathKind {
    pub fn closer(self) -> &'static str {
        match self {
            MathKind::Dollar => "$",
            MathKind::DoubleDollar => "$$",
            MathKind::Paren => "\\)",
            MathKind::Bracket => "\\]",
        }
    }
}

/// Opaque handle to a delimiter string interned in a [`DelimiterTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DelimiterId(u32);

impl DelimiterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interns delimiter text (heredoc tags, C++ raw-string delimiters, fence markers,
/// LaTeX environment names) so states can refer to them by id.
///
/// Ids are stable for the lifetime of one highlighting session; the table only grows.
#[derive(Debug, Default, Clone)]
pub struct DelimiterTable {
    names: Vec<String>,
    index: HashMap<String, DelimiterId>,
}

impl DelimiterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `text`, adding it if it's new.
    pub fn intern(&mut self, text: &str) -> DelimiterId {
        if let Some(id) = self.index.get(text) {
            return *id;
        }
        let id = DelimiterId(self.names.len() as u32);
        self.names.push(text.to_string());
        self.index.insert(text.to_string(), id);
        id
    }

    /// Looks up the text behind an id.
    pub fn resolve(&self, id: DelimiterId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn contains(&self, id: DelimiterId) -> bool {
        id.index() < self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What multi-line construct, if any, is still open at the end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockState {
    /// Entry state of the first line. Behaves like `Neutral`, but also permits
    /// the `#!` special case.
    #[default]
    Start,
    /// Nothing open.
    Neutral,
    /// Inside a block comment; `pair` indexes the dialect's comment delimiter pairs.
    Comment { pair: u8 },
    /// Inside a string.
    Quote(QuoteKind),
    /// Inside a Python docstring (a triple-quoted string formatted as a comment).
    DocString(QuoteKind),
    /// Inside a Rust raw string `r##"..."##`.
    RawString { hashes: u8, byte: bool },
    /// Inside a C++ raw string `R"delim(...)delim"`.
    CppRaw(DelimiterId),
    /// Inside a heredoc body.
    Heredoc {
        delimiter: DelimiterId,
        /// Unquoted delimiter: variables and command substitutions expand in the body.
        expand: bool,
        /// `<<-` / `<<~`: the terminator may be indented.
        indented: bool,
        /// A double quote was open around the command substitution that started the heredoc.
        dquote_before: bool,
    },
    /// Inside `depth` nested shell command substitutions. Per-depth quote flags
    /// live in [`BlockData::open_quotes`](crate::BlockData::open_quotes).
    CommandSub { depth: u16 },
    /// Inside a Perl/Ruby delimited regex (`m{`, `s{..}{..}`, `%r{`).
    Regex {
        open: char,
        close: char,
        parts: u8,
        depth: u8,
    },
    /// Inside a Perl/Ruby quote-like literal (`q{`, `qw(`, `%w[`).
    QuoteLike { open: char, close: char, depth: u8 },
    /// Inside a Lua long bracket or CMake bracket argument/comment.
    LongBracket { level: u16, comment: bool },
    /// Inside a YAML block scalar whose indicator line had this indentation.
    YamlBlock { indent: u16 },
    /// Inside a Markdown fenced code block.
    Fence(DelimiterId),
    /// Inside LaTeX math mode.
    Math(MathKind),
    /// Inside a LaTeX verbatim-like environment.
    Verbatim(DelimiterId),
}

impl BlockState {
    /// Whether some construct is left open.
    pub fn is_open(&self) -> bool {
        !matches!(self, BlockState::Start | BlockState::Neutral)
    }

    /// The delimiter id this state refers to, if any.
    pub fn delimiter(&self) -> Option<DelimiterId> {
        match *self {
            BlockState::CppRaw(id) | BlockState::Fence(id) | BlockState::Verbatim(id) => Some(id),
            BlockState::Heredoc { delimiter, .. } => Some(delimiter),
            _ => None,
        }
    }

    /// Short name used in logs and JSON dumps.
    pub fn name(&self) -> &'static str {
        match self {
            BlockState::Start => "start",
            BlockState::Neutral => "neutral",
            BlockState::Comment { .. } => "comment",
            BlockState::Quote(_) => "quote",
            BlockState::DocString(_) => "docstring",
            BlockState::RawString { .. } => "raw-string",
            BlockState::CppRaw(_) => "cpp-raw",
            BlockState::Heredoc { .. } => "heredoc",
            BlockState::CommandSub { .. } => "command-sub",
            BlockState::Regex { .. } => "regex",
            BlockState::QuoteLike { .. } => "quote-like",
            BlockState::LongBracket { .. } => "long-bracket",
            BlockState::YamlBlock { .. } => "yaml-block",
            BlockState::Fence(_) => "fence",
            BlockState::Math(_) => "math",
            BlockState::Verbatim(_) => "verbatim",
        }
    }
}
