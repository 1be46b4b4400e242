//! # Glint Syntax
//!
//! Incremental, line-at-a-time syntax classification for over thirty languages.
//!
//! The host document hands the engine one line at a time, together with the state the
//! previous line left behind. The engine decides which lexical category every byte
//! belongs to and returns the state the next line should start from. If something a
//! neighbour depends on changed without the state changing, it also queues that
//! neighbour for another pass.
//!
//! ## Pipeline
//!
//! ```text
//! Highlighter::classify_line
//!   ├─ dedicated matchers (heredoc, shell, long brackets, YAML, Markdown, LaTeX)
//!   ├─ region matchers (comment, quote, raw, regex) over the shared scanner
//!   ├─ pattern table (keywords, numbers, ...) inside the main window
//!   ├─ bracket bookkeeping
//!   └─ invalidation check → ReclassifyQueue
//! ```
//!
//! ## Learning: Trait Objects for Per-Language Behaviour
//!
//! Every language gets a [`Dialect`]: plain lexical data plus an ordered list of
//! `Box<dyn Matcher>`. The orchestrator never asks "is this Perl?", it just runs the list.

mod block;
mod context;
mod dialect;
mod format;
mod highlighter;
mod invalidate;
mod matchers;
mod options;
mod patterns;
mod scan;
mod state;

pub mod annotate;
pub mod predicates;

pub use block::{BlockData, BracketInfo, QueuedHeredoc, Resumable};
pub use context::{LineContext, LineSource};
pub use dialect::{Dialect, Language};
pub use format::{Color, FormatRegistry, FormatSpan, LineFormats, Style, TokenKind};
pub use highlighter::{ClassifiedLine, Highlighter};
pub use invalidate::ReclassifyQueue;
pub use matchers::Matcher;
pub use options::{HighlightOptions, SyntaxRole};
pub use patterns::PatternTable;
pub use scan::{Region, Segment};
pub use state::{BlockState, DelimiterId, DelimiterTable, MathKind, QuoteKind};

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur when setting up a highlighting session.
///
/// Classifying a line never fails; only building a session can.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid pattern for {language}: {source}")]
    Pattern {
        language: &'static str,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
pub(crate) mod testing {
    //! A minimal in-memory host for unit tests.

    use std::borrow::Cow;

    use crate::{BlockData, BlockState, ClassifiedLine, Highlighter, LineSource};

    #[derive(Default)]
    pub struct Lines {
        pub text: Vec<String>,
        pub states: Vec<Option<BlockState>>,
        pub data: Vec<Option<BlockData>>,
    }

    impl Lines {
        pub fn new(text: &str) -> Self {
            let text: Vec<String> = text.split('\n').map(str::to_string).collect();
            let n = text.len();
            Self {
                text,
                states: vec![None; n],
                data: vec![None; n],
            }
        }

        /// Classifies every line once, top to bottom.
        pub fn run(&mut self, hl: &mut Highlighter) -> Vec<ClassifiedLine> {
            (0..self.text.len()).map(|line| self.classify(hl, line)).collect()
        }

        pub fn classify(&mut self, hl: &mut Highlighter, line: usize) -> ClassifiedLine {
            let result = hl.classify_line(self, line);
            self.states[line] = Some(result.state);
            self.data[line] = Some(result.data.clone());
            for watched in &result.watch {
                if let Some(Some(data)) = self.data.get_mut(*watched) {
                    data.watched = true;
                }
            }
            result
        }
    }

    impl LineSource for Lines {
        fn line_count(&self) -> usize {
            self.text.len()
        }

        fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
            self.text.get(line).map(|t| Cow::Borrowed(t.as_str()))
        }

        fn exit_state(&self, line: usize) -> Option<BlockState> {
            self.states.get(line).copied().flatten()
        }

        fn block_data(&self, line: usize) -> Option<&BlockData> {
            self.data.get(line).and_then(Option::as_ref)
        }
    }

    /// Classifies `text` and returns the kinds of `needle`'s bytes on `line`.
    pub fn kinds_of(
        results: &[ClassifiedLine],
        lines: &Lines,
        line: usize,
        needle: &str,
    ) -> Vec<crate::TokenKind> {
        let start = lines.text[line]
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not on line {line}"));
        (start..start + needle.len())
            .map(|pos| results[line].formats.at(pos))
            .collect()
    }

    /// Whether every byte of `needle` on `line` has kind `kind`.
    pub fn all_kind(
        results: &[ClassifiedLine],
        lines: &Lines,
        line: usize,
        needle: &str,
        kind: crate::TokenKind,
    ) -> bool {
        kinds_of(results, lines, line, needle)
            .into_iter()
            .all(|k| k == kind)
    }
}
