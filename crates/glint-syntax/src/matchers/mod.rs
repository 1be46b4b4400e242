//! Per-construct matchers.
//!
//! Each matcher recognises one family of constructs. The dialect decides which ones run
//! for a language and in what order. Matchers read and write the shared [`LineContext`];
//! they never call each other.
//!
//! Two kinds exist:
//!
//! - **Region matchers** (`comment`, `quote`, `raw`, `regex`) paint what the shared region
//!   scanner found. Their modules also hold the grammar the scanner uses to find where
//!   each region starts and ends.
//! - **Walkers** (`heredoc`, `shell`, `bracket`, `yaml`, `markdown`, `latex`) handle
//!   constructs the scanner can't express and claim the ranges they format.
//!
//! ## Learning: Default Trait Methods
//!
//! Most matchers never see heredoc bodies and own no multi-line state, so
//! `runs_in_body` and `accepts` have defaults. Only the matchers that differ override them.

pub(crate) mod bracket;
pub(crate) mod comment;
pub(crate) mod heredoc;
pub(crate) mod latex;
pub(crate) mod markdown;
pub(crate) mod quote;
pub(crate) mod raw;
pub(crate) mod regex;
pub(crate) mod shell;
pub(crate) mod yaml;

pub use bracket::{BracketFlavor, LongBracketMatcher};
pub use comment::CommentMatcher;
pub use heredoc::{HeredocFlavor, HeredocMatcher};
pub use latex::LatexMatcher;
pub use markdown::{FenceMatcher, HeadingMatcher};
pub use quote::QuoteMatcher;
pub use raw::RawMatcher;
pub use regex::RegexMatcher;
pub use shell::ShellMatcher;
pub use yaml::YamlBlockMatcher;

use crate::context::LineContext;
use crate::dialect::LexRules;
use crate::scan::Region;
use crate::state::BlockState;

/// One construct family's recogniser.
pub trait Matcher: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Formats what this matcher recognises on the current line.
    fn run(&self, ctx: &mut LineContext<'_>);

    /// Whether the matcher still runs on lines that belong to a heredoc or block body.
    fn runs_in_body(&self) -> bool {
        false
    }

    /// Whether `state` is one this matcher produces for the given lexical rules.
    fn accepts(&self, state: &BlockState, lex: &LexRules) -> bool {
        let _ = (state, lex);
        false
    }
}

/// Paints every scanned region `owns` selects and, when the line ends inside one of
/// them, sets the exit state.
pub(crate) fn paint_regions(ctx: &mut LineContext<'_>, owns: fn(&Region) -> bool) {
    let lex = ctx.lex();
    for segment in ctx.segments() {
        if !owns(&segment.region) {
            continue;
        }
        let kind = segment.region.kind(lex);
        ctx.format(segment.range.clone(), kind);
        if kind.is_comment() || kind.is_quote() {
            ctx.annotate(segment.range.clone(), kind.is_comment());
        }
        if !segment.closed {
            ctx.exit = segment.region.open_state();
        }
    }
}
