//! The per-line orchestrator.
//!
//! ## Learning: One Entry Point, Fixed Order
//!
//! [`Highlighter::classify_line`] is the only way in. It always runs the same steps in the
//! same order: sanitise the entry state, run the dialect's matchers, run the pattern
//! table inside the main window, record brackets and the line's tail, then compare the
//! result against what the line had before and queue any neighbour that needs another pass.

use std::ops::Range;

use crate::block::BlockData;
use crate::context::{LineContext, LineSource};
use crate::dialect::{Dialect, Language};
use crate::format::{FormatRegistry, LineFormats, TokenKind};
use crate::invalidate::{self, Outcome, ReclassifyQueue};
use crate::options::HighlightOptions;
use crate::patterns::PatternTable;
use crate::predicates::trailing_token;
use crate::state::{BlockState, DelimiterTable};
use crate::SyntaxResult;

/// Everything one classification pass produced for a line.
///
/// The host stores `state` and `data` against the line and paints `formats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Exit state; the next line's entry state
    pub state: BlockState,
    pub data: BlockData,
    pub formats: LineFormats,
    /// Earlier lines this line looked back at. The host should set their
    /// [`BlockData::watched`] flag.
    pub watch: Vec<usize>,
}

/// A highlighting session for one language.
///
/// The dialect and pattern table are built once in [`new`](Self::new) and never change.
#[derive(Debug)]
pub struct Highlighter {
    language: Language,
    options: HighlightOptions,
    dialect: Dialect,
    patterns: PatternTable,
    delimiters: DelimiterTable,
    queue: ReclassifyQueue,
    window: Option<Range<usize>>,
}

impl Highlighter {
    pub fn new(language: Language, options: HighlightOptions) -> SyntaxResult<Self> {
        let dialect = Dialect::new(language);
        let patterns = PatternTable::new(language)?;
        let queue = ReclassifyQueue::new(options.reclassify_queue_capacity);
        tracing::debug!(
            "Highlighter ready for {} ({} matchers, {} rules)",
            language,
            dialect.matchers().len(),
            patterns.len()
        );
        Ok(Self {
            language,
            options,
            dialect,
            patterns,
            delimiters: DelimiterTable::new(),
            queue,
            window: None,
        })
    }

    /// Builds a session from a language name such as `"rust"` or `"bash"`.
    pub fn for_name(name: &str, options: HighlightOptions) -> SyntaxResult<Self> {
        Self::new(name.parse()?, options)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn format_registry(&self) -> FormatRegistry {
        FormatRegistry::new(&self.options)
    }

    pub fn delimiters(&self) -> &DelimiterTable {
        &self.delimiters
    }

    // ==================== Main window ====================

    /// Limits the pattern-table pass to `window` (a range of line numbers). `None`
    /// applies it everywhere.
    pub fn set_main_window(&mut self, window: Option<Range<usize>>) {
        self.window = window;
    }

    pub fn main_window(&self) -> Option<&Range<usize>> {
        self.window.as_ref()
    }

    fn in_main_window(&self, line: usize) -> bool {
        self.window.as_ref().is_none_or(|window| window.contains(&line))
    }

    // ==================== Reclassify queue ====================

    /// The next line waiting to be classified again.
    pub fn pop_request(&mut self) -> Option<usize> {
        self.queue.pop()
    }

    pub fn drain_requests(&mut self) -> Vec<usize> {
        self.queue.drain()
    }

    pub fn queue(&self) -> &ReclassifyQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ReclassifyQueue {
        &mut self.queue
    }

    // ==================== Classification ====================

    /// The state `line` starts in, according to the line before it.
    ///
    /// A state this session could not have produced (another dialect's, or one naming a
    /// delimiter the table doesn't know) is treated as `Neutral`.
    pub fn entry_state(&self, doc: &dyn LineSource, line: usize) -> BlockState {
        if line == 0 {
            return BlockState::Start;
        }
        let state = doc.exit_state(line - 1).unwrap_or(BlockState::Neutral);
        if state == BlockState::Start || !self.dialect.accepts(&state, &self.delimiters) {
            if state != BlockState::Start {
                tracing::trace!(
                    "line {}: {} is not a {} state, starting neutral",
                    line,
                    state.name(),
                    self.language
                );
            }
            return BlockState::Neutral;
        }
        state
    }

    /// Classifies one line of `doc`.
    ///
    /// Reads the previous line's exit state and data, never writes to `doc`. Requests for
    /// neighbours that need another pass go to the reclassify queue.
    pub fn classify_line(&mut self, doc: &dyn LineSource, line: usize) -> ClassifiedLine {
        let text = doc.line_text(line).unwrap_or_default();
        let entry = self.entry_state(doc, line);
        let prev = line.checked_sub(1).and_then(|p| doc.block_data(p));
        let old_state = doc.exit_state(line);
        let old_data = doc.block_data(line);

        let Pass {
            state,
            mut data,
            formats,
            watch,
            request_previous,
        } = if text.len() > self.options.max_line_length {
            self.classify_long(&text, entry, prev)
        } else {
            self.classify_text(doc, &text, line, entry, prev)
        };

        data.last_state = old_state;
        data.watched = old_data.is_some_and(|old| old.watched);

        invalidate::check(
            &Outcome {
                line,
                line_count: doc.line_count(),
                text: &text,
                old_state,
                old_data,
                new_state: state,
                new_data: &data,
                request_previous,
            },
            &mut self.queue,
        );

        if old_state != Some(state) {
            tracing::trace!("line {}: {} -> {}", line, entry.name(), state.name());
        }

        ClassifiedLine {
            state,
            data,
            formats,
            watch,
        }
    }

    /// Lines over the length limit get one style and pass their entry state through.
    fn classify_long(
        &self,
        text: &str,
        entry: BlockState,
        prev: Option<&BlockData>,
    ) -> Pass {
        tracing::trace!("{} byte line left unclassified", text.len());
        let mut data = BlockData::new();
        if let Some(prev) = prev {
            data.inherit(prev);
        }
        data.highlighted = false;
        let state = if entry == BlockState::Start {
            BlockState::Neutral
        } else {
            entry
        };
        Pass {
            state,
            data,
            formats: LineFormats::new(text.len(), TokenKind::LongLine),
            watch: Vec::new(),
            request_previous: false,
        }
    }

    fn classify_text(
        &mut self,
        doc: &dyn LineSource,
        text: &str,
        line: usize,
        entry: BlockState,
        prev: Option<&BlockData>,
    ) -> Pass {
        let in_window = self.in_main_window(line);
        let mut ctx = LineContext::new(
            text,
            line,
            entry,
            prev,
            doc,
            &self.dialect,
            &mut self.delimiters,
        );

        for matcher in self.dialect.matchers() {
            if ctx.body_only && !matcher.runs_in_body() {
                continue;
            }
            matcher.run(&mut ctx);
        }

        if in_window && !ctx.body_only && !self.patterns.is_empty() {
            let snapshot = ctx.formats.clone();
            self.patterns.apply(&mut ctx.formats, text, &snapshot);
        }

        if self.options.show_whitespace {
            mark_whitespace(&mut ctx.formats, text);
        }

        let state = ctx.pending_exit.unwrap_or(ctx.exit);
        let mut data = ctx.data;
        record_brackets(&mut data, &ctx.formats, text);
        data.tail = trailing_context(text, &ctx.formats);

        let mut watch = ctx.watch;
        watch.sort_unstable();
        watch.dedup();

        Pass {
            state,
            data,
            formats: ctx.formats,
            watch,
            request_previous: ctx.request_previous,
        }
    }
}

/// The raw result of one pass, before invalidation.
struct Pass {
    state: BlockState,
    data: BlockData,
    formats: LineFormats,
    watch: Vec<usize>,
    request_previous: bool,
}

/// Spaces and tabs in plain text get the faded whitespace style.
fn mark_whitespace(formats: &mut LineFormats, text: &str) {
    for (pos, b) in text.bytes().enumerate() {
        if (b == b' ' || b == b'\t') && formats.at(pos).is_plain() {
            formats.set(pos..pos + 1, TokenKind::Whitespace);
        }
    }
}

/// Records structural brackets; those inside comments, strings and literals don't count.
fn record_brackets(data: &mut BlockData, formats: &LineFormats, text: &str) {
    for (pos, b) in text.bytes().enumerate() {
        if matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}') && !formats.at(pos).is_shielded() {
            data.insert_bracket(char::from(b), pos);
        }
    }
}

/// The last token on the line that isn't part of a comment.
fn trailing_context(text: &str, formats: &LineFormats) -> String {
    let bytes = text.as_bytes();
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1].is_ascii_whitespace() || formats.at(end - 1).is_comment()) {
        end -= 1;
    }
    text.get(..end).map(trailing_token).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::QuoteKind;
    use crate::testing::{Lines, all_kind, kinds_of};

    fn session(language: Language) -> Highlighter {
        Highlighter::new(language, HighlightOptions::default()).unwrap()
    }

    fn run(language: Language, text: &str) -> (Lines, Vec<ClassifiedLine>) {
        let mut hl = session(language);
        let mut lines = Lines::new(text);
        let results = lines.run(&mut hl);
        (lines, results)
    }

    #[test]
    fn test_cpp_comment_with_url() {
        let (lines, results) = run(Language::Cpp, "// a comment with http://example.com");
        let kinds = kinds_of(&results, &lines, 0, "// a comment with ");
        assert!(kinds.iter().all(|k| *k == TokenKind::Comment));
        assert!(all_kind(&results, &lines, 0, "http://example.com", TokenKind::CommentUrl));
        assert_eq!(results[0].state, BlockState::Neutral);
    }

    #[test]
    fn test_shell_heredoc_with_substitution() {
        let (lines, results) = run(Language::Shell, "X=<<EOF\nhello $(echo hi)\nEOF");
        assert!(matches!(results[0].state, BlockState::Heredoc { .. }));
        assert!(all_kind(&results, &lines, 1, "hello ", TokenKind::Heredoc));
        assert!(all_kind(&results, &lines, 1, "$(echo hi)", TokenKind::CommandSub));
        assert_eq!(results[1].data.body_nests, 0);
        assert_eq!(results[2].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 2, "EOF", TokenKind::HeredocDelimiter));
    }

    #[test]
    fn test_shell_heredoc_substitution_spans_body_lines() {
        let (lines, results) = run(
            Language::Shell,
            "cat <<EOF\na $(echo \"x\ny\" b) c\nEOF\necho done",
        );
        assert!(all_kind(&results, &lines, 1, "a ", TokenKind::Heredoc));
        assert!(all_kind(&results, &lines, 1, "$(echo ", TokenKind::CommandSub));
        assert!(all_kind(&results, &lines, 1, "\"x", TokenKind::String));
        assert_eq!(results[1].data.body_nests, 1);
        assert!(results[1].data.body_quotes.contains(&1));
        assert_eq!(results[1].data.open_nests, 0);

        assert!(all_kind(&results, &lines, 2, "y\"", TokenKind::String));
        assert!(all_kind(&results, &lines, 2, " b)", TokenKind::CommandSub));
        assert!(all_kind(&results, &lines, 2, " c", TokenKind::Heredoc));
        assert_eq!(results[2].data.body_nests, 0);
        assert!(results[2].data.body_quotes.is_empty());

        assert_eq!(results[3].state, BlockState::Neutral);
        assert!(all_kind(&results, &lines, 4, "echo", TokenKind::BuiltIn));
    }

    #[test]
    fn test_shell_body_nesting_change_requests_next_line() {
        let mut hl = session(Language::Shell);
        let mut lines = Lines::new("cat <<EOF\na $(date\n)\nEOF");
        let results = lines.run(&mut hl);
        assert_eq!(results[1].data.body_nests, 1);
        assert!(all_kind(&results, &lines, 2, ")", TokenKind::CommandSub));
        hl.drain_requests();

        // closing the substitution on line 1 leaves its exit state alone
        lines.text[1] = "a $(date)".to_string();
        let result = lines.classify(&mut hl, 1);
        assert!(matches!(result.state, BlockState::Heredoc { .. }));
        assert_eq!(hl.drain_requests(), vec![2]);
        let result = lines.classify(&mut hl, 2);
        assert_eq!(result.formats.at(0), TokenKind::Heredoc);
    }

    #[test]
    fn test_rust_raw_string_is_one_span() {
        let text = r###"let s = r#"has a "quote" inside"#;"###;
        let (lines, results) = run(Language::Rust, text);
        assert!(all_kind(&results, &lines, 0, r###"r#"has a "quote" inside"#"###, TokenKind::RawLiteral));
        assert_eq!(results[0].formats.at(text.len() - 1), TokenKind::Main);
        assert_eq!(results[0].state, BlockState::Neutral);
    }

    #[test]
    fn test_division_is_not_regex() {
        let (lines, results) = run(Language::JavaScript, "a = b / c / d;\nx = /abc/;");
        assert!(!results[0].formats.kinds().contains(&TokenKind::Regex));
        assert!(all_kind(&results, &lines, 1, "/abc/", TokenKind::Regex));
    }

    #[test]
    fn test_heredoc_delimiter_isolation() {
        let (_, results) = run(Language::Shell, "cat <<EOF\nEOF\n");
        assert_eq!(results[1].state, BlockState::Neutral);

        let (lines, results) = run(Language::Shell, "cat <<EOF\nEOFX\nEOF\n");
        assert!(matches!(results[1].state, BlockState::Heredoc { .. }));
        assert!(all_kind(&results, &lines, 1, "EOFX", TokenKind::Heredoc));
        assert_eq!(results[2].state, BlockState::Neutral);
    }

    #[test]
    fn test_idempotent() {
        let mut hl = session(Language::Python);
        let mut lines = Lines::new("def f():\n    \"\"\"doc\n    more\"\"\"\n    return 1 # done");
        let first = lines.run(&mut hl);
        let second = lines.run(&mut hl);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.state, b.state);
            assert_eq!(a.formats, b.formats);
            assert_eq!(a.data.parentheses, b.data.parentheses);
            assert_eq!(a.data.resumable(), b.data.resumable());
        }
    }

    #[test]
    fn test_brackets_skip_strings_and_comments() {
        let (_, results) = run(Language::C, "f(\"(\", x[1]) /* { */ {");
        let data = &results[0].data;
        assert_eq!(data.parentheses.len(), 2);
        assert_eq!(data.brackets.len(), 2);
        assert_eq!(data.braces.len(), 1);
        assert_eq!(data.braces[0].position, 21);
    }

    #[test]
    fn test_tail_ignores_comments() {
        let (_, results) = run(Language::JavaScript, "x = f(a) // trailing\nreturn");
        assert_eq!(results[0].data.tail, ")");
        assert_eq!(results[1].data.tail, "return");
    }

    #[test]
    fn test_long_line_passes_state_through() {
        let options = HighlightOptions {
            max_line_length: 8,
            ..HighlightOptions::default()
        };
        let mut hl = Highlighter::new(Language::C, options).unwrap();
        let mut lines = Lines::new("/* open\nthis line is too long */\nx */ y");
        let results = lines.run(&mut hl);
        assert_eq!(results[1].state, BlockState::Comment { pair: 0 });
        assert!(!results[1].data.highlighted);
        assert!(results[1].formats.kinds().iter().all(|k| *k == TokenKind::LongLine));
        assert_eq!(results[2].state, BlockState::Neutral);
    }

    #[test]
    fn test_foreign_entry_state_is_neutral() {
        let mut hl = session(Language::Rust);
        let mut lines = Lines::new("x\nlet a = 1;");
        lines.states[0] = Some(BlockState::CommandSub { depth: 3 });
        assert_eq!(hl.entry_state(&lines, 1), BlockState::Neutral);
        lines.states[0] = Some(BlockState::Quote(QuoteKind::Double));
        assert_eq!(hl.entry_state(&lines, 1), BlockState::Quote(QuoteKind::Double));
        let result = hl.classify_line(&lines, 1);
        assert_eq!(result.state, BlockState::Quote(QuoteKind::Double));
    }

    #[test]
    fn test_main_window_limits_patterns() {
        let mut hl = session(Language::C);
        hl.set_main_window(Some(1..2));
        let mut lines = Lines::new("return 1;\nreturn 1;\n/* x");
        let results = lines.run(&mut hl);
        assert_eq!(results[0].formats.at(0), TokenKind::Main);
        assert_eq!(results[1].formats.at(0), TokenKind::Keyword);
        // matchers still run everywhere
        assert_eq!(results[2].state, BlockState::Comment { pair: 0 });
    }

    #[test]
    fn test_show_whitespace() {
        let options = HighlightOptions {
            show_whitespace: true,
            ..HighlightOptions::default()
        };
        let mut hl = Highlighter::new(Language::C, options).unwrap();
        let mut lines = Lines::new("a b // c d");
        let result = lines.classify(&mut hl, 0);
        assert_eq!(result.formats.at(1), TokenKind::Whitespace);
        assert_eq!(result.formats.at(6), TokenKind::Comment);
    }

    #[test]
    fn test_regex_lookback_watches_blank_lines() {
        let mut hl = session(Language::JavaScript);
        let mut lines = Lines::new("x = y\n\n/re/.test(s)");
        let results = lines.run(&mut hl);
        // `y` ends the expression, so the `/` divides
        assert!(!results[2].formats.kinds().contains(&TokenKind::Regex));
        assert!(results[2].watch.contains(&1));
        assert!(lines.data[1].as_ref().unwrap().watched);

        // the watched blank line now ends a statement with `return`
        lines.text[0] = "return".to_string();
        lines.classify(&mut hl, 0);
        lines.classify(&mut hl, 1);
        let mut queued = hl.drain_requests();
        queued.sort_unstable();
        assert!(queued.contains(&2));
        let result = lines.classify(&mut hl, 2);
        assert!((0..4).all(|pos| result.formats.at(pos) == TokenKind::Regex));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// C fragments whose joins never form `//`.
        fn c_fragment() -> impl Strategy<Value = String> {
            proptest::collection::vec(prop_oneof![Just("/* "), Just(" */ "), Just("a"), Just(" ")], 0..8)
                .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn prop_split_line_resumes_like_joined(first in c_fragment(), second in c_fragment()) {
                let (_, split) = run(Language::C, &format!("{first}\n{second}"));
                let (_, joined) = run(Language::C, &format!("{first}{second}"));
                prop_assert_eq!(split[1].formats.kinds(), &joined[0].formats.kinds()[first.len()..]);
                prop_assert_eq!(split[1].state, joined[0].state);
            }

            #[test]
            fn prop_classification_is_idempotent(text in "[a-z0-9 \"'#$(){}\\\\/*\n]{0,60}") {
                let mut hl = session(Language::Shell);
                let mut lines = Lines::new(&text);
                let first = lines.run(&mut hl);
                let second = lines.run(&mut hl);
                for (a, b) in first.iter().zip(&second) {
                    prop_assert_eq!(a.state, b.state);
                    prop_assert_eq!(&a.formats, &b.formats);
                    prop_assert_eq!(a.data.resumable(), b.data.resumable());
                }
            }
        }
    }
}
