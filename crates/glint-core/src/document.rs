//! A text buffer that keeps itself highlighted.
//!
//! ## Learning: Splitting Borrows
//!
//! Classifying a line needs `&mut Highlighter` and, at the same time, read access to the
//! text and every other line's record. Both live in the same struct, so
//! `self.highlighter.classify_line(&self, ..)` would not compile. Borrowing the *fields*
//! separately works: the compiler sees `self.highlighter` (mutable) and
//! `self.buffer`/`self.records` (shared) as disjoint.
//!
//! ```rust,ignore
//! let lines = Lines { buffer: &self.buffer, records: &self.records };
//! let result = self.highlighter.classify_line(&lines, line);
//! ```
//!
//! ## The Cascade
//!
//! After an edit every changed line is classified, then the lines after it, for as long
//! as a line's exit state comes out different from what it was. Anything the exit state
//! doesn't capture comes back through the highlighter's reclassify queue, which is
//! drained before an edit returns.

use glint_buffer::{LineEdit, Position, TextBuffer};
use glint_syntax::{
    BlockData, BlockState, BracketInfo, FormatRegistry, FormatSpan, HighlightOptions, Highlighter,
    Language, LineFormats, LineSource,
};
use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

use crate::{Config, CoreResult};

/// What the engine last said about one line.
#[derive(Debug, Clone, Default)]
struct LineRecord {
    state: Option<BlockState>,
    data: Option<BlockData>,
    formats: LineFormats,
}

/// Read-only view handed to the engine while a line is classified.
struct Lines<'a> {
    buffer: &'a TextBuffer,
    records: &'a [LineRecord],
}

impl LineSource for Lines<'_> {
    fn line_count(&self) -> usize {
        self.records.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.buffer.line_text(line).ok()
    }

    fn exit_state(&self, line: usize) -> Option<BlockState> {
        self.records.get(line).and_then(|record| record.state)
    }

    fn block_data(&self, line: usize) -> Option<&BlockData> {
        self.records.get(line).and_then(|record| record.data.as_ref())
    }
}

/// Where a bracket's partner is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketMatch {
    pub line: usize,
    /// Byte offset within the line
    pub position: usize,
}

/// A document plus the per-line classification the highlighter maintains for it.
pub struct HighlightedDocument {
    buffer: TextBuffer,
    highlighter: Highlighter,
    records: Vec<LineRecord>,
    /// Lines classified since creation
    classified: usize,
}

impl HighlightedDocument {
    /// Creates a document from text and highlights all of it.
    pub fn new(text: &str, language: Language, options: HighlightOptions) -> CoreResult<Self> {
        Self::from_buffer(TextBuffer::from(text), language, options)
    }

    /// Opens a file. `language` overrides the config's choice for the file's path.
    pub fn open(
        path: impl AsRef<Path>,
        config: &Config,
        language: Option<Language>,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let language = language.unwrap_or_else(|| config.language_for(path));
        tracing::info!("Opening {} as {}", path.display(), language);
        let buffer = TextBuffer::from_file(path)?;
        Self::from_buffer(buffer, language, config.highlight.clone())
    }

    fn from_buffer(
        buffer: TextBuffer,
        language: Language,
        options: HighlightOptions,
    ) -> CoreResult<Self> {
        let highlighter = Highlighter::new(language, options)?;
        let mut doc = Self {
            records: vec![LineRecord::default(); buffer.line_count()],
            buffer,
            highlighter,
            classified: 0,
        };
        doc.rehighlight();
        Ok(doc)
    }

    // ==================== Getters ====================

    pub fn language(&self) -> Language {
        self.highlighter.language()
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn format_registry(&self) -> FormatRegistry {
        self.highlighter.format_registry()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    pub fn line_count(&self) -> usize {
        self.records.len()
    }

    pub fn line_text(&self, line: usize) -> CoreResult<Cow<'_, str>> {
        Ok(self.buffer.line_text(line)?)
    }

    /// The exit state of `line`.
    pub fn state(&self, line: usize) -> Option<BlockState> {
        self.records.get(line).and_then(|record| record.state)
    }

    pub fn block_data(&self, line: usize) -> Option<&BlockData> {
        self.records.get(line).and_then(|record| record.data.as_ref())
    }

    pub fn formats(&self, line: usize) -> Option<&LineFormats> {
        self.records.get(line).map(|record| &record.formats)
    }

    /// The coalesced spans of `line`; empty past the end of the document.
    pub fn spans(&self, line: usize) -> Vec<FormatSpan> {
        self.formats(line).map(LineFormats::spans).unwrap_or_default()
    }

    /// Total number of single-line classifications run so far.
    pub fn lines_classified(&self) -> usize {
        self.classified
    }

    // ==================== Editing ====================

    pub fn insert(&mut self, pos: Position, text: &str) -> CoreResult<LineEdit> {
        let edit = self.buffer.insert(pos, text)?;
        self.apply_edit(edit);
        Ok(edit)
    }

    pub fn delete(&mut self, start: Position, end: Position) -> CoreResult<LineEdit> {
        let edit = self.buffer.delete(start, end)?;
        self.apply_edit(edit);
        Ok(edit)
    }

    pub fn replace(&mut self, start: Position, end: Position, text: &str) -> CoreResult<LineEdit> {
        let edit = self.buffer.replace(start, end, text)?;
        self.apply_edit(edit);
        Ok(edit)
    }

    /// Replaces the text of one line.
    pub fn set_line(&mut self, line: usize, text: &str) -> CoreResult<LineEdit> {
        let edit = self.buffer.set_line(line, text)?;
        self.apply_edit(edit);
        Ok(edit)
    }

    /// Brings the records in line with an edit the buffer already made, then
    /// re-classifies.
    ///
    /// Records of lines edited in place are kept so the engine can compare against what
    /// they said before. Only the surplus is dropped or padded with blank records.
    fn apply_edit(&mut self, edit: LineEdit) {
        // Requests name lines by index; after an edit they may point at the wrong line.
        let stale = self.highlighter.drain_requests();
        if !stale.is_empty() {
            tracing::trace!("Dropped {} stale reclassify requests", stale.len());
        }

        let at = edit.first + edit.removed.min(edit.inserted);
        if edit.removed > edit.inserted {
            let end = (at + edit.removed - edit.inserted).min(self.records.len());
            self.records.drain(at.min(end)..end);
        } else {
            let fresh = std::iter::repeat_n(LineRecord::default(), edit.inserted - edit.removed);
            let at = at.min(self.records.len());
            self.records.splice(at..at, fresh);
        }
        debug_assert_eq!(self.records.len(), self.buffer.line_count());

        tracing::debug!(
            "Edit at line {}: {} lines replaced by {}",
            edit.first,
            edit.removed,
            edit.inserted
        );
        // The first line after the edit has a new predecessor, so it always runs too.
        self.cascade(edit.first, edit.first + edit.inserted);
        self.service_requests();
    }

    // ==================== Highlighting ====================

    /// Classifies every line again, top to bottom.
    pub fn rehighlight(&mut self) {
        let last = self.records.len().saturating_sub(1);
        self.cascade(0, last);
        self.service_requests();
    }

    /// Limits the keyword/number pass to `window` and refreshes the lines whose
    /// treatment changed.
    pub fn set_main_window(&mut self, window: Option<Range<usize>>) {
        let len = self.records.len();
        let before = self.highlighter.main_window().cloned().unwrap_or(0..len);
        let after = window.clone().unwrap_or(0..len);
        self.highlighter.set_main_window(window);

        let touched = before.start.min(after.start)..before.end.max(after.end).min(len);
        for line in touched {
            if before.contains(&line) != after.contains(&line) {
                self.classify(line);
            }
        }
        self.service_requests();
    }

    /// Classifies `line` and stores the result. Returns whether its exit state changed.
    fn classify(&mut self, line: usize) -> bool {
        if line >= self.records.len() {
            return false;
        }
        let lines = Lines {
            buffer: &self.buffer,
            records: &self.records,
        };
        let result = self.highlighter.classify_line(&lines, line);
        self.classified += 1;

        for watched in &result.watch {
            if let Some(data) = self
                .records
                .get_mut(*watched)
                .and_then(|record| record.data.as_mut())
            {
                data.watched = true;
            }
        }

        let record = &mut self.records[line];
        let changed = record.state != Some(result.state);
        *record = LineRecord {
            state: Some(result.state),
            data: Some(result.data),
            formats: result.formats,
        };
        changed
    }

    /// Classifies `from..=through`, then keeps going while exit states change.
    fn cascade(&mut self, from: usize, through: usize) {
        let mut line = from;
        while line < self.records.len() {
            let changed = self.classify(line);
            if line >= through && !changed {
                break;
            }
            line += 1;
        }
    }

    /// Runs the highlighter's deferred requests until none are left.
    fn service_requests(&mut self) {
        // A request can cause more requests; stop a runaway chain.
        let mut budget = self.records.len().saturating_mul(4).max(64);
        while let Some(line) = self.highlighter.pop_request() {
            if budget == 0 {
                let dropped = self.highlighter.drain_requests().len() + 1;
                tracing::warn!("Reclassification did not settle, dropping {} requests", dropped);
                return;
            }
            budget -= 1;
            if line < self.records.len() {
                self.cascade(line, line);
            }
        }
    }

    // ==================== Brackets ====================

    /// The bracket pairing with the one at byte `offset` of `line`.
    ///
    /// Brackets inside comments and strings were never recorded, so they neither match
    /// nor get in the way.
    pub fn matching_bracket(&self, line: usize, offset: usize) -> Option<BracketMatch> {
        let bracket = self.block_data(line)?.bracket_at(offset)?;
        let mut depth = 0usize;

        if bracket.is_opening() {
            for current in line..self.records.len() {
                let infos = self.brackets_on(current, bracket.character);
                let after = infos
                    .iter()
                    .filter(|info| current != line || info.position > offset);
                if let Some(position) = walk(after, bracket.character, &mut depth) {
                    return Some(BracketMatch {
                        line: current,
                        position,
                    });
                }
            }
        } else {
            for current in (0..=line).rev() {
                let infos = self.brackets_on(current, bracket.character);
                let before = infos
                    .iter()
                    .rev()
                    .filter(|info| current != line || info.position < offset);
                if let Some(position) = walk(before, bracket.character, &mut depth) {
                    return Some(BracketMatch {
                        line: current,
                        position,
                    });
                }
            }
        }
        None
    }

    fn brackets_on(&self, line: usize, character: char) -> &[BracketInfo] {
        self.block_data(line)
            .map(|data| data.brackets_for(character))
            .unwrap_or_default()
    }
}

/// Walks brackets of one kind away from a `start` bracket, tracking nesting in `depth`.
/// Returns the position of the partner if it's among `infos`.
fn walk<'a>(
    infos: impl Iterator<Item = &'a BracketInfo>,
    start: char,
    depth: &mut usize,
) -> Option<usize> {
    for info in infos {
        if info.character == start {
            *depth += 1;
        } else if *depth == 0 {
            return Some(info.position);
        } else {
            *depth -= 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_syntax::TokenKind;
    use proptest::prelude::*;

    fn doc(text: &str, language: Language) -> HighlightedDocument {
        HighlightedDocument::new(text, language, HighlightOptions::default()).unwrap()
    }

    fn kind_at(doc: &HighlightedDocument, line: usize, pos: usize) -> TokenKind {
        doc.formats(line).unwrap().at(pos)
    }

    #[test]
    fn test_highlights_on_creation() {
        let doc = doc("int x = 1; /* open\nstill\nclosed */ int y;", Language::C);
        assert_eq!(doc.line_count(), 3);
        assert!(matches!(doc.state(0), Some(BlockState::Comment { .. })));
        assert_eq!(kind_at(&doc, 1, 0), TokenKind::Comment);
        assert_eq!(doc.state(2), Some(BlockState::Neutral));
        assert_eq!(kind_at(&doc, 2, 10), TokenKind::Type);
    }

    #[test]
    fn test_opening_comment_cascades_down() {
        let mut doc = doc("a;\nb;\nc;", Language::C);
        doc.insert(Position::new(0, 0), "/* ").unwrap();
        for line in 0..3 {
            assert!(matches!(doc.state(line), Some(BlockState::Comment { .. })));
            assert_eq!(kind_at(&doc, line, 0), TokenKind::Comment);
        }

        doc.delete(Position::new(0, 0), Position::new(0, 3)).unwrap();
        for line in 0..3 {
            assert_eq!(doc.state(line), Some(BlockState::Neutral));
        }
    }

    #[test]
    fn test_edit_without_state_change_stays_local() {
        let text = (0..200).map(|i| format!("int v{i} = {i};")).collect::<Vec<_>>().join("\n");
        let mut doc = doc(&text, Language::C);
        let before = doc.lines_classified();

        doc.set_line(100, "int changed = 7;").unwrap();
        // the edited line and the one after it
        assert_eq!(doc.lines_classified() - before, 2);
        assert_eq!(kind_at(&doc, 100, 0), TokenKind::Type);
    }

    #[test]
    fn test_line_insertion_and_removal_keep_records_aligned() {
        let mut doc = doc("x = 1\ny = 2", Language::Python);
        doc.insert(Position::new(0, 5), "\n'''doc\nmore'''").unwrap();
        assert_eq!(doc.line_count(), 4);
        assert!(matches!(doc.state(1), Some(BlockState::DocString(_))));
        assert_eq!(doc.state(2), Some(BlockState::Neutral));

        doc.delete(Position::new(0, 5), Position::new(2, 7)).unwrap();
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1).unwrap(), "y = 2");
        assert_eq!(doc.state(1), Some(BlockState::Neutral));
    }

    #[test]
    fn test_heredoc_delimiter_edit() {
        let mut doc = doc("cat <<EOF\nbody\nEND\necho hi\nEOF", Language::Shell);
        assert!(matches!(doc.state(2), Some(BlockState::Heredoc { .. })));
        assert_eq!(doc.state(4), Some(BlockState::Neutral));

        // the heredoc now closes on line 2 instead
        doc.set_line(0, "cat <<END").unwrap();
        assert_eq!(doc.state(2), Some(BlockState::Neutral));
        assert_eq!(doc.state(3), Some(BlockState::Neutral));
        assert_ne!(kind_at(&doc, 3, 0), TokenKind::Heredoc);
    }

    #[test]
    fn test_setext_underline_updates_previous_line() {
        let mut doc = doc("Title\nplain", Language::Markdown);
        assert_ne!(kind_at(&doc, 0, 0), TokenKind::Heading);

        doc.set_line(1, "=====").unwrap();
        assert_eq!(kind_at(&doc, 0, 0), TokenKind::Heading);

        doc.set_line(1, "plain").unwrap();
        assert_ne!(kind_at(&doc, 0, 0), TokenKind::Heading);
    }

    #[test]
    fn test_regex_lookback_follows_edit() {
        let mut doc = doc("x = y\n\n/re/.test(s)", Language::JavaScript);
        assert_ne!(kind_at(&doc, 2, 0), TokenKind::Regex);

        doc.set_line(0, "return").unwrap();
        assert_eq!(kind_at(&doc, 2, 0), TokenKind::Regex);
        assert!(doc.highlighter().queue().is_empty());
    }

    #[test]
    fn test_matching_bracket_across_lines() {
        let doc = doc("fn f() {\n    // }\n    let s = \"}\";\n}", Language::Rust);
        let close = doc.matching_bracket(0, 7).unwrap();
        assert_eq!(close, BracketMatch { line: 3, position: 0 });
        let open = doc.matching_bracket(3, 0).unwrap();
        assert_eq!(open, BracketMatch { line: 0, position: 7 });

        assert_eq!(
            doc.matching_bracket(0, 4),
            Some(BracketMatch { line: 0, position: 5 })
        );
        // not a bracket
        assert_eq!(doc.matching_bracket(0, 0), None);
    }

    #[test]
    fn test_unbalanced_bracket_has_no_match() {
        let doc = doc("call(a, (b)", Language::C);
        assert_eq!(doc.matching_bracket(0, 4), None);
        assert_eq!(
            doc.matching_bracket(0, 8),
            Some(BracketMatch { line: 0, position: 10 })
        );
    }

    #[test]
    fn test_main_window_toggles_keywords() {
        let mut doc = doc("return 1;\nreturn 2;\nreturn 3;", Language::C);
        doc.set_main_window(Some(1..2));
        assert_eq!(kind_at(&doc, 0, 0), TokenKind::Main);
        assert_eq!(kind_at(&doc, 1, 0), TokenKind::Keyword);
        assert_eq!(kind_at(&doc, 2, 0), TokenKind::Main);

        doc.set_main_window(None);
        assert_eq!(kind_at(&doc, 0, 0), TokenKind::Keyword);
        assert_eq!(kind_at(&doc, 2, 0), TokenKind::Keyword);
    }

    #[test]
    fn test_open_uses_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.inc");
        std::fs::write(&path, "{ note }\nbegin end").unwrap();

        let mut config = Config::default();
        let plain = HighlightedDocument::open(&path, &config, None).unwrap();
        assert_eq!(plain.language(), Language::Plain);

        config.languages.insert("inc".to_string(), Language::Pascal);
        let pascal = HighlightedDocument::open(&path, &config, None).unwrap();
        assert_eq!(pascal.language(), Language::Pascal);
        assert_eq!(kind_at(&pascal, 0, 2), TokenKind::Comment);

        let forced = HighlightedDocument::open(&path, &config, Some(Language::C)).unwrap();
        assert_eq!(forced.language(), Language::C);

        assert!(HighlightedDocument::open(dir.path().join("missing.c"), &config, None).is_err());
    }

    fn snapshot(doc: &HighlightedDocument) -> Vec<(Option<BlockState>, LineFormats)> {
        (0..doc.line_count())
            .map(|line| (doc.state(line), doc.formats(line).cloned().unwrap_or_default()))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_rehighlight_is_idempotent(text in "[a-z /*\"'\\\\(){}\n]{0,80}") {
            let mut doc = doc(&text, Language::Cpp);
            let first = snapshot(&doc);
            doc.rehighlight();
            prop_assert_eq!(first, snapshot(&doc));
        }

        #[test]
        fn prop_incremental_matches_fresh(
            text in "[a-z /*\"\\\\\n]{0,60}",
            edits in proptest::collection::vec(("[a-z /*\"\n]{0,6}", 0usize..64, 0usize..64), 1..6),
        ) {
            let mut doc = doc(&text, Language::C);
            for (insert, line_pick, column_pick) in edits {
                let line = line_pick % doc.line_count();
                let column = column_pick % (doc.buffer().line_len(line).unwrap() + 1);
                doc.insert(Position::new(line, column), &insert).unwrap();
            }
            let fresh = self::doc(&doc.text(), Language::C);
            prop_assert_eq!(snapshot(&doc), snapshot(&fresh));
        }
    }
}
