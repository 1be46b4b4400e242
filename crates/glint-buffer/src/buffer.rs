//! Rope-backed text storage.
//!
//! ## Learning: Borrow, Then Mutate
//!
//! ```rust,ignore
//! let line = buffer.line_text(0)?;  // borrows the rope
//! // buffer.insert(pos, "x")?;      // ERROR: still borrowed
//! let owned = line.into_owned();    // end the borrow
//! buffer.insert(pos, "x")?;         // fine
//! ```

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::{BufferError, BufferResult, Position};

/// Characters ropey treats as line breaks. A line's text never includes them.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Which lines an edit replaced.
///
/// Lines `first..first + removed` of the old text became lines
/// `first..first + inserted` of the new text. Lines after that only moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    pub first: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl LineEdit {
    /// The new lines produced by the edit.
    pub fn new_lines(&self) -> Range<usize> {
        self.first..self.first + self.inserted
    }

    /// How far later lines moved (negative when lines were joined).
    pub fn line_delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }
}

/// A text buffer backed by a rope.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    file_path: Option<PathBuf>,
}

impl TextBuffer {
    /// Creates an empty buffer. It still has one (empty) line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a buffer from a file.
    ///
    /// # Learning: Error Handling with `?`
    ///
    /// `read_to_string` returns `io::Error`; `?` converts it through the
    /// `#[from]` attribute on [`BufferError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            rope: Rope::from_str(&content),
            file_path: Some(path.to_path_buf()),
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    // ==================== Text Access ====================

    /// The whole text.
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// The text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> BufferResult<Cow<'_, str>> {
        self.check_line(line)?;
        let text: Cow<'_, str> = self.rope.line(line).into();
        let trimmed = text.trim_end_matches(is_line_break).len();
        Ok(match text {
            Cow::Borrowed(s) => Cow::Borrowed(&s[..trimmed]),
            Cow::Owned(mut s) => {
                s.truncate(trimmed);
                Cow::Owned(s)
            }
        })
    }

    /// Every line's text, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        (0..self.line_count()).filter_map(|line| self.line_text(line).ok())
    }

    // ==================== Measurements ====================

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Number of lines. A trailing line break starts one more (empty) line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of `line` in characters, without its line break.
    pub fn line_len(&self, line: usize) -> BufferResult<usize> {
        Ok(self.line_text(line)?.chars().count())
    }

    // ==================== Mutations ====================

    /// Inserts `text` at `pos`.
    pub fn insert(&mut self, pos: Position, text: &str) -> BufferResult<LineEdit> {
        self.replace(pos, pos, text)
    }

    /// Deletes the text between `start` and `end`.
    pub fn delete(&mut self, start: Position, end: Position) -> BufferResult<LineEdit> {
        self.replace(start, end, "")
    }

    /// Replaces the text between `start` and `end` with `text`.
    ///
    /// The range may span lines; `end` is exclusive.
    pub fn replace(&mut self, start: Position, end: Position, text: &str) -> BufferResult<LineEdit> {
        if end < start {
            return Err(BufferError::InvalidRange { start, end });
        }
        let from = self.position_to_char_idx(start)?;
        let to = self.position_to_char_idx(end)?;

        let before = self.rope.len_lines();
        self.rope.remove(from..to);
        self.rope.insert(from, text);
        let after = self.rope.len_lines();

        let removed = end.line - start.line + 1;
        Ok(LineEdit {
            first: start.line,
            removed,
            inserted: (removed + after).saturating_sub(before),
        })
    }

    /// Replaces one whole line's text, keeping its line break.
    pub fn set_line(&mut self, line: usize, text: &str) -> BufferResult<LineEdit> {
        let len = self.line_len(line)?;
        self.replace(Position::new(line, 0), Position::new(line, len), text)
    }

    // ==================== Position Conversion ====================

    /// Converts a position to a character index. The column may point at the line break
    /// (one past the last character) but not beyond it.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        let out_of_bounds = BufferError::PositionOutOfBounds {
            line: pos.line,
            column: pos.column,
        };
        if pos.line >= self.line_count() {
            return Err(out_of_bounds);
        }
        if pos.column > self.line_len(pos.line)? {
            return Err(out_of_bounds);
        }
        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.rope.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        let line = self.rope.char_to_line(char_idx);
        Ok(Position::new(line, char_idx - self.rope.line_to_char(line)))
    }

    fn check_line(&self, line: usize) -> BufferResult<()> {
        let len = self.rope.len_lines();
        if line >= len {
            return Err(BufferError::LineOutOfBounds { line, len });
        }
        Ok(())
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            file_path: None,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_text_strips_breaks() {
        let buffer = TextBuffer::from("a\r\nbc\nd");
        assert_eq!(buffer.line_text(0).unwrap(), "a");
        assert_eq!(buffer.line_text(1).unwrap(), "bc");
        assert_eq!(buffer.line_text(2).unwrap(), "d");
        assert!(matches!(
            buffer.line_text(3),
            Err(BufferError::LineOutOfBounds { line: 3, len: 3 })
        ));
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let buffer = TextBuffer::from("x\n");
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.line_text(1).unwrap(), "");
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["x", ""]);
    }

    #[test]
    fn test_insert_within_line() {
        let mut buffer = TextBuffer::from("hello\nworld");
        let edit = buffer.insert(Position::new(1, 0), "big ").unwrap();
        assert_eq!(
            edit,
            LineEdit {
                first: 1,
                removed: 1,
                inserted: 1
            }
        );
        assert_eq!(buffer.text(), "hello\nbig world");
    }

    #[test]
    fn test_insert_newlines_reports_growth() {
        let mut buffer = TextBuffer::from("ab");
        let edit = buffer.insert(Position::new(0, 1), "\nx\n").unwrap();
        assert_eq!(edit.new_lines(), 0..3);
        assert_eq!(edit.line_delta(), 2);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["a", "x", "b"]);
    }

    #[test]
    fn test_delete_across_lines() {
        let mut buffer = TextBuffer::from("one\ntwo\nthree\nfour");
        let edit = buffer.delete(Position::new(0, 2), Position::new(2, 1)).unwrap();
        assert_eq!(edit.first, 0);
        assert_eq!(edit.removed, 3);
        assert_eq!(edit.inserted, 1);
        assert_eq!(buffer.text(), "onhree\nfour");
    }

    #[test]
    fn test_set_line_keeps_break() {
        let mut buffer = TextBuffer::from("a\nb\nc");
        buffer.set_line(1, "/* b */").unwrap();
        assert_eq!(buffer.text(), "a\n/* b */\nc");
    }

    #[test]
    fn test_invalid_positions() {
        let mut buffer = TextBuffer::from("ab\ncd");
        assert!(buffer.insert(Position::new(0, 3), "x").is_err());
        assert!(buffer.insert(Position::new(2, 0), "x").is_err());
        assert!(matches!(
            buffer.delete(Position::new(1, 0), Position::new(0, 0)),
            Err(BufferError::InvalidRange { .. })
        ));
        assert_eq!(buffer.text(), "ab\ncd");
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("héllo\nwörld");
        let idx = buffer.position_to_char_idx(Position::new(1, 2)).unwrap();
        assert_eq!(idx, 8);
        assert_eq!(buffer.char_idx_to_position(idx).unwrap(), Position::new(1, 2));
        assert!(buffer.char_idx_to_position(100).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "first\nsecond").unwrap();

        let buffer = TextBuffer::from_file(&path).unwrap();
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.file_path(), Some(path.as_path()));

        drop(dir);
        assert!(matches!(TextBuffer::from_file(&path), Err(BufferError::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_line_edit_matches_line_count(
            text in "[a-c\n]{0,24}",
            insert in "[x\n]{0,6}",
            line_pick in 0usize..8,
            column_pick in 0usize..8,
        ) {
            let mut buffer = TextBuffer::from(text.as_str());
            let line = line_pick % buffer.line_count();
            let column = column_pick % (buffer.line_len(line).unwrap() + 1);
            let before = buffer.line_count();

            let edit = buffer.insert(Position::new(line, column), &insert).unwrap();
            prop_assert_eq!(edit.first, line);
            prop_assert_eq!(
                buffer.line_count() as isize,
                before as isize + edit.line_delta()
            );
        }
    }
}
