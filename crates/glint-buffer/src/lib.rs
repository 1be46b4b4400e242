//! # Glint Buffer
//!
//! The text store behind a highlighted document.
//!
//! ## Why a Rope?
//!
//! A highlighter works line by line, and an edit usually touches one or two lines in the
//! middle of a long file. A rope gives O(log n) line lookup and O(log n) splicing, so
//! neither re-reading a line nor inserting a character costs a full copy of the text.
//!
//! ## Line Edits
//!
//! Every mutating call returns a [`LineEdit`] saying which lines went away and how many
//! took their place. The host uses it to splice its per-line records (exit state,
//! block data, formats) in step with the text, then re-classifies from the first
//! affected line.
//!
//! ## Key Concepts for Learning Rust
//!
//! - `Cow<str>`: borrow when the rope chunk is contiguous, allocate only when it isn't
//! - `thiserror`: derive `Error` and `Display` for an error enum
//! - `#[from]`: turn `?` on an `io::Error` into a `BufferError` automatically

mod buffer;
mod position;

pub use buffer::{LineEdit, TextBuffer};
pub use position::Position;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position out of bounds: line {line}, column {column}")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Line out of bounds: {line} (buffer has {len} lines)")]
    LineOutOfBounds { line: usize, len: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range: {start}..{end}")]
    InvalidRange { start: Position, end: Position },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 1);
    }

    #[test]
    fn test_buffer_from_str() {
        let buffer = TextBuffer::from("fn main() {\n    1\n}");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_text(1).unwrap(), "    1");
    }

    #[test]
    fn test_error_messages() {
        let err = BufferError::LineOutOfBounds { line: 9, len: 3 };
        assert_eq!(err.to_string(), "Line out of bounds: 9 (buffer has 3 lines)");
    }
}
