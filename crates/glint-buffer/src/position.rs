//! Line/column coordinates.
//!
//! ## Learning: Derived Ordering
//!
//! `#[derive(PartialOrd, Ord)]` compares fields in declaration order, so declaring
//! `line` before `column` gives document order for free.

use std::fmt;

/// A place in the buffer. Both fields are 0-based; `column` counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const ZERO: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based for people
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}
