//! Auxiliary per-line record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::state::{BlockState, DelimiterId};

/// One bracket occurrence on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketInfo {
    pub character: char,
    /// Byte offset within the line
    pub position: usize,
}

impl BracketInfo {
    pub fn is_opening(&self) -> bool {
        matches!(self.character, '(' | '{' | '[')
    }

    /// The character that pairs with this one.
    pub fn partner(&self) -> char {
        match self.character {
            '(' => ')',
            ')' => '(',
            '{' => '}',
            '}' => '{',
            '[' => ']',
            ']' => '[',
            other => other,
        }
    }
}

/// A heredoc whose opener shared a line with an earlier one. Its body starts when the
/// body before it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedHeredoc {
    pub delimiter: DelimiterId,
    pub expand: bool,
    pub indented: bool,
}

/// Everything a line records about itself beyond its exit state.
///
/// Rebuilt from scratch on every classification; nothing is patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub parentheses: Vec<BracketInfo>,
    pub braces: Vec<BracketInfo>,
    pub brackets: Vec<BracketInfo>,

    /// Depth of unterminated nested constructs carried out of the line
    /// (command substitutions, raw-string hash count).
    pub open_nests: u16,

    /// Nesting depths that are inside a double quote. Never exceeds `open_nests`.
    pub open_quotes: BTreeSet<u16>,

    /// Command substitutions still open inside a heredoc body. Kept apart from
    /// `open_nests`, which holds the depth the heredoc itself was opened at.
    pub body_nests: u16,

    /// Body substitution levels that are inside a double quote.
    pub body_quotes: BTreeSet<u16>,

    /// Heredocs waiting for the current body to end, in opener order.
    pub queued_heredocs: Vec<QueuedHeredoc>,

    /// Per-language flag: line ended inside a backquote, setext underline, ...
    pub property: bool,

    /// Per-language text: heredoc delimiter, raw-string delimiter, fence marker,
    /// pending LaTeX environment.
    pub label: String,

    /// The exit state this line had before the pass that produced this record.
    pub last_state: Option<BlockState>,

    /// False when the line was too long to classify.
    pub highlighted: bool,

    /// A later line looked back at this one; edits here must re-trigger the next line.
    pub watched: bool,

    /// Last token outside comments: an identifier, a number or one punctuation character.
    pub tail: String,
}

/// The part of [`BlockData`] a following line resumes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resumable<'a> {
    pub open_nests: u16,
    pub open_quotes: &'a BTreeSet<u16>,
    pub body_nests: u16,
    pub body_quotes: &'a BTreeSet<u16>,
    pub queued_heredocs: &'a [QueuedHeredoc],
    pub property: bool,
    pub label: &'a str,
}

impl BlockData {
    pub fn new() -> Self {
        Self {
            highlighted: true,
            ..Self::default()
        }
    }

    pub fn resumable(&self) -> Resumable<'_> {
        Resumable {
            open_nests: self.open_nests,
            open_quotes: &self.open_quotes,
            body_nests: self.body_nests,
            body_quotes: &self.body_quotes,
            queued_heredocs: &self.queued_heredocs,
            property: self.property,
            label: &self.label,
        }
    }

    /// Copies everything a following line resumes from.
    pub fn inherit(&mut self, other: &BlockData) {
        self.open_nests = other.open_nests;
        self.open_quotes = other.open_quotes.clone();
        self.body_nests = other.body_nests;
        self.body_quotes = other.body_quotes.clone();
        self.queued_heredocs = other.queued_heredocs.clone();
        self.property = other.property;
        self.label = other.label.clone();
    }

    /// Sets the nesting depth, dropping quote flags for levels that no longer exist.
    pub fn set_nests(&mut self, depth: u16) {
        self.open_nests = depth;
        self.open_quotes.retain(|level| *level <= depth);
    }

    /// Marks `level` as inside a double quote. Ignored above the current depth.
    pub fn set_quote_open(&mut self, level: u16, open: bool) {
        if open && level <= self.open_nests {
            self.open_quotes.insert(level);
        } else {
            self.open_quotes.remove(&level);
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.open_quotes
            .last()
            .is_none_or(|deepest| *deepest <= self.open_nests)
    }

    /// Records a bracket in the list for its kind. Other characters are ignored.
    pub fn insert_bracket(&mut self, character: char, position: usize) {
        let info = BracketInfo {
            character,
            position,
        };
        match character {
            '(' | ')' => self.parentheses.push(info),
            '{' | '}' => self.braces.push(info),
            '[' | ']' => self.brackets.push(info),
            _ => {}
        }
    }

    /// The list a bracket character is recorded in.
    pub fn brackets_for(&self, character: char) -> &[BracketInfo] {
        match character {
            '(' | ')' => &self.parentheses,
            '{' | '}' => &self.braces,
            '[' | ']' => &self.brackets,
            _ => &[],
        }
    }

    /// The bracket recorded at `position`, if any.
    pub fn bracket_at(&self, position: usize) -> Option<BracketInfo> {
        self.parentheses
            .iter()
            .chain(&self.braces)
            .chain(&self.brackets)
            .find(|info| info.position == position)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nests_trim_quotes() {
        let mut data = BlockData::new();
        data.set_nests(3);
        data.set_quote_open(2, true);
        data.set_quote_open(3, true);
        data.set_quote_open(5, true);
        assert_eq!(data.open_quotes.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        data.set_nests(2);
        assert!(data.is_consistent());
        assert_eq!(data.open_quotes.len(), 1);
    }

    #[test]
    fn test_bracket_lists() {
        let mut data = BlockData::new();
        data.insert_bracket('(', 0);
        data.insert_bracket('}', 4);
        data.insert_bracket('x', 5);
        assert_eq!(data.parentheses.len(), 1);
        assert_eq!(data.braces.len(), 1);
        assert!(data.brackets.is_empty());
        let found = data.bracket_at(4).unwrap();
        assert_eq!(found.partner(), '{');
        assert!(!found.is_opening());
    }

    #[test]
    fn test_resumable_ignores_brackets() {
        let mut a = BlockData::new();
        let mut b = BlockData::new();
        a.insert_bracket('(', 1);
        b.tail = "x".to_string();
        assert_eq!(a.resumable(), b.resumable());
        b.property = true;
        assert_ne!(a.resumable(), b.resumable());
    }

    #[test]
    fn test_body_nesting_is_resumable() {
        let mut a = BlockData::new();
        let b = BlockData::new();
        a.body_nests = 1;
        assert_ne!(a.resumable(), b.resumable());

        let mut c = BlockData::new();
        c.inherit(&a);
        assert_eq!(c.resumable(), a.resumable());
    }
}
