//! Display options.
//!
//! These only change how token kinds are painted (see [`FormatRegistry`](crate::FormatRegistry)).
//! The one exception is `max_line_length`, the cutoff beyond which a line isn't classified.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The built-in semantic colour roles that `syntax_colors` can override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxRole {
    Function,
    BuiltIn,
    Comment,
    Quote,
    Type,
    Keyword,
    Number,
    Regex,
    Error,
    Markup,
    Literal,
}

impl SyntaxRole {
    pub const ALL: [SyntaxRole; 11] = [
        SyntaxRole::Function,
        SyntaxRole::BuiltIn,
        SyntaxRole::Comment,
        SyntaxRole::Quote,
        SyntaxRole::Type,
        SyntaxRole::Keyword,
        SyntaxRole::Number,
        SyntaxRole::Regex,
        SyntaxRole::Error,
        SyntaxRole::Markup,
        SyntaxRole::Literal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SyntaxRole::Function => "function",
            SyntaxRole::BuiltIn => "built_in",
            SyntaxRole::Comment => "comment",
            SyntaxRole::Quote => "quote",
            SyntaxRole::Type => "type",
            SyntaxRole::Keyword => "keyword",
            SyntaxRole::Number => "number",
            SyntaxRole::Regex => "regex",
            SyntaxRole::Error => "error",
            SyntaxRole::Markup => "markup",
            SyntaxRole::Literal => "literal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }
}

/// Options for one highlighting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Render spaces and tabs with a faded colour
    pub show_whitespace: bool,

    /// Render paragraph/document terminators
    pub show_line_endings: bool,

    /// Pick the dark base palette
    pub dark_color_scheme: bool,

    /// Alpha of the faded whitespace colour (0-255)
    pub whitespace_opacity: u8,

    /// Role → `#rrggbb` overrides for the built-in palette
    pub syntax_colors: BTreeMap<SyntaxRole, String>,

    /// Lines longer than this (in bytes) get the long-line style instead of classification
    pub max_line_length: usize,

    /// Maximum number of pending reclassification requests
    pub reclassify_queue_capacity: usize,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            show_whitespace: false,
            show_line_endings: false,
            dark_color_scheme: false,
            whitespace_opacity: 110,
            syntax_colors: BTreeMap::new(),
            max_line_length: 10_000,
            reclassify_queue_capacity: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in SyntaxRole::ALL {
            assert_eq!(SyntaxRole::from_name(role.name()), Some(role));
        }
        assert_eq!(SyntaxRole::from_name("nope"), None);
    }

    #[test]
    fn test_defaults() {
        let options = HighlightOptions::default();
        assert!(!options.dark_color_scheme);
        assert_eq!(options.max_line_length, 10_000);
        assert!(options.syntax_colors.is_empty());
    }
}
