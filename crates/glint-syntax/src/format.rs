//! Token kinds, per-line formatting output and the format registry.
//!
//! Classification writes a [`TokenKind`] for every byte of a line into [`LineFormats`].
//! Later matchers overwrite earlier ones; what is left at the end of the pass is
//! authoritative. [`FormatRegistry`] turns kinds into display [`Style`]s.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

use crate::options::{HighlightOptions, SyntaxRole};

/// Semantic category of a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Plain text
    #[default]
    Main,
    /// Explicitly unformatted
    Neutral,
    Keyword,
    Type,
    Function,
    BuiltIn,
    Number,
    Operator,
    Variable,
    Constant,
    Comment,
    /// URL or e-mail address inside a comment
    CommentUrl,
    /// NOTE/TODO/FIXME/WARNING inside a comment
    Note,
    /// Double-quoted string
    String,
    /// Single-quoted or otherwise alternative string
    AltString,
    /// URL or e-mail address inside a string
    StringUrl,
    Regex,
    /// Raw string literals, CDATA, bracket arguments
    RawLiteral,
    /// Heredoc body
    Heredoc,
    /// Heredoc opener and terminator
    HeredocDelimiter,
    /// `$(` and `)` of a shell command substitution
    CommandSub,
    Whitespace,
    Error,
    /// Line too long to be classified
    LongLine,
    Heading,
    Emphasis,
    Strong,
    /// Code spans and fenced or verbatim blocks
    Code,
    Link,
    Tag,
    Attribute,
    Math,
    Inserted,
    Deleted,
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::CommentUrl | TokenKind::Note)
    }

    pub fn is_quote(self) -> bool {
        matches!(
            self,
            TokenKind::String | TokenKind::AltString | TokenKind::StringUrl
        )
    }

    /// Spans that generic token rules and bracket bookkeeping must leave alone.
    pub fn is_shielded(self) -> bool {
        self.is_comment()
            || self.is_quote()
            || matches!(
                self,
                TokenKind::Regex
                    | TokenKind::RawLiteral
                    | TokenKind::Heredoc
                    | TokenKind::HeredocDelimiter
                    | TokenKind::Code
                    | TokenKind::Math
                    | TokenKind::LongLine
            )
    }

    /// Whether nothing has claimed this position yet.
    pub fn is_plain(self) -> bool {
        matches!(self, TokenKind::Main | TokenKind::Neutral)
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Main => "main",
            TokenKind::Neutral => "neutral",
            TokenKind::Keyword => "keyword",
            TokenKind::Type => "type",
            TokenKind::Function => "function",
            TokenKind::BuiltIn => "built_in",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Variable => "variable",
            TokenKind::Constant => "constant",
            TokenKind::Comment => "comment",
            TokenKind::CommentUrl => "comment_url",
            TokenKind::Note => "note",
            TokenKind::String => "string",
            TokenKind::AltString => "alt_string",
            TokenKind::StringUrl => "string_url",
            TokenKind::Regex => "regex",
            TokenKind::RawLiteral => "raw_literal",
            TokenKind::Heredoc => "heredoc",
            TokenKind::HeredocDelimiter => "heredoc_delimiter",
            TokenKind::CommandSub => "command_sub",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Error => "error",
            TokenKind::LongLine => "long_line",
            TokenKind::Heading => "heading",
            TokenKind::Emphasis => "emphasis",
            TokenKind::Strong => "strong",
            TokenKind::Code => "code",
            TokenKind::Link => "link",
            TokenKind::Tag => "tag",
            TokenKind::Attribute => "attribute",
            TokenKind::Math => "math",
            TokenKind::Inserted => "inserted",
            TokenKind::Deleted => "deleted",
        }
    }
}

/// A run of bytes sharing one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatSpan {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

/// The per-offset classification of one line.
///
/// Offsets are byte offsets into the line text. Every byte has exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineFormats {
    kinds: Vec<TokenKind>,
}

impl LineFormats {
    /// Creates formats for a line of `len` bytes, all set to `fill`.
    pub fn new(len: usize, fill: TokenKind) -> Self {
        Self {
            kinds: vec![fill; len],
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The kind at `pos`; positions past the end read as `Neutral`.
    pub fn at(&self, pos: usize) -> TokenKind {
        self.kinds.get(pos).copied().unwrap_or(TokenKind::Neutral)
    }

    /// Applies `kind` to `range`, clamped to the line.
    pub fn set(&mut self, range: Range<usize>, kind: TokenKind) {
        let end = range.end.min(self.kinds.len());
        if range.start >= end {
            return;
        }
        self.kinds[range.start..end].fill(kind);
    }

    /// Whether any byte in `range` satisfies `pred`.
    pub fn any_in(&self, range: Range<usize>, pred: impl Fn(TokenKind) -> bool) -> bool {
        let end = range.end.min(self.kinds.len());
        range.start < end && self.kinds[range.start..end].iter().any(|k| pred(*k))
    }

    pub fn kinds(&self) -> &[TokenKind] {
        &self.kinds
    }

    /// Coalesces the per-byte kinds into spans covering the whole line.
    pub fn spans(&self) -> Vec<FormatSpan> {
        let mut spans: Vec<FormatSpan> = Vec::new();
        for (pos, kind) in self.kinds.iter().enumerate() {
            match spans.last_mut() {
                Some(last) if last.kind == *kind => last.range.end = pos + 1,
                _ => spans.push(FormatSpan {
                    range: pos..pos + 1,
                    kind: *kind,
                }),
            }
        }
        spans
    }
}

/// RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// How a token kind is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    const fn plain(color: Color) -> Self {
        Self {
            color,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Base palettes.
mod palette {
    use super::Color;
    use crate::options::SyntaxRole;

    pub const LIGHT_FOREGROUND: Color = Color::rgb(0x1e, 0x1e, 0x1e);
    pub const DARK_FOREGROUND: Color = Color::rgb(0xdc, 0xdc, 0xdc);

    pub fn light(role: SyntaxRole) -> Color {
        match role {
            SyntaxRole::Function => Color::rgb(0x00, 0x55, 0xaa),
            SyntaxRole::BuiltIn => Color::rgb(0x00, 0x7b, 0x7b),
            SyntaxRole::Comment => Color::rgb(0x6a, 0x73, 0x7d),
            SyntaxRole::Quote => Color::rgb(0x00, 0x7a, 0x00),
            SyntaxRole::Type => Color::rgb(0x80, 0x40, 0x00),
            SyntaxRole::Keyword => Color::rgb(0x00, 0x2b, 0xb8),
            SyntaxRole::Number => Color::rgb(0x96, 0x4b, 0x00),
            SyntaxRole::Regex => Color::rgb(0x8b, 0x00, 0x8b),
            SyntaxRole::Error => Color::rgb(0xc8, 0x00, 0x00),
            SyntaxRole::Markup => Color::rgb(0x00, 0x00, 0xcd),
            SyntaxRole::Literal => Color::rgb(0x8b, 0x45, 0x13),
        }
    }

    pub fn dark(role: SyntaxRole) -> Color {
        match role {
            SyntaxRole::Function => Color::rgb(0x8c, 0xbf, 0xe6),
            SyntaxRole::BuiltIn => Color::rgb(0x8c, 0xcc, 0xcc),
            SyntaxRole::Comment => Color::rgb(0x80, 0x8c, 0x8c),
            SyntaxRole::Quote => Color::rgb(0xb8, 0xd6, 0x8c),
            SyntaxRole::Type => Color::rgb(0xe6, 0xcc, 0x8c),
            SyntaxRole::Keyword => Color::rgb(0xdb, 0x8c, 0xc2),
            SyntaxRole::Number => Color::rgb(0xd1, 0xad, 0x8c),
            SyntaxRole::Regex => Color::rgb(0xcc, 0x99, 0xff),
            SyntaxRole::Error => Color::rgb(0xff, 0x6e, 0x6e),
            SyntaxRole::Markup => Color::rgb(0x99, 0xb3, 0xff),
            SyntaxRole::Literal => Color::rgb(0xe6, 0x99, 0x80),
        }
    }
}

/// Maps token kinds to display styles.
///
/// Built once from [`HighlightOptions`]. Lookups are plain table reads.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    foreground: Color,
    roles: HashMap<SyntaxRole, Color>,
    whitespace: Color,
    show_whitespace: bool,
    show_line_endings: bool,
}

impl FormatRegistry {
    pub fn new(options: &HighlightOptions) -> Self {
        let (foreground, base): (Color, fn(SyntaxRole) -> Color) = if options.dark_color_scheme {
            (palette::DARK_FOREGROUND, palette::dark)
        } else {
            (palette::LIGHT_FOREGROUND, palette::light)
        };

        let mut roles: HashMap<SyntaxRole, Color> =
            SyntaxRole::ALL.iter().map(|role| (*role, base(*role))).collect();
        for (role, hex) in &options.syntax_colors {
            match Color::from_hex(hex) {
                Some(color) => {
                    roles.insert(*role, color);
                }
                None => tracing::warn!("Ignoring invalid colour {:?} for role {}", hex, role.name()),
            }
        }

        Self {
            foreground,
            roles,
            whitespace: foreground.with_alpha(options.whitespace_opacity),
            show_whitespace: options.show_whitespace,
            show_line_endings: options.show_line_endings,
        }
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn role(&self, role: SyntaxRole) -> Color {
        self.roles.get(&role).copied().unwrap_or(self.foreground)
    }

    pub fn shows_whitespace(&self) -> bool {
        self.show_whitespace
    }

    /// Style for the line terminator glyph, if terminators are shown.
    pub fn line_ending_style(&self) -> Option<Style> {
        self.show_line_endings
            .then(|| Style::plain(self.whitespace))
    }

    /// Style for a token kind.
    pub fn style(&self, kind: TokenKind) -> Style {
        let role = |r| Style::plain(self.role(r));
        match kind {
            TokenKind::Main | TokenKind::Neutral => Style::plain(self.foreground),
            TokenKind::Keyword => role(SyntaxRole::Keyword).bold(),
            TokenKind::Operator => role(SyntaxRole::Keyword),
            TokenKind::Type => role(SyntaxRole::Type),
            TokenKind::Function => role(SyntaxRole::Function),
            TokenKind::BuiltIn => role(SyntaxRole::BuiltIn),
            TokenKind::Number | TokenKind::Constant => role(SyntaxRole::Number),
            TokenKind::Variable => role(SyntaxRole::Markup),
            TokenKind::Comment => role(SyntaxRole::Comment).italic(),
            TokenKind::CommentUrl => role(SyntaxRole::Comment).italic().underline(),
            TokenKind::Note => role(SyntaxRole::Comment).bold().italic(),
            TokenKind::String => role(SyntaxRole::Quote),
            TokenKind::AltString => role(SyntaxRole::Literal),
            TokenKind::StringUrl => role(SyntaxRole::Quote).underline(),
            TokenKind::Regex => role(SyntaxRole::Regex),
            TokenKind::RawLiteral | TokenKind::Heredoc | TokenKind::Code => {
                role(SyntaxRole::Literal)
            }
            TokenKind::HeredocDelimiter => role(SyntaxRole::Literal).bold(),
            TokenKind::CommandSub => role(SyntaxRole::BuiltIn).bold(),
            TokenKind::Whitespace => Style::plain(self.whitespace),
            TokenKind::Error => role(SyntaxRole::Error).underline(),
            TokenKind::LongLine => role(SyntaxRole::Comment).italic(),
            TokenKind::Heading => role(SyntaxRole::Markup).bold(),
            TokenKind::Emphasis => Style::plain(self.foreground).italic(),
            TokenKind::Strong => Style::plain(self.foreground).bold(),
            TokenKind::Link => role(SyntaxRole::Markup).underline(),
            TokenKind::Tag => role(SyntaxRole::Keyword),
            TokenKind::Attribute => role(SyntaxRole::Type),
            TokenKind::Math => role(SyntaxRole::Number),
            TokenKind::Inserted => role(SyntaxRole::Quote),
            TokenKind::Deleted => role(SyntaxRole::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_cover_line() {
        let mut formats = LineFormats::new(10, TokenKind::Main);
        formats.set(2..5, TokenKind::String);
        formats.set(8..20, TokenKind::Comment);
        let spans = formats.spans();
        assert_eq!(
            spans,
            vec![
                FormatSpan { range: 0..2, kind: TokenKind::Main },
                FormatSpan { range: 2..5, kind: TokenKind::String },
                FormatSpan { range: 5..8, kind: TokenKind::Main },
                FormatSpan { range: 8..10, kind: TokenKind::Comment },
            ]
        );
    }

    #[test]
    fn test_out_of_range_is_neutral() {
        let formats = LineFormats::new(3, TokenKind::Main);
        assert_eq!(formats.at(3), TokenKind::Neutral);
        assert!(!formats.any_in(5..9, |_| true));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("#ff800080").map(|c| c.a), Some(0x80));
        assert_eq!(Color::from_hex("ff8000"), None);
        assert_eq!(Color::from_hex("#ff80"), None);
        assert_eq!(Color::rgb(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_role_override() {
        let mut options = HighlightOptions::default();
        options
            .syntax_colors
            .insert(SyntaxRole::Comment, "#123456".to_string());
        options
            .syntax_colors
            .insert(SyntaxRole::Keyword, "bogus".to_string());
        let registry = FormatRegistry::new(&options);
        assert_eq!(registry.style(TokenKind::Comment).color, Color::rgb(0x12, 0x34, 0x56));
        assert_eq!(
            registry.role(SyntaxRole::Keyword),
            palette::light(SyntaxRole::Keyword)
        );
        assert!(registry.style(TokenKind::CommentUrl).underline);
    }

    #[test]
    fn test_dark_scheme_and_whitespace() {
        let options = HighlightOptions {
            dark_color_scheme: true,
            whitespace_opacity: 40,
            show_line_endings: true,
            ..Default::default()
        };
        let registry = FormatRegistry::new(&options);
        assert_eq!(registry.foreground(), palette::DARK_FOREGROUND);
        assert_eq!(registry.style(TokenKind::Whitespace).color.a, 40);
        assert!(registry.line_ending_style().is_some());
    }
}
