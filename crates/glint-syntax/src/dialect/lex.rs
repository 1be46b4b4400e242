//! Lexical rules per language.

use super::keywords;
use super::{
    BlockPair, Delim, Escapes, Language, LexRules, LiteralSyntax, Multiline, QuoteRule,
    RawSyntax,
};
use crate::format::TokenKind;
use crate::predicates::{is_escaped, is_word_byte, prev_non_space};
use crate::state::QuoteKind;

// ==================== Comment pairs ====================

const C_COMMENT: &[BlockPair] = &[BlockPair {
    open: Delim::Literal("/*"),
    close: Delim::Literal("*/"),
    kind: TokenKind::Comment,
}];

const MARKUP_COMMENT: &[BlockPair] = &[
    BlockPair {
        open: Delim::Literal("<!--"),
        close: Delim::Literal("-->"),
        kind: TokenKind::Comment,
    },
    BlockPair {
        open: Delim::Literal("<![CDATA["),
        close: Delim::Literal("]]>"),
        kind: TokenKind::RawLiteral,
    },
];

const HTML_COMMENT: &[BlockPair] = &[BlockPair {
    open: Delim::Literal("<!--"),
    close: Delim::Literal("-->"),
    kind: TokenKind::Comment,
}];

const PASCAL_COMMENT: &[BlockPair] = &[
    BlockPair {
        open: Delim::Literal("(*"),
        close: Delim::Literal("*)"),
        kind: TokenKind::Comment,
    },
    BlockPair {
        open: Delim::Literal("{"),
        close: Delim::Literal("}"),
        kind: TokenKind::Comment,
    },
];

const PERL_COMMENT: &[BlockPair] = &[
    BlockPair {
        open: Delim::LineStart("="),
        close: Delim::LineStart("=cut"),
        kind: TokenKind::Comment,
    },
    BlockPair {
        open: Delim::LineStart("__END__"),
        close: Delim::Never,
        kind: TokenKind::Comment,
    },
    BlockPair {
        open: Delim::LineStart("__DATA__"),
        close: Delim::Never,
        kind: TokenKind::Comment,
    },
];

const RUBY_COMMENT: &[BlockPair] = &[
    BlockPair {
        open: Delim::LineStart("=begin"),
        close: Delim::LineStart("=end"),
        kind: TokenKind::Comment,
    },
    BlockPair {
        open: Delim::LineStart("__END__"),
        close: Delim::Never,
        kind: TokenKind::Comment,
    },
];

// ==================== Quote sets ====================

const fn q(kind: QuoteKind, escapes: Escapes, multiline: Multiline) -> QuoteRule {
    QuoteRule::new(kind, escapes, multiline)
}

use Escapes::{Backslash, Doubled};
use Multiline::{Always, Continuation, Never};
use QuoteKind::{Backquote, Double, Single, TripleDouble, TripleSingle};

const C_QUOTES: &[QuoteRule] = &[
    q(Double, Backslash, Continuation),
    q(Single, Backslash, Continuation),
];
const RUST_QUOTES: &[QuoteRule] = &[q(Double, Backslash, Always), q(Single, Backslash, Never)];
const GO_QUOTES: &[QuoteRule] = &[
    q(Double, Backslash, Never),
    q(Single, Backslash, Never),
    q(Backquote, Escapes::None, Always),
];
const JS_QUOTES: &[QuoteRule] = &[
    q(Double, Backslash, Continuation),
    q(Single, Backslash, Continuation),
    q(Backquote, Backslash, Always),
];
const TRIPLE_QUOTES: &[QuoteRule] = &[
    q(TripleDouble, Backslash, Always),
    q(TripleSingle, Backslash, Always),
    q(Double, Backslash, Continuation),
    q(Single, Backslash, Continuation),
];
const SCRIPT_QUOTES: &[QuoteRule] = &[
    q(Double, Backslash, Always),
    q(Single, Backslash, Always),
    q(Backquote, Backslash, Always),
];
const SQL_QUOTES: &[QuoteRule] = &[q(Single, Doubled, Always), q(Double, Doubled, Never)];
const PASCAL_QUOTES: &[QuoteRule] = &[q(Single, Doubled, Never)];
const SIMPLE_QUOTES: &[QuoteRule] = &[q(Double, Backslash, Never), q(Single, Backslash, Never)];
const DOUBLE_ONLY: &[QuoteRule] = &[q(Double, Backslash, Never)];
const MULTILINE_DOUBLE: &[QuoteRule] = &[q(Double, Backslash, Always)];
const MARKUP_QUOTES: &[QuoteRule] = &[q(Double, Escapes::None, Always), q(Single, Escapes::None, Always)];
const YAML_QUOTES: &[QuoteRule] = &[q(Double, Backslash, Always), q(Single, Doubled, Always)];
const TOML_QUOTES: &[QuoteRule] = &[
    q(TripleDouble, Backslash, Always),
    q(TripleSingle, Escapes::None, Always),
    q(Double, Backslash, Never),
    q(Single, Escapes::None, Never),
];

// ==================== Guards ====================

/// `#` starts a comment only at the start of the line or after whitespace.
fn after_space(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || bytes[pos - 1].is_ascii_whitespace()
}

/// Only blanks precede the comment marker.
fn line_start_only(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos].iter().all(u8::is_ascii_whitespace)
}

/// `$#array` is not a comment.
fn perl_hash(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || bytes[pos - 1] != b'$'
}

/// Ruby `#` inside `?#` character literals and `$#` globals.
fn ruby_hash(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || !matches!(bytes[pos - 1], b'$' | b'?')
}

/// Tcl comments only where a command may start.
fn tcl_hash(bytes: &[u8], pos: usize) -> bool {
    prev_non_space(bytes, pos).is_none_or(|p| matches!(bytes[p], b';' | b'{'))
}

fn unescaped(bytes: &[u8], pos: usize) -> bool {
    !is_escaped(bytes, pos)
}

/// `url(http://...)` in SCSS is not a comment.
fn scss_slashes(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || bytes[pos - 1] != b':'
}

/// Rust `'` is a char literal only when a single (possibly escaped) character
/// and a closing quote follow; otherwise it's a lifetime or a label.
fn rust_quote(bytes: &[u8], pos: usize, kind: QuoteKind) -> bool {
    if kind != Single {
        return true;
    }
    match bytes.get(pos + 1) {
        Some(b'\\') => true,
        Some(b'\'') | None => false,
        Some(first) => {
            let width = utf8_width(*first);
            bytes.get(pos + 1 + width) == Some(&b'\'')
        }
    }
}

/// C++14 digit separators: `1'000'000`.
fn cpp_quote(bytes: &[u8], pos: usize, kind: QuoteKind) -> bool {
    if kind != Single || pos == 0 {
        return true;
    }
    let digit_before = bytes[pos - 1].is_ascii_hexdigit();
    let digit_after = bytes.get(pos + 1).is_some_and(u8::is_ascii_hexdigit);
    let in_number = digit_before && {
        let start = bytes[..pos]
            .iter()
            .rposition(|b| !is_word_byte(*b) && *b != b'\'')
            .map_or(0, |p| p + 1);
        bytes[start].is_ascii_digit()
    };
    !(in_number && digit_after)
}

/// YAML quotes only open a scalar in value position. An apostrophe inside a plain
/// key or value (`it's: x`, `key: don't`) is text.
fn yaml_quote(bytes: &[u8], pos: usize, _kind: QuoteKind) -> bool {
    if pos > 0 && !matches!(bytes[pos - 1], b' ' | b'\t' | b'[' | b'{' | b',') {
        return false;
    }
    prev_non_space(bytes, pos)
        .is_none_or(|p| matches!(bytes[p], b':' | b'-' | b'[' | b'{' | b',' | b'?' | b'!' | b'&' | b'|' | b'>'))
}

/// XML quotes only delimit attribute values.
fn xml_quote(bytes: &[u8], pos: usize, _kind: QuoteKind) -> bool {
    prev_non_space(bytes, pos).is_some_and(|p| bytes[p] == b'=')
}

fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

// ==================== Per language ====================

const C_LIKE: LexRules = LexRules {
    line_comments: &["//"],
    block_pairs: C_COMMENT,
    quotes: C_QUOTES,
    ..LexRules::EMPTY
};

const JS_LIKE: LexRules = LexRules {
    quotes: JS_QUOTES,
    slash_regex: true,
    regex_keywords: keywords::JS_REGEX_KEYWORDS,
    ..C_LIKE
};

/// Lexical rules for `language`.
pub(crate) fn rules_for(language: Language) -> LexRules {
    match language {
        Language::C | Language::Java | Language::CSharp => C_LIKE,
        Language::Cpp => LexRules {
            quote_guard: Some(cpp_quote),
            raw: RawSyntax::Cpp,
            ..C_LIKE
        },
        Language::Kotlin | Language::Dart => LexRules {
            quotes: TRIPLE_QUOTES,
            ..C_LIKE
        },
        Language::Go => LexRules {
            quotes: GO_QUOTES,
            ..C_LIKE
        },
        Language::Rust => LexRules {
            quotes: RUST_QUOTES,
            quote_guard: Some(rust_quote),
            raw: RawSyntax::Rust,
            ..C_LIKE
        },
        Language::JavaScript | Language::TypeScript | Language::Qml => JS_LIKE,
        Language::Python => LexRules {
            line_comments: &["#"],
            quotes: TRIPLE_QUOTES,
            docstrings: true,
            ..LexRules::EMPTY
        },
        Language::Perl => LexRules {
            line_comments: &["#"],
            line_comment_guard: Some(perl_hash),
            block_pairs: PERL_COMMENT,
            quotes: SCRIPT_QUOTES,
            literals: LiteralSyntax::Perl,
            slash_regex: true,
            regex_multiline: true,
            regex_keywords: keywords::PERL_REGEX_KEYWORDS,
            ..LexRules::EMPTY
        },
        Language::Ruby => LexRules {
            line_comments: &["#"],
            line_comment_guard: Some(ruby_hash),
            block_pairs: RUBY_COMMENT,
            quotes: SCRIPT_QUOTES,
            literals: LiteralSyntax::Ruby,
            slash_regex: true,
            regex_multiline: true,
            regex_keywords: keywords::RUBY_REGEX_KEYWORDS,
            ..LexRules::EMPTY
        },
        Language::Lua => LexRules {
            line_comments: &["--"],
            quotes: SIMPLE_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Makefile => LexRules {
            line_comments: &["#"],
            line_comment_guard: Some(unescaped),
            quotes: SIMPLE_QUOTES,
            ..LexRules::EMPTY
        },
        Language::CMake => LexRules {
            line_comments: &["#"],
            quotes: MULTILINE_DOUBLE,
            ..LexRules::EMPTY
        },
        Language::Pascal => LexRules {
            line_comments: &["//"],
            block_pairs: PASCAL_COMMENT,
            quotes: PASCAL_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Tcl => LexRules {
            line_comments: &["#"],
            line_comment_guard: Some(tcl_hash),
            quotes: MULTILINE_DOUBLE,
            ..LexRules::EMPTY
        },
        Language::Sql => LexRules {
            line_comments: &["--"],
            block_pairs: C_COMMENT,
            quotes: SQL_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Xml | Language::Html => LexRules {
            block_pairs: MARKUP_COMMENT,
            quotes: MARKUP_QUOTES,
            quote_guard: Some(xml_quote),
            ..LexRules::EMPTY
        },
        Language::Css => LexRules {
            block_pairs: C_COMMENT,
            quotes: SIMPLE_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Scss => LexRules {
            line_comments: &["//"],
            line_comment_guard: Some(scss_slashes),
            block_pairs: C_COMMENT,
            quotes: SIMPLE_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Json => LexRules {
            quotes: DOUBLE_ONLY,
            ..LexRules::EMPTY
        },
        Language::Yaml => LexRules {
            line_comments: &["#"],
            line_comment_guard: Some(after_space),
            quotes: YAML_QUOTES,
            quote_guard: Some(yaml_quote),
            ..LexRules::EMPTY
        },
        Language::Toml => LexRules {
            line_comments: &["#"],
            quotes: TOML_QUOTES,
            ..LexRules::EMPTY
        },
        Language::Ini => LexRules {
            line_comments: &[";", "#"],
            line_comment_guard: Some(line_start_only),
            quotes: DOUBLE_ONLY,
            ..LexRules::EMPTY
        },
        Language::Markdown => LexRules {
            block_pairs: HTML_COMMENT,
            ..LexRules::EMPTY
        },
        // Both run dedicated character walkers instead of the region scanner
        Language::Shell | Language::Latex => LexRules::EMPTY,
        Language::Diff | Language::Log | Language::Srt | Language::Plain => LexRules::EMPTY,
    }
}
