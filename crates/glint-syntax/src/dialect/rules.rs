//! Pattern-table rules per language.
//!
//! Rules are applied in order and a later match overwrites an earlier one, so the list
//! for a language reads from the most generic rule (numbers, calls) to the most specific
//! (keywords, then invalid literals).

use super::Language;
use super::keywords::{KeywordSet, keyword_set};
use crate::format::TokenKind;
use crate::predicates::is_word_byte;

/// One uncompiled rule: paint capture `group` of every match of `pattern` with `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuleSpec {
    pub pattern: String,
    pub kind: TokenKind,
    pub group: usize,
}

fn rule(pattern: &str, kind: TokenKind) -> RuleSpec {
    RuleSpec {
        pattern: pattern.to_string(),
        kind,
        group: 0,
    }
}

fn group(pattern: &str, group: usize, kind: TokenKind) -> RuleSpec {
    RuleSpec {
        pattern: pattern.to_string(),
        kind,
        group,
    }
}

/// An alternation of literal words. `\b` is only added on sides that are word characters,
/// so entries like `!important` or `~` still match.
pub(crate) fn word_rule(words: &[&str], ignore_case: bool, kind: TokenKind) -> Option<RuleSpec> {
    if words.is_empty() {
        return None;
    }
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let alternatives: Vec<String> = sorted
        .iter()
        .map(|word| {
            let bytes = word.as_bytes();
            let lead = if bytes.first().is_some_and(|b| is_word_byte(*b)) { r"\b" } else { "" };
            let trail = if bytes.last().is_some_and(|b| is_word_byte(*b)) { r"\b" } else { "" };
            format!("{lead}{}{trail}", regex::escape(word))
        })
        .collect();

    let flags = if ignore_case { "(?i)" } else { "" };
    Some(RuleSpec {
        pattern: format!("{flags}(?:{})", alternatives.join("|")),
        kind,
        group: 0,
    })
}

fn push_words(rules: &mut Vec<RuleSpec>, set: &KeywordSet) {
    let lists = [
        (set.builtins, TokenKind::BuiltIn),
        (set.types, TokenKind::Type),
        (set.constants, TokenKind::Constant),
        (set.keywords, TokenKind::Keyword),
    ];
    rules.extend(
        lists
            .into_iter()
            .filter_map(|(words, kind)| word_rule(words, set.ignore_case, kind)),
    );
}

// ==================== Shared fragments ====================

const NUMBER: &str = r"\b(?:0[xX][0-9A-Fa-f_']+|0[bB][01_']+|0[oO][0-7_]+|\d[\d_']*(?:\.\d[\d_]*)?(?:[eE][+-]?\d[\d_]*)?)[A-Za-z0-9_]*|\B\.\d[\d_]*(?:[eE][+-]?\d+)?\b";
const SIMPLE_NUMBER: &str = r"\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b";
const CALL: &str = r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(";
const ANNOTATION: &str = r"@[A-Za-z_][\w.]*";

// Invalid literals; the trailing group keeps `09.5` and `0x1p3`-style floats out.
const BAD_OCTAL: &str = r"\b(0[0-7]*[89][0-9]*)(?:$|[^0-9.eExX_A-Za-z])";
const BAD_LEADING_ZERO: &str = r"\b(0[0-9_]*[1-9][0-9_]*)(?:$|[^0-9_.eEjJxXoObB])";
const BAD_HEX: &str = r"\b(0[xX])(?:$|[^0-9A-Fa-f_'])";
const BAD_BINARY: &str = r"\b(0[bB][01_']*[2-9][0-9_']*)\b";

fn c_family(rules: &mut Vec<RuleSpec>) {
    rules.push(rule(NUMBER, TokenKind::Number));
    rules.push(group(CALL, 1, TokenKind::Function));
}

fn invalid_numbers(rules: &mut Vec<RuleSpec>, octal: bool) {
    if octal {
        rules.push(group(BAD_OCTAL, 1, TokenKind::Error));
    }
    rules.push(group(BAD_HEX, 1, TokenKind::Error));
    rules.push(group(BAD_BINARY, 1, TokenKind::Error));
}

/// The ordered rule list for `language`.
pub(crate) fn specs(language: Language) -> Vec<RuleSpec> {
    use TokenKind::*;

    let set = keyword_set(language);
    let mut rules = Vec::new();

    match language {
        Language::C | Language::Cpp => {
            c_family(&mut rules);
            push_words(&mut rules, &set);
            rules.push(rule(r"^\s*#\s*[A-Za-z_]+", Keyword));
            rules.push(group(r"^\s*#\s*include\s*(<[^>]*>)", 1, String));
            invalid_numbers(&mut rules, true);
        }
        Language::CSharp | Language::Java | Language::Kotlin | Language::Dart => {
            c_family(&mut rules);
            rules.push(rule(ANNOTATION, Attribute));
            push_words(&mut rules, &set);
            if language == Language::CSharp {
                rules.push(rule(r"^\s*#\s*[a-z]+", Keyword));
                rules.push(group(r"^\s*(\[[A-Za-z_][\w.]*)", 1, Attribute));
            }
            invalid_numbers(&mut rules, language == Language::Java);
        }
        Language::Go => {
            c_family(&mut rules);
            rules.push(group(r"\bfunc\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)", 1, Function));
            push_words(&mut rules, &set);
            invalid_numbers(&mut rules, true);
        }
        Language::Rust => {
            c_family(&mut rules);
            rules.push(group(r"\bfn\s+([A-Za-z_]\w*)", 1, Function));
            rules.push(group(r"\b(?:struct|enum|trait|type|union)\s+([A-Za-z_]\w*)", 1, Type));
            rules.push(rule(r"'[A-Za-z_]\w*\b", Type));
            push_words(&mut rules, &set);
            rules.push(group(r"\b([A-Za-z_]\w*!)[\s(\[{]", 1, BuiltIn));
            rules.push(rule(r"#!?\[[^\]]*\]?", Attribute));
            invalid_numbers(&mut rules, false);
        }
        Language::JavaScript | Language::TypeScript => {
            c_family(&mut rules);
            rules.push(group(r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)", 1, Function));
            rules.push(group(r"\bclass\s+([A-Za-z_$][\w$]*)", 1, Type));
            rules.push(rule(ANNOTATION, Attribute));
            push_words(&mut rules, &set);
            invalid_numbers(&mut rules, false);
        }
        Language::Qml => {
            c_family(&mut rules);
            rules.push(group(r"^\s*([A-Za-z_][\w.]*)\s*:", 1, Attribute));
            rules.push(group(r"\b([A-Z]\w*)\s*\{", 1, Type));
            push_words(&mut rules, &set);
        }
        Language::Python => {
            rules.push(rule(r"(?i)\b(?:0x[0-9a-f_]+|0b[01_]+|0o[0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:e[+-]?\d[\d_]*)?j?)\b|\B\.\d+(?:e[+-]?\d+)?j?\b", Number));
            rules.push(group(CALL, 1, Function));
            rules.push(group(r"\bdef\s+([A-Za-z_]\w*)", 1, Function));
            rules.push(group(r"\bclass\s+([A-Za-z_]\w*)", 1, Type));
            rules.push(rule(r"^\s*@[\w.]+", Attribute));
            push_words(&mut rules, &set);
            rules.push(group(BAD_LEADING_ZERO, 1, Error));
            rules.push(group(BAD_HEX, 1, Error));
            rules.push(group(BAD_BINARY, 1, Error));
        }
        Language::Ruby => {
            rules.push(rule(NUMBER, Number));
            rules.push(group(CALL, 1, Function));
            rules.push(group(r"\bdef\s+(?:self\.)?([A-Za-z_]\w*[?!=]?)", 1, Function));
            rules.push(group(r"\b(?:class|module)\s+([A-Z][\w:]*)", 1, Type));
            rules.push(rule(r"@@?[A-Za-z_]\w*|\$[A-Za-z_]\w*", Variable));
            rules.push(group(r"(?:^|[^:\w]):([A-Za-z_]\w*[?!]?)", 1, Constant));
            rules.push(group(r"\b([A-Za-z_]\w*:)\s", 1, Constant));
            push_words(&mut rules, &set);
        }
        Language::Perl => {
            rules.push(rule(NUMBER, Number));
            rules.push(group(CALL, 1, Function));
            rules.push(group(r"\bsub\s+([A-Za-z_][\w:]*)", 1, Function));
            rules.push(group(r"\bpackage\s+([A-Za-z_][\w:]*)", 1, Type));
            rules.push(rule(r"[$@%]\{?\^?[A-Za-z_][\w:]*\}?|\$[0-9&`'+!@/\\,;.]|\$#\{?[A-Za-z_]\w*\}?", Variable));
            push_words(&mut rules, &set);
        }
        Language::Lua => {
            rules.push(rule(r"\b0[xX][0-9A-Fa-f]+\b|\b\d+(?:\.\d*)?(?:[eE][+-]?\d+)?\b", Number));
            rules.push(group(CALL, 1, Function));
            rules.push(group(r"\bfunction\s+([A-Za-z_][\w.:]*)", 1, Function));
            push_words(&mut rules, &set);
        }
        Language::Shell => {
            rules.push(rule(SIMPLE_NUMBER, Number));
            rules.push(group(r"^\s*(?:export\s+|local\s+|readonly\s+)?([A-Za-z_]\w*)\+?=", 1, Variable));
            rules.push(group(r"(?:^|\s)(--?[A-Za-z][\w-]*)", 1, Attribute));
            rules.push(group(r"^\s*(?:function\s+)?([A-Za-z_][\w-]*)\s*\(\)", 1, Function));
            push_words(&mut rules, &set);
        }
        Language::Makefile => {
            rules.push(group(r"^([^\s:#=][^:#=]*?)\s*::?(?:[^=]|$)", 1, Function));
            rules.push(group(r"^\s*(?:export\s+|override\s+)?([A-Za-z_][\w.-]*)\s*(?:[:+?!]?=)", 1, Variable));
            rules.push(rule(r"\$\([^)]*\)|\$\{[^}]*\}|\$[@<^*?%+|]|\$\$\w*", Variable));
            push_words(&mut rules, &set);
            rules.push(group(r"\$\((\w+)\s", 1, BuiltIn));
        }
        Language::CMake => {
            rules.push(rule(SIMPLE_NUMBER, Number));
            rules.push(group(r"^\s*([A-Za-z_]\w*)\s*\(", 1, Function));
            rules.push(rule(r"\$(?:ENV|CACHE)?\{[^}]*\}|@[A-Za-z_]\w*@", Variable));
            rules.push(group(r"(?:^|[\s(])([A-Z][A-Z0-9_]{2,})\b", 1, Attribute));
            push_words(&mut rules, &set);
        }
        Language::Pascal => {
            rules.push(rule(r"\$[0-9A-Fa-f]+\b|#\d+|\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b", Number));
            rules.push(group(CALL, 1, Function));
            rules.push(group(r"(?i)\b(?:procedure|function)\s+([A-Za-z_][\w.]*)", 1, Function));
            push_words(&mut rules, &set);
        }
        Language::Tcl => {
            rules.push(rule(SIMPLE_NUMBER, Number));
            rules.push(rule(r"\$\{[^}]*\}|\$(?:::)?[A-Za-z_][\w:]*", Variable));
            rules.push(group(r"\bproc\s+([A-Za-z_][\w:]*)", 1, Function));
            push_words(&mut rules, &set);
        }
        Language::Sql => {
            rules.push(rule(SIMPLE_NUMBER, Number));
            rules.push(group(CALL, 1, Function));
            rules.push(rule(r"[@:][A-Za-z_]\w*|\?", Variable));
            push_words(&mut rules, &set);
        }
        Language::Xml | Language::Html => {
            rules.push(rule(r"&(?:[A-Za-z][A-Za-z0-9]*|#\d+|#x[0-9A-Fa-f]+);", Constant));
            rules.push(group(r"(?:^|\s)([A-Za-z_:][\w:.-]*)\s*=", 1, Attribute));
            rules.push(rule(r"</?[A-Za-z_][\w:.-]*|/?>", Tag));
            rules.push(rule(r"<![A-Za-z]+|<\?[\w:-]*|\?>", Keyword));
        }
        Language::Css | Language::Scss => {
            rules.push(group(r"(?:^|[\s,>+~])([.#][A-Za-z_-][\w-]*)", 1, Tag));
            rules.push(group(r"(?:^|[{;])\s*(-{0,2}[A-Za-z][\w-]*)\s*:", 1, Attribute));
            rules.push(rule(r"::?[a-z][\w-]*(?:\([^)]*\))?", Type));
            rules.push(rule(r"-?(?:\d+\.?\d*|\.\d+)(?:px|em|rem|ex|ch|vh|vw|vmin|vmax|%|s|ms|deg|rad|turn|pt|pc|cm|mm|in|fr|dpi)?\b|#[0-9A-Fa-f]{3,8}\b", Number));
            if language == Language::Scss {
                rules.push(rule(r"\$[\w-]+", Variable));
                rules.push(rule(r"&", Operator));
            }
            rules.push(group(r"([A-Za-z-]+)\(", 1, Function));
            push_words(&mut rules, &set);
        }
        Language::Json => {
            rules.push(rule(r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b", Number));
            push_words(&mut rules, &set);
        }
        Language::Yaml => {
            rules.push(rule(r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b|\b0x[0-9A-Fa-f]+\b|\.(?:inf|Inf|INF|nan|NaN|NAN)\b", Number));
            rules.push(group(r#"^\s*(?:-\s+)*([^\s#:'"\[\]{},&*!|>-][^#:]*?|-[^\s#:][^#:]*?)\s*:(?:\s|$)"#, 1, Attribute));
            rules.push(group(r"(?:^|[\s\[{,])([&*][\w-]+)", 1, Variable));
            rules.push(group(r"(?:^|\s)(!!?[\w/:.-]*)", 1, Type));
            rules.push(group(r"^\s*(-)(?:\s|$)", 1, Operator));
            push_words(&mut rules, &set);
            rules.push(rule(r"^(?:---|\.\.\.)(?:\s|$)", Keyword));
            rules.push(rule(r"^%[A-Z]+", Keyword));
        }
        Language::Toml => {
            rules.push(rule(r"[+-]?\b\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?\b|\b0x[0-9A-Fa-f_]+\b|\b0o[0-7_]+\b|\b0b[01_]+\b", Number));
            rules.push(rule(r"\b\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?(?:Z|[+-]\d{2}:\d{2})?|\b\d{2}:\d{2}:\d{2}(?:\.\d+)?\b", Number));
            rules.push(group(r"^\s*([A-Za-z0-9_.-]+)\s*=", 1, Attribute));
            rules.push(rule(r"^\s*\[\[?[^\]]*\]\]?", Tag));
            push_words(&mut rules, &set);
        }
        Language::Ini => {
            rules.push(rule(SIMPLE_NUMBER, Number));
            rules.push(group(r"^\s*([^=;#\[\s][^=]*?)\s*=", 1, Attribute));
            rules.push(rule(r"^\s*\[[^\]]*\]", Tag));
            push_words(&mut rules, &set);
        }
        Language::Markdown => {
            rules.push(group(r"(?:^|[^*\w])(\*[^*\s](?:[^*]*[^*\s])?\*)", 1, Emphasis));
            rules.push(group(r"(?:^|[^_\w])(_[^_\s](?:[^_]*[^_\s])?_)(?:$|[^_\w])", 1, Emphasis));
            rules.push(rule(r"\*\*[^*\s](?:[^*]*[^*\s])?\*\*|__[^_\s](?:[^_]*[^_\s])?__", Strong));
            rules.push(rule(r"!?\[[^\]]*\]\([^)]*\)|!?\[[^\]]*\]\[[^\]]*\]|<(?:https?|ftp|mailto):[^>\s]+>", Link));
            rules.push(group(r"^\s*\[[^\]]+\]:\s*(\S+)", 1, Link));
            rules.push(group(r"^\s*([-*+]|\d+[.)])\s", 1, Operator));
            rules.push(rule(r"^\s*>", Operator));
            rules.push(rule(r"^\s{0,3}(?:(?:\*\s*){3,}|(?:-\s*){3,}|(?:_\s*){3,})$", Operator));
            rules.push(rule(r"`[^`]+`", Code));
        }
        Language::Latex => {
            rules.push(rule(r"\\[A-Za-z@]+\*?", Keyword));
            rules.push(rule(r"\\[^A-Za-z@\s]", Constant));
            rules.push(group(r"\\(?:begin|end)\{([^}]*)\}", 1, Type));
            rules.push(group(r"\\(?:sub)*section\*?\{([^}]*)\}", 1, Heading));
            rules.push(group(r"\\(?:cite|ref|eqref|label|url|href|include|input)\{([^}]*)\}", 1, Link));
            rules.push(rule(r"\\(?:emph|textit)\{[^}]*\}", Emphasis));
            rules.push(rule(r"\\textbf\{[^}]*\}", Strong));
        }
        Language::Diff => {
            rules.push(rule(r"^\+.*", Inserted));
            rules.push(rule(r"^-.*", Deleted));
            rules.push(rule(r"^>.*", Inserted));
            rules.push(rule(r"^<.*", Deleted));
            rules.push(rule(r"^!.*", Keyword));
            rules.push(rule(r"^@@.*?@@", Function));
            rules.push(rule(r"^(?:\+\+\+|---)(?:\s.*|$)|^(?:diff|index|Index:|Only in|new file|deleted file|similarity|rename)\b.*|^\*\*\*.*", Heading));
        }
        Language::Log => {
            rules.push(rule(r"\b\d{1,3}(?:\.\d{1,3}){3}\b|\b0x[0-9A-Fa-f]+\b|\b\d+(?:\.\d+)?\b", Number));
            rules.push(rule(r"\[[^\]]+\]", Tag));
            rules.push(rule(r"\b\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)?|\b\d{2}:\d{2}:\d{2}(?:[.,]\d+)?\b", Type));
            rules.push(rule(r"\b(?:DEBUG|TRACE|VERBOSE)\b", Comment));
            rules.push(rule(r"\b(?:INFO|NOTICE)\b", BuiltIn));
            rules.push(rule(r"\b(?:WARN|WARNING)\b", Keyword));
            rules.push(rule(r"\b(?:ERROR|ERR|FATAL|CRITICAL|CRIT|PANIC|SEVERE)\b", Error));
        }
        Language::Srt => {
            rules.push(rule(r"^\d+\s*$", Number));
            rules.push(rule(r"^\d{2}:\d{2}:\d{2}[,.]\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}[,.]\d{3}", Type));
            rules.push(rule(r"-->", Operator));
            rules.push(rule(r"</?[ibus]>|</?font[^>]*>|\{\\[^}]*\}", Tag));
        }
        Language::Plain => {}
    }

    rules
}
