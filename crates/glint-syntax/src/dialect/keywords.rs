//! Keyword, type, constant and builtin word lists.

use super::Language;

// ==================== Regex context ====================

/// After these words a `/` opens a regex literal.
pub(crate) const JS_REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw",
    "case", "do", "else", "yield", "await",
];

pub(crate) const PERL_REGEX_KEYWORDS: &[&str] = &[
    "split", "if", "elsif", "unless", "and", "or", "not", "grep", "map", "join",
    "return", "while", "until", "when", "push", "unshift", "x",
];

pub(crate) const RUBY_REGEX_KEYWORDS: &[&str] = &[
    "if", "elsif", "unless", "while", "until", "when", "and", "or", "not", "return",
    "puts", "print", "p", "then", "case", "in", "scan", "match", "split", "sub", "gsub",
];

// ==================== Word lists ====================

fn rust_keywords() -> &'static [&'static str] {
    &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn",
        "else", "enum", "extern", "fn", "for", "if", "impl", "in", "let",
        "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "Self", "static", "struct", "super", "trait", "type",
        "unsafe", "use", "where", "while", "yield", "macro_rules",
    ]
}

fn rust_types() -> &'static [&'static str] {
    &[
        "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128",
        "isize", "str", "u8", "u16", "u32", "u64", "u128", "usize",
        "String", "Vec", "Option", "Result", "Box", "Rc", "Arc",
        "HashMap", "HashSet", "BTreeMap", "BTreeSet", "VecDeque",
        "PathBuf", "Path", "Cow", "Cell", "RefCell", "Mutex", "RwLock",
        "Pin", "Future", "Iterator", "Display", "Debug", "Clone", "Copy",
        "Send", "Sync", "Sized", "Drop", "Fn", "FnMut", "FnOnce", "Default",
        "From", "Into", "TryFrom", "TryInto", "AsRef", "AsMut", "Deref",
    ]
}

fn python_keywords() -> &'static [&'static str] {
    &[
        "and", "as", "assert", "async", "await", "break", "class", "continue",
        "def", "del", "elif", "else", "except", "finally", "for", "from",
        "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
        "or", "pass", "raise", "return", "try", "while", "with", "yield",
        "match", "case",
    ]
}

fn python_builtins() -> &'static [&'static str] {
    &[
        "print", "len", "range", "enumerate", "zip", "map", "filter",
        "sorted", "reversed", "min", "max", "sum", "abs", "round",
        "isinstance", "issubclass", "hasattr", "getattr", "setattr",
        "super", "property", "staticmethod", "classmethod", "open",
        "input", "repr", "format", "iter", "next", "any", "all",
    ]
}

fn js_keywords() -> &'static [&'static str] {
    &[
        "async", "await", "break", "case", "catch", "class", "const",
        "continue", "debugger", "default", "delete", "do", "else", "export",
        "extends", "finally", "for", "from", "function", "if", "import",
        "in", "instanceof", "let", "new", "of", "return", "static", "super",
        "switch", "throw", "try", "typeof", "var", "void", "while",
        "with", "yield",
    ]
}

fn ts_keywords() -> &'static [&'static str] {
    &[
        "async", "await", "break", "case", "catch", "class", "const",
        "continue", "debugger", "default", "delete", "do", "else", "export",
        "extends", "finally", "for", "from", "function", "if", "import",
        "in", "instanceof", "let", "new", "of", "return", "static", "super",
        "switch", "throw", "try", "typeof", "var", "void", "while",
        "with", "yield", "abstract", "as", "declare", "enum", "implements", "interface",
        "keyof", "namespace", "private", "protected", "public", "readonly",
        "type", "satisfies",
    ]
}

fn js_types() -> &'static [&'static str] {
    &[
        "Array", "Object", "String", "Number", "Boolean", "Function",
        "Symbol", "BigInt", "Map", "Set", "WeakMap", "WeakSet",
        "Promise", "Proxy", "Reflect", "RegExp", "Error", "Date", "JSON",
        "Math", "ArrayBuffer", "Uint8Array",
        "string", "number", "boolean", "any", "never", "unknown", "object",
    ]
}

fn qml_keywords() -> &'static [&'static str] {
    &[
        "property", "signal", "readonly", "alias", "required", "default",
        "import", "pragma", "on", "function", "var", "let", "const",
        "if", "else", "for", "while", "return", "switch", "case", "break",
    ]
}

fn go_keywords() -> &'static [&'static str] {
    &[
        "break", "case", "chan", "const", "continue", "default", "defer",
        "else", "fallthrough", "for", "func", "go", "goto", "if", "import",
        "interface", "map", "package", "range", "return", "select", "struct",
        "switch", "type", "var",
    ]
}

fn go_types() -> &'static [&'static str] {
    &[
        "bool", "byte", "complex64", "complex128", "error", "float32",
        "float64", "int", "int8", "int16", "int32", "int64", "rune",
        "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
    ]
}

fn java_keywords() -> &'static [&'static str] {
    &[
        "abstract", "assert", "break", "case", "catch", "class", "const",
        "continue", "default", "do", "else", "enum", "extends", "final",
        "finally", "for", "goto", "if", "implements", "import", "instanceof",
        "interface", "native", "new", "package", "private", "protected",
        "public", "return", "static", "strictfp", "super", "switch",
        "synchronized", "this", "throw", "throws", "transient", "try",
        "void", "volatile", "while", "var", "yield", "record", "sealed",
        "permits", "non-sealed",
    ]
}

fn java_types() -> &'static [&'static str] {
    &[
        "boolean", "byte", "char", "double", "float", "int", "long", "short",
        "String", "Integer", "Long", "Double", "Float", "Boolean", "Object",
        "List", "ArrayList", "Map", "HashMap", "Set", "HashSet", "Optional",
        "Exception", "RuntimeException", "Throwable",
    ]
}

fn c_keywords() -> &'static [&'static str] {
    &[
        "auto", "break", "case", "const", "continue", "default", "do", "else",
        "enum", "extern", "for", "goto", "if", "inline", "register",
        "restrict", "return", "sizeof", "static", "struct", "switch",
        "typedef", "union", "volatile", "while", "_Alignas", "_Alignof",
        "_Atomic", "_Generic", "_Noreturn", "_Static_assert", "_Thread_local",
    ]
}

fn c_types() -> &'static [&'static str] {
    &[
        "char", "double", "float", "int", "long", "short", "signed",
        "unsigned", "void", "_Bool", "_Complex", "size_t", "ssize_t",
        "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t",
        "uint32_t", "uint64_t", "ptrdiff_t", "FILE",
    ]
}

fn cpp_keywords() -> &'static [&'static str] {
    &[
        "alignas", "alignof", "and", "asm", "break", "case", "catch",
        "class", "concept", "const", "consteval", "constexpr", "constinit",
        "const_cast", "continue", "co_await", "co_return", "co_yield",
        "decltype", "default", "delete", "do", "dynamic_cast", "else",
        "enum", "explicit", "export", "extern", "for", "friend", "goto",
        "if", "inline", "mutable", "namespace", "new", "noexcept", "not",
        "operator", "or", "private", "protected", "public", "register",
        "reinterpret_cast", "requires", "return", "sizeof", "static",
        "static_assert", "static_cast", "struct", "switch", "template",
        "this", "thread_local", "throw", "try", "typedef", "typeid",
        "typename", "union", "using", "virtual", "volatile", "while",
        "override", "final",
    ]
}

fn cpp_types() -> &'static [&'static str] {
    &[
        "bool", "char", "char8_t", "char16_t", "char32_t", "double", "float",
        "int", "long", "short", "signed", "unsigned", "void", "wchar_t",
        "string", "vector", "map", "set", "unordered_map", "unordered_set",
        "array", "pair", "tuple", "optional", "variant", "shared_ptr",
        "unique_ptr", "size_t", "int32_t", "int64_t", "uint8_t", "uint32_t",
        "uint64_t",
    ]
}

fn csharp_keywords() -> &'static [&'static str] {
    &[
        "abstract", "as", "base", "break", "case", "catch", "checked",
        "class", "const", "continue", "default", "delegate", "do", "else",
        "enum", "event", "explicit", "extern", "finally", "fixed", "for",
        "foreach", "goto", "if", "implicit", "in", "interface", "internal",
        "is", "lock", "namespace", "new", "operator", "out", "override",
        "params", "private", "protected", "public", "readonly", "record",
        "ref", "return", "sealed", "sizeof", "stackalloc", "static",
        "struct", "switch", "this", "throw", "try", "typeof", "unchecked",
        "unsafe", "using", "virtual", "volatile", "while", "async", "await",
        "yield", "partial", "where", "get", "set", "init", "when", "with",
    ]
}

fn csharp_types() -> &'static [&'static str] {
    &[
        "bool", "byte", "char", "decimal", "double", "float", "int", "long",
        "object", "sbyte", "short", "string", "uint", "ulong", "ushort",
        "void", "var", "dynamic", "List", "Dictionary", "Task", "Action", "Func",
    ]
}

fn kotlin_keywords() -> &'static [&'static str] {
    &[
        "abstract", "annotation", "as", "break", "by", "catch", "class",
        "companion", "const", "constructor", "continue", "data", "do",
        "else", "enum", "external", "final", "finally", "for", "fun", "if",
        "import", "in", "init", "inline", "inner", "interface", "internal",
        "is", "lateinit", "object", "open", "operator", "out", "override",
        "package", "private", "protected", "public", "reified", "return",
        "sealed", "super", "suspend", "this", "throw", "try", "typealias",
        "val", "var", "vararg", "when", "where", "while",
    ]
}

fn kotlin_types() -> &'static [&'static str] {
    &[
        "Int", "Long", "Short", "Byte", "Float", "Double", "Char", "Boolean",
        "String", "Any", "Unit", "Nothing", "Array", "List", "Map", "Set",
    ]
}

fn dart_keywords() -> &'static [&'static str] {
    &[
        "abstract", "as", "assert", "async", "await", "break", "case",
        "catch", "class", "const", "continue", "covariant", "default",
        "deferred", "do", "else", "enum", "export", "extends", "extension",
        "external", "factory", "final", "finally", "for", "get", "hide",
        "if", "implements", "import", "in", "interface", "is", "late",
        "library", "mixin", "new", "on", "operator", "part", "required",
        "rethrow", "return", "sealed", "set", "show", "static", "super",
        "switch", "sync", "this", "throw", "try", "typedef", "var",
        "when", "while", "with", "yield",
    ]
}

fn dart_types() -> &'static [&'static str] {
    &[
        "int", "double", "num", "String", "bool", "List", "Map", "Set",
        "Future", "Stream", "Iterable", "Object", "dynamic", "void", "Never",
    ]
}

fn ruby_keywords() -> &'static [&'static str] {
    &[
        "alias", "and", "begin", "break", "case", "class", "def", "defined?",
        "do", "else", "elsif", "end", "ensure", "for", "if", "in",
        "module", "next", "not", "or", "redo", "rescue", "retry",
        "return", "self", "super", "then", "undef", "unless", "until",
        "when", "while", "yield",
    ]
}

fn ruby_builtins() -> &'static [&'static str] {
    &[
        "puts", "print", "p", "gets", "require", "require_relative", "include",
        "extend", "attr_reader", "attr_writer", "attr_accessor", "raise",
        "lambda", "proc", "private", "protected", "public",
    ]
}

fn perl_keywords() -> &'static [&'static str] {
    &[
        "my", "our", "local", "sub", "if", "elsif", "else", "unless", "while",
        "until", "for", "foreach", "do", "last", "next", "redo", "return",
        "package", "use", "no", "require", "BEGIN", "END", "and", "or", "not",
        "eq", "ne", "lt", "gt", "le", "ge", "cmp",
    ]
}

fn perl_builtins() -> &'static [&'static str] {
    &[
        "print", "printf", "say", "die", "warn", "open", "close", "chomp",
        "chop", "push", "pop", "shift", "unshift", "splice", "split", "join",
        "keys", "values", "each", "defined", "exists", "delete", "ref",
        "bless", "length", "substr", "index", "sprintf", "sort", "map", "grep",
    ]
}

fn lua_keywords() -> &'static [&'static str] {
    &[
        "and", "break", "do", "else", "elseif", "end", "for", "function",
        "goto", "if", "in", "local", "not", "or", "repeat", "return",
        "then", "until", "while",
    ]
}

fn lua_builtins() -> &'static [&'static str] {
    &[
        "print", "type", "tostring", "tonumber", "pairs", "ipairs", "next",
        "select", "require", "pcall", "xpcall", "error", "assert",
        "setmetatable", "getmetatable", "rawget", "rawset",
    ]
}

fn shell_keywords() -> &'static [&'static str] {
    &[
        "if", "then", "else", "elif", "fi", "case", "esac", "for", "while",
        "until", "do", "done", "in", "function", "select", "time", "coproc",
        "return", "exit", "break", "continue", "shift", "export", "readonly",
        "declare", "local", "typeset", "unset", "source", "alias", "eval",
        "exec", "trap", "set",
    ]
}

fn shell_builtins() -> &'static [&'static str] {
    &[
        "echo", "printf", "read", "cd", "pwd", "ls", "cp", "mv", "rm",
        "mkdir", "rmdir", "cat", "grep", "sed", "awk", "find", "sort",
        "cut", "tr", "wc", "head", "tail", "chmod", "chown", "test",
    ]
}

fn makefile_keywords() -> &'static [&'static str] {
    &[
        "ifeq", "ifneq", "ifdef", "ifndef", "else", "endif", "include",
        "-include", "sinclude", "define", "endef", "export", "unexport",
        "override", "private", "vpath",
    ]
}

fn cmake_keywords() -> &'static [&'static str] {
    &[
        "if", "elseif", "else", "endif", "foreach", "endforeach", "while",
        "endwhile", "function", "endfunction", "macro", "endmacro", "return",
        "break", "continue", "set", "unset", "option", "project",
        "add_executable", "add_library", "target_link_libraries",
        "target_include_directories", "find_package", "include",
        "add_subdirectory", "message", "install",
    ]
}

fn pascal_keywords() -> &'static [&'static str] {
    &[
        "and", "array", "begin", "case", "const", "div", "do", "downto",
        "else", "end", "file", "for", "function", "goto", "if", "in",
        "label", "mod", "nil", "not", "of", "or", "packed", "procedure",
        "program", "record", "repeat", "set", "then", "to", "type", "until",
        "var", "while", "with", "unit", "uses", "interface", "implementation",
        "class", "object", "constructor", "destructor", "property",
    ]
}

fn pascal_types() -> &'static [&'static str] {
    &[
        "integer", "real", "boolean", "char", "string", "byte", "word",
        "longint", "cardinal", "double", "single", "pointer",
    ]
}

fn tcl_keywords() -> &'static [&'static str] {
    &[
        "proc", "set", "if", "elseif", "else", "for", "foreach", "while",
        "return", "break", "continue", "switch", "expr", "global", "upvar",
        "namespace", "package", "source", "catch", "error", "puts", "list",
        "lappend", "lindex", "string", "array", "dict",
    ]
}

fn sql_keywords() -> &'static [&'static str] {
    &[
        "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "INSERT", "INTO",
        "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "TABLE", "ALTER",
        "DROP", "INDEX", "VIEW", "JOIN", "INNER", "LEFT", "RIGHT", "OUTER",
        "FULL", "ON", "AS", "ORDER", "BY", "GROUP", "HAVING", "LIMIT",
        "OFFSET", "UNION", "ALL", "DISTINCT", "EXISTS", "IN", "BETWEEN",
        "LIKE", "IS", "CASE", "WHEN", "THEN", "ELSE", "END", "BEGIN",
        "COMMIT", "ROLLBACK", "TRANSACTION", "PRIMARY", "KEY", "FOREIGN",
        "REFERENCES", "CONSTRAINT", "UNIQUE", "CHECK", "DEFAULT",
        "CASCADE", "TRIGGER", "PROCEDURE", "FUNCTION", "RETURNS", "DECLARE",
    ]
}

fn sql_types() -> &'static [&'static str] {
    &[
        "INT", "INTEGER", "BIGINT", "SMALLINT", "TINYINT", "FLOAT",
        "DOUBLE", "DECIMAL", "NUMERIC", "VARCHAR", "CHAR", "TEXT",
        "BLOB", "DATE", "TIME", "DATETIME", "TIMESTAMP", "BOOLEAN",
        "SERIAL", "UUID",
    ]
}

fn css_keywords() -> &'static [&'static str] {
    &[
        "!important", "@media", "@import", "@font-face", "@keyframes",
        "@charset", "@supports", "@namespace", "@page", "@layer",
        "@container", "@mixin", "@include", "@extend", "@use", "@forward",
        "@if", "@else", "@each", "@for", "@function", "@return",
    ]
}

fn css_builtins() -> &'static [&'static str] {
    &[
        "rgb", "rgba", "hsl", "hsla", "calc", "var", "min", "max", "clamp",
        "url", "linear-gradient", "radial-gradient",
    ]
}

// ==================== Per language ====================

/// Word lists used by a language's pattern table.
///
/// Adapted from the editor's per-language configuration table.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeywordSet {
    pub keywords: &'static [&'static str],
    pub types: &'static [&'static str],
    pub constants: &'static [&'static str],
    pub builtins: &'static [&'static str],
    pub ignore_case: bool,
}

pub(crate) fn keyword_set(language: Language) -> KeywordSet {
    match language {
        Language::Rust => KeywordSet {
            keywords: rust_keywords(),
            types: rust_types(),
            constants: &["true", "false", "None", "Some", "Ok", "Err"],
            ..Default::default()
        },
        Language::Python => KeywordSet {
            keywords: python_keywords(),
            types: &["int", "float", "str", "bool", "list", "dict", "tuple", "set", "bytes", "object", "type"],
            constants: &["True", "False", "None", "self", "cls"],
            builtins: python_builtins(),
            ..Default::default()
        },
        Language::JavaScript => KeywordSet {
            keywords: js_keywords(),
            types: js_types(),
            constants: &["true", "false", "null", "undefined", "NaN", "Infinity", "this"],
            builtins: &["console", "window", "document", "require", "module", "exports"],
            ..Default::default()
        },
        Language::TypeScript => KeywordSet {
            keywords: ts_keywords(),
            ..keyword_set(Language::JavaScript)
        },
        Language::Qml => KeywordSet {
            keywords: qml_keywords(),
            types: &["Item", "Rectangle", "Text", "Image", "MouseArea", "Column", "Row", "ListView", "Component", "QtObject", "int", "real", "string", "bool", "var", "color", "url"],
            constants: &["true", "false", "null", "undefined", "parent"],
            ..Default::default()
        },
        Language::Go => KeywordSet {
            keywords: go_keywords(),
            types: go_types(),
            constants: &["true", "false", "nil", "iota"],
            builtins: &["append", "cap", "close", "copy", "delete", "len", "make", "new", "panic", "print", "println", "recover"],
            ..Default::default()
        },
        Language::Java => KeywordSet {
            keywords: java_keywords(),
            types: java_types(),
            constants: &["true", "false", "null"],
            ..Default::default()
        },
        Language::C => KeywordSet {
            keywords: c_keywords(),
            types: c_types(),
            constants: &["NULL", "true", "false", "EOF", "stdin", "stdout", "stderr"],
            builtins: &["printf", "scanf", "malloc", "free", "calloc", "realloc", "strlen", "strcmp", "strcpy", "memcpy", "memset"],
            ..Default::default()
        },
        Language::Cpp => KeywordSet {
            keywords: cpp_keywords(),
            types: cpp_types(),
            constants: &["true", "false", "nullptr", "NULL"],
            builtins: &["std", "cout", "cin", "cerr", "endl"],
            ..Default::default()
        },
        Language::CSharp => KeywordSet {
            keywords: csharp_keywords(),
            types: csharp_types(),
            constants: &["true", "false", "null"],
            builtins: &["Console", "Math", "Convert", "Environment"],
            ..Default::default()
        },
        Language::Kotlin => KeywordSet {
            keywords: kotlin_keywords(),
            types: kotlin_types(),
            constants: &["true", "false", "null", "it"],
            builtins: &["println", "print", "listOf", "mapOf", "setOf", "mutableListOf"],
            ..Default::default()
        },
        Language::Dart => KeywordSet {
            keywords: dart_keywords(),
            types: dart_types(),
            constants: &["true", "false", "null"],
            builtins: &["print", "debugPrint"],
            ..Default::default()
        },
        Language::Ruby => KeywordSet {
            keywords: ruby_keywords(),
            types: &["Integer", "Float", "String", "Symbol", "Array", "Hash", "Regexp", "Range", "Proc", "Class", "Module", "File"],
            constants: &["true", "false", "nil", "__FILE__", "__LINE__", "__dir__"],
            builtins: ruby_builtins(),
            ..Default::default()
        },
        Language::Perl => KeywordSet {
            keywords: perl_keywords(),
            constants: &["__FILE__", "__LINE__", "__PACKAGE__", "STDIN", "STDOUT", "STDERR"],
            builtins: perl_builtins(),
            ..Default::default()
        },
        Language::Lua => KeywordSet {
            keywords: lua_keywords(),
            constants: &["true", "false", "nil"],
            builtins: lua_builtins(),
            ..Default::default()
        },
        Language::Shell => KeywordSet {
            keywords: shell_keywords(),
            constants: &["true", "false"],
            builtins: shell_builtins(),
            ..Default::default()
        },
        Language::Makefile => KeywordSet {
            keywords: makefile_keywords(),
            builtins: &["subst", "patsubst", "strip", "findstring", "filter", "sort", "wildcard", "shell", "foreach", "call", "eval", "dir", "notdir", "basename", "addprefix", "addsuffix"],
            ..Default::default()
        },
        Language::CMake => KeywordSet {
            keywords: cmake_keywords(),
            constants: &["ON", "OFF", "TRUE", "FALSE", "YES", "NO", "PUBLIC", "PRIVATE", "INTERFACE", "REQUIRED"],
            ignore_case: true,
            ..Default::default()
        },
        Language::Pascal => KeywordSet {
            keywords: pascal_keywords(),
            types: pascal_types(),
            constants: &["true", "false", "nil"],
            builtins: &["writeln", "write", "readln", "read", "length", "inc", "dec", "ord", "chr"],
            ignore_case: true,
        },
        Language::Tcl => KeywordSet {
            keywords: tcl_keywords(),
            ..Default::default()
        },
        Language::Sql => KeywordSet {
            keywords: sql_keywords(),
            types: sql_types(),
            constants: &["NULL", "TRUE", "FALSE"],
            builtins: &["COUNT", "SUM", "AVG", "MIN", "MAX", "COALESCE", "CAST", "CONVERT", "IFNULL", "NULLIF"],
            ignore_case: true,
        },
        Language::Css | Language::Scss => KeywordSet {
            keywords: css_keywords(),
            constants: &["inherit", "initial", "unset", "revert", "auto", "none", "block", "inline", "flex", "grid", "absolute", "relative", "fixed", "sticky"],
            builtins: css_builtins(),
            ..Default::default()
        },
        Language::Json => KeywordSet {
            constants: &["true", "false", "null"],
            ..Default::default()
        },
        Language::Yaml => KeywordSet {
            constants: &["true", "false", "null", "yes", "no", "on", "off", "True", "False", "Null", "~"],
            ..Default::default()
        },
        Language::Toml => KeywordSet {
            constants: &["true", "false", "inf", "nan"],
            ..Default::default()
        },
        Language::Ini => KeywordSet {
            constants: &["true", "false", "yes", "no"],
            ..Default::default()
        },
        Language::Xml
        | Language::Html
        | Language::Markdown
        | Language::Latex
        | Language::Diff
        | Language::Log
        | Language::Srt
        | Language::Plain => KeywordSet::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typescript_extends_javascript() {
        let ts = keyword_set(Language::TypeScript);
        assert!(ts.keywords.contains(&"interface"));
        assert!(ts.keywords.contains(&"function"));
        assert!(ts.types.contains(&"Promise"));
    }

    #[test]
    fn test_case_insensitive_sets() {
        assert!(keyword_set(Language::Sql).ignore_case);
        assert!(!keyword_set(Language::Rust).ignore_case);
    }
}
