//! The supported languages and file-type detection.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A language or markup format with its own dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    CSharp,
    Java,
    Kotlin,
    Go,
    Rust,
    Dart,
    JavaScript,
    TypeScript,
    Qml,
    Python,
    Ruby,
    Perl,
    Lua,
    Shell,
    Makefile,
    CMake,
    Pascal,
    Tcl,
    Sql,
    Xml,
    Html,
    Css,
    Scss,
    Json,
    Yaml,
    Toml,
    Ini,
    Markdown,
    Latex,
    Diff,
    Log,
    Srt,
    Plain,
}

impl Language {
    const ALL: [Language; 35] = [
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Java,
        Language::Kotlin,
        Language::Go,
        Language::Rust,
        Language::Dart,
        Language::JavaScript,
        Language::TypeScript,
        Language::Qml,
        Language::Python,
        Language::Ruby,
        Language::Perl,
        Language::Lua,
        Language::Shell,
        Language::Makefile,
        Language::CMake,
        Language::Pascal,
        Language::Tcl,
        Language::Sql,
        Language::Xml,
        Language::Html,
        Language::Css,
        Language::Scss,
        Language::Json,
        Language::Yaml,
        Language::Toml,
        Language::Ini,
        Language::Markdown,
        Language::Latex,
        Language::Diff,
        Language::Log,
        Language::Srt,
        Language::Plain,
    ];

    pub fn all() -> &'static [Language] {
        &Self::ALL
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Dart => "dart",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Qml => "qml",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Perl => "perl",
            Language::Lua => "lua",
            Language::Shell => "shell",
            Language::Makefile => "makefile",
            Language::CMake => "cmake",
            Language::Pascal => "pascal",
            Language::Tcl => "tcl",
            Language::Sql => "sql",
            Language::Xml => "xml",
            Language::Html => "html",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Ini => "ini",
            Language::Markdown => "markdown",
            Language::Latex => "latex",
            Language::Diff => "diff",
            Language::Log => "log",
            Language::Srt => "srt",
            Language::Plain => "plain",
        }
    }

    /// Looks a language up by canonical name or common alias, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "c++" | "cxx" | "cc" => "cpp",
            "c#" | "cs" => "csharp",
            "kt" => "kotlin",
            "golang" => "go",
            "rs" => "rust",
            "js" | "jsx" | "node" => "javascript",
            "ts" | "tsx" => "typescript",
            "py" | "python3" => "python",
            "rb" => "ruby",
            "pl" => "perl",
            "sh" | "bash" | "zsh" | "ksh" => "shell",
            "make" | "mk" => "makefile",
            "pas" | "delphi" => "pascal",
            "htm" => "html",
            "yml" => "yaml",
            "desktop" | "conf" => "ini",
            "md" => "markdown",
            "tex" => "latex",
            "patch" => "diff",
            "text" | "txt" => "plain",
            other => other,
        };
        Self::ALL.into_iter().find(|lang| lang.name() == alias)
    }

    /// Picks a language from a file name, falling back to plain text.
    pub fn detect(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        match file_name {
            "Makefile" | "makefile" | "GNUmakefile" => return Language::Makefile,
            "CMakeLists.txt" => return Language::CMake,
            "Gemfile" | "Rakefile" => return Language::Ruby,
            ".bashrc" | ".bash_profile" | ".profile" | ".zshrc" | "PKGBUILD" => {
                return Language::Shell;
            }
            _ => {}
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext {
            "c" | "h" => Language::C,
            "cpp" | "cxx" | "cc" | "c++" | "hpp" | "hxx" | "hh" | "h++" | "ino" => Language::Cpp,
            "cs" => Language::CSharp,
            "java" => Language::Java,
            "kt" | "kts" | "gradle" => Language::Kotlin,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "dart" => Language::Dart,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "qml" => Language::Qml,
            "py" | "pyw" | "pyi" => Language::Python,
            "rb" | "rake" | "gemspec" => Language::Ruby,
            "pl" | "pm" | "t" => Language::Perl,
            "lua" => Language::Lua,
            "sh" | "bash" | "zsh" | "ksh" | "env" => Language::Shell,
            "mk" | "mak" => Language::Makefile,
            "cmake" => Language::CMake,
            "pas" | "pp" | "dpr" | "lpr" => Language::Pascal,
            "tcl" | "tk" => Language::Tcl,
            "sql" => Language::Sql,
            "xml" | "xsl" | "xslt" | "svg" | "ui" | "qrc" | "plist" => Language::Xml,
            "html" | "htm" | "xhtml" => Language::Html,
            "css" | "less" => Language::Css,
            "scss" | "sass" => Language::Scss,
            "json" | "jsonc" | "geojson" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "toml" => Language::Toml,
            "ini" | "cfg" | "conf" | "desktop" | "service" => Language::Ini,
            "md" | "markdown" | "mdx" => Language::Markdown,
            "tex" | "sty" | "cls" | "bib" => Language::Latex,
            "diff" | "patch" => Language::Diff,
            "log" => Language::Log,
            "srt" => Language::Srt,
            _ => Language::Plain,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = crate::SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| crate::SyntaxError::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for lang in Language::all() {
            assert_eq!(Language::from_name(lang.name()), Some(*lang));
        }
        assert_eq!(Language::from_name("Bash"), Some(Language::Shell));
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert!(Language::from_name("cobol").is_none());
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_detect() {
        assert_eq!(Language::detect("src/main.rs"), Language::Rust);
        assert_eq!(Language::detect("/tmp/Makefile"), Language::Makefile);
        assert_eq!(Language::detect("CMakeLists.txt"), Language::CMake);
        assert_eq!(Language::detect("notes.md"), Language::Markdown);
        assert_eq!(Language::detect("config.yml"), Language::Yaml);
        assert_eq!(Language::detect("README"), Language::Plain);
    }
}
