//! Highlighting configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the TOML mapping. With
//! `#[serde(default)]` every missing key falls back to `Default::default()`, so a config
//! file only needs the settings it changes:
//!
//! ```toml
//! [highlight]
//! dark_color_scheme = true
//!
//! [highlight.syntax_colors]
//! keyword = "#ff79c6"
//!
//! [languages]
//! h = "cpp"
//! ```

use glint_syntax::{HighlightOptions, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options handed to every highlighting session
    pub highlight: HighlightOptions,

    /// File extension (without the dot) → language, consulted before detection
    pub languages: BTreeMap<String, Language>,
}

impl Config {
    /// Loads config from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_else(|err| {
            tracing::warn!("Using default config: {}", err);
            Self::default()
        })
    }

    /// Loads config from a file. A file that doesn't exist yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path()?)
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("glint").join("config.toml"))
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// The language for `path`: an extension override if one matches, otherwise
    /// detection by file name.
    pub fn language_for(&self, path: impl AsRef<Path>) -> Language {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.languages.get(ext))
            .copied()
            .unwrap_or_else(|| Language::detect(path))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_syntax::SyntaxRole;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.highlight.show_whitespace);
        assert_eq!(config.highlight.max_line_length, 10_000);
        assert!(config.languages.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            "[highlight]\ndark_color_scheme = true\n\n[languages]\nh = \"cpp\"\n",
        )
        .unwrap();
        assert!(config.highlight.dark_color_scheme);
        assert_eq!(config.highlight.reclassify_queue_capacity, 4096);
        assert_eq!(config.languages.get("h"), Some(&Language::Cpp));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.highlight.show_line_endings = true;
        config
            .highlight
            .syntax_colors
            .insert(SyntaxRole::Keyword, "#112233".to_string());
        config.languages.insert("inc".to_string(), Language::Pascal);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[highlight\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_language_override() {
        let mut config = Config::default();
        assert_eq!(config.language_for("main.h"), Language::C);
        config.languages.insert("h".to_string(), Language::Cpp);
        assert_eq!(config.language_for("main.h"), Language::Cpp);
        assert_eq!(config.language_for("Makefile"), Language::Makefile);
    }
}
