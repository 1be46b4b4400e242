//! # Glint Core
//!
//! The host side of the highlighter: a document that owns the text, remembers what the
//! engine said about every line, and decides which lines to classify again after an
//! edit.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 HighlightedDocument                  │
//! │  ┌────────────┐  ┌────────────┐  ┌─────────────────┐ │
//! │  │ TextBuffer │  │ Highlighter│  │ per-line records│ │
//! │  │  (ropey)   │  │  (engine)  │  │ state/data/fmt  │ │
//! │  └────────────┘  └────────────┘  └─────────────────┘ │
//! │         edit ──► splice records ──► cascade ──► queue │
//! └──────────────────────────────────────────────────────┘
//!                      ▲
//!                   Config (TOML)
//! ```
//!
//! ## Learning: Module Organization
//!
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod config;
pub mod document;

pub use config::{Config, ConfigError};
pub use document::{BracketMatch, HighlightedDocument};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] glint_buffer::BufferError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] glint_syntax::SyntaxError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
