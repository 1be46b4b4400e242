//! # Glint - Incremental Syntax Highlighting
//!
//! Highlights a file line by line and prints it with terminal colours, or dumps the
//! classified spans as JSON.
//!
//! ## Quick Start
//!
//! ```bash
//! # Colour a file in the terminal
//! cargo run -- src/main.rs
//!
//! # Force a language and use the dark palette
//! cargo run -- --language yaml --dark deploy.conf
//!
//! # One JSON object per line
//! cargo run -- --json script.sh
//! ```

use clap::Parser;
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glint_core::{Config, HighlightedDocument};
use glint_syntax::{Color, FormatRegistry, Language, LineFormats, Style, TokenKind};

/// Glint - incremental syntax highlighting for the terminal
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Language to use instead of detecting one from the file name
    #[arg(short, long, value_name = "NAME")]
    language: Option<String>,

    /// Print one JSON object per line instead of coloured text
    #[arg(long)]
    json: bool,

    /// Use the dark palette
    #[arg(long)]
    dark: bool,

    /// Show spaces and tabs
    #[arg(long)]
    show_whitespace: bool,

    /// Mark line endings with ¶
    #[arg(long)]
    show_line_endings: bool,

    /// Config file to use instead of the default one
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct LineReport {
    line: usize,
    state: &'static str,
    spans: Vec<SpanReport>,
}

#[derive(Serialize)]
struct SpanReport {
    start: usize,
    end: usize,
    kind: &'static str,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Logs go to stderr so they never mix with the highlighted output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting glint v{}", env!("CARGO_PKG_VERSION"));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&args, &mut out)?;
    out.flush()?;
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let options = &mut config.highlight;
    options.dark_color_scheme |= args.dark;
    options.show_whitespace |= args.show_whitespace;
    options.show_line_endings |= args.show_line_endings;
    Ok(config)
}

fn run(args: &Args, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let language = args
        .language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()?;

    let doc = HighlightedDocument::open(&args.file, &config, language)?;
    tracing::debug!(
        "{} lines classified as {}",
        doc.line_count(),
        doc.language()
    );

    if args.json {
        write_json(&doc, out)
    } else {
        write_ansi(&doc, out)
    }
}

fn write_json(doc: &HighlightedDocument, out: &mut impl Write) -> anyhow::Result<()> {
    for line in 0..doc.line_count() {
        let report = LineReport {
            line,
            state: doc.state(line).map_or("unclassified", |state| state.name()),
            spans: doc
                .spans(line)
                .into_iter()
                .map(|span| SpanReport {
                    start: span.range.start,
                    end: span.range.end,
                    kind: span.kind.name(),
                })
                .collect(),
        };
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    }
    Ok(())
}

// ==================== Terminal Output ====================

/// Terminal background the palette is drawn against, for blending faded colours.
fn background(dark: bool) -> Color {
    if dark {
        Color::rgb(0x1e, 0x1e, 0x1e)
    } else {
        Color::rgb(0xff, 0xff, 0xff)
    }
}

/// Flattens a translucent colour onto `background`.
fn blend(color: Color, background: Color) -> (u8, u8, u8) {
    let mix = |fg: u8, bg: u8| {
        let alpha = u16::from(color.a);
        ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha)) / 255) as u8
    };
    (
        mix(color.r, background.r),
        mix(color.g, background.g),
        mix(color.b, background.b),
    )
}

fn write_styled(out: &mut impl Write, text: &str, style: Style, bg: Color) -> io::Result<()> {
    let (r, g, b) = blend(style.color, bg);
    write!(out, "\x1b[38;2;{r};{g};{b}m")?;
    if style.bold {
        write!(out, "\x1b[1m")?;
    }
    if style.italic {
        write!(out, "\x1b[3m")?;
    }
    if style.underline {
        write!(out, "\x1b[4m")?;
    }
    write!(out, "{text}\x1b[0m")
}

/// Writes one line with its formats applied.
fn render_line(
    out: &mut impl Write,
    text: &str,
    formats: &LineFormats,
    registry: &FormatRegistry,
    bg: Color,
) -> io::Result<()> {
    for span in formats.spans() {
        let piece = match text.get(span.range.clone()) {
            Some(piece) => piece.to_string(),
            None => String::from_utf8_lossy(&text.as_bytes()[span.range.clone()]).into_owned(),
        };
        let piece = if span.kind == TokenKind::Whitespace {
            piece.replace(' ', "·").replace('\t', "→")
        } else {
            piece
        };
        write_styled(out, &piece, registry.style(span.kind), bg)?;
    }
    // bytes past the classified range, if the formats are stale
    if let Some(rest) = text.get(formats.len()..) {
        write!(out, "{rest}")?;
    }
    if let Some(style) = registry.line_ending_style() {
        write_styled(out, "¶", style, bg)?;
    }
    writeln!(out)
}

fn write_ansi(doc: &HighlightedDocument, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = doc.format_registry();
    let bg = background(doc.highlighter().options().dark_color_scheme);
    for line in 0..doc.line_count() {
        let text = doc.line_text(line)?;
        let formats = doc.formats(line).cloned().unwrap_or_default();
        render_line(out, &text, &formats, &registry, bg)?;
    }
    Ok(())
}
