//! The shared region scanner.
//!
//! Comments, strings, raw strings and regex literals interact: a `"` inside a comment
//! doesn't open a string, a `//` inside a string doesn't open a comment. So the question
//! "is this position quoted?" can only be answered by walking the line from the start and
//! letting the earliest opener win. The scanner does exactly that and records the result as
//! a list of non-overlapping [`Segment`]s.
//!
//! ## Learning: An Explicit Memo Cursor
//!
//! Predicates ask about positions in arbitrary order, and most of them ask about positions
//! near the start of the line. [`ScanCursor`] scans lazily and remembers how far it got.
//! A query only extends the scan up to the position it asks about, and earlier answers are
//! never recomputed. The cursor is a plain value owned by the line context, not hidden state
//! inside the predicates. It is thrown away whenever a dedicated matcher claims a range,
//! because claims change what the scanner must skip.

use serde::Serialize;
use std::ops::Range;

use crate::block::BlockData;
use crate::context::LineSource;
use crate::dialect::{LexRules, LiteralSyntax, RawSyntax};
use crate::format::TokenKind;
use crate::matchers::{comment, quote, raw, regex};
use crate::state::{BlockState, DelimiterId, DelimiterTable, QuoteKind};

/// A lexical region the scanner knows how to find the end of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    LineComment,
    BlockComment { pair: u8 },
    Quote(QuoteKind),
    DocString(QuoteKind),
    RawString { hashes: u8, byte: bool },
    CppRaw(DelimiterId),
    Regex {
        open: char,
        close: char,
        parts: u8,
        depth: u8,
    },
    QuoteLike { open: char, close: char, depth: u8 },
}

impl Region {
    /// The region a line resumes in, given its entry state.
    pub fn resume(state: &BlockState) -> Option<Region> {
        match *state {
            BlockState::Comment { pair } => Some(Region::BlockComment { pair }),
            BlockState::Quote(kind) => Some(Region::Quote(kind)),
            BlockState::DocString(kind) => Some(Region::DocString(kind)),
            BlockState::RawString { hashes, byte } => Some(Region::RawString { hashes, byte }),
            BlockState::CppRaw(id) => Some(Region::CppRaw(id)),
            BlockState::Regex {
                open,
                close,
                parts,
                depth,
            } => Some(Region::Regex {
                open,
                close,
                parts,
                depth,
            }),
            BlockState::QuoteLike { open, close, depth } => {
                Some(Region::QuoteLike { open, close, depth })
            }
            _ => None,
        }
    }

    /// The state carried to the next line when this region is still open.
    pub fn open_state(&self) -> BlockState {
        match *self {
            Region::LineComment => BlockState::Neutral,
            Region::BlockComment { pair } => BlockState::Comment { pair },
            Region::Quote(kind) => BlockState::Quote(kind),
            Region::DocString(kind) => BlockState::DocString(kind),
            Region::RawString { hashes, byte } => BlockState::RawString { hashes, byte },
            Region::CppRaw(id) => BlockState::CppRaw(id),
            Region::Regex {
                open,
                close,
                parts,
                depth,
            } => BlockState::Regex {
                open,
                close,
                parts,
                depth,
            },
            Region::QuoteLike { open, close, depth } => {
                BlockState::QuoteLike { open, close, depth }
            }
        }
    }

    /// The format a region of this kind gets.
    pub fn kind(&self, lex: &LexRules) -> TokenKind {
        match self {
            Region::LineComment | Region::DocString(_) => TokenKind::Comment,
            Region::BlockComment { pair } => lex
                .block_pairs
                .get(*pair as usize)
                .map_or(TokenKind::Comment, |p| p.kind),
            Region::Quote(QuoteKind::Double | QuoteKind::TripleDouble) => TokenKind::String,
            Region::Quote(_) => TokenKind::AltString,
            Region::RawString { .. } | Region::CppRaw(_) => TokenKind::RawLiteral,
            Region::Regex { .. } => TokenKind::Regex,
            Region::QuoteLike { .. } => TokenKind::String,
        }
    }
}

/// A scanned region on the current line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub range: Range<usize>,
    /// The region as it stands at the end of the segment.
    pub region: Region,
    /// False when the region is still open at the end of the line.
    pub closed: bool,
}

/// Where a region ended.
pub(crate) struct End {
    pub at: usize,
    pub closed: bool,
    pub region: Region,
}

/// Everything the scanner reads besides its own cursor.
pub(crate) struct ScanEnv<'s> {
    pub text: &'s str,
    pub line: usize,
    /// The line is the first of the document (entry state `Start`).
    pub at_document_start: bool,
    pub claims: &'s [Range<usize>],
    pub lex: &'s LexRules,
    pub delimiters: &'s mut DelimiterTable,
    pub doc: &'s dyn LineSource,
    pub prev: Option<&'s BlockData>,
    /// Earlier lines the regex heuristic looked at.
    pub watch: &'s mut Vec<usize>,
}

impl ScanEnv<'_> {
    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn claim_at(&self, pos: usize) -> Option<&Range<usize>> {
        self.claims.iter().find(|claim| claim.contains(&pos))
    }
}

/// Lazily extended scan of one line.
#[derive(Debug, Clone, Default)]
pub struct ScanCursor {
    segments: Vec<Segment>,
    /// Everything before this offset has been scanned
    pos: usize,
    /// A region whose opener has been seen but whose end hasn't been searched for yet
    open: Option<(Region, usize)>,
    done: bool,
}

impl ScanCursor {
    pub fn new(resume: Option<Region>) -> Self {
        Self {
            open: resume.map(|region| (region, 0)),
            ..Self::default()
        }
    }

    pub fn scanned_to(&self) -> usize {
        self.pos
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Scans at least past `upto`.
    pub(crate) fn ensure(&mut self, upto: usize, env: &mut ScanEnv<'_>) {
        while !self.done && (self.pos <= upto || self.open.is_some()) {
            self.step(env);
        }
    }

    /// Scans to the end of the line.
    pub(crate) fn finish(&mut self, env: &mut ScanEnv<'_>) {
        self.ensure(usize::MAX, env);
    }

    /// The segment covering `pos`, if it has been scanned.
    pub fn segment_at(&self, pos: usize) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.range.end <= pos);
        self.segments.get(idx).filter(|s| s.range.contains(&pos))
    }

    /// The last segment, if it's still open at the end of the line. Only meaningful after
    /// [`finish`](Self::finish).
    pub fn open_at_end(&self) -> Option<&Segment> {
        self.segments.last().filter(|s| !s.closed)
    }

    fn step(&mut self, env: &mut ScanEnv<'_>) {
        let len = env.text.len();

        if let Some((region, start)) = self.open.take() {
            let end = find_end(region, env, self.pos);
            tracing::trace!(
                "line {}: {:?} {}..{} closed={}",
                env.line,
                end.region,
                start,
                end.at,
                end.closed
            );
            self.segments.push(Segment {
                range: start..end.at,
                region: end.region,
                closed: end.closed,
            });
            self.pos = end.at;
            if !end.closed || end.at >= len {
                self.done = true;
            }
            return;
        }

        let mut i = self.pos;
        while i < len {
            if let Some(claim) = env.claim_at(i) {
                i = claim.end.max(i + 1);
                continue;
            }
            if let Some((region, opener)) = self.start_at(env, i) {
                self.open = Some((region, i));
                self.pos = (i + opener).min(len);
                return;
            }
            i += 1;
        }
        self.pos = len;
        self.done = true;
    }

    /// The region starting at `i`, if any, with the length of its opener.
    ///
    /// Candidates are tried in priority order: line comment, block comment, raw string,
    /// quote-like literal, quote, slash regex.
    fn start_at(&self, env: &mut ScanEnv<'_>, i: usize) -> Option<(Region, usize)> {
        let bytes = env.text.as_bytes();
        let lex = env.lex;

        if i == 0 && env.at_document_start && bytes.starts_with(b"#!") {
            return Some((Region::LineComment, 2));
        }

        if let Some(len) = comment::line_start(bytes, i, lex) {
            return Some((Region::LineComment, len));
        }
        if let Some((pair, len)) = comment::block_start(bytes, i, lex) {
            return Some((Region::BlockComment { pair }, len));
        }

        match lex.raw {
            RawSyntax::Rust => {
                if let Some((hashes, byte, len)) = raw::rust_start(bytes, i) {
                    return Some((Region::RawString { hashes, byte }, len));
                }
            }
            RawSyntax::Cpp => {
                if let Some((delimiter, len)) = raw::cpp_start(env.text, i) {
                    let id = env.delimiters.intern(delimiter);
                    return Some((Region::CppRaw(id), len));
                }
            }
            RawSyntax::None => {}
        }

        if lex.literals != LiteralSyntax::None {
            if let Some(found) = regex::literal_start(env, &self.segments, i) {
                return Some(found);
            }
        }

        if let Some(found) = quote::start_at(env, i) {
            return Some(found);
        }

        if lex.slash_regex && bytes[i] == b'/' && regex::slash_allowed(env, &self.segments, i) {
            return Some((
                Region::Regex {
                    open: '/',
                    close: '/',
                    parts: 1,
                    depth: 1,
                },
                1,
            ));
        }
        None
    }
}

fn find_end(region: Region, env: &ScanEnv<'_>, from: usize) -> End {
    let bytes = env.bytes();
    match region {
        Region::LineComment => End {
            at: bytes.len(),
            closed: true,
            region,
        },
        Region::BlockComment { pair } => comment::find_end(bytes, from, pair, env.lex),
        Region::Quote(kind) | Region::DocString(kind) => {
            let (at, closed) = quote::find_end(bytes, from, kind, env.lex);
            End { at, closed, region }
        }
        Region::RawString { hashes, .. } => {
            let (at, closed) = raw::rust_end(bytes, from, hashes);
            End { at, closed, region }
        }
        Region::CppRaw(id) => {
            let delimiter = env.delimiters.resolve(id).unwrap_or_default();
            let (at, closed) = raw::cpp_end(bytes, from, delimiter);
            End { at, closed, region }
        }
        Region::Regex { .. } | Region::QuoteLike { .. } => {
            regex::find_end(bytes, from, region, env.lex.regex_multiline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, Language};
    use crate::testing::Lines;

    fn scan(language: Language, text: &str, entry: Option<Region>) -> Vec<Segment> {
        let dialect = Dialect::new(language);
        let lines = Lines::new(text);
        let mut delimiters = DelimiterTable::new();
        let mut watch = Vec::new();
        let mut env = ScanEnv {
            text,
            line: 0,
            at_document_start: true,
            claims: &[],
            lex: dialect.lex(),
            delimiters: &mut delimiters,
            doc: &lines,
            prev: None,
            watch: &mut watch,
        };
        let mut cursor = ScanCursor::new(entry);
        cursor.finish(&mut env);
        cursor.segments().to_vec()
    }

    #[test]
    fn test_earliest_opener_wins() {
        let segs = scan(Language::C, r#"x = "/* not" /* "no" */ y"#, None);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].region, Region::Quote(QuoteKind::Double));
        assert_eq!(segs[1].region, Region::BlockComment { pair: 0 });
        assert!(segs.iter().all(|s| s.closed));
    }

    #[test]
    fn test_resume_inside_comment() {
        let segs = scan(
            Language::C,
            "still */ int x; // tail",
            Some(Region::BlockComment { pair: 0 }),
        );
        assert_eq!(segs[0].range, 0..8);
        assert_eq!(segs[1].region, Region::LineComment);
        assert_eq!(segs[1].range.end, 23);
    }

    #[test]
    fn test_open_at_end() {
        let segs = scan(Language::C, "a /* open", None);
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].closed);
        assert_eq!(segs[0].region.open_state(), BlockState::Comment { pair: 0 });
    }

    #[test]
    fn test_segment_lookup() {
        let dialect = Dialect::new(Language::Python);
        let text = "a = 'x' # c";
        let lines = Lines::new(text);
        let mut delimiters = DelimiterTable::new();
        let mut watch = Vec::new();
        let mut env = ScanEnv {
            text,
            line: 0,
            at_document_start: false,
            claims: &[],
            lex: dialect.lex(),
            delimiters: &mut delimiters,
            doc: &lines,
            prev: None,
            watch: &mut watch,
        };
        let mut cursor = ScanCursor::new(None);
        cursor.ensure(5, &mut env);
        assert!(cursor.scanned_to() >= 5);
        assert!(!cursor.is_done());
        assert_eq!(cursor.segment_at(5).map(|s| s.region), Some(Region::Quote(QuoteKind::Single)));
        assert!(cursor.segment_at(2).is_none());
        cursor.finish(&mut env);
        assert_eq!(cursor.segment_at(9).map(|s| s.region), Some(Region::LineComment));
    }

    #[test]
    fn test_claims_are_skipped() {
        let dialect = Dialect::new(Language::Perl);
        let text = "print <<\"EOF\"; # c";
        let lines = Lines::new(text);
        let mut delimiters = DelimiterTable::new();
        let mut watch = Vec::new();
        let claims = [6..13];
        let mut env = ScanEnv {
            text,
            line: 0,
            at_document_start: false,
            claims: &claims,
            lex: dialect.lex(),
            delimiters: &mut delimiters,
            doc: &lines,
            prev: None,
            watch: &mut watch,
        };
        let mut cursor = ScanCursor::new(None);
        cursor.finish(&mut env);
        assert_eq!(cursor.segments().len(), 1);
        assert_eq!(cursor.segments()[0].region, Region::LineComment);
    }
}
