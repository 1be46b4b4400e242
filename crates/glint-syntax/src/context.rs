//! Per-line working state shared by every matcher.

use std::borrow::Cow;
use std::ops::Range;

use crate::block::BlockData;
use crate::dialect::{Dialect, LexRules};
use crate::format::{LineFormats, TokenKind};
use crate::scan::{Region, ScanCursor, ScanEnv, Segment};
use crate::state::{BlockState, DelimiterTable};

/// Read access to the rest of the document.
///
/// The host implements this. Matchers use it to look at neighbouring lines: the setext
/// heading rule peeks at the next line, the regex heuristic at earlier ones.
pub trait LineSource {
    fn line_count(&self) -> usize;
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;
    /// The exit state recorded for `line`, if it has been classified.
    fn exit_state(&self, line: usize) -> Option<BlockState>;
    fn block_data(&self, line: usize) -> Option<&BlockData>;
}

/// The line being classified plus everything matchers have decided about it so far.
pub struct LineContext<'a> {
    pub text: &'a str,
    pub line: usize,
    /// The state the line resumes from. Matchers that finish the construct the line
    /// started in call [`resume`](Self::resume) to change it.
    pub entry: BlockState,
    pub prev: Option<&'a BlockData>,
    pub doc: &'a dyn LineSource,
    pub dialect: &'a Dialect,
    pub delimiters: &'a mut DelimiterTable,

    pub formats: LineFormats,
    pub exit: BlockState,
    pub data: BlockData,
    /// Exit state that wins over anything set by later matchers (heredoc and YAML block
    /// openers, whose body starts on the next line).
    pub pending_exit: Option<BlockState>,
    /// The whole line belongs to a heredoc or block body; only body-aware matchers run.
    pub body_only: bool,
    /// The previous line must be classified again.
    pub request_previous: bool,
    /// Earlier lines whose tail this line depended on.
    pub watch: Vec<usize>,

    claims: Vec<Range<usize>>,
    scan: Option<ScanCursor>,
}

impl<'a> LineContext<'a> {
    pub fn new(
        text: &'a str,
        line: usize,
        entry: BlockState,
        prev: Option<&'a BlockData>,
        doc: &'a dyn LineSource,
        dialect: &'a Dialect,
        delimiters: &'a mut DelimiterTable,
    ) -> Self {
        Self {
            text,
            line,
            entry,
            prev,
            doc,
            dialect,
            delimiters,
            formats: LineFormats::new(text.len(), TokenKind::Main),
            exit: BlockState::Neutral,
            data: BlockData::new(),
            pending_exit: None,
            body_only: false,
            request_previous: false,
            watch: Vec::new(),
            claims: Vec::new(),
            scan: None,
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    pub fn lex(&self) -> &'a LexRules {
        self.dialect.lex()
    }

    // ==================== Formatting ====================

    pub fn format(&mut self, range: Range<usize>, kind: TokenKind) {
        self.formats.set(range, kind);
    }

    /// Formats `range` and hides it from the region scanner.
    pub fn claim(&mut self, range: Range<usize>, kind: TokenKind) {
        if range.is_empty() {
            return;
        }
        self.formats.set(range.clone(), kind);
        self.claims.push(range);
        self.scan = None;
    }

    pub fn claimed(&self, pos: usize) -> bool {
        self.claims.iter().any(|claim| claim.contains(&pos))
    }

    /// Paints links and notes inside an already formatted comment or string.
    pub fn annotate(&mut self, range: Range<usize>, in_comment: bool) {
        crate::annotate::apply(&mut self.formats, self.text, range, in_comment);
    }

    /// Continues the line as if it had started in `state`.
    pub fn resume(&mut self, state: BlockState) {
        self.entry = state;
        self.scan = None;
    }

    /// Carries nesting, quote flags, property and label over from the previous line.
    pub fn inherit_nesting(&mut self) {
        if let Some(prev) = self.prev {
            self.data.inherit(prev);
        }
    }

    // ==================== Containment ====================

    fn scan_to(&mut self, upto: usize) -> &ScanCursor {
        let resume = Region::resume(&self.entry);
        let cursor = self.scan.get_or_insert_with(|| ScanCursor::new(resume));
        let mut env = ScanEnv {
            text: self.text,
            line: self.line,
            at_document_start: self.line == 0 && self.entry == BlockState::Start,
            claims: &self.claims,
            lex: self.dialect.lex(),
            delimiters: &mut *self.delimiters,
            doc: self.doc,
            prev: self.prev,
            watch: &mut self.watch,
        };
        cursor.ensure(upto, &mut env);
        cursor
    }

    /// The scanned region covering `pos`.
    pub fn region_at(&mut self, pos: usize) -> Option<&Segment> {
        self.scan_to(pos).segment_at(pos)
    }

    /// Inside a string (including quote-like literals).
    pub fn is_quoted(&mut self, pos: usize) -> bool {
        matches!(
            self.region_at(pos).map(|s| s.region),
            Some(Region::Quote(_) | Region::QuoteLike { .. })
        )
    }

    /// Inside a block comment or docstring.
    pub fn is_ml_commented(&mut self, pos: usize) -> bool {
        let lex = self.lex();
        match self.region_at(pos).map(|s| s.region) {
            Some(region @ Region::BlockComment { .. }) => region.kind(lex).is_comment(),
            Some(Region::DocString(_)) => true,
            _ => false,
        }
    }

    /// Inside any comment.
    pub fn is_commented(&mut self, pos: usize) -> bool {
        let lex = self.lex();
        self.region_at(pos)
            .is_some_and(|s| s.region.kind(lex).is_comment())
    }

    /// Inside any scanned region or a claimed range.
    pub fn is_contained(&mut self, pos: usize) -> bool {
        self.claimed(pos) || self.region_at(pos).is_some()
    }

    /// Inside a `[...]` class of a `/.../` regex.
    pub fn in_bracket_class(&mut self, pos: usize) -> bool {
        let bytes = self.bytes();
        match self.region_at(pos) {
            Some(Segment {
                range,
                region: Region::Regex { open: '/', .. },
                ..
            }) => {
                let body = if range.start == 0 && bytes.first() != Some(&b'/') {
                    0
                } else {
                    range.start + 1
                };
                crate::predicates::in_bracket_class(bytes, body, pos)
            }
            _ => false,
        }
    }

    /// Every region on the line, scanning to the end if needed.
    pub fn segments(&mut self) -> Vec<Segment> {
        self.scan_to(usize::MAX).segments().to_vec()
    }

    /// The region still open at the end of the line, if any.
    pub fn open_region(&mut self) -> Option<Segment> {
        self.scan_to(usize::MAX).open_at_end().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Language;
    use crate::testing::Lines;

    fn with_ctx<R>(language: Language, text: &str, f: impl FnOnce(&mut LineContext<'_>) -> R) -> R {
        let dialect = Dialect::new(language);
        let lines = Lines::new(text);
        let mut delimiters = DelimiterTable::new();
        let mut ctx = LineContext::new(
            text,
            0,
            BlockState::Neutral,
            None,
            &lines,
            &dialect,
            &mut delimiters,
        );
        f(&mut ctx)
    }

    #[test]
    fn test_containment_predicates() {
        with_ctx(Language::C, r#"a = "x//y"; /* "q" */ // end"#, |ctx| {
            assert!(ctx.is_quoted(6));
            assert!(!ctx.is_commented(6));
            assert!(ctx.is_ml_commented(15));
            assert!(!ctx.is_quoted(15));
            assert!(ctx.is_commented(24));
            assert!(!ctx.is_ml_commented(24));
            assert!(!ctx.is_contained(0));
        });
    }

    #[test]
    fn test_claim_resets_scan() {
        with_ctx(Language::Python, "x = 'a # b'", |ctx| {
            assert!(ctx.is_quoted(8));
            ctx.claim(4..5, TokenKind::Heredoc);
            assert!(ctx.claimed(4));
            // with the opening quote hidden, `#` now starts a comment
            assert!(ctx.is_commented(8));
        });
    }

    #[test]
    fn test_bracket_class() {
        with_ctx(Language::JavaScript, "x = /[/]a/.test(s)", |ctx| {
            assert!(ctx.in_bracket_class(6));
            assert!(!ctx.in_bracket_class(8));
            assert_eq!(ctx.segments().len(), 1);
            assert_eq!(ctx.segments()[0].range, 4..10);
        });
    }

    #[test]
    fn test_resume_changes_entry() {
        with_ctx(Language::C, "*/ x /* y", |ctx| {
            ctx.resume(BlockState::Comment { pair: 0 });
            assert!(ctx.is_ml_commented(0));
            assert!(!ctx.is_contained(3));
            let open = ctx.open_region().unwrap();
            assert_eq!(open.range, 5..9);
        });
    }
}
