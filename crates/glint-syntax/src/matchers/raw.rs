//! Raw string literals: Rust `r#"..."#` and C++ `R"delim(...)delim"`.

use super::{Matcher, paint_regions};
use crate::context::LineContext;
use crate::dialect::{LexRules, RawSyntax};
use crate::predicates::is_word_byte;
use crate::scan::Region;
use crate::state::BlockState;

/// C++ limits raw-string delimiters to sixteen characters.
const MAX_CPP_DELIMITER: usize = 16;

#[derive(Debug)]
pub struct RawMatcher;

impl Matcher for RawMatcher {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn run(&self, ctx: &mut LineContext<'_>) {
        paint_regions(ctx, |region| {
            matches!(region, Region::RawString { .. } | Region::CppRaw(_))
        });
        if let BlockState::RawString { hashes, .. } = ctx.exit {
            ctx.data.open_nests = u16::from(hashes);
        }
    }

    fn accepts(&self, state: &BlockState, lex: &LexRules) -> bool {
        matches!(
            (state, lex.raw),
            (BlockState::RawString { .. }, RawSyntax::Rust) | (BlockState::CppRaw(_), RawSyntax::Cpp)
        )
    }
}

/// Rust `r"`, `r#"`, `br##"` at `i`: hash count, byte flag and opener length.
pub(crate) fn rust_start(bytes: &[u8], i: usize) -> Option<(u8, bool, usize)> {
    if i > 0 && is_word_byte(bytes[i - 1]) {
        return None;
    }
    let mut j = i;
    let byte = bytes.get(j) == Some(&b'b');
    if byte {
        j += 1;
    }
    if bytes.get(j) != Some(&b'r') {
        return None;
    }
    j += 1;
    let hashes = bytes[j..].iter().take_while(|b| **b == b'#').count();
    j += hashes;
    if bytes.get(j) != Some(&b'"') {
        return None;
    }
    Some((u8::try_from(hashes).ok()?, byte, j + 1 - i))
}

/// The first `"` followed by at least `hashes` hashes closes the string; exactly
/// `hashes` of them belong to it.
pub(crate) fn rust_end(bytes: &[u8], from: usize, hashes: u8) -> (usize, bool) {
    let needed = usize::from(hashes);
    let mut i = from;
    while let Some(offset) = bytes.get(i..).and_then(|rest| rest.iter().position(|b| *b == b'"')) {
        let quote = i + offset;
        let run = bytes[quote + 1..].iter().take_while(|b| **b == b'#').count();
        if run >= needed {
            return (quote + 1 + needed, true);
        }
        i = quote + 1;
    }
    (bytes.len(), false)
}

/// C++ `R"delim(`, optionally prefixed by `u8`, `u`, `U` or `L`: the delimiter and the
/// opener length.
pub(crate) fn cpp_start(text: &str, i: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if i > 0 && is_word_byte(bytes[i - 1]) {
        return None;
    }
    let prefix = ["u8R\"", "uR\"", "UR\"", "LR\"", "R\""]
        .into_iter()
        .find(|p| bytes[i..].starts_with(p.as_bytes()))?;
    let start = i + prefix.len();
    let paren = bytes[start..]
        .iter()
        .take(MAX_CPP_DELIMITER + 1)
        .position(|b| *b == b'(')?;
    let delimiter = text.get(start..start + paren)?;
    if delimiter
        .bytes()
        .any(|b| b.is_ascii_whitespace() || matches!(b, b')' | b'\\' | b'"'))
    {
        return None;
    }
    Some((delimiter, prefix.len() + paren + 1))
}

pub(crate) fn cpp_end(bytes: &[u8], from: usize, delimiter: &str) -> (usize, bool) {
    let needle: Vec<u8> = [b")", delimiter.as_bytes(), b"\""].concat();
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(needle.len()).position(|w| w == needle.as_slice()))
        .map_or((bytes.len(), false), |offset| (from + offset + needle.len(), true))
}
