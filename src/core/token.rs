//! Placeholder tokenizer.
//!
//! Splits text into literal runs and `{N}` placeholders. A placeholder is an
//! opening brace, one or more ASCII digits, and a closing brace. Anything else
//! (including `{}`, `{a}`, `{ 1}`) is literal text. Scanning is left to right
//! and matches never overlap.

use crate::schema::prompt::PromptIndex;

/// A segment of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text emitted as-is.
    Literal(&'a str),
    /// A `{digits}` token. `index` is `None` when the digits do not fit in
    /// a `PromptIndex`; such tokens can never name a prompt.
    Placeholder {
        raw: &'a str,
        digits: &'a str,
        index: Option<PromptIndex>,
    },
}

impl<'a> Segment<'a> {
    /// The original text covered by this segment.
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Literal(text) => text,
            Segment::Placeholder { raw, .. } => raw,
        }
    }

    /// The index named by this segment, if it is an in-range placeholder.
    pub fn index(&self) -> Option<PromptIndex> {
        match self {
            Segment::Placeholder { index, .. } => *index,
            Segment::Literal(_) => None,
        }
    }
}

/// Iterator over the segments of a string. See [`segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
}

/// Scan `text` into literal and placeholder segments.
///
/// Concatenating `as_str()` of every segment reproduces `text` exactly.
pub fn segments(text: &str) -> Segments<'_> {
    Segments { text, pos: 0 }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let mut i = start;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                if let Some(end) = placeholder_end(bytes, i) {
                    // Flush the literal run first; the placeholder comes next call.
                    if i > start {
                        self.pos = i;
                        return Some(Segment::Literal(&self.text[start..i]));
                    }
                    self.pos = end;
                    let digits = &self.text[i + 1..end - 1];
                    return Some(Segment::Placeholder {
                        raw: &self.text[i..end],
                        digits,
                        index: digits.parse::<u32>().ok().map(PromptIndex),
                    });
                }
            }
            i += 1;
        }

        self.pos = bytes.len();
        Some(Segment::Literal(&self.text[start..]))
    }
}

/// If a placeholder opens at `open`, return the byte offset just past its
/// closing brace.
fn placeholder_end(bytes: &[u8], open: usize) -> Option<usize> {
    let first_digit = open + 1;
    let mut i = first_digit;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i > first_digit && i < bytes.len() && bytes[i] == b'}' {
        Some(i + 1)
    } else {
        None
    }
}
