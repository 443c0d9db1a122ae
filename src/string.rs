//! String measurement along four axes: bytes, codepoints, graphemes and
//! terminal columns.
//!
//! Measurement walks extended grapheme clusters, so a count never stops
//! inside a UTF-8 sequence or between a base character and its combining
//! marks, and a double-width grapheme is taken whole or not at all.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A position in a string, measured along every axis at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringPos {
    /// UTF-8 bytes.
    pub bytes: usize,
    /// Unicode scalar values.
    pub codepoints: usize,
    /// Extended grapheme clusters.
    pub graphemes: usize,
    /// Terminal display columns.
    pub columns: usize,
}

impl StringPos {
    /// The start of a string.
    pub const ZERO: Self = Self {
        bytes: 0,
        codepoints: 0,
        graphemes: 0,
        columns: 0,
    };
}

/// Upper bounds for a count; `None` leaves an axis unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringLimit {
    /// Byte limit.
    pub bytes: Option<usize>,
    /// Codepoint limit.
    pub codepoints: Option<usize>,
    /// Grapheme limit.
    pub graphemes: Option<usize>,
    /// Column limit.
    pub columns: Option<usize>,
}

impl StringLimit {
    /// Limit on bytes only.
    pub const fn bytes(n: usize) -> Self {
        Self {
            bytes: Some(n),
            codepoints: None,
            graphemes: None,
            columns: None,
        }
    }

    /// Limit on codepoints only.
    pub const fn codepoints(n: usize) -> Self {
        Self {
            bytes: None,
            codepoints: Some(n),
            graphemes: None,
            columns: None,
        }
    }

    /// Limit on graphemes only.
    pub const fn graphemes(n: usize) -> Self {
        Self {
            bytes: None,
            codepoints: None,
            graphemes: Some(n),
            columns: None,
        }
    }

    /// Limit on columns only.
    pub const fn columns(n: usize) -> Self {
        Self {
            bytes: None,
            codepoints: None,
            graphemes: None,
            columns: Some(n),
        }
    }

    fn admits(&self, pos: &StringPos) -> bool {
        let within = |limit: Option<usize>, value: usize| limit.map_or(true, |l| value <= l);
        within(self.bytes, pos.bytes)
            && within(self.codepoints, pos.codepoints)
            && within(self.graphemes, pos.graphemes)
            && within(self.columns, pos.columns)
    }
}

/// Display width of a single grapheme cluster.
#[inline]
pub fn grapheme_width(g: &str) -> usize {
    g.width()
}

/// Display width of a whole string.
#[inline]
pub fn width(s: &str) -> usize {
    s.width()
}

/// Measure the longest prefix of `s` that stays within `limit`.
///
/// ```
/// use casement::string::{count, StringLimit};
///
/// let pos = count("caf\u{e9}", None);
/// assert_eq!((pos.bytes, pos.codepoints, pos.columns), (5, 4, 4));
///
/// let pos = count("A\u{ff21}", Some(&StringLimit::columns(2)));
/// assert_eq!(pos.columns, 1);
/// ```
pub fn count(s: &str, limit: Option<&StringLimit>) -> StringPos {
    let mut pos = StringPos::ZERO;
    count_more(s, &mut pos, limit);
    pos
}

/// Continue measuring `s` from `pos`, advancing it in place.
///
/// `pos.bytes` must lie on a grapheme boundary of `s`. Returns the number
/// of bytes consumed by this call.
pub fn count_more(s: &str, pos: &mut StringPos, limit: Option<&StringLimit>) -> usize {
    let start = pos.bytes;
    let Some(rest) = s.get(start..) else {
        return 0;
    };

    for g in rest.graphemes(true) {
        let next = StringPos {
            bytes: pos.bytes + g.len(),
            codepoints: pos.codepoints + g.chars().count(),
            graphemes: pos.graphemes + 1,
            columns: pos.columns + grapheme_width(g),
        };
        if limit.is_some_and(|l| !l.admits(&next)) {
            break;
        }
        *pos = next;
    }

    pos.bytes - start
}

/// Take columns `start..end` of `s`.
///
/// A wide grapheme cut by either edge is replaced by spaces for the part
/// that falls inside the range, so the result is always exactly the
/// requested width when `s` is at least `end` columns wide.
pub fn slice_columns(s: &str, start: usize, end: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut col = 0;
    for g in s.graphemes(true) {
        if col >= end {
            break;
        }
        let w = grapheme_width(g);
        let g_end = col + w;
        if col >= start && g_end <= end {
            out.push_str(g);
        } else if g_end > start {
            let visible = g_end.min(end) - col.max(start);
            out.extend(std::iter::repeat(' ').take(visible));
        }
        col = g_end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(pos: StringPos) -> (usize, usize, usize, usize) {
        (pos.bytes, pos.codepoints, pos.graphemes, pos.columns)
    }

    #[test]
    fn test_count_ascii() {
        assert_eq!(axes(count("hello", None)), (5, 5, 5, 5));
    }

    #[test]
    fn test_count_precomposed() {
        assert_eq!(axes(count("caf\u{e9}", None)), (5, 4, 4, 4));
    }

    #[test]
    fn test_count_combining() {
        assert_eq!(axes(count("cafe\u{301}", None)), (6, 5, 4, 4));
    }

    #[test]
    fn test_count_fullwidth() {
        assert_eq!(axes(count("\u{ff21}", None)), (3, 1, 1, 2));
    }

    #[test]
    fn test_count_limits() {
        let s = "hello world";
        assert_eq!(axes(count(s, Some(&StringLimit::bytes(5)))), (5, 5, 5, 5));
        assert_eq!(axes(count(s, Some(&StringLimit::codepoints(3)))), (3, 3, 3, 3));
        assert_eq!(axes(count(s, Some(&StringLimit::graphemes(4)))), (4, 4, 4, 4));
        assert_eq!(axes(count(s, Some(&StringLimit::columns(6)))), (6, 6, 6, 6));
    }

    #[test]
    fn test_count_limits_never_split() {
        // Byte limit inside a two-byte sequence
        let pos = count("caf\u{e9}", Some(&StringLimit::bytes(4)));
        assert_eq!(pos.bytes, 3);

        // Codepoint limit between base and combining mark
        let pos = count("cafe\u{301}", Some(&StringLimit::codepoints(4)));
        assert_eq!(pos.codepoints, 3);

        // Column limit through a wide character
        let pos = count("A\u{ff21}", Some(&StringLimit::columns(2)));
        assert_eq!(pos.columns, 1);
        assert_eq!(pos.bytes, 1);
    }

    #[test]
    fn test_count_more_resumes() {
        let s = "hello world";
        let mut pos = count(s, Some(&StringLimit::bytes(5)));
        let consumed = count_more(s, &mut pos, None);
        assert_eq!(consumed, 6);
        assert_eq!(axes(pos), (11, 11, 11, 11));
    }

    #[test]
    fn test_slice_columns() {
        assert_eq!(slice_columns("Hello", 1, 3), "el");
        assert_eq!(slice_columns("Hello", 3, 10), "lo");
        assert_eq!(slice_columns("A\u{ff21}B", 0, 2), "A ");
        assert_eq!(slice_columns("A\u{ff21}B", 2, 4), " B");
        assert_eq!(slice_columns("A\u{ff21}B", 1, 3), "\u{ff21}");
    }
}
