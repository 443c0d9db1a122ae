//! Render cells: What a [`RenderBuffer`](super::RenderBuffer) remembers about
//! each screen column.
//!
//! A buffer row is a sequence of spans. The first column of a span (its
//! head) carries the content and the pen; the remaining columns are
//! continuation cells pointing back at the head.

use crate::pen::Pen;
use bitflags::bitflags;

/// Line-drawing weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LineStyle {
    /// Light single line.
    Single = 1,
    /// Double line.
    Double = 2,
    /// Heavy line.
    Thick = 3,
}

bitflags! {
    /// Which ends of a line segment reach fully to their edge cell.
    ///
    /// Without a cap the end cell only draws the half facing the rest of
    /// the line.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineCaps: u8 {
        /// Extend through the start cell.
        const START = 0b01;
        /// Extend through the end cell.
        const END = 0b10;
        /// Both ends.
        const BOTH = Self::START.bits() | Self::END.bits();
    }
}

impl std::fmt::Debug for LineCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Per-direction line weights meeting in one cell.
///
/// Each arm is `0` (absent) or a [`LineStyle`] value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LineMask {
    /// Arm towards the line above.
    pub north: u8,
    /// Arm towards the right.
    pub east: u8,
    /// Arm towards the line below.
    pub south: u8,
    /// Arm towards the left.
    pub west: u8,
}

impl LineMask {
    /// Combine two masks; arms present in `other` replace ours.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        const fn pick(a: u8, b: u8) -> u8 {
            if b != 0 {
                b
            } else {
                a
            }
        }
        Self {
            north: pick(self.north, other.north),
            east: pick(self.east, other.east),
            south: pick(self.south, other.south),
            west: pick(self.west, other.west),
        }
    }

    /// Index into the junction glyph table.
    #[inline]
    pub const fn index(self) -> usize {
        (self.north & 3) as usize
            | ((self.east & 3) as usize) << 2
            | ((self.south & 3) as usize) << 4
            | ((self.west & 3) as usize) << 6
    }

    /// The box-drawing character for this junction.
    #[inline]
    pub const fn glyph(self) -> char {
        LINE_GLYPHS[self.index()]
    }
}

/// Box-drawing glyphs indexed by `north | east << 2 | south << 4 | west << 6`.
///
/// Junctions Unicode has no glyph for fall back to the nearest available
/// one: double arms become single, then the whole junction goes single.
static LINE_GLYPHS: [char; 256] = [
    ' ', '╵', '╵', '╹', '╶', '└', '╙', '┖',
    '╶', '╘', '╚', '┖', '╺', '┕', '┕', '┗',
    '╷', '│', '│', '╿', '┌', '├', '├', '┞',
    '╒', '╞', '├', '┞', '┍', '┝', '┝', '┡',
    '╷', '│', '║', '╿', '╓', '├', '╟', '┞',
    '╔', '├', '╠', '┞', '┍', '┝', '┝', '┡',
    '╻', '╽', '╽', '┃', '┎', '┟', '┟', '┠',
    '┎', '┟', '┟', '┠', '┏', '┢', '┢', '┣',
    '╴', '┘', '╜', '┚', '─', '┴', '╨', '┸',
    '─', '┴', '┴', '┸', '╼', '┶', '┶', '┺',
    '┐', '┤', '┤', '┦', '┬', '┼', '┼', '╀',
    '┬', '┼', '┼', '╀', '┮', '┾', '┾', '╄',
    '╖', '┤', '╢', '┦', '╥', '┼', '╫', '╀',
    '┬', '┼', '┼', '╀', '┮', '┾', '┾', '╄',
    '┒', '┧', '┧', '┨', '┰', '╁', '╁', '╂',
    '┰', '╁', '╁', '╂', '┲', '╆', '╆', '╊',
    '╴', '╛', '╝', '┚', '─', '┴', '┴', '┸',
    '═', '╧', '╩', '┸', '╼', '┶', '┶', '┺',
    '╕', '╡', '┤', '┦', '┬', '┼', '┼', '╀',
    '╤', '╪', '┼', '╀', '┮', '┾', '┾', '╄',
    '╗', '┤', '╣', '┦', '┬', '┼', '┼', '╀',
    '╦', '┼', '╬', '╀', '┮', '┾', '┾', '╄',
    '┒', '┧', '┧', '┨', '┰', '╁', '╁', '╂',
    '┰', '╁', '╁', '╂', '┲', '╆', '╆', '╊',
    '╸', '┙', '┙', '┛', '╾', '┵', '┵', '┹',
    '╾', '┵', '┵', '┹', '━', '┷', '┷', '┻',
    '┑', '┥', '┥', '┩', '┭', '┽', '┽', '╃',
    '┭', '┽', '┽', '╃', '┯', '┿', '┿', '╇',
    '┑', '┥', '┥', '┩', '┭', '┽', '┽', '╃',
    '┭', '┽', '┽', '╃', '┯', '┿', '┿', '╇',
    '┓', '┪', '┪', '┫', '┱', '╅', '╅', '╉',
    '┱', '╅', '╅', '╉', '┳', '╈', '╈', '╋',
];

/// What a span of cells holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellContent {
    /// Leave the terminal untouched.
    Skip,
    /// Continuation of the span whose head is at column `head`.
    Cont {
        /// Column of the span head.
        head: i32,
    },
    /// Text occupying exactly the span's columns.
    Text(String),
    /// Blank columns.
    Erase,
    /// A single character.
    Char(char),
    /// A line-drawing junction; always one column.
    Line(LineMask),
}

/// One buffer column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderCell {
    pub(crate) content: CellContent,
    pub(crate) span: i32,
    pub(crate) pen: Pen,
}

impl RenderCell {
    /// A one-column skip cell.
    pub(crate) fn skip() -> Self {
        Self {
            content: CellContent::Skip,
            span: 1,
            pen: Pen::new(),
        }
    }

    pub(crate) fn cont(head: i32) -> Self {
        Self {
            content: CellContent::Cont { head },
            span: 0,
            pen: Pen::new(),
        }
    }

    /// Get the content.
    #[inline]
    pub const fn content(&self) -> &CellContent {
        &self.content
    }

    /// Columns covered by this span; `0` for continuation cells.
    #[inline]
    pub const fn span(&self) -> i32 {
        self.span
    }

    /// Pen the span was drawn with.
    #[inline]
    pub const fn pen(&self) -> &Pen {
        &self.pen
    }

    /// Check if flushing this cell writes anything.
    #[inline]
    pub const fn is_drawable(&self) -> bool {
        !matches!(self.content, CellContent::Skip | CellContent::Cont { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(north: u8, east: u8, south: u8, west: u8) -> LineMask {
        LineMask {
            north,
            east,
            south,
            west,
        }
    }

    #[test]
    fn test_line_glyphs_single() {
        assert_eq!(mask(0, 0, 0, 0).glyph(), ' ');
        assert_eq!(mask(0, 1, 0, 0).glyph(), '╶');
        assert_eq!(mask(0, 0, 1, 0).glyph(), '╷');
        assert_eq!(mask(1, 0, 0, 0).glyph(), '╵');
        assert_eq!(mask(0, 1, 0, 1).glyph(), '─');
        assert_eq!(mask(1, 0, 1, 0).glyph(), '│');
        assert_eq!(mask(0, 1, 1, 0).glyph(), '┌');
        assert_eq!(mask(1, 1, 1, 1).glyph(), '┼');
    }

    #[test]
    fn test_line_glyphs_weights() {
        assert_eq!(mask(0, 2, 0, 2).glyph(), '═');
        assert_eq!(mask(2, 0, 2, 0).glyph(), '║');
        assert_eq!(mask(0, 3, 0, 3).glyph(), '━');
        assert_eq!(mask(3, 3, 3, 3).glyph(), '╋');
        assert_eq!(mask(2, 2, 2, 2).glyph(), '╬');
        // No double half-line exists
        assert_eq!(mask(0, 2, 0, 0).glyph(), '╶');
    }

    #[test]
    fn test_line_mask_merge() {
        let vertical = mask(1, 0, 1, 0);
        let horizontal = mask(0, 1, 0, 1);
        assert_eq!(vertical.merge(horizontal), mask(1, 1, 1, 1));
        assert_eq!(vertical.merge(mask(3, 0, 0, 0)), mask(3, 0, 1, 0));
    }

    #[test]
    fn test_line_caps() {
        assert_eq!(LineCaps::BOTH, LineCaps::START | LineCaps::END);
        assert!(!LineCaps::empty().contains(LineCaps::START));
    }
}
