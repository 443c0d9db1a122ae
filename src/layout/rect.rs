//! Rect: An axis-aligned rectangle of terminal cells.
//!
//! Coordinates are signed so that translated rects (a child at a negative
//! offset, a window scrolled partly off-screen) stay representable. A rect
//! with zero or negative extent is degenerate: it covers nothing and
//! intersects nothing, but is never an error.

use smallvec::SmallVec;

/// Up to three rects covering the union of two rects.
pub type RectUnion = SmallVec<[Rect; 3]>;

/// Up to four rects covering a rect with a hole punched in it.
pub type RectRemainder = SmallVec<[Rect; 4]>;

/// A rectangle defined by its top-left corner and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Line (row) of the top edge.
    pub top: i32,
    /// Column of the left edge.
    pub left: i32,
    /// Height in lines.
    pub lines: i32,
    /// Width in columns.
    pub cols: i32,
}

impl Rect {
    /// Zero-sized rectangle.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle from its origin and size.
    #[inline]
    pub const fn new(top: i32, left: i32, lines: i32, cols: i32) -> Self {
        Self { top, left, lines, cols }
    }

    /// Create a rectangle from its edges. `bottom` and `right` are exclusive.
    #[inline]
    pub const fn from_bounds(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self::new(top, left, bottom - top, right - left)
    }

    /// Get the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.top + self.lines
    }

    /// Get the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.left + self.cols
    }

    /// Check if the rectangle covers no cells.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.lines <= 0 || self.cols <= 0
    }

    /// Get the area (number of cells). Degenerate rects have area 0.
    #[inline]
    pub const fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.lines as i64) * (self.cols as i64)
        }
    }

    /// Move the rectangle down and right by the given amounts.
    #[inline]
    #[must_use]
    pub const fn translate(&self, down: i32, right: i32) -> Self {
        Self::new(self.top + down, self.left + right, self.lines, self.cols)
    }

    /// Check if a cell lies inside the rectangle.
    #[inline]
    pub const fn contains_point(&self, line: i32, col: i32) -> bool {
        line >= self.top && line < self.bottom() && col >= self.left && col < self.right()
    }

    /// Compute the overlap of two rectangles.
    ///
    /// Returns `None` when they share no cell, including when either is
    /// degenerate.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());

        if bottom <= top || right <= left {
            return None;
        }
        Some(Self::from_bounds(top, left, bottom, right))
    }

    /// Check if this rectangle shares at least one cell with another.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersect(other).is_some()
    }

    /// Check if `small` lies entirely inside this rectangle (edges inclusive).
    #[inline]
    pub const fn contains(&self, small: &Self) -> bool {
        small.top >= self.top
            && small.bottom() <= self.bottom()
            && small.left >= self.left
            && small.right() <= self.right()
    }

    /// Cover the union of two rectangles with non-overlapping pieces.
    ///
    /// Disjoint inputs come back unchanged (two rects) and a union that is
    /// itself a rectangle comes back as one. Otherwise `self` is kept whole
    /// and followed by what is left of `other`, as long as that takes at
    /// most two pieces. When it would take three, both are cut into
    /// horizontal bands at every distinct top/bottom edge instead.
    pub fn add(&self, other: &Self) -> RectUnion {
        let mut out = RectUnion::new();

        if self.is_empty() || other.is_empty() {
            out.extend([*self, *other].into_iter().filter(|r| !r.is_empty()));
            return out;
        }
        if !self.intersects(other) {
            out.push(*self);
            out.push(*other);
            return out;
        }

        let bands = self.bands(other);
        if bands.len() == 1 {
            return bands;
        }
        let rest = other.subtract(self);
        if rest.len() > 2 {
            return bands;
        }
        out.push(*self);
        out.extend(rest);
        out
    }

    /// Horizontal band decomposition of two overlapping rects. Vertically
    /// adjacent bands with the same column span are joined again.
    fn bands(&self, other: &Self) -> RectUnion {
        let mut out = RectUnion::new();
        let mut rows = [self.top, self.bottom(), other.top, other.bottom()];
        rows.sort_unstable();

        for pair in rows.windows(2) {
            let (band_top, band_bottom) = (pair[0], pair[1]);
            if band_top == band_bottom {
                continue;
            }

            let in_a = self.top <= band_top && self.bottom() >= band_bottom;
            let in_b = other.top <= band_top && other.bottom() >= band_bottom;
            let (left, right) = match (in_a, in_b) {
                (true, true) => (
                    self.left.min(other.left),
                    self.right().max(other.right()),
                ),
                (true, false) => (self.left, self.right()),
                (false, true) => (other.left, other.right()),
                (false, false) => continue,
            };

            if let Some(last) = out.last_mut() {
                if last.bottom() == band_top && last.left == left && last.right() == right {
                    last.lines += band_bottom - band_top;
                    continue;
                }
            }
            out.push(Self::from_bounds(band_top, left, band_bottom, right));
        }

        out
    }

    /// Cover this rectangle minus `hole` with non-overlapping pieces.
    ///
    /// Pieces come in the order above, left, right, below. No overlap
    /// returns the rect unchanged; a covering hole returns nothing.
    pub fn subtract(&self, hole: &Self) -> RectRemainder {
        let mut out = RectRemainder::new();
        if self.is_empty() {
            return out;
        }

        let Some(inner) = self.intersect(hole) else {
            out.push(*self);
            return out;
        };

        let pieces = [
            Self::from_bounds(self.top, self.left, inner.top, self.right()),
            Self::from_bounds(inner.top, self.left, inner.bottom(), inner.left),
            Self::from_bounds(inner.top, inner.right(), inner.bottom(), self.right()),
            Self::from_bounds(inner.bottom(), self.left, self.bottom(), self.right()),
        ];
        out.extend(pieces.into_iter().filter(|r| !r.is_empty()));
        out
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect({},{} {}x{})",
            self.top, self.left, self.lines, self.cols
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.bottom(), 6);
        assert_eq!(r.right(), 8);
        assert_eq!(Rect::from_bounds(2, 3, 6, 8), r);
        assert_eq!(r.area(), 20);
    }

    #[test]
    fn test_rect_degenerate() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 5, -1).is_empty());
        assert_eq!(Rect::new(0, 0, -3, 4).area(), 0);
        let full = Rect::new(0, 0, 10, 10);
        assert_eq!(full.intersect(&Rect::new(2, 2, 0, 5)), None);
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 20);
        let b = Rect::new(5, 15, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 15, 5, 5)));
        assert_eq!(b.intersect(&a), Some(Rect::new(5, 15, 5, 5)));

        // Touching edges share no cell
        let c = Rect::new(10, 0, 5, 5);
        assert_eq!(a.intersect(&c), None);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_rect_contains() {
        let large = Rect::new(0, 0, 10, 10);
        assert!(large.contains(&Rect::new(0, 0, 10, 10)));
        assert!(large.contains(&Rect::new(2, 2, 3, 3)));
        assert!(!large.contains(&Rect::new(8, 8, 3, 3)));
        assert!(large.contains_point(9, 9));
        assert!(!large.contains_point(10, 0));
    }

    #[test]
    fn test_rect_add_disjoint() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 5, 2, 2);
        assert_eq!(a.add(&b).as_slice(), &[a, b]);
    }

    #[test]
    fn test_rect_add_contained() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(2, 2, 3, 3);
        assert_eq!(a.add(&b).as_slice(), &[a]);
        assert_eq!(b.add(&a).as_slice(), &[a]);
    }

    #[test]
    fn test_rect_add_same_rows() {
        let a = Rect::new(0, 0, 5, 10);
        let b = Rect::new(0, 5, 5, 10);
        assert_eq!(a.add(&b).as_slice(), &[Rect::new(0, 0, 5, 15)]);
    }

    #[test]
    fn test_rect_add_cross() {
        let tall = Rect::new(0, 4, 10, 2);
        let wide = Rect::new(4, 0, 2, 10);
        assert_eq!(
            tall.add(&wide).as_slice(),
            &[tall, Rect::new(4, 0, 2, 4), Rect::new(4, 6, 2, 4)]
        );
        assert_eq!(
            wide.add(&tall).as_slice(),
            &[wide, Rect::new(0, 4, 4, 2), Rect::new(6, 4, 4, 2)]
        );
    }

    #[test]
    fn test_rect_add_keeps_existing_whole() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(
            a.add(&b).as_slice(),
            &[a, Rect::new(2, 4, 2, 2), Rect::new(4, 2, 2, 4)]
        );
        assert_eq!(
            b.add(&a).as_slice(),
            &[b, Rect::new(0, 0, 2, 4), Rect::new(2, 0, 2, 2)]
        );
    }

    #[test]
    fn test_rect_add_falls_back_to_bands() {
        // What is left of `b` would need three pieces
        let a = Rect::new(2, 2, 2, 4);
        let b = Rect::new(0, 4, 6, 4);
        assert_eq!(
            a.add(&b).as_slice(),
            &[
                Rect::new(0, 4, 2, 4),
                Rect::new(2, 2, 2, 6),
                Rect::new(4, 4, 2, 4),
            ]
        );
    }

    #[test]
    fn test_rect_subtract() {
        let orig = Rect::new(0, 0, 10, 10);

        assert_eq!(
            orig.subtract(&Rect::new(20, 20, 2, 2)).as_slice(),
            &[orig]
        );
        assert!(orig.subtract(&Rect::new(-1, -1, 12, 12)).is_empty());

        let pieces = orig.subtract(&Rect::new(3, 3, 4, 4));
        assert_eq!(
            pieces.as_slice(),
            &[
                Rect::new(0, 0, 3, 10),
                Rect::new(3, 0, 4, 3),
                Rect::new(3, 7, 4, 3),
                Rect::new(7, 0, 3, 10),
            ]
        );

        // A hole along one edge leaves a single band
        let pieces = orig.subtract(&Rect::new(0, 0, 4, 10));
        assert_eq!(pieces.as_slice(), &[Rect::new(4, 0, 6, 10)]);
    }
}
