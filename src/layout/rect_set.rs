//! RectSet: A damage accumulator made of non-overlapping rectangles.

use super::rect::Rect;

/// A set of non-overlapping rectangles describing dirty screen area.
///
/// Members never overlap; adjacent members are allowed and are not
/// coalesced. Member order carries no meaning, but a snapshot taken with
/// [`RectSet::rects`] or [`RectSet::take`] is stable until the next
/// mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RectSet {
    rects: Vec<Rect>,
}

impl RectSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Remove every member.
    #[inline]
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Number of member rectangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Check if the set covers nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Get the current members.
    #[inline]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Copy members into `out`, returning how many were copied.
    ///
    /// At most `out.len()` members are copied.
    pub fn get_rects(&self, out: &mut [Rect]) -> usize {
        let n = self.rects.len().min(out.len());
        out[..n].copy_from_slice(&self.rects[..n]);
        n
    }

    /// Snapshot the members and leave the set empty.
    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }

    /// Union `rect` into the set.
    ///
    /// Members that fuse with `rect` into a single rectangle are absorbed
    /// into it first, repeatedly, since each absorption can enable another.
    /// Whatever still overlaps is cut out of the incoming rect, so existing
    /// members keep their edges and only the new area is split.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() || self.contains(&rect) {
            return;
        }

        let mut rect = rect;
        while let Some((idx, merged)) = self.find_fusable(&rect) {
            self.rects.swap_remove(idx);
            rect = merged;
        }

        let mut pieces = vec![rect];
        for member in &self.rects {
            if !pieces.iter().any(|p| p.intersects(member)) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| p.subtract(member))
                .collect();
        }
        self.rects.extend(pieces);
    }

    /// Find a member overlapping `rect` whose union with it is one rect.
    fn find_fusable(&self, rect: &Rect) -> Option<(usize, Rect)> {
        self.rects.iter().enumerate().find_map(|(i, m)| {
            if !m.intersects(rect) {
                return None;
            }
            match m.add(rect).as_slice() {
                [single] => Some((i, *single)),
                _ => None,
            }
        })
    }

    /// Remove `rect`'s area from the set.
    pub fn subtract(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let old = std::mem::take(&mut self.rects);
        for member in old {
            self.rects.extend(member.subtract(&rect));
        }
    }

    /// Check if any member shares a cell with `rect`.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|m| m.intersects(rect))
    }

    /// Check if the members together cover every cell of `rect`.
    pub fn contains(&self, rect: &Rect) -> bool {
        let mut remaining = vec![*rect];
        remaining.retain(|r| !r.is_empty());

        for member in &self.rects {
            if remaining.is_empty() {
                break;
            }
            remaining = remaining
                .into_iter()
                .flat_map(|r| r.subtract(member))
                .collect();
        }
        remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(set: &RectSet) -> i64 {
        set.rects().iter().map(Rect::area).sum()
    }

    #[test]
    fn test_rectset_empty() {
        let set = RectSet::new();
        assert!(set.is_empty());
        assert!(!set.intersects(&Rect::new(0, 0, 5, 5)));
        assert!(!set.contains(&Rect::new(0, 0, 5, 5)));
        assert!(set.contains(&Rect::ZERO));
    }

    #[test]
    fn test_rectset_add_then_contains() {
        let mut set = RectSet::new();
        let r = Rect::new(2, 3, 4, 5);
        set.add(r);
        assert_eq!(set.rects(), &[r]);
        assert!(set.contains(&r));
        assert!(set.contains(&Rect::new(3, 4, 1, 1)));
        assert!(!set.contains(&Rect::new(3, 4, 10, 1)));
    }

    #[test]
    fn test_rectset_add_then_subtract_is_empty() {
        let mut set = RectSet::new();
        let r = Rect::new(1, 1, 10, 10);
        set.add(r);
        set.subtract(r);
        assert!(set.is_empty());
    }

    #[test]
    fn test_rectset_add_covered_is_noop() {
        let mut set = RectSet::new();
        set.add(Rect::new(0, 0, 10, 10));
        set.add(Rect::new(2, 2, 2, 2));
        assert_eq!(set.rects(), &[Rect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn test_rectset_add_absorbs_contained_members() {
        let mut set = RectSet::new();
        set.add(Rect::new(1, 1, 1, 1));
        set.add(Rect::new(5, 5, 1, 1));
        set.add(Rect::new(0, 0, 10, 10));
        assert_eq!(set.rects(), &[Rect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn test_rectset_add_fuses_same_rows() {
        let mut set = RectSet::new();
        set.add(Rect::new(0, 0, 5, 10));
        set.add(Rect::new(0, 5, 5, 10));
        assert_eq!(set.rects(), &[Rect::new(0, 0, 5, 15)]);
    }

    #[test]
    fn test_rectset_add_keeps_existing_edges() {
        let mut set = RectSet::new();
        let base = Rect::new(0, 0, 4, 4);
        set.add(base);
        set.add(Rect::new(2, 2, 4, 4));

        assert!(set.rects().contains(&base));
        assert_eq!(area(&set), 16 + 16 - 4);
        for (i, a) in set.rects().iter().enumerate() {
            for b in &set.rects()[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_rectset_adjacent_not_coalesced() {
        let mut set = RectSet::new();
        set.add(Rect::new(0, 0, 1, 5));
        set.add(Rect::new(1, 0, 1, 3));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Rect::new(0, 0, 2, 3)));
    }

    #[test]
    fn test_rectset_subtract_splits() {
        let mut set = RectSet::new();
        set.add(Rect::new(0, 0, 10, 10));
        set.subtract(Rect::new(3, 3, 4, 4));
        assert_eq!(set.len(), 4);
        assert_eq!(area(&set), 100 - 16);
        assert!(!set.intersects(&Rect::new(3, 3, 4, 4)));
        assert!(set.intersects(&Rect::new(2, 2, 2, 2)));
    }

    #[test]
    fn test_rectset_get_rects_and_take() {
        let mut set = RectSet::new();
        set.add(Rect::new(0, 0, 1, 1));
        set.add(Rect::new(5, 5, 1, 1));

        let mut buf = [Rect::ZERO; 1];
        assert_eq!(set.get_rects(&mut buf), 1);
        assert_eq!(buf[0], Rect::new(0, 0, 1, 1));

        let snapshot = set.take();
        assert_eq!(snapshot.len(), 2);
        assert!(set.is_empty());
    }
}
