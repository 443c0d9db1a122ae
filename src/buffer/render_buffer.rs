//! `RenderBuffer`: A virtual screen that drawing operations accumulate into.
//!
//! The buffer stores cells in a contiguous `Vec` in row-major order, the
//! same layout a terminal frame has. Drawing calls take virtual
//! coordinates; the current translation maps them to buffer positions, the
//! clip rect bounds them and every mask cuts a hole in them. Whatever
//! survives replaces the overlapped part of existing spans.

use super::cell::{CellContent, LineCaps, LineMask, LineStyle, RenderCell};
use crate::layout::Rect;
use crate::pen::Pen;
use crate::string::{self, slice_columns};
use smallvec::SmallVec;

/// Clip, translation, masks and pen: the part of a buffer that
/// [`RenderBuffer::save`] captures.
#[derive(Clone, Debug)]
struct DrawState {
    clip: Rect,
    translate: (i32, i32),
    masks: Vec<Rect>,
    pen: Option<Pen>,
}

impl DrawState {
    const fn new(lines: i32, cols: i32) -> Self {
        Self {
            clip: Rect::new(0, 0, lines, cols),
            translate: (0, 0),
            masks: Vec::new(),
            pen: None,
        }
    }
}

#[derive(Clone, Debug)]
enum SaveFrame {
    Full(DrawState),
    PenOnly(Option<Pen>),
}

impl SaveFrame {
    const fn pen(&self) -> Option<&Pen> {
        match self {
            Self::Full(state) => state.pen.as_ref(),
            Self::PenOnly(pen) => pen.as_ref(),
        }
    }
}

/// Content to place in one visible piece of a drawing operation.
///
/// Pieces are addressed by their column offset from the start of the
/// operation, so text can be sliced to the part that survived clipping.
enum Source<'a> {
    Text(&'a str),
    Char(char, i32),
    Erase,
    Skip,
}

impl Source<'_> {
    fn piece(&self, offset: i32, cols: i32) -> CellContent {
        match self {
            Self::Text(text) => {
                let start = usize::try_from(offset).unwrap_or(0);
                let end = start + usize::try_from(cols).unwrap_or(0);
                CellContent::Text(slice_columns(text, start, end))
            }
            Self::Char(ch, width) if offset == 0 && cols == *width => CellContent::Char(*ch),
            Self::Char(..) | Self::Erase => CellContent::Erase,
            Self::Skip => CellContent::Skip,
        }
    }
}

/// A screen-sized drawing surface.
///
/// # Example
///
/// ```
/// use casement::{MockTerm, RenderBuffer, TermOp};
///
/// let term = MockTerm::new(5, 20);
/// let mut rb = RenderBuffer::new(5, 20);
/// rb.text_at(1, 2, "Hello", None);
/// rb.flush_to_term(&mut term.clone());
///
/// assert_eq!(term.take_log()[0], TermOp::goto(1, 2));
/// ```
#[derive(Clone)]
pub struct RenderBuffer {
    lines: i32,
    cols: i32,
    pub(super) cells: Vec<RenderCell>,
    state: DrawState,
    stack: Vec<SaveFrame>,
}

impl RenderBuffer {
    /// Create a buffer of the given size with every cell skipped.
    pub fn new(lines: i32, cols: i32) -> Self {
        let lines = lines.max(0);
        let cols = cols.max(0);
        let size = usize::try_from(lines * cols).unwrap_or(0);
        Self {
            lines,
            cols,
            cells: vec![RenderCell::skip(); size],
            state: DrawState::new(lines, cols),
            stack: Vec::new(),
        }
    }

    /// Number of lines.
    #[inline]
    pub const fn lines(&self) -> i32 {
        self.lines
    }

    /// Number of columns.
    #[inline]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Current clip rect, in buffer coordinates.
    #[inline]
    pub const fn clip_rect(&self) -> Rect {
        self.state.clip
    }

    /// Current translation as `(down, right)`.
    #[inline]
    pub const fn translation(&self) -> (i32, i32) {
        self.state.translate
    }

    /// Current pen, if any.
    #[inline]
    pub const fn pen(&self) -> Option<&Pen> {
        self.state.pen.as_ref()
    }

    /// Number of unmatched saves.
    #[inline]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Get the cell at buffer position `(line, col)`.
    pub fn cell(&self, line: i32, col: i32) -> Option<&RenderCell> {
        self.index_of(line, col).map(|i| &self.cells[i])
    }

    #[inline]
    fn index_of(&self, line: i32, col: i32) -> Option<usize> {
        if line < 0 || col < 0 || line >= self.lines || col >= self.cols {
            return None;
        }
        usize::try_from(line * self.cols + col).ok()
    }

    /// Index of a position already known to be inside the buffer.
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub(crate) const fn idx(&self, line: i32, col: i32) -> usize {
        (line * self.cols + col) as usize
    }

    /// Forget all content and drawing state.
    pub fn reset(&mut self) {
        self.cells.fill(RenderCell::skip());
        self.stack.clear();
        self.state = DrawState::new(self.lines, self.cols);
    }

    /// Push the whole drawing state.
    pub fn save(&mut self) {
        self.stack.push(SaveFrame::Full(self.state.clone()));
    }

    /// Push only the pen; the matching restore leaves clip, translation and
    /// masks as they are.
    pub fn savepen(&mut self) {
        self.stack.push(SaveFrame::PenOnly(self.state.pen.clone()));
    }

    /// Pop the state pushed by the matching save.
    ///
    /// # Panics
    ///
    /// Panics if there is no matching save.
    pub fn restore(&mut self) {
        match self.stack.pop() {
            Some(SaveFrame::Full(state)) => self.state = state,
            Some(SaveFrame::PenOnly(pen)) => self.state.pen = pen,
            None => panic!("RenderBuffer::restore without a matching save"),
        }
    }

    /// Narrow the clip to `rect` (virtual coordinates).
    pub fn clip(&mut self, rect: Rect) {
        let (down, right) = self.state.translate;
        let abs = rect.translate(down, right);
        self.state.clip = self
            .state
            .clip
            .intersect(&abs)
            .unwrap_or(Rect::new(abs.top, abs.left, 0, 0));
    }

    /// Offset subsequent drawing by `(down, right)`.
    pub fn translate(&mut self, down: i32, right: i32) {
        self.state.translate.0 += down;
        self.state.translate.1 += right;
    }

    /// Exclude `rect` (virtual coordinates) from subsequent drawing.
    pub fn mask(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let (down, right) = self.state.translate;
        self.state.masks.push(rect.translate(down, right));
    }

    /// Set the current pen.
    ///
    /// The pen is layered over the pen in effect at the enclosing save, so
    /// attributes it leaves unset are inherited. `None` reverts to that
    /// inherited pen.
    pub fn set_pen(&mut self, pen: Option<&Pen>) {
        let base = self.stack.last().and_then(SaveFrame::pen);
        self.state.pen = match (pen, base) {
            (Some(pen), Some(base)) => {
                let mut merged = pen.clone();
                merged.copy(base, false);
                Some(merged)
            }
            (Some(pen), None) => Some(pen.clone()),
            (None, base) => base.cloned(),
        };
    }

    /// The pen a drawing call with `pen` ends up using.
    fn draw_pen(&self, pen: Option<&Pen>) -> Pen {
        let mut out = pen.cloned().unwrap_or_default();
        if let Some(current) = &self.state.pen {
            out.copy(current, false);
        }
        out
    }

    /// Draw text at `(line, col)`, returning the columns it covers before
    /// clipping.
    pub fn text_at(&mut self, line: i32, col: i32, text: &str, pen: Option<&Pen>) -> i32 {
        let cols = i32::try_from(string::width(text)).unwrap_or(i32::MAX);
        let pen = self.draw_pen(pen);
        let (line, col) = self.to_abs(line, col);
        self.draw_span(line, col, cols, &Source::Text(text), &pen);
        cols
    }

    /// Draw a single character at `(line, col)`.
    ///
    /// A wide character cut by the clip or a mask is drawn as blanks.
    pub fn char_at(&mut self, line: i32, col: i32, ch: char, pen: Option<&Pen>) {
        let width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        let width = i32::try_from(width).unwrap_or(1).max(1);
        let pen = self.draw_pen(pen);
        let (line, col) = self.to_abs(line, col);
        self.draw_span(line, col, width, &Source::Char(ch, width), &pen);
    }

    /// Blank `count` columns from `(line, col)`.
    pub fn erase_at(&mut self, line: i32, col: i32, count: i32, pen: Option<&Pen>) {
        let pen = self.draw_pen(pen);
        let (line, col) = self.to_abs(line, col);
        self.draw_span(line, col, count, &Source::Erase, &pen);
    }

    /// Leave `count` columns from `(line, col)` untouched on the terminal.
    pub fn skip_at(&mut self, line: i32, col: i32, count: i32) {
        let (line, col) = self.to_abs(line, col);
        self.draw_span(line, col, count, &Source::Skip, &Pen::new());
    }

    /// Blank every cell of `rect`.
    pub fn erase_rect(&mut self, rect: Rect, pen: Option<&Pen>) {
        for line in rect.top..rect.bottom() {
            self.erase_at(line, rect.left, rect.cols, pen);
        }
    }

    /// Blank the whole buffer, respecting clip and masks but not
    /// translation.
    pub fn clear(&mut self, pen: Option<&Pen>) {
        let pen = self.draw_pen(pen);
        for line in 0..self.lines {
            self.draw_span(line, 0, self.cols, &Source::Erase, &pen);
        }
    }

    /// Draw a horizontal line along `line` from `startcol` to `endcol`
    /// inclusive.
    pub fn hline_at(
        &mut self,
        line: i32,
        startcol: i32,
        endcol: i32,
        style: LineStyle,
        pen: Option<&Pen>,
        caps: LineCaps,
    ) {
        let pen = self.draw_pen(pen);
        let s = style as u8;
        for col in startcol..=endcol {
            let mask = LineMask {
                east: if col < endcol || caps.contains(LineCaps::END) { s } else { 0 },
                west: if col > startcol || caps.contains(LineCaps::START) { s } else { 0 },
                ..LineMask::default()
            };
            let (l, c) = self.to_abs(line, col);
            self.line_cell(l, c, mask, &pen);
        }
    }

    /// Draw a vertical line down `col` from `startline` to `endline`
    /// inclusive.
    pub fn vline_at(
        &mut self,
        startline: i32,
        endline: i32,
        col: i32,
        style: LineStyle,
        pen: Option<&Pen>,
        caps: LineCaps,
    ) {
        let pen = self.draw_pen(pen);
        let s = style as u8;
        for line in startline..=endline {
            let mask = LineMask {
                south: if line < endline || caps.contains(LineCaps::END) { s } else { 0 },
                north: if line > startline || caps.contains(LineCaps::START) { s } else { 0 },
                ..LineMask::default()
            };
            let (l, c) = self.to_abs(line, col);
            self.line_cell(l, c, mask, &pen);
        }
    }

    /// Copy `src`'s content into this buffer.
    ///
    /// Each of `src`'s spans is replayed as a drawing call at its buffer
    /// position, so it passes through this buffer's translation, clip and
    /// masks. The span's own pen is layered over this buffer's current pen.
    /// Erases overwrite, skips leave content alone and line cells merge
    /// into existing junctions. `src` is not modified.
    pub fn blit(&mut self, src: &Self) {
        for line in 0..src.lines {
            let mut col = 0;
            while col < src.cols {
                let cell = &src.cells[src.idx(line, col)];
                let pen = Some(&cell.pen);
                match &cell.content {
                    CellContent::Text(text) => {
                        self.text_at(line, col, text, pen);
                    }
                    CellContent::Char(ch) => self.char_at(line, col, *ch, pen),
                    CellContent::Erase => self.erase_at(line, col, cell.span, pen),
                    CellContent::Line(mask) => {
                        let pen = self.draw_pen(pen);
                        let (l, c) = self.to_abs(line, col);
                        self.line_cell(l, c, *mask, &pen);
                    }
                    CellContent::Skip | CellContent::Cont { .. } => {}
                }
                col += cell.span.max(1);
            }
        }
    }

    #[inline]
    const fn to_abs(&self, line: i32, col: i32) -> (i32, i32) {
        (line + self.state.translate.0, col + self.state.translate.1)
    }

    fn visible_pieces(&self, line: i32, col: i32, cols: i32) -> SmallVec<[Rect; 4]> {
        let mut pieces = SmallVec::new();
        if cols <= 0 {
            return pieces;
        }
        let Some(visible) = Rect::new(line, col, 1, cols).intersect(&self.state.clip) else {
            return pieces;
        };
        pieces.push(visible);
        for mask in &self.state.masks {
            if !pieces.iter().any(|p: &Rect| p.intersects(mask)) {
                continue;
            }
            pieces = pieces.into_iter().flat_map(|p| p.subtract(mask)).collect();
        }
        pieces.sort_by_key(|p| p.left);
        pieces
    }

    /// Draw at buffer coordinates, cutting the operation around clip and masks.
    fn draw_span(&mut self, line: i32, col: i32, cols: i32, source: &Source<'_>, pen: &Pen) {
        for piece in self.visible_pieces(line, col, cols) {
            let content = source.piece(piece.left - col, piece.cols);
            self.make_span(line, piece.left, piece.cols, content, pen.clone());
        }
    }

    fn line_cell(&mut self, line: i32, col: i32, mask: LineMask, pen: &Pen) {
        if self.visible_pieces(line, col, 1).is_empty() {
            return;
        }
        let merged = match self.cell(line, col).map(RenderCell::content) {
            Some(CellContent::Line(existing)) => existing.merge(mask),
            _ => mask,
        };
        self.make_span(line, col, 1, CellContent::Line(merged), pen.clone());
    }

    /// Replace columns `col..col + cols` of `line` with one span.
    fn make_span(&mut self, line: i32, col: i32, cols: i32, content: CellContent, pen: Pen) {
        self.split_at(line, col);
        self.split_at(line, col + cols);

        let head = self.idx(line, col);
        self.cells[head] = RenderCell {
            content,
            span: cols,
            pen,
        };
        for c in col + 1..col + cols {
            let i = self.idx(line, c);
            self.cells[i] = RenderCell::cont(col);
        }
    }

    /// Make `col` the start of a span, cutting any span that runs across it.
    fn split_at(&mut self, line: i32, col: i32) {
        if col <= 0 || col >= self.cols {
            return;
        }
        let CellContent::Cont { head } = self.cells[self.idx(line, col)].content else {
            return;
        };

        let head_idx = self.idx(line, head);
        let old = self.cells[head_idx].clone();
        let left_cols = col - head;
        let right_cols = old.span - left_cols;

        let (left, right) = match &old.content {
            CellContent::Text(text) => {
                let cut = usize::try_from(left_cols).unwrap_or(0);
                let end = usize::try_from(old.span).unwrap_or(0);
                (
                    CellContent::Text(slice_columns(text, 0, cut)),
                    CellContent::Text(slice_columns(text, cut, end)),
                )
            }
            CellContent::Char(_) | CellContent::Erase => (CellContent::Erase, CellContent::Erase),
            other => (other.clone(), other.clone()),
        };

        self.cells[head_idx].content = left;
        self.cells[head_idx].span = left_cols;

        let right_idx = self.idx(line, col);
        self.cells[right_idx] = RenderCell {
            content: right,
            span: right_cols,
            pen: old.pen,
        };
        for c in col + 1..col + right_cols {
            let i = self.idx(line, c);
            self.cells[i] = RenderCell::cont(col);
        }
    }

    /// Iterate the span heads of `line` as `(col, cell)`.
    pub fn spans(&self, line: i32) -> impl Iterator<Item = (i32, &RenderCell)> + '_ {
        let mut col = 0;
        std::iter::from_fn(move || {
            if line < 0 || line >= self.lines || col >= self.cols {
                return None;
            }
            let at = col;
            let cell = &self.cells[self.idx(line, at)];
            col += cell.span.max(1);
            Some((at, cell))
        })
    }
}

impl std::fmt::Debug for RenderBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBuffer")
            .field("lines", &self.lines)
            .field("cols", &self.cols)
            .field("clip", &self.state.clip)
            .field("translate", &self.state.translate)
            .field("masks", &self.state.masks.len())
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}
