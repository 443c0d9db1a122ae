//! Flushing: Replay a [`RenderBuffer`] onto a terminal driver.
//!
//! Rows are walked top to bottom and each row left to right:
//! 1. Skipped spans emit nothing
//! 2. Cursor moves are only emitted when the cursor is not already there
//! 3. Adjacent printable spans sharing a pen become one `print`
//! 4. Adjacent erase spans sharing a pen become one `erase_ch`

use super::cell::CellContent;
use super::RenderBuffer;
use crate::terminal::TermDriver;

/// Counts of what a flush sent to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Number of `goto` calls.
    pub cursor_moves: usize,
    /// Number of `set_pen` calls.
    pub pen_changes: usize,
    /// Number of `print` calls.
    pub prints: usize,
    /// Number of `erase_ch` calls.
    pub erases: usize,
    /// Columns written by prints and erases.
    pub columns: usize,
}

/// A run of spans that can go out in one driver call.
enum Run {
    Print(String),
    Erase,
}

impl RenderBuffer {
    /// Send the buffer's content to `term`, then [`reset`](Self::reset) it.
    pub fn flush_to_term(&mut self, term: &mut dyn TermDriver) -> FlushStats {
        let mut stats = FlushStats::default();

        for line in 0..self.lines() {
            // Column the terminal cursor is known to be at on this line
            let mut phycol: Option<i32> = None;
            let mut col = 0;

            while col < self.cols() {
                let head = &self.cells[self.idx(line, col)];
                let start = col;
                let pen = head.pen.clone();

                let run = match &head.content {
                    CellContent::Skip | CellContent::Cont { .. } => {
                        col += head.span.max(1);
                        continue;
                    }
                    CellContent::Erase => Run::Erase,
                    CellContent::Text(_) | CellContent::Char(_) | CellContent::Line(_) => {
                        Run::Print(String::new())
                    }
                };

                // Extend the run over following spans of the same kind and pen
                let mut run = run;
                while col < self.cols() {
                    let cell = &self.cells[self.idx(line, col)];
                    if cell.pen != pen {
                        break;
                    }
                    match (&mut run, &cell.content) {
                        (Run::Erase, CellContent::Erase) => {}
                        (Run::Print(text), CellContent::Text(t)) => text.push_str(t),
                        (Run::Print(text), CellContent::Char(ch)) => text.push(*ch),
                        (Run::Print(text), CellContent::Line(mask)) => text.push(mask.glyph()),
                        _ => break,
                    }
                    col += cell.span.max(1);
                }

                if phycol != Some(start) {
                    term.goto(line, start);
                    stats.cursor_moves += 1;
                }
                term.set_pen(&pen);
                stats.pen_changes += 1;
                stats.columns += usize::try_from(col - start).unwrap_or(0);

                match run {
                    Run::Print(text) => {
                        term.print(&text);
                        stats.prints += 1;
                        phycol = Some(col);
                    }
                    Run::Erase => {
                        let move_end = self.cell(line, col).is_some_and(|c| c.is_drawable());
                        term.erase_ch(col - start, move_end);
                        stats.erases += 1;
                        phycol = move_end.then_some(col);
                    }
                }
            }
        }

        tracing::debug!(
            moves = stats.cursor_moves,
            prints = stats.prints,
            erases = stats.erases,
            columns = stats.columns,
            "flushed render buffer"
        );

        self.reset();
        stats
    }
}
