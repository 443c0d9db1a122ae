//! `MockTerm`: A recording [`TermDriver`] for tests.
//!
//! Every driver call is appended to a log of [`TermOp`]s, and a character
//! grid tracks what a real terminal would be showing. Clones share state,
//! so a test can hand one clone to a root window and inspect another.

use super::{CursorShape, TermCtl, TermDriver};
use crate::error::{Error, Result};
use crate::pen::Pen;
use crate::string::grapheme_width;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

/// One recorded driver call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TermOp {
    /// `goto(line, col)`.
    Goto {
        /// Target line.
        line: i32,
        /// Target column.
        col: i32,
    },
    /// `set_pen(pen)`.
    SetPen(Pen),
    /// `print(text)`.
    Print(String),
    /// `erase_ch(count, move_end)`.
    EraseCh {
        /// Columns erased.
        count: i32,
        /// Whether the cursor moved past the span.
        move_end: bool,
    },
    /// `set_ctl_int(ctl, value)`.
    SetCtlInt {
        /// Control.
        ctl: TermCtl,
        /// New value.
        value: i32,
    },
    /// `set_ctl_str(ctl, value)`.
    SetCtlStr {
        /// Control.
        ctl: TermCtl,
        /// New value.
        value: String,
    },
    /// `flush()`.
    Flush,
}

impl TermOp {
    /// Shorthand for a `Goto` op.
    pub const fn goto(line: i32, col: i32) -> Self {
        Self::Goto { line, col }
    }

    /// Shorthand for a `Print` op.
    pub fn print(text: &str) -> Self {
        Self::Print(text.to_owned())
    }

    /// Shorthand for an `EraseCh` op.
    pub const fn erase(count: i32, move_end: bool) -> Self {
        Self::EraseCh { count, move_end }
    }
}

#[derive(Debug)]
struct MockState {
    lines: i32,
    cols: i32,
    cells: Vec<String>,
    pens: Vec<Pen>,
    cursor: (i32, i32),
    pen: Pen,
    ctls: HashMap<TermCtl, i32>,
    log: Vec<TermOp>,
}

impl MockState {
    fn index(&self, line: i32, col: i32) -> Option<usize> {
        if line < 0 || col < 0 || line >= self.lines || col >= self.cols {
            return None;
        }
        usize::try_from(line * self.cols + col).ok()
    }

    fn put(&mut self, line: i32, col: i32, text: &str) {
        if let Some(idx) = self.index(line, col) {
            self.cells[idx] = text.to_owned();
            self.pens[idx] = self.pen.clone();
        }
    }

    fn resize(&mut self, lines: i32, cols: i32) {
        self.lines = lines;
        self.cols = cols;
        let n = usize::try_from(lines.max(0) * cols.max(0)).unwrap_or(0);
        self.cells = vec![" ".to_owned(); n];
        self.pens = vec![Pen::new(); n];
    }
}

/// A recording terminal driver.
#[derive(Clone, Debug)]
pub struct MockTerm {
    state: Rc<RefCell<MockState>>,
}

impl MockTerm {
    /// Create a blank terminal of the given size.
    pub fn new(lines: i32, cols: i32) -> Self {
        let mut ctls = HashMap::new();
        ctls.insert(TermCtl::AltScreen, 0);
        ctls.insert(TermCtl::CursorVisible, 1);
        ctls.insert(TermCtl::Mouse, 0);
        ctls.insert(TermCtl::CursorBlink, 1);
        ctls.insert(TermCtl::CursorShape, CursorShape::Block as i32);
        ctls.insert(TermCtl::KeypadApp, 0);
        ctls.insert(TermCtl::Colors, 256);

        let mut state = MockState {
            lines: 0,
            cols: 0,
            cells: Vec::new(),
            pens: Vec::new(),
            cursor: (0, 0),
            pen: Pen::new(),
            ctls,
            log: Vec::new(),
        };
        state.resize(lines, cols);
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Take the recorded ops, leaving the log empty.
    pub fn take_log(&self) -> Vec<TermOp> {
        std::mem::take(&mut self.state.borrow_mut().log)
    }

    /// Drop the recorded ops.
    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    /// Text of a screen line, wide characters followed by nothing for
    /// their second column.
    pub fn display_text(&self, line: i32) -> String {
        let state = self.state.borrow();
        (0..state.cols)
            .filter_map(|col| state.index(line, col))
            .map(|idx| state.cells[idx].as_str())
            .collect()
    }

    /// Pen a screen cell was last drawn with.
    pub fn cell_pen(&self, line: i32, col: i32) -> Option<Pen> {
        let state = self.state.borrow();
        state.index(line, col).map(|idx| state.pens[idx].clone())
    }

    /// Current cursor position.
    pub fn cursor(&self) -> (i32, i32) {
        self.state.borrow().cursor
    }
}

impl TermDriver for MockTerm {
    fn size(&self) -> (i32, i32) {
        let state = self.state.borrow();
        (state.lines, state.cols)
    }

    fn set_size(&mut self, lines: i32, cols: i32) {
        self.state.borrow_mut().resize(lines, cols);
    }

    fn goto(&mut self, line: i32, col: i32) {
        let mut state = self.state.borrow_mut();
        state.log.push(TermOp::goto(line, col));
        state.cursor = (line, col);
    }

    fn print(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.log.push(TermOp::print(text));
        let (line, mut col) = state.cursor;
        for g in text.graphemes(true) {
            let w = i32::try_from(grapheme_width(g)).unwrap_or(1);
            state.put(line, col, g);
            for extra in 1..w {
                state.put(line, col + extra, "");
            }
            col += w;
        }
        state.cursor = (line, col);
    }

    fn erase_ch(&mut self, count: i32, move_end: bool) {
        let mut state = self.state.borrow_mut();
        state.log.push(TermOp::erase(count, move_end));
        let (line, col) = state.cursor;
        for c in col..col + count {
            state.put(line, c, " ");
        }
        if move_end {
            state.cursor = (line, col + count);
        }
    }

    fn set_pen(&mut self, pen: &Pen) {
        let mut state = self.state.borrow_mut();
        state.log.push(TermOp::SetPen(pen.clone()));
        state.pen = pen.clone();
    }

    fn get_ctl_int(&self, ctl: TermCtl) -> Option<i32> {
        self.state.borrow().ctls.get(&ctl).copied()
    }

    fn set_ctl_int(&mut self, ctl: TermCtl, value: i32) -> Result<()> {
        if ctl == TermCtl::Colors {
            return Err(Error::ReadOnlyCtl(ctl));
        }
        if ctl.is_string() {
            return Err(Error::InvalidCtlValue {
                ctl,
                value: value.to_string(),
            });
        }
        let mut state = self.state.borrow_mut();
        state.log.push(TermOp::SetCtlInt { ctl, value });
        state.ctls.insert(ctl, value);
        Ok(())
    }

    fn set_ctl_str(&mut self, ctl: TermCtl, value: &str) -> Result<()> {
        if !ctl.is_string() {
            return Err(Error::InvalidCtlValue {
                ctl,
                value: value.to_owned(),
            });
        }
        self.state.borrow_mut().log.push(TermOp::SetCtlStr {
            ctl,
            value: value.to_owned(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.state.borrow_mut().log.push(TermOp::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pen::PenAttr;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mock_records_and_draws() {
        let term = MockTerm::new(3, 10);
        let mut driver = term.clone();
        driver.goto(1, 2);
        driver.print("Hi");
        driver.erase_ch(2, true);
        driver.print("!");

        assert_eq!(
            term.take_log(),
            vec![
                TermOp::goto(1, 2),
                TermOp::print("Hi"),
                TermOp::erase(2, true),
                TermOp::print("!"),
            ]
        );
        assert_eq!(term.display_text(1), "  Hi  !   ");
        assert_eq!(term.cursor(), (1, 7));
        assert!(term.take_log().is_empty());
    }

    #[test]
    fn test_mock_wide_chars() {
        let term = MockTerm::new(1, 4);
        let mut driver = term.clone();
        driver.goto(0, 0);
        driver.print("\u{ff21}B");
        assert_eq!(term.display_text(0), "\u{ff21}B ");
        assert_eq!(term.cursor(), (0, 3));
    }

    #[test]
    fn test_mock_pens_and_ctls() {
        let term = MockTerm::new(1, 4);
        let mut driver = term.clone();
        driver.set_pen(&Pen::new().with_colour(PenAttr::Fg, 2));
        driver.goto(0, 1);
        driver.print("x");
        assert_eq!(term.cell_pen(0, 1).unwrap().get_colour_attr(PenAttr::Fg), 2);
        assert_eq!(term.cell_pen(0, 0).unwrap(), Pen::new());

        driver.set_ctl_int(TermCtl::CursorVisible, 0).unwrap();
        assert_eq!(driver.get_ctl_int(TermCtl::CursorVisible), Some(0));
        assert!(driver.set_ctl_int(TermCtl::Colors, 8).is_err());
        assert!(driver.set_ctl_str(TermCtl::Mouse, "on").is_err());
        driver.set_ctl_str(TermCtl::TitleText, "t").unwrap();
    }
}
