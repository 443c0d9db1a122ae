//! Terminal module: The driver seam between render output and the terminal.
//!
//! This module contains:
//! - [`TermDriver`]: The operations a render pass needs from a terminal
//! - [`AnsiTerm`]: A crossterm-backed driver writing to any `io::Write`
//! - [`MockTerm`]: A recording driver for tests
//! - [`OutputBuffer`]: Single-syscall output accumulation

mod ansi;
pub mod mock;
mod output;

pub use ansi::{AnsiTerm, TermConfig};
pub use mock::{MockTerm, TermOp};
pub use output::OutputBuffer;

use crate::error::Result;
use crate::pen::Pen;

/// A named terminal control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermCtl {
    /// Alternate screen buffer (0 or 1).
    AltScreen,
    /// Cursor visibility (0 or 1).
    CursorVisible,
    /// Mouse reporting (0 off, 1 on).
    Mouse,
    /// Cursor blinking (0 or 1).
    CursorBlink,
    /// Cursor shape, see [`CursorShape`].
    CursorShape,
    /// Icon name (string).
    IconText,
    /// Window title (string).
    TitleText,
    /// Icon name and window title together (string).
    IconTitleText,
    /// Application keypad mode (0 or 1).
    KeypadApp,
    /// Number of colours the terminal supports. Read-only.
    Colors,
}

impl TermCtl {
    /// Check if the control takes a string value.
    pub const fn is_string(self) -> bool {
        matches!(self, Self::IconText | Self::TitleText | Self::IconTitleText)
    }
}

/// Cursor shape, as stored in [`TermCtl::CursorShape`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CursorShape {
    /// Solid block.
    #[default]
    Block = 1,
    /// Underline.
    Under = 2,
    /// Vertical bar at the left of the cell.
    LeftBar = 3,
}

impl CursorShape {
    /// Convert a control value back into a shape.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Block),
            2 => Some(Self::Under),
            3 => Some(Self::LeftBar),
            _ => None,
        }
    }
}

/// The terminal operations a render pass consumes.
///
/// Coordinates are zero-based `(line, col)`. Drivers are free to buffer
/// output until [`TermDriver::flush`].
pub trait TermDriver {
    /// Current size as `(lines, cols)`.
    fn size(&self) -> (i32, i32);

    /// Record a new size, e.g. after a resize signal.
    fn set_size(&mut self, lines: i32, cols: i32);

    /// Move the cursor.
    fn goto(&mut self, line: i32, col: i32);

    /// Print text at the cursor, advancing it.
    fn print(&mut self, text: &str);

    /// Erase `count` columns from the cursor.
    ///
    /// With `move_end` the cursor ends up after the erased span; otherwise
    /// it stays where it was.
    fn erase_ch(&mut self, count: i32, move_end: bool);

    /// Make `pen` the active pen. Unset attributes mean terminal default.
    fn set_pen(&mut self, pen: &Pen);

    /// Read an integer control.
    fn get_ctl_int(&self, ctl: TermCtl) -> Option<i32>;

    /// Set an integer control.
    fn set_ctl_int(&mut self, ctl: TermCtl, value: i32) -> Result<()>;

    /// Set a string control.
    fn set_ctl_str(&mut self, ctl: TermCtl, value: &str) -> Result<()>;

    /// Push buffered output to the terminal.
    fn flush(&mut self) -> Result<()>;
}
