//! # Casement
//!
//! A tree of rectangular windows over a character-cell terminal.
//!
//! Windows never draw directly. Changes record damage against the root,
//! and one later pass repaints every damaged rectangle into a virtual
//! screen before sending the result to the terminal in as few operations
//! as possible.
//!
//! ## Core Concepts
//!
//! - **Rect algebra**: Intersection, union and subtraction of cell rectangles
//! - **Damage sets**: Non-overlapping rect sets that accumulate dirty area
//! - **Window tree**: Nested, ordered, focusable windows in an arena
//! - **Render buffer**: Clipped, translated, masked drawing with save/restore
//! - **Term drivers**: A crossterm backend and a recording mock
//!
//! ## Example
//!
//! ```rust
//! use casement::{MockTerm, Pen, PenAttr, Rect, RootWindow};
//!
//! let term = MockTerm::new(10, 40);
//! let mut root = RootWindow::new(Box::new(term.clone()));
//!
//! let status = root.new_subwindow(root.root(), Rect::new(9, 0, 1, 40));
//! root.set_pen(status, Some(Pen::new().with_colour(PenAttr::Bg, 4).shared()));
//! root.set_on_expose(status, |rb, _| {
//!     rb.erase_at(0, 0, 40, None);
//!     rb.text_at(0, 1, "ready", None);
//! });
//!
//! root.run_later_processing().unwrap();
//! assert_eq!(&term.display_text(9)[1..6], "ready");
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod error;
pub mod layout;
pub mod pen;
pub mod string;
pub mod terminal;
pub mod window;

// Re-exports for convenience
pub use buffer::{CellContent, FlushStats, LineCaps, LineMask, LineStyle, RenderBuffer, RenderCell};
pub use error::{Error, Result};
pub use layout::{Rect, RectRemainder, RectSet, RectUnion};
pub use pen::{Pen, PenAttr, PenAttrType, PenEvent, PenValue, SharedPen};
pub use string::{StringLimit, StringPos};
pub use terminal::{
    AnsiTerm, CursorShape, MockTerm, OutputBuffer, TermConfig, TermCtl, TermDriver, TermOp,
};
pub use window::{CursorState, ExposeEvent, RootWindow, Window, WindowId};
