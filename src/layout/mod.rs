//! Layout module: Rectangle algebra and damage accumulation.
//!
//! Everything here is a plain value type. Windows describe their geometry
//! with [`Rect`], and the root window collects dirty area in a [`RectSet`]
//! until the next paint pass drains it.

mod rect;
mod rect_set;

pub use rect::{Rect, RectRemainder, RectUnion};
pub use rect_set::RectSet;
