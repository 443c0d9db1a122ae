//! Buffer module: The virtual screen a repaint draws into.
//!
//! This module contains:
//! - [`RenderBuffer`]: Clipped, translated, masked drawing into span cells
//! - [`RenderCell`] / [`CellContent`]: What each column holds
//! - [`LineStyle`], [`LineCaps`], [`LineMask`]: Line drawing and junctions
//! - [`FlushStats`]: What a flush sent to the terminal

mod cell;
mod flush;
mod render_buffer;

pub use cell::{CellContent, LineCaps, LineMask, LineStyle, RenderCell};
pub use flush::FlushStats;
pub use render_buffer::RenderBuffer;
