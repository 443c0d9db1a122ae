//! Window module: A tree of rectangular windows over one terminal.
//!
//! This module contains:
//! - [`RootWindow`]: Owns the terminal, the window arena and the damage set
//! - [`Window`]: Geometry, visibility, focus, cursor and callbacks of one node
//! - [`WindowId`]: Stable handle to a window in the arena
//!
//! Windows live in a slot map owned by the root. Parents hold an ordered
//! list of child ids (front of the list is topmost); children hold their
//! parent's id. Destroying a window invalidates its id, and using a stale id
//! panics.

mod expose;
mod root;

pub use root::RootWindow;

use crate::buffer::RenderBuffer;
use crate::layout::Rect;
use crate::pen::SharedPen;
use crate::terminal::CursorShape;

slotmap::new_key_type! {
    /// Handle to a window owned by a [`RootWindow`].
    pub struct WindowId;
}

/// Details of one paint request delivered to an expose callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExposeEvent {
    /// The window being painted.
    pub window: WindowId,
    /// Damaged area in window-local coordinates.
    pub rect: Rect,
}

/// Paints a window into the render buffer, already translated and clipped
/// to the window.
pub type ExposeFn = Box<dyn FnMut(&mut RenderBuffer, &ExposeEvent)>;

/// Called after a window's geometry changed.
pub type GeometryChangedFn = Box<dyn FnMut(&mut RootWindow, WindowId)>;

/// Cursor placement requested by a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorState {
    /// Line, window-local.
    pub line: i32,
    /// Column, window-local.
    pub col: i32,
    /// Shape to show when the window has focus.
    pub shape: CursorShape,
    /// Whether the cursor is shown when the window has focus.
    pub visible: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            line: 0,
            col: 0,
            shape: CursorShape::Block,
            visible: false,
        }
    }
}

/// One node of the window tree.
pub struct Window {
    parent: Option<WindowId>,
    children: Vec<WindowId>,
    focused_child: Option<WindowId>,
    pen: Option<SharedPen>,
    rect: Rect,
    cursor: CursorState,
    is_visible: bool,
    is_focused: bool,
    on_expose: Option<ExposeFn>,
    on_geometry_changed: Option<GeometryChangedFn>,
}

impl Window {
    fn new(parent: Option<WindowId>, rect: Rect, visible: bool) -> Self {
        Self {
            parent,
            children: Vec::new(),
            focused_child: None,
            pen: None,
            rect,
            cursor: CursorState::default(),
            is_visible: visible,
            is_focused: false,
            on_expose: None,
            on_geometry_changed: None,
        }
    }

    /// Geometry, relative to the parent.
    #[inline]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Top line, relative to the parent.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.rect.top
    }

    /// Left column, relative to the parent.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.rect.left
    }

    /// Height.
    #[inline]
    pub const fn lines(&self) -> i32 {
        self.rect.lines
    }

    /// Width.
    #[inline]
    pub const fn cols(&self) -> i32 {
        self.rect.cols
    }

    /// Line just below the window, relative to the parent.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.rect.bottom()
    }

    /// Column just right of the window, relative to the parent.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.rect.right()
    }

    /// Parent window; `None` for the root.
    #[inline]
    pub const fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    /// Children, topmost first.
    #[inline]
    pub fn children(&self) -> &[WindowId] {
        &self.children
    }

    /// Child on the path to the focused window, if any.
    #[inline]
    pub const fn focused_child(&self) -> Option<WindowId> {
        self.focused_child
    }

    /// Pen the window paints with.
    #[inline]
    pub const fn pen(&self) -> Option<&SharedPen> {
        self.pen.as_ref()
    }

    /// Requested cursor state.
    #[inline]
    pub const fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Check if the window is shown.
    #[inline]
    pub const fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Check if the window holds focus.
    #[inline]
    pub const fn is_focused(&self) -> bool {
        self.is_focused
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("rect", &self.rect)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("visible", &self.is_visible)
            .field("focused", &self.is_focused)
            .field("has_pen", &self.pen.is_some())
            .finish_non_exhaustive()
    }
}
