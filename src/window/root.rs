//! `RootWindow`: The window arena, tree operations and terminal binding.

use super::{CursorState, ExposeEvent, GeometryChangedFn, Window, WindowId};
use crate::buffer::RenderBuffer;
use crate::layout::{Rect, RectSet};
use crate::pen::SharedPen;
use crate::terminal::{CursorShape, TermDriver};
use slotmap::SlotMap;

/// Where a new window goes in its parent's child list.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Placement {
    Front,
    Back,
}

/// The top of a window tree, bound to one terminal.
///
/// Every window operation goes through the root, addressed by
/// [`WindowId`]. Mutations record damage; nothing reaches the terminal
/// until [`RootWindow::run_later_processing`].
///
/// # Example
///
/// ```
/// use casement::{MockTerm, Rect, RootWindow};
///
/// let term = MockTerm::new(25, 80);
/// let mut root = RootWindow::new(Box::new(term.clone()));
/// let win = root.new_subwindow(root.root(), Rect::new(2, 2, 5, 10));
/// root.set_on_expose(win, |rb, ev| {
///     rb.text_at(0, 0, "hi", None);
///     assert_eq!(ev.rect.lines, 5);
/// });
/// root.run_later_processing().unwrap();
/// assert_eq!(&term.display_text(2)[2..4], "hi");
/// ```
pub struct RootWindow {
    pub(super) term: Box<dyn TermDriver>,
    pub(super) windows: SlotMap<WindowId, Window>,
    pub(super) root: WindowId,
    pub(super) damage: RectSet,
    pub(super) needs_expose: bool,
    pub(super) needs_restore: bool,
    pub(super) needs_later_processing: bool,
    pub(super) input_capture: Option<WindowId>,
}

impl RootWindow {
    /// Create a root window covering the terminal's current size.
    pub fn new(term: Box<dyn TermDriver>) -> Self {
        let (lines, cols) = term.size();
        let mut windows = SlotMap::with_key();
        let root = windows.insert(Window::new(None, Rect::new(0, 0, lines, cols), true));
        Self {
            term,
            windows,
            root,
            damage: RectSet::new(),
            needs_expose: false,
            needs_restore: false,
            needs_later_processing: false,
            input_capture: None,
        }
    }

    /// Id of the root window itself.
    #[inline]
    pub const fn root(&self) -> WindowId {
        self.root
    }

    /// Get a window.
    ///
    /// # Panics
    ///
    /// Panics if `id` was destroyed.
    #[inline]
    pub fn window(&self, id: WindowId) -> &Window {
        &self.windows[id]
    }

    /// Check if `id` refers to a live window.
    #[inline]
    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    /// Number of live windows, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Always false: the root itself is a window.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The terminal driver.
    pub fn term(&self) -> &dyn TermDriver {
        self.term.as_ref()
    }

    /// The terminal driver, mutably.
    pub fn term_mut(&mut self) -> &mut dyn TermDriver {
        self.term.as_mut()
    }

    /// Accumulated damage, in root coordinates.
    #[inline]
    pub const fn damage(&self) -> &RectSet {
        &self.damage
    }

    /// Window that captured input, if a popup is open.
    #[inline]
    pub const fn input_capture(&self) -> Option<WindowId> {
        self.input_capture
    }

    /// Check if [`RootWindow::run_later_processing`] has work to do.
    #[inline]
    pub const fn needs_later_processing(&self) -> bool {
        self.needs_later_processing
    }

    /// Walk up from `id` to the top of its tree.
    pub fn root_of(&self, id: WindowId) -> WindowId {
        let mut id = id;
        while let Some(parent) = self.windows[id].parent {
            id = parent;
        }
        id
    }

    /// Parent of `id`.
    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.windows[id].parent
    }

    /// Children of `id`, topmost first.
    pub fn children(&self, id: WindowId) -> &[WindowId] {
        &self.windows[id].children
    }

    /// Top line on the terminal.
    pub fn abs_top(&self, id: WindowId) -> i32 {
        let mut top = 0;
        let mut cur = Some(id);
        while let Some(w) = cur {
            top += self.windows[w].rect.top;
            cur = self.windows[w].parent;
        }
        top
    }

    /// Left column on the terminal.
    pub fn abs_left(&self, id: WindowId) -> i32 {
        let mut left = 0;
        let mut cur = Some(id);
        while let Some(w) = cur {
            left += self.windows[w].rect.left;
            cur = self.windows[w].parent;
        }
        left
    }

    /// Geometry on the terminal.
    pub fn abs_rect(&self, id: WindowId) -> Rect {
        let rect = self.windows[id].rect;
        Rect::new(self.abs_top(id), self.abs_left(id), rect.lines, rect.cols)
    }

    fn attach(&mut self, parent: WindowId, rect: Rect, visible: bool, at: Placement) -> WindowId {
        let id = self.windows.insert(Window::new(Some(parent), rect, visible));
        let siblings = &mut self.windows[parent].children;
        match at {
            Placement::Front => siblings.insert(0, id),
            Placement::Back => siblings.push(id),
        }
        tracing::trace!(?id, ?parent, ?rect, "window created");
        if visible {
            self.expose(id, None);
        }
        id
    }

    /// Create a visible child at the bottom of `parent`'s stacking order.
    pub fn new_subwindow(&mut self, parent: WindowId, rect: Rect) -> WindowId {
        self.attach(parent, rect, true, Placement::Back)
    }

    /// Create a hidden child at the bottom of `parent`'s stacking order.
    pub fn new_hidden_subwindow(&mut self, parent: WindowId, rect: Rect) -> WindowId {
        self.attach(parent, rect, false, Placement::Back)
    }

    /// Create a visible child on top of its siblings.
    pub fn new_float(&mut self, parent: WindowId, rect: Rect) -> WindowId {
        self.attach(parent, rect, true, Placement::Front)
    }

    /// Create a popup: a float on the root, positioned relative to `parent`,
    /// that captures input.
    pub fn new_popup(&mut self, parent: WindowId, rect: Rect) -> WindowId {
        let mut rect = rect;
        let mut cur = parent;
        while let Some(up) = self.windows[cur].parent {
            let origin = self.windows[cur].rect;
            rect = rect.translate(origin.top, origin.left);
            cur = up;
        }
        let id = self.attach(cur, rect, true, Placement::Front);
        self.input_capture = Some(id);
        id
    }

    /// Destroy `id` and all its descendants.
    ///
    /// The vacated area of a visible window is exposed on its parent.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root or was already destroyed.
    pub fn destroy(&mut self, id: WindowId) {
        assert!(id != self.root, "the root window cannot be destroyed");

        let children = self.windows[id].children.clone();
        for child in children {
            self.destroy(child);
        }

        let Some(window) = self.windows.remove(id) else {
            return;
        };
        if self.input_capture == Some(id) {
            self.input_capture = None;
        }
        if let Some(parent) = window.parent {
            let p = &mut self.windows[parent];
            p.children.retain(|c| *c != id);
            if p.focused_child == Some(id) {
                p.focused_child = None;
            }
            if window.is_visible {
                self.expose(parent, Some(window.rect));
            }
        }
        if window.is_focused {
            self.request_restore();
        }
        tracing::debug!(?id, rect = ?window.rect, "window destroyed");
    }

    /// Make `id` visible and expose it.
    pub fn show(&mut self, id: WindowId) {
        let window = &mut self.windows[id];
        window.is_visible = true;
        if window.is_focused {
            self.request_restore();
        }
        self.expose(id, None);
    }

    /// Hide `id`, exposing its old area on the parent.
    ///
    /// The root cannot be hidden; the call is ignored.
    pub fn hide(&mut self, id: WindowId) {
        let window = &mut self.windows[id];
        let Some(parent) = window.parent else {
            tracing::warn!("ignoring request to hide the root window");
            return;
        };
        window.is_visible = false;
        let (rect, focused) = (window.rect, window.is_focused);
        if focused {
            self.request_restore();
        }
        self.expose(parent, Some(rect));
    }

    /// Check if `id` is shown.
    pub fn is_visible(&self, id: WindowId) -> bool {
        self.windows[id].is_visible
    }

    /// Change geometry, calling the geometry-changed callback if it differs.
    ///
    /// Nothing is exposed; the callback decides what to repaint.
    pub fn set_geometry(&mut self, id: WindowId, rect: Rect) {
        let window = &mut self.windows[id];
        if window.rect == rect {
            return;
        }
        window.rect = rect;

        let Some(mut callback) = window.on_geometry_changed.take() else {
            return;
        };
        callback(self, id);
        if let Some(window) = self.windows.get_mut(id) {
            if window.on_geometry_changed.is_none() {
                window.on_geometry_changed = Some(callback);
            }
        }
    }

    /// Change size, keeping position.
    pub fn resize(&mut self, id: WindowId, lines: i32, cols: i32) {
        let rect = self.windows[id].rect;
        self.set_geometry(id, Rect::new(rect.top, rect.left, lines, cols));
    }

    /// Change position, keeping size. A focused window's cursor follows.
    pub fn reposition(&mut self, id: WindowId, top: i32, left: i32) {
        let rect = self.windows[id].rect;
        self.set_geometry(id, Rect::new(top, left, rect.lines, rect.cols));
        if self.windows.get(id).is_some_and(|w| w.is_focused) {
            self.request_restore();
        }
    }

    /// Install the geometry-changed callback.
    pub fn set_on_geometry_changed<F>(&mut self, id: WindowId, callback: F)
    where
        F: FnMut(&mut Self, WindowId) + 'static,
    {
        self.windows[id].on_geometry_changed = Some(Box::new(callback) as GeometryChangedFn);
    }

    /// Remove the geometry-changed callback.
    pub fn clear_on_geometry_changed(&mut self, id: WindowId) {
        self.windows[id].on_geometry_changed = None;
    }

    /// Install the expose callback.
    pub fn set_on_expose<F>(&mut self, id: WindowId, callback: F)
    where
        F: FnMut(&mut RenderBuffer, &ExposeEvent) + 'static,
    {
        self.windows[id].on_expose = Some(Box::new(callback));
    }

    /// Remove the expose callback.
    pub fn clear_on_expose(&mut self, id: WindowId) {
        self.windows[id].on_expose = None;
    }

    /// Attach a pen (or detach with `None`) and expose the window.
    ///
    /// The window only holds a handle; the pen lives as long as its owner
    /// keeps it.
    pub fn set_pen(&mut self, id: WindowId, pen: Option<SharedPen>) {
        self.windows[id].pen = pen;
        self.expose(id, None);
    }

    fn sibling_position(&self, id: WindowId) -> Option<(WindowId, usize)> {
        let parent = self.windows[id].parent?;
        let pos = self.windows[parent].children.iter().position(|c| *c == id)?;
        Some((parent, pos))
    }

    /// Move one step towards the top of the stacking order.
    pub fn raise(&mut self, id: WindowId) {
        if let Some((parent, pos)) = self.sibling_position(id) {
            if pos > 0 {
                self.windows[parent].children.swap(pos, pos - 1);
            }
        }
    }

    /// Move to the top of the stacking order.
    pub fn raise_to_front(&mut self, id: WindowId) {
        if let Some((parent, pos)) = self.sibling_position(id) {
            let siblings = &mut self.windows[parent].children;
            siblings.remove(pos);
            siblings.insert(0, id);
        }
    }

    /// Move one step towards the bottom of the stacking order.
    pub fn lower(&mut self, id: WindowId) {
        if let Some((parent, pos)) = self.sibling_position(id) {
            let siblings = &mut self.windows[parent].children;
            if pos + 1 < siblings.len() {
                siblings.swap(pos, pos + 1);
            }
        }
    }

    /// Move to the bottom of the stacking order.
    pub fn lower_to_back(&mut self, id: WindowId) {
        if let Some((parent, pos)) = self.sibling_position(id) {
            let siblings = &mut self.windows[parent].children;
            siblings.remove(pos);
            siblings.push(id);
        }
    }

    /// Give `id` the focus, taking it from whichever window had it.
    pub fn take_focus(&mut self, id: WindowId) {
        let mut cur = self.root;
        while let Some(child) = self.windows[cur].focused_child {
            cur = child;
        }
        self.windows[cur].is_focused = false;

        let window = &mut self.windows[id];
        window.is_focused = true;
        window.focused_child = None;

        let mut child = id;
        while let Some(parent) = self.windows[child].parent {
            self.windows[parent].focused_child = Some(child);
            child = parent;
        }
        self.request_restore();
    }

    /// Check if `id` holds focus.
    pub fn is_focused(&self, id: WindowId) -> bool {
        self.windows[id].is_focused
    }

    fn update_cursor(&mut self, id: WindowId, update: impl FnOnce(&mut CursorState)) {
        let window = &mut self.windows[id];
        update(&mut window.cursor);
        if window.is_focused {
            self.request_restore();
        }
    }

    /// Place the cursor, window-local.
    pub fn set_cursor_position(&mut self, id: WindowId, line: i32, col: i32) {
        self.update_cursor(id, |c| {
            c.line = line;
            c.col = col;
        });
    }

    /// Show or hide the cursor while `id` is focused.
    pub fn set_cursor_visible(&mut self, id: WindowId, visible: bool) {
        self.update_cursor(id, |c| c.visible = visible);
    }

    /// Set the cursor shape used while `id` is focused.
    pub fn set_cursor_shape(&mut self, id: WindowId, shape: CursorShape) {
        self.update_cursor(id, |c| c.shape = shape);
    }

    /// Follow a terminal resize: resize the root and repaint everything.
    pub fn term_resized(&mut self, lines: i32, cols: i32) {
        self.term.set_size(lines, cols);
        self.set_geometry(self.root, Rect::new(0, 0, lines, cols));
        self.expose(self.root, None);
    }
}

impl std::fmt::Debug for RootWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootWindow")
            .field("size", &self.term.size())
            .field("windows", &self.windows.len())
            .field("damage", &self.damage.len())
            .field("needs_expose", &self.needs_expose)
            .field("needs_restore", &self.needs_restore)
            .field("needs_later_processing", &self.needs_later_processing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{MockTerm, TermCtl, TermOp};
    use std::cell::Cell;
    use std::rc::Rc;

    fn make_root() -> RootWindow {
        RootWindow::new(Box::new(MockTerm::new(25, 80)))
    }

    #[test]
    fn test_root_basics() {
        let root = make_root();
        let id = root.root();
        let w = root.window(id);

        assert_eq!(w.top(), 0);
        assert_eq!(w.left(), 0);
        assert_eq!(root.abs_top(id), 0);
        assert_eq!(root.abs_left(id), 0);
        assert_eq!(w.lines(), 25);
        assert_eq!(w.cols(), 80);
        assert_eq!(w.bottom(), 25);
        assert_eq!(w.right(), 80);
        assert_eq!(root.parent(id), None);
        assert_eq!(root.root_of(id), id);
        assert!(w.is_visible());
        assert!(!root.needs_later_processing());
    }

    #[test]
    fn test_child_order() {
        let mut root = make_root();
        let r = root.root();
        let a = root.new_subwindow(r, Rect::new(0, 0, 5, 5));
        let b = root.new_subwindow(r, Rect::new(0, 0, 5, 5));
        let f = root.new_float(r, Rect::new(0, 0, 5, 5));
        let h = root.new_hidden_subwindow(r, Rect::new(0, 0, 5, 5));

        assert_eq!(root.children(r), &[f, a, b, h]);
        assert!(!root.is_visible(h));
        assert_eq!(root.parent(a), Some(r));
        assert_eq!(root.root_of(a), r);
    }

    #[test]
    fn test_abs_position() {
        let mut root = make_root();
        let outer = root.new_subwindow(root.root(), Rect::new(3, 4, 10, 20));
        let inner = root.new_subwindow(outer, Rect::new(2, 5, 3, 3));
        assert_eq!(root.abs_top(inner), 5);
        assert_eq!(root.abs_left(inner), 9);
        assert_eq!(root.abs_rect(inner), Rect::new(5, 9, 3, 3));
        assert_eq!(root.root_of(inner), root.root());
    }

    #[test]
    fn test_raise_and_lower() {
        let mut root = make_root();
        let r = root.root();
        let a = root.new_subwindow(r, Rect::new(0, 0, 1, 1));
        let b = root.new_subwindow(r, Rect::new(0, 0, 1, 1));
        let c = root.new_subwindow(r, Rect::new(0, 0, 1, 1));
        root.run_later_processing().unwrap();

        root.raise(c);
        assert_eq!(root.children(r), &[a, c, b]);
        root.raise_to_front(b);
        assert_eq!(root.children(r), &[b, a, c]);
        root.lower(b);
        assert_eq!(root.children(r), &[a, b, c]);
        root.lower_to_back(a);
        assert_eq!(root.children(r), &[b, c, a]);

        // Already at the ends
        root.raise(b);
        root.lower(a);
        assert_eq!(root.children(r), &[b, c, a]);
        root.raise(r);

        // Restacking alone records no damage
        assert!(root.damage().is_empty());
        assert!(!root.needs_later_processing());
    }

    #[test]
    fn test_destroy_focused_ancestor() {
        let term = MockTerm::new(25, 80);
        let mut root = RootWindow::new(Box::new(term.clone()));
        let r = root.root();
        let a = root.new_subwindow(r, Rect::new(2, 2, 10, 10));
        let a1 = root.new_subwindow(a, Rect::new(1, 1, 3, 3));
        root.set_cursor_visible(a1, true);
        root.take_focus(a1);
        root.run_later_processing().unwrap();
        term.take_log();

        root.destroy(a);
        assert_eq!(root.window(r).focused_child(), None);
        assert!(root.needs_later_processing());

        root.run_later_processing().unwrap();
        let log = term.take_log();
        assert!(
            log.ends_with(&[
                TermOp::SetCtlInt {
                    ctl: TermCtl::CursorVisible,
                    value: 0,
                },
                TermOp::Flush,
            ]),
            "{log:?}"
        );
    }

    #[test]
    fn test_popup_rebased_and_captures() {
        let mut root = make_root();
        let r = root.root();
        let outer = root.new_subwindow(r, Rect::new(3, 4, 10, 20));
        let inner = root.new_subwindow(outer, Rect::new(1, 1, 5, 5));
        let popup = root.new_popup(inner, Rect::new(1, 2, 2, 8));

        assert_eq!(root.parent(popup), Some(r));
        assert_eq!(root.window(popup).rect(), Rect::new(5, 7, 2, 8));
        assert_eq!(root.children(r)[0], popup);
        assert_eq!(root.input_capture(), Some(popup));

        root.destroy(popup);
        assert_eq!(root.input_capture(), None);
    }

    #[test]
    fn test_destroy_recursive() {
        let mut root = make_root();
        let r = root.root();
        let outer = root.new_subwindow(r, Rect::new(0, 0, 10, 10));
        let inner = root.new_subwindow(outer, Rect::new(1, 1, 2, 2));
        let pen = crate::pen::Pen::new().shared();
        root.set_pen(inner, Some(pen.clone()));
        assert_eq!(Rc::strong_count(&pen), 2);

        root.destroy(outer);
        assert!(!root.contains(outer));
        assert!(!root.contains(inner));
        assert!(root.children(r).is_empty());
        assert_eq!(root.len(), 1);
        // The pen outlives the window
        assert_eq!(Rc::strong_count(&pen), 1);
    }

    #[test]
    #[should_panic(expected = "root window cannot be destroyed")]
    fn test_destroy_root_panics() {
        let mut root = make_root();
        let r = root.root();
        root.destroy(r);
    }

    #[test]
    fn test_hide_root_ignored() {
        let mut root = make_root();
        let r = root.root();
        root.hide(r);
        assert!(root.is_visible(r));
    }

    #[test]
    fn test_set_geometry_calls_back() {
        let mut root = make_root();
        let w = root.new_hidden_subwindow(root.root(), Rect::new(0, 0, 5, 5));
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            root.set_on_geometry_changed(w, move |root, id| {
                calls.set(calls.get() + 1);
                assert_eq!(root.window(id).lines(), 7);
            });
        }

        root.resize(w, 7, 5);
        root.resize(w, 7, 5);
        assert_eq!(calls.get(), 1);
        assert_eq!(root.window(w).rect(), Rect::new(0, 0, 7, 5));
        assert!(root.damage().is_empty());

        root.clear_on_geometry_changed(w);
        root.reposition(w, 1, 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(root.window(w).rect(), Rect::new(1, 1, 7, 5));
    }

    #[test]
    fn test_focus_path() {
        let mut root = make_root();
        let r = root.root();
        let a = root.new_subwindow(r, Rect::new(0, 0, 10, 10));
        let a1 = root.new_subwindow(a, Rect::new(1, 1, 3, 3));
        let b = root.new_subwindow(r, Rect::new(10, 0, 10, 10));

        root.take_focus(a1);
        assert!(root.is_focused(a1));
        assert_eq!(root.window(r).focused_child(), Some(a));
        assert_eq!(root.window(a).focused_child(), Some(a1));

        root.take_focus(b);
        assert!(!root.is_focused(a1));
        assert!(root.is_focused(b));
        assert_eq!(root.window(r).focused_child(), Some(b));

        root.destroy(b);
        assert_eq!(root.window(r).focused_child(), None);
    }
}
