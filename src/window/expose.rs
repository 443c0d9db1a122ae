//! Exposure: Turning damage requests into paint and cursor updates.
//!
//! `expose` walks a window-local rect up to the root and records it in the
//! damage set. `run_later_processing` drains the damage in one pass:
//! 1. Paint every damaged rect into one screen-sized render buffer
//! 2. Flush the buffer to the terminal
//! 3. Put the cursor where the focused window wants it

use super::{ExposeEvent, RootWindow, WindowId};
use crate::buffer::RenderBuffer;
use crate::error::Result;
use crate::layout::Rect;
use crate::terminal::TermCtl;

impl RootWindow {
    /// Request a repaint of `rect` (window-local), or of the whole window.
    ///
    /// Nothing is recorded if the window is hidden or `rect` lies outside
    /// it. The request is clipped to every ancestor on the way up.
    pub fn expose(&mut self, id: WindowId, rect: Option<Rect>) {
        let mut id = id;
        let mut rect = rect;
        loop {
            let window = &self.windows[id];
            let local = Rect::new(0, 0, window.rect.lines, window.rect.cols);
            let damaged = match rect {
                Some(r) => match local.intersect(&r) {
                    Some(d) => d,
                    None => return,
                },
                None => local,
            };
            if damaged.is_empty() || !window.is_visible {
                return;
            }

            match window.parent {
                Some(parent) => {
                    rect = Some(damaged.translate(window.rect.top, window.rect.left));
                    id = parent;
                }
                None => {
                    let damaged = damaged.translate(window.rect.top, window.rect.left);
                    self.record_damage(damaged);
                    return;
                }
            }
        }
    }

    fn record_damage(&mut self, rect: Rect) {
        if self.damage.contains(&rect) {
            tracing::trace!(?rect, "damage already recorded");
            return;
        }
        tracing::debug!(?rect, "damage root");
        self.damage.add(rect);
        self.needs_expose = true;
        self.request_later_processing();
    }

    pub(super) fn request_restore(&mut self) {
        self.needs_restore = true;
        self.request_later_processing();
    }

    pub(super) fn request_later_processing(&mut self) {
        self.needs_later_processing = true;
    }

    /// Paint accumulated damage and restore the cursor.
    ///
    /// Call whenever [`RootWindow::needs_later_processing`] is set. The flag
    /// is cleared first, so anything scheduled during the pass is kept for
    /// the next one.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal rejects a control or fails to flush.
    pub fn run_later_processing(&mut self) -> Result<()> {
        self.needs_later_processing = false;

        if self.needs_expose {
            self.needs_expose = false;

            let screen = self.windows[self.root].rect;
            let mut rb = RenderBuffer::new(screen.lines, screen.cols);
            let rects = self.damage.take();
            tracing::debug!(rects = rects.len(), "painting damage");

            for rect in rects {
                rb.save();
                rb.clip(rect);
                self.do_expose(self.root, rect, &mut rb);
                rb.restore();
            }

            let stats = rb.flush_to_term(self.term.as_mut());
            tracing::debug!(?stats, "paint pass done");
            self.needs_restore = true;
        }

        if self.needs_restore {
            self.needs_restore = false;
            self.do_restore()?;
        }
        Ok(())
    }

    /// Paint `id` and its visible children within `rect` (window-local).
    ///
    /// Children are painted first, topmost first, each masked off once
    /// painted so that lower siblings and the parent cannot draw over it.
    fn do_expose(&mut self, id: WindowId, rect: Rect, rb: &mut RenderBuffer) {
        if let Some(pen) = &self.windows[id].pen {
            let pen = pen.borrow();
            rb.set_pen(Some(&*pen));
        }

        let children = self.windows[id].children.clone();
        for child in children {
            let (child_rect, visible) = {
                let w = &self.windows[child];
                (w.rect, w.is_visible)
            };
            if !visible {
                continue;
            }

            if let Some(exposed) = rect.intersect(&child_rect) {
                rb.save();
                rb.clip(exposed);
                rb.translate(child_rect.top, child_rect.left);
                self.do_expose(child, exposed.translate(-child_rect.top, -child_rect.left), rb);
                rb.restore();
            }
            rb.mask(child_rect);
        }

        let Some(mut callback) = self.windows[id].on_expose.take() else {
            return;
        };
        callback(rb, &ExposeEvent { window: id, rect });
        let window = &mut self.windows[id];
        if window.on_expose.is_none() {
            window.on_expose = Some(callback);
        }
    }

    /// Show the focused window's cursor, or hide it if nothing wants one.
    fn do_restore(&mut self) -> Result<()> {
        let mut id = self.root;
        while let Some(child) = self.windows[id].focused_child {
            if !self.windows[child].is_visible {
                break;
            }
            id = child;
        }

        let window = &self.windows[id];
        if window.is_focused && window.cursor.visible {
            let cursor = window.cursor;
            let line = cursor.line + self.abs_top(id);
            let col = cursor.col + self.abs_left(id);
            self.term.set_ctl_int(TermCtl::CursorVisible, 1)?;
            self.term.goto(line, col);
            self.term.set_ctl_int(TermCtl::CursorShape, cursor.shape as i32)?;
        } else {
            self.term.set_ctl_int(TermCtl::CursorVisible, 0)?;
        }
        self.term.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pen::{Pen, PenAttr};
    use crate::terminal::{CursorShape, MockTerm, TermDriver, TermOp};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn make_root() -> (MockTerm, RootWindow) {
        let term = MockTerm::new(25, 80);
        let root = RootWindow::new(Box::new(term.clone()));
        (term, root)
    }

    fn hide_cursor_ops() -> Vec<TermOp> {
        vec![
            TermOp::SetCtlInt {
                ctl: TermCtl::CursorVisible,
                value: 0,
            },
            TermOp::Flush,
        ]
    }

    #[test]
    fn test_expose_records_root_damage() {
        let (_, mut root) = make_root();
        let win = root.new_hidden_subwindow(root.root(), Rect::new(3, 10, 4, 20));
        root.show(win);

        assert_eq!(root.damage().rects(), &[Rect::new(3, 10, 4, 20)]);
        assert!(root.needs_later_processing());
    }

    #[test]
    fn test_expose_partial_rect_is_window_local() {
        let (_, mut root) = make_root();
        let outer = root.new_hidden_subwindow(root.root(), Rect::new(5, 5, 10, 10));
        root.show(outer);
        root.run_later_processing().unwrap();

        let inner = root.new_hidden_subwindow(outer, Rect::new(2, 3, 4, 4));
        root.show(inner);
        root.run_later_processing().unwrap();

        root.expose(inner, Some(Rect::new(1, 1, 10, 10)));
        assert_eq!(root.damage().rects(), &[Rect::new(8, 9, 3, 3)]);
    }

    #[test]
    fn test_expose_hidden_window_no_damage() {
        let (_, mut root) = make_root();
        let win = root.new_hidden_subwindow(root.root(), Rect::new(0, 0, 5, 5));
        root.expose(win, None);
        assert!(root.damage().is_empty());
        assert!(!root.needs_later_processing());
    }

    #[test]
    fn test_expose_outside_geometry_no_damage() {
        let (_, mut root) = make_root();
        let win = root.new_hidden_subwindow(root.root(), Rect::new(0, 0, 5, 5));
        root.show(win);
        root.run_later_processing().unwrap();

        root.expose(win, Some(Rect::new(10, 10, 2, 2)));
        assert!(root.damage().is_empty());
    }

    #[test]
    fn test_expose_dedup() {
        let (_, mut root) = make_root();
        let r = root.root();
        root.expose(r, None);
        root.expose(r, Some(Rect::new(1, 1, 2, 2)));
        assert_eq!(root.damage().rects(), &[Rect::new(0, 0, 25, 80)]);
    }

    #[test]
    fn test_expose_under_hidden_parent_no_damage() {
        let (_, mut root) = make_root();
        let outer = root.new_hidden_subwindow(root.root(), Rect::new(0, 0, 10, 10));
        let inner = root.new_subwindow(outer, Rect::new(1, 1, 2, 2));
        root.expose(inner, None);
        assert!(root.damage().is_empty());
    }

    #[test]
    fn test_hide_exposes_parent() {
        let (_, mut root) = make_root();
        let win = root.new_subwindow(root.root(), Rect::new(2, 2, 3, 3));
        root.run_later_processing().unwrap();

        root.hide(win);
        assert_eq!(root.damage().rects(), &[Rect::new(2, 2, 3, 3)]);
    }

    #[test]
    fn test_later_processing_paints() {
        let (term, mut root) = make_root();
        let r = root.root();
        let win = root.new_subwindow(r, Rect::new(3, 10, 4, 20));
        root.set_on_expose(win, |rb, ev| {
            assert_eq!(ev.rect, Rect::new(0, 0, 4, 20));
            rb.text_at(0, 0, "Hello", None);
            rb.erase_at(1, 0, 20, None);
        });

        root.run_later_processing().unwrap();
        assert!(!root.needs_later_processing());
        assert!(root.damage().is_empty());

        let mut expected = vec![
            TermOp::goto(3, 10),
            TermOp::SetPen(Pen::new()),
            TermOp::print("Hello"),
            TermOp::goto(4, 10),
            TermOp::SetPen(Pen::new()),
            TermOp::erase(20, false),
        ];
        expected.extend(hide_cursor_ops());
        assert_eq!(term.take_log(), expected);
        assert_eq!(&term.display_text(3)[10..15], "Hello");
    }

    #[test]
    fn test_children_mask_parent() {
        let (term, mut root) = make_root();
        let r = root.root();
        let child = root.new_subwindow(r, Rect::new(0, 2, 1, 2));
        root.set_on_expose(child, |rb, _| {
            rb.text_at(0, 0, "CC", None);
        });
        root.set_on_expose(r, |rb, ev| {
            if ev.rect.contains_point(0, 0) {
                rb.text_at(0, 0, "rrrrrr", None);
            }
        });
        root.expose(r, Some(Rect::new(0, 0, 1, 6)));

        root.run_later_processing().unwrap();
        let mut expected = vec![
            TermOp::goto(0, 0),
            TermOp::SetPen(Pen::new()),
            TermOp::print("rrCCrr"),
        ];
        expected.extend(hide_cursor_ops());
        assert_eq!(term.take_log(), expected);
        assert_eq!(&term.display_text(0)[..6], "rrCCrr");
    }

    #[test]
    fn test_hidden_children_not_masked() {
        let (term, mut root) = make_root();
        let r = root.root();
        root.new_hidden_subwindow(r, Rect::new(0, 0, 1, 3));
        root.set_on_expose(r, |rb, _| {
            rb.text_at(0, 0, "root", None);
        });
        root.expose(r, Some(Rect::new(0, 0, 1, 4)));
        root.run_later_processing().unwrap();
        assert_eq!(&term.display_text(0)[..4], "root");
    }

    #[test]
    fn test_window_pen_inherited() {
        let (term, mut root) = make_root();
        let r = root.root();
        let outer = root.new_subwindow(r, Rect::new(0, 0, 5, 10));
        let inner = root.new_subwindow(outer, Rect::new(1, 1, 1, 5));
        root.set_pen(outer, Some(Pen::new().with_colour(PenAttr::Fg, 2).shared()));
        root.set_pen(inner, Some(Pen::new().with_colour(PenAttr::Bg, 3).shared()));
        root.set_on_expose(inner, |rb, _| {
            rb.text_at(0, 0, "x", None);
        });

        root.run_later_processing().unwrap();
        let pen = term.cell_pen(1, 1).unwrap();
        assert_eq!(pen.get_colour_attr(PenAttr::Fg), 2);
        assert_eq!(pen.get_colour_attr(PenAttr::Bg), 3);
    }

    #[test]
    fn test_shared_pen_change_visible_on_repaint() {
        let (term, mut root) = make_root();
        let win = root.new_subwindow(root.root(), Rect::new(0, 0, 1, 5));
        let pen = Pen::new().with_colour(PenAttr::Fg, 1).shared();
        root.set_pen(win, Some(pen.clone()));
        root.set_on_expose(win, |rb, _| {
            rb.text_at(0, 0, "p", None);
        });
        root.run_later_processing().unwrap();
        assert_eq!(term.cell_pen(0, 0).unwrap().get_colour_attr(PenAttr::Fg), 1);

        pen.borrow_mut().set_colour_attr(PenAttr::Fg, 6);
        root.expose(win, None);
        root.run_later_processing().unwrap();
        assert_eq!(term.cell_pen(0, 0).unwrap().get_colour_attr(PenAttr::Fg), 6);
    }

    #[test]
    fn test_expose_callback_sees_only_damage() {
        let (_, mut root) = make_root();
        let win = root.new_subwindow(root.root(), Rect::new(5, 5, 10, 10));
        root.run_later_processing().unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            root.set_on_expose(win, move |_, ev| seen.borrow_mut().push(ev.rect));
        }
        root.expose(root.root(), Some(Rect::new(0, 0, 7, 7)));
        root.run_later_processing().unwrap();
        assert_eq!(*seen.borrow(), vec![Rect::new(0, 0, 2, 2)]);
    }

    #[test]
    fn test_cursor_restore() {
        let (term, mut root) = make_root();
        let win = root.new_subwindow(root.root(), Rect::new(4, 6, 5, 10));
        root.run_later_processing().unwrap();
        term.clear_log();

        root.set_cursor_position(win, 1, 2);
        root.set_cursor_visible(win, true);
        root.set_cursor_shape(win, CursorShape::Under);
        assert!(!root.needs_later_processing());

        root.take_focus(win);
        assert!(root.needs_later_processing());
        root.run_later_processing().unwrap();
        assert_eq!(
            term.take_log(),
            vec![
                TermOp::SetCtlInt {
                    ctl: TermCtl::CursorVisible,
                    value: 1
                },
                TermOp::goto(5, 8),
                TermOp::SetCtlInt {
                    ctl: TermCtl::CursorShape,
                    value: CursorShape::Under as i32
                },
                TermOp::Flush,
            ]
        );

        // A moved focused window takes its cursor along
        root.reposition(win, 0, 0);
        root.run_later_processing().unwrap();
        assert!(term.take_log().contains(&TermOp::goto(1, 2)));

        // Hiding it hides the cursor
        root.hide(win);
        root.run_later_processing().unwrap();
        assert!(term.take_log().ends_with(&hide_cursor_ops()));
    }

    #[test]
    fn test_term_resized() {
        let (term, mut root) = make_root();
        root.term_resized(10, 40);
        assert_eq!(term.size(), (10, 40));
        assert_eq!(root.window(root.root()).rect(), Rect::new(0, 0, 10, 40));
        assert_eq!(root.damage().rects(), &[Rect::new(0, 0, 10, 40)]);
    }
}
