//! Windows demo: A few nested windows on the real terminal.
//!
//! Arrow keys move the floating box, Tab moves focus between the two
//! panes, `q` quits. Set `CASEMENT_LOG` to a file path to capture the
//! damage and flush traces.

use std::fs::File;
use std::sync::Mutex;

use casement::{
    AnsiTerm, CursorShape, LineCaps, LineStyle, Pen, PenAttr, Rect, RootWindow, TermCtl, WindowId,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let Ok(path) = std::env::var("CASEMENT_LOG") else {
        return;
    };
    let Ok(file) = File::create(path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "casement=debug".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn float_box(root: &mut RootWindow, rect: Rect) -> WindowId {
    let id = root.new_float(root.root(), rect);
    root.set_pen(id, Some(Pen::new().with_bool(PenAttr::Reverse, true).shared()));
    root.set_on_expose(id, move |rb, _| {
        rb.erase_rect(Rect::new(0, 0, rect.lines, rect.cols), None);
        rb.text_at(rect.lines / 2, 2, "float", None);
    });
    id
}

fn pane(root: &mut RootWindow, rect: Rect, title: &'static str, colour: i32) -> WindowId {
    let id = root.new_subwindow(root.root(), rect);
    root.set_pen(id, Some(Pen::new().with_colour(PenAttr::Fg, colour).shared()));
    root.set_on_expose(id, move |rb, _| {
        let bottom = rect.lines - 1;
        let right = rect.cols - 1;
        rb.erase_rect(Rect::new(0, 0, rect.lines, rect.cols), None);
        rb.hline_at(0, 0, right, LineStyle::Single, None, LineCaps::BOTH);
        rb.hline_at(bottom, 0, right, LineStyle::Single, None, LineCaps::BOTH);
        rb.vline_at(0, bottom, 0, LineStyle::Single, None, LineCaps::BOTH);
        rb.vline_at(0, bottom, right, LineStyle::Single, None, LineCaps::BOTH);
        rb.text_at(0, 2, title, Some(&Pen::new().with_bool(PenAttr::Bold, true)));
    });
    root.set_cursor_position(id, 1, 1);
    root.set_cursor_visible(id, true);
    id
}

fn main() -> casement::Result<()> {
    init_logging();

    let term = AnsiTerm::stdout()?;
    let mut root = RootWindow::new(Box::new(term));
    let screen = root.window(root.root()).rect();
    let (lines, cols) = (screen.lines, screen.cols);

    terminal::enable_raw_mode()?;
    root.term_mut().set_ctl_int(TermCtl::AltScreen, 1)?;

    let half = cols / 2;
    let left = pane(&mut root, Rect::new(0, 0, lines - 1, half), "left", 2);
    let right = pane(&mut root, Rect::new(0, half, lines - 1, cols - half), "right", 6);
    root.set_cursor_shape(right, CursorShape::Under);

    let status = root.new_subwindow(root.root(), Rect::new(lines - 1, 0, 1, cols));
    root.set_pen(status, Some(Pen::new().with_colour(PenAttr::Bg, 4).shared()));
    root.set_on_expose(status, move |rb, _| {
        rb.erase_at(0, 0, cols, None);
        rb.text_at(0, 1, "arrows: move  tab: focus  q: quit", None);
    });

    let float = float_box(&mut root, Rect::new(3, 4, 5, 20));

    root.take_focus(left);

    let result = run(&mut root, float, [left, right]);

    root.term_mut().set_ctl_int(TermCtl::CursorVisible, 1)?;
    root.term_mut().set_ctl_int(TermCtl::AltScreen, 0)?;
    root.term_mut().flush()?;
    terminal::disable_raw_mode()?;
    result
}

fn run(root: &mut RootWindow, float: WindowId, panes: [WindowId; 2]) -> casement::Result<()> {
    let mut focus = 0;
    loop {
        if root.needs_later_processing() {
            root.run_later_processing()?;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let rect = root.window(float).rect();
                let (dl, dc) = match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Tab => {
                        focus = 1 - focus;
                        root.take_focus(panes[focus]);
                        continue;
                    }
                    KeyCode::Up => (-1, 0),
                    KeyCode::Down => (1, 0),
                    KeyCode::Left => (0, -1),
                    KeyCode::Right => (0, 1),
                    _ => continue,
                };
                let parent = root.parent(float).unwrap_or_else(|| root.root());
                root.expose(parent, Some(rect));
                root.reposition(float, rect.top + dl, rect.left + dc);
                root.expose(float, None);
            }
            Event::Resize(cols, lines) => {
                root.term_resized(i32::from(lines), i32::from(cols));
            }
            _ => {}
        }
    }
}
