//! `AnsiTerm`: A crossterm-backed [`TermDriver`] over any writer.

use super::{CursorShape, OutputBuffer, TermCtl, TermDriver};
use crate::error::{Error, Result};
use crate::pen::{Pen, PenAttr};
use crossterm::cursor::{
    DisableBlinking, EnableBlinking, Hide, MoveRight, MoveTo, SetCursorStyle, Show,
};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use crossterm::{Command, QueueableCommand};
use std::io::{self, Write};

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct TermConfig {
    /// Colour count reported through [`TermCtl::Colors`].
    pub colors: i32,
    /// Initial capacity of the output buffer, in bytes.
    pub output_capacity: usize,
    /// Skip attribute output when the requested pen matches the last one sent.
    pub elide_redundant_pens: bool,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            colors: 8,
            output_capacity: 4096,
            elide_redundant_pens: true,
        }
    }
}

impl TermConfig {
    /// Build a config from `COLORTERM` and `TERM`.
    pub fn from_env() -> Self {
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term = std::env::var("TERM").unwrap_or_default();
        Self {
            colors: colors_for(&colorterm, &term),
            ..Self::default()
        }
    }
}

fn colors_for(colorterm: &str, term: &str) -> i32 {
    if matches!(colorterm, "truecolor" | "24bit") || term.contains("256color") {
        256
    } else {
        8
    }
}

/// Settable integer controls, in slot order.
const INT_CTLS: [TermCtl; 6] = [
    TermCtl::AltScreen,
    TermCtl::CursorVisible,
    TermCtl::Mouse,
    TermCtl::CursorBlink,
    TermCtl::CursorShape,
    TermCtl::KeypadApp,
];

fn ctl_slot(ctl: TermCtl) -> Option<usize> {
    INT_CTLS.iter().position(|c| *c == ctl)
}

fn coord(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

/// A terminal driver that emits ANSI escape sequences.
///
/// Output accumulates in an [`OutputBuffer`] and reaches the writer in one
/// `write_all` per [`TermDriver::flush`]. A queueing failure is held back
/// and returned by the next flush.
pub struct AnsiTerm<W: Write> {
    writer: W,
    out: OutputBuffer,
    config: TermConfig,
    lines: i32,
    cols: i32,
    ctl_values: [i32; 6],
    last_pen: Option<Pen>,
    pending_error: Option<io::Error>,
}

impl AnsiTerm<io::Stdout> {
    /// Create a driver on stdout, sized to the current terminal and
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be read.
    pub fn stdout() -> Result<Self> {
        let (cols, lines) = crossterm::terminal::size()?;
        Ok(Self::with_config(
            io::stdout(),
            i32::from(lines),
            i32::from(cols),
            TermConfig::from_env(),
        ))
    }
}

impl<W: Write> AnsiTerm<W> {
    /// Create a driver with default configuration.
    pub fn new(writer: W, lines: i32, cols: i32) -> Self {
        Self::with_config(writer, lines, cols, TermConfig::default())
    }

    /// Create a driver with explicit configuration.
    pub fn with_config(writer: W, lines: i32, cols: i32, config: TermConfig) -> Self {
        Self {
            writer,
            out: OutputBuffer::with_capacity(config.output_capacity),
            config,
            lines,
            cols,
            // alt screen, cursor visible, mouse, blink, shape, keypad
            ctl_values: [0, 1, 0, 1, CursorShape::Block as i32, 0],
            last_pen: None,
            pending_error: None,
        }
    }

    /// Get the configuration.
    pub const fn config(&self) -> &TermConfig {
        &self.config
    }

    /// Get the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the driver, returning the writer. Unflushed output is lost.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn queue(&mut self, command: impl Command) {
        if let Err(e) = self.out.queue(command) {
            self.pending_error.get_or_insert(e);
        }
    }

    fn queue_sgr(&mut self, pen: &Pen) {
        self.queue(SetAttribute(Attribute::Reset));

        let bools = [
            (PenAttr::Bold, Attribute::Bold),
            (PenAttr::Under, Attribute::Underlined),
            (PenAttr::Italic, Attribute::Italic),
            (PenAttr::Reverse, Attribute::Reverse),
            (PenAttr::Strike, Attribute::CrossedOut),
        ];
        for (attr, sgr) in bools {
            if pen.get_bool_attr(attr) {
                self.queue(SetAttribute(sgr));
            }
        }

        if let Ok(idx) = u8::try_from(pen.get_colour_attr(PenAttr::Fg)) {
            self.queue(SetForegroundColor(Color::AnsiValue(idx)));
        }
        if let Ok(idx) = u8::try_from(pen.get_colour_attr(PenAttr::Bg)) {
            self.queue(SetBackgroundColor(Color::AnsiValue(idx)));
        }

        // SGR 10 is the primary font, 11..=19 the alternates
        let af = pen.get_int_attr(PenAttr::AltFont);
        if (0..=9).contains(&af) {
            self.out.write_str(&format!("\x1b[{}m", 10 + af));
        }
    }

    fn cursor_style(&self, shape: CursorShape) -> SetCursorStyle {
        let blink = self.ctl_values[3] != 0;
        match (shape, blink) {
            (CursorShape::Block, true) => SetCursorStyle::BlinkingBlock,
            (CursorShape::Block, false) => SetCursorStyle::SteadyBlock,
            (CursorShape::Under, true) => SetCursorStyle::BlinkingUnderScore,
            (CursorShape::Under, false) => SetCursorStyle::SteadyUnderScore,
            (CursorShape::LeftBar, true) => SetCursorStyle::BlinkingBar,
            (CursorShape::LeftBar, false) => SetCursorStyle::SteadyBar,
        }
    }
}

impl<W: Write> TermDriver for AnsiTerm<W> {
    fn size(&self) -> (i32, i32) {
        (self.lines, self.cols)
    }

    fn set_size(&mut self, lines: i32, cols: i32) {
        self.lines = lines;
        self.cols = cols;
    }

    fn goto(&mut self, line: i32, col: i32) {
        self.queue(MoveTo(coord(col), coord(line)));
    }

    fn print(&mut self, text: &str) {
        self.out.write_str(text);
    }

    fn erase_ch(&mut self, count: i32, move_end: bool) {
        if count <= 0 {
            return;
        }
        self.out.write_str(&format!("\x1b[{count}X"));
        if move_end {
            self.queue(MoveRight(coord(count)));
        }
    }

    fn set_pen(&mut self, pen: &Pen) {
        if self.config.elide_redundant_pens && self.last_pen.as_ref() == Some(pen) {
            return;
        }
        self.queue_sgr(pen);
        self.last_pen = Some(pen.clone());
    }

    fn get_ctl_int(&self, ctl: TermCtl) -> Option<i32> {
        if ctl == TermCtl::Colors {
            return Some(self.config.colors);
        }
        ctl_slot(ctl).map(|slot| self.ctl_values[slot])
    }

    fn set_ctl_int(&mut self, ctl: TermCtl, value: i32) -> Result<()> {
        let on = value != 0;
        match ctl {
            TermCtl::Colors => return Err(Error::ReadOnlyCtl(ctl)),
            TermCtl::AltScreen if on => self.queue(EnterAlternateScreen),
            TermCtl::AltScreen => self.queue(LeaveAlternateScreen),
            TermCtl::CursorVisible if on => self.queue(Show),
            TermCtl::CursorVisible => self.queue(Hide),
            TermCtl::Mouse if on => self.queue(EnableMouseCapture),
            TermCtl::Mouse => self.queue(DisableMouseCapture),
            TermCtl::CursorBlink if on => self.queue(EnableBlinking),
            TermCtl::CursorBlink => self.queue(DisableBlinking),
            TermCtl::CursorShape => {
                let shape = CursorShape::from_i32(value).ok_or_else(|| Error::InvalidCtlValue {
                    ctl,
                    value: value.to_string(),
                })?;
                let style = self.cursor_style(shape);
                self.queue(style);
            }
            TermCtl::KeypadApp => self.out.write_str(if on { "\x1b=" } else { "\x1b>" }),
            TermCtl::IconText | TermCtl::TitleText | TermCtl::IconTitleText => {
                return Err(Error::InvalidCtlValue {
                    ctl,
                    value: value.to_string(),
                });
            }
        }
        if let Some(slot) = ctl_slot(ctl) {
            self.ctl_values[slot] = value;
        }
        Ok(())
    }

    fn set_ctl_str(&mut self, ctl: TermCtl, value: &str) -> Result<()> {
        match ctl {
            TermCtl::IconText => self.out.write_str(&format!("\x1b]1;{value}\x07")),
            TermCtl::TitleText => self.out.write_str(&format!("\x1b]2;{value}\x07")),
            TermCtl::IconTitleText => self.queue(SetTitle(value)),
            TermCtl::Colors => return Err(Error::ReadOnlyCtl(ctl)),
            _ => {
                return Err(Error::InvalidCtlValue {
                    ctl,
                    value: value.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(e) = self.pending_error.take() {
            // Dropped output may have held the last SGR
            self.out.clear();
            self.last_pen = None;
            return Err(e.into());
        }
        tracing::trace!(bytes = self.out.len(), "flushing terminal output");
        if let Err(e) = self.out.drain_to(&mut self.writer) {
            self.last_pen = None;
            return Err(e.into());
        }
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for AnsiTerm<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsiTerm")
            .field("lines", &self.lines)
            .field("cols", &self.cols)
            .field("config", &self.config)
            .field("pending", &self.out.len())
            .finish_non_exhaustive()
    }
}
