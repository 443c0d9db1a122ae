//! Pen: A set of optional text-style attributes.
//!
//! A pen only records the attributes it has been told about. Anything left
//! unset is inherited from whatever pen it is later merged over, which is
//! how a window's pen flows into the pens of its children and into the
//! cells a render buffer stores.
//!
//! ```
//! use casement::{Pen, PenAttr};
//!
//! let mut pen = Pen::new().with_colour(PenAttr::Fg, 4);
//! assert!(pen.set_colour_attr_desc(PenAttr::Bg, "hi-red"));
//! assert_eq!(pen.get_colour_attr(PenAttr::Bg), 9);
//! assert!(!pen.has_attr(PenAttr::Bold));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A pen shared between its owner and the windows that draw with it.
///
/// Windows only hold a handle; dropping a window never drops the pen while
/// the caller still holds it.
pub type SharedPen = Rc<RefCell<Pen>>;

/// A style attribute a pen can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PenAttr {
    /// Foreground colour index.
    Fg,
    /// Background colour index.
    Bg,
    /// Bold weight.
    Bold,
    /// Underline.
    Under,
    /// Italic.
    Italic,
    /// Reverse video.
    Reverse,
    /// Strikethrough.
    Strike,
    /// Alternate font number.
    AltFont,
}

/// The value kind an attribute holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PenAttrType {
    /// On or off.
    Bool,
    /// A small integer.
    Int,
    /// A colour index, `-1` meaning the terminal default.
    Colour,
}

/// A typed attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PenValue {
    /// Value of a [`PenAttrType::Bool`] attribute.
    Bool(bool),
    /// Value of a [`PenAttrType::Int`] attribute.
    Int(i32),
    /// Value of a [`PenAttrType::Colour`] attribute.
    Colour(i32),
}

/// Notification delivered to pen observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PenEvent {
    /// An attribute was set or cleared. `value` is its new value, `None`
    /// once cleared.
    Changed {
        /// The attribute that changed.
        attr: PenAttr,
        /// Its value after the change.
        value: Option<PenValue>,
    },
    /// The observer is being removed, either explicitly or because the
    /// pen is being dropped.
    Unbind,
}

/// Attribute metadata: short name and value kind, in declaration order.
static ATTR_TABLE: [(PenAttr, &str, PenAttrType); 8] = [
    (PenAttr::Fg, "fg", PenAttrType::Colour),
    (PenAttr::Bg, "bg", PenAttrType::Colour),
    (PenAttr::Bold, "b", PenAttrType::Bool),
    (PenAttr::Under, "u", PenAttrType::Bool),
    (PenAttr::Italic, "i", PenAttrType::Bool),
    (PenAttr::Reverse, "rv", PenAttrType::Bool),
    (PenAttr::Strike, "strike", PenAttrType::Bool),
    (PenAttr::AltFont, "af", PenAttrType::Int),
];

static COLOUR_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl PenAttr {
    /// Every attribute, in table order.
    pub const ALL: [Self; 8] = [
        Self::Fg,
        Self::Bg,
        Self::Bold,
        Self::Under,
        Self::Italic,
        Self::Reverse,
        Self::Strike,
        Self::AltFont,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Get the value kind of this attribute.
    pub const fn attr_type(self) -> PenAttrType {
        ATTR_TABLE[self.index()].2
    }

    /// Get the short name of this attribute (`"fg"`, `"b"`, `"rv"`, ...).
    pub const fn name(self) -> &'static str {
        ATTR_TABLE[self.index()].1
    }

    /// Look an attribute up by its short name.
    pub fn lookup(name: &str) -> Option<Self> {
        ATTR_TABLE
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(attr, _, _)| *attr)
    }
}

/// Parse a colour description into a colour index.
///
/// Accepts a decimal index or one of the eight base colour names, each
/// optionally prefixed with `hi-` to select the bright variant (index + 8).
/// A `hi-` number above 7 has no bright variant and is rejected.
pub fn parse_colour(desc: &str) -> Option<i32> {
    let (hi, desc) = match desc.strip_prefix("hi-") {
        Some(rest) => (8, rest),
        None => (0, desc),
    };

    if let Ok(val) = desc.parse::<i32>() {
        if hi != 0 && val > 7 {
            return None;
        }
        return Some(val + hi);
    }

    COLOUR_NAMES
        .iter()
        .position(|name| *name == desc)
        .and_then(|idx| i32::try_from(idx).ok())
        .map(|idx| idx + hi)
}

type PenHook = Box<dyn FnMut(PenEvent)>;

/// Observer list. Never copied along with the pen.
#[derive(Default)]
struct PenHooks {
    hooks: Vec<(u32, PenHook)>,
    next_id: u32,
}

impl PenHooks {
    fn run(&mut self, event: PenEvent) {
        for (_, hook) in &mut self.hooks {
            hook(event);
        }
    }
}

impl Clone for PenHooks {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for PenHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hooks", self.hooks.len())
    }
}

/// A set of optional text-style attributes.
///
/// Equality compares attributes only; observers are ignored.
#[derive(Clone, Debug, Default)]
pub struct Pen {
    fg: Option<i32>,
    bg: Option<i32>,
    bold: Option<bool>,
    under: Option<bool>,
    italic: Option<bool>,
    reverse: Option<bool>,
    strike: Option<bool>,
    altfont: Option<i32>,
    hooks: PenHooks,
}

impl Pen {
    /// Create a pen with no attributes set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a new pen in a shareable handle.
    pub fn shared(self) -> SharedPen {
        Rc::new(RefCell::new(self))
    }

    /// Set a colour attribute (builder pattern).
    #[must_use]
    pub fn with_colour(mut self, attr: PenAttr, val: i32) -> Self {
        self.set_colour_attr(attr, val);
        self
    }

    /// Set a boolean attribute (builder pattern).
    #[must_use]
    pub fn with_bool(mut self, attr: PenAttr, val: bool) -> Self {
        self.set_bool_attr(attr, val);
        self
    }

    /// Set an integer attribute (builder pattern).
    #[must_use]
    pub fn with_int(mut self, attr: PenAttr, val: i32) -> Self {
        self.set_int_attr(attr, val);
        self
    }

    fn bool_slot(&mut self, attr: PenAttr) -> Option<&mut Option<bool>> {
        match attr {
            PenAttr::Bold => Some(&mut self.bold),
            PenAttr::Under => Some(&mut self.under),
            PenAttr::Italic => Some(&mut self.italic),
            PenAttr::Reverse => Some(&mut self.reverse),
            PenAttr::Strike => Some(&mut self.strike),
            _ => None,
        }
    }

    const fn bool_value(&self, attr: PenAttr) -> Option<bool> {
        match attr {
            PenAttr::Bold => self.bold,
            PenAttr::Under => self.under,
            PenAttr::Italic => self.italic,
            PenAttr::Reverse => self.reverse,
            PenAttr::Strike => self.strike,
            _ => None,
        }
    }

    /// Get an attribute's typed value, or `None` if it is unset.
    pub const fn get_attr(&self, attr: PenAttr) -> Option<PenValue> {
        match attr {
            PenAttr::Fg => match self.fg {
                Some(v) => Some(PenValue::Colour(v)),
                None => None,
            },
            PenAttr::Bg => match self.bg {
                Some(v) => Some(PenValue::Colour(v)),
                None => None,
            },
            PenAttr::AltFont => match self.altfont {
                Some(v) => Some(PenValue::Int(v)),
                None => None,
            },
            _ => match self.bool_value(attr) {
                Some(v) => Some(PenValue::Bool(v)),
                None => None,
            },
        }
    }

    /// Set an attribute from a typed value.
    ///
    /// A value whose kind does not match the attribute is ignored.
    pub fn set_attr(&mut self, attr: PenAttr, value: PenValue) {
        match value {
            PenValue::Bool(v) => self.set_bool_attr(attr, v),
            PenValue::Int(v) => self.set_int_attr(attr, v),
            PenValue::Colour(v) => self.set_colour_attr(attr, v),
        }
    }

    /// Check if an attribute is set.
    pub const fn has_attr(&self, attr: PenAttr) -> bool {
        self.get_attr(attr).is_some()
    }

    /// Check if any attribute is set.
    pub fn is_nonempty(&self) -> bool {
        PenAttr::ALL.iter().any(|attr| self.has_attr(*attr))
    }

    /// Check if any set attribute differs from the terminal default.
    pub fn is_nondefault(&self) -> bool {
        PenAttr::ALL.iter().any(|attr| match self.get_attr(*attr) {
            Some(PenValue::Bool(v)) => v,
            Some(PenValue::Int(v) | PenValue::Colour(v)) => v > -1,
            None => false,
        })
    }

    /// Get a boolean attribute; unset reads as `false`.
    pub const fn get_bool_attr(&self, attr: PenAttr) -> bool {
        matches!(self.bool_value(attr), Some(true))
    }

    /// Set a boolean attribute. Ignored for non-boolean attributes.
    pub fn set_bool_attr(&mut self, attr: PenAttr, val: bool) {
        let Some(slot) = self.bool_slot(attr) else {
            return;
        };
        *slot = Some(val);
        self.notify(attr);
    }

    /// Get an integer attribute; unset reads as `-1`.
    pub fn get_int_attr(&self, attr: PenAttr) -> i32 {
        match attr {
            PenAttr::AltFont => self.altfont.unwrap_or(-1),
            _ => -1,
        }
    }

    /// Set an integer attribute. Ignored for non-integer attributes.
    pub fn set_int_attr(&mut self, attr: PenAttr, val: i32) {
        match attr {
            PenAttr::AltFont => self.altfont = Some(val),
            _ => return,
        }
        self.notify(attr);
    }

    /// Get a colour attribute; unset reads as `-1`.
    pub fn get_colour_attr(&self, attr: PenAttr) -> i32 {
        match attr {
            PenAttr::Fg => self.fg.unwrap_or(-1),
            PenAttr::Bg => self.bg.unwrap_or(-1),
            _ => -1,
        }
    }

    /// Set a colour attribute. Ignored for non-colour attributes.
    pub fn set_colour_attr(&mut self, attr: PenAttr, val: i32) {
        match attr {
            PenAttr::Fg => self.fg = Some(val),
            PenAttr::Bg => self.bg = Some(val),
            _ => return,
        }
        self.notify(attr);
    }

    /// Set a colour attribute from a description such as `"blue"`,
    /// `"hi-green"` or `"123"`.
    ///
    /// Returns `false`, leaving the pen untouched, if the description is
    /// not recognised.
    pub fn set_colour_attr_desc(&mut self, attr: PenAttr, desc: &str) -> bool {
        if attr.attr_type() != PenAttrType::Colour {
            return false;
        }
        match parse_colour(desc) {
            Some(val) => {
                self.set_colour_attr(attr, val);
                true
            }
            None => false,
        }
    }

    /// Unset an attribute.
    pub fn clear_attr(&mut self, attr: PenAttr) {
        match attr {
            PenAttr::Fg => self.fg = None,
            PenAttr::Bg => self.bg = None,
            PenAttr::AltFont => self.altfont = None,
            _ => {
                if let Some(slot) = self.bool_slot(attr) {
                    *slot = None;
                }
            }
        }
        self.notify(attr);
    }

    /// Check if two pens agree on one attribute, reading unset values as
    /// their defaults.
    pub fn equiv_attr(&self, other: &Self, attr: PenAttr) -> bool {
        match attr.attr_type() {
            PenAttrType::Bool => self.get_bool_attr(attr) == other.get_bool_attr(attr),
            PenAttrType::Int => self.get_int_attr(attr) == other.get_int_attr(attr),
            PenAttrType::Colour => self.get_colour_attr(attr) == other.get_colour_attr(attr),
        }
    }

    /// Check if two pens would render identically.
    pub fn equiv(&self, other: &Self) -> bool {
        PenAttr::ALL
            .iter()
            .all(|attr| self.equiv_attr(other, *attr))
    }

    /// Copy one attribute from `src`, including its absence.
    pub fn copy_attr(&mut self, src: &Self, attr: PenAttr) {
        match src.get_attr(attr) {
            Some(value) => self.set_attr(attr, value),
            None => self.clear_attr(attr),
        }
    }

    /// Copy every attribute `src` has set.
    ///
    /// Attributes already set here are kept unless `overwrite` is true.
    pub fn copy(&mut self, src: &Self, overwrite: bool) {
        for attr in PenAttr::ALL {
            if !src.has_attr(attr) || (self.has_attr(attr) && !overwrite) {
                continue;
            }
            self.copy_attr(src, attr);
        }
    }

    fn notify(&mut self, attr: PenAttr) {
        let value = self.get_attr(attr);
        self.hooks.run(PenEvent::Changed { attr, value });
    }

    /// Register an observer called after every attribute change.
    ///
    /// Hooks run while the pen is mutably borrowed. A hook on a
    /// [`SharedPen`] must not borrow that pen again; the event already
    /// carries the changed attribute and its new value.
    ///
    /// Returns an id for [`Pen::unbind_event_id`].
    pub fn bind_event<F>(&mut self, hook: F) -> u32
    where
        F: FnMut(PenEvent) + 'static,
    {
        self.hooks.next_id += 1;
        let id = self.hooks.next_id;
        self.hooks.hooks.push((id, Box::new(hook)));
        id
    }

    /// Remove an observer, delivering it a final [`PenEvent::Unbind`].
    pub fn unbind_event_id(&mut self, id: u32) {
        if let Some(pos) = self.hooks.hooks.iter().position(|(hid, _)| *hid == id) {
            let (_, mut hook) = self.hooks.hooks.remove(pos);
            hook(PenEvent::Unbind);
        }
    }
}

impl PartialEq for Pen {
    fn eq(&self, other: &Self) -> bool {
        PenAttr::ALL
            .iter()
            .all(|attr| self.get_attr(*attr) == other.get_attr(*attr))
    }
}

impl Eq for Pen {}

impl Drop for Pen {
    fn drop(&mut self) {
        self.hooks.run(PenEvent::Unbind);
    }
}
