//! Character attributes in the curses `attr_t` layout.

use bitflags::bitflags;
use serde::Serialize;

use crate::caps::capabilities;

bitflags! {
    /// Rendering modifiers combined with character output.
    ///
    /// Bit positions follow `NCURSES_BITS(1, n)` with an attribute shift of
    /// eight, which both supported curses families share. Whether a given
    /// flag exists on the running platform is answered by the capability
    /// table; unsupported flags resolve to [`AttrFlags::NORMAL`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u32 {
        const NORMAL     = 0;
        const STANDOUT   = 1 << 16;
        const UNDERLINE  = 1 << 17;
        const REVERSE    = 1 << 18;
        const BLINK      = 1 << 19;
        const DIM        = 1 << 20;
        const BOLD       = 1 << 21;
        const ALTCHARSET = 1 << 22;
        const INVISIBLE  = 1 << 23;
        const ITALIC     = 1 << 31;
        const _ = !0;
    }
}

impl AttrFlags {
    /// Combine named attributes into one mask using the resolved platform
    /// values.
    pub fn from_attributes(attributes: &[Attribute]) -> Self {
        let caps = capabilities();
        attributes
            .iter()
            .fold(AttrFlags::NORMAL, |acc, attr| acc | caps.attribute(*attr))
    }
}

/// The attributes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Bold,
    Dim,
    Underline,
    Reverse,
    Blink,
    Standout,
    Italic,
    Invisible,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Bold,
        Attribute::Dim,
        Attribute::Underline,
        Attribute::Reverse,
        Attribute::Blink,
        Attribute::Standout,
        Attribute::Italic,
        Attribute::Invisible,
    ];

    /// Bit value the attribute has wherever curses defines it.
    pub const fn flag(self) -> AttrFlags {
        match self {
            Attribute::Bold => AttrFlags::BOLD,
            Attribute::Dim => AttrFlags::DIM,
            Attribute::Underline => AttrFlags::UNDERLINE,
            Attribute::Reverse => AttrFlags::REVERSE,
            Attribute::Blink => AttrFlags::BLINK,
            Attribute::Standout => AttrFlags::STANDOUT,
            Attribute::Italic => AttrFlags::ITALIC,
            Attribute::Invisible => AttrFlags::INVISIBLE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Bold => "attr_bold",
            Attribute::Dim => "attr_dim",
            Attribute::Underline => "attr_underline",
            Attribute::Reverse => "attr_reverse",
            Attribute::Blink => "attr_blink",
            Attribute::Standout => "attr_standout",
            Attribute::Italic => "attr_italic",
            Attribute::Invisible => "attr_invisible",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

pub fn attr_bold() -> AttrFlags {
    capabilities().attribute(Attribute::Bold)
}

pub fn attr_dim() -> AttrFlags {
    capabilities().attribute(Attribute::Dim)
}

pub fn attr_underline() -> AttrFlags {
    capabilities().attribute(Attribute::Underline)
}

pub fn attr_reverse() -> AttrFlags {
    capabilities().attribute(Attribute::Reverse)
}

pub fn attr_blink() -> AttrFlags {
    capabilities().attribute(Attribute::Blink)
}

pub fn attr_standout() -> AttrFlags {
    capabilities().attribute(Attribute::Standout)
}

/// `A_ITALIC` is an ncurses extension; platforms without it get
/// [`AttrFlags::NORMAL`].
pub fn attr_italic() -> AttrFlags {
    capabilities().attribute(Attribute::Italic)
}

pub fn attr_invisible() -> AttrFlags {
    capabilities().attribute(Attribute::Invisible)
}
