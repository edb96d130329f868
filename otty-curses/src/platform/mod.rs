//! Compiled-in descriptions of the supported curses families.
//!
//! Each family is described as data: which attributes it defines, which
//! buttons it reports and whether motion reports exist. Both families link
//! ncurses 6 (`NCURSES_MOUSE_VERSION` 2), so they share one `mmask_t`
//! layout. The capability table is built from the description selected for
//! the target.

mod darwin;
mod ncursesw;

use serde::Serialize;

use crate::attr::Attribute;

pub(crate) const BUTTON_RELEASED: u64 = 0o1;
pub(crate) const BUTTON_PRESSED: u64 = 0o2;
pub(crate) const REPORT_POSITION: u64 = 0o10;

// Five bits per button; modifiers and motion live in the sixth slot.
const MOUSE_FIELD_WIDTH: u32 = 5;
const MOUSE_MODIFIER_SLOT: u8 = 6;

/// Curses family the crate was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Wide-character ncurses 6 with separate panel/menu/form libraries.
    Ncursesw,
    /// Homebrew ncurses 6 on macOS, found ahead of the SDK headers.
    Darwin,
}

impl BackendKind {
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Ncursesw => "ncursesw",
            BackendKind::Darwin => "darwin",
        }
    }
}

/// `NCURSES_MOUSE_MASK(slot, bits)`; `slot` starts at one.
pub(crate) const fn mouse_bits(slot: u8, bits: u64) -> u64 {
    bits << ((slot as u32 - 1) * MOUSE_FIELD_WIDTH)
}

/// `REPORT_MOUSE_POSITION`.
pub(crate) const fn report_position_bits() -> u64 {
    mouse_bits(MOUSE_MODIFIER_SLOT, REPORT_POSITION)
}

#[derive(Debug)]
pub(crate) struct Backend {
    pub(crate) kind: BackendKind,
    pub(crate) attributes: &'static [Attribute],
    /// Highest button the library reports events for.
    pub(crate) buttons: u8,
    pub(crate) report_position: bool,
}

impl Backend {
    pub(crate) fn has_attribute(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// Description of the curses family this build targets.
pub(crate) fn native() -> &'static Backend {
    if cfg!(target_os = "macos") {
        &darwin::BACKEND
    } else {
        &ncursesw::BACKEND
    }
}

#[cfg(test)]
pub(crate) fn all() -> [&'static Backend; 2] {
    [&ncursesw::BACKEND, &darwin::BACKEND]
}
