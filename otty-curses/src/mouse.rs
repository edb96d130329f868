//! Mouse event masks in the curses `mmask_t` layout.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::Serialize;

use crate::caps::capabilities;

/// Highest button number exposed through [`mouse_mask`].
pub const MAX_BUTTON: u8 = 4;

/// Opaque `mmask_t` bit pattern for a button/event combination.
///
/// The layout depends on the curses mouse ABI of the platform, so the only
/// portable way to obtain a value is through [`mouse_mask`] or
/// [`mouse_report_position_mask`]. An unsupported combination is
/// [`MouseMask::NONE`], which never matches a reported event.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize,
)]
#[serde(transparent)]
pub struct MouseMask(u64);

impl MouseMask {
    pub const NONE: MouseMask = MouseMask(0);

    pub const fn from_bits(bits: u64) -> Self {
        MouseMask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when every bit of `other` is set in `self`. The empty mask is
    /// contained in everything.
    pub const fn contains(self, other: MouseMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MouseMask {
    type Output = MouseMask;

    fn bitor(self, rhs: MouseMask) -> MouseMask {
        MouseMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for MouseMask {
    fn bitor_assign(&mut self, rhs: MouseMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MouseMask {
    type Output = MouseMask;

    fn bitand(self, rhs: MouseMask) -> MouseMask {
        MouseMask(self.0 & rhs.0)
    }
}

impl fmt::Debug for MouseMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MouseMask({:#x})", self.0)
    }
}

/// Button transition a mask refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEvent {
    Pressed,
    Released,
}

impl MouseEvent {
    pub const ALL: [MouseEvent; 2] = [MouseEvent::Pressed, MouseEvent::Released];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            MouseEvent::Pressed => "pressed",
            MouseEvent::Released => "released",
        }
    }
}

/// Resolve the mask for `button` (1..=4) and `event`.
///
/// Buttons outside the range, and buttons the platform cannot report,
/// resolve to [`MouseMask::NONE`].
pub fn mouse_mask(button: u8, event: MouseEvent) -> MouseMask {
    capabilities().mouse(button, event)
}

/// Mask enabling motion reports, [`MouseMask::NONE`] when unsupported.
pub fn mouse_report_position_mask() -> MouseMask {
    capabilities().report_position()
}

/// Union of every mask this platform supports. Handy for `mousemask()`.
pub fn all_mouse_events() -> MouseMask {
    let mut mask = mouse_report_position_mask();
    for button in 1..=MAX_BUTTON {
        for event in MouseEvent::ALL {
            mask |= mouse_mask(button, event);
        }
    }
    mask
}
