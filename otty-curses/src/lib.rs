//! Terminal capability constants and pty plumbing for the otty front ends.
//!
//! Curses exposes its attribute bits and mouse masks as preprocessor macros
//! whose values depend on the library build. This crate resolves them once
//! per process for the compiled-in backend, wraps the small amount of
//! curses session state a host needs (locale, keypad, color pairs), and
//! allocates and resizes pseudo-terminals. Everything is also exported
//! through a C ABI in [`ffi`].

mod attr;
mod caps;
mod errors;
mod mouse;
mod platform;
mod size;

#[cfg(unix)]
pub mod ffi;
#[cfg(unix)]
mod locale;
#[cfg(unix)]
mod pty;
#[cfg(unix)]
mod resize;
#[cfg(unix)]
mod screen;
#[cfg(unix)]
mod session;
#[cfg(unix)]
mod termcaps;
#[cfg(unix)]
mod winch;

pub use crate::attr::{
    AttrFlags, Attribute, attr_blink, attr_bold, attr_dim, attr_invisible,
    attr_italic, attr_reverse, attr_standout, attr_underline,
};
pub use crate::caps::{Capabilities, Feature, Resolution, capabilities};
pub use crate::errors::{CursesError, Result, STATUS_OK};
pub use crate::mouse::{
    MAX_BUTTON, MouseEvent, MouseMask, all_mouse_events, mouse_mask,
    mouse_report_position_mask,
};
pub use crate::platform::BackendKind;
pub use crate::size::WindowSize;

#[cfg(unix)]
pub use crate::locale::{init_locale, locale_initialized};
#[cfg(unix)]
pub use crate::pty::{PtyPair, allocate_pty};
#[cfg(unix)]
pub use crate::resize::{notify_window_change, resize_terminal, terminal_size};
#[cfg(unix)]
pub use crate::screen::Screen;
#[cfg(unix)]
pub use crate::session::{SessionOptions, TerminalSession};
#[cfg(unix)]
pub use crate::termcaps::TermCaps;
#[cfg(unix)]
pub use crate::winch::WindowChangeListener;
