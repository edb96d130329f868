use super::{Backend, BackendKind};
use crate::attr::Attribute;

/// Homebrew ncurses 6 (`/opt/homebrew/opt/ncurses`). Its include path comes
/// before the SDK, so `curses.h` defines `A_ITALIC` and the version 2 mouse
/// layout.
pub(crate) static BACKEND: Backend = Backend {
    kind: BackendKind::Darwin,
    attributes: &Attribute::ALL,
    buttons: 5,
    report_position: true,
};
