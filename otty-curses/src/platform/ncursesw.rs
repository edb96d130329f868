use super::{Backend, BackendKind};
use crate::attr::Attribute;

/// ncurses 6 built with wide-character support (`ncursesw/curses.h`).
pub(crate) static BACKEND: Backend = Backend {
    kind: BackendKind::Ncursesw,
    attributes: &Attribute::ALL,
    buttons: 5,
    report_position: true,
};
