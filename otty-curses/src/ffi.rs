//! C ABI for bindings in languages that cannot read curses headers.
//!
//! Status returning functions give `0` on success and a negative
//! [`CursesError::code`] on failure. When the failure came from the OS the
//! error number is kept for [`otty_curses_last_os_error`]. Panics never
//! cross the boundary.

use std::cell::Cell;
use std::ffi::{CStr, c_char, c_int};
use std::os::fd::{BorrowedFd, RawFd};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard};

use log::error;

use crate::attr::{self, AttrFlags};
use crate::errors::STATUS_OK;
use crate::mouse::{self, MouseEvent};
use crate::session::{SessionOptions, TerminalSession};
use crate::termcaps::TermCaps;
use crate::{CursesError, Result, locale, pty, resize};

/// `event` value for [`otty_curses_mouse_mask`].
pub const OTTY_CURSES_MOUSE_PRESSED: c_int = 0;
/// `event` value for [`otty_curses_mouse_mask`].
pub const OTTY_CURSES_MOUSE_RELEASED: c_int = 1;

/// A required out-pointer or string was null.
pub const STATUS_NULL_ARGUMENT: c_int = -11;
/// The call panicked; the state of the session is unspecified.
pub const STATUS_PANIC: c_int = -12;

static SESSION: Mutex<Option<TerminalSession>> = Mutex::new(None);

thread_local! {
    static LAST_OS_ERROR: Cell<c_int> = const { Cell::new(0) };
}

fn session() -> MutexGuard<'static, Option<TerminalSession>> {
    SESSION.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn status(result: Result<()>) -> c_int {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => {
            LAST_OS_ERROR.with(|last| last.set(err.raw_os_error().unwrap_or(0)));
            err.code()
        },
    }
}

fn guarded(name: &str, body: impl FnOnce() -> c_int) -> c_int {
    catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|_| {
        error!("{name}: panic caught at the C boundary");
        STATUS_PANIC
    })
}

fn attr_bits(flags: AttrFlags) -> u32 {
    flags.bits()
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_bold() -> u32 {
    attr_bits(attr::attr_bold())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_dim() -> u32 {
    attr_bits(attr::attr_dim())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_underline() -> u32 {
    attr_bits(attr::attr_underline())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_reverse() -> u32 {
    attr_bits(attr::attr_reverse())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_blink() -> u32 {
    attr_bits(attr::attr_blink())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_standout() -> u32 {
    attr_bits(attr::attr_standout())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_italic() -> u32 {
    attr_bits(attr::attr_italic())
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_attr_invisible() -> u32 {
    attr_bits(attr::attr_invisible())
}

/// Mask for `button` (1..=4) and `event`; zero when unsupported or out of
/// range.
#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_mouse_mask(button: c_int, event: c_int) -> u64 {
    let event = match event {
        OTTY_CURSES_MOUSE_PRESSED => MouseEvent::Pressed,
        OTTY_CURSES_MOUSE_RELEASED => MouseEvent::Released,
        _ => return 0,
    };

    u8::try_from(button)
        .map(|button| mouse::mouse_mask(button, event).bits())
        .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_report_mouse_position() -> u64 {
    mouse::mouse_report_position_mask().bits()
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_init_locale() {
    let _ = guarded("otty_curses_init_locale", || {
        locale::init_locale();
        STATUS_OK
    });
}

/// Allocate a pty and store its descriptors. The caller owns and must
/// close both.
///
/// # Safety
///
/// `master` and `slave` must be null or valid for a write of one `c_int`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn otty_curses_openpty(
    master: *mut c_int,
    slave: *mut c_int,
    rows: c_int,
    cols: c_int,
) -> c_int {
    guarded("otty_curses_openpty", || {
        if master.is_null() || slave.is_null() {
            return STATUS_NULL_ARGUMENT;
        }

        status(pty::allocate_pty(rows, cols).map(|pair| {
            let (raw_master, raw_slave) = pair.into_raw_fds();
            // SAFETY: both pointers were checked for null and the caller
            // guarantees they are writable.
            unsafe {
                master.write(raw_master);
                slave.write(raw_slave);
            }
        }))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_set_winsize(
    fd: c_int,
    rows: c_int,
    cols: c_int,
) -> c_int {
    guarded("otty_curses_set_winsize", || {
        status(resize::resize_terminal(fd, rows, cols))
    })
}

/// Read the geometry of terminal `fd`.
///
/// # Safety
///
/// `rows` and `cols` must be null or valid for a write of one `c_int`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn otty_curses_get_winsize(
    fd: c_int,
    rows: *mut c_int,
    cols: *mut c_int,
) -> c_int {
    guarded("otty_curses_get_winsize", || {
        if rows.is_null() || cols.is_null() {
            return STATUS_NULL_ARGUMENT;
        }

        status(with_fd(fd, resize::terminal_size).map(|size| {
            // SAFETY: checked for null above, writable per the contract.
            unsafe {
                rows.write(c_int::from(size.rows));
                cols.write(c_int::from(size.cols));
            }
        }))
    })
}

/// Claim the terminal session (if needed) and create the primary screen
/// writing to `fd`. `term` may be null to use `$TERM`; every call reads it
/// afresh.
///
/// A failure releases the session again when this call claimed it.
///
/// # Safety
///
/// `term` must be null or point to a NUL terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn otty_curses_screen_open(
    fd: c_int,
    term: *const c_char,
) -> c_int {
    guarded("otty_curses_screen_open", || {
        let term = if term.is_null() {
            None
        } else {
            // SAFETY: non-null and NUL terminated per the contract.
            let name = unsafe { CStr::from_ptr(term) };
            Some(name.to_string_lossy().into_owned())
        };

        let mut slot = session();
        let claimed = slot.is_none();
        if claimed {
            match TerminalSession::acquire(SessionOptions::default()) {
                Ok(session) => *slot = Some(session),
                Err(err) => return status(Err(err)),
            }
        }

        let Some(session) = slot.as_mut() else {
            return status(Err(CursesError::ScreenNotInitialized));
        };
        let result = open_screen(session, fd, term.as_deref());
        if result.is_err() && claimed {
            // Release a session this call claimed so nothing half-open stays.
            slot.take();
        }
        status(result)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_configure_keypad(enable: c_int) -> c_int {
    guarded("otty_curses_configure_keypad", || {
        let result = match session().as_mut() {
            Some(session) => session.configure_keypad(enable != 0),
            None => Err(CursesError::ScreenNotInitialized),
        };
        status(result)
    })
}

/// Color pairs declared by the active terminal; zero before
/// [`otty_curses_screen_open`].
#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_color_pairs() -> c_int {
    guarded("otty_curses_color_pairs", || {
        let pairs = session()
            .as_ref()
            .map_or(0, TerminalSession::color_pair_capacity);
        c_int::try_from(pairs).unwrap_or(c_int::MAX)
    })
}

/// Restore the terminal and release the session.
#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_screen_close() -> c_int {
    guarded("otty_curses_screen_close", || {
        let Some(mut session) = session().take() else {
            return STATUS_OK;
        };
        status(session.end_screen())
    })
}

/// OS error number of the last failed call on this thread, zero if the
/// failure had none.
#[unsafe(no_mangle)]
pub extern "C" fn otty_curses_last_os_error() -> c_int {
    LAST_OS_ERROR.with(Cell::get)
}

fn open_screen(
    session: &mut TerminalSession,
    fd: RawFd,
    term: Option<&str>,
) -> Result<()> {
    let caps = TermCaps::load(term)?;
    with_fd(fd, |output| {
        session.init_screen_with_caps(output, caps)?;
        Ok(())
    })
}

fn with_fd<T>(
    fd: RawFd,
    body: impl FnOnce(BorrowedFd<'_>) -> Result<T>,
) -> Result<T> {
    if fd < 0 {
        return Err(CursesError::InvalidDescriptor(fd));
    }

    // SAFETY: the caller hands over an open descriptor it keeps alive for
    // the duration of the call; a stale number surfaces as EBADF below.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    body(borrowed).map_err(|err| match err {
        CursesError::IO(io) if io.raw_os_error() == Some(nix::libc::EBADF) => {
            CursesError::InvalidDescriptor(fd)
        },
        err => err,
    })
}
