use std::ffi::CStr;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};
use nix::libc;

static LOCALE: Once = Once::new();
static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Configure every locale category from the environment
/// (`setlocale(LC_ALL, "")`).
///
/// Wide-character curses output depends on it, so it has to run before a
/// screen is created. Only the first call reaches `setlocale`; later calls
/// return immediately. A locale the C library rejects leaves the default
/// "C" locale in place, which is not reported.
pub fn init_locale() {
    LOCALE.call_once(|| {
        // SAFETY: the argument is a valid NUL terminated string and `Once`
        // keeps this crate from racing itself on the global locale.
        let current = unsafe { libc::setlocale(libc::LC_ALL, c"".as_ptr()) };

        if current.is_null() {
            debug!("environment locale rejected, keeping the default locale");
        } else {
            // SAFETY: a non-null result points at a NUL terminated string
            // owned by the C library.
            let name = unsafe { CStr::from_ptr(current) };
            debug!("locale initialized: {}", name.to_string_lossy());
            CONFIGURED.store(true, Ordering::Release);
        }
    });

    trace!("init_locale called");
}

/// `true` once [`init_locale`] ran and the C library accepted the
/// environment locale.
pub fn locale_initialized() -> bool {
    CONFIGURED.load(Ordering::Acquire)
}
