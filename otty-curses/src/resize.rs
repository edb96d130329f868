//! Window geometry propagation.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use log::{debug, trace};
use nix::errno::Errno;
use nix::libc;
use nix::pty::Winsize;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::{CursesError, Result, WindowSize};

/// Apply `rows` x `cols` to the open terminal `fd`.
///
/// Arguments are checked before the size is touched: the geometry first,
/// then that `fd` is an open descriptor, then that it refers to a terminal.
/// When the size changes the kernel sends `SIGWINCH` to the foreground
/// process group of the terminal. Only terminal metadata changes, so this
/// is safe alongside reads and writes on the same descriptor.
pub fn resize_terminal(fd: RawFd, rows: i32, cols: i32) -> Result<()> {
    let size = WindowSize::new(rows, cols)?;
    let fd = checked_terminal(fd)?;
    apply_winsize(fd, size)
}

/// Read the current geometry of a terminal.
pub fn terminal_size(fd: BorrowedFd<'_>) -> Result<WindowSize> {
    let mut winsize = Winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    let res = unsafe {
        libc::ioctl(fd.as_raw_fd(), libc::TIOCGWINSZ, &mut winsize as *mut _)
    };
    if res < 0 {
        return Err(CursesError::IO(io::Error::last_os_error()));
    }

    Ok(winsize.into())
}

/// Send `SIGWINCH` to one process, for children that are not in the
/// terminal's foreground process group.
pub fn notify_window_change(pid: u32) -> Result<()> {
    let pid = i32::try_from(pid)
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or(CursesError::Nix(Errno::ESRCH))?;

    kill(Pid::from_raw(pid), Signal::SIGWINCH)?;
    trace!("sent SIGWINCH to {pid}");
    Ok(())
}

pub(crate) fn apply_winsize(fd: BorrowedFd<'_>, size: WindowSize) -> Result<()> {
    let winsize: Winsize = size.into();
    let res = unsafe {
        libc::ioctl(fd.as_raw_fd(), libc::TIOCSWINSZ, &winsize as *const _)
    };

    if res < 0 {
        return Err(CursesError::Resize(io::Error::last_os_error()));
    }

    debug!("resized fd {} to {}x{}", fd.as_raw_fd(), size.rows, size.cols);
    Ok(())
}

fn checked_terminal(fd: RawFd) -> Result<BorrowedFd<'static>> {
    if fd < 0 {
        return Err(CursesError::InvalidDescriptor(fd));
    }

    if unsafe { libc::fcntl(fd, libc::F_GETFD) } == -1 {
        return match Errno::last() {
            Errno::EBADF => Err(CursesError::InvalidDescriptor(fd)),
            errno => Err(CursesError::Nix(errno)),
        };
    }

    if unsafe { libc::isatty(fd) } != 1 {
        return Err(CursesError::NotATerminal(fd));
    }

    // SAFETY: `fd` was just checked to be open. The borrow only lives for
    // the duration of the caller's ioctl.
    Ok(unsafe { BorrowedFd::borrow_raw(fd) })
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::os::fd::AsFd;
    use std::process::Command;

    use super::*;
    use crate::pty::allocate_pty;

    fn closed_descriptor() -> RawFd {
        // Far above anything the test harness keeps open.
        const FD: RawFd = 4093;
        assert_eq!(unsafe { libc::fcntl(FD, libc::F_GETFD) }, -1);
        FD
    }

    #[test]
    fn negative_descriptor_is_rejected() {
        assert!(matches!(
            resize_terminal(-1, 24, 80),
            Err(CursesError::InvalidDescriptor(-1))
        ));
    }

    #[test]
    fn closed_descriptor_is_rejected() {
        let fd = closed_descriptor();
        assert!(matches!(
            resize_terminal(fd, 24, 80),
            Err(CursesError::InvalidDescriptor(bad)) if bad == fd
        ));
    }

    #[test]
    fn geometry_is_checked_before_the_descriptor() {
        assert!(matches!(
            resize_terminal(-1, 0, 80),
            Err(CursesError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            resize_terminal(-1, 24, -3),
            Err(CursesError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn regular_files_are_not_terminals() {
        let file = File::open("/dev/null").expect("open /dev/null");
        let fd = file.as_raw_fd();
        assert!(matches!(
            resize_terminal(fd, 24, 80),
            Err(CursesError::NotATerminal(bad)) if bad == fd
        ));
        assert!(terminal_size(file.as_fd()).is_err());
    }

    #[test]
    fn repeated_resizes_are_applied_in_order() {
        let pair = match allocate_pty(24, 80) {
            Ok(pair) => pair,
            Err(err) => {
                eprintln!("skipping test; PTY allocation failed: {err}");
                return;
            },
        };

        let slave = pair.slave().as_raw_fd();
        for (rows, cols) in [(30, 100), (30, 100), (10, 20), (50, 120)] {
            resize_terminal(slave, rows, cols).expect("resize");
            let size = terminal_size(pair.slave()).expect("size");
            assert_eq!((i32::from(size.rows), i32::from(size.cols)), (rows, cols));
        }

        let master = pair.master().as_raw_fd();
        resize_terminal(master, 60, 140).expect("resize through master");
        let size = terminal_size(pair.slave()).expect("size");
        assert_eq!((size.rows, size.cols), (60, 140));
    }

    #[test]
    fn notify_rejects_invalid_pids() {
        assert!(matches!(
            notify_window_change(0),
            Err(CursesError::Nix(Errno::ESRCH))
        ));
        assert!(matches!(
            notify_window_change(u32::MAX),
            Err(CursesError::Nix(Errno::ESRCH))
        ));
    }

    #[test]
    fn notify_reaches_a_live_child() {
        let mut child = Command::new("/bin/sleep")
            .arg("5")
            .spawn()
            .expect("spawn sleep");

        // SIGWINCH is ignored by default, so the child keeps running.
        notify_window_change(child.id()).expect("signal child");
        assert!(child.try_wait().expect("try_wait").is_none());

        let _ = child.kill();
        let _ = child.wait();
    }
}
