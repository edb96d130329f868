//! Pseudo-terminal allocation.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command};

use log::{debug, trace};
use nix::fcntl::{FcntlArg, FdFlag, OFlag, fcntl};
use nix::libc;
use nix::pty::{Winsize, openpty};

use crate::resize::apply_winsize;
use crate::{CursesError, Result, WindowSize};

/// One allocated pseudo-terminal.
///
/// The pair owns both descriptors; dropping it closes them. Nothing else in
/// the crate keeps a reference to either end.
#[derive(Debug)]
pub struct PtyPair {
    master: OwnedFd,
    slave: OwnedFd,
    size: WindowSize,
}

/// Allocate a master/slave pair sized `rows` x `cols`.
///
/// Geometry is validated before any descriptor is opened. The slave has the
/// requested size when this returns. OS failures are reported as-is and not
/// retried.
pub fn allocate_pty(rows: i32, cols: i32) -> Result<PtyPair> {
    let size = WindowSize::new(rows, cols)?;
    PtyPair::open(size)
}

impl PtyPair {
    /// Allocate a pair with an already validated size.
    pub fn open(size: WindowSize) -> Result<Self> {
        let winsize: Winsize = size.into();
        let result = openpty(Some(&winsize), None).map_err(|errno| {
            debug!("openpty failed: {errno}");
            CursesError::Allocate(errno)
        })?;

        // On failure both OwnedFds drop here, so no half-open pair escapes.
        set_cloexec(result.master.as_fd())?;
        set_cloexec(result.slave.as_fd())?;
        apply_winsize(result.slave.as_fd(), size)?;

        trace!(
            "allocated pty master={} slave={} ({}x{})",
            result.master.as_raw_fd(),
            result.slave.as_raw_fd(),
            size.rows,
            size.cols
        );

        Ok(Self {
            master: result.master,
            slave: result.slave,
            size,
        })
    }

    pub fn master(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }

    pub fn slave(&self) -> BorrowedFd<'_> {
        self.slave.as_fd()
    }

    /// Size requested at allocation or by the last [`PtyPair::resize`].
    pub fn size(&self) -> WindowSize {
        self.size
    }

    /// Apply a new geometry to the terminal. The kernel signals the
    /// foreground process group of the pty.
    pub fn resize(&mut self, rows: i32, cols: i32) -> Result<()> {
        let size = WindowSize::new(rows, cols)?;
        apply_winsize(self.slave.as_fd(), size)?;
        self.size = size;
        Ok(())
    }

    /// Put the master into non-blocking mode for poll driven readers.
    pub fn set_master_nonblocking(&self) -> Result<()> {
        set_nonblocking(self.master.as_fd())
    }

    /// Release ownership of both descriptors as `(master, slave)`. The
    /// caller becomes responsible for closing them.
    pub fn into_raw_fds(self) -> (RawFd, RawFd) {
        (self.master.into_raw_fd(), self.slave.into_raw_fd())
    }

    /// Split the pair into its owned descriptors.
    pub fn into_fds(self) -> (OwnedFd, OwnedFd) {
        (self.master, self.slave)
    }

    /// Spawn `cmd` with the slave as its standard streams and controlling
    /// terminal.
    pub fn spawn(&self, mut cmd: Command) -> Result<Child> {
        let raw_master = self.master.as_raw_fd();
        let raw_slave = self.slave.as_raw_fd();

        cmd.stdin(self.slave.try_clone()?)
            .stdout(self.slave.try_clone()?)
            .stderr(self.slave.try_clone()?);

        // SAFETY: `attach_controlling_terminal` only makes
        // async-signal-safe libc calls.
        unsafe {
            cmd.pre_exec(move || {
                attach_controlling_terminal(raw_master, raw_slave)
            });
        }

        let child = cmd.spawn()?;
        debug!("spawned pid {} on pty slave {}", child.id(), raw_slave);
        Ok(child)
    }
}

// Signals a freshly spawned child expects at their default disposition,
// whatever the host installed.
const CHILD_DEFAULT_SIGNALS: [libc::c_int; 7] = [
    libc::SIGCHLD,
    libc::SIGHUP,
    libc::SIGINT,
    libc::SIGQUIT,
    libc::SIGTERM,
    libc::SIGALRM,
    libc::SIGWINCH,
];

// Runs in the forked child before exec. The slave is already stdin, so it
// becomes the controlling terminal of the new session and resizes reach the
// child as SIGWINCH.
unsafe fn attach_controlling_terminal(
    master: RawFd,
    slave: RawFd,
) -> io::Result<()> {
    unsafe {
        if libc::setsid() < 0 || libc::ioctl(0, libc::TIOCSCTTY as _, 0) < 0 {
            return Err(io::Error::last_os_error());
        }

        for signal in CHILD_DEFAULT_SIGNALS {
            libc::signal(signal, libc::SIG_DFL);
        }

        libc::close(master);
        libc::close(slave);
    }

    Ok(())
}

fn set_cloexec(fd: BorrowedFd<'_>) -> Result<()> {
    let flags = FdFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFD)?);
    fcntl(fd, FcntlArg::F_SETFD(flags | FdFlag::FD_CLOEXEC))?;
    Ok(())
}

fn set_nonblocking(fd: BorrowedFd<'_>) -> Result<()> {
    let flags = OFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{ErrorKind, Read, Write};
    use std::thread;
    use std::time::Duration;

    use nix::errno::Errno;

    use super::*;
    use crate::resize::{resize_terminal, terminal_size};

    fn allocate_or_skip(rows: i32, cols: i32) -> Option<PtyPair> {
        match allocate_pty(rows, cols) {
            Ok(pair) => Some(pair),
            Err(CursesError::Allocate(Errno::EACCES | Errno::ENOENT)) => {
                eprintln!("skipping test; PTY allocation denied");
                None
            },
            Err(err) => panic!("failed to allocate pty: {err:?}"),
        }
    }

    fn is_open(fd: RawFd) -> bool {
        unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
    }

    fn read_output(master: &mut File) -> String {
        let mut buffer = [0u8; 1024];
        let mut collected = Vec::new();

        for _ in 0..200 {
            match master.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&buffer[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if !collected.is_empty() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(10));
                },
                // EIO once the child closed its side.
                Err(_) => break,
            }
        }

        String::from_utf8_lossy(&collected).into_owned()
    }

    #[test]
    fn allocate_returns_distinct_open_descriptors() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };

        let master = pair.master().as_raw_fd();
        let slave = pair.slave().as_raw_fd();
        assert_ne!(master, slave);
        assert!(is_open(master));
        assert!(is_open(slave));

        let size = terminal_size(pair.slave()).expect("slave size");
        assert_eq!((size.rows, size.cols), (24, 80));
    }

    #[test]
    fn resize_keeps_both_descriptors_open() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };

        let master = pair.master().as_raw_fd();
        let slave = pair.slave().as_raw_fd();
        resize_terminal(slave, 50, 120).expect("resize slave");

        assert!(is_open(master));
        assert!(is_open(slave));
        let size = terminal_size(pair.master()).expect("master size");
        assert_eq!((size.rows, size.cols), (50, 120));
    }

    #[test]
    fn invalid_geometry_is_rejected_before_allocation() {
        for (rows, cols) in [(0, 80), (80, -1)] {
            assert!(matches!(
                allocate_pty(rows, cols),
                Err(CursesError::InvalidGeometry { .. })
            ));
        }
    }

    #[test]
    fn into_raw_fds_transfers_ownership() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };

        let (master, slave) = pair.into_raw_fds();
        assert!(is_open(master));
        assert!(is_open(slave));
        unsafe {
            libc::close(master);
            libc::close(slave);
        }
    }

    #[test]
    fn descriptors_are_close_on_exec() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };

        for fd in [pair.master(), pair.slave()] {
            let flags = fcntl(fd, FcntlArg::F_GETFD).expect("F_GETFD");
            assert!(FdFlag::from_bits_retain(flags).contains(FdFlag::FD_CLOEXEC));
        }
    }

    #[test]
    fn only_the_master_turns_nonblocking() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };
        let status = |fd: BorrowedFd<'_>| {
            let flags = fcntl(fd, FcntlArg::F_GETFL).expect("F_GETFL");
            OFlag::from_bits_retain(flags)
        };

        assert!(!status(pair.master()).contains(OFlag::O_NONBLOCK));
        pair.set_master_nonblocking().expect("nonblocking master");
        assert!(status(pair.master()).contains(OFlag::O_NONBLOCK));
        assert!(!status(pair.slave()).contains(OFlag::O_NONBLOCK));
    }

    #[test]
    fn pair_resize_tracks_size() {
        let Some(mut pair) = allocate_or_skip(24, 80) else {
            return;
        };

        pair.resize(40, 100).expect("resize");
        assert_eq!((pair.size().rows, pair.size().cols), (40, 100));
        assert!(matches!(
            pair.resize(0, 100),
            Err(CursesError::InvalidGeometry { .. })
        ));
        assert_eq!((pair.size().rows, pair.size().cols), (40, 100));
    }

    #[test]
    fn spawned_child_sees_the_pty_size() {
        let Some(pair) = allocate_or_skip(33, 91) else {
            return;
        };
        pair.set_master_nonblocking().expect("nonblocking master");

        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg("stty size");
        let mut child = pair.spawn(cmd).expect("spawn child");

        let (master, _slave) = pair.into_fds();
        let mut master = File::from(master);
        let output = read_output(&mut master);
        let _ = child.wait();

        assert!(output.contains("33 91"), "unexpected output: {output:?}");
    }

    #[test]
    fn child_input_round_trips_through_master() {
        let Some(pair) = allocate_or_skip(24, 80) else {
            return;
        };
        pair.set_master_nonblocking().expect("nonblocking master");

        let mut child = pair.spawn(Command::new("/bin/cat")).expect("spawn cat");
        let (master, _slave) = pair.into_fds();
        let mut master = File::from(master);

        master.write_all(b"otty-curses\n").expect("write to master");
        let output = read_output(&mut master);
        assert!(output.contains("otty-curses"), "unexpected: {output:?}");

        let _ = child.kill();
        let _ = child.wait();
    }
}
