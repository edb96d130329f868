//! Delivery of window-change notifications to the current process.

use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

use log::trace;
use mio::event::Source;
use mio::unix::SourceFd;
use mio::{Interest, Registry, Token};
use nix::libc;
use signal_hook::SigId;
use signal_hook::low_level::{self, pipe};

use crate::Result;

/// Non-blocking `SIGWINCH` notification pipe.
///
/// Every signal writes one byte into an internal socket pair; the listener
/// can be polled directly or registered with a [`mio::Poll`] next to a pty
/// master. Dropping the listener unregisters the handler.
#[derive(Debug)]
pub struct WindowChangeListener {
    pipe: UnixStream,
    id: SigId,
}

impl WindowChangeListener {
    pub fn install() -> Result<Self> {
        let (pipe_writer, pipe) = UnixStream::pair()?;
        let id = pipe::register(libc::SIGWINCH, pipe_writer)?;
        pipe.set_nonblocking(true)?;
        Ok(Self { pipe, id })
    }

    /// Drain queued notifications. Returns `true` if at least one window
    /// change arrived since the last call.
    pub fn take_pending(&mut self) -> Result<bool> {
        let mut buffer = [0u8; 16];
        let mut pending = false;

        loop {
            match self.pipe.read(&mut buffer) {
                Ok(0) => return Ok(pending),
                Ok(_) => pending = true,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if pending {
                        trace!("window change pending");
                    }
                    return Ok(pending);
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Source for WindowChangeListener {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        let fd = self.pipe.as_raw_fd();
        SourceFd(&fd).register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        let fd = self.pipe.as_raw_fd();
        SourceFd(&fd).reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        let fd = self.pipe.as_raw_fd();
        SourceFd(&fd).deregister(registry)
    }
}

impl Drop for WindowChangeListener {
    fn drop(&mut self) {
        low_level::unregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mio::{Events, Poll};

    use super::*;

    const WINCH: Token = Token(7);

    #[test]
    fn raised_signal_is_observed() -> anyhow::Result<()> {
        let mut listener = WindowChangeListener::install()?;
        // Other tests in this process may raise the signal too.
        listener.take_pending()?;

        low_level::raise(libc::SIGWINCH)?;
        assert!(listener.take_pending()?);
        Ok(())
    }

    #[test]
    fn listener_wakes_a_mio_poll() -> anyhow::Result<()> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(4);
        let mut listener = WindowChangeListener::install()?;

        poll.registry()
            .register(&mut listener, WINCH, Interest::READABLE)?;
        low_level::raise(libc::SIGWINCH)?;

        poll.poll(&mut events, Some(Duration::from_secs(2)))?;
        assert!(events.iter().any(|event| event.token() == WINCH));
        assert!(listener.take_pending()?);

        poll.registry().deregister(&mut listener)?;
        Ok(())
    }
}
