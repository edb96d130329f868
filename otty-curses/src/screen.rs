use std::fs::File;
use std::io::Write;
use std::os::fd::BorrowedFd;

use log::{debug, trace, warn};

use crate::Result;
use crate::termcaps::TermCaps;

/// The primary display surface: a terminal description bound to an output
/// descriptor.
///
/// The screen writes through its own duplicate of the descriptor, so the
/// caller keeps full ownership of the original.
#[derive(Debug)]
pub struct Screen {
    output: File,
    caps: TermCaps,
    keypad: bool,
}

impl Screen {
    pub fn open(output: BorrowedFd<'_>, caps: TermCaps) -> Result<Self> {
        let output = File::from(output.try_clone_to_owned()?);
        debug!("screen opened for terminal {:?}", caps.name);

        Ok(Self {
            output,
            caps,
            keypad: false,
        })
    }

    pub fn caps(&self) -> &TermCaps {
        &self.caps
    }

    pub fn colors(&self) -> u32 {
        self.caps.colors
    }

    pub fn color_pairs(&self) -> u32 {
        self.caps.pairs
    }

    pub fn keypad(&self) -> bool {
        self.keypad
    }

    /// Put the terminal's keypad into application mode (`smkx`) or back
    /// into local mode (`rmkx`) and record the state. Decoding the keys the
    /// terminal then sends is left to the host.
    ///
    /// Setting the current value again is a no-op. A terminal without the
    /// `smkx`/`rmkx` strings has nothing to switch and succeeds.
    pub fn set_keypad(&mut self, enable: bool) -> Result<()> {
        if self.keypad == enable {
            trace!("keypad already {}", if enable { "on" } else { "off" });
            return Ok(());
        }

        let sequence = if enable {
            self.caps.keypad_xmit.as_deref()
        } else {
            self.caps.keypad_local.as_deref()
        };

        if let Some(sequence) = sequence {
            self.output.write_all(sequence)?;
            self.output.flush()?;
        }

        self.keypad = enable;
        debug!("keypad {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Restore the terminal and release the screen.
    pub fn end(mut self) -> Result<()> {
        self.set_keypad(false)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if self.keypad {
            if let Err(err) = self.set_keypad(false) {
                warn!("failed to restore keypad mode: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{ErrorKind, Read};
    use std::os::fd::AsFd;
    use std::os::unix::net::UnixStream;

    use super::*;

    fn test_caps() -> TermCaps {
        TermCaps {
            name: "test".to_owned(),
            colors: 8,
            pairs: 64,
            keypad_xmit: Some(b"\x1b[?1h\x1b=".to_vec()),
            keypad_local: Some(b"\x1b[?1l\x1b>".to_vec()),
        }
    }

    fn drain(reader: &mut UnixStream) -> Vec<u8> {
        let mut collected = Vec::new();
        let mut buffer = [0u8; 64];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&buffer[..n]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => panic!("read failed: {err}"),
            }
        }
        collected
    }

    #[test]
    fn keypad_emits_terminal_sequences() -> anyhow::Result<()> {
        let (writer, mut reader) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;

        let mut screen = Screen::open(writer.as_fd(), test_caps())?;
        screen.set_keypad(true)?;
        assert!(screen.keypad());
        assert_eq!(drain(&mut reader), b"\x1b[?1h\x1b=");

        screen.set_keypad(true)?;
        assert!(drain(&mut reader).is_empty());

        screen.set_keypad(false)?;
        assert_eq!(drain(&mut reader), b"\x1b[?1l\x1b>");
        Ok(())
    }

    #[test]
    fn dropping_restores_local_keypad() -> anyhow::Result<()> {
        let (writer, mut reader) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;

        let mut screen = Screen::open(writer.as_fd(), test_caps())?;
        screen.set_keypad(true)?;
        drain(&mut reader);

        drop(screen);
        assert_eq!(drain(&mut reader), b"\x1b[?1l\x1b>");
        Ok(())
    }

    #[test]
    fn missing_sequences_still_succeed() -> anyhow::Result<()> {
        let (writer, _reader) = UnixStream::pair()?;
        let mut screen = Screen::open(writer.as_fd(), TermCaps::default())?;

        screen.set_keypad(true)?;
        assert!(screen.keypad());
        assert_eq!(screen.color_pairs(), 0);
        screen.end()?;
        Ok(())
    }
}
