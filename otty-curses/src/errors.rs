use std::io;

#[cfg(unix)]
use nix::errno::Errno;
use thiserror::Error;

/// Status code for a successful call through the C ABI.
pub const STATUS_OK: i32 = 0;

#[derive(Error, Debug)]
pub enum CursesError {
    #[error("invalid terminal geometry {rows}x{cols}")]
    InvalidGeometry { rows: i64, cols: i64 },

    #[error("invalid file descriptor {0}")]
    InvalidDescriptor(i32),

    #[error("file descriptor {0} is not a terminal")]
    NotATerminal(i32),

    #[error("screen is not initialized")]
    ScreenNotInitialized,

    #[error("terminal session is already active in this process")]
    SessionActive,

    #[cfg(unix)]
    #[error("failed to allocate pty: {0}")]
    Allocate(Errno),

    #[error("failed to resize pty: {0}")]
    Resize(io::Error),

    #[cfg(unix)]
    #[error("error from *nix bindings")]
    Nix(#[from] Errno),

    #[error("terminal I/O error: {0}")]
    IO(#[from] io::Error),

    #[error("terminal description unavailable: {0}")]
    Terminfo(#[from] terminfo::Error),

    #[error("failed to serialize capability table: {0}")]
    Json(#[from] serde_json::Error),
}

impl CursesError {
    /// Stable status code handed across the C ABI. Always negative.
    pub fn code(&self) -> i32 {
        match self {
            CursesError::InvalidGeometry { .. } => -1,
            CursesError::InvalidDescriptor(_) => -2,
            CursesError::NotATerminal(_) => -3,
            CursesError::ScreenNotInitialized => -4,
            CursesError::SessionActive => -5,
            #[cfg(unix)]
            CursesError::Allocate(_) => -6,
            CursesError::Resize(_) => -7,
            #[cfg(unix)]
            CursesError::Nix(_) => -8,
            CursesError::IO(_) => -8,
            CursesError::Terminfo(_) => -9,
            CursesError::Json(_) => -10,
        }
    }

    /// OS error number behind the failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            #[cfg(unix)]
            CursesError::Allocate(errno) | CursesError::Nix(errno) => {
                Some(*errno as i32)
            },
            CursesError::Resize(err) | CursesError::IO(err) => {
                err.raw_os_error()
            },
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CursesError>;
