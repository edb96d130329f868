#[cfg(unix)]
use nix::libc::{self, winsize};
use serde::Serialize;

use crate::{CursesError, Result};

/// The size of the visible display area of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSize {
    /// The number of lines of text
    pub rows: u16,
    /// The number of columns of text
    pub cols: u16,
    /// The width of a cell in pixels.
    pub cell_width: u16,
    /// The height of a cell in pixels.
    pub cell_height: u16,
}

impl WindowSize {
    /// Validate a caller supplied geometry. Both dimensions must be in
    /// `1..=u16::MAX`; anything else is rejected before it reaches the OS.
    pub fn new(rows: i32, cols: i32) -> Result<Self> {
        let invalid = || CursesError::InvalidGeometry {
            rows: rows.into(),
            cols: cols.into(),
        };

        let rows = u16::try_from(rows).map_err(|_| invalid())?;
        let cols = u16::try_from(cols).map_err(|_| invalid())?;
        if rows == 0 || cols == 0 {
            return Err(invalid());
        }

        Ok(Self {
            rows,
            cols,
            cell_width: 0,
            cell_height: 0,
        })
    }

    /// Attach pixel dimensions of a single cell.
    pub fn with_cell_size(mut self, cell_width: u16, cell_height: u16) -> Self {
        self.cell_width = cell_width;
        self.cell_height = cell_height;
        self
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize {
            rows: 24,
            cols: 80,
            cell_width: 0,
            cell_height: 0,
        }
    }
}

#[cfg(unix)]
impl From<WindowSize> for winsize {
    fn from(value: WindowSize) -> winsize {
        let ws_row = value.rows as libc::c_ushort;
        let ws_col = value.cols as libc::c_ushort;

        let ws_xpixel = ws_col.saturating_mul(value.cell_width);
        let ws_ypixel = ws_row.saturating_mul(value.cell_height);

        winsize {
            ws_row,
            ws_col,
            ws_xpixel,
            ws_ypixel,
        }
    }
}

#[cfg(unix)]
impl From<winsize> for WindowSize {
    fn from(value: winsize) -> Self {
        let cell =
            |pixels: u16, cells: u16| pixels.checked_div(cells).unwrap_or(0);

        WindowSize {
            rows: value.ws_row,
            cols: value.ws_col,
            cell_width: cell(value.ws_xpixel, value.ws_col),
            cell_height: cell(value.ws_ypixel, value.ws_row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_geometry() {
        for (rows, cols) in [(0, 80), (80, -1), (-5, -5), (0, 0)] {
            match WindowSize::new(rows, cols) {
                Err(CursesError::InvalidGeometry { rows: r, cols: c }) => {
                    assert_eq!((r, c), (rows.into(), cols.into()));
                },
                other => panic!("expected InvalidGeometry, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_geometry_wider_than_winsize() {
        assert!(WindowSize::new(24, 70_000).is_err());
        assert!(WindowSize::new(i32::from(u16::MAX), 1).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn winsize_carries_pixel_dimensions() {
        let size = WindowSize::new(24, 80).unwrap().with_cell_size(8, 16);
        let ws: winsize = size.into();

        assert_eq!((ws.ws_row, ws.ws_col), (24, 80));
        assert_eq!((ws.ws_xpixel, ws.ws_ypixel), (640, 384));
        assert_eq!(WindowSize::from(ws), size);
    }
}
