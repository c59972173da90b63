//! Precomputed navigation tables.
//!
//! A table answers "which way, and how far" for every ordered `(start, end)` pair of a static,
//! wall-only board. Tables are produced offline and shipped as a zip archive holding a single
//! entry named [`ARCHIVE_ENTRY`]. The entry payload is a flat byte array:
//!
//! ```text
//! [d1, d2, d3, d4, d5, cell...]
//! ```
//!
//! where `d1 x d2` is the start board, `d3 x d4` the end board, `d5 == 2`, and each cell is a
//! `(direction code, distance)` byte pair stored at
//! `5 + ((((sx * d2 + sy) * d3 + ex) * d4 + ey) * d5`.
//!
//! Units, nests and other dynamic entities are never reflected in a table.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::{Direction, Grid, Point};

/// Name of the archive entry holding the table payload.
pub const ARCHIVE_ENTRY: &str = "data";

/// Dimension bytes preceding the cells.
pub const HEADER_LEN: usize = 5;

/// Values per cell: direction code and distance.
pub const CELL_WIDTH: usize = 2;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read navigation cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid navigation cache archive: {0}")]
    Archive(#[from] ZipError),

    #[error("navigation cache archive has no `data` entry")]
    MissingEntry,

    #[error("navigation cache corrupted: expected {expected} bytes, got {actual}")]
    Corrupted { expected: u64, actual: u64 },

    #[error("navigation cache dimensions are inconsistent: {0}")]
    BadDimensions(String),
}

/// Read-only direction/distance lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTable {
    /// `[start_width, start_height, end_width, end_height]`
    dims: [usize; 4],
    cells: Vec<u8>,
}

impl NavigationTable {
    /// Loads a table from an archive on disk.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let file = File::open(path)?;
        let table = Self::from_archive(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            width = table.dims[0],
            height = table.dims[1],
            "Loaded navigation cache"
        );
        Ok(table)
    }

    pub fn from_archive<R: Read + Seek>(reader: R) -> Result<Self, CacheError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entry = match archive.by_name(ARCHIVE_ENTRY) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(CacheError::MissingEntry),
            Err(err) => return Err(err.into()),
        };

        let declared = entry.size();
        let mut payload = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
        entry.read_to_end(&mut payload)?;

        Self::from_payload(declared, payload)
    }

    /// Validates a decompressed payload against the size its archive declared.
    pub fn from_payload(declared_len: u64, payload: Vec<u8>) -> Result<Self, CacheError> {
        let actual = payload.len() as u64;
        if actual != declared_len {
            return Err(CacheError::Corrupted {
                expected: declared_len,
                actual,
            });
        }

        let Some(header) = payload.get(..HEADER_LEN) else {
            return Err(CacheError::BadDimensions(format!(
                "payload of {actual} bytes is shorter than the {HEADER_LEN}-byte header"
            )));
        };
        let [d1, d2, d3, d4, d5] = [0, 1, 2, 3, 4].map(|i| usize::from(header[i]));
        if d5 != CELL_WIDTH {
            return Err(CacheError::BadDimensions(format!(
                "cell width is {d5}, expected {CELL_WIDTH}"
            )));
        }
        if [d1, d2, d3, d4].contains(&0) {
            return Err(CacheError::BadDimensions(format!(
                "zero-sized board {d1}x{d2} -> {d3}x{d4}"
            )));
        }

        let expected = HEADER_LEN + d1 * d2 * d3 * d4 * d5;
        if payload.len() != expected {
            return Err(CacheError::Corrupted {
                expected: expected as u64,
                actual,
            });
        }

        let mut cells = payload;
        cells.drain(..HEADER_LEN);
        Ok(Self {
            dims: [d1, d2, d3, d4],
            cells,
        })
    }

    /// Start board `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.dims[0], self.dims[1])
    }

    /// True when this table was generated for a board of `grid`'s size.
    pub fn covers(&self, grid: &Grid) -> bool {
        let (w, h) = (grid.width() as usize, grid.height() as usize);
        self.dims == [w, h, w, h]
    }

    /// `Direction::Nowhere` when `start == end` or `end` is unreachable.
    pub fn next_direction(&self, start: Point, end: Point) -> Direction {
        // Unknown codes are treated as "no move"; the loader does not validate every cell.
        Direction::from_code(self.cells[self.cell_index(start, end)]).unwrap_or_default()
    }

    pub fn distance(&self, start: Point, end: Point) -> u32 {
        u32::from(self.cells[self.cell_index(start, end) + 1])
    }

    fn cell_index(&self, start: Point, end: Point) -> usize {
        let [d1, d2, d3, d4] = self.dims;
        let wrap = |v: i32, len: usize| v.rem_euclid(len as i32) as usize;
        let (sx, sy) = (wrap(start.x, d1), wrap(start.y, d2));
        let (ex, ey) = (wrap(end.x, d3), wrap(end.y, d4));
        (((sx * d2 + sy) * d3 + ex) * d4 + ey) * CELL_WIDTH
    }
}
