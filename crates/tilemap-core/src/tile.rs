//! Tile identifiers, tile positions and matrix extents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Tile identifier. Identifiers are global across all tilesets attached to a map.
pub type TileId = u32;

/// The identifier that denotes the absence of a tile.
pub const EMPTY_TILE: TileId = 0;

/// Tiles keyed by position, used to remember values overwritten by an edit.
pub type TileCache = BTreeMap<TilePos, TileId>;

/// A position in a tile matrix.
///
/// Coordinates are signed so that neighbors of edge positions can be expressed (and rejected)
/// without wrapping arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Row index.
    pub row: i32,
    /// Column index.
    pub col: i32,
}

impl TilePos {
    /// Create a new tile position.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Create a tile position from unsigned matrix coordinates.
    pub fn from_usize(row: usize, col: usize) -> Self {
        Self {
            row: i32::try_from(row).unwrap_or(i32::MAX),
            col: i32::try_from(col).unwrap_or(i32::MAX),
        }
    }

    /// Return this position translated by the given amount.
    pub const fn offset(self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }

    /// The four orthogonally adjacent positions (north, south, west, east).
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

/// Number of rows and columns in a tile matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixExtent {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub cols: usize,
}

impl MatrixExtent {
    /// Create a new extent.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Returns `true` if both dimensions are at least one.
    pub const fn is_valid(self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    /// Total number of cells.
    pub const fn area(self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if `pos` lies inside this extent.
    pub fn contains(self, pos: TilePos) -> bool {
        self.index_of(pos).is_some()
    }

    /// Row-major linear index of `pos`, if it lies inside this extent.
    pub fn index_of(self, pos: TilePos) -> Option<usize> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// Iterate over every position in row-major order.
    pub fn positions(self) -> impl Iterator<Item = TilePos> {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| TilePos::from_usize(row, col)))
    }
}

impl std::fmt::Display for MatrixExtent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Tile storage errors.
///
/// Both variants are invalid-argument failures: the caller asked for something the current
/// matrix cannot represent. They are returned, never raised as panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileError {
    /// The position lies outside the current extent.
    #[error("invalid argument: position ({}, {}) is outside the {extent} matrix", .pos.row, .pos.col)]
    PositionOutOfBounds {
        /// Requested position.
        pos: TilePos,
        /// Extent at the time of the request.
        extent: MatrixExtent,
    },
    /// The requested extent has a zero dimension.
    #[error("invalid argument: extent {0} must have at least one row and one column")]
    InvalidExtent(MatrixExtent),
}
