//! Tile layer content.
//!
//! A [`TileLayer`] wraps one [`TileStorage`] and adds the grid-shaped editing operations used by
//! map-level commands (adding and removing rows and columns), representation conversion and
//! region visiting.

use crate::storage::{TileMatrix, TileStorage};
use crate::tile::{EMPTY_TILE, MatrixExtent, TileError, TileId, TilePos};
use tilemap_core_settings::TileFormat;

/// Half-open rectangular region of tile positions: `begin` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// First row and column.
    pub begin: TilePos,
    /// One past the last row and column.
    pub end: TilePos,
}

impl TileRegion {
    /// Create a new region.
    pub const fn new(begin: TilePos, end: TilePos) -> Self {
        Self { begin, end }
    }

    /// The region covering a whole extent.
    pub fn of_extent(extent: MatrixExtent) -> Self {
        Self {
            begin: TilePos::new(0, 0),
            end: TilePos::from_usize(extent.rows, extent.cols),
        }
    }
}

/// Tile content of a tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    storage: TileStorage,
}

impl TileLayer {
    /// Create an empty tile layer.
    pub fn new(format: TileFormat, extent: MatrixExtent) -> Result<Self, TileError> {
        Ok(Self {
            storage: TileStorage::new(format, extent)?,
        })
    }

    /// Wrap existing storage.
    pub fn from_storage(storage: TileStorage) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    pub fn storage(&self) -> &TileStorage {
        &self.storage
    }

    /// Current representation.
    pub fn format(&self) -> TileFormat {
        self.storage.format()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.storage.extent().rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.storage.extent().cols
    }

    /// Append an empty row at the bottom.
    pub fn add_row(&mut self) {
        let extent = self.storage.extent();
        let grown = self
            .storage
            .resize(MatrixExtent::new(extent.rows + 1, extent.cols));
        debug_assert!(grown.is_ok(), "growing {extent} by a row failed");
    }

    /// Append an empty column at the right.
    pub fn add_column(&mut self) {
        let extent = self.storage.extent();
        let grown = self
            .storage
            .resize(MatrixExtent::new(extent.rows, extent.cols + 1));
        debug_assert!(grown.is_ok(), "growing {extent} by a column failed");
    }

    /// Remove the bottom row. Fails if only one row is left.
    pub fn remove_row(&mut self) -> Result<(), TileError> {
        let extent = self.storage.extent();
        self.storage
            .resize(MatrixExtent::new(extent.rows.saturating_sub(1), extent.cols))
    }

    /// Remove the rightmost column. Fails if only one column is left.
    pub fn remove_column(&mut self) -> Result<(), TileError> {
        let extent = self.storage.extent();
        self.storage
            .resize(MatrixExtent::new(extent.rows, extent.cols.saturating_sub(1)))
    }

    /// Switch to row-major storage, keeping the content.
    pub fn convert_to_dense(&mut self) {
        self.storage = self.storage.converted(TileFormat::Dense);
    }

    /// Switch to map-backed storage, keeping the content.
    pub fn convert_to_sparse(&mut self) {
        self.storage = self.storage.converted(TileFormat::Sparse);
    }

    /// Visit every tile in `region` (clipped to the extent) in row-major order.
    pub fn each_tile(&self, region: TileRegion, mut visit: impl FnMut(TilePos, TileId)) {
        let extent = self.storage.extent();
        let row_end = region.end.row.min(i32::try_from(extent.rows).unwrap_or(i32::MAX));
        let col_end = region.end.col.min(i32::try_from(extent.cols).unwrap_or(i32::MAX));

        for row in region.begin.row.max(0)..row_end {
            for col in region.begin.col.max(0)..col_end {
                let pos = TilePos::new(row, col);
                if let Some(tile) = self.storage.tile_at(pos) {
                    visit(pos, tile);
                }
            }
        }
    }

    /// Number of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        match &self.storage {
            TileStorage::Sparse(matrix) => matrix.stored_len(),
            TileStorage::Dense(matrix) => matrix
                .as_slice()
                .iter()
                .filter(|tile| **tile != EMPTY_TILE)
                .count(),
        }
    }
}

impl TileMatrix for TileLayer {
    fn extent(&self) -> MatrixExtent {
        self.storage.extent()
    }

    fn tile_at(&self, pos: TilePos) -> Option<TileId> {
        self.storage.tile_at(pos)
    }

    fn set_tile(&mut self, pos: TilePos, tile: TileId) -> Result<(), TileError> {
        self.storage.set_tile(pos, tile)
    }

    fn resize(&mut self, extent: MatrixExtent) -> Result<(), TileError> {
        self.storage.resize(extent)
    }

    fn non_empty_tiles(&self) -> Vec<(TilePos, TileId)> {
        self.storage.non_empty_tiles()
    }
}
