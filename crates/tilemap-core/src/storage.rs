//! Tile Matrix Storage Layer
//!
//! Two interchangeable representations of a rectangular grid of tile identifiers:
//!
//! - [`DenseTileMatrix`]: row-major `Vec` sized exactly to the extent. Cheap random access,
//!   memory proportional to the area.
//! - [`SparseTileMatrix`]: position-keyed map that only holds non-empty tiles. Memory
//!   proportional to the number of placed tiles.
//!
//! Both implement [`TileMatrix`], and [`TileStorage`] is the closed union of the two used by
//! tile layers. Observable behavior is identical for any sequence of in-bounds operations.
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{MatrixExtent, SparseTileMatrix, TileMatrix, TilePos, EMPTY_TILE};
//!
//! let mut matrix = SparseTileMatrix::new(MatrixExtent::new(4, 4)).unwrap();
//! matrix.set_tile(TilePos::new(1, 2), 7).unwrap();
//! assert_eq!(matrix.tile_at(TilePos::new(1, 2)), Some(7));
//! assert_eq!(matrix.tile_at(TilePos::new(0, 0)), Some(EMPTY_TILE));
//! assert_eq!(matrix.tile_at(TilePos::new(9, 9)), None);
//! ```

use crate::tile::{EMPTY_TILE, MatrixExtent, TileError, TileId, TilePos};
use std::collections::HashMap;
use tilemap_core_settings::TileFormat;

/// Contract shared by every tile grid representation.
pub trait TileMatrix {
    /// Current extent of the matrix.
    fn extent(&self) -> MatrixExtent;

    /// Tile at `pos`, or `None` if `pos` is outside the extent.
    fn tile_at(&self, pos: TilePos) -> Option<TileId>;

    /// Set the tile at `pos`.
    fn set_tile(&mut self, pos: TilePos, tile: TileId) -> Result<(), TileError>;

    /// Change the extent.
    ///
    /// Growing fills new cells with [`EMPTY_TILE`]; shrinking discards content outside the new
    /// extent.
    fn resize(&mut self, extent: MatrixExtent) -> Result<(), TileError>;

    /// Returns `true` if `pos` lies inside the current extent.
    fn contains(&self, pos: TilePos) -> bool {
        self.extent().contains(pos)
    }

    /// All non-empty tiles in row-major order.
    fn non_empty_tiles(&self) -> Vec<(TilePos, TileId)> {
        self.extent()
            .positions()
            .filter_map(|pos| match self.tile_at(pos) {
                Some(tile) if tile != EMPTY_TILE => Some((pos, tile)),
                _ => None,
            })
            .collect()
    }
}

fn check_extent(extent: MatrixExtent) -> Result<(), TileError> {
    if extent.is_valid() {
        Ok(())
    } else {
        Err(TileError::InvalidExtent(extent))
    }
}

/// Row-major tile storage sized exactly to its extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseTileMatrix {
    extent: MatrixExtent,
    tiles: Vec<TileId>,
}

impl DenseTileMatrix {
    /// Create an empty matrix.
    pub fn new(extent: MatrixExtent) -> Result<Self, TileError> {
        check_extent(extent)?;
        Ok(Self {
            extent,
            tiles: vec![EMPTY_TILE; extent.area()],
        })
    }

    /// Raw row-major tile data.
    pub fn as_slice(&self) -> &[TileId] {
        &self.tiles
    }
}

impl TileMatrix for DenseTileMatrix {
    fn extent(&self) -> MatrixExtent {
        self.extent
    }

    fn tile_at(&self, pos: TilePos) -> Option<TileId> {
        self.extent.index_of(pos).map(|index| self.tiles[index])
    }

    fn set_tile(&mut self, pos: TilePos, tile: TileId) -> Result<(), TileError> {
        let index = self
            .extent
            .index_of(pos)
            .ok_or(TileError::PositionOutOfBounds {
                pos,
                extent: self.extent,
            })?;
        self.tiles[index] = tile;
        Ok(())
    }

    fn resize(&mut self, extent: MatrixExtent) -> Result<(), TileError> {
        check_extent(extent)?;
        if extent == self.extent {
            return Ok(());
        }

        let mut tiles = vec![EMPTY_TILE; extent.area()];
        let rows = self.extent.rows.min(extent.rows);
        let cols = self.extent.cols.min(extent.cols);
        for row in 0..rows {
            let src = row * self.extent.cols;
            let dst = row * extent.cols;
            tiles[dst..dst + cols].copy_from_slice(&self.tiles[src..src + cols]);
        }

        self.extent = extent;
        self.tiles = tiles;
        Ok(())
    }
}

/// Tile storage that only keeps non-empty tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseTileMatrix {
    extent: MatrixExtent,
    tiles: HashMap<TilePos, TileId>,
}

impl SparseTileMatrix {
    /// Create an empty matrix.
    pub fn new(extent: MatrixExtent) -> Result<Self, TileError> {
        check_extent(extent)?;
        Ok(Self {
            extent,
            tiles: HashMap::new(),
        })
    }

    /// Number of stored (non-empty) entries.
    pub fn stored_len(&self) -> usize {
        self.tiles.len()
    }
}

impl TileMatrix for SparseTileMatrix {
    fn extent(&self) -> MatrixExtent {
        self.extent
    }

    fn tile_at(&self, pos: TilePos) -> Option<TileId> {
        if !self.extent.contains(pos) {
            return None;
        }
        Some(self.tiles.get(&pos).copied().unwrap_or(EMPTY_TILE))
    }

    fn set_tile(&mut self, pos: TilePos, tile: TileId) -> Result<(), TileError> {
        if !self.extent.contains(pos) {
            return Err(TileError::PositionOutOfBounds {
                pos,
                extent: self.extent,
            });
        }

        if tile == EMPTY_TILE {
            self.tiles.remove(&pos);
        } else {
            self.tiles.insert(pos, tile);
        }
        Ok(())
    }

    fn resize(&mut self, extent: MatrixExtent) -> Result<(), TileError> {
        check_extent(extent)?;
        if extent.rows < self.extent.rows || extent.cols < self.extent.cols {
            self.tiles.retain(|pos, _| extent.contains(*pos));
        }
        self.extent = extent;
        Ok(())
    }

    fn non_empty_tiles(&self) -> Vec<(TilePos, TileId)> {
        let mut tiles: Vec<_> = self.tiles.iter().map(|(pos, tile)| (*pos, *tile)).collect();
        tiles.sort_unstable_by_key(|(pos, _)| *pos);
        tiles
    }
}

/// Tile storage used by tile layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileStorage {
    /// Row-major storage.
    Dense(DenseTileMatrix),
    /// Map-backed storage.
    Sparse(SparseTileMatrix),
}

impl TileStorage {
    /// Create empty storage of the given format.
    pub fn new(format: TileFormat, extent: MatrixExtent) -> Result<Self, TileError> {
        Ok(match format {
            TileFormat::Dense => Self::Dense(DenseTileMatrix::new(extent)?),
            TileFormat::Sparse => Self::Sparse(SparseTileMatrix::new(extent)?),
        })
    }

    /// The representation currently in use.
    pub fn format(&self) -> TileFormat {
        match self {
            Self::Dense(_) => TileFormat::Dense,
            Self::Sparse(_) => TileFormat::Sparse,
        }
    }

    /// Copy the content into a new storage of `format`.
    pub fn converted(&self, format: TileFormat) -> Self {
        if self.format() == format {
            return self.clone();
        }

        let extent = self.extent();
        let mut target = match format {
            TileFormat::Dense => Self::Dense(DenseTileMatrix {
                extent,
                tiles: vec![EMPTY_TILE; extent.area()],
            }),
            TileFormat::Sparse => Self::Sparse(SparseTileMatrix {
                extent,
                tiles: HashMap::new(),
            }),
        };
        for (pos, tile) in self.non_empty_tiles() {
            let written = target.set_tile(pos, tile);
            debug_assert!(written.is_ok(), "{pos:?} lies outside the converted extent {extent}");
        }
        target
    }
}

impl TileMatrix for TileStorage {
    fn extent(&self) -> MatrixExtent {
        match self {
            Self::Dense(matrix) => matrix.extent(),
            Self::Sparse(matrix) => matrix.extent(),
        }
    }

    fn tile_at(&self, pos: TilePos) -> Option<TileId> {
        match self {
            Self::Dense(matrix) => matrix.tile_at(pos),
            Self::Sparse(matrix) => matrix.tile_at(pos),
        }
    }

    fn set_tile(&mut self, pos: TilePos, tile: TileId) -> Result<(), TileError> {
        match self {
            Self::Dense(matrix) => matrix.set_tile(pos, tile),
            Self::Sparse(matrix) => matrix.set_tile(pos, tile),
        }
    }

    fn resize(&mut self, extent: MatrixExtent) -> Result<(), TileError> {
        match self {
            Self::Dense(matrix) => matrix.resize(extent),
            Self::Sparse(matrix) => matrix.resize(extent),
        }
    }

    fn non_empty_tiles(&self) -> Vec<(TilePos, TileId)> {
        match self {
            Self::Dense(matrix) => matrix.non_empty_tiles(),
            Self::Sparse(matrix) => matrix.non_empty_tiles(),
        }
    }
}
