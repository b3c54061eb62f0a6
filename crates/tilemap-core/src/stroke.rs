//! Stroke Sessions
//!
//! # Overview
//!
//! Stamp and eraser drags change tiles live, on every pointer move, but must undo as one step.
//! A [`StrokeSession`] is the explicit state of such a drag. It writes tiles straight into the
//! map and remembers, per position, the tile that was there before the first touch. When the
//! drag ends, [`StrokeSession::finish`] turns that record into a single
//! [`StampSequence`] or [`EraserSequence`] which the caller stores on the history without
//! executing it again.
//!
//! Positions outside the layer are skipped, so dragging past the map edge is harmless.
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{
//!     LayerKind, Map, MatrixExtent, StrokeSession, TileMatrix, TilePos, UndoCommand,
//! };
//!
//! let mut map = Map::new(MatrixExtent::new(4, 4)).unwrap();
//! let layer = map.add_layer(LayerKind::Tile, None).unwrap();
//!
//! let mut stroke = StrokeSession::stamp(layer);
//! stroke.paint(&mut map, TilePos::new(0, 0), 3).unwrap();
//! stroke.paint(&mut map, TilePos::new(0, 1), 3).unwrap();
//! stroke.paint(&mut map, TilePos::new(9, 9), 3).unwrap();
//! assert_eq!(map.tree().find_tile_layer(layer).unwrap().tile_at(TilePos::new(0, 1)), Some(3));
//!
//! assert_eq!(stroke.len(), 2);
//! let command = stroke.finish().unwrap();
//! assert_eq!(command.text(), "Stamp Sequence");
//! ```

use crate::commands::{Command, EraserSequence, StampSequence};
use crate::layer::LayerId;
use crate::map::{Map, MapError};
use crate::storage::TileMatrix;
use crate::tile::{EMPTY_TILE, TileCache, TileId, TilePos};

/// Tool driving a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeTool {
    /// Writes tiles.
    Stamp,
    /// Clears tiles.
    Eraser,
}

/// Rectangular block of tiles stamped around the cursor.
///
/// [`EMPTY_TILE`] cells of a pattern are transparent and leave the map alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePattern {
    rows: usize,
    cols: usize,
    tiles: Vec<TileId>,
}

impl TilePattern {
    /// Build a pattern from row-major tiles. Returns `None` unless `tiles` holds exactly
    /// `rows * cols` (at least one) entries.
    pub fn new(rows: usize, cols: usize, tiles: Vec<TileId>) -> Option<Self> {
        (rows > 0 && cols > 0 && tiles.len() == rows * cols).then_some(Self { rows, cols, tiles })
    }

    /// A one-tile pattern.
    pub fn single(tile: TileId) -> Self {
        Self {
            rows: 1,
            cols: 1,
            tiles: vec![tile],
        }
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Offsets from the cursor and tiles of the non-empty cells. The pattern is centered on the
    /// cursor, rounding toward the top-left.
    fn cells(&self) -> impl Iterator<Item = (i32, i32, TileId)> + '_ {
        let center_row = (self.rows / 2) as i32;
        let center_col = (self.cols / 2) as i32;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile != EMPTY_TILE)
            .map(move |(index, tile)| {
                let row = (index / self.cols) as i32 - center_row;
                let col = (index % self.cols) as i32 - center_col;
                (row, col, *tile)
            })
    }
}

/// An in-progress stamp or eraser drag on one tile layer.
#[derive(Debug, Clone)]
pub struct StrokeSession {
    layer: LayerId,
    tool: StrokeTool,
    old_tiles: TileCache,
    new_tiles: TileCache,
}

impl StrokeSession {
    /// Start a stamp stroke.
    pub fn stamp(layer: LayerId) -> Self {
        Self::new(layer, StrokeTool::Stamp)
    }

    /// Start an eraser stroke.
    pub fn eraser(layer: LayerId) -> Self {
        Self::new(layer, StrokeTool::Eraser)
    }

    fn new(layer: LayerId, tool: StrokeTool) -> Self {
        Self {
            layer,
            tool,
            old_tiles: TileCache::new(),
            new_tiles: TileCache::new(),
        }
    }

    /// Layer being painted.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Tool driving the stroke.
    pub fn tool(&self) -> StrokeTool {
        self.tool
    }

    /// Number of positions changed so far.
    pub fn len(&self) -> usize {
        self.old_tiles.len()
    }

    /// Returns `true` if the stroke has not changed anything yet.
    pub fn is_empty(&self) -> bool {
        self.old_tiles.is_empty()
    }

    /// Tiles each touched position held before the stroke.
    pub fn old_tiles(&self) -> &TileCache {
        &self.old_tiles
    }

    /// Write one tile. The eraser ignores `tile` and clears.
    ///
    /// Returns `true` if the map changed.
    pub fn paint(&mut self, map: &mut Map, pos: TilePos, tile: TileId) -> Result<bool, MapError> {
        let tile = match self.tool {
            StrokeTool::Stamp => tile,
            StrokeTool::Eraser => EMPTY_TILE,
        };
        let layer = map.require_tile_layer(self.layer)?;
        let Some(current) = layer.tile_at(pos) else {
            return Ok(false);
        };
        if current == tile {
            return Ok(false);
        }

        layer.set_tile(pos, tile)?;
        self.old_tiles.entry(pos).or_insert(current);
        if self.tool == StrokeTool::Stamp {
            self.new_tiles.insert(pos, tile);
        }
        Ok(true)
    }

    /// Erase one tile. Same as [`StrokeSession::paint`] for an eraser stroke.
    pub fn erase(&mut self, map: &mut Map, pos: TilePos) -> Result<bool, MapError> {
        self.paint(map, pos, EMPTY_TILE)
    }

    /// Stamp `pattern` centered on `cursor`. Returns the number of tiles that changed.
    pub fn stamp_pattern(
        &mut self,
        map: &mut Map,
        cursor: TilePos,
        pattern: &TilePattern,
    ) -> Result<usize, MapError> {
        let mut changed = 0;
        for (row, col, tile) in pattern.cells() {
            if self.paint(map, cursor.offset(row, col), tile)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// End the stroke.
    ///
    /// Returns the command recording it, or `None` if nothing changed. The changes are already
    /// in the map, so the command belongs on the history via
    /// [`CommandStack::store`](crate::CommandStack::store).
    pub fn finish(self) -> Option<Command> {
        if self.old_tiles.is_empty() {
            return None;
        }
        tracing::debug!(layer = %self.layer, tool = ?self.tool, tiles = self.old_tiles.len(), "finished stroke");
        let command = match self.tool {
            StrokeTool::Stamp => {
                StampSequence::new(self.layer, self.old_tiles, self.new_tiles).into()
            }
            StrokeTool::Eraser => EraserSequence::new(self.layer, self.old_tiles).into(),
        };
        Some(command)
    }
}
