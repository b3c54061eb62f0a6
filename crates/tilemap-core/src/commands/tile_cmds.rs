//! Tile painting commands.
//!
//! Stamp and eraser strokes are applied live while the user drags, so their commands are
//! recorded after the fact with the old and new tiles already known (see
//! [`StrokeSession`](crate::StrokeSession)). The first `redo` of such a command re-applies
//! tiles that are already in place.

use super::{CommandError, CommandKind, layer_not_found};
use crate::command_stack::UndoCommand;
use crate::flood_fill::flood_fill;
use crate::layer::LayerId;
use crate::map::Map;
use crate::storage::TileMatrix;
use crate::tile::{EMPTY_TILE, TileCache, TileError, TileId, TilePos};
use crate::tile_layer::TileLayer;

fn tile_layer(map: &mut Map, layer: LayerId) -> Result<&mut TileLayer, CommandError> {
    map.tree_mut()
        .find_tile_layer_mut(layer)
        .ok_or_else(|| layer_not_found(layer))
}

/// Write every tile of `tiles`, after checking that all positions are in bounds.
fn write_tiles(
    layer: &mut TileLayer,
    tiles: impl IntoIterator<Item = (TilePos, TileId)> + Clone,
) -> Result<(), CommandError> {
    let extent = layer.extent();
    if let Some((pos, _)) = tiles.clone().into_iter().find(|(pos, _)| !extent.contains(*pos)) {
        return Err(TileError::PositionOutOfBounds { pos, extent }.into());
    }
    for (pos, tile) in tiles {
        layer.set_tile(pos, tile)?;
    }
    Ok(())
}

/// A stamp tool stroke.
#[derive(Debug, Clone)]
pub struct StampSequence {
    layer: LayerId,
    old_tiles: TileCache,
    new_tiles: TileCache,
}

impl StampSequence {
    /// Create the command from the tiles the stroke replaced and the tiles it wrote.
    pub fn new(layer: LayerId, old_tiles: TileCache, new_tiles: TileCache) -> Self {
        Self {
            layer,
            old_tiles,
            new_tiles,
        }
    }

    /// Number of positions touched by the stroke.
    pub fn len(&self) -> usize {
        self.new_tiles.len()
    }

    /// Returns `true` if the stroke touched nothing.
    pub fn is_empty(&self) -> bool {
        self.new_tiles.is_empty()
    }
}

impl UndoCommand for StampSequence {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::StampSequence
    }

    fn text(&self) -> &'static str {
        "Stamp Sequence"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        write_tiles(layer, self.new_tiles.iter().map(|(pos, tile)| (*pos, *tile)))
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        write_tiles(layer, self.old_tiles.iter().map(|(pos, tile)| (*pos, *tile)))
    }
}

/// An eraser tool stroke.
#[derive(Debug, Clone)]
pub struct EraserSequence {
    layer: LayerId,
    old_tiles: TileCache,
}

impl EraserSequence {
    /// Create the command from the tiles the stroke erased.
    pub fn new(layer: LayerId, old_tiles: TileCache) -> Self {
        Self { layer, old_tiles }
    }

    /// Number of erased positions.
    pub fn len(&self) -> usize {
        self.old_tiles.len()
    }

    /// Returns `true` if nothing was erased.
    pub fn is_empty(&self) -> bool {
        self.old_tiles.is_empty()
    }
}

impl UndoCommand for EraserSequence {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::EraserSequence
    }

    fn text(&self) -> &'static str {
        "Eraser Sequence"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        write_tiles(layer, self.old_tiles.keys().map(|pos| (*pos, EMPTY_TILE)))
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        write_tiles(layer, self.old_tiles.iter().map(|(pos, tile)| (*pos, *tile)))
    }
}

/// Bucket fill from an origin tile.
#[derive(Debug, Clone)]
pub struct FloodFill {
    layer: LayerId,
    origin: TilePos,
    replacement: TileId,
    target: Option<TileId>,
    affected: Vec<TilePos>,
}

impl FloodFill {
    /// Create the command.
    pub fn new(layer: LayerId, origin: TilePos, replacement: TileId) -> Self {
        Self {
            layer,
            origin,
            replacement,
            target: None,
            affected: Vec::new(),
        }
    }

    /// Positions replaced by the last `redo`.
    pub fn affected(&self) -> &[TilePos] {
        &self.affected
    }
}

impl UndoCommand for FloodFill {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::FloodFill
    }

    fn text(&self) -> &'static str {
        "Flood Fill"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        self.target = layer.tile_at(self.origin);
        self.affected.clear();
        flood_fill(
            layer,
            self.origin,
            self.replacement,
            Some(&mut self.affected),
        );
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = tile_layer(map, self.layer)?;
        if let Some(target) = self.target.take() {
            let affected = std::mem::take(&mut self.affected);
            write_tiles(layer, affected.into_iter().map(|pos| (pos, target)))?;
        }
        Ok(())
    }
}
