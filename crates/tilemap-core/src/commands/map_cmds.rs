//! Map-wide commands: extent changes and tile validation.

use super::{CommandError, CommandKind};
use crate::command_stack::UndoCommand;
use crate::map::{LayerTileCache, Map};
use crate::tile::MatrixExtent;

fn merge_caches(into: &mut LayerTileCache, from: &mut LayerTileCache) {
    for (layer, tiles) in std::mem::take(from) {
        into.entry(layer).or_default().extend(tiles);
    }
}

/// Append `count` empty rows.
#[derive(Debug, Clone)]
pub struct AddRows {
    count: usize,
}

impl AddRows {
    /// Create the command.
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Number of rows added.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl UndoCommand for AddRows {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddRows
    }

    fn text(&self) -> &'static str {
        "Add Rows"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        for _ in 0..self.count {
            map.add_row();
        }
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        map.resize(MatrixExtent::new(
            extent.rows.saturating_sub(self.count),
            extent.cols,
        ))?;
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        self.count += other.count;
        true
    }
}

/// Append `count` empty columns.
#[derive(Debug, Clone)]
pub struct AddColumns {
    count: usize,
}

impl AddColumns {
    /// Create the command.
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Number of columns added.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl UndoCommand for AddColumns {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddColumns
    }

    fn text(&self) -> &'static str {
        "Add Columns"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        for _ in 0..self.count {
            map.add_column();
        }
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        map.resize(MatrixExtent::new(
            extent.rows,
            extent.cols.saturating_sub(self.count),
        ))?;
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        self.count += other.count;
        true
    }
}

/// Remove `count` rows from the bottom.
#[derive(Debug, Clone)]
pub struct RemoveRows {
    count: usize,
    removed: LayerTileCache,
}

impl RemoveRows {
    /// Create the command.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            removed: LayerTileCache::new(),
        }
    }

    /// Number of rows removed.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl UndoCommand for RemoveRows {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveRows
    }

    fn text(&self) -> &'static str {
        "Remove Rows"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        let target = MatrixExtent::new(extent.rows.saturating_sub(self.count), extent.cols);
        if !target.is_valid() {
            return Err(CommandError::InvalidArgument(format!(
                "cannot remove {} of {} rows",
                self.count, extent.rows
            )));
        }
        self.removed = map.tiles_outside(target);
        map.resize(target)?;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        map.resize(MatrixExtent::new(extent.rows + self.count, extent.cols))?;
        map.restore_tiles(&std::mem::take(&mut self.removed));
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        self.count += other.count;
        merge_caches(&mut self.removed, &mut other.removed);
        true
    }
}

/// Remove `count` columns from the right.
#[derive(Debug, Clone)]
pub struct RemoveColumns {
    count: usize,
    removed: LayerTileCache,
}

impl RemoveColumns {
    /// Create the command.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            removed: LayerTileCache::new(),
        }
    }

    /// Number of columns removed.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl UndoCommand for RemoveColumns {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveColumns
    }

    fn text(&self) -> &'static str {
        "Remove Columns"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        let target = MatrixExtent::new(extent.rows, extent.cols.saturating_sub(self.count));
        if !target.is_valid() {
            return Err(CommandError::InvalidArgument(format!(
                "cannot remove {} of {} columns",
                self.count, extent.cols
            )));
        }
        self.removed = map.tiles_outside(target);
        map.resize(target)?;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let extent = map.extent();
        map.resize(MatrixExtent::new(extent.rows, extent.cols + self.count))?;
        map.restore_tiles(&std::mem::take(&mut self.removed));
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        self.count += other.count;
        merge_caches(&mut self.removed, &mut other.removed);
        true
    }
}

/// Resize the map to an explicit extent.
#[derive(Debug, Clone)]
pub struct ResizeMap {
    extent: MatrixExtent,
    previous: Option<MatrixExtent>,
    removed: LayerTileCache,
}

impl ResizeMap {
    /// Create the command.
    pub fn new(extent: MatrixExtent) -> Self {
        Self {
            extent,
            previous: None,
            removed: LayerTileCache::new(),
        }
    }
}

impl UndoCommand for ResizeMap {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::ResizeMap
    }

    fn text(&self) -> &'static str {
        "Resize Map"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if !self.extent.is_valid() {
            return Err(CommandError::InvalidArgument(format!(
                "map extent {} has a zero dimension",
                self.extent
            )));
        }
        let previous = map.extent();
        self.removed = map.tiles_outside(self.extent);
        map.resize(self.extent)?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some(previous) = self.previous.take() else {
            return Ok(());
        };
        map.resize(previous)?;
        map.restore_tiles(&std::mem::take(&mut self.removed));
        Ok(())
    }
}

/// Clear every tile that does not belong to an attached tileset.
#[derive(Debug, Clone, Default)]
pub struct FixTiles {
    cleared: LayerTileCache,
}

impl FixTiles {
    /// Create the command.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UndoCommand for FixTiles {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::FixTiles
    }

    fn text(&self) -> &'static str {
        "Fix Invalid Tiles"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.cleared = map.fix_tiles();
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.restore_tiles(&std::mem::take(&mut self.cleared));
        Ok(())
    }
}
