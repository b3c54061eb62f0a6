//! Tileset commands.
//!
//! Detaching a tileset leaves its tiles in place; [`FixTiles`](super::FixTiles) clears them.

use super::{CommandError, CommandKind};
use crate::command_stack::UndoCommand;
use crate::map::Map;
use crate::tileset::{TilesetId, TilesetRef};

/// Attach a new tileset after the existing ones.
#[derive(Debug, Clone)]
pub struct AddTileset {
    name: String,
    tile_count: u32,
    columns: u32,
    tile_size: (u32, u32),
    tileset: Option<TilesetRef>,
    attached: Option<TilesetId>,
    previous_active: Option<TilesetId>,
}

impl AddTileset {
    /// Create the command. Identifier and tile range are assigned on first execution.
    pub fn new(name: impl Into<String>, tile_count: u32, columns: u32, tile_size: (u32, u32)) -> Self {
        Self {
            name: name.into(),
            tile_count,
            columns,
            tile_size,
            tileset: None,
            attached: None,
            previous_active: None,
        }
    }

    /// The attached tileset, once the command has run.
    pub fn tileset(&self) -> Option<TilesetId> {
        self.attached
    }
}

impl UndoCommand for AddTileset {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddTileset
    }

    fn text(&self) -> &'static str {
        "Add Tileset"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if self.tile_count == 0 || self.columns == 0 {
            return Err(CommandError::InvalidArgument(format!(
                "tileset '{}' has no tiles",
                self.name
            )));
        }

        let tilesets = map.tilesets_mut();
        let tileset = match self.tileset.take() {
            Some(tileset) => tileset,
            None => TilesetRef {
                id: tilesets.next_id(),
                name: self.name.clone(),
                first_tile: tilesets.next_first_tile(),
                tile_count: self.tile_count,
                columns: self.columns,
                tile_size: self.tile_size,
            },
        };
        let id = tileset.id;
        let index = tilesets.len();
        let previous_active = tilesets.active();
        if !tilesets.attach(index, tileset, true) {
            return Err(CommandError::InvalidArgument(format!(
                "tileset {} is already attached",
                id.get()
            )));
        }
        self.attached = Some(id);
        self.previous_active = previous_active;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some(id) = self.attached else {
            return Ok(());
        };
        let tilesets = map.tilesets_mut();
        let (_, tileset) = tilesets.detach(id).ok_or(CommandError::TilesetNotFound(id))?;
        tilesets.set_active(self.previous_active);
        self.tileset = Some(tileset);
        Ok(())
    }
}

/// Detach a tileset.
#[derive(Debug, Clone)]
pub struct RemoveTileset {
    tileset: TilesetId,
    removed: Option<(usize, TilesetRef)>,
    previous_active: Option<TilesetId>,
}

impl RemoveTileset {
    /// Create the command.
    pub fn new(tileset: TilesetId) -> Self {
        Self {
            tileset,
            removed: None,
            previous_active: None,
        }
    }
}

impl UndoCommand for RemoveTileset {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveTileset
    }

    fn text(&self) -> &'static str {
        "Remove Tileset"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let tilesets = map.tilesets_mut();
        let previous_active = tilesets.active();
        let removed = tilesets.detach(self.tileset).ok_or_else(|| {
            tracing::warn!(tileset = self.tileset.get(), "command target tileset not found");
            CommandError::TilesetNotFound(self.tileset)
        })?;
        self.removed = Some(removed);
        self.previous_active = previous_active;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some((index, tileset)) = self.removed.take() else {
            return Ok(());
        };
        let tilesets = map.tilesets_mut();
        if tilesets.find(tileset.id).is_some() {
            let id = tileset.id;
            self.removed = Some((index, tileset));
            return Err(CommandError::InvalidArgument(format!(
                "tileset {} is already attached",
                id.get()
            )));
        }
        tilesets.attach(index, tileset, false);
        tilesets.set_active(self.previous_active);
        Ok(())
    }
}
