//! Map Document
//!
//! # Overview
//!
//! [`MapDocument`] is what a host application holds per open map. It owns the [`Map`], its
//! [`Viewport`] and the undo history, and is the single entry point for edits:
//!
//! - [`MapDocument::execute`] runs a command and records it
//! - [`MapDocument::register`] records a command whose effect is already in the map (finished
//!   strokes, object drags)
//! - [`MapDocument::undo`] / [`MapDocument::redo`] walk the history
//!
//! Every successful edit, undo, redo and viewport change bumps the document version and
//! notifies subscribers with a [`DocumentChange`]. Failed commands change nothing and notify
//! no one.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tilemap_core::{DocumentChangeKind, LayerKind, Map, MapDocument, MatrixExtent};
//!
//! let mut document = MapDocument::new(Map::new(MatrixExtent::new(5, 5)).unwrap());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! document.subscribe(move |change| sink.lock().unwrap().push(change.kind));
//!
//! let layer = document.add_layer(LayerKind::Tile, None).unwrap();
//! document.rename_layer(layer, "Ground").unwrap();
//! document.undo().unwrap();
//!
//! assert_eq!(document.map().tree().find(layer).unwrap().name(), "Tile Layer 1");
//! assert_eq!(document.version(), 3);
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![DocumentChangeKind::Executed, DocumentChangeKind::Executed, DocumentChangeKind::Undone]
//! );
//! ```

use crate::command_stack::{CommandStack, UndoCommand};
use crate::commands::{
    AddColumns, AddLayer, AddObject, AddRows, AddTileset, Command, CommandError, DuplicateLayer,
    FixTiles, FloodFill, MoveLayerDown, MoveLayerUp, RemoveColumns, RemoveLayer, RemoveObject,
    RemoveRows, RemoveTileset, RenameLayer, ResizeMap, SetLayerOpacity, SetLayerVisible,
};
use crate::layer::{LayerId, LayerKind};
use crate::map::{Map, MapError, TileSize};
use crate::object_layer::{Float2, ObjectId, ObjectKind};
use crate::stroke::{StrokeSession, TilePattern};
use crate::tile::{MatrixExtent, TileId, TilePos};
use crate::tileset::TilesetId;
use crate::viewport::Viewport;
use thiserror::Error;
use tilemap_core_settings::{DEFAULT_COMMAND_CAPACITY, EditorSettings, SettingsError};

/// Errors raised while creating a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The settings are invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The map could not be created.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentChangeKind {
    /// A command was executed or registered.
    Executed,
    /// A command was undone.
    Undone,
    /// A command was redone.
    Redone,
    /// The viewport moved or zoomed.
    ViewportChanged,
}

/// Change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// What happened.
    pub kind: DocumentChangeKind,
    /// Version before the change.
    pub old_version: u64,
    /// Version after the change.
    pub new_version: u64,
    /// Label of the command involved, if any.
    pub command: Option<&'static str>,
}

/// Change callback.
pub type DocumentChangeCallback = Box<dyn FnMut(&DocumentChange) + Send>;

/// An open map with its history and view.
pub struct MapDocument {
    map: Map,
    viewport: Viewport,
    history: CommandStack<Command>,
    version: u64,
    callbacks: Vec<DocumentChangeCallback>,
}

impl std::fmt::Debug for MapDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapDocument")
            .field("map", &self.map)
            .field("viewport", &self.viewport)
            .field("history", &self.history)
            .field("version", &self.version)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl MapDocument {
    /// Wrap an existing map using default settings.
    pub fn new(map: Map) -> Self {
        let viewport = Viewport::new(map.tile_size(), Default::default());
        Self {
            map,
            viewport,
            history: CommandStack::new(DEFAULT_COMMAND_CAPACITY),
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Create an empty map configured by `settings`.
    pub fn with_settings(settings: &EditorSettings) -> Result<Self, DocumentError> {
        settings.validate()?;
        let extent = MatrixExtent::new(settings.map_extent.rows, settings.map_extent.cols);
        let mut map = Map::with_format(extent, settings.tile_format)?;
        let tile_size = TileSize {
            width: settings.tile_size.width,
            height: settings.tile_size.height,
        };
        map.set_tile_size(tile_size);

        tracing::debug!(%extent, capacity = settings.command_capacity, "created map document");
        Ok(Self {
            map,
            viewport: Viewport::new(tile_size, settings.viewport),
            history: CommandStack::new(settings.command_capacity),
            version: 0,
            callbacks: Vec::new(),
        })
    }

    /// The map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The undo history.
    pub fn history(&self) -> &CommandStack<Command> {
        &self.history
    }

    /// Current version. Starts at 0 and grows by one per change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` if anything changed after `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Execute a command and record it.
    pub fn execute(&mut self, command: impl Into<Command>) -> Result<(), CommandError> {
        let command = command.into();
        let text = command.text();
        self.history.push(command, &mut self.map)?;
        self.notify(DocumentChangeKind::Executed, Some(text));
        Ok(())
    }

    /// Record a command whose effect is already in the map.
    pub fn register(&mut self, command: impl Into<Command>) {
        let command = command.into();
        let text = command.text();
        self.history.store(command);
        self.notify(DocumentChangeKind::Executed, Some(text));
    }

    /// Undo the last command. Does nothing if everything is undone.
    pub fn undo(&mut self) -> Result<(), CommandError> {
        let Some(text) = self.history.undo_text() else {
            return Ok(());
        };
        self.history.undo(&mut self.map)?;
        self.notify(DocumentChangeKind::Undone, Some(text));
        Ok(())
    }

    /// Redo the next undone command. Does nothing if nothing is redoable.
    pub fn redo(&mut self) -> Result<(), CommandError> {
        let Some(text) = self.history.redo_text() else {
            return Ok(());
        };
        self.history.redo(&mut self.map)?;
        self.notify(DocumentChangeKind::Redone, Some(text));
        Ok(())
    }

    /// Returns `true` if a command can be undone.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if a command can be redone.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the command [`MapDocument::undo`] would revert.
    pub fn undo_text(&self) -> Option<&'static str> {
        self.history.undo_text()
    }

    /// Label of the command [`MapDocument::redo`] would apply.
    pub fn redo_text(&self) -> Option<&'static str> {
        self.history.redo_text()
    }

    /// Returns `true` if the history is at the last save point.
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    /// Mark the current history position as saved.
    pub fn mark_as_clean(&mut self) {
        self.history.mark_as_clean();
    }

    /// Change the number of commands the history keeps.
    pub fn set_command_capacity(&mut self, capacity: usize) {
        self.history.set_capacity(capacity);
    }

    /// Make `layer` the active layer. Selection is not undoable.
    pub fn select_layer(&mut self, layer: LayerId) -> bool {
        self.map.select_layer(layer)
    }

    /// Paint one tile of a live stroke straight into the map.
    ///
    /// Nothing is recorded or announced until [`MapDocument::finish_stroke`].
    pub fn paint_stroke(
        &mut self,
        stroke: &mut StrokeSession,
        pos: TilePos,
        tile: TileId,
    ) -> Result<bool, MapError> {
        stroke.paint(&mut self.map, pos, tile)
    }

    /// Stamp a pattern as part of a live stroke. Returns the number of changed tiles.
    pub fn stamp_stroke(
        &mut self,
        stroke: &mut StrokeSession,
        cursor: TilePos,
        pattern: &TilePattern,
    ) -> Result<usize, MapError> {
        stroke.stamp_pattern(&mut self.map, cursor, pattern)
    }

    /// Record a finished stroke. Returns `false` if the stroke changed nothing.
    pub fn finish_stroke(&mut self, stroke: StrokeSession) -> bool {
        match stroke.finish() {
            Some(command) => {
                self.register(command);
                true
            }
            None => false,
        }
    }

    /// Append rows to the map.
    pub fn add_rows(&mut self, count: usize) -> Result<(), CommandError> {
        self.execute(AddRows::new(count))
    }

    /// Append columns to the map.
    pub fn add_columns(&mut self, count: usize) -> Result<(), CommandError> {
        self.execute(AddColumns::new(count))
    }

    /// Remove rows from the bottom of the map.
    pub fn remove_rows(&mut self, count: usize) -> Result<(), CommandError> {
        self.execute(RemoveRows::new(count))
    }

    /// Remove columns from the right of the map.
    pub fn remove_columns(&mut self, count: usize) -> Result<(), CommandError> {
        self.execute(RemoveColumns::new(count))
    }

    /// Resize the map.
    pub fn resize(&mut self, extent: MatrixExtent) -> Result<(), CommandError> {
        self.execute(ResizeMap::new(extent))
    }

    /// Clear tiles that belong to no attached tileset.
    pub fn fix_tiles(&mut self) -> Result<(), CommandError> {
        self.execute(FixTiles::new())
    }

    /// Add a layer as the last child of `parent` (or at top level). Returns the new layer.
    pub fn add_layer(
        &mut self,
        kind: LayerKind,
        parent: Option<LayerId>,
    ) -> Result<LayerId, CommandError> {
        self.execute(AddLayer::new(kind, parent))?;
        self.map
            .active_layer()
            .ok_or_else(|| CommandError::InvalidArgument("new layer was not selected".into()))
    }

    /// Remove a layer and its descendants.
    pub fn remove_layer(&mut self, layer: LayerId) -> Result<(), CommandError> {
        self.execute(RemoveLayer::new(layer))
    }

    /// Duplicate a layer. Returns the copy.
    pub fn duplicate_layer(&mut self, layer: LayerId) -> Result<LayerId, CommandError> {
        self.execute(DuplicateLayer::new(layer))?;
        self.map.tree().sibling_below(layer).ok_or_else(|| {
            CommandError::InvalidArgument(format!("copy of {layer} is not below it"))
        })
    }

    /// Move a layer up among its siblings.
    pub fn move_layer_up(&mut self, layer: LayerId) -> Result<(), CommandError> {
        self.execute(MoveLayerUp::new(layer))
    }

    /// Move a layer down among its siblings.
    pub fn move_layer_down(&mut self, layer: LayerId) -> Result<(), CommandError> {
        self.execute(MoveLayerDown::new(layer))
    }

    /// Rename a layer.
    pub fn rename_layer(
        &mut self,
        layer: LayerId,
        name: impl Into<String>,
    ) -> Result<(), CommandError> {
        self.execute(RenameLayer::new(layer, name))
    }

    /// Change the opacity of a layer.
    pub fn set_layer_opacity(&mut self, layer: LayerId, opacity: f32) -> Result<(), CommandError> {
        self.execute(SetLayerOpacity::new(layer, opacity))
    }

    /// Show or hide a layer.
    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) -> Result<(), CommandError> {
        self.execute(SetLayerVisible::new(layer, visible))
    }

    /// Bucket fill on a tile layer.
    pub fn flood_fill(
        &mut self,
        layer: LayerId,
        origin: TilePos,
        replacement: TileId,
    ) -> Result<(), CommandError> {
        self.execute(FloodFill::new(layer, origin, replacement))
    }

    /// Add an object on top of an object layer. Returns the new object.
    pub fn add_object(
        &mut self,
        layer: LayerId,
        kind: ObjectKind,
        position: Float2,
        size: Float2,
    ) -> Result<ObjectId, CommandError> {
        self.execute(AddObject::new(layer, kind, position, size))?;
        self.map
            .tree()
            .find_object_layer(layer)
            .and_then(|objects| objects.iter().last())
            .map(|object| object.id)
            .ok_or_else(|| CommandError::InvalidArgument(format!("no object added to {layer}")))
    }

    /// Remove an object.
    pub fn remove_object(&mut self, layer: LayerId, object: ObjectId) -> Result<(), CommandError> {
        self.execute(RemoveObject::new(layer, object))
    }

    /// Attach a tileset. Returns its id.
    pub fn add_tileset(
        &mut self,
        name: impl Into<String>,
        tile_count: u32,
        columns: u32,
    ) -> Result<TilesetId, CommandError> {
        let tile_size = self.map.tile_size();
        self.execute(AddTileset::new(
            name,
            tile_count,
            columns,
            (tile_size.width, tile_size.height),
        ))?;
        self.map
            .tilesets()
            .active()
            .ok_or_else(|| CommandError::InvalidArgument("new tileset was not selected".into()))
    }

    /// Detach a tileset.
    pub fn remove_tileset(&mut self, tileset: TilesetId) -> Result<(), CommandError> {
        self.execute(RemoveTileset::new(tileset))
    }

    /// Pan the view by `delta` screen pixels.
    pub fn pan(&mut self, delta: Float2) {
        self.viewport.pan(delta);
        self.notify(DocumentChangeKind::ViewportChanged, None);
    }

    /// Zoom in by one step. Returns `false` (and notifies no one) at the zoom limit.
    pub fn zoom_in(&mut self) -> bool {
        self.change_viewport(Viewport::zoom_in)
    }

    /// Zoom out by one step. Returns `false` (and notifies no one) at the zoom limit.
    pub fn zoom_out(&mut self) -> bool {
        self.change_viewport(Viewport::zoom_out)
    }

    /// Reset pan and zoom.
    pub fn reset_viewport(&mut self) -> bool {
        self.change_viewport(Viewport::reset)
    }

    /// Tile of the map under a screen point.
    pub fn tile_at_screen(&self, point: Float2) -> Option<TilePos> {
        self.viewport
            .tile_at_screen(point)
            .filter(|pos| self.map.extent().contains(*pos))
    }

    fn change_viewport(&mut self, change: impl FnOnce(&mut Viewport)) -> bool {
        let before = self.viewport;
        change(&mut self.viewport);
        if self.viewport == before {
            return false;
        }
        self.notify(DocumentChangeKind::ViewportChanged, None);
        true
    }

    fn notify(&mut self, kind: DocumentChangeKind, command: Option<&'static str>) {
        let old_version = self.version;
        self.version += 1;
        let change = DocumentChange {
            kind,
            old_version,
            new_version: self.version,
            command,
        };
        tracing::trace!(?kind, version = self.version, "document changed");
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
