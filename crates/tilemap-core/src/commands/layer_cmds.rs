//! Layer commands: structure edits and per-layer attributes.

use super::{CommandError, CommandKind, layer_not_found, require_layer};
use crate::command_stack::UndoCommand;
use crate::layer::{LayerId, LayerKind};
use crate::map::Map;
use crate::snapshot::LayerSnapshot;

/// Add a new layer as the last child of a group (or at top level).
#[derive(Debug, Clone)]
pub struct AddLayer {
    kind: LayerKind,
    parent: Option<LayerId>,
    layer: Option<LayerId>,
    removed: Option<LayerSnapshot>,
    previous_active: Option<LayerId>,
}

impl AddLayer {
    /// Create the command.
    pub fn new(kind: LayerKind, parent: Option<LayerId>) -> Self {
        Self {
            kind,
            parent,
            layer: None,
            removed: None,
            previous_active: None,
        }
    }

    /// The created layer, once the command has run.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }
}

impl UndoCommand for AddLayer {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddLayer
    }

    fn text(&self) -> &'static str {
        "Add Layer"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(snapshot) = &self.removed {
            map.check_restore(snapshot)?;
        }
        let previous_active = map.active_layer();
        let id = match self.removed.take() {
            Some(snapshot) => {
                let id = map.restore_layer(snapshot)?;
                map.select_layer(id);
                id
            }
            None => {
                if let Some(parent) = self.parent
                    && !map.tree().contains(parent)
                {
                    return Err(layer_not_found(parent));
                }
                map.add_layer(self.kind, self.parent)?
            }
        };
        self.layer = Some(id);
        self.previous_active = previous_active;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some(id) = self.layer else {
            return Ok(());
        };
        if !map.tree().contains(id) {
            return Err(layer_not_found(id));
        }
        self.removed = Some(map.remove_layer(id)?);
        map.set_active_layer(self.previous_active);
        Ok(())
    }
}

/// Remove a layer and everything nested in it.
#[derive(Debug, Clone)]
pub struct RemoveLayer {
    layer: LayerId,
    removed: Option<LayerSnapshot>,
    previous_active: Option<LayerId>,
}

impl RemoveLayer {
    /// Create the command.
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            removed: None,
            previous_active: None,
        }
    }
}

impl UndoCommand for RemoveLayer {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveLayer
    }

    fn text(&self) -> &'static str {
        "Remove Layer"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if !map.tree().contains(self.layer) {
            return Err(layer_not_found(self.layer));
        }
        self.previous_active = map.active_layer();
        self.removed = Some(map.remove_layer(self.layer)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(snapshot) = &self.removed {
            map.check_restore(snapshot)?;
        }
        let Some(snapshot) = self.removed.take() else {
            return Ok(());
        };
        map.restore_layer(snapshot)?;
        map.set_active_layer(self.previous_active);
        Ok(())
    }
}

/// Deep-copy a layer next to itself.
#[derive(Debug, Clone)]
pub struct DuplicateLayer {
    source: LayerId,
    copy: Option<LayerId>,
    removed: Option<LayerSnapshot>,
}

impl DuplicateLayer {
    /// Create the command.
    pub fn new(source: LayerId) -> Self {
        Self {
            source,
            copy: None,
            removed: None,
        }
    }

    /// The copy, once the command has run.
    pub fn copy(&self) -> Option<LayerId> {
        self.copy
    }
}

impl UndoCommand for DuplicateLayer {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::DuplicateLayer
    }

    fn text(&self) -> &'static str {
        "Duplicate Layer"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(snapshot) = &self.removed {
            map.check_restore(snapshot)?;
        }
        let copy = match self.removed.take() {
            Some(snapshot) => map.restore_layer(snapshot)?,
            None => {
                if !map.tree().contains(self.source) {
                    return Err(layer_not_found(self.source));
                }
                map.duplicate_layer(self.source)?
            }
        };
        self.copy = Some(copy);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some(copy) = self.copy else {
            return Ok(());
        };
        if !map.tree().contains(copy) {
            return Err(layer_not_found(copy));
        }
        self.removed = Some(map.remove_layer(copy)?);
        Ok(())
    }
}

fn move_layer(map: &mut Map, layer: LayerId, up: bool) -> Result<(), CommandError> {
    let tree = map.tree_mut();
    if !tree.contains(layer) {
        return Err(layer_not_found(layer));
    }
    if up {
        if !tree.can_move_up(layer) {
            return Err(CommandError::InvalidArgument(format!(
                "{layer} is already first among its siblings"
            )));
        }
        tree.move_up(layer);
    } else {
        if !tree.can_move_down(layer) {
            return Err(CommandError::InvalidArgument(format!(
                "{layer} is already last among its siblings"
            )));
        }
        tree.move_down(layer);
    }
    Ok(())
}

/// Swap a layer with the sibling above it.
#[derive(Debug, Clone)]
pub struct MoveLayerUp {
    layer: LayerId,
}

impl MoveLayerUp {
    /// Create the command.
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl UndoCommand for MoveLayerUp {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::MoveLayerUp
    }

    fn text(&self) -> &'static str {
        "Move Layer Up"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        move_layer(map, self.layer, true)
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        move_layer(map, self.layer, false)
    }
}

/// Swap a layer with the sibling below it.
#[derive(Debug, Clone)]
pub struct MoveLayerDown {
    layer: LayerId,
}

impl MoveLayerDown {
    /// Create the command.
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl UndoCommand for MoveLayerDown {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::MoveLayerDown
    }

    fn text(&self) -> &'static str {
        "Move Layer Down"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        move_layer(map, self.layer, false)
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        move_layer(map, self.layer, true)
    }
}

/// Rename a layer. Consecutive renames of the same layer merge.
#[derive(Debug, Clone)]
pub struct RenameLayer {
    layer: LayerId,
    name: String,
    previous: Option<String>,
}

impl RenameLayer {
    /// Create the command.
    pub fn new(layer: LayerId, name: impl Into<String>) -> Self {
        Self {
            layer,
            name: name.into(),
            previous: None,
        }
    }
}

impl UndoCommand for RenameLayer {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RenameLayer
    }

    fn text(&self) -> &'static str {
        "Rename Layer"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        self.previous = Some(std::mem::replace(&mut node.meta.name, self.name.clone()));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        if let Some(previous) = self.previous.take() {
            node.meta.name = previous;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.layer != other.layer {
            return false;
        }
        self.name = std::mem::take(&mut other.name);
        true
    }
}

/// Change the opacity of a layer. Consecutive changes of the same layer merge.
#[derive(Debug, Clone)]
pub struct SetLayerOpacity {
    layer: LayerId,
    opacity: f32,
    previous: Option<f32>,
}

impl SetLayerOpacity {
    /// Create the command.
    pub fn new(layer: LayerId, opacity: f32) -> Self {
        Self {
            layer,
            opacity,
            previous: None,
        }
    }
}

impl UndoCommand for SetLayerOpacity {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetLayerOpacity
    }

    fn text(&self) -> &'static str {
        "Set Layer Opacity"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        self.previous = Some(node.opacity());
        node.set_opacity(self.opacity);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        if let Some(previous) = self.previous.take() {
            node.set_opacity(previous);
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.layer != other.layer {
            return false;
        }
        self.opacity = other.opacity;
        true
    }
}

/// Show or hide a layer.
#[derive(Debug, Clone)]
pub struct SetLayerVisible {
    layer: LayerId,
    visible: bool,
    previous: Option<bool>,
}

impl SetLayerVisible {
    /// Create the command.
    pub fn new(layer: LayerId, visible: bool) -> Self {
        Self {
            layer,
            visible,
            previous: None,
        }
    }
}

impl UndoCommand for SetLayerVisible {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetLayerVisible
    }

    fn text(&self) -> &'static str {
        if self.visible {
            "Show Layer"
        } else {
            "Hide Layer"
        }
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        self.previous = Some(std::mem::replace(&mut node.visible, self.visible));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let node = require_layer(map, self.layer)?;
        if let Some(previous) = self.previous.take() {
            node.visible = previous;
        }
        Ok(())
    }
}
