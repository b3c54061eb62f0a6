//! Object commands.

use super::{CommandError, CommandKind, layer_not_found, object_not_found, require_object};
use crate::command_stack::UndoCommand;
use crate::layer::LayerId;
use crate::map::Map;
use crate::object_layer::{Float2, Object, ObjectId, ObjectKind};

/// Add a new object on top of an object layer.
#[derive(Debug, Clone)]
pub struct AddObject {
    layer: LayerId,
    kind: ObjectKind,
    position: Float2,
    size: Float2,
    object: Option<ObjectId>,
    removed: Option<Object>,
}

impl AddObject {
    /// Create the command.
    pub fn new(layer: LayerId, kind: ObjectKind, position: Float2, size: Float2) -> Self {
        Self {
            layer,
            kind,
            position,
            size,
            object: None,
            removed: None,
        }
    }

    /// The created object, once the command has run.
    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }
}

impl UndoCommand for AddObject {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddObject
    }

    fn text(&self) -> &'static str {
        "Add Object"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if map.tree().find_object_layer(self.layer).is_none() {
            return Err(layer_not_found(self.layer));
        }

        let object = match self.removed.take() {
            Some(object) => object,
            None => {
                let ids = map.ids_mut();
                let mut object =
                    Object::new(ids.next_runtime_object_id(), ids.next_object_id(), self.kind);
                object.position = self.position;
                object.size = self.size;
                object
            }
        };
        self.object = Some(object.id);

        if let Some(layer) = map.tree_mut().find_object_layer_mut(self.layer) {
            layer.add(object);
        }
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let Some(id) = self.object else {
            return Ok(());
        };
        let layer = map
            .tree_mut()
            .find_object_layer_mut(self.layer)
            .ok_or_else(|| layer_not_found(self.layer))?;
        let (_, object) = layer
            .remove(id)
            .ok_or_else(|| object_not_found(self.layer, id))?;
        self.removed = Some(object);
        Ok(())
    }
}

/// Remove an object.
#[derive(Debug, Clone)]
pub struct RemoveObject {
    layer: LayerId,
    object: ObjectId,
    removed: Option<(usize, Object)>,
}

impl RemoveObject {
    /// Create the command.
    pub fn new(layer: LayerId, object: ObjectId) -> Self {
        Self {
            layer,
            object,
            removed: None,
        }
    }
}

impl UndoCommand for RemoveObject {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveObject
    }

    fn text(&self) -> &'static str {
        "Remove Object"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = map
            .tree_mut()
            .find_object_layer_mut(self.layer)
            .ok_or_else(|| layer_not_found(self.layer))?;
        let removed = layer
            .remove(self.object)
            .ok_or_else(|| object_not_found(self.layer, self.object))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let layer = map
            .tree_mut()
            .find_object_layer_mut(self.layer)
            .ok_or_else(|| layer_not_found(self.layer))?;
        if let Some((index, object)) = self.removed.take() {
            layer.insert_at(index, object);
        }
        Ok(())
    }
}

/// Move an object. Drags are applied live, so both positions are known up front.
#[derive(Debug, Clone)]
pub struct MoveObject {
    layer: LayerId,
    object: ObjectId,
    previous: Float2,
    updated: Float2,
}

impl MoveObject {
    /// Create the command.
    pub fn new(layer: LayerId, object: ObjectId, previous: Float2, updated: Float2) -> Self {
        Self {
            layer,
            object,
            previous,
            updated,
        }
    }
}

impl UndoCommand for MoveObject {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::MoveObject
    }

    fn text(&self) -> &'static str {
        "Move Object"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        require_object(map, self.layer, self.object)?.position = self.updated;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        require_object(map, self.layer, self.object)?.position = self.previous;
        Ok(())
    }
}

/// Show or hide an object.
#[derive(Debug, Clone)]
pub struct SetObjectVisible {
    layer: LayerId,
    object: ObjectId,
    visible: bool,
    previous: Option<bool>,
}

impl SetObjectVisible {
    /// Create the command.
    pub fn new(layer: LayerId, object: ObjectId, visible: bool) -> Self {
        Self {
            layer,
            object,
            visible,
            previous: None,
        }
    }
}

impl UndoCommand for SetObjectVisible {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectVisible
    }

    fn text(&self) -> &'static str {
        if self.visible {
            "Show Object"
        } else {
            "Hide Object"
        }
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        self.previous = Some(std::mem::replace(&mut object.visible, self.visible));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        if let Some(previous) = self.previous.take() {
            object.visible = previous;
        }
        Ok(())
    }
}

/// Rename an object. Consecutive renames of the same object merge.
#[derive(Debug, Clone)]
pub struct SetObjectName {
    layer: LayerId,
    object: ObjectId,
    name: String,
    previous: Option<String>,
}

impl SetObjectName {
    /// Create the command.
    pub fn new(layer: LayerId, object: ObjectId, name: impl Into<String>) -> Self {
        Self {
            layer,
            object,
            name: name.into(),
            previous: None,
        }
    }
}

impl UndoCommand for SetObjectName {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectName
    }

    fn text(&self) -> &'static str {
        "Rename Object"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        self.previous = Some(std::mem::replace(&mut object.meta.name, self.name.clone()));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        if let Some(previous) = self.previous.take() {
            object.meta.name = previous;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if (self.layer, self.object) != (other.layer, other.object) {
            return false;
        }
        self.name = std::mem::take(&mut other.name);
        true
    }
}

/// Change the tag of an object. Consecutive changes of the same object merge.
#[derive(Debug, Clone)]
pub struct SetObjectTag {
    layer: LayerId,
    object: ObjectId,
    tag: String,
    previous: Option<String>,
}

impl SetObjectTag {
    /// Create the command.
    pub fn new(layer: LayerId, object: ObjectId, tag: impl Into<String>) -> Self {
        Self {
            layer,
            object,
            tag: tag.into(),
            previous: None,
        }
    }
}

impl UndoCommand for SetObjectTag {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectTag
    }

    fn text(&self) -> &'static str {
        "Update Object Tag"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        self.previous = Some(std::mem::replace(&mut object.tag, self.tag.clone()));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let object = require_object(map, self.layer, self.object)?;
        if let Some(previous) = self.previous.take() {
            object.tag = previous;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if (self.layer, self.object) != (other.layer, other.object) {
            return false;
        }
        self.tag = std::mem::take(&mut other.tag);
        true
    }
}
