//! Property commands on map, layer and object metadata.

use super::{CommandError, CommandKind, require_meta};
use crate::command_stack::UndoCommand;
use crate::map::{Map, PropertyTarget};
use crate::meta::{Attribute, AttributeType};

fn property_not_found(target: PropertyTarget, name: &str) -> CommandError {
    tracing::warn!(?target, name, "command target property not found");
    CommandError::PropertyNotFound(name.to_string())
}

/// Add a property with the default value of its type.
#[derive(Debug, Clone)]
pub struct AddProperty {
    target: PropertyTarget,
    name: String,
    value_type: AttributeType,
}

impl AddProperty {
    /// Create the command.
    pub fn new(target: PropertyTarget, name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            target,
            name: name.into(),
            value_type,
        }
    }
}

impl UndoCommand for AddProperty {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddProperty
    }

    fn text(&self) -> &'static str {
        "Add Property"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if meta.has_property(&self.name) {
            return Err(CommandError::InvalidArgument(format!(
                "property '{}' already exists",
                self.name
            )));
        }
        meta.set_property(self.name.clone(), Attribute::default_for(self.value_type));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        require_meta(map, self.target)?
            .remove_property(&self.name)
            .ok_or_else(|| property_not_found(self.target, &self.name))?;
        Ok(())
    }
}

/// Remove a property.
#[derive(Debug, Clone)]
pub struct RemoveProperty {
    target: PropertyTarget,
    name: String,
    removed: Option<Attribute>,
}

impl RemoveProperty {
    /// Create the command.
    pub fn new(target: PropertyTarget, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            removed: None,
        }
    }
}

impl UndoCommand for RemoveProperty {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveProperty
    }

    fn text(&self) -> &'static str {
        "Remove Property"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let value = require_meta(map, self.target)?
            .remove_property(&self.name)
            .ok_or_else(|| property_not_found(self.target, &self.name))?;
        self.removed = Some(value);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if let Some(value) = self.removed.take() {
            meta.set_property(self.name.clone(), value);
        }
        Ok(())
    }
}

/// Rename a property, keeping its value.
#[derive(Debug, Clone)]
pub struct RenameProperty {
    target: PropertyTarget,
    old_name: String,
    new_name: String,
}

impl RenameProperty {
    /// Create the command.
    pub fn new(
        target: PropertyTarget,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            target,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    fn rename(&self, map: &mut Map, from: &str, to: &str) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if !meta.has_property(from) {
            return Err(property_not_found(self.target, from));
        }
        if !meta.rename_property(from, to) {
            return Err(CommandError::InvalidArgument(format!(
                "property '{to}' already exists"
            )));
        }
        Ok(())
    }
}

impl UndoCommand for RenameProperty {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RenameProperty
    }

    fn text(&self) -> &'static str {
        "Rename Property"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.rename(map, &self.old_name, &self.new_name)
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.rename(map, &self.new_name, &self.old_name)
    }
}

/// Change the value of a property. Consecutive updates of the same property merge.
#[derive(Debug, Clone)]
pub struct UpdateProperty {
    target: PropertyTarget,
    name: String,
    value: Attribute,
    previous: Option<Attribute>,
}

impl UpdateProperty {
    /// Create the command.
    pub fn new(target: PropertyTarget, name: impl Into<String>, value: Attribute) -> Self {
        Self {
            target,
            name: name.into(),
            value,
            previous: None,
        }
    }
}

impl UndoCommand for UpdateProperty {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateProperty
    }

    fn text(&self) -> &'static str {
        "Update Property"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if !meta.has_property(&self.name) {
            return Err(property_not_found(self.target, &self.name));
        }
        self.previous = meta.set_property(self.name.clone(), self.value.clone());
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if let Some(previous) = self.previous.take() {
            meta.set_property(self.name.clone(), previous);
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.target != other.target || self.name != other.name {
            return false;
        }
        self.value = other.value.clone();
        true
    }
}

/// Change the type of a property, resetting it to the default value of the new type.
#[derive(Debug, Clone)]
pub struct ChangePropertyType {
    target: PropertyTarget,
    name: String,
    value_type: AttributeType,
    previous: Option<Attribute>,
}

impl ChangePropertyType {
    /// Create the command.
    pub fn new(target: PropertyTarget, name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            target,
            name: name.into(),
            value_type,
            previous: None,
        }
    }
}

impl UndoCommand for ChangePropertyType {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::ChangePropertyType
    }

    fn text(&self) -> &'static str {
        "Change Property Type"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if !meta.has_property(&self.name) {
            return Err(property_not_found(self.target, &self.name));
        }
        self.previous =
            meta.set_property(self.name.clone(), Attribute::default_for(self.value_type));
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        let meta = require_meta(map, self.target)?;
        if let Some(previous) = self.previous.take() {
            meta.set_property(self.name.clone(), previous);
        }
        Ok(())
    }
}
