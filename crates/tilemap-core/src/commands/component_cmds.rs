//! Component commands: definitions, their attributes and attached components.
//!
//! Definition edits reach every attachment (see [`crate::component`]), so their undo data
//! holds the values of every owner they touched.

use super::{CommandError, CommandKind};
use crate::command_stack::UndoCommand;
use crate::component::{AttributeSnapshot, ComponentId, ComponentValues, RemovedComponent};
use crate::map::{Map, PropertyTarget};
use crate::meta::{Attribute, AttributeType};

/// Create an empty component definition.
#[derive(Debug, Clone)]
pub struct DefineComponent {
    name: String,
    component: Option<ComponentId>,
    removed: Option<RemovedComponent>,
}

impl DefineComponent {
    /// Create the command. The id is assigned on first execution.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: None,
            removed: None,
        }
    }

    /// The defined component, once the command has run.
    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }
}

impl UndoCommand for DefineComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::DefineComponent
    }

    fn text(&self) -> &'static str {
        "Define Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(removed) = &self.removed {
            map.restore_component_def(removed.clone())?;
            self.removed = None;
            return Ok(());
        }
        self.component = Some(map.define_component(self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(component) = self.component {
            self.removed = Some(map.remove_component_def(component)?);
        }
        Ok(())
    }
}

/// Remove a component definition and detach it everywhere.
#[derive(Debug, Clone)]
pub struct RemoveComponentDef {
    component: ComponentId,
    removed: Option<RemovedComponent>,
}

impl RemoveComponentDef {
    /// Create the command.
    pub fn new(component: ComponentId) -> Self {
        Self {
            component,
            removed: None,
        }
    }
}

impl UndoCommand for RemoveComponentDef {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveComponentDef
    }

    fn text(&self) -> &'static str {
        "Remove Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.removed = Some(map.remove_component_def(self.component)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(removed) = &self.removed {
            map.restore_component_def(removed.clone())?;
            self.removed = None;
        }
        Ok(())
    }
}

/// Rename a component definition. Consecutive renames of the same definition merge.
#[derive(Debug, Clone)]
pub struct RenameComponent {
    component: ComponentId,
    name: String,
    previous: Option<String>,
}

impl RenameComponent {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
            previous: None,
        }
    }
}

impl UndoCommand for RenameComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RenameComponent
    }

    fn text(&self) -> &'static str {
        "Rename Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.previous = Some(map.rename_component_def(self.component, self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(previous) = &self.previous {
            map.rename_component_def(self.component, previous.clone())?;
            self.previous = None;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.component != other.component {
            return false;
        }
        self.name = std::mem::take(&mut other.name);
        true
    }
}

/// Add an attribute with the default value of its type.
#[derive(Debug, Clone)]
pub struct AddComponentAttribute {
    component: ComponentId,
    name: String,
    value_type: AttributeType,
}

impl AddComponentAttribute {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            component,
            name: name.into(),
            value_type,
        }
    }
}

impl UndoCommand for AddComponentAttribute {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AddComponentAttribute
    }

    fn text(&self) -> &'static str {
        "Add Component Attribute"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.add_component_attribute(
            self.component,
            self.name.clone(),
            Attribute::default_for(self.value_type),
        )?;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.remove_component_attribute(self.component, &self.name)?;
        Ok(())
    }
}

/// Remove an attribute from a definition and every attachment.
#[derive(Debug, Clone)]
pub struct RemoveComponentAttribute {
    component: ComponentId,
    name: String,
    removed: Option<AttributeSnapshot>,
}

impl RemoveComponentAttribute {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
            removed: None,
        }
    }
}

impl UndoCommand for RemoveComponentAttribute {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveComponentAttribute
    }

    fn text(&self) -> &'static str {
        "Remove Component Attribute"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.removed = Some(map.remove_component_attribute(self.component, &self.name)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(removed) = &self.removed {
            map.restore_component_attribute(self.component, &self.name, removed.clone())?;
            self.removed = None;
        }
        Ok(())
    }
}

/// Rename an attribute of a definition and every attachment.
#[derive(Debug, Clone)]
pub struct RenameComponentAttribute {
    component: ComponentId,
    old_name: String,
    new_name: String,
}

impl RenameComponentAttribute {
    /// Create the command.
    pub fn new(
        component: ComponentId,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            component,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl UndoCommand for RenameComponentAttribute {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::RenameComponentAttribute
    }

    fn text(&self) -> &'static str {
        "Rename Component Attribute"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.rename_component_attribute(self.component, &self.old_name, &self.new_name)?;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.rename_component_attribute(self.component, &self.new_name, &self.old_name)?;
        Ok(())
    }
}

/// Copy an attribute under a fresh `"name (n)"` name.
#[derive(Debug, Clone)]
pub struct DuplicateComponentAttribute {
    component: ComponentId,
    name: String,
    copy: Option<String>,
}

impl DuplicateComponentAttribute {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
            copy: None,
        }
    }

    /// Name of the copy, once the command has run.
    pub fn copy(&self) -> Option<&str> {
        self.copy.as_deref()
    }
}

impl UndoCommand for DuplicateComponentAttribute {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::DuplicateComponentAttribute
    }

    fn text(&self) -> &'static str {
        "Duplicate Component Attribute"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.copy = Some(map.duplicate_component_attribute(self.component, &self.name)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(copy) = &self.copy {
            map.remove_component_attribute(self.component, copy)?;
        }
        Ok(())
    }
}

/// Change the type of an attribute, resetting its default and every attached value.
#[derive(Debug, Clone)]
pub struct SetComponentAttributeType {
    component: ComponentId,
    name: String,
    value_type: AttributeType,
    previous: Option<AttributeSnapshot>,
}

impl SetComponentAttributeType {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            component,
            name: name.into(),
            value_type,
            previous: None,
        }
    }
}

impl UndoCommand for SetComponentAttributeType {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetComponentAttributeType
    }

    fn text(&self) -> &'static str {
        "Change Component Attribute Type"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.previous = Some(map.set_component_attribute_type(
            self.component,
            &self.name,
            self.value_type,
        )?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(previous) = &self.previous {
            map.restore_component_attribute(self.component, &self.name, previous.clone())?;
            self.previous = None;
        }
        Ok(())
    }
}

/// Change the default value of an attribute. Consecutive changes of the same attribute merge.
#[derive(Debug, Clone)]
pub struct SetComponentAttributeDefault {
    component: ComponentId,
    name: String,
    value: Attribute,
    previous: Option<Attribute>,
}

impl SetComponentAttributeDefault {
    /// Create the command.
    pub fn new(component: ComponentId, name: impl Into<String>, value: Attribute) -> Self {
        Self {
            component,
            name: name.into(),
            value,
            previous: None,
        }
    }
}

impl UndoCommand for SetComponentAttributeDefault {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::SetComponentAttributeDefault
    }

    fn text(&self) -> &'static str {
        "Update Component Attribute"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.previous = Some(map.set_component_attribute_default(
            self.component,
            &self.name,
            self.value.clone(),
        )?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(previous) = &self.previous {
            map.set_component_attribute_default(self.component, &self.name, previous.clone())?;
            self.previous = None;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.component != other.component || self.name != other.name {
            return false;
        }
        self.value = other.value.clone();
        true
    }
}

/// Attach a component with its default values.
#[derive(Debug, Clone)]
pub struct AttachComponent {
    target: PropertyTarget,
    component: ComponentId,
}

impl AttachComponent {
    /// Create the command.
    pub fn new(target: PropertyTarget, component: ComponentId) -> Self {
        Self { target, component }
    }
}

impl UndoCommand for AttachComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::AttachComponent
    }

    fn text(&self) -> &'static str {
        "Attach Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.attach_component(self.target, self.component)?;
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        map.detach_component(self.target, self.component)?;
        Ok(())
    }
}

/// Detach a component.
#[derive(Debug, Clone)]
pub struct DetachComponent {
    target: PropertyTarget,
    component: ComponentId,
    removed: Option<ComponentValues>,
}

impl DetachComponent {
    /// Create the command.
    pub fn new(target: PropertyTarget, component: ComponentId) -> Self {
        Self {
            target,
            component,
            removed: None,
        }
    }
}

impl UndoCommand for DetachComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::DetachComponent
    }

    fn text(&self) -> &'static str {
        "Detach Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.removed = Some(map.detach_component(self.target, self.component)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(values) = &self.removed {
            map.restore_component(self.target, self.component, values.clone())?;
            self.removed = None;
        }
        Ok(())
    }
}

/// Change one value of an attached component. Consecutive updates of the same value merge.
#[derive(Debug, Clone)]
pub struct UpdateComponent {
    target: PropertyTarget,
    component: ComponentId,
    attribute: String,
    value: Attribute,
    previous: Option<Attribute>,
}

impl UpdateComponent {
    /// Create the command.
    pub fn new(
        target: PropertyTarget,
        component: ComponentId,
        attribute: impl Into<String>,
        value: Attribute,
    ) -> Self {
        Self {
            target,
            component,
            attribute: attribute.into(),
            value,
            previous: None,
        }
    }
}

impl UndoCommand for UpdateComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateComponent
    }

    fn text(&self) -> &'static str {
        "Update Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.previous = Some(map.update_component(
            self.target,
            self.component,
            &self.attribute,
            self.value.clone(),
        )?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(previous) = &self.previous {
            map.update_component(self.target, self.component, &self.attribute, previous.clone())?;
            self.previous = None;
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        if self.target != other.target
            || self.component != other.component
            || self.attribute != other.attribute
        {
            return false;
        }
        self.value = other.value.clone();
        true
    }
}

/// Reset an attached component to the defaults of its definition.
#[derive(Debug, Clone)]
pub struct ResetComponent {
    target: PropertyTarget,
    component: ComponentId,
    previous: Option<ComponentValues>,
}

impl ResetComponent {
    /// Create the command.
    pub fn new(target: PropertyTarget, component: ComponentId) -> Self {
        Self {
            target,
            component,
            previous: None,
        }
    }
}

impl UndoCommand for ResetComponent {
    type Target = Map;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        CommandKind::ResetComponent
    }

    fn text(&self) -> &'static str {
        "Reset Component"
    }

    fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        self.previous = Some(map.reset_component(self.target, self.component)?);
        Ok(())
    }

    fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
        if let Some(previous) = &self.previous {
            map.set_component_values(self.target, self.component, previous.clone())?;
            self.previous = None;
        }
        Ok(())
    }
}
