//! Components
//!
//! # Overview
//!
//! A component definition is a named schema of typed attributes, each with a default value.
//! The map, its layers and its objects can carry any number of attached components, each
//! attachment holding its own values for the attributes of its definition.
//!
//! [`ComponentIndex`] owns the definitions of a map. The [`Map`] methods in this module keep
//! attachments in step with their definition:
//!
//! - adding, removing, renaming or retyping an attribute updates every attached copy
//! - removing a definition detaches it everywhere and returns what is needed to put it back
//! - changing a default value only affects later attachments and resets
//!
//! They are plain mutations; undoable versions live in [`crate::commands`].
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{Attribute, Map, MatrixExtent, PropertyTarget};
//!
//! let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
//! let spawn = map.define_component("spawn").unwrap();
//! map.add_component_attribute(spawn, "wave", Attribute::Int(1)).unwrap();
//!
//! map.attach_component(PropertyTarget::Map, spawn).unwrap();
//! map.update_component(PropertyTarget::Map, spawn, "wave", Attribute::Int(3)).unwrap();
//!
//! let values = map.meta.component(spawn).unwrap();
//! assert_eq!(values.get("wave"), Some(&Attribute::Int(3)));
//! ```

use crate::map::{Map, PropertyTarget};
use crate::meta::{Attribute, AttributeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Attribute values of a component, keyed by attribute name.
pub type ComponentValues = BTreeMap<String, Attribute>;

/// Component definition identifier, unique within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Component errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// No definition with this id exists.
    #[error("{0} is not defined")]
    NotDefined(ComponentId),
    /// A definition with this id already exists.
    #[error("{0} is already defined")]
    AlreadyDefined(ComponentId),
    /// Another definition uses the name.
    #[error("component name '{0}' is already taken")]
    NameTaken(String),
    /// The definition has no such attribute.
    #[error("{component} has no attribute '{name}'")]
    AttributeNotFound {
        /// Definition searched.
        component: ComponentId,
        /// Missing attribute.
        name: String,
    },
    /// The definition already has an attribute with this name.
    #[error("{component} already has an attribute '{name}'")]
    AttributeNameTaken {
        /// Definition.
        component: ComponentId,
        /// Conflicting name.
        name: String,
    },
    /// A value does not match the type of its attribute.
    #[error("expected a {expected:?} value, got {actual:?}")]
    TypeMismatch {
        /// Type of the attribute.
        expected: AttributeType,
        /// Type of the value.
        actual: AttributeType,
    },
    /// The map, layer or object does not exist.
    #[error("property owner {0:?} not found")]
    TargetNotFound(PropertyTarget),
    /// The component is not attached to the owner.
    #[error("{component} is not attached to {target:?}")]
    NotAttached {
        /// Owner searched.
        target: PropertyTarget,
        /// Component.
        component: ComponentId,
    },
    /// The component is already attached to the owner.
    #[error("{component} is already attached to {target:?}")]
    AlreadyAttached {
        /// Owner.
        target: PropertyTarget,
        /// Component.
        component: ComponentId,
    },
}

/// A component definition: a name and typed attributes with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Identifier.
    pub id: ComponentId,
    /// Unique display name.
    pub name: String,
    /// Attribute defaults, keyed by attribute name.
    #[serde(default)]
    pub attributes: ComponentValues,
}

impl ComponentDef {
    /// Create a definition without attributes.
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: ComponentValues::new(),
        }
    }

    fn attribute(&self, name: &str) -> Result<&Attribute, ComponentError> {
        self.attributes
            .get(name)
            .ok_or_else(|| ComponentError::AttributeNotFound {
                component: self.id,
                name: name.to_string(),
            })
    }
}

/// Component definitions of a map, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentIndex {
    defs: Vec<ComponentDef>,
    last_id: u32,
}

impl ComponentIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDef> {
        self.defs.iter()
    }

    /// Look up a definition.
    pub fn find(&self, id: ComponentId) -> Option<&ComponentDef> {
        self.defs.iter().find(|def| def.id == id)
    }

    /// Look up a definition by name.
    pub fn find_by_name(&self, name: &str) -> Option<&ComponentDef> {
        self.defs.iter().find(|def| def.name == name)
    }

    /// Returns `true` if a definition uses `name`.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    /// Create an empty definition with a fresh id.
    pub fn define(&mut self, name: impl Into<String>) -> Result<ComponentId, ComponentError> {
        let name = name.into();
        if self.is_name_taken(&name) {
            return Err(ComponentError::NameTaken(name));
        }
        self.last_id += 1;
        let id = ComponentId::new(self.last_id);
        self.defs.push(ComponentDef::new(id, name));
        Ok(id)
    }

    /// Insert an existing definition at `index` (clamped), keeping its id.
    pub fn insert(&mut self, index: usize, def: ComponentDef) -> Result<(), ComponentError> {
        if self.find(def.id).is_some() {
            return Err(ComponentError::AlreadyDefined(def.id));
        }
        if self.is_name_taken(&def.name) {
            return Err(ComponentError::NameTaken(def.name));
        }
        self.last_id = self.last_id.max(def.id.get());
        let index = index.min(self.defs.len());
        self.defs.insert(index, def);
        Ok(())
    }

    /// Remove a definition, returning it with its former index.
    pub fn remove(&mut self, id: ComponentId) -> Option<(usize, ComponentDef)> {
        let index = self.defs.iter().position(|def| def.id == id)?;
        Some((index, self.defs.remove(index)))
    }

    /// Rename a definition, returning the previous name.
    pub fn rename(
        &mut self,
        id: ComponentId,
        name: impl Into<String>,
    ) -> Result<String, ComponentError> {
        let name = name.into();
        if self.find_by_name(&name).is_some_and(|def| def.id != id) {
            return Err(ComponentError::NameTaken(name));
        }
        let def = self.find_mut(id)?;
        Ok(std::mem::replace(&mut def.name, name))
    }

    fn find_mut(&mut self, id: ComponentId) -> Result<&mut ComponentDef, ComponentError> {
        self.defs
            .iter_mut()
            .find(|def| def.id == id)
            .ok_or(ComponentError::NotDefined(id))
    }

    fn get(&self, id: ComponentId) -> Result<&ComponentDef, ComponentError> {
        self.find(id).ok_or(ComponentError::NotDefined(id))
    }
}

/// A removed definition together with every attachment it had.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedComponent {
    /// Former position in definition order.
    pub index: usize,
    /// The definition.
    pub def: ComponentDef,
    /// Values of each owner the component was attached to.
    pub attached: Vec<(PropertyTarget, ComponentValues)>,
}

/// An attribute's default value and its value in every attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSnapshot {
    /// Default value.
    pub default: Attribute,
    /// Value per owner.
    pub values: Vec<(PropertyTarget, Attribute)>,
}

impl Map {
    /// Component definitions.
    pub fn components(&self) -> &ComponentIndex {
        &self.components
    }

    /// Every owner of metadata: the map, then each layer in pre-order with its objects.
    pub fn property_targets(&self) -> Vec<PropertyTarget> {
        let mut targets = vec![PropertyTarget::Map];
        for (id, node) in self.tree().iter() {
            targets.push(PropertyTarget::Layer(id));
            if let Some(objects) = node.as_object() {
                targets.extend(objects.iter().map(|object| PropertyTarget::Object {
                    layer: id,
                    object: object.id,
                }));
            }
        }
        targets
    }

    /// Owners that have component `id` attached.
    pub fn component_owners(&self, id: ComponentId) -> Vec<PropertyTarget> {
        self.property_targets()
            .into_iter()
            .filter(|target| self.meta(*target).is_some_and(|meta| meta.has_component(id)))
            .collect()
    }

    /// Create an empty component definition.
    pub fn define_component(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ComponentId, ComponentError> {
        let id = self.components.define(name)?;
        tracing::debug!(%id, "defined component");
        Ok(id)
    }

    /// Remove a definition and detach it from every owner.
    pub fn remove_component_def(
        &mut self,
        id: ComponentId,
    ) -> Result<RemovedComponent, ComponentError> {
        self.components.get(id)?;
        let mut attached = Vec::new();
        for target in self.component_owners(id) {
            if let Some(meta) = self.meta_mut(target)
                && let Some(values) = meta.detach_component(id)
            {
                attached.push((target, values));
            }
        }
        let (index, def) = self
            .components
            .remove(id)
            .ok_or(ComponentError::NotDefined(id))?;
        tracing::debug!(%id, owners = attached.len(), "removed component definition");
        Ok(RemovedComponent {
            index,
            def,
            attached,
        })
    }

    /// Put back a removed definition and its attachments.
    pub fn restore_component_def(
        &mut self,
        removed: RemovedComponent,
    ) -> Result<(), ComponentError> {
        if let Some((target, _)) = removed
            .attached
            .iter()
            .find(|(target, _)| self.meta(*target).is_none())
        {
            return Err(ComponentError::TargetNotFound(*target));
        }
        let id = removed.def.id;
        self.components.insert(removed.index, removed.def)?;
        for (target, values) in removed.attached {
            if let Some(meta) = self.meta_mut(target) {
                meta.attach_component(id, values);
            }
        }
        Ok(())
    }

    /// Rename a definition, returning the previous name.
    pub fn rename_component_def(
        &mut self,
        id: ComponentId,
        name: impl Into<String>,
    ) -> Result<String, ComponentError> {
        self.components.rename(id, name)
    }

    /// Add an attribute with default `value` to a definition and to every attachment.
    pub fn add_component_attribute(
        &mut self,
        id: ComponentId,
        name: impl Into<String>,
        value: Attribute,
    ) -> Result<(), ComponentError> {
        let name = name.into();
        let def = self.components.find_mut(id)?;
        if def.attributes.contains_key(&name) {
            return Err(ComponentError::AttributeNameTaken {
                component: id,
                name,
            });
        }
        def.attributes.insert(name.clone(), value.clone());
        self.for_each_attachment(id, |values| {
            values.insert(name.clone(), value.clone());
        });
        Ok(())
    }

    /// Remove an attribute from a definition and from every attachment.
    pub fn remove_component_attribute(
        &mut self,
        id: ComponentId,
        name: &str,
    ) -> Result<AttributeSnapshot, ComponentError> {
        let default = self
            .components
            .find_mut(id)?
            .attributes
            .remove(name)
            .ok_or_else(|| ComponentError::AttributeNotFound {
                component: id,
                name: name.to_string(),
            })?;
        let mut values = Vec::new();
        for target in self.component_owners(id) {
            if let Some(value) = self
                .meta_mut(target)
                .and_then(|meta| meta.component_mut(id))
                .and_then(|attached| attached.remove(name))
            {
                values.push((target, value));
            }
        }
        Ok(AttributeSnapshot { default, values })
    }

    /// Write back an attribute captured by [`Map::remove_component_attribute`] or
    /// [`Map::set_component_attribute_type`]. Owners that lost the component are skipped.
    pub fn restore_component_attribute(
        &mut self,
        id: ComponentId,
        name: &str,
        snapshot: AttributeSnapshot,
    ) -> Result<(), ComponentError> {
        self.components
            .find_mut(id)?
            .attributes
            .insert(name.to_string(), snapshot.default);
        for (target, value) in snapshot.values {
            if let Some(attached) = self.meta_mut(target).and_then(|meta| meta.component_mut(id)) {
                attached.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Rename an attribute of a definition and of every attachment.
    pub fn rename_component_attribute(
        &mut self,
        id: ComponentId,
        from: &str,
        to: &str,
    ) -> Result<(), ComponentError> {
        let def = self.components.find_mut(id)?;
        def.attribute(from)?;
        if from == to {
            return Ok(());
        }
        if def.attributes.contains_key(to) {
            return Err(ComponentError::AttributeNameTaken {
                component: id,
                name: to.to_string(),
            });
        }
        if let Some(value) = def.attributes.remove(from) {
            def.attributes.insert(to.to_string(), value);
        }
        self.for_each_attachment(id, |values| {
            if let Some(value) = values.remove(from) {
                values.insert(to.to_string(), value);
            }
        });
        Ok(())
    }

    /// Copy an attribute under the first free name of the form `"name (n)"`. Returns the new
    /// name.
    pub fn duplicate_component_attribute(
        &mut self,
        id: ComponentId,
        name: &str,
    ) -> Result<String, ComponentError> {
        let def = self.components.get(id)?;
        let value = def.attribute(name)?.clone();
        let copy = (1..=def.attributes.len() + 1)
            .map(|suffix| format!("{name} ({suffix})"))
            .find(|candidate| !def.attributes.contains_key(candidate))
            .ok_or_else(|| ComponentError::AttributeNameTaken {
                component: id,
                name: name.to_string(),
            })?;
        self.add_component_attribute(id, copy.clone(), value)?;
        Ok(copy)
    }

    /// Change the type of an attribute. The default and every attached value are reset to the
    /// default of `value_type`. Returns the previous values.
    pub fn set_component_attribute_type(
        &mut self,
        id: ComponentId,
        name: &str,
        value_type: AttributeType,
    ) -> Result<AttributeSnapshot, ComponentError> {
        let reset = Attribute::default_for(value_type);
        let def = self.components.find_mut(id)?;
        let slot = def
            .attributes
            .get_mut(name)
            .ok_or_else(|| ComponentError::AttributeNotFound {
                component: id,
                name: name.to_string(),
            })?;
        let default = std::mem::replace(slot, reset.clone());

        let mut values = Vec::new();
        for target in self.component_owners(id) {
            if let Some(slot) = self
                .meta_mut(target)
                .and_then(|meta| meta.component_mut(id))
                .and_then(|attached| attached.get_mut(name))
            {
                values.push((target, std::mem::replace(slot, reset.clone())));
            }
        }
        Ok(AttributeSnapshot { default, values })
    }

    /// Change the default value of an attribute, returning the previous default. The value must
    /// keep the attribute's type. Existing attachments are not touched.
    pub fn set_component_attribute_default(
        &mut self,
        id: ComponentId,
        name: &str,
        value: Attribute,
    ) -> Result<Attribute, ComponentError> {
        let def = self.components.find_mut(id)?;
        let expected = def.attribute(name)?.kind();
        if value.kind() != expected {
            return Err(ComponentError::TypeMismatch {
                expected,
                actual: value.kind(),
            });
        }
        let previous = def.attributes.insert(name.to_string(), value);
        previous.ok_or_else(|| ComponentError::AttributeNotFound {
            component: id,
            name: name.to_string(),
        })
    }

    /// Attach a component with its default values.
    pub fn attach_component(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
    ) -> Result<(), ComponentError> {
        let defaults = self.components.get(id)?.attributes.clone();
        self.restore_component(target, id, defaults)
    }

    /// Attach a component with the given values.
    pub fn restore_component(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
        values: ComponentValues,
    ) -> Result<(), ComponentError> {
        self.components.get(id)?;
        let meta = self
            .meta_mut(target)
            .ok_or(ComponentError::TargetNotFound(target))?;
        if meta.has_component(id) {
            return Err(ComponentError::AlreadyAttached {
                target,
                component: id,
            });
        }
        meta.attach_component(id, values);
        Ok(())
    }

    /// Detach a component, returning its values.
    pub fn detach_component(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
    ) -> Result<ComponentValues, ComponentError> {
        self.meta_mut(target)
            .ok_or(ComponentError::TargetNotFound(target))?
            .detach_component(id)
            .ok_or(ComponentError::NotAttached {
                target,
                component: id,
            })
    }

    /// Change one attribute of an attached component, returning the previous value. The value
    /// must match the attribute's type.
    pub fn update_component(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
        attribute: &str,
        value: Attribute,
    ) -> Result<Attribute, ComponentError> {
        let expected = self.components.get(id)?.attribute(attribute)?.kind();
        if value.kind() != expected {
            return Err(ComponentError::TypeMismatch {
                expected,
                actual: value.kind(),
            });
        }
        let slot = self
            .attached_values(target, id)?
            .get_mut(attribute)
            .ok_or_else(|| ComponentError::AttributeNotFound {
                component: id,
                name: attribute.to_string(),
            })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Replace every value of an attached component, returning the previous values.
    pub fn set_component_values(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
        values: ComponentValues,
    ) -> Result<ComponentValues, ComponentError> {
        self.components.get(id)?;
        let attached = self.attached_values(target, id)?;
        Ok(std::mem::replace(attached, values))
    }

    /// Reset an attached component to the defaults of its definition, returning the previous
    /// values.
    pub fn reset_component(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
    ) -> Result<ComponentValues, ComponentError> {
        let defaults = self.components.get(id)?.attributes.clone();
        self.set_component_values(target, id, defaults)
    }

    pub(crate) fn components_mut(&mut self) -> &mut ComponentIndex {
        &mut self.components
    }

    fn attached_values(
        &mut self,
        target: PropertyTarget,
        id: ComponentId,
    ) -> Result<&mut ComponentValues, ComponentError> {
        self.meta_mut(target)
            .ok_or(ComponentError::TargetNotFound(target))?
            .component_mut(id)
            .ok_or(ComponentError::NotAttached {
                target,
                component: id,
            })
    }

    fn for_each_attachment(
        &mut self,
        id: ComponentId,
        mut apply: impl FnMut(&mut ComponentValues),
    ) {
        for target in self.component_owners(id) {
            if let Some(values) = self.meta_mut(target).and_then(|meta| meta.component_mut(id)) {
                apply(values);
            }
        }
    }
}
