//! Metadata attached to maps, layers and objects.
//!
//! Every metadata block has a name, an ordered set of user-defined properties and the
//! components attached to it. Property and component values are typed [`Attribute`]s.

use crate::component::{ComponentId, ComponentValues};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create a color from its channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0, 0, 0, 0xFF)
    }
}

/// Type tag of an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Text.
    Str,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// RGBA color.
    Color,
    /// File path.
    Path,
    /// Reference to an object by persistent id.
    Object,
}

/// Property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Attribute {
    /// Text.
    Str(String),
    /// Signed integer.
    Int(i32),
    /// Floating point number.
    Float(f32),
    /// Boolean.
    Bool(bool),
    /// RGBA color.
    Color(Color),
    /// File path.
    Path(PathBuf),
    /// Reference to an object by persistent id.
    Object(i32),
}

impl Attribute {
    /// Default value of a type.
    pub fn default_for(kind: AttributeType) -> Self {
        match kind {
            AttributeType::Str => Self::Str(String::new()),
            AttributeType::Int => Self::Int(0),
            AttributeType::Float => Self::Float(0.0),
            AttributeType::Bool => Self::Bool(false),
            AttributeType::Color => Self::Color(Color::default()),
            AttributeType::Path => Self::Path(PathBuf::new()),
            AttributeType::Object => Self::Object(0),
        }
    }

    /// Type tag of this value.
    pub fn kind(&self) -> AttributeType {
        match self {
            Self::Str(_) => AttributeType::Str,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::Bool(_) => AttributeType::Bool,
            Self::Color(_) => AttributeType::Color,
            Self::Path(_) => AttributeType::Path,
            Self::Object(_) => AttributeType::Object,
        }
    }

    /// Returns `true` if this is the default value of its type.
    pub fn has_default_value(&self) -> bool {
        *self == Self::default_for(self.kind())
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::Str(String::new())
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i32> for Attribute {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Attribute {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Color> for Attribute {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

/// Name, properties and components of a map, layer or object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Display name.
    pub name: String,
    properties: BTreeMap<String, Attribute>,
    components: BTreeMap<ComponentId, ComponentValues>,
}

impl Metadata {
    /// Create metadata with a name, no properties and no components.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// All properties, ordered by name.
    pub fn properties(&self) -> &BTreeMap<String, Attribute> {
        &self.properties
    }

    /// Look up a property.
    pub fn property(&self, name: &str) -> Option<&Attribute> {
        self.properties.get(name)
    }

    /// Returns `true` if a property called `name` exists.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Insert or overwrite a property, returning the previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: Attribute) -> Option<Attribute> {
        self.properties.insert(name.into(), value)
    }

    /// Remove a property.
    pub fn remove_property(&mut self, name: &str) -> Option<Attribute> {
        self.properties.remove(name)
    }

    /// Rename a property. Fails (returning `false`) if `from` is missing or `to` is taken.
    pub fn rename_property(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.properties.contains_key(from);
        }
        if self.properties.contains_key(to) {
            return false;
        }
        match self.properties.remove(from) {
            Some(value) => {
                self.properties.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Attached components, ordered by id.
    pub fn components(&self) -> &BTreeMap<ComponentId, ComponentValues> {
        &self.components
    }

    /// Values of an attached component.
    pub fn component(&self, id: ComponentId) -> Option<&ComponentValues> {
        self.components.get(&id)
    }

    /// Mutable values of an attached component.
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut ComponentValues> {
        self.components.get_mut(&id)
    }

    /// Returns `true` if component `id` is attached.
    pub fn has_component(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Attach a component with `values`, replacing any values it already had.
    pub fn attach_component(
        &mut self,
        id: ComponentId,
        values: ComponentValues,
    ) -> Option<ComponentValues> {
        self.components.insert(id, values)
    }

    /// Detach a component, returning its values.
    pub fn detach_component(&mut self, id: ComponentId) -> Option<ComponentValues> {
        self.components.remove(&id)
    }
}
