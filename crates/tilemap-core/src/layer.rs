//! Layer nodes.
//!
//! A [`LayerNode`] holds the state shared by all layer kinds (persistent id, opacity,
//! visibility, metadata and tree position) plus the kind-specific [`LayerData`]. Nodes live in a
//! [`LayerTree`](crate::LayerTree) arena and are addressed by [`LayerId`].

use crate::meta::Metadata;
use crate::object_layer::ObjectLayer;
use crate::tile_layer::TileLayer;
use serde::{Deserialize, Serialize};

/// Runtime layer identifier, unique within one layer tree and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Layer kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Grid of tiles.
    Tile,
    /// Free-form objects.
    Object,
    /// Container of other layers.
    Group,
}

/// Group layer content: ordered child ids, sorted by local index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupLayer {
    pub(crate) children: Vec<LayerId>,
}

impl GroupLayer {
    /// Child layers in local-index order.
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }
}

/// Kind-specific layer content.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    /// Tile layer.
    Tile(TileLayer),
    /// Object layer.
    Object(ObjectLayer),
    /// Group layer.
    Group(GroupLayer),
}

/// A node of the layer tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub(crate) data: LayerData,
    /// Identifier that survives save and load.
    pub persistent_id: Option<i32>,
    /// Visibility flag.
    pub visible: bool,
    /// Name and properties.
    pub meta: Metadata,
    opacity: f32,
    pub(crate) local_index: usize,
    pub(crate) parent: Option<LayerId>,
}

impl LayerNode {
    fn with_data(data: LayerData) -> Self {
        Self {
            data,
            persistent_id: None,
            visible: true,
            meta: Metadata::default(),
            opacity: 1.0,
            local_index: 0,
            parent: None,
        }
    }

    /// New tile layer node.
    pub fn tile(layer: TileLayer) -> Self {
        Self::with_data(LayerData::Tile(layer))
    }

    /// New object layer node.
    pub fn object(layer: ObjectLayer) -> Self {
        Self::with_data(LayerData::Object(layer))
    }

    /// New empty group node.
    pub fn group() -> Self {
        Self::with_data(LayerData::Group(GroupLayer::default()))
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.name = name.into();
        self
    }

    /// Builder: set the persistent id.
    pub fn with_persistent_id(mut self, id: i32) -> Self {
        self.persistent_id = Some(id);
        self
    }

    /// Kind-specific content.
    pub fn data(&self) -> &LayerData {
        &self.data
    }

    /// Kind tag.
    pub fn kind(&self) -> LayerKind {
        match self.data {
            LayerData::Tile(_) => LayerKind::Tile,
            LayerData::Object(_) => LayerKind::Object,
            LayerData::Group(_) => LayerKind::Group,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Index among siblings.
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Parent group, if any.
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    /// Tile content, if this is a tile layer.
    pub fn as_tile(&self) -> Option<&TileLayer> {
        match &self.data {
            LayerData::Tile(layer) => Some(layer),
            _ => None,
        }
    }

    /// Mutable tile content, if this is a tile layer.
    pub fn as_tile_mut(&mut self) -> Option<&mut TileLayer> {
        match &mut self.data {
            LayerData::Tile(layer) => Some(layer),
            _ => None,
        }
    }

    /// Object content, if this is an object layer.
    pub fn as_object(&self) -> Option<&ObjectLayer> {
        match &self.data {
            LayerData::Object(layer) => Some(layer),
            _ => None,
        }
    }

    /// Mutable object content, if this is an object layer.
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectLayer> {
        match &mut self.data {
            LayerData::Object(layer) => Some(layer),
            _ => None,
        }
    }

    /// Group content, if this is a group layer.
    pub fn as_group(&self) -> Option<&GroupLayer> {
        match &self.data {
            LayerData::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Value copy of this node outside any tree.
    ///
    /// Keeps opacity, visibility, metadata and content. The persistent id, tree position and
    /// (for groups) child list are not copied.
    pub fn clone_detached(&self) -> Self {
        let data = match &self.data {
            LayerData::Group(_) => LayerData::Group(GroupLayer::default()),
            other => other.clone(),
        };
        Self {
            data,
            persistent_id: None,
            visible: self.visible,
            meta: self.meta.clone(),
            opacity: self.opacity,
            local_index: 0,
            parent: None,
        }
    }
}
