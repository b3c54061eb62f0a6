//! Intermediate Representation
//!
//! # Overview
//!
//! Plain serde records for layers, objects and whole maps. Persistence code picks a serde format
//! and converts between it and the live model:
//!
//! - [`LayerTree::to_ir`] / [`LayerTree::build_from_ir`] for one layer subtree
//! - [`Map::to_ir`] / [`Map::from_ir`] for a whole map
//!
//! Attached components are stored with their owner and definitions with the map. A map IR that
//! attaches an undefined component is rejected.
//!
//! Runtime ids never appear in the IR. Persistent layer and object ids do, and building from
//! IR reports them to the [`IdAllocator`] so later allocations cannot collide with them.
//!
//! IR is validated in full before anything is built, so a rejected IR leaves the tree untouched.
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{IdAllocator, LayerKind, LayerTree, Map, MatrixExtent};
//! use tilemap_core_settings::TileFormat;
//!
//! let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
//! let layer = map.add_layer(LayerKind::Tile, None).unwrap();
//! let ir = map.tree().to_ir(layer);
//!
//! let mut tree = LayerTree::new();
//! let mut ids = IdAllocator::new();
//! let copy = tree.build_from_ir(None, 0, &ir, &mut ids, TileFormat::Sparse).unwrap();
//! assert_eq!(tree.find(copy).unwrap().name(), "Tile Layer 1");
//! assert_eq!(ids.peek_layer_id(), 2);
//! ```

use crate::component::{ComponentDef, ComponentError, ComponentId, ComponentValues};
use crate::ids::IdAllocator;
use crate::layer::{LayerData, LayerId, LayerKind, LayerNode};
use crate::layer_tree::LayerTree;
use crate::map::{Map, MapError, TileSize};
use crate::meta::{Attribute, Metadata};
use crate::object_layer::{Float2, Object, ObjectKind, ObjectLayer};
use crate::storage::{TileMatrix, TileStorage};
use crate::tile::{EMPTY_TILE, MatrixExtent, TileError, TileId};
use crate::tile_layer::TileLayer;
use crate::tileset::{TilesetId, TilesetRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tilemap_core_settings::TileFormat;

/// Errors raised while building from IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// A tile layer or map has a zero dimension.
    #[error("invalid extent {0}")]
    InvalidExtent(MatrixExtent),

    /// The tile list of a tile layer does not match its extent.
    #[error("tile layer '{layer}' has {actual} tiles, expected {expected}")]
    TileCountMismatch {
        /// Layer name.
        layer: String,
        /// `rows * cols`.
        expected: usize,
        /// Length of the tile list.
        actual: usize,
    },

    /// A tile layer of a map does not match the map extent.
    #[error("tile layer '{layer}' is {actual}, map is {expected}")]
    ExtentMismatch {
        /// Layer name.
        layer: String,
        /// Map extent.
        expected: MatrixExtent,
        /// Layer extent.
        actual: MatrixExtent,
    },

    /// Two tilesets share an id.
    #[error("duplicate tileset id {}", .0.get())]
    DuplicateTileset(TilesetId),

    /// A layer, object or the map attaches a component the map does not define.
    #[error("{0} is attached but not defined")]
    UnknownComponent(ComponentId),

    /// Tile storage rejected the data.
    #[error(transparent)]
    Tile(#[from] TileError),

    /// Component definitions are inconsistent.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Map construction failed.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// A component attached to a layer, object or map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentIr {
    /// Definition.
    pub component: ComponentId,
    /// Attribute values.
    #[serde(default)]
    pub values: ComponentValues,
}

/// Kind-specific content of a layer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContentIr {
    /// Tile grid, row-major, `rows * cols` entries.
    Tile {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
        /// Tile ids, [`EMPTY_TILE`] for empty cells.
        tiles: Vec<TileId>,
    },
    /// Objects in drawing order.
    Object {
        /// Objects.
        objects: Vec<ObjectIr>,
    },
    /// Child layers in local-index order.
    Group {
        /// Children.
        layers: Vec<LayerIr>,
    },
}

/// A layer and everything nested in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerIr {
    /// Display name.
    pub name: String,
    /// Persistent id, if the layer has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<i32>,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Visibility flag.
    pub visible: bool,
    /// Custom properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Attribute>,
    /// Attached components.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentIr>,
    /// Content.
    pub content: LayerContentIr,
}

impl LayerIr {
    /// Kind of the described layer.
    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContentIr::Tile { .. } => LayerKind::Tile,
            LayerContentIr::Object { .. } => LayerKind::Object,
            LayerContentIr::Group { .. } => LayerKind::Group,
        }
    }

    /// Check tile data of this layer and all nested layers.
    pub fn validate(&self) -> Result<(), IrError> {
        match &self.content {
            LayerContentIr::Tile { rows, cols, tiles } => {
                let extent = MatrixExtent::new(*rows, *cols);
                if !extent.is_valid() {
                    return Err(IrError::InvalidExtent(extent));
                }
                if tiles.len() != extent.area() {
                    return Err(IrError::TileCountMismatch {
                        layer: self.name.clone(),
                        expected: extent.area(),
                        actual: tiles.len(),
                    });
                }
                Ok(())
            }
            LayerContentIr::Object { .. } => Ok(()),
            LayerContentIr::Group { layers } => layers.iter().try_for_each(LayerIr::validate),
        }
    }

    fn check_extent(&self, expected: MatrixExtent) -> Result<(), IrError> {
        match &self.content {
            LayerContentIr::Tile { rows, cols, .. } => {
                let actual = MatrixExtent::new(*rows, *cols);
                if actual != expected {
                    return Err(IrError::ExtentMismatch {
                        layer: self.name.clone(),
                        expected,
                        actual,
                    });
                }
                Ok(())
            }
            LayerContentIr::Object { .. } => Ok(()),
            LayerContentIr::Group { layers } => {
                layers.iter().try_for_each(|layer| layer.check_extent(expected))
            }
        }
    }

    /// Every component attached in this subtree.
    fn attached_components(&self) -> Box<dyn Iterator<Item = ComponentId> + '_> {
        let own = self.components.iter().map(|attached| attached.component);
        match &self.content {
            LayerContentIr::Tile { .. } => Box::new(own),
            LayerContentIr::Object { objects } => Box::new(own.chain(
                objects
                    .iter()
                    .flat_map(|object| object.components.iter().map(|attached| attached.component)),
            )),
            LayerContentIr::Group { layers } => {
                Box::new(own.chain(layers.iter().flat_map(LayerIr::attached_components)))
            }
        }
    }
}

/// An object record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectIr {
    /// Persistent id.
    pub persistent_id: i32,
    /// Shape.
    pub kind: ObjectKind,
    /// Position.
    pub position: Float2,
    /// Size.
    pub size: Float2,
    /// Display name.
    pub name: String,
    /// User tag.
    #[serde(default)]
    pub tag: String,
    /// Visibility flag.
    pub visible: bool,
    /// Custom properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Attribute>,
    /// Attached components.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentIr>,
}

/// A whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapIr {
    /// Map name.
    pub name: String,
    /// Map properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Attribute>,
    /// Components attached to the map itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentIr>,
    /// Component definitions in definition order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_defs: Vec<ComponentDef>,
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub cols: usize,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Attached tilesets in attachment order.
    #[serde(default)]
    pub tilesets: Vec<TilesetRef>,
    /// Selected tileset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tileset: Option<TilesetId>,
    /// Top-level layers in local-index order.
    #[serde(default)]
    pub layers: Vec<LayerIr>,
    /// Next persistent layer id.
    pub next_layer_id: i32,
    /// Next persistent object id.
    pub next_object_id: i32,
}

fn meta_from_ir(
    name: &str,
    properties: &BTreeMap<String, Attribute>,
    components: &[ComponentIr],
) -> Metadata {
    let mut meta = Metadata::named(name);
    for (key, value) in properties {
        meta.set_property(key.clone(), value.clone());
    }
    for attached in components {
        meta.attach_component(attached.component, attached.values.clone());
    }
    meta
}

fn components_to_ir(meta: &Metadata) -> Vec<ComponentIr> {
    meta.components()
        .iter()
        .map(|(component, values)| ComponentIr {
            component: *component,
            values: values.clone(),
        })
        .collect()
}

fn object_to_ir(object: &Object) -> ObjectIr {
    ObjectIr {
        persistent_id: object.persistent_id,
        kind: object.kind,
        position: object.position,
        size: object.size,
        name: object.meta.name.clone(),
        tag: object.tag.clone(),
        visible: object.visible,
        properties: object.meta.properties().clone(),
        components: components_to_ir(&object.meta),
    }
}

fn object_from_ir(ir: &ObjectIr, ids: &mut IdAllocator) -> Object {
    ids.observe_object_id(ir.persistent_id);
    let mut object = Object::new(ids.next_runtime_object_id(), ir.persistent_id, ir.kind);
    object.position = ir.position;
    object.size = ir.size;
    object.tag = ir.tag.clone();
    object.visible = ir.visible;
    object.meta = meta_from_ir(&ir.name, &ir.properties, &ir.components);
    object
}

/// Build an unattached node from a validated record.
fn node_from_ir(ir: &LayerIr, ids: &mut IdAllocator, format: TileFormat) -> Result<LayerNode, IrError> {
    let mut node = match &ir.content {
        LayerContentIr::Tile { rows, cols, tiles } => {
            let extent = MatrixExtent::new(*rows, *cols);
            let mut storage = TileStorage::new(format, extent)?;
            for (pos, tile) in extent.positions().zip(tiles.iter().copied()) {
                if tile != EMPTY_TILE {
                    storage.set_tile(pos, tile)?;
                }
            }
            LayerNode::tile(TileLayer::from_storage(storage))
        }
        LayerContentIr::Object { objects } => {
            let mut layer = ObjectLayer::new();
            for object in objects {
                layer.add(object_from_ir(object, ids));
            }
            LayerNode::object(layer)
        }
        LayerContentIr::Group { .. } => LayerNode::group(),
    };

    if let Some(persistent_id) = ir.persistent_id {
        ids.observe_layer_id(persistent_id);
        node = node.with_persistent_id(persistent_id);
    }
    node.visible = ir.visible;
    node.set_opacity(ir.opacity);
    node.meta = meta_from_ir(&ir.name, &ir.properties, &ir.components);
    Ok(node)
}

impl LayerTree {
    /// Copy a layer subtree into IR.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn to_ir(&self, id: LayerId) -> LayerIr {
        let node = self
            .find(id)
            .unwrap_or_else(|| panic!("{id} is not part of the layer tree"));
        let content = match node.data() {
            LayerData::Tile(layer) => {
                let extent = layer.extent();
                LayerContentIr::Tile {
                    rows: extent.rows,
                    cols: extent.cols,
                    tiles: extent
                        .positions()
                        .map(|pos| layer.tile_at(pos).unwrap_or(EMPTY_TILE))
                        .collect(),
                }
            }
            LayerData::Object(layer) => LayerContentIr::Object {
                objects: layer.iter().map(object_to_ir).collect(),
            },
            LayerData::Group(group) => LayerContentIr::Group {
                layers: group.children().iter().map(|child| self.to_ir(*child)).collect(),
            },
        };

        LayerIr {
            name: node.name().to_string(),
            persistent_id: node.persistent_id,
            opacity: node.opacity(),
            visible: node.visible,
            properties: node.meta.properties().clone(),
            components: components_to_ir(&node.meta),
            content,
        }
    }

    /// Build a layer subtree from IR and insert it as child `index` of `parent`.
    ///
    /// Tile layers use `format` regardless of how they were stored before. Persistent ids are
    /// kept and reported to `ids`; objects get fresh runtime ids.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`LayerTree::insert`].
    pub fn build_from_ir(
        &mut self,
        parent: Option<LayerId>,
        index: usize,
        ir: &LayerIr,
        ids: &mut IdAllocator,
        format: TileFormat,
    ) -> Result<LayerId, IrError> {
        ir.validate()?;
        let id = self.build_validated(parent, index, ir, ids, format)?;
        tracing::debug!(%id, layers = self.descendant_count(id) + 1, "built layer from IR");
        Ok(id)
    }

    fn build_validated(
        &mut self,
        parent: Option<LayerId>,
        index: usize,
        ir: &LayerIr,
        ids: &mut IdAllocator,
        format: TileFormat,
    ) -> Result<LayerId, IrError> {
        let node = node_from_ir(ir, ids, format)?;
        let id = self.insert(parent, node, index);
        if let LayerContentIr::Group { layers } = &ir.content {
            for (child_index, child) in layers.iter().enumerate() {
                self.build_validated(Some(id), child_index, child, ids, format)?;
            }
        }
        Ok(id)
    }
}

impl Map {
    /// Copy the whole map into IR.
    pub fn to_ir(&self) -> MapIr {
        let extent = self.extent();
        let tile_size = self.tile_size();
        MapIr {
            name: self.meta.name.clone(),
            properties: self.meta.properties().clone(),
            components: components_to_ir(&self.meta),
            component_defs: self.components().iter().cloned().collect(),
            rows: extent.rows,
            cols: extent.cols,
            tile_width: tile_size.width,
            tile_height: tile_size.height,
            tilesets: self.tilesets().iter().cloned().collect(),
            active_tileset: self.tilesets().active(),
            layers: self
                .tree()
                .top_level()
                .iter()
                .map(|id| self.tree().to_ir(*id))
                .collect(),
            next_layer_id: self.ids().peek_layer_id(),
            next_object_id: self.ids().peek_object_id(),
        }
    }

    /// Build a map from IR. New tile layers use `format`.
    pub fn from_ir(ir: &MapIr, format: TileFormat) -> Result<Self, IrError> {
        let extent = MatrixExtent::new(ir.rows, ir.cols);
        if !extent.is_valid() {
            return Err(IrError::InvalidExtent(extent));
        }
        for layer in &ir.layers {
            layer.validate()?;
            layer.check_extent(extent)?;
        }
        let defined = |id: &ComponentId| ir.component_defs.iter().any(|def| def.id == *id);
        if let Some(unknown) = ir
            .components
            .iter()
            .map(|attached| attached.component)
            .chain(ir.layers.iter().flat_map(LayerIr::attached_components))
            .find(|id| !defined(id))
        {
            return Err(IrError::UnknownComponent(unknown));
        }

        let mut map = Map::with_format(extent, format)?;
        for def in &ir.component_defs {
            let components = map.components_mut();
            let index = components.len();
            components.insert(index, def.clone())?;
        }
        map.meta = meta_from_ir(&ir.name, &ir.properties, &ir.components);
        map.set_tile_size(TileSize {
            width: ir.tile_width,
            height: ir.tile_height,
        });

        let tilesets = map.tilesets_mut();
        for tileset in &ir.tilesets {
            let index = tilesets.len();
            if !tilesets.attach(index, tileset.clone(), false) {
                return Err(IrError::DuplicateTileset(tileset.id));
            }
        }
        if let Some(active) = ir.active_tileset {
            tilesets.select(active);
        }

        let (tree, ids) = map.tree_and_ids_mut();
        ids.observe_layer_id(ir.next_layer_id.saturating_sub(1));
        ids.observe_object_id(ir.next_object_id.saturating_sub(1));
        for (index, layer) in ir.layers.iter().enumerate() {
            tree.build_validated(None, index, layer, ids, format)?;
        }

        tracing::debug!(layers = map.tree().len(), %extent, "built map from IR");
        Ok(map)
    }
}
