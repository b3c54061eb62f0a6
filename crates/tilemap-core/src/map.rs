//! The edited map.
//!
//! # Overview
//!
//! [`Map`] aggregates everything a map document edits:
//!
//! - the map extent and tile size, shared by every tile layer
//! - the [`LayerTree`] and the currently active layer
//! - attached tilesets
//! - component definitions
//! - map metadata
//! - the [`IdAllocator`] for persistent layer and object ids
//!
//! Map-level operations keep every tile layer at the map extent. They are plain mutations;
//! undoable versions live in [`crate::commands`].
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{LayerKind, Map, MatrixExtent};
//!
//! let mut map = Map::new(MatrixExtent::new(3, 3)).unwrap();
//! let layer = map.add_layer(LayerKind::Tile, None).unwrap();
//!
//! map.add_row();
//! assert_eq!(map.extent(), MatrixExtent::new(4, 3));
//! assert_eq!(map.tree().find_tile_layer(layer).unwrap().row_count(), 4);
//! ```

use crate::component::ComponentIndex;
use crate::ids::IdAllocator;
use crate::layer::{LayerId, LayerKind, LayerNode};
use crate::layer_tree::LayerTree;
use crate::meta::Metadata;
use crate::object_layer::{Object, ObjectId, ObjectLayer};
use crate::snapshot::LayerSnapshot;
use crate::storage::TileMatrix;
use crate::tile::{EMPTY_TILE, MatrixExtent, TileCache, TileError, TileId, TilePos};
use crate::tile_layer::TileLayer;
use crate::tileset::TilesetBundle;
use std::collections::BTreeMap;
use thiserror::Error;
use tilemap_core_settings::TileFormat;

/// Overwritten tiles of several tile layers.
pub type LayerTileCache = BTreeMap<LayerId, TileCache>;

/// Map errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The extent would have a zero dimension.
    #[error("invalid argument: map extent {0} must have at least one row and one column")]
    InvalidExtent(MatrixExtent),
    /// No layer with this id exists.
    #[error("layer {0} not found")]
    LayerNotFound(LayerId),
    /// The layer exists but has the wrong kind.
    #[error("layer {id} is a {actual:?} layer, expected a {expected:?} layer")]
    WrongLayerKind {
        /// The layer.
        id: LayerId,
        /// Kind required by the operation.
        expected: LayerKind,
        /// Actual kind.
        actual: LayerKind,
    },
    /// A layer cannot be placed at this local index.
    #[error("invalid argument: local index {index} exceeds sibling count {sibling_count}")]
    InvalidLayerIndex {
        /// Requested local index.
        index: usize,
        /// Number of layers already in the sibling set.
        sibling_count: usize,
    },
    /// No object with this id exists in the layer.
    #[error("object {} not found in layer {layer}", .object.get())]
    ObjectNotFound {
        /// Object layer searched.
        layer: LayerId,
        /// Missing object.
        object: ObjectId,
    },
    /// Tile storage rejected an operation.
    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Tile width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
        }
    }
}

/// Owner of a metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyTarget {
    /// The map itself.
    Map,
    /// A layer.
    Layer(LayerId),
    /// An object inside an object layer.
    Object {
        /// Object layer.
        layer: LayerId,
        /// Object.
        object: ObjectId,
    },
}

/// A tile map.
#[derive(Debug, Clone)]
pub struct Map {
    /// Map name and properties.
    pub meta: Metadata,
    extent: MatrixExtent,
    tile_size: TileSize,
    tree: LayerTree,
    tilesets: TilesetBundle,
    ids: IdAllocator,
    active_layer: Option<LayerId>,
    tile_format: TileFormat,
    pub(crate) components: ComponentIndex,
}

impl Map {
    /// Create an empty map using dense tile storage.
    pub fn new(extent: MatrixExtent) -> Result<Self, MapError> {
        Self::with_format(extent, TileFormat::Dense)
    }

    /// Create an empty map whose new tile layers use `format`.
    pub fn with_format(extent: MatrixExtent, format: TileFormat) -> Result<Self, MapError> {
        if !extent.is_valid() {
            return Err(MapError::InvalidExtent(extent));
        }
        Ok(Self {
            meta: Metadata::named("map"),
            extent,
            tile_size: TileSize::default(),
            tree: LayerTree::new(),
            tilesets: TilesetBundle::new(),
            ids: IdAllocator::new(),
            active_layer: None,
            tile_format: format,
            components: ComponentIndex::new(),
        })
    }

    /// Current extent.
    pub fn extent(&self) -> MatrixExtent {
        self.extent
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.extent.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.extent.cols
    }

    /// Tile size in pixels.
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Change the tile size.
    pub fn set_tile_size(&mut self, tile_size: TileSize) {
        self.tile_size = tile_size;
    }

    /// Storage format of new tile layers.
    pub fn tile_format(&self) -> TileFormat {
        self.tile_format
    }

    /// Change the storage format of new tile layers.
    pub fn set_tile_format(&mut self, format: TileFormat) {
        self.tile_format = format;
    }

    /// Layer tree.
    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Mutable layer tree.
    pub fn tree_mut(&mut self) -> &mut LayerTree {
        &mut self.tree
    }

    /// Attached tilesets.
    pub fn tilesets(&self) -> &TilesetBundle {
        &self.tilesets
    }

    /// Mutable attached tilesets.
    pub fn tilesets_mut(&mut self) -> &mut TilesetBundle {
        &mut self.tilesets
    }

    /// Identifier allocator.
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Mutable identifier allocator.
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Layer tree and identifier allocator, borrowed together.
    pub fn tree_and_ids_mut(&mut self) -> (&mut LayerTree, &mut IdAllocator) {
        (&mut self.tree, &mut self.ids)
    }

    /// Append an empty row to every tile layer.
    pub fn add_row(&mut self) {
        for (_, layer) in self.tree.tile_layers_mut() {
            layer.add_row();
        }
        self.extent.rows += 1;
    }

    /// Append an empty column to every tile layer.
    pub fn add_column(&mut self) {
        for (_, layer) in self.tree.tile_layers_mut() {
            layer.add_column();
        }
        self.extent.cols += 1;
    }

    /// Remove the bottom row of every tile layer. Fails if the map has a single row.
    pub fn remove_row(&mut self) -> Result<(), MapError> {
        let extent = MatrixExtent::new(self.extent.rows.saturating_sub(1), self.extent.cols);
        self.resize(extent)
    }

    /// Remove the rightmost column of every tile layer. Fails if the map has a single column.
    pub fn remove_column(&mut self) -> Result<(), MapError> {
        let extent = MatrixExtent::new(self.extent.rows, self.extent.cols.saturating_sub(1));
        self.resize(extent)
    }

    /// Resize every tile layer. Content outside the new extent is discarded.
    pub fn resize(&mut self, extent: MatrixExtent) -> Result<(), MapError> {
        if !extent.is_valid() {
            return Err(MapError::InvalidExtent(extent));
        }
        for (_, layer) in self.tree.tile_layers_mut() {
            layer.resize(extent)?;
        }
        self.extent = extent;
        Ok(())
    }

    /// Tiles of every tile layer that lie outside `extent`.
    pub fn tiles_outside(&self, extent: MatrixExtent) -> LayerTileCache {
        let mut cache = LayerTileCache::new();
        for (id, node) in self.tree.iter() {
            let Some(layer) = node.as_tile() else {
                continue;
            };
            let tiles: TileCache = layer
                .non_empty_tiles()
                .into_iter()
                .filter(|(pos, _)| !extent.contains(*pos))
                .collect();
            if !tiles.is_empty() {
                cache.insert(id, tiles);
            }
        }
        cache
    }

    /// Write cached tiles back. Layers or positions that no longer exist are skipped.
    pub fn restore_tiles(&mut self, cache: &LayerTileCache) {
        for (id, tiles) in cache {
            if let Some(layer) = self.tree.find_tile_layer_mut(*id) {
                let extent = layer.extent();
                for (pos, tile) in tiles.iter().filter(|(pos, _)| extent.contains(**pos)) {
                    let written = layer.set_tile(*pos, *tile);
                    debug_assert!(written.is_ok(), "{pos:?} lies outside {extent}");
                }
            }
        }
    }

    /// Clear every tile that does not belong to an attached tileset.
    ///
    /// Returns the cleared tiles per layer.
    pub fn fix_tiles(&mut self) -> LayerTileCache {
        let mut cache = LayerTileCache::new();
        let tilesets = &self.tilesets;
        for (id, layer) in self.tree.tile_layers_mut() {
            let invalid: TileCache = layer
                .non_empty_tiles()
                .into_iter()
                .filter(|(_, tile)| !tilesets.is_valid_tile(*tile))
                .collect();
            if invalid.is_empty() {
                continue;
            }
            for pos in invalid.keys() {
                let cleared = layer.set_tile(*pos, EMPTY_TILE);
                debug_assert!(cleared.is_ok(), "{pos:?} lies outside the layer");
            }
            cache.insert(id, invalid);
        }
        tracing::debug!(layers = cache.len(), "fixed invalid tiles");
        cache
    }

    /// Build an unattached layer node of `kind` sized to this map, with a fresh persistent id.
    pub fn new_layer_node(&mut self, kind: LayerKind) -> Result<LayerNode, MapError> {
        let node = match kind {
            LayerKind::Tile => LayerNode::tile(TileLayer::new(self.tile_format, self.extent)?),
            LayerKind::Object => LayerNode::object(ObjectLayer::new()),
            LayerKind::Group => LayerNode::group(),
        };
        let persistent_id = self.ids.next_layer_id();
        let name = match kind {
            LayerKind::Tile => format!("Tile Layer {persistent_id}"),
            LayerKind::Object => format!("Object Layer {persistent_id}"),
            LayerKind::Group => format!("Group {persistent_id}"),
        };
        Ok(node.with_name(name).with_persistent_id(persistent_id))
    }

    /// Append a new layer of `kind` as the last child of `parent` (or at top level) and make
    /// it the active layer.
    pub fn add_layer(
        &mut self,
        kind: LayerKind,
        parent: Option<LayerId>,
    ) -> Result<LayerId, MapError> {
        let index = self.child_count(parent)?;
        let node = self.new_layer_node(kind)?;
        let id = self.tree.insert(parent, node, index);
        self.active_layer = Some(id);
        Ok(id)
    }

    /// Remove a layer and its descendants.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<LayerSnapshot, MapError> {
        if !self.tree.contains(id) {
            return Err(MapError::LayerNotFound(id));
        }
        if let Some(active) = self.active_layer
            && (active == id || self.tree.is_descendant(id, active))
        {
            self.active_layer = None;
        }
        Ok(self.tree.remove(id))
    }

    /// Put back a removed layer subtree.
    pub fn restore_layer(&mut self, snapshot: LayerSnapshot) -> Result<LayerId, MapError> {
        self.check_restore(&snapshot)?;
        Ok(self.tree.restore(snapshot))
    }

    /// Check that a removed subtree can be put back at its former position.
    pub fn check_restore(&self, snapshot: &LayerSnapshot) -> Result<(), MapError> {
        let sibling_count = self.child_count(snapshot.parent())?;
        if snapshot.local_index() > sibling_count {
            return Err(MapError::InvalidLayerIndex {
                index: snapshot.local_index(),
                sibling_count,
            });
        }
        Ok(())
    }

    /// Deep-copy a layer next to itself.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Result<LayerId, MapError> {
        if !self.tree.contains(id) {
            return Err(MapError::LayerNotFound(id));
        }
        Ok(self.tree.duplicate(id, &mut self.ids))
    }

    /// Make `id` the active layer. Returns `false` if it does not exist.
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        if self.tree.contains(id) {
            self.active_layer = Some(id);
            true
        } else {
            false
        }
    }

    /// Make `id` the active layer, or clear the selection with `None`. Returns `false` if `id`
    /// does not exist, leaving the selection unchanged.
    pub fn set_active_layer(&mut self, id: Option<LayerId>) -> bool {
        match id {
            Some(id) => self.select_layer(id),
            None => {
                self.active_layer = None;
                true
            }
        }
    }

    /// The active layer, if it still exists.
    pub fn active_layer(&self) -> Option<LayerId> {
        self.active_layer.filter(|id| self.tree.contains(*id))
    }

    /// Tile layer, or an error naming what went wrong.
    pub fn require_tile_layer(&mut self, id: LayerId) -> Result<&mut TileLayer, MapError> {
        let kind = self.layer_kind(id)?;
        self.tree
            .find_tile_layer_mut(id)
            .ok_or(MapError::WrongLayerKind {
                id,
                expected: LayerKind::Tile,
                actual: kind,
            })
    }

    /// Object layer, or an error naming what went wrong.
    pub fn require_object_layer(&mut self, id: LayerId) -> Result<&mut ObjectLayer, MapError> {
        let kind = self.layer_kind(id)?;
        self.tree
            .find_object_layer_mut(id)
            .ok_or(MapError::WrongLayerKind {
                id,
                expected: LayerKind::Object,
                actual: kind,
            })
    }

    /// Object inside an object layer.
    pub fn require_object(
        &mut self,
        layer: LayerId,
        object: ObjectId,
    ) -> Result<&mut Object, MapError> {
        self.require_object_layer(layer)?
            .find_mut(object)
            .ok_or(MapError::ObjectNotFound { layer, object })
    }

    /// Metadata of a map, layer or object.
    pub fn meta(&self, target: PropertyTarget) -> Option<&Metadata> {
        match target {
            PropertyTarget::Map => Some(&self.meta),
            PropertyTarget::Layer(id) => self.tree.find(id).map(|node| &node.meta),
            PropertyTarget::Object { layer, object } => self
                .tree
                .find_object_layer(layer)?
                .find(object)
                .map(|object| &object.meta),
        }
    }

    /// Mutable metadata of a map, layer or object.
    pub fn meta_mut(&mut self, target: PropertyTarget) -> Option<&mut Metadata> {
        match target {
            PropertyTarget::Map => Some(&mut self.meta),
            PropertyTarget::Layer(id) => self.tree.find_mut(id).map(|node| &mut node.meta),
            PropertyTarget::Object { layer, object } => self
                .tree
                .find_object_layer_mut(layer)?
                .find_mut(object)
                .map(|object| &mut object.meta),
        }
    }

    /// Replace a tile of a tile layer.
    pub fn set_tile(&mut self, layer: LayerId, pos: TilePos, tile: TileId) -> Result<(), MapError> {
        self.require_tile_layer(layer)?.set_tile(pos, tile)?;
        Ok(())
    }

    fn layer_kind(&self, id: LayerId) -> Result<LayerKind, MapError> {
        self.tree
            .find(id)
            .map(LayerNode::kind)
            .ok_or(MapError::LayerNotFound(id))
    }

    fn require_group(&self, id: LayerId) -> Result<(), MapError> {
        match self.layer_kind(id)? {
            LayerKind::Group => Ok(()),
            actual => Err(MapError::WrongLayerKind {
                id,
                expected: LayerKind::Group,
                actual,
            }),
        }
    }

    fn child_count(&self, parent: Option<LayerId>) -> Result<usize, MapError> {
        match parent {
            None => Ok(self.tree.top_level().len()),
            Some(parent) => {
                self.require_group(parent)?;
                Ok(self.tree.children(parent).len())
            }
        }
    }
}
