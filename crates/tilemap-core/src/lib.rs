#![warn(missing_docs)]
//! Tilemap Core - Headless Tile-Map Document Kernel
//!
//! # Overview
//!
//! `tilemap-core` is the document-editing core of a tile-map editor. It keeps the layers of a
//! map, stores their tiles and makes every edit undoable. It does not render anything, read or
//! write map files, or handle input; a host application does that on top of it.
//!
//! # Core Features
//!
//! - **Layer Tree**: tile, object and group layers in a forest, with local and global indices
//! - **Tile Storage**: dense or sparse grids behind one [`TileMatrix`] contract
//! - **Flood Fill**: breadth-first region fill over any [`TileMatrix`]
//! - **Undo/Redo**: bounded [`CommandStack`] with command merging and a clean point
//! - **Strokes**: [`StrokeSession`] turns a live paint drag into one undoable command
//! - **IR**: serde records for layers and maps, for persistence code to build on
//! - **State Tracking**: document version number and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MapDocument (history, viewport, notify)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Commands & CommandStack                    │  ← Undoable edits
//! ├─────────────────────────────────────────────┤
//! │  Map (extent, tilesets, metadata, ids)      │
//! ├─────────────────────────────────────────────┤
//! │  LayerTree (tile / object / group nodes)    │
//! ├─────────────────────────────────────────────┤
//! │  Tile Storage (dense / sparse)              │  ← Tile data
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use tilemap_core::{LayerKind, Map, MapDocument, MatrixExtent, TileMatrix, TilePos};
//!
//! let mut document = MapDocument::new(Map::new(MatrixExtent::new(5, 5)).unwrap());
//! let layer = document.add_layer(LayerKind::Tile, None).unwrap();
//!
//! document.flood_fill(layer, TilePos::new(0, 0), 7).unwrap();
//! let tiles = document.map().tree().find_tile_layer(layer).unwrap();
//! assert_eq!(tiles.tile_at(TilePos::new(4, 4)), Some(7));
//!
//! document.undo().unwrap();
//! let tiles = document.map().tree().find_tile_layer(layer).unwrap();
//! assert_eq!(tiles.tile_at(TilePos::new(4, 4)), Some(0));
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - dense and sparse tile matrices
//! - [`tile_layer`] - tile layers on top of a storage
//! - [`flood_fill`] - region fill
//! - [`object_layer`] - point, rectangle and ellipse objects
//! - [`layer_tree`] - the layer forest
//! - [`command_stack`] - the undo/redo engine
//! - [`commands`] - every undoable map edit
//! - [`component`] - component definitions and attachments
//! - [`map`] - the edited map
//! - [`document`] - history, viewport and notifications around a map
//! - [`stroke`] - live paint drags
//! - [`ir`] - serde records for persistence

pub mod command_stack;
pub mod commands;
pub mod component;
pub mod document;
pub mod flood_fill;
pub mod ids;
pub mod ir;
pub mod layer;
pub mod layer_tree;
pub mod map;
pub mod meta;
pub mod object_layer;
pub mod snapshot;
pub mod storage;
pub mod stroke;
pub mod tile;
pub mod tile_layer;
pub mod tileset;
pub mod viewport;

pub use command_stack::{CommandStack, UndoCommand};
pub use commands::{
    AddColumns, AddComponentAttribute, AddLayer, AddObject, AddProperty, AddRows, AddTileset,
    AttachComponent, ChangePropertyType, Command, CommandError, CommandKind, DefineComponent,
    DetachComponent, DuplicateComponentAttribute, DuplicateLayer, EraserSequence, FixTiles,
    FloodFill, MoveLayerDown, MoveLayerUp, MoveObject, RemoveColumns, RemoveComponentAttribute,
    RemoveComponentDef, RemoveLayer, RemoveObject, RemoveProperty, RemoveRows, RemoveTileset,
    RenameComponent, RenameComponentAttribute, RenameLayer, RenameProperty, ResetComponent,
    ResizeMap, SetComponentAttributeDefault, SetComponentAttributeType, SetLayerOpacity,
    SetLayerVisible, SetObjectName, SetObjectTag, SetObjectVisible, StampSequence,
    UpdateComponent, UpdateProperty,
};
pub use component::{
    AttributeSnapshot, ComponentDef, ComponentError, ComponentId, ComponentIndex, ComponentValues,
    RemovedComponent,
};
pub use document::{
    DocumentChange, DocumentChangeCallback, DocumentChangeKind, DocumentError, MapDocument,
};
pub use flood_fill::flood_fill;
pub use ids::IdAllocator;
pub use ir::{ComponentIr, IrError, LayerContentIr, LayerIr, MapIr, ObjectIr};
pub use layer::{GroupLayer, LayerData, LayerId, LayerKind, LayerNode};
pub use layer_tree::LayerTree;
pub use map::{LayerTileCache, Map, MapError, PropertyTarget, TileSize};
pub use meta::{Attribute, AttributeType, Color, Metadata};
pub use object_layer::{Float2, Object, ObjectId, ObjectKind, ObjectLayer, POINT_HIT_RADIUS};
pub use snapshot::LayerSnapshot;
pub use storage::{DenseTileMatrix, SparseTileMatrix, TileMatrix, TileStorage};
pub use stroke::{StrokeSession, StrokeTool, TilePattern};
pub use tile::{EMPTY_TILE, MatrixExtent, TileCache, TileError, TileId, TilePos};
pub use tile_layer::{TileLayer, TileRegion};
pub use tileset::{TilesetBundle, TilesetId, TilesetRef};
pub use viewport::Viewport;
pub use tilemap_core_settings::TileFormat;
