//! Map Commands
//!
//! # Overview
//!
//! Every undoable edit of a [`Map`] is a command struct implementing [`UndoCommand`] with the
//! map as its target. The closed [`Command`] enum wraps all of them so a single
//! [`CommandStack`](crate::CommandStack) can hold any mix.
//!
//! Commands follow the same rules:
//!
//! - `redo` captures whatever `undo` needs at the moment it runs, and `undo` restores it and
//!   forgets it again
//! - structural commands keep removed subtrees as [`LayerSnapshot`](crate::LayerSnapshot)s, so
//!   layer ids stay the same across undo and redo
//! - a command whose layer, object or property no longer exists logs a warning and returns a
//!   [`CommandError`] without touching the map
//!
//! | Group | Commands |
//! |---|---|
//! | map | [`AddRows`], [`AddColumns`], [`RemoveRows`], [`RemoveColumns`], [`ResizeMap`], [`FixTiles`] |
//! | layer | [`AddLayer`], [`RemoveLayer`], [`DuplicateLayer`], [`MoveLayerUp`], [`MoveLayerDown`], [`RenameLayer`], [`SetLayerOpacity`], [`SetLayerVisible`] |
//! | tile | [`StampSequence`], [`EraserSequence`], [`FloodFill`] |
//! | object | [`AddObject`], [`RemoveObject`], [`MoveObject`], [`SetObjectVisible`], [`SetObjectName`], [`SetObjectTag`] |
//! | property | [`AddProperty`], [`RemoveProperty`], [`RenameProperty`], [`UpdateProperty`], [`ChangePropertyType`] |
//! | tileset | [`AddTileset`], [`RemoveTileset`] |
//! | component definition | [`DefineComponent`], [`RemoveComponentDef`], [`RenameComponent`], [`AddComponentAttribute`], [`RemoveComponentAttribute`], [`RenameComponentAttribute`], [`DuplicateComponentAttribute`], [`SetComponentAttributeType`], [`SetComponentAttributeDefault`] |
//! | attached component | [`AttachComponent`], [`DetachComponent`], [`UpdateComponent`], [`ResetComponent`] |
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{AddRows, Command, CommandStack, Map, MatrixExtent};
//!
//! let mut map = Map::new(MatrixExtent::new(5, 5)).unwrap();
//! let mut stack: CommandStack<Command> = CommandStack::new(32);
//!
//! for _ in 0..3 {
//!     stack.push(AddRows::new(1).into(), &mut map).unwrap();
//! }
//! assert_eq!(map.row_count(), 8);
//! assert_eq!(stack.size(), 1);
//!
//! stack.undo(&mut map).unwrap();
//! assert_eq!(map.row_count(), 5);
//! ```

mod component_cmds;
mod layer_cmds;
mod map_cmds;
mod object_cmds;
mod property_cmds;
mod tile_cmds;
mod tileset_cmds;

pub use component_cmds::{
    AddComponentAttribute, AttachComponent, DefineComponent, DetachComponent,
    DuplicateComponentAttribute, RemoveComponentAttribute, RemoveComponentDef, RenameComponent,
    RenameComponentAttribute, ResetComponent, SetComponentAttributeDefault,
    SetComponentAttributeType, UpdateComponent,
};
pub use layer_cmds::{
    AddLayer, DuplicateLayer, MoveLayerDown, MoveLayerUp, RemoveLayer, RenameLayer,
    SetLayerOpacity, SetLayerVisible,
};
pub use map_cmds::{AddColumns, AddRows, FixTiles, RemoveColumns, RemoveRows, ResizeMap};
pub use object_cmds::{
    AddObject, MoveObject, RemoveObject, SetObjectName, SetObjectTag, SetObjectVisible,
};
pub use property_cmds::{
    AddProperty, ChangePropertyType, RemoveProperty, RenameProperty, UpdateProperty,
};
pub use tile_cmds::{EraserSequence, FloodFill, StampSequence};
pub use tileset_cmds::{AddTileset, RemoveTileset};

use crate::command_stack::UndoCommand;
use crate::component::ComponentError;
use crate::layer::{LayerId, LayerNode};
use crate::map::{Map, MapError, PropertyTarget};
use crate::meta::Metadata;
use crate::object_layer::{Object, ObjectId};
use crate::tile::TileError;
use crate::tileset::TilesetId;
use thiserror::Error;

/// Command execution errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The layer the command refers to no longer exists (or has the wrong kind).
    #[error("layer {0} not found")]
    LayerNotFound(LayerId),

    /// The object the command refers to no longer exists.
    #[error("object {} not found in layer {layer}", .object.get())]
    ObjectNotFound {
        /// Object layer searched.
        layer: LayerId,
        /// Missing object.
        object: ObjectId,
    },

    /// The owner of a property no longer exists.
    #[error("property owner {0:?} not found")]
    TargetNotFound(PropertyTarget),

    /// The property does not exist.
    #[error("property '{0}' not found")]
    PropertyNotFound(String),

    /// The tileset no longer exists.
    #[error("tileset {} not found", .0.get())]
    TilesetNotFound(TilesetId),

    /// The command cannot be applied to the current state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Map-level failure.
    #[error(transparent)]
    Map(#[from] MapError),

    /// Tile storage failure.
    #[error(transparent)]
    Tile(#[from] TileError),

    /// Component definition or attachment failure.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

pub(crate) fn layer_not_found(id: LayerId) -> CommandError {
    tracing::warn!(%id, "command target layer not found");
    CommandError::LayerNotFound(id)
}

pub(crate) fn object_not_found(layer: LayerId, object: ObjectId) -> CommandError {
    tracing::warn!(%layer, object = object.get(), "command target object not found");
    CommandError::ObjectNotFound { layer, object }
}

pub(crate) fn require_layer(map: &mut Map, id: LayerId) -> Result<&mut LayerNode, CommandError> {
    map.tree_mut().find_mut(id).ok_or_else(|| layer_not_found(id))
}

pub(crate) fn require_object(
    map: &mut Map,
    layer: LayerId,
    object: ObjectId,
) -> Result<&mut Object, CommandError> {
    map.tree_mut()
        .find_object_layer_mut(layer)
        .ok_or_else(|| layer_not_found(layer))?
        .find_mut(object)
        .ok_or_else(|| object_not_found(layer, object))
}

pub(crate) fn require_meta(
    map: &mut Map,
    target: PropertyTarget,
) -> Result<&mut Metadata, CommandError> {
    map.meta_mut(target).ok_or_else(|| {
        tracing::warn!(?target, "command target property owner not found");
        CommandError::TargetNotFound(target)
    })
}

macro_rules! define_commands {
    ($($(#[$doc:meta])* $variant:ident),* $(,)?) => {
        /// Kind tag of a map command.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CommandKind {
            $($(#[$doc])* $variant,)*
        }

        /// Any undoable map edit.
        #[derive(Debug, Clone)]
        pub enum Command {
            $($(#[$doc])* $variant($variant),)*
        }

        $(
            impl From<$variant> for Command {
                fn from(command: $variant) -> Self {
                    Self::$variant(command)
                }
            }
        )*

        impl UndoCommand for Command {
            type Target = Map;
            type Kind = CommandKind;

            fn kind(&self) -> CommandKind {
                match self {
                    $(Self::$variant(command) => command.kind(),)*
                }
            }

            fn text(&self) -> &'static str {
                match self {
                    $(Self::$variant(command) => command.text(),)*
                }
            }

            fn redo(&mut self, map: &mut Map) -> Result<(), CommandError> {
                match self {
                    $(Self::$variant(command) => command.redo(map),)*
                }
            }

            fn undo(&mut self, map: &mut Map) -> Result<(), CommandError> {
                match self {
                    $(Self::$variant(command) => command.undo(map),)*
                }
            }

            fn merge_with(&mut self, other: &mut Self) -> bool {
                match (self, other) {
                    $((Self::$variant(command), Self::$variant(other)) => command.merge_with(other),)*
                    _ => false,
                }
            }
        }
    };
}

define_commands! {
    /// Append rows.
    AddRows,
    /// Append columns.
    AddColumns,
    /// Remove bottom rows.
    RemoveRows,
    /// Remove rightmost columns.
    RemoveColumns,
    /// Resize the map.
    ResizeMap,
    /// Clear tiles without a tileset.
    FixTiles,
    /// Add a layer.
    AddLayer,
    /// Remove a layer subtree.
    RemoveLayer,
    /// Duplicate a layer subtree.
    DuplicateLayer,
    /// Move a layer before its previous sibling.
    MoveLayerUp,
    /// Move a layer after its next sibling.
    MoveLayerDown,
    /// Rename a layer.
    RenameLayer,
    /// Change layer opacity.
    SetLayerOpacity,
    /// Show or hide a layer.
    SetLayerVisible,
    /// Stamp tool stroke.
    StampSequence,
    /// Eraser tool stroke.
    EraserSequence,
    /// Bucket fill.
    FloodFill,
    /// Add an object.
    AddObject,
    /// Remove an object.
    RemoveObject,
    /// Move an object.
    MoveObject,
    /// Show or hide an object.
    SetObjectVisible,
    /// Rename an object.
    SetObjectName,
    /// Change an object tag.
    SetObjectTag,
    /// Add a property.
    AddProperty,
    /// Remove a property.
    RemoveProperty,
    /// Rename a property.
    RenameProperty,
    /// Change a property value.
    UpdateProperty,
    /// Change a property type.
    ChangePropertyType,
    /// Attach a tileset.
    AddTileset,
    /// Detach a tileset.
    RemoveTileset,
    /// Create a component definition.
    DefineComponent,
    /// Remove a component definition.
    RemoveComponentDef,
    /// Rename a component definition.
    RenameComponent,
    /// Add an attribute to a component definition.
    AddComponentAttribute,
    /// Remove an attribute from a component definition.
    RemoveComponentAttribute,
    /// Rename a component attribute.
    RenameComponentAttribute,
    /// Copy a component attribute.
    DuplicateComponentAttribute,
    /// Change the type of a component attribute.
    SetComponentAttributeType,
    /// Change the default value of a component attribute.
    SetComponentAttributeDefault,
    /// Attach a component.
    AttachComponent,
    /// Detach a component.
    DetachComponent,
    /// Change a value of an attached component.
    UpdateComponent,
    /// Reset an attached component to its defaults.
    ResetComponent,
}
