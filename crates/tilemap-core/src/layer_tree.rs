//! Layer Tree
//!
//! Arena that owns every layer of a map and keeps them in a forest of groups.
//!
//! # Overview
//!
//! Each node records its local index (position among its siblings) and its parent. The global
//! index of a node is its position in the pre-order walk of the whole forest and is derived from
//! local indices and descendant counts whenever it is asked for. After every structural change
//! the tree re-sorts:
//!
//! - every child list is ordered by local index
//! - the iteration order is ordered by global index
//!
//! so local indices within a sibling set are always exactly `0..n` and iteration always follows
//! the pre-order walk.
//!
//! Runtime [`LayerId`]s come from a counter that only grows, so an id held by an old command can
//! never name a newer layer. Unknown ids are contract violations and panic; callers that might
//! hold stale ids check with [`LayerTree::contains`] or the `find*` family first.
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{LayerNode, LayerTree};
//!
//! let mut tree = LayerTree::new();
//! let group = tree.insert(None, LayerNode::group(), 0);
//! let inner = tree.insert(Some(group), LayerNode::group(), 0);
//! let top = tree.insert(None, LayerNode::group(), 1);
//!
//! assert_eq!(tree.global_index(group), 0);
//! assert_eq!(tree.global_index(inner), 1);
//! assert_eq!(tree.global_index(top), 2);
//!
//! tree.move_up(top);
//! assert_eq!(tree.global_index(top), 0);
//! assert_eq!(tree.global_index(inner), 2);
//! ```

use crate::ids::IdAllocator;
use crate::layer::{GroupLayer, LayerData, LayerId, LayerKind, LayerNode};
use crate::object_layer::ObjectLayer;
use crate::snapshot::LayerSnapshot;
use crate::tile_layer::TileLayer;
use std::collections::HashMap;

/// Forest of layers.
#[derive(Debug, Clone)]
pub struct LayerTree {
    nodes: HashMap<LayerId, LayerNode>,
    roots: Vec<LayerId>,
    order: Vec<LayerId>,
    next_id: u64,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of layers in the whole forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no layers.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` names a layer in this tree.
    pub fn contains(&self, id: LayerId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Top-level layers in local-index order.
    pub fn top_level(&self) -> &[LayerId] {
        &self.roots
    }

    /// Every layer id in pre-order.
    pub fn ids(&self) -> &[LayerId] {
        &self.order
    }

    /// Every layer in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &LayerNode)> {
        self.order.iter().map(|id| (*id, self.node(*id)))
    }

    /// Every tile layer, in no particular order.
    pub fn tile_layers_mut(&mut self) -> impl Iterator<Item = (LayerId, &mut TileLayer)> {
        self.nodes
            .iter_mut()
            .filter_map(|(id, node)| node.as_tile_mut().map(|layer| (*id, layer)))
    }

    /// Look up a layer.
    pub fn find(&self, id: LayerId) -> Option<&LayerNode> {
        self.nodes.get(&id)
    }

    /// Look up a layer mutably.
    ///
    /// The tree position and group children of the node are owned by the tree and cannot be
    /// changed through the returned reference.
    pub fn find_mut(&mut self, id: LayerId) -> Option<&mut LayerNode> {
        self.nodes.get_mut(&id)
    }

    /// Look up a tile layer.
    pub fn find_tile_layer(&self, id: LayerId) -> Option<&TileLayer> {
        self.find(id).and_then(LayerNode::as_tile)
    }

    /// Look up a tile layer mutably.
    pub fn find_tile_layer_mut(&mut self, id: LayerId) -> Option<&mut TileLayer> {
        self.find_mut(id).and_then(LayerNode::as_tile_mut)
    }

    /// Look up an object layer.
    pub fn find_object_layer(&self, id: LayerId) -> Option<&ObjectLayer> {
        self.find(id).and_then(LayerNode::as_object)
    }

    /// Look up an object layer mutably.
    pub fn find_object_layer_mut(&mut self, id: LayerId) -> Option<&mut ObjectLayer> {
        self.find_mut(id).and_then(LayerNode::as_object_mut)
    }

    /// Look up a group layer.
    pub fn find_group(&self, id: LayerId) -> Option<&GroupLayer> {
        self.find(id).and_then(LayerNode::as_group)
    }

    /// Look up a layer by persistent id.
    pub fn find_by_persistent_id(&self, persistent_id: i32) -> Option<LayerId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.node(*id).persistent_id == Some(persistent_id))
    }

    /// Insert `node` as child `index` of `parent` (or at top level for `None`).
    ///
    /// Later siblings shift down by one. A group node is inserted without children.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is unknown or not a group, or if `index` exceeds the number of
    /// children `parent` already has.
    pub fn insert(&mut self, parent: Option<LayerId>, node: LayerNode, index: usize) -> LayerId {
        let id = self.attach(parent, node, index);
        self.sort_layers();
        tracing::debug!(%id, ?parent, index, "inserted layer");
        id
    }

    /// Detach and destroy a layer and all of its descendants.
    ///
    /// Later siblings shift up by one. The returned snapshot restores the identical subtree.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn remove(&mut self, id: LayerId) -> LayerSnapshot {
        let (parent, local_index) = {
            let node = self.node(id);
            (node.parent, node.local_index)
        };
        let subtree = self.subtree(id);

        let removed = self.siblings_mut(parent).remove(local_index);
        debug_assert_eq!(removed, id);
        self.shift_siblings(parent, local_index, false);

        let nodes: Vec<(LayerId, LayerNode)> = subtree
            .into_iter()
            .filter_map(|layer| self.nodes.remove(&layer).map(|node| (layer, node)))
            .collect();
        self.sort_layers();

        tracing::debug!(%id, ?parent, local_index, count = nodes.len(), "removed layer");
        LayerSnapshot {
            root: id,
            parent,
            local_index,
            nodes,
        }
    }

    /// Put back a subtree previously returned by [`LayerTree::remove`].
    ///
    /// # Panics
    ///
    /// Panics if the former parent no longer exists, if the former local index is now out of
    /// range, or if the root id is already in use.
    pub fn restore(&mut self, snapshot: LayerSnapshot) -> LayerId {
        let LayerSnapshot {
            root,
            parent,
            local_index,
            nodes,
        } = snapshot;

        assert!(!self.contains(root), "{root} is already part of the layer tree");
        let sibling_count = self.siblings(parent).len();
        assert!(
            local_index <= sibling_count,
            "cannot restore {root} at local index {local_index}, parent has {sibling_count} children"
        );

        self.shift_siblings(parent, local_index, true);
        self.siblings_mut(parent).insert(local_index, root);
        for (id, node) in nodes {
            self.next_id = self.next_id.max(id.get() + 1);
            self.nodes.insert(id, node);
        }
        self.sort_layers();

        tracing::debug!(id = %root, ?parent, local_index, "restored layer");
        root
    }

    /// Returns `true` if the layer has a sibling above it.
    pub fn can_move_up(&self, id: LayerId) -> bool {
        self.node(id).local_index > 0
    }

    /// Returns `true` if the layer has a sibling below it.
    pub fn can_move_down(&self, id: LayerId) -> bool {
        self.node(id).local_index < self.sibling_count(id)
    }

    /// Swap the layer with the sibling above it.
    ///
    /// # Panics
    ///
    /// Panics if the layer is unknown or already first among its siblings.
    pub fn move_up(&mut self, id: LayerId) {
        assert!(self.can_move_up(id), "{id} cannot be moved up");
        let above = self.sibling_above(id);
        if let Some(above) = above {
            self.node_mut(above).local_index += 1;
        }
        self.node_mut(id).local_index -= 1;
        self.sort_layers();
        tracing::debug!(%id, "moved layer up");
    }

    /// Swap the layer with the sibling below it.
    ///
    /// # Panics
    ///
    /// Panics if the layer is unknown or already last among its siblings.
    pub fn move_down(&mut self, id: LayerId) {
        assert!(self.can_move_down(id), "{id} cannot be moved down");
        let below = self.sibling_below(id);
        if let Some(below) = below {
            self.node_mut(below).local_index -= 1;
        }
        self.node_mut(id).local_index += 1;
        self.sort_layers();
        tracing::debug!(%id, "moved layer down");
    }

    /// Deep-copy a layer and insert the copy right after it.
    ///
    /// Every copied layer gets a fresh runtime id and persistent id, and every copied object a
    /// fresh runtime id and persistent id. Tiles and metadata are copied by value.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn duplicate(&mut self, id: LayerId, ids: &mut IdAllocator) -> LayerId {
        let (parent, local_index) = {
            let node = self.node(id);
            (node.parent, node.local_index)
        };
        let copy = self.copy_subtree(id, parent, local_index + 1, ids);
        self.sort_layers();
        tracing::debug!(source = %id, %copy, "duplicated layer");
        copy
    }

    /// Index of the layer among its siblings.
    pub fn local_index(&self, id: LayerId) -> usize {
        self.node(id).local_index
    }

    /// Position of the layer in the pre-order walk of the forest.
    pub fn global_index(&self, id: LayerId) -> usize {
        let node = self.node(id);
        let siblings = self.siblings(node.parent);

        let mut index = node.local_index;
        for sibling in &siblings[..node.local_index] {
            index += self.descendant_count(*sibling);
        }

        if let Some(parent) = node.parent {
            index += 1 + self.global_index(parent);
        }
        index
    }

    /// Parent group of the layer.
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.node(id).parent
    }

    /// Children of a group in local-index order; empty for other kinds.
    pub fn children(&self, id: LayerId) -> &[LayerId] {
        match &self.node(id).data {
            LayerData::Group(group) => &group.children,
            _ => &[],
        }
    }

    /// Number of other layers sharing the layer's parent.
    pub fn sibling_count(&self, id: LayerId) -> usize {
        self.siblings(self.node(id).parent).len() - 1
    }

    /// The sibling directly above the layer.
    pub fn sibling_above(&self, id: LayerId) -> Option<LayerId> {
        let node = self.node(id);
        let index = node.local_index.checked_sub(1)?;
        self.siblings(node.parent).get(index).copied()
    }

    /// The sibling directly below the layer.
    pub fn sibling_below(&self, id: LayerId) -> Option<LayerId> {
        let node = self.node(id);
        self.siblings(node.parent)
            .get(node.local_index + 1)
            .copied()
    }

    /// Number of layers nested (at any depth) under the layer.
    pub fn descendant_count(&self, id: LayerId) -> usize {
        match &self.node(id).data {
            LayerData::Group(group) => group
                .children
                .iter()
                .map(|child| 1 + self.descendant_count(*child))
                .sum(),
            _ => 0,
        }
    }

    /// Returns `true` if `id` is nested (at any depth) under `ancestor`.
    pub fn is_descendant(&self, ancestor: LayerId, id: LayerId) -> bool {
        self.subtree(ancestor)
            .into_iter()
            .skip(1)
            .any(|layer| layer == id)
    }

    /// Ids of the layer and all of its descendants in pre-order.
    pub fn subtree(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let LayerData::Group(group) = &self.node(current).data {
                stack.extend(group.children.iter().rev());
            }
        }
        out
    }

    fn node(&self, id: LayerId) -> &LayerNode {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("{id} is not part of the layer tree"))
    }

    fn node_mut(&mut self, id: LayerId) -> &mut LayerNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{id} is not part of the layer tree"))
    }

    fn siblings(&self, parent: Option<LayerId>) -> &[LayerId] {
        match parent {
            None => &self.roots,
            Some(parent) => match &self.node(parent).data {
                LayerData::Group(group) => &group.children,
                _ => panic!("{parent} is not a group layer"),
            },
        }
    }

    fn siblings_mut(&mut self, parent: Option<LayerId>) -> &mut Vec<LayerId> {
        match parent {
            None => &mut self.roots,
            Some(parent) => match &mut self.node_mut(parent).data {
                LayerData::Group(group) => &mut group.children,
                _ => panic!("{parent} is not a group layer"),
            },
        }
    }

    /// Bump the local index of every sibling at or after `from`.
    fn shift_siblings(&mut self, parent: Option<LayerId>, from: usize, up: bool) {
        let shifted: Vec<LayerId> = self.siblings(parent)[from..].to_vec();
        for sibling in shifted {
            let node = self.node_mut(sibling);
            if up {
                node.local_index += 1;
            } else {
                node.local_index -= 1;
            }
        }
    }

    /// Insert without re-sorting.
    fn attach(&mut self, parent: Option<LayerId>, mut node: LayerNode, index: usize) -> LayerId {
        let sibling_count = self.siblings(parent).len();
        assert!(
            index <= sibling_count,
            "local index {index} is out of range, parent has {sibling_count} children"
        );

        let id = LayerId::new(self.next_id);
        self.next_id += 1;

        if let LayerData::Group(group) = &mut node.data {
            group.children.clear();
        }
        node.parent = parent;
        node.local_index = index;

        self.shift_siblings(parent, index, true);
        self.siblings_mut(parent).insert(index, id);
        self.nodes.insert(id, node);
        id
    }

    fn copy_subtree(
        &mut self,
        source: LayerId,
        parent: Option<LayerId>,
        index: usize,
        ids: &mut IdAllocator,
    ) -> LayerId {
        let source_node = self.node(source);
        let children = source_node
            .as_group()
            .map(|group| group.children.clone())
            .unwrap_or_default();

        let mut node = source_node.clone_detached();
        node.persistent_id = Some(ids.next_layer_id());
        if let Some(objects) = node.as_object_mut() {
            for object in objects.iter_mut() {
                object.id = ids.next_runtime_object_id();
                object.persistent_id = ids.next_object_id();
            }
        }

        let copy = self.attach(parent, node, index);
        for (child_index, child) in children.into_iter().enumerate() {
            self.copy_subtree(child, Some(copy), child_index, ids);
        }
        copy
    }

    /// Restore sorted child lists and the pre-order iteration order.
    fn sort_layers(&mut self) {
        let groups: Vec<LayerId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.kind() == LayerKind::Group)
            .map(|(id, _)| *id)
            .collect();

        for group in groups {
            let mut children = match &mut self.node_mut(group).data {
                LayerData::Group(content) => std::mem::take(&mut content.children),
                _ => continue,
            };
            children.sort_by_key(|child| self.node(*child).local_index);
            if let LayerData::Group(content) = &mut self.node_mut(group).data {
                content.children = children;
            }
        }

        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(|root| self.node(*root).local_index);
        self.roots = roots;

        let mut order: Vec<LayerId> = self.nodes.keys().copied().collect();
        order.sort_by_cached_key(|id| self.global_index(*id));
        self.order = order;
    }
}
