//! Detached layer subtrees.
//!
//! [`LayerTree::remove`](crate::LayerTree::remove) hands back a [`LayerSnapshot`] that owns every
//! node of the removed subtree together with its former position. Feeding it to
//! [`LayerTree::restore`](crate::LayerTree::restore) puts back the identical subtree: same ids,
//! same parent, same local index.

use crate::layer::{LayerId, LayerNode};

/// A removed layer subtree and where it used to live.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSnapshot {
    pub(crate) root: LayerId,
    pub(crate) parent: Option<LayerId>,
    pub(crate) local_index: usize,
    /// Subtree nodes in pre-order; the first entry is the root.
    pub(crate) nodes: Vec<(LayerId, LayerNode)>,
}

impl LayerSnapshot {
    /// Id of the subtree root.
    pub fn root(&self) -> LayerId {
        self.root
    }

    /// Former parent of the root.
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    /// Former local index of the root.
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Number of layers in the subtree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a snapshot holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node.
    pub fn root_node(&self) -> &LayerNode {
        &self.nodes[0].1
    }

    /// All nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &LayerNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }
}
