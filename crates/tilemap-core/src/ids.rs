//! Identifier allocation for persistent layer and object ids.

use crate::object_layer::ObjectId;

/// Hands out fresh identifiers for layers and objects of one map.
///
/// Persistent ids start at 1 and only grow. Loading content that already carries ids should go
/// through [`IdAllocator::observe_layer_id`] and [`IdAllocator::observe_object_id`] so later
/// allocations never collide with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next_layer_id: i32,
    next_object_id: i32,
    next_runtime_object_id: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_layer_id: 1,
            next_object_id: 1,
            next_runtime_object_id: 1,
        }
    }
}

impl IdAllocator {
    /// Create an allocator whose first ids are 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a persistent layer id.
    pub fn next_layer_id(&mut self) -> i32 {
        let id = self.next_layer_id;
        self.next_layer_id += 1;
        id
    }

    /// Allocate a persistent object id.
    pub fn next_object_id(&mut self) -> i32 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    /// Allocate a runtime object id.
    pub fn next_runtime_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_runtime_object_id);
        self.next_runtime_object_id += 1;
        id
    }

    /// Persistent layer id the next allocation returns.
    pub fn peek_layer_id(&self) -> i32 {
        self.next_layer_id
    }

    /// Persistent object id the next allocation returns.
    pub fn peek_object_id(&self) -> i32 {
        self.next_object_id
    }

    /// Make sure future layer ids are greater than `id`.
    pub fn observe_layer_id(&mut self, id: i32) {
        self.next_layer_id = self.next_layer_id.max(id.saturating_add(1));
    }

    /// Make sure future object ids are greater than `id`.
    pub fn observe_object_id(&mut self, id: i32) {
        self.next_object_id = self.next_object_id.max(id.saturating_add(1));
    }
}
