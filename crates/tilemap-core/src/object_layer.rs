//! Object layer content: an ordered list of points, rectangles and ellipses.

use crate::meta::Metadata;
use serde::{Deserialize, Serialize};

/// Runtime object identifier, unique within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// 2D vector in map pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Float2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Float2 {
    /// Create a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shape of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Single point; `size` is ignored.
    Point,
    /// Axis-aligned rectangle.
    Rect,
    /// Ellipse inscribed in the rectangle given by `position` and `size`.
    Ellipse,
}

/// Hit radius around point objects, in pixels.
pub const POINT_HIT_RADIUS: f32 = 4.0;

/// A single object.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Runtime identifier.
    pub id: ObjectId,
    /// Identifier that survives save and load.
    pub persistent_id: i32,
    /// Shape.
    pub kind: ObjectKind,
    /// Top-left corner (or the point itself).
    pub position: Float2,
    /// Width and height.
    pub size: Float2,
    /// User tag.
    pub tag: String,
    /// Name and properties.
    pub meta: Metadata,
    /// Visibility flag.
    pub visible: bool,
}

impl Object {
    /// Create a visible object with empty metadata.
    pub fn new(id: ObjectId, persistent_id: i32, kind: ObjectKind) -> Self {
        Self {
            id,
            persistent_id,
            kind,
            position: Float2::default(),
            size: Float2::default(),
            tag: String::new(),
            meta: Metadata::default(),
            visible: true,
        }
    }

    /// Returns `true` if `point` lies on this object.
    pub fn contains_point(&self, point: Float2) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        match self.kind {
            ObjectKind::Point => dx * dx + dy * dy <= POINT_HIT_RADIUS * POINT_HIT_RADIUS,
            ObjectKind::Rect => dx >= 0.0 && dy >= 0.0 && dx <= self.size.x && dy <= self.size.y,
            ObjectKind::Ellipse => {
                let rx = self.size.x / 2.0;
                let ry = self.size.y / 2.0;
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let nx = (dx - rx) / rx;
                let ny = (dy - ry) / ry;
                nx * nx + ny * ny <= 1.0
            }
        }
    }
}

/// Ordered collection of objects. Later objects are drawn on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLayer {
    objects: Vec<Object>,
}

impl ObjectLayer {
    /// Create an empty object layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if there are no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Mutable objects in draw order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.objects.iter_mut()
    }

    /// Append an object on top.
    pub fn add(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Insert an object at `index`, clamped to the object count.
    pub fn insert_at(&mut self, index: usize, object: Object) {
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
    }

    /// Remove an object, returning its former index and value.
    pub fn remove(&mut self, id: ObjectId) -> Option<(usize, Object)> {
        let index = self.index_of(id)?;
        Some((index, self.objects.remove(index)))
    }

    /// Position of an object in draw order.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }

    /// Look up an object.
    pub fn find(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Look up an object mutably.
    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    /// Topmost visible object under `point`.
    pub fn object_at(&self, point: Float2) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|object| object.visible && object.contains_point(point))
            .map(|object| object.id)
    }
}
