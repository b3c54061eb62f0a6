//! Tilesets attached to a map.
//!
//! The core only tracks which global tile identifiers a tileset covers. Images and per-tile
//! animation data belong to the host.

use crate::tile::{EMPTY_TILE, TileId};
use serde::{Deserialize, Serialize};

/// Tileset identifier, unique within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilesetId(u32);

impl TilesetId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// A tileset as seen by the map: a contiguous range of global tile identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetRef {
    /// Identifier.
    pub id: TilesetId,
    /// Display name.
    pub name: String,
    /// First global tile identifier.
    pub first_tile: TileId,
    /// Number of tiles.
    pub tile_count: u32,
    /// Number of tile columns in the tileset image.
    pub columns: u32,
    /// Tile width and height in pixels.
    pub tile_size: (u32, u32),
}

impl TilesetRef {
    /// One past the last global tile identifier.
    pub fn end_tile(&self) -> TileId {
        self.first_tile.saturating_add(self.tile_count)
    }

    /// Returns `true` if `tile` belongs to this tileset.
    pub fn contains(&self, tile: TileId) -> bool {
        tile >= self.first_tile && tile < self.end_tile()
    }
}

/// Tilesets attached to a map, in attachment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilesetBundle {
    tilesets: Vec<TilesetRef>,
    active: Option<TilesetId>,
}

impl TilesetBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached tilesets.
    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    /// Returns `true` if no tileset is attached.
    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    /// Attached tilesets in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &TilesetRef> {
        self.tilesets.iter()
    }

    /// An identifier no attached tileset uses.
    pub fn next_id(&self) -> TilesetId {
        let next = self.tilesets.iter().map(|tileset| tileset.id.get()).max().unwrap_or(0) + 1;
        TilesetId::new(next)
    }

    /// First global tile identifier that no attached tileset uses yet.
    pub fn next_first_tile(&self) -> TileId {
        self.tilesets
            .iter()
            .map(TilesetRef::end_tile)
            .max()
            .unwrap_or(EMPTY_TILE + 1)
    }

    /// Attach a tileset at `index` (clamped), making it active if `activate` is set. Returns
    /// `false` if its id is already attached.
    pub fn attach(&mut self, index: usize, tileset: TilesetRef, activate: bool) -> bool {
        if self.find(tileset.id).is_some() {
            return false;
        }
        let index = index.min(self.tilesets.len());
        if activate {
            self.active = Some(tileset.id);
        }
        self.tilesets.insert(index, tileset);
        true
    }

    /// Detach a tileset, returning it with its former index.
    pub fn detach(&mut self, id: TilesetId) -> Option<(usize, TilesetRef)> {
        let index = self.tilesets.iter().position(|tileset| tileset.id == id)?;
        let tileset = self.tilesets.remove(index);
        if self.active == Some(id) {
            self.active = self.tilesets.first().map(|tileset| tileset.id);
        }
        Some((index, tileset))
    }

    /// Look up a tileset.
    pub fn find(&self, id: TilesetId) -> Option<&TilesetRef> {
        self.tilesets.iter().find(|tileset| tileset.id == id)
    }

    /// The tileset that owns `tile`.
    pub fn find_by_tile(&self, tile: TileId) -> Option<&TilesetRef> {
        self.tilesets.iter().find(|tileset| tileset.contains(tile))
    }

    /// Returns `true` if `tile` is empty or belongs to an attached tileset.
    pub fn is_valid_tile(&self, tile: TileId) -> bool {
        tile == EMPTY_TILE || self.find_by_tile(tile).is_some()
    }

    /// The tileset selected in the UI.
    pub fn active(&self) -> Option<TilesetId> {
        self.active
    }

    /// Select a tileset. Returns `false` if it is not attached.
    pub fn select(&mut self, id: TilesetId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Select a tileset, or clear the selection with `None`. Returns `false` if `id` is not
    /// attached, leaving the selection unchanged.
    pub fn set_active(&mut self, id: Option<TilesetId>) -> bool {
        match id {
            Some(id) => self.select(id),
            None => {
                self.active = None;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(id: u32, first_tile: TileId, tile_count: u32) -> TilesetRef {
        TilesetRef {
            id: TilesetId::new(id),
            name: format!("tileset {id}"),
            first_tile,
            tile_count,
            columns: 8,
            tile_size: (32, 32),
        }
    }

    #[test]
    fn test_tile_validity() {
        let mut bundle = TilesetBundle::new();
        assert_eq!(bundle.next_first_tile(), 1);
        bundle.attach(0, tileset(1, 1, 64), true);
        assert_eq!(bundle.next_first_tile(), 65);

        assert!(bundle.is_valid_tile(EMPTY_TILE));
        assert!(bundle.is_valid_tile(1));
        assert!(bundle.is_valid_tile(64));
        assert!(!bundle.is_valid_tile(65));
    }

    #[test]
    fn test_detach_moves_active_selection() {
        let mut bundle = TilesetBundle::new();
        bundle.attach(0, tileset(1, 1, 4), true);
        bundle.attach(1, tileset(2, 5, 4), true);
        assert_eq!(bundle.active(), Some(TilesetId::new(2)));
        assert!(!bundle.attach(0, tileset(2, 9, 1), true));

        let (index, _) = bundle.detach(TilesetId::new(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(bundle.active(), Some(TilesetId::new(1)));
    }

    #[test]
    fn test_attach_without_activation_keeps_selection() {
        let mut bundle = TilesetBundle::new();
        bundle.attach(0, tileset(1, 1, 4), false);
        assert_eq!(bundle.active(), None);

        bundle.attach(1, tileset(2, 5, 4), true);
        bundle.attach(0, tileset(3, 9, 4), false);
        assert_eq!(bundle.active(), Some(TilesetId::new(2)));
        assert_eq!(bundle.iter().next().map(|tileset| tileset.id), Some(TilesetId::new(3)));

        assert!(!bundle.set_active(Some(TilesetId::new(7))));
        assert_eq!(bundle.active(), Some(TilesetId::new(2)));
        assert!(bundle.set_active(None));
        assert_eq!(bundle.active(), None);
    }
}
