//! Viewport state: pan offset and zoom of the map view.

use crate::map::TileSize;
use crate::object_layer::Float2;
use crate::tile::TilePos;
use tilemap_core_settings::ViewportSettings;

/// Visible part of a map.
///
/// `offset` is the screen position of the map origin, in screen pixels. Screen coordinates map
/// to map pixels as `(screen - offset) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the map origin.
    pub offset: Float2,
    /// Tile size in map pixels.
    pub tile_size: TileSize,
    zoom: f32,
    limits: ViewportSettings,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(TileSize::default(), ViewportSettings::default())
    }
}

impl Viewport {
    /// Create an unpanned viewport at zoom 1 (clamped to `limits`).
    pub fn new(tile_size: TileSize, limits: ViewportSettings) -> Self {
        Self {
            offset: Float2::default(),
            tile_size,
            zoom: 1.0_f32.clamp(limits.min_zoom, limits.max_zoom),
            limits,
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom limits.
    pub fn limits(&self) -> ViewportSettings {
        self.limits
    }

    /// Set the zoom factor, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(self.limits.min_zoom, self.limits.max_zoom);
    }

    /// Move the view by `delta` screen pixels.
    pub fn pan(&mut self, delta: Float2) {
        self.offset.x += delta.x;
        self.offset.y += delta.y;
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.limits.zoom_step);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.limits.zoom_step);
    }

    /// Back to zoom 1 with no offset.
    pub fn reset(&mut self) {
        self.offset = Float2::default();
        self.set_zoom(1.0);
    }

    /// Map pixel position under a screen point.
    pub fn screen_to_map(&self, point: Float2) -> Float2 {
        Float2::new(
            (point.x - self.offset.x) / self.zoom,
            (point.y - self.offset.y) / self.zoom,
        )
    }

    /// Tile under a screen point.
    ///
    /// Returns `None` left of or above the map origin. Callers check the map extent.
    pub fn tile_at_screen(&self, point: Float2) -> Option<TilePos> {
        if self.tile_size.width == 0 || self.tile_size.height == 0 {
            return None;
        }
        let map = self.screen_to_map(point);
        let col = (map.x / self.tile_size.width as f32).floor();
        let row = (map.y / self.tile_size.height as f32).floor();
        if !(row >= 0.0 && col >= 0.0 && row <= i32::MAX as f32 && col <= i32::MAX as f32) {
            return None;
        }
        Some(TilePos::new(row as i32, col as i32))
    }
}
