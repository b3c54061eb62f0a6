#![warn(missing_docs)]
//! `tilemap-core-settings` - data-driven editor settings for `tilemap-core`.
//!
//! This crate intentionally stays small. It provides plain structs that hosts can load from a
//! YAML preferences file (or build in code) and hand to the document core:
//!
//! - how many commands the undo stack keeps
//! - which tile storage new tile layers use (dense or sparse)
//! - the extent and tile size of new maps
//! - viewport zoom limits
//!
//! Every field has a default, so a partial (or empty) YAML document is valid.
//!
//! ```rust
//! use tilemap_core_settings::{EditorSettings, TileFormat};
//!
//! let settings = EditorSettings::from_yaml_str("command_capacity: 32\ntile_format: sparse\n").unwrap();
//! assert_eq!(settings.command_capacity, 32);
//! assert_eq!(settings.tile_format, TileFormat::Sparse);
//! assert_eq!(settings.map_extent.rows, 5);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default number of commands kept by the undo stack.
pub const DEFAULT_COMMAND_CAPACITY: usize = 100;

#[derive(Debug, Error)]
/// Errors produced while loading or validating settings.
pub enum SettingsError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing (or serialization) failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("invalid setting '{field}': {reason}")]
    /// A value parsed fine but is outside its allowed range.
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Tile storage representation used for new tile layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    /// Row-major array sized to the layer extent.
    #[default]
    Dense,
    /// Position-keyed map holding only non-empty tiles.
    Sparse,
}

/// Number of rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtentSetting {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub cols: usize,
}

impl Default for ExtentSetting {
    fn default() -> Self {
        Self { rows: 5, cols: 5 }
    }
}

/// Size of a single tile, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSizeSetting {
    /// Tile width.
    pub width: u32,
    /// Tile height.
    pub height: u32,
}

impl Default for TileSizeSetting {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
        }
    }
}

/// Viewport zoom configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Smallest allowed zoom factor.
    pub min_zoom: f32,
    /// Largest allowed zoom factor.
    pub max_zoom: f32,
    /// Multiplicative step applied by a single zoom in/out.
    pub zoom_step: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 8.0,
            zoom_step: 1.25,
        }
    }
}

/// Editor settings consumed by `tilemap-core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Maximum number of commands kept on the undo stack.
    pub command_capacity: usize,
    /// Storage representation for new tile layers.
    pub tile_format: TileFormat,
    /// Extent of new maps.
    pub map_extent: ExtentSetting,
    /// Tile size of new maps.
    pub tile_size: TileSizeSetting,
    /// Viewport zoom limits.
    pub viewport: ViewportSettings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            tile_format: TileFormat::default(),
            map_extent: ExtentSetting::default(),
            tile_size: TileSizeSetting::default(),
            viewport: ViewportSettings::default(),
        }
    }
}

impl EditorSettings {
    /// Parse and validate settings from a YAML string.
    pub fn from_yaml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded editor settings");
        Ok(settings)
    }

    /// Serialize the settings as YAML.
    pub fn to_yaml_string(&self) -> Result<String, SettingsError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the settings to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    /// Check value ranges that the YAML schema cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.command_capacity == 0 {
            return Err(SettingsError::Invalid {
                field: "command_capacity",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.map_extent.rows == 0 || self.map_extent.cols == 0 {
            return Err(SettingsError::Invalid {
                field: "map_extent",
                reason: format!(
                    "{}x{} has a zero dimension",
                    self.map_extent.rows, self.map_extent.cols
                ),
            });
        }

        if self.tile_size.width == 0 || self.tile_size.height == 0 {
            return Err(SettingsError::Invalid {
                field: "tile_size",
                reason: "tile dimensions must be positive".to_string(),
            });
        }

        let viewport = &self.viewport;
        if !(viewport.min_zoom > 0.0 && viewport.min_zoom <= viewport.max_zoom) {
            return Err(SettingsError::Invalid {
                field: "viewport",
                reason: format!(
                    "zoom range {}..={} is not a positive ordered range",
                    viewport.min_zoom, viewport.max_zoom
                ),
            });
        }

        if viewport.zoom_step <= 1.0 {
            return Err(SettingsError::Invalid {
                field: "viewport.zoom_step",
                reason: "must be greater than 1".to_string(),
            });
        }

        Ok(())
    }
}
