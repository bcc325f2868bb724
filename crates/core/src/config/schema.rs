//! Configuration schema definitions
//!
//! Presentation settings are serde-defaulted so a partial TOML file (or none at
//! all) yields the stock widget look.

use serde::{Deserialize, Serialize};

/// Root widget configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PickerConfig {
    /// Map provider API key; empty means the widget cannot start
    #[serde(default)]
    pub api_key: String,

    /// Tolerance radius in meters, 0 = unconstrained
    #[serde(default)]
    pub radius: u32,

    /// Map, overlay and banner presentation
    #[serde(default)]
    pub view: ViewSettings,
}

impl PickerConfig {
    /// Radius as the floating-point meters the fence math works in
    pub fn radius_meters(&self) -> f64 {
        f64::from(self.radius)
    }

    /// Returns true when positions are validated against a fence
    pub fn is_constrained(&self) -> bool {
        self.radius > 0
    }
}

/// Presentation settings handed to the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewSettings {
    #[serde(default)]
    pub map: MapSettings,

    #[serde(default)]
    pub circle: CircleStyle,

    #[serde(default)]
    pub banner: BannerSettings,

    #[serde(default)]
    pub messages: Messages,
}

/// Base map and tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// Zoom level used at startup and after recenter
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Map type id the tile layer is registered under
    #[serde(default = "default_map_type_id")]
    pub map_type_id: String,

    /// Display name of the tile layer
    #[serde(default = "default_tile_name")]
    pub tile_name: String,

    /// Tile URL with `{z}`, `{x}` and `{y}` placeholders
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile edge in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Highest zoom the tile layer serves
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            map_type_id: default_map_type_id(),
            tile_name: default_tile_name(),
            tile_url: default_tile_url(),
            tile_size: default_tile_size(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl MapSettings {
    /// Expand the tile URL template for one tile
    pub fn tile_url_for(&self, zoom: u8, x: u32, y: u32) -> String {
        self.tile_url
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

fn default_zoom() -> u8 {
    14
}

fn default_map_type_id() -> String {
    "OSM".to_string()
}

fn default_tile_name() -> String {
    "OpenStreetMap".to_string()
}

fn default_tile_url() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_tile_size() -> u32 {
    256
}

fn default_max_zoom() -> u8 {
    18
}

/// Fill and stroke of the tolerance circle overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleStyle {
    /// CSS color of the circle interior
    #[serde(default = "default_fill_color")]
    pub fill_color: String,

    /// Interior opacity, 0 to 1
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f32,

    /// CSS color of the circle outline
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    /// Outline width in pixels
    #[serde(default = "default_stroke_weight")]
    pub stroke_weight: u32,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            fill_opacity: default_fill_opacity(),
            stroke_color: default_stroke_color(),
            stroke_weight: default_stroke_weight(),
        }
    }
}

fn default_fill_color() -> String {
    "#2f7debb8".to_string()
}

fn default_fill_opacity() -> f32 {
    0.7
}

fn default_stroke_color() -> String {
    "#EDEFF3".to_string()
}

fn default_stroke_weight() -> u32 {
    2
}

/// Snackbar behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerSettings {
    /// Milliseconds before a notice hides itself
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u32,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            auto_hide_ms: default_auto_hide_ms(),
        }
    }
}

fn default_auto_hide_ms() -> u32 {
    3000
}

/// User-visible banner texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Messages {
    /// Warning shown when the marker leaves the circle
    #[serde(default = "default_out_of_range")]
    pub out_of_range: String,

    /// Error shown when the widget has no API key
    #[serde(default = "default_missing_api_key")]
    pub missing_api_key: String,

    /// Error shown when geolocation is unavailable
    #[serde(default = "default_unsupported")]
    pub unsupported: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            out_of_range: default_out_of_range(),
            missing_api_key: default_missing_api_key(),
            unsupported: default_unsupported(),
        }
    }
}

fn default_out_of_range() -> String {
    "Location drifted out of fine-tuning range, please adjust".to_string()
}

fn default_missing_api_key() -> String {
    "No API Key".to_string()
}

fn default_unsupported() -> String {
    "The current browser environment does not support network positioning".to_string()
}
