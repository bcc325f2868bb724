//! Scenario file format.

use anyhow::{Context, Result};
use geopin_core::config::{PickerConfig, ViewSettings};
use geopin_geo::Coordinate;
use geopin_picker::{Candidate, GeocodeError};
use serde::Deserialize;
use std::path::Path;

/// A scripted picker session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    /// Widget query string, e.g. `apiKey=demo&radius=500`
    pub query: String,

    /// Presentation overrides, TOML text
    #[serde(default)]
    pub view: Option<String>,

    #[serde(default = "default_supported")]
    pub geolocation_supported: bool,

    /// Answers to successive device position requests
    #[serde(default)]
    pub fixes: Vec<Fix>,

    /// Map script load failure message, if loading should fail
    #[serde(default)]
    pub map_load_error: Option<String>,

    #[serde(default)]
    pub geocoder: GeocoderFixture,

    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_supported() -> bool {
    true
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Picker configuration for this scenario.
    pub fn config(&self) -> Result<PickerConfig> {
        let config = PickerConfig::from_query(&self.query);
        match &self.view {
            Some(toml) => Ok(config.with_view(ViewSettings::from_toml_str(toml)?)),
            None => Ok(config),
        }
    }
}

/// One device position answer: a fix, or a platform error code
/// (1 = denied, 2 = unavailable, 3 = timeout).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Fix {
    Position(Coordinate),
    Error {
        error: u16,
        #[serde(default)]
        message: String,
    },
}

/// Fixture reverse geocoder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeocoderFixture {
    /// Known addresses; queries return the nearest ones first
    #[serde(default)]
    pub pool: Vec<Candidate>,

    /// Maximum candidates per answer
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Failure returned once `fail_after` requests have succeeded
    #[serde(default)]
    pub failure: Option<GeocodeFailure>,

    #[serde(default)]
    pub fail_after: usize,
}

fn default_limit() -> usize {
    5
}

impl Default for GeocoderFixture {
    fn default() -> Self {
        Self {
            pool: Vec::new(),
            limit: default_limit(),
            failure: None,
            fail_after: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GeocodeFailure {
    Status { status: String },
    Transport { message: String },
}

impl From<&GeocodeFailure> for GeocodeError {
    fn from(failure: &GeocodeFailure) -> Self {
        match failure {
            GeocodeFailure::Status { status } => GeocodeError::status(status.clone()),
            GeocodeFailure::Transport { message } => GeocodeError::transport(message.clone()),
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    /// Drop the marker at a point
    Drag { lat: f64, lng: f64 },
    /// Click an address in the list
    Select {
        #[serde(rename = "placeId")]
        place_id: String,
    },
    /// Press the recenter control
    Recenter,
}
