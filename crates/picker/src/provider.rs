//! Seams to the outside world.
//!
//! The picker never talks to a browser, a map SDK or a parent frame directly;
//! hosts implement these traits and hand them to [`crate::LocationPicker`].

use crate::candidate::Candidate;
use crate::error::{GeocodeError, GeolocationError, MapError};
use crate::protocol::Message;
use geopin_core::config::{CircleStyle, MapSettings};
use geopin_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Device geolocation.
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    /// Whether the environment offers geolocation at all.
    fn is_supported(&self) -> bool;

    /// Request the most accurate fix available. Every call is a fresh request.
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Map rendering provider: script loading and reverse geocoding.
#[allow(async_fn_in_trait)]
pub trait MapProvider {
    /// Load the provider with the widget's API key.
    async fn load(&self, api_key: &str) -> Result<(), MapError>;

    /// Addresses near `point`, best match first. No match is `Ok(vec![])`.
    async fn reverse_geocode(&self, point: Coordinate) -> Result<Vec<Candidate>, GeocodeError>;
}

/// Everything the user sees. Calls are fire-and-forget.
pub trait MapSurface {
    /// Center the map on `center` at the configured zoom.
    fn show_map(&mut self, center: Coordinate, settings: &MapSettings);

    /// Draw the tolerance circle, replacing any previous one.
    fn draw_circle(&mut self, center: Coordinate, radius: f64, style: &CircleStyle);

    fn clear_circle(&mut self);

    /// Put the single marker at `point`, replacing any previous one.
    fn place_marker(&mut self, point: Coordinate, draggable: bool);

    /// Render the address list with `active` highlighted.
    fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>);

    /// Show a snackbar banner.
    fn show_notice(&mut self, notice: &Notice);
}

/// The embedding page. Messages are delivered in order and never batched.
pub trait HostFrame {
    fn post(&mut self, message: &Message);
}

impl HostFrame for Vec<Message> {
    fn post(&mut self, message: &Message) {
        self.push(message.clone());
    }
}

/// Banner severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Warning,
    Error,
}

/// A user-visible banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub auto_hide_ms: u32,
}

impl Notice {
    pub fn warning(message: impl Into<String>, auto_hide_ms: u32) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
            auto_hide_ms,
        }
    }

    pub fn error(message: impl Into<String>, auto_hide_ms: u32) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            auto_hide_ms,
        }
    }
}
