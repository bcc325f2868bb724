//! Geofenced location picker core.
//!
//! This crate holds everything with real semantics in the geopin widget:
//! - Device geolocation and reverse geocoding adapters over provider traits
//! - The position state machine: anchor, current position, candidates, range
//! - The outbound `fail` / `reject` / `onChange` protocol
//! - An async session driver and, behind the `wasm` feature, a browser bridge
//!
//! # Example
//!
//! ```
//! use geopin_core::config::PickerConfig;
//! use geopin_geo::Coordinate;
//! use geopin_picker::{
//!     Candidate, GeocodeError, GeolocationError, Geolocator, LocationPicker, MapError,
//!     MapProvider, Message, NullSurface,
//! };
//!
//! struct Device;
//!
//! impl Geolocator for Device {
//!     fn is_supported(&self) -> bool {
//!         true
//!     }
//!
//!     async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
//!         Ok(Coordinate::new(1.0, 1.0))
//!     }
//! }
//!
//! struct Maps;
//!
//! impl MapProvider for Maps {
//!     async fn load(&self, _api_key: &str) -> Result<(), MapError> {
//!         Ok(())
//!     }
//!
//!     async fn reverse_geocode(&self, point: Coordinate) -> Result<Vec<Candidate>, GeocodeError> {
//!         Ok(vec![Candidate::new("p1", "1 Main St", point)])
//!     }
//! }
//!
//! let config = PickerConfig::from_query("apiKey=demo&radius=500");
//! let picker = LocationPicker::new(config, Device, Maps, NullSurface, Vec::<Message>::new());
//! tokio_test::block_on(picker.initialize()).unwrap();
//!
//! let (_, messages) = picker.into_parts();
//! let change = messages[0].as_change().unwrap();
//! assert_eq!(change.record.as_ref().unwrap().place_id, "p1");
//! assert!(!change.is_out_distance);
//! ```

mod candidate;
mod error;
mod locate;
mod machine;
mod outbox;
mod picker;
mod protocol;
mod provider;
mod resolve;
mod state;

#[cfg(feature = "wasm")]
mod wasm;

pub use candidate::{AddressComponent, Candidate};
pub use error::{Disposition, GeocodeError, GeolocationError, MapError, PickerError, Result};
pub use locate::GeoLocator;
pub use machine::{Completion, PositionMachine};
pub use picker::LocationPicker;
pub use protocol::{ChangePayload, Message, ProtocolEmitter};
pub use provider::{Geolocator, HostFrame, MapProvider, MapSurface, Notice, NoticeKind};
pub use resolve::{GeocodeResolver, Resolution, ResolveTicket};
pub use state::{Phase, PositionState};

/// A surface that draws nothing, for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl MapSurface for NullSurface {
    fn show_map(&mut self, _: geopin_geo::Coordinate, _: &geopin_core::config::MapSettings) {}
    fn draw_circle(
        &mut self,
        _: geopin_geo::Coordinate,
        _: f64,
        _: &geopin_core::config::CircleStyle,
    ) {
    }
    fn clear_circle(&mut self) {}
    fn place_marker(&mut self, _: geopin_geo::Coordinate, _: bool) {}
    fn show_candidates(&mut self, _: &[Candidate], _: Option<&str>) {}
    fn show_notice(&mut self, _: &Notice) {}
}
