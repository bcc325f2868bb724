//! Device geolocation adapter.

use crate::error::GeolocationError;
use crate::provider::Geolocator;
use geopin_geo::Coordinate;
use tracing::{debug, warn};

/// Wraps a [`Geolocator`]; every [`GeoLocator::acquire`] is an independent
/// request, nothing is cached.
#[derive(Debug)]
pub struct GeoLocator<L> {
    inner: L,
}

impl<L: Geolocator> GeoLocator<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    /// Obtain a high-accuracy fix.
    ///
    /// # Errors
    /// `Unsupported` without touching the provider when the environment has no
    /// geolocation; the provider's own error otherwise. A fix with out-of-range
    /// degrees is reported as `PositionUnavailable`.
    pub async fn acquire(&self) -> Result<Coordinate, GeolocationError> {
        if !self.inner.is_supported() {
            warn!("geolocation unsupported");
            return Err(GeolocationError::Unsupported);
        }

        let position = self.inner.current_position().await.map_err(|e| {
            warn!(error = %e, "geolocation failed");
            e
        })?;

        if !position.is_valid() {
            return Err(GeolocationError::PositionUnavailable(format!(
                "provider returned invalid coordinate {position}"
            )));
        }

        debug!(%position, "acquired device position");
        Ok(position)
    }
}
