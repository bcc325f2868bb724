//! Reverse geocoding with request sequencing.
//!
//! Every resolve is issued under a [`ResolveTicket`]. The state machine bumps
//! its position sequence on each update and only applies results whose ticket
//! matches, so the most recently issued request wins regardless of the order
//! responses arrive in.

use crate::candidate::Candidate;
use crate::error::GeocodeError;
use crate::provider::MapProvider;
use geopin_geo::Coordinate;
use geopin_telemetry::metrics;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Identifies one in-flight resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveTicket {
    seq: u64,
    point: Coordinate,
}

impl ResolveTicket {
    pub(crate) fn new(seq: u64, point: Coordinate) -> Self {
        Self { seq, point }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The coordinate being resolved
    pub fn point(&self) -> Coordinate {
        self.point
    }
}

/// Candidates for a point plus the default active one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub candidates: Vec<Candidate>,
    /// First candidate's id, `None` when nothing was found
    pub active: Option<String>,
}

impl Resolution {
    /// Keep provider order, drop repeated place ids, activate the first.
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        let mut seen = HashSet::new();
        let candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.place_id.clone()))
            .collect();
        let active = candidates.first().map(|c| c.place_id.clone());
        Self { candidates, active }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Wraps the provider's reverse geocoder.
#[derive(Debug)]
pub struct GeocodeResolver<P> {
    provider: P,
}

impl<P: MapProvider> GeocodeResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Candidates for `point`. An empty answer is `Ok` with no active id.
    ///
    /// # Errors
    /// Propagates the provider's [`GeocodeError`].
    pub async fn resolve(&self, point: Coordinate) -> Result<Resolution, GeocodeError> {
        debug!(%point, "reverse geocoding");
        match self.provider.reverse_geocode(point).await {
            Ok(candidates) => {
                let resolution = Resolution::from_candidates(candidates);
                metrics().gauge("geocode.candidates", resolution.candidates.len() as u64);
                if resolution.is_empty() {
                    debug!(%point, "no address found");
                }
                Ok(resolution)
            }
            Err(e) => {
                warn!(%point, error = %e, "reverse geocoding failed");
                Err(e)
            }
        }
    }
}
