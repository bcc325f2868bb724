//! Session position state.

use crate::candidate::Candidate;
use crate::resolve::Resolution;
use geopin_geo::{Coordinate, Geofence};
use serde::Serialize;

/// Lifecycle of a picker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Constructed, no position yet
    Uninitialized,
    /// First acquire/resolve in flight
    Initializing,
    /// Idle with a known position
    Ready,
    /// A drag's geocode is in flight
    Dragging,
    /// Applying a list selection
    Selecting,
    /// Re-acquiring the device position
    Recentering,
    /// Stopped for good after a configuration or environment failure
    Inert,
}

impl Phase {
    /// Returns true once a position exists and the session is usable.
    pub fn accepts_interaction(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Dragging | Self::Selecting | Self::Recentering
        )
    }
}

/// Anchor, current position and the address candidates for it.
///
/// The anchor only changes through [`PositionState::reanchor`]; drags and
/// selections move `current`. `out_of_range` is recomputed on every move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionState {
    fence: Geofence,
    current: Coordinate,
    active_candidate_id: Option<String>,
    candidates: Vec<Candidate>,
    out_of_range: bool,
}

impl PositionState {
    pub(crate) fn new(anchor: Coordinate, radius: f64, resolution: Resolution) -> Self {
        let fence = if radius > 0.0 {
            Geofence {
                center: anchor,
                radius,
            }
        } else {
            Geofence::unconstrained(anchor)
        };
        let mut state = Self {
            fence,
            current: anchor,
            active_candidate_id: None,
            candidates: Vec::new(),
            out_of_range: false,
        };
        state.apply_resolution(resolution);
        state
    }

    pub fn anchor(&self) -> Coordinate {
        self.fence.center
    }

    pub fn current(&self) -> Coordinate {
        self.current
    }

    /// Tolerance radius in meters, 0 = unconstrained
    pub fn radius(&self) -> f64 {
        self.fence.radius
    }

    pub fn is_out_of_range(&self) -> bool {
        self.out_of_range
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn active_candidate_id(&self) -> Option<&str> {
        self.active_candidate_id.as_deref()
    }

    /// The active candidate, if its id is still in the list.
    pub fn active_candidate(&self) -> Option<&Candidate> {
        let id = self.active_candidate_id.as_deref()?;
        self.find(id)
    }

    pub fn find(&self, place_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.place_id == place_id)
    }

    /// Great-circle distance between anchor and current position in meters
    pub fn distance_from_anchor(&self) -> f64 {
        self.fence.distance_to(&self.current)
    }

    pub(crate) fn move_to(&mut self, point: Coordinate) {
        self.current = point;
        self.out_of_range = self.fence.is_outside(&point);
    }

    pub(crate) fn reanchor(&mut self, point: Coordinate) {
        self.fence.center = point;
        self.move_to(point);
    }

    pub(crate) fn apply_resolution(&mut self, resolution: Resolution) {
        let Resolution { candidates, active } = resolution;
        self.candidates = candidates;
        self.active_candidate_id = active;
    }

    pub(crate) fn clear_candidates(&mut self) {
        self.apply_resolution(Resolution::default());
    }

    /// Make `place_id` active and move to its location. `None` if unknown.
    pub(crate) fn select(&mut self, place_id: &str) -> Option<Coordinate> {
        let location = self.find(place_id)?.location;
        self.active_candidate_id = Some(place_id.to_string());
        self.move_to(location);
        Some(location)
    }
}
