//! Geofence range classification.
//!
//! A fence is an anchor position plus a tolerance radius in meters. A radius of
//! zero means unconstrained: nothing is ever out of range.

use crate::{distance_meters, Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Returns true when `current` lies outside the fence around `anchor`.
///
/// The threshold is inclusive: a point exactly `radius` meters away is out of
/// range. A radius of zero (or below) disables the check.
///
/// # Example
/// ```
/// use geopin_geo::{classify, Coordinate};
///
/// let anchor = Coordinate::new(1.0, 1.0);
/// let moved = Coordinate::new(1.01, 1.0); // ~1.1 km north
///
/// assert!(classify(&anchor, &moved, 500.0));
/// assert!(!classify(&anchor, &moved, 0.0));
/// ```
#[inline]
pub fn classify(anchor: &Coordinate, current: &Coordinate, radius: f64) -> bool {
    radius > 0.0 && distance_meters(anchor, current) >= radius
}

/// A circular fence around an anchor coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    /// Center of the fence
    pub center: Coordinate,
    /// Radius in meters, 0 = unconstrained
    pub radius: f64,
}

impl Geofence {
    /// Creates a fence, rejecting negative or non-finite radii.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidRadius`] when `radius` is negative, NaN or infinite.
    pub fn new(center: Coordinate, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GeoError::InvalidRadius(radius));
        }
        Ok(Self { center, radius })
    }

    /// A fence that never classifies anything as out of range.
    pub fn unconstrained(center: Coordinate) -> Self {
        Self { center, radius: 0.0 }
    }

    /// Returns true when the fence has a positive radius.
    #[inline]
    pub fn is_constrained(&self) -> bool {
        self.radius > 0.0
    }

    /// Distance from the fence center in meters.
    #[inline]
    pub fn distance_to(&self, point: &Coordinate) -> f64 {
        distance_meters(&self.center, point)
    }

    /// Returns true when `point` is on or beyond the fence boundary.
    #[inline]
    pub fn is_outside(&self, point: &Coordinate) -> bool {
        classify(&self.center, point, self.radius)
    }
}
