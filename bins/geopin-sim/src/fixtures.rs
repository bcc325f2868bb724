//! Providers backed by a scenario file, plus console output.

use crate::scenario::{Fix, GeocodeFailure, GeocoderFixture};
use geopin_core::config::{CircleStyle, MapSettings};
use geopin_geo::{distance_meters, Coordinate};
use geopin_picker::{
    Candidate, GeocodeError, GeolocationError, Geolocator, HostFrame, MapError, MapProvider,
    MapSurface, Message, Notice, NoticeKind,
};
use owo_colors::OwoColorize;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Answers position requests from the scenario's fix queue.
#[derive(Debug)]
pub struct ScriptedLocator {
    supported: bool,
    fixes: RefCell<VecDeque<Fix>>,
}

impl ScriptedLocator {
    pub fn new(supported: bool, fixes: Vec<Fix>) -> Self {
        Self {
            supported,
            fixes: RefCell::new(fixes.into()),
        }
    }
}

impl Geolocator for ScriptedLocator {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        match self.fixes.borrow_mut().pop_front() {
            Some(Fix::Position(point)) => Ok(point),
            Some(Fix::Error { error, message }) => Err(GeolocationError::from_code(error, message)),
            None => Err(GeolocationError::PositionUnavailable(
                "scenario has no more fixes".into(),
            )),
        }
    }
}

/// Reverse geocoder over a fixed address pool.
#[derive(Debug)]
pub struct FixtureGeocoder {
    pool: Vec<Candidate>,
    limit: usize,
    failure: Option<GeocodeFailure>,
    fail_after: usize,
    load_error: Option<String>,
    requests: Cell<usize>,
}

impl FixtureGeocoder {
    pub fn new(fixture: GeocoderFixture, load_error: Option<String>) -> Self {
        Self {
            pool: fixture.pool,
            limit: fixture.limit,
            failure: fixture.failure,
            fail_after: fixture.fail_after,
            load_error,
            requests: Cell::new(0),
        }
    }

    /// Up to `limit` pool entries, nearest to `point` first.
    pub fn nearest(&self, point: &Coordinate) -> Vec<Candidate> {
        let mut ranked: Vec<(f64, &Candidate)> = self
            .pool
            .iter()
            .map(|c| (distance_meters(point, &c.location), c))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked
            .into_iter()
            .take(self.limit)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

impl MapProvider for FixtureGeocoder {
    async fn load(&self, api_key: &str) -> Result<(), MapError> {
        debug!(api_key_len = api_key.len(), "loading fixture map");
        match &self.load_error {
            Some(message) => Err(MapError::load(message.clone())),
            None => Ok(()),
        }
    }

    async fn reverse_geocode(&self, point: Coordinate) -> Result<Vec<Candidate>, GeocodeError> {
        let request = self.requests.get();
        self.requests.set(request + 1);
        match &self.failure {
            Some(failure) if request >= self.fail_after => Err(failure.into()),
            _ => Ok(self.nearest(&point)),
        }
    }
}

/// Traces map drawing and prints banners to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    pub notices: usize,
}

impl MapSurface for ConsoleSurface {
    fn show_map(&mut self, center: Coordinate, settings: &MapSettings) {
        debug!(%center, zoom = settings.zoom, "map shown");
    }

    fn draw_circle(&mut self, center: Coordinate, radius: f64, _style: &CircleStyle) {
        debug!(%center, radius, "circle drawn");
    }

    fn clear_circle(&mut self) {
        debug!("circle cleared");
    }

    fn place_marker(&mut self, point: Coordinate, draggable: bool) {
        debug!(%point, draggable, "marker placed");
    }

    fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>) {
        debug!(count = candidates.len(), active, "address list updated");
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.notices += 1;
        match notice.kind {
            NoticeKind::Warning => eprintln!("{} {}", "⚠".yellow(), notice.message.yellow()),
            NoticeKind::Error => eprintln!("{} {}", "✗".red(), notice.message.red()),
        }
    }
}

/// Prints each message as one JSON line on stdout.
#[derive(Debug)]
pub struct StdoutHost {
    pretty: bool,
    pub posted: Vec<&'static str>,
}

impl StdoutHost {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            posted: Vec::new(),
        }
    }
}

impl HostFrame for StdoutHost {
    fn post(&mut self, message: &Message) {
        self.posted.push(message.action());
        let rendered = if self.pretty {
            serde_json::to_string_pretty(message)
        } else {
            message.to_json()
        };
        match rendered {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "failed to serialize message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("far", "Far Rd", Coordinate::new(1.01, 1.0)),
            Candidate::new("near", "Near St", Coordinate::new(1.0, 1.0)),
            Candidate::new("mid", "Mid Ave", Coordinate::new(1.005, 1.0)),
        ]
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let geocoder = FixtureGeocoder::new(
            GeocoderFixture {
                pool: pool(),
                limit: 2,
                ..GeocoderFixture::default()
            },
            None,
        );
        let ids: Vec<_> = geocoder
            .nearest(&Coordinate::new(1.0, 1.0))
            .into_iter()
            .map(|c| c.place_id)
            .collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[test]
    fn test_failure_after_threshold() {
        let geocoder = FixtureGeocoder::new(
            GeocoderFixture {
                pool: pool(),
                failure: Some(GeocodeFailure::Status {
                    status: "OVER_QUERY_LIMIT".into(),
                }),
                fail_after: 1,
                ..GeocoderFixture::default()
            },
            None,
        );
        let point = Coordinate::new(1.0, 1.0);
        assert!(block_on(geocoder.reverse_geocode(point)).is_ok());
        assert_eq!(
            block_on(geocoder.reverse_geocode(point)),
            Err(GeocodeError::status("OVER_QUERY_LIMIT"))
        );
    }

    #[test]
    fn test_locator_replays_queue() {
        let locator = ScriptedLocator::new(
            true,
            vec![
                Fix::Position(Coordinate::new(2.0, 3.0)),
                Fix::Error {
                    error: 3,
                    message: "slow".into(),
                },
            ],
        );
        assert_eq!(
            block_on(locator.current_position()),
            Ok(Coordinate::new(2.0, 3.0))
        );
        assert_eq!(
            block_on(locator.current_position()),
            Err(GeolocationError::Timeout("slow".into()))
        );
        assert!(matches!(
            block_on(locator.current_position()),
            Err(GeolocationError::PositionUnavailable(_))
        ));
    }
}
