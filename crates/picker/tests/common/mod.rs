//! Scriptable providers for driving a full picker session.

#![allow(dead_code)]

use geopin_core::config::{CircleStyle, MapSettings, PickerConfig};
use geopin_geo::Coordinate;
use geopin_picker::{
    Candidate, GeocodeError, GeolocationError, Geolocator, LocationPicker, MapError, MapProvider,
    MapSurface, Message, Notice, NoticeKind,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tokio::sync::oneshot;

pub const ANCHOR: Coordinate = Coordinate::new(1.0, 1.0);
/// About 111 m north of [`ANCHOR`]
pub const NEARBY: Coordinate = Coordinate::new(1.001, 1.0);
/// About 600 m north of [`ANCHOR`]
pub const FAR: Coordinate = Coordinate::new(1.0054, 1.0);

pub type Session = LocationPicker<FakeLocator, FakeProvider, RecordingSurface, Vec<Message>>;

pub fn candidate(id: &str, at: Coordinate) -> Candidate {
    Candidate::new(id, format!("{} Main St", id), at).with_components(["Main St", "Springfield"])
}

pub fn session(query: &str, locator: FakeLocator, provider: FakeProvider) -> Session {
    LocationPicker::new(
        PickerConfig::from_query(query),
        locator,
        provider,
        RecordingSurface::default(),
        Vec::new(),
    )
}

pub fn messages(picker: &Session) -> Vec<Message> {
    picker.with_host(Clone::clone)
}

pub fn notices(picker: &Session) -> Vec<Notice> {
    picker.with_surface(|s| s.notices.clone())
}

pub fn warnings(picker: &Session) -> usize {
    notices(picker)
        .iter()
        .filter(|n| n.kind == NoticeKind::Warning)
        .count()
}

pub fn changes(picker: &Session) -> Vec<geopin_picker::ChangePayload> {
    messages(picker)
        .iter()
        .filter_map(|m| m.as_change().cloned())
        .collect()
}

/// Device geolocation answering from a queue. An empty queue means the
/// position is unavailable.
#[derive(Debug)]
pub struct FakeLocator {
    supported: bool,
    fixes: RefCell<VecDeque<Result<Coordinate, GeolocationError>>>,
    calls: Cell<usize>,
}

impl FakeLocator {
    pub fn with_fixes<I>(fixes: I) -> Self
    where
        I: IntoIterator<Item = Result<Coordinate, GeolocationError>>,
    {
        Self {
            supported: true,
            fixes: RefCell::new(fixes.into_iter().collect()),
            calls: Cell::new(0),
        }
    }

    pub fn at(points: &[Coordinate]) -> Self {
        Self::with_fixes(points.iter().copied().map(Ok))
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::with_fixes([])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Geolocator for FakeLocator {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.calls.set(self.calls.get() + 1);
        self.fixes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(GeolocationError::PositionUnavailable("no fix".into())))
    }
}

type Pending = oneshot::Receiver<Result<Vec<Candidate>, GeocodeError>>;

/// Map provider with a scripted load result and geocode answers. Deferred
/// answers are matched by point; queued ones are used in order; once both run
/// out every point resolves to a single candidate at that point.
#[derive(Default)]
pub struct FakeProvider {
    load_error: Option<MapError>,
    answers: RefCell<VecDeque<Result<Vec<Candidate>, GeocodeError>>>,
    pending: RefCell<Vec<(Coordinate, Pending)>>,
    loads: Cell<usize>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_load(message: &str) -> Self {
        Self {
            load_error: Some(MapError::load(message)),
            ..Self::default()
        }
    }

    pub fn answer(self, result: Result<Vec<Candidate>, GeocodeError>) -> Self {
        self.answers.borrow_mut().push_back(result);
        self
    }

    /// The answer for `point` arrives when the returned sender fires.
    pub fn deferred(&self, point: Coordinate) -> oneshot::Sender<Result<Vec<Candidate>, GeocodeError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push((point, rx));
        tx
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl MapProvider for FakeProvider {
    async fn load(&self, _api_key: &str) -> Result<(), MapError> {
        self.loads.set(self.loads.get() + 1);
        match &self.load_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn reverse_geocode(&self, point: Coordinate) -> Result<Vec<Candidate>, GeocodeError> {
        let pending = {
            let mut pending = self.pending.borrow_mut();
            pending
                .iter()
                .position(|(at, _)| *at == point)
                .map(|i| pending.remove(i).1)
        };
        if let Some(rx) = pending {
            return rx
                .await
                .unwrap_or_else(|_| Err(GeocodeError::transport("answer dropped")));
        }

        let next = self.answers.borrow_mut().pop_front();
        next.unwrap_or_else(|| Ok(vec![candidate(&format!("auto-{}", point), point)]))
    }
}

/// Surface that records everything drawn.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub maps: Vec<Coordinate>,
    pub circles: Vec<(Coordinate, f64)>,
    pub cleared_circles: usize,
    pub markers: Vec<(Coordinate, bool)>,
    pub lists: Vec<(Vec<String>, Option<String>)>,
    pub notices: Vec<Notice>,
}

impl MapSurface for RecordingSurface {
    fn show_map(&mut self, center: Coordinate, _settings: &MapSettings) {
        self.maps.push(center);
    }

    fn draw_circle(&mut self, center: Coordinate, radius: f64, _style: &CircleStyle) {
        self.circles.push((center, radius));
    }

    fn clear_circle(&mut self) {
        self.cleared_circles += 1;
    }

    fn place_marker(&mut self, point: Coordinate, draggable: bool) {
        self.markers.push((point, draggable));
    }

    fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>) {
        let ids = candidates.iter().map(|c| c.place_id.clone()).collect();
        self.lists.push((ids, active.map(String::from)));
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
