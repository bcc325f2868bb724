//! Position state machine.
//!
//! All transitions are synchronous. Anything that waits on a provider is split
//! in two: a `begin_*`/`anchor_*`/`apply_*` step that updates the position and
//! hands out a [`ResolveTicket`], and a `complete_*` step that applies the
//! geocoder's answer if the ticket is still current.

use crate::error::{Disposition, GeocodeError, GeolocationError, PickerError};
use crate::protocol::ProtocolEmitter;
use crate::provider::{HostFrame, MapSurface, Notice};
use crate::resolve::{Resolution, ResolveTicket};
use crate::state::{Phase, PositionState};
use geopin_core::config::{PickerConfig, ViewSettings};
use geopin_core::ErrorCode;
use geopin_geo::Coordinate;
use geopin_telemetry::metrics;
use tracing::{debug, info, warn};

/// What became of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// State changed and `onChange` was posted
    Applied,
    /// A newer position update superseded this one; nothing was posted
    Stale,
    /// The session was not in a phase that accepts this request
    Ignored,
}

/// Owns the session state and decides every message and surface effect.
#[derive(Debug)]
pub struct PositionMachine<S, H> {
    phase: Phase,
    state: Option<PositionState>,
    radius: f64,
    view: ViewSettings,
    seq: u64,
    surface: S,
    emitter: ProtocolEmitter<H>,
}

impl<S: MapSurface, H: HostFrame> PositionMachine<S, H> {
    pub fn new(config: &PickerConfig, surface: S, host: H) -> Self {
        Self {
            phase: Phase::Uninitialized,
            state: None,
            radius: config.radius_meters(),
            view: config.view.clone(),
            seq: 0,
            surface,
            emitter: ProtocolEmitter::new(host),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `None` until the first successful initialize.
    pub fn state(&self) -> Option<&PositionState> {
        self.state.as_ref()
    }

    /// Tolerance radius in meters, 0 = unconstrained
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host(&self) -> &H {
        self.emitter.host()
    }

    pub fn messages_sent(&self) -> u64 {
        self.emitter.sent()
    }

    /// Enter `Initializing`. Only valid from `Uninitialized`, which is also
    /// where a failed attempt returns to, so this doubles as retry.
    pub fn begin_initialize(&mut self) -> bool {
        if self.phase == Phase::Uninitialized {
            info!(radius = self.radius, "initializing picker session");
            self.phase = Phase::Initializing;
            true
        } else {
            debug!(phase = ?self.phase, "initialize ignored");
            false
        }
    }

    /// Report a failed initialize attempt and fall back to `Uninitialized`
    /// (or `Inert` for configuration and environment failures).
    pub fn abort_initialize(&mut self, error: &PickerError) {
        self.report(error);
        if self.phase == Phase::Initializing {
            self.phase = Phase::Uninitialized;
        }
    }

    /// Draw the map, fence and marker around the first fix.
    pub fn anchor_initial(&mut self, anchor: Coordinate) -> ResolveTicket {
        self.surface.show_map(anchor, &self.view.map);
        self.draw_fence(anchor);
        self.surface.place_marker(anchor, self.is_constrained());
        self.next_ticket(anchor)
    }

    /// Finish initialize with the geocoder's answer for the anchor.
    ///
    /// The map and marker are already up, so a geocode failure does not undo
    /// them: the session becomes `Ready` at the anchor with no candidates, the
    /// error is reported and `onChange` is posted without a record.
    ///
    /// # Errors
    /// Returns the geocode failure after reporting it.
    pub fn complete_initialize(
        &mut self,
        ticket: ResolveTicket,
        result: Result<Resolution, GeocodeError>,
    ) -> Result<Completion, PickerError> {
        if self.phase != Phase::Initializing || ticket.seq() != self.seq {
            debug!(ticket = ticket.seq(), latest = self.seq, "initialize result superseded");
            return Ok(Completion::Stale);
        }

        let (resolution, outcome) = match result {
            Ok(resolution) => (resolution, Ok(Completion::Applied)),
            Err(e) => (Resolution::default(), Err(PickerError::from(e))),
        };
        self.state = Some(PositionState::new(ticket.point(), self.radius, resolution));
        self.phase = Phase::Ready;
        info!(anchor = %ticket.point(), "picker session ready");

        if let Err(err) = &outcome {
            self.report(err);
        }
        self.publish_change();
        outcome
    }

    /// The user dropped the marker at `to`. Returns the ticket to resolve
    /// under, or `None` if the session is not interactive.
    pub fn begin_drag(&mut self, to: Coordinate) -> Option<ResolveTicket> {
        if !self.phase.accepts_interaction() {
            debug!(phase = ?self.phase, "drag ignored");
            return None;
        }
        if !to.is_valid() {
            debug!(%to, "drag to invalid coordinate ignored");
            return None;
        }
        let state = self.state.as_mut()?;
        state.move_to(to);
        self.phase = Phase::Dragging;
        debug!(%to, "marker dragged");
        Some(self.next_ticket(to))
    }

    /// Apply the geocoder's answer for a drag or recenter.
    ///
    /// On failure the new position stays, the candidate list is cleared, the
    /// error is reported and `onChange` is still posted.
    ///
    /// # Errors
    /// Returns the geocode failure after reporting it.
    pub fn complete_resolution(
        &mut self,
        ticket: ResolveTicket,
        result: Result<Resolution, GeocodeError>,
    ) -> Result<Completion, PickerError> {
        if ticket.seq() != self.seq || self.state.is_none() || self.phase == Phase::Inert {
            metrics().increment("geocode.stale");
            debug!(ticket = ticket.seq(), latest = self.seq, "discarding stale geocode result");
            return Ok(Completion::Stale);
        }

        let outcome = match result {
            Ok(resolution) => {
                if let Some(state) = self.state.as_mut() {
                    state.apply_resolution(resolution);
                }
                Ok(Completion::Applied)
            }
            Err(e) => {
                if let Some(state) = self.state.as_mut() {
                    state.clear_candidates();
                }
                let err = PickerError::from(e);
                self.report(&err);
                Err(err)
            }
        };

        self.phase = Phase::Ready;
        self.publish_change();
        outcome
    }

    /// Move to a candidate from the address list.
    ///
    /// Ignored when the session is not interactive, when the candidate is
    /// already active, when `place_id` is not in the list, and always in
    /// unconstrained mode: without a radius there is nothing to fine-tune, so
    /// the list is informational only.
    pub fn select_candidate(&mut self, place_id: &str) -> bool {
        if !self.phase.accepts_interaction() {
            debug!(phase = ?self.phase, "selection ignored");
            return false;
        }
        if !self.is_constrained() {
            debug!(place_id, "list repositioning disabled without a radius");
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.active_candidate_id() == Some(place_id) {
            return false;
        }
        if state.find(place_id).is_some_and(|c| !c.location.is_valid()) {
            debug!(place_id, "candidate has an invalid location");
            return false;
        }
        let Some(location) = state.select(place_id) else {
            warn!(place_id, "selected candidate is not in the list");
            return false;
        };

        self.phase = Phase::Selecting;
        // Pending geocodes belong to an older position now.
        self.seq += 1;
        self.surface.place_marker(location, true);
        self.phase = Phase::Ready;
        debug!(place_id, %location, "candidate selected");
        self.publish_change();
        true
    }

    /// Enter `Recentering` while the device position is re-acquired.
    pub fn begin_recenter(&mut self) -> bool {
        if self.phase.accepts_interaction() {
            self.phase = Phase::Recentering;
            true
        } else {
            debug!(phase = ?self.phase, "recenter ignored");
            false
        }
    }

    /// Report a failed re-acquire. The state is left untouched.
    pub fn abort_recenter(&mut self, error: GeolocationError) -> PickerError {
        let err = PickerError::from(error);
        self.report(&err);
        if self.phase == Phase::Recentering {
            self.phase = Phase::Ready;
        }
        err
    }

    /// Re-anchor on a fresh device fix and redraw fence and marker there.
    pub fn apply_recenter(&mut self, position: Coordinate) -> Option<ResolveTicket> {
        if self.phase == Phase::Inert {
            return None;
        }
        let state = self.state.as_mut()?;
        state.reanchor(position);

        self.surface.show_map(position, &self.view.map);
        self.surface.clear_circle();
        self.draw_fence(position);
        self.surface.place_marker(position, self.is_constrained());
        self.phase = Phase::Recentering;
        info!(anchor = %position, "recentered");
        Some(self.next_ticket(position))
    }

    fn is_constrained(&self) -> bool {
        self.radius > 0.0
    }

    fn next_ticket(&mut self, point: Coordinate) -> ResolveTicket {
        self.seq += 1;
        ResolveTicket::new(self.seq, point)
    }

    fn draw_fence(&mut self, center: Coordinate) {
        if self.is_constrained() {
            self.surface.draw_circle(center, self.radius, &self.view.circle);
        }
    }

    fn publish_change(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        self.surface
            .show_candidates(state.candidates(), state.active_candidate_id());
        self.emitter.change(state);

        if state.is_out_of_range() {
            warn!(
                distance = state.distance_from_anchor(),
                radius = self.radius,
                "position out of range"
            );
            let notice = Notice::warning(
                self.view.messages.out_of_range.clone(),
                self.view.banner.auto_hide_ms,
            );
            self.surface.show_notice(&notice);
        }
    }

    fn report(&mut self, error: &PickerError) {
        let text = match error {
            PickerError::Config(e) if e.code == ErrorCode::MissingApiKey => {
                self.view.messages.missing_api_key.clone()
            }
            PickerError::Geolocation(GeolocationError::Unsupported) => {
                self.view.messages.unsupported.clone()
            }
            _ => match error.disposition() {
                Disposition::Fail => error.to_string(),
                Disposition::Reject => serde_json::to_string(&error.report())
                    .unwrap_or_else(|_| error.to_string()),
            },
        };

        match error.disposition() {
            Disposition::Fail => {
                warn!(code = %error.code(), error = %error, "reporting failure to host");
                self.emitter.fail();
            }
            Disposition::Reject => {
                warn!(code = %error.code(), error = %error, "reporting rejection to host");
                self.emitter.reject(error.report());
            }
        }
        self.surface
            .show_notice(&Notice::error(text, self.view.banner.auto_hide_ms));

        if error.is_terminal() {
            info!("picker session is inert until reloaded");
            self.phase = Phase::Inert;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::protocol::Message;
    use crate::provider::NoticeKind;
    use geopin_core::config::{CircleStyle, MapSettings};

    #[derive(Debug, Default)]
    struct Recorder {
        markers: Vec<(Coordinate, bool)>,
        circles: Vec<(Coordinate, f64)>,
        cleared: usize,
        lists: Vec<(usize, Option<String>)>,
        notices: Vec<Notice>,
    }

    impl MapSurface for Recorder {
        fn show_map(&mut self, _center: Coordinate, _settings: &MapSettings) {}

        fn draw_circle(&mut self, center: Coordinate, radius: f64, _style: &CircleStyle) {
            self.circles.push((center, radius));
        }

        fn clear_circle(&mut self) {
            self.cleared += 1;
        }

        fn place_marker(&mut self, point: Coordinate, draggable: bool) {
            self.markers.push((point, draggable));
        }

        fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>) {
            self.lists.push((candidates.len(), active.map(String::from)));
        }

        fn show_notice(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    const ANCHOR: Coordinate = Coordinate::new(1.0, 1.0);
    const NEARBY: Coordinate = Coordinate::new(1.001, 1.0);
    const FAR: Coordinate = Coordinate::new(1.0054, 1.0);

    fn machine(radius: u32) -> PositionMachine<Recorder, Vec<Message>> {
        let config = PickerConfig::from_query(&format!("apiKey=k&radius={radius}"));
        PositionMachine::new(&config, Recorder::default(), Vec::new())
    }

    fn candidates() -> Resolution {
        Resolution::from_candidates(vec![
            Candidate::new("p1", "Anchor St", ANCHOR),
            Candidate::new("p2", "Nearby Ave", NEARBY),
            Candidate::new("p3", "Far Rd", FAR),
        ])
    }

    fn ready(radius: u32) -> PositionMachine<Recorder, Vec<Message>> {
        let mut m = machine(radius);
        assert!(m.begin_initialize());
        let ticket = m.anchor_initial(ANCHOR);
        assert_eq!(
            m.complete_initialize(ticket, Ok(candidates())).unwrap(),
            Completion::Applied
        );
        m
    }

    fn changes(m: &PositionMachine<Recorder, Vec<Message>>) -> Vec<&crate::protocol::ChangePayload> {
        m.host().iter().filter_map(Message::as_change).collect()
    }

    #[test]
    fn test_initialize_emits_first_change() {
        let m = ready(500);
        assert_eq!(m.phase(), Phase::Ready);
        let changes = changes(&m);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].lat_lng, ANCHOR);
        assert_eq!(changes[0].record.as_ref().unwrap().place_id, "p1");
        assert!(!changes[0].is_out_distance);
        assert_eq!(m.surface().circles, vec![(ANCHOR, 500.0)]);
        assert_eq!(m.surface().markers, vec![(ANCHOR, true)]);
    }

    #[test]
    fn test_unconstrained_has_no_circle_and_fixed_marker() {
        let m = ready(0);
        assert!(m.surface().circles.is_empty());
        assert_eq!(m.surface().markers, vec![(ANCHOR, false)]);
    }

    #[test]
    fn test_interaction_before_initialize_is_ignored() {
        let mut m = machine(500);
        assert!(m.begin_drag(FAR).is_none());
        assert!(!m.select_candidate("p2"));
        assert!(!m.begin_recenter());
        assert_eq!(m.messages_sent(), 0);
        assert_eq!(m.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_initialize_geocode_failure_still_becomes_ready() {
        let mut m = machine(500);
        m.begin_initialize();
        let ticket = m.anchor_initial(ANCHOR);
        let err = m
            .complete_initialize(ticket, Err(GeocodeError::status("REQUEST_DENIED")))
            .unwrap_err();
        assert!(matches!(err, PickerError::Geocode(_)));
        assert_eq!(m.phase(), Phase::Ready);

        let state = m.state().unwrap();
        assert_eq!(state.anchor(), ANCHOR);
        assert!(state.candidates().is_empty());

        let actions: Vec<_> = m.host().iter().map(Message::action).collect();
        assert_eq!(actions, ["fail", "onChange"]);
        assert!(changes(&m)[0].record.is_none());

        // The marker drawn during initialize is live.
        assert!(m.begin_drag(FAR).is_some());
    }

    #[test]
    fn test_drag_out_of_range_warns() {
        let mut m = ready(500);
        let ticket = m.begin_drag(FAR).unwrap();
        assert_eq!(m.phase(), Phase::Dragging);
        let far = Resolution::from_candidates(vec![Candidate::new("p3", "Far Rd", FAR)]);
        assert_eq!(m.complete_resolution(ticket, Ok(far)).unwrap(), Completion::Applied);

        let last = *changes(&m).last().unwrap();
        assert_eq!(last.lat_lng, FAR);
        assert!(last.is_out_distance);
        assert_eq!(last.record.as_ref().unwrap().place_id, "p3");
        assert_eq!(m.state().unwrap().anchor(), ANCHOR);

        let notice = m.surface().notices.last().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.auto_hide_ms, 3000);
        assert_eq!(m.phase(), Phase::Ready);
    }

    #[test]
    fn test_drag_in_range_has_no_warning() {
        let mut m = ready(500);
        let ticket = m.begin_drag(NEARBY).unwrap();
        m.complete_resolution(ticket, Ok(candidates())).unwrap();
        assert!(!changes(&m).last().unwrap().is_out_distance);
        assert!(m.surface().notices.is_empty());
    }

    #[test]
    fn test_older_ticket_is_discarded() {
        let mut m = ready(500);
        let first = m.begin_drag(NEARBY).unwrap();
        let second = m.begin_drag(FAR).unwrap();
        let sent = m.messages_sent();

        assert_eq!(
            m.complete_resolution(second, Ok(Resolution::default())).unwrap(),
            Completion::Applied
        );
        assert_eq!(
            m.complete_resolution(first, Ok(candidates())).unwrap(),
            Completion::Stale
        );
        assert_eq!(m.messages_sent(), sent + 1);
        assert_eq!(m.state().unwrap().current(), FAR);
        assert!(m.state().unwrap().candidates().is_empty());
    }

    #[test]
    fn test_drag_geocode_failure_keeps_position() {
        let mut m = ready(500);
        let ticket = m.begin_drag(NEARBY).unwrap();
        let err = m
            .complete_resolution(ticket, Err(GeocodeError::transport("offline")))
            .unwrap_err();
        assert!(matches!(err, PickerError::Geocode(GeocodeError::Transport { .. })));

        let actions: Vec<_> = m.host().iter().map(Message::action).collect();
        assert_eq!(actions, ["onChange", "reject", "onChange"]);
        let last = *changes(&m).last().unwrap();
        assert_eq!(last.lat_lng, NEARBY);
        assert!(last.record.is_none());
        assert_eq!(m.phase(), Phase::Ready);
        assert_eq!(m.surface().notices[0].kind, NoticeKind::Error);
    }

    #[test]
    fn test_drag_to_invalid_coordinate_is_ignored() {
        let mut m = ready(500);
        let sent = m.messages_sent();
        assert!(m.begin_drag(Coordinate::new(f64::NAN, 1.0)).is_none());
        assert!(m.begin_drag(Coordinate::new(91.0, 1.0)).is_none());
        assert_eq!(m.state().unwrap().current(), ANCHOR);
        assert_eq!(m.phase(), Phase::Ready);
        assert_eq!(m.messages_sent(), sent);
    }

    #[test]
    fn test_select_candidate_with_invalid_location_is_ignored() {
        let mut m = machine(500);
        m.begin_initialize();
        let ticket = m.anchor_initial(ANCHOR);
        let broken = Resolution::from_candidates(vec![
            Candidate::new("p1", "Anchor St", ANCHOR),
            Candidate::new("bad", "Nowhere", Coordinate::new(f64::NAN, f64::NAN)),
        ]);
        m.complete_initialize(ticket, Ok(broken)).unwrap();

        assert!(!m.select_candidate("bad"));
        assert_eq!(m.state().unwrap().current(), ANCHOR);
        assert_eq!(m.state().unwrap().active_candidate_id(), Some("p1"));
    }

    #[test]
    fn test_select_moves_marker_and_emits() {
        let mut m = ready(500);
        assert!(m.select_candidate("p3"));
        let last = *changes(&m).last().unwrap();
        assert_eq!(last.lat_lng, FAR);
        assert_eq!(last.record.as_ref().unwrap().place_id, "p3");
        assert!(last.is_out_distance);
        assert_eq!(m.surface().markers.last(), Some(&(FAR, true)));
    }

    #[test]
    fn test_select_guards() {
        let mut m = ready(500);
        let sent = m.messages_sent();
        assert!(!m.select_candidate("p1"), "already active");
        assert!(!m.select_candidate("nope"), "unknown id");
        assert_eq!(m.messages_sent(), sent);

        let mut unconstrained = ready(0);
        let before = unconstrained.state().cloned();
        assert!(!unconstrained.select_candidate("p2"));
        assert_eq!(unconstrained.state().cloned(), before);
        assert_eq!(unconstrained.messages_sent(), 1);
    }

    #[test]
    fn test_select_invalidates_pending_drag() {
        let mut m = ready(500);
        let ticket = m.begin_drag(FAR).unwrap();
        assert!(m.select_candidate("p2"));
        assert_eq!(
            m.complete_resolution(ticket, Ok(Resolution::default())).unwrap(),
            Completion::Stale
        );
        assert_eq!(m.state().unwrap().current(), NEARBY);
        assert_eq!(m.state().unwrap().active_candidate_id(), Some("p2"));
    }

    #[test]
    fn test_recenter_resets_anchor_and_range() {
        let mut m = ready(500);
        let ticket = m.begin_drag(FAR).unwrap();
        m.complete_resolution(ticket, Ok(Resolution::default())).unwrap();
        assert!(m.state().unwrap().is_out_of_range());

        assert!(m.begin_recenter());
        let ticket = m.apply_recenter(FAR).unwrap();
        m.complete_resolution(ticket, Ok(candidates())).unwrap();

        let state = m.state().unwrap();
        assert_eq!(state.anchor(), FAR);
        assert!(!state.is_out_of_range());
        assert!(!changes(&m).last().unwrap().is_out_distance);
        assert_eq!(m.surface().cleared, 1);
        assert_eq!(m.surface().circles.last(), Some(&(FAR, 500.0)));
    }

    #[test]
    fn test_recenter_failure_leaves_state() {
        let mut m = ready(500);
        let before = m.state().cloned();
        assert!(m.begin_recenter());
        let err = m.abort_recenter(GeolocationError::Timeout("10s".into()));
        assert!(matches!(err, PickerError::Geolocation(_)));
        assert_eq!(m.state().cloned(), before);
        assert_eq!(m.phase(), Phase::Ready);
        assert!(matches!(m.host().last(), Some(Message::Reject(_))));
    }

    #[test]
    fn test_config_error_makes_session_inert() {
        let mut m = machine(500);
        m.begin_initialize();
        m.abort_initialize(&PickerError::from(geopin_core::Error::missing_api_key()));
        assert_eq!(m.phase(), Phase::Inert);
        assert!(!m.begin_initialize());
        assert_eq!(m.host().as_slice(), &[Message::Fail]);
        assert_eq!(m.surface().notices[0].message, "No API Key");
    }
}
