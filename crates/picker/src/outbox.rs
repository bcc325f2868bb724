//! Deferred surface and host calls.
//!
//! The session driver hands an [`Outbox`] to the machine in place of the real
//! surface and host frame. Calls are queued while the machine is borrowed and
//! replayed against the real ones afterwards, so a host callback may call back
//! into the session.

use crate::candidate::Candidate;
use crate::protocol::Message;
use crate::provider::{HostFrame, MapSurface, Notice};
use geopin_core::config::{CircleStyle, MapSettings};
use geopin_geo::Coordinate;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    ShowMap(Coordinate, MapSettings),
    DrawCircle(Coordinate, f64, CircleStyle),
    ClearCircle,
    PlaceMarker(Coordinate, bool),
    ShowCandidates(Vec<Candidate>, Option<String>),
    ShowNotice(Notice),
    Post(Message),
}

impl Effect {
    pub(crate) fn apply<S: MapSurface, H: HostFrame>(self, surface: &RefCell<S>, host: &RefCell<H>) {
        match self {
            Self::ShowMap(center, settings) => surface.borrow_mut().show_map(center, &settings),
            Self::DrawCircle(center, radius, style) => {
                surface.borrow_mut().draw_circle(center, radius, &style);
            }
            Self::ClearCircle => surface.borrow_mut().clear_circle(),
            Self::PlaceMarker(point, draggable) => {
                surface.borrow_mut().place_marker(point, draggable);
            }
            Self::ShowCandidates(candidates, active) => {
                surface
                    .borrow_mut()
                    .show_candidates(&candidates, active.as_deref());
            }
            Self::ShowNotice(notice) => surface.borrow_mut().show_notice(&notice),
            Self::Post(message) => host.borrow_mut().post(&message),
        }
    }
}

/// FIFO of pending effects, shared between the machine and the driver.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outbox(Rc<RefCell<VecDeque<Effect>>>);

impl Outbox {
    fn push(&self, effect: Effect) {
        self.0.borrow_mut().push_back(effect);
    }

    pub(crate) fn pop(&self) -> Option<Effect> {
        self.0.borrow_mut().pop_front()
    }
}

impl MapSurface for Outbox {
    fn show_map(&mut self, center: Coordinate, settings: &MapSettings) {
        self.push(Effect::ShowMap(center, settings.clone()));
    }

    fn draw_circle(&mut self, center: Coordinate, radius: f64, style: &CircleStyle) {
        self.push(Effect::DrawCircle(center, radius, style.clone()));
    }

    fn clear_circle(&mut self) {
        self.push(Effect::ClearCircle);
    }

    fn place_marker(&mut self, point: Coordinate, draggable: bool) {
        self.push(Effect::PlaceMarker(point, draggable));
    }

    fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>) {
        self.push(Effect::ShowCandidates(
            candidates.to_vec(),
            active.map(str::to_owned),
        ));
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.push(Effect::ShowNotice(notice.clone()));
    }
}

impl HostFrame for Outbox {
    fn post(&mut self, message: &Message) {
        self.push(Effect::Post(message.clone()));
    }
}
