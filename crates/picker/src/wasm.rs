//! WASM bridge for browser hosts.
//!
//! The page supplies a bridge object whose methods do the actual browser and
//! map SDK work:
//!
//! | method | contract |
//! |---|---|
//! | `isGeolocationSupported()` | `boolean` |
//! | `getCurrentPosition()` | `Promise<{lat, lng}>`, rejects with a `GeolocationPositionError` |
//! | `loadMap(apiKey)` | `Promise<void>` |
//! | `geocode({lat, lng})` | `Promise<Candidate[]>`, rejects with `{code}` status errors |
//! | `showMap(center, settings)` | |
//! | `drawCircle(center, radius, style)` / `clearCircle()` | |
//! | `placeMarker(point, draggable)` | the page calls `dragEnd` when a drag ends |
//! | `showCandidates(candidates, activeId)` | the page calls `selectCandidate` on click |
//! | `showNotice(notice)` | |
//! | `postMessage(message)` | forward to `window.parent.postMessage(message, '*')` |
//!
//! The synchronous callbacks may call back into the widget, e.g. a
//! `showCandidates` implementation that immediately calls `selectCandidate`
//! or `state`.

use crate::candidate::Candidate;
use crate::error::{GeocodeError, GeolocationError, MapError};
use crate::machine::Completion;
use crate::picker::LocationPicker;
use crate::protocol::Message;
use crate::provider::{Geolocator, HostFrame, MapProvider, MapSurface, Notice};
use geopin_core::config::{CircleStyle, MapSettings, PickerConfig};
use geopin_geo::Coordinate;
use js_sys::{Promise, Reflect, JSON};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

#[wasm_bindgen]
extern "C" {
    /// Page-side implementation of the provider callbacks.
    #[derive(Debug, Clone)]
    pub type Bridge;

    #[wasm_bindgen(method, js_name = isGeolocationSupported)]
    fn is_geolocation_supported(this: &Bridge) -> bool;

    #[wasm_bindgen(method, catch, js_name = getCurrentPosition)]
    fn get_current_position(this: &Bridge) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadMap)]
    fn load_map(this: &Bridge, api_key: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn geocode(this: &Bridge, point: JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = showMap)]
    fn show_map(this: &Bridge, center: JsValue, settings: JsValue);

    #[wasm_bindgen(method, js_name = drawCircle)]
    fn draw_circle(this: &Bridge, center: JsValue, radius: f64, style: JsValue);

    #[wasm_bindgen(method, js_name = clearCircle)]
    fn clear_circle(this: &Bridge);

    #[wasm_bindgen(method, js_name = placeMarker)]
    fn place_marker(this: &Bridge, point: JsValue, draggable: bool);

    #[wasm_bindgen(method, js_name = showCandidates)]
    fn show_candidates(this: &Bridge, candidates: JsValue, active: Option<String>);

    #[wasm_bindgen(method, js_name = showNotice)]
    fn show_notice(this: &Bridge, notice: JsValue);

    #[wasm_bindgen(method, js_name = postMessage)]
    fn post_message(this: &Bridge, message: JsValue);
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, String> {
    let json: String = JSON::stringify(value).map_err(|e| describe(&e))?.into();
    serde_json::from_str(&json).map_err(|e| format!("JSON parse error: {}", e))
}

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| JSON::stringify(value).ok().map(String::from))
        .unwrap_or_else(|| "unknown JavaScript error".to_string())
}

fn geolocation_error(error: &JsValue) -> GeolocationError {
    let code = Reflect::get(error, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map_or(2, |c| c as u16);
    GeolocationError::from_code(code, describe(error))
}

fn geocode_rejection(error: &JsValue) -> Result<Vec<Candidate>, GeocodeError> {
    let status = Reflect::get(error, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_string());
    match status.as_deref() {
        // Some SDKs reject instead of returning an empty list.
        Some("ZERO_RESULTS") => Ok(Vec::new()),
        Some(status) => Err(GeocodeError::status(status)),
        None => Err(GeocodeError::transport(describe(error))),
    }
}

#[derive(Debug, Clone)]
pub struct JsGeolocator(Bridge);

impl Geolocator for JsGeolocator {
    fn is_supported(&self) -> bool {
        self.0.is_geolocation_supported()
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        let promise = self
            .0
            .get_current_position()
            .map_err(|e| geolocation_error(&e))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|e| geolocation_error(&e))?;
        from_js(&value).map_err(GeolocationError::PositionUnavailable)
    }
}

#[derive(Debug, Clone)]
pub struct JsMapProvider(Bridge);

impl MapProvider for JsMapProvider {
    async fn load(&self, api_key: &str) -> Result<(), MapError> {
        let promise = self
            .0
            .load_map(api_key)
            .map_err(|e| MapError::load(describe(&e)))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| MapError::load(describe(&e)))
    }

    async fn reverse_geocode(&self, point: Coordinate) -> Result<Vec<Candidate>, GeocodeError> {
        let promise = match self.0.geocode(to_js(&point)) {
            Ok(promise) => promise,
            Err(e) => return geocode_rejection(&e),
        };
        match JsFuture::from(promise).await {
            Ok(value) if value.is_null() || value.is_undefined() => Ok(Vec::new()),
            Ok(value) => from_js(&value).map_err(GeocodeError::transport),
            Err(e) => geocode_rejection(&e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsSurface(Bridge);

impl MapSurface for JsSurface {
    fn show_map(&mut self, center: Coordinate, settings: &MapSettings) {
        self.0.show_map(to_js(&center), to_js(settings));
    }

    fn draw_circle(&mut self, center: Coordinate, radius: f64, style: &CircleStyle) {
        self.0.draw_circle(to_js(&center), radius, to_js(style));
    }

    fn clear_circle(&mut self) {
        self.0.clear_circle();
    }

    fn place_marker(&mut self, point: Coordinate, draggable: bool) {
        self.0.place_marker(to_js(&point), draggable);
    }

    fn show_candidates(&mut self, candidates: &[Candidate], active: Option<&str>) {
        self.0
            .show_candidates(to_js(candidates), active.map(String::from));
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.0.show_notice(to_js(notice));
    }
}

#[derive(Debug, Clone)]
pub struct ParentFrame(Bridge);

impl HostFrame for ParentFrame {
    fn post(&mut self, message: &Message) {
        self.0.post_message(to_js(message));
    }
}

type Session = LocationPicker<JsGeolocator, JsMapProvider, JsSurface, ParentFrame>;

/// Resolves to `true` when the call changed the picked position. Never
/// rejects: failures have already been posted to the parent frame.
fn settle(result: crate::Result<Completion>) -> JsValue {
    JsValue::from_bool(matches!(result, Ok(Completion::Applied)))
}

/// The picker as seen from JavaScript.
#[wasm_bindgen]
pub struct PickerWidget {
    session: Rc<Session>,
}

#[wasm_bindgen]
impl PickerWidget {
    /// Build a session from the page's query string (`?apiKey=...&radius=...`).
    #[wasm_bindgen(constructor)]
    pub fn new(query: &str, bridge: Bridge) -> PickerWidget {
        let config = PickerConfig::from_query(query);
        let session = LocationPicker::new(
            config,
            JsGeolocator(bridge.clone()),
            JsMapProvider(bridge.clone()),
            JsSurface(bridge.clone()),
            ParentFrame(bridge),
        );
        PickerWidget {
            session: Rc::new(session),
        }
    }

    pub fn initialize(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move { Ok(settle(session.initialize().await)) })
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&self, lat: f64, lng: f64) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            Ok(settle(session.drag_end(Coordinate::new(lat, lng)).await))
        })
    }

    pub fn recenter(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move { Ok(settle(session.recenter().await)) })
    }

    #[wasm_bindgen(js_name = selectCandidate)]
    pub fn select_candidate(&self, place_id: &str) -> bool {
        self.session.select_candidate(place_id)
    }

    /// Current position state as a plain object, `null` before initialize.
    pub fn state(&self) -> JsValue {
        self.session
            .snapshot()
            .map_or(JsValue::NULL, |state| to_js(&state))
    }
}
