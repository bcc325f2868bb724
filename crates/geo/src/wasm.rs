//! WASM bindings for the geo crate.
//!
//! These bindings let a host page run the same fence math the picker uses.

use crate::{classify, distance_meters, Coordinate};
use wasm_bindgen::prelude::*;

/// Calculate the great-circle distance between two coordinates.
///
/// # Returns
/// Distance in meters
#[wasm_bindgen(js_name = distanceMeters)]
pub fn distance_meters_js(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    distance_meters(&Coordinate::new(lat1, lng1), &Coordinate::new(lat2, lng2))
}

/// Returns true when the second point is on or beyond `radius` meters from the
/// first. A radius of 0 never reports out of range.
#[wasm_bindgen(js_name = isOutOfRange)]
pub fn is_out_of_range(
    anchor_lat: f64,
    anchor_lng: f64,
    lat: f64,
    lng: f64,
    radius: f64,
) -> bool {
    classify(
        &Coordinate::new(anchor_lat, anchor_lng),
        &Coordinate::new(lat, lng),
        radius,
    )
}

/// Parse a `{lat, lng}` JSON object and return the distance in meters to
/// another such object.
#[wasm_bindgen(js_name = distanceBetweenJson)]
pub fn distance_between_json(from_json: &str, to_json: &str) -> Result<f64, JsValue> {
    let from: Coordinate = serde_json::from_str(from_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    let to: Coordinate = serde_json::from_str(to_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    Ok(distance_meters(&from, &to))
}
