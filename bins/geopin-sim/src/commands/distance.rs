//! Distance command

use anyhow::Result;
use geopin_geo::{Coordinate, Geofence};
use owo_colors::OwoColorize;

/// Print the distance between two points and, given a radius, whether the
/// second lies outside a fence around the first.
pub fn run(from: (f64, f64), to: (f64, f64), radius: Option<f64>, format: &str) -> Result<()> {
    let from = Coordinate::try_new(from.0, from.1)?;
    let to = Coordinate::try_new(to.0, to.1)?;
    let fence = match radius {
        Some(r) => Geofence::new(from, r)?,
        None => Geofence::unconstrained(from),
    };
    let meters = fence.distance_to(&to);
    let outside = fence.is_outside(&to);

    if format == "json" {
        let output = serde_json::json!({
            "from": from,
            "to": to,
            "distanceMeters": meters,
            "radius": fence.radius,
            "isOutDistance": outside,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {} -> {}", "Distance:".bold(), from, to);
    println!("  {:.1} m", meters);
    if fence.is_constrained() {
        if outside {
            println!("  {} ({} m radius)", "✗ out of range".red(), fence.radius);
        } else {
            println!("  {} ({} m radius)", "✓ in range".green(), fence.radius);
        }
    }
    Ok(())
}
