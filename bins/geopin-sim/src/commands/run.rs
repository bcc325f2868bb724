//! Run command: replay a scenario

use crate::fixtures::{ConsoleSurface, FixtureGeocoder, ScriptedLocator, StdoutHost};
use crate::scenario::{Scenario, Step};
use anyhow::Result;
use geopin_geo::Coordinate;
use geopin_picker::{Completion, LocationPicker, Phase};
use geopin_telemetry::metrics;
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a replayed session.
#[derive(Debug)]
pub struct Summary {
    pub phase: Phase,
    pub actions: Vec<&'static str>,
    pub notices: usize,
}

/// Replay the scenario at `path`, printing messages to stdout.
pub async fn run(path: &Path, pretty: bool, format: &str) -> Result<Summary> {
    let scenario = Scenario::load(path)?;
    let summary = replay(scenario, pretty).await?;

    if format == "json" {
        let output = serde_json::json!({
            "phase": format!("{:?}", summary.phase),
            "actions": summary.actions,
            "notices": summary.notices,
            "metrics": metrics().export_json(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!(
            "{} {} message(s), {} notice(s), final phase {}",
            "Done:".bold(),
            summary.actions.len(),
            summary.notices,
            format!("{:?}", summary.phase).cyan()
        );
    }
    Ok(summary)
}

/// Drive a session through initialize and every scripted step.
pub async fn replay(scenario: Scenario, pretty: bool) -> Result<Summary> {
    let config = scenario.config()?;
    let picker = LocationPicker::new(
        config,
        ScriptedLocator::new(scenario.geolocation_supported, scenario.fixes),
        FixtureGeocoder::new(scenario.geocoder, scenario.map_load_error),
        ConsoleSurface::default(),
        StdoutHost::new(pretty),
    );

    // Failures are already on the host stream; the scenario keeps going.
    log_outcome("initialize", picker.initialize().await);

    for (index, step) in scenario.steps.iter().enumerate() {
        debug!(index, ?step, "replaying step");
        match step {
            Step::Drag { lat, lng } => {
                log_outcome("drag", picker.drag_end(Coordinate::new(*lat, *lng)).await);
            }
            Step::Select { place_id } => {
                if !picker.select_candidate(place_id) {
                    debug!(place_id, "selection had no effect");
                }
            }
            Step::Recenter => log_outcome("recenter", picker.recenter().await),
        }
    }

    let phase = picker.phase();
    let (surface, host) = picker.into_parts();
    info!(?phase, messages = host.posted.len(), "scenario finished");
    Ok(Summary {
        phase,
        actions: host.posted,
        notices: surface.notices,
    })
}

fn log_outcome(step: &str, outcome: geopin_picker::Result<Completion>) {
    match outcome {
        Ok(completion) => debug!(step, ?completion, "step finished"),
        Err(e) => debug!(step, code = %e.code(), error = %e, "step reported an error"),
    }
}
