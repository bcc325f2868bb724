//! Async session driver.
//!
//! [`LocationPicker`] owns the providers and the [`PositionMachine`]. Its
//! methods take `&self`, so a single-threaded executor can run several
//! interactions at once; the machine is only borrowed between awaits.
//!
//! Surface and host calls are queued while the machine is borrowed and
//! delivered once it is released. A callback may therefore call back into the
//! session (read a snapshot, select a candidate); the nested call's effects
//! are delivered after the current one, in order.

use crate::error::{GeolocationError, PickerError, Result};
use crate::locate::GeoLocator;
use crate::machine::{Completion, PositionMachine};
use crate::outbox::Outbox;
use crate::provider::{Geolocator, HostFrame, MapProvider, MapSurface};
use crate::resolve::GeocodeResolver;
use crate::state::{Phase, PositionState};
use geopin_core::config::PickerConfig;
use geopin_geo::Coordinate;
use std::cell::{Cell, RefCell};
use tracing::{debug, info, instrument};

/// A location picker session.
///
/// Every error is reported to the host page before it is returned, so callers
/// only need the `Result` for their own bookkeeping.
pub struct LocationPicker<L, P, S, H> {
    config: PickerConfig,
    locator: GeoLocator<L>,
    resolver: GeocodeResolver<P>,
    machine: RefCell<PositionMachine<Outbox, Outbox>>,
    outbox: Outbox,
    surface: RefCell<S>,
    host: RefCell<H>,
    flushing: Cell<bool>,
}

impl<L, P, S, H> LocationPicker<L, P, S, H>
where
    L: Geolocator,
    P: MapProvider,
    S: MapSurface,
    H: HostFrame,
{
    pub fn new(config: PickerConfig, locator: L, provider: P, surface: S, host: H) -> Self {
        let outbox = Outbox::default();
        let machine = PositionMachine::new(&config, outbox.clone(), outbox.clone());
        Self {
            config,
            locator: GeoLocator::new(locator),
            resolver: GeocodeResolver::new(provider),
            machine: RefCell::new(machine),
            outbox,
            surface: RefCell::new(surface),
            host: RefCell::new(host),
            flushing: Cell::new(false),
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.machine.borrow().phase()
    }

    /// Copy of the current position state, `None` before initialize succeeds.
    pub fn snapshot(&self) -> Option<PositionState> {
        self.machine.borrow().state().cloned()
    }

    /// Number of messages posted to the host so far.
    pub fn messages_sent(&self) -> u64 {
        self.machine.borrow().messages_sent()
    }

    /// Inspect the surface. Not for use from inside a surface callback.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.surface.borrow())
    }

    /// Inspect the host frame. Not for use from inside a host callback.
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.host.borrow())
    }

    pub fn into_parts(self) -> (S, H) {
        (self.surface.into_inner(), self.host.into_inner())
    }

    /// Acquire the device position, load the map, resolve the anchor and post
    /// the first `onChange`.
    ///
    /// Does nothing unless the session is `Uninitialized`. A geolocation or map
    /// failure returns the session there, so calling this again (or
    /// [`LocationPicker::recenter`]) retries; a configuration or environment
    /// failure makes it inert. A geocode failure still leaves the session
    /// `Ready` at the anchor, with no candidates.
    ///
    /// # Errors
    /// The failure that stopped initialization, already reported to the host.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Completion> {
        if !self.update(|m| m.begin_initialize()) {
            return Ok(Completion::Ignored);
        }

        if let Err(e) = self.config.validate() {
            return Err(self.abort_initialize(PickerError::Config(e)));
        }
        if !self.locator.is_supported() {
            return Err(self.abort_initialize(GeolocationError::Unsupported.into()));
        }

        let anchor = match self.locator.acquire().await {
            Ok(position) => position,
            Err(e) => return Err(self.abort_initialize(e.into())),
        };

        if let Err(e) = self.resolver.provider().load(&self.config.api_key).await {
            return Err(self.abort_initialize(e.into()));
        }
        info!("map provider loaded");

        let ticket = self.update(|m| m.anchor_initial(anchor));
        let result = self.resolver.resolve(anchor).await;
        self.update(|m| m.complete_initialize(ticket, result))
    }

    /// The marker was dropped at `to`: move there, resolve its addresses and
    /// post `onChange`.
    ///
    /// # Errors
    /// A geocode failure, already reported; the position change still stands.
    #[instrument(skip(self))]
    pub async fn drag_end(&self, to: Coordinate) -> Result<Completion> {
        let Some(ticket) = self.update(|m| m.begin_drag(to)) else {
            return Ok(Completion::Ignored);
        };
        let result = self.resolver.resolve(to).await;
        self.update(|m| m.complete_resolution(ticket, result))
    }

    /// Pick an address from the list by place id. Returns whether anything
    /// changed; see [`PositionMachine::select_candidate`] for the guards.
    pub fn select_candidate(&self, place_id: &str) -> bool {
        self.update(|m| m.select_candidate(place_id))
    }

    /// Re-acquire the device position and make it the new anchor.
    ///
    /// Before any position exists this retries [`LocationPicker::initialize`],
    /// which is how the user recovers from a refused or failed first fix.
    ///
    /// # Errors
    /// A geolocation or geocode failure, already reported. On geolocation
    /// failure the previous state is kept.
    #[instrument(skip(self))]
    pub async fn recenter(&self) -> Result<Completion> {
        if self.phase() == Phase::Uninitialized {
            debug!("no position yet, retrying initialize");
            return self.initialize().await;
        }
        if !self.update(|m| m.begin_recenter()) {
            return Ok(Completion::Ignored);
        }

        let position = match self.locator.acquire().await {
            Ok(position) => position,
            Err(e) => return Err(self.update(|m| m.abort_recenter(e))),
        };

        let Some(ticket) = self.update(|m| m.apply_recenter(position)) else {
            return Ok(Completion::Ignored);
        };
        let result = self.resolver.resolve(position).await;
        self.update(|m| m.complete_resolution(ticket, result))
    }

    fn abort_initialize(&self, error: PickerError) -> PickerError {
        self.update(|m| m.abort_initialize(&error));
        error
    }

    /// Run one machine step, then deliver what it queued.
    fn update<R>(&self, step: impl FnOnce(&mut PositionMachine<Outbox, Outbox>) -> R) -> R {
        let out = step(&mut *self.machine.borrow_mut());
        self.flush();
        out
    }

    fn flush(&self) {
        // A nested flush from inside a callback leaves the rest to the outer loop.
        if self.flushing.replace(true) {
            return;
        }
        while let Some(effect) = self.outbox.pop() {
            effect.apply(&self.surface, &self.host);
        }
        self.flushing.set(false);
    }
}

impl<L, P, S, H> std::fmt::Debug for LocationPicker<L, P, S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPicker")
            .field("radius", &self.config.radius)
            .finish_non_exhaustive()
    }
}
