//! The acquisition state machine and its presentation seam.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use geotag_geocode::{GeocodeReply, GeocodeResult, GeocodingService, Placemark};
use geotag_location::{Authorization, Coordinate, LocationError, LocationSample, PositioningSource};

use crate::clock::Clock;
use crate::config::millis;
use crate::timer::{Scheduler, TimerHandle};
use crate::{
    AcquisitionConfig, AcquisitionError, AcquisitionEvent, AcquisitionHandle, AcquisitionPhase,
    AcquisitionState, SessionId,
};

/// Receives every state change of the controller.
///
/// Closures `Fn(&AcquisitionState)` implement this directly.
pub trait PresentationSink: Send + Sync {
    /// The state changed; `state` is the new snapshot.
    fn on_status_changed(&self, state: &AcquisitionState);

    /// The session's address resolved for the first time. Fires at most once
    /// per session, before the matching `on_status_changed`.
    fn on_first_fix(&self, _placemark: &Placemark) {}
}

impl<F> PresentationSink for F
where
    F: Fn(&AcquisitionState) + Send + Sync,
{
    fn on_status_changed(&self, state: &AcquisitionState) {
        self(state);
    }
}

/// Result of a `start()` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session is searching.
    Started,
    /// Authorization was undetermined and has been requested; start again
    /// once the user answered.
    AuthorizationRequested,
    /// The session could not start; the error is also in the state.
    Failed(AcquisitionError),
}

/// Why a reading was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No session is searching.
    NotSearching,
    /// Measured too long ago (a cached reading).
    Stale,
    /// Negative or NaN accuracy.
    InvalidAccuracy,
    /// Not more accurate than the current fix, and the position has not
    /// settled yet.
    NotImproved,
}

/// What the controller did with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleVerdict {
    /// Became the new best fix; the search continues.
    Improved,
    /// Became the new best fix and is accurate enough; the search stopped.
    Final,
    /// Did not improve, but the position has stayed put long enough; the
    /// search stopped.
    Converged,
    /// Discarded without changing state.
    Rejected(RejectReason),
}

/// The acquisition state machine.
///
/// Handlers must run on one sequential context; [`AcquisitionLoop`](crate::AcquisitionLoop)
/// provides one. Handlers never fail: every problem ends as a state change
/// pushed to the [`PresentationSink`].
pub struct AcquisitionController {
    config: AcquisitionConfig,
    source: Arc<dyn PositioningSource>,
    geocoder: Arc<dyn GeocodingService>,
    sink: Arc<dyn PresentationSink>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    events: AcquisitionHandle,
    state: AcquisitionState,
    timer: Option<TimerHandle>,
    in_flight: Option<(SessionId, Coordinate)>,
    first_fix_announced: bool,
}

impl fmt::Debug for AcquisitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquisitionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Collaborators {
    pub(crate) source: Arc<dyn PositioningSource>,
    pub(crate) geocoder: Arc<dyn GeocodingService>,
    pub(crate) sink: Arc<dyn PresentationSink>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl AcquisitionController {
    pub(crate) fn new(
        parts: Collaborators,
        config: AcquisitionConfig,
        events: AcquisitionHandle,
    ) -> Self {
        parts.source.set_delegate(Arc::new(events.clone()));
        Self {
            config,
            source: parts.source,
            geocoder: parts.geocoder,
            sink: parts.sink,
            scheduler: parts.scheduler,
            clock: parts.clock,
            events,
            state: AcquisitionState::default(),
            timer: None,
            in_flight: None,
            first_fix_announced: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AcquisitionState {
        &self.state
    }

    /// Session tuning.
    #[must_use]
    pub const fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Dispatch one event to its handler. [`AcquisitionEvent::Shutdown`]
    /// stops the session; ending the loop is the caller's job.
    pub fn handle(&mut self, event: AcquisitionEvent) {
        match event {
            AcquisitionEvent::Start => {
                self.start();
            }
            AcquisitionEvent::Stop | AcquisitionEvent::Shutdown => self.stop(),
            AcquisitionEvent::Toggle => self.toggle(),
            AcquisitionEvent::Sample(sample) => {
                self.on_sample(sample);
            }
            AcquisitionEvent::PositioningError(err) => self.on_positioning_error(err),
            AcquisitionEvent::Timeout(session) => self.on_timeout(session),
            AcquisitionEvent::GeocodeComplete {
                session,
                coordinate,
                result,
            } => self.on_geocode_complete(session, coordinate, result),
        }
    }

    /// Begin a new session, discarding the previous fix.
    pub fn start(&mut self) -> StartOutcome {
        match self.source.authorization_status().authorization() {
            Authorization::Request => {
                info!("location authorization undetermined, requesting it");
                self.source.request_authorization();
                return StartOutcome::AuthorizationRequested;
            }
            Authorization::Refused => {
                return self.refuse(AcquisitionError::PermissionDenied);
            }
            Authorization::Proceed => {}
        }
        if !self.source.services_enabled() {
            return self.refuse(AcquisitionError::ServicesDisabled);
        }

        self.halt(AcquisitionPhase::Idle);
        self.state.phase = AcquisitionPhase::Idle;
        self.state.session = self.state.session.next();
        self.state.best_sample = None;
        self.state.last_error = None;
        self.state.geocode_result = None;
        self.state.geocode_in_flight = false;
        self.in_flight = None;
        self.first_fix_announced = false;
        let session = self.state.session;

        if let Err(err) = self.source.start_updates() {
            warn!("session {session}: positioning source failed to start: {err}");
            let err = match err {
                LocationError::PermissionDenied => AcquisitionError::PermissionDenied,
                LocationError::ServiceDisabled => AcquisitionError::ServicesDisabled,
                other => AcquisitionError::PositioningFailed(other),
            };
            self.state.last_error = Some(err.clone());
            self.notify();
            return StartOutcome::Failed(err);
        }

        let now = self.clock.now_ms();
        self.state.is_searching = true;
        self.state.phase = AcquisitionPhase::Searching;
        self.state.session_deadline = Some(now.saturating_add(millis(self.config.timeout)));

        let events = self.events.clone();
        self.timer = Some(self.scheduler.schedule_once(
            self.config.timeout,
            Box::new(move || {
                events.post(AcquisitionEvent::Timeout(session));
            }),
        ));

        info!("session {session}: searching for a fix");
        self.notify();
        StartOutcome::Started
    }

    /// Stop searching. Keeps the fix and address found so far. Idempotent.
    pub fn stop(&mut self) {
        if self.state.is_searching {
            info!("session {}: stopped by request", self.state.session);
        }
        self.halt(AcquisitionPhase::Idle);
        self.notify();
    }

    /// Stop if searching, otherwise start a new session.
    pub fn toggle(&mut self) {
        if self.state.is_searching {
            self.stop();
        } else {
            let outcome = self.start();
            debug!("toggle started a session: {outcome:?}");
        }
    }

    /// The session timer fired.
    ///
    /// Only a timer of the running session that has no fix yet does
    /// anything; a session that already has a fix ends through accuracy or
    /// convergence instead.
    pub fn on_timeout(&mut self, session: SessionId) {
        if session != self.state.session || !self.state.is_searching || self.state.has_fix() {
            debug!("session {session}: ignoring timer");
            return;
        }
        warn!(
            "session {session}: no fix within {:?}",
            self.config.timeout
        );
        self.halt(AcquisitionPhase::Idle);
        self.state.last_error = Some(AcquisitionError::Timeout);
        self.notify();
    }

    /// The positioning source reported an error.
    pub fn on_positioning_error(&mut self, err: LocationError) {
        if err.is_transient() {
            debug!("session {}: {err}, still waiting", self.state.session);
            return;
        }
        if !self.state.is_searching {
            debug!("ignoring positioning error outside a session: {err}");
            return;
        }
        warn!("session {}: {err}", self.state.session);
        self.state.last_error = Some(AcquisitionError::from(err));
        self.halt(AcquisitionPhase::Idle);
        self.notify();
    }

    /// Filter a reading and update the fix.
    pub fn on_sample(&mut self, sample: LocationSample) -> SampleVerdict {
        let verdict = self.accept_sample(sample);
        if let SampleVerdict::Rejected(reason) = verdict {
            debug!(
                "session {}: rejected sample ±{:.1} m at {}: {reason:?}",
                self.state.session, sample.horizontal_accuracy, sample.coordinate
            );
        }
        verdict
    }

    fn accept_sample(&mut self, sample: LocationSample) -> SampleVerdict {
        if !self.state.is_searching {
            return SampleVerdict::Rejected(RejectReason::NotSearching);
        }
        if sample.age_ms(self.clock.now_ms()) > millis(self.config.max_sample_age) {
            return SampleVerdict::Rejected(RejectReason::Stale);
        }
        if !sample.has_valid_accuracy() {
            return SampleVerdict::Rejected(RejectReason::InvalidAccuracy);
        }

        match self.state.best_sample {
            Some(best) if !sample.is_more_accurate_than(&best) => {
                let distance = best.distance_to(&sample);
                let settled = sample.timestamp.saturating_sub(best.timestamp)
                    > millis(self.config.convergence_interval);
                if distance < self.config.convergence_distance_m && settled {
                    info!(
                        "session {}: position converged at ±{:.1} m",
                        self.state.session, best.horizontal_accuracy
                    );
                    self.halt(AcquisitionPhase::Done);
                    self.notify();
                    SampleVerdict::Converged
                } else {
                    SampleVerdict::Rejected(RejectReason::NotImproved)
                }
            }
            _ => {
                self.state.last_error = None;
                self.state.best_sample = Some(sample);

                if sample.horizontal_accuracy <= self.config.desired_accuracy_m {
                    info!(
                        "session {}: fix ±{:.1} m is accurate enough",
                        self.state.session, sample.horizontal_accuracy
                    );
                    // Coordinates first, then the finished status.
                    self.notify();
                    self.halt(AcquisitionPhase::Done);
                    // The terminal fix is looked up even if an older lookup
                    // is still running; that one is discarded on arrival.
                    self.dispatch_geocode(true);
                    self.notify();
                    SampleVerdict::Final
                } else {
                    self.dispatch_geocode(false);
                    self.notify();
                    SampleVerdict::Improved
                }
            }
        }
    }

    /// A reverse geocoding request finished.
    ///
    /// Only the answer to the outstanding request counts. If the best fix
    /// moved on while it ran, the current fix is looked up instead.
    pub fn on_geocode_complete(
        &mut self,
        session: SessionId,
        coordinate: Coordinate,
        result: GeocodeResult,
    ) {
        if self.in_flight != Some((session, coordinate)) {
            debug!("discarding superseded geocode result for {coordinate} from session {session}");
            return;
        }
        self.in_flight = None;
        self.state.geocode_in_flight = false;

        let current = session == self.state.session
            && self
                .state
                .best_sample
                .is_some_and(|best| best.coordinate == coordinate);
        if !current {
            debug!("discarding geocode result for {coordinate}, the fix has moved");
            self.dispatch_geocode(false);
            self.notify();
            return;
        }

        match &result {
            GeocodeResult::Resolved(placemark) => {
                if !self.first_fix_announced {
                    self.first_fix_announced = true;
                    info!("session {session}: first address resolved");
                    self.sink.on_first_fix(placemark);
                }
            }
            GeocodeResult::Failed(err) => {
                warn!("session {session}: reverse geocoding failed: {err}");
            }
        }
        self.state.geocode_result = Some(result);
        self.notify();
    }

    /// Request an address for the best fix.
    ///
    /// Without `supersede` nothing is sent while a request is outstanding.
    /// With it, a request for another coordinate is replaced.
    fn dispatch_geocode(&mut self, supersede: bool) {
        let Some(best) = self.state.best_sample else {
            return;
        };
        let session = self.state.session;
        let coordinate = best.coordinate;

        match self.in_flight {
            Some(target) if target == (session, coordinate) => {
                debug!("geocode request for {coordinate} already in flight");
                return;
            }
            Some(_) if !supersede => {
                debug!("geocode request already in flight");
                return;
            }
            _ => {}
        }

        self.in_flight = Some((session, coordinate));
        self.state.geocode_in_flight = true;
        let events = self.events.clone();
        debug!("session {session}: reverse geocoding {coordinate}");

        self.geocoder.reverse_geocode(
            coordinate,
            GeocodeReply::new(move |result| {
                events.post(AcquisitionEvent::GeocodeComplete {
                    session,
                    coordinate,
                    result,
                });
            }),
        );
    }

    fn refuse(&mut self, err: AcquisitionError) -> StartOutcome {
        warn!("cannot start location search: {err}");
        self.halt(AcquisitionPhase::Idle);
        self.state.last_error = Some(err.clone());
        self.notify();
        StartOutcome::Failed(err)
    }

    /// Cancel the timer and stop the source. Leaves the fix in place.
    fn halt(&mut self, phase: AcquisitionPhase) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if self.state.is_searching {
            self.source.stop_updates();
            self.state.is_searching = false;
        }
        self.state.session_deadline = None;
        if self.state.phase == AcquisitionPhase::Searching {
            self.state.phase = phase;
        }
    }

    fn notify(&self) {
        self.sink.on_status_changed(&self.state);
    }
}
