use std::fmt;

use geotag_geocode::{GeocodeResult, Placemark};
use geotag_location::LocationSample;

use crate::AcquisitionError;

/// Identity of one `start()`..stop session.
///
/// Timers and geocode replies carry the session they were issued for, so
/// anything left over from an earlier session is recognisably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw counter value; `0` means no session has started.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AcquisitionPhase {
    /// Not searching: never started, stopped by the user, timed out or failed.
    #[default]
    Idle,
    /// The positioning source is running.
    Searching,
    /// The session ended with a fix (accurate enough, or converged).
    Done,
}

/// Snapshot of everything a session knows.
///
/// Only the controller changes it; everyone else gets read-only views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AcquisitionState {
    pub(crate) phase: AcquisitionPhase,
    pub(crate) session: SessionId,
    pub(crate) best_sample: Option<LocationSample>,
    pub(crate) is_searching: bool,
    pub(crate) last_error: Option<AcquisitionError>,
    pub(crate) geocode_result: Option<GeocodeResult>,
    pub(crate) geocode_in_flight: bool,
    pub(crate) session_deadline: Option<u64>,
}

impl AcquisitionState {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AcquisitionPhase {
        self.phase
    }

    /// Current (or most recent) session.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Most accurate reading accepted this session; `None` means no fix yet.
    #[must_use]
    pub const fn best_sample(&self) -> Option<&LocationSample> {
        self.best_sample.as_ref()
    }

    /// Whether the positioning source is running.
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// Last fatal problem; `None` means nothing went wrong.
    #[must_use]
    pub const fn last_error(&self) -> Option<&AcquisitionError> {
        self.last_error.as_ref()
    }

    /// Address for the best fix; `None` means not resolved (yet).
    #[must_use]
    pub const fn geocode_result(&self) -> Option<&GeocodeResult> {
        self.geocode_result.as_ref()
    }

    /// Whether a reverse geocoding request is outstanding.
    #[must_use]
    pub const fn geocode_in_flight(&self) -> bool {
        self.geocode_in_flight
    }

    /// When the running session gives up, as Unix epoch milliseconds.
    #[must_use]
    pub const fn session_deadline(&self) -> Option<u64> {
        self.session_deadline
    }

    /// The resolved address, if the last lookup succeeded.
    #[must_use]
    pub fn placemark(&self) -> Option<&Placemark> {
        self.geocode_result.as_ref().and_then(GeocodeResult::placemark)
    }

    /// The last lookup failure as an [`AcquisitionError::GeocodingFailed`].
    #[must_use]
    pub fn geocode_error(&self) -> Option<AcquisitionError> {
        self.geocode_result
            .as_ref()
            .and_then(GeocodeResult::error)
            .cloned()
            .map(AcquisitionError::GeocodingFailed)
    }

    /// Returns `true` once the session has a fix.
    #[must_use]
    pub const fn has_fix(&self) -> bool {
        self.best_sample.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotag_geocode::GeocodeError;

    #[test]
    fn test_default_is_idle_without_session() {
        let state = AcquisitionState::default();
        assert_eq!(state.phase(), AcquisitionPhase::Idle);
        assert_eq!(state.session().get(), 0);
        assert!(!state.has_fix());
        assert!(state.placemark().is_none());
    }

    #[test]
    fn test_session_ids_increase() {
        let first = SessionId::default().next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_geocode_error_view() {
        let state = AcquisitionState {
            geocode_result: Some(GeocodeResult::Failed(GeocodeError::NotFound)),
            ..AcquisitionState::default()
        };
        assert_eq!(
            state.geocode_error(),
            Some(AcquisitionError::GeocodingFailed(GeocodeError::NotFound))
        );
        assert!(state.placemark().is_none());
    }
}
