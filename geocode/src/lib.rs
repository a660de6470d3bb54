//! Reverse geocoding.
//!
//! A [`GeocodingService`] turns a coordinate into a [`Placemark`] and answers
//! exactly once through a [`GeocodeReply`]; a reply dropped unanswered
//! reports a failure. Services are fire-and-forget:
//! there is no cancellation, so callers tag each request themselves and
//! ignore answers they no longer care about.

#![warn(missing_docs)]

mod offline;
mod placemark;

use std::fmt;

pub use geotag_location::Coordinate;
pub use offline::{OfflineEntry, OfflineGeocoder};
pub use placemark::{Placemark, append_text};

/// Errors that can occur while reverse geocoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The service has no address for this coordinate.
    #[error("no address found")]
    NotFound,
    /// The service could not be reached.
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Outcome of one reverse geocoding request.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeResult {
    /// The coordinate resolved to an address.
    Resolved(Placemark),
    /// The lookup failed.
    Failed(GeocodeError),
}

impl GeocodeResult {
    /// The resolved placemark, if any.
    #[must_use]
    pub const fn placemark(&self) -> Option<&Placemark> {
        match self {
            Self::Resolved(placemark) => Some(placemark),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&GeocodeError> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    /// Returns `true` for [`GeocodeResult::Resolved`].
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<Result<Placemark, GeocodeError>> for GeocodeResult {
    fn from(result: Result<Placemark, GeocodeError>) -> Self {
        match result {
            Ok(placemark) => Self::Resolved(placemark),
            Err(err) => Self::Failed(err),
        }
    }
}

/// One-shot completion handle for a reverse geocoding request.
///
/// Consumed by [`GeocodeReply::send`], so a service can answer at most once.
/// Dropping it without an answer delivers
/// `GeocodeResult::Failed(GeocodeError::Unknown("reply dropped"))`, so the
/// requester always hears back.
pub struct GeocodeReply {
    callback: Option<Box<dyn FnOnce(GeocodeResult) + Send>>,
}

impl GeocodeReply {
    /// Wrap a completion callback.
    pub fn new(callback: impl FnOnce(GeocodeResult) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Deliver the result.
    pub fn send(mut self, result: GeocodeResult) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl Drop for GeocodeReply {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            log::debug!("geocode reply dropped unanswered");
            callback(GeocodeResult::Failed(GeocodeError::Unknown(
                "reply dropped".to_owned(),
            )));
        }
    }
}

impl fmt::Debug for GeocodeReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodeReply").finish_non_exhaustive()
    }
}

/// A reverse geocoding backend.
pub trait GeocodingService: Send + Sync {
    /// Resolve `coordinate` and answer through `reply`, possibly from another thread.
    fn reverse_geocode(&self, coordinate: Coordinate, reply: GeocodeReply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reply_delivers_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reply = GeocodeReply::new(move |result| {
            if let Ok(mut results) = sink.lock() {
                results.push(result);
            }
        });
        reply.send(GeocodeResult::Failed(GeocodeError::NotFound));

        let results = seen.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(results, vec![GeocodeResult::Failed(GeocodeError::NotFound)]);
    }

    #[test]
    fn test_dropped_reply_reports_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reply = GeocodeReply::new(move |result| {
            if let Ok(mut results) = sink.lock() {
                results.push(result);
            }
        });
        drop(reply);

        let results = seen.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(
            results,
            vec![GeocodeResult::Failed(GeocodeError::Unknown(
                "reply dropped".to_owned()
            ))]
        );
    }

    #[test]
    fn test_result_from_result() {
        let placemark = Placemark::default().locality("Cupertino");
        let resolved = GeocodeResult::from(Ok::<_, GeocodeError>(placemark.clone()));
        assert_eq!(resolved.placemark(), Some(&placemark));
        assert!(resolved.error().is_none());

        let failed = GeocodeResult::from(Err::<Placemark, _>(GeocodeError::Unavailable(
            "offline".into(),
        )));
        assert!(!failed.is_resolved());
        assert_eq!(
            failed.error().map(ToString::to_string),
            Some("geocoding service unavailable: offline".to_owned())
        );
    }
}
