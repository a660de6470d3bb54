use async_channel::Sender;
use log::warn;

use geotag_geocode::GeocodeResult;
use geotag_location::{Coordinate, LocationDelegate, LocationError, LocationEvent, LocationSample};

use crate::SessionId;

/// Everything the controller reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    /// User asked for a new fix.
    Start,
    /// User cancelled the search.
    Stop,
    /// The "get location / stop" button.
    Toggle,
    /// A reading from the positioning source.
    Sample(LocationSample),
    /// The positioning source reported a problem.
    PositioningError(LocationError),
    /// The session timer fired.
    Timeout(SessionId),
    /// A reverse geocoding request finished.
    GeocodeComplete {
        /// Session the request was issued in.
        session: SessionId,
        /// Coordinate the request was issued for.
        coordinate: Coordinate,
        /// What the service answered.
        result: GeocodeResult,
    },
    /// Stop the session and end the event loop.
    Shutdown,
}

/// Posts events into an acquisition loop. Cheap to clone and `Send`.
///
/// Doubles as the [`LocationDelegate`] registered with the positioning
/// source, so readings from any thread end up on the loop's queue.
#[derive(Debug, Clone)]
pub struct AcquisitionHandle {
    sender: Sender<AcquisitionEvent>,
}

impl AcquisitionHandle {
    pub(crate) const fn new(sender: Sender<AcquisitionEvent>) -> Self {
        Self { sender }
    }

    /// Queue an event. Returns `false` if the loop is gone.
    pub fn post(&self, event: AcquisitionEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(err) => {
                warn!("dropping acquisition event: {err}");
                false
            }
        }
    }

    /// Queue [`AcquisitionEvent::Start`].
    pub fn start(&self) -> bool {
        self.post(AcquisitionEvent::Start)
    }

    /// Queue [`AcquisitionEvent::Stop`].
    pub fn stop(&self) -> bool {
        self.post(AcquisitionEvent::Stop)
    }

    /// Queue [`AcquisitionEvent::Toggle`].
    pub fn toggle(&self) -> bool {
        self.post(AcquisitionEvent::Toggle)
    }

    /// Queue [`AcquisitionEvent::Shutdown`].
    pub fn shutdown(&self) -> bool {
        self.post(AcquisitionEvent::Shutdown)
    }
}

impl LocationDelegate for AcquisitionHandle {
    fn on_event(&self, event: LocationEvent) {
        let event = match event {
            LocationEvent::Sample(sample) => AcquisitionEvent::Sample(sample),
            LocationEvent::Error(err) => AcquisitionEvent::PositioningError(err),
        };
        self.post(event);
    }
}
