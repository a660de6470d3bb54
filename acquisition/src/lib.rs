//! Location fix acquisition.
//!
//! The [`AcquisitionController`] runs one "get my location" session at a
//! time: it starts a [`PositioningSource`], keeps the most accurate reading
//! it sees, stops once a reading is good enough (or stops improving), gives
//! up after a timeout, and reverse geocodes the best fix with at most one
//! request outstanding.
//!
//! Every input is an [`AcquisitionEvent`] delivered through a single queue,
//! so the controller never runs two handlers at once:
//!
//! ```ignore
//! use std::sync::Arc;
//! use geotag_acquisition::{AcquisitionBuilder, AcquisitionState};
//!
//! let mut acquisition = AcquisitionBuilder::new(source, geocoder)
//!     .sink(Arc::new(|state: &AcquisitionState| println!("{:?}", state.phase())))
//!     .build();
//! let handle = acquisition.handle();
//!
//! handle.start();
//! let controller = acquisition.run().await;
//! ```

#![warn(missing_docs)]

mod clock;
mod config;
mod controller;
mod error;
mod event;
mod runtime;
mod state;
pub mod status;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AcquisitionConfig;
pub use controller::{
    AcquisitionController, PresentationSink, RejectReason, SampleVerdict, StartOutcome,
};
pub use error::AcquisitionError;
pub use event::{AcquisitionEvent, AcquisitionHandle};
pub use runtime::{AcquisitionBuilder, AcquisitionLoop};
pub use state::{AcquisitionPhase, AcquisitionState, SessionId};
pub use status::StatusView;
pub use timer::{ManualScheduler, Scheduler, ThreadScheduler, TimerHandle, TimerTask};

pub use geotag_geocode::{GeocodeError, GeocodeResult, GeocodingService, Placemark};
pub use geotag_location::{
    Coordinate, LocationError, LocationSample, PermissionStatus, PositioningSource,
};
