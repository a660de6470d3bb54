//! # Geotag
//!
//! Find out where you are, what the address is, and keep it.
//!
//! Geotag is split into small crates re-exported here behind features:
//!
//! - `permission`: location authorization states.
//! - `location`: coordinates, readings and positioning sources (GeoClue2 on Linux).
//! - `geocode`: reverse geocoding and address formatting.
//! - `acquisition`: the "get my location" state machine and its event loop.
//! - `records`: tagged locations, categories and the JSON store.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! geotag = { version = "0.1", features = ["full"] }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use geotag::acquisition::{AcquisitionBuilder, AcquisitionState, StatusView};
//! use geotag::geocode::OfflineGeocoder;
//!
//! let acquisition = AcquisitionBuilder::new(geotag::location::sys::default_source(), Arc::new(OfflineGeocoder::new()))
//!     .sink(Arc::new(|state: &AcquisitionState| {
//!         println!("{:?}", StatusView::from_state(state, true));
//!     }))
//!     .build();
//! acquisition.handle().start();
//! let controller = acquisition.run().await;
//! ```

#[cfg(feature = "permission")]
pub use geotag_permission as permission;

#[cfg(feature = "location")]
pub use geotag_location as location;

#[cfg(feature = "geocode")]
pub use geotag_geocode as geocode;

#[cfg(feature = "acquisition")]
pub use geotag_acquisition as acquisition;

#[cfg(feature = "records")]
pub use geotag_records as records;
