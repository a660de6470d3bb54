//! Tagged locations.
//!
//! A [`TaggedLocation`] is a fix the user decided to keep, with a
//! description, a category, the resolved address and optionally a photo.
//! Records live in a [`RecordStore`]; [`JsonFileStore`] keeps them in a JSON
//! document next to the photos, [`MemoryStore`] keeps them in memory.

#![warn(missing_docs)]

mod category;
mod record;
mod region;
mod sections;
mod store;

use std::path::PathBuf;

pub use category::{CATEGORIES, DEFAULT_CATEGORY, is_known_category};
pub use record::{TagDraft, TaggedLocation, photo_file_name};
pub use region::{MapRegion, region_for};
pub use sections::{Section, sections_by_category};
pub use store::{JsonFileStore, MemoryStore, RecordStore};

pub use geotag_geocode::Placemark;
pub use geotag_location::Coordinate;

/// Errors that can occur while loading or saving records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("no record with id {0}")]
    NotFound(u64),
    /// The platform has no documents directory.
    #[error("documents directory not available")]
    NoDocumentsDir,
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The store document is not valid JSON.
    #[error("invalid store document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Directory holding the store document and photos:
/// `<documents>/Geotag`.
#[must_use]
pub fn documents_dir() -> Option<PathBuf> {
    dirs::document_dir().map(|dir| dir.join("Geotag"))
}
