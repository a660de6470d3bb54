use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use geotag_geocode::Placemark;
use geotag_location::{Coordinate, LocationSample};

use crate::DEFAULT_CATEGORY;

/// A location the user tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedLocation {
    /// Store-assigned id.
    pub id: u64,
    /// Where it is.
    pub coordinate: Coordinate,
    /// When it was tagged, as Unix epoch milliseconds.
    pub date: u64,
    /// Free text; may be empty.
    #[serde(default)]
    pub description: String,
    /// One of [`CATEGORIES`](crate::CATEGORIES), usually.
    pub category: String,
    /// Address at tagging time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placemark: Option<Placemark>,
    /// Photo attached to the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<u64>,
}

impl TaggedLocation {
    /// Map pin title.
    #[must_use]
    pub fn title(&self) -> &str {
        if self.description.is_empty() {
            "(No Description)"
        } else {
            &self.description
        }
    }

    /// Map pin subtitle.
    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.category
    }

    /// Second line of a list row: the address summary, or the coordinates
    /// when there is no address.
    #[must_use]
    pub fn list_address(&self) -> String {
        match &self.placemark {
            Some(placemark) => placemark.summary(),
            None => format!(
                "Lat: {:.8}, Long: {:.8}",
                self.coordinate.latitude, self.coordinate.longitude
            ),
        }
    }

    /// Whether a photo is attached.
    #[must_use]
    pub const fn has_photo(&self) -> bool {
        self.photo_id.is_some()
    }

    /// Where the attached photo lives inside `dir`.
    #[must_use]
    pub fn photo_path(&self, dir: &Path) -> Option<PathBuf> {
        self.photo_id.map(|id| dir.join(photo_file_name(id)))
    }

    /// The tagging date in local time, e.g. `Jan 1, 2024, 9:41 AM`.
    #[must_use]
    pub fn date_label(&self) -> String {
        i64::try_from(self.date)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|date| {
                date.with_timezone(&Local)
                    .format("%b %-d, %Y, %-I:%M %p")
                    .to_string()
            })
            .unwrap_or_default()
    }
}

/// File name of photo `id`: `Photo-<id>.jpg`.
#[must_use]
pub fn photo_file_name(id: u64) -> String {
    format!("Photo-{id}.jpg")
}

/// The editable part of a record, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TagDraft {
    /// Where it is.
    pub coordinate: Coordinate,
    /// Address, if one was resolved.
    pub placemark: Option<Placemark>,
    /// Tagging date, as Unix epoch milliseconds.
    pub date: u64,
    /// Free text.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Attached photo.
    pub photo_id: Option<u64>,
}

impl TagDraft {
    /// A draft for a fresh fix, dated `date` and in the default category.
    #[must_use]
    pub fn from_fix(sample: &LocationSample, placemark: Option<Placemark>, date: u64) -> Self {
        Self {
            coordinate: sample.coordinate,
            placemark,
            date,
            description: String::new(),
            category: DEFAULT_CATEGORY.to_owned(),
            photo_id: None,
        }
    }

    /// A draft for editing an existing record.
    #[must_use]
    pub fn from_record(record: &TaggedLocation) -> Self {
        Self {
            coordinate: record.coordinate,
            placemark: record.placemark.clone(),
            date: record.date,
            description: record.description.clone(),
            category: record.category.clone(),
            photo_id: record.photo_id,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category = name.into();
        self
    }

    /// Attach a photo.
    #[must_use]
    pub const fn photo(mut self, id: u64) -> Self {
        self.photo_id = Some(id);
        self
    }

    pub(crate) fn into_record(self, id: u64) -> TaggedLocation {
        TaggedLocation {
            id,
            coordinate: self.coordinate,
            date: self.date,
            description: self.description,
            category: self.category,
            placemark: self.placemark,
            photo_id: self.photo_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TagDraft {
        let sample = LocationSample::new(Coordinate::new(37.331_705_2, -122.030_237_1), 5.0, 0);
        TagDraft::from_fix(&sample, None, 1_704_067_200_000)
    }

    #[test]
    fn test_untitled_record() {
        let record = draft().into_record(1);
        assert_eq!(record.title(), "(No Description)");
        assert_eq!(record.subtitle(), DEFAULT_CATEGORY);
        assert_eq!(
            record.list_address(),
            "Lat: 37.33170520, Long: -122.03023710"
        );
    }

    #[test]
    fn test_described_record_with_address() {
        let mut draft = draft().description("Office").category("Landmark");
        draft.placemark = Some(
            Placemark::default()
                .sub_thoroughfare("1")
                .thoroughfare("Infinite Loop")
                .locality("Cupertino"),
        );
        let record = draft.into_record(2);
        assert_eq!(record.title(), "Office");
        assert_eq!(record.subtitle(), "Landmark");
        assert_eq!(record.list_address(), "1 Infinite Loop, Cupertino");
    }

    #[test]
    fn test_photo_path() {
        let record = draft().photo(7).into_record(3);
        assert!(record.has_photo());
        assert_eq!(
            record.photo_path(Path::new("/docs")),
            Some(PathBuf::from("/docs/Photo-7.jpg"))
        );
        assert_eq!(draft().into_record(4).photo_path(Path::new("/docs")), None);
    }

    #[test]
    fn test_edit_round_trips_fields() {
        let record = draft().description("Cafe").photo(1).into_record(9);
        let edited = TagDraft::from_record(&record).category("Bar").into_record(9);
        assert_eq!(edited.description, "Cafe");
        assert_eq!(edited.category, "Bar");
        assert_eq!(edited.photo_id, Some(1));
        assert_eq!(edited.date, record.date);
    }

    #[test]
    fn test_date_label_not_empty() {
        assert!(!draft().into_record(1).date_label().is_empty());
    }
}
