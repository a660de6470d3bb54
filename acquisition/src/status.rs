//! Labels for a "current location" screen, derived from a state snapshot.

use crate::{AcquisitionError, AcquisitionState};

/// Address line while a lookup is outstanding.
pub const SEARCHING_ADDRESS: &str = "Searching for address...";
/// Address line after a failed lookup.
pub const ADDRESS_ERROR: &str = "Error finding address";
/// Address line when there is a fix but no lookup result.
pub const NO_ADDRESS: &str = "No address found";
/// Status when permission or the system switch blocks positioning.
pub const SERVICES_DISABLED: &str = "Location services disabled";
/// Status after a positioning failure.
pub const LOCATION_ERROR: &str = "Error getting location";
/// Status after a session ended without any fix.
pub const TIMED_OUT: &str = "Location request timed out";
/// Status while waiting for the first fix.
pub const SEARCHING: &str = "Searching...";
/// Button title while searching.
pub const STOP: &str = "Stop";
/// Button title otherwise.
pub const GET_LOCATION: &str = "Get My Location";

/// Everything the screen shows, as plain strings and flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusView {
    /// Latitude with 8 decimals, empty without a fix.
    pub latitude: String,
    /// Longitude with 8 decimals, empty without a fix.
    pub longitude: String,
    /// Address or address progress, empty without a fix.
    pub address: String,
    /// Status line, empty once there is a fix.
    pub message: String,
    /// Title of the get/stop button.
    pub button_title: &'static str,
    /// Whether an activity spinner is shown.
    pub show_spinner: bool,
    /// Whether the fix can be tagged.
    pub show_tag_button: bool,
    /// Whether the idle placeholder is shown instead of coordinates.
    pub show_logo: bool,
}

impl StatusView {
    /// Derive the view. `services_enabled` is the system-wide location
    /// switch, which the state itself does not track.
    #[must_use]
    pub fn from_state(state: &AcquisitionState, services_enabled: bool) -> Self {
        let searching = state.is_searching();
        let mut view = Self {
            button_title: if searching { STOP } else { GET_LOCATION },
            show_spinner: searching,
            ..Self::default()
        };

        if let Some(sample) = state.best_sample() {
            view.latitude = format!("{:.8}", sample.coordinate.latitude);
            view.longitude = format!("{:.8}", sample.coordinate.longitude);
            view.show_tag_button = true;
            view.address = if let Some(placemark) = state.placemark() {
                placemark.address()
            } else if state.geocode_in_flight() {
                SEARCHING_ADDRESS.to_owned()
            } else if state.geocode_error().is_some() {
                ADDRESS_ERROR.to_owned()
            } else {
                NO_ADDRESS.to_owned()
            };
            return view;
        }

        view.message = match state.last_error() {
            Some(AcquisitionError::PermissionDenied | AcquisitionError::ServicesDisabled) => {
                SERVICES_DISABLED
            }
            Some(AcquisitionError::Timeout) => TIMED_OUT,
            Some(_) => LOCATION_ERROR,
            None if !services_enabled => SERVICES_DISABLED,
            None if searching => SEARCHING,
            None => {
                view.show_logo = true;
                ""
            }
        }
        .to_owned();
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AcquisitionPhase;
    use geotag_geocode::{GeocodeError, GeocodeResult, Placemark};
    use geotag_location::{Coordinate, LocationError, LocationSample};

    fn with_fix() -> AcquisitionState {
        AcquisitionState {
            best_sample: Some(LocationSample::new(
                Coordinate::new(37.331_705_2, -122.030_237_1),
                5.0,
                0,
            )),
            phase: AcquisitionPhase::Done,
            ..AcquisitionState::default()
        }
    }

    #[test]
    fn test_idle_shows_logo() {
        let view = StatusView::from_state(&AcquisitionState::default(), true);
        assert!(view.show_logo);
        assert!(!view.show_tag_button);
        assert_eq!(view.button_title, GET_LOCATION);
        assert_eq!(view.message, "");
    }

    #[test]
    fn test_searching_without_fix() {
        let state = AcquisitionState {
            is_searching: true,
            phase: AcquisitionPhase::Searching,
            ..AcquisitionState::default()
        };
        let view = StatusView::from_state(&state, true);
        assert_eq!(view.message, SEARCHING);
        assert_eq!(view.button_title, STOP);
        assert!(view.show_spinner);
        assert!(!view.show_logo);
    }

    #[test]
    fn test_error_messages() {
        let mut state = AcquisitionState {
            last_error: Some(AcquisitionError::PermissionDenied),
            ..AcquisitionState::default()
        };
        assert_eq!(StatusView::from_state(&state, true).message, SERVICES_DISABLED);

        state.last_error = Some(AcquisitionError::Timeout);
        assert_eq!(StatusView::from_state(&state, true).message, TIMED_OUT);

        state.last_error = Some(AcquisitionError::PositioningFailed(
            LocationError::NotAvailable,
        ));
        assert_eq!(StatusView::from_state(&state, true).message, LOCATION_ERROR);

        state.last_error = None;
        assert_eq!(StatusView::from_state(&state, false).message, SERVICES_DISABLED);
    }

    #[test]
    fn test_fix_shows_coordinates_and_address_progress() {
        let mut state = with_fix();
        let view = StatusView::from_state(&state, true);
        assert_eq!(view.latitude, "37.33170520");
        assert_eq!(view.longitude, "-122.03023710");
        assert_eq!(view.address, NO_ADDRESS);
        assert!(view.show_tag_button);
        assert_eq!(view.message, "");

        state.geocode_in_flight = true;
        assert_eq!(StatusView::from_state(&state, true).address, SEARCHING_ADDRESS);

        state.geocode_in_flight = false;
        state.geocode_result = Some(GeocodeResult::Failed(GeocodeError::NotFound));
        assert_eq!(StatusView::from_state(&state, true).address, ADDRESS_ERROR);

        state.geocode_result = Some(GeocodeResult::Resolved(
            Placemark::default()
                .sub_thoroughfare("1")
                .thoroughfare("Infinite Loop")
                .locality("Cupertino"),
        ));
        assert_eq!(
            StatusView::from_state(&state, true).address,
            "1 Infinite Loop\nCupertino"
        );
    }
}
