//! User-facing lookup failures.
//!
//! Each variant is exactly one status line in the widget. The transport error
//! behind it is logged where it happens and not carried further.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("no position source")]
    GeolocationUnsupported,

    #[error("position unavailable")]
    LocationUnavailable,

    #[error("no city in reverse geocoding result")]
    CityUndetected,

    #[error("detected city {0:?} not in catalog")]
    NotInCatalog(String),

    #[error("no coordinates for municipality")]
    CoordinatesNotFound,

    #[error("forecast request failed")]
    ForecastFailed,
}

impl LookupFailure {
    /// Status message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::GeolocationUnsupported => {
                "Geolocation is not supported on this device.".to_string()
            }
            Self::LocationUnavailable => {
                "Unable to detect your location. Please search manually.".to_string()
            }
            Self::CityUndetected => "Unable to detect your city. Please search manually.".to_string(),
            Self::NotInCatalog(city) => format!(
                "Detected location \"{}\" is not in the list. Please search manually.",
                city
            ),
            Self::CoordinatesNotFound => "Coordinates not found for this municipality".to_string(),
            Self::ForecastFailed => "Failed to fetch weather data".to_string(),
        }
    }
}
