//! Location resolution: municipality name to coordinates, and device
//! position to catalog entry.

use crate::catalog::{Catalog, Municipality};
use crate::error::LookupFailure;
use crate::geocode::GeocodingClient;
use crate::location::{get_current_position, PositionSource};
use crate::types::{Coordinates, LocationError};
use std::time::Duration;

/// Forward resolution. Empty results and transport errors are both "not found".
pub async fn resolve_coordinates(
    geocoder: &GeocodingClient,
    municipality: &str,
) -> Result<Coordinates, LookupFailure> {
    match geocoder.search(municipality).await {
        Ok(Some(coords)) => Ok(coords),
        Ok(None) => {
            tracing::info!("No coordinates for {:?}", municipality);
            Err(LookupFailure::CoordinatesNotFound)
        }
        Err(e) => {
            tracing::warn!("Geocoding error for {:?}: {}", municipality, e);
            Err(LookupFailure::CoordinatesNotFound)
        }
    }
}

/// Reverse resolution: device position, reverse geocode, normalized catalog match.
pub async fn detect_municipality(
    source: &PositionSource,
    timeout: Duration,
    geocoder: &GeocodingClient,
    catalog: &Catalog,
) -> Result<Municipality, LookupFailure> {
    let position = match get_current_position(source, timeout).await {
        Ok(p) => p,
        Err(LocationError::Unsupported) => return Err(LookupFailure::GeolocationUnsupported),
        Err(e) => {
            tracing::warn!("Position request failed: {}", e);
            return Err(LookupFailure::LocationUnavailable);
        }
    };

    let city = match geocoder.reverse(position).await {
        Ok(Some(city)) => city,
        Ok(None) => return Err(LookupFailure::CityUndetected),
        Err(e) => {
            tracing::warn!("Reverse geocoding failed: {}", e);
            return Err(LookupFailure::LocationUnavailable);
        }
    };

    match catalog.find_normalized(&city) {
        Some(entry) => {
            tracing::info!("Detected municipality {:?} from {:?}", entry.name, city);
            Ok(entry.clone())
        }
        None => Err(LookupFailure::NotInCatalog(city)),
    }
}
