//! Forward and reverse geocoding against Nominatim (OpenStreetMap).
//! Free, no API key required, but every request must carry a User-Agent.

use crate::types::{Coordinates, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_COUNTRY: &str = "Philippines";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("panahon/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
}

impl NominatimAddress {
    /// First non-empty of city > town > village > municipality
    fn city_like(self) -> Option<String> {
        [self.city, self.town, self.village, self.municipality]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Client for a Nominatim-compatible geocoder, scoped to one country.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    country: String,
}

impl GeocodingClient {
    pub fn new(
        base_url: &str,
        country: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
        })
    }

    /// Public Nominatim instance, Philippines, default User-Agent.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(
            NOMINATIM_URL,
            DEFAULT_COUNTRY,
            USER_AGENT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Forward geocode "{name}, {country}". `Ok(None)` when nothing matched.
    pub async fn search(&self, name: &str) -> Result<Option<Coordinates>, WeatherError> {
        let url = format!("{}/search", self.base_url);
        let query = format!("{}, {}", name, self.country);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status {
                service: "geocoding",
                status: response.status().as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let Some(first) = places.into_iter().next() else {
            tracing::debug!("No geocoding result for {:?}", query);
            return Ok(None);
        };

        let latitude = first
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|e| WeatherError::Parse(format!("lat {:?}: {}", first.lat, e)))?;
        let longitude = first
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|e| WeatherError::Parse(format!("lon {:?}: {}", first.lon, e)))?;

        tracing::info!("Geocoded {:?} to {}, {}", query, latitude, longitude);
        Ok(Some(Coordinates::new(latitude, longitude)))
    }

    /// Reverse geocode to a city-like place name. `Ok(None)` when the
    /// address has no city, town, village or municipality.
    pub async fn reverse(&self, position: Coordinates) -> Result<Option<String>, WeatherError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = position.latitude.to_string();
        let lon = position.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status {
                service: "reverse geocoding",
                status: response.status().as_u16(),
            });
        }

        let body: NominatimReverse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let place = body.address.and_then(NominatimAddress::city_like);
        match &place {
            Some(p) => tracing::info!("Reverse geocoded to: {}", p),
            None => tracing::debug!("Reverse geocode returned no city-like field"),
        }
        Ok(place)
    }
}
