//! Hourly forecast from Open-Meteo.

use crate::types::{Coordinates, HourlySeries, WeatherError, WeatherSnapshot};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const HOURLY_FIELDS: &str = "temperature_2m,weathercode";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(OPEN_METEO_URL, Duration::from_secs(10))
    }

    /// Fetch temperature and weather-code series for a position.
    pub async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", HOURLY_FIELDS),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status {
                service: "forecast",
                status: response.status().as_u16(),
            });
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::info!(
            "Fetched {} hourly slots for {}, {}",
            body.hourly.time.len(),
            coordinates.latitude,
            coordinates.longitude
        );

        Ok(WeatherSnapshot {
            coordinates,
            hourly: body.hourly,
        })
    }
}
