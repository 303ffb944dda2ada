//! Municipality to forecast: forward geocoding chained with the forecast call.

use crate::error::LookupFailure;
use crate::geocode::GeocodingClient;
use crate::provider::WeatherProvider;
use crate::resolver::resolve_coordinates;
use crate::types::WeatherSnapshot;

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    geocoder: GeocodingClient,
    provider: WeatherProvider,
}

impl WeatherFetcher {
    pub fn new(geocoder: GeocodingClient, provider: WeatherProvider) -> Self {
        Self { geocoder, provider }
    }

    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    /// Resolve `municipality` and fetch its forecast. The forecast service is
    /// not called when coordinates cannot be resolved.
    pub async fn fetch(&self, municipality: &str) -> Result<WeatherSnapshot, LookupFailure> {
        let coords = resolve_coordinates(&self.geocoder, municipality).await?;

        self.provider.fetch(coords).await.map_err(|e| {
            tracing::warn!("Forecast fetch for {:?} failed: {}", municipality, e);
            LookupFailure::ForecastFailed
        })
    }
}
