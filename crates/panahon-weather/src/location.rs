//! Device position for auto-detection.
//!
//! Without a fixed position the device is located by IP address through an
//! ipapi.co compatible service (`GET {base}/json/`).

use crate::types::{Coordinates, LocationError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Position budget used when the caller does not configure one.
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    /// Set by ipapi.co on rate limits and reserved addresses
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// IP geolocation client
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    base_url: String,
}

impl IpLocator {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json/", self.base_url);
        let unavailable = |e: reqwest::Error| LocationError::Unavailable(e.to_string());

        let response = self.client.get(&url).send().await.map_err(unavailable)?;
        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "status {}",
                response.status().as_u16()
            )));
        }

        let body: IpApiResponse = response.json().await.map_err(unavailable)?;
        if body.error {
            return Err(LocationError::Unavailable(
                body.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => {
                tracing::debug!(
                    "IP position {}, {} ({})",
                    lat,
                    lon,
                    body.city.as_deref().unwrap_or("unknown city")
                );
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::Unavailable("no coordinates in response".to_string())),
        }
    }
}

/// Where the "current position" comes from.
#[derive(Debug, Clone)]
pub enum PositionSource {
    /// No positioning available on this system
    Unsupported,
    /// Position supplied by the user (CLI flags or config)
    Fixed(Coordinates),
    /// Located by public IP address
    IpLookup(IpLocator),
}

impl PositionSource {
    /// A fixed position wins over IP lookup; neither means unsupported.
    pub fn from_config(position: Option<(f64, f64)>, ip_lookup: Option<IpLocator>) -> Self {
        match (position, ip_lookup) {
            (Some((lat, lon)), _) => Self::Fixed(Coordinates::new(lat, lon)),
            (None, Some(locator)) => Self::IpLookup(locator),
            (None, None) => Self::Unsupported,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        match self {
            Self::Unsupported => Err(LocationError::Unsupported),
            Self::Fixed(coords) => Ok(*coords),
            Self::IpLookup(locator) => locator.locate().await,
        }
    }
}

/// Request the current position within `timeout`. No retry on timeout.
pub async fn get_current_position(
    source: &PositionSource,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(timeout, source.locate()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Position request exceeded {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}
