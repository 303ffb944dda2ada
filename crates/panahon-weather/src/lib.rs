//! Weather lookup for Panahon
//!
//! Municipality catalog, name matching, Nominatim geocoding and Open-Meteo
//! hourly forecasts.

pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod geocode;
pub mod location;
pub mod normalize;
pub mod provider;
pub mod resolver;
pub mod types;

pub use catalog::{Catalog, Municipality};
pub use error::LookupFailure;
pub use fetcher::WeatherFetcher;
pub use geocode::GeocodingClient;
pub use location::{IpLocator, PositionSource};
pub use normalize::normalize_name;
pub use provider::WeatherProvider;
pub use resolver::{detect_municipality, resolve_coordinates};
pub use types::*;
