use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (also holds the TUI log file)
    pub config_dir: PathBuf,

    /// Forward/reverse geocoding service
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Hourly forecast service
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Device position used for auto-detection
    #[serde(default)]
    pub location: LocationConfig,

    /// Municipality catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible service
    pub base_url: String,

    /// Country appended to every forward lookup ("{name}, {country}")
    pub country: String,

    /// User-Agent sent with every request (required by the Nominatim usage policy)
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country: "Philippines".to_string(),
            user_agent: concat!("panahon/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Base URL of an Open-Meteo compatible service
    pub base_url: String,

    /// Number of hourly slots shown in the forecast grid
    #[serde(default = "default_hourly_slots")]
    pub hourly_slots: usize,
}

fn default_hourly_slots() -> usize {
    8
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com".to_string(),
            hourly_slots: default_hourly_slots(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude reported as the device position (unset: no position source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude reported as the device position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Position request budget in seconds
    #[serde(default = "default_location_timeout")]
    pub timeout_secs: u64,

    /// Locate the device by IP address when no fixed position is set
    #[serde(default = "default_ip_lookup")]
    pub ip_lookup: bool,

    /// Base URL of an ipapi.co compatible service
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,
}

fn default_ip_lookup() -> bool {
    true
}

fn default_ip_lookup_url() -> String {
    "https://ipapi.co".to_string()
}

fn default_location_timeout() -> u64 {
    10
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_secs: default_location_timeout(),
            ip_lookup: default_ip_lookup(),
            ip_lookup_url: default_ip_lookup_url(),
        }
    }
}

impl LocationConfig {
    /// The configured device position, if both coordinates are set.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Override for the bundled municipality CSV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("panahon");

        Self {
            config_dir,
            geocoding: GeocodingConfig::default(),
            forecast: ForecastConfig::default(),
            location: LocationConfig::default(),
            catalog: CatalogConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        self.validate_url(&self.forecast.base_url, "forecast.base_url", &mut result);
        if self.location.ip_lookup {
            self.validate_url(&self.location.ip_lookup_url, "location.ip_lookup_url", &mut result);
        }

        if self.geocoding.country.trim().is_empty() {
            result.add_error("geocoding.country", "Country must not be empty");
        }

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error(
                "geocoding.user_agent",
                "A User-Agent is required by the geocoding usage policy",
            );
        }

        if self.forecast.hourly_slots == 0 {
            result.add_warning("forecast.hourly_slots", "Hourly forecast grid disabled (0 slots)");
        } else if self.forecast.hourly_slots > 48 {
            result.add_warning(
                "forecast.hourly_slots",
                "More than 48 hourly slots will not fit on most terminals",
            );
        }

        if self.http.request_timeout_secs == 0 {
            result.add_error("http.request_timeout_secs", "Request timeout must be greater than 0");
        }

        if self.location.timeout_secs == 0 {
            result.add_error("location.timeout_secs", "Position timeout must be greater than 0");
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", format!("Latitude out of range: {}", lat));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "location.longitude",
                        format!("Longitude out of range: {}", lon),
                    );
                }
            }
            (None, None) => {}
            _ => {
                result.add_warning(
                    "location",
                    "Only one of latitude/longitude is set - fixed position ignored",
                );
            }
        }

        if let Some(path) = &self.catalog.path {
            if !path.is_file() {
                result.add_warning(
                    "catalog.path",
                    format!("File not found, using bundled catalog: {}", path.display()),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the log file written while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.config_dir.join("panahon.log")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("panahon");

        Ok(config_dir.join("config.toml"))
    }
}
