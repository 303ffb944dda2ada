use serde::{Deserialize, Serialize};

/// Presentation category derived from a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    #[default]
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Storm,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 9] = [
        Self::Clear,
        Self::PartlyCloudy,
        Self::Overcast,
        Self::Fog,
        Self::Drizzle,
        Self::Rain,
        Self::Snow,
        Self::Showers,
        Self::Storm,
    ];

    /// Stable name used for styling ("overcast", "partly_cloudy", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly_cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Showers => "showers",
            Self::Storm => "storm",
        }
    }
}

/// Description and category for one weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeInfo {
    pub description: &'static str,
    pub category: WeatherCategory,
}

/// Returned for codes missing from the table, and when no code is available.
pub const UNKNOWN_CODE: CodeInfo = CodeInfo {
    description: "Unknown",
    category: WeatherCategory::Clear,
};

/// WMO codes understood by the widget.
/// See: https://open-meteo.com/en/docs#weathervariables
pub const WEATHER_CODES: &[(i32, CodeInfo)] = &[
    (0, info("Clear sky", WeatherCategory::Clear)),
    (1, info("Mainly clear", WeatherCategory::Clear)),
    (2, info("Partly cloudy", WeatherCategory::PartlyCloudy)),
    (3, info("Overcast", WeatherCategory::Overcast)),
    (45, info("Fog", WeatherCategory::Fog)),
    (48, info("Depositing rime fog", WeatherCategory::Fog)),
    (51, info("Light drizzle", WeatherCategory::Drizzle)),
    (53, info("Moderate drizzle", WeatherCategory::Drizzle)),
    (55, info("Dense drizzle", WeatherCategory::Drizzle)),
    (61, info("Slight rain", WeatherCategory::Rain)),
    (63, info("Moderate rain", WeatherCategory::Rain)),
    (65, info("Heavy rain", WeatherCategory::Rain)),
    (71, info("Slight snow fall", WeatherCategory::Snow)),
    (73, info("Moderate snow fall", WeatherCategory::Snow)),
    (75, info("Heavy snow fall", WeatherCategory::Snow)),
    (77, info("Snow grains", WeatherCategory::Snow)),
    (80, info("Slight rain showers", WeatherCategory::Showers)),
    (81, info("Moderate rain showers", WeatherCategory::Showers)),
    (82, info("Violent rain showers", WeatherCategory::Rain)),
    (95, info("Thunderstorm", WeatherCategory::Storm)),
    (96, info("Thunderstorm with slight hail", WeatherCategory::Storm)),
    (99, info("Thunderstorm with heavy hail", WeatherCategory::Storm)),
];

const fn info(description: &'static str, category: WeatherCategory) -> CodeInfo {
    CodeInfo {
        description,
        category,
    }
}

/// Look up a weather code. Codes outside the table are `UNKNOWN_CODE`.
pub fn describe_code(code: i32) -> CodeInfo {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN_CODE)
}

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Parallel hourly series as returned by the forecast service.
/// Hours the model has no value for arrive as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
}

impl HourlySeries {
    pub fn temperature_at(&self, hour: usize) -> Option<f64> {
        self.temperature_2m.get(hour).copied().flatten()
    }

    pub fn code_at(&self, hour: usize) -> Option<i32> {
        self.weathercode.get(hour).copied().flatten()
    }
}

/// Latest forecast for one location. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub coordinates: Coordinates,
    pub hourly: HourlySeries,
}

impl WeatherSnapshot {
    /// Weather code of the first hourly slot
    pub fn current_code(&self) -> Option<i32> {
        self.hourly.code_at(0)
    }

    /// Temperature of the first hourly slot
    pub fn current_temperature(&self) -> Option<f64> {
        self.hourly.temperature_at(0)
    }

    /// Description and category of the current conditions
    pub fn current_conditions(&self) -> CodeInfo {
        self.current_code().map(describe_code).unwrap_or(UNKNOWN_CODE)
    }
}

/// Device position errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("No position source available")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
    #[error("Position lookup failed: {0}")]
    Unavailable(String),
}

/// Geocoding/forecast transport errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {service}")]
    Status { service: &'static str, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
}
