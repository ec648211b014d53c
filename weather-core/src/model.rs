use serde::{Deserialize, Serialize};

/// Normalized current conditions for a single city.
///
/// Field names are the JSON contract: the HTTP layer serializes this
/// struct as-is into the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    /// Celsius.
    pub temperature: f64,
    /// Celsius.
    pub feels_like: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    pub description: String,
    /// Provider icon code, e.g. "01d".
    pub icon: String,
    /// Meters per second.
    pub wind_speed: f64,
}

/// Short-term forecast: up to 8 three-hour slots, chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Provider-formatted timestamp, passed through unparsed.
    pub datetime: String,
    pub temperature: f64,
    pub description: String,
}
