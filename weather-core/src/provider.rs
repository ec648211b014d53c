use crate::{
    error::WeatherError,
    model::{CurrentWeather, Forecast},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Abstraction over an upstream weather data source.
///
/// The server holds a `dyn WeatherProvider`, which keeps the HTTP layer
/// ignorant of the concrete upstream and lets router tests substitute a
/// canned implementation.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a free-text city name.
    ///
    /// The city is passed through as-is; existence and spelling are
    /// validated by the provider, not here.
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Forecast for roughly the next 24 hours (8 three-hour slots).
    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError>;
}
