//! Core library for the weather HTTP facade.
//!
//! This crate defines:
//! - Shared domain models (current conditions, forecast)
//! - The failure taxonomy every provider call is classified into
//! - Abstraction over weather providers, and the OpenWeatherMap implementation
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod error;
pub mod model;
pub mod provider;

pub use error::WeatherError;
pub use model::{CurrentWeather, Forecast, ForecastEntry};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
