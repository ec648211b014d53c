use anyhow::{Context, Result, anyhow};
use std::env;

/// Listening port when `PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration, sourced from the process environment exactly
/// once at startup. Business logic never reads the environment itself;
/// the key travels into the provider as a constructor argument.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// OpenWeatherMap API key.
    pub api_key: String,
    /// TCP port the HTTP server binds to.
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// A missing or blank `WEATHER_API_KEY` is fatal: the process must
    /// not serve traffic without a key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// The actual loader, written against an injectable lookup so tests
    /// never have to mutate the process environment.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = get("WEATHER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "WEATHER_API_KEY is not set.\n\
                     Hint: export WEATHER_API_KEY=<your OpenWeatherMap key> before starting."
                )
            })?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| {
                format!("PORT must be a number between 0 and 65535, got '{raw}'")
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { api_key, port })
    }
}
