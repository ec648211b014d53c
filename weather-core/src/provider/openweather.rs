use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{CurrentWeather, Forecast, ForecastEntry},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Language the provider renders condition descriptions in.
const LANG: &str = "es";

/// 8 three-hour slots, roughly the next 24 hours.
const FORECAST_ENTRIES: usize = 8;

/// OpenWeatherMap client.
///
/// Stateless apart from the key: each call issues exactly one GET and
/// classifies its outcome. No retries, no caching, no per-call timeout
/// beyond the shared client default.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host. Tests use this to run
    /// against a local mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// One GET against `<base>/<endpoint>`, decoded into `T` on success.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, city, "querying OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", LANG),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::Internal(format!("failed to read OpenWeather response body: {e}"))
        })?;

        if !status.is_success() {
            let message = upstream_message(&body);
            warn!(endpoint, %status, message, "OpenWeather rejected the request");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Internal(format!("failed to parse OpenWeather JSON: {e}")))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city).await?;

        let (description, icon) = primary_condition(&parsed.weather);

        Ok(CurrentWeather {
            city: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            description,
            icon,
            wind_speed: parsed.wind.speed,
        })
    }

    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", city).await?;

        let forecast = parsed
            .list
            .into_iter()
            .take(FORECAST_ENTRIES)
            .map(|entry| {
                let (description, _) = primary_condition(&entry.weather);
                ForecastEntry {
                    datetime: entry.dt_txt,
                    temperature: entry.main.temp,
                    description,
                }
            })
            .collect();

        Ok(Forecast {
            city: parsed.city.name,
            country: parsed.city.country,
            forecast,
        })
    }
}

/// A failed send is either a request we never managed to build, or a
/// request that produced no response. The former is a local bug, the
/// latter is the connectivity bucket.
fn classify_transport(err: reqwest::Error) -> WeatherError {
    if err.is_builder() {
        WeatherError::Internal(err.to_string())
    } else {
        WeatherError::Connection(err)
    }
}

fn primary_condition(conditions: &[OwWeather]) -> (String, String) {
    conditions
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

/// Error bodies look like `{"cod":"404","message":"city not found"}`;
/// anything else falls back to the raw body, truncated.
fn upstream_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwError {
        message: String,
    }

    match serde_json::from_str::<OwError>(body) {
        Ok(err) => err.message,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::with_base_url("test-key".to_string(), server.uri())
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Madrid",
            "sys": { "country": "ES" },
            "main": { "temp": 20.0, "feels_like": 19.0, "humidity": 60 },
            "weather": [{ "description": "clear sky", "icon": "01d" }],
            "wind": { "speed": 3.5 }
        })
    }

    #[tokio::test]
    async fn maps_current_weather_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Madrid"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "es"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let weather = provider_for(&server)
            .current_weather("Madrid")
            .await
            .expect("mapping should succeed");

        assert_eq!(weather.city, "Madrid");
        assert_eq!(weather.country, "ES");
        assert_eq!(weather.temperature, 20.0);
        assert_eq!(weather.feels_like, 19.0);
        assert_eq!(weather.humidity, 60);
        assert_eq!(weather.description, "clear sky");
        assert_eq!(weather.icon, "01d");
        assert_eq!(weather.wind_speed, 3.5);
    }

    #[tokio::test]
    async fn upstream_error_embeds_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_weather("Nowhereville")
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { status: 404, .. }));
        assert_eq!(err.to_string(), "Error 404: city not found");
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = provider_for(&server).current_weather("Madrid").await.unwrap_err();

        assert_eq!(err.to_string(), "Error 500: upstream exploded");
    }

    #[tokio::test]
    async fn connection_failure_uses_fixed_message() {
        // Take the mock server's address, then shut it down so the port
        // refuses connections.
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let provider = OpenWeatherProvider::with_base_url("test-key".to_string(), uri);
        let err = provider.current_weather("Madrid").await.unwrap_err();

        assert!(matches!(err, WeatherError::Connection(_)));
        assert_eq!(err.to_string(), "could not connect to the weather API");
    }

    #[tokio::test]
    async fn missing_condition_degrades_to_unknown() {
        let server = MockServer::start().await;

        let mut body = current_body();
        body["weather"] = serde_json::json!([]);

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let weather = provider_for(&server)
            .current_weather("Madrid")
            .await
            .expect("empty condition list is not an error");

        assert_eq!(weather.description, "Unknown");
        assert_eq!(weather.icon, "");
    }

    #[tokio::test]
    async fn forecast_truncates_to_eight_entries_in_order() {
        let server = MockServer::start().await;

        let list: Vec<serde_json::Value> = (0..40)
            .map(|i| {
                serde_json::json!({
                    "dt_txt": format!("2026-08-{:02} {:02}:00:00", 7 + i / 8, (i % 8) * 3),
                    "main": { "temp": 15.0 + i as f64, "feels_like": 14.0, "humidity": 70 },
                    "weather": [{ "description": "light rain", "icon": "10d" }]
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "Lima"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": { "name": "Lima", "country": "PE" },
                "list": list
            })))
            .mount(&server)
            .await;

        let forecast = provider_for(&server)
            .forecast("Lima")
            .await
            .expect("forecast should map");

        assert_eq!(forecast.city, "Lima");
        assert_eq!(forecast.country, "PE");
        assert_eq!(forecast.forecast.len(), 8);
        for (i, entry) in forecast.forecast.iter().enumerate() {
            assert_eq!(entry.temperature, 15.0 + i as f64);
            assert_eq!(entry.datetime, format!("2026-08-07 {:02}:00:00", i * 3));
        }
    }

    #[tokio::test]
    async fn forecast_upstream_error_gets_same_classification() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).forecast("Lima").await.unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { status: 401, .. }));
        assert_eq!(err.to_string(), "Error 401: Invalid API key");
    }
}
