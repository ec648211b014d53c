use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use weather_core::{WeatherError, WeatherProvider};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn WeatherProvider>,
    started: Instant,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            started: Instant::now(),
        }
    }
}

/// Success/error envelope every weather route answers with. Exactly one
/// of `data`/`error` is serialized, gated by `success`.
#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/weather", get(missing_city))
        .route("/weather/", get(missing_city))
        .route("/weather/{city}", get(current_weather))
        .route("/forecast", get(missing_city))
        .route("/forecast/", get(missing_city))
        .route("/forecast/{city}", get(forecast))
        .route("/health", get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Weather API",
        "endpoints": {
            "current": "/weather/{city} - current conditions",
            "forecast": "/forecast/{city} - next 24h forecast",
            "health": "/health - service status"
        },
        "example": "/weather/Madrid"
    }))
}

async fn current_weather(State(state): State<AppState>, Path(city): Path<String>) -> Response {
    if city.trim().is_empty() {
        return missing_city().await;
    }

    match state.provider.current_weather(&city).await {
        Ok(data) => (StatusCode::OK, Json(Envelope::ok(data))).into_response(),
        Err(err) => client_error(&err),
    }
}

async fn forecast(State(state): State<AppState>, Path(city): Path<String>) -> Response {
    if city.trim().is_empty() {
        return missing_city().await;
    }

    match state.provider.forecast(&city).await {
        Ok(data) => (StatusCode::OK, Json(Envelope::ok(data))).into_response(),
        Err(err) => client_error(&err),
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
    uptime: f64,
}

/// Liveness probe; answers without touching the provider.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

async fn missing_city() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(Envelope::<()>::err("a city name must be provided")),
    )
        .into_response()
}

/// Every provider failure maps to 400; the failure class survives only
/// in the message text.
fn client_error(err: &WeatherError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(Envelope::<()>::err(err.to_string())),
    )
        .into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::<()>::err("route not found")),
    )
        .into_response()
}
