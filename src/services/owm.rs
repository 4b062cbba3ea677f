//! OpenWeatherMap client.
//!
//! Two endpoints feed the pipeline:
//! - 2.5 `forecast`: 5 days of 3-hour buckets (`list`)
//! - 3.0 `onecall`: `current`, 48 h of `hourly`, 8 days of `daily`
//!
//! See: https://openweathermap.org/api/one-call-3 and
//! https://openweathermap.org/forecast5

use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::services::adapter::{DailyEntry, HourlyEntry, ThreeHourEntry};

const FORECAST_PATH: &str = "/data/2.5/forecast";
const ONECALL_PATH: &str = "/data/3.0/onecall";
const UNITS: &str = "imperial";
const ONECALL_EXCLUDE: &str = "minutely,alerts";

/// Client for the OpenWeatherMap forecast and onecall APIs.
#[derive(Debug, Clone)]
pub struct OwmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// --- OpenWeatherMap JSON response types ---

/// 2.5 `forecast` response.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ThreeHourEntry>,
}

/// 3.0 `onecall` response.
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub current: Option<OneCallCurrent>,
    #[serde(default)]
    pub hourly: Vec<HourlyEntry>,
    #[serde(default)]
    pub daily: Vec<DailyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallCurrent {
    pub temp: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
}

impl OwmClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// GET one endpoint; any failure is logged and becomes `None`.
    async fn get_json(
        &self,
        path: &str,
        extra: &[(&str, &str)],
        lat: f64,
        lon: f64,
    ) -> Option<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let lat_str = format!("{:.4}", lat);
        let lon_str = format!("{:.4}", lon);

        let mut query: Vec<(&str, &str)> = vec![
            ("lat", lat_str.as_str()),
            ("lon", lon_str.as_str()),
            ("appid", self.api_key.as_str()),
            ("units", UNITS),
        ];
        query.extend_from_slice(extra);

        let response = match self.client.get(&url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("openweathermap request to {} failed: {}", path, e);
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(
                "openweathermap {} returned HTTP {}",
                path,
                response.status()
            );
            return None;
        }

        match response.json::<serde_json::Value>().await {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!("openweathermap {} JSON parse error: {}", path, e);
                None
            }
        }
    }

    /// Fetch both payloads concurrently for a location.
    ///
    /// Returns `(forecast_2_5, onecall_3_0)`. Each side is `None` on any
    /// failure independently of the other; no retries.
    pub async fn fetch_weather_data(
        &self,
        lat: f64,
        lon: f64,
    ) -> (Option<serde_json::Value>, Option<serde_json::Value>) {
        let forecast = self.get_json(FORECAST_PATH, &[], lat, lon);
        let onecall = self.get_json(ONECALL_PATH, &[("exclude", ONECALL_EXCLUDE)], lat, lon);
        let (forecast, onecall) = futures::future::join(forecast, onecall).await;

        if forecast.is_none() {
            tracing::warn!("[v2.5] Error fetching forecast data");
        }
        if onecall.is_none() {
            tracing::warn!("[v3.0] Error fetching onecall data");
        }

        (forecast, onecall)
    }
}

/// Deserialize a raw 2.5 `forecast` payload.
pub fn parse_forecast(raw_json: &serde_json::Value) -> Result<ForecastResponse, AppError> {
    ForecastResponse::deserialize(raw_json).map_err(|e| {
        AppError::ExternalServiceError(format!("forecast response structure error: {}", e))
    })
}

/// Deserialize a raw 3.0 `onecall` payload.
pub fn parse_onecall(raw_json: &serde_json::Value) -> Result<OneCallResponse, AppError> {
    OneCallResponse::deserialize(raw_json).map_err(|e| {
        AppError::ExternalServiceError(format!("onecall response structure error: {}", e))
    })
}
