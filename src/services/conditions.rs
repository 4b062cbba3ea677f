//! Per-request conditions pipeline.
//!
//! fetch (2 concurrent calls) → parse → merge tiers → score current
//! snapshot → daily strip + chart series.
//!
//! Both upstream payloads are required. If either is missing the request
//! fails with `WeatherUnavailable`; nothing is scored from one source alone.

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::round_1dp;
use crate::services::adapter::DailyEntry;
use crate::services::destinations::Destination;
use crate::services::forecast::{generate_daily_forecast, DailySummary};
use crate::services::owm::{parse_forecast, parse_onecall, OneCallCurrent, OwmClient};
use crate::services::scoring::ConditionsScorer;
use crate::services::series::{build_graphs, Graphs};
use crate::services::timeline::{merge_timeline, MergedTimeline};

/// Current snapshot from the onecall `current` block.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentWeather {
    /// Air temperature in °F
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Dew point in °F
    pub dew_point: f64,
    /// Wind speed in mph
    pub wind_speed: Option<f64>,
    /// Wind gust in mph (0 when not reported)
    pub wind_gust: f64,
    /// Reported as the gust value, matching the existing client contract.
    pub wind_direction: f64,
}

impl From<&OneCallCurrent> for CurrentWeather {
    fn from(c: &OneCallCurrent) -> Self {
        let gust = c.wind_gust.unwrap_or(0.0);
        Self {
            temperature: c.temp,
            humidity: c.humidity,
            dew_point: c.dew_point,
            wind_speed: c.wind_speed,
            wind_gust: gust,
            // TODO: source from `wind_deg` once the frontend stops reading
            // this as a gust fallback.
            wind_direction: gust,
        }
    }
}

/// Merged upstream data for one location, before scoring.
#[derive(Debug, Clone)]
pub struct HourlyWeatherData {
    pub current: CurrentWeather,
    pub timeline: MergedTimeline,
    /// Raw onecall daily list, as received.
    pub daily: Vec<DailyEntry>,
}

/// Fully scored conditions for a destination.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Conditions {
    pub destination: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub current: CurrentWeather,
    /// Climbing Conditions Score for the current snapshot (1 dp)
    pub climbing_conditions_score: f64,
    /// Up to 8 daily summaries, ascending by date
    pub forecast: Vec<DailySummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConditionsReport {
    pub conditions: Conditions,
    pub graphs: Graphs,
}

/// Combine the two raw payloads into current conditions and a merged
/// timeline starting at `now`.
///
/// Returns `WeatherUnavailable` when either payload is missing.
pub fn assemble_weather_data(
    forecast_json: Option<&serde_json::Value>,
    onecall_json: Option<&serde_json::Value>,
    now: i64,
) -> Result<HourlyWeatherData, AppError> {
    let (Some(forecast_json), Some(onecall_json)) = (forecast_json, onecall_json) else {
        return Err(AppError::WeatherUnavailable);
    };

    let forecast = parse_forecast(forecast_json)?;
    let onecall = parse_onecall(onecall_json)?;

    let current = onecall.current.as_ref().map(CurrentWeather::from).ok_or_else(|| {
        AppError::ExternalServiceError("onecall response has no current conditions".to_string())
    })?;

    let timeline = merge_timeline(&onecall.hourly, &forecast.list, &onecall.daily, now);
    if timeline.is_empty() {
        tracing::warn!("No upstream records at or after {}", now);
    }

    Ok(HourlyWeatherData {
        current,
        timeline,
        daily: onecall.daily,
    })
}

/// Fetch and merge upstream data for a location.
pub async fn fetch_hourly_weather_data(
    client: &OwmClient,
    lat: f64,
    lon: f64,
    now: i64,
) -> Result<HourlyWeatherData, AppError> {
    let (forecast, onecall) = client.fetch_weather_data(lat, lon).await;
    assemble_weather_data(forecast.as_ref(), onecall.as_ref(), now)
}

/// Score merged weather data for a destination.
pub fn score_conditions(
    destination: &Destination,
    data: &HourlyWeatherData,
    scorer: &dyn ConditionsScorer,
) -> Result<ConditionsReport, AppError> {
    let current = &data.current;
    let score = scorer.score(current.dew_point, current.humidity, current.temperature)?;
    let forecast = generate_daily_forecast(&data.timeline, scorer)?;
    let graphs = build_graphs(&data.timeline, scorer)?;

    tracing::debug!(
        "Scored {}: current CCS {:.2}, {} timeline points, {} forecast days ({} raw daily)",
        destination.name,
        score,
        data.timeline.len(),
        forecast.len(),
        data.daily.len()
    );

    Ok(ConditionsReport {
        conditions: Conditions {
            destination: destination.name.to_string(),
            city: destination.city.to_string(),
            latitude: destination.latitude,
            longitude: destination.longitude,
            current: current.clone(),
            climbing_conditions_score: round_1dp(score),
            forecast,
        },
        graphs,
    })
}

/// Full pipeline for one destination.
pub async fn resolve_conditions(
    client: &OwmClient,
    scorer: &dyn ConditionsScorer,
    destination: &Destination,
    now: i64,
) -> Result<ConditionsReport, AppError> {
    let data =
        fetch_hourly_weather_data(client, destination.latitude, destination.longitude, now).await?;
    score_conditions(destination, &data, scorer)
}
