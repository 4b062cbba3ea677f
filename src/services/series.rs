//! Chart-ready series built from the merged timeline.
//!
//! One point per timeline record with the score and raw readings, plus
//! the indices where the timeline switches from hourly to 3-hour and from
//! 3-hour to daily data. Rendering is left to the client.

use chrono::DateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::round_dp;
use crate::services::adapter::{SourceTier, WeatherRecord};
use crate::services::scoring::ConditionsScorer;
use crate::services::timeline::MergedTimeline;

/// Emoji for an OpenWeatherMap condition code.
pub fn weather_icon(code: i64) -> &'static str {
    match code {
        200..=299 => "⛈️",
        300..=599 => "🌧️",
        600..=699 => "🌨️",
        700..=799 => "🌫️",
        800 => "☀️",
        801 => "🌤️",
        802..=804 => "☁️",
        _ => "❓",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesPoint {
    /// Seconds since epoch (UTC)
    pub timestamp: i64,
    /// Axis label, e.g. "Tuesday 02:00 PM" (UTC)
    pub label: String,
    /// Weather condition icon
    pub icon: String,
    /// Climbing Conditions Score (2 dp)
    pub score: f64,
    /// Temperature in °F (2 dp)
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Dew point in °F (2 dp)
    pub dew_point: f64,
    /// True when dew point has reached the air temperature
    pub condensation: bool,
    /// Chance of precipitation in %
    pub chance_of_rain: f64,
    /// Upstream tier this point came from
    pub tier: SourceTier,
}

/// Point indices where a coarser tier takes over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TierBoundaries {
    /// First point from the 3-hour tier, if any
    pub three_hour_start: Option<usize>,
    /// First point from the daily tier, if any
    pub daily_start: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Graphs {
    pub points: Vec<SeriesPoint>,
    pub tier_boundaries: TierBoundaries,
}

fn build_point(
    record: &WeatherRecord,
    scorer: &dyn ConditionsScorer,
) -> Result<SeriesPoint, AppError> {
    let score = scorer.score(record.dew_point, record.humidity, record.temperature)?;
    let label = DateTime::from_timestamp(record.timestamp, 0)
        .map(|dt| dt.format("%A %I:%M %p").to_string())
        .ok_or_else(|| {
            AppError::ExternalServiceError(format!("timestamp {} out of range", record.timestamp))
        })?;

    Ok(SeriesPoint {
        timestamp: record.timestamp,
        label,
        icon: weather_icon(record.condition_code()).to_string(),
        score: round_dp(score, 2),
        temperature: round_dp(record.temperature, 2),
        humidity: record.humidity,
        dew_point: round_dp(record.dew_point, 2),
        condensation: record.dew_point >= record.temperature,
        chance_of_rain: round_dp(record.precipitation_probability * 100.0, 0),
        tier: record.tier,
    })
}

/// Score every timeline record and collect the chart series.
pub fn build_graphs(
    timeline: &MergedTimeline,
    scorer: &dyn ConditionsScorer,
) -> Result<Graphs, AppError> {
    let records = timeline.records();
    let points = records
        .iter()
        .map(|r| build_point(r, scorer))
        .collect::<Result<Vec<_>, _>>()?;

    let first_of = |tier: SourceTier| records.iter().position(|r| r.tier == tier);
    let tier_boundaries = TierBoundaries {
        three_hour_start: first_of(SourceTier::ThreeHour),
        daily_start: first_of(SourceTier::Daily),
    };

    Ok(Graphs {
        points,
        tier_boundaries,
    })
}
