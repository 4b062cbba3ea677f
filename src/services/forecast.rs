//! Daily forecast aggregation.
//!
//! Groups a merged timeline by UTC calendar date and reduces each of the
//! first `MAX_FORECAST_DAYS` days into a `DailySummary`, scoring every
//! record along the way.

use chrono::DateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::{round_1dp, round_2dp, round_int};
use crate::services::adapter::WeatherRecord;
use crate::services::scoring::ConditionsScorer;
use crate::services::timeline::MergedTimeline;

/// Number of days in the forecast strip.
pub const MAX_FORECAST_DAYS: usize = 8;

const MM_PER_INCH: f64 = 25.4;

/// Expected data density for a forecast day.
///
/// Assigned by the day's position in the strip, not by which tier actually
/// supplied its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ForecastSource {
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "3-hour")]
    ThreeHour,
    #[serde(rename = "daily")]
    Daily,
}

impl ForecastSource {
    /// Days 0–1 → hourly, 2–4 → 3-hour, 5+ → daily.
    pub fn for_day_index(index: usize) -> Self {
        match index {
            0..=1 => ForecastSource::Hourly,
            2..=4 => ForecastSource::ThreeHour,
            _ => ForecastSource::Daily,
        }
    }
}

/// One day of the forecast strip.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    /// UTC calendar date (YYYY-MM-DD)
    pub date: String,
    pub source: ForecastSource,
    /// Lowest temperature in °F (1 dp)
    pub temp_low: f64,
    /// Highest temperature in °F (1 dp)
    pub temp_high: f64,
    /// Lowest relative humidity in %
    pub humidity_low: i64,
    /// Highest relative humidity in %
    pub humidity_high: i64,
    /// Lowest Climbing Conditions Score (1 dp)
    pub ccs_low: f64,
    /// Highest Climbing Conditions Score (1 dp)
    pub ccs_high: f64,
    /// Highest chance of precipitation in % (1 dp)
    pub precip_high: f64,
    /// Lowest wind speed in mph; null when no record has wind data
    pub wind_low: Option<i64>,
    /// Highest wind speed in mph; null when no record has wind data
    pub wind_high: Option<i64>,
    /// Total rain in inches (2 dp)
    pub rain_accumulation: f64,
}

/// Format a Unix timestamp as its UTC calendar date.
pub fn utc_date(timestamp: i64) -> Result<String, AppError> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            AppError::ExternalServiceError(format!("timestamp {} out of range", timestamp))
        })
}

fn min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Reduce one day's records (non-empty) into a summary.
fn summarize_day(
    date: String,
    index: usize,
    records: &[&WeatherRecord],
    scorer: &dyn ConditionsScorer,
) -> Result<DailySummary, AppError> {
    let scores = records
        .iter()
        .map(|r| scorer.score(r.dew_point, r.humidity, r.temperature))
        .collect::<Result<Vec<f64>, _>>()?;

    let empty = || AppError::InternalError(format!("no records for {}", date));
    let (temp_low, temp_high) = min_max(records.iter().map(|r| r.temperature)).ok_or_else(empty)?;
    let (hum_low, hum_high) = min_max(records.iter().map(|r| r.humidity)).ok_or_else(empty)?;
    let (ccs_low, ccs_high) = min_max(scores).ok_or_else(empty)?;
    let (_, pop_high) = min_max(records.iter().map(|r| r.precipitation_probability * 100.0))
        .ok_or_else(empty)?;
    let wind = min_max(records.iter().filter_map(|r| r.wind_speed));
    let rain_mm: f64 = records.iter().filter_map(|r| r.rain_accumulation).sum();

    Ok(DailySummary {
        source: ForecastSource::for_day_index(index),
        temp_low: round_1dp(temp_low),
        temp_high: round_1dp(temp_high),
        humidity_low: round_int(hum_low),
        humidity_high: round_int(hum_high),
        ccs_low: round_1dp(ccs_low),
        ccs_high: round_1dp(ccs_high),
        precip_high: round_1dp(pop_high),
        wind_low: wind.map(|(lo, _)| round_int(lo)),
        wind_high: wind.map(|(_, hi)| round_int(hi)),
        rain_accumulation: round_2dp(rain_mm / MM_PER_INCH),
        date,
    })
}

/// Build the daily forecast strip from a merged timeline.
///
/// Returns at most `MAX_FORECAST_DAYS` summaries in ascending date order;
/// later dates are dropped. A scorer failure fails the whole strip.
pub fn generate_daily_forecast(
    timeline: &MergedTimeline,
    scorer: &dyn ConditionsScorer,
) -> Result<Vec<DailySummary>, AppError> {
    let mut grouped: BTreeMap<String, Vec<&WeatherRecord>> = BTreeMap::new();
    for record in timeline.records() {
        grouped
            .entry(utc_date(record.timestamp)?)
            .or_default()
            .push(record);
    }

    grouped
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .enumerate()
        .map(|(index, (date, records))| summarize_day(date, index, &records, scorer))
        .collect()
}
