//! Source adapter: raw OpenWeatherMap records → canonical `WeatherRecord`.
//!
//! Three upstream shapes feed the timeline:
//!
//! | Tier        | Endpoint          | Spacing | Dew point      |
//! |-------------|-------------------|---------|----------------|
//! | `Hourly`    | 3.0 `onecall`     | 1 h     | provided       |
//! | `ThreeHour` | 2.5 `forecast`    | 3 h     | derived        |
//! | `Daily`     | 3.0 `onecall`     | 24 h    | provided       |
//!
//! All optional fields are tolerated: a missing wind or rain value becomes
//! `None` and is skipped by the aggregator, never treated as an error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// "Clear sky" condition code, used when a record has no `weather` array.
pub const CLEAR_SKY_CODE: i64 = 800;

/// Daily records are stamped at 00:00 UTC; shift them to midday.
pub const DAILY_MIDDAY_SHIFT_SECS: i64 = 12 * 3600;

/// Approximate dew point (°F) from temperature (°F) and relative humidity (%).
///
/// `Td ≈ T − (100 − RH) / 5`. Reasonable above ~50% RH, not physically exact.
pub fn calculate_dew_point(temperature: f64, humidity: f64) -> f64 {
    temperature - ((100.0 - humidity) / 5.0)
}

// --- OpenWeatherMap JSON record types ---

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, ToSchema)]
pub struct WeatherCondition {
    /// OpenWeatherMap condition code (e.g. 800 = clear sky)
    pub id: i64,
}

/// Condition list with a missing or empty `weather` replaced by clear sky.
fn weather_or_clear(weather: &Option<Vec<WeatherCondition>>) -> Vec<WeatherCondition> {
    match weather {
        Some(w) if !w.is_empty() => w.clone(),
        _ => default_weather(),
    }
}

fn default_weather() -> Vec<WeatherCondition> {
    vec![WeatherCondition { id: CLEAR_SKY_CODE }]
}

/// Rain volume keyed by accumulation window (`"1h"` or `"3h"`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RainWindow {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hour: Option<f64>,
}

/// One entry of the onecall `hourly` array.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlyEntry {
    pub dt: i64,
    pub temp: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub weather: Option<Vec<WeatherCondition>>,
    pub pop: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rain: Option<RainWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreeHourMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreeHourWind {
    pub speed: Option<f64>,
}

/// One entry of the 2.5 forecast `list` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreeHourEntry {
    pub dt: i64,
    pub main: ThreeHourMain,
    pub weather: Option<Vec<WeatherCondition>>,
    pub pop: Option<f64>,
    pub wind: Option<ThreeHourWind>,
    pub rain: Option<RainWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemperature {
    /// Daytime temperature, used as the day's representative value
    pub day: f64,
}

/// One entry of the onecall `daily` array.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyEntry {
    pub dt: i64,
    pub temp: DailyTemperature,
    pub humidity: f64,
    pub dew_point: f64,
    pub weather: Option<Vec<WeatherCondition>>,
    pub pop: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Daily rain total in mm (a bare number, unlike the hourly tiers).
    pub rain: Option<f64>,
}

/// Which upstream tier a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Hourly,
    ThreeHour,
    Daily,
}

/// A raw record from any tier, ready for adaptation.
#[derive(Debug, Clone, Copy)]
pub enum SourceRecord<'a> {
    Hourly(&'a HourlyEntry),
    ThreeHour(&'a ThreeHourEntry),
    Daily(&'a DailyEntry),
}

/// Canonical per-timestamp observation, whatever tier it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Seconds since epoch (UTC)
    pub timestamp: i64,
    /// Air temperature in °F
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Dew point in °F (provided or derived)
    pub dew_point: f64,
    pub weather: Vec<WeatherCondition>,
    /// Probability of precipitation, 0..=1
    pub precipitation_probability: f64,
    pub wind_speed: Option<f64>,
    /// Rain in mm over the record's window
    pub rain_accumulation: Option<f64>,
    pub tier: SourceTier,
}

impl WeatherRecord {
    /// Primary condition code (first entry of `weather`).
    pub fn condition_code(&self) -> i64 {
        self.weather.first().map(|w| w.id).unwrap_or(CLEAR_SKY_CODE)
    }
}

impl SourceRecord<'_> {
    /// Timestamp this record will carry once adapted (daily records are shifted).
    pub fn timestamp(&self) -> i64 {
        match self {
            SourceRecord::Hourly(e) => e.dt,
            SourceRecord::ThreeHour(e) => e.dt,
            SourceRecord::Daily(e) => e.dt.saturating_add(DAILY_MIDDAY_SHIFT_SECS),
        }
    }

    pub fn adapt(&self) -> WeatherRecord {
        let timestamp = self.timestamp();
        match *self {
            SourceRecord::Hourly(e) => WeatherRecord {
                timestamp,
                temperature: e.temp,
                humidity: e.humidity,
                dew_point: e.dew_point,
                weather: weather_or_clear(&e.weather),
                precipitation_probability: e.pop.unwrap_or(0.0),
                wind_speed: e.wind_speed,
                rain_accumulation: e.rain.as_ref().and_then(|r| r.one_hour),
                tier: SourceTier::Hourly,
            },
            SourceRecord::ThreeHour(e) => WeatherRecord {
                timestamp,
                temperature: e.main.temp,
                humidity: e.main.humidity,
                dew_point: calculate_dew_point(e.main.temp, e.main.humidity),
                weather: weather_or_clear(&e.weather),
                precipitation_probability: e.pop.unwrap_or(0.0),
                wind_speed: e.wind.as_ref().and_then(|w| w.speed),
                rain_accumulation: e.rain.as_ref().and_then(|r| r.three_hour),
                tier: SourceTier::ThreeHour,
            },
            SourceRecord::Daily(e) => WeatherRecord {
                timestamp,
                temperature: e.temp.day,
                humidity: e.humidity,
                dew_point: e.dew_point,
                weather: weather_or_clear(&e.weather),
                precipitation_probability: e.pop.unwrap_or(0.0),
                wind_speed: e.wind_speed,
                rain_accumulation: e.rain,
                tier: SourceTier::Daily,
            },
        }
    }
}
