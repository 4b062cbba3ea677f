//! Three-tier timeline splice.
//!
//! Upstream resolutions overlap in time (tomorrow has both an hourly and a
//! 3-hour forecast). The merge prefers the finest tier wherever it has data
//! and only falls back to a coarser tier past the last timestamp already in
//! the timeline:
//!
//! 1. hourly records with `dt >= now`
//! 2. 3-hour records with `dt > max_ts`
//! 3. daily records whose midday-shifted `dt > max_ts`
//!
//! Each tier only appends after the current maximum, so the result is
//! strictly increasing without a sort or dedup pass.

use crate::services::adapter::{
    DailyEntry, HourlyEntry, SourceRecord, ThreeHourEntry, WeatherRecord,
};

/// Weather records strictly increasing by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTimeline {
    records: Vec<WeatherRecord>,
}

impl MergedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest timestamp in the timeline, or `floor` when empty.
    pub fn max_timestamp_or(&self, floor: i64) -> i64 {
        self.records.last().map(|r| r.timestamp).unwrap_or(floor)
    }

    /// Adapt and append every record whose (adapted) timestamp is strictly
    /// after `after`. Returns how many were appended.
    fn append_after<'a, I>(&mut self, records: I, after: i64) -> usize
    where
        I: IntoIterator<Item = SourceRecord<'a>>,
    {
        let before = self.records.len();
        for source in records {
            let ts = source.timestamp();
            // Also guard against unsorted input within a tier.
            if ts > after && ts > self.max_timestamp_or(i64::MIN) {
                self.records.push(source.adapt());
            }
        }
        self.records.len() - before
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn timestamps(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.timestamp).collect()
    }
}

/// Splice the three tiers into one timeline starting at `now`.
pub fn merge_timeline(
    hourly: &[HourlyEntry],
    three_hour: &[ThreeHourEntry],
    daily: &[DailyEntry],
    now: i64,
) -> MergedTimeline {
    let mut timeline = MergedTimeline::new();

    // `now - 1` so a record stamped exactly at `now` is kept.
    let hourly_count = timeline.append_after(hourly.iter().map(SourceRecord::Hourly), now - 1);

    let max_ts = timeline.max_timestamp_or(now);
    let three_hour_count =
        timeline.append_after(three_hour.iter().map(SourceRecord::ThreeHour), max_ts);

    let max_ts = timeline.max_timestamp_or(max_ts);
    let daily_count = timeline.append_after(daily.iter().map(SourceRecord::Daily), max_ts);

    tracing::debug!(
        "Merged timeline: {} hourly + {} 3-hour + {} daily = {} records",
        hourly_count,
        three_hour_count,
        daily_count,
        timeline.len()
    );

    timeline
}
