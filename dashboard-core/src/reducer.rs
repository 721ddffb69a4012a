//! Down-sampling of the 3-hour forecast series to one point per day.
//!
//! A day is represented by its sample whose provider wall-clock time is
//! exactly 12:00:00. The provider emits samples at fixed UTC-aligned hours,
//! so for many locations no sample lands on noon and the result is empty.
//! That outcome is expected and callers must handle it.

use chrono::{NaiveTime, TimeZone};

use crate::model::{DailyPoint, ForecastSample};

pub const MAX_DAILY_POINTS: usize = 5;

const DATE_LABEL_FORMAT: &str = "%-m/%-d/%Y";

fn noon() -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::hours(12)
}

/// Select up to [`MAX_DAILY_POINTS`] noon samples in chronological order.
///
/// Input order is irrelevant: samples are sorted by instant first and exact
/// duplicate instants collapse into one. `tz` decides which calendar date each
/// selected instant is displayed under.
pub fn daily_points<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyPoint> {
    let mut ordered: Vec<&ForecastSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);
    ordered.dedup_by_key(|s| s.timestamp);

    ordered
        .into_iter()
        .filter(|s| s.provider_time.time() == noon())
        .take(MAX_DAILY_POINTS)
        .map(|s| {
            let date = s.timestamp.with_timezone(tz).date_naive();
            DailyPoint {
                date,
                label: date.format(DATE_LABEL_FORMAT).to_string(),
                temperature_c: s.temperature_c,
            }
        })
        .collect()
}
