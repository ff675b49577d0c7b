//! Pure transform from a [`RawForecast`] to the series and summaries the
//! presentation layer consumes.
//!
//! Nothing here fails: a missing array, a short array or a `null` element all
//! become `None` in the affected sample field, and every source row yields
//! exactly one derived row.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use serde::Serialize;

use crate::model::{DailySample, HourlySample, RawDaily, RawForecast, RawHourly};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub timezone: String,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySample>,
    /// Hourly sample nearest to "now"; `None` when there are no hourly rows.
    pub current: Option<HourlySample>,
    /// Position of `current` within `hourly`.
    pub current_index: Option<usize>,
    /// Mean hourly wind, absent values counted as zero; `None` without hourly rows.
    pub average_wind: Option<f64>,
    pub max_rain_probability: f64,
}

impl ViewModel {
    pub fn build(raw: &RawForecast, now: DateTime<Utc>) -> Self {
        let offset = FixedOffset::east_opt(raw.utc_offset_seconds).unwrap_or(Utc.fix());

        let hourly = raw
            .hourly
            .as_ref()
            .map(|h| hourly_samples(h, offset))
            .unwrap_or_default();
        let daily = raw.daily.as_ref().map(daily_samples).unwrap_or_default();

        let current_index = nearest_index(&hourly, now);
        let current = current_index.and_then(|i| hourly.get(i)).cloned();
        let average_wind = average_wind(&hourly);
        let max_rain_probability = max_rain_probability(&hourly);

        Self {
            timezone: raw.timezone.clone(),
            hourly,
            daily,
            current,
            current_index,
            average_wind,
            max_rain_probability,
        }
    }
}

pub fn hourly_samples(raw: &RawHourly, offset: FixedOffset) -> Vec<HourlySample> {
    raw.time
        .iter()
        .enumerate()
        .map(|(i, time)| {
            let local = parse_local(time);
            HourlySample {
                time: local
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| time.clone()),
                hour: local.map(|t| t.hour()),
                temp: at(&raw.temperature_2m, i),
                humidity: at(&raw.relative_humidity_2m, i),
                wind: at(&raw.wind_speed_10m, i),
                precip_prob: at(&raw.precipitation_probability, i),
                precip: at(&raw.precipitation, i),
                dew: at(&raw.dew_point_2m, i),
                feels: at(&raw.apparent_temperature, i),
                visibility: at(&raw.visibility, i).map(|m| m / 1000.0),
                iso: local.and_then(|t| to_utc(t, offset)),
            }
        })
        .collect()
}

pub fn daily_samples(raw: &RawDaily) -> Vec<DailySample> {
    raw.time
        .iter()
        .enumerate()
        .map(|(i, day)| DailySample {
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(|d| d.format("%a, %b %-d").to_string())
                .unwrap_or_else(|_| day.clone()),
            tmin: at(&raw.temperature_2m_min, i),
            tmax: at(&raw.temperature_2m_max, i),
            rain_max: at(&raw.precipitation_probability_max, i),
            sunrise: at_str(&raw.sunrise, i),
            sunset: at_str(&raw.sunset, i),
            uv: at(&raw.uv_index_max, i),
        })
        .collect()
}

/// Index of the sample closest to `now`; the lowest index wins ties.
///
/// Rows without a usable timestamp are never preferred, but if no row has one
/// the first row is returned.
pub fn nearest_index(hourly: &[HourlySample], now: DateTime<Utc>) -> Option<usize> {
    if hourly.is_empty() {
        return None;
    }

    let mut best: Option<(usize, i64)> = None;
    for (i, sample) in hourly.iter().enumerate() {
        let Some(iso) = sample.iso else { continue };
        let diff = (iso - now).num_milliseconds().abs();
        if best.is_none_or(|(_, best_diff)| diff < best_diff) {
            best = Some((i, diff));
        }
    }

    Some(best.map_or(0, |(i, _)| i))
}

pub fn average_wind(hourly: &[HourlySample]) -> Option<f64> {
    if hourly.is_empty() {
        return None;
    }
    let total: f64 = hourly.iter().map(|h| h.wind.unwrap_or(0.0)).sum();
    Some(total / hourly.len() as f64)
}

pub fn max_rain_probability(hourly: &[HourlySample]) -> f64 {
    hourly
        .iter()
        .filter_map(|h| h.precip_prob)
        .fold(0.0, f64::max)
}

fn at(series: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    series.as_ref()?.get(i).copied().flatten()
}

fn at_str(series: &Option<Vec<Option<String>>>, i: usize) -> Option<String> {
    series.as_ref()?.get(i).cloned().flatten()
}

/// Parse a service-local timestamp such as `2024-05-01T13:00`.
pub fn parse_local(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    local
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
