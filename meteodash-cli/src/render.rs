//! Human-friendly output for the dashboard view model.

use chrono::{DateTime, Local};
use meteodash_core::{
    DisplayedForecast, Place, RecentPlace, Theme, UnitSystem, ViewModel,
    format::{PLACEHOLDER, format_distance, format_percent, format_speed, format_temp},
    model::HourlySample,
    viewmodel::parse_local,
};
use std::io::IsTerminal;

const HOURS_SHOWN: usize = 12;
const OUTLOOK_DAYS: usize = 7;

pub fn unit_badge(unit: UnitSystem) -> &'static str {
    match unit {
        UnitSystem::Metric => "°C / km/h",
        UnitSystem::Imperial => "°F / mph",
    }
}

pub fn dashboard(displayed: &DisplayedForecast, is_favorite: bool, theme: Theme) {
    let style = Style::for_theme(theme);
    let unit = displayed.unit;
    let view = &displayed.view;

    let star = if is_favorite { "  ★ favorite" } else { "" };
    println!("{}{star}", style.heading(&displayed.place.label()));
    println!("Open in Maps: {}", displayed.place.map_url());
    println!();

    if let Some(current) = &view.current {
        println!(
            "Temperature  {:<10} Feels {} • Dew {}",
            format_temp(current.temp, unit),
            format_temp(current.feels, unit),
            format_temp(current.dew, unit),
        );
        println!(
            "Humidity     {:<10} Rain chance up to {}% today",
            format_percent(current.humidity),
            view.max_rain_probability.round(),
        );
        println!(
            "Wind         {:<10} Avg {}",
            format_speed(current.wind, unit),
            average_wind(view, unit),
        );
        println!(
            "Visibility   {:<10} Estimated at 2m",
            format_distance(current.visibility, unit)
        );
        println!();
    }

    if !view.hourly.is_empty() {
        println!("{}", style.heading("Next hours"));
        for hour in next_hours(view) {
            println!("  {}", hourly_row(hour, unit));
        }
        println!();
    }

    if !view.daily.is_empty() {
        println!("{}", style.heading("7-day outlook"));
        for day in view.daily.iter().take(OUTLOOK_DAYS) {
            println!(
                "  {:<12} {:>5} / {:<5}  Rain {} • UV {}  Sunrise {} • Sunset {}",
                day.date,
                format_temp(day.tmax, unit),
                format_temp(day.tmin, unit),
                format_percent(day.rain_max),
                day.uv.map_or_else(|| PLACEHOLDER.to_string(), |uv| format!("{uv:.1}")),
                clock_time(day.sunrise.as_deref()),
                clock_time(day.sunset.as_deref()),
            );
        }
    }
}

/// A calm average reads as missing, like an absent one.
fn average_wind(view: &ViewModel, unit: UnitSystem) -> String {
    format_speed(view.average_wind.filter(|w| *w != 0.0), unit)
}

/// Up to [`HOURS_SHOWN`] samples starting at the current hour.
fn next_hours(view: &ViewModel) -> &[HourlySample] {
    let start = view.current_index.unwrap_or(0).min(view.hourly.len());
    let end = (start + HOURS_SHOWN).min(view.hourly.len());
    &view.hourly[start..end]
}

fn hourly_row(hour: &HourlySample, unit: UnitSystem) -> String {
    format!(
        "{:<6} {:>6}  {:>4}  {:>8}  rain {:>4}",
        hour.time,
        format_temp(hour.temp, unit),
        format_percent(hour.humidity),
        format_speed(hour.wind, unit),
        format_percent(hour.precip_prob),
    )
}

/// Raw snapshot: place, unit, current sample, first days and hours.
pub fn snapshot_json(displayed: &DisplayedForecast) -> anyhow::Result<String> {
    let view = &displayed.view;
    let daily = &view.daily[..view.daily.len().min(3)];
    let sample_hours = &view.hourly[..view.hourly.len().min(6)];
    let snapshot = serde_json::json!({
        "place": displayed.place,
        "unit": displayed.unit,
        "current": view.current,
        "daily": daily,
        "sample_hours": sample_hours,
    });
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub fn lists(favorites: &[Place], recents: &[RecentPlace]) {
    println!("Favorites");
    if favorites.is_empty() {
        println!("  No favorites yet.");
    }
    for (i, place) in favorites.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, place.label());
    }

    println!("Recent");
    if recents.is_empty() {
        println!("  Search for a city to get started.");
    }
    for (i, recent) in recents.iter().enumerate() {
        let when = DateTime::from_timestamp_millis(recent.ts)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        println!("  {:>2}. {}  ({when})", i + 1, recent.place.label());
    }
}

fn clock_time(ts: Option<&str>) -> String {
    ts.and_then(parse_local)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

struct Style {
    color: Option<&'static str>,
}

impl Style {
    fn for_theme(theme: Theme) -> Self {
        if !std::io::stdout().is_terminal() {
            return Self { color: None };
        }
        let color = match theme {
            Theme::Light => "\x1b[1;34m",
            Theme::Dark => "\x1b[1;96m",
        };
        Self { color: Some(color) }
    }

    fn heading(&self, text: &str) -> String {
        match self.color {
            Some(color) => format!("{color}{text}\x1b[0m"),
            None => text.to_string(),
        }
    }
}
