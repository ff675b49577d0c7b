use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A named, geocoded location. Identity is the coordinate pair held in `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Place {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        admin1: Option<String>,
        latitude: f64,
        longitude: f64,
        timezone: Option<String>,
    ) -> Self {
        Self {
            id: place_id(latitude, longitude),
            name: name.into(),
            country: country.into(),
            admin1,
            latitude,
            longitude,
            timezone,
        }
    }

    /// "Name, Region – Country", region omitted when unknown.
    pub fn label(&self) -> String {
        match self.admin1.as_deref().filter(|a| !a.is_empty()) {
            Some(admin1) => format!("{}, {} – {}", self.name, admin1, self.country),
            None => format!("{} – {}", self.name, self.country),
        }
    }

    pub fn map_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.latitude, self.longitude)
    }
}

/// Stable identity key for a coordinate pair.
pub fn place_id(latitude: f64, longitude: f64) -> String {
    format!("{latitude},{longitude}")
}

/// Favorites carry no extra data.
pub type FavoritePlace = Place;

/// A place with the time (ms since epoch) it was last successfully fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPlace {
    #[serde(flatten)]
    pub place: Place,
    pub ts: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Unit parameters the forecast service converts with.
    pub fn request_params(&self) -> [(&'static str, &'static str); 3] {
        match self {
            UnitSystem::Metric => [
                ("temperature_unit", "celsius"),
                ("wind_speed_unit", "kmh"),
                ("precipitation_unit", "mm"),
            ],
            UnitSystem::Imperial => [
                ("temperature_unit", "fahrenheit"),
                ("wind_speed_unit", "mph"),
                ("precipitation_unit", "inch"),
            ],
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported: light, dark.")),
        }
    }
}

/// Forecast payload as returned by the service.
///
/// Every measurement array is optional and every element may be `null`;
/// the view-model builder degrades per field instead of rejecting the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

/// Parallel, index-aligned hourly arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Option<Vec<Option<f64>>>,
    pub relative_humidity_2m: Option<Vec<Option<f64>>>,
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
    pub precipitation_probability: Option<Vec<Option<f64>>>,
    pub precipitation: Option<Vec<Option<f64>>>,
    pub dew_point_2m: Option<Vec<Option<f64>>>,
    pub apparent_temperature: Option<Vec<Option<f64>>>,
    pub visibility: Option<Vec<Option<f64>>>,
}

/// Parallel, index-aligned daily arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Option<Vec<Option<f64>>>,
    pub temperature_2m_min: Option<Vec<Option<f64>>>,
    pub sunrise: Option<Vec<Option<String>>>,
    pub sunset: Option<Vec<Option<String>>>,
    pub precipitation_probability_max: Option<Vec<Option<f64>>>,
    pub uv_index_max: Option<Vec<Option<f64>>>,
}

/// One hour of derived measurements. Values are in the unit system the
/// forecast was requested with; visibility is in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySample {
    pub time: String,
    pub hour: Option<u32>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind: Option<f64>,
    pub precip_prob: Option<f64>,
    pub precip: Option<f64>,
    pub dew: Option<f64>,
    pub feels: Option<f64>,
    pub visibility: Option<f64>,
    pub iso: Option<DateTime<Utc>>,
}

/// One day of derived measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySample {
    pub date: String,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub rain_max: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub uv: Option<f64>,
}
