use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::{FetchError, truncate_body},
    model::{Place, RawForecast, UnitSystem},
};

use super::{ForecastSource, Geocoder, SEARCH_RESULT_LIMIT};

pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "wind_speed_10m",
    "precipitation_probability",
    "precipitation",
    "dew_point_2m",
    "apparent_temperature",
    "visibility",
];

pub const DAILY_FIELDS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
    "precipitation_probability_max",
    "uv_index_max",
];

const USER_AGENT: &str = concat!("meteodash/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

/// Candidates missing a name or coordinates are skipped rather than failing
/// the whole search.
#[derive(Debug, Deserialize)]
struct GeoResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
}

impl GeoResult {
    fn into_place(self) -> Option<Place> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(Place::new(
            name,
            self.country.unwrap_or_default(),
            self.admin1,
            self.latitude?,
            self.longitude?,
            self.timezone,
        ))
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let count = SEARCH_RESULT_LIMIT.to_string();
        tracing::debug!(query, "geocoding request");

        let parsed: GeoResponse = get_json(
            &self.http,
            &self.base_url,
            &[
                ("name", query),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ],
        )
        .await?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(GeoResult::into_place)
            .take(SEARCH_RESULT_LIMIT)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    base_url: String,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        unit: UnitSystem,
    ) -> Result<RawForecast, FetchError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let hourly = HOURLY_FIELDS.join(",");
        let daily = DAILY_FIELDS.join(",");
        tracing::debug!(%lat, %lon, %unit, "forecast request");

        let mut params: Vec<(&str, &str)> = vec![
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("hourly", hourly.as_str()),
            ("daily", daily.as_str()),
            ("timezone", "auto"),
        ];
        params.extend(unit.request_params());

        get_json(&self.http, &self.base_url, &params).await
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<T, FetchError> {
    let res = http
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(FetchError::Network)?;

    let status = res.status();
    let body = res.text().await.map_err(FetchError::Network)?;

    if !status.is_success() {
        return Err(FetchError::Service { status, body: truncate_body(&body) });
    }

    Ok(serde_json::from_str(&body)?)
}
