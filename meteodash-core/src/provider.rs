use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::FetchError,
    model::{Place, RawForecast, UnitSystem},
    provider::open_meteo::{OpenMeteoForecast, OpenMeteoGeocoder},
};

pub mod open_meteo;

/// Maximum number of candidates requested from the geocoding service.
pub const SEARCH_RESULT_LIMIT: usize = 8;

/// Resolves free text to candidate places, in the service's relevance order.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError>;
}

/// Fetches raw hourly and daily series for a coordinate pair.
///
/// Unit conversion happens on the service side; implementations pass the
/// unit system through as request parameters.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        unit: UnitSystem,
    ) -> Result<RawForecast, FetchError>;
}

/// Construct both clients from config.
pub fn clients_from_config(
    config: &Config,
) -> anyhow::Result<(OpenMeteoGeocoder, OpenMeteoForecast)> {
    let http = open_meteo::http_client(config.timeout())?;
    let geocoder = OpenMeteoGeocoder::with_client(http.clone(), config.geocoding_url());
    let forecast = OpenMeteoForecast::with_client(http, config.forecast_url());
    Ok((geocoder, forecast))
}
