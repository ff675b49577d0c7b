use reqwest::StatusCode;
use thiserror::Error;

/// Why a single call to an external service did not produce a usable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request did not complete: {0}")]
    Network(#[source] reqwest::Error),

    #[error("service responded with status {status}: {body}")]
    Service { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures of the persistence backend. Never surfaced past [`crate::store`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Error kinds distinguished by the dashboard.
///
/// The `Display` text of the two network variants is the message shown to the
/// user; the underlying [`FetchError`] is kept as the source for logging only.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Couldn't search right now.")]
    SearchUnavailable(#[source] FetchError),

    #[error("Couldn't load forecast. Try again.")]
    ForecastUnavailable(#[source] FetchError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, WeatherError>;

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
