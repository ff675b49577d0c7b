//! Core library for the `meteodash` forecast dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and forecast clients behind small async traits
//! - The raw forecast schema and the view model derived from it
//! - Durable favorites/recents/preference slots
//! - The dashboard controller tying those together
//!
//! It is used by `meteodash-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;
pub mod store;
pub mod viewmodel;

pub use config::Config;
pub use dashboard::{Dashboard, DisplayedForecast, FetchOutcome, FetchState, SearchState, SearchStatus};
pub use error::{FetchError, StoreError, WeatherError};
pub use model::{Place, RawForecast, RecentPlace, Theme, UnitSystem};
pub use provider::{ForecastSource, Geocoder};
pub use store::Store;
pub use viewmodel::ViewModel;
