use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use meteodash_core::{
    Config, Dashboard, FetchOutcome, Place, Theme, UnitSystem,
    config::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL, DEFAULT_TIMEOUT_SECS},
};

use crate::render;

const TIPS: &str = "\
Tips:
  - Switch between °C / km/h and °F / mph with `meteodash units`.
  - Add a city to favorites with `meteodash show <city> --favorite`.
  - `meteodash lists` shows favorites and recently viewed places.
  - The 7-day outlook summarizes highs/lows, rain risk, and UV.";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteodash", version, about = "Weather forecast dashboard", after_help = TIPS)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List places matching a name.
    Search {
        query: String,
    },

    /// Show the forecast for a place found by name.
    Show {
        /// City, state, or country.
        query: String,

        /// Take the first match instead of asking.
        #[arg(long)]
        first: bool,

        /// Toggle the place in favorites after loading it.
        #[arg(long)]
        favorite: bool,

        /// Print a raw JSON snapshot instead of the dashboard.
        #[arg(long)]
        json: bool,

        /// Switch unit system before fetching ("metric" or "imperial").
        #[arg(long)]
        units: Option<String>,
    },

    /// Show the forecast for the n-th recently viewed place (1 = most recent).
    Recent {
        index: usize,

        #[arg(long)]
        json: bool,
    },

    /// Show the forecast for the n-th favorite.
    Favorite {
        index: usize,

        #[arg(long)]
        json: bool,
    },

    /// Print favorites and recently viewed places.
    Lists,

    /// Clear favorites and recents.
    Clear,

    /// Set the unit system, or toggle it when omitted.
    Units {
        unit: Option<String>,
    },

    /// Set the color theme, or toggle it when omitted.
    Theme {
        theme: Option<String>,
    },

    /// Configure service endpoints and storage.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let dash = Dashboard::from_config(&config)?;

        match self.command {
            Command::Search { query } => {
                let places = dash.search(&query).await?;
                if places.is_empty() {
                    println!("No places found for '{query}'.");
                }
                for (i, place) in places.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, place.label());
                }
            }
            Command::Show { query, first, favorite, json, units } => {
                if let Some(units) = units {
                    let unit = UnitSystem::try_from(units.as_str())?;
                    log_unit_change(unit, &dash.set_unit_system(unit).await);
                }
                let place = pick_place(&dash, &query, first).await?;
                show(&dash, place, json).await?;
                if favorite {
                    toggle_favorite(&dash);
                }
            }
            Command::Recent { index, json } => {
                let recents = dash.recents();
                let recent = nth(&recents, index, "recent place")?;
                show(&dash, recent.place.clone(), json).await?;
            }
            Command::Favorite { index, json } => {
                let favorites = dash.favorites();
                let place = nth(&favorites, index, "favorite")?;
                show(&dash, place.clone(), json).await?;
            }
            Command::Lists => render::lists(&dash.favorites(), &dash.recents()),
            Command::Clear => {
                dash.clear_lists();
                println!("Cleared favorites and recent places.");
            }
            Command::Units { unit } => {
                let outcome = match unit {
                    Some(unit) => dash.set_unit_system(UnitSystem::try_from(unit.as_str())?).await,
                    None => dash.toggle_unit_system().await,
                };
                log_unit_change(dash.unit_system(), &outcome);
                println!("Units: {}", render::unit_badge(dash.unit_system()));
            }
            Command::Theme { theme } => {
                match theme {
                    Some(theme) => dash.set_theme(Theme::try_from(theme.as_str())?),
                    None => {
                        dash.toggle_theme();
                    }
                }
                println!("Theme: {}", dash.theme());
            }
            Command::Configure => configure(config)?,
        }

        Ok(())
    }
}

async fn pick_place(dash: &Dashboard, query: &str, first: bool) -> anyhow::Result<Place> {
    let mut places = dash.search(query).await?;

    match places.len() {
        0 => bail!("No places found for '{query}'."),
        1 => Ok(places.remove(0)),
        _ if first => Ok(places.remove(0)),
        _ => {
            let labels: Vec<String> = places.iter().map(Place::label).collect();
            let chosen = Select::new("Which place?", labels)
                .raw_prompt()
                .context("No place selected")?;
            Ok(places.remove(chosen.index))
        }
    }
}

async fn show(dash: &Dashboard, place: Place, json: bool) -> anyhow::Result<()> {
    match dash.select_place(place).await {
        FetchOutcome::Applied => {}
        FetchOutcome::Failed(err) => return Err(err.into()),
        other => bail!("Forecast was not loaded ({other:?})"),
    }

    let displayed = dash
        .displayed()
        .ok_or_else(|| anyhow!("Forecast loaded but no view is available"))?;

    if json {
        println!("{}", render::snapshot_json(&displayed)?);
    } else {
        render::dashboard(&displayed, dash.is_favorite(), dash.theme());
    }
    Ok(())
}

fn log_unit_change(unit: UnitSystem, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Failed(err) => tracing::warn!(%unit, error = %err, "refetch after unit change failed"),
        other => tracing::debug!(%unit, outcome = ?other, "unit system updated"),
    }
}

fn toggle_favorite(dash: &Dashboard) {
    match dash.toggle_favorite() {
        Some(true) => println!("Added to favorites."),
        Some(false) => println!("Removed from favorites."),
        None => {}
    }
}

fn nth<'a, T>(items: &'a [T], index: usize, what: &str) -> anyhow::Result<&'a T> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or_else(|| {
            anyhow!(
                "No {what} #{index} (have {}).\n\
                 Hint: run `meteodash lists` to see what is stored.",
                items.len()
            )
        })
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let geocoding = Text::new("Geocoding endpoint:")
        .with_default(config.geocoding_url())
        .prompt()?;
    let forecast = Text::new("Forecast endpoint:")
        .with_default(config.forecast_url())
        .prompt()?;
    let data_dir = config.data_dir()?;
    let data_dir = Text::new("Data directory:")
        .with_default(&data_dir.display().to_string())
        .prompt()?;
    let timeout = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout().as_secs())
        .prompt()?;

    config.geocoding_url = (geocoding != DEFAULT_GEOCODING_URL).then_some(geocoding);
    config.forecast_url = (forecast != DEFAULT_FORECAST_URL).then_some(forecast);
    config.data_dir = Some(data_dir.into());
    config.timeout_secs = (timeout != DEFAULT_TIMEOUT_SECS).then_some(timeout);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
