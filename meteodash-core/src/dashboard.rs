//! Application controller: reacts to place selection, unit changes and list
//! edits, sequences calls to the clients and the store, and exposes the
//! resulting view model.
//!
//! Methods take `&self` and never hold the session lock across an await, so a
//! new selection may be issued while an earlier fetch is still in flight. Each
//! fetch carries a token; a completion whose token has been superseded is
//! dropped without touching the view, the fetch state or the recents list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Config,
    debounce::{Debouncer, SEARCH_DEBOUNCE},
    error::{FetchError, WeatherError},
    model::{FavoritePlace, Place, RawForecast, RecentPlace, Theme, UnitSystem},
    provider::{ForecastSource, Geocoder, clients_from_config},
    store::{FileBackend, Persisted, Store, keys},
    viewmodel::ViewModel,
};

/// Most-recently-used places kept in the recents list.
pub const RECENTS_LIMIT: usize = 8;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Result of one refresh attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// No place selected; nothing was requested.
    Skipped,
    Applied,
    /// A newer request was issued before this one completed; its result was dropped.
    Superseded,
    Failed(WeatherError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

/// The last successfully fetched forecast and what it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayedForecast {
    pub place: Place,
    pub unit: UnitSystem,
    pub fetched_at: DateTime<Utc>,
    pub view: ViewModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Place>,
    pub status: SearchStatus,
}

#[derive(Debug, Default)]
struct Session {
    selected: Option<Place>,
    fetch_state: FetchState,
    error: Option<String>,
    displayed: Option<DisplayedForecast>,
    fetch_token: u64,
    search: SearchState,
    search_token: u64,
}

/// Issued when a fetch starts; checked again when it completes.
#[derive(Debug, Clone)]
struct Ticket {
    token: u64,
    place: Place,
    unit: UnitSystem,
}

pub struct Dashboard {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastSource>,
    clock: Arc<dyn Clock>,
    favorites: Persisted<Vec<FavoritePlace>>,
    recents: Persisted<Vec<RecentPlace>>,
    theme: Persisted<Theme>,
    unit: Persisted<UnitSystem>,
    session: Mutex<Session>,
    search_debounce: Mutex<Debouncer>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("geocoder", &self.geocoder)
            .field("forecast", &self.forecast)
            .field("unit", &self.unit.get())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(geocoder: Arc<dyn Geocoder>, forecast: Arc<dyn ForecastSource>, store: Store) -> Self {
        Self::with_clock(geocoder, forecast, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastSource>,
        store: Store,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            clock,
            favorites: Persisted::load(store.clone(), keys::FAVORITES, Vec::new()),
            recents: Persisted::load(store.clone(), keys::RECENTS, Vec::new()),
            theme: Persisted::load(store.clone(), keys::THEME, Theme::default()),
            unit: Persisted::load(store, keys::UNIT, UnitSystem::default()),
            session: Mutex::new(Session::default()),
            search_debounce: Mutex::new(Debouncer::new(SEARCH_DEBOUNCE)),
        }
    }

    /// Open-Meteo clients and a file-backed store, as described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (geocoder, forecast) = clients_from_config(config)?;
        let store = Store::new(Arc::new(FileBackend::new(config.data_dir()?)));
        Ok(Self::new(Arc::new(geocoder), Arc::new(forecast), store))
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit.get()
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn favorites(&self) -> Vec<FavoritePlace> {
        self.favorites.get()
    }

    pub fn recents(&self) -> Vec<RecentPlace> {
        self.recents.get()
    }

    pub fn selected_place(&self) -> Option<Place> {
        self.session().selected.clone()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.session().fetch_state
    }

    /// User-facing message for the last failed fetch, cleared when a new one starts.
    pub fn error_message(&self) -> Option<String> {
        self.session().error.clone()
    }

    /// Last successful forecast. Kept through later failures.
    pub fn displayed(&self) -> Option<DisplayedForecast> {
        self.session().displayed.clone()
    }

    pub fn view_model(&self) -> Option<ViewModel> {
        self.session().displayed.as_ref().map(|d| d.view.clone())
    }

    pub fn search_state(&self) -> SearchState {
        self.session().search.clone()
    }

    pub fn is_favorite(&self) -> bool {
        let Some(place) = self.selected_place() else { return false };
        self.favorites.with(|favs| favs.iter().any(|f| f.id == place.id))
    }

    /// Select a place and fetch its forecast, even if it is already selected.
    pub async fn select_place(&self, place: Place) -> FetchOutcome {
        tracing::debug!(place = %place.id, "place selected");
        self.session().selected = Some(place);
        self.refresh().await
    }

    /// Re-fetch the selected place with the current unit system.
    pub async fn refresh(&self) -> FetchOutcome {
        let Some(ticket) = self.begin_fetch() else {
            return FetchOutcome::Skipped;
        };

        let result = self
            .forecast
            .fetch(ticket.place.latitude, ticket.place.longitude, ticket.unit)
            .await;

        self.complete_fetch(ticket, result)
    }

    /// Changing units re-fetches the selected place; setting the current unit is a no-op.
    pub async fn set_unit_system(&self, unit: UnitSystem) -> FetchOutcome {
        if self.unit.get() == unit {
            return FetchOutcome::Skipped;
        }
        self.unit.set(unit);
        self.refresh().await
    }

    pub async fn toggle_unit_system(&self) -> FetchOutcome {
        self.set_unit_system(self.unit.get().toggled()).await
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme.get().toggled();
        self.theme.set(next);
        next
    }

    /// Add or remove the selected place from favorites.
    ///
    /// Returns whether the place is a favorite afterwards, or `None` if nothing is selected.
    pub fn toggle_favorite(&self) -> Option<bool> {
        let place = self.selected_place()?;
        let mut now_favorite = false;
        self.favorites.update(|favs| now_favorite = toggle_favorite(favs, place));
        Some(now_favorite)
    }

    pub fn clear_lists(&self) {
        self.favorites.set(Vec::new());
        self.recents.set(Vec::new());
    }

    /// Run a geocoding search right away. Blank queries return no results
    /// without contacting the service.
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.geocoder.search(query).await.map_err(|err| {
            tracing::warn!(query, error = %err, "geocoding failed");
            WeatherError::SearchUnavailable(err)
        })
    }

    /// Feed the latest search-box text. The search runs once the text has been
    /// stable for [`SEARCH_DEBOUNCE`]; each call restarts the wait.
    pub fn query_changed(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        let query = text.trim().to_string();

        {
            let mut session = self.session();
            session.search.query = text;
            if query.is_empty() {
                session.search.results.clear();
                session.search.status = SearchStatus::Idle;
            }
        }

        let mut debounce = self
            .search_debounce
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if query.is_empty() {
            debounce.cancel();
            return;
        }

        let this = Arc::clone(self);
        debounce.schedule(async move { this.run_search(query).await });
    }

    async fn run_search(&self, query: String) {
        let token = {
            let mut session = self.session();
            session.search_token += 1;
            session.search.status = SearchStatus::Searching;
            session.search_token
        };

        let result = self.search(&query).await;

        let mut session = self.session();
        if session.search_token != token {
            tracing::debug!(query, "discarding superseded search results");
            return;
        }
        match result {
            Ok(results) => {
                session.search.results = results;
                session.search.status = SearchStatus::Idle;
            }
            Err(err) => session.search.status = SearchStatus::Failed(err.to_string()),
        }
    }

    fn begin_fetch(&self) -> Option<Ticket> {
        let mut session = self.session();
        let Some(place) = session.selected.clone() else {
            session.fetch_state = FetchState::Idle;
            return None;
        };

        session.fetch_token += 1;
        session.fetch_state = FetchState::Loading;
        session.error = None;

        Some(Ticket { token: session.fetch_token, place, unit: self.unit.get() })
    }

    fn complete_fetch(&self, ticket: Ticket, result: Result<RawForecast, FetchError>) -> FetchOutcome {
        let now = self.clock.now();
        {
            let mut session = self.session();
            if session.fetch_token != ticket.token {
                tracing::debug!(
                    place = %ticket.place.id,
                    token = ticket.token,
                    latest = session.fetch_token,
                    "discarding superseded forecast"
                );
                return FetchOutcome::Superseded;
            }

            match result {
                Ok(raw) => {
                    tracing::info!(place = %ticket.place.id, unit = %ticket.unit, "forecast loaded");
                    session.displayed = Some(DisplayedForecast {
                        view: ViewModel::build(&raw, now),
                        place: ticket.place.clone(),
                        unit: ticket.unit,
                        fetched_at: now,
                    });
                    session.fetch_state = FetchState::Ready;
                }
                Err(err) => {
                    tracing::warn!(place = %ticket.place.id, error = %err, "forecast fetch failed");
                    let err = WeatherError::ForecastUnavailable(err);
                    session.fetch_state = FetchState::Error;
                    session.error = Some(err.to_string());
                    return FetchOutcome::Failed(err);
                }
            }
        }

        let ts = now.timestamp_millis();
        self.recents.update(|recents| upsert_recent(recents, ticket.place, ts));
        FetchOutcome::Applied
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Move `place` to the front of `recents` with timestamp `ts`, keeping at most
/// [`RECENTS_LIMIT`] entries.
pub fn upsert_recent(recents: &mut Vec<RecentPlace>, place: Place, ts: i64) {
    recents.retain(|r| r.place.id != place.id);
    recents.insert(0, RecentPlace { place, ts });
    recents.truncate(RECENTS_LIMIT);
}

/// Remove `place` if present, otherwise append it. Returns whether it is now present.
pub fn toggle_favorite(favorites: &mut Vec<FavoritePlace>, place: Place) -> bool {
    match favorites.iter().position(|f| f.id == place.id) {
        Some(idx) => {
            favorites.remove(idx);
            false
        }
        None => {
            favorites.push(place);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{RawDaily, RawHourly},
        store::{MemoryBackend, StorageBackend},
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use reqwest::StatusCode;
    use std::collections::{HashMap, VecDeque};
    use tokio::sync::oneshot;

    #[derive(Debug)]
    struct StepClock(Mutex<DateTime<Utc>>);

    impl StepClock {
        fn starting_at(t: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(t)))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    type Reply = Result<RawForecast, FetchError>;

    /// Replies from a queue, or waits on a gate registered for the place id.
    #[derive(Debug, Default)]
    struct FakeForecast {
        calls: Mutex<Vec<(String, UnitSystem)>>,
        replies: Mutex<VecDeque<Reply>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl FakeForecast {
        fn reply(&self, reply: Reply) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn gate(&self, place: &Place) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(place.id.clone(), rx);
            tx
        }

        fn calls(&self) -> Vec<(String, UnitSystem)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastSource for FakeForecast {
        async fn fetch(&self, latitude: f64, longitude: f64, unit: UnitSystem) -> Reply {
            let id = crate::model::place_id(latitude, longitude);
            self.calls.lock().unwrap().push((id.clone(), unit));

            let gate = self.gates.lock().unwrap().remove(&id);
            if let Some(rx) = gate {
                return rx.await.unwrap_or_else(|_| Err(service_error()));
            }
            let queued = self.replies.lock().unwrap().pop_front();
            queued.unwrap_or_else(|| Ok(forecast_with_temp(20.0)))
        }
    }

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(service_error());
            }
            Ok(vec![place(query, 1.0)])
        }
    }

    fn service_error() -> FetchError {
        FetchError::Service { status: StatusCode::SERVICE_UNAVAILABLE, body: "down".into() }
    }

    fn place(name: &str, lat: f64) -> Place {
        Place::new(name, "Testland", None, lat, 10.0, None)
    }

    fn forecast_with_temp(temp: f64) -> RawForecast {
        RawForecast {
            timezone: "UTC".into(),
            utc_offset_seconds: 0,
            hourly: Some(RawHourly {
                time: vec!["2024-05-01T12:00".into()],
                temperature_2m: Some(vec![Some(temp)]),
                ..RawHourly::default()
            }),
            daily: Some(RawDaily { time: vec!["2024-05-01".into()], ..RawDaily::default() }),
        }
    }

    struct Harness {
        dash: Arc<Dashboard>,
        forecast: Arc<FakeForecast>,
        geocoder: Arc<FakeGeocoder>,
        clock: Arc<StepClock>,
        backend: Arc<MemoryBackend>,
    }

    fn harness_with(geocoder: FakeGeocoder) -> Harness {
        let forecast = Arc::new(FakeForecast::default());
        let geocoder = Arc::new(geocoder);
        let clock = StepClock::starting_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let backend = Arc::new(MemoryBackend::new());
        let dash = Arc::new(Dashboard::with_clock(
            geocoder.clone(),
            forecast.clone(),
            Store::new(backend.clone()),
            clock.clone(),
        ));
        Harness { dash, forecast, geocoder, clock, backend }
    }

    fn harness() -> Harness {
        harness_with(FakeGeocoder::default())
    }

    fn displayed_temp(dash: &Dashboard) -> Option<f64> {
        dash.view_model()?.current?.temp
    }

    #[tokio::test]
    async fn no_selection_means_no_fetch() {
        let h = harness();

        assert!(matches!(h.dash.refresh().await, FetchOutcome::Skipped));
        assert!(matches!(h.dash.set_unit_system(UnitSystem::Imperial).await, FetchOutcome::Skipped));

        assert_eq!(h.dash.fetch_state(), FetchState::Idle);
        assert!(h.forecast.calls().is_empty());
        assert_eq!(h.dash.unit_system(), UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn successful_fetch_builds_view_and_records_recent() {
        let h = harness();
        let oslo = place("Oslo", 59.91);

        assert!(h.dash.select_place(oslo.clone()).await.is_applied());

        assert_eq!(h.dash.fetch_state(), FetchState::Ready);
        assert_eq!(displayed_temp(&h.dash), Some(20.0));
        let displayed = h.dash.displayed().unwrap();
        assert_eq!(displayed.place, oslo);
        assert_eq!(displayed.unit, UnitSystem::Metric);

        let recents = h.dash.recents();
        assert_eq!(recents.len(), 1);
        assert_eq!(recents[0].place, oslo);
        assert_eq!(recents[0].ts, h.clock.now().timestamp_millis());
        assert!(h.backend.raw(keys::RECENTS).unwrap().contains("Oslo"));
    }

    #[tokio::test]
    async fn reselecting_refetches_and_refreshes_recent() {
        let h = harness();
        let oslo = place("Oslo", 59.91);

        h.dash.select_place(oslo.clone()).await;
        let first_ts = h.dash.recents()[0].ts;
        h.clock.advance(Duration::minutes(5));
        h.dash.select_place(oslo.clone()).await;

        assert_eq!(h.forecast.calls().len(), 2);
        let recents = h.dash.recents();
        assert_eq!(recents.len(), 1);
        assert!(recents[0].ts > first_ts);
    }

    #[tokio::test]
    async fn recents_are_most_recently_used_and_bounded() {
        let h = harness();

        for i in 0..12 {
            h.dash.select_place(place(&format!("P{i}"), i as f64)).await;
            h.clock.advance(Duration::seconds(1));
        }
        h.dash.select_place(place("P5", 5.0)).await;

        let names: Vec<String> = h.dash.recents().into_iter().map(|r| r.place.name).collect();
        assert_eq!(names.len(), RECENTS_LIMIT);
        assert_eq!(names[0], "P5");
        assert_eq!(names[1], "P11");
        assert_eq!(names.iter().filter(|n| n.as_str() == "P5").count(), 1);
        assert!(!names.contains(&"P3".to_string()));
    }

    #[tokio::test]
    async fn failure_keeps_previous_view_visible() {
        let h = harness();
        let oslo = place("Oslo", 59.91);
        let rome = place("Rome", 41.9);

        h.dash.select_place(oslo.clone()).await;
        let before = h.dash.displayed().unwrap();

        h.forecast.reply(Err(service_error()));
        let outcome = h.dash.select_place(rome.clone()).await;

        assert!(matches!(outcome, FetchOutcome::Failed(WeatherError::ForecastUnavailable(_))));
        assert_eq!(h.dash.fetch_state(), FetchState::Error);
        assert_eq!(h.dash.error_message().as_deref(), Some("Couldn't load forecast. Try again."));
        assert_eq!(h.dash.displayed(), Some(before));
        assert_eq!(h.dash.selected_place(), Some(rome));
        assert_eq!(h.dash.recents().len(), 1);
    }

    #[tokio::test]
    async fn unit_change_refetches_selected_place() {
        let h = harness();
        let oslo = place("Oslo", 59.91);

        h.dash.select_place(oslo.clone()).await;
        assert!(h.dash.toggle_unit_system().await.is_applied());
        assert!(matches!(h.dash.set_unit_system(UnitSystem::Imperial).await, FetchOutcome::Skipped));

        assert_eq!(
            h.forecast.calls(),
            vec![(oslo.id.clone(), UnitSystem::Metric), (oslo.id.clone(), UnitSystem::Imperial)]
        );
        assert_eq!(h.dash.displayed().unwrap().unit, UnitSystem::Imperial);
        assert_eq!(h.backend.raw(keys::UNIT).as_deref(), Some("\"imperial\""));
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let h = harness();
        let slow = place("Slow", 1.0);
        let fast = place("Fast", 2.0);
        let slow_tx = h.forecast.gate(&slow);
        let fast_tx = h.forecast.gate(&fast);

        let first = tokio::spawn({
            let dash = h.dash.clone();
            async move { dash.select_place(slow).await }
        });
        while h.forecast.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let dash = h.dash.clone();
            async move { dash.select_place(fast.clone()).await }
        });
        while h.forecast.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(h.dash.fetch_state(), FetchState::Loading);
        assert_eq!(h.dash.selected_place().unwrap().name, "Fast");

        fast_tx.send(Ok(forecast_with_temp(2.0))).unwrap();
        assert!(second.await.unwrap().is_applied());
        slow_tx.send(Ok(forecast_with_temp(1.0))).unwrap();
        assert!(matches!(first.await.unwrap(), FetchOutcome::Superseded));

        assert_eq!(displayed_temp(&h.dash), Some(2.0));
        assert_eq!(h.dash.displayed().unwrap().place.name, "Fast");
        assert_eq!(h.dash.fetch_state(), FetchState::Ready);
        let names: Vec<String> = h.dash.recents().into_iter().map(|r| r.place.name).collect();
        assert_eq!(names, vec!["Fast".to_string()]);
    }

    #[tokio::test]
    async fn favorites_toggle_is_its_own_inverse() {
        let h = harness();
        assert_eq!(h.dash.toggle_favorite(), None);

        for (name, lat) in [("A", 1.0), ("B", 2.0), ("C", 3.0)] {
            h.dash.select_place(place(name, lat)).await;
            assert_eq!(h.dash.toggle_favorite(), Some(true));
        }
        let before = h.dash.favorites();

        h.dash.select_place(place("B", 2.0)).await;
        assert!(h.dash.is_favorite());
        assert_eq!(h.dash.toggle_favorite(), Some(false));
        assert!(!h.dash.is_favorite());
        assert_eq!(h.dash.toggle_favorite(), Some(true));

        let after: Vec<String> = h.dash.favorites().into_iter().map(|f| f.name).collect();
        assert_eq!(after, vec!["A", "C", "B"]);

        assert_eq!(h.dash.toggle_favorite(), Some(false));
        assert_eq!(h.dash.toggle_favorite(), Some(true));
        assert_eq!(h.dash.favorites().len(), before.len());
    }

    #[test]
    fn toggle_twice_restores_order() {
        let mut favs = vec![place("A", 1.0), place("B", 2.0)];
        let original = favs.clone();

        assert!(toggle_favorite(&mut favs, place("Z", 9.0)));
        assert!(!toggle_favorite(&mut favs, place("Z", 9.0)));
        assert_eq!(favs, original);
    }

    #[tokio::test]
    async fn clear_lists_empties_both_lists() {
        let h = harness();
        h.dash.select_place(place("A", 1.0)).await;
        h.dash.toggle_favorite();

        h.dash.clear_lists();

        assert!(h.dash.favorites().is_empty());
        assert!(h.dash.recents().is_empty());
        assert_eq!(h.backend.raw(keys::FAVORITES).as_deref(), Some("[]"));
        assert_eq!(h.backend.raw(keys::RECENTS).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn preferences_survive_restart() {
        let h = harness();
        h.dash.toggle_theme();
        h.dash.select_place(place("A", 1.0)).await;
        h.dash.toggle_favorite();

        let reopened = Dashboard::new(h.geocoder.clone(), h.forecast.clone(), Store::new(h.backend.clone()));

        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(reopened.favorites().len(), 1);
        assert_eq!(reopened.recents().len(), 1);
        assert_eq!(reopened.selected_place(), None);
        assert_eq!(reopened.fetch_state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn corrupt_slots_load_as_defaults() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(keys::FAVORITES, "{").unwrap();
        backend.set(keys::THEME, "\"sepia\"").unwrap();

        let dash = Dashboard::new(
            Arc::new(FakeGeocoder::default()),
            Arc::new(FakeForecast::default()),
            Store::new(backend),
        );

        assert!(dash.favorites().is_empty());
        assert_eq!(dash.theme(), Theme::Light);
    }

    #[tokio::test]
    async fn blank_search_never_hits_the_service() {
        let h = harness();

        assert!(h.dash.search("   ").await.unwrap().is_empty());
        assert!(h.geocoder.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_within_debounce_issue_one_search() {
        let h = harness();

        for text in ["L", "Lo", "Lon", "Lond"] {
            h.dash.query_changed(text);
            tokio::time::advance(std::time::Duration::from_millis(100)).await;
        }
        tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;

        assert_eq!(*h.geocoder.queries.lock().unwrap(), vec!["Lond".to_string()]);
        let state = h.dash.search_state();
        assert_eq!(state.query, "Lond");
        assert_eq!(state.status, SearchStatus::Idle);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Lond");
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_query_cancels_pending_search() {
        let h = harness();

        h.dash.query_changed("Par");
        tokio::time::advance(std::time::Duration::from_millis(100)).await;
        h.dash.query_changed("");
        tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;

        assert!(h.geocoder.queries.lock().unwrap().is_empty());
        assert!(h.dash.search_state().results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn search_failure_sets_status_line() {
        let h = harness_with(FakeGeocoder { fail: true, ..FakeGeocoder::default() });

        h.dash.query_changed("Rome");
        tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;

        assert_eq!(
            h.dash.search_state().status,
            SearchStatus::Failed("Couldn't search right now.".into())
        );
    }
}
