//! One locator instance: a location picker or a store finder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use geofinder_core::{
    AppConfig, Coordinate, FilterResult, PlaceCandidate, ResolvedLocation, Store,
};
use geofinder_provider::GeoProvider;

use crate::debounce::{debounce_channel, DebounceSender, QueryDebouncer, DEFAULT_QUIET_PERIOD};
use crate::geolocation::{GeolocationError, GeolocationOptions, Geolocator};
use crate::resolver::{
    LocationResolver, LocationSubscriber, LookupOutcome, SelectionOutcome, UpdateReason,
};
use crate::session::{SearchSession, SessionEvent, SessionState};
use crate::sync::ViewSyncController;
use crate::view::{FormFields, MapView, Notifier, ResultList, SuggestionList};

/// Shown once whenever a position request fails, whatever the reason.
pub const DETECT_FAILED_NOTICE: &str =
    "Unable to detect location. You can search or set the marker manually.";

/// Everything outside the engine that it reads from or writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub map: Arc<dyn MapView>,
    pub form: Arc<dyn FormFields>,
    pub list: Arc<dyn ResultList>,
    pub suggestions: Arc<dyn SuggestionList>,
    pub notifier: Arc<dyn Notifier>,
    pub geolocator: Arc<dyn Geolocator>,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub search_limit: usize,
    pub debounce: Duration,
    pub focus_zoom: u8,
    pub geolocation: GeolocationOptions,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            search_limit: 8,
            debounce: DEFAULT_QUIET_PERIOD,
            focus_zoom: 15,
            geolocation: GeolocationOptions::default(),
        }
    }
}

impl EngineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            search_limit: config.search_limit,
            debounce: Duration::from_millis(config.debounce_ms),
            focus_zoom: config.focus_zoom,
            geolocation: GeolocationOptions {
                high_accuracy: true,
                timeout: Duration::from_secs(config.geolocation_timeout_secs),
                max_age: Duration::from_secs(config.geolocation_max_age_secs),
            },
        }
    }
}

/// Result of [`LocatorEngine::detect_location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectOutcome {
    /// A fix was obtained and applied; carries the reverse-lookup outcome.
    Located(LookupOutcome),
    /// No fix; a notice was shown and nothing changed.
    Failed(GeolocationError),
    /// A detection was already running; this request was ignored.
    AlreadyRunning,
}

/// Wires a resolver, a view-sync controller, a debouncer and a search
/// session to one set of collaborators.
///
/// Instances share nothing, so a page may hold a picker and a finder side by
/// side. All operations take `&self`; wrap the engine in an `Arc` to drive
/// [`run_suggestions`](LocatorEngine::run_suggestions) from its own task.
pub struct LocatorEngine {
    resolver: Arc<LocationResolver>,
    sync: Arc<ViewSyncController>,
    form: Arc<dyn FormFields>,
    suggestions: Arc<dyn SuggestionList>,
    notifier: Arc<dyn Notifier>,
    geolocator: Arc<dyn Geolocator>,
    geolocation: GeolocationOptions,
    input: Mutex<Option<DebounceSender<String>>>,
    // Held across awaits by the suggestion loop, hence the async mutex.
    debouncer: tokio::sync::Mutex<QueryDebouncer<String>>,
    session: Mutex<SearchSession>,
    last_suggestions: Mutex<Vec<PlaceCandidate>>,
    detecting: AtomicBool,
}

enum SearchStep {
    Finished(Option<Vec<PlaceCandidate>>),
    Replaced(String),
}

impl LocatorEngine {
    #[must_use]
    pub fn new(
        provider: Arc<dyn GeoProvider>,
        collaborators: Collaborators,
        settings: &EngineSettings,
    ) -> Self {
        let resolver = Arc::new(LocationResolver::new(provider, settings.search_limit));
        let sync = Arc::new(ViewSyncController::new(
            collaborators.map,
            Arc::clone(&collaborators.form),
            collaborators.list,
            settings.focus_zoom,
        ));
        resolver.subscribe(Arc::clone(&sync) as Arc<dyn LocationSubscriber>);
        let (input, debouncer) = debounce_channel(settings.debounce);

        Self {
            resolver,
            sync,
            form: collaborators.form,
            suggestions: collaborators.suggestions,
            notifier: collaborators.notifier,
            geolocator: collaborators.geolocator,
            geolocation: settings.geolocation,
            input: Mutex::new(Some(input)),
            debouncer: tokio::sync::Mutex::new(debouncer),
            session: Mutex::new(SearchSession::default()),
            last_suggestions: Mutex::new(Vec::new()),
            detecting: AtomicBool::new(false),
        }
    }

    /// Reads the form once and seeds the location when both coordinate
    /// fields hold a valid point.
    pub fn start(&self) -> Option<ResolvedLocation> {
        let fields = self.form.read_fields();
        let coordinate = fields.coordinate()?;
        let location = ResolvedLocation::new(coordinate, fields.address.trim());
        self.resolver.seed(location.clone());
        Some(location)
    }

    /// Feeds one raw text-input event to the debouncer.
    pub fn type_text(&self, text: &str) {
        self.advance(SessionEvent::Input);
        let delivered = lock(&self.input)
            .as_ref()
            .is_some_and(|input| input.send(text.to_string()));
        if !delivered {
            tracing::debug!("search input closed; ignoring keystroke");
        }
    }

    /// Closes the search input. A pending query is still committed and
    /// searched; after that the suggestion loop ends.
    pub fn close_input(&self) {
        lock(&self.input).take();
    }

    /// Waits for the next committed query, searches it and shows the
    /// suggestions.
    ///
    /// A query committed while a search is in flight abandons that search
    /// (its request is dropped) and is searched instead. Returns `None` once
    /// the input side has closed.
    pub async fn next_suggestions(&self) -> Option<Vec<PlaceCandidate>> {
        let mut debouncer = self.debouncer.lock().await;
        let mut query = debouncer.next().await?;

        loop {
            self.advance(SessionEvent::QueryIssued);
            let step = {
                let search = self.resolver.resolve_from_text(&query);
                tokio::select! {
                    biased;
                    // A closed input disables this branch; the search then finishes.
                    Some(newer) = debouncer.next() => SearchStep::Replaced(newer),
                    found = search => SearchStep::Finished(found),
                }
            };

            match step {
                SearchStep::Replaced(newer) => {
                    tracing::debug!(abandoned = %query, "newer query committed; abandoning search");
                    query = newer;
                }
                SearchStep::Finished(None) => {
                    // Superseded by a freeform commit; wait for fresh input.
                    query = debouncer.next().await?;
                }
                SearchStep::Finished(Some(candidates)) => {
                    self.suggestions.show(&candidates);
                    *lock(&self.last_suggestions) = candidates.clone();
                    self.advance(SessionEvent::SuggestionsReady);
                    return Some(candidates);
                }
            }
        }
    }

    /// Runs [`next_suggestions`](LocatorEngine::next_suggestions) until the
    /// input closes.
    pub async fn run_suggestions(&self) {
        while self.next_suggestions().await.is_some() {}
    }

    /// Handles a committed value in the search field (enter, blur, pick).
    ///
    /// A value equal to a shown suggestion's label selects that suggestion;
    /// anything else falls back to searching the text and taking the first
    /// hit.
    pub async fn commit_text(&self, value: &str) -> SelectionOutcome {
        let matched = lock(&self.last_suggestions)
            .iter()
            .find(|candidate| candidate.label == value)
            .cloned();

        if let Some(candidate) = matched {
            self.advance(SessionEvent::Select);
            let location = self.resolver.select_candidate(candidate);
            self.advance(SessionEvent::Synced);
            return SelectionOutcome::Selected(location);
        }

        self.advance(SessionEvent::Freeform);
        self.advance(SessionEvent::QueryIssued);
        let outcome = self.resolver.select_freeform_text(value).await;
        match &outcome {
            SelectionOutcome::Selected(_) => {
                self.advance(SessionEvent::Synced);
            }
            SelectionOutcome::NoMatch | SelectionOutcome::TooShort => {
                self.suggestions.show(&[]);
                lock(&self.last_suggestions).clear();
                self.forget_committed_query();
                self.advance(SessionEvent::NoMatch);
            }
            SelectionOutcome::Superseded => {}
        }
        outcome
    }

    pub async fn map_clicked(&self, coordinate: Coordinate) -> LookupOutcome {
        self.resolver
            .set_from_coordinate(coordinate, UpdateReason::Click)
            .await
    }

    pub async fn marker_dragged(&self, coordinate: Coordinate) -> LookupOutcome {
        self.resolver
            .set_from_coordinate(coordinate, UpdateReason::Drag)
            .await
    }

    /// Asks the geolocation source for a fix and adopts it.
    ///
    /// The detect control is disabled for the duration. Any failure shows
    /// [`DETECT_FAILED_NOTICE`] once and leaves the location untouched.
    pub async fn detect_location(&self) -> DetectOutcome {
        if self.detecting.swap(true, Ordering::SeqCst) {
            tracing::debug!("location detection already running");
            return DetectOutcome::AlreadyRunning;
        }
        let _busy = DetectBusy::engage(self);

        match self.geolocator.current_position(&self.geolocation).await {
            Ok(coordinate) => DetectOutcome::Located(
                self.resolver
                    .set_from_coordinate(coordinate, UpdateReason::Geolocate)
                    .await,
            ),
            Err(error) => {
                tracing::warn!(error = %error, "location detection failed");
                self.notifier.notice(DETECT_FAILED_NOTICE);
                DetectOutcome::Failed(error)
            }
        }
    }

    pub fn set_radius(&self, radius_km: Option<f64>) {
        self.sync.set_radius(radius_km);
    }

    pub fn set_stores(&self, stores: Vec<Store>) {
        self.sync.set_stores(stores);
    }

    /// Drops the location and radius and shows every store again.
    pub fn reset(&self) {
        self.resolver.clear();
        self.sync.reset();
        self.suggestions.show(&[]);
        lock(&self.last_suggestions).clear();
        self.forget_committed_query();
        *lock(&self.session) = SearchSession::default();
    }

    #[must_use]
    pub fn current_location(&self) -> Option<ResolvedLocation> {
        self.resolver.current()
    }

    /// The store list as last rendered.
    #[must_use]
    pub fn filter_result(&self) -> FilterResult<Store> {
        self.sync.last_result()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        lock(&self.session).state()
    }

    #[must_use]
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Once the suggestion list is emptied, retyping the last query must
    /// search it again.
    fn forget_committed_query(&self) {
        if let Some(input) = lock(&self.input).as_ref() {
            input.forget_committed();
        }
    }

    fn advance(&self, event: SessionEvent) {
        lock(&self.session).advance(event);
    }
}

/// Keeps the detect control disabled until dropped, including when the
/// detection future itself is dropped.
struct DetectBusy<'a> {
    engine: &'a LocatorEngine,
}

impl<'a> DetectBusy<'a> {
    fn engage(engine: &'a LocatorEngine) -> Self {
        engine.notifier.set_detect_busy(true);
        Self { engine }
    }
}

impl Drop for DetectBusy<'_> {
    fn drop(&mut self) {
        self.engine.notifier.set_detect_busy(false);
        self.engine.detecting.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
