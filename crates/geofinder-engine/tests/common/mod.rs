//! Recording collaborators and a scriptable provider for engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geofinder_core::{Bounds, Coordinate, FilterResult, PlaceCandidate, Store};
use geofinder_engine::{
    Collaborators, FormFields, GeolocationError, GeolocationOptions, Geolocator, LocationFields,
    MapView, MarkerHandle, MarkerMeta, Notifier, ResultList, SuggestionList,
};
use geofinder_provider::{GeoProvider, GeocodeError};
use tokio::sync::oneshot;

pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("test coordinate in range")
}

pub fn candidate(label: &str, lat: f64, lng: f64) -> PlaceCandidate {
    PlaceCandidate {
        label: label.to_string(),
        coordinate: coord(lat, lng),
    }
}

pub fn store(id: i64, at: Option<(f64, f64)>) -> Store {
    Store {
        id,
        name: format!("Store {id}"),
        coordinate: at.map(|(lat, lng)| coord(lat, lng)),
        address: None,
        location: None,
        city: Some("Springfield".to_string()),
        rating: None,
        reviews: None,
        product_count: None,
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Answers searches from a table and reverse lookups with a fixed address.
/// Either kind of call can be held back with a gate.
#[derive(Default)]
pub struct ScriptedProvider {
    results: Mutex<HashMap<String, Vec<PlaceCandidate>>>,
    address: Mutex<String>,
    search_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    reverse_gates: Mutex<VecDeque<oneshot::Receiver<String>>>,
    pub queries: Mutex<Vec<String>>,
    pub reverse_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, query: &str, candidates: Vec<PlaceCandidate>) {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), candidates);
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = address.to_string();
    }

    /// The next search blocks until the returned sender fires (or drops).
    pub fn hold_next_search(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next reverse lookup blocks and then answers with what is sent.
    pub fn hold_next_reverse(&self) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.reverse_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn search_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeoProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn try_forward_search(
        &self,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        let gate = self.search_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn try_reverse_lookup(&self, _coordinate: Coordinate) -> Result<String, GeocodeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.reverse_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return Ok(gate.await.unwrap_or_default());
        }
        Ok(self.address.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    PlaceMarker(Coordinate),
    RemoveAll,
    AddMarker(i64),
    Fit(Bounds),
    SetView(Coordinate, u8),
}

#[derive(Default)]
pub struct RecordingMap {
    calls: Mutex<Vec<MapCall>>,
    next: AtomicU64,
}

impl RecordingMap {
    pub fn take(&self) -> Vec<MapCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl MapView for RecordingMap {
    fn place_marker(&self, coordinate: Coordinate) {
        self.calls.lock().unwrap().push(MapCall::PlaceMarker(coordinate));
    }

    fn remove_all_markers(&self) {
        self.calls.lock().unwrap().push(MapCall::RemoveAll);
    }

    fn add_marker(&self, _coordinate: Coordinate, meta: &MarkerMeta) -> MarkerHandle {
        self.calls.lock().unwrap().push(MapCall::AddMarker(meta.store_id));
        MarkerHandle(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn fit_view_to(&self, bounds: Bounds) {
        self.calls.lock().unwrap().push(MapCall::Fit(bounds));
    }

    fn set_view(&self, center: Coordinate, zoom: u8) {
        self.calls.lock().unwrap().push(MapCall::SetView(center, zoom));
    }
}

#[derive(Default)]
pub struct RecordingForm {
    initial: Mutex<LocationFields>,
    pub writes: Mutex<Vec<LocationFields>>,
}

impl RecordingForm {
    pub fn prefilled(fields: LocationFields) -> Self {
        Self {
            initial: Mutex::new(fields),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<LocationFields> {
        self.writes.lock().unwrap().clone()
    }
}

impl FormFields for RecordingForm {
    fn write_fields(&self, fields: &LocationFields) {
        self.writes.lock().unwrap().push(fields.clone());
    }

    fn read_fields(&self) -> LocationFields {
        self.writes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| self.initial.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingList {
    renders: Mutex<Vec<Vec<i64>>>,
}

impl RecordingList {
    pub fn renders(&self) -> Vec<Vec<i64>> {
        self.renders.lock().unwrap().clone()
    }
}

impl ResultList for RecordingList {
    fn render(&self, result: &FilterResult<Store>) {
        self.renders
            .lock()
            .unwrap()
            .push(result.iter().map(|r| r.entity.id).collect());
    }
}

#[derive(Default)]
pub struct RecordingSuggestions {
    shown: Mutex<Vec<Vec<String>>>,
}

impl RecordingSuggestions {
    pub fn shown(&self) -> Vec<Vec<String>> {
        self.shown.lock().unwrap().clone()
    }
}

impl SuggestionList for RecordingSuggestions {
    fn show(&self, candidates: &[PlaceCandidate]) {
        self.shown
            .lock()
            .unwrap()
            .push(candidates.iter().map(|c| c.label.clone()).collect());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<String>>,
    pub busy: Mutex<Vec<bool>>,
}

impl Notifier for RecordingNotifier {
    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn set_detect_busy(&self, busy: bool) {
        self.busy.lock().unwrap().push(busy);
    }
}

/// Geolocation source answering from a queue of scripted results; each
/// answer can be held back by a gate.
#[derive(Default)]
pub struct ScriptedGeolocator {
    answers: Mutex<VecDeque<Result<Coordinate, GeolocationError>>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub seen_options: Mutex<Vec<GeolocationOptions>>,
}

impl ScriptedGeolocator {
    pub fn push(&self, answer: Result<Coordinate, GeolocationError>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }
}

#[async_trait]
impl Geolocator for ScriptedGeolocator {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Coordinate, GeolocationError> {
        self.seen_options.lock().unwrap().push(*options);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GeolocationError::Unavailable))
    }
}

/// Every recording collaborator, plus the bundle handed to the engine.
pub struct Harness {
    pub map: Arc<RecordingMap>,
    pub form: Arc<RecordingForm>,
    pub list: Arc<RecordingList>,
    pub suggestions: Arc<RecordingSuggestions>,
    pub notifier: Arc<RecordingNotifier>,
    pub geolocator: Arc<ScriptedGeolocator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_form(RecordingForm::default())
    }

    pub fn with_form(form: RecordingForm) -> Self {
        Self {
            map: Arc::new(RecordingMap::default()),
            form: Arc::new(form),
            list: Arc::new(RecordingList::default()),
            suggestions: Arc::new(RecordingSuggestions::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            geolocator: Arc::new(ScriptedGeolocator::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            map: Arc::clone(&self.map) as Arc<dyn MapView>,
            form: Arc::clone(&self.form) as Arc<dyn FormFields>,
            list: Arc::clone(&self.list) as Arc<dyn ResultList>,
            suggestions: Arc::clone(&self.suggestions) as Arc<dyn SuggestionList>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            geolocator: Arc::clone(&self.geolocator) as Arc<dyn Geolocator>,
        }
    }
}
