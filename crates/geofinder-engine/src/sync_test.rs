use std::sync::atomic::{AtomicU64, Ordering};

use super::*;
use crate::view::MarkerHandle;

#[derive(Debug, Clone, PartialEq)]
enum MapCall {
    PlaceMarker(Coordinate),
    RemoveAll,
    AddMarker(i64),
    Fit(Bounds),
    SetView(Coordinate, u8),
}

#[derive(Default)]
struct RecordingMap {
    calls: Mutex<Vec<MapCall>>,
    next_handle: AtomicU64,
}

impl RecordingMap {
    fn take(&self) -> Vec<MapCall> {
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
        MarkerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }

    fn fit_view_to(&self, bounds: Bounds) {
        self.calls.lock().unwrap().push(MapCall::Fit(bounds));
    }

    fn set_view(&self, center: Coordinate, zoom: u8) {
        self.calls.lock().unwrap().push(MapCall::SetView(center, zoom));
    }
}

#[derive(Default)]
struct RecordingForm {
    writes: Mutex<Vec<LocationFields>>,
}

impl FormFields for RecordingForm {
    fn write_fields(&self, fields: &LocationFields) {
        self.writes.lock().unwrap().push(fields.clone());
    }

    fn read_fields(&self) -> LocationFields {
        self.writes.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[derive(Default)]
struct RecordingList {
    renders: Mutex<Vec<Vec<(i64, Option<f64>)>>>,
}

impl RecordingList {
    fn count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    fn last_ids(&self) -> Vec<i64> {
        self.renders
            .lock()
            .unwrap()
            .last()
            .map(|r| r.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }
}

impl ResultList for RecordingList {
    fn render(&self, result: &FilterResult<Store>) {
        self.renders.lock().unwrap().push(
            result
                .iter()
                .map(|r| (r.entity.id, r.distance_km))
                .collect(),
        );
    }
}

struct Fixture {
    map: Arc<RecordingMap>,
    form: Arc<RecordingForm>,
    list: Arc<RecordingList>,
    sync: ViewSyncController,
}

fn fixture() -> Fixture {
    let map = Arc::new(RecordingMap::default());
    let form = Arc::new(RecordingForm::default());
    let list = Arc::new(RecordingList::default());
    let sync = ViewSyncController::new(
        Arc::clone(&map) as Arc<dyn MapView>,
        Arc::clone(&form) as Arc<dyn FormFields>,
        Arc::clone(&list) as Arc<dyn ResultList>,
        15,
    );
    Fixture {
        map,
        form,
        list,
        sync,
    }
}

fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn store(id: i64, at: Option<(f64, f64)>) -> Store {
    Store {
        id,
        name: format!("Store {id}"),
        coordinate: at.map(|(lat, lng)| coord(lat, lng)),
        address: None,
        location: None,
        city: None,
        rating: None,
        reviews: None,
        product_count: None,
    }
}

/// Scenario A's store set: S1 (0,0), S2 (0,1), S3 without coordinates.
fn scenario_stores() -> Vec<Store> {
    vec![
        store(1, Some((0.0, 0.0))),
        store(2, Some((0.0, 1.0))),
        store(3, None),
    ]
}

#[test]
fn set_stores_draws_markers_fits_bounds_and_renders() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());

    let calls = f.map.take();
    assert_eq!(calls[0], MapCall::RemoveAll);
    assert_eq!(calls[1], MapCall::AddMarker(1));
    assert_eq!(calls[2], MapCall::AddMarker(2));
    assert!(matches!(calls[3], MapCall::Fit(_)));
    assert_eq!(calls.len(), 4);
    assert_eq!(f.list.last_ids(), vec![1, 2, 3]);
}

#[test]
fn no_coordinates_falls_back_to_world_view() {
    let f = fixture();
    f.sync.set_stores(vec![store(1, None)]);
    assert!(f
        .map
        .take()
        .contains(&MapCall::SetView(WORLD_CENTER, DEFAULT_ZOOM)));
}

#[test]
fn location_update_writes_all_fields_and_sorts_by_distance() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());
    f.map.take();

    let here = ResolvedLocation::new(coord(0.0, 0.9), "Near S2");
    f.sync.on_location(&here, UpdateReason::SearchSelect);

    let written = f.form.read_fields();
    assert_eq!(written.latitude, "0");
    assert_eq!(written.longitude, "0.9");
    assert_eq!(written.address, "Near S2");
    assert_eq!(f.list.last_ids(), vec![2, 1, 3]);

    let calls = f.map.take();
    assert_eq!(calls[0], MapCall::PlaceMarker(coord(0.0, 0.9)));
    assert_eq!(calls[1], MapCall::SetView(coord(0.0, 0.9), 15));
    assert!(
        !calls.iter().any(|c| matches!(c, MapCall::Fit(_))),
        "a center change must not refit the viewport"
    );
}

#[test]
fn raw_click_does_not_recenter() {
    let f = fixture();
    f.sync
        .on_location(&ResolvedLocation::unaddressed(coord(5.0, 5.0)), UpdateReason::Click);
    let calls = f.map.take();
    assert!(calls.contains(&MapCall::PlaceMarker(coord(5.0, 5.0))));
    assert!(!calls.iter().any(|c| matches!(c, MapCall::SetView(..))));
}

#[test]
fn address_only_update_does_not_recompute() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());
    let at = coord(1.0, 1.0);
    f.sync
        .on_location(&ResolvedLocation::unaddressed(at), UpdateReason::Drag);
    let renders = f.list.count();

    f.sync
        .on_location(&ResolvedLocation::new(at, "Somewhere"), UpdateReason::Drag);
    assert_eq!(f.list.count(), renders);
    assert_eq!(f.form.read_fields().address, "Somewhere");
}

#[test]
fn identical_result_is_rendered_once() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());
    let renders = f.list.count();
    f.map.take();

    // Radius without a center changes nothing.
    f.sync.set_radius(Some(50.0));
    assert_eq!(f.list.count(), renders);
    assert!(f.map.take().is_empty());
}

#[test]
fn radius_change_filters_and_refits() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());
    f.sync
        .on_location(&ResolvedLocation::unaddressed(coord(0.0, 0.0)), UpdateReason::Init);
    f.map.take();

    // S2 is about 111 km east of the center.
    f.sync.set_radius(Some(100.0));
    assert_eq!(f.list.last_ids(), vec![1]);
    let calls = f.map.take();
    assert!(calls.iter().any(|c| matches!(c, MapCall::Fit(_))));
    let drawn: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, MapCall::AddMarker(_)))
        .collect();
    assert_eq!(drawn, vec![&MapCall::AddMarker(1)]);
}

#[test]
fn empty_store_set_renders_no_results_state() {
    let f = fixture();
    f.sync.set_stores(Vec::new());
    assert_eq!(f.list.count(), 1);
    assert!(f.list.last_ids().is_empty());
}

#[test]
fn reset_clears_center_and_form_and_always_redraws() {
    let f = fixture();
    f.sync.set_stores(scenario_stores());
    f.sync
        .on_location(&ResolvedLocation::new(coord(0.0, 1.0), "X"), UpdateReason::Geolocate);
    f.sync.set_radius(Some(10.0));
    let renders = f.list.count();

    f.sync.reset();
    assert_eq!(f.sync.center(), None);
    assert_eq!(f.sync.radius_km(), None);
    assert_eq!(f.form.read_fields(), LocationFields::default());
    assert_eq!(f.list.last_ids(), vec![1, 2, 3]);

    // A second reset redraws even though nothing changed.
    f.sync.reset();
    assert_eq!(f.list.count(), renders + 2);
}
