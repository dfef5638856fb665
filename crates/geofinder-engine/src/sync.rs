//! Keeps the map, the result list and the form fields in step with the
//! current location and the store set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use geofinder_core::{
    Bounds, Coordinate, EntityFilterIndex, FilterResult, ResolvedLocation, Store, WORLD_CENTER,
};

use crate::resolver::{LocationSubscriber, UpdateReason};
use crate::view::{
    FormFields, LocationFields, MapView, MarkerMeta, ResultList, DEFAULT_ZOOM,
};

/// How much of the view a recomputation may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Center moved: redraw markers and list, leave the viewport alone.
    Minor,
    /// Store set or radius changed: also fit the viewport to the markers.
    Bulk,
    /// Like `Bulk`, but redraws even when the result is unchanged.
    Reset,
}

#[derive(Debug, Default)]
struct SyncState {
    index: EntityFilterIndex<Store>,
    center: Option<Coordinate>,
    radius_km: Option<f64>,
    last_rendered: Option<FilterResult<Store>>,
}

/// Pushes location snapshots and filter results to the collaborators.
///
/// Registered with a [`LocationResolver`](crate::LocationResolver) as a
/// [`LocationSubscriber`]. Rendering an identical [`FilterResult`] twice is a
/// no-op.
pub struct ViewSyncController {
    map: Arc<dyn MapView>,
    form: Arc<dyn FormFields>,
    list: Arc<dyn ResultList>,
    focus_zoom: u8,
    state: Mutex<SyncState>,
}

impl ViewSyncController {
    #[must_use]
    pub fn new(
        map: Arc<dyn MapView>,
        form: Arc<dyn FormFields>,
        list: Arc<dyn ResultList>,
        focus_zoom: u8,
    ) -> Self {
        Self {
            map,
            form,
            list,
            focus_zoom,
            state: Mutex::new(SyncState::default()),
        }
    }

    pub fn set_stores(&self, stores: Vec<Store>) {
        self.lock().index = EntityFilterIndex::new(stores);
        self.refresh(Refresh::Bulk);
    }

    /// `None`, zero, negative or NaN all mean "no radius".
    pub fn set_radius(&self, radius_km: Option<f64>) {
        self.lock().radius_km = radius_km;
        self.refresh(Refresh::Bulk);
    }

    /// Forgets the center and radius, blanks the form and shows every store.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            state.center = None;
            state.radius_km = None;
        }
        self.form.write_fields(&LocationFields::default());
        self.refresh(Refresh::Reset);
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        self.lock().center
    }

    #[must_use]
    pub fn radius_km(&self) -> Option<f64> {
        self.lock().radius_km
    }

    /// The result most recently rendered, empty before the first render.
    #[must_use]
    pub fn last_result(&self) -> FilterResult<Store> {
        self.lock().last_rendered.clone().unwrap_or_default()
    }

    fn refresh(&self, kind: Refresh) {
        let result = {
            let mut state = self.lock();
            let result = state.index.compute(state.center, state.radius_km);
            if kind != Refresh::Reset && state.last_rendered.as_ref() == Some(&result) {
                tracing::debug!(entries = result.len(), "filter result unchanged; skipping render");
                return;
            }
            state.last_rendered = Some(result.clone());
            result
        };

        self.map.remove_all_markers();
        let mut positions = Vec::new();
        for ranked in &result {
            if let Some(coordinate) = ranked.entity.coordinate {
                let meta = MarkerMeta::for_store(&ranked.entity, ranked.distance_km);
                self.map.add_marker(coordinate, &meta);
                positions.push(coordinate);
            }
        }

        if kind != Refresh::Minor {
            match Bounds::enclosing(positions.iter().copied()) {
                Some(bounds) => self.map.fit_view_to(bounds),
                None => self.map.set_view(WORLD_CENTER, DEFAULT_ZOOM),
            }
        }

        self.list.render(&result);
        tracing::debug!(
            ?kind,
            entries = result.len(),
            markers = positions.len(),
            "view refreshed"
        );
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationSubscriber for ViewSyncController {
    fn on_location(&self, location: &ResolvedLocation, reason: UpdateReason) {
        self.map.place_marker(location.coordinate);
        if reason.recenters() {
            self.map.set_view(location.coordinate, self.focus_zoom);
        }
        self.form.write_fields(&LocationFields {
            latitude: location.coordinate.latitude().to_string(),
            longitude: location.coordinate.longitude().to_string(),
            address: location.address.clone(),
        });

        let moved = {
            let mut state = self.lock();
            let moved = state.center != Some(location.coordinate);
            state.center = Some(location.coordinate);
            moved
        };
        // An address arriving for the same point changes no distance.
        if moved {
            self.refresh(Refresh::Minor);
        }
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
