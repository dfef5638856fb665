//! `locate`: drives a full [`LocatorEngine`] from the terminal.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use geofinder_core::{AppConfig, Bounds, Coordinate, FilterResult, PlaceCandidate, Store};
use geofinder_engine::{
    Collaborators, EngineSettings, FixedGeolocator, FormFields, LocationFields, LocatorEngine,
    MapView, MarkerHandle, MarkerMeta, Notifier, ResultList, SelectionOutcome, SuggestionList,
};
use geofinder_provider::GeoProvider;

use crate::nearby::{load_store_list, print_stores};

/// Stands in for the map, form, list and notices. Map and list traffic goes
/// to the debug log; the form is kept in memory; notices go to stderr.
#[derive(Debug, Default)]
pub(crate) struct TerminalView {
    fields: Mutex<LocationFields>,
    next_marker: AtomicU64,
}

impl MapView for TerminalView {
    fn place_marker(&self, coordinate: Coordinate) {
        tracing::debug!(%coordinate, "location marker placed");
    }

    fn remove_all_markers(&self) {
        tracing::trace!("store markers cleared");
    }

    fn add_marker(&self, coordinate: Coordinate, meta: &MarkerMeta) -> MarkerHandle {
        tracing::trace!(%coordinate, store = meta.store_id, title = %meta.title, "store marker");
        MarkerHandle(self.next_marker.fetch_add(1, Ordering::Relaxed))
    }

    fn fit_view_to(&self, bounds: Bounds) {
        tracing::debug!(?bounds, "view fitted to stores");
    }

    fn set_view(&self, center: Coordinate, zoom: u8) {
        tracing::debug!(%center, zoom, "view centred");
    }
}

impl FormFields for TerminalView {
    fn write_fields(&self, fields: &LocationFields) {
        *self.fields.lock().unwrap_or_else(PoisonError::into_inner) = fields.clone();
    }

    fn read_fields(&self) -> LocationFields {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultList for TerminalView {
    fn render(&self, result: &FilterResult<Store>) {
        tracing::debug!(stores = result.len(), "store list updated");
    }
}

impl SuggestionList for TerminalView {
    fn show(&self, candidates: &[PlaceCandidate]) {
        tracing::debug!(count = candidates.len(), "suggestions");
    }
}

impl Notifier for TerminalView {
    fn notice(&self, message: &str) {
        eprintln!("{message}");
    }

    fn set_detect_busy(&self, _busy: bool) {}
}

pub(crate) async fn run_locate(
    provider: Arc<dyn GeoProvider>,
    config: &AppConfig,
    stores_path: &Path,
    query: &str,
    radius_km: Option<f64>,
) -> anyhow::Result<()> {
    let stores = load_store_list(stores_path)?;
    let view = Arc::new(TerminalView::default());
    let collaborators = Collaborators {
        map: Arc::clone(&view) as Arc<dyn MapView>,
        form: Arc::clone(&view) as Arc<dyn FormFields>,
        list: Arc::clone(&view) as Arc<dyn ResultList>,
        suggestions: Arc::clone(&view) as Arc<dyn SuggestionList>,
        notifier: Arc::clone(&view) as Arc<dyn Notifier>,
        geolocator: Arc::new(FixedGeolocator::unsupported()),
    };
    let engine = LocatorEngine::new(provider, collaborators, &EngineSettings::from_config(config));
    engine.set_stores(stores);
    engine.set_radius(radius_km);

    match engine.commit_text(query).await {
        SelectionOutcome::Selected(location) => {
            let fields = view.read_fields();
            println!(
                "{} ({}, {})",
                location.address, fields.latitude, fields.longitude
            );
        }
        SelectionOutcome::NoMatch => {
            println!("no places match '{}'", query.trim());
            return Ok(());
        }
        SelectionOutcome::TooShort => {
            anyhow::bail!(
                "query must be at least {} characters",
                engine.resolver().min_query_chars()
            );
        }
        SelectionOutcome::Superseded => return Ok(()),
    }

    print_stores(&engine.filter_result(), radius_km);
    Ok(())
}
