//! Narrow interfaces to the things an engine drives but does not own: the
//! map widget, the form, the result and suggestion lists, and user notices.
//!
//! All methods take `&self`; implementations use interior mutability so one
//! collaborator can be shared between the engine and the UI event loop.

use geofinder_core::{Bounds, Coordinate, FilterResult, PlaceCandidate, Store};

/// Zoom used with [`WORLD_CENTER`](geofinder_core::WORLD_CENTER) when
/// nothing can be fitted.
pub const DEFAULT_ZOOM: u8 = 2;

/// Opaque id of a store marker returned by [`MapView::add_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// What a store marker's popup shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerMeta {
    pub store_id: i64,
    pub title: String,
    pub subtitle: String,
    pub distance_km: Option<f64>,
}

impl MarkerMeta {
    #[must_use]
    pub fn for_store(store: &Store, distance_km: Option<f64>) -> Self {
        Self {
            store_id: store.id,
            title: store.display_name().to_string(),
            subtitle: store.address_line().to_string(),
            distance_km,
        }
    }
}

pub trait MapView: Send + Sync {
    /// Places (or moves) the single location marker.
    fn place_marker(&self, coordinate: Coordinate);
    /// Removes every store marker; the location marker stays.
    fn remove_all_markers(&self);
    fn add_marker(&self, coordinate: Coordinate, meta: &MarkerMeta) -> MarkerHandle;
    fn fit_view_to(&self, bounds: Bounds);
    fn set_view(&self, center: Coordinate, zoom: u8);
}

/// The three form fields a location is written to, as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFields {
    pub latitude: String,
    pub longitude: String,
    pub address: String,
}

impl LocationFields {
    /// Parses the coordinate fields; `None` if either is blank, unparsable
    /// or out of range.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.latitude.trim().parse().ok()?;
        let lng = self.longitude.trim().parse().ok()?;
        Coordinate::new(lat, lng).ok()
    }
}

pub trait FormFields: Send + Sync {
    /// Writes all three fields in one call.
    fn write_fields(&self, fields: &LocationFields);
    fn read_fields(&self) -> LocationFields;
}

pub trait ResultList: Send + Sync {
    /// An empty result is the "no results" state.
    fn render(&self, result: &FilterResult<Store>);
}

pub trait SuggestionList: Send + Sync {
    fn show(&self, candidates: &[PlaceCandidate]);
}

pub trait Notifier: Send + Sync {
    fn notice(&self, message: &str);
    /// Disables (`true`) or re-enables the "detect my location" control.
    fn set_detect_busy(&self, busy: bool);
}
