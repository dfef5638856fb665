//! Nominatim-shaped providers: the public service itself, or a same-origin
//! proxy that forwards to it and passes the JSON through unchanged.

use async_trait::async_trait;
use geofinder_core::{Coordinate, PlaceCandidate};
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::http::{build_client, endpoint, get_json, with_query, HttpSettings};
use crate::provider::GeoProvider;
use crate::types::{NominatimPlace, NominatimReverse};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Zoom level for direct reverse lookups: building/house-number detail.
const REVERSE_ZOOM: &str = "18";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Talks to Nominatim with the full `format=jsonv2` parameter set.
    Direct,
    /// Talks to `/api/geocode/*`; the proxy supplies format and zoom itself.
    Proxy,
}

/// Forward/reverse geocoding against Nominatim or the geocode proxy.
pub struct NominatimProvider {
    client: Client,
    search_url: Url,
    reverse_url: Url,
    mode: Mode,
    min_query_chars: usize,
}

impl NominatimProvider {
    /// Provider for a Nominatim instance rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn direct(base_url: &str, settings: &HttpSettings) -> Result<Self, GeocodeError> {
        Self::build(base_url, "search", "reverse", Mode::Direct, settings)
    }

    /// Provider for the same-origin proxy served at `origin`.
    ///
    /// # Errors
    ///
    /// Same as [`NominatimProvider::direct`].
    pub fn proxy(origin: &str, settings: &HttpSettings) -> Result<Self, GeocodeError> {
        Self::build(
            origin,
            "api/geocode/search",
            "api/geocode/reverse",
            Mode::Proxy,
            settings,
        )
    }

    fn build(
        base_url: &str,
        search_path: &str,
        reverse_path: &str,
        mode: Mode,
        settings: &HttpSettings,
    ) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: build_client(settings)?,
            search_url: endpoint(base_url, search_path)?,
            reverse_url: endpoint(base_url, reverse_path)?,
            mode,
            min_query_chars: settings.min_query_chars,
        })
    }

    fn search_request(&self, query: &str, limit: usize) -> Url {
        let limit = limit.to_string();
        match self.mode {
            Mode::Direct => with_query(
                &self.search_url,
                &[
                    ("q", query),
                    ("format", "jsonv2"),
                    ("addressdetails", "1"),
                    ("limit", &limit),
                ],
            ),
            Mode::Proxy => with_query(&self.search_url, &[("q", query), ("limit", &limit)]),
        }
    }

    fn reverse_request(&self, coordinate: Coordinate) -> Url {
        let lat = coordinate.latitude().to_string();
        let lon = coordinate.longitude().to_string();
        match self.mode {
            Mode::Direct => with_query(
                &self.reverse_url,
                &[
                    ("format", "jsonv2"),
                    ("lat", &lat),
                    ("lon", &lon),
                    ("zoom", REVERSE_ZOOM),
                    ("addressdetails", "1"),
                ],
            ),
            Mode::Proxy => with_query(&self.reverse_url, &[("lat", &lat), ("lon", &lon)]),
        }
    }
}

#[async_trait]
impl GeoProvider for NominatimProvider {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Direct => "nominatim",
            Mode::Proxy => "proxy",
        }
    }

    fn min_query_chars(&self) -> usize {
        self.min_query_chars
    }

    async fn try_forward_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        let url = self.search_request(query, limit);
        let places: Vec<NominatimPlace> = get_json(&self.client, &url).await?;
        let total = places.len();
        let candidates: Vec<PlaceCandidate> = places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect();
        if candidates.len() < total {
            tracing::debug!(
                provider = self.name(),
                dropped = total - candidates.len(),
                "skipped search results without a usable label or coordinate"
            );
        }
        Ok(candidates)
    }

    async fn try_reverse_lookup(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let url = self.reverse_request(coordinate);
        let body: NominatimReverse = get_json(&self.client, &url).await?;
        if let Some(reason) = body.error.as_deref() {
            tracing::debug!(provider = self.name(), %coordinate, reason, "no address at point");
        }
        Ok(body.into_address())
    }
}
