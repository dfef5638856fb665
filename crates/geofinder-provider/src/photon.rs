//! Photon (komoot) geocoder, used as a secondary service in the fallback chain.

use async_trait::async_trait;
use geofinder_core::{Coordinate, PlaceCandidate};
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::http::{build_client, endpoint, get_json, with_query, HttpSettings};
use crate::provider::GeoProvider;
use crate::types::{PhotonCollection, PhotonFeature};

pub struct PhotonProvider {
    client: Client,
    search_url: Url,
    reverse_url: Url,
    min_query_chars: usize,
}

impl PhotonProvider {
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, settings: &HttpSettings) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: build_client(settings)?,
            search_url: endpoint(base_url, "api")?,
            reverse_url: endpoint(base_url, "reverse")?,
            min_query_chars: settings.min_query_chars,
        })
    }

    fn collect(collection: PhotonCollection) -> Vec<PlaceCandidate> {
        collection
            .features
            .into_iter()
            .filter_map(PhotonFeature::into_candidate)
            .collect()
    }
}

#[async_trait]
impl GeoProvider for PhotonProvider {
    fn name(&self) -> &str {
        "photon"
    }

    fn min_query_chars(&self) -> usize {
        self.min_query_chars
    }

    async fn try_forward_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        let limit = limit.to_string();
        let url = with_query(&self.search_url, &[("q", query), ("limit", &limit)]);
        let collection: PhotonCollection = get_json(&self.client, &url).await?;
        Ok(Self::collect(collection))
    }

    async fn try_reverse_lookup(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let lat = coordinate.latitude().to_string();
        let lon = coordinate.longitude().to_string();
        let url = with_query(&self.reverse_url, &[("lat", &lat), ("lon", &lon)]);
        let collection: PhotonCollection = get_json(&self.client, &url).await?;
        Ok(Self::collect(collection)
            .into_iter()
            .next()
            .map(|candidate| candidate.label)
            .unwrap_or_default())
    }
}
