//! Ordered provider chain: the first provider that answers wins.

use async_trait::async_trait;
use geofinder_core::{AppConfig, Coordinate, PlaceCandidate};

use crate::error::GeocodeError;
use crate::http::HttpSettings;
use crate::nominatim::NominatimProvider;
use crate::photon::PhotonProvider;
use crate::provider::{GeoProvider, DEFAULT_MIN_QUERY_CHARS};

/// Tries each provider in order.
///
/// A provider that *answers*, even with zero candidates or an empty address,
/// ends the walk. Only failures (transport, status, body) fall through to the
/// next provider; each is logged at `warn`.
pub struct FallbackProvider {
    providers: Vec<Box<dyn GeoProvider>>,
}

impl FallbackProvider {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn GeoProvider>>) -> Self {
        Self { providers }
    }

    /// Builds the chain described by `config`: proxy (when configured), then
    /// Nominatim directly, then Photon (when configured).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidBaseUrl`] if any configured URL does not
    /// parse, or [`GeocodeError::Http`] if a client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, GeocodeError> {
        let settings = HttpSettings::from_config(config);

        let mut providers: Vec<Box<dyn GeoProvider>> = Vec::new();
        if let Some(origin) = config.proxy_origin.as_deref() {
            providers.push(Box::new(NominatimProvider::proxy(origin, &settings)?));
        }
        providers.push(Box::new(NominatimProvider::direct(
            &config.nominatim_url,
            &settings,
        )?));
        if let Some(photon) = config.photon_url.as_deref() {
            providers.push(Box::new(PhotonProvider::new(photon, &settings)?));
        }

        tracing::debug!(
            chain = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "geocoding provider chain built"
        );
        Ok(Self::new(providers))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl GeoProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    /// The strictest minimum of the chain, so no member is ever sent a query
    /// it would have refused on its own.
    fn min_query_chars(&self) -> usize {
        self.providers
            .iter()
            .map(|p| p.min_query_chars())
            .max()
            .unwrap_or(DEFAULT_MIN_QUERY_CHARS)
    }

    async fn try_forward_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        for provider in &self.providers {
            match provider.try_forward_search(query, limit).await {
                Ok(candidates) => return Ok(candidates),
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %error,
                        "forward search failed; trying next provider"
                    );
                }
            }
        }
        Err(GeocodeError::AllProvidersFailed {
            attempted: self.providers.len(),
        })
    }

    async fn try_reverse_lookup(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        for provider in &self.providers {
            match provider.try_reverse_lookup(coordinate).await {
                Ok(address) => return Ok(address),
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        %coordinate,
                        error = %error,
                        "reverse lookup failed; trying next provider"
                    );
                }
            }
        }
        Err(GeocodeError::AllProvidersFailed {
            attempted: self.providers.len(),
        })
    }
}
