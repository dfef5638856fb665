//! The provider seam between the engine and remote geocoding services.

use async_trait::async_trait;
use geofinder_core::{Coordinate, PlaceCandidate};

use crate::error::GeocodeError;

/// Queries shorter than this (after trimming) are never sent anywhere.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// `true` when `query` is long enough to be worth a network round trip.
#[must_use]
pub fn is_searchable(query: &str, min_chars: usize) -> bool {
    query.trim().chars().count() >= min_chars
}

/// A remote geocoding service.
///
/// Implementors provide the fallible `try_*` calls; callers use the
/// fail-soft [`forward_search`](GeoProvider::forward_search) and
/// [`reverse_lookup`](GeoProvider::reverse_lookup), which turn every failure
/// into "nothing found". Dropping either future cancels the underlying
/// request and produces neither a result nor a log line.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn min_query_chars(&self) -> usize {
        DEFAULT_MIN_QUERY_CHARS
    }

    /// Text to candidates, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on network failure, non-2xx status or a
    /// malformed body.
    async fn try_forward_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeocodeError>;

    /// Coordinate to address, surfacing failures. `Ok("")` means the service
    /// answered but knows no address there.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on network failure, non-2xx status or a
    /// malformed body.
    async fn try_reverse_lookup(&self, coordinate: Coordinate) -> Result<String, GeocodeError>;

    /// Fail-soft forward search. Too-short queries return immediately
    /// without any I/O.
    async fn forward_search(&self, query: &str, limit: usize) -> Vec<PlaceCandidate> {
        let query = query.trim();
        if !is_searchable(query, self.min_query_chars()) {
            tracing::debug!(provider = self.name(), "query below minimum length; skipping search");
            return Vec::new();
        }
        match self.try_forward_search(query, limit).await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(provider = self.name(), error = %error, "forward search failed");
                Vec::new()
            }
        }
    }

    /// Fail-soft reverse lookup; any failure yields an empty string.
    async fn reverse_lookup(&self, coordinate: Coordinate) -> String {
        match self.try_reverse_lookup(coordinate).await {
            Ok(address) => address,
            Err(error) => {
                tracing::warn!(
                    provider = self.name(),
                    %coordinate,
                    error = %error,
                    "reverse lookup failed"
                );
                String::new()
            }
        }
    }
}
