//! Owns the single current location of an engine and every provider call
//! that may change it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::Abortable;
use geofinder_core::{Coordinate, PlaceCandidate, ResolvedLocation};
use geofinder_provider::{is_searchable, GeoProvider};

use crate::token::{Channel, QueryToken, RequestChannel};

/// Why the current location changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    Click,
    Drag,
    Geolocate,
    SearchSelect,
    Freeform,
    Init,
}

impl UpdateReason {
    /// Whether the map should re-center on the new location. A raw click
    /// leaves the viewport where the user put it.
    #[must_use]
    pub fn recenters(self) -> bool {
        !matches!(self, UpdateReason::Click)
    }
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateReason::Click => "click",
            UpdateReason::Drag => "drag",
            UpdateReason::Geolocate => "geolocate",
            UpdateReason::SearchSelect => "search-select",
            UpdateReason::Freeform => "freeform",
            UpdateReason::Init => "init",
        };
        f.write_str(label)
    }
}

/// Receives a snapshot after every applied mutation.
pub trait LocationSubscriber: Send + Sync {
    fn on_location(&self, location: &ResolvedLocation, reason: UpdateReason);
}

/// Result of [`LocationResolver::set_from_coordinate`]'s reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The address was filled in.
    Addressed(String),
    /// The provider found nothing (or failed); the coordinate stands alone.
    NoAddress,
    /// A newer mutation won; the result was discarded.
    Superseded,
}

/// Result of [`LocationResolver::select_freeform_text`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Selected(ResolvedLocation),
    /// The search ran and returned nothing; the location is unchanged.
    NoMatch,
    /// The text was below the provider minimum; nothing was sent.
    TooShort,
    /// A newer search replaced this one before it finished.
    Superseded,
}

#[derive(Debug)]
struct ResolverState {
    current: Option<ResolvedLocation>,
    search: RequestChannel,
    resolve: RequestChannel,
}

/// Orchestrates forward and reverse geocoding around one
/// [`ResolvedLocation`].
///
/// Search and resolve are independent channels, each with at most one call
/// in flight. Locks are never held across an `.await`; staleness is decided
/// by token on completion.
pub struct LocationResolver {
    provider: Arc<dyn GeoProvider>,
    search_limit: usize,
    state: Mutex<ResolverState>,
    subscribers: Mutex<Vec<Arc<dyn LocationSubscriber>>>,
}

impl LocationResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn GeoProvider>, search_limit: usize) -> Self {
        Self {
            provider,
            search_limit,
            state: Mutex::new(ResolverState {
                current: None,
                search: RequestChannel::new(Channel::Search),
                resolve: RequestChannel::new(Channel::Resolve),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn LocationSubscriber>) {
        lock(&self.subscribers).push(subscriber);
    }

    #[must_use]
    pub fn current(&self) -> Option<ResolvedLocation> {
        lock(&self.state).current.clone()
    }

    #[must_use]
    pub fn min_query_chars(&self) -> usize {
        self.provider.min_query_chars()
    }

    /// Moves the location to `coordinate` right away (address cleared), then
    /// fills in the address from a reverse lookup unless something newer has
    /// happened in the meantime.
    pub async fn set_from_coordinate(
        &self,
        coordinate: Coordinate,
        reason: UpdateReason,
    ) -> LookupOutcome {
        let optimistic = ResolvedLocation::unaddressed(coordinate);
        let (token, registration) = {
            let mut state = lock(&self.state);
            state.current = Some(optimistic.clone());
            state.resolve.issue()
        };
        self.notify(&optimistic, reason);

        let lookup = Abortable::new(self.provider.reverse_lookup(coordinate), registration);
        let Ok(address) = lookup.await else {
            tracing::debug!(%token, %coordinate, "reverse lookup aborted");
            return LookupOutcome::Superseded;
        };

        let updated = {
            let mut state = lock(&self.state);
            if !state.resolve.complete(token) {
                tracing::debug!(%token, %coordinate, "discarding stale reverse lookup");
                return LookupOutcome::Superseded;
            }
            if address.is_empty() {
                return LookupOutcome::NoAddress;
            }
            let Some(current) = state.current.as_mut() else {
                return LookupOutcome::Superseded;
            };
            current.address.clone_from(&address);
            current.clone()
        };
        self.notify(&updated, reason);
        LookupOutcome::Addressed(address)
    }

    /// Forward search that never touches the current location.
    ///
    /// Returns `None` when a newer search superseded this one, which callers
    /// must not confuse with `Some(vec![])` ("no matches").
    pub async fn resolve_from_text(&self, query: &str) -> Option<Vec<PlaceCandidate>> {
        self.search(query).await.map(|(_, candidates)| candidates)
    }

    async fn search(&self, query: &str) -> Option<(QueryToken, Vec<PlaceCandidate>)> {
        let (token, registration) = lock(&self.state).search.issue();

        let search = Abortable::new(
            self.provider.forward_search(query, self.search_limit),
            registration,
        );
        let Ok(candidates) = search.await else {
            tracing::debug!(%token, "forward search aborted");
            return None;
        };

        if !lock(&self.state).search.complete(token) {
            tracing::debug!(%token, "discarding stale forward search");
            return None;
        }
        Some((token, candidates))
    }

    /// Adopts `candidate` as the location. Neither a pending reverse lookup
    /// nor a search started earlier (suggestions or freeform) can overwrite
    /// it.
    pub fn select_candidate(&self, candidate: PlaceCandidate) -> ResolvedLocation {
        self.apply(candidate.into(), UpdateReason::SearchSelect)
    }

    /// Searches `query` again and adopts the first hit.
    pub async fn select_freeform_text(&self, query: &str) -> SelectionOutcome {
        if !is_searchable(query, self.min_query_chars()) {
            return SelectionOutcome::TooShort;
        }
        let Some((token, candidates)) = self.search(query).await else {
            return SelectionOutcome::Superseded;
        };
        let Some(first) = candidates.into_iter().next() else {
            tracing::debug!(query = query.trim(), "freeform text matched nothing");
            return SelectionOutcome::NoMatch;
        };

        let location = ResolvedLocation::from(first);
        {
            let mut state = lock(&self.state);
            // A pick may have landed since the search completed.
            if !state.search.is_current(token) {
                return SelectionOutcome::Superseded;
            }
            state.resolve.invalidate();
            state.current = Some(location.clone());
        }
        self.notify(&location, UpdateReason::Freeform);
        SelectionOutcome::Selected(location)
    }

    /// Installs a location restored from form fields at start-up.
    pub fn seed(&self, location: ResolvedLocation) {
        self.apply(location, UpdateReason::Init);
    }

    /// Forgets the current location and makes every outstanding call stale.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.current = None;
        state.search.invalidate();
        state.resolve.invalidate();
    }

    fn apply(&self, location: ResolvedLocation, reason: UpdateReason) -> ResolvedLocation {
        {
            let mut state = lock(&self.state);
            state.resolve.invalidate();
            if reason == UpdateReason::SearchSelect {
                state.search.invalidate();
            }
            state.current = Some(location.clone());
        }
        self.notify(&location, reason);
        location
    }

    fn notify(&self, location: &ResolvedLocation, reason: UpdateReason) {
        // Snapshot so subscribers may call back into the resolver.
        let subscribers = lock(&self.subscribers).clone();
        tracing::debug!(
            %reason,
            coordinate = %location.coordinate,
            has_address = location.has_address(),
            "location updated"
        );
        for subscriber in subscribers {
            subscriber.on_location(location, reason);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
