//! `search` and `reverse`: one provider call each, printed to stdout.
//!
//! Unlike the engine, these surface provider failures as errors so a script
//! can tell "nothing found" from "service down".

use geofinder_core::{Coordinate, PlaceCandidate};
use geofinder_provider::{is_searchable, GeoProvider};

pub(crate) async fn run_search(
    provider: &dyn GeoProvider,
    query: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let query = query.trim();
    let min_chars = provider.min_query_chars();
    if !is_searchable(query, min_chars) {
        anyhow::bail!("query must be at least {min_chars} characters");
    }

    let candidates = provider.try_forward_search(query, limit).await?;
    tracing::info!(query, count = candidates.len(), "search finished");

    if candidates.is_empty() {
        println!("no places match '{query}'");
        return Ok(());
    }
    for (rank, candidate) in candidates.iter().enumerate() {
        println!("{}", format_candidate(rank + 1, candidate));
    }
    Ok(())
}

pub(crate) async fn run_reverse(
    provider: &dyn GeoProvider,
    lat: f64,
    lon: f64,
) -> anyhow::Result<()> {
    let coordinate = Coordinate::new(lat, lon)?;
    let address = provider.try_reverse_lookup(coordinate).await?;

    if address.is_empty() {
        println!("no address found at {coordinate}");
    } else {
        println!("{address}");
    }
    Ok(())
}

pub(crate) fn format_candidate(rank: usize, candidate: &PlaceCandidate) -> String {
    format!("{rank:>2}. {}  {}", candidate.coordinate, candidate.label)
}
