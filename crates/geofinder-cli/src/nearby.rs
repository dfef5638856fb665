use std::path::Path;

use anyhow::Context;
use geofinder_core::{Coordinate, EntityFilterIndex, FilterResult, Ranked, Store};

/// Loads the stores file, logging how many entries lack a usable coordinate.
pub(crate) fn load_store_list(path: &Path) -> anyhow::Result<Vec<Store>> {
    let file = geofinder_core::load_stores(path)
        .with_context(|| format!("loading stores from {}", path.display()))?;

    let unplaced = file.stores.iter().filter(|s| s.coordinate.is_none()).count();
    if unplaced > 0 {
        tracing::warn!(unplaced, "stores without coordinates are listed but never mapped");
    }
    tracing::debug!(count = file.stores.len(), path = %path.display(), "stores loaded");
    Ok(file.stores)
}

pub(crate) fn run_nearby(
    path: &Path,
    lat: f64,
    lon: f64,
    radius_km: Option<f64>,
) -> anyhow::Result<()> {
    let center = Coordinate::new(lat, lon)?;
    let index = EntityFilterIndex::new(load_store_list(path)?);
    let result = index.compute(Some(center), radius_km);
    print_stores(&result, radius_km);
    Ok(())
}

pub(crate) fn print_stores(result: &FilterResult<Store>, radius_km: Option<f64>) {
    if result.is_empty() {
        match radius_km {
            Some(radius) => println!("no stores within {radius} km"),
            None => println!("no stores"),
        }
        return;
    }
    for row in result {
        println!("{}", format_row(row));
    }
}

pub(crate) fn format_row(row: &Ranked<Store>) -> String {
    let distance = row
        .distance_km
        .map_or_else(|| "-".to_string(), |d| format!("{d:.2} km"));
    let store = &row.entity;
    let line = format!(
        "{:>5}  {:<28}  {:>10}  {}",
        store.id,
        store.display_name(),
        distance,
        store.address_line()
    );
    line.trim_end().to_string()
}
