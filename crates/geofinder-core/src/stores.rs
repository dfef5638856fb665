use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ConfigError;

/// A store as supplied by the page or a stores file.
///
/// Read-only from the engine's point of view. A store without a usable
/// coordinate can still be listed but never gets a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoreRecord", into = "StoreRecord")]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<u32>,
    pub product_count: Option<u32>,
}

/// On-disk shape with separate `lat`/`lng` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreRecord {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    reviews: Option<u32>,
    #[serde(default)]
    product_count: Option<u32>,
}

impl From<StoreRecord> for Store {
    fn from(record: StoreRecord) -> Self {
        let coordinate = match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        };
        Self {
            id: record.id,
            name: record.name,
            coordinate,
            address: record.address,
            location: record.location,
            city: record.city,
            rating: record.rating,
            reviews: record.reviews,
            product_count: record.product_count,
        }
    }
}

impl From<Store> for StoreRecord {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            lat: store.coordinate.map(Coordinate::latitude),
            lng: store.coordinate.map(Coordinate::longitude),
            address: store.address,
            location: store.location,
            city: store.city,
            rating: store.rating,
            reviews: store.reviews,
            product_count: store.product_count,
        }
    }
}

impl Store {
    /// Name shown on cards and markers; falls back to `"Store"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "Store"
        } else {
            name
        }
    }

    /// First non-empty of street address, free-form location, city.
    #[must_use]
    pub fn address_line(&self) -> &str {
        [&self.address, &self.location, &self.city]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<Store>,
}

/// Load and validate a stores file.
///
/// The file may be YAML or JSON (`{"stores": [...]}`); YAML parsing accepts
/// both.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if !seen_ids.insert(store.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: {} ('{}')",
                store.id,
                store.display_name()
            )));
        }

        if let Some(rating) = store.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "store {} has invalid rating {rating}; must be between 0 and 5",
                    store.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<StoresFile, ConfigError> {
        let file: StoresFile = serde_yaml::from_str(yaml).map_err(ConfigError::StoresFileParse)?;
        validate_stores(&file)?;
        Ok(file)
    }

    #[test]
    fn parses_yaml_with_lat_lng() {
        let file = parse(
            r"
stores:
  - id: 1
    name: Harbour Fresh
    lat: 27.7
    lng: 85.3
    city: Kathmandu
    rating: 4.5
    reviews: 12
    product_count: 30
",
        )
        .expect("valid yaml");
        let store = &file.stores[0];
        assert_eq!(store.id, 1);
        let c = store.coordinate.expect("coordinate present");
        assert!((c.latitude() - 27.7).abs() < 1e-9);
        assert!((c.longitude() - 85.3).abs() < 1e-9);
        assert_eq!(store.product_count, Some(30));
    }

    #[test]
    fn parses_json_document() {
        let file = parse(r#"{"stores": [{"id": 7, "name": "Dock 7", "lat": null, "lng": null}]}"#)
            .expect("valid json");
        assert_eq!(file.stores.len(), 1);
        assert!(file.stores[0].coordinate.is_none());
    }

    #[test]
    fn half_coordinate_is_absent() {
        let file = parse("stores:\n  - id: 1\n    lat: 10.0\n").expect("valid yaml");
        assert!(file.stores[0].coordinate.is_none());
    }

    #[test]
    fn out_of_range_coordinate_is_absent() {
        let file = parse("stores:\n  - id: 1\n    lat: 100.0\n    lng: 10.0\n").expect("valid");
        assert!(file.stores[0].coordinate.is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = parse("stores:\n  - id: 1\n    name: A\n  - id: 1\n    name: B\n");
        assert!(
            matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("duplicate store id")),
            "got: {result:?}"
        );
    }

    #[test]
    fn rating_above_five_is_rejected() {
        let result = parse("stores:\n  - id: 1\n    rating: 7.5\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn display_name_falls_back_when_blank() {
        let file = parse("stores:\n  - id: 1\n    name: '  '\n").expect("valid");
        assert_eq!(file.stores[0].display_name(), "Store");
    }

    #[test]
    fn address_line_prefers_address_then_location_then_city() {
        let file = parse(
            "stores:\n  - id: 1\n    address: ''\n    location: Pier 4\n    city: Pokhara\n",
        )
        .expect("valid");
        assert_eq!(file.stores[0].address_line(), "Pier 4");
    }

    #[test]
    fn serialize_round_trips_through_lat_lng_fields() {
        let file = parse("stores:\n  - id: 3\n    lat: 1.5\n    lng: 2.5\n").expect("valid");
        let json = serde_json::to_value(&file.stores[0]).expect("serialize");
        assert_eq!(json["lat"], serde_json::json!(1.5));
        assert_eq!(json["lng"], serde_json::json!(2.5));
    }

    #[test]
    fn load_stores_reports_missing_file() {
        let result = load_stores(Path::new("/definitely/not/here/stores.yaml"));
        assert!(matches!(result, Err(ConfigError::StoresFileIo { .. })));
    }

    #[test]
    fn bundled_stores_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("stores.yaml");
        let file = load_stores(&path).expect("bundled stores.yaml should load");
        assert!(!file.stores.is_empty());
        assert!(file.stores.iter().any(|s| s.coordinate.is_none()));
    }
}
