//! Wire types for the geocoding services.
//!
//! Nominatim (and the same-origin proxy, which passes Nominatim's JSON
//! through) encodes `lat`/`lon` as decimal strings; some mirrors send numbers.
//! Photon answers with a GeoJSON `FeatureCollection`.

use geofinder_core::{Coordinate, PlaceCandidate};
use serde::Deserialize;

/// A JSON value that is either a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Nominatim
// ---------------------------------------------------------------------------

/// One element of a Nominatim `/search` array.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lat: Option<NumberOrString>,
    #[serde(default)]
    pub lon: Option<NumberOrString>,
}

impl NominatimPlace {
    /// Converts to a candidate, or `None` when the label is blank or the
    /// coordinates are missing, unparsable or out of range.
    #[must_use]
    pub fn into_candidate(self) -> Option<PlaceCandidate> {
        let label = self.display_name?.trim().to_string();
        if label.is_empty() {
            return None;
        }
        let lat = self.lat?.as_f64()?;
        let lon = self.lon?.as_f64()?;
        let coordinate = Coordinate::new(lat, lon).ok()?;
        Some(PlaceCandidate { label, coordinate })
    }
}

/// Body of a Nominatim `/reverse` response.
///
/// Points Nominatim cannot resolve (open sea, say) come back as
/// `{"error": "Unable to geocode"}`.
#[derive(Debug, Default, Deserialize)]
pub struct NominatimReverse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl NominatimReverse {
    #[must_use]
    pub fn into_address(self) -> String {
        self.display_name
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Photon
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PhotonCollection {
    #[serde(default)]
    pub features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
pub struct PhotonFeature {
    pub geometry: PhotonGeometry,
    #[serde(default)]
    pub properties: PhotonProperties,
}

/// GeoJSON point; `coordinates` is `[lon, lat]`.
#[derive(Debug, Deserialize)]
pub struct PhotonGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotonProperties {
    pub name: Option<String>,
    pub housenumber: Option<String>,
    pub street: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl PhotonProperties {
    /// Builds a Nominatim-style comma-separated label:
    /// `name, street housenumber, postcode city, state, country`.
    ///
    /// Empty parts are skipped and a part equal to its predecessor is
    /// dropped (Photon often repeats the city as the name).
    #[must_use]
    pub fn label(&self) -> String {
        fn joined(a: Option<&String>, b: Option<&String>) -> Option<String> {
            let parts: Vec<&str> = [a, b]
                .into_iter()
                .flatten()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }

        let parts = [
            self.name.clone(),
            joined(self.street.as_ref(), self.housenumber.as_ref()),
            joined(self.postcode.as_ref(), self.city.as_ref()),
            self.state.clone(),
            self.country.clone(),
        ];

        let mut label: Vec<String> = Vec::new();
        for part in parts.into_iter().flatten() {
            let part = part.trim().to_string();
            if part.is_empty() || label.last() == Some(&part) {
                continue;
            }
            label.push(part);
        }
        label.join(", ")
    }
}

impl PhotonFeature {
    #[must_use]
    pub fn into_candidate(self) -> Option<PlaceCandidate> {
        let [lon, lat] = self.geometry.coordinates[..] else {
            return None;
        };
        let coordinate = Coordinate::new(lat, lon).ok()?;
        let label = self.properties.label();
        if label.is_empty() {
            return None;
        }
        Some(PlaceCandidate { label, coordinate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nominatim_place_parses_string_coordinates() {
        let place: NominatimPlace = serde_json::from_value(json!({
            "display_name": "123 Main St, Springfield",
            "lat": "1.5",
            "lon": "-2.25"
        }))
        .unwrap();
        let candidate = place.into_candidate().expect("valid candidate");
        assert_eq!(candidate.label, "123 Main St, Springfield");
        assert!((candidate.coordinate.latitude() - 1.5).abs() < 1e-12);
        assert!((candidate.coordinate.longitude() + 2.25).abs() < 1e-12);
    }

    #[test]
    fn nominatim_place_accepts_numeric_coordinates() {
        let place: NominatimPlace =
            serde_json::from_value(json!({"display_name": "X", "lat": 3, "lon": 4.5})).unwrap();
        assert!(place.into_candidate().is_some());
    }

    #[test]
    fn nominatim_place_without_label_or_coordinates_is_dropped() {
        let no_label: NominatimPlace =
            serde_json::from_value(json!({"lat": "1", "lon": "2"})).unwrap();
        assert!(no_label.into_candidate().is_none());

        let bad_lat: NominatimPlace =
            serde_json::from_value(json!({"display_name": "X", "lat": "north", "lon": "2"}))
                .unwrap();
        assert!(bad_lat.into_candidate().is_none());

        let out_of_range: NominatimPlace =
            serde_json::from_value(json!({"display_name": "X", "lat": "91", "lon": "2"})).unwrap();
        assert!(out_of_range.into_candidate().is_none());
    }

    #[test]
    fn nominatim_reverse_error_body_is_empty_address() {
        let body: NominatimReverse =
            serde_json::from_value(json!({"error": "Unable to geocode"})).unwrap();
        assert_eq!(body.into_address(), "");
    }

    #[test]
    fn photon_label_joins_and_deduplicates_parts() {
        let props = PhotonProperties {
            name: Some("Berlin".into()),
            city: Some("Berlin".into()),
            postcode: None,
            country: Some("Germany".into()),
            ..PhotonProperties::default()
        };
        assert_eq!(props.label(), "Berlin, Germany");
    }

    #[test]
    fn photon_label_combines_street_and_number() {
        let props = PhotonProperties {
            street: Some("Main St".into()),
            housenumber: Some("123".into()),
            postcode: Some("62701".into()),
            city: Some("Springfield".into()),
            ..PhotonProperties::default()
        };
        assert_eq!(props.label(), "Main St 123, 62701 Springfield");
    }

    #[test]
    fn photon_feature_swaps_lon_lat() {
        let feature: PhotonFeature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [13.4, 52.5]},
            "properties": {"name": "Berlin"}
        }))
        .unwrap();
        let candidate = feature.into_candidate().unwrap();
        assert!((candidate.coordinate.latitude() - 52.5).abs() < 1e-12);
        assert!((candidate.coordinate.longitude() - 13.4).abs() < 1e-12);
    }

    #[test]
    fn photon_feature_with_malformed_geometry_is_dropped() {
        let feature: PhotonFeature = serde_json::from_value(json!({
            "geometry": {"coordinates": [13.4]},
            "properties": {"name": "Nowhere"}
        }))
        .unwrap();
        assert!(feature.into_candidate().is_none());
    }
}
