use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One forward-search hit: a human-readable label and where it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub label: String,
    pub coordinate: Coordinate,
}

/// The single place an engine instance currently reflects.
///
/// `address` is empty while a reverse lookup is still outstanding or when
/// the lookup produced nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub address: String,
}

impl ResolvedLocation {
    #[must_use]
    pub fn new(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: address.into(),
        }
    }

    /// A location whose address has not been resolved yet.
    #[must_use]
    pub fn unaddressed(coordinate: Coordinate) -> Self {
        Self::new(coordinate, String::new())
    }

    #[must_use]
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

impl From<PlaceCandidate> for ResolvedLocation {
    fn from(candidate: PlaceCandidate) -> Self {
        Self {
            coordinate: candidate.coordinate,
            address: candidate.label,
        }
    }
}
