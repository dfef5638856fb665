//! Geographic primitives: validated coordinates, bounding boxes and
//! great-circle distance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returned when a latitude/longitude pair is not a point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate out of range: ({latitude}, {longitude})")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A WGS84 point in decimal degrees.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`;
/// the only way to build one is through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Center of the whole-world map view, near the equator.
pub const WORLD_CENTER: Coordinate = Coordinate {
    latitude: 20.0,
    longitude: 0.0,
};

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] when either component is NaN, infinite
    /// or outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    #[must_use]
    pub fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(self, other: Coordinate) -> f64 {
        distance_km(self, other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two coordinates on a sphere of
/// [`EARTH_RADIUS_KM`].
///
/// `distance_km(a, a)` is exactly `0.0` and the result does not depend on
/// argument order.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Axis-aligned lat/lng box, used to fit a map viewport around markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut south, mut west, mut north, mut east) = (
            first.latitude,
            first.longitude,
            first.latitude,
            first.longitude,
        );
        for p in iter {
            south = south.min(p.latitude);
            north = north.max(p.latitude);
            west = west.min(p.longitude);
            east = east.max(p.longitude);
        }
        Some(Self {
            south_west: Coordinate {
                latitude: south,
                longitude: west,
            },
            north_east: Coordinate {
                latitude: north,
                longitude: east,
            },
        })
    }
}
