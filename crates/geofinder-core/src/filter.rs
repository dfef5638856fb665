//! Radius filtering and distance ordering over a fixed entity set.
//!
//! One code path serves both the "show everything, nearest first" finder and
//! the radius-bounded variant: the radius is simply optional.

use std::cmp::Ordering;

use crate::geo::Coordinate;
use crate::location::PlaceCandidate;
use crate::stores::Store;

/// Anything that may or may not have a position on the map.
pub trait Located {
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Located for Store {
    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

impl Located for PlaceCandidate {
    fn coordinate(&self) -> Option<Coordinate> {
        Some(self.coordinate)
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn coordinate(&self) -> Option<Coordinate> {
        (**self).coordinate()
    }
}

/// An entity paired with its distance from the current center.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<E> {
    pub entity: E,
    /// `None` when there is no center or the entity has no coordinate.
    pub distance_km: Option<f64>,
}

/// Ordered output of [`EntityFilterIndex::compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult<E> {
    entries: Vec<Ranked<E>>,
}

impl<E> FilterResult<E> {
    #[must_use]
    pub fn entries(&self) -> &[Ranked<E>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ranked<E>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for FilterResult<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<'a, E> IntoIterator for &'a FilterResult<E> {
    type Item = &'a Ranked<E>;
    type IntoIter = std::slice::Iter<'a, Ranked<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Ascending distance with missing distances last.
#[must_use]
pub fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A fixed entity set that can be ranked around any center.
#[derive(Debug, Clone)]
pub struct EntityFilterIndex<E> {
    entities: Vec<E>,
}

impl<E> Default for EntityFilterIndex<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
        }
    }
}

impl<E: Located + Clone> EntityFilterIndex<E> {
    #[must_use]
    pub fn new(entities: Vec<E>) -> Self {
        Self { entities }
    }

    #[must_use]
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Filter and order the entity set around `center`.
    ///
    /// - No center: input order, no distances, nothing removed.
    /// - Center, radius absent or not positive: everything kept, nearest
    ///   first, coordinate-less entities last.
    /// - Center and positive radius: entities without a coordinate or farther
    ///   than `radius_km` are dropped; the rest are nearest first.
    ///
    /// The sort is stable, so ties and coordinate-less entries keep their
    /// input order.
    #[must_use]
    pub fn compute(&self, center: Option<Coordinate>, radius_km: Option<f64>) -> FilterResult<E> {
        let Some(center) = center else {
            return FilterResult {
                entries: self
                    .entities
                    .iter()
                    .map(|entity| Ranked {
                        entity: entity.clone(),
                        distance_km: None,
                    })
                    .collect(),
            };
        };

        // NaN fails the comparison and therefore disables the radius.
        let radius_km = radius_km.filter(|r| *r > 0.0);

        let mut entries: Vec<Ranked<E>> = self
            .entities
            .iter()
            .filter_map(|entity| {
                let distance_km = entity.coordinate().map(|c| center.distance_km(c));
                match (radius_km, distance_km) {
                    (Some(_), None) => None,
                    (Some(radius), Some(d)) if d > radius => None,
                    _ => Some(Ranked {
                        entity: entity.clone(),
                        distance_km,
                    }),
                }
            })
            .collect();

        entries.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));

        FilterResult { entries }
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
