//! Device position source.

use std::time::Duration;

use async_trait::async_trait;
use geofinder_core::Coordinate;
use thiserror::Error;

/// Options passed to every position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A cached fix younger than this may be returned.
    pub max_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
        }
    }
}

/// Every way a position request can fail. The engine treats them all alike.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("position unavailable")]
    Unavailable,
    #[error("geolocation is not supported on this device")]
    Unsupported,
}

/// Where [`LocatorEngine::detect_location`](crate::LocatorEngine::detect_location)
/// gets a position from. Timeout and maximum age are enforced by the source.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`GeolocationError`] describing why no fix is available.
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Coordinate, GeolocationError>;
}

/// A source with a fixed answer: a configured position, or
/// [`GeolocationError::Unsupported`] when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinate>,
}

impl FixedGeolocator {
    #[must_use]
    pub fn at(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinate, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_ask_for_fresh_high_accuracy_fix() {
        let options = GeolocationOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.max_age, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn fixed_geolocator_answers_or_reports_unsupported() {
        let here = Coordinate::new(48.2, 16.37).unwrap();
        let options = GeolocationOptions::default();
        assert_eq!(
            FixedGeolocator::at(here).current_position(&options).await,
            Ok(here)
        );
        assert_eq!(
            FixedGeolocator::unsupported()
                .current_position(&options)
                .await,
            Err(GeolocationError::Unsupported)
        );
    }
}
