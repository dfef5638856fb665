pub mod error;
pub mod fallback;
pub mod http;
pub mod nominatim;
pub mod photon;
pub mod provider;
pub mod types;

pub use error::GeocodeError;
pub use fallback::FallbackProvider;
pub use http::HttpSettings;
pub use nominatim::NominatimProvider;
pub use photon::PhotonProvider;
pub use provider::{is_searchable, GeoProvider, DEFAULT_MIN_QUERY_CHARS};
