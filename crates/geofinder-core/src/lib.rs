pub mod app_config;
pub mod config;
pub mod filter;
pub mod geo;
pub mod location;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{compare_distance, EntityFilterIndex, FilterResult, Located, Ranked};
pub use geo::{
    distance_km, Bounds, Coordinate, InvalidCoordinate, EARTH_RADIUS_KM, WORLD_CENTER,
};
pub use location::{PlaceCandidate, ResolvedLocation};
pub use stores::{load_stores, Store, StoresFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[source] serde_yaml::Error),

    #[error("stores validation error: {0}")]
    Validation(String),
}
