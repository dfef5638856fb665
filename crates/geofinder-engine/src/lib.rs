pub mod debounce;
pub mod engine;
pub mod geolocation;
pub mod resolver;
pub mod session;
pub mod sync;
pub mod token;
pub mod view;

pub use debounce::{debounce_channel, DebounceSender, QueryDebouncer, DEFAULT_QUIET_PERIOD};
pub use engine::{
    Collaborators, DetectOutcome, EngineSettings, LocatorEngine, DETECT_FAILED_NOTICE,
};
pub use geolocation::{FixedGeolocator, GeolocationError, GeolocationOptions, Geolocator};
pub use resolver::{
    LocationResolver, LocationSubscriber, LookupOutcome, SelectionOutcome, UpdateReason,
};
pub use session::{SearchSession, SessionEvent, SessionState};
pub use sync::ViewSyncController;
pub use token::{Channel, QueryToken, RequestChannel};
pub use view::{
    FormFields, LocationFields, MapView, MarkerHandle, MarkerMeta, Notifier, ResultList,
    SuggestionList, DEFAULT_ZOOM,
};
