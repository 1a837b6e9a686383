//! Firebase app registry: the project credentials a worker is initialised with.
//!
//! A service worker calls [`initialize_app`] once at start-up with the options
//! copied from the Firebase console (or lets them resolve from
//! `__FIREBASE_DEFAULTS__`); messaging instances are then looked up per app.
mod api;
mod constants;
mod errors;
mod logger;
pub(crate) mod registry;
mod types;

#[doc(inline)]
pub use api::{delete_app, get_app, get_apps, initialize_app, on_log, set_log_level, SDK_VERSION};

#[doc(inline)]
pub use constants::DEFAULT_ENTRY_NAME;

#[doc(inline)]
pub use errors::{AppError, AppResult};

#[doc(inline)]
pub use logger::{LogCallback, LogLevel, LogOptions, Logger, LOGGER};

#[doc(inline)]
pub use types::{
    get_default_app_config, FirebaseApp, FirebaseAppConfig, FirebaseAppSettings, FirebaseOptions,
};
