use crate::app::constants::DEFAULT_ENTRY_NAME;
use crate::app::errors::{AppError, AppResult};
use crate::app::logger::{self, LogCallback, LogLevel, LogOptions, LOGGER};
use crate::app::registry;
use crate::app::types::{
    get_default_app_config, FirebaseApp, FirebaseAppConfig, FirebaseAppSettings, FirebaseOptions,
};

pub static SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

fn normalize_name(settings: &FirebaseAppSettings) -> AppResult<String> {
    let name = settings
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_string());
    if name.trim().is_empty() {
        return Err(AppError::BadAppName { app_name: name });
    }
    Ok(name)
}

fn ensure_options(options: FirebaseOptions) -> AppResult<FirebaseOptions> {
    if options.is_defined() {
        return Ok(options);
    }
    get_default_app_config().ok_or(AppError::NoOptions)
}

/// Creates (or returns the identical existing) app holding the project credentials.
///
/// Empty `options` fall back to the environment defaults. Re-initialising a name
/// with different options or settings fails with [`AppError::DuplicateApp`].
pub fn initialize_app(
    options: FirebaseOptions,
    settings: Option<FirebaseAppSettings>,
) -> AppResult<FirebaseApp> {
    let settings = settings.unwrap_or_default();
    let name = normalize_name(&settings)?;
    let automatic = settings.automatic_data_collection_enabled.unwrap_or(true);
    let options = ensure_options(options)?;
    let config = FirebaseAppConfig::new(name.clone(), automatic);

    let mut apps = registry::apps_guard();
    if let Some(existing) = apps.get(&name) {
        if options == existing.options() && config == existing.config() {
            return Ok(existing.clone());
        }
        return Err(AppError::DuplicateApp { app_name: name });
    }

    let app = FirebaseApp::new(options, config);
    apps.insert(name.clone(), app.clone());
    drop(apps);

    LOGGER.debug(format!("Initialized Firebase app '{name}'"));
    Ok(app)
}

pub fn get_app(name: Option<&str>) -> AppResult<FirebaseApp> {
    let lookup = name.unwrap_or(DEFAULT_ENTRY_NAME);
    registry::apps_guard()
        .get(lookup)
        .cloned()
        .ok_or_else(|| AppError::NoApp {
            app_name: lookup.to_string(),
        })
}

pub fn get_apps() -> Vec<FirebaseApp> {
    registry::apps_guard().values().cloned().collect()
}

/// Removes the app from the registry, tears down its services and marks it deleted.
pub fn delete_app(app: &FirebaseApp) -> AppResult<()> {
    let removed = registry::apps_guard().remove(app.name());
    if removed.is_some() {
        registry::run_delete_hooks(app);
        app.set_is_deleted(true);
        LOGGER.debug(format!("Deleted Firebase app '{}'", app.name()));
    }
    Ok(())
}

pub fn on_log(callback: Option<LogCallback>, options: Option<LogOptions>) -> AppResult<()> {
    logger::set_user_log_handler(callback, options);
    Ok(())
}

pub fn set_log_level(level: LogLevel) {
    let _ = logger::set_log_level(level);
}
