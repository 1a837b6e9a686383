use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use crate::app::types::FirebaseApp;

/// Callback run when an app is deleted, so services can drop cached instances.
pub type AppDeleteHook = Arc<dyn Fn(&FirebaseApp) + Send + Sync + 'static>;

static APPS: LazyLock<Mutex<HashMap<String, FirebaseApp>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static DELETE_HOOKS: LazyLock<Mutex<HashMap<&'static str, AppDeleteHook>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

pub(crate) fn apps_guard() -> MutexGuard<'static, HashMap<String, FirebaseApp>> {
    APPS.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Registers a teardown hook under `service`; registering the same name again
/// replaces the previous hook.
pub(crate) fn register_delete_hook(service: &'static str, hook: AppDeleteHook) {
    DELETE_HOOKS
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .insert(service, hook);
}

pub(crate) fn run_delete_hooks(app: &FirebaseApp) {
    let hooks: Vec<AppDeleteHook> = DELETE_HOOKS
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .values()
        .cloned()
        .collect();
    for hook in hooks {
        hook(app);
    }
}
