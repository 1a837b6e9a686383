//! Runtime environment detection and default configuration lookup.
//!
//! Defaults come from `__FIREBASE_DEFAULTS__` (environment variable, a JSON
//! file named by `__FIREBASE_DEFAULTS_PATH`, or the JS global of the same name
//! on the web) and, for the app options, from `FIREBASE_CONFIG`,
//! `FIREBASE_OPTIONS` or `FIREBASE_WEBAPP_CONFIG`.

use std::env;
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use serde_json::{Map, Value};

/// Key of the relay section inside `__FIREBASE_DEFAULTS__`.
pub const RELAY_DEFAULTS_KEY: &str = "messagingSw";
/// Environment variable holding a relay configuration (JSON, path or `key=value` list).
pub const RELAY_CONFIG_ENV: &str = "FIREBASE_MESSAGING_SW_CONFIG";

fn firebase_defaults() -> Option<Value> {
    defaults_from_env()
        .or_else(defaults_from_path)
        .or_else(defaults_from_global)
}

fn defaults_from_env() -> Option<Value> {
    let raw = env::var("__FIREBASE_DEFAULTS__").ok()?;
    serde_json::from_str::<Value>(&raw).ok()
}

fn defaults_from_path() -> Option<Value> {
    let path = env::var("__FIREBASE_DEFAULTS_PATH").ok()?;
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Value>(&content).ok()
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn defaults_from_global() -> Option<Value> {
    use wasm_bindgen::JsValue;

    let global = js_sys::global();
    let value = js_sys::Reflect::get(&global, &JsValue::from_str("__FIREBASE_DEFAULTS__")).ok()?;
    if value.is_null() || value.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value(value).ok()
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
fn defaults_from_global() -> Option<Value> {
    None
}

fn parse_config_source(raw: &str) -> Option<Value> {
    if let Ok(json) = serde_json::from_str::<Value>(raw) {
        if json.is_object() {
            return Some(json);
        }
    }

    if let Some(path) = treat_as_path(raw) {
        let parsed = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str::<Value>(&contents).ok());
        if let Some(json) = parsed.filter(Value::is_object) {
            return Some(json);
        }
    }

    parse_key_value_config(raw)
}

#[cfg(not(target_arch = "wasm32"))]
fn treat_as_path(raw: &str) -> Option<String> {
    if raw.contains('=') {
        return None;
    }
    let trimmed = raw.trim();
    Path::new(trimmed).exists().then(|| trimmed.to_string())
}

#[cfg(target_arch = "wasm32")]
fn treat_as_path(_raw: &str) -> Option<String> {
    None
}

fn parse_key_value_config(raw: &str) -> Option<Value> {
    let mut map = Map::new();
    for entry in raw.split(',') {
        let mut parts = entry.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    (!map.is_empty()).then_some(Value::Object(map))
}

fn config_from_env_vars(names: &[&str]) -> Option<Value> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(|raw| parse_config_source(&raw))
}

/// Retrieves the default app options as a JSON map when available.
pub fn default_app_config_json() -> Option<Map<String, Value>> {
    if let Some(defaults) = firebase_defaults() {
        if let Some(config) = defaults.get("config").and_then(Value::as_object) {
            return Some(config.clone());
        }
    }

    config_from_env_vars(&["FIREBASE_CONFIG", "FIREBASE_OPTIONS", "FIREBASE_WEBAPP_CONFIG"])?
        .as_object()
        .cloned()
}

/// Retrieves overrides for the notification relay as a JSON map when available.
pub fn default_relay_config_json() -> Option<Map<String, Value>> {
    if let Some(defaults) = firebase_defaults() {
        if let Some(config) = defaults.get(RELAY_DEFAULTS_KEY).and_then(Value::as_object) {
            return Some(config.clone());
        }
    }

    config_from_env_vars(&[RELAY_CONFIG_ENV])?.as_object().cloned()
}

/// Returns `true` when the code runs inside a `ServiceWorkerGlobalScope`.
pub fn is_service_worker() -> bool {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        use wasm_bindgen::JsCast;
        js_sys::global()
            .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
            .is_ok()
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        false
    }
}

/// Returns `true` when the code runs on a page with a `Window` global.
pub fn is_window() -> bool {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        use wasm_bindgen::JsCast;
        js_sys::global().dyn_into::<web_sys::Window>().is_ok()
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        false
    }
}
