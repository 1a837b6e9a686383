//! Environment capability checks for the messaging service worker.
//!
//! The worker needs the Notifications API on its registration, the `clients`
//! interface for click routing, and the Push API. On native targets nothing
//! of this exists and the check reports `false`.

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
use js_sys::Reflect;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
use wasm_bindgen::{JsCast, JsValue};

/// Returns `true` when the current global scope is a service worker able to
/// receive pushes and show notifications.
///
/// # Examples
///
/// ```
/// use firebase_messaging_sw::messaging;
///
/// if messaging::is_supported() {
///     // Safe to install the notification relay listeners.
/// }
/// ```
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub fn is_supported() -> bool {
    let scope = match js_sys::global().dyn_into::<web_sys::ServiceWorkerGlobalScope>() {
        Ok(scope) => scope,
        Err(_) => return false,
    };
    let scope_js = JsValue::from(scope);

    if !property_in(&scope_js, "clients")
        || !property_in(&scope_js, "registration")
        || !property_in(&scope_js, "PushManager")
    {
        return false;
    }

    prototype_has_property(&scope_js, "ServiceWorkerRegistration", "showNotification")
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn property_in(target: &JsValue, property: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(property)).unwrap_or(false)
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn prototype_has_property(target: &JsValue, constructor: &str, property: &str) -> bool {
    let Ok(ctor) = Reflect::get(target, &JsValue::from_str(constructor)) else {
        return false;
    };
    let Ok(prototype) = Reflect::get(&ctor, &JsValue::from_str("prototype")) else {
        return false;
    };
    prototype
        .dyn_ref::<js_sys::Object>()
        .map(|obj| obj.has_own_property(&JsValue::from_str(property)))
        .unwrap_or(false)
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
pub fn is_supported() -> bool {
    false
}

#[cfg(all(test, not(all(feature = "wasm-web", target_arch = "wasm32"))))]
mod tests {
    #[test]
    fn non_wasm_targets_are_not_supported() {
        assert!(!super::is_supported());
    }
}
