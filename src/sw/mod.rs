#![doc = include_str!("README.md")]
mod click;
mod config;
mod lifecycle;
mod memory;
mod notification;
mod relay;
mod scope;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub mod web;

pub use click::{
    resolve_target, same_origin, ClickOutcome, NavigationMessage, NotificationClick,
    ShownNotification,
};
pub use config::{
    RelayConfig, DEFAULT_CLICK_ACTION, DEFAULT_FALLBACK_BODY, DEFAULT_FALLBACK_TITLE,
    DEFAULT_ICON, DEFAULT_NAVIGATION_MESSAGE_TYPE, DEFAULT_SKIP_WAITING_MESSAGE_TYPE, DEFAULT_TAG,
    DEFAULT_TAG_DATA_KEY, DEFAULT_TARGET_URL, DEFAULT_VIEW_ACTION, DEFAULT_VIEW_ACTION_TITLE,
};
pub use lifecycle::{ControlMessage, CONTROL_TYPE_KEY};
pub use memory::{InMemoryScope, ScopeCall, ScopeOperation};
pub use notification::{
    NotificationAction, NotificationDescriptor, NotificationOptions, CLICK_ACTION_DATA_KEY,
    URL_DATA_KEY,
};
pub use relay::{
    register_background_relay, NotificationRelay, PushOutcome, PUSH_RECEIVED_MESSAGE_TYPE,
};
pub use scope::{ServiceWorkerScope, WindowClient};
