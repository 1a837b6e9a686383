#![doc = include_str!("README.md")]
mod api;
mod constants;
pub mod error;
mod support;
mod types;

pub use api::{get_messaging, on_background_message, Messaging};
pub use constants::MESSAGING_COMPONENT_NAME;
pub use support::is_supported;
pub use types::{FcmOptions, MessageHandler, MessagePayload, NotificationPayload, Unsubscribe};
