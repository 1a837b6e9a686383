//! Platform helpers shared by the app, messaging and service worker modules.

pub mod environment;
pub mod runtime;
