use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messaging::error::MessagingResult;
use crate::sw::notification::NotificationDescriptor;

/// An open window of the application, as returned by `clients.matchAll`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
    /// `visibilityState == "visible"`.
    #[serde(default)]
    pub visible: bool,
}

impl WindowClient {
    /// Whether the user can currently see this window.
    pub fn is_foreground(&self) -> bool {
        self.focused || self.visible
    }
}

/// The browser APIs the relay drives, one method per platform call.
///
/// Failures are reported as `MessagingError`s carrying the operation-specific
/// code (`messaging/notification-display-failed`,
/// `messaging/clients-unavailable`, ...).
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ServiceWorkerScope: Send + Sync {
    /// `self.location.origin`, e.g. `https://shop.example`.
    fn origin(&self) -> String;

    async fn show_notification(&self, descriptor: &NotificationDescriptor) -> MessagingResult<()>;

    /// Window clients of this origin, including uncontrolled ones when asked.
    async fn match_all_windows(&self, include_uncontrolled: bool)
        -> MessagingResult<Vec<WindowClient>>;

    /// Brings `client` to the foreground and returns its refreshed state.
    async fn focus(&self, client: &WindowClient) -> MessagingResult<WindowClient>;

    async fn post_message(&self, client: &WindowClient, message: &Value) -> MessagingResult<()>;

    /// Opens `url` in a new window; `None` when the browser does not expose the
    /// resulting client.
    async fn open_window(&self, url: &str) -> MessagingResult<Option<WindowClient>>;

    async fn claim_clients(&self) -> MessagingResult<()>;

    async fn skip_waiting(&self) -> MessagingResult<()>;
}
