use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::messaging::error::{invalid_argument, MessagingError, MessagingResult};
use crate::sw::notification::URL_DATA_KEY;
use crate::sw::scope::WindowClient;

type CloseHandler = Box<dyn FnOnce()>;

/// The notification a click refers to, as handed back by the browser.
pub struct ShownNotification {
    pub title: String,
    pub tag: Option<String>,
    /// The `data` the notification was shown with (`Value::Null` when none).
    pub data: Value,
    on_close: Option<CloseHandler>,
}

impl ShownNotification {
    pub fn new(title: impl Into<String>, data: Value) -> Self {
        Self {
            title: title.into(),
            tag: None,
            data,
            on_close: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the callback that dismisses the displayed notification.
    pub fn with_close_handler<F>(mut self, close: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_close = Some(Box::new(close));
        self
    }

    /// Dismisses the notification; returns `false` when it was already closed
    /// or has no close handler.
    pub fn close(&mut self) -> bool {
        match self.on_close.take() {
            Some(close) => {
                close();
                true
            }
            None => false,
        }
    }

    /// The route stored in `data.url`, when present and non-empty.
    pub fn stored_url(&self) -> Option<&str> {
        self.data
            .get(URL_DATA_KEY)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }
}

impl std::fmt::Debug for ShownNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShownNotification")
            .field("title", &self.title)
            .field("tag", &self.tag)
            .field("data", &self.data)
            .field("open", &self.on_close.is_some())
            .finish()
    }
}

/// A `notificationclick` event: the notification plus the action button the
/// user chose (`None` or empty for a click on the notification body).
#[derive(Debug)]
pub struct NotificationClick {
    pub notification: ShownNotification,
    pub action: Option<String>,
}

impl NotificationClick {
    pub fn new(notification: ShownNotification, action: Option<String>) -> Self {
        Self {
            notification,
            action,
        }
    }

    /// Normalised action: `None` for a body click.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().filter(|action| !action.is_empty())
    }
}

/// Message posted to an existing window asking it to navigate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub data: Value,
}

/// What a click ended up doing.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// An open window was focused and told to navigate to `url`.
    FocusedExisting { client: WindowClient, url: String },
    /// No window of the app was open; a new one was opened at `url`.
    OpenedWindow {
        url: String,
        client: Option<WindowClient>,
    },
    /// The action is not the view action; nothing happened.
    Ignored { action: String },
    /// Routing failed; the error was logged.
    Failed(MessagingError),
}

impl ClickOutcome {
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ClickOutcome::FocusedExisting { .. } | ClickOutcome::OpenedWindow { .. }
        )
    }
}

/// Resolves `target` (absolute or relative) against `origin`.
pub fn resolve_target(origin: &str, target: &str) -> MessagingResult<Url> {
    let base = Url::parse(origin)
        .map_err(|err| invalid_argument(format!("Invalid worker origin '{origin}': {err}")))?;
    base.join(target)
        .map_err(|err| invalid_argument(format!("Invalid target URL '{target}': {err}")))
}

/// Whether `client_url` belongs to the same origin as `origin`.
pub fn same_origin(origin: &Url, client_url: &str) -> bool {
    Url::parse(client_url)
        .map(|url| url.origin() == origin.origin())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn close_runs_handler_once() {
        let closed = Rc::new(Cell::new(0));
        let counter = closed.clone();
        let mut notification = ShownNotification::new("Order Update", Value::Null)
            .with_close_handler(move || counter.set(counter.get() + 1));
        assert!(notification.close());
        assert!(!notification.close());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn stored_url_ignores_missing_and_empty_values() {
        assert_eq!(ShownNotification::new("t", Value::Null).stored_url(), None);
        assert_eq!(ShownNotification::new("t", json!({"url": ""})).stored_url(), None);
        assert_eq!(ShownNotification::new("t", json!({"url": 5})).stored_url(), None);
        assert_eq!(
            ShownNotification::new("t", json!({"url": "/orders/7"})).stored_url(),
            Some("/orders/7")
        );
    }

    #[test]
    fn empty_action_counts_as_body_click() {
        let click = NotificationClick::new(ShownNotification::new("t", Value::Null), Some(String::new()));
        assert_eq!(click.action(), None);
    }

    #[test]
    fn resolves_relative_and_absolute_targets() {
        let resolved = resolve_target("https://shop.example", "/order-tracking").unwrap();
        assert_eq!(resolved.as_str(), "https://shop.example/order-tracking");
        let absolute = resolve_target("https://shop.example", "https://other.example/x").unwrap();
        assert_eq!(absolute.as_str(), "https://other.example/x");
        let err = resolve_target("not an origin", "/x").unwrap_err();
        assert_eq!(err.code_str(), "messaging/invalid-argument");
    }

    #[test]
    fn origin_match_is_exact() {
        let origin = Url::parse("https://shop.example").unwrap();
        assert!(same_origin(&origin, "https://shop.example/menu?table=4"));
        assert!(!same_origin(&origin, "https://shop.example.evil.com/"));
        assert!(!same_origin(&origin, "http://shop.example/"));
        assert!(!same_origin(&origin, "about:blank"));
    }

    #[test]
    fn navigation_message_uses_type_key() {
        let message = NavigationMessage {
            kind: "NOTIFICATION_CLICK".into(),
            url: "/order-tracking".into(),
            data: json!({"orderId": "123"}),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            json!({"type": "NOTIFICATION_CLICK", "url": "/order-tracking", "data": {"orderId": "123"}})
        );
    }
}
