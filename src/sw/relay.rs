use std::sync::{Arc, LazyLock};

use serde_json::Value;

use crate::logger::{log_arg, Logger};
use crate::messaging::error::{internal_error, MessagingResult};
use crate::messaging::{on_background_message, MessagePayload, Messaging, Unsubscribe};
use crate::platform::runtime;
use crate::sw::click::{resolve_target, same_origin, ClickOutcome, NavigationMessage, NotificationClick};
use crate::sw::config::RelayConfig;
use crate::sw::lifecycle::ControlMessage;
use crate::sw::notification::NotificationDescriptor;
use crate::sw::scope::ServiceWorkerScope;

/// `messageType` of a push handed to a page in the foreground, as the page-side
/// Firebase Messaging SDK expects it.
pub const PUSH_RECEIVED_MESSAGE_TYPE: &str = "push-received";

/// What happened to an incoming push.
#[derive(Clone, Debug, PartialEq)]
pub enum PushOutcome {
    /// No page was in the foreground; a system notification was shown.
    Displayed(NotificationDescriptor),
    /// A page was in the foreground; the payload was posted to these clients
    /// and nothing was displayed.
    Forwarded { client_ids: Vec<String> },
}

pub(crate) static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@firebase/messaging-sw"));

/// Turns background pushes into system notifications and notification clicks
/// into window navigation.
///
/// Each handler is stateless: it reads the configuration, drives the scope and
/// returns. Nothing is retried.
#[derive(Clone)]
pub struct NotificationRelay {
    scope: Arc<dyn ServiceWorkerScope>,
    config: RelayConfig,
}

impl NotificationRelay {
    pub fn new(scope: Arc<dyn ServiceWorkerScope>, config: RelayConfig) -> Self {
        Self { scope, config }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn scope(&self) -> &Arc<dyn ServiceWorkerScope> {
        &self.scope
    }

    /// Displays the notification for a push received while the app is in the
    /// background and returns what was shown.
    ///
    /// A display failure is returned as is.
    pub async fn handle_background_message(
        &self,
        payload: &MessagePayload,
    ) -> MessagingResult<NotificationDescriptor> {
        LOGGER.info_with([
            log_arg("Background message received:"),
            log_arg(serde_json::to_value(payload).unwrap_or(Value::Null)),
        ]);

        let descriptor = NotificationDescriptor::from_payload(payload, &self.config);
        LOGGER.info(format!(
            "Showing notification: {} (tag {})",
            descriptor.title,
            descriptor.tag()
        ));
        self.scope.show_notification(&descriptor).await?;
        Ok(descriptor)
    }

    /// Entry point for a `push` event.
    ///
    /// When a window of this origin is visible or focused, the payload is
    /// posted to every such window tagged with `messageType: "push-received"`
    /// and `isFirebaseMessaging: true`, and no notification is shown. Otherwise
    /// the push is handled as a background message.
    pub async fn handle_push(&self, payload: &MessagePayload) -> MessagingResult<PushOutcome> {
        let origin_url = resolve_target(&self.scope.origin(), "/")?;
        let clients = self.scope.match_all_windows(true).await?;
        let foreground: Vec<_> = clients
            .iter()
            .filter(|client| client.is_foreground() && same_origin(&origin_url, &client.url))
            .collect();

        if foreground.is_empty() {
            return self
                .handle_background_message(payload)
                .await
                .map(PushOutcome::Displayed);
        }

        let mut message = serde_json::to_value(payload)
            .map_err(|err| internal_error(format!("Failed to encode push payload: {err}")))?;
        if let Value::Object(map) = &mut message {
            map.insert(
                "messageType".into(),
                Value::String(PUSH_RECEIVED_MESSAGE_TYPE.into()),
            );
            map.insert("isFirebaseMessaging".into(), Value::Bool(true));
        }

        LOGGER.info(format!(
            "App is in the foreground; forwarding push to {} window(s)",
            foreground.len()
        ));
        let mut client_ids = Vec::with_capacity(foreground.len());
        for client in foreground {
            self.scope.post_message(client, &message).await?;
            client_ids.push(client.id.clone());
        }
        Ok(PushOutcome::Forwarded { client_ids })
    }

    /// Routes a notification click.
    ///
    /// The notification is always closed. The view action and body clicks
    /// focus the first open window of this origin and post it a
    /// [`NavigationMessage`], or open a new window when none exists. Other
    /// actions do nothing. Routing errors are logged and reported as
    /// [`ClickOutcome::Failed`].
    pub async fn handle_notification_click(&self, mut click: NotificationClick) -> ClickOutcome {
        LOGGER.info(format!(
            "Notification clicked: {} (action {:?})",
            click.notification.title,
            click.action()
        ));
        click.notification.close();

        match click.action() {
            Some(action) if action != self.config.view_action => {
                LOGGER.debug(format!("Ignoring notification action '{action}'"));
                ClickOutcome::Ignored {
                    action: action.to_owned(),
                }
            }
            _ => match self.navigate(&click).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    LOGGER.error(format!("Error handling notification click: {err}"));
                    ClickOutcome::Failed(err)
                }
            },
        }
    }

    async fn navigate(&self, click: &NotificationClick) -> MessagingResult<ClickOutcome> {
        let target = click
            .notification
            .stored_url()
            .unwrap_or(&self.config.target_url)
            .to_owned();
        let origin = self.scope.origin();
        let absolute = resolve_target(&origin, &target)?;
        let origin_url = resolve_target(&origin, "/")?;
        LOGGER.debug(format!("Target URL: {absolute}"));

        let clients = self.scope.match_all_windows(true).await?;
        LOGGER.debug(format!("Found {} window client(s)", clients.len()));

        if let Some(existing) = clients
            .iter()
            .find(|client| same_origin(&origin_url, &client.url))
        {
            LOGGER.info("Focusing existing window and navigating");
            let focused = self.scope.focus(existing).await?;
            let message = NavigationMessage {
                kind: self.config.navigation_message_type.clone(),
                url: target.clone(),
                data: click.notification.data.clone(),
            };
            let message = serde_json::to_value(&message)
                .map_err(|err| internal_error(format!("Failed to encode navigation message: {err}")))?;
            self.scope.post_message(&focused, &message).await?;
            return Ok(ClickOutcome::FocusedExisting {
                client: focused,
                url: target,
            });
        }

        LOGGER.info("Opening new window");
        let client = self.scope.open_window(absolute.as_str()).await?;
        Ok(ClickOutcome::OpenedWindow {
            url: absolute.into(),
            client,
        })
    }

    /// `install`: activate without waiting for existing pages to close.
    pub async fn handle_install(&self) -> MessagingResult<()> {
        LOGGER.info("Service worker installed");
        self.scope.skip_waiting().await.inspect_err(|err| {
            LOGGER.error(format!("skipWaiting failed during install: {err}"));
        })
    }

    /// `activate`: take control of already open pages immediately.
    pub async fn handle_activate(&self) -> MessagingResult<()> {
        LOGGER.info("Service worker activated");
        self.scope.claim_clients().await.inspect_err(|err| {
            LOGGER.error(format!("clients.claim failed during activate: {err}"));
        })
    }

    /// `message`: a page asking a waiting worker to take over.
    ///
    /// Returns whether `skipWaiting` was requested.
    pub async fn handle_message(&self, message: &ControlMessage) -> MessagingResult<bool> {
        LOGGER.info_with([log_arg("Message from app:"), log_arg(message.payload())]);
        if !message.is(&self.config.skip_waiting_message_type) {
            return Ok(false);
        }
        self.scope.skip_waiting().await.inspect_err(|err| {
            LOGGER.error(format!("skipWaiting failed: {err}"));
        })?;
        Ok(true)
    }
}

impl std::fmt::Debug for NotificationRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRelay")
            .field("origin", &self.scope.origin())
            .field("config", &self.config)
            .finish()
    }
}

/// Makes `relay` the background handler of `messaging`: every dispatched
/// payload is shown as a notification. Display failures are logged.
pub fn register_background_relay(
    messaging: &Messaging,
    relay: Arc<NotificationRelay>,
) -> MessagingResult<Unsubscribe> {
    on_background_message(
        messaging,
        Arc::new(move |payload: MessagePayload| {
            let relay = relay.clone();
            runtime::spawn_detached(async move {
                if let Err(err) = relay.handle_background_message(&payload).await {
                    LOGGER.error(format!("Failed to show background notification: {err}"));
                }
            });
        }),
    )
}
