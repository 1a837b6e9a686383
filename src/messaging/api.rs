use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, Once};

use crate::app::{self, FirebaseApp};
use crate::messaging::constants::MESSAGING_COMPONENT_NAME;
use crate::messaging::error::{available_in_service_worker, internal_error, MessagingResult};
use crate::messaging::types::{MessageHandler, MessagePayload, Unsubscribe};
use crate::platform::environment;

static LOGGER: LazyLock<app::Logger> = LazyLock::new(|| app::Logger::new("@firebase/messaging"));

static INSTANCES: LazyLock<Mutex<HashMap<String, Arc<Messaging>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static NEXT_BACKGROUND_HANDLER_ID: AtomicUsize = AtomicUsize::new(1);

static TEARDOWN_REGISTERED: Once = Once::new();

#[derive(Clone, Debug)]
pub struct Messaging {
    inner: Arc<MessagingInner>,
}

#[derive(Debug)]
struct MessagingInner {
    app: FirebaseApp,
    on_background_message_handler: Mutex<Option<HandlerEntry>>,
}

#[derive(Clone)]
struct HandlerEntry {
    id: usize,
    handler: MessageHandler,
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry").field("id", &self.id).finish()
    }
}

impl Messaging {
    fn new(app: FirebaseApp) -> Self {
        Self {
            inner: Arc::new(MessagingInner {
                app,
                on_background_message_handler: Mutex::new(None),
            }),
        }
    }

    pub fn app(&self) -> &FirebaseApp {
        &self.inner.app
    }

    /// Hands a push payload received while no page is focused to the
    /// registered background handler.
    ///
    /// Returns `false` when no handler is registered; the payload is dropped.
    pub fn dispatch_background_message(&self, payload: MessagePayload) -> bool {
        let handler = self
            .inner
            .on_background_message_handler
            .lock()
            .unwrap()
            .as_ref()
            .map(|entry| entry.handler.clone());
        match handler {
            Some(handler) => {
                handler(payload);
                true
            }
            None => {
                LOGGER.warn("Background message received but no handler is registered");
                false
            }
        }
    }

    pub fn has_background_handler(&self) -> bool {
        self.inner
            .on_background_message_handler
            .lock()
            .unwrap()
            .is_some()
    }
}

fn ensure_teardown_registered() {
    TEARDOWN_REGISTERED.call_once(|| {
        app::registry::register_delete_hook(
            MESSAGING_COMPONENT_NAME,
            Arc::new(|app: &FirebaseApp| {
                INSTANCES.lock().unwrap().remove(app.name());
            }),
        );
    });
}

/// Returns the messaging instance of `app` (the default app when `None`),
/// creating it on first use.
pub fn get_messaging(app: Option<FirebaseApp>) -> MessagingResult<Arc<Messaging>> {
    ensure_teardown_registered();
    let app = match app {
        Some(app) => app,
        None => app::get_app(None).map_err(|err| internal_error(err.to_string()))?,
    };
    app.check_destroyed()
        .map_err(|err| internal_error(err.to_string()))?;

    let mut instances = INSTANCES.lock().unwrap();
    if let Some(existing) = instances.get(app.name()) {
        if existing.app().ptr_eq(&app) {
            return Ok(existing.clone());
        }
    }
    let messaging = Arc::new(Messaging::new(app.clone()));
    instances.insert(app.name().to_owned(), messaging.clone());
    Ok(messaging)
}

/// Registers the handler invoked for pushes that arrive while the app is in
/// the background. A later registration replaces the earlier one.
///
/// Fails with `messaging/available-in-sw` when called from a page.
pub fn on_background_message(
    messaging: &Messaging,
    handler: MessageHandler,
) -> MessagingResult<Unsubscribe> {
    if environment::is_window() {
        return Err(available_in_service_worker(
            "on_background_message must be called in a Service Worker context",
        ));
    }

    let id = NEXT_BACKGROUND_HANDLER_ID.fetch_add(1, Ordering::SeqCst);
    *messaging.inner.on_background_message_handler.lock().unwrap() =
        Some(HandlerEntry { id, handler });

    let messaging = messaging.clone();
    Ok(Box::new(move || {
        let mut guard = messaging.inner.on_background_message_handler.lock().unwrap();
        if guard.as_ref().map(|entry| entry.id) == Some(id) {
            *guard = None;
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{delete_app, initialize_app, FirebaseAppSettings, FirebaseOptions};
    use crate::messaging::types::NotificationPayload;

    fn unique_app() -> FirebaseApp {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let options = FirebaseOptions {
            project_id: Some("msi-restaurant".into()),
            messaging_sender_id: Some("221528008029".into()),
            ..Default::default()
        };
        let settings = FirebaseAppSettings {
            name: Some(format!("messaging-{}", COUNTER.fetch_add(1, Ordering::SeqCst))),
            ..Default::default()
        };
        initialize_app(options, Some(settings)).expect("init app")
    }

    fn titled(title: &str) -> MessagePayload {
        MessagePayload {
            notification: Some(NotificationPayload {
                title: Some(title.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn messaging_is_cached_per_app() {
        let app = unique_app();
        let first = get_messaging(Some(app.clone())).unwrap();
        let second = get_messaging(Some(app)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn deleted_app_drops_cached_messaging() {
        let app = unique_app();
        let messaging = get_messaging(Some(app.clone())).unwrap();
        delete_app(&app).unwrap();
        assert!(!INSTANCES.lock().unwrap().contains_key(app.name()));
        let err = get_messaging(Some(app)).unwrap_err();
        assert_eq!(err.code_str(), "messaging/internal");
        drop(messaging);
    }

    #[test]
    fn dispatch_without_handler_reports_false() {
        let messaging = get_messaging(Some(unique_app())).unwrap();
        assert!(!messaging.has_background_handler());
        assert!(!messaging.dispatch_background_message(MessagePayload::default()));
    }

    #[test]
    fn latest_background_handler_wins() {
        let messaging = get_messaging(Some(unique_app())).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first_seen = seen.clone();
        let first_unsubscribe = on_background_message(
            &messaging,
            Arc::new(move |payload: MessagePayload| {
                first_seen.lock().unwrap().push(("first", payload));
            }),
        )
        .unwrap();
        let second_seen = seen.clone();
        let second_unsubscribe = on_background_message(
            &messaging,
            Arc::new(move |payload: MessagePayload| {
                second_seen.lock().unwrap().push(("second", payload));
            }),
        )
        .unwrap();

        // Unsubscribing the replaced handler must not remove the current one.
        first_unsubscribe();
        assert!(messaging.dispatch_background_message(titled("Order Update")));

        second_unsubscribe();
        assert!(!messaging.dispatch_background_message(titled("dropped")));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "second");
        assert_eq!(
            seen[0].1.notification.as_ref().unwrap().title.as_deref(),
            Some("Order Update")
        );
    }
}
