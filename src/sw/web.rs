use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::messaging::error::{
    available_in_service_worker, clients_unavailable, internal_error, invalid_argument,
    lifecycle_failed, notification_display_failed, post_message_failed, unsupported_browser,
    window_focus_failed, window_open_failed, MessagingError, MessagingResult,
};
use crate::messaging::MessagePayload;
use crate::sw::click::{NotificationClick, ShownNotification};
use crate::sw::lifecycle::ControlMessage;
use crate::sw::notification::NotificationDescriptor;
use crate::sw::relay::{NotificationRelay, LOGGER};
use crate::sw::scope::{ServiceWorkerScope, WindowClient};

/// [`ServiceWorkerScope`] backed by the `ServiceWorkerGlobalScope` the module
/// runs in.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebServiceWorkerScope;

impl WebServiceWorkerScope {
    /// Fails with `messaging/available-in-sw` outside a service worker.
    pub fn new() -> MessagingResult<Self> {
        js_sys::global()
            .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
            .map(|_| Self)
            .map_err(|_| {
                available_in_service_worker(
                    "The notification relay must run inside a service worker",
                )
            })
    }

    fn global(&self) -> web_sys::ServiceWorkerGlobalScope {
        js_sys::global().unchecked_into()
    }

    async fn client_by_id(&self, id: &str) -> MessagingResult<web_sys::WindowClient> {
        let value = JsFuture::from(self.global().clients().get(id))
            .await
            .map_err(|err| clients_unavailable(format_js_error("clients.get", err)))?;
        value
            .dyn_into::<web_sys::WindowClient>()
            .map_err(|_| clients_unavailable(format!("Window client {id} is no longer available")))
    }
}

#[async_trait(?Send)]
impl ServiceWorkerScope for WebServiceWorkerScope {
    fn origin(&self) -> String {
        self.global().location().origin()
    }

    async fn show_notification(&self, descriptor: &NotificationDescriptor) -> MessagingResult<()> {
        let options = descriptor
            .options
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| internal_error(format!("Failed to encode notification options: {err}")))?
            .unchecked_into::<web_sys::NotificationOptions>();
        let promise = self
            .global()
            .registration()
            .show_notification_with_options(&descriptor.title, &options)
            .map_err(|err| notification_display_failed(format_js_error("showNotification", err)))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| notification_display_failed(format_js_error("showNotification", err)))?;
        Ok(())
    }

    async fn match_all_windows(
        &self,
        include_uncontrolled: bool,
    ) -> MessagingResult<Vec<WindowClient>> {
        let options = web_sys::ClientQueryOptions::new();
        options.set_type(web_sys::ClientType::Window);
        options.set_include_uncontrolled(include_uncontrolled);
        let value = JsFuture::from(self.global().clients().match_all_with_options(&options))
            .await
            .map_err(|err| clients_unavailable(format_js_error("clients.matchAll", err)))?;
        let clients: js_sys::Array = value
            .dyn_into()
            .map_err(|_| clients_unavailable("Unexpected return value from clients.matchAll"))?;
        Ok(clients
            .iter()
            .filter_map(|client| client.dyn_into::<web_sys::WindowClient>().ok())
            .map(|client| window_client_from_js(&client))
            .collect())
    }

    async fn focus(&self, client: &WindowClient) -> MessagingResult<WindowClient> {
        let handle = self.client_by_id(&client.id).await?;
        let promise = handle
            .focus()
            .map_err(|err| window_focus_failed(format_js_error("WindowClient.focus", err)))?;
        let focused = JsFuture::from(promise)
            .await
            .map_err(|err| window_focus_failed(format_js_error("WindowClient.focus", err)))?;
        focused
            .dyn_into::<web_sys::WindowClient>()
            .map(|focused| window_client_from_js(&focused))
            .map_err(|_| window_focus_failed("Unexpected return value from WindowClient.focus"))
    }

    async fn post_message(&self, client: &WindowClient, message: &Value) -> MessagingResult<()> {
        let handle = self.client_by_id(&client.id).await?;
        let message = to_js(message)?;
        handle
            .post_message(&message)
            .map_err(|err| post_message_failed(format_js_error("Client.postMessage", err)))
    }

    async fn open_window(&self, url: &str) -> MessagingResult<Option<WindowClient>> {
        let opened = JsFuture::from(self.global().clients().open_window(url))
            .await
            .map_err(|err| window_open_failed(format_js_error("clients.openWindow", err)))?;
        Ok(opened
            .dyn_into::<web_sys::WindowClient>()
            .ok()
            .map(|client| window_client_from_js(&client)))
    }

    async fn claim_clients(&self) -> MessagingResult<()> {
        JsFuture::from(self.global().clients().claim())
            .await
            .map_err(|err| lifecycle_failed(format_js_error("clients.claim", err)))?;
        Ok(())
    }

    async fn skip_waiting(&self) -> MessagingResult<()> {
        let promise = self
            .global()
            .skip_waiting()
            .map_err(|err| lifecycle_failed(format_js_error("skipWaiting", err)))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| lifecycle_failed(format_js_error("skipWaiting", err)))?;
        Ok(())
    }
}

/// Registers the `push`, `notificationclick`, `install`, `activate` and
/// `message` listeners on the worker global and routes them to `relay`.
///
/// Each event is kept alive with `waitUntil` until its handler settles. A push
/// is shown only when no page of the origin is in the foreground (see
/// [`NotificationRelay::handle_push`]); a failed display rejects the `push`
/// event's promise.
pub fn install_listeners(relay: Arc<NotificationRelay>) -> MessagingResult<()> {
    let global = js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(|_| unsupported_browser("Listeners can only be installed in a service worker"))?;

    let push_relay = relay.clone();
    let on_push = Closure::<dyn FnMut(web_sys::PushEvent)>::new(move |event: web_sys::PushEvent| {
        let payload = match push_payload(&event) {
            Ok(payload) => payload,
            Err(err) => {
                LOGGER.warn(format!("Ignoring push without a readable payload: {err}"));
                return;
            }
        };
        let relay = push_relay.clone();
        keep_alive(
            &event,
            "push",
            future_to_promise(async move {
                relay
                    .handle_push(&payload)
                    .await
                    .map(|_| JsValue::UNDEFINED)
                    .map_err(to_js_error)
            }),
        );
    });

    let click_relay = relay.clone();
    let on_click = Closure::<dyn FnMut(web_sys::NotificationEvent)>::new(
        move |event: web_sys::NotificationEvent| {
            let click = notification_click(&event);
            let relay = click_relay.clone();
            keep_alive(
                &event,
                "notificationclick",
                future_to_promise(async move {
                    relay.handle_notification_click(click).await;
                    Ok(JsValue::UNDEFINED)
                }),
            );
        },
    );

    let install_relay = relay.clone();
    let on_install = Closure::<dyn FnMut(web_sys::ExtendableEvent)>::new(
        move |event: web_sys::ExtendableEvent| {
            let relay = install_relay.clone();
            keep_alive(
                &event,
                "install",
                future_to_promise(async move {
                    relay.handle_install().await.map_err(to_js_error)?;
                    Ok(JsValue::UNDEFINED)
                }),
            );
        },
    );

    let activate_relay = relay.clone();
    let on_activate = Closure::<dyn FnMut(web_sys::ExtendableEvent)>::new(
        move |event: web_sys::ExtendableEvent| {
            let relay = activate_relay.clone();
            keep_alive(
                &event,
                "activate",
                future_to_promise(async move {
                    relay.handle_activate().await.map_err(to_js_error)?;
                    Ok(JsValue::UNDEFINED)
                }),
            );
        },
    );

    let message_relay = relay;
    let on_message = Closure::<dyn FnMut(web_sys::ExtendableMessageEvent)>::new(
        move |event: web_sys::ExtendableMessageEvent| {
            let data: Value = serde_wasm_bindgen::from_value(event.data()).unwrap_or(Value::Null);
            let message = ControlMessage::from_value(data);
            let relay = message_relay.clone();
            keep_alive(
                &event,
                "message",
                future_to_promise(async move {
                    let skipped = relay.handle_message(&message).await.map_err(to_js_error)?;
                    Ok(JsValue::from_bool(skipped))
                }),
            );
        },
    );

    add_listener(&global, "push", on_push.as_ref().unchecked_ref())?;
    add_listener(&global, "notificationclick", on_click.as_ref().unchecked_ref())?;
    add_listener(&global, "install", on_install.as_ref().unchecked_ref())?;
    add_listener(&global, "activate", on_activate.as_ref().unchecked_ref())?;
    add_listener(&global, "message", on_message.as_ref().unchecked_ref())?;

    // The listeners live as long as the worker.
    on_push.forget();
    on_click.forget();
    on_install.forget();
    on_activate.forget();
    on_message.forget();

    LOGGER.debug("Service worker listeners installed");
    Ok(())
}

fn add_listener(
    global: &web_sys::ServiceWorkerGlobalScope,
    kind: &str,
    listener: &js_sys::Function,
) -> MessagingResult<()> {
    global
        .add_event_listener_with_callback(kind, listener)
        .map_err(|err| internal_error(format_js_error(&format!("addEventListener({kind})"), err)))
}

fn keep_alive(event: &web_sys::ExtendableEvent, kind: &str, promise: js_sys::Promise) {
    if let Err(err) = event.wait_until(&promise) {
        LOGGER.warn(format_js_error(&format!("{kind} waitUntil"), err));
    }
}

fn push_payload(event: &web_sys::PushEvent) -> MessagingResult<MessagePayload> {
    let data = event
        .data()
        .ok_or_else(|| invalid_argument("Push event carries no data"))?;
    let json = data
        .json()
        .map_err(|err| invalid_argument(format_js_error("PushMessageData.json", err)))?;
    let value: Value = serde_wasm_bindgen::from_value(json)
        .map_err(|err| invalid_argument(err.to_string()))?;
    MessagePayload::from_push_json(&value)
}

fn notification_click(event: &web_sys::NotificationEvent) -> NotificationClick {
    let notification = event.notification();
    let data: Value = serde_wasm_bindgen::from_value(notification.data()).unwrap_or(Value::Null);
    let mut shown = ShownNotification::new(notification.title(), data);
    let tag = notification.tag();
    if !tag.is_empty() {
        shown = shown.with_tag(tag);
    }
    let shown = shown.with_close_handler(move || notification.close());
    NotificationClick::new(shown, Some(event.action()))
}

fn window_client_from_js(client: &web_sys::WindowClient) -> WindowClient {
    WindowClient {
        id: client.id(),
        url: client.url(),
        focused: client.focused(),
        visible: client.visibility_state() == web_sys::VisibilityState::Visible,
    }
}

fn to_js(value: &Value) -> MessagingResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| internal_error(format!("Failed to encode message: {err}")))
}

fn to_js_error(err: MessagingError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn format_js_error(operation: &str, err: JsValue) -> String {
    let detail = err.as_string().unwrap_or_else(|| format!("{:?}", err));
    format!("{operation} failed: {detail}")
}
