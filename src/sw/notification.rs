use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messaging::MessagePayload;
use crate::sw::config::RelayConfig;

/// Data key carrying the in-app route a click should navigate to.
pub const URL_DATA_KEY: &str = "url";
/// Data key carrying the click-action marker read by the Flutter shell.
pub const CLICK_ACTION_DATA_KEY: &str = "clickAction";

/// A button rendered on the notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Options passed to `registration.showNotification`, in the JavaScript
/// `NotificationOptions` shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub require_interaction: bool,
    pub data: Map<String, Value>,
    pub actions: Vec<NotificationAction>,
}

/// Everything needed to display one background notification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationDescriptor {
    pub title: String,
    pub options: NotificationOptions,
}

impl NotificationDescriptor {
    /// Derives the notification for a background push.
    ///
    /// Never fails: missing or empty title, body and tag fall back to the
    /// configured defaults, and `data.url` is always the configured route
    /// whatever the payload carries.
    pub fn from_payload(payload: &MessagePayload, config: &RelayConfig) -> Self {
        let notification = payload.notification.as_ref();
        let title = non_empty(notification.and_then(|n| n.title.as_deref()))
            .unwrap_or(&config.fallback_title)
            .to_owned();
        let body = non_empty(notification.and_then(|n| n.body.as_deref()))
            .unwrap_or(&config.fallback_body)
            .to_owned();
        let tag = non_empty(payload.data_value(&config.tag_data_key))
            .unwrap_or(&config.default_tag)
            .to_owned();

        let mut data: Map<String, Value> = payload
            .data
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        data.insert(URL_DATA_KEY.into(), Value::String(config.target_url.clone()));
        data.insert(
            CLICK_ACTION_DATA_KEY.into(),
            Value::String(config.click_action.clone()),
        );

        Self {
            title,
            options: NotificationOptions {
                body,
                icon: config.icon.clone(),
                badge: config.badge.clone(),
                tag,
                require_interaction: false,
                data,
                actions: vec![NotificationAction {
                    action: config.view_action.clone(),
                    title: config.view_action_title.clone(),
                }],
            },
        }
    }

    pub fn tag(&self) -> &str {
        &self.options.tag
    }

    /// The route injected into `data.url`.
    pub fn target_url(&self) -> Option<&str> {
        self.options.data.get(URL_DATA_KEY).and_then(Value::as_str)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::NotificationPayload;
    use std::collections::HashMap;

    fn payload_with_data(pairs: &[(&str, &str)]) -> MessagePayload {
        MessagePayload {
            data: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<HashMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn data_only_payload_uses_fallbacks_and_order_tag() {
        let descriptor = NotificationDescriptor::from_payload(
            &payload_with_data(&[("orderId", "123")]),
            &RelayConfig::default(),
        );
        assert_eq!(descriptor.title, "Order Update");
        assert_eq!(descriptor.options.body, "Your order status has been updated");
        assert_eq!(descriptor.tag(), "123");
        assert!(!descriptor.options.require_interaction);
        assert_eq!(descriptor.options.data["orderId"], "123");
        assert_eq!(descriptor.options.data["clickAction"], "FLUTTER_NOTIFICATION_CLICK");
    }

    #[test]
    fn notification_fields_are_used_verbatim() {
        let payload = MessagePayload {
            notification: Some(NotificationPayload {
                title: Some("Order #7 is ready".into()),
                body: Some("Pick it up at the counter".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let descriptor = NotificationDescriptor::from_payload(&payload, &RelayConfig::default());
        assert_eq!(descriptor.title, "Order #7 is ready");
        assert_eq!(descriptor.options.body, "Pick it up at the counter");
        assert_eq!(descriptor.tag(), "order-notification");
    }

    #[test]
    fn empty_strings_fall_back_like_missing_ones() {
        let payload = MessagePayload {
            notification: Some(NotificationPayload {
                title: Some(String::new()),
                body: Some(String::new()),
                ..Default::default()
            }),
            data: Some(HashMap::from([("orderId".to_string(), String::new())])),
            ..Default::default()
        };
        let descriptor = NotificationDescriptor::from_payload(&payload, &RelayConfig::default());
        assert_eq!(descriptor.title, "Order Update");
        assert_eq!(descriptor.options.body, "Your order status has been updated");
        assert_eq!(descriptor.tag(), "order-notification");
    }

    #[test]
    fn empty_fallback_body_shows_no_body() {
        let config = RelayConfig::from_json_str(r#"{"fallbackBody":""}"#).unwrap();
        let descriptor = NotificationDescriptor::from_payload(&MessagePayload::default(), &config);
        assert_eq!(descriptor.options.body, "");
        assert_eq!(descriptor.title, "Order Update");
    }

    #[test]
    fn payload_url_never_overrides_the_route() {
        let payload = payload_with_data(&[
            ("url", "https://evil.example/phish"),
            ("clickAction", "OTHER"),
            ("link", "/elsewhere"),
        ]);
        let descriptor = NotificationDescriptor::from_payload(&payload, &RelayConfig::default());
        assert_eq!(descriptor.target_url(), Some("/order-tracking"));
        assert_eq!(descriptor.options.data["clickAction"], "FLUTTER_NOTIFICATION_CLICK");
        assert_eq!(descriptor.options.data["link"], "/elsewhere");
    }

    #[test]
    fn exactly_one_view_action_is_offered() {
        let descriptor =
            NotificationDescriptor::from_payload(&MessagePayload::default(), &RelayConfig::default());
        assert_eq!(
            descriptor.options.actions,
            vec![NotificationAction {
                action: "view".into(),
                title: "View Orders".into(),
            }]
        );
    }

    #[test]
    fn options_serialize_to_the_javascript_shape() {
        let descriptor = NotificationDescriptor::from_payload(
            &payload_with_data(&[("orderId", "123")]),
            &RelayConfig::default(),
        );
        let json = serde_json::to_value(&descriptor.options).unwrap();
        assert_eq!(json["requireInteraction"], false);
        assert_eq!(json["tag"], "123");
        assert_eq!(json["icon"], "/icons/Icon-192.png");
        assert_eq!(json["badge"], "/icons/Icon-192.png");
        assert_eq!(json["data"]["url"], "/order-tracking");
        assert_eq!(json["actions"][0]["action"], "view");
    }
}
