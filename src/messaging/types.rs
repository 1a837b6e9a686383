use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messaging::error::{invalid_argument, MessagingResult};

/// Payload displayed to the user when a notification is shown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Additional FCM options for a payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcmOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(
        rename = "analyticsLabel",
        alias = "analytics_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub analytics_label: Option<String>,
}

/// Message data delivered by Firebase Cloud Messaging.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_options: Option<FcmOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl MessagePayload {
    /// Converts the JSON body of a push event into a payload.
    ///
    /// Only a non-object root is rejected. Every field is optional and read on
    /// its own: a field of the wrong type is dropped without affecting its
    /// siblings, and non-string `data` values are kept in their JSON text form.
    pub fn from_push_json(value: &Value) -> MessagingResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid_argument("Push payload must be a JSON object"))?;
        Ok(Self {
            notification: object
                .get("notification")
                .and_then(Value::as_object)
                .map(notification_fields),
            data: object
                .get("data")
                .and_then(Value::as_object)
                .map(|map| stringify_data(map.clone())),
            fcm_options: first_present(object, &["fcmOptions", "fcm_options"])
                .and_then(|raw| serde_json::from_value(raw.clone()).ok()),
            from: string_field(object, &["from"]),
            collapse_key: string_field(object, &["collapse_key", "collapseKey"]),
            message_id: string_field(object, &["fcmMessageId", "messageId"]),
        })
    }

    pub fn from_push_str(raw: &str) -> MessagingResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| invalid_argument(format!("Push payload is not valid JSON: {err}")))?;
        Self::from_push_json(&value)
    }

    /// Returns `data[key]` when the payload carries it.
    pub fn data_value(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key).map(String::as_str)
    }
}

fn notification_fields(object: &Map<String, Value>) -> NotificationPayload {
    NotificationPayload {
        title: string_field(object, &["title"]),
        body: string_field(object, &["body"]),
        image: string_field(object, &["image"]),
        icon: string_field(object, &["icon"]),
    }
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_present(object, keys)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn stringify_data(map: Map<String, Value>) -> HashMap<String, String> {
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

pub type MessageHandler = Arc<dyn Fn(MessagePayload) + Send + Sync + 'static>;

pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fcm_push_body() {
        let payload = MessagePayload::from_push_json(&json!({
            "notification": {"title": "Order ready", "body": "Table 4", "image": "/img.png"},
            "data": {"orderId": "123", "status": "ready"},
            "fcmOptions": {"link": "/orders", "analytics_label": "campaign"},
            "from": "221528008029",
            "collapse_key": "orders",
            "fcmMessageId": "m-1"
        }))
        .unwrap();

        let notification = payload.notification.as_ref().unwrap();
        assert_eq!(notification.title.as_deref(), Some("Order ready"));
        assert_eq!(notification.body.as_deref(), Some("Table 4"));
        assert_eq!(payload.data_value("orderId"), Some("123"));
        assert_eq!(
            payload.fcm_options.as_ref().unwrap().analytics_label.as_deref(),
            Some("campaign")
        );
        assert_eq!(payload.collapse_key.as_deref(), Some("orders"));
        assert_eq!(payload.message_id.as_deref(), Some("m-1"));
    }

    #[test]
    fn data_only_push_has_no_notification() {
        let payload = MessagePayload::from_push_str(r#"{"data":{"orderId":"123"}}"#).unwrap();
        assert!(payload.notification.is_none());
        assert_eq!(payload.data_value("orderId"), Some("123"));
    }

    #[test]
    fn non_string_data_values_are_stringified() {
        let payload = MessagePayload::from_push_json(&json!({
            "data": {"orderId": 123, "paid": true, "gone": null}
        }))
        .unwrap();
        assert_eq!(payload.data_value("orderId"), Some("123"));
        assert_eq!(payload.data_value("paid"), Some("true"));
        assert_eq!(payload.data_value("gone"), None);
    }

    #[test]
    fn malformed_notification_is_tolerated() {
        let payload = MessagePayload::from_push_json(&json!({
            "notification": "not-an-object",
            "data": {"orderId": "9"}
        }))
        .unwrap();
        assert!(payload.notification.is_none());
        assert_eq!(payload.data_value("orderId"), Some("9"));
    }

    #[test]
    fn mistyped_notification_field_keeps_its_siblings() {
        let payload = MessagePayload::from_push_json(&json!({
            "notification": {"title": 42, "body": "Your pizza is out for delivery", "icon": null}
        }))
        .unwrap();
        let notification = payload.notification.unwrap();
        assert_eq!(notification.title, None);
        assert_eq!(
            notification.body.as_deref(),
            Some("Your pizza is out for delivery")
        );
        assert_eq!(notification.icon, None);
    }

    #[test]
    fn non_object_push_is_rejected() {
        let err = MessagePayload::from_push_json(&json!(["x"])).unwrap_err();
        assert_eq!(err.code_str(), "messaging/invalid-argument");
        let err = MessagePayload::from_push_str("not json").unwrap_err();
        assert_eq!(err.code_str(), "messaging/invalid-argument");
    }
}
