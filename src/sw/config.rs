use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messaging::error::{invalid_argument, MessagingResult};
use crate::platform::environment;

pub const DEFAULT_FALLBACK_TITLE: &str = "Order Update";
pub const DEFAULT_FALLBACK_BODY: &str = "Your order status has been updated";
pub const DEFAULT_ICON: &str = "/icons/Icon-192.png";
pub const DEFAULT_TAG: &str = "order-notification";
pub const DEFAULT_TAG_DATA_KEY: &str = "orderId";
pub const DEFAULT_TARGET_URL: &str = "/order-tracking";
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const DEFAULT_VIEW_ACTION: &str = "view";
pub const DEFAULT_VIEW_ACTION_TITLE: &str = "View Orders";
pub const DEFAULT_NAVIGATION_MESSAGE_TYPE: &str = "NOTIFICATION_CLICK";
pub const DEFAULT_SKIP_WAITING_MESSAGE_TYPE: &str = "SKIP_WAITING";

/// Product constants of the notification relay.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes:
///
/// ```
/// use firebase_messaging_sw::sw::RelayConfig;
///
/// let config = RelayConfig::from_json_str(r#"{"fallbackTitle":"New Notification"}"#).unwrap();
/// assert_eq!(config.fallback_title, "New Notification");
/// assert_eq!(config.target_url, "/order-tracking");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    /// Title used when the push carries no `notification.title`.
    pub fallback_title: String,
    /// Body used when the push carries no `notification.body`.
    pub fallback_body: String,
    pub icon: String,
    pub badge: String,
    /// `data` key whose value becomes the notification tag.
    pub tag_data_key: String,
    /// Tag used when the push has no value under `tag_data_key`.
    pub default_tag: String,
    /// In-app route injected into every notification as `data.url`.
    pub target_url: String,
    /// Marker injected as `data.clickAction`.
    pub click_action: String,
    pub view_action: String,
    pub view_action_title: String,
    /// `type` of the message posted to a focused window after a click.
    pub navigation_message_type: String,
    /// `type` of the application message that activates a waiting worker.
    pub skip_waiting_message_type: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            fallback_body: DEFAULT_FALLBACK_BODY.to_string(),
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_ICON.to_string(),
            tag_data_key: DEFAULT_TAG_DATA_KEY.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            target_url: DEFAULT_TARGET_URL.to_string(),
            click_action: DEFAULT_CLICK_ACTION.to_string(),
            view_action: DEFAULT_VIEW_ACTION.to_string(),
            view_action_title: DEFAULT_VIEW_ACTION_TITLE.to_string(),
            navigation_message_type: DEFAULT_NAVIGATION_MESSAGE_TYPE.to_string(),
            skip_waiting_message_type: DEFAULT_SKIP_WAITING_MESSAGE_TYPE.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_json_str(raw: &str) -> MessagingResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| invalid_argument(format!("Invalid relay configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_map(map: Map<String, Value>) -> MessagingResult<Self> {
        let config: Self = serde_json::from_value(Value::Object(map))
            .map_err(|err| invalid_argument(format!("Invalid relay configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the `messagingSw` section of
    /// `__FIREBASE_DEFAULTS__` or `FIREBASE_MESSAGING_SW_CONFIG`, when present.
    pub fn from_environment() -> MessagingResult<Self> {
        match environment::default_relay_config_json() {
            Some(map) => Self::from_json_map(map),
            None => Ok(Self::default()),
        }
    }

    /// Rejects configurations that would break the descriptor invariants.
    ///
    /// `fallback_body` may be empty: the notification is then shown without a
    /// body when the push carries none.
    pub fn validate(&self) -> MessagingResult<()> {
        let required = [
            ("fallbackTitle", &self.fallback_title),
            ("defaultTag", &self.default_tag),
            ("targetUrl", &self.target_url),
            ("viewAction", &self.view_action),
            ("navigationMessageType", &self.navigation_message_type),
            ("skipWaitingMessageType", &self.skip_waiting_message_type),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(invalid_argument(format!(
                    "Relay configuration field `{name}` must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_order_tracking_product() {
        let config = RelayConfig::default();
        assert_eq!(config.fallback_title, "Order Update");
        assert_eq!(config.fallback_body, "Your order status has been updated");
        assert_eq!(config.icon, config.badge);
        assert_eq!(config.default_tag, "order-notification");
        assert_eq!(config.target_url, "/order-tracking");
        assert_eq!(config.view_action, "view");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_keep_other_defaults() {
        let config = RelayConfig::from_json_str(
            r#"{"fallbackTitle":"New Notification","fallbackBody":"Tap to open","icon":"/icon.png"}"#,
        )
        .unwrap();
        assert_eq!(config.fallback_title, "New Notification");
        assert_eq!(config.fallback_body, "Tap to open");
        assert_eq!(config.icon, "/icon.png");
        assert_eq!(config.badge, DEFAULT_ICON);
        assert_eq!(config.navigation_message_type, "NOTIFICATION_CLICK");
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let err = RelayConfig::from_json_str(r#"{"targetUrl":"  "}"#).unwrap_err();
        assert_eq!(err.code_str(), "messaging/invalid-argument");
        assert!(err.message().contains("targetUrl"));
    }

    #[test]
    fn empty_fallback_body_is_allowed() {
        let config = RelayConfig::from_json_str(
            r#"{"fallbackTitle":"New Notification","fallbackBody":"","targetUrl":"/"}"#,
        )
        .unwrap();
        assert_eq!(config.fallback_body, "");
        assert_eq!(config.fallback_title, "New Notification");
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = RelayConfig::from_json_str(r#"{"icon":5}"#).unwrap_err();
        assert_eq!(err.code_str(), "messaging/invalid-argument");
    }
}
