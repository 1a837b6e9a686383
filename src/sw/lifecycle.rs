use serde_json::Value;

/// Key of the discriminator in application-to-worker messages.
pub const CONTROL_TYPE_KEY: &str = "type";

/// A message posted by a page to the worker (`navigator.serviceWorker.controller.postMessage`).
#[derive(Clone, Debug, PartialEq)]
pub struct ControlMessage {
    kind: Option<String>,
    payload: Value,
}

impl ControlMessage {
    /// Reads the message type from `{ "type": ... }`; a bare string is taken
    /// as the type itself.
    pub fn from_value(payload: Value) -> Self {
        let kind = match &payload {
            Value::String(text) => Some(text.clone()),
            Value::Object(map) => map
                .get(CONTROL_TYPE_KEY)
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        };
        Self { kind, payload }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_type_from_object() {
        let message = ControlMessage::from_value(json!({"type": "SKIP_WAITING"}));
        assert!(message.is("SKIP_WAITING"));
    }

    #[test]
    fn bare_string_is_its_own_type() {
        let message = ControlMessage::from_value(json!("SKIP_WAITING"));
        assert_eq!(message.kind(), Some("SKIP_WAITING"));
    }

    #[test]
    fn untyped_messages_have_no_kind() {
        assert_eq!(ControlMessage::from_value(Value::Null).kind(), None);
        assert_eq!(ControlMessage::from_value(json!({"type": 3})).kind(), None);
        assert_eq!(ControlMessage::from_value(json!([1, 2])).kind(), None);
    }
}
