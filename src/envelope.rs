use serde::Serialize;
use serde_json::{Map, Value};

/// Generic response envelope: `{code, message, data}`. The default success
/// hook wraps every payload in one; applications layering their own code
/// taxonomy can construct richer envelopes in a replacement hook.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data,
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The JSON form, omitting `data` when absent.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("code".to_string(), Value::from(self.code));
        map.insert("message".to_string(), Value::from(self.message.clone()));
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_without_data_omits_the_field() {
        let value = Envelope::success(None).to_value();
        assert_eq!(value, json!({"code": 0, "message": "success"}));
    }

    #[test]
    fn to_value_matches_serde() {
        let envelope = Envelope::success(Some(json!({"id": 7})));
        assert_eq!(
            envelope.to_value(),
            serde_json::to_value(&envelope).unwrap()
        );
    }

    #[test]
    fn error_envelope_carries_code_and_message() {
        let value = Envelope::error(404_000, "not found").to_value();
        assert_eq!(value, json!({"code": 404000, "message": "not found"}));
    }
}
