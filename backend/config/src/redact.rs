//! Config redaction: produce a safe-to-log config snapshot by masking credentials.

use serde_json::Value;

use crate::schema::EcoScanConfig;

/// Field names whose values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "vision_api_key",
    "gemini_api_key",
    "places_api_key",
    "api_key",
    "token",
    "secret",
    "password",
];

/// Redact a JSON value, masking every sensitive string field.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

impl EcoScanConfig {
    /// Config snapshot suitable for startup logs.
    pub fn redacted(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => redact(&value),
            Err(_) => Value::Null,
        }
    }
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if is_sensitive_key(key) && !s.is_empty() {
        // Preserve length hint: show first 4 chars + ***
        let hint = if s.chars().count() > 4 {
            format!("{}***", s.chars().take(4).collect::<String>())
        } else {
            "***".to_string()
        };
        return Value::String(hint);
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}
