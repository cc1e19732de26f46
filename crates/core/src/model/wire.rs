//! Serde helpers for the engine's loosely typed JSON.

use serde::{Deserialize, Deserializer, de};

/// Accept a JSON string or number and keep it as a string.
///
/// Offering ids arrive as numbers from the directory and as strings from the
/// recommendation service.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

/// Like [`string_or_number`] but maps `null`/missing to an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(de::Error::custom(format!("expected scalar, got {other}"))),
    }
}
