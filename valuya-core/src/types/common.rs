//! Miscellaneous common types used throughout the Valuya codebase.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// Represents a key-value pair. The key is a `String`.
pub type Record<V> = std::collections::HashMap<String, V>;

/// Represents any JSON value. Used for serializing/deserializing arbitrary JSON data.
pub type AnyJson = serde_json::Value;

/// An ordered JSON object, as received from the remote service.
pub type JsonObject = serde_json::Map<String, AnyJson>;

/// Render a JSON value the way it is placed into headers and bodies.
///
/// Strings are used verbatim, everything else is rendered as compact JSON.
///
/// ```
/// use serde_json::json;
/// use valuya_core::types::stringify_json;
///
/// assert_eq!(stringify_json(&json!("abc")), "abc");
/// assert_eq!(stringify_json(&json!(42)), "42");
/// assert_eq!(stringify_json(&json!({"ok": true})), r#"{"ok":true}"#);
/// ```
pub fn stringify_json(value: &AnyJson) -> String {
    match value {
        AnyJson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Deserialize an optional field, mapping a value of the wrong type to `None`.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_lenient")]` so one
/// malformed field does not reject the whole document.
///
/// ```
/// use serde::Deserialize;
/// use serde_json::json;
/// use valuya_core::types::deserialize_lenient;
///
/// #[derive(Deserialize)]
/// struct Route {
///     #[serde(default, deserialize_with = "deserialize_lenient")]
///     method: Option<String>,
///     #[serde(default, deserialize_with = "deserialize_lenient")]
///     path: Option<String>,
/// }
///
/// let route: Route = serde_json::from_value(json!({"method": 5, "path": "/a"})).unwrap();
/// assert_eq!(route.method, None);
/// assert_eq!(route.path.as_deref(), Some("/a"));
/// ```
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = AnyJson::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}
