use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::{AnyJson, JsonObject, Subject, deserialize_lenient, stringify_json};

/// An entitlement query: is `subject` entitled to `resource` under `plan`?
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementRequest {
    pub plan: String,
    pub resource: String,
    pub subject: Subject,
}

/// The entitlement decision returned by the remote service.
///
/// Produced fresh for every query and never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entitlements {
    pub active: bool,
    pub reason: String,
    /// What would satisfy the entitlement. Opaque, only passed through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl Entitlements {
    /// An inactive entitlement without a reason, used for empty response bodies.
    pub fn inactive() -> Self {
        Entitlements::default()
    }

    /// The requirement to present at checkout.
    ///
    /// Falls back to a subscription on `plan` when the service did not name one.
    pub fn required_or_default(&self, plan: &str) -> JsonObject {
        match &self.required {
            Some(required) if !required.is_empty() => required.clone(),
            _ => default_required(plan),
        }
    }
}

/// The requirement used when the remote service does not provide one.
pub fn default_required(plan: &str) -> JsonObject {
    match json!({ "type": "subscription", "plan": plan }) {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Entitlements response as sent over the wire, every field optional.
///
/// Fields of an unexpected type are treated as absent. Only a literal `true`
/// grants access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementsResponse {
    #[serde(default)]
    pub active: Option<AnyJson>,
    #[serde(default)]
    pub reason: Option<AnyJson>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub required: Option<JsonObject>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub expires_at: Option<String>,
}

impl From<EntitlementsResponse> for Entitlements {
    fn from(response: EntitlementsResponse) -> Self {
        let reason = match response.reason {
            None | Some(AnyJson::Null) => String::new(),
            Some(reason) => stringify_json(&reason),
        };

        Entitlements {
            active: matches!(response.active, Some(AnyJson::Bool(true))),
            reason,
            required: response.required,
            expires_at: response.expires_at,
        }
    }
}
