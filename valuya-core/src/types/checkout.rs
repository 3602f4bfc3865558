use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    types::{JsonObject, Subject, stringify_json},
};

/// Request body for creating a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub plan: String,
    pub resource: String,
    pub subject: Subject,
    pub required: JsonObject,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Deterministic idempotency key for this checkout.
    ///
    /// Identical subject, resource, plan and requirement always produce the same key,
    /// independent of the key order inside `required`.
    pub fn idempotency_key(&self) -> String {
        let required_type = self
            .required
            .get("type")
            .map(stringify_json)
            .unwrap_or_default();
        let sorted: BTreeMap<&String, &serde_json::Value> = self.required.iter().collect();
        let sorted = serde_json::to_string(&sorted).unwrap_or_default();

        format!(
            "vg:{}|{}|{}|{}|{}",
            self.subject, self.resource, required_type, self.plan, sorted
        )
    }
}

/// A payment flow issued by the remote service when entitlement is absent.
///
/// Both `payment_url` and `session_id` are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub payment_url: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Checkout session response as sent over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl TryFrom<CheckoutSessionResponse> for CheckoutSession {
    type Error = Error;

    fn try_from(response: CheckoutSessionResponse) -> Result<Self, Self::Error> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        match (non_empty(response.payment_url), non_empty(response.session_id)) {
            (Some(payment_url), Some(session_id)) => Ok(CheckoutSession {
                payment_url,
                session_id,
                expires_at: response.expires_at,
            }),
            _ => Err(Error::Validation(
                "checkout session missing required fields".to_string(),
            )),
        }
    }
}
