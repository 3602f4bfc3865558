//! Typed view over an inbound serverless HTTP event.
//!
//! Only the fields the guard reads are modelled. A field of the wrong type is
//! dropped on its own, the rest of the view survives. The raw event is still handed
//! to the wrapped handler untouched.

use serde::Deserialize;
use valuya_core::types::{AnyJson, JsonObject, Record, deserialize_lenient, stringify_json};

/// The parts of an API-gateway style event the guard looks at.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardEvent {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub request_context: Option<RequestContext>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub headers: Option<JsonObject>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub raw_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub authorizer: Option<Authorizer>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub http: Option<HttpContext>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub identity: Option<IdentityContext>,
    /// REST API (v1) payloads carry the method here.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub http_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Authorizer {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub lambda: Option<LambdaAuthorizer>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub jwt: Option<JwtAuthorizer>,
    #[serde(default, rename = "principalId")]
    pub principal_id: Option<AnyJson>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LambdaAuthorizer {
    #[serde(default)]
    pub user_id: Option<AnyJson>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JwtAuthorizer {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub claims: Option<JwtClaims>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub sub: Option<AnyJson>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpContext {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub source_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContext {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub source_ip: Option<String>,
}

impl GuardEvent {
    /// Parse the typed view out of a raw event.
    ///
    /// Never fails: an event that is not an object yields an empty view.
    pub fn from_json(event: &AnyJson) -> Self {
        GuardEvent::deserialize(event).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!("Inbound event does not match the expected shape: {_err}; using empty view");
            GuardEvent::default()
        })
    }

    /// Headers with lower-cased names and stringified values.
    pub fn headers(&self) -> Record<String> {
        self.headers.as_ref().map(normalize_headers).unwrap_or_default()
    }

    /// The authorizer identity, tried as lambda `user_id`, then JWT `sub`, then `principalId`.
    pub fn authorizer_user_id(&self) -> Option<String> {
        let authorizer = self.request_context.as_ref()?.authorizer.as_ref()?;

        let lambda = authorizer.lambda.as_ref().and_then(|l| l.user_id.as_ref());
        let jwt_sub = authorizer
            .jwt
            .as_ref()
            .and_then(|j| j.claims.as_ref())
            .and_then(|c| c.sub.as_ref());
        let principal = authorizer.principal_id.as_ref();

        [lambda, jwt_sub, principal]
            .into_iter()
            .flatten()
            .find_map(identity_value)
    }

    /// Source IP from the HTTP API context, falling back to the REST API identity.
    pub fn source_ip(&self) -> Option<&str> {
        let ctx = self.request_context.as_ref()?;
        let http_ip = ctx.http.as_ref().and_then(|h| h.source_ip.as_deref());
        let identity_ip = ctx.identity.as_ref().and_then(|i| i.source_ip.as_deref());

        [http_ip, identity_ip]
            .into_iter()
            .flatten()
            .find(|ip| !ip.is_empty())
    }

    pub fn http_method(&self) -> Option<&str> {
        let ctx = self.request_context.as_ref()?;
        [
            ctx.http.as_ref().and_then(|h| h.method.as_deref()),
            ctx.http_method.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
    }

    pub fn http_path(&self) -> Option<&str> {
        let ctx_path = self
            .request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|h| h.path.as_deref());

        [ctx_path, self.raw_path.as_deref(), self.path.as_deref()]
            .into_iter()
            .flatten()
            .find(|p| !p.is_empty())
    }
}

/// Lower-case every header name and stringify every value.
///
/// When two names collide after lower-casing, the later one wins.
pub fn normalize_headers(headers: &JsonObject) -> Record<String> {
    let mut normalized = Record::with_capacity(headers.len());
    for (name, value) in headers {
        normalized.insert(name.to_lowercase(), stringify_json(value));
    }
    normalized
}

// Null and empty strings do not count as an identity.
fn identity_value(value: &AnyJson) -> Option<String> {
    match value {
        AnyJson::Null => None,
        AnyJson::String(s) if s.is_empty() => None,
        other => Some(stringify_json(other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_headers_lowercases_and_stringifies() {
        let headers = json!({
            "Content-Type": "application/json",
            "X-Count": 3,
            "x-valuya-anon-id": "first",
            "X-Valuya-Anon-Id": "second"
        });

        let normalized = normalize_headers(headers.as_object().unwrap());

        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized["content-type"], "application/json");
        assert_eq!(normalized["x-count"], "3");
        assert_eq!(normalized["x-valuya-anon-id"], "second");
    }

    #[test]
    fn test_authorizer_precedence() {
        let event = GuardEvent::from_json(&json!({
            "requestContext": {
                "authorizer": {
                    "principalId": "principal",
                    "jwt": {"claims": {"sub": "jwt-sub"}},
                    "lambda": {"user_id": "lambda-user"}
                }
            }
        }));
        assert_eq!(event.authorizer_user_id().as_deref(), Some("lambda-user"));

        let event = GuardEvent::from_json(&json!({
            "requestContext": {
                "authorizer": {
                    "principalId": "principal",
                    "jwt": {"claims": {"sub": "jwt-sub"}},
                    "lambda": {"user_id": ""}
                }
            }
        }));
        assert_eq!(event.authorizer_user_id().as_deref(), Some("jwt-sub"));

        let event = GuardEvent::from_json(&json!({
            "requestContext": {"authorizer": {"principalId": 1234}}
        }));
        assert_eq!(event.authorizer_user_id().as_deref(), Some("1234"));
    }

    #[test]
    fn test_source_ip_fallback() {
        let event = GuardEvent::from_json(&json!({
            "requestContext": {
                "http": {"sourceIp": ""},
                "identity": {"sourceIp": "10.0.0.1"}
            }
        }));
        assert_eq!(event.source_ip(), Some("10.0.0.1"));
    }

    #[test]
    fn test_malformed_event_yields_empty_view() {
        let event = GuardEvent::from_json(&json!({"headers": "not-an-object"}));
        assert_eq!(event, GuardEvent::default());

        let event = GuardEvent::from_json(&json!(null));
        assert_eq!(event, GuardEvent::default());

        let event = GuardEvent::from_json(&json!(["not", "an", "event"]));
        assert_eq!(event, GuardEvent::default());
    }

    #[test]
    fn test_mistyped_field_keeps_rest_of_event() {
        let event = GuardEvent::from_json(&json!({
            "requestContext": {"authorizer": {"principalId": "u1"}, "httpMethod": 5}
        }));
        assert_eq!(event.authorizer_user_id().as_deref(), Some("u1"));
        assert_eq!(event.http_method(), None);

        let event = GuardEvent::from_json(&json!({
            "headers": {"X-Valuya-Anon-Id": "abc"},
            "rawPath": 7,
            "path": "/fallback",
            "requestContext": {
                "http": {"method": ["GET"], "path": "/items", "sourceIp": false},
                "identity": {"sourceIp": "10.0.0.2"},
                "authorizer": {"jwt": "not-an-object", "lambda": {"user_id": "lam"}}
            }
        }));
        assert_eq!(event.headers()["x-valuya-anon-id"], "abc");
        assert_eq!(event.http_path(), Some("/items"));
        assert_eq!(event.http_method(), None);
        assert_eq!(event.source_ip(), Some("10.0.0.2"));
        assert_eq!(event.authorizer_user_id().as_deref(), Some("lam"));
    }

    #[test]
    fn test_method_and_path() {
        let v2 = GuardEvent::from_json(&json!({
            "rawPath": "/raw",
            "requestContext": {"http": {"method": "get", "path": "/items/1"}}
        }));
        assert_eq!(v2.http_method(), Some("get"));
        assert_eq!(v2.http_path(), Some("/items/1"));

        let v1 = GuardEvent::from_json(&json!({
            "path": "/legacy",
            "requestContext": {"httpMethod": "POST"}
        }));
        assert_eq!(v1.http_method(), Some("POST"));
        assert_eq!(v1.http_path(), Some("/legacy"));
    }
}
