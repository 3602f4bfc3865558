use http::{StatusCode, header};
use serde::{Deserialize, Serialize};
use valuya_core::{
    errors::Error,
    types::{AnyJson, CheckoutSession, PaymentRequiredBody, Record, stringify_json},
};

/// Response header carrying the checkout URL on denial.
pub const PAYMENT_URL_HEADER: &str = "x-valuya-payment-url";
/// Response header carrying the checkout session id on denial.
pub const SESSION_ID_HEADER: &str = "x-valuya-session-id";

/// A proxy-integration style response: status code, headers and a string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: Record<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl GuardResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        GuardResponse {
            status_code: status.as_u16(),
            headers: Record::new(),
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Minimal JSON success envelope around a raw handler value.
    pub fn json_ok(value: &AnyJson) -> Self {
        GuardResponse::new(StatusCode::OK, stringify_json(value))
            .with_header(header::CONTENT_TYPE, "application/json")
    }

    /// `402 Payment Required` pointing the caller at the checkout session.
    pub fn payment_required(body: &PaymentRequiredBody) -> Result<Self, Error> {
        let response = GuardResponse::new(StatusCode::PAYMENT_REQUIRED, serde_json::to_string(body)?)
            .with_header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .with_header(header::CACHE_CONTROL, "no-store")
            .with_header(
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                format!("{PAYMENT_URL_HEADER}, {SESSION_ID_HEADER}"),
            )
            .with_header(PAYMENT_URL_HEADER, body.payment_url.as_str())
            .with_header(SESSION_ID_HEADER, body.session_id.as_str());

        Ok(response)
    }

    /// `302 Found` sending a browser straight to the checkout page.
    pub fn checkout_redirect(session: &CheckoutSession) -> Self {
        GuardResponse::new(StatusCode::FOUND, "")
            .with_header(header::LOCATION, session.payment_url.as_str())
            .with_header(header::CACHE_CONTROL, "no-store")
            .with_header(SESSION_ID_HEADER, session.session_id.as_str())
    }
}

/// What a wrapped handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// A complete response, returned as is.
    Response(GuardResponse),
    /// A bare value, wrapped into a `200` JSON envelope.
    Raw(AnyJson),
}

impl HandlerOutput {
    pub fn into_response(self) -> GuardResponse {
        match self {
            HandlerOutput::Response(response) => response,
            HandlerOutput::Raw(value) => GuardResponse::json_ok(&value),
        }
    }
}

impl From<GuardResponse> for HandlerOutput {
    fn from(response: GuardResponse) -> Self {
        HandlerOutput::Response(response)
    }
}

impl From<AnyJson> for HandlerOutput {
    fn from(value: AnyJson) -> Self {
        HandlerOutput::Raw(value)
    }
}

impl From<String> for HandlerOutput {
    fn from(value: String) -> Self {
        HandlerOutput::Raw(AnyJson::String(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use valuya_core::types::default_required;

    use super::*;

    #[test]
    fn test_structured_response_passes_through() {
        let response = GuardResponse::new(StatusCode::CREATED, "{}").with_header("X-Custom", "1");
        assert_eq!(
            HandlerOutput::from(response.clone()).into_response(),
            response
        );
    }

    #[test]
    fn test_raw_value_is_wrapped() {
        let response = HandlerOutput::from(json!({"ok": true})).into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body, r#"{"ok":true}"#);

        let response = HandlerOutput::from("hello".to_string()).into_response();
        assert_eq!(response.body, "hello");
    }

    #[test]
    fn test_response_shaped_value_is_still_raw() {
        let response = HandlerOutput::from(json!({"statusCode": 201})).into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"statusCode":201}"#);
    }

    #[test]
    fn test_payment_required_shape() {
        let body = PaymentRequiredBody::builder()
            .reason("trial_expired")
            .required(default_required("pro"))
            .evaluated_plan("pro")
            .resource("aws:lambda:demo")
            .payment_url("https://pay/x")
            .session_id("s1")
            .build();

        let response = GuardResponse::payment_required(&body).unwrap();

        assert_eq!(response.status_code, 402);
        assert_eq!(
            response.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.header("cache-control"), Some("no-store"));
        assert_eq!(response.header(PAYMENT_URL_HEADER), Some("https://pay/x"));
        assert_eq!(response.header(SESSION_ID_HEADER), Some("s1"));

        let parsed: AnyJson = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            parsed,
            json!({
                "error": "payment_required",
                "reason": "trial_expired",
                "required": {"type": "subscription", "plan": "pro"},
                "evaluated_plan": "pro",
                "resource": "aws:lambda:demo",
                "payment_url": "https://pay/x",
                "session_id": "s1"
            })
        );
    }

    #[test]
    fn test_response_wire_shape() {
        let response = GuardResponse::new(StatusCode::OK, "x");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"statusCode": 200, "headers": {}, "body": "x"})
        );
    }
}
