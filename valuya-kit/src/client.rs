//! HTTP client for the remote Valuya entitlement service.

use std::borrow::Cow;

use http::{
    HeaderMap, HeaderValue,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use url::Url;
use valuya_core::{
    errors::Error,
    service::EntitlementService,
    types::{
        CheckoutRequest, CheckoutSession, CheckoutSessionResponse, EntitlementRequest,
        Entitlements, EntitlementsResponse, Subject,
    },
};

use crate::config::RemoteEndpointConfig;

pub const ENTITLEMENTS_PATH: &str = "/api/v2/entitlements";
pub const CHECKOUT_SESSIONS_PATH: &str = "/api/v2/checkout/sessions";

pub const SUBJECT_TYPE_HEADER: &str = "x-valuya-subject-type";
pub const SUBJECT_ID_HEADER: &str = "x-valuya-subject-id";
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

#[derive(Debug, Clone)]
enum EndpointSource {
    Fixed(RemoteEndpointConfig),
    Environment,
}

/// A remote entitlement service client that communicates over HTTP.
///
/// Every call is a single request with its own timeout. Nothing is retried and
/// nothing is cached. The underlying [`reqwest::Client`] is shared by clones.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    pub client: reqwest::Client,
    endpoint: EndpointSource,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteClientError {
    /// Configuration, HTTP status, validation and JSON errors.
    #[error(transparent)]
    Guard(#[from] Error),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    /// Transport failures, including timeouts.
    #[error("HTTP request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),
}

impl RemoteClientError {
    /// The remote status code for an HTTP error response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteClientError::Guard(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, RemoteClientError::Guard(Error::Config(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RemoteClientError::Guard(Error::Validation(_)))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteClientError::HttpRequestError(err) if err.is_timeout())
    }
}

impl RemoteClient {
    /// A client bound to a fixed endpoint configuration.
    pub fn new(config: RemoteEndpointConfig) -> Self {
        RemoteClient {
            client: reqwest::Client::new(),
            endpoint: EndpointSource::Fixed(config),
        }
    }

    /// A client that reads `BASE_URL` and `SITE_TOKEN` on every call.
    pub fn from_env() -> Self {
        RemoteClient {
            client: reqwest::Client::new(),
            endpoint: EndpointSource::Environment,
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The endpoint configuration for the next call.
    pub fn endpoint(&self) -> Result<Cow<'_, RemoteEndpointConfig>, RemoteClientError> {
        match &self.endpoint {
            EndpointSource::Fixed(config) => Ok(Cow::Borrowed(config)),
            EndpointSource::Environment => Ok(Cow::Owned(RemoteEndpointConfig::from_env()?)),
        }
    }

    fn url(config: &RemoteEndpointConfig, path: &str) -> Result<Url, RemoteClientError> {
        Ok(Url::parse(&format!("{}{path}", config.base()?))?)
    }

    fn subject_headers(
        config: &RemoteEndpointConfig,
        subject: &Subject,
    ) -> Result<HeaderMap, RemoteClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            SUBJECT_TYPE_HEADER,
            HeaderValue::from_static(subject.subject_type.as_str()),
        );
        headers.insert(SUBJECT_ID_HEADER, HeaderValue::from_str(&subject.id)?);
        if let Some(token) = config.bearer_token() {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        Ok(headers)
    }

    /// Read the body, turning any status >= 400 into [`Error::Http`].
    async fn read_body(response: reqwest::Response) -> Result<String, RemoteClientError> {
        let status = response.status();
        let body = response.text().await;

        if status.as_u16() >= 400 {
            #[cfg(feature = "tracing")]
            tracing::warn!("Remote service answered with error status {status}");

            let body = body.unwrap_or_default();
            return Err(Error::http(status.as_u16(), &body).into());
        }

        Ok(body?)
    }
}

impl EntitlementService for RemoteClient {
    type Error = RemoteClientError;

    async fn entitlements(
        &self,
        request: EntitlementRequest,
    ) -> Result<Entitlements, Self::Error> {
        let config = self.endpoint()?;

        let mut url = Self::url(&config, ENTITLEMENTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("plan", &request.plan)
            .append_pair("resource", &request.resource);

        let response = self
            .client
            .get(url)
            .headers(Self::subject_headers(&config, &request.subject)?)
            .timeout(config.timeout)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        if body.is_empty() {
            return Ok(Entitlements::inactive());
        }

        let wire: EntitlementsResponse = serde_json::from_str(&body).map_err(Error::from)?;
        Ok(wire.into())
    }

    async fn checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, Self::Error> {
        let config = self.endpoint()?;

        let url = Self::url(&config, CHECKOUT_SESSIONS_PATH)?;
        let mut headers = Self::subject_headers(&config, &request.subject)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            IDEMPOTENCY_KEY_HEADER,
            HeaderValue::from_str(&request.idempotency_key())?,
        );

        let response = self
            .client
            .post(url)
            .headers(headers)
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let wire: CheckoutSessionResponse = if body.is_empty() {
            CheckoutSessionResponse::default()
        } else {
            serde_json::from_str(&body).map_err(Error::from)?
        };

        Ok(CheckoutSession::try_from(wire)?)
    }
}
