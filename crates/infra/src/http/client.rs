use std::time::Duration;

use punchsync_domain::{DeliveryError, EndpointConfig, PunchSyncError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::{delivery_error, InfraError};

/// HTTP client for the receiving endpoint.
///
/// Sends each request exactly once with a fixed timeout; retrying is the
/// delivery policy's job. Every request advertises `Accept: application/json`.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from endpoint settings.
    pub fn for_endpoint(config: &EndpointConfig) -> Result<Self, PunchSyncError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .accept_invalid_certs(config.accept_invalid_certs)
            .build()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request, classifying transport failures.
    ///
    /// Any HTTP status is `Ok`; interpreting it is up to the caller.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, DeliveryError> {
        let request = builder
            .build()
            .map_err(|err| DeliveryError::Connection(format!("cannot build request: {err}")))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            delivery_error(&err, self.timeout)
        })?;
        debug!(%method, %url, status = %response.status(), "received HTTP response");
        Ok(response)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(punchsync_domain::constants::DEFAULT_ENDPOINT_TIMEOUT_SECS),
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Skip TLS certificate verification (self-signed on-premise endpoints).
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, PunchSyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| PunchSyncError::from(InfraError::from(err)))?;
        Ok(HttpClient { client, timeout: self.timeout })
    }
}
