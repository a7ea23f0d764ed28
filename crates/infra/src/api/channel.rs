//! HTTP implementation of the delivery port

use std::time::Duration;

use async_trait::async_trait;
use punchsync_core::DeliveryChannel;
use punchsync_domain::{
    AttendanceRecord, DeliveryError, DeliveryOutcome, EndpointConfig, PunchSyncError, Result,
};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::response::parse_acknowledgement;
use crate::errors::delivery_error;
use crate::http::HttpClient;

/// Upper bound for each reachability request.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Collection path the probe strips to reach the API root.
const COLLECTION_SEGMENT: &str = "pointages";

/// Posts batches to the receiving endpoint.
#[derive(Debug, Clone)]
pub struct HttpDeliveryChannel {
    client: HttpClient,
    endpoint: Url,
}

impl HttpDeliveryChannel {
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Build a channel from endpoint settings.
    ///
    /// # Errors
    /// `Configuration` when the URL does not parse or the client cannot be
    /// built.
    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        let endpoint = Url::parse(config.url.trim()).map_err(|err| {
            PunchSyncError::Configuration(format!("invalid endpoint url '{}': {err}", config.url))
        })?;
        Ok(Self::new(HttpClient::for_endpoint(config)?, endpoint))
    }

    pub fn url(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint URL without its trailing `pointages` segment. `None` for any
    /// other path.
    fn parent_url(&self) -> Option<Url> {
        let last = self.endpoint.path_segments()?.filter(|segment| !segment.is_empty()).last()?;
        if last != COLLECTION_SEGMENT {
            return None;
        }
        let mut parent = self.endpoint.clone();
        parent.path_segments_mut().ok()?.pop_if_empty().pop();
        Some(parent)
    }

    async fn probe_status(
        &self,
        method: Method,
        url: Url,
        body: Option<&[AttendanceRecord]>,
    ) -> Option<StatusCode> {
        let mut request = self.client.request(method.clone(), url).timeout(PROBE_TIMEOUT);
        if let Some(batch) = body {
            request = request.json(batch);
        }
        match self.client.send(request).await {
            Ok(response) => Some(response.status()),
            Err(err) => {
                debug!(%method, error = %err, "Probe request failed");
                None
            }
        }
    }
}

#[async_trait]
impl DeliveryChannel for HttpDeliveryChannel {
    #[instrument(skip(self, batch), fields(endpoint = %self.endpoint, record_count = batch.len()))]
    async fn deliver(&self, batch: &[AttendanceRecord]) -> Result<DeliveryOutcome, DeliveryError> {
        let request = self.client.request(Method::POST, self.endpoint.clone()).json(batch);
        let response = self.client.send(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| delivery_error(&err, self.client.timeout()))?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let outcome = parse_acknowledgement(status.as_u16(), &body);
            info!(
                status = status.as_u16(),
                saved = outcome.saved_count,
                duplicates = outcome.duplicate_count,
                "Endpoint accepted batch"
            );
            return Ok(outcome);
        }

        warn!(status = status.as_u16(), body = %body, "Endpoint rejected batch");
        Ok(DeliveryOutcome::rejected(status.as_u16(), body))
    }

    /// OPTIONS, then HEAD, then GET on the API root (only when the URL ends
    /// in `pointages`), then an empty POST.
    /// Any answer other than 404 counts as reachable.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn probe(&self) -> bool {
        let url = self.endpoint.clone();

        match self.probe_status(Method::OPTIONS, url.clone(), None).await {
            Some(status)
                if matches!(
                    status,
                    StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::METHOD_NOT_ALLOWED
                ) =>
            {
                info!(method = "OPTIONS", "Endpoint reachable");
                return true;
            }
            _ => {}
        }

        if let Some(status) = self.probe_status(Method::HEAD, url.clone(), None).await {
            if status != StatusCode::NOT_FOUND {
                info!(method = "HEAD", "Endpoint reachable");
                return true;
            }
        }

        if let Some(parent) = self.parent_url() {
            if let Some(status) = self.probe_status(Method::GET, parent, None).await {
                if status != StatusCode::NOT_FOUND {
                    info!(method = "GET", "Endpoint parent reachable");
                    return true;
                }
            }
        }

        let empty: &[AttendanceRecord] = &[];
        match self.probe_status(Method::POST, url, Some(empty)).await {
            Some(status) if status != StatusCode::NOT_FOUND => {
                info!(method = "POST", "Endpoint reachable");
                true
            }
            Some(_) => {
                warn!("Endpoint answered 404 to every probe");
                false
            }
            None => {
                warn!("Endpoint unreachable");
                false
            }
        }
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
