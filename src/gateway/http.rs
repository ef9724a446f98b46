//! reqwest implementation of the discovery gateway.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{DiscoveryError, Result};
use crate::types::{DiscoveryRecord, RecordPage, ReviewResponse, Stats, TriggerAck};

use super::{DiscoveryApi, ListQuery};

/// Path of the discovery resource under the service base URL
const DISCOVERY_PATH: &str = "api/discovery";

/// Discovery service client over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Create a gateway from configuration
    ///
    /// The configured request timeout applies to the whole request; connecting
    /// is capped at the same value.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.api_url(), config.request_timeout())
    }

    /// Create a gateway with no client-side timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base: discovery_root(base_url)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if !segments.is_empty()
            && let Ok(mut path) = url.path_segments_mut()
        {
            path.extend(segments);
        }
        url
    }

    fn list_url(&self, query: &ListQuery) -> Url {
        let mut url = self.endpoint(&[]);
        url.query_pairs_mut().extend_pairs(query.to_pairs());
        url
    }

    /// Send a request and enforce the success contract
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        debug!(%method, %url, "discovery request");

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "discovery request failed");
            return Err(DiscoveryError::HttpStatus {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| DiscoveryError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        Self::decode(response).await
    }
}

/// Resolve `<base>/api/discovery` from a service base URL
fn discovery_root(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| DiscoveryError::InvalidUrl(base_url.to_string(), reason);

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?;
        path.pop_if_empty();
        path.extend(DISCOVERY_PATH.split('/'));
    }
    url.set_query(None);
    Ok(url)
}

impl DiscoveryApi for HttpGateway {
    async fn list_records(&self, query: &ListQuery) -> Result<RecordPage> {
        self.get_json(self.list_url(query)).await
    }

    async fn get_record(&self, id: i64) -> Result<DiscoveryRecord> {
        let url = self.endpoint(&[&id.to_string()]);
        match self.get_json(url).await {
            Err(DiscoveryError::HttpStatus { status })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(DiscoveryError::RecordNotFound(id))
            }
            other => other,
        }
    }

    async fn approve(&self, id: i64, approved_by: &str) -> Result<DiscoveryRecord> {
        let url = self.endpoint(&[&id.to_string(), "approve"]);
        let body = json!({ "approved_by": approved_by });
        let response = self.send(Method::PUT, url, Some(body)).await?;
        let review: ReviewResponse = Self::decode(response).await?;
        Ok(review.into_record())
    }

    async fn reject(
        &self,
        id: i64,
        rejected_by: &str,
        reason: Option<&str>,
    ) -> Result<DiscoveryRecord> {
        let url = self.endpoint(&[&id.to_string(), "reject"]);
        let body = json!({
            "rejected_by": rejected_by,
            "rejection_reason": reason,
        });
        let response = self.send(Method::PUT, url, Some(body)).await?;
        let review: ReviewResponse = Self::decode(response).await?;
        Ok(review.into_record())
    }

    async fn get_stats(&self) -> Result<Stats> {
        self.get_json(self.endpoint(&["stats"])).await
    }

    async fn trigger_scan(&self) -> Result<TriggerAck> {
        let url = self.endpoint(&["trigger"]);
        let response = self.send(Method::POST, url, None).await?;
        let bytes = response.bytes().await?;

        // an accepted trigger may come back with no body at all
        let mut ack: TriggerAck = if bytes.iter().all(u8::is_ascii_whitespace) {
            TriggerAck::default()
        } else {
            serde_json::from_slice(&bytes).map_err(|e| DiscoveryError::Decode(e.to_string()))?
        };
        ack.accepted = true;
        Ok(ack)
    }
}
