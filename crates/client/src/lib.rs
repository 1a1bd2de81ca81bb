//! # `deskrep-client`: helpdesk API client
//!
//! The production [`CatalogLookup`] implementation against a Freshservice
//! tenant. Owns the transport concerns the core stays out of: the Basic
//! auth header, the retry policy (up to 3 attempts with exponential
//! backoff on network errors, 429 and 5xx) and the response envelopes.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use deskrep::auth::Credentials;
use deskrep::{CatalogLookup, LookupError, NamedRef, ServiceItem};

const MAX_ATTEMPTS: u32 = 3;

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to reach the helpdesk API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("helpdesk API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode a helpdesk API response: {0}")]
    Decode(String),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl From<ClientError> for LookupError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => LookupError::Http(e.to_string()),
            ClientError::Api { status, body } => LookupError::Api { status, body },
            ClientError::Decode(msg) => LookupError::Decode(msg),
            ClientError::InvalidCredentials(msg) => LookupError::Http(msg),
        }
    }
}

// --- Response Envelopes ---

#[derive(Deserialize)]
struct ItemEnvelope {
    service_item: ServiceItem,
}

#[derive(Deserialize)]
struct CategoryEnvelope {
    service_category: NamedRef,
}

#[derive(Deserialize)]
struct GroupEnvelope {
    group: NamedRef,
}

#[derive(Deserialize)]
struct RequesterGroupEnvelope {
    requester_group: NamedRef,
}

#[derive(Deserialize)]
struct WorkspaceEnvelope {
    workspace: NamedRef,
}

#[derive(Deserialize)]
struct WorkspacesEnvelope {
    workspaces: Vec<NamedRef>,
}

// --- Client ---

fn base_url_for(domain: &str) -> String {
    env::var("DESKREP_API_BASE_URL_OVERRIDE_FOR_TESTING")
        .unwrap_or_else(|_| format!("https://{domain}.freshservice.com"))
}

/// A client bound to one tenant's credentials.
pub struct FreshserviceClient {
    http: reqwest::Client,
    base_url: String,
}

impl FreshserviceClient {
    pub fn new(credentials: &Credentials) -> Result<Self, ClientError> {
        let base_url = base_url_for(&credentials.domain);
        Self::with_base_url(credentials, base_url)
    }

    /// Builds a client against an explicit base URL. Tests point this at a
    /// mock server.
    pub fn with_base_url(
        credentials: &Credentials,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let token = BASE64.encode(format!("{}:X", credentials.api_key));
        let mut auth_value = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| ClientError::InvalidCredentials(e.to_string()))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.http.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| ClientError::Decode(e.to_string()));
                    }

                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                    if retryable && attempt < MAX_ATTEMPTS {
                        let delay = backoff_delay(attempt);
                        warn!(%url, status = status.as_u16(), attempt, "retrying after {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ClientError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) if attempt < MAX_ATTEMPTS => {
                    let delay = backoff_delay(attempt);
                    warn!(%url, attempt, "request error ({err}), retrying after {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    debug!(%url, "request failed after {attempt} attempts");
                    return Err(ClientError::Http(err));
                }
            }
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(100 * 2u64.pow(attempt - 1))
}

#[async_trait]
impl CatalogLookup for FreshserviceClient {
    async fn fetch_item(&self, display_id: u64) -> Result<ServiceItem, LookupError> {
        let envelope: ItemEnvelope = self
            .get_json(&format!("/api/v2/service_catalog/items/{display_id}"))
            .await?;
        Ok(envelope.service_item)
    }

    async fn fetch_category(&self, id: u64) -> Result<NamedRef, LookupError> {
        let envelope: CategoryEnvelope = self
            .get_json(&format!("/api/v2/service_catalog/categories/{id}"))
            .await?;
        Ok(envelope.service_category)
    }

    async fn fetch_agent_group(&self, id: u64) -> Result<NamedRef, LookupError> {
        let envelope: GroupEnvelope = self.get_json(&format!("/api/v2/groups/{id}")).await?;
        Ok(envelope.group)
    }

    async fn fetch_requester_group(&self, id: u64) -> Result<NamedRef, LookupError> {
        let envelope: RequesterGroupEnvelope = self
            .get_json(&format!("/api/v2/requester_groups/{id}"))
            .await?;
        Ok(envelope.requester_group)
    }

    async fn fetch_workspace(&self, id: u64) -> Result<NamedRef, LookupError> {
        let envelope: WorkspaceEnvelope =
            self.get_json(&format!("/api/v2/workspaces/{id}")).await?;
        Ok(envelope.workspace)
    }

    async fn list_workspaces(&self) -> Result<Vec<NamedRef>, LookupError> {
        let envelope: WorkspacesEnvelope = self.get_json("/api/v2/workspaces").await?;
        Ok(envelope.workspaces)
    }
}
