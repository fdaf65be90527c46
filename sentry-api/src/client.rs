use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{ClientKey, Organization, Project};

/// Errors produced by the Sentry API client.
///
/// `NotFound` is a distinct kind because reconciliation treats a missing
/// remote resource as "needs creation" while every other failure must be
/// surfaced as-is.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid sentry endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to build sentry http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("sentry resource not found: {resource}")]
    NotFound { resource: String },

    #[error("sentry request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("sentry transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode sentry response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the Sentry web API, scoped to a single token and endpoint.
///
/// The endpoint is normalized to end with exactly one trailing slash so
/// relative joins resolve under the API root. All requests carry bearer
/// auth and are bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct SentryClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl SentryClient {
    /// Creates a client from a token, endpoint URL, and request timeout in
    /// seconds. A timeout of zero disables the bound.
    pub fn new(token: &str, endpoint: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let normalized = format!("{}/", endpoint.trim_end_matches('/'));
        let endpoint = Url::parse(&normalized)?;

        let mut builder = reqwest::Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(timeout_secs));
        }
        let http = builder.build().map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint,
            token: token.to_string(),
        })
    }

    /// The normalized endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub async fn get_organization(&self, org: &str) -> Result<Organization, ApiError> {
        self.get(&format!("organizations/{org}/"), &format!("organization {org}"))
            .await
    }

    pub async fn get_project(&self, org: &str, project: &str) -> Result<Project, ApiError> {
        self.get(
            &format!("projects/{org}/{project}/"),
            &format!("project {org}/{project}"),
        )
        .await
    }

    /// Creates a project under the given team. Sentry derives the project
    /// slug from the submitted name.
    pub async fn create_project(
        &self,
        org: &str,
        team: &str,
        name: &str,
    ) -> Result<Project, ApiError> {
        self.post(
            &format!("teams/{org}/{team}/projects/"),
            &serde_json::json!({ "name": name }),
            &format!("team {org}/{team}"),
        )
        .await
    }

    pub async fn list_client_keys(
        &self,
        org: &str,
        project: &str,
    ) -> Result<Vec<ClientKey>, ApiError> {
        self.get(
            &format!("projects/{org}/{project}/keys/"),
            &format!("project {org}/{project}"),
        )
        .await
    }

    /// Issues a new client key labeled `label` for the project.
    pub async fn create_client_key(
        &self,
        org: &str,
        project: &str,
        label: &str,
    ) -> Result<ClientKey, ApiError> {
        self.post(
            &format!("projects/{org}/{project}/keys/"),
            &serde_json::json!({ "name": label }),
            &format!("project {org}/{project}"),
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T, ApiError> {
        let url = self.endpoint.join(path)?;
        tracing::debug!(url = url.as_str(), "sentry api get");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::decode(response, resource).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
        resource: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint.join(path)?;
        tracing::debug!(url = url.as_str(), "sentry api post");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        Self::decode(response, resource).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, ApiError> {
        match response.status() {
            status if status.is_success() => response.json::<T>().await.map_err(ApiError::Decode),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                resource: resource.to_string(),
            }),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Status { status, body })
            }
        }
    }
}
