//! The config store: the single tenant credential record.
//!
//! A config write is validated against Sentry before anything is
//! persisted; the stored record combines the remote-reported organization
//! slug and name with the submitted credentials. The API token never
//! leaves storage: responses expose only the [`ConfigData`] projection.

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::errors::{EngineError, Result};
use crate::storage;
use sentry_api::SentryClient;

pub(crate) const KEY_CONFIG: &str = "config";

pub const DEFAULT_ENDPOINT: &str = "https://sentry.io/api/0/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The stored configuration record. One per backend instance, written
/// wholesale, never partially updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrgConfig {
    /// Remote-reported organization slug.
    pub name: String,
    /// Remote-reported organization name.
    pub display_name: String,
    pub api_token: String,
    /// Normalized to end with exactly one trailing slash.
    pub endpoint: String,
    pub connection_timeout: u64,
}

impl OrgConfig {
    /// Builds a Sentry client from the stored credentials.
    pub fn client(&self) -> Result<SentryClient> {
        SentryClient::new(&self.api_token, &self.endpoint, self.connection_timeout).map_err(
            |source| {
                EngineError::remote(
                    "failed to initialize sentry client from stored configuration",
                    source,
                )
            },
        )
    }

    /// The public projection of this record. Excludes the API token.
    pub fn public(&self) -> ConfigData {
        ConfigData {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            endpoint: self.endpoint.clone(),
            timeout: self.connection_timeout,
        }
    }
}

/// Public config fields as returned to callers.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConfigData {
    pub name: String,
    pub display_name: String,
    pub endpoint: String,
    pub timeout: u64,
}

/// A config write request. `org` and `token` are required; the boundary
/// rejects empty values before this struct reaches the handler.
#[derive(Deserialize, Debug)]
pub struct ConfigWriteRequest {
    pub org: String,
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn normalize_endpoint(endpoint: &str) -> String {
    format!("{}/", endpoint.trim_end_matches('/'))
}

impl Backend {
    pub(crate) async fn load_config(&self) -> Result<Option<OrgConfig>> {
        Ok(storage::get_json(self.storage(), KEY_CONFIG).await?)
    }

    pub(crate) async fn require_config(&self) -> Result<OrgConfig> {
        self.load_config().await?.ok_or(EngineError::NotConfigured)
    }

    /// Returns the stored configuration's public fields.
    pub async fn read_config(&self) -> Result<ConfigData> {
        Ok(self.require_config().await?.public())
    }

    /// Validates the submitted credentials against Sentry and persists the
    /// resulting record. Exactly one remote call; nothing is persisted on
    /// any failure.
    pub async fn write_config(&self, request: ConfigWriteRequest) -> Result<ConfigData> {
        let endpoint = normalize_endpoint(&request.endpoint);

        let client = SentryClient::new(&request.token, &endpoint, request.timeout).map_err(
            |source| {
                EngineError::remote(
                    "failed to initialize sentry client with given configuration",
                    source,
                )
            },
        )?;

        let org = client.get_organization(&request.org).await.map_err(|source| {
            EngineError::remote("failed to retrieve organization details from sentry", source)
        })?;

        let record = OrgConfig {
            name: org.slug,
            display_name: org.name,
            api_token: request.token,
            endpoint,
            connection_timeout: request.timeout,
        };

        storage::put_json(self.storage(), KEY_CONFIG, &record).await?;
        tracing::debug!(org = record.name.as_str(), "configuration persisted");

        Ok(record.public())
    }
}
