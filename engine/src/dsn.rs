//! The DSN cache: write-once records in front of Sentry's client keys.
//!
//! Resolution is read-through: a cached record is returned without any
//! remote traffic; otherwise the remote key listing is consulted so an
//! existing key with the requested label is reused before a new one is
//! issued. Once written, a record for a (project, label) pair is never
//! overwritten, so repeated reads are stable even if remote state changes.

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::errors::{EngineError, Result};
use crate::reconcile::{self, ReconcileError};
use sentry_api::{ApiError, ClientKey, SentryClient};

pub(crate) const KEY_DSN_PREFIX: &str = "dsn/";

pub(crate) fn dsn_key(project: &str, label: &str) -> String {
    format!("{KEY_DSN_PREFIX}{project}/{label}")
}

/// A cached DSN, keyed by (project, label).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DsnRecord {
    /// The key label.
    pub name: String,
    /// The public DSN issued by Sentry.
    pub dsn: String,
}

impl Backend {
    /// Resolves the DSN for `(project_name, label)`, provisioning a remote
    /// client key on first use. An empty `label` substitutes the project's
    /// default DSN label.
    pub async fn read_dsn(&self, project_name: &str, label: &str) -> Result<DsnRecord> {
        let project = self
            .load_project(project_name)
            .await?
            .ok_or_else(|| EngineError::ProjectNotFound(project_name.to_string()))?;

        let label = if label.is_empty() {
            project.default_dsn_label.as_str()
        } else {
            label
        };

        if label.is_empty() {
            return Err(EngineError::NoDefaultLabel(project_name.to_string()));
        }

        reconcile::read_through(self.storage(), &dsn_key(project_name, label), || async {
            let config = self.require_config().await?;
            let client = config.client()?;

            let key = reconcile::fetch_or_create(
                || find_key(&client, &config.name, &project.name, label),
                || client.create_client_key(&config.name, &project.name, label),
            )
            .await
            .map_err(|err| match err {
                ReconcileError::Fetch(source) | ReconcileError::Create(source) => {
                    EngineError::remote("failed to retrieve client keys from sentry", source)
                }
            })?;

            tracing::debug!(project = project.name.as_str(), label, "client key provisioned");

            Ok(DsnRecord {
                name: key.label,
                dsn: key.dsn.public,
            })
        })
        .await
    }
}

/// Returns the first remote key whose label matches, in the order the
/// listing came back. Duplicate labels are resolved by that order.
async fn find_key(
    client: &SentryClient,
    org: &str,
    project: &str,
    label: &str,
) -> Result<ClientKey, ApiError> {
    let keys = client.list_client_keys(org, project).await?;
    keys.into_iter()
        .find(|key| key.label == label)
        .ok_or_else(|| ApiError::NotFound {
            resource: format!("client key {label} for project {project}"),
        })
}
