//! The project registry: local project records reconciled with Sentry.
//!
//! A write fetches the remote project first and creates it under the given
//! team only when Sentry reports it absent, then persists the combined
//! record. Re-running a write with the same inputs against unchanged
//! remote state converges to the same stored bytes.

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::errors::{EngineError, Result};
use crate::reconcile::{self, ReconcileError};
use crate::storage::{self, Storage};

pub(crate) const KEY_PROJECT_PREFIX: &str = "projects/";

pub(crate) fn project_key(name: &str) -> String {
    format!("{KEY_PROJECT_PREFIX}{name}")
}

/// A stored project record. Exists iff a project write has succeeded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    /// Local name, the storage key. Also the slug used for remote calls.
    pub name: String,
    /// Remote-reported project name.
    pub display_name: String,
    pub team: String,
    /// Copied from the config record at write time.
    pub org: String,
    /// Empty means no default.
    pub default_dsn_label: String,
}

/// A project write request. `team` is required; the boundary rejects empty
/// values before this struct reaches the handler.
#[derive(Deserialize, Debug)]
pub struct ProjectWriteRequest {
    pub team: String,
    #[serde(default)]
    pub default_dsn_label: String,
}

impl Backend {
    pub(crate) async fn load_project(&self, name: &str) -> Result<Option<ProjectRecord>> {
        Ok(storage::get_json(self.storage(), &project_key(name)).await?)
    }

    /// Returns the stored record for `name`. Pure storage lookup.
    pub async fn read_project(&self, name: &str) -> Result<ProjectRecord> {
        self.load_project(name)
            .await?
            .ok_or_else(|| EngineError::ProjectNotFound(name.to_string()))
    }

    /// Enumerates stored project names in storage order.
    pub async fn list_projects(&self) -> Result<Vec<String>> {
        Ok(self.storage().list(KEY_PROJECT_PREFIX).await?)
    }

    /// Reconciles `name` with Sentry and persists the resulting record,
    /// overwriting any prior record for that name.
    pub async fn write_project(
        &self,
        name: &str,
        request: ProjectWriteRequest,
    ) -> Result<ProjectRecord> {
        let config = self.require_config().await?;
        let client = config.client()?;

        let remote = reconcile::fetch_or_create(
            || client.get_project(&config.name, name),
            || client.create_project(&config.name, &request.team, name),
        )
        .await
        .map_err(|err| match err {
            ReconcileError::Fetch(source) => {
                EngineError::remote("failed to read project information from sentry", source)
            }
            ReconcileError::Create(source) => {
                EngineError::remote("failed to create new project in sentry", source)
            }
        })?;

        let record = ProjectRecord {
            name: name.to_string(),
            display_name: remote.name,
            team: request.team,
            org: config.name,
            default_dsn_label: request.default_dsn_label,
        };

        storage::put_json(self.storage(), &project_key(name), &record).await?;
        tracing::debug!(project = record.name.as_str(), "project record persisted");

        Ok(record)
    }

    /// Removes the stored record. Idempotent; deleting an absent project
    /// succeeds.
    pub async fn delete_project(&self, name: &str) -> Result<()> {
        self.storage().delete(&project_key(name)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{project_body, test_backend, write_config};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_request(team: &str, label: &str) -> ProjectWriteRequest {
        ProjectWriteRequest {
            team: team.to_string(),
            default_dsn_label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_requires_configuration() {
        let (backend, storage) = test_backend();

        let err = backend
            .write_project("app-1", write_request("testers", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotConfigured));

        // The guard fires before anything touches the project namespace.
        assert!(storage.list(KEY_PROJECT_PREFIX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_remote_project_is_not_recreated() {
        let server = MockServer::start().await;
        let (backend, _storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/existing-project/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(project_body("existing-project")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/teams/project-org/test-team/projects/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let record = backend
            .write_project("existing-project", write_request("test-team", ""))
            .await
            .unwrap();

        assert_eq!(
            record,
            ProjectRecord {
                name: "existing-project".into(),
                display_name: "display-name-existing-project".into(),
                team: "test-team".into(),
                org: "project-org".into(),
                default_dsn_label: "".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_remote_project_is_created() {
        let server = MockServer::start().await;
        let (backend, _storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/fresh-project/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/teams/project-org/test-team/projects/"))
            .and(body_json(serde_json::json!({ "name": "fresh-project" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(project_body("fresh-project")))
            .expect(1)
            .mount(&server)
            .await;

        let record = backend
            .write_project("fresh-project", write_request("test-team", "primary"))
            .await
            .unwrap();
        assert_eq!(record.display_name, "display-name-fresh-project");
        assert_eq!(record.default_dsn_label, "primary");

        let read_back = backend.read_project("fresh-project").await.unwrap();
        assert_eq!(read_back, record);
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_fall_through_to_create() {
        let server = MockServer::start().await;
        let (backend, storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/app-1/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api token"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/teams/project-org/test-team/projects/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = backend
            .write_project("app-1", write_request("test-team", ""))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read project information"));

        assert_eq!(storage.get(&project_key("app-1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_failure_persists_nothing() {
        let server = MockServer::start().await;
        let (backend, storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/app-1/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/teams/project-org/no-such-team/projects/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = backend
            .write_project("app-1", write_request("no-such-team", ""))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to create new project"));

        assert_eq!(storage.get(&project_key("app-1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_repeated_write_stores_identical_bytes() {
        let server = MockServer::start().await;
        let (backend, storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/app-1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(project_body("app-1")))
            .expect(2)
            .mount(&server)
            .await;

        backend
            .write_project("app-1", write_request("test-team", "primary"))
            .await
            .unwrap();
        let first = storage.get(&project_key("app-1")).await.unwrap().unwrap();

        backend
            .write_project("app-1", write_request("test-team", "primary"))
            .await
            .unwrap();
        let second = storage.get(&project_key("app-1")).await.unwrap().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_read_missing_project() {
        let (backend, _storage) = test_backend();
        let err = backend.read_project("unregistered").await.unwrap_err();
        assert!(matches!(err, EngineError::ProjectNotFound(_)));
        assert!(err.to_string().contains("unregistered"));
    }

    #[tokio::test]
    async fn test_list_is_ordered() {
        let server = MockServer::start().await;
        let (backend, _storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        for name in ["frs", "existing-project", "fresh-project"] {
            Mock::given(method("GET"))
                .and(path(format!("/projects/project-org/{name}/")))
                .respond_with(ResponseTemplate::new(200).set_body_string(project_body(name)))
                .mount(&server)
                .await;
            backend
                .write_project(name, write_request("test-team", ""))
                .await
                .unwrap();
        }

        assert_eq!(
            backend.list_projects().await.unwrap(),
            vec!["existing-project", "fresh-project", "frs"]
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = MockServer::start().await;
        let (backend, _storage) = test_backend();
        write_config(&backend, &server, "project-org").await;

        Mock::given(method("GET"))
            .and(path("/projects/project-org/app-1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(project_body("app-1")))
            .mount(&server)
            .await;
        backend
            .write_project("app-1", write_request("test-team", ""))
            .await
            .unwrap();

        backend.delete_project("app-1").await.unwrap();
        assert!(matches!(
            backend.read_project("app-1").await.unwrap_err(),
            EngineError::ProjectNotFound(_)
        ));

        // Deleting again, and deleting something that never existed, both
        // succeed.
        backend.delete_project("app-1").await.unwrap();
        backend.delete_project("never-existed").await.unwrap();
    }
}
