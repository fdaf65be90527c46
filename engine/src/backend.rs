//! The dispatch surface: a route table over the engine's resource paths
//! and the boundary where incoming requests become typed, validated
//! operation structs.

use std::sync::Arc;

use routing::{Resolved, Route, RouteMatch, RouteSet, Verb};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::ConfigWriteRequest;
use crate::errors::{EngineError, Result};
use crate::project::ProjectWriteRequest;
use crate::storage::Storage;

/// The resource family a route points at.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PathKind {
    Info,
    Config,
    Projects,
    Project,
    Dsn,
}

/// The secrets engine backend.
///
/// Holds no process-wide state: a backend is a value constructed over a
/// [`Storage`] handle, and independent backends over independent storages
/// are fully isolated tenants. Tenant credentials live in storage and are
/// loaded per operation.
pub struct Backend {
    storage: Arc<dyn Storage>,
    routes: RouteSet<PathKind>,
}

impl Backend {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let routes = RouteSet::new(vec![
            Route::new("info", &[Verb::Read], PathKind::Info),
            Route::new("config", &[Verb::Read, Verb::Write], PathKind::Config),
            Route::new("projects", &[Verb::List], PathKind::Projects),
            Route::new(
                "project/{name}",
                &[Verb::Read, Verb::Write, Verb::Delete],
                PathKind::Project,
            ),
            Route::new("dsn/{project}", &[Verb::Read], PathKind::Dsn),
            Route::new("dsn/{project}/{label}", &[Verb::Read], PathKind::Dsn),
        ]);

        Self { storage, routes }
    }

    pub(crate) fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Paths the host should serve without caller authentication.
    pub fn unauthenticated_paths() -> &'static [&'static str] {
        &["info"]
    }

    /// Static engine metadata.
    pub fn info(&self) -> Value {
        json!({
            "description": "Manage Sentry projects and their DSNs",
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Resolves `(verb, path)` against the route table and dispatches to
    /// the matching handler. Request bodies are deserialized into the
    /// per-operation request struct and validated before any I/O.
    pub async fn handle(&self, verb: Verb, path: &str, body: Value) -> Result<Value> {
        let matched = match self.routes.resolve(verb, path) {
            Resolved::Match(matched) => matched,
            Resolved::VerbNotAllowed => {
                tracing::warn!(%verb, path, "operation not supported on path");
                return Err(EngineError::UnsupportedOperation {
                    verb,
                    path: path.to_string(),
                });
            }
            Resolved::NoRoute => {
                tracing::warn!(%verb, path, "no route matched");
                return Err(EngineError::NoRoute(path.to_string()));
            }
        };

        tracing::debug!(%verb, path, kind = ?matched.action, "dispatching request");

        match (*matched.action, verb) {
            (PathKind::Info, Verb::Read) => Ok(self.info()),

            (PathKind::Config, Verb::Read) => to_response(self.read_config().await?),
            (PathKind::Config, Verb::Write) => {
                let request: ConfigWriteRequest = parse_body(body)?;
                require_field("org", &request.org)?;
                require_field("token", &request.token)?;
                to_response(self.write_config(request).await?)
            }

            (PathKind::Projects, Verb::List) => {
                let keys = self.list_projects().await?;
                Ok(json!({ "keys": keys }))
            }

            (PathKind::Project, Verb::Read) => {
                let name = path_param(&matched, "name")?;
                to_response(self.read_project(name).await?)
            }
            (PathKind::Project, Verb::Write) => {
                let name = path_param(&matched, "name")?;
                let request: ProjectWriteRequest = parse_body(body)?;
                require_field("team", &request.team)?;
                to_response(self.write_project(name, request).await?)
            }
            (PathKind::Project, Verb::Delete) => {
                let name = path_param(&matched, "name")?;
                self.delete_project(name).await?;
                Ok(json!({ "success": true }))
            }

            (PathKind::Dsn, Verb::Read) => {
                let project = path_param(&matched, "project")?;
                let label = matched.param("label").unwrap_or("");
                to_response(self.read_dsn(project, label).await?)
            }

            // The route table never pairs these; resolve() filters verbs.
            (_, verb) => Err(EngineError::UnsupportedOperation {
                verb,
                path: path.to_string(),
            }),
        }
    }
}

fn path_param<'a>(matched: &RouteMatch<'a, PathKind>, name: &str) -> Result<&'a str> {
    matched
        .param(name)
        .ok_or_else(|| EngineError::Validation(format!("missing path parameter {name}")))
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|err| EngineError::Validation(err.to_string()))
}

fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!(
            "field {field} must not be empty"
        )));
    }
    Ok(())
}

fn to_response<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
