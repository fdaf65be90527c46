//! Shared fixtures for engine tests. Remote responses mirror the payloads
//! the Sentry API returns for the fields the engine consumes.

use std::sync::Arc;

use routing::Verb;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::backend::Backend;
use crate::storage::MemoryStorage;

/// A backend over fresh in-memory storage, plus a handle to that storage
/// for inspecting persisted bytes.
pub fn test_backend() -> (Backend, MemoryStorage) {
    let storage = MemoryStorage::new();
    let backend = Backend::new(Arc::new(storage.clone()));
    (backend, storage)
}

pub fn org_body(slug: &str) -> String {
    format!(r#"{{"id": "2", "slug": "{slug}", "name": "display-name-{slug}"}}"#)
}

pub fn project_body(name: &str) -> String {
    format!(r#"{{"id": "5", "slug": "{name}", "name": "display-name-{name}", "status": "active"}}"#)
}

pub fn key_body(label: &str) -> String {
    format!(
        r#"{{"id": "cec9dfce", "label": "{label}", "name": "Fabulous Key", "isActive": true, "dsn": {{"public": "https://test@sentry.io/2"}}}}"#
    )
}

pub fn keys_body(label: &str) -> String {
    format!("[{}]", key_body(label))
}

/// Mounts the organization fixture and writes a config record pointing the
/// backend at the mock server.
pub async fn write_config(backend: &Backend, server: &MockServer, org: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/organizations/{org}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(org_body(org)))
        .mount(server)
        .await;

    backend
        .handle(
            Verb::Write,
            "config",
            json!({ "org": org, "token": "token-123", "endpoint": server.uri() }),
        )
        .await
        .expect("config write should succeed");
}
