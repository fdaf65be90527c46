//! Sentry secrets engine.
//!
//! Reconciles locally stored configuration with Sentry's organization,
//! project, and client-key hierarchy, and exposes the results as
//! read-through records: a record is provisioned remotely the first time it
//! is requested and served from storage on every read after that.
//!
//! The engine is transport-agnostic. A host provides persistence through
//! the [`Storage`] trait and maps its own request surface onto
//! [`Backend::handle`]; authentication, leasing, and transport security are
//! the host's concern.

pub mod backend;
pub mod config;
pub mod dsn;
pub mod errors;
pub mod project;
pub mod reconcile;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutils;

pub use backend::Backend;
pub use config::{ConfigData, ConfigWriteRequest, OrgConfig};
pub use dsn::DsnRecord;
pub use errors::{EngineError, Result};
pub use project::{ProjectRecord, ProjectWriteRequest};
pub use routing::Verb;
pub use storage::{MemoryStorage, Storage, StorageError};
