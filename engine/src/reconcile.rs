//! The reconciliation primitives shared by the project registry and the
//! DSN cache.
//!
//! Two building blocks:
//!
//! - [`fetch_or_create`] keeps the remote service the source of truth for
//!   "does this resource exist": it fetches first and falls back to
//!   creation only when the fetch reports not-found, so auth or transport
//!   failures are never masked as "needs creation".
//! - [`read_through`] serves a stored record when one exists and otherwise
//!   provisions, persists, and returns it. A present record short-circuits
//!   before the provision step runs, which makes records provisioned this
//!   way write-once.
//!
//! Two callers racing to provision the same absent key may each reach the
//! remote service before either write lands; storage puts are
//! last-write-wins and the records converge, so no per-key lock is taken.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::{self, Storage, StorageError};
use sentry_api::ApiError;

/// A remote reconciliation failure, tagged with the phase that failed so
/// callers can attach operation-specific context.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Fetch(ApiError),
    #[error(transparent)]
    Create(ApiError),
}

/// Fetches a remote resource, creating it only if the fetch reports
/// not-found. Any other fetch error aborts without attempting creation.
pub async fn fetch_or_create<T, F, FFut, C, CFut>(fetch: F, create: C) -> Result<T, ReconcileError>
where
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<T, ApiError>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = Result<T, ApiError>>,
{
    match fetch().await {
        Ok(value) => Ok(value),
        Err(ApiError::NotFound { resource }) => {
            tracing::debug!(resource, "remote resource absent, creating");
            create().await.map_err(ReconcileError::Create)
        }
        Err(err) => Err(ReconcileError::Fetch(err)),
    }
}

/// Returns the record stored at `key`, or provisions one, persists it, and
/// returns it. The provision step runs only when no record exists.
pub async fn read_through<T, F, Fut, E>(
    storage: &dyn Storage,
    key: &str,
    provision: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<StorageError>,
{
    if let Some(record) = storage::get_json::<T>(storage, key).await? {
        return Ok(record);
    }

    let record = provision().await?;
    storage::put_json(storage, key, &record).await?;
    Ok(record)
}
