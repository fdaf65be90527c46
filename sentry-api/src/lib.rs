//! Minimal client for the Sentry web API.
//!
//! Covers exactly the calls the secrets engine needs to reconcile its local
//! records with Sentry: organization lookup, project fetch/create, and
//! client key (DSN) listing/creation. Errors carry an explicit kind so
//! callers can branch on "not found" without inspecting error internals.

pub mod client;
pub mod types;

pub use client::{ApiError, SentryClient};
pub use reqwest::StatusCode;
pub use types::{ClientKey, DsnUrls, Organization, Project};
