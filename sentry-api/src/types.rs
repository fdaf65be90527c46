use serde::Deserialize;

/// Organization metadata as reported by Sentry.
///
/// Sentry returns many more fields; only the ones the engine stores are
/// deserialized.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Organization {
    pub slug: String,
    pub name: String,
}

/// Project metadata as reported by Sentry.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    #[serde(default)]
    pub slug: String,
    pub name: String,
}

/// A client key issued for a project. The public DSN under `dsn.public` is
/// what error-reporting SDKs consume.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ClientKey {
    #[serde(default)]
    pub label: String,
    pub dsn: DsnUrls,
}

/// The DSN variants Sentry issues per key. Only the public form is used.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DsnUrls {
    pub public: String,
}
