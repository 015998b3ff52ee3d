use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Top-level registry configuration shared across hosts.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfigInner {
    pub database: DatabaseConfig,
    pub pool: PoolConfig,
    /// Optional per-request timeout applied at the worker-pool boundary,
    /// in milliseconds. `None` keeps the historical run-to-completion behavior.
    pub request_timeout_ms: Option<u64>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(flatten, default)]
    inner: Arc<RegistryConfigInner>,
}

impl Deref for RegistryConfig {
    type Target = RegistryConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for RegistryConfig {
    fn deref_mut(&mut self) -> &mut RegistryConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Worker-pool sizing for the registry's scheduling resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads; `0` lets the runtime auto-detect.
    pub worker_threads: usize,
    pub thread_name: String,
}

// --- Default ---

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "realm".to_owned(),
            database: "registry".to_owned(),
            credentials: None,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { worker_threads: 0, thread_name: "registry-worker".to_owned() }
    }
}
