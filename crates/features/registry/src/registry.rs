//! The orchestration component: validates inputs, dispatches work onto the
//! owned worker pool, and delivers typed results through [`Pending`] handles.

use crate::error::{RegistryError, StoreError};
use crate::pending::Pending;
use crate::store::OwnershipStore;
use realm_database::Database;
use realm_kernel::domain::config::RegistryConfig;
use realm_kernel::domain::{HoldingSet, Kingdom, KingdomId, PlayerId, SpatialKey};
use realm_runtime::{RuntimeConfig, WorkerPool};
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, trace};

/// The kingdom registry: asynchronous ownership resolution and mutation.
///
/// Owns its scheduling resource (a [`WorkerPool`]) and its persistence handle.
/// Every operation returns immediately with a [`Pending`] result; the calling
/// task is never blocked on store I/O. No ordering is guaranteed across
/// distinct requests; within one request, store calls are sequential.
///
/// There is no in-process cache: every read is a fresh resolution against the
/// store, so the store's constraints are the single source of truth.
#[derive(Debug)]
pub struct KingdomRegistry {
    store: OwnershipStore,
    pool: WorkerPool,
    timeout: Option<Duration>,
}

impl KingdomRegistry {
    /// Creates a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Assembles database, worker pool, and registry from a single config.
    ///
    /// # Errors
    /// Returns [`RegistryError::Database`] if the connection or migrations
    /// fail, and [`RegistryError::Internal`] if the pool cannot start.
    pub async fn connect(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = Database::builder()
            .url(&config.database.url)
            .session(&config.database.namespace, &config.database.database);
        if let Some(credentials) = &config.database.credentials {
            builder = builder.auth(&credentials.username, &credentials.password);
        }
        let database = builder.init().await?;

        let mut runtime_config =
            RuntimeConfig::default().with_thread_name(&config.pool.thread_name);
        if config.pool.worker_threads > 0 {
            runtime_config = runtime_config.with_worker_threads(config.pool.worker_threads);
        }
        let pool = WorkerPool::start(&runtime_config).map_err(|e| RegistryError::Internal {
            message: e.to_string().into(),
            context: Some("Starting registry worker pool".into()),
        })?;

        let mut registry = Self::builder().database(database).pool(pool);
        if let Some(ms) = config.request_timeout_ms {
            registry = registry.timeout(Duration::from_millis(ms));
        }
        registry.build()
    }

    /// Resolves a kingdom by its display name (exact, case-sensitive).
    pub fn kingdom_by_name(&self, name: impl Into<String>) -> Pending<Option<Kingdom>> {
        let name = name.into();
        self.submit(move |store| async move { store.kingdom_by_name(&name).await })
    }

    /// Resolves the kingdom owning the land unit at `key`, if any.
    pub fn kingdom_at(&self, key: SpatialKey) -> Pending<Option<Kingdom>> {
        self.submit(move |store| async move { store.kingdom_at(&key).await })
    }

    /// Delivers the complete current holding set of a kingdom.
    ///
    /// Resolves to an empty set when the kingdom owns nothing (or does not
    /// exist); store failures surface as errors, not as emptiness.
    pub fn holdings(&self, id: KingdomId) -> Pending<HoldingSet> {
        self.submit(move |store| async move { store.holdings_of(&id).await })
    }

    /// Creates a kingdom; resolves `true` iff exactly one row was inserted.
    ///
    /// A name collision resolves `false`; the store's uniqueness constraint
    /// is the only arbiter, so concurrent same-name creates race safely.
    pub fn create_kingdom(
        &self,
        id: KingdomId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Pending<bool> {
        let name = name.into();
        let description = description.into();
        self.submit(
            move |store| async move { store.insert_kingdom(&id, &name, &description).await },
        )
    }

    /// Removes a kingdom and all of its holdings; resolves `true` iff the
    /// kingdom existed.
    pub fn remove_kingdom(&self, id: KingdomId) -> Pending<bool> {
        self.submit(move |store| async move { store.delete_kingdom(&id).await })
    }

    /// Claims the land unit at `key` for a kingdom; resolves `false` when the
    /// unit is already owned.
    pub fn claim(&self, id: KingdomId, key: SpatialKey) -> Pending<bool> {
        self.submit(move |store| async move { store.insert_holding(&id, &key).await })
    }

    /// Releases the land unit at `key`; resolves `true` iff a holding existed.
    pub fn release(&self, key: SpatialKey) -> Pending<bool> {
        self.submit(move |store| async move { store.delete_holding(&key).await })
    }

    /// Membership surface, present but not implemented by this registry.
    ///
    /// Each of these resolves immediately to
    /// [`RegistryError::Unsupported`], a typed refusal, never a silent no-op,
    /// so callers cannot mistake it for success or absence.
    pub fn kingdom_of_player(&self, player: PlayerId) -> Pending<Option<Kingdom>> {
        trace!(%player, "Unsupported membership lookup requested");
        Pending::ready(Err(RegistryError::Unsupported { operation: "kingdom_of_player".into() }))
    }

    /// See [`KingdomRegistry::kingdom_of_player`].
    pub fn add_member(&self, id: KingdomId, player: PlayerId) -> Pending<bool> {
        trace!(%id, %player, "Unsupported membership mutation requested");
        Pending::ready(Err(RegistryError::Unsupported { operation: "add_member".into() }))
    }

    /// See [`KingdomRegistry::kingdom_of_player`].
    pub fn remove_member(&self, id: KingdomId, player: PlayerId) -> Pending<bool> {
        trace!(%id, %player, "Unsupported membership mutation requested");
        Pending::ready(Err(RegistryError::Unsupported { operation: "remove_member".into() }))
    }

    /// See [`KingdomRegistry::kingdom_of_player`].
    pub fn is_member(&self, id: KingdomId, player: PlayerId) -> Pending<bool> {
        trace!(%id, %player, "Unsupported membership lookup requested");
        Pending::ready(Err(RegistryError::Unsupported { operation: "is_member".into() }))
    }

    /// Releases the registry and its worker pool without waiting for in-flight
    /// work; requests still pending resolve to
    /// [`RegistryError::Disconnected`].
    pub fn shutdown(self) {
        info!("Kingdom registry shutting down");
        self.pool.shutdown();
    }

    /// Dispatches one store operation onto the pool and returns its handle.
    fn submit<T, F, Fut>(&self, op: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(OwnershipStore) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let store = self.store.clone();
        let limit = self.timeout;

        self.pool.spawn(async move {
            let result = match limit {
                Some(limit) => match tokio::time::timeout(limit, op(store)).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(StoreError::Timeout { limit }),
                },
                None => op(store).await,
            };

            if tx.send(result.map_err(RegistryError::from)).is_err() {
                trace!("Caller dropped its pending handle before completion");
            }
        });

        Pending::new(rx)
    }
}

/// A fluent builder for assembling a [`KingdomRegistry`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    database: Option<Database>,
    pool: Option<WorkerPool>,
    timeout: Option<Duration>,
}

impl RegistryBuilder {
    /// Creates a new [`RegistryBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the persistence handle. Required.
    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Injects the scheduling resource the registry will own. When omitted,
    /// a default pool is started during [`build`](Self::build).
    pub fn pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Bounds every dispatched store call. The default is the historical
    /// behavior: no timeout, every unit of work runs to completion.
    pub const fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Consumes the builder and assembles the registry.
    ///
    /// # Errors
    /// Returns [`RegistryError::Validation`] if no database was provided, and
    /// [`RegistryError::Internal`] if the default pool cannot start.
    pub fn build(self) -> Result<KingdomRegistry, RegistryError> {
        let database = self.database.ok_or(RegistryError::Validation {
            message: "Database is required".into(),
            context: None,
        })?;

        let pool = match self.pool {
            Some(pool) => pool,
            None => WorkerPool::start(&RuntimeConfig::default()).map_err(|e| {
                RegistryError::Internal {
                    message: e.to_string().into(),
                    context: Some("Starting default worker pool".into()),
                }
            })?,
        };

        info!(
            ns = database.namespace(),
            db = database.database(),
            timeout = ?self.timeout,
            "Kingdom registry ready"
        );

        Ok(KingdomRegistry {
            store: OwnershipStore::new(database),
            pool,
            timeout: self.timeout,
        })
    }
}
