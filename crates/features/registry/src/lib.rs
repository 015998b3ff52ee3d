//! # Kingdom Registry
//!
//! Asynchronous land-ownership resolution backed by `SurrealDB`.
//!
//! The registry answers three questions about the world: which kingdom a name
//! refers to, which kingdom owns the land unit at a coordinate, and which
//! land units a kingdom holds. It also creates and removes kingdoms, and
//! claims and releases individual land units.
//!
//! Every operation is dispatched onto an owned [`realm_runtime::WorkerPool`]
//! and returns a [`Pending`] handle the caller can await, timing and ordering
//! being the pool's business rather than the caller's.
//!
//! ```no_run
//! use realm_kernel::domain::config::RegistryConfig;
//! use realm_kernel::safe_nanoid;
//! use realm_registry::KingdomRegistry;
//!
//! # async fn demo() -> Result<(), realm_registry::RegistryError> {
//! let registry = KingdomRegistry::connect(&RegistryConfig::default()).await?;
//! let created = registry
//!     .create_kingdom(safe_nanoid!().into(), "Aldmere", "A quiet river kingdom")
//!     .await?;
//! assert!(created);
//! # Ok(())
//! # }
//! ```

mod error;
mod pending;
mod registry;
mod store;

pub use error::{RegistryError, StoreError, StoreErrorExt};
pub use pending::Pending;
pub use registry::{KingdomRegistry, RegistryBuilder};
pub use store::OwnershipStore;
