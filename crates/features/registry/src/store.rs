//! Persistence boundary for kingdoms and their land holdings.
//!
//! Every operation is a single round-trip against the `kingdom`/`holding`
//! schema applied by `realm-database` migrations. Consistency is delegated
//! entirely to the store's unique indexes; this module holds no state and
//! takes no locks.

use crate::error::{StoreError, StoreErrorExt};
use realm_database::Database;
use realm_kernel::domain::{HoldingSet, Kingdom, KingdomId, LandHolding, SpatialKey};
use surrealdb::types::SurrealValue;
use tracing::trace;

const QUERY_KINGDOM_BY_NAME: &str =
    "SELECT id.id() AS id, name, description FROM kingdom WHERE name = $name LIMIT 1";

/// The point-exact spatial join: holding row to its kingdom record link.
const QUERY_KINGDOM_BY_POSITION: &str = "SELECT kingdom.id.id() AS id, kingdom.name AS name, \
     kingdom.description AS description FROM holding \
     WHERE world = $world AND x = $x AND z = $z LIMIT 1";

const QUERY_HOLDINGS_BY_KINGDOM: &str =
    "SELECT world, x, z FROM holding WHERE kingdom = type::record('kingdom', $id)";

const QUERY_CREATE_KINGDOM: &str = "CREATE ONLY type::record('kingdom', $id) \
     SET name = $name, description = $description";

/// Cascade: a kingdom never leaves orphaned holdings behind.
const QUERY_DELETE_KINGDOM: &str = "BEGIN TRANSACTION;
     DELETE holding WHERE kingdom = type::record('kingdom', $id);
     RETURN count((DELETE kingdom WHERE id = type::record('kingdom', $id) RETURN BEFORE)) > 0;
     COMMIT TRANSACTION;";

/// The owner guard keeps a claim from ever producing a holding that points at
/// a kingdom row which does not exist.
const QUERY_CREATE_HOLDING: &str = "BEGIN TRANSACTION;
     IF !record::exists(type::record('kingdom', $kingdom)) {
         THROW 'owner_missing';
     };
     CREATE ONLY holding SET world = $world, x = $x, z = $z, \
         kingdom = type::record('kingdom', $kingdom);
     COMMIT TRANSACTION;";

/// The marker raised by the owner guard in [`QUERY_CREATE_HOLDING`].
const OWNER_MISSING_MARKER: &str = "owner_missing";

const QUERY_DELETE_HOLDING: &str = "RETURN count((DELETE holding \
     WHERE world = $world AND x = $x AND z = $z RETURN BEFORE)) > 0;";

#[derive(Debug, SurrealValue)]
struct KingdomRow {
    id: String,
    name: String,
    description: String,
}

impl From<KingdomRow> for Kingdom {
    fn from(row: KingdomRow) -> Self {
        Self::new(row.id, row.name, row.description)
    }
}

#[derive(Debug, SurrealValue)]
struct HoldingRow {
    world: String,
    x: i64,
    z: i64,
}

/// Uniqueness rejections are an expected outcome, not a failure: the store's
/// indexes are the arbiter for duplicate names, duplicate ids, and
/// already-claimed positions.
fn is_constraint_violation(err: &surrealdb::Error) -> bool {
    let message = err.to_string();
    message.contains("already contains") || message.contains("already exists")
}

/// Durable storage and point/set queries over kingdoms and land holdings.
///
/// Cheap to clone; every clone shares the same underlying connection pool.
#[derive(Debug, Clone)]
pub struct OwnershipStore {
    db: Database,
}

impl OwnershipStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Exact, case-sensitive lookup by display name.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] on connectivity or decoding failures;
    /// absence is `Ok(None)`, never an error.
    pub async fn kingdom_by_name(&self, name: &str) -> Result<Option<Kingdom>, StoreError> {
        let mut response = self
            .db
            .query(QUERY_KINGDOM_BY_NAME)
            .bind(("name", name.to_owned()))
            .await
            .context("Looking up kingdom by name")?;

        let row = response
            .take::<Vec<KingdomRow>>(0)
            .context("Decoding kingdom row")?
            .into_iter()
            .next();

        Ok(row.map(Kingdom::from))
    }

    /// Resolves the owning kingdom for an exact spatial key, if any.
    ///
    /// Point-exact only: no range or nearest-neighbor semantics.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] on connectivity or decoding failures.
    pub async fn kingdom_at(&self, key: &SpatialKey) -> Result<Option<Kingdom>, StoreError> {
        let mut response = self
            .db
            .query(QUERY_KINGDOM_BY_POSITION)
            .bind(("world", key.world.clone()))
            .bind(("x", key.x))
            .bind(("z", key.z))
            .await
            .context("Looking up kingdom by position")?;

        let row = response
            .take::<Vec<KingdomRow>>(0)
            .context("Decoding kingdom row")?
            .into_iter()
            .next();

        Ok(row.map(Kingdom::from))
    }

    /// Lists the complete holding set of a kingdom; empty when it owns nothing.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] on connectivity or decoding failures.
    pub async fn holdings_of(&self, id: &KingdomId) -> Result<HoldingSet, StoreError> {
        let mut response = self
            .db
            .query(QUERY_HOLDINGS_BY_KINGDOM)
            .bind(("id", id.as_str().to_owned()))
            .await
            .context("Listing kingdom holdings")?;

        let rows = response.take::<Vec<HoldingRow>>(0).context("Decoding holding rows")?;

        Ok(rows
            .into_iter()
            .map(|row| LandHolding::new(id.clone(), SpatialKey::new(row.world, row.x, row.z)))
            .collect())
    }

    /// Inserts a new kingdom row.
    ///
    /// Returns `false` when the unique name (or id) index rejects the insert.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] for any failure other than a uniqueness
    /// rejection.
    pub async fn insert_kingdom(
        &self,
        id: &KingdomId,
        name: &str,
        description: &str,
    ) -> Result<bool, StoreError> {
        let response = self
            .db
            .query(QUERY_CREATE_KINGDOM)
            .bind(("id", id.as_str().to_owned()))
            .bind(("name", name.to_owned()))
            .bind(("description", description.to_owned()))
            .await
            .context("Creating kingdom")?;

        match response.check().map_err(surrealdb::Error::from) {
            Ok(_) => Ok(true),
            Err(e) if is_constraint_violation(&e) => {
                trace!(%id, name, "Kingdom insert rejected by uniqueness constraint");
                Ok(false)
            },
            Err(e) => Err(e).context("Creating kingdom"),
        }
    }

    /// Deletes a kingdom and, in the same transaction, every holding it owns.
    ///
    /// Returns `true` iff the kingdom row existed.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] on connectivity or decoding failures.
    pub async fn delete_kingdom(&self, id: &KingdomId) -> Result<bool, StoreError> {
        let mut response = self
            .db
            .query(QUERY_DELETE_KINGDOM)
            .bind(("id", id.as_str().to_owned()))
            .await
            .context("Deleting kingdom")?;

        // Statement slots: BEGIN, DELETE holding, RETURN, COMMIT. The boolean
        // outcome sits in the RETURN slot.
        let removed = response
            .take::<Option<bool>>(2)
            .context("Decoding delete outcome")?
            .unwrap_or_default();

        Ok(removed)
    }

    /// Claims a spatial key for a kingdom.
    ///
    /// Returns `false` when the position is already owned (by anyone,
    /// including the claiming kingdom itself) or when no kingdom row exists
    /// for `id`, so a claim can never leave a holding behind that points at
    /// nothing.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] for any failure other than a uniqueness
    /// or missing-owner rejection.
    pub async fn insert_holding(
        &self,
        id: &KingdomId,
        key: &SpatialKey,
    ) -> Result<bool, StoreError> {
        let response = self
            .db
            .query(QUERY_CREATE_HOLDING)
            .bind(("world", key.world.clone()))
            .bind(("x", key.x))
            .bind(("z", key.z))
            .bind(("kingdom", id.as_str().to_owned()))
            .await
            .context("Claiming holding")?;

        match response.check().map_err(surrealdb::Error::from) {
            Ok(_) => Ok(true),
            Err(e) if is_constraint_violation(&e) => {
                trace!(%id, %key, "Holding claim rejected, position already owned");
                Ok(false)
            },
            Err(e) if e.to_string().contains(OWNER_MISSING_MARKER) => {
                trace!(%id, %key, "Holding claim rejected, kingdom does not exist");
                Ok(false)
            },
            Err(e) => Err(e).context("Claiming holding"),
        }
    }

    /// Releases a spatial key regardless of owner.
    ///
    /// Returns `true` iff a holding row was removed.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] on connectivity or decoding failures.
    pub async fn delete_holding(&self, key: &SpatialKey) -> Result<bool, StoreError> {
        let mut response = self
            .db
            .query(QUERY_DELETE_HOLDING)
            .bind(("world", key.world.clone()))
            .bind(("x", key.x))
            .bind(("z", key.z))
            .await
            .context("Releasing holding")?;

        let removed = response
            .take::<Option<bool>>(0)
            .context("Decoding release outcome")?
            .unwrap_or_default();

        Ok(removed)
    }
}
