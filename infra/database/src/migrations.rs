use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Bootstrap migration: the bookkeeping table itself.
const CORE_BOOTSTRAP_V1: &str = "
    DEFINE TABLE migration SCHEMAFULL;
    DEFINE FIELD name ON migration TYPE string;
    DEFINE FIELD version ON migration TYPE string;
    DEFINE FIELD checksum ON migration TYPE string;
    DEFINE INDEX migration_identity ON migration FIELDS name, version UNIQUE;
";

/// Ownership schema: kingdoms and their land holdings.
///
/// The two unique indexes are the load-bearing invariants of the whole
/// system: one kingdom per name, one owner per (world, x, z).
const OWNERSHIP_V1: &str = "
    DEFINE TABLE kingdom SCHEMAFULL;
    DEFINE FIELD name ON kingdom TYPE string;
    DEFINE FIELD description ON kingdom TYPE string;
    DEFINE INDEX kingdom_name ON kingdom FIELDS name UNIQUE;

    DEFINE TABLE holding SCHEMAFULL;
    DEFINE FIELD world ON holding TYPE string;
    DEFINE FIELD x ON holding TYPE int;
    DEFINE FIELD z ON holding TYPE int;
    DEFINE FIELD kingdom ON holding TYPE record<kingdom>;
    DEFINE INDEX holding_position ON holding FIELDS world, x, z UNIQUE;
";

pub(crate) fn builtin_migrations() -> Vec<Migration> {
    vec![
        Migration::new("core", "0001", CORE_BOOTSTRAP_V1, true),
        Migration::new("ownership", "0001", OWNERSHIP_V1, false),
    ]
}

fn script_checksum(script: &str) -> String {
    hex::encode(Sha256::digest(script.as_bytes()))
}

#[derive(Debug)]
pub(crate) struct Migration {
    pub name: &'static str,
    pub version: &'static str,
    pub script: &'static str,
    pub checksum: String,
    pub is_bootstrap: bool,
}

impl Migration {
    #[must_use]
    pub(crate) fn new(
        name: &'static str,
        version: &'static str,
        script: &'static str,
        is_bootstrap: bool,
    ) -> Self {
        Self { name, version, script, checksum: script_checksum(script), is_bootstrap }
    }

    fn to_applied(&self) -> AppliedMigration {
        AppliedMigration {
            name: self.name.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub name: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    #[must_use]
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let migrations = builtin_migrations();
        let applied_migrations = self.get_migrations_map().await?;

        for migration in migrations {
            if let Some(applied) =
                applied_migrations.get(&format!("{}:{}", migration.name, migration.version))
            {
                ensure_checksum_match(&migration, &applied.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply_migration(&migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), DatabaseError> {
        tracing::trace!(
            name = migration.name,
            version = migration.version,
            bootstrap = migration.is_bootstrap,
            "Applying migration"
        );

        // The bootstrap script defines the migration table it then records itself in.
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration SET name = $name, version = $version, checksum = $checksum;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("name", migration.name))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum.clone()))
            .await
            .context(format!(
                "Schema execution failed at {}:{}",
                migration.name, migration.version
            ))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Migration rejected at {}:{}", migration.name, migration.version))?;

        Ok(())
    }

    async fn is_system_ready(&self) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query("!(SELECT VALUE fields FROM ONLY INFO FOR TABLE migration).is_empty()")
            .await
            .context("Checking if system is ready")?;

        let is_ready = response.take::<Option<bool>>(0)?.unwrap_or_default();
        Ok(is_ready)
    }

    async fn get_migrations_map(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let is_ready = self.is_system_ready().await?;

        if !is_ready {
            return Ok(FxHashMap::default());
        }

        let entries = self
            .db
            .query("SELECT name, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing migrations map")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.name, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    if existing != migration.checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {}:{} (expected {}, got {})",
                migration.name, migration.version, existing, migration.checksum
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}
