use realm_database::*;
use surrealdb::types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct MigrationRow {
    name: String,
    version: String,
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    // Health should be OK for mem://
    db.health().await.expect("health check");
    db.use_ns("test_ns").use_db("test_db").await.expect("session switch");
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_create_ownership_schema() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "migrations")
        .init()
        .await
        .expect("connect to mem://");

    let mut response = db
        .query("SELECT name, version FROM migration")
        .await
        .expect("migration table should be queryable");
    let rows = response.take::<Vec<MigrationRow>>(0).expect("migration rows should decode");
    assert!(rows.len() >= 2, "bootstrap and ownership migrations should be recorded");
    assert!(rows.iter().any(|row| row.name == "ownership" && row.version == "0001"));

    // The unique name index must reject a second kingdom with the same name.
    db.query("CREATE kingdom SET name = 'Northmarch', description = 'first'")
        .await
        .expect("first insert issues")
        .check()
        .expect("first insert succeeds");

    let rejected = db
        .query("CREATE kingdom SET name = 'Northmarch', description = 'second'")
        .await
        .expect("second insert issues")
        .check();
    assert!(rejected.is_err(), "unique index on kingdom.name should reject the duplicate");
}

#[tokio::test]
async fn migrations_are_idempotent_per_session() {
    // Two sessions against distinct mem:// engines each bootstrap from scratch;
    // within one engine the runner must skip already-applied scripts.
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "idempotent")
        .init()
        .await
        .expect("connect to mem://");

    let mut response =
        db.query("count(SELECT VALUE id FROM migration)").await.expect("count query issues");
    let count = response.take::<Option<i64>>(0).expect("count decodes").unwrap_or_default();
    assert_eq!(count, 2, "each builtin migration should be recorded exactly once");
}
