use realm_domain::config::{DatabaseConfig, PoolConfig, RegistryConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "realm");
    assert_eq!(db.database, "registry");
    assert!(db.credentials.is_none());

    let pool = PoolConfig::default();
    assert_eq!(pool.worker_threads, 0);
    assert_eq!(pool.thread_name, "registry-worker");

    let cfg = RegistryConfig::default();
    assert!(cfg.request_timeout_ms.is_none());
}

#[test]
fn registry_config_deserializes() {
    let raw = json!({
        "database": { "url": "ws://db:8000", "namespace": "n", "database": "d",
                      "credentials": { "username": "root", "password": "root" } },
        "pool": { "worker_threads": 2, "thread_name": "reg" },
        "request_timeout_ms": 1500
    });

    let cfg: RegistryConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.database.url, "ws://db:8000");
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.pool.worker_threads, 2);
    assert_eq!(cfg.request_timeout_ms, Some(1500));
    assert_eq!(cfg.database.credentials.as_ref().map(|c| c.username.as_str()), Some("root"));
}
