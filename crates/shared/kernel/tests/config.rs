use realm_kernel::config::{ConfigError, load_config};
use realm_kernel::domain::config::RegistryConfig;
use std::fs;

#[test]
fn loads_registry_config_from_file() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join("registry.toml");
    fs::write(
        &path,
        r#"
request_timeout_ms = 250

[database]
url = "mem://"
namespace = "realm_test"
database = "registry_test"

[pool]
worker_threads = 2
thread_name = "test-worker"
"#,
    )
    .expect("write config file");

    let cfg: RegistryConfig = load_config(Some(&path)).expect("config should load");
    assert_eq!(cfg.database.namespace, "realm_test");
    assert_eq!(cfg.pool.worker_threads, 2);
    assert_eq!(cfg.request_timeout_ms, Some(250));
}

#[test]
fn missing_file_is_an_error() {
    let result: Result<RegistryConfig, ConfigError> =
        load_config(Some("definitely/not/a/config/file"));
    assert!(matches!(result, Err(ConfigError::Config { .. })));
}
