use std::io::Write;

use convo::settings::{Settings, SettingsError};
use serial_test::serial;

const SECRET: &str = "test-secret-must-be-32-bytes-long!!";

fn write_toml(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
}

#[test]
#[serial]
fn defaults_apply() {
    let f = write_toml(&format!("secret_key = \"{SECRET}\"\n"));
    let s = Settings::from_path(f.path()).unwrap();
    assert!(!s.debug);
    assert_eq!(s.bind, "0.0.0.0:8080");
    assert!(s.cors_origins.is_empty());
    assert!(s.database.url.is_none());
    assert_eq!(s.database.max_connections, 5);
    assert!(s.tabs().is_empty());
}

#[test]
#[serial]
fn short_secret_rejected() {
    let f = write_toml("secret_key = \"too-short\"\n");
    assert!(matches!(Settings::from_path(f.path()), Err(SettingsError::WeakSecret)));
}

#[test]
#[serial]
fn missing_secret_is_a_load_error() {
    let f = write_toml("debug = true\n");
    assert!(matches!(Settings::from_path(f.path()), Err(SettingsError::Load(_))));
}

#[test]
#[serial]
fn tabs_come_back_in_slug_order() {
    let f = write_toml(&format!(
        r#"
secret_key = "{SECRET}"
debug = true
cors_origins = ["http://localhost:3000"]

[database]
url = "postgres://convo@localhost/convo"
max_connections = 12

[tabs.tech]
name = "Tech"
nodes = ["rust", "go"]

[tabs.main]
name = "Main"
nodes = ["general"]
"#
    ));
    let s = Settings::from_path(f.path()).unwrap();
    assert!(s.debug);
    assert_eq!(s.cors_origins, ["http://localhost:3000"]);
    assert_eq!(s.database.url.as_deref(), Some("postgres://convo@localhost/convo"));
    assert_eq!(s.database.max_connections, 12);

    let tabs = s.tabs();
    let slugs: Vec<_> = tabs.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, ["main", "tech"]);
    // node order is preserved as written
    assert_eq!(tabs[1].nodes, ["rust", "go"]);
    assert_eq!(tabs[1].name, "Tech");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let f = write_toml("secret_key = \"too-short\"\nbind = \"127.0.0.1:1\"\n");
    std::env::set_var("CONVO_SECRET_KEY", SECRET);
    std::env::set_var("CONVO_BIND", "127.0.0.1:9090");
    std::env::set_var("CONVO_DATABASE__MAX_CONNECTIONS", "9");
    std::env::set_var("CONVO_CORS_ORIGINS", "http://a.test,http://b.test");
    let loaded = Settings::from_path(f.path());
    for key in ["CONVO_SECRET_KEY", "CONVO_BIND", "CONVO_DATABASE__MAX_CONNECTIONS", "CONVO_CORS_ORIGINS"] {
        std::env::remove_var(key);
    }

    let s = loaded.unwrap();
    assert_eq!(s.secret_key, SECRET);
    assert_eq!(s.bind, "127.0.0.1:9090");
    assert_eq!(s.database.max_connections, 9);
    assert_eq!(s.cors_origins, ["http://a.test", "http://b.test"]);
}

#[test]
#[serial]
fn missing_file_falls_back_to_environment() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("CONVO_SECRET_KEY", SECRET);
    let loaded = Settings::from_path(dir.path().join("absent.toml"));
    std::env::remove_var("CONVO_SECRET_KEY");
    assert_eq!(loaded.unwrap().secret_key, SECRET);
}
