//! Configuration loading and backend resolution.

use std::collections::HashMap;
use std::io::Write;

use inscriptions::config::{Config, Credentials, KEY_ENV, URL_ENV};
use inscriptions::store::Backend;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults() {
    let cfg = Config::from_toml("").expect("empty config is valid");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.max_upload_mb, 10);
    assert_eq!(cfg.max_body_bytes(), 10 * 1024 * 1024);
    assert_eq!(cfg.store.photo_bucket, "photos");
    assert_eq!(cfg.store.inscriptions_table, "inscriptions");
    assert_eq!(cfg.store.players_table, "players");
    assert_eq!(cfg.store.timeout_secs, 30);
    assert_eq!(cfg.page.title, "Inscripción Torneo");
    assert!(cfg.credentials().is_none());
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[server]
port = 9000

[store]
url = "https://abc.supabase.co/"
key = "secret"
photo_bucket = "avatars"

[page]
title = "Copa Hielo"
"#
    )
    .expect("write config");

    let cfg = Config::from_file(file.path()).expect("load config");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.store.photo_bucket, "avatars");
    assert_eq!(cfg.store.players_table, "players");
    assert_eq!(cfg.page.title, "Copa Hielo");
    assert_eq!(
        cfg.credentials(),
        Some(Credentials { url: "https://abc.supabase.co".into(), key: "secret".into() })
    );
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let err = Config::from_file(&dir.path().join("nope.toml")).expect_err("must fail");
    assert!(err.to_string().contains("Cannot read config file"));
}

#[test]
fn test_invalid_values_rejected() {
    assert!(Config::from_toml("[server]\nmax_upload_mb = 0\n").is_err());
    assert!(Config::from_toml("[store]\ntimeout_secs = 0\n").is_err());
    assert!(Config::from_toml("[store]\nplayers_table = \" \"\n").is_err());
    assert!(Config::from_toml("[server]\nport = \"x\"\n").is_err());
}

#[test]
fn test_upload_limit_overflow_rejected() {
    let err = Config::from_toml("[server]\nmax_upload_mb = 9223372036854775807\n")
        .expect_err("limit overflows when converted to bytes");
    assert!(err.to_string().contains("too large"));
}

#[test]
fn test_env_overrides_file() {
    let mut cfg =
        Config::from_toml("[store]\nurl = \"https://file.example\"\nkey = \"k1\"\n").expect("parse");
    cfg.apply_env(env(&[(URL_ENV, "https://env.example"), (KEY_ENV, "k2")]));
    assert_eq!(
        cfg.credentials(),
        Some(Credentials { url: "https://env.example".into(), key: "k2".into() })
    );
}

#[test]
fn test_empty_env_values_are_ignored() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[(URL_ENV, "https://env.example"), (KEY_ENV, "  ")]));
    assert!(cfg.credentials().is_none(), "key is still missing");
}

#[test]
fn test_backend_unavailable_without_credentials() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[(URL_ENV, "https://env.example")]));
    let backend = Backend::from_config(&cfg).expect("resolve backend");
    assert!(!backend.is_ready());
    assert!(backend.stores().is_err());
}

#[tokio::test]
async fn test_backend_ready_with_credentials() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[(URL_ENV, "https://env.example"), (KEY_ENV, "k")]));
    let backend = Backend::from_config(&cfg).expect("resolve backend");
    assert!(backend.is_ready());
    let stores = backend.stores().expect("stores");
    assert_eq!(stores.layout.photo_bucket, "photos");
}

#[test]
fn test_backend_rejects_bad_url() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[(URL_ENV, "not a url"), (KEY_ENV, "k")]));
    assert!(Backend::from_config(&cfg).is_err());
}
