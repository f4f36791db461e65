use notes_client::{
    ApiError, ClientConfig, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_CREDENTIALS_PATH,
    ENV_TIMEOUT_SECS,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::PathBuf;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.base_url, "http://localhost:8000/api/v1");
    assert_eq!(config.timeout_secs, 10);
    assert_eq!(config.credentials_path, None);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_environment_uses_defaults() {
    let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn environment_overrides() {
    let config = ClientConfig::from_lookup(lookup(&[
        (ENV_BASE_URL, " https://notes.example.com/api/v1/ "),
        (ENV_TIMEOUT_SECS, "30"),
        (ENV_CREDENTIALS_PATH, "/tmp/creds.json"),
    ]))
    .unwrap();

    assert_eq!(config.base_url, "https://notes.example.com/api/v1/");
    assert_eq!(config.normalized_base_url(), "https://notes.example.com/api/v1");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(
        config.resolve_credentials_path().unwrap(),
        PathBuf::from("/tmp/creds.json")
    );
}

#[test]
fn blank_base_url_is_ignored() {
    let config = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "  ")])).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn bad_timeout_is_config_error() {
    let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));

    let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn relative_base_url_is_rejected() {
    let config = ClientConfig {
        base_url: "localhost:8000".into(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ApiError::Config(_))));
}

#[test]
fn default_credentials_path_is_under_config_dir() {
    let config = ClientConfig::default();
    if let Ok(path) = config.resolve_credentials_path() {
        assert!(path.ends_with("notes-client/credentials.json"));
    }
}

#[test]
fn config_serde_roundtrip() {
    let config = ClientConfig {
        timeout_secs: 3,
        credentials_path: Some(PathBuf::from("/var/creds.json")),
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: ClientConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
