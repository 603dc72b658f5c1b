mod common;
use common::{restore_env, ENV_LOCK};

use n8n_mcp::config::{Config, ConfigOverrides, ENV_API_KEY, ENV_API_URL, ENV_TIMEOUT_MS};

#[tokio::test]
async fn from_env_reads_and_normalizes_variables() {
    let _guard = ENV_LOCK.lock().await;
    let prev_url = std::env::var(ENV_API_URL).ok();
    let prev_key = std::env::var(ENV_API_KEY).ok();
    let prev_timeout = std::env::var(ENV_TIMEOUT_MS).ok();

    std::env::set_var(ENV_API_URL, "https://n8n.example.com/");
    std::env::set_var(ENV_API_KEY, "env-key");
    std::env::set_var(ENV_TIMEOUT_MS, "2500");

    let config = Config::from_env().expect("config");
    assert_eq!(config.api_url.as_str(), "https://n8n.example.com/api/v1");
    assert_eq!(config.api_key.as_deref(), Some("env-key"));
    assert_eq!(config.timeout_ms, 2500);

    let overridden = Config::from_env_with(&ConfigOverrides {
        api_url: Some("http://127.0.0.1:5678".to_string()),
        ..Default::default()
    })
    .expect("config");
    assert_eq!(overridden.api_url.as_str(), "http://127.0.0.1:5678/api/v1");
    assert_eq!(overridden.api_key.as_deref(), Some("env-key"));

    restore_env(ENV_API_URL, prev_url);
    restore_env(ENV_API_KEY, prev_key);
    restore_env(ENV_TIMEOUT_MS, prev_timeout);
}

#[tokio::test]
async fn from_env_rejects_bad_timeout() {
    let _guard = ENV_LOCK.lock().await;
    let prev_timeout = std::env::var(ENV_TIMEOUT_MS).ok();

    std::env::set_var(ENV_TIMEOUT_MS, "0");
    let err = Config::from_env().unwrap_err();
    assert!(err.message.contains(ENV_TIMEOUT_MS));

    restore_env(ENV_TIMEOUT_MS, prev_timeout);
}
