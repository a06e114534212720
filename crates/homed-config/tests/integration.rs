use homed_config::{AppConfig, ConfigError};
use serde_json::json;
use std::time::Duration;

#[test]
fn env_then_patch_layers_compose() -> anyhow::Result<()> {
    let mut config = AppConfig::from_vars([
        ("HOMED_SUGGEST_DEBOUNCE_MS", "150"),
        ("HOMED_DEFAULT_PAGE_SIZE", "25"),
        ("HOMED_LISTINGS_PATH", "rooms"),
    ])?;
    assert_eq!(config.search.suggest_debounce, Duration::from_millis(150));
    assert_eq!(config.search.default_page_size.get(), 25);
    assert_eq!(config.client.listings_path, "/rooms");

    config.apply_patch(&json!({
        "search": {"suggest_debounce_ms": "200"},
        "logging": {"level": "homed_search=debug"}
    }))?;
    assert_eq!(config.search.suggest_debounce, Duration::from_millis(200));
    assert_eq!(config.search.default_page_size.get(), 25);
    assert_eq!(config.logging.level, "homed_search=debug");
    Ok(())
}

#[test]
fn timeout_out_of_range_is_rejected() {
    let result = AppConfig::from_vars([("HOMED_HTTP_TIMEOUT_SECS", "0")]);
    match result {
        Err(ConfigError::InvalidField { section, field, .. }) => {
            assert_eq!(section, "client");
            assert_eq!(field, "timeout_secs");
        }
        other => panic!("expected invalid timeout, got {other:?}"),
    }
}
